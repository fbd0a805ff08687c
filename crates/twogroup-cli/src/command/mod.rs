use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use twogroup_analysis::dataset::{Dataset, GroupPair};

use crate::util;

use self::{compare::CompareArg, impute::ImputeArg, plot::PlotArg};

mod compare;
mod impute;
mod plot;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug details of every test decision
    #[arg(long, short, global = true)]
    verbose: bool,

    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare two groups on every parameter and write a JSON report
    Compare(#[clap(flatten)] CompareArg),
    /// Write normality plots and a grouped boxplot as SVG files
    Plot(#[clap(flatten)] PlotArg),
    /// Replace missing values with the median of their group
    Impute(#[clap(flatten)] ImputeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Compare(arg) => compare::run(&arg)?,
        Mode::Plot(arg) => plot::run(&arg)?,
        Mode::Impute(arg) => impute::run(&arg)?,
    }
    Ok(())
}

/// Logs to stderr; `RUST_LOG` takes precedence over `verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Dataset selection shared by the analysis commands.
#[derive(Debug, Clone, Args)]
pub(crate) struct DatasetArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// The two categories to compare (comma-separated); required when the
    /// dataset has more than two
    #[arg(long, value_delimiter = ',')]
    pub groups: Option<Vec<String>>,

    /// Parameters to analyze (comma-separated); all parameters by default
    #[arg(long, value_delimiter = ',')]
    pub parameters: Vec<String>,

    /// Replace missing values with the median of their group
    #[arg(long)]
    pub impute: bool,
}

impl DatasetArg {
    /// Reads the dataset and resolves the groups to compare.
    pub fn load(&self) -> anyhow::Result<(Dataset, GroupPair)> {
        let dataset = util::read_dataset_file(&self.dataset)?;
        let requested = group_pair(self.groups.as_deref())?;
        let groups = dataset.group_pair(requested.as_ref())?;
        tracing::info!(
            observations = dataset.observations.len(),
            first = %groups.first,
            second = %groups.second,
            "dataset loaded"
        );
        Ok((dataset, groups))
    }
}

/// Parses `--groups first,second`.
fn group_pair(groups: Option<&[String]>) -> anyhow::Result<Option<GroupPair>> {
    match groups {
        None => Ok(None),
        Some([first, second]) => Ok(Some(GroupPair::new(first, second))),
        Some(other) => anyhow::bail!(
            "--groups expects exactly two categories, got {}",
            other.len()
        ),
    }
}
