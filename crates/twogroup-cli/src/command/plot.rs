use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use twogroup_plot::{BoxplotOptions, NormPlotOptions};

use crate::command::DatasetArg;

#[derive(Debug, Clone, Args)]
pub(crate) struct PlotArg {
    #[clap(flatten)]
    pub common: DatasetArg,

    /// Directory the SVG files are written to
    #[arg(long)]
    pub output_dir: PathBuf,

    /// File name suffixes of the first and second group (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["healthy", "diseased"])]
    pub group_suffixes: Vec<String>,

    /// Seed of the boxplot jitter
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

pub(crate) fn run(arg: &PlotArg) -> anyhow::Result<()> {
    let suffixes: [String; 2] = arg
        .group_suffixes
        .clone()
        .try_into()
        .map_err(|found: Vec<String>| {
            anyhow::anyhow!("--group-suffixes expects two values, got {}", found.len())
        })?;

    let (dataset, groups) = arg.common.load()?;
    let dataset = if arg.common.impute {
        dataset.median_filled()?
    } else {
        dataset
    };

    let parameters = dataset.select_parameters(&arg.common.parameters)?;

    let norm_options = NormPlotOptions {
        suffixes,
        ..NormPlotOptions::default()
    };
    let mut written = 0;
    for parameter in &parameters {
        let [a, b] = groups.labels().map(|category| dataset.sample(parameter, category));
        // One unplottable parameter does not stop the others
        match twogroup_plot::norm_plot(&a, &b, parameter, &arg.output_dir, &norm_options) {
            Ok(paths) => written += paths.len(),
            Err(error) => tracing::warn!(parameter, %error, "skipping normality plots"),
        }
    }

    let box_options = BoxplotOptions {
        seed: arg.seed,
        ..BoxplotOptions::default()
    };
    twogroup_plot::boxplot(&dataset, &parameters, &groups, &arg.output_dir, &box_options)
        .with_context(|| format!("Failed to draw boxplot into {}", arg.output_dir.display()))?;
    written += 1;

    tracing::info!(
        files = written,
        dir = %arg.output_dir.display(),
        "plots written"
    );
    Ok(())
}
