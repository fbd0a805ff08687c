use std::path::PathBuf;

use clap::Args;
use twogroup_analysis::{
    comparison::{self, ComparisonOptions, ComparisonResult, ParameterComparison},
    selector::{DEFAULT_ALPHA, SelectionThresholds},
};

use crate::{command::DatasetArg, schema::report::ComparisonReport, util::Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    #[clap(flatten)]
    pub common: DatasetArg,

    /// Significance level of the normality check
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub normality_alpha: f64,

    /// Significance level of the variance-equality check
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub variance_alpha: f64,

    /// Output file path for the JSON report (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    for (name, alpha) in [
        ("--normality-alpha", arg.normality_alpha),
        ("--variance-alpha", arg.variance_alpha),
    ] {
        anyhow::ensure!(
            (0.0..=1.0).contains(&alpha),
            "{name} must be between 0 and 1, got {alpha}"
        );
    }

    let (dataset, groups) = arg.common.load()?;
    let options = ComparisonOptions {
        thresholds: SelectionThresholds {
            normality: arg.normality_alpha,
            variance: arg.variance_alpha,
        },
        impute: arg.common.impute,
    };
    let comparisons =
        comparison::compare_all(&dataset, &arg.common.parameters, &groups, &options)?;

    eprint!("{}", format_table(&comparisons));
    let report = ComparisonReport::new(options.thresholds, options.impute, comparisons);
    if report.failed_count() > 0 {
        tracing::warn!(
            failed = report.failed_count(),
            total = report.comparisons.len(),
            "some parameters could not be compared"
        );
    }
    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}

/// Human-readable summary, one row per parameter.
fn format_table(comparisons: &[ParameterComparison]) -> String {
    let width = comparisons
        .iter()
        .map(|c| c.parameter.chars().count())
        .max()
        .unwrap_or(0)
        .max("parameter".len());

    let mut table = format!(
        "{:<width$}  {:<18}  {:>9}  {:>7}  {:>7}  {:>7}  {:>7}\n",
        "parameter", "test", "statistic", "p", "norm p1", "norm p2", "var p"
    );
    for c in comparisons {
        let row = match &c.result {
            ComparisonResult::Compared(o) => format!(
                "{:<width$}  {:<18}  {:>9.3}  {:>7.3}  {:>7.3}  {:>7.3}  {:>7.3}",
                c.parameter,
                o.test.to_string(),
                o.statistic,
                o.p_value,
                o.normality_p1,
                o.normality_p2,
                o.variance_p
            ),
            ComparisonResult::Failed { error } => {
                format!("{:<width$}  failed: {error}", c.parameter)
            }
        };
        table.push_str(&row);
        table.push('\n');
    }
    table
}
