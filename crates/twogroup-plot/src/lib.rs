//! SVG diagnostics for two-group comparisons.
//!
//! - [`norm_plot`]: a histogram and a normal Q-Q plot for each of two samples,
//!   to judge normality by eye
//! - [`boxplot()`]: boxes per parameter, dodged by category, with every
//!   observation overlaid as a jittered strip
//!
//! Every renderer writes into an explicit output directory, creating it if
//! needed. Existing files of the same name are overwritten. Missing and
//! non-finite values are left out of the drawings.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use svg::Document;
use twogroup_analysis::dataset::{Dataset, GroupPair};
use twogroup_stats::StatsError;

pub mod boxplot;
mod frame;
mod histogram;
mod qq;

pub use self::boxplot::BoxplotOptions;

/// Number of characters of a parameter name kept in file names.
pub const FILE_LABEL_CHARS: usize = 5;
/// File name of the grouped boxplot.
pub const BOXPLOT_FILE_NAME: &str = "boxplot.svg";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlotError {
    #[display("Failed to create output directory {}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[display("Failed to write {}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[display("No finite value to plot for '{label}'")]
    Empty { label: String },
    #[display("Cannot plot '{label}'")]
    Sample { label: String, source: StatsError },
}

/// Options of [`norm_plot`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormPlotOptions {
    /// File name suffixes of the first and second sample.
    pub suffixes: [String; 2],
    pub width: f64,
    pub height: f64,
}

impl Default for NormPlotOptions {
    fn default() -> Self {
        Self {
            suffixes: ["healthy".to_owned(), "diseased".to_owned()],
            width: 640.0,
            height: 480.0,
        }
    }
}

/// Prefix of the plot files of a parameter: its first
/// [`FILE_LABEL_CHARS`] characters.
///
/// ```
/// assert_eq!(twogroup_plot::file_label("cholesterol"), "chole");
/// assert_eq!(twogroup_plot::file_label("bmi"), "bmi");
/// ```
#[must_use]
pub fn file_label(parameter: &str) -> String {
    parameter.chars().take(FILE_LABEL_CHARS).collect()
}

/// Writes a histogram and a normal Q-Q plot for each sample into `dest`.
///
/// Files are named `{label}_{suffix}_hist.svg` and `{label}_{suffix}_qq_plot.svg`
/// where `label` is [`file_label`] of `parameter` and `suffix` comes from
/// `options`. Returns the written paths.
///
/// # Errors
///
/// Fails if a sample has no finite value or no spread, or if a file cannot
/// be written. Nothing is written when a sample cannot be plotted.
pub fn norm_plot(
    a: &[f64],
    b: &[f64],
    parameter: &str,
    dest: &Path,
    options: &NormPlotOptions,
) -> Result<Vec<PathBuf>, PlotError> {
    let label = file_label(parameter);
    // Both samples are rendered before anything is written
    let mut documents = vec![];
    for (sample, suffix) in [a, b].into_iter().zip(&options.suffixes) {
        let present = sample
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if present.len() < sample.len() {
            tracing::debug!(
                parameter,
                suffix = %suffix,
                skipped = sample.len() - present.len(),
                "leaving non-finite values out of normality plots"
            );
        }
        let title = format!("{parameter} ({suffix})");

        let histogram = histogram::render(&present, &title, options.width, options.height)
            .ok_or_else(|| PlotError::Empty {
                label: title.clone(),
            })?;
        let qq = qq::render(&present, &title, options.width, options.height).map_err(|source| {
            PlotError::Sample {
                label: title.clone(),
                source,
            }
        })?;

        documents.push((format!("{label}_{suffix}_hist.svg"), histogram));
        documents.push((format!("{label}_{suffix}_qq_plot.svg"), qq));
    }
    documents
        .iter()
        .map(|(name, document)| save(dest, name, document))
        .collect()
}

/// Writes the grouped boxplot of `parameters` into `dest/boxplot.svg`.
///
/// # Errors
///
/// Fails if no selected group has a finite value, or if the file cannot be
/// written.
pub fn boxplot(
    dataset: &Dataset,
    parameters: &[&str],
    groups: &GroupPair,
    dest: &Path,
    options: &BoxplotOptions,
) -> Result<PathBuf, PlotError> {
    let document =
        boxplot::render(dataset, parameters, groups, options).ok_or_else(|| PlotError::Empty {
            label: parameters.join(", "),
        })?;
    save(dest, BOXPLOT_FILE_NAME, &document)
}

fn save(dir: &Path, name: &str, document: &Document) -> Result<PathBuf, PlotError> {
    fs::create_dir_all(dir).map_err(|source| PlotError::CreateDir {
        path: dir.to_owned(),
        source,
    })?;
    let path = dir.join(name);
    svg::save(&path, document).map_err(|source| PlotError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "plot written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::env;

    use twogroup_analysis::dataset::Observation;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("twogroup-plot-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_norm_plot_writes_four_files() {
        let dir = scratch_dir("norm");
        let a = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0];
        let b = [20.0, 22.0, f64::NAN, 23.0, 22.0, 21.0, 20.0, 24.0];
        let written = norm_plot(&a, &b, "weight_kg", &dir, &NormPlotOptions::default()).unwrap();

        let names = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "weigh_healthy_hist.svg",
                "weigh_healthy_qq_plot.svg",
                "weigh_diseased_hist.svg",
                "weigh_diseased_qq_plot.svg",
            ]
        );
        for path in &written {
            let content = fs::read_to_string(path).unwrap();
            assert!(content.contains("<svg"));
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_norm_plot_suffixes_are_configurable() {
        let dir = scratch_dir("suffix");
        let options = NormPlotOptions {
            suffixes: ["ctrl".to_owned(), "case".to_owned()],
            ..NormPlotOptions::default()
        };
        let written = norm_plot(&[1.0, 2.0, 4.0], &[3.0, 5.0, 6.0], "bmi", &dir, &options).unwrap();
        assert!(written[0].ends_with("bmi_ctrl_hist.svg"));
        assert!(written[3].ends_with("bmi_case_qq_plot.svg"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_norm_plot_rejects_unplottable_samples() {
        let dir = scratch_dir("empty");
        let options = NormPlotOptions::default();
        let err = norm_plot(&[f64::NAN], &[1.0, 2.0], "bmi", &dir, &options).unwrap_err();
        assert!(matches!(err, PlotError::Empty { .. }));
        let err = norm_plot(&[1.0, 2.0], &[3.0, 3.0], "bmi", &dir, &options).unwrap_err();
        assert!(matches!(
            err,
            PlotError::Sample {
                source: StatsError::ZeroVariance { .. },
                ..
            }
        ));
        // The plottable first sample is not written either
        assert!(!dir.join("bmi_healthy_hist.svg").exists());
        assert!(!dir.join("bmi_healthy_qq_plot.svg").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_boxplot_file() {
        let dir = scratch_dir("box");
        let dataset = Dataset::new(
            (0..10)
                .flat_map(|i| {
                    let v = f64::from(i);
                    [
                        Observation::new(Some(v), "weight", "healthy"),
                        Observation::new(Some(v + 3.0), "weight", "diseased"),
                    ]
                })
                .collect(),
        );
        let groups = GroupPair::new("healthy", "diseased");
        let options = BoxplotOptions::default();
        let path = boxplot(&dataset, &["weight"], &groups, &dir, &options).unwrap();
        assert_eq!(path, dir.join(BOXPLOT_FILE_NAME));
        assert!(fs::read_to_string(&path).unwrap().contains("Parameter value"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_plots_of_values_one_ulp_apart() {
        let dir = scratch_dir("ulp");
        let lo: f64 = 1000.0;
        let hi = f64::from_bits(lo.to_bits() + 1);
        let sample = [lo, hi, lo, hi];
        let options = NormPlotOptions::default();
        let written = norm_plot(&sample, &sample, "weight", &dir, &options).unwrap();
        assert_eq!(written.len(), 4);

        let dataset = Dataset::new(
            sample
                .iter()
                .flat_map(|v| {
                    [
                        Observation::new(Some(*v), "weight", "healthy"),
                        Observation::new(Some(*v), "weight", "diseased"),
                    ]
                })
                .collect(),
        );
        let groups = GroupPair::new("healthy", "diseased");
        boxplot(&dataset, &["weight"], &groups, &dir, &BoxplotOptions::default()).unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }
}
