//! Two-group comparison of continuous measurements.
//!
//! This crate decides *which* location test validly compares two samples and
//! applies it across the parameters of a long-format dataset.
//!
//! # Overview
//!
//! 1. **Load a dataset** ([`dataset::Dataset`]): one observation per row, tagged
//!    with the measured parameter and the subject's category
//! 2. **Pick the groups** ([`dataset::GroupPair`]): the two categories to compare
//! 3. **Optionally impute** ([`dataset::Dataset::median_filled`]): replace missing
//!    values with the median of their group
//! 4. **Compare** ([`comparison::compare_all`]): for each parameter, check normality
//!    and variance equality, then run the test chosen by [`selector::select_test`]
//!
//! The statistical primitives live in [`twogroup_stats`].
//!
//! # Examples
//!
//! ```
//! use twogroup_analysis::selector::{SelectionThresholds, TestKind, compare_samples};
//!
//! let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 60.0];
//! let b = [11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0, 20.0];
//!
//! let outcome = compare_samples(&a, &b, "weight", SelectionThresholds::default()).unwrap();
//! assert_eq!(outcome.test, TestKind::MannWhitney);
//! ```

pub mod comparison;
pub mod dataset;
pub mod selector;

/// Errors raised while preparing dataset comparisons.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("Category '{category}' does not occur in the dataset")]
    UnknownCategory { category: String },
    #[display("Parameter '{parameter}' does not occur in the dataset")]
    UnknownParameter { parameter: String },
    #[display("Expected exactly two categories, found {found:?}; select the groups explicitly")]
    NotTwoCategories { found: Vec<String> },
    #[display("Failed to impute '{parameter}' in category '{category}'")]
    Impute {
        parameter: String,
        category: String,
        source: twogroup_stats::StatsError,
    },
}
