//! Statistical primitives for comparing two independent samples.
//!
//! This crate provides the numeric building blocks used by the two-group
//! comparison workflow:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Percentiles**: linearly interpolated quantiles (boxplot whiskers and quartiles)
//! - **Histogram generation**: equal-width frequency distributions
//! - **Ranking**: average ranks with tie bookkeeping for rank-based tests
//! - **Imputation**: median replacement of missing observations
//! - **Variance equality**: Levene's test centred on the median (Brown-Forsythe)
//! - **Normality**: Lilliefors test with the Dallal-Wilkinson p-value approximation
//! - **Location tests**: Student's and Welch's t-tests, Mann-Whitney U
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`histogram`]: Histogram construction for visualizing data distributions
//! - [`rank`]: Average ranks and tie groups
//! - [`impute`]: Missing-value imputation
//! - [`variance`]: Variance-equality check
//! - [`normality`]: Normality check
//! - [`location`]: Tests for a difference in location between two samples
//!
//! Missing observations are represented by `NaN`. Every test rejects them with
//! [`StatsError::NonFiniteValue`]; impute them first with [`impute::median_fill`].
//!
//! # Examples
//!
//! ## Checking the preconditions of a t-test
//!
//! ```
//! use twogroup_stats::{normality, variance};
//!
//! let a = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0];
//! let b = [20.0, 22.0, 21.0, 23.0, 22.0, 21.0, 20.0, 24.0];
//!
//! assert!(normality::norm_chk(&a).unwrap() >= 0.05);
//! assert!(normality::norm_chk(&b).unwrap() >= 0.05);
//! assert_eq!(variance::var_chk(&a, &b).unwrap(), 1.0);
//! ```
//!
//! ## Filling missing values
//!
//! ```
//! use twogroup_stats::impute;
//!
//! let filled = impute::median_fill(&[1.0, f64::NAN, 3.0]).unwrap();
//! assert_eq!(filled, vec![1.0, 2.0, 3.0]);
//! ```

pub mod descriptive;
pub mod histogram;
pub mod impute;
pub mod location;
pub mod normality;
pub mod percentiles;
pub mod rank;
pub mod variance;

/// Number of decimals reported for test statistics and p-values.
pub const REPORTED_DECIMALS: i32 = 3;

/// Errors raised by the statistical primitives on degenerate input.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    #[display("{test} requires at least {required} observations per sample, got {actual}")]
    TooFewObservations {
        test: &'static str,
        required: usize,
        actual: usize,
    },
    #[display("{test} received a missing or non-finite value")]
    NonFiniteValue { test: &'static str },
    #[display("{test} is undefined for samples without spread")]
    ZeroVariance { test: &'static str },
    #[display("cannot impute a sample in which every value is missing")]
    AllMissing,
    #[display("invalid {distribution} distribution parameters: {message}")]
    Distribution {
        distribution: &'static str,
        message: String,
    },
}

impl StatsError {
    pub(crate) fn distribution<E>(distribution: &'static str, err: &E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Distribution {
            distribution,
            message: err.to_string(),
        }
    }
}

/// Rounds `value` half away from zero to `decimals` decimal places.
///
/// # Examples
///
/// ```
/// use twogroup_stats::round_to;
///
/// assert_eq!(round_to(0.123_56, 3), 0.124);
/// assert_eq!(round_to(-14.206_24, 3), -14.206);
/// ```
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds a statistic or p-value to [`REPORTED_DECIMALS`] places.
#[must_use]
pub fn round_reported(value: f64) -> f64 {
    round_to(value, REPORTED_DECIMALS)
}

pub(crate) fn ensure_finite(test: &'static str, values: &[f64]) -> Result<(), StatsError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(StatsError::NonFiniteValue { test })
    }
}

pub(crate) fn ensure_len(
    test: &'static str,
    values: &[f64],
    required: usize,
) -> Result<(), StatsError> {
    if values.len() < required {
        return Err(StatsError::TooFewObservations {
            test,
            required,
            actual: values.len(),
        });
    }
    Ok(())
}
