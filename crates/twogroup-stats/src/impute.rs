//! Missing-value imputation.
//!
//! A missing observation is any `NaN` entry in a sample.

use crate::{StatsError, descriptive};

/// Returns true if `value` marks a missing observation.
#[must_use]
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}

/// Number of missing observations in `values`.
#[must_use]
pub fn count_missing(values: &[f64]) -> usize {
    values.iter().filter(|v| is_missing(**v)).count()
}

/// Replaces every missing value with the median of the present values.
///
/// The median is computed from the raw sample before any replacement, so the
/// result does not depend on the position of the missing entries. The order
/// of all other observations is preserved and the input is left untouched.
///
/// Applying this function to its own output returns the same sample.
///
/// # Errors
///
/// Returns [`StatsError::AllMissing`] when the sample has no present value.
/// An empty sample is returned unchanged.
///
/// # Examples
///
/// ```
/// use twogroup_stats::impute::median_fill;
///
/// let raw = [4.0, f64::NAN, 1.0, f64::NAN, 2.0, 3.0];
/// let filled = median_fill(&raw).unwrap();
/// assert_eq!(filled, vec![4.0, 2.5, 1.0, 2.5, 2.0, 3.0]);
/// assert_eq!(median_fill(&filled).unwrap(), filled);
/// ```
pub fn median_fill(values: &[f64]) -> Result<Vec<f64>, StatsError> {
    if values.is_empty() || count_missing(values) == 0 {
        return Ok(values.to_vec());
    }

    let present = values
        .iter()
        .copied()
        .filter(|v| !is_missing(*v))
        .collect::<Vec<_>>();
    let median = descriptive::median(&present).ok_or(StatsError::AllMissing)?;
    tracing::debug!(
        missing = values.len() - present.len(),
        median,
        "imputing missing values with the sample median"
    );

    Ok(values
        .iter()
        .map(|&v| if is_missing(v) { median } else { v })
        .collect())
}
