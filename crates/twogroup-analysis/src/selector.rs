//! Automatic selection of a two-sample location test.
//!
//! The selector checks the preconditions of the t-tests and dispatches to the
//! test they allow:
//!
//! | both samples normal | equal variances | test |
//! |---|---|---|
//! | yes | yes | Student's t-test |
//! | yes | no | Welch's t-test |
//! | no | either | Mann–Whitney test |
//!
//! Rows are checked top to bottom. Normality is therefore decided first: a
//! pair of non-normal samples goes to Mann–Whitney whatever the outcome of the
//! variance check.
//!
//! # Examples
//!
//! ```
//! use twogroup_analysis::selector::{TestKind, t_test};
//!
//! let healthy = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0];
//! let diseased = [20.0, 22.0, 21.0, 23.0, 22.0, 21.0, 20.0, 24.0];
//!
//! let outcome = t_test(&healthy, &diseased, "weight").unwrap();
//! assert_eq!(outcome.test, TestKind::Student);
//! assert_eq!(outcome.test.to_string(), "Student's t-test");
//! assert_eq!(outcome.p_value, 0.0);
//! assert_eq!(outcome.statistic, -14.206);
//! ```

use serde::{Deserialize, Serialize};
use twogroup_stats::{StatsError, location, normality, round_reported, variance};

/// Significance level used by both precondition checks unless configured otherwise.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// The location test chosen for a pair of samples.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum TestKind {
    /// Two-sided Student's t-test with pooled variance.
    #[display("Student's t-test")]
    #[serde(rename = "Student's t-test")]
    Student,
    /// Two-sided Welch's t-test.
    #[display("Welch's t-test")]
    #[serde(rename = "Welch's t-test")]
    Welch,
    /// Two-sided Mann–Whitney U test.
    #[display("Mann–Whitney test")]
    #[serde(rename = "Mann–Whitney test")]
    MannWhitney,
}

/// Significance levels of the precondition checks.
///
/// A check passes when its p-value is greater than or equal to its level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionThresholds {
    /// Level of the normality check, applied to each sample.
    pub normality: f64,
    /// Level of the variance-equality check.
    pub variance: f64,
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self {
            normality: DEFAULT_ALPHA,
            variance: DEFAULT_ALPHA,
        }
    }
}

/// Result of comparing two samples with the selected test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test statistic, rounded to 3 decimals.
    pub statistic: f64,
    /// Two-sided p-value, rounded to 3 decimals.
    pub p_value: f64,
    /// The test that produced `statistic` and `p_value`.
    pub test: TestKind,
    /// Normality p-value of the first sample.
    pub normality_p1: f64,
    /// Normality p-value of the second sample.
    pub normality_p2: f64,
    /// Variance-equality p-value of the pair.
    pub variance_p: f64,
}

/// Applies the decision table to precondition p-values.
///
/// # Examples
///
/// ```
/// use twogroup_analysis::selector::{SelectionThresholds, TestKind, select_test};
///
/// let thresholds = SelectionThresholds::default();
/// assert_eq!(select_test(0.2, 0.2, 0.3, thresholds), TestKind::Student);
/// assert_eq!(select_test(0.2, 0.2, 0.01, thresholds), TestKind::Welch);
/// assert_eq!(select_test(0.2, 0.04, 0.01, thresholds), TestKind::MannWhitney);
/// ```
#[must_use]
pub fn select_test(
    normality_p1: f64,
    normality_p2: f64,
    variance_p: f64,
    thresholds: SelectionThresholds,
) -> TestKind {
    let normal = normality_p1 >= thresholds.normality && normality_p2 >= thresholds.normality;
    let equal_variance = variance_p >= thresholds.variance;
    match (normal, equal_variance) {
        (true, true) => TestKind::Student,
        (true, false) => TestKind::Welch,
        (false, _) => TestKind::MannWhitney,
    }
}

/// Checks the preconditions of two samples and runs the test they allow.
///
/// `parameter` names the measured quantity; it only labels diagnostics.
///
/// # Errors
///
/// Any [`StatsError`] raised by the normality check, the variance check or
/// the selected test is returned unchanged. There is no fallback test.
pub fn compare_samples(
    a: &[f64],
    b: &[f64],
    parameter: &str,
    thresholds: SelectionThresholds,
) -> Result<TestOutcome, StatsError> {
    let normality_p1 = normality::norm_chk(a)?;
    let normality_p2 = normality::norm_chk(b)?;
    let variance_p = variance::var_chk(a, b)?;

    let test = select_test(normality_p1, normality_p2, variance_p, thresholds);
    tracing::debug!(
        parameter,
        normality_p1,
        normality_p2,
        variance_p,
        %test,
        "selected location test"
    );

    let result = match test {
        TestKind::Student => location::student_t(a, b)?,
        TestKind::Welch => location::welch_t(a, b)?,
        TestKind::MannWhitney => location::mann_whitney_u(a, b)?,
    };

    Ok(TestOutcome {
        statistic: round_reported(result.statistic),
        p_value: round_reported(result.p_value),
        test,
        normality_p1,
        normality_p2,
        variance_p,
    })
}

/// [`compare_samples`] with the default 0.05 thresholds.
pub fn t_test(a: &[f64], b: &[f64], parameter: &str) -> Result<TestOutcome, StatsError> {
    compare_samples(a, b, parameter, SelectionThresholds::default())
}

#[cfg(test)]
mod tests {
    use statrs::distribution::{ContinuousCDF as _, Normal};

    use super::*;

    #[expect(clippy::cast_precision_loss)]
    fn quantile_sample<F>(n: usize, quantile: F) -> Vec<f64>
    where
        F: Fn(f64) -> f64,
    {
        (1..=n)
            .map(|i| quantile((i as f64 - 0.5) / n as f64))
            .collect()
    }

    fn normal_sample(n: usize, mean: f64, std_dev: f64) -> Vec<f64> {
        let normal = Normal::new(mean, std_dev).unwrap();
        quantile_sample(n, |p| normal.inverse_cdf(p))
    }

    fn exponential_sample(n: usize, shift: f64, scale: f64) -> Vec<f64> {
        quantile_sample(n, |p| shift - scale * (1.0 - p).ln())
    }

    fn assert_rounded(value: f64) {
        assert!(
            ((value * 1000.0).round() / 1000.0 - value).abs() < 1e-12,
            "{value} is not rounded to 3 decimals"
        );
    }

    #[test]
    fn test_decision_table() {
        let t = SelectionThresholds::default();
        assert_eq!(select_test(0.05, 0.05, 0.05, t), TestKind::Student);
        assert_eq!(select_test(0.5, 0.5, 0.049, t), TestKind::Welch);
        assert_eq!(select_test(0.049, 0.5, 0.9, t), TestKind::MannWhitney);
        assert_eq!(select_test(0.5, 0.049, 0.9, t), TestKind::MannWhitney);
    }

    #[test]
    fn test_non_normal_with_unequal_variance_goes_to_mann_whitney() {
        let t = SelectionThresholds::default();
        assert_eq!(select_test(0.01, 0.2, 0.001, t), TestKind::MannWhitney);
        assert_eq!(select_test(0.049, 0.049, 0.0, t), TestKind::MannWhitney);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = SelectionThresholds {
            normality: 0.1,
            variance: 0.2,
        };
        assert_eq!(select_test(0.08, 0.5, 0.5, strict), TestKind::MannWhitney);
        assert_eq!(select_test(0.5, 0.5, 0.15, strict), TestKind::Welch);
    }

    #[test]
    fn test_reference_scenario() {
        let a = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0];
        let b = [20.0, 22.0, 21.0, 23.0, 22.0, 21.0, 20.0, 24.0];
        let outcome = t_test(&a, &b, "weight").unwrap();
        assert_eq!(outcome.test, TestKind::Student);
        assert_eq!(outcome.p_value, 0.0);
        assert!(outcome.normality_p1 >= 0.05);
        assert!(outcome.normality_p2 >= 0.05);
        assert_eq!(outcome.variance_p, 1.0);
    }

    #[test]
    fn test_equal_variance_normal_samples_use_student() {
        let a = normal_sample(40, 100.0, 15.0);
        let b = normal_sample(40, 110.0, 15.0);
        let outcome = t_test(&a, &b, "iq").unwrap();
        assert_eq!(outcome.test, TestKind::Student);
        assert!(outcome.p_value < 0.05);
    }

    #[test]
    fn test_tenfold_spread_uses_welch() {
        let a = normal_sample(30, 5.0, 1.0);
        let b = normal_sample(30, 5.0, 10.0);
        let outcome = t_test(&a, &b, "height").unwrap();
        assert_eq!(outcome.test, TestKind::Welch);
        assert_eq!(outcome.test.to_string(), "Welch's t-test");
        assert!(outcome.variance_p < 0.05);
    }

    #[test]
    fn test_skewed_sample_uses_mann_whitney_with_equal_variance() {
        let a = exponential_sample(100, 0.0, 1.0);
        let b = exponential_sample(100, 0.5, 1.0);
        let outcome = t_test(&a, &b, "latency").unwrap();
        assert_eq!(outcome.variance_p, 1.0);
        assert_eq!(outcome.test, TestKind::MannWhitney);
        assert_eq!(outcome.test.to_string(), "Mann–Whitney test");
    }

    #[test]
    fn test_skewed_sample_uses_mann_whitney_with_unequal_variance() {
        let a = exponential_sample(100, 0.0, 1.0);
        let b = normal_sample(100, 1.0, 10.0);
        let outcome = t_test(&a, &b, "latency").unwrap();
        assert!(outcome.normality_p1 < 0.05);
        assert!(outcome.variance_p < 0.05);
        assert_eq!(outcome.test, TestKind::MannWhitney);
    }

    #[test]
    fn test_outcome_values_are_rounded() {
        let a = normal_sample(25, 3.14159, 1.234);
        let b = exponential_sample(20, 2.71828, 0.777);
        for (x, y) in [(&a, &b), (&b, &a), (&a, &a)] {
            let outcome = t_test(x, y, "mixed").unwrap();
            assert_rounded(outcome.statistic);
            assert_rounded(outcome.p_value);
            assert_rounded(outcome.normality_p1);
            assert_rounded(outcome.normality_p2);
            assert_rounded(outcome.variance_p);
            for p in [outcome.p_value, outcome.normality_p1, outcome.variance_p] {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_errors_propagate() {
        let err = t_test(&[1.0, 2.0, f64::NAN, 4.0], &[1.0, 2.0, 3.0, 4.0], "x").unwrap_err();
        assert!(matches!(err, StatsError::NonFiniteValue { .. }));
        let err = t_test(&[1.0; 5], &[1.0, 2.0, 3.0, 4.0], "x").unwrap_err();
        assert!(matches!(err, StatsError::ZeroVariance { .. }));
    }

    #[test]
    fn test_outcome_serializes_with_labels() {
        let outcome = TestOutcome {
            statistic: 1.5,
            p_value: 0.134,
            test: TestKind::MannWhitney,
            normality_p1: 0.01,
            normality_p2: 0.2,
            variance_p: 0.7,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["test"], "Mann–Whitney test");
        let back: TestOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }
}
