//! Two-sided tests for a difference in location between two independent samples.
//!
//! - [`student_t`]: pooled-variance t-test, assumes normal data with equal variances
//! - [`welch_t`]: unequal-variance t-test with Welch-Satterthwaite degrees of freedom
//! - [`mann_whitney_u`]: rank-based test, no distributional assumption
//!
//! All results are unrounded.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::{StatsError, descriptive, ensure_finite, ensure_len, rank::Ranking};

const STUDENT: &str = "Student's t-test";
const WELCH: &str = "Welch's t-test";
const MANN_WHITNEY: &str = "Mann-Whitney U test";

/// Samples at or below this size (with no ties) get an exact Mann-Whitney p-value.
pub const MANN_WHITNEY_EXACT_MAX_SIZE: usize = 8;

/// Result of a two-sample location test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationTest {
    /// The test statistic: `t` for the t-tests, `U` of the first sample for Mann-Whitney.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Degrees of freedom of the t distribution, if any.
    pub df: Option<f64>,
}

/// How the Mann-Whitney p-value is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MannWhitneyMethod {
    /// Exact null distribution of `U`.
    #[display("exact")]
    Exact,
    /// Normal approximation with tie and continuity corrections.
    #[display("asymptotic")]
    Asymptotic,
}

struct Moments {
    n: f64,
    mean: f64,
    variance: f64,
}

#[expect(clippy::cast_precision_loss)]
fn moments(test: &'static str, values: &[f64]) -> Result<Moments, StatsError> {
    ensure_len(test, values, 2)?;
    ensure_finite(test, values)?;
    let mean = descriptive::mean(values).unwrap_or_default();
    let variance = descriptive::sample_variance(values).unwrap_or_default();
    Ok(Moments {
        n: values.len() as f64,
        mean,
        variance,
    })
}

fn two_sided_t(test: &'static str, t: f64, df: f64) -> Result<f64, StatsError> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::distribution("t", &e))?;
    let p_value = (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0);
    tracing::trace!(test, t, df, p_value, "t-test computed");
    Ok(p_value)
}

/// Student's two-sample t-test with pooled variance.
///
/// `t = (m1 - m2) / sqrt(s_p² (1/n1 + 1/n2))` with `n1 + n2 - 2` degrees of freedom.
///
/// # Errors
///
/// - a sample with fewer than 2 observations
/// - a missing or non-finite observation
/// - zero pooled variance
///
/// # Examples
///
/// ```
/// use twogroup_stats::location::student_t;
///
/// let a = [5.1, 4.9, 5.2, 5.0, 4.8];
/// let b = [7.1, 6.9, 7.2, 7.0, 6.8];
/// let result = student_t(&a, &b).unwrap();
/// assert!(result.statistic < 0.0);
/// assert!(result.p_value < 0.001);
/// assert_eq!(result.df, Some(8.0));
/// ```
pub fn student_t(a: &[f64], b: &[f64]) -> Result<LocationTest, StatsError> {
    let (x, y) = (moments(STUDENT, a)?, moments(STUDENT, b)?);
    let df = x.n + y.n - 2.0;
    let pooled = ((x.n - 1.0) * x.variance + (y.n - 1.0) * y.variance) / df;
    let se = (pooled * (1.0 / x.n + 1.0 / y.n)).sqrt();
    if se <= 0.0 {
        return Err(StatsError::ZeroVariance { test: STUDENT });
    }
    let statistic = (x.mean - y.mean) / se;
    let p_value = two_sided_t(STUDENT, statistic, df)?;
    Ok(LocationTest {
        statistic,
        p_value,
        df: Some(df),
    })
}

/// Welch's two-sample t-test for unequal variances.
///
/// # Errors
///
/// - a sample with fewer than 2 observations
/// - a missing or non-finite observation
/// - both samples without spread
///
/// # Examples
///
/// ```
/// use twogroup_stats::location::welch_t;
///
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let b = [-10.0, 20.0, -5.0, 30.0, 0.0, 12.0];
/// let result = welch_t(&a, &b).unwrap();
/// let df = result.df.unwrap();
/// assert!(df > 4.0 && df < 9.0);
/// ```
pub fn welch_t(a: &[f64], b: &[f64]) -> Result<LocationTest, StatsError> {
    let (x, y) = (moments(WELCH, a)?, moments(WELCH, b)?);
    let vx = x.variance / x.n;
    let vy = y.variance / y.n;
    let se_sq = vx + vy;
    if se_sq <= 0.0 {
        return Err(StatsError::ZeroVariance { test: WELCH });
    }
    let statistic = (x.mean - y.mean) / se_sq.sqrt();
    let df = se_sq.powi(2) / (vx * vx / (x.n - 1.0) + vy * vy / (y.n - 1.0));
    let p_value = two_sided_t(WELCH, statistic, df)?;
    Ok(LocationTest {
        statistic,
        p_value,
        df: Some(df),
    })
}

/// Chooses how the Mann-Whitney p-value is computed.
///
/// The exact distribution is used when there are no ties and at least one
/// sample has at most [`MANN_WHITNEY_EXACT_MAX_SIZE`] observations.
#[must_use]
pub fn mann_whitney_method(n1: usize, n2: usize, has_ties: bool) -> MannWhitneyMethod {
    if has_ties || n1.min(n2) > MANN_WHITNEY_EXACT_MAX_SIZE {
        MannWhitneyMethod::Asymptotic
    } else {
        MannWhitneyMethod::Exact
    }
}

/// Two-sided Mann-Whitney U test.
///
/// The statistic is `U1 = R1 - n1 (n1 + 1) / 2`, where `R1` is the rank sum
/// of the first sample (average ranks for ties).
///
/// # Errors
///
/// - an empty sample
/// - a missing or non-finite observation
/// - every observation tied (the normal approximation is undefined)
///
/// # Examples
///
/// ```
/// use twogroup_stats::location::mann_whitney_u;
///
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let b = [6.0, 7.0, 8.0, 9.0, 10.0];
/// let result = mann_whitney_u(&a, &b).unwrap();
/// assert_eq!(result.statistic, 0.0);
/// // 2 of the C(10, 5) = 252 arrangements are at least this extreme
/// assert!((result.p_value - 2.0 / 252.0).abs() < 1e-12);
/// ```
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<LocationTest, StatsError> {
    ensure_len(MANN_WHITNEY, a, 1)?;
    ensure_len(MANN_WHITNEY, b, 1)?;
    ensure_finite(MANN_WHITNEY, a)?;
    ensure_finite(MANN_WHITNEY, b)?;

    let (n1, n2) = (a.len(), b.len());
    let combined = a.iter().chain(b).copied().collect::<Vec<_>>();
    let ranking = Ranking::new(&combined);
    let r1 = ranking.ranks[..n1].iter().sum::<f64>();

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u = u1.max(u2);

    let method = mann_whitney_method(n1, n2, ranking.has_ties());
    let p_value = match method {
        MannWhitneyMethod::Exact => 2.0 * exact_u_sf(u.round() as usize, n1, n2),
        MannWhitneyMethod::Asymptotic => {
            let n = n1f + n2f;
            let variance =
                n1f * n2f / 12.0 * ((n + 1.0) - ranking.tie_term() / (n * (n - 1.0)));
            if variance.is_nan() || variance <= 0.0 {
                return Err(StatsError::ZeroVariance { test: MANN_WHITNEY });
            }
            let z = (u - n1f * n2f / 2.0 - 0.5) / variance.sqrt();
            let normal =
                Normal::new(0.0, 1.0).map_err(|e| StatsError::distribution("normal", &e))?;
            2.0 * normal.sf(z)
        }
    }
    .clamp(0.0, 1.0);

    tracing::trace!(u1, %method, p_value, "mann-whitney computed");
    Ok(LocationTest {
        statistic: u1,
        p_value,
        df: None,
    })
}

/// `P(U ≥ u)` under the null hypothesis for sample sizes `n1` and `n2`.
///
/// The frequencies of `U` are the coefficients of the Gaussian binomial
/// `[n1 + n2 choose m]_q = Π_{i=1..m} (1 - q^(n + i)) / (1 - q^i)` with
/// `m = min(n1, n2)` and `n = max(n1, n2)`. Coefficients above the maximum
/// `U = m n` are dropped; they never feed back into lower ones.
fn exact_u_sf(u: usize, n1: usize, n2: usize) -> f64 {
    let (m, n) = (n1.min(n2), n1.max(n2));
    let len = m * n + 1;
    if u >= len {
        return 0.0;
    }

    let mut counts = vec![0.0_f64; len];
    counts[0] = 1.0;
    for i in 1..=m {
        let shift = n + i;
        for k in (shift..len).rev() {
            counts[k] -= counts[k - shift];
        }
        for k in i..len {
            counts[k] += counts[k - i];
        }
    }

    let total = counts.iter().sum::<f64>();
    let tail = counts[u..].iter().sum::<f64>();
    tail / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_known_value() {
        let a = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0];
        let b = a.map(|v| v + 10.0);
        let result = student_t(&a, &b).unwrap();
        assert!((result.statistic - -14.205_696).abs() < 1e-5);
        assert!(result.p_value < 1e-8);
        assert_eq!(result.df, Some(14.0));
    }

    #[test]
    fn test_student_equals_welch_for_equal_sizes_and_variances() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 3.0, 4.0, 5.0];
        let s = student_t(&a, &b).unwrap();
        let w = welch_t(&a, &b).unwrap();
        assert!((s.statistic - w.statistic).abs() < 1e-12);
        assert!((s.p_value - w.p_value).abs() < 1e-9);
    }

    #[test]
    fn test_identical_samples_have_p_one() {
        let a = [1.0, 2.0, 3.0];
        assert!((student_t(&a, &a).unwrap().p_value - 1.0).abs() < 1e-12);
        assert!((welch_t(&a, &a).unwrap().p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_t_tests_reject_degenerate_input() {
        assert_eq!(
            student_t(&[1.0, 1.0], &[2.0, 2.0]),
            Err(StatsError::ZeroVariance { test: STUDENT })
        );
        assert_eq!(
            welch_t(&[1.0, 1.0], &[2.0, 2.0]),
            Err(StatsError::ZeroVariance { test: WELCH })
        );
        assert!(matches!(
            student_t(&[1.0], &[2.0, 3.0]),
            Err(StatsError::TooFewObservations { .. })
        ));
    }

    #[test]
    fn test_exact_u_distribution() {
        // n1 = n2 = 2: U takes 0, 1, 2, 2, 3, 4 over the 6 arrangements
        assert!((exact_u_sf(4, 2, 2) - 1.0 / 6.0).abs() < 1e-12);
        assert!((exact_u_sf(2, 2, 2) - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(exact_u_sf(0, 2, 2), 1.0);
        assert_eq!(exact_u_sf(5, 2, 2), 0.0);
        // One observation against five: U is uniform on 0..=5
        assert!((exact_u_sf(5, 1, 5) - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_mann_whitney_statistic_is_first_sample_u() {
        let result = mann_whitney_u(&[6.0, 7.0, 8.0], &[1.0, 2.0]).unwrap();
        assert_eq!(result.statistic, 6.0);
        assert_eq!(result.df, None);
    }

    #[test]
    fn test_mann_whitney_asymptotic() {
        let a = (1..=10).map(f64::from).collect::<Vec<_>>();
        let b = (11..=20).map(f64::from).collect::<Vec<_>>();
        assert_eq!(
            mann_whitney_method(a.len(), b.len(), false),
            MannWhitneyMethod::Asymptotic
        );
        let result = mann_whitney_u(&a, &b).unwrap();
        assert_eq!(result.statistic, 0.0);
        // z = (100 - 50 - 0.5) / sqrt(175)
        assert!((result.p_value - 1.826e-4).abs() < 5e-6);
    }

    #[test]
    fn test_mann_whitney_ties_force_asymptotic() {
        assert_eq!(mann_whitney_method(3, 3, true), MannWhitneyMethod::Asymptotic);
        let result = mann_whitney_u(&[1.0, 2.0, 2.0], &[2.0, 3.0, 4.0]).unwrap();
        assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_mann_whitney_p_value_is_capped() {
        let result = mann_whitney_u(&[1.0, 4.0], &[2.0, 3.0]).unwrap();
        assert_eq!(result.statistic, 2.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_mann_whitney_all_tied() {
        assert_eq!(
            mann_whitney_u(&[1.0, 1.0], &[1.0, 1.0, 1.0]),
            Err(StatsError::ZeroVariance { test: MANN_WHITNEY })
        );
    }
}
