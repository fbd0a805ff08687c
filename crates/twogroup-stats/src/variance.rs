//! Variance-equality check.
//!
//! Levene's test with every group centred on its median (the Brown-Forsythe
//! variant).

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::{StatsError, descriptive, ensure_finite, ensure_len, round_reported};

const TEST_NAME: &str = "Levene's test";

/// Result of the median-centred Levene test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceTest {
    /// The W statistic, F-distributed under equal variances.
    pub statistic: f64,
    /// Unrounded p-value.
    pub p_value: f64,
}

/// Median-centred Levene test over any number of groups.
///
/// # Algorithm
///
/// 1. `z_ij = |x_ij - median_i|`
/// 2. `W = (N - k) / (k - 1) * Σ n_i (z̄_i - z̄)² / Σ Σ (z_ij - z̄_i)²`
/// 3. `p = P(F(k - 1, N - k) ≥ W)`
///
/// # Errors
///
/// - fewer than two groups, or a group with fewer than 2 observations
/// - a missing or non-finite observation
/// - every observation equals its group median (`W` is undefined)
///
/// # Examples
///
/// ```
/// use twogroup_stats::variance::levene_median;
///
/// let tight = [4.9, 5.0, 5.0, 5.1, 5.0];
/// let wide = [0.0, 3.0, 5.0, 7.0, 10.0];
/// let result = levene_median(&[&tight, &wide]).unwrap();
/// assert!(result.p_value < 0.05);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn levene_median(groups: &[&[f64]]) -> Result<VarianceTest, StatsError> {
    if groups.len() < 2 {
        return Err(StatsError::TooFewObservations {
            test: TEST_NAME,
            required: 2,
            actual: groups.len(),
        });
    }
    for group in groups {
        ensure_len(TEST_NAME, group, 2)?;
        ensure_finite(TEST_NAME, group)?;
    }

    let deviations = groups
        .iter()
        .map(|group| {
            let center = descriptive::median(group).unwrap_or_default();
            group.iter().map(|x| (x - center).abs()).collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let group_means = deviations
        .iter()
        .map(|z| descriptive::mean(z).unwrap_or_default())
        .collect::<Vec<_>>();

    let k = groups.len() as f64;
    let total = deviations.iter().map(Vec::len).sum::<usize>() as f64;
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total;

    let between = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, m)| z.len() as f64 * (m - grand_mean).powi(2))
        .sum::<f64>();
    let within = deviations
        .iter()
        .zip(&group_means)
        .flat_map(|(z, m)| z.iter().map(move |v| (v - m).powi(2)))
        .sum::<f64>();
    if within <= 0.0 {
        return Err(StatsError::ZeroVariance { test: TEST_NAME });
    }

    let df_between = k - 1.0;
    let df_within = total - k;
    let statistic = (df_within / df_between) * (between / within);
    let f = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| StatsError::distribution("F", &e))?;
    let p_value = f.sf(statistic).clamp(0.0, 1.0);

    tracing::trace!(statistic, p_value, "levene (median) computed");
    Ok(VarianceTest { statistic, p_value })
}

/// Variance-equality p-value of two samples, rounded to 3 decimals.
///
/// Samples may differ in length.
///
/// ```
/// use twogroup_stats::variance::var_chk;
///
/// let a = [1.0, 2.0, 3.0, 4.0];
/// let b = [11.0, 12.0, 13.0, 14.0, 12.5];
/// let p = var_chk(&a, &b).unwrap();
/// assert!((0.0..=1.0).contains(&p));
/// ```
pub fn var_chk(a: &[f64], b: &[f64]) -> Result<f64, StatsError> {
    levene_median(&[a, b]).map(|result| round_reported(result.p_value))
}
