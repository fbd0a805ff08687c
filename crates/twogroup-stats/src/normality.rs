//! Normality check.
//!
//! Lilliefors test: the Kolmogorov-Smirnov distance between the standardised
//! sample and the standard normal distribution, with mean and standard
//! deviation estimated from the sample itself.
//!
//! # P-values
//!
//! The p-value is approximated with the Dallal-Wilkinson (1986) formula. The
//! formula is only accurate in the lower tail, so whenever it yields more than
//! `0.1` the p-value is interpolated from the Lilliefors critical-value table
//! instead. Table lookups saturate at `0.2` (data compatible with normality)
//! and `0.001`.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::{StatsError, descriptive::DescriptiveStats, ensure_finite, ensure_len, round_reported};

const TEST_NAME: &str = "Lilliefors test";

/// Sample size below which the p-value is considered unreliable.
pub const MIN_RELIABLE_SIZE: usize = 4;

/// Upper bound of p-values returned by the Dallal-Wilkinson approximation.
const APPROX_MAX_P: f64 = 0.1;

/// Significance levels of the critical-value table columns.
const TABLE_ALPHA: [f64; 6] = [0.2, 0.15, 0.1, 0.05, 0.01, 0.001];

/// Sample sizes of the critical-value table rows.
const TABLE_SIZES: [f64; 23] = [
    4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0,
    20.0, 25.0, 30.0, 40.0, 100.0, 400.0, 900.0,
];

/// Critical values (x1000) per sample size and significance level.
const TABLE_CRITICAL: [[u16; 6]; 23] = [
    [303, 321, 346, 376, 413, 433],
    [289, 303, 319, 343, 397, 439],
    [269, 281, 297, 323, 371, 424],
    [252, 264, 280, 304, 351, 412],
    [239, 250, 265, 288, 333, 384],
    [227, 238, 252, 274, 317, 365],
    [217, 228, 241, 262, 304, 352],
    [208, 218, 231, 251, 291, 338],
    [200, 210, 222, 242, 281, 325],
    [193, 202, 215, 234, 271, 314],
    [187, 196, 208, 226, 262, 305],
    [181, 190, 201, 219, 254, 296],
    [176, 184, 195, 213, 247, 287],
    [171, 179, 190, 207, 240, 279],
    [167, 175, 185, 202, 234, 273],
    [163, 170, 181, 197, 228, 266],
    [159, 166, 176, 192, 223, 260],
    [143, 150, 159, 173, 201, 236],
    [131, 138, 146, 159, 185, 217],
    [115, 120, 128, 139, 162, 189],
    [74, 77, 82, 89, 104, 122],
    [37, 39, 41, 45, 52, 61],
    [25, 26, 28, 30, 35, 42],
];

/// Result of the Lilliefors normality test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityTest {
    /// Kolmogorov-Smirnov distance `D`.
    pub statistic: f64,
    /// Unrounded p-value.
    pub p_value: f64,
}

/// Lilliefors test for normality.
///
/// # Errors
///
/// - fewer than 2 observations
/// - a missing or non-finite observation
/// - zero sample standard deviation
///
/// # Examples
///
/// ```
/// use twogroup_stats::normality::lilliefors;
///
/// let sample = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0];
/// let result = lilliefors(&sample).unwrap();
/// assert!(result.statistic > 0.0 && result.statistic < 0.2);
/// assert_eq!(result.p_value, 0.2);
/// ```
pub fn lilliefors(values: &[f64]) -> Result<NormalityTest, StatsError> {
    ensure_len(TEST_NAME, values, 2)?;
    ensure_finite(TEST_NAME, values)?;
    if values.len() < MIN_RELIABLE_SIZE {
        tracing::warn!(
            n = values.len(),
            "normality p-value is unreliable for fewer than {MIN_RELIABLE_SIZE} observations"
        );
    }

    let stats = DescriptiveStats::new(values.iter().copied()).ok_or(
        StatsError::TooFewObservations {
            test: TEST_NAME,
            required: 2,
            actual: 0,
        },
    )?;
    if stats.std_dev <= 0.0 {
        return Err(StatsError::ZeroVariance { test: TEST_NAME });
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| StatsError::distribution("normal", &e))?;
    let mut standardized = values
        .iter()
        .map(|x| (x - stats.mean) / stats.std_dev)
        .collect::<Vec<_>>();
    standardized.sort_by(f64::total_cmp);
    let statistic = ks_distance(&standardized, |z| normal.cdf(z));

    let n = values.len();
    let approx = dallal_wilkinson(statistic, n);
    let p_value = if approx > APPROX_MAX_P {
        table_p_value(statistic, n)
    } else {
        approx
    }
    .clamp(0.0, 1.0);

    tracing::trace!(n, statistic, p_value, "lilliefors computed");
    Ok(NormalityTest { statistic, p_value })
}

/// Normality p-value of a sample, rounded to 3 decimals.
///
/// ```
/// use twogroup_stats::normality::norm_chk;
///
/// // Strongly right-skewed
/// let skewed = (1..=60).map(|i| f64::from(i).powi(4)).collect::<Vec<_>>();
/// assert!(norm_chk(&skewed).unwrap() < 0.05);
/// ```
pub fn norm_chk(values: &[f64]) -> Result<f64, StatsError> {
    lilliefors(values).map(|result| round_reported(result.p_value))
}

/// A point of a normal Q-Q plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QqPoint {
    /// Standard normal quantile at the plotting position.
    pub theoretical: f64,
    /// Standardised sample value.
    pub sample: f64,
}

/// Normal Q-Q points of a sample with fitted location and scale.
///
/// The sorted sample is standardised by its mean and population standard
/// deviation and paired with the standard normal quantiles at plotting
/// positions `i / (n + 1)`. A normal sample lies close to the line `y = x`.
///
/// # Errors
///
/// - an empty sample
/// - a missing or non-finite observation
/// - zero standard deviation
///
/// # Examples
///
/// ```
/// use twogroup_stats::normality::qq_points;
///
/// let points = qq_points(&[3.0, 1.0, 2.0]).unwrap();
/// assert_eq!(points.len(), 3);
/// assert!(points[1].theoretical.abs() < 1e-12);
/// assert_eq!(points[1].sample, 0.0);
/// assert!(points[0].sample < 0.0 && points[0].theoretical < 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn qq_points(values: &[f64]) -> Result<Vec<QqPoint>, StatsError> {
    const PLOT_NAME: &str = "Q-Q plot";
    ensure_len(PLOT_NAME, values, 1)?;
    ensure_finite(PLOT_NAME, values)?;
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let Some(stats) = DescriptiveStats::from_sorted(&sorted) else {
        return Err(StatsError::TooFewObservations {
            test: PLOT_NAME,
            required: 1,
            actual: 0,
        });
    };
    if stats.population_std_dev <= 0.0 {
        return Err(StatsError::ZeroVariance { test: PLOT_NAME });
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| StatsError::distribution("normal", &e))?;
    let n = sorted.len() as f64;
    Ok(sorted
        .iter()
        .zip(1..)
        .map(|(x, i)| QqPoint {
            theoretical: normal.inverse_cdf(f64::from(i) / (n + 1.0)),
            sample: (x - stats.mean) / stats.population_std_dev,
        })
        .collect())
}

/// Two-sided Kolmogorov-Smirnov distance between sorted data and `cdf`.
#[expect(clippy::cast_precision_loss)]
fn ks_distance<F>(sorted: &[f64], cdf: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let fx = cdf(x);
            let d_plus = (i + 1) as f64 / n - fx;
            let d_minus = fx - i as f64 / n;
            d_plus.max(d_minus)
        })
        .fold(0.0, f64::max)
}

/// Dallal-Wilkinson approximation of the Lilliefors p-value.
#[expect(clippy::cast_precision_loss)]
fn dallal_wilkinson(statistic: f64, n: usize) -> f64 {
    let (d, n) = if n > 100 {
        (statistic * (n as f64 / 100.0).powf(0.49), 100.0)
    } else {
        (statistic, n as f64)
    };
    let shifted = n + 2.780_19;
    (-7.012_56 * d * d * shifted + 2.995_87 * d * shifted.sqrt() - 0.122_119
        + 0.974_598 / n.sqrt()
        + 1.679_97 / n)
        .exp()
}

/// Critical values for sample size `n`, one per entry of [`TABLE_ALPHA`].
#[expect(clippy::cast_precision_loss)]
fn critical_values(n: usize) -> [f64; 6] {
    let row = |idx: usize| TABLE_CRITICAL[idx].map(|c| f64::from(c) / 1000.0);
    let n = n as f64;
    let last = TABLE_SIZES.len() - 1;

    if n <= TABLE_SIZES[0] {
        return row(0);
    }
    if n >= TABLE_SIZES[last] {
        let scale = (TABLE_SIZES[last] / n).sqrt();
        return row(last).map(|c| c * scale);
    }
    let upper = TABLE_SIZES.partition_point(|&size| size < n);
    let lower = upper - 1;
    let fraction = (n - TABLE_SIZES[lower]) / (TABLE_SIZES[upper] - TABLE_SIZES[lower]);
    let (lo, hi) = (row(lower), row(upper));
    std::array::from_fn(|i| lo[i] + (hi[i] - lo[i]) * fraction)
}

/// P-value interpolated from the critical-value table.
fn table_p_value(statistic: f64, n: usize) -> f64 {
    let critical = critical_values(n);
    let last = critical.len() - 1;
    if statistic <= critical[0] {
        return TABLE_ALPHA[0];
    }
    if statistic >= critical[last] {
        return TABLE_ALPHA[last];
    }
    let upper = critical.partition_point(|&c| c < statistic);
    let lower = upper - 1;
    let fraction = (statistic - critical[lower]) / (critical[upper] - critical[lower]);
    TABLE_ALPHA[lower] + (TABLE_ALPHA[upper] - TABLE_ALPHA[lower]) * fraction
}
