use std::ops::Range;

/// Default number of bins, matching the usual plotting default.
pub const DEFAULT_NUM_BINS: usize = 10;

/// A histogram representation of a sample's distribution.
///
/// The data range `[min, max]` is divided into bins of equal width. Every bin
/// is half-open except the last one, which also includes `max`.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone)]
pub struct HistogramBin {
    /// The range of values covered by this bin.
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates an equal-width histogram from unsorted values.
    ///
    /// Non-finite values are ignored. When every value is identical the bins
    /// span `value - 0.5 .. value + 0.5`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use twogroup_stats::histogram::Histogram;
    /// let values = [1.0, 2.0, 2.0, 3.0, 4.0];
    /// let histogram = Histogram::new(values, 3);
    /// let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
    /// assert_eq!(counts, vec![1, 2, 2]);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if values.is_empty() || num_bins == 0 {
            return Self { bins: vec![] };
        }

        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max - min < f64::EPSILON {
            min -= 0.5;
            max += 0.5;
        }
        let width = (max - min) / num_bins as f64;

        // Recompute edges from the bin index to avoid accumulating rounding error
        let edge = |idx: usize| -> f64 {
            if idx == num_bins {
                max
            } else {
                min + width * idx as f64
            }
        };
        let mut bins = (0..num_bins)
            .map(|idx| HistogramBin {
                range: edge(idx)..edge(idx + 1),
                count: 0,
            })
            .collect::<Vec<_>>();

        for val in values {
            let idx = (((val - min) / width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Largest bin count, or 0 for an empty histogram.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_histogram() {
        assert!(Histogram::new([], 10).bins.is_empty());
        assert!(Histogram::new([1.0], 0).bins.is_empty());
        assert_eq!(Histogram::new([], 10).max_count(), 0);
    }

    #[test]
    fn test_maximum_lands_in_last_bin() {
        let histogram = Histogram::new([0.0, 10.0], DEFAULT_NUM_BINS);
        assert_eq!(histogram.bins.len(), 10);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[9].count, 1);
        assert_eq!(histogram.bins[9].range.end, 10.0);
    }

    #[test]
    fn test_constant_sample_gets_unit_range() {
        let histogram = Histogram::new([3.0, 3.0, 3.0], 2);
        assert_eq!(histogram.bins[0].range.start, 2.5);
        assert_eq!(histogram.bins[1].range.end, 3.5);
        assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 3);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let histogram = Histogram::new([1.0, f64::NAN, 2.0], 2);
        assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 2);
    }
}
