//! Average ranks for rank-based tests.

/// Ranks of a set of observations, with ties resolved to their average rank.
#[derive(Debug, Clone)]
pub struct Ranking {
    /// 1-based rank of each observation, in input order.
    pub ranks: Vec<f64>,
    /// Sizes of every group of tied values (groups of one are omitted).
    pub tie_groups: Vec<usize>,
}

impl Ranking {
    /// Ranks `values` in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use twogroup_stats::rank::Ranking;
    /// let ranking = Ranking::new(&[10.0, 20.0, 10.0, 30.0]);
    /// assert_eq!(ranking.ranks, vec![1.5, 3.0, 1.5, 4.0]);
    /// assert_eq!(ranking.tie_groups, vec![2]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(values: &[f64]) -> Self {
        let mut order = (0..values.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        let mut ranks = vec![0.0; values.len()];
        let mut tie_groups = vec![];
        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && values[order[end]] == values[order[start]] {
                end += 1;
            }
            // Positions start..end share the average of ranks start+1..=end
            let avg_rank = (start + 1 + end) as f64 / 2.0;
            for &idx in &order[start..end] {
                ranks[idx] = avg_rank;
            }
            if end - start > 1 {
                tie_groups.push(end - start);
            }
            start = end;
        }

        Self { ranks, tie_groups }
    }

    /// Whether any two observations share a value.
    #[must_use]
    pub fn has_ties(&self) -> bool {
        !self.tie_groups.is_empty()
    }

    /// Tie term `Σ (t³ - t)` over all tie groups.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn tie_term(&self) -> f64 {
        self.tie_groups
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }
}
