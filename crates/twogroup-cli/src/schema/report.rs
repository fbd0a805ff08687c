use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use twogroup_analysis::{comparison::ParameterComparison, selector::SelectionThresholds};

/// Result file of the `compare` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Timestamp when the report was created (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    /// Significance levels of the precondition checks
    pub thresholds: SelectionThresholds,
    /// Whether missing values were replaced by their group median
    pub imputed: bool,
    /// One entry per compared parameter, in dataset order
    pub comparisons: Vec<ParameterComparison>,
}

impl ComparisonReport {
    pub fn new(
        thresholds: SelectionThresholds,
        imputed: bool,
        comparisons: Vec<ParameterComparison>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            thresholds,
            imputed,
            comparisons,
        }
    }

    /// Number of comparisons that did not produce a test outcome.
    pub fn failed_count(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.outcome().is_none())
            .count()
    }
}
