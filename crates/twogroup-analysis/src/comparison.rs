//! Per-parameter comparison of two groups in a dataset.
//!
//! Every parameter is compared independently. A comparison that fails (for
//! example because a group has no spread) is recorded as failed and never
//! prevents the other parameters from being compared.

use serde::{Deserialize, Serialize};
use twogroup_stats::impute;

use crate::{
    AnalysisError,
    dataset::{Dataset, GroupPair},
    selector::{self, SelectionThresholds, TestOutcome},
};

/// Options shared by every comparison of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOptions {
    /// Significance levels of the precondition checks.
    pub thresholds: SelectionThresholds,
    /// Replace missing values with the group median before testing.
    pub impute: bool,
}

/// Outcome of one parameter comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonResult {
    Compared(TestOutcome),
    Failed { error: String },
}

/// Comparison of the two groups on a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterComparison {
    pub parameter: String,
    pub groups: GroupPair,
    /// Number of observations per group, missing ones included.
    pub sizes: [usize; 2],
    /// Number of missing observations replaced by the median per group.
    pub imputed: [usize; 2],
    pub result: ComparisonResult,
}

impl ParameterComparison {
    /// The outcome, if the comparison succeeded.
    #[must_use]
    pub fn outcome(&self) -> Option<&TestOutcome> {
        match &self.result {
            ComparisonResult::Compared(outcome) => Some(outcome),
            ComparisonResult::Failed { .. } => None,
        }
    }
}

/// Compares `groups` on one parameter.
///
/// # Examples
///
/// ```
/// use twogroup_analysis::{
///     comparison::{ComparisonOptions, compare_parameter},
///     dataset::{Dataset, GroupPair, Observation},
///     selector::TestKind,
/// };
///
/// let healthy = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0];
/// let mut observations = vec![];
/// for v in healthy {
///     observations.push(Observation::new(Some(v), "weight", "healthy"));
///     observations.push(Observation::new(Some(v + 10.0), "weight", "diseased"));
/// }
/// let dataset = Dataset::new(observations);
///
/// let groups = GroupPair::new("healthy", "diseased");
/// let comparison = compare_parameter(&dataset, "weight", &groups, &ComparisonOptions::default());
/// assert_eq!(comparison.sizes, [8, 8]);
/// assert_eq!(comparison.outcome().unwrap().test, TestKind::Student);
/// ```
#[must_use]
pub fn compare_parameter(
    dataset: &Dataset,
    parameter: &str,
    groups: &GroupPair,
    options: &ComparisonOptions,
) -> ParameterComparison {
    let [first, second] = groups.labels().map(|category| dataset.sample(parameter, category));
    let sizes = [first.len(), second.len()];
    let mut imputed = [0, 0];

    let result = prepare(&first, &second, options, &mut imputed).and_then(|(a, b)| {
        selector::compare_samples(&a, &b, parameter, options.thresholds)
            .map_err(|e| e.to_string())
    });
    let result = match result {
        Ok(outcome) => {
            tracing::info!(
                parameter,
                test = %outcome.test,
                p_value = outcome.p_value,
                "comparison done"
            );
            ComparisonResult::Compared(outcome)
        }
        Err(error) => {
            tracing::warn!(parameter, %error, "comparison failed");
            ComparisonResult::Failed { error }
        }
    };

    ParameterComparison {
        parameter: parameter.to_owned(),
        groups: groups.clone(),
        sizes,
        imputed,
        result,
    }
}

fn prepare(
    first: &[f64],
    second: &[f64],
    options: &ComparisonOptions,
    imputed: &mut [usize; 2],
) -> Result<(Vec<f64>, Vec<f64>), String> {
    if !options.impute {
        return Ok((first.to_vec(), second.to_vec()));
    }
    *imputed = [impute::count_missing(first), impute::count_missing(second)];
    let a = impute::median_fill(first).map_err(|e| e.to_string())?;
    let b = impute::median_fill(second).map_err(|e| e.to_string())?;
    Ok((a, b))
}

/// Compares `groups` on each of `parameters`, or on every parameter of the
/// dataset when `parameters` is empty.
///
/// # Errors
///
/// Returns [`AnalysisError::UnknownParameter`] if a requested parameter does
/// not occur in the dataset. Failures of individual comparisons are reported
/// in their [`ComparisonResult`] instead.
pub fn compare_all(
    dataset: &Dataset,
    parameters: &[String],
    groups: &GroupPair,
    options: &ComparisonOptions,
) -> Result<Vec<ParameterComparison>, AnalysisError> {
    let selected = dataset.select_parameters(parameters)?;
    Ok(selected
        .into_iter()
        .map(|parameter| compare_parameter(dataset, parameter, groups, options))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::Observation, selector::TestKind};

    fn dataset() -> Dataset {
        let mut observations = vec![];
        for (i, v) in [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 10.0, 14.0]
            .into_iter()
            .enumerate()
        {
            observations.push(Observation::new(Some(v), "weight", "healthy"));
            let diseased = if i == 3 { None } else { Some(v + 10.0) };
            observations.push(Observation::new(diseased, "weight", "diseased"));
            observations.push(Observation::new(Some(5.0), "flat", "healthy"));
            observations.push(Observation::new(Some(5.0), "flat", "diseased"));
        }
        Dataset::new(observations)
    }

    fn groups() -> GroupPair {
        GroupPair::new("healthy", "diseased")
    }

    #[test]
    fn test_missing_values_fail_without_imputation() {
        let comparison =
            compare_parameter(&dataset(), "weight", &groups(), &ComparisonOptions::default());
        assert_eq!(comparison.imputed, [0, 0]);
        match comparison.result {
            ComparisonResult::Failed { error } => assert!(error.contains("missing")),
            ComparisonResult::Compared(_) => panic!("expected a failure"),
        }
    }

    #[test]
    fn test_imputation_enables_comparison() {
        let options = ComparisonOptions {
            impute: true,
            ..ComparisonOptions::default()
        };
        let comparison = compare_parameter(&dataset(), "weight", &groups(), &options);
        assert_eq!(comparison.sizes, [8, 8]);
        assert_eq!(comparison.imputed, [0, 1]);
        let outcome = comparison.outcome().unwrap();
        assert_eq!(outcome.p_value, 0.0);
        assert!(outcome.normality_p1 >= 0.05);
    }

    #[test]
    fn test_failure_is_isolated_per_parameter() {
        let options = ComparisonOptions {
            impute: true,
            ..ComparisonOptions::default()
        };
        let all = compare_all(&dataset(), &[], &groups(), &options).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].parameter, "weight");
        assert!(all[0].outcome().is_some());
        assert_eq!(all[1].parameter, "flat");
        assert!(all[1].outcome().is_none());
    }

    #[test]
    fn test_parameter_selection() {
        let options = ComparisonOptions::default();
        let only = compare_all(&dataset(), &["flat".to_owned()], &groups(), &options).unwrap();
        assert_eq!(only.len(), 1);

        let err = compare_all(&dataset(), &["age".to_owned()], &groups(), &options).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownParameter { parameter } if parameter == "age"));
    }

    #[test]
    fn test_report_json_shape() {
        let comparison = ParameterComparison {
            parameter: "weight".to_owned(),
            groups: groups(),
            sizes: [3, 4],
            imputed: [0, 0],
            result: ComparisonResult::Compared(TestOutcome {
                statistic: -2.5,
                p_value: 0.031,
                test: TestKind::Welch,
                normality_p1: 0.2,
                normality_p2: 0.12,
                variance_p: 0.004,
            }),
        };
        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["result"]["status"], "compared");
        assert_eq!(json["result"]["test"], "Welch's t-test");
        assert_eq!(json["groups"]["first"], "healthy");

        let back: ParameterComparison = serde_json::from_value(json).unwrap();
        assert_eq!(back, comparison);
    }
}
