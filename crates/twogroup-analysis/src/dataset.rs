//! Long-format datasets of grouped measurements.
//!
//! A dataset holds one row per observation: the measured value, the name of
//! the measured quantity (the *parameter*, e.g. `weight`), and the group the
//! subject belongs to (the *category*, e.g. `healthy` or `diseased`).
//!
//! # Serialization
//!
//! ```json
//! {
//!   "observations": [
//!     { "value": 71.5, "parameter": "weight", "category": "healthy" },
//!     { "value": null, "parameter": "weight", "category": "diseased" }
//!   ]
//! }
//! ```
//!
//! A `null` or absent `value` marks a missing observation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use twogroup_stats::impute;

use crate::AnalysisError;

/// A single measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Measured value, `None` when missing.
    #[serde(default)]
    pub value: Option<f64>,
    /// Name of the measured quantity.
    pub parameter: String,
    /// Group the observation belongs to.
    pub category: String,
}

impl Observation {
    #[must_use]
    pub fn new(
        value: Option<f64>,
        parameter: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            value,
            parameter: parameter.into(),
            category: category.into(),
        }
    }
}

/// The two categories being compared, in comparison order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPair {
    pub first: String,
    pub second: String,
}

impl GroupPair {
    #[must_use]
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Both labels, first group first.
    #[must_use]
    pub fn labels(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }
}

/// A collection of observations in long format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub observations: Vec<Observation>,
}

impl Dataset {
    #[must_use]
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Distinct parameters in order of first appearance.
    #[must_use]
    pub fn parameters(&self) -> Vec<&str> {
        distinct(self.observations.iter().map(|o| o.parameter.as_str()))
    }

    /// Resolves the parameters to analyse.
    ///
    /// An empty `requested` selects every parameter in order of first
    /// appearance. Otherwise the requested order is kept and each name must
    /// occur in the dataset.
    ///
    /// ```
    /// use twogroup_analysis::dataset::{Dataset, Observation};
    ///
    /// let dataset = Dataset::new(vec![
    ///     Observation::new(Some(1.0), "weight", "healthy"),
    ///     Observation::new(Some(9.0), "height", "healthy"),
    /// ]);
    /// assert_eq!(dataset.select_parameters(&[]).unwrap(), ["weight", "height"]);
    /// let height = ["height".to_owned()];
    /// assert_eq!(dataset.select_parameters(&height).unwrap(), ["height"]);
    /// ```
    pub fn select_parameters(&self, requested: &[String]) -> Result<Vec<&str>, AnalysisError> {
        let available = self.parameters();
        if requested.is_empty() {
            return Ok(available);
        }
        requested
            .iter()
            .map(|p| {
                available
                    .iter()
                    .find(|a| **a == p.as_str())
                    .copied()
                    .ok_or_else(|| AnalysisError::UnknownParameter {
                        parameter: p.clone(),
                    })
            })
            .collect()
    }

    /// Distinct categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.observations.iter().map(|o| o.category.as_str()))
    }

    /// Values of one parameter in one category, in dataset order.
    ///
    /// Missing observations are returned as `NaN`.
    ///
    /// ```
    /// use twogroup_analysis::dataset::{Dataset, Observation};
    ///
    /// let dataset = Dataset::new(vec![
    ///     Observation::new(Some(1.0), "weight", "healthy"),
    ///     Observation::new(Some(9.0), "height", "healthy"),
    ///     Observation::new(None, "weight", "healthy"),
    /// ]);
    /// let sample = dataset.sample("weight", "healthy");
    /// assert_eq!(sample.len(), 2);
    /// assert!(sample[1].is_nan());
    /// ```
    #[must_use]
    pub fn sample(&self, parameter: &str, category: &str) -> Vec<f64> {
        self.observations
            .iter()
            .filter(|o| o.parameter == parameter && o.category == category)
            .map(|o| o.value.unwrap_or(f64::NAN))
            .collect()
    }

    /// Resolves the two groups to compare.
    ///
    /// With `requested` set, both labels must occur in the dataset. Otherwise
    /// the dataset must contain exactly two categories, taken in order of
    /// first appearance.
    pub fn group_pair(&self, requested: Option<&GroupPair>) -> Result<GroupPair, AnalysisError> {
        let categories = self.categories();
        if let Some(pair) = requested {
            for label in pair.labels() {
                if !categories.contains(&label) {
                    return Err(AnalysisError::UnknownCategory {
                        category: label.to_owned(),
                    });
                }
            }
            return Ok(pair.clone());
        }
        match categories.as_slice() {
            [first, second] => Ok(GroupPair::new(*first, *second)),
            _ => Err(AnalysisError::NotTwoCategories {
                found: categories.iter().map(|c| (*c).to_owned()).collect(),
            }),
        }
    }

    /// Number of missing values per `(parameter, category)`.
    #[must_use]
    pub fn missing_counts(&self) -> BTreeMap<(&str, &str), usize> {
        let mut counts = BTreeMap::new();
        for o in self.observations.iter().filter(|o| o.value.is_none()) {
            *counts
                .entry((o.parameter.as_str(), o.category.as_str()))
                .or_default() += 1;
        }
        counts
    }

    /// Returns a copy with every missing value replaced by the median of the
    /// present values sharing its parameter and category.
    ///
    /// Row order is preserved and the dataset itself is not modified.
    ///
    /// ```
    /// use twogroup_analysis::dataset::{Dataset, Observation};
    ///
    /// let dataset = Dataset::new(vec![
    ///     Observation::new(Some(1.0), "weight", "healthy"),
    ///     Observation::new(None, "weight", "healthy"),
    ///     Observation::new(Some(3.0), "weight", "healthy"),
    ///     Observation::new(Some(50.0), "weight", "diseased"),
    /// ]);
    /// let filled = dataset.median_filled().unwrap();
    /// assert_eq!(filled.sample("weight", "healthy"), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn median_filled(&self) -> Result<Self, AnalysisError> {
        let mut filled = BTreeMap::new();
        for (parameter, category) in self.missing_counts().into_keys() {
            let values = impute::median_fill(&self.sample(parameter, category)).map_err(
                |source| AnalysisError::Impute {
                    parameter: parameter.to_owned(),
                    category: category.to_owned(),
                    source,
                },
            )?;
            filled.insert((parameter, category), values.into_iter());
        }

        // Each group's filled values come back in dataset order
        let observations = self
            .observations
            .iter()
            .map(|o| {
                let key = (o.parameter.as_str(), o.category.as_str());
                let value = match filled.get_mut(&key) {
                    Some(values) => values.next(),
                    None => o.value,
                };
                Observation { value, ..o.clone() }
            })
            .collect();
        Ok(Self { observations })
    }
}

fn distinct<'a, I>(items: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = vec![];
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
