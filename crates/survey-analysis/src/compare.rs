//! Comparison of a numeric outcome between two labelled groups
//!
//! [`GroupComparator`] splits a numeric outcome column by a binary label
//! column (for instance the `Low`/`High` consumption label) and reports each
//! group's sample variance, Bartlett's test for equal variances and the
//! pooled-variance t-test for equal means.
//!
//! Rows whose label is neither of the two compared groups do not take part.

use serde::{Deserialize, Serialize};
use survey_stats::{
    distribution::DistributionError,
    hypothesis::TestResult,
    two_sample::{self, GroupSummary, TwoSampleError},
};

use crate::{AnalysisError, dataset::Dataset, index::IndexLabel};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum GroupError {
    #[display("Group '{label}' is empty")]
    EmptyGroup { label: String },
    #[display("Group '{label}' has {len} observation(s), at least 2 required")]
    InsufficientGroupSize { label: String, len: usize },
    #[display("Group '{label}' has zero variance")]
    ZeroVariance { label: String },
    #[display("{_0}")]
    Distribution(DistributionError),
}

impl GroupError {
    fn from_two_sample(err: TwoSampleError, labels: &[String; 2]) -> Self {
        match err {
            TwoSampleError::EmptyGroup { group } => Self::EmptyGroup {
                label: labels[group].clone(),
            },
            TwoSampleError::InsufficientGroupSize { group, len } => Self::InsufficientGroupSize {
                label: labels[group].clone(),
                len,
            },
            TwoSampleError::ZeroVariance { group } => Self::ZeroVariance {
                label: labels[group].clone(),
            },
            TwoSampleError::Distribution(err) => Self::Distribution(err),
        }
    }
}

/// Size, mean and sample variance of one labelled group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupVariance {
    pub label: String,
    #[serde(flatten)]
    pub summary: GroupSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub outcome_column: String,
    pub group_column: String,
    /// One entry per compared group, in comparison order.
    pub variances: Vec<GroupVariance>,
    pub bartlett: TestResult,
    pub t_test: TestResult,
}

impl GroupComparison {
    #[must_use]
    pub fn variance_of(&self, label: &str) -> Option<f64> {
        self.variances
            .iter()
            .find(|g| g.label == label)
            .map(|g| g.summary.variance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupComparator {
    pub outcome_column: String,
    pub group_column: String,
    /// The two compared labels; the t statistic is `mean(first) - mean(second)`.
    pub groups: [String; 2],
}

impl Default for GroupComparator {
    fn default() -> Self {
        Self {
            outcome_column: "G3".to_owned(),
            group_column: "acl".to_owned(),
            groups: [
                IndexLabel::Low.as_str().to_owned(),
                IndexLabel::High.as_str().to_owned(),
            ],
        }
    }
}

impl GroupComparator {
    /// Outcome values of each compared group, in comparison order.
    pub fn split(&self, dataset: &Dataset) -> Result<[Vec<f64>; 2], AnalysisError> {
        let outcome = dataset.numeric_values(&self.outcome_column)?;
        let labels = dataset.categorical_values(&self.group_column)?;

        let mut split = [Vec::new(), Vec::new()];
        for (value, label) in outcome.into_iter().zip(labels) {
            if let Some(group) = self.groups.iter().position(|g| g == label) {
                split[group].push(value);
            }
        }
        Ok(split)
    }

    /// Runs the variance table, Bartlett's test and the pooled t-test.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::InsufficientData`] when the dataset has no rows
    /// * [`GroupError::EmptyGroup`] when a compared label has no rows
    /// * [`GroupError::InsufficientGroupSize`] when a compared label has a single row
    /// * [`GroupError::ZeroVariance`] when a group's outcome is constant
    pub fn compare(&self, dataset: &Dataset) -> Result<GroupComparison, AnalysisError> {
        if dataset.is_empty() {
            return Err(AnalysisError::InsufficientData {
                operation: "group comparison",
            });
        }
        let [first, second] = self.split(dataset)?;
        let to_group_error = |err| GroupError::from_two_sample(err, &self.groups);

        tracing::debug!(
            outcome = %self.outcome_column,
            first = first.len(),
            second = second.len(),
            "comparing groups"
        );

        // The tests validate both groups, reporting empty groups first.
        let bartlett = two_sample::bartlett(&first, &second).map_err(to_group_error)?;
        let t_test = two_sample::pooled_t_test(&first, &second).map_err(to_group_error)?;
        let variances = [&first, &second]
            .into_iter()
            .zip(&self.groups)
            .enumerate()
            .map(|(group, (values, label))| {
                GroupSummary::from_values(group, values).map(|summary| GroupVariance {
                    label: label.clone(),
                    summary,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_group_error)?;

        Ok(GroupComparison {
            outcome_column: self.outcome_column.clone(),
            group_column: self.group_column.clone(),
            variances,
            bartlett,
            t_test,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_distr::{Distribution as _, Normal};
    use rand_pcg::Pcg64;

    use super::*;
    use crate::dataset::{Schema, Value};

    fn grades(rows: &[(f64, &str)]) -> Dataset {
        let schema = Schema::new().numeric("G3").categorical("acl");
        let rows = rows
            .iter()
            .map(|(g, l)| vec![Value::Number(*g), Value::text(*l)])
            .collect();
        Dataset::from_rows(schema, rows).unwrap()
    }

    #[test]
    fn test_variance_table() {
        let dataset = grades(&[
            (10.0, "Low"),
            (12.0, "Low"),
            (14.0, "Low"),
            (8.0, "High"),
            (9.0, "High"),
            (13.0, "High"),
        ]);
        let comparison = GroupComparator::default().compare(&dataset).unwrap();

        assert_eq!(comparison.variance_of("Low"), Some(4.0));
        assert_eq!(comparison.variance_of("High"), Some(7.0));
        assert_eq!(comparison.variances[0].label, "Low");
        assert_eq!(comparison.variances[1].summary.len, 3);
        assert!(comparison.t_test.statistic > 0.0);
    }

    #[test]
    fn test_equal_spread_gives_zero_bartlett() {
        let dataset = grades(&[
            (1.0, "Low"),
            (2.0, "Low"),
            (3.0, "Low"),
            (11.0, "High"),
            (12.0, "High"),
            (13.0, "High"),
        ]);
        let comparison = GroupComparator::default().compare(&dataset).unwrap();
        assert!(comparison.bartlett.statistic.abs() < 1e-9);
    }

    #[test]
    fn test_identical_groups_have_unit_p_value() {
        let mut rng = Pcg64::seed_from_u64(5);
        let dist = Normal::new(11.0, 3.0).unwrap();
        let sample = (0..40).map(|_| dist.sample(&mut rng)).collect::<Vec<_>>();
        let rows = sample
            .iter()
            .flat_map(|&g| [(g, "Low"), (g, "High")])
            .collect::<Vec<_>>();

        let comparison = GroupComparator::default()
            .compare(&grades(&rows))
            .unwrap();
        assert!((comparison.t_test.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_undersized_groups() {
        let only_low = grades(&[(10.0, "Low"), (12.0, "Low")]);
        assert_eq!(
            GroupComparator::default().compare(&only_low),
            Err(AnalysisError::Group(GroupError::EmptyGroup {
                label: "High".into()
            }))
        );

        let single_high = grades(&[(10.0, "Low"), (12.0, "Low"), (9.0, "High")]);
        assert_eq!(
            GroupComparator::default().compare(&single_high),
            Err(AnalysisError::Group(GroupError::InsufficientGroupSize {
                label: "High".into(),
                len: 1
            }))
        );

        assert!(
            GroupComparator::default()
                .compare(&grades(&[]))
                .unwrap_err()
                .is_insufficient_data()
        );
    }

    #[test]
    fn test_other_labels_are_ignored() {
        let dataset = grades(&[
            (10.0, "Low"),
            (12.0, "Low"),
            (99.0, "Unknown"),
            (8.0, "High"),
            (9.0, "High"),
        ]);
        let [low, high] = GroupComparator::default().split(&dataset).unwrap();
        assert_eq!(low, [10.0, 12.0]);
        assert_eq!(high, [8.0, 9.0]);
    }

    #[test]
    fn test_missing_outcome_column() {
        let schema = Schema::new().categorical("acl");
        let dataset = Dataset::from_rows(schema, vec![vec![Value::text("Low")]]).unwrap();
        assert!(
            GroupComparator::default()
                .compare(&dataset)
                .unwrap_err()
                .is_schema()
        );
    }
}
