//! Composite consumption index and its binary label
//!
//! The index is a weighted average of two raw ordinal scores (weekday and
//! weekend consumption in the student survey), weighting the first 5 and the
//! second 2:
//!
//! ```text
//! index = (5 * a + 2 * b) / 7
//! ```
//!
//! Values are not clamped, so inputs outside the usual 1-5 scale carry through.
//! The label is `Low` when `index <= 2.0` and `High` otherwise.

use serde::{Deserialize, Serialize};

use crate::{
    AnalysisError,
    dataset::{Column, ColumnKind, Dataset, Value},
};

pub const PRIMARY_WEIGHT: f64 = 5.0;
pub const SECONDARY_WEIGHT: f64 = 2.0;
pub const WEIGHT_SUM: f64 = PRIMARY_WEIGHT + SECONDARY_WEIGHT;
/// Largest index value labelled [`IndexLabel::Low`].
pub const LOW_THRESHOLD: f64 = 2.0;

/// Weighted average of the two raw scores.
///
/// # Examples
///
/// ```
/// # use survey_analysis::index::composite_index;
/// assert_eq!(composite_index(5.0, 5.0), 5.0);
/// assert_eq!(composite_index(2.0, 2.0), 2.0);
/// ```
#[must_use]
pub fn composite_index(primary: f64, secondary: f64) -> f64 {
    (PRIMARY_WEIGHT * primary + SECONDARY_WEIGHT * secondary) / WEIGHT_SUM
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
pub enum IndexLabel {
    Low,
    High,
}

impl IndexLabel {
    /// Labels an index value; the threshold itself is `Low`.
    #[must_use]
    pub fn from_index(index: f64) -> Self {
        if index <= LOW_THRESHOLD {
            Self::Low
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::High => "High",
        }
    }
}

/// Appends the composite index and its label to every row of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexDeriver {
    /// Numeric column weighted 5.
    pub primary_column: String,
    /// Numeric column weighted 2.
    pub secondary_column: String,
    /// Name of the appended numeric index column.
    pub index_column: String,
    /// Name of the appended categorical label column.
    pub label_column: String,
}

impl Default for IndexDeriver {
    fn default() -> Self {
        Self {
            primary_column: "Dalc".to_owned(),
            secondary_column: "Walc".to_owned(),
            index_column: "alcohol_index".to_owned(),
            label_column: "acl".to_owned(),
        }
    }
}

impl IndexDeriver {
    /// Derives the index and label columns.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::Schema`] when an input column is absent or not numeric,
    ///   or an output column already exists
    /// * [`AnalysisError::MissingField`] when a row lacks either raw score
    pub fn derive(&self, dataset: Dataset) -> Result<Dataset, AnalysisError> {
        let primary = dataset.numeric_column(&self.primary_column)?;
        let secondary = dataset.numeric_column(&self.secondary_column)?;

        let mut indices = Vec::with_capacity(dataset.len());
        let mut labels = Vec::with_capacity(dataset.len());
        for (row, (a, b)) in primary.into_iter().zip(secondary).enumerate() {
            let missing = |column: &str| AnalysisError::MissingField {
                row,
                column: column.to_owned(),
            };
            let a = a.ok_or_else(|| missing(&self.primary_column))?;
            let b = b.ok_or_else(|| missing(&self.secondary_column))?;
            let index = composite_index(a, b);
            indices.push(Value::Number(index));
            labels.push(Value::text(IndexLabel::from_index(index).as_str()));
        }

        let low = labels
            .iter()
            .filter(|v| v.as_text() == Some(IndexLabel::Low.as_str()))
            .count();
        tracing::debug!(
            rows = indices.len(),
            low,
            high = indices.len() - low,
            "derived composite index"
        );

        let dataset = dataset
            .with_column(
                Column {
                    name: self.index_column.clone(),
                    kind: ColumnKind::Numeric,
                },
                indices,
            )?
            .with_column(
                Column {
                    name: self.label_column.clone(),
                    kind: ColumnKind::Categorical,
                },
                labels,
            )?;
        Ok(dataset)
    }
}
