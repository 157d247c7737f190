//! Confidence intervals over dataset columns
//!
//! Dataset-level entry points for the normal-approximation interval
//! estimators in [`survey_stats::interval`]. The confidence level is always a
//! parameter; [`DEFAULT_MEAN_CONFIDENCE`] and [`DEFAULT_PROPORTION_CONFIDENCE`]
//! are the levels the survey report uses.

use serde::Serialize;
use survey_stats::interval::{self, ConfidenceInterval};

use crate::{AnalysisError, dataset::Dataset};

pub const DEFAULT_MEAN_CONFIDENCE: f64 = 0.95;
pub const DEFAULT_PROPORTION_CONFIDENCE: f64 = 0.98;

/// Share of rows carrying one level of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProportion {
    pub column: String,
    pub level: String,
    pub proportion: f64,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionEstimate {
    #[serde(flatten)]
    pub proportion: LevelProportion,
    pub interval: ConfidenceInterval,
}

/// Confidence interval for the mean of a numeric column.
///
/// # Examples
///
/// ```
/// use survey_analysis::{
///     dataset::{Dataset, Schema, Value},
///     estimate::mean_interval,
/// };
///
/// let schema = Schema::new().numeric("G3");
/// let rows = [10.0, 12.0, 14.0].map(|v| vec![Value::Number(v)]).to_vec();
/// let dataset = Dataset::from_rows(schema, rows).unwrap();
///
/// let ci = mean_interval(&dataset, "G3", 0.95).unwrap();
/// assert!((ci.midpoint() - 12.0).abs() < 1e-12);
/// ```
pub fn mean_interval(
    dataset: &Dataset,
    column: &str,
    confidence: f64,
) -> Result<ConfidenceInterval, AnalysisError> {
    let values = dataset.numeric_values(column)?;
    if values.is_empty() {
        return Err(AnalysisError::InsufficientData {
            operation: "mean interval",
        });
    }
    Ok(interval::mean_interval(&values, confidence)?)
}

/// Proportion of rows whose `column` equals `level`, over all rows.
#[expect(clippy::cast_precision_loss)]
pub fn level_proportion(
    dataset: &Dataset,
    column: &str,
    level: &str,
) -> Result<LevelProportion, AnalysisError> {
    let values = dataset.categorical_values(column)?;
    if values.is_empty() {
        return Err(AnalysisError::InsufficientData {
            operation: "proportion",
        });
    }
    let hits = values.iter().filter(|v| **v == level).count();
    Ok(LevelProportion {
        column: column.to_owned(),
        level: level.to_owned(),
        proportion: hits as f64 / values.len() as f64,
        n: values.len(),
    })
}

/// Confidence interval for the proportion of rows carrying `level`.
pub fn proportion_interval(
    dataset: &Dataset,
    column: &str,
    level: &str,
    confidence: f64,
) -> Result<ProportionEstimate, AnalysisError> {
    let proportion = level_proportion(dataset, column, level)?;
    let interval = interval::proportion_interval(proportion.proportion, proportion.n, confidence)?;
    Ok(ProportionEstimate {
        proportion,
        interval,
    })
}
