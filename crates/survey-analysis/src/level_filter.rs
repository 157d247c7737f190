//! Rare-level filtering for categorical columns
//!
//! Categorical columns often carry a long tail of levels with a handful of
//! observations each. [`LevelFilter`] keeps only the levels that occur at
//! least `min_count` times and drops every row whose value is not one of
//! them.
//!
//! When several columns are filtered, the passes run in the declared order
//! and each pass counts levels on the output of the previous one. A row
//! survives only if its value met the threshold on every filtered column.
//! Rows with a missing value on a filtered column never survive that pass.
//!
//! # Examples
//!
//! ```
//! use survey_analysis::{
//!     dataset::{Dataset, Schema, Value},
//!     level_filter::LevelFilter,
//! };
//!
//! let schema = Schema::new().categorical("zone");
//! let rows = ["RL", "RL", "RL", "RM", "RM", "C"]
//!     .into_iter()
//!     .map(|z| vec![Value::text(z)])
//!     .collect();
//! let dataset = Dataset::from_rows(schema, rows).unwrap();
//!
//! let filter = LevelFilter::new(2);
//! let outcome = filter.apply(dataset, &["zone"]).unwrap();
//!
//! assert_eq!(outcome.dataset.len(), 5);
//! assert_eq!(outcome.columns[0].rows_dropped, 1);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{ColumnKind, Dataset, SchemaError};

/// Minimum number of occurrences for a level to be retained.
pub const DEFAULT_MIN_COUNT: usize = 30;

/// Number of rows carrying one level of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelCount {
    pub level: String,
    pub count: usize,
}

/// What one filtering pass kept and removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnFilterOutcome {
    pub column: String,
    /// Levels meeting the threshold, most frequent first.
    pub retained: Vec<LevelCount>,
    /// Levels below the threshold, most frequent first.
    pub removed: Vec<LevelCount>,
    /// Rows removed by this pass, including rows with a missing value.
    pub rows_dropped: usize,
}

/// The filtered dataset with per-column bookkeeping in pass order.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub dataset: Dataset,
    pub columns: Vec<ColumnFilterOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LevelFilter {
    pub min_count: usize,
}

impl Default for LevelFilter {
    fn default() -> Self {
        Self {
            min_count: DEFAULT_MIN_COUNT,
        }
    }
}

/// Counts of each distinct non-missing level, most frequent first.
///
/// Ties are ordered by level label.
pub fn level_counts(dataset: &Dataset, column: &str) -> Result<Vec<LevelCount>, SchemaError> {
    let mut counts = BTreeMap::<&str, usize>::new();
    for level in dataset.categorical_column(column)?.into_iter().flatten() {
        *counts.entry(level).or_default() += 1;
    }
    let mut counts = counts
        .into_iter()
        .map(|(level, count)| LevelCount {
            level: level.to_owned(),
            count,
        })
        .collect::<Vec<_>>();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.level.cmp(&b.level)));
    Ok(counts)
}

impl LevelFilter {
    #[must_use]
    pub fn new(min_count: usize) -> Self {
        Self { min_count }
    }

    /// Runs a single filtering pass on `column`.
    pub fn filter_column(
        &self,
        dataset: Dataset,
        column: &str,
    ) -> Result<(Dataset, ColumnFilterOutcome), SchemaError> {
        let index = dataset.schema().require(column, ColumnKind::Categorical)?;
        let (retained, removed): (Vec<_>, Vec<_>) = level_counts(&dataset, column)?
            .into_iter()
            .partition(|lc| lc.count >= self.min_count);

        let before = dataset.len();
        let dataset = dataset.retain_records(|record| {
            record
                .get(index)
                .as_text()
                .is_some_and(|level| retained.iter().any(|lc| lc.level == level))
        });
        let rows_dropped = before - dataset.len();

        tracing::debug!(
            column,
            min_count = self.min_count,
            retained = retained.len(),
            removed = removed.len(),
            rows_dropped,
            "filtered rare levels"
        );
        if retained.is_empty() {
            tracing::warn!(column, min_count = self.min_count, "no level meets the threshold");
        }

        Ok((
            dataset,
            ColumnFilterOutcome {
                column: column.to_owned(),
                retained,
                removed,
                rows_dropped,
            },
        ))
    }

    /// Filters each column in `columns`, in order, on the output of the
    /// previous pass.
    pub fn apply<S>(&self, dataset: Dataset, columns: &[S]) -> Result<FilterOutcome, SchemaError>
    where
        S: AsRef<str>,
    {
        let mut dataset = dataset;
        let mut outcomes = Vec::with_capacity(columns.len());
        for column in columns {
            let (filtered, outcome) = self.filter_column(dataset, column.as_ref())?;
            dataset = filtered;
            outcomes.push(outcome);
        }
        tracing::info!(rows = dataset.len(), "level filtering complete");
        Ok(FilterOutcome {
            dataset,
            columns: outcomes,
        })
    }
}
