//! End-to-end survey report
//!
//! [`AnalysisReport::run`] chains the whole pipeline on one dataset:
//!
//! 1. rare-level filtering on the configured categorical columns
//! 2. composite index and label derivation
//! 3. descriptive summaries of the outcome and of the index
//! 4. mean interval of the outcome and proportion interval of one label level
//! 5. outcome comparison between the two labels
//! 6. chi-square test of the label against a second categorical column
//!
//! Filter columns that the dataset does not have are skipped and listed in
//! the report rather than failing the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use survey_stats::{descriptive::DescriptiveStats, interval::ConfidenceInterval};

use crate::{
    AnalysisError,
    compare::{GroupComparator, GroupComparison},
    contingency::{ContingencyAnalysis, ContingencyAnalyzer},
    dataset::Dataset,
    estimate::{
        self, DEFAULT_MEAN_CONFIDENCE, DEFAULT_PROPORTION_CONFIDENCE, ProportionEstimate,
    },
    index::{IndexDeriver, IndexLabel},
    level_filter::{ColumnFilterOutcome, LevelFilter},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Categorical columns filtered for rare levels, in pass order.
    pub filter_columns: Vec<String>,
    pub level_filter: LevelFilter,
    pub index: IndexDeriver,
    /// Numeric column compared between the two labels.
    pub outcome_column: String,
    /// Categorical column cross-tabulated against the label.
    pub contingency_column: String,
    pub mean_confidence: f64,
    pub proportion_confidence: f64,
    /// Label level whose share gets a proportion interval.
    pub proportion_level: String,
    pub yates_correction: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            filter_columns: vec!["gender".to_owned()],
            level_filter: LevelFilter::default(),
            index: IndexDeriver::default(),
            outcome_column: "G3".to_owned(),
            contingency_column: "gender".to_owned(),
            mean_confidence: DEFAULT_MEAN_CONFIDENCE,
            proportion_confidence: DEFAULT_PROPORTION_CONFIDENCE,
            proportion_level: IndexLabel::High.as_str().to_owned(),
            yates_correction: false,
        }
    }
}

impl ReportConfig {
    #[must_use]
    pub fn comparator(&self) -> GroupComparator {
        GroupComparator {
            outcome_column: self.outcome_column.clone(),
            group_column: self.index.label_column.clone(),
            ..GroupComparator::default()
        }
    }

    #[must_use]
    pub fn contingency(&self) -> ContingencyAnalyzer {
        ContingencyAnalyzer {
            row_column: self.index.label_column.clone(),
            column_column: self.contingency_column.clone(),
            yates_correction: self.yates_correction,
        }
    }
}

/// Dataset after filtering and derivation, ready for the inferential steps.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub dataset: Dataset,
    pub filters: Vec<ColumnFilterOutcome>,
    /// Filter columns the dataset does not have.
    pub skipped_columns: Vec<String>,
}

/// Filters rare levels on the configured columns present in `dataset`, then
/// derives the composite index and label.
pub fn prepare(dataset: Dataset, config: &ReportConfig) -> Result<Prepared, AnalysisError> {
    let (present, skipped_columns): (Vec<_>, Vec<_>) = config
        .filter_columns
        .iter()
        .cloned()
        .partition(|column| dataset.schema().contains(column));
    for column in &skipped_columns {
        tracing::warn!(column, "filter column not in dataset, skipped");
    }

    let filtered = config.level_filter.apply(dataset, &present)?;
    let dataset = config.index.derive(filtered.dataset)?;
    Ok(Prepared {
        dataset,
        filters: filtered.columns,
        skipped_columns,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub config: ReportConfig,
    pub rows_input: usize,
    pub rows_analyzed: usize,
    pub filters: Vec<ColumnFilterOutcome>,
    pub skipped_columns: Vec<String>,
    pub outcome_summary: DescriptiveStats,
    pub index_summary: DescriptiveStats,
    pub mean_interval: ConfidenceInterval,
    pub proportion: ProportionEstimate,
    pub groups: GroupComparison,
    pub contingency: ContingencyAnalysis,
}

impl AnalysisReport {
    /// Runs the full pipeline on `dataset`.
    ///
    /// # Errors
    ///
    /// Fails on the first step that fails; [`AnalysisError::InsufficientData`]
    /// when the dataset is empty or filtering leaves no rows.
    pub fn run(dataset: Dataset, config: &ReportConfig) -> Result<Self, AnalysisError> {
        let rows_input = dataset.len();
        if dataset.is_empty() {
            return Err(AnalysisError::InsufficientData {
                operation: "survey analysis",
            });
        }
        let Prepared {
            dataset,
            filters,
            skipped_columns,
        } = prepare(dataset, config)?;
        tracing::info!(rows_input, rows_analyzed = dataset.len(), "dataset prepared");

        let summary = |column: &str| -> Result<DescriptiveStats, AnalysisError> {
            DescriptiveStats::new(dataset.numeric_values(column)?).ok_or(
                AnalysisError::InsufficientData {
                    operation: "descriptive summary",
                },
            )
        };
        let outcome_summary = summary(&config.outcome_column)?;
        let index_summary = summary(&config.index.index_column)?;

        let mean_interval =
            estimate::mean_interval(&dataset, &config.outcome_column, config.mean_confidence)?;
        let proportion = estimate::proportion_interval(
            &dataset,
            &config.index.label_column,
            &config.proportion_level,
            config.proportion_confidence,
        )?;
        let groups = config.comparator().compare(&dataset)?;
        let contingency = config.contingency().analyze(&dataset)?;

        Ok(Self {
            generated_at: Utc::now(),
            config: config.clone(),
            rows_input,
            rows_analyzed: dataset.len(),
            filters,
            skipped_columns,
            outcome_summary,
            index_summary,
            mean_interval,
            proportion,
            groups,
            contingency,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg64;

    use super::*;
    use crate::dataset::{Schema, Value};

    fn students(n: usize, seed: u64) -> Dataset {
        let mut rng = Pcg64::seed_from_u64(seed);
        let schema = Schema::new()
            .numeric("Dalc")
            .numeric("Walc")
            .numeric("G3")
            .categorical("gender");
        let rows = (0..n)
            .map(|_| {
                let gender = if rng.random_bool(0.5) { "F" } else { "M" };
                vec![
                    Value::Number(f64::from(rng.random_range(1..=5_u8))),
                    Value::Number(f64::from(rng.random_range(1..=5_u8))),
                    Value::Number(f64::from(rng.random_range(0..=20_u8))),
                    Value::text(gender),
                ]
            })
            .collect();
        Dataset::from_rows(schema, rows).unwrap()
    }

    #[test]
    fn test_end_to_end_random_survey() {
        let report = AnalysisReport::run(students(100, 7), &ReportConfig::default()).unwrap();

        assert_eq!(report.rows_input, 100);
        assert_eq!(report.rows_analyzed, 100);
        assert!(report.index_summary.min >= 1.0);
        assert!(report.index_summary.max <= 5.0);
        assert_eq!(report.groups.variances.len(), 2);
        assert!(report.groups.variances.iter().all(|g| g.summary.len > 0));
        assert!(report.mean_interval.contains(report.outcome_summary.mean));
        assert_eq!(report.mean_interval.confidence, 0.95);
        assert_eq!(report.proportion.interval.confidence, 0.98);
        assert_eq!(report.contingency.observed.grand_total(), 100);
    }

    #[test]
    fn test_absent_filter_column_is_skipped() {
        let config = ReportConfig {
            filter_columns: vec!["school".into(), "gender".into()],
            level_filter: LevelFilter::new(1),
            ..ReportConfig::default()
        };
        let prepared = prepare(students(20, 3), &config).unwrap();

        assert_eq!(prepared.skipped_columns, ["school"]);
        assert_eq!(prepared.filters.len(), 1);
        assert_eq!(prepared.filters[0].column, "gender");
        assert!(prepared.dataset.schema().contains("acl"));
    }

    #[test]
    fn test_filtering_everything_is_insufficient_data() {
        let config = ReportConfig {
            level_filter: LevelFilter::new(1000),
            ..ReportConfig::default()
        };
        let err = AnalysisReport::run(students(50, 11), &config).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_empty_dataset_is_insufficient_data() {
        let schema = Schema::new().numeric("Dalc").numeric("Walc").numeric("gender");
        let empty = Dataset::from_rows(schema, vec![]).unwrap();
        let err = AnalysisReport::run(empty, &ReportConfig::default()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                operation: "survey analysis"
            }
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = AnalysisReport::run(students(100, 21), &ReportConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["rows_analyzed"], 100);
        assert_eq!(json["config"]["outcome_column"], "G3");
        assert!(json["groups"]["bartlett"]["p_value"].is_number());
        assert!(json["contingency"]["chi_square"]["degrees_of_freedom"].is_number());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ReportConfig = serde_json::from_str(r#"{"yates_correction": true}"#).unwrap();
        assert!(config.yates_correction);
        assert_eq!(config.mean_confidence, 0.95);
        assert_eq!(config.level_filter.min_count, 30);
        assert_eq!(config.contingency().row_column, "acl");

        let config: ReportConfig =
            serde_json::from_str(r#"{"level_filter": {}, "index": {}}"#).unwrap();
        assert_eq!(config, ReportConfig::default());
    }
}
