//! Independence of two categorical columns
//!
//! [`ContingencyAnalyzer`] cross-tabulates two categorical columns and runs
//! the chi-square test of independence, returning the observed table, the
//! expected counts under independence, the test result and a row-normalized
//! percentage view of the observed counts.
//!
//! Rows with a missing value in either column are not counted.

use serde::{Deserialize, Serialize};
use survey_stats::{
    contingency::{ContingencyTable, LabeledMatrix},
    hypothesis::TestResult,
};

use crate::{AnalysisError, dataset::Dataset};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyAnalysis {
    pub row_column: String,
    pub column_column: String,
    pub observed: ContingencyTable,
    pub expected: LabeledMatrix<f64>,
    pub chi_square: TestResult,
    pub yates_corrected: bool,
    /// Observed counts as percentages of their row total.
    pub row_percentages: LabeledMatrix<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContingencyAnalyzer {
    /// Categorical column providing the table rows.
    pub row_column: String,
    /// Categorical column providing the table columns.
    pub column_column: String,
    /// Apply Yates' continuity correction to 2x2 tables.
    pub yates_correction: bool,
}

impl Default for ContingencyAnalyzer {
    fn default() -> Self {
        Self {
            row_column: "acl".to_owned(),
            column_column: "gender".to_owned(),
            yates_correction: false,
        }
    }
}

impl ContingencyAnalyzer {
    /// Observed co-occurrence counts of the two columns.
    pub fn observed(&self, dataset: &Dataset) -> Result<ContingencyTable, AnalysisError> {
        let rows = dataset.categorical_column(&self.row_column)?;
        let columns = dataset.categorical_column(&self.column_column)?;
        let pairs = rows
            .into_iter()
            .zip(columns)
            .filter_map(|(r, c)| Some((r?, c?)));
        Ok(ContingencyTable::from_pairs(pairs))
    }

    /// Builds the observed table and tests it for independence.
    ///
    /// # Examples
    ///
    /// ```
    /// use survey_analysis::{
    ///     contingency::ContingencyAnalyzer,
    ///     dataset::{Dataset, Schema, Value},
    /// };
    ///
    /// let schema = Schema::new().categorical("acl").categorical("gender");
    /// let rows = [("Low", "F"), ("Low", "M"), ("High", "F"), ("High", "M")]
    ///     .map(|(a, g)| vec![Value::text(a), Value::text(g)])
    ///     .to_vec();
    /// let dataset = Dataset::from_rows(schema, rows).unwrap();
    ///
    /// let analysis = ContingencyAnalyzer::default().analyze(&dataset).unwrap();
    /// assert_eq!(analysis.observed.grand_total(), 4);
    /// assert_eq!(analysis.chi_square.degrees_of_freedom, Some(1));
    /// ```
    pub fn analyze(&self, dataset: &Dataset) -> Result<ContingencyAnalysis, AnalysisError> {
        if dataset.is_empty() {
            return Err(AnalysisError::InsufficientData {
                operation: "contingency analysis",
            });
        }
        let observed = self.observed(dataset)?;
        let test = if self.yates_correction {
            observed.chi_square_yates()?
        } else {
            observed.chi_square()?
        };

        tracing::debug!(
            rows = observed.row_labels().len(),
            columns = observed.column_labels().len(),
            statistic = test.test.statistic,
            p_value = test.test.p_value,
            "chi-square test of independence"
        );

        let row_percentages = observed.row_percentages();
        Ok(ContingencyAnalysis {
            row_column: self.row_column.clone(),
            column_column: self.column_column.clone(),
            expected: test.expected,
            chi_square: test.test,
            yates_corrected: test.yates_corrected,
            row_percentages,
            observed,
        })
    }
}

#[cfg(test)]
mod tests {
    use survey_stats::contingency::ContingencyError;

    use super::*;
    use crate::dataset::{Schema, Value};

    fn dataset(rows: &[(Option<&str>, Option<&str>)]) -> Dataset {
        let schema = Schema::new().categorical("acl").categorical("gender");
        let value = |v: Option<&str>| v.map_or(Value::Missing, Value::text);
        let rows = rows.iter().map(|&(a, g)| vec![value(a), value(g)]).collect();
        Dataset::from_rows(schema, rows).unwrap()
    }

    type Row = (Option<&'static str>, Option<&'static str>);

    fn counts(cells: &[(&'static str, &'static str, usize)]) -> Vec<Row> {
        cells
            .iter()
            .flat_map(|&(a, g, n)| std::iter::repeat_n((Some(a), Some(g)), n))
            .collect()
    }

    #[test]
    fn test_expected_total_matches_observed() {
        let rows = counts(&[
            ("Low", "F", 120),
            ("Low", "M", 90),
            ("High", "F", 40),
            ("High", "M", 80),
        ]);
        let analysis = ContingencyAnalyzer::default()
            .analyze(&dataset(&rows))
            .unwrap();

        assert_eq!(analysis.observed.grand_total(), 330);
        assert!((analysis.expected.total() - 330.0).abs() < 1e-9);
        assert!(analysis.chi_square.statistic >= 0.0);
        assert!(analysis.chi_square.is_significant(0.001));
        // High row: 40 of 120 are F
        let high = analysis
            .row_percentages
            .get_by_label("High", "F")
            .unwrap();
        assert!((high - 100.0 * 40.0 / 120.0).abs() < 1e-9);
        let expected = analysis.expected.get_by_label("High", "F").unwrap();
        assert!((expected - 120.0 * 160.0 / 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_proportional_rows_are_independent() {
        let rows = counts(&[
            ("Low", "F", 60),
            ("Low", "M", 40),
            ("High", "F", 30),
            ("High", "M", 20),
        ]);
        let analysis = ContingencyAnalyzer::default()
            .analyze(&dataset(&rows))
            .unwrap();
        assert!(analysis.chi_square.statistic.abs() < 1e-9);
    }

    #[test]
    fn test_yates_flag_is_honoured() {
        let rows = counts(&[
            ("Low", "F", 20),
            ("Low", "M", 10),
            ("High", "F", 10),
            ("High", "M", 20),
        ]);
        let analyzer = ContingencyAnalyzer {
            yates_correction: true,
            ..ContingencyAnalyzer::default()
        };
        let corrected = analyzer.analyze(&dataset(&rows)).unwrap();
        let plain = ContingencyAnalyzer::default()
            .analyze(&dataset(&rows))
            .unwrap();

        assert!(corrected.yates_corrected);
        assert!(corrected.chi_square.statistic < plain.chi_square.statistic);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let mut rows = counts(&[
            ("Low", "F", 3),
            ("Low", "M", 3),
            ("High", "F", 3),
            ("High", "M", 3),
        ]);
        rows.push((None, Some("F")));
        rows.push((Some("Low"), None));
        let table = ContingencyAnalyzer::default()
            .observed(&dataset(&rows))
            .unwrap();
        assert_eq!(table.grand_total(), 12);
    }

    #[test]
    fn test_single_label_is_degenerate() {
        let rows = counts(&[("Low", "F", 5), ("Low", "M", 5)]);
        assert_eq!(
            ContingencyAnalyzer::default().analyze(&dataset(&rows)),
            Err(AnalysisError::Contingency(ContingencyError::TooSmall {
                rows: 1,
                columns: 2
            }))
        );
        assert!(
            ContingencyAnalyzer::default()
                .analyze(&dataset(&[]))
                .unwrap_err()
                .is_insufficient_data()
        );
    }
}
