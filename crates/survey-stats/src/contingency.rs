//! Contingency tables and the chi-square test of independence
//!
//! A [`ContingencyTable`] cross-tabulates the co-occurrence counts of two
//! categorical variables. Row and column categories are kept in ascending
//! label order. Under independence the expected count of a cell is
//! `row_total * column_total / grand_total`, and Pearson's statistic
//! `Σ (observed - expected)² / expected` follows a chi-square distribution
//! with `(rows - 1) * (columns - 1)` degrees of freedom.
//!
//! # Examples
//!
//! ```
//! use survey_stats::contingency::ContingencyTable;
//!
//! let pairs = [("Low", "F"), ("Low", "M"), ("High", "M"), ("Low", "F"), ("High", "F")];
//! let table = ContingencyTable::from_pairs(pairs);
//!
//! assert_eq!(table.row_labels(), ["High", "Low"]);
//! assert_eq!(table.column_labels(), ["F", "M"]);
//! assert_eq!(table.count(1, 0), 2);
//! assert_eq!(table.grand_total(), 5);
//! ```

use std::{collections::BTreeMap, fmt};

use crate::{
    distribution::{DistributionError, chi_squared_sf},
    hypothesis::TestResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, serde::Serialize)]
pub enum Axis {
    #[display("row")]
    Row,
    #[display("column")]
    Column,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ContingencyError {
    #[display("Contingency table is {rows}x{columns}, at least 2x2 required")]
    #[from(ignore)]
    TooSmall { rows: usize, columns: usize },
    #[display("Contingency table {axis} '{label}' has a zero total")]
    #[from(ignore)]
    ZeroMargin { axis: Axis, label: String },
    #[display("Contingency cell counts do not match a {rows}x{columns} shape")]
    #[from(ignore)]
    ShapeMismatch { rows: usize, columns: usize },
    #[display("{_0}")]
    Distribution(DistributionError),
}

/// A two-dimensional table of values indexed by row and column labels.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LabeledMatrix<T> {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    cells: Vec<Vec<T>>,
}

impl<T> LabeledMatrix<T>
where
    T: Copy,
{
    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    #[must_use]
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> T {
        self.cells[row][column]
    }

    /// Looks a cell up by its labels.
    #[must_use]
    pub fn get_by_label(&self, row: &str, column: &str) -> Option<T> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        Some(self.cells[r][c])
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[T])> + '_ {
        self.row_labels
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(Vec::as_slice))
    }

    fn map<U, F>(&self, mut f: F) -> LabeledMatrix<U>
    where
        F: FnMut(usize, usize, T) -> U,
    {
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(r, row)| row.iter().enumerate().map(|(c, &v)| f(r, c, v)).collect())
            .collect();
        LabeledMatrix {
            row_labels: self.row_labels.clone(),
            column_labels: self.column_labels.clone(),
            cells,
        }
    }
}

impl LabeledMatrix<f64> {
    /// Sum of every cell.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }
}

/// Observed co-occurrence counts of two categorical variables with their
/// margins.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ContingencyTable {
    observed: LabeledMatrix<u64>,
    row_totals: Vec<u64>,
    column_totals: Vec<u64>,
    grand_total: u64,
}

/// Result of a chi-square test of independence.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChiSquareTest {
    pub test: TestResult,
    pub expected: LabeledMatrix<f64>,
    /// Whether Yates' continuity correction was applied (2x2 tables only).
    pub yates_corrected: bool,
}

impl ContingencyTable {
    /// Counts co-occurring `(row, column)` category pairs.
    pub fn from_pairs<I, R, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
        R: AsRef<str>,
        C: AsRef<str>,
    {
        let mut counts = BTreeMap::<(String, String), u64>::new();
        for (row, column) in pairs {
            *counts
                .entry((row.as_ref().to_owned(), column.as_ref().to_owned()))
                .or_default() += 1;
        }

        let mut row_labels = counts.keys().map(|(r, _)| r.clone()).collect::<Vec<_>>();
        row_labels.dedup();
        let mut column_labels = counts.keys().map(|(_, c)| c.clone()).collect::<Vec<_>>();
        column_labels.sort();
        column_labels.dedup();

        let cells = row_labels
            .iter()
            .map(|r| {
                column_labels
                    .iter()
                    .map(|c| {
                        counts
                            .get(&(r.clone(), c.clone()))
                            .copied()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Self::from_matrix(LabeledMatrix {
            row_labels,
            column_labels,
            cells,
        })
    }

    /// Builds a table from explicit labels and a row-major grid of counts.
    pub fn from_counts(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        cells: Vec<Vec<u64>>,
    ) -> Result<Self, ContingencyError> {
        let (rows, columns) = (row_labels.len(), column_labels.len());
        if cells.len() != rows || cells.iter().any(|row| row.len() != columns) {
            return Err(ContingencyError::ShapeMismatch { rows, columns });
        }
        Ok(Self::from_matrix(LabeledMatrix {
            row_labels,
            column_labels,
            cells,
        }))
    }

    fn from_matrix(observed: LabeledMatrix<u64>) -> Self {
        let row_totals = observed
            .cells
            .iter()
            .map(|row| row.iter().sum())
            .collect::<Vec<u64>>();
        let column_totals = (0..observed.column_labels.len())
            .map(|c| observed.cells.iter().map(|row| row[c]).sum())
            .collect::<Vec<u64>>();
        let grand_total = row_totals.iter().sum();
        Self {
            observed,
            row_totals,
            column_totals,
            grand_total,
        }
    }

    #[must_use]
    pub fn observed(&self) -> &LabeledMatrix<u64> {
        &self.observed
    }

    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        self.observed.row_labels()
    }

    #[must_use]
    pub fn column_labels(&self) -> &[String] {
        self.observed.column_labels()
    }

    #[must_use]
    pub fn count(&self, row: usize, column: usize) -> u64 {
        self.observed.get(row, column)
    }

    #[must_use]
    pub fn row_totals(&self) -> &[u64] {
        &self.row_totals
    }

    #[must_use]
    pub fn column_totals(&self) -> &[u64] {
        &self.column_totals
    }

    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    /// Number of degrees of freedom of the independence test.
    #[must_use]
    pub fn degrees_of_freedom(&self) -> usize {
        self.row_labels().len().saturating_sub(1) * self.column_labels().len().saturating_sub(1)
    }

    fn validate(&self) -> Result<(), ContingencyError> {
        let (rows, columns) = (self.row_labels().len(), self.column_labels().len());
        if rows < 2 || columns < 2 {
            return Err(ContingencyError::TooSmall { rows, columns });
        }
        let zero_margin = |axis, labels: &[String], totals: &[u64]| {
            labels
                .iter()
                .zip(totals)
                .find(|(_, total)| **total == 0)
                .map(|(label, _)| ContingencyError::ZeroMargin {
                    axis,
                    label: label.clone(),
                })
        };
        if let Some(err) = zero_margin(Axis::Row, self.row_labels(), &self.row_totals) {
            return Err(err);
        }
        if let Some(err) = zero_margin(Axis::Column, self.column_labels(), &self.column_totals) {
            return Err(err);
        }
        Ok(())
    }

    /// Expected counts under independence: `row_total * column_total / grand_total`.
    #[expect(clippy::cast_precision_loss)]
    pub fn expected(&self) -> Result<LabeledMatrix<f64>, ContingencyError> {
        self.validate()?;
        let grand_total = self.grand_total as f64;
        Ok(self.observed.map(|r, c, _| {
            self.row_totals[r] as f64 * self.column_totals[c] as f64 / grand_total
        }))
    }

    /// Pearson's chi-square test of independence.
    ///
    /// # Examples
    ///
    /// ```
    /// use survey_stats::contingency::ContingencyTable;
    ///
    /// let table = ContingencyTable::from_counts(
    ///     vec!["a".into(), "b".into()],
    ///     vec!["x".into(), "y".into()],
    ///     vec![vec![10, 20], vec![20, 40]],
    /// )
    /// .unwrap();
    /// let chi2 = table.chi_square().unwrap();
    /// assert!(chi2.test.statistic.abs() < 1e-12);
    /// assert_eq!(chi2.test.degrees_of_freedom, Some(1));
    /// ```
    pub fn chi_square(&self) -> Result<ChiSquareTest, ContingencyError> {
        self.chi_square_test(false)
    }

    /// Chi-square test with Yates' continuity correction on 2x2 tables.
    ///
    /// Each `|observed - expected|` is reduced by 0.5 (but not below zero)
    /// before squaring. Tables with more than one degree of freedom are left
    /// uncorrected.
    pub fn chi_square_yates(&self) -> Result<ChiSquareTest, ContingencyError> {
        self.chi_square_test(true)
    }

    #[expect(clippy::cast_precision_loss)]
    fn chi_square_test(&self, yates: bool) -> Result<ChiSquareTest, ContingencyError> {
        let expected = self.expected()?;
        let df = self.degrees_of_freedom();
        let yates_corrected = yates && df == 1;

        let mut statistic = 0.0;
        for (r, row) in self.observed.cells.iter().enumerate() {
            for (c, &observed) in row.iter().enumerate() {
                let e = expected.get(r, c);
                let mut diff = (observed as f64 - e).abs();
                if yates_corrected {
                    diff -= diff.min(0.5);
                }
                statistic += diff * diff / e;
            }
        }

        let p_value = chi_squared_sf(statistic, df as f64)?;
        Ok(ChiSquareTest {
            test: TestResult::new(statistic, p_value).with_degrees_of_freedom(df),
            expected,
            yates_corrected,
        })
    }

    /// Row-normalized percentages: each cell divided by its row total, times 100.
    ///
    /// Rows whose total is zero are reported as zero percent.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn row_percentages(&self) -> LabeledMatrix<f64> {
        self.observed.map(|r, _, count| match self.row_totals[r] {
            0 => 0.0,
            total => 100.0 * count as f64 / total as f64,
        })
    }
}

impl fmt::Display for ContingencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", "")?;
        for label in self.column_labels() {
            write!(f, " {label:>10}")?;
        }
        writeln!(f, " {:>10}", "Total")?;
        for ((label, row), total) in self.observed.rows().zip(&self.row_totals) {
            write!(f, "{label:<12}")?;
            for count in row {
                write!(f, " {count:>10}")?;
            }
            writeln!(f, " {total:>10}")?;
        }
        write!(f, "{:<12}", "Total")?;
        for total in &self.column_totals {
            write!(f, " {total:>10}")?;
        }
        writeln!(f, " {:>10}", self.grand_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cells: Vec<Vec<u64>>) -> ContingencyTable {
        let rows = (0..cells.len()).map(|i| format!("r{i}")).collect();
        let columns = (0..cells[0].len()).map(|i| format!("c{i}")).collect();
        ContingencyTable::from_counts(rows, columns, cells).unwrap()
    }

    #[test]
    fn test_margins_agree() {
        let table = table(vec![vec![3, 5, 0], vec![7, 1, 4]]);
        let cells = table.observed().rows().flat_map(|(_, r)| r).sum::<u64>();

        assert_eq!(table.row_totals(), [8, 12]);
        assert_eq!(table.column_totals(), [10, 6, 4]);
        assert_eq!(cells, table.grand_total());
        assert_eq!(table.row_totals().iter().sum::<u64>(), table.grand_total());
        assert_eq!(table.column_totals().iter().sum::<u64>(), table.grand_total());
    }

    #[expect(clippy::cast_precision_loss)]
    #[test]
    fn test_expected_preserves_total() {
        let table = table(vec![vec![12, 5, 9], vec![3, 17, 8], vec![6, 6, 1]]);
        let expected = table.expected().unwrap();

        assert!((expected.total() - table.grand_total() as f64).abs() < 1e-9);
        assert!((expected.get(0, 0) - 26.0 * 21.0 / 67.0).abs() < 1e-12);
    }

    #[test]
    fn test_independent_table_has_zero_statistic() {
        let table = table(vec![vec![5, 10, 15], vec![10, 20, 30], vec![2, 4, 6]]);
        let chi2 = table.chi_square().unwrap();

        assert!(chi2.test.statistic.abs() < 1e-9);
        assert!((chi2.test.p_value - 1.0).abs() < 1e-6);
        assert_eq!(chi2.test.degrees_of_freedom, Some(4));
    }

    #[test]
    fn test_pearson_reference_value() {
        // Expected counts are 15/15/15/15, so each cell contributes 25/15
        let table = table(vec![vec![20, 10], vec![10, 20]]);
        let chi2 = table.chi_square().unwrap();

        assert!((chi2.test.statistic - 100.0 / 15.0).abs() < 1e-12);
        assert!(chi2.test.statistic >= 0.0);
        assert!(chi2.test.is_significant(0.01));
        assert!(!chi2.yates_corrected);
    }

    #[test]
    fn test_yates_correction_on_two_by_two() {
        let table = table(vec![vec![20, 10], vec![10, 20]]);
        let chi2 = table.chi_square_yates().unwrap();

        // |O - E| = 5 becomes 4.5 after the correction
        assert!((chi2.test.statistic - 4.0 * 4.5 * 4.5 / 15.0).abs() < 1e-12);
        assert!(chi2.yates_corrected);
    }

    #[test]
    fn test_yates_ignored_for_larger_tables() {
        let table = table(vec![vec![20, 10, 5], vec![10, 20, 5]]);
        let plain = table.chi_square().unwrap();
        let yates = table.chi_square_yates().unwrap();

        assert_eq!(plain.test.statistic, yates.test.statistic);
        assert!(!yates.yates_corrected);
    }

    #[test]
    fn test_degenerate_tables() {
        let single_row = table(vec![vec![4, 5]]);
        assert_eq!(
            single_row.chi_square(),
            Err(ContingencyError::TooSmall {
                rows: 1,
                columns: 2
            })
        );

        let zero_column = table(vec![vec![4, 0], vec![6, 0]]);
        assert_eq!(
            zero_column.expected(),
            Err(ContingencyError::ZeroMargin {
                axis: Axis::Column,
                label: "c1".into()
            })
        );

        let zero_row = table(vec![vec![0, 0], vec![6, 2]]);
        assert!(matches!(
            zero_row.chi_square(),
            Err(ContingencyError::ZeroMargin { axis: Axis::Row, .. })
        ));
    }

    #[test]
    fn test_from_counts_rejects_ragged_grid() {
        let result = ContingencyTable::from_counts(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            vec![vec![1, 2], vec![3]],
        );
        assert_eq!(
            result,
            Err(ContingencyError::ShapeMismatch {
                rows: 2,
                columns: 2
            })
        );
    }

    #[test]
    fn test_row_percentages() {
        let table = table(vec![vec![1, 3], vec![5, 5]]);
        let percentages = table.row_percentages();

        assert!((percentages.get(0, 0) - 25.0).abs() < 1e-12);
        assert!((percentages.get(0, 1) - 75.0).abs() < 1e-12);
        assert!((percentages.get(1, 0) - 50.0).abs() < 1e-12);
        for (_, row) in percentages.rows() {
            assert!((row.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_from_pairs_fills_missing_combinations() {
        let table = ContingencyTable::from_pairs([("a", "x"), ("b", "y"), ("b", "y")]);

        assert_eq!(table.count(0, 1), 0);
        assert_eq!(table.observed().get_by_label("b", "y"), Some(2));
        assert_eq!(table.observed().get_by_label("c", "y"), None);
    }

    #[test]
    fn test_display_includes_totals() {
        let table = table(vec![vec![1, 2], vec![3, 4]]);
        let rendered = table.to_string();

        assert!(rendered.contains("Total"));
        assert_eq!(rendered.lines().count(), 4);
    }
}
