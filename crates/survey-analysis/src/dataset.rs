//! Typed tabular data
//!
//! A [`Dataset`] is an ordered collection of [`Record`]s sharing one
//! [`Schema`]. The schema names every column and declares whether it holds
//! numbers or category labels; components look columns up through the schema
//! and get a [`SchemaError`] when a column they require is absent or of the
//! wrong kind.
//!
//! Datasets are only changed by row removal and column addition, both of which
//! consume the dataset and return a new one.
//!
//! # Examples
//!
//! ```
//! use survey_analysis::dataset::{Dataset, Schema, Value};
//!
//! let schema = Schema::new()
//!     .numeric("G3")
//!     .categorical("gender");
//! let dataset = Dataset::from_rows(
//!     schema,
//!     vec![
//!         vec![Value::Number(12.0), Value::text("F")],
//!         vec![Value::Number(9.0), Value::text("M")],
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.numeric_values("G3").unwrap(), [12.0, 9.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[display("numeric")]
    Numeric,
    #[display("categorical")]
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("Required column '{column}' is absent")]
    MissingColumn { column: String },
    #[display("Column '{column}' is {actual}, expected {expected}")]
    WrongKind {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
    #[display("Column '{column}' is declared more than once")]
    DuplicateColumn { column: String },
    #[display("Row {row} has {actual} value(s), schema declares {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("Row {row} holds a non-{expected} value in column '{column}'")]
    ValueKind {
        row: usize,
        column: String,
        expected: ColumnKind,
    },
    #[display("Row {row} holds a non-finite number in column '{column}'")]
    NonFinite { row: usize, column: String },
    #[display("New column '{column}' has {actual} value(s) for {expected} row(s)")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered column declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a numeric column declaration.
    #[must_use]
    pub fn numeric(mut self, name: impl Into<String>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            kind: ColumnKind::Numeric,
        });
        self
    }

    /// Appends a categorical column declaration.
    #[must_use]
    pub fn categorical(mut self, name: impl Into<String>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            kind: ColumnKind::Categorical,
        });
        self
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Index of a column, checked against the kind the caller requires.
    pub fn require(&self, name: &str, kind: ColumnKind) -> Result<usize, SchemaError> {
        let index = self
            .position(name)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_owned(),
            })?;
        let actual = self.columns[index].kind;
        if actual != kind {
            return Err(SchemaError::WrongKind {
                column: name.to_owned(),
                expected: kind,
                actual,
            });
        }
        Ok(index)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(SchemaError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn fits(&self, kind: ColumnKind) -> bool {
        matches!(
            (self, kind),
            (Self::Missing, _)
                | (Self::Number(_), ColumnKind::Numeric)
                | (Self::Text(_), ColumnKind::Categorical)
        )
    }

    /// Checks that the value may be stored at `row` of `column`.
    fn check(&self, row: usize, column: &Column) -> Result<(), SchemaError> {
        if !self.fits(column.kind) {
            return Err(SchemaError::ValueKind {
                row,
                column: column.name.clone(),
                expected: column.kind,
            });
        }
        if matches!(self, Self::Number(v) if !v.is_finite()) {
            return Err(SchemaError::NonFinite {
                row,
                column: column.name.clone(),
            });
        }
        Ok(())
    }
}

/// One row of a dataset; values are in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

#[derive(Debug, Deserialize)]
struct DatasetParts {
    schema: Schema,
    records: Vec<Record>,
}

impl TryFrom<DatasetParts> for Dataset {
    type Error = SchemaError;

    fn try_from(parts: DatasetParts) -> Result<Self, Self::Error> {
        Dataset::from_records(parts.schema, parts.records)
    }
}

/// Records sharing a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetParts")]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

impl Dataset {
    /// Creates a dataset after checking every record against the schema.
    pub fn from_records(schema: Schema, records: Vec<Record>) -> Result<Self, SchemaError> {
        schema.validate()?;
        for (row, record) in records.iter().enumerate() {
            if record.values.len() != schema.len() {
                return Err(SchemaError::RowLength {
                    row,
                    expected: schema.len(),
                    actual: record.values.len(),
                });
            }
            for (value, column) in record.values.iter().zip(schema.columns()) {
                value.check(row, column)?;
            }
        }
        Ok(Self { schema, records })
    }

    pub fn from_rows(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self, SchemaError> {
        Self::from_records(schema, rows.into_iter().map(Record::new).collect())
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw numeric column, with `None` for missing cells.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, SchemaError> {
        let index = self.schema.require(name, ColumnKind::Numeric)?;
        Ok(self
            .records
            .iter()
            .map(|r| r.get(index).as_number())
            .collect())
    }

    /// Raw categorical column, with `None` for missing cells.
    pub fn categorical_column(&self, name: &str) -> Result<Vec<Option<&str>>, SchemaError> {
        let index = self.schema.require(name, ColumnKind::Categorical)?;
        Ok(self.records.iter().map(|r| r.get(index).as_text()).collect())
    }

    /// Every value of a numeric column, failing on the first missing cell.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, AnalysisError> {
        self.numeric_column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| AnalysisError::MissingField {
                    row,
                    column: name.to_owned(),
                })
            })
            .collect()
    }

    /// Every label of a categorical column, failing on the first missing cell.
    pub fn categorical_values(&self, name: &str) -> Result<Vec<&str>, AnalysisError> {
        self.categorical_column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| AnalysisError::MissingField {
                    row,
                    column: name.to_owned(),
                })
            })
            .collect()
    }

    /// Keeps the records for which `keep` returns `true`, in order.
    #[must_use]
    pub fn retain_records<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        self.records.retain(|r| keep(r));
        self
    }

    /// Appends a column; `values` must hold one value per record.
    pub fn with_column(
        mut self,
        column: Column,
        values: Vec<Value>,
    ) -> Result<Self, SchemaError> {
        if self.schema.contains(&column.name) {
            return Err(SchemaError::DuplicateColumn {
                column: column.name,
            });
        }
        if values.len() != self.records.len() {
            return Err(SchemaError::ColumnLength {
                column: column.name,
                expected: self.records.len(),
                actual: values.len(),
            });
        }
        for (row, value) in values.iter().enumerate() {
            value.check(row, &column)?;
        }
        for (record, value) in self.records.iter_mut().zip(values) {
            record.values.push(value);
        }
        self.schema.columns.push(column);
        Ok(self)
    }
}
