//! Dataset loading
//!
//! Datasets are read either from a JSON document holding a schema and its
//! records, or from a delimited text file with a header row. For delimited
//! files the column kinds are inferred: a column is numeric when every
//! non-empty cell parses as a finite number, categorical otherwise. Tokens
//! such as `nan` or `inf` are therefore labels. Empty cells are missing
//! values, and a column with no non-empty cell is numeric.

use std::{fs::File, io, path::Path};

use anyhow::Context;
use clap::Args;
use survey_analysis::dataset::{Dataset, Schema, Value};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct DataArg {
    /// Field delimiter of delimited input files
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Columns read as categorical even if every value is numeric (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub categorical: Vec<String>,

    /// Column renames applied after reading, as OLD=NEW (e.g. sex=gender)
    #[arg(long = "rename", value_parser = parse_rename)]
    pub renames: Vec<(String, String)>,
}

impl Default for DataArg {
    fn default() -> Self {
        Self {
            delimiter: ';',
            categorical: vec![],
            renames: vec![],
        }
    }
}

fn parse_rename(s: &str) -> Result<(String, String), String> {
    let (old, new) = s
        .split_once('=')
        .ok_or_else(|| format!("expected OLD=NEW, got '{s}'"))?;
    if old.is_empty() || new.is_empty() {
        return Err(format!("expected OLD=NEW, got '{s}'"));
    }
    Ok((old.to_owned(), new.to_owned()))
}

/// Loads a dataset, choosing the format from the file extension.
pub(crate) fn load_dataset(path: &Path, arg: &DataArg) -> anyhow::Result<Dataset> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let dataset: Dataset = if is_json {
        util::read_json_file("dataset", path)?
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;
        read_delimited(io::BufReader::new(file), arg)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?
    };
    tracing::info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.schema().len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Reads a delimited table with a header row.
pub(crate) fn read_delimited<R>(reader: R, arg: &DataArg) -> anyhow::Result<Dataset>
where
    R: io::Read,
{
    let delimiter = u8::try_from(arg.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter must be an ASCII character: {:?}", arg.delimiter))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|header| rename(header, &arg.renames))
        .collect::<Vec<_>>();
    let rows = reader
        .records()
        .enumerate()
        .map(|(row, record)| record.with_context(|| format!("Failed to read row {row}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    for column in &arg.categorical {
        if !headers.contains(column) {
            tracing::warn!(column, "categorical override names an unknown column");
        }
    }

    let mut schema = Schema::new();
    let mut numeric = Vec::with_capacity(headers.len());
    for (i, name) in headers.iter().enumerate() {
        let is_numeric = !arg.categorical.contains(name)
            && rows
                .iter()
                .filter_map(|r| r.get(i))
                .filter(|c| !c.is_empty())
                .all(|c| c.parse::<f64>().is_ok_and(f64::is_finite));
        schema = if is_numeric {
            schema.numeric(name.clone())
        } else {
            schema.categorical(name.clone())
        };
        numeric.push(is_numeric);
    }

    let rows = rows
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&numeric)
                .map(|(cell, &is_numeric)| match (cell.is_empty(), is_numeric) {
                    (true, _) => Value::Missing,
                    // the column was only inferred numeric if every cell parsed
                    (false, true) => cell.parse().map_or(Value::Missing, Value::Number),
                    (false, false) => Value::text(cell),
                })
                .collect()
        })
        .collect();
    Dataset::from_rows(schema, rows).context("Dataset does not match its header")
}

fn rename(header: &str, renames: &[(String, String)]) -> String {
    renames
        .iter()
        .find(|(old, _)| old == header)
        .map_or(header, |(_, new)| new.as_str())
        .to_owned()
}

#[cfg(test)]
mod tests {
    use survey_analysis::dataset::ColumnKind;

    use super::*;

    const STUDENTS: &str = "\
school;sex;age;Dalc;Walc;G3
\"GP\";\"F\";18;1;1;6
\"GP\";\"F\";17;1;1;6
\"MS\";\"M\";15;2;3;
";

    fn kinds(dataset: &Dataset) -> Vec<(&str, ColumnKind)> {
        dataset
            .schema()
            .columns()
            .iter()
            .map(|c| (c.name.as_str(), c.kind))
            .collect()
    }

    #[test]
    fn test_infers_column_kinds() {
        let dataset = read_delimited(STUDENTS.as_bytes(), &DataArg::default()).unwrap();
        assert_eq!(
            kinds(&dataset),
            [
                ("school", ColumnKind::Categorical),
                ("sex", ColumnKind::Categorical),
                ("age", ColumnKind::Numeric),
                ("Dalc", ColumnKind::Numeric),
                ("Walc", ColumnKind::Numeric),
                ("G3", ColumnKind::Numeric),
            ]
        );
        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.categorical_values("sex").unwrap(),
            ["F", "F", "M"]
        );
    }

    #[test]
    fn test_empty_cell_is_missing() {
        let dataset = read_delimited(STUDENTS.as_bytes(), &DataArg::default()).unwrap();
        assert_eq!(
            dataset.numeric_column("G3").unwrap(),
            [Some(6.0), Some(6.0), None]
        );
    }

    #[test]
    fn test_non_finite_tokens_are_labels() {
        let dataset = read_delimited("G3;g\nnan;a\n1;b\n".as_bytes(), &DataArg::default()).unwrap();
        assert_eq!(
            kinds(&dataset),
            [("G3", ColumnKind::Categorical), ("g", ColumnKind::Categorical)]
        );
        assert_eq!(dataset.categorical_values("G3").unwrap(), ["nan", "1"]);

        let dataset = read_delimited("x\n2\n-inf\n".as_bytes(), &DataArg::default()).unwrap();
        assert_eq!(kinds(&dataset), [("x", ColumnKind::Categorical)]);
    }

    #[test]
    fn test_empty_columns_are_numeric() {
        let dataset = read_delimited("Dalc;Walc;G3\n".as_bytes(), &DataArg::default()).unwrap();
        assert!(dataset.is_empty());
        assert!(kinds(&dataset).iter().all(|(_, kind)| *kind == ColumnKind::Numeric));

        let dataset = read_delimited("x;y\n1;\n2;\n".as_bytes(), &DataArg::default()).unwrap();
        assert_eq!(dataset.numeric_column("y").unwrap(), [None, None]);
    }

    #[test]
    fn test_overrides_and_renames() {
        let arg = DataArg {
            categorical: vec!["age".into()],
            renames: vec![("sex".into(), "gender".into())],
            ..DataArg::default()
        };
        let dataset = read_delimited(STUDENTS.as_bytes(), &arg).unwrap();

        assert!(dataset.schema().contains("gender"));
        assert!(!dataset.schema().contains("sex"));
        assert_eq!(
            dataset.categorical_values("age").unwrap(),
            ["18", "17", "15"]
        );
    }

    #[test]
    fn test_comma_delimiter() {
        let arg = DataArg {
            delimiter: ',',
            ..DataArg::default()
        };
        let dataset = read_delimited("x,y\n1,a\n2,b\n".as_bytes(), &arg).unwrap();
        assert_eq!(dataset.numeric_values("x").unwrap(), [1.0, 2.0]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        assert!(read_delimited("a;b\n1;2\n3\n".as_bytes(), &DataArg::default()).is_err());
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            parse_rename("sex=gender").unwrap(),
            ("sex".to_owned(), "gender".to_owned())
        );
        assert!(parse_rename("sex").is_err());
        assert!(parse_rename("=gender").is_err());
    }
}
