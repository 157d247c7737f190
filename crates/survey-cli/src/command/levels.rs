use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use survey_analysis::level_filter::{ColumnFilterOutcome, DEFAULT_MIN_COUNT, LevelFilter};

use crate::{
    data::{self, DataArg},
    util::{self, OutputFormat},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct LevelsArg {
    /// Dataset file (.json, or delimited text with a header row)
    input: PathBuf,

    #[command(flatten)]
    data: DataArg,

    /// Categorical columns to filter, in order (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    columns: Vec<String>,

    /// Minimum number of rows for a level to be kept
    #[arg(long, default_value_t = DEFAULT_MIN_COUNT)]
    min_count: usize,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct LevelsReport {
    min_count: usize,
    rows_input: usize,
    rows_retained: usize,
    columns: Vec<ColumnFilterOutcome>,
    skipped_columns: Vec<String>,
}

pub(crate) fn run(arg: &LevelsArg) -> anyhow::Result<()> {
    let dataset = data::load_dataset(&arg.input, &arg.data)?;
    let rows_input = dataset.len();

    let (present, skipped_columns): (Vec<_>, Vec<_>) = arg
        .columns
        .iter()
        .cloned()
        .partition(|column| dataset.schema().contains(column));
    for column in &skipped_columns {
        tracing::warn!(column, "column not in dataset, skipped");
    }

    let filter = LevelFilter::new(arg.min_count);
    let outcome = filter
        .apply(dataset, &present)
        .context("Failed to filter levels")?;
    let report = LevelsReport {
        min_count: arg.min_count,
        rows_input,
        rows_retained: outcome.dataset.len(),
        columns: outcome.columns,
        skipped_columns,
    };
    util::emit(&report, arg.format, arg.output.as_deref(), |w| {
        write_levels(w, &report)
    })
}

fn write_levels(w: &mut dyn io::Write, report: &LevelsReport) -> io::Result<()> {
    writeln!(w, "Level filtering (min count {})", report.min_count)?;
    writeln!(w, "====================================")?;
    for column in &report.columns {
        writeln!(w)?;
        writeln!(w, "{}:", column.column)?;
        writeln!(w, "  {:<16} {:>8}  {}", "level", "count", "status")?;
        let kept = column.retained.iter().map(|lc| (lc, "kept"));
        let removed = column.removed.iter().map(|lc| (lc, "removed"));
        for (lc, status) in kept.chain(removed) {
            writeln!(w, "  {:<16} {:>8}  {status}", lc.level, lc.count)?;
        }
        writeln!(w, "  rows dropped: {}", column.rows_dropped)?;
    }
    for column in &report.skipped_columns {
        writeln!(w)?;
        writeln!(w, "{column}: not in dataset, skipped")?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "Rows: {} read, {} retained",
        report.rows_input, report.rows_retained
    )
}

#[cfg(test)]
mod tests {
    use survey_analysis::level_filter::LevelCount;

    use super::*;

    #[test]
    fn test_write_levels() {
        let report = LevelsReport {
            min_count: 30,
            rows_input: 80,
            rows_retained: 70,
            columns: vec![ColumnFilterOutcome {
                column: "Mjob".into(),
                retained: vec![LevelCount {
                    level: "other".into(),
                    count: 70,
                }],
                removed: vec![LevelCount {
                    level: "health".into(),
                    count: 10,
                }],
                rows_dropped: 10,
            }],
            skipped_columns: vec!["Fjob".into()],
        };
        let mut buf = Vec::new();
        write_levels(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("  other                  70  kept"));
        assert!(text.contains("  health                 10  removed"));
        assert!(text.contains("  rows dropped: 10"));
        assert!(text.contains("Fjob: not in dataset, skipped"));
        assert!(text.ends_with("Rows: 80 read, 70 retained\n"));
    }
}
