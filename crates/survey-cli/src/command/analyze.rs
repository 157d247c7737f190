use std::{io, path::PathBuf};

use clap::Args;
use survey_analysis::{
    AnalysisError,
    report::{AnalysisReport, ReportConfig},
};
use survey_stats::{
    contingency::LabeledMatrix, descriptive::DescriptiveStats, hypothesis::TestResult,
    interval::ConfidenceInterval,
};

use crate::{
    data::{self, DataArg},
    util::{self, OutputFormat},
};

/// Level at which the text report marks a test as significant.
const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Dataset file (.json, or delimited text with a header row)
    input: PathBuf,

    #[command(flatten)]
    data: DataArg,

    /// Report configuration JSON file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Categorical columns filtered for rare levels, in order (comma-separated)
    #[arg(long, value_delimiter = ',')]
    filter: Option<Vec<String>>,

    /// Minimum number of rows for a level to be kept
    #[arg(long)]
    min_count: Option<usize>,

    /// Numeric outcome column compared between the index labels
    #[arg(long)]
    outcome: Option<String>,

    /// Categorical column tested for independence from the index label
    #[arg(long)]
    contingency_column: Option<String>,

    /// Confidence level of the mean interval
    #[arg(long)]
    mean_confidence: Option<f64>,

    /// Confidence level of the proportion interval
    #[arg(long)]
    proportion_confidence: Option<f64>,

    /// Index label whose proportion is estimated
    #[arg(long)]
    proportion_level: Option<String>,

    /// Apply Yates' continuity correction to 2x2 tables
    #[arg(long)]
    yates: bool,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl AnalyzeArg {
    fn report_config(&self) -> anyhow::Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("report config", path)?,
            None => ReportConfig::default(),
        };
        if let Some(columns) = &self.filter {
            config.filter_columns.clone_from(columns);
        }
        if let Some(min_count) = self.min_count {
            config.level_filter.min_count = min_count;
        }
        if let Some(outcome) = &self.outcome {
            config.outcome_column.clone_from(outcome);
        }
        if let Some(column) = &self.contingency_column {
            config.contingency_column.clone_from(column);
        }
        if let Some(confidence) = self.mean_confidence {
            config.mean_confidence = confidence;
        }
        if let Some(confidence) = self.proportion_confidence {
            config.proportion_confidence = confidence;
        }
        if let Some(level) = &self.proportion_level {
            config.proportion_level.clone_from(level);
        }
        config.yates_correction |= self.yates;
        Ok(config)
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = arg.report_config()?;
    let dataset = data::load_dataset(&arg.input, &arg.data)?;
    let report = AnalysisReport::run(dataset, &config).map_err(describe_failure)?;
    util::emit(&report, arg.format, arg.output.as_deref(), |w| {
        write_report(w, &report)
    })
}

fn describe_failure(err: AnalysisError) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(format!("Analysis stopped: {kind}"))
}

fn write_report(w: &mut dyn io::Write, report: &AnalysisReport) -> io::Result<()> {
    let config = &report.config;

    writeln!(w, "Survey Analysis Report ({})", report.generated_at.to_rfc3339())?;
    writeln!(w, "==========================================")?;
    writeln!(
        w,
        "Rows: {} read, {} analyzed",
        report.rows_input, report.rows_analyzed
    )?;
    writeln!(w)?;

    writeln!(w, "Level filtering (min count {}):", config.level_filter.min_count)?;
    for outcome in &report.filters {
        let levels = |counts: &[survey_analysis::level_filter::LevelCount]| {
            counts
                .iter()
                .map(|lc| format!("{} ({})", lc.level, lc.count))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(
            w,
            "  {}: kept [{}], removed [{}], {} row(s) dropped",
            outcome.column,
            levels(&outcome.retained),
            levels(&outcome.removed),
            outcome.rows_dropped
        )?;
    }
    for column in &report.skipped_columns {
        writeln!(w, "  {column}: not in dataset, skipped")?;
    }
    writeln!(w)?;

    write_summary(w, &config.outcome_column, &report.outcome_summary)?;
    write_summary(w, &config.index.index_column, &report.index_summary)?;
    writeln!(w)?;

    writeln!(w, "Confidence intervals:")?;
    write_interval(w, &format!("mean {}", config.outcome_column), &report.mean_interval)?;
    let proportion = &report.proportion;
    write_interval(
        w,
        &format!(
            "P({} = {}) = {:.4}, n = {}",
            proportion.proportion.column,
            proportion.proportion.level,
            proportion.proportion.proportion,
            proportion.proportion.n
        ),
        &proportion.interval,
    )?;
    writeln!(w)?;

    let groups = &report.groups;
    writeln!(
        w,
        "{} by {}:",
        groups.outcome_column, groups.group_column
    )?;
    writeln!(w, "  {:<8} {:>6} {:>10} {:>10}", "group", "n", "mean", "variance")?;
    for group in &groups.variances {
        writeln!(
            w,
            "  {:<8} {:>6} {:>10.4} {:>10.4}",
            group.label, group.summary.len, group.summary.mean, group.summary.variance
        )?;
    }
    write_test(w, "Bartlett", &groups.bartlett)?;
    write_test(w, "pooled t", &groups.t_test)?;
    writeln!(w)?;

    let contingency = &report.contingency;
    writeln!(
        w,
        "{} x {} (observed):",
        contingency.row_column, contingency.column_column
    )?;
    write!(w, "{}", contingency.observed)?;
    writeln!(w, "expected:")?;
    write_matrix(w, &contingency.expected, 2)?;
    writeln!(w, "row percentages:")?;
    write_matrix(w, &contingency.row_percentages, 1)?;
    let name = if contingency.yates_corrected {
        "chi-square (Yates)"
    } else {
        "chi-square"
    };
    write_test(w, name, &contingency.chi_square)?;
    Ok(())
}

fn write_summary(w: &mut dyn io::Write, column: &str, stats: &DescriptiveStats) -> io::Result<()> {
    let optional = |v: Option<f64>| v.map_or_else(|| "-".to_owned(), |v| format!("{v:.4}"));
    writeln!(
        w,
        "{column}: count {}, mean {:.4}, std {}, min {}, 25% {}, 50% {}, 75% {}, max {}, skew {}, kurt {}",
        stats.count,
        stats.mean,
        optional(stats.std_dev),
        stats.min,
        stats.p25,
        stats.median,
        stats.p75,
        stats.max,
        optional(stats.skewness),
        optional(stats.kurtosis),
    )
}

fn write_interval(w: &mut dyn io::Write, label: &str, ci: &ConfidenceInterval) -> io::Result<()> {
    writeln!(
        w,
        "  {label}: {:.0}% CI [{:.4}, {:.4}]",
        ci.confidence * 100.0,
        ci.lower,
        ci.upper
    )
}

fn write_test(w: &mut dyn io::Write, name: &str, test: &TestResult) -> io::Result<()> {
    write!(
        w,
        "  {name}: statistic {:.4}, p-value {:.4}",
        test.statistic, test.p_value
    )?;
    if let Some(df) = test.degrees_of_freedom {
        write!(w, ", df {df}")?;
    }
    if test.is_significant(SIGNIFICANCE_LEVEL) {
        write!(w, " (significant at {:.0}%)", SIGNIFICANCE_LEVEL * 100.0)?;
    }
    writeln!(w)
}

fn write_matrix(
    w: &mut dyn io::Write,
    matrix: &LabeledMatrix<f64>,
    precision: usize,
) -> io::Result<()> {
    write!(w, "{:<12}", "")?;
    for label in matrix.column_labels() {
        write!(w, " {label:>10}")?;
    }
    writeln!(w)?;
    for (label, row) in matrix.rows() {
        write!(w, "{label:<12}")?;
        for value in row {
            write!(w, " {value:>10.precision$}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}
