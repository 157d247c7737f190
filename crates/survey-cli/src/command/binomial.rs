use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Args;
use survey_stats::distribution::BinomialTable;

use crate::util::{self, OutputFormat};

#[derive(Debug, Clone, Args)]
pub(crate) struct BinomialArg {
    /// Number of trials
    #[arg(long, short = 'n', default_value_t = 10)]
    trials: u64,
    /// Success probability of each trial
    #[arg(long, short = 'p', default_value_t = 0.25)]
    probability: f64,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &BinomialArg) -> anyhow::Result<()> {
    let table = BinomialTable::new(arg.trials, arg.probability)
        .context("Invalid binomial parameters")?;
    util::emit(&table, arg.format, arg.output.as_deref(), |w| {
        write_table(w, &table)
    })
}

fn write_table(w: &mut dyn io::Write, table: &BinomialTable) -> io::Result<()> {
    writeln!(
        w,
        "Binomial distribution (n = {}, p = {})",
        table.trials, table.probability
    )?;
    writeln!(w, "{:>4}  {:>10}  {:>10}", "k", "P(X=k)", "P(X<=k)")?;
    for row in &table.rows {
        writeln!(w, "{:>4}  {:>10.6}  {:>10.6}", row.successes, row.pmf, row.cdf)?;
    }
    Ok(())
}
