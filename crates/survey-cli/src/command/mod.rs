use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{analyze::AnalyzeArg, binomial::BinomialArg, levels::LevelsArg};

mod analyze;
mod binomial;
mod levels;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log pipeline steps at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the full survey report on a dataset
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Show level frequencies and the rare-level filtering outcome
    Levels(#[clap(flatten)] LevelsArg),
    /// Print a binomial probability table
    Binomial(#[clap(flatten)] BinomialArg),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Levels(arg) => levels::run(&arg)?,
        Mode::Binomial(arg) => binomial::run(&arg)?,
    }
    Ok(())
}
