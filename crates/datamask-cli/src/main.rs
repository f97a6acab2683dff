mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use datamask_core::Error as CoreError;
use thiserror::Error;

use commands::{dangling_references, draw_values, summarize};
use config::load_config;
use logging::{LogFormat, init_logging};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("{0} dangling reference(s)")]
    DanglingReferences(usize),
}

#[derive(Parser, Debug)]
#[command(name = "datamask", version, about = "Datamask sample generator")]
struct Cli {
    /// Log output format (stderr).
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw random values from a datasource.
    Sample(SampleArgs),
    /// Print every raw value of a datasource.
    List(ListArgs),
    /// Compile all rules, load every datasource and report dangling references.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Datasource definitions (TOML).
    #[arg(long)]
    config: PathBuf,
    /// Datasource to draw from.
    #[arg(long)]
    datasource: String,
    /// Number of values to draw.
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Seed for reproducible draws.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Datasource definitions (TOML).
    #[arg(long)]
    config: PathBuf,
    /// Datasource to list.
    #[arg(long)]
    datasource: String,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Datasource definitions (TOML).
    #[arg(long)]
    config: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    match cli.command {
        Command::Sample(args) => run_sample(args),
        Command::List(args) => run_list(args),
        Command::Check(args) => run_check(args),
    }
}

fn run_sample(args: SampleArgs) -> Result<(), CliError> {
    let context = load_config(&args.config)?.build_context()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let start = Instant::now();

    tracing::info!(datasource = %args.datasource, count = args.count, seed, "sampling started");
    for value in draw_values(&context, &args.datasource, args.count, seed)? {
        println!("{value}");
    }
    tracing::info!(
        datasource = %args.datasource,
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "sampling finished"
    );
    Ok(())
}

fn run_list(args: ListArgs) -> Result<(), CliError> {
    let context = load_config(&args.config)?.build_context()?;
    for value in context.iterate(&args.datasource)? {
        println!("{value}");
    }
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let context = load_config(&args.config)?.build_context()?;

    for summary in summarize(&context)? {
        println!("{summary}");
    }

    let dangling = dangling_references(&context);
    for reference in &dangling {
        tracing::warn!(
            datasource = %reference.datasource,
            expression = reference.expression,
            offset = reference.offset,
            target = %reference.target,
            "reference to unknown datasource"
        );
    }
    if !dangling.is_empty() {
        return Err(CliError::DanglingReferences(dangling.len()));
    }
    Ok(())
}
