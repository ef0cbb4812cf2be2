use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use expr_graph_solver::driver::{self, RunConfig, DEFAULT_ROOT, DEFAULT_UNKNOWN};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Evaluates an expression graph, then solves for the unknown that balances its root.
#[derive(Debug, Parser)]
#[command(name = "exprsolve", version)]
struct Cli {
    /// Input file, one `name: value` or `name: lhs op rhs` per line
    input: PathBuf,

    /// Node whose two operands must become equal in the second phase
    #[arg(long, default_value = DEFAULT_ROOT)]
    root: String,

    /// Node to solve for in the second phase
    #[arg(long, default_value = DEFAULT_UNKNOWN)]
    unknown: String,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print how each answer was derived
    #[arg(long)]
    trace: bool,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = RunConfig {
        input: cli.input,
        root: cli.root,
        unknown: cli.unknown,
        trace: cli.trace,
    };
    let report = driver::run(&config)
        .with_context(|| format!("solving '{}' failed", config.input.display()))?;

    match cli.format {
        Format::Text => print!("{}", report.render_text()),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
