//! # esglens CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use esglens_cli::check::{run_check, CheckArgs};
use esglens_cli::rules::{run_rules, RulesArgs};

/// esglens — ESG analysis platform toolchain.
#[derive(Parser, Debug)]
#[command(name = "esglens", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the API server.
    Serve,

    /// Run an offline deterministic compliance check against an analysis
    /// record JSON file.
    Check(CheckArgs),

    /// Print the compliance rule catalog.
    Rules(RulesArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level. `serve` defaults to
    // info so request traces are visible without flags.
    let filter = match (cli.verbose, &cli.command) {
        (0, Commands::Serve) => EnvFilter::new("info"),
        (0, _) => EnvFilter::new("warn"),
        (1, _) => EnvFilter::new("info"),
        (2, _) => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve => esglens_api::bootstrap::run().await.map_err(Into::into),
        Commands::Check(args) => run_check(&args),
        Commands::Rules(args) => run_rules(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
