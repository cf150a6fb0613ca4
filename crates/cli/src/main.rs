//! Booking E2E CLI - Main Entry Point
//!
//! Drives the booking wizard through its canonical flow, runs the scenario
//! catalogue, and probes the target application.

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{check, run, scenarios, TargetArgs};

/// Booking E2E - flow driver for the multi-step booking wizard
#[derive(Parser)]
#[command(name = "booking-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the canonical booking flow once
    Run,

    /// Run the scenario catalogue
    Scenarios(scenarios::ScenariosArgs),

    /// List scenarios and their tags
    List,

    /// Check that the booking application answers
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let ok = match cli.command {
        Commands::Run => run::execute(&cli.target, cli.format).await?,
        Commands::Scenarios(args) => scenarios::execute(args, &cli.target, cli.format).await?,
        Commands::List => {
            scenarios::list(cli.format);
            true
        }
        Commands::Check => check::execute(&cli.target).await?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
