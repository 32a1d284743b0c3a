use clap::{Parser, Subcommand};

mod commands;

use commands::{FetchDataArgs, SimulateArgs};

#[derive(Parser)]
#[command(name = "tick-filter")]
#[command(about = "Bad-tick injection and z-score cleaning simulations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Corrupt, clean and evaluate a series over many randomized trials
    Simulate(SimulateArgs),
    /// Download a series from Yahoo Finance into a CSV file
    FetchData(FetchDataArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the summary on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate(args) => {
            commands::run_simulate(args).await?;
        }
        Commands::FetchData(args) => {
            commands::run_fetch_data(args).await?;
        }
    }

    Ok(())
}
