//! Simulate CLI command.
//!
//! Loads the layered configuration, applies command-line overrides, fetches
//! the base series once and runs the corrupt, clean and evaluate trials.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;

use tick_filter_core::{
    ConfigLoader, Interval, SeriesSource, SimulationConfig, SummaryFormatter,
};
use tick_filter_data::{CsvSource, CsvStorage, YahooSource};
use tick_filter_simulation::{RunOutcome, TrialRunner};

/// Arguments for the simulate command.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Config file path (missing file falls back to defaults)
    #[arg(short, long, default_value = "config/Simulation.toml")]
    pub config: String,

    /// Read the base series from a CSV file instead of Yahoo Finance
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Ticker symbol to fetch
    #[arg(long)]
    pub ticker: Option<String>,

    /// Bar interval (1m, 2m, 5m, 15m, 30m, 1h, 1d)
    #[arg(long)]
    pub interval: Option<String>,

    /// Number of trials
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Rolling window length in rows
    #[arg(long)]
    pub window: Option<usize>,

    /// Absolute z-score above which a row is flagged
    #[arg(long)]
    pub z_threshold: Option<f64>,

    /// Rows drawn (with replacement) for corruption per trial
    #[arg(long)]
    pub corruption_count: Option<usize>,

    /// Multiplier applied to each corrupted close
    #[arg(long)]
    pub corruption_factor: Option<f64>,

    /// Leading rows that are never corrupted
    #[arg(long)]
    pub protected_prefix: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the final trial's series as CSV into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

/// Output format for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

impl SimulateArgs {
    /// Layers the flags given on the command line over `config`.
    fn apply_overrides(&self, mut config: SimulationConfig) -> Result<SimulationConfig> {
        if let Some(ticker) = &self.ticker {
            config.source.ticker.clone_from(ticker);
        }
        if let Some(interval) = &self.interval {
            config.source.interval = interval.parse::<Interval>().map_err(|e| anyhow!(e))?;
        }
        if let Some(iterations) = self.iterations {
            config.trials.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.trials.seed = Some(seed);
        }
        if let Some(window) = self.window {
            config.detection.window = window;
        }
        if let Some(z_threshold) = self.z_threshold {
            config.detection.z_threshold = z_threshold;
        }
        if let Some(count) = self.corruption_count {
            config.injection.corruption_count = count;
        }
        if let Some(factor) = self.corruption_factor {
            config.injection.corruption_factor = factor;
        }
        if let Some(prefix) = self.protected_prefix {
            config.injection.protected_prefix_len = prefix;
        }
        Ok(config)
    }

    fn source(&self, config: &SimulationConfig) -> Result<Box<dyn SeriesSource>> {
        match &self.data {
            Some(path) => Ok(Box::new(CsvSource::new(path.clone()))),
            None => Ok(Box::new(YahooSource::new(config.source.clone())?)),
        }
    }
}

/// Writes the final trial's original, corrupted and cleaned series.
fn export_last_trial(outcome: &RunOutcome, dir: &Path) -> Result<()> {
    let Some(trial) = &outcome.last_trial else {
        tracing::warn!("No trial ran, nothing to export");
        return Ok(());
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    CsvStorage::write_ohlcv(dir.join("original.csv"), &trial.original)?;
    CsvStorage::write_scored(dir.join("corrupted.csv"), &trial.corrupted)?;
    CsvStorage::write_scored(dir.join("cleaned.csv"), &trial.cleaned)?;

    tracing::info!("Final trial series written to {}", dir.display());
    Ok(())
}

/// Runs the simulate command.
pub async fn run_simulate(args: SimulateArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;

    let config = ConfigLoader::load(&args.config).context("Failed to load config")?;
    let config = args.apply_overrides(config)?;
    config.validate().context("Invalid simulation config")?;

    let source = args.source(&config)?;
    tracing::info!("Fetching base series from {}", source.describe());
    let base = source.fetch().await.context("Failed to fetch base series")?;

    let iterations = config.trials.iterations;
    let runner = TrialRunner::new(config);
    let outcome = tokio::task::spawn_blocking(move || runner.run(iterations, &base))
        .await
        .context("Simulation task panicked")?;

    match format {
        OutputFormat::Text => {
            println!("{}", SummaryFormatter::format(&outcome.aggregate));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome.aggregate)?;
            println!("{}", json);
        }
    }

    if let Some(dir) = &args.export_dir {
        export_last_trial(&outcome, dir)?;
    }

    Ok(())
}
