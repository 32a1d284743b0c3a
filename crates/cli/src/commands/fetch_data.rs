//! Fetch-data CLI command.
//!
//! Downloads a series from Yahoo Finance and stores it as CSV so later
//! simulations can run offline with `--data`.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use tick_filter_core::{Interval, SeriesSource, SourceConfig};
use tick_filter_data::{CsvStorage, YahooSource};

/// Arguments for the fetch-data command.
#[derive(Args, Debug, Clone)]
pub struct FetchDataArgs {
    /// Ticker symbol (e.g., "TSLA", "AAPL")
    #[arg(long)]
    pub ticker: String,

    /// Bar interval (1m, 2m, 5m, 15m, 30m, 1h, 1d)
    #[arg(long, default_value = "1m")]
    pub interval: String,

    /// Provider range code (e.g., "max", "5d", "1mo")
    #[arg(long, default_value = "max")]
    pub range: String,

    /// Output CSV file path
    #[arg(short, long)]
    pub output: PathBuf,
}

impl FetchDataArgs {
    fn source_config(&self) -> Result<SourceConfig> {
        if self.ticker.trim().is_empty() {
            return Err(anyhow!("Ticker must not be empty"));
        }
        let interval = self.interval.parse::<Interval>().map_err(|e| anyhow!(e))?;
        Ok(SourceConfig {
            ticker: self.ticker.trim().to_uppercase(),
            interval,
            range: self.range.clone(),
        })
    }
}

/// Runs the fetch-data command.
pub async fn run_fetch_data(args: FetchDataArgs) -> Result<()> {
    let source = YahooSource::new(args.source_config()?)?;

    let series = source.fetch().await?;

    CsvStorage::write_ohlcv(&args.output, &series)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        "Wrote {} bars for {} to {}",
        series.len(),
        series.symbol(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(ticker: &str, interval: &str) -> FetchDataArgs {
        FetchDataArgs {
            ticker: ticker.to_string(),
            interval: interval.to_string(),
            range: "5d".to_string(),
            output: PathBuf::from("out.csv"),
        }
    }

    #[test]
    fn source_config_normalizes_ticker() {
        let config = args(" tsla ", "1h").source_config().unwrap();

        assert_eq!(config.ticker, "TSLA");
        assert_eq!(config.interval, Interval::Hour1);
        assert_eq!(config.range, "5d");
    }

    #[test]
    fn source_config_rejects_bad_input() {
        assert!(args("", "1m").source_config().is_err());
        assert!(args("TSLA", "4h").source_config().is_err());
    }
}
