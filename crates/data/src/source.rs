use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tick_filter_core::{OhlcvSeries, SeriesSource, SourceConfig};

use crate::csv_storage::CsvStorage;
use crate::yahoo::YahooFinance;

/// Pulls the base series from Yahoo Finance.
pub struct YahooSource {
    client: YahooFinance,
    config: SourceConfig,
}

impl YahooSource {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = YahooFinance::new().context("Failed to build Yahoo Finance client")?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn with_client(client: YahooFinance, config: SourceConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SeriesSource for YahooSource {
    async fn fetch(&self) -> Result<OhlcvSeries> {
        let series = self
            .client
            .fetch(&self.config.ticker, self.config.interval, &self.config.range)
            .await
            .with_context(|| format!("Failed to fetch {}", self.describe()))?;

        if series.is_empty() {
            anyhow::bail!("{} returned no bars", self.describe());
        }
        Ok(series)
    }

    fn describe(&self) -> String {
        format!(
            "Yahoo Finance {} ({}, range {})",
            self.config.ticker, self.config.interval, self.config.range
        )
    }
}

/// Reads the base series from a CSV file written by [`CsvStorage`].
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeriesSource for CsvSource {
    async fn fetch(&self) -> Result<OhlcvSeries> {
        let path = self.path.clone();
        let series = tokio::task::spawn_blocking(move || CsvStorage::read_ohlcv(path))
            .await
            .context("CSV reader task panicked")??;

        if series.is_empty() {
            anyhow::bail!("{} holds no bars", self.describe());
        }
        tracing::info!("Loaded {} bars from {}", series.len(), self.path.display());
        Ok(series)
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}
