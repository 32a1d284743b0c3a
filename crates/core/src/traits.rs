use crate::series::OhlcvSeries;
use anyhow::Result;
use async_trait::async_trait;

/// Supplies the base series a simulation runs on.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetches the full series. Called once per run.
    async fn fetch(&self) -> Result<OhlcvSeries>;

    /// Human-readable description used in logs.
    fn describe(&self) -> String;
}
