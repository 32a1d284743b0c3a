//! Yahoo Finance chart client.
//!
//! Fetches the base OHLCV series from the v8 chart endpoint. Bars come back
//! in the exchange's native time zone so calendar days match the trading
//! session. Bars with null fields are kept with `NaN` so that downstream
//! null-dropping decides what survives.

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tick_filter_core::{Bar, Interval, OhlcvSeries, SeriesError};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Errors from fetching or decoding a chart.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error [{code}]: {description}")]
    Api { code: String, description: String },

    #[error("failed to parse chart response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no data returned")]
    NoData,

    #[error("unknown exchange time zone: {0}")]
    UnknownTimezone(String),

    #[error("malformed series: {0}")]
    Series(#[from] SeriesError),
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    exchange_timezone_name: Option<String>,
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Time span requested from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchWindow {
    /// A provider range code such as `5d` or `max`.
    Range(String),
    /// Explicit unix-second bounds.
    Period { start: i64, end: i64 },
}

impl FetchWindow {
    /// Resolves a range code for `interval` at time `now`.
    ///
    /// `max` on an intraday interval becomes the longest window the provider
    /// serves for that interval, ending now.
    #[must_use]
    pub fn resolve(range: &str, interval: Interval, now: DateTime<Utc>) -> Self {
        if range.eq_ignore_ascii_case("max") {
            if let Some(days) = interval.max_lookback_days() {
                return Self::Period {
                    start: (now - Duration::days(days)).timestamp(),
                    end: now.timestamp(),
                };
            }
        }
        Self::Range(range.to_string())
    }
}

fn value_at(values: &[Option<f64>], i: usize) -> f64 {
    values.get(i).copied().flatten().unwrap_or(f64::NAN)
}

/// Where bar timestamps are localized.
enum NativeZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl NativeZone {
    fn from_meta(meta: Option<&ChartMeta>) -> Result<Self, FetchError> {
        let Some(meta) = meta else {
            return Ok(Self::Fixed(Utc.fix()));
        };

        if let Some(name) = &meta.exchange_timezone_name {
            if let Ok(tz) = name.parse::<Tz>() {
                return Ok(Self::Named(tz));
            }
            tracing::debug!("Unrecognized time zone {}, falling back to gmtoffset", name);
        }

        let offset = meta.gmtoffset.unwrap_or(0);
        FixedOffset::east_opt(offset)
            .map(Self::Fixed)
            .ok_or_else(|| {
                FetchError::UnknownTimezone(
                    meta.exchange_timezone_name
                        .clone()
                        .unwrap_or_else(|| format!("gmtoffset {offset}")),
                )
            })
    }

    fn localize(&self, secs: i64) -> Option<DateTime<FixedOffset>> {
        let utc = DateTime::<Utc>::from_timestamp(secs, 0)?;
        Some(match self {
            Self::Named(tz) => utc.with_timezone(tz).fixed_offset(),
            Self::Fixed(offset) => utc.with_timezone(offset),
        })
    }
}

/// Yahoo Finance client.
#[derive(Debug, Clone)]
pub struct YahooFinance {
    http_client: reqwest::Client,
    base_url: String,
}

impl YahooFinance {
    /// Creates a client for the public chart endpoint.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Request` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a different chart endpoint.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Request` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    fn build_url(&self, symbol: &str, interval: Interval, window: &FetchWindow) -> String {
        match window {
            FetchWindow::Range(range) => format!(
                "{}/{}?interval={}&range={}",
                self.base_url,
                symbol,
                interval.as_str(),
                range
            ),
            FetchWindow::Period { start, end } => format!(
                "{}/{}?interval={}&period1={}&period2={}",
                self.base_url,
                symbol,
                interval.as_str(),
                start,
                end
            ),
        }
    }

    /// Fetches the series for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` if the request fails, the provider reports an
    /// error, or the response holds no bars.
    pub async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        range: &str,
    ) -> Result<OhlcvSeries, FetchError> {
        let window = FetchWindow::resolve(range, interval, Utc::now());
        let url = self.build_url(symbol, interval, &window);
        tracing::info!("Fetching {} {} bars ({:?})", symbol, interval, window);

        let text = self
            .http_client
            .get(&url)
            .send()
            .await?
            .text()
            .await?;

        let series = Self::parse_response(symbol, &text)?;
        tracing::info!("Fetched {} bars for {}", series.len(), symbol);
        Ok(series)
    }

    /// Decodes a chart response into a series ordered by timestamp.
    ///
    /// Repeated timestamps keep the last bar seen.
    fn parse_response(symbol: &str, json: &str) -> Result<OhlcvSeries, FetchError> {
        let response: ChartResponse = serde_json::from_str(json)?;

        if let Some(error) = response.chart.error {
            return Err(FetchError::Api {
                code: error.code,
                description: error.description,
            });
        }

        let results = response.chart.result.ok_or(FetchError::NoData)?;
        let data = results.first().ok_or(FetchError::NoData)?;
        let timestamps = data.timestamp.as_ref().ok_or(FetchError::NoData)?;
        let quote = data.indicators.quote.first().ok_or(FetchError::NoData)?;
        let zone = NativeZone::from_meta(data.meta.as_ref())?;

        let mut bars: Vec<Bar> = Vec::with_capacity(timestamps.len());
        for (i, &secs) in timestamps.iter().enumerate() {
            let Some(timestamp) = zone.localize(secs) else {
                tracing::debug!("Skipping out-of-range timestamp {}", secs);
                continue;
            };
            bars.push(Bar::new(
                timestamp,
                value_at(&quote.open, i),
                value_at(&quote.high, i),
                value_at(&quote.low, i),
                value_at(&quote.close, i),
                value_at(&quote.volume, i),
            ));
        }

        bars.sort_by_key(|b| b.timestamp);
        let mut unique: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match unique.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => unique.push(bar),
            }
        }

        if unique.is_empty() {
            return Err(FetchError::NoData);
        }

        Ok(OhlcvSeries::new(symbol, unique)?)
    }
}
