//! Bar sampling intervals understood by the series sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling interval of an OHLCV series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute bars
    #[serde(rename = "1m")]
    Minute1,
    /// 2 minute bars
    #[serde(rename = "2m")]
    Minute2,
    /// 5 minute bars
    #[serde(rename = "5m")]
    Minute5,
    /// 15 minute bars
    #[serde(rename = "15m")]
    Minute15,
    /// 30 minute bars
    #[serde(rename = "30m")]
    Minute30,
    /// 1 hour bars
    #[serde(rename = "1h")]
    Hour1,
    /// Daily bars
    #[serde(rename = "1d")]
    Daily,
}

impl Interval {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute2 => "2m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
            Self::Daily => "1d",
        }
    }

    /// Longest history the provider serves for this interval, in days.
    ///
    /// `None` means the full history is available.
    #[must_use]
    pub fn max_lookback_days(&self) -> Option<i64> {
        match self {
            Self::Minute1 => Some(7),
            Self::Minute2 | Self::Minute5 | Self::Minute15 | Self::Minute30 => Some(60),
            Self::Hour1 => Some(730),
            Self::Daily => None,
        }
    }

    #[must_use]
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Self::Daily)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::Minute1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Self::Minute1),
            "2m" => Ok(Self::Minute2),
            "5m" => Ok(Self::Minute5),
            "15m" => Ok(Self::Minute15),
            "30m" => Ok(Self::Minute30),
            "1h" | "60m" => Ok(Self::Hour1),
            "1d" => Ok(Self::Daily),
            other => Err(format!(
                "Unknown interval: '{other}'. Valid intervals: 1m, 2m, 5m, 15m, 30m, 1h, 1d"
            )),
        }
    }
}
