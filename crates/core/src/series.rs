//! Time-indexed OHLCV series and the annotated rows produced by outlier scoring.
//!
//! Every derived series is an owned copy: corrupting or filtering a series
//! never changes the series it came from.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// One OHLCV bar. A field holding `NaN` is treated as missing.
///
/// The timestamp carries the exchange's native UTC offset, so the calendar
/// day of a bar is `timestamp.date_naive()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    #[must_use]
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true when no field is missing.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !(self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan())
    }

    /// Calendar day of the bar in its native time zone.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Access to the underlying bar of a series row.
pub trait AsBar {
    fn as_bar(&self) -> &Bar;
}

impl AsBar for Bar {
    fn as_bar(&self) -> &Bar {
        self
    }
}

fn ensure_increasing<'a>(
    timestamps: impl Iterator<Item = &'a DateTime<FixedOffset>>,
) -> Result<(), SeriesError> {
    let mut previous: Option<&DateTime<FixedOffset>> = None;
    for (index, ts) in timestamps.enumerate() {
        if let Some(prev) = previous {
            if ts <= prev {
                return Err(SeriesError::NonMonotonic { index });
            }
        }
        previous = Some(ts);
    }
    Ok(())
}

/// An ordered OHLCV series with unique, strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl OhlcvSeries {
    /// Creates a series, rejecting duplicate or out-of-order timestamps.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::NonMonotonic` naming the first offending row.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        ensure_increasing(bars.iter().map(|b| &b.timestamp))?;
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Multiplies the close of the bar at `index` by `factor`.
    ///
    /// Returns false when `index` is out of range.
    pub fn scale_close(&mut self, index: usize, factor: f64) -> bool {
        match self.bars.get_mut(index) {
            Some(bar) => {
                bar.close *= factor;
                true
            }
            None => false,
        }
    }

    /// Returns a copy without the rows that have a missing field.
    #[must_use]
    pub fn drop_incomplete(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars.iter().copied().filter(Bar::is_complete).collect(),
        }
    }
}

/// A bar annotated by the outlier detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredBar {
    pub bar: Bar,
    /// `close[t] / close[t-1] - 1`.
    pub price_change: f64,
    /// Rolling z-score of `price_change`; `NaN` where undefined.
    pub z_score: f64,
    pub error_flag: bool,
}

impl AsBar for ScoredBar {
    fn as_bar(&self) -> &Bar {
        &self.bar
    }
}

/// A series of scored rows, in timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSeries {
    symbol: String,
    rows: Vec<ScoredBar>,
}

impl ScoredSeries {
    /// Wraps rows taken in order from an `OhlcvSeries`.
    ///
    /// The rows must keep the strictly increasing timestamp order of their
    /// source series.
    #[must_use]
    pub fn from_ordered(symbol: impl Into<String>, rows: Vec<ScoredBar>) -> Self {
        debug_assert!(ensure_increasing(rows.iter().map(|r| &r.bar.timestamp)).is_ok());
        Self {
            symbol: symbol.into(),
            rows,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn rows(&self) -> &[ScoredBar] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.rows.iter().filter(|r| r.error_flag).count()
    }

    /// Returns a copy holding only the rows that were not flagged.
    #[must_use]
    pub fn unflagged(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            rows: self.rows.iter().copied().filter(|r| !r.error_flag).collect(),
        }
    }

    /// Strips the annotations, yielding a plain series.
    #[must_use]
    pub fn to_series(&self) -> OhlcvSeries {
        OhlcvSeries {
            symbol: self.symbol.clone(),
            bars: self.rows.iter().map(|r| r.bar).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(minute: i64) -> DateTime<FixedOffset> {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        est.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap() + Duration::minutes(minute)
    }

    fn bar(minute: i64, close: f64) -> Bar {
        Bar::new(ts(minute), close, close, close, close, 10.0)
    }

    #[test]
    fn new_accepts_increasing_timestamps() {
        let series = OhlcvSeries::new("TSLA", vec![bar(0, 1.0), bar(1, 2.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "TSLA");
    }

    #[test]
    fn new_rejects_duplicate_timestamps() {
        let err = OhlcvSeries::new("TSLA", vec![bar(0, 1.0), bar(1, 2.0), bar(1, 3.0)]).unwrap_err();
        assert_eq!(err, SeriesError::NonMonotonic { index: 2 });
    }

    #[test]
    fn new_rejects_out_of_order_timestamps() {
        assert!(OhlcvSeries::new("TSLA", vec![bar(5, 1.0), bar(1, 2.0)]).is_err());
    }

    #[test]
    fn drop_incomplete_removes_rows_with_nan() {
        let mut missing = bar(1, 2.0);
        missing.volume = f64::NAN;
        let series = OhlcvSeries::new("TSLA", vec![bar(0, 1.0), missing, bar(2, 3.0)]).unwrap();

        let dropped = series.drop_incomplete();

        assert_eq!(dropped.len(), 2);
        assert_eq!(series.len(), 3, "source series must be untouched");
        assert!(dropped.bars().iter().all(Bar::is_complete));
    }

    #[test]
    fn scale_close_changes_only_the_copy() {
        let original = OhlcvSeries::new("TSLA", vec![bar(0, 100.0)]).unwrap();
        let mut copy = original.clone();

        assert!(copy.scale_close(0, 0.01));
        assert!(!copy.scale_close(1, 0.01));

        assert!((copy.bars()[0].close - 1.0).abs() < 1e-12);
        assert!((original.bars()[0].close - 100.0).abs() < 1e-12);
    }

    #[test]
    fn day_uses_native_offset() {
        // 23:30 in New York is already the next day in UTC.
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let late = est.with_ymd_and_hms(2024, 3, 4, 23, 30, 0).unwrap();
        let b = Bar::new(late, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(b.day(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn unflagged_filters_flagged_rows() {
        let rows = vec![
            ScoredBar { bar: bar(0, 1.0), price_change: 0.0, z_score: f64::NAN, error_flag: false },
            ScoredBar { bar: bar(1, 1.0), price_change: 0.0, z_score: 5.0, error_flag: true },
        ];
        let scored = ScoredSeries::from_ordered("TSLA", rows);

        assert_eq!(scored.flagged_count(), 1);
        assert_eq!(scored.unflagged().len(), 1);
        assert_eq!(scored.to_series().len(), 2);
    }
}
