//! Daily-VWAP fair value and the relative errors of corrupted and cleaned series.
//!
//! The series-level estimate is the mean over *rows* of each row's daily VWAP,
//! so days with more rows weigh more. It is not a single VWAP over the whole
//! series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tick_filter_core::AsBar;

/// Errors of one trial, all in percent of the original fair value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub vwap_original: f64,
    pub vwap_corrupted: f64,
    pub vwap_cleaned: f64,
    pub error_dirty_pct: f64,
    pub error_clean_pct: f64,
    /// `error_dirty_pct - error_clean_pct`; positive when cleaning helped.
    pub improvement_pp: f64,
}

/// Volumes with zeros replaced by the last non-zero volume seen.
///
/// Leading zeros have nothing to carry forward and stay `NaN`.
fn forward_filled_volumes<T: AsBar>(rows: &[T]) -> Vec<f64> {
    let mut last_valid: Option<f64> = None;
    rows.iter()
        .map(|row| {
            let volume = row.as_bar().volume;
            if volume == 0.0 || volume.is_nan() {
                last_valid.unwrap_or(f64::NAN)
            } else {
                last_valid = Some(volume);
                volume
            }
        })
        .collect()
}

/// Mean over rows of the VWAP of each row's calendar day.
///
/// Rows without a usable volume still take their day's VWAP but add nothing
/// to its sums. An empty series, or a day whose volume sums to zero, yields
/// `NaN`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn fair_value<T: AsBar>(rows: &[T]) -> f64 {
    let volumes = forward_filled_volumes(rows);

    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for (row, &volume) in rows.iter().zip(&volumes) {
        let bar = row.as_bar();
        let sums = days.entry(bar.day()).or_insert((0.0, 0.0));
        if volume.is_nan() {
            continue;
        }
        sums.0 += bar.close * volume;
        sums.1 += volume;
    }

    let total: f64 = rows
        .iter()
        .map(|row| {
            let (turnover, volume) = days
                .get(&row.as_bar().day())
                .copied()
                .unwrap_or((f64::NAN, f64::NAN));
            turnover / volume
        })
        .sum();

    total / rows.len() as f64
}

fn relative_error_pct(reference: f64, estimate: f64) -> f64 {
    ((reference - estimate) / reference).abs() * 100.0
}

/// Compares the corrupted and cleaned fair values against the original one.
///
/// Degenerate inputs (zero original fair value, empty series, zero-volume
/// days) produce non-finite errors rather than failing.
#[must_use]
pub fn evaluate<O: AsBar, C: AsBar, D: AsBar>(
    original: &[O],
    cleaned: &[C],
    corrupted: &[D],
) -> Evaluation {
    let vwap_original = fair_value(original);
    let vwap_cleaned = fair_value(cleaned);
    let vwap_corrupted = fair_value(corrupted);

    let error_dirty_pct = relative_error_pct(vwap_original, vwap_corrupted);
    let error_clean_pct = relative_error_pct(vwap_original, vwap_cleaned);

    Evaluation {
        vwap_original,
        vwap_corrupted,
        vwap_cleaned,
        error_dirty_pct,
        error_clean_pct,
        improvement_pp: error_dirty_pct - error_clean_pct,
    }
}
