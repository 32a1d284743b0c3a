//! Per-trial metrics and their aggregate over a run.

use serde::{Deserialize, Serialize};

/// Metrics of one corrupt → clean → evaluate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Relative VWAP error of the corrupted series, in percent.
    pub dirty_error: f64,
    /// Relative VWAP error of the cleaned series, in percent.
    pub clean_error: f64,
    /// `dirty_error - clean_error`, in percentage points. Negative when
    /// cleaning removed legitimate rows and made the estimate worse.
    pub improvement: f64,
    /// Distinct rows whose close was altered.
    pub corrupted_rows: usize,
    /// Rows removed by the outlier detector.
    pub flagged_rows: usize,
}

/// Summary statistics over all trials of a run.
///
/// With zero trials every statistic is `NaN`. A non-finite trial propagates
/// into the statistics rather than being skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub iterations: usize,
    pub mean_dirty_error: f64,
    pub mean_clean_error: f64,
    pub mean_improvement: f64,
    /// Worst case.
    pub min_improvement: f64,
    /// Best case.
    pub max_improvement: f64,
}

impl AggregateResult {
    #[must_use]
    pub fn from_trials(trials: &[TrialResult]) -> Self {
        let dirty: Vec<f64> = trials.iter().map(|t| t.dirty_error).collect();
        let clean: Vec<f64> = trials.iter().map(|t| t.clean_error).collect();
        let improvements: Vec<f64> = trials.iter().map(|t| t.improvement).collect();

        Self {
            iterations: trials.len(),
            mean_dirty_error: mean(&dirty),
            mean_clean_error: mean(&clean),
            mean_improvement: mean(&improvements),
            min_improvement: extreme(&improvements, f64::min),
            max_improvement: extreme(&improvements, f64::max),
        }
    }

    /// True when every statistic is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.mean_dirty_error,
            self.mean_clean_error,
            self.mean_improvement,
            self.min_improvement,
            self.max_improvement,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Arithmetic mean; `NaN` for an empty slice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Folds with `pick`, except that any `NaN` wins and an empty slice is `NaN`.
fn extreme(values: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    let mut iter = values.iter().copied();
    let Some(first) = iter.next() else {
        return f64::NAN;
    };
    iter.fold(first, |acc, v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            pick(acc, v)
        }
    })
}
