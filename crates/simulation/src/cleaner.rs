//! Rolling z-score outlier detection over close-to-close percentage changes.
//!
//! A z-score is undefined (`NaN`) until `window` valid changes exist, when the
//! window holds a missing change, or when the rolling standard deviation is
//! zero. Rows with an undefined score are never flagged.

use tick_filter_core::{Bar, DetectionConfig, OhlcvSeries, ScoredBar, ScoredSeries};

/// Output of one cleaning pass.
#[derive(Debug, Clone)]
pub struct Cleaning {
    /// Every row with a defined price change, annotated.
    pub scored: ScoredSeries,
    /// `scored` without the flagged rows.
    pub cleaned: ScoredSeries,
}

/// `close[t] / close[t-1] - 1`, with `NaN` for the first row.
#[must_use]
pub fn price_changes(bars: &[Bar]) -> Vec<f64> {
    let mut changes = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return changes;
    }
    changes.push(f64::NAN);
    changes.extend(bars.windows(2).map(|w| w[1].close / w[0].close - 1.0));
    changes
}

/// Trailing-window z-score of each value, using the sample standard deviation.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rolling_z_scores(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }

    let n = window as f64;
    (0..values.len())
        .map(|t| {
            if t + 1 < window {
                return f64::NAN;
            }
            let slice = &values[t + 1 - window..=t];
            if slice.iter().any(|v| v.is_nan()) {
                return f64::NAN;
            }

            let mu = slice.iter().sum::<f64>() / n;
            let variance = slice.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / (n - 1.0);
            let sigma = variance.sqrt();
            if sigma == 0.0 || !sigma.is_finite() {
                return f64::NAN;
            }

            (values[t] - mu) / sigma
        })
        .collect()
}

pub struct OutlierDetector {
    config: DetectionConfig,
}

impl OutlierDetector {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Scores every row of `series` and removes the flagged ones.
    ///
    /// Rows whose price change is undefined (the first row) or that have a
    /// missing field are left out of both outputs.
    #[must_use]
    pub fn clean(&self, series: &OhlcvSeries) -> Cleaning {
        let bars = series.bars();
        let changes = price_changes(bars);
        let z_scores = rolling_z_scores(&changes, self.config.window);

        let rows: Vec<ScoredBar> = bars
            .iter()
            .zip(changes)
            .zip(z_scores)
            .map(|((bar, price_change), z_score)| ScoredBar {
                bar: *bar,
                price_change,
                z_score,
                error_flag: z_score.abs() > self.config.z_threshold,
            })
            .filter(|row| row.bar.is_complete() && !row.price_change.is_nan())
            .collect();

        let scored = ScoredSeries::from_ordered(series.symbol(), rows);
        let cleaned = scored.unflagged();

        tracing::trace!(
            "Scored {} rows, flagged {}",
            scored.len(),
            scored.flagged_count()
        );

        Cleaning { scored, cleaned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{flat_series, noisy_series, series_from};

    fn detector() -> OutlierDetector {
        OutlierDetector::new(DetectionConfig::default())
    }

    fn with_ticks(len: usize, ticks: &[usize]) -> OhlcvSeries {
        let points: Vec<(f64, f64)> = (0..len)
            .map(|i| {
                let close = if ticks.contains(&i) { 1.0 } else { 100.0 };
                (close, 10.0)
            })
            .collect();
        series_from(&points)
    }

    // ============================================================
    // Building blocks
    // ============================================================

    #[test]
    fn price_change_of_first_row_is_undefined() {
        let series = series_from(&[(100.0, 1.0), (110.0, 1.0), (99.0, 1.0)]);

        let changes = price_changes(series.bars());

        assert!(changes[0].is_nan());
        assert!((changes[1] - 0.10).abs() < 1e-12);
        assert!((changes[2] - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn price_changes_of_empty_series_is_empty() {
        assert!(price_changes(&[]).is_empty());
    }

    #[test]
    fn rolling_z_needs_a_full_window() {
        let values = [f64::NAN, 1.0, 2.0, 3.0, 4.0, 10.0];

        let z = rolling_z_scores(&values, 3);

        // Index 2 still has the NaN of index 0 in its window.
        assert!(z[0].is_nan() && z[1].is_nan() && z[2].is_nan());
        assert!(z[3].is_finite());
        // Window [2, 3, 4]: mean 3, sample std 1.
        assert!((z[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rolling_z_is_undefined_for_zero_variance() {
        let z = rolling_z_scores(&[0.5; 10], 4);
        assert!(z.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_z_with_window_one_is_undefined() {
        let z = rolling_z_scores(&[1.0, 2.0, 3.0], 1);
        assert!(z.iter().all(|v| v.is_nan()));
    }

    // ============================================================
    // clean
    // ============================================================

    #[test]
    fn first_row_is_dropped_from_scored_series() {
        let series = noisy_series(50);

        let cleaning = detector().clean(&series);

        assert_eq!(cleaning.scored.len(), 49);
        assert_eq!(cleaning.scored.rows()[0].bar, series.bars()[1]);
    }

    #[test]
    fn constant_price_flags_nothing() {
        let series = flat_series(200, 100.0, 10.0);

        let cleaning = detector().clean(&series);

        assert_eq!(cleaning.scored.flagged_count(), 0);
        assert_eq!(cleaning.cleaned.len(), cleaning.scored.len());
        assert!(cleaning.scored.rows().iter().all(|r| r.z_score.is_nan()));
    }

    #[test]
    fn isolated_bad_tick_and_its_recovery_are_flagged() {
        let series = with_ticks(200, &[150]);

        let cleaning = detector().clean(&series);

        let flagged: Vec<_> = cleaning
            .scored
            .rows()
            .iter()
            .filter(|r| r.error_flag)
            .map(|r| r.bar.timestamp)
            .collect();
        assert_eq!(
            flagged,
            vec![series.bars()[150].timestamp, series.bars()[151].timestamp]
        );
        assert!(cleaning.cleaned.rows().iter().all(|r| r.bar.close == 100.0));
    }

    #[test]
    fn bad_tick_inside_warm_up_window_is_not_flagged() {
        // Row 5 has no full 20-change window behind it.
        let series = with_ticks(200, &[5]);

        let cleaning = detector().clean(&series);

        assert_eq!(cleaning.scored.flagged_count(), 0);
    }

    #[test]
    fn cleaning_its_own_output_flags_nothing_more() {
        let series = with_ticks(300, &[150, 220]);

        let first = detector().clean(&series);
        let second = detector().clean(&first.cleaned.to_series());

        assert!(first.scored.flagged_count() > 0);
        assert_eq!(second.scored.flagged_count(), 0);
    }

    #[test]
    fn annotations_are_kept_on_cleaned_rows() {
        let series = noisy_series(100);

        let cleaning = detector().clean(&series);

        for row in cleaning.cleaned.rows() {
            assert!(!row.error_flag);
            assert!(row.price_change.is_finite());
        }
    }

    #[test]
    fn higher_threshold_flags_fewer_rows() {
        let series = with_ticks(300, &[150, 220]);
        let strict = OutlierDetector::new(DetectionConfig {
            window: 20,
            z_threshold: 100.0,
        });

        assert_eq!(strict.clean(&series).scored.flagged_count(), 0);
        assert!(detector().clean(&series).scored.flagged_count() > 0);
    }
}
