use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use tick_filter_core::{Bar, OhlcvSeries};

pub fn session_start() -> DateTime<FixedOffset> {
    let est = FixedOffset::west_opt(5 * 3600).unwrap();
    est.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap()
}

pub fn minute_bar(minute: i64, close: f64, volume: f64) -> Bar {
    Bar::new(
        session_start() + Duration::minutes(minute),
        close,
        close,
        close,
        close,
        volume,
    )
}

/// Minute bars starting at the session open, one per `(close, volume)`.
pub fn series_from(points: &[(f64, f64)]) -> OhlcvSeries {
    let bars = points
        .iter()
        .enumerate()
        .map(|(i, &(close, volume))| minute_bar(i as i64, close, volume))
        .collect();
    OhlcvSeries::new("TEST", bars).unwrap()
}

pub fn flat_series(len: usize, close: f64, volume: f64) -> OhlcvSeries {
    series_from(&vec![(close, volume); len])
}

/// Deterministic wiggly prices so rolling deviations are never zero.
pub fn noisy_series(len: usize) -> OhlcvSeries {
    let points: Vec<(f64, f64)> = (0..len)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + (x * 0.7).sin() * 0.5 + (x * 0.13).cos() * 0.3;
            let volume = 1_000.0 + ((i * 37) % 11) as f64 * 50.0;
            (close, volume)
        })
        .collect();
    series_from(&points)
}
