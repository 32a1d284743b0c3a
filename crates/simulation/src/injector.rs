//! Bad-tick injection.
//!
//! Rows after a protected prefix are drawn uniformly *with replacement* and
//! their close is multiplied by a small factor. A row drawn twice is still
//! corrupted only once, so the number of altered rows is at most the number
//! of draws. The prefix gives the rolling detector a clean lookback buffer.

use std::collections::BTreeSet;

use rand::Rng;
use tick_filter_core::{InjectionConfig, OhlcvSeries};

/// Output of one injection.
#[derive(Debug, Clone)]
pub struct Injection {
    /// The input series with incomplete rows dropped.
    pub clean: OhlcvSeries,
    /// The corrupted copy with incomplete rows dropped.
    pub corrupted: OhlcvSeries,
    /// Distinct positions (in the input series) whose close was altered.
    pub corrupted_indices: Vec<usize>,
}

pub struct CorruptionInjector {
    config: InjectionConfig,
}

impl CorruptionInjector {
    #[must_use]
    pub fn new(config: InjectionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &InjectionConfig {
        &self.config
    }

    /// Corrupts a copy of `series`, drawing rows from `rng`.
    ///
    /// When the series is no longer than the protected prefix there is
    /// nothing to corrupt and both outputs match the input.
    pub fn inject<R: Rng + ?Sized>(&self, series: &OhlcvSeries, rng: &mut R) -> Injection {
        let prefix = self.config.protected_prefix_len;
        let len = series.len();

        let mut selected = BTreeSet::new();
        if len > prefix {
            for _ in 0..self.config.corruption_count {
                selected.insert(rng.gen_range(prefix..len));
            }
        } else if self.config.corruption_count > 0 {
            tracing::warn!(
                "Series has {} rows, not more than the protected prefix of {}; nothing to corrupt",
                len,
                prefix
            );
        }

        let mut corrupted = series.clone();
        for &index in &selected {
            corrupted.scale_close(index, self.config.corruption_factor);
        }

        Injection {
            clean: series.drop_incomplete(),
            corrupted: corrupted.drop_incomplete(),
            corrupted_indices: selected.into_iter().collect(),
        }
    }
}
