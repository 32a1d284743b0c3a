use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::interval::Interval;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub source: SourceConfig,
    pub injection: InjectionConfig,
    pub detection: DetectionConfig,
    pub trials: TrialConfig,
}

/// Where the base series comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub ticker: String,
    pub interval: Interval,
    /// Provider range code, e.g. `max`, `5d`, `1mo`.
    pub range: String,
}

/// Bad-tick injection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Leading rows that are never corrupted.
    pub protected_prefix_len: usize,
    /// Number of draws (with replacement) of rows to corrupt.
    pub corruption_count: usize,
    /// Multiplier applied to the close of every corrupted row.
    pub corruption_factor: f64,
}

/// Rolling z-score detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub window: usize,
    pub z_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub iterations: usize,
    /// Optional seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            ticker: "TSLA".to_string(),
            interval: Interval::Minute1,
            range: "max".to_string(),
        }
    }
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            protected_prefix_len: 100,
            corruption_count: 50,
            corruption_factor: 0.01,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window: 20,
            z_threshold: 3.0,
        }
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Sets a seed for reproducible simulations.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.trials.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.trials.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_detection(mut self, window: usize, z_threshold: f64) -> Self {
        self.detection = DetectionConfig {
            window,
            z_threshold,
        };
        self
    }

    #[must_use]
    pub fn with_injection(mut self, injection: InjectionConfig) -> Self {
        self.injection = injection;
        self
    }

    #[must_use]
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.source.ticker = ticker.into();
        self
    }

    /// Checks the knobs that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.ticker.trim().is_empty() {
            return Err(ConfigError::EmptyTicker);
        }
        if self.detection.window == 0 {
            return Err(ConfigError::InvalidWindow);
        }
        let threshold = self.detection.z_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        let factor = self.injection.corruption_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::InvalidCorruptionFactor(factor));
        }
        if self.trials.iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        Ok(())
    }
}
