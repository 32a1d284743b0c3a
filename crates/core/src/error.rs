use thiserror::Error;

/// Errors raised when constructing a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// Timestamps must be strictly increasing.
    #[error("timestamp at row {index} does not follow the previous row")]
    NonMonotonic { index: usize },
}

/// Configuration problems detected before any trial runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("rolling window must be positive")]
    InvalidWindow,

    #[error("iteration count must be positive")]
    InvalidIterations,

    #[error("z-score threshold must be a positive number, got {0}")]
    InvalidThreshold(f64),

    #[error("corruption factor must be a positive number, got {0}")]
    InvalidCorruptionFactor(f64),

    #[error("ticker symbol must not be empty")]
    EmptyTicker,

    /// Figment could not read or merge a configuration layer.
    #[error("failed to load configuration: {0}")]
    Load(String),
}
