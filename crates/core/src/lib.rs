pub mod config;
pub mod config_loader;
pub mod error;
pub mod interval;
pub mod metrics_formatter;
pub mod results;
pub mod series;
pub mod traits;

pub use config::{DetectionConfig, InjectionConfig, SimulationConfig, SourceConfig, TrialConfig};
pub use config_loader::ConfigLoader;
pub use error::{ConfigError, SeriesError};
pub use interval::Interval;
pub use metrics_formatter::SummaryFormatter;
pub use results::{AggregateResult, TrialResult};
pub use series::{AsBar, Bar, OhlcvSeries, ScoredBar, ScoredSeries};
pub use traits::SeriesSource;
