use crate::config::SimulationConfig;
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Default location of the simulation config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Simulation.toml";

/// Prefix of environment overrides, e.g. `TICK_FILTER_DETECTION__WINDOW=30`.
pub const ENV_PREFIX: &str = "TICK_FILTER_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the simulation configuration by layering built-in defaults,
    /// the TOML file at `path` (skipped when absent), and environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a layer cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<SimulationConfig, ConfigError> {
        let path = path.as_ref();
        tracing::debug!("Loading simulation config from {}", path.display());

        Self::figment(path)
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Loads from the default path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a layer cannot be read or parsed.
    pub fn load_default() -> Result<SimulationConfig, ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(SimulationConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use figment::Jail;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("does/not/exist.toml").unwrap();
            assert_eq!(config, SimulationConfig::default());
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Simulation.toml",
                r#"
                [source]
                ticker = "AAPL"
                interval = "5m"

                [detection]
                window = 30
                "#,
            )?;

            let config = ConfigLoader::load("Simulation.toml").unwrap();

            assert_eq!(config.source.ticker, "AAPL");
            assert_eq!(config.source.interval, Interval::Minute5);
            assert_eq!(config.detection.window, 30);
            assert_eq!(config.trials.iterations, 1000);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("Simulation.toml", "[trials]\niterations = 10\n")?;
            jail.set_env("TICK_FILTER_TRIALS__ITERATIONS", "25");
            jail.set_env("TICK_FILTER_TRIALS__SEED", "7");

            let config = ConfigLoader::load("Simulation.toml").unwrap();

            assert_eq!(config.trials.iterations, 25);
            assert_eq!(config.trials.seed, Some(7));
            Ok(())
        });
    }

    #[test]
    fn malformed_value_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("Simulation.toml", "[detection]\nwindow = \"wide\"\n")?;

            let err = ConfigLoader::load("Simulation.toml").unwrap_err();

            assert!(matches!(err, ConfigError::Load(_)));
            Ok(())
        });
    }
}
