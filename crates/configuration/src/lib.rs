use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnomalySettings, Config, CorrelationSettings, HeatmapSettings, InsightSettings,
    LoggingSettings, PredictionSettings, ProgressThresholds, StreakSettings,
};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of environment variables that override file settings,
/// e.g. `MOMENTUM__ANOMALY__THRESHOLD=2.5`.
pub const ENV_PREFIX: &str = "MOMENTUM";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file, then environment
/// variables. The default `config.toml` is optional; an explicitly given path must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Aggregation, PredictionMethod};
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.anomaly.threshold, 2.0);
        assert_eq!(config.prediction.horizon_days, 30);
        assert_eq!(config.progress.on_track_ratio, 0.8);
        assert_eq!(config.progress.milestone_ratio, 0.9);
        assert_eq!(config.streak.lookback_days, 365);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
            [anomaly]
            threshold = 2.5

            [prediction]
            horizon_days = 14
            method = { kind = "exponential_smoothing", alpha = 0.3 }

            [heatmap]
            aggregation = "average"

            [insight]
            ttl = "30m"
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.anomaly.threshold, 2.5);
        assert_eq!(config.prediction.horizon_days, 14);
        assert_eq!(
            config.prediction.method,
            PredictionMethod::ExponentialSmoothing { alpha: 0.3 }
        );
        assert_eq!(config.heatmap.aggregation, Aggregation::Average);
        assert_eq!(config.heatmap.months, 3);
        assert_eq!(config.insight.ttl, Duration::from_secs(30 * 60));
        assert_eq!(config.progress, ProgressThresholds::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/definitely/not/here/momentum.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let file = write_config("[anomaly]\nthreshold = 0.0\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = Config::default();
        config.prediction.horizon_days = -1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.prediction.method = PredictionMethod::MovingAverage { window: 0 };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.prediction.method = PredictionMethod::ExponentialSmoothing { alpha: 1.0 };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.heatmap.months = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_calendar_spans() {
        let mut config = Config::default();
        config.streak.lookback_days = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
        config.streak.lookback_days = settings::MAX_STREAK_LOOKBACK_DAYS;
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.correlation.window_hours = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.heatmap.months = settings::MAX_HEATMAP_MONTHS + 1;
        assert!(config.validate().is_err());

        let file = write_config("[streak]\nlookback_days = 4000000000\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
