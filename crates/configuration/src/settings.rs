use crate::error::ConfigError;
use core_types::{Aggregation, PredictionMethod};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Share of the target a `Higher` quantity must reach to count as on track.
pub const ON_TRACK_RATIO: f64 = 0.8;
/// Multiple of the target a `Lower` quantity may reach and still be on track.
pub const LOWER_TOLERANCE_RATIO: f64 = 1.2;
/// Half-width of the acceptable band around a `Target` quantity, as a share of the target.
pub const TARGET_BAND_RATIO: f64 = 0.1;
/// Share of the target that counts as having reached the "at target" milestone.
pub const MILESTONE_RATIO: f64 = 0.9;

pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;
pub const DEFAULT_HORIZON_DAYS: i64 = 30;
pub const DEFAULT_STREAK_LOOKBACK_DAYS: u32 = 365;

/// A century of daily history.
pub const MAX_STREAK_LOOKBACK_DAYS: u32 = 36_500;
/// Observations more than a year apart are never treated as simultaneous.
pub const MAX_CORRELATION_WINDOW_HOURS: i64 = 24 * 366;
pub const MAX_HEATMAP_MONTHS: u32 = 120;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub anomaly: AnomalySettings,
    pub prediction: PredictionSettings,
    pub progress: ProgressThresholds,
    pub streak: StreakSettings,
    pub correlation: CorrelationSettings,
    pub heatmap: HeatmapSettings,
    pub insight: InsightSettings,
    pub logging: LoggingSettings,
}

/// Parameters for z-score anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalySettings {
    /// Number of standard deviations from the mean at which a value is flagged.
    pub threshold: f64,
}

/// Parameters for the trajectory predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    /// How many days past the latest observation to forecast.
    pub horizon_days: i64,
    pub method: PredictionMethod,
}

/// Ratios that decide on-track and milestone status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressThresholds {
    pub on_track_ratio: f64,
    pub lower_tolerance_ratio: f64,
    pub target_band_ratio: f64,
    pub milestone_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakSettings {
    /// How many calendar days, counting today, the streak walk inspects.
    pub lookback_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationSettings {
    /// Maximum distance between two observations for them to be paired.
    pub window_hours: i64,
    /// Only the most recent observations of each series are aligned.
    pub max_series_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    pub months: u32,
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    /// How long a cached insight stays fresh.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Fallback filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for AnomalySettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            method: PredictionMethod::Linear,
        }
    }
}

impl Default for ProgressThresholds {
    fn default() -> Self {
        Self {
            on_track_ratio: ON_TRACK_RATIO,
            lower_tolerance_ratio: LOWER_TOLERANCE_RATIO,
            target_band_ratio: TARGET_BAND_RATIO,
            milestone_ratio: MILESTONE_RATIO,
        }
    }
}

impl Default for StreakSettings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_STREAK_LOOKBACK_DAYS,
        }
    }
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        Self {
            window_hours: 24,
            max_series_len: 5_000,
        }
    }
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            months: 3,
            aggregation: Aggregation::Sum,
        }
    }
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(6 * 60 * 60),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "momentum.log".to_string(),
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be a positive number, got {}", name, value)))
    }
}

impl Config {
    /// Rejects settings the analytics engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("anomaly.threshold", self.anomaly.threshold)?;

        if self.prediction.horizon_days < 0 {
            return Err(invalid(format!(
                "prediction.horizon_days must not be negative, got {}",
                self.prediction.horizon_days
            )));
        }
        match self.prediction.method {
            PredictionMethod::Linear => {}
            PredictionMethod::MovingAverage { window } if window == 0 => {
                return Err(invalid("prediction.method.window must be at least 1"));
            }
            PredictionMethod::MovingAverage { .. } => {}
            PredictionMethod::ExponentialSmoothing { alpha } => {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err(invalid(format!(
                        "prediction.method.alpha must be between 0 and 1 (exclusive), got {}",
                        alpha
                    )));
                }
            }
        }

        let p = &self.progress;
        positive("progress.on_track_ratio", p.on_track_ratio)?;
        positive("progress.lower_tolerance_ratio", p.lower_tolerance_ratio)?;
        positive("progress.target_band_ratio", p.target_band_ratio)?;
        positive("progress.milestone_ratio", p.milestone_ratio)?;

        if !(1..=MAX_STREAK_LOOKBACK_DAYS).contains(&self.streak.lookback_days) {
            return Err(invalid(format!(
                "streak.lookback_days must be between 1 and {}, got {}",
                MAX_STREAK_LOOKBACK_DAYS, self.streak.lookback_days
            )));
        }
        if !(1..=MAX_CORRELATION_WINDOW_HOURS).contains(&self.correlation.window_hours) {
            return Err(invalid(format!(
                "correlation.window_hours must be between 1 and {}, got {}",
                MAX_CORRELATION_WINDOW_HOURS, self.correlation.window_hours
            )));
        }
        if self.correlation.max_series_len < 3 {
            return Err(invalid("correlation.max_series_len must be at least 3"));
        }
        if !(1..=MAX_HEATMAP_MONTHS).contains(&self.heatmap.months) {
            return Err(invalid(format!(
                "heatmap.months must be between 1 and {}, got {}",
                MAX_HEATMAP_MONTHS, self.heatmap.months
            )));
        }
        if self.insight.ttl.is_zero() {
            return Err(invalid("insight.ttl must be greater than zero"));
        }

        Ok(())
    }
}
