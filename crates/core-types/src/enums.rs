use serde::{Deserialize, Serialize};

/// Whether larger, smaller, or closer-to-target values count as "good".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Higher,
    Lower,
    Target,
}

/// How often a habit is expected to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Calendar granularity used for period-over-period comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PeriodGranularity {
    #[default]
    Week,
    Month,
}

/// How several observations on the same calendar day collapse into one value.
///
/// `Sum` suits countable habit logs, `Average` suits continuous metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Aggregation {
    #[default]
    Sum,
    Average,
}

/// The forecasting strategy used by the trajectory predictor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionMethod {
    /// Ordinary least-squares line over elapsed days.
    #[default]
    Linear,
    /// Mean of the most recent `window` values.
    MovingAverage { window: usize },
    /// Simple exponential smoothing with smoothing factor `alpha`.
    ExponentialSmoothing { alpha: f64 },
}

impl PredictionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            PredictionMethod::Linear => "linear",
            PredictionMethod::MovingAverage { .. } => "moving_average",
            PredictionMethod::ExponentialSmoothing { .. } => "exponential_smoothing",
        }
    }
}

/// The kind of derived result stored in an insight cache record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    SeriesReport,
}
