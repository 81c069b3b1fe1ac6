use crate::anomaly::AnomalyResult;
use crate::prediction::PredictionResult;
use crate::progress::ProgressResult;
use crate::streak::StreakSet;
use crate::trend::TrendAnalysis;
use chrono::NaiveDate;
use core_types::ObservationSeries;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a whole series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub first: f64,
    pub latest: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub total: f64,
}

impl SeriesSummary {
    /// `None` for an empty series.
    pub fn from_series(series: &ObservationSeries) -> Option<Self> {
        let first = series.first()?.value;
        let latest = series.latest()?.value;

        let (min, max, total) = series.values().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, total), v| (min.min(v), max.max(v), total + v),
        );
        let count = series.len();

        Some(Self {
            count,
            first,
            latest,
            min,
            max,
            mean: total / count as f64,
            total,
        })
    }
}

/// Everything the engine can say about one series, computed in one pass.
///
/// This is the payload written into insight-cache records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    /// The "today" the calendar-based parts were computed against.
    pub as_of: NaiveDate,
    pub summary: Option<SeriesSummary>,
    pub trend: Option<TrendAnalysis>,
    /// Progress of the latest value toward the target.
    pub progress: Option<ProgressResult>,
    pub anomalies: Vec<AnomalyResult>,
    pub prediction: Option<PredictionResult>,
    pub streaks: StreakSet,
}
