use crate::anomaly::{AnomalyResult, detect_anomalies};
use crate::completion::{CompletionRate, completion_rate};
use crate::correlation::{CorrelationResult, correlate};
use crate::error::AnalyticsError;
use crate::heatmap::{Heatmap, build_heatmap};
use crate::period::{PeriodComparison, compare_periods};
use crate::prediction::{PredictionResult, predict};
use crate::progress::{ProgressResult, calculate_progress};
use crate::report::{SeriesReport, SeriesSummary};
use crate::streak::{StreakSet, calculate_streaks};
use crate::trend::{TrendAnalysis, analyze_trend};
use chrono::NaiveDate;
use configuration::Config;
use core_types::{Aggregation, HabitCadenceConfig, ObservationSeries, PeriodGranularity, PredictionMethod};

/// A stateless calculator for deriving analytics from logged observations.
///
/// It only holds the configured thresholds and defaults; every call works on the
/// series it is handed and keeps nothing afterwards, so one engine can be shared
/// freely across threads.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: Config,
}

impl AnalyticsEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The main entry point: computes the full report for one series.
    ///
    /// # Arguments
    ///
    /// * `series` - All observations of one tracked quantity, with its target.
    /// * `today` - The calendar day streaks are anchored to.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SeriesReport` or an `AnalyticsError`.
    #[tracing::instrument(name = "analytics_calculate", skip_all, fields(observations = series.len(), today = %today))]
    pub fn calculate(&self, series: &ObservationSeries, today: NaiveDate) -> Result<SeriesReport, AnalyticsError> {
        let report = SeriesReport {
            as_of: today,
            summary: SeriesSummary::from_series(series),
            trend: self.trend(series),
            progress: self.progress(series)?,
            anomalies: self.anomalies(series)?,
            prediction: self.predict(series)?,
            streaks: self.streaks(series, today),
        };

        tracing::info!(
            anomalies = report.anomalies.len(),
            current_streak = report.streaks.current,
            has_prediction = report.prediction.is_some(),
            "Series report calculated."
        );
        Ok(report)
    }

    pub fn summary(&self, series: &ObservationSeries) -> Option<SeriesSummary> {
        SeriesSummary::from_series(series)
    }

    pub fn trend(&self, series: &ObservationSeries) -> Option<TrendAnalysis> {
        analyze_trend(series)
    }

    /// Progress of the latest observation toward the series target.
    pub fn progress(&self, series: &ObservationSeries) -> Result<Option<ProgressResult>, AnalyticsError> {
        let Some(latest) = series.latest() else {
            return Ok(None);
        };
        let target = series.target();
        calculate_progress(latest.value, target.target_value, target.direction, &self.config.progress).map(Some)
    }

    pub fn anomalies(&self, series: &ObservationSeries) -> Result<Vec<AnomalyResult>, AnalyticsError> {
        detect_anomalies(series, self.config.anomaly.threshold)
    }

    pub fn anomalies_with_threshold(
        &self,
        series: &ObservationSeries,
        threshold: f64,
    ) -> Result<Vec<AnomalyResult>, AnalyticsError> {
        detect_anomalies(series, threshold)
    }

    pub fn correlate(&self, a: &ObservationSeries, b: &ObservationSeries) -> Option<CorrelationResult> {
        correlate(a, b, &self.config.correlation)
    }

    /// Forecast with the configured horizon and method.
    pub fn predict(&self, series: &ObservationSeries) -> Result<Option<PredictionResult>, AnalyticsError> {
        let settings = &self.config.prediction;
        predict(series, settings.horizon_days, settings.method)
    }

    pub fn predict_with(
        &self,
        series: &ObservationSeries,
        horizon_days: i64,
        method: PredictionMethod,
    ) -> Result<Option<PredictionResult>, AnalyticsError> {
        predict(series, horizon_days, method)
    }

    pub fn streaks(&self, series: &ObservationSeries, today: NaiveDate) -> StreakSet {
        calculate_streaks(series, today, self.config.streak.lookback_days)
    }

    pub fn completion_rate(
        &self,
        series: &ObservationSeries,
        cadence: &HabitCadenceConfig,
        today: NaiveDate,
        periods: u32,
    ) -> Result<CompletionRate, AnalyticsError> {
        completion_rate(series, cadence, today, periods)
    }

    /// Heatmap over the configured number of months and aggregation.
    pub fn heatmap(&self, series: &ObservationSeries, today: NaiveDate) -> Result<Heatmap, AnalyticsError> {
        self.heatmap_with(series, today, None, None)
    }

    /// Heatmap with either setting overridden; `None` keeps the configured value.
    pub fn heatmap_with(
        &self,
        series: &ObservationSeries,
        today: NaiveDate,
        months: Option<u32>,
        aggregation: Option<Aggregation>,
    ) -> Result<Heatmap, AnalyticsError> {
        let settings = &self.config.heatmap;
        build_heatmap(
            series,
            today,
            months.unwrap_or(settings.months),
            aggregation.unwrap_or(settings.aggregation),
        )
    }

    pub fn compare_periods(
        &self,
        series: &ObservationSeries,
        today: NaiveDate,
        granularity: PeriodGranularity,
    ) -> Result<PeriodComparison, AnalyticsError> {
        compare_periods(series, today, granularity)
    }
}
