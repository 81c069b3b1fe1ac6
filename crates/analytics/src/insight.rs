use crate::engine::AnalyticsEngine;
use crate::error::AnalyticsError;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{InsightKind, InsightRecord, InsightStore, ObservationSeries};
use uuid::Uuid;

fn store_error<E: std::error::Error>(err: E) -> AnalyticsError {
    AnalyticsError::Store(err.to_string())
}

/// Returns a fresh `SeriesReport` insight for `quantity_id`.
///
/// A cached record that has not yet expired is returned untouched. Otherwise the
/// report is recomputed, stamped to expire after the configured TTL, written back
/// through the store and returned.
pub fn refresh_insight<S: InsightStore>(
    engine: &AnalyticsEngine,
    store: &mut S,
    quantity_id: Uuid,
    series: &ObservationSeries,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<InsightRecord, AnalyticsError> {
    if let Some(cached) = store
        .get(quantity_id, InsightKind::SeriesReport)
        .map_err(store_error)?
    {
        if !cached.is_expired(now) {
            tracing::debug!(%quantity_id, expires_at = %cached.expires_at, "Serving cached insight.");
            return Ok(cached);
        }
    }

    let report = engine.calculate(series, today)?;
    let payload = serde_json::to_value(&report)?;
    let ttl = chrono::Duration::from_std(engine.config().insight.ttl)
        .map_err(|e| AnalyticsError::invalid_parameter("insight.ttl", e.to_string()))?;

    let record = InsightRecord::new(quantity_id, InsightKind::SeriesReport, now, ttl, payload);
    store.put(record.clone()).map_err(store_error)?;

    tracing::info!(%quantity_id, expires_at = %record.expires_at, "Insight refreshed.");
    Ok(record)
}
