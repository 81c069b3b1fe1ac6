use crate::enums::InsightKind;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cached, expiring analytics result for one tracked quantity.
///
/// The engine produces these records; persisting them is the job of whatever
/// implements [`InsightStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub quantity_id: Uuid,
    pub kind: InsightKind,
    pub computed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl InsightRecord {
    pub fn new(
        quantity_id: Uuid,
        kind: InsightKind,
        computed_at: DateTime<Utc>,
        ttl: Duration,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            quantity_id,
            kind,
            computed_at,
            // Saturates instead of overflowing for an effectively unbounded TTL.
            expires_at: computed_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            payload,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The contract of the external insight cache.
pub trait InsightStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, quantity_id: Uuid, kind: InsightKind) -> Result<Option<InsightRecord>, Self::Error>;

    fn put(&mut self, record: InsightRecord) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let record = InsightRecord::new(
            Uuid::new_v4(),
            InsightKind::SeriesReport,
            now,
            Duration::hours(6),
            serde_json::json!({}),
        );

        assert_eq!(record.expires_at, now + Duration::hours(6));
        assert!(!record.is_expired(now + Duration::hours(5)));
        assert!(record.is_expired(now + Duration::hours(6)));
    }

    #[test]
    fn test_unbounded_ttl_saturates() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let record = InsightRecord::new(
            Uuid::new_v4(),
            InsightKind::SeriesReport,
            now,
            Duration::MAX,
            serde_json::json!({}),
        );
        assert_eq!(record.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!record.is_expired(now));
    }
}
