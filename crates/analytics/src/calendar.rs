//! Calendar-day bucketing and period boundaries. Days are UTC dates.

use crate::error::AnalyticsError;
use chrono::{Datelike, Duration, Months, NaiveDate};
use core_types::{Aggregation, Observation};
use std::collections::BTreeMap;

/// Everything logged on one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct DayBucket {
    pub total: f64,
    pub count: usize,
}

impl DayBucket {
    pub fn value(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Sum => self.total,
            Aggregation::Average if self.count > 0 => self.total / self.count as f64,
            Aggregation::Average => 0.0,
        }
    }
}

pub(crate) fn daily_buckets<'a>(
    observations: impl IntoIterator<Item = &'a Observation>,
) -> BTreeMap<NaiveDate, DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for observation in observations {
        let bucket = buckets.entry(observation.day()).or_default();
        bucket.total += observation.value;
        bucket.count += 1;
    }
    buckets
}

/// Sums the buckets whose day falls in `start..=end`.
pub(crate) fn bucket_range(
    buckets: &BTreeMap<NaiveDate, DayBucket>,
    start: NaiveDate,
    end: NaiveDate,
) -> DayBucket {
    buckets
        .range(start..=end)
        .fold(DayBucket::default(), |acc, (_, b)| DayBucket {
            total: acc.total + b.total,
            count: acc.count + b.count,
        })
}

/// The Monday of the ISO week containing `date`.
pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// First day of the month `delta` months away from the month containing `date`.
pub(crate) fn shift_month(date: NaiveDate, delta: i32) -> Result<NaiveDate, AnalyticsError> {
    let start = month_start(date);
    let magnitude = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        start.checked_add_months(magnitude)
    } else {
        start.checked_sub_months(magnitude)
    };
    shifted.ok_or_else(|| {
        AnalyticsError::invalid_parameter("date", format!("{} shifted by {} months is out of range", date, delta))
    })
}

/// Last day of the month containing `date`.
pub(crate) fn month_end(date: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    Ok(shift_month(date, 1)? - Duration::days(1))
}
