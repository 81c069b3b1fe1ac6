use crate::calendar::{month_end, shift_month, week_start};
use crate::error::AnalyticsError;
use chrono::{Duration, NaiveDate};
use core_types::{ObservationSeries, PeriodGranularity};
use serde::{Deserialize, Serialize};

/// Aggregates of the observations falling inside one calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub average: f64,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub granularity: PeriodGranularity,
    pub current: PeriodStats,
    pub previous: PeriodStats,
    /// Change of the average versus the previous period; 0 when that average is 0
    /// or too small for the ratio to be finite.
    pub change_percent: f64,
    pub is_improving: bool,
}

fn stats(series: &ObservationSeries, start: NaiveDate, end: NaiveDate) -> PeriodStats {
    let (total, count) = series
        .observations()
        .iter()
        .filter(|o| (start..=end).contains(&o.day()))
        .fold((0.0, 0usize), |(total, count), o| (total + o.value, count + 1));

    PeriodStats {
        start,
        end,
        average: if count > 0 { total / count as f64 } else { 0.0 },
        total,
        count,
    }
}

/// Boundaries of the period containing `today` and of the one before it.
fn boundaries(
    today: NaiveDate,
    granularity: PeriodGranularity,
) -> Result<((NaiveDate, NaiveDate), (NaiveDate, NaiveDate)), AnalyticsError> {
    match granularity {
        PeriodGranularity::Week => {
            let start = week_start(today);
            let previous_start = start - Duration::weeks(1);
            Ok((
                (start, start + Duration::days(6)),
                (previous_start, start - Duration::days(1)),
            ))
        }
        PeriodGranularity::Month => {
            let start = shift_month(today, 0)?;
            let previous_start = shift_month(today, -1)?;
            Ok((
                (start, month_end(start)?),
                (previous_start, start - Duration::days(1)),
            ))
        }
    }
}

/// Compares this week (Monday to Sunday) or calendar month with the previous one.
pub fn compare_periods(
    series: &ObservationSeries,
    today: NaiveDate,
    granularity: PeriodGranularity,
) -> Result<PeriodComparison, AnalyticsError> {
    let ((current_start, current_end), (previous_start, previous_end)) = boundaries(today, granularity)?;

    let current = stats(series, current_start, current_end);
    let previous = stats(series, previous_start, previous_end);

    let change_percent = Some((current.average - previous.average) / previous.average * 100.0)
        .filter(|pct| previous.average != 0.0 && pct.is_finite())
        .unwrap_or(0.0);

    tracing::debug!(
        ?granularity,
        current_average = current.average,
        previous_average = previous.average,
        change_percent,
        "Periods compared."
    );

    Ok(PeriodComparison {
        granularity,
        current,
        previous,
        change_percent,
        is_improving: change_percent >= 0.0,
    })
}
