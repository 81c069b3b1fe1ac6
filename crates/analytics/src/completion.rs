use crate::calendar::{DayBucket, bucket_range, daily_buckets, month_end, shift_month, week_start};
use crate::error::AnalyticsError;
use chrono::{Days, NaiveDate};
use core_types::{Frequency, HabitCadenceConfig, ObservationSeries};
use serde::{Deserialize, Serialize};

/// Share of recent cadence periods in which a habit met its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionRate {
    pub frequency: Frequency,
    pub completed: u32,
    pub total: u32,
    pub rate_percent: f64,
}

/// A period counts when something was logged and, if a target is set, the
/// period's total reaches it.
fn meets(bucket: DayBucket, target: Option<f64>) -> bool {
    bucket.count > 0 && target.is_none_or(|t| bucket.total >= t)
}

/// First and last day of the period `offset` periods before the current one,
/// or `None` when it starts before the earliest representable date.
fn period_range(frequency: Frequency, today: NaiveDate, offset: u32) -> Option<(NaiveDate, NaiveDate)> {
    match frequency {
        Frequency::Daily => {
            let day = today.checked_sub_days(Days::new(u64::from(offset)))?;
            Some((day, day))
        }
        Frequency::Weekly => {
            let start = week_start(today).checked_sub_days(Days::new(u64::from(offset) * 7))?;
            Some((start, start.checked_add_days(Days::new(6))?))
        }
        Frequency::Monthly => {
            let start = shift_month(today, -i32::try_from(offset).ok()?).ok()?;
            Some((start, month_end(start).ok()?))
        }
    }
}

/// Completion over the `periods` most recent periods, the current one included.
///
/// Daily periods use `daily_target`, weekly periods (Monday to Sunday) use
/// `weekly_target`, and monthly periods use four times `weekly_target`.
/// Without a target any logged activity completes the period.
pub fn completion_rate(
    series: &ObservationSeries,
    cadence: &HabitCadenceConfig,
    today: NaiveDate,
    periods: u32,
) -> Result<CompletionRate, AnalyticsError> {
    cadence.validate()?;
    if periods == 0 {
        return Err(AnalyticsError::invalid_parameter("periods", "must be at least 1"));
    }

    let out_of_range = || {
        AnalyticsError::invalid_parameter(
            "periods",
            format!(
                "{} {:?} periods before {} reach past the earliest representable date",
                periods, cadence.frequency, today
            ),
        )
    };
    // The oldest period is the only one that can fall out of range.
    period_range(cadence.frequency, today, periods - 1).ok_or_else(out_of_range)?;

    let target = match cadence.frequency {
        Frequency::Daily => cadence.daily_target,
        Frequency::Weekly => cadence.weekly_target,
        Frequency::Monthly => cadence.weekly_target.map(|w| w * 4.0),
    };
    let buckets = daily_buckets(series.observations().iter().filter(|o| o.day() <= today));

    let mut completed = 0;
    for offset in 0..periods {
        let (start, end) = period_range(cadence.frequency, today, offset).ok_or_else(out_of_range)?;
        if meets(bucket_range(&buckets, start, end), target) {
            completed += 1;
        }
    }

    let rate_percent = completed as f64 / periods as f64 * 100.0;
    tracing::debug!(
        frequency = ?cadence.frequency,
        completed,
        periods,
        rate_percent,
        "Completion rate computed."
    );

    Ok(CompletionRate {
        frequency: cadence.frequency,
        completed,
        total: periods,
        rate_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{days_ago, logged, today};
    use core_types::Observation;

    fn cadence(frequency: Frequency, daily: Option<f64>, weekly: Option<f64>) -> HabitCadenceConfig {
        HabitCadenceConfig {
            daily_target: daily,
            weekly_target: weekly,
            frequency,
        }
    }

    #[test]
    fn test_daily_any_activity() {
        let rate = completion_rate(&logged(&[0, 1, 3, 9]), &cadence(Frequency::Daily, None, None), today(), 4).unwrap();
        assert_eq!(rate.completed, 3);
        assert_eq!(rate.total, 4);
        assert_eq!(rate.rate_percent, 75.0);
    }

    #[test]
    fn test_daily_target_sums_logs() {
        // Two logs today reach a target of 2, one log yesterday does not.
        let rate = completion_rate(&logged(&[0, 0, 1]), &cadence(Frequency::Daily, Some(2.0), None), today(), 2).unwrap();
        assert_eq!(rate.completed, 1);
        assert_eq!(rate.rate_percent, 50.0);
    }

    #[test]
    fn test_weekly() {
        // today() is Wednesday 2024-05-15; its week starts Monday the 13th.
        let series = ObservationSeries::untargeted(vec![
            Observation::new(days_ago(0), 2.0),
            Observation::new(days_ago(2), 2.0),
            Observation::new(days_ago(3), 1.0),
        ])
        .unwrap();
        let rate = completion_rate(&series, &cadence(Frequency::Weekly, None, Some(3.0)), today(), 2).unwrap();
        // This week totals 4, last week (only Sunday the 12th) totals 1.
        assert_eq!(rate.completed, 1);
        assert_eq!(rate.total, 2);
    }

    #[test]
    fn test_monthly_any_activity() {
        // 20 days ago is in April, 90 days ago is in February.
        let rate = completion_rate(&logged(&[20, 90]), &cadence(Frequency::Monthly, None, None), today(), 4).unwrap();
        // May: none, April: yes, March: none, February: yes.
        assert_eq!(rate.completed, 2);
        assert_eq!(rate.rate_percent, 50.0);
    }

    #[test]
    fn test_rejects_periods_beyond_the_calendar() {
        let series = logged(&[0]);
        for (frequency, periods) in [
            (Frequency::Daily, u32::MAX),
            (Frequency::Weekly, 20_000_000),
            (Frequency::Monthly, u32::MAX),
        ] {
            assert!(matches!(
                completion_rate(&series, &cadence(frequency, None, None), today(), periods),
                Err(AnalyticsError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_zero_periods_and_bad_cadence() {
        let series = logged(&[0]);
        assert!(completion_rate(&series, &cadence(Frequency::Daily, None, None), today(), 0).is_err());
        assert!(matches!(
            completion_rate(&series, &cadence(Frequency::Daily, Some(f64::NAN), None), today(), 1),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }
}
