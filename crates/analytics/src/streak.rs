use chrono::{Days, NaiveDate};
use core_types::ObservationSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A maximal run of consecutive active calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub start: NaiveDate,
    /// `None` while the streak is still running (it includes today).
    pub end: Option<NaiveDate>,
    pub length: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakSet {
    pub current: u32,
    pub longest: u32,
    /// Most recent first.
    pub all_streaks: Vec<Streak>,
}

/// An open run while walking backward: `latest` is fixed, `earliest` moves.
struct Run {
    latest: NaiveDate,
    earliest: NaiveDate,
    length: u32,
}

impl Run {
    fn close(self, today: NaiveDate) -> Streak {
        let is_active = self.latest == today;
        Streak {
            start: self.earliest,
            end: (!is_active).then_some(self.latest),
            length: self.length,
            is_active,
        }
    }
}

/// Finds every streak of active days within `lookback_days` of `today`.
///
/// A day is active when it holds at least one observation. The walk goes
/// backward one day at a time, so streaks come out most recent first without
/// any re-sorting. Observations dated after `today` are ignored, and a streak
/// reaching past the lookback window is cut at its edge. The walk stops at the
/// earliest active day, so a huge lookback costs nothing extra.
pub fn calculate_streaks(series: &ObservationSeries, today: NaiveDate, lookback_days: u32) -> StreakSet {
    let active: BTreeSet<NaiveDate> = series
        .observations()
        .iter()
        .map(|o| o.day())
        .filter(|day| *day <= today)
        .collect();

    let mut all_streaks = Vec::new();
    let mut open: Option<Run> = None;

    let Some(&earliest_active) = active.first() else {
        return StreakSet::default();
    };
    for offset in 0..lookback_days {
        let Some(day) = today.checked_sub_days(Days::new(u64::from(offset))) else {
            break;
        };
        if day < earliest_active {
            break;
        }
        if active.contains(&day) {
            let run = open.get_or_insert(Run {
                latest: day,
                earliest: day,
                length: 0,
            });
            run.earliest = day;
            run.length += 1;
        } else if let Some(run) = open.take() {
            all_streaks.push(run.close(today));
        }
    }
    if let Some(run) = open.take() {
        all_streaks.push(run.close(today));
    }

    let current = all_streaks
        .first()
        .filter(|s| s.is_active)
        .map_or(0, |s| s.length);
    let longest = all_streaks.iter().map(|s| s.length).max().unwrap_or(0);

    tracing::debug!(current, longest, streaks = all_streaks.len(), "Streaks computed.");

    StreakSet {
        current,
        longest,
        all_streaks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logged, today};
    use chrono::Duration;
    use core_types::Observation;

    fn d(days_ago: i64) -> NaiveDate {
        today() - Duration::days(days_ago)
    }

    #[test]
    fn test_empty_series() {
        let set = calculate_streaks(&logged(&[]), today(), 365);
        assert_eq!(set, StreakSet::default());
    }

    #[test]
    fn test_today_only_after_gap() {
        let set = calculate_streaks(&logged(&[0, 2, 3]), today(), 365);
        assert_eq!(set.current, 1);
        assert_eq!(set.longest, 2);

        let set = calculate_streaks(&logged(&[0]), today(), 365);
        assert_eq!(set.current, 1);
        assert_eq!(set.longest, 1);
        assert_eq!(
            set.all_streaks,
            vec![Streak {
                start: today(),
                end: None,
                length: 1,
                is_active: true
            }]
        );
    }

    #[test]
    fn test_last_seven_days() {
        let set = calculate_streaks(&logged(&[0, 1, 2, 3, 4, 5, 6]), today(), 365);
        assert_eq!(set.current, 7);
        assert_eq!(set.longest, 7);
        assert_eq!(set.all_streaks.len(), 1);
        assert_eq!(set.all_streaks[0].start, d(6));
    }

    #[test]
    fn test_no_activity_today_means_no_current_streak() {
        let set = calculate_streaks(&logged(&[1, 2, 3]), today(), 365);
        assert_eq!(set.current, 0);
        assert_eq!(set.longest, 3);
        let streak = set.all_streaks[0];
        assert!(!streak.is_active);
        assert_eq!(streak.start, d(3));
        assert_eq!(streak.end, Some(d(1)));
    }

    #[test]
    fn test_multiple_logs_per_day_and_future_logs() {
        // Two logs today, one yesterday, one "tomorrow".
        let set = calculate_streaks(&logged(&[0, 0, 1, -1]), today(), 365);
        assert_eq!(set.current, 2);
        assert_eq!(set.all_streaks.len(), 1);
    }

    #[test]
    fn test_ordered_most_recent_first() {
        let set = calculate_streaks(&logged(&[0, 1, 5, 6, 7, 20]), today(), 365);
        let starts: Vec<NaiveDate> = set.all_streaks.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![d(1), d(7), d(20)]);
        assert_eq!(set.longest, 3);
    }

    #[test]
    fn test_lookback_window_truncates() {
        let set = calculate_streaks(&logged(&[0, 1, 2, 3, 4, 400]), today(), 3);
        assert_eq!(set.current, 3);
        assert_eq!(set.all_streaks.len(), 1);
    }

    #[test]
    fn test_unbounded_lookback_stops_at_earliest_activity() {
        let bounded = calculate_streaks(&logged(&[0, 1, 400]), today(), 1000);
        let unbounded = calculate_streaks(&logged(&[0, 1, 400]), today(), u32::MAX);
        assert_eq!(bounded, unbounded);
        assert_eq!(unbounded.all_streaks.len(), 2);
    }

    #[test]
    fn test_walk_ends_at_the_first_representable_day() {
        let first = NaiveDate::MIN;
        let at = |date: NaiveDate| Observation::new(date.and_hms_opt(12, 0, 0).unwrap().and_utc(), 1.0);
        let later = first + Duration::days(2);
        let series = ObservationSeries::untargeted(vec![at(first), at(first + Duration::days(1)), at(later)]).unwrap();

        let set = calculate_streaks(&series, later, u32::MAX);
        assert_eq!(set.current, 3);
        assert_eq!(set.all_streaks[0].start, first);
    }
}
