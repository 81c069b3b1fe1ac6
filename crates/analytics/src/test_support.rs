//! Fixtures shared by the unit tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use core_types::{Direction, Observation, ObservationSeries, TargetConfig};

/// Fixed "today" used throughout the tests: Wednesday 2024-05-15.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
}

/// Noon UTC, `offset` days after 2024-01-01.
pub fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(offset)
}

/// Noon UTC, `days_ago` days before [`today`].
pub fn days_ago(days_ago: i64) -> DateTime<Utc> {
    (today() - Duration::days(days_ago)).and_hms_opt(12, 0, 0).unwrap().and_utc()
}

pub fn series(points: &[(i64, f64)]) -> ObservationSeries {
    targeted(points, None, Direction::Higher)
}

pub fn targeted(points: &[(i64, f64)], target: Option<f64>, direction: Direction) -> ObservationSeries {
    let observations = points.iter().map(|&(d, v)| Observation::new(day(d), v)).collect();
    ObservationSeries::new(observations, TargetConfig::new(target, direction).unwrap()).unwrap()
}

/// One observation of value 1.0 on each of the given days before today.
pub fn logged(days_ago_list: &[i64]) -> ObservationSeries {
    let observations = days_ago_list
        .iter()
        .map(|&d| Observation::new(days_ago(d), 1.0))
        .collect();
    ObservationSeries::untargeted(observations).unwrap()
}
