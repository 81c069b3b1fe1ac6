use crate::error::AnalyticsError;
use core_types::{Direction, Observation, ObservationSeries};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Instantaneous movement of a series, taken from its most recent observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Change per day between the two latest observations.
    pub velocity: f64,
    /// Change in velocity versus the previous pair; 0 with only two observations.
    pub acceleration: f64,
    /// Raw difference between the two latest values.
    pub change: f64,
    pub change_percent: f64,
    pub is_improving: bool,
    pub direction: Direction,
}

/// Elapsed real time between two observations in fractional days.
pub fn days_between(earlier: &Observation, later: &Observation) -> f64 {
    (later.timestamp - earlier.timestamp).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Velocity between two observations. Elapsed time is floored at one day so that
/// same-day duplicates do not blow up the rate.
fn velocity(previous: &Observation, latest: &Observation) -> f64 {
    (latest.value - previous.value) / days_between(previous, latest).max(1.0)
}

pub fn is_improving(direction: Direction, change: f64) -> bool {
    match direction {
        Direction::Higher => change >= 0.0,
        Direction::Lower => change <= 0.0,
        Direction::Target => true,
    }
}

/// Computes velocity, acceleration and the improving flag for a series.
///
/// Returns `None` when fewer than two observations exist. That is the
/// "no trend yet" answer, not a failure.
pub fn analyze_trend(series: &ObservationSeries) -> Option<TrendAnalysis> {
    let observations = series.observations();
    let n = observations.len();
    if n < 2 {
        return None;
    }

    let latest = &observations[n - 1];
    let previous = &observations[n - 2];

    let current_velocity = velocity(previous, latest);
    let acceleration = if n >= 3 {
        current_velocity - velocity(&observations[n - 3], previous)
    } else {
        0.0
    };

    let change = latest.value - previous.value;
    // A zero or vanishingly small base has no meaningful percentage.
    let change_percent = Some(change / previous.value.abs() * 100.0)
        .filter(|pct| previous.value != 0.0 && pct.is_finite())
        .unwrap_or(0.0);
    let direction = series.direction();

    tracing::debug!(
        velocity = current_velocity,
        acceleration,
        change,
        "Trend computed over {} observations.",
        n
    );

    Some(TrendAnalysis {
        velocity: current_velocity,
        acceleration,
        change,
        change_percent,
        is_improving: is_improving(direction, change),
        direction,
    })
}

/// Like [`analyze_trend`] but for a raw, possibly unsorted observation list.
pub fn analyze_observations(
    observations: Vec<Observation>,
    direction: Direction,
) -> Result<Option<TrendAnalysis>, AnalyticsError> {
    let target = core_types::TargetConfig::new(None, direction)?;
    let series = ObservationSeries::new(observations, target)?;
    Ok(analyze_trend(&series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, series, targeted};
    use chrono::Duration;

    #[test]
    fn test_no_trend_below_two_observations() {
        assert!(analyze_trend(&series(&[])).is_none());
        assert!(analyze_trend(&series(&[(0, 5.0)])).is_none());
    }

    #[test]
    fn test_velocity_uses_elapsed_days() {
        let trend = analyze_trend(&series(&[(0, 10.0), (7, 13.0), (14, 16.0)])).unwrap();
        assert!((trend.velocity - 3.0 / 7.0).abs() < 1e-12);
        assert!(trend.acceleration.abs() < 1e-12);
        assert_eq!(trend.change, 3.0);
        assert!((trend.change_percent - 3.0 / 13.0 * 100.0).abs() < 1e-9);
        assert!(trend.is_improving);
    }

    #[test]
    fn test_same_day_duplicates_floor_to_one_day() {
        let observations = vec![
            Observation::new(day(0), 10.0),
            Observation::new(day(0) + Duration::hours(2), 14.0),
        ];
        let trend = analyze_observations(observations, Direction::Higher).unwrap().unwrap();
        assert_eq!(trend.velocity, 4.0);
        assert_eq!(trend.acceleration, 0.0);
    }

    #[test]
    fn test_acceleration_from_three_points() {
        // Velocities: (12-10)/1 = 2, then (18-12)/2 = 3.
        let trend = analyze_trend(&series(&[(0, 10.0), (1, 12.0), (3, 18.0)])).unwrap();
        assert!((trend.velocity - 3.0).abs() < 1e-12);
        assert!((trend.acceleration - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_improving_depends_on_direction() {
        let falling = [(0, 10.0), (1, 8.0)];
        assert!(!analyze_trend(&targeted(&falling, None, Direction::Higher)).unwrap().is_improving);
        assert!(analyze_trend(&targeted(&falling, None, Direction::Lower)).unwrap().is_improving);
        assert!(analyze_trend(&targeted(&falling, None, Direction::Target)).unwrap().is_improving);

        let flat = [(0, 10.0), (1, 10.0)];
        assert!(analyze_trend(&targeted(&flat, None, Direction::Higher)).unwrap().is_improving);
        assert!(analyze_trend(&targeted(&flat, None, Direction::Lower)).unwrap().is_improving);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let observations = vec![
            Observation::new(day(14), 16.0),
            Observation::new(day(0), 10.0),
            Observation::new(day(7), 13.0),
        ];
        let trend = analyze_observations(observations, Direction::Higher).unwrap().unwrap();
        assert!((trend.velocity - 3.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_percent_change_from_a_tiny_base_stays_finite() {
        let trend = analyze_trend(&series(&[(0, 1e-300), (1, 1e100)])).unwrap();
        assert_eq!(trend.change_percent, 0.0);
        assert!(trend.velocity.is_finite());
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let observations = vec![Observation::new(day(0), f64::NAN), Observation::new(day(1), 1.0)];
        assert!(matches!(
            analyze_observations(observations, Direction::Higher),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }
}
