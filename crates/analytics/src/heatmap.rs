use crate::calendar::{daily_buckets, shift_month};
use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{Aggregation, ObservationSeries};
use serde::{Deserialize, Serialize};

pub const MAX_INTENSITY: u8 = 4;
/// Used for every active day when all active days share one value.
pub const NEUTRAL_INTENSITY: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    /// Aggregated value; `None` when nothing was logged that day.
    pub value: Option<f64>,
    pub count: usize,
    /// `0` for no activity, otherwise `1..=4`.
    pub intensity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub aggregation: Aggregation,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// One cell per calendar day from `start` through `end`.
    pub cells: Vec<HeatmapCell>,
}

impl Heatmap {
    pub fn active_days(&self) -> usize {
        self.cells.iter().filter(|c| c.count > 0).count()
    }
}

fn intensity(value: f64, min: f64, max: f64) -> u8 {
    if max == min {
        return NEUTRAL_INTENSITY;
    }
    let scaled = ((value - min) / (max - min) * MAX_INTENSITY as f64).ceil();
    scaled.clamp(1.0, MAX_INTENSITY as f64) as u8
}

/// Builds a per-day intensity grid covering `months` calendar months up to `today`.
///
/// The window opens on the first day of the month `months - 1` months before
/// today's month. Intensities are scaled between the smallest and largest
/// aggregate among active days.
pub fn build_heatmap(
    series: &ObservationSeries,
    today: NaiveDate,
    months: u32,
    aggregation: Aggregation,
) -> Result<Heatmap, AnalyticsError> {
    if months == 0 {
        return Err(AnalyticsError::invalid_parameter("months", "must be at least 1"));
    }
    let offset = i32::try_from(months - 1)
        .map_err(|_| AnalyticsError::invalid_parameter("months", "is too large"))?;
    let start = shift_month(today, -offset)?;

    let buckets = daily_buckets(
        series
            .observations()
            .iter()
            .filter(|o| (start..=today).contains(&o.day())),
    );

    let values = buckets.values().map(|b| b.value(aggregation));
    let min_value = values.clone().reduce(f64::min);
    let max_value = values.reduce(f64::max);

    let cells = start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|date| match (buckets.get(&date), min_value, max_value) {
            (Some(bucket), Some(min), Some(max)) => {
                let value = bucket.value(aggregation);
                HeatmapCell {
                    date,
                    value: Some(value),
                    count: bucket.count,
                    intensity: intensity(value, min, max),
                }
            }
            _ => HeatmapCell {
                date,
                value: None,
                count: 0,
                intensity: 0,
            },
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        %start,
        %today,
        active_days = buckets.len(),
        "Heatmap built."
    );

    Ok(Heatmap {
        start,
        end: today,
        aggregation,
        min_value,
        max_value,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{days_ago, today};
    use core_types::Observation;

    fn series(points: &[(i64, f64)]) -> ObservationSeries {
        ObservationSeries::untargeted(points.iter().map(|&(d, v)| Observation::new(days_ago(d), v)).collect())
            .unwrap()
    }

    fn cell(map: &Heatmap, days_back: i64) -> HeatmapCell {
        let date = today() - chrono::Duration::days(days_back);
        *map.cells.iter().find(|c| c.date == date).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        let map = build_heatmap(&series(&[]), today(), 3, Aggregation::Sum).unwrap();
        assert_eq!(map.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(map.end, today());
        // March (31) + April (30) + May 1..=15.
        assert_eq!(map.cells.len(), 76);
        assert!(map.cells.iter().all(|c| c.intensity == 0));
        assert_eq!(map.max_value, None);
    }

    #[test]
    fn test_intensity_scaling() {
        let map = build_heatmap(
            &series(&[(0, 1.0), (1, 2.0), (2, 3.0), (3, 5.0), (10, 1.0), (10, 1.0)]),
            today(),
            1,
            Aggregation::Sum,
        )
        .unwrap();

        assert_eq!(map.min_value, Some(1.0));
        assert_eq!(map.max_value, Some(5.0));
        assert_eq!(cell(&map, 0).intensity, 1); // the minimum still shows as active
        assert_eq!(cell(&map, 1).intensity, 1); // ceil(0.25 * 4)
        assert_eq!(cell(&map, 2).intensity, 2);
        assert_eq!(cell(&map, 3).intensity, 4);
        assert_eq!(cell(&map, 10).value, Some(2.0));
        assert_eq!(cell(&map, 10).count, 2);
        assert_eq!(cell(&map, 4).intensity, 0);
        assert_eq!(map.active_days(), 5);
    }

    #[test]
    fn test_average_aggregation() {
        let map = build_heatmap(&series(&[(0, 2.0), (0, 4.0), (1, 1.0)]), today(), 1, Aggregation::Average).unwrap();
        assert_eq!(cell(&map, 0).value, Some(3.0));
        assert_eq!(cell(&map, 0).intensity, 4);
    }

    #[test]
    fn test_uniform_values_use_neutral_intensity() {
        let map = build_heatmap(&series(&[(0, 1.0), (5, 1.0)]), today(), 1, Aggregation::Sum).unwrap();
        assert_eq!(cell(&map, 0).intensity, NEUTRAL_INTENSITY);
        assert_eq!(cell(&map, 5).intensity, NEUTRAL_INTENSITY);
    }

    #[test]
    fn test_observations_outside_window_are_ignored() {
        let map = build_heatmap(&series(&[(0, 1.0), (60, 100.0), (-2, 100.0)]), today(), 1, Aggregation::Sum).unwrap();
        assert_eq!(map.max_value, Some(1.0));
        assert_eq!(map.active_days(), 1);
    }

    #[test]
    fn test_rejects_zero_months() {
        assert!(build_heatmap(&series(&[]), today(), 0, Aggregation::Sum).is_err());
    }
}
