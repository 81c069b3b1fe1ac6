use crate::error::AnalyticsError;
use crate::stats::{is_negligible, mean, population_std_dev};
use core_types::{Observation, ObservationSeries};
use serde::{Deserialize, Serialize};

/// Fewer observations than this never produce anomalies.
pub const MIN_OBSERVATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Maps a z-score onto a severity band.
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation < 2.5 {
            Severity::Low
        } else if deviation < 3.0 {
            Severity::Medium
        } else {
            Severity::High
        }
    }
}

/// One observation that sits unusually far from the series mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Position of the observation in the (sorted) series.
    pub index: usize,
    pub observation: Observation,
    pub deviation_in_std_devs: f64,
    pub severity: Severity,
}

/// Flags every observation whose z-score reaches `threshold`.
///
/// Uses the population mean and standard deviation of the whole series. A
/// constant series has no spread and therefore no anomalies. Results are
/// ordered by deviation, largest first.
pub fn detect_anomalies(
    series: &ObservationSeries,
    threshold: f64,
) -> Result<Vec<AnomalyResult>, AnalyticsError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(AnalyticsError::invalid_parameter(
            "threshold",
            format!("must be a positive number of standard deviations, got {}", threshold),
        ));
    }

    if series.len() < MIN_OBSERVATIONS {
        return Ok(Vec::new());
    }

    let values: Vec<f64> = series.values().collect();
    let Some(mean) = mean(&values) else {
        return Ok(Vec::new());
    };
    let std_dev = population_std_dev(&values, mean);

    if is_negligible(std_dev, mean) {
        tracing::debug!(mean, "Series has no spread; no anomalies possible.");
        return Ok(Vec::new());
    }

    let mut anomalies: Vec<AnomalyResult> = series
        .observations()
        .iter()
        .enumerate()
        .filter_map(|(index, observation)| {
            let deviation = (observation.value - mean).abs() / std_dev;
            (deviation >= threshold).then(|| AnomalyResult {
                index,
                observation: *observation,
                deviation_in_std_devs: deviation,
                severity: Severity::from_deviation(deviation),
            })
        })
        .collect();

    // Stable sort: equal deviations stay in chronological order.
    anomalies.sort_by(|a, b| b.deviation_in_std_devs.total_cmp(&a.deviation_in_std_devs));

    tracing::debug!(
        mean,
        std_dev,
        threshold,
        "Detected {} anomalies in {} observations.",
        anomalies.len(),
        series.len()
    );

    Ok(anomalies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series;

    #[test]
    fn test_too_few_observations() {
        assert!(detect_anomalies(&series(&[(0, 1.0), (1, 100.0)]), 2.0).unwrap().is_empty());
    }

    #[test]
    fn test_constant_series_has_no_anomalies() {
        let points: Vec<(i64, f64)> = (0..10).map(|d| (d, 0.1)).collect();
        assert!(detect_anomalies(&series(&points), 2.0).unwrap().is_empty());
        assert!(detect_anomalies(&series(&points), 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_zero_spread_tolerance_scales_with_the_level() {
        // Rounding noise around a large level is no spread at all.
        let flat: Vec<(i64, f64)> = (0..12).map(|d| (d, 1_000_000.1)).collect();
        assert!(detect_anomalies(&series(&flat), 0.5).unwrap().is_empty());

        // A half-unit jump at the same level is far above the tolerance.
        let mut points: Vec<(i64, f64)> = (0..9).map(|d| (d, 1_000_000.1)).collect();
        points.push((9, 1_000_000.6));
        let anomalies = detect_anomalies(&series(&points), 2.0).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].index, 9);
    }

    #[test]
    fn test_flags_outlier_with_severity() {
        // Nine values of 10 and one of 40: mean 13, std dev 9, outlier z = 3.
        let mut points: Vec<(i64, f64)> = (0..9).map(|d| (d, 10.0)).collect();
        points.push((9, 40.0));
        let anomalies = detect_anomalies(&series(&points), 2.0).unwrap();

        assert_eq!(anomalies.len(), 1);
        let anomaly = anomalies[0];
        assert_eq!(anomaly.index, 9);
        assert_eq!(anomaly.observation.value, 40.0);
        assert!((anomaly.deviation_in_std_devs - 3.0).abs() < 1e-9);
        assert_eq!(anomaly.severity, Severity::High);
    }

    #[test]
    fn test_sorted_by_deviation_descending() {
        let points = [
            (0, 0.0),
            (1, 0.0),
            (2, 0.0),
            (3, 0.0),
            (4, 0.0),
            (5, 0.0),
            (6, 10.0),
            (7, -6.0),
        ];
        let anomalies = detect_anomalies(&series(&points), 1.0).unwrap();
        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[0].observation.value, 10.0);
        assert_eq!(anomalies[1].observation.value, -6.0);
        assert!(anomalies[0].deviation_in_std_devs >= anomalies[1].deviation_in_std_devs);
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::from_deviation(2.0), Severity::Low);
        assert_eq!(Severity::from_deviation(2.49), Severity::Low);
        assert_eq!(Severity::from_deviation(2.5), Severity::Medium);
        assert_eq!(Severity::from_deviation(2.99), Severity::Medium);
        assert_eq!(Severity::from_deviation(3.0), Severity::High);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let s = series(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
        assert!(detect_anomalies(&s, 0.0).is_err());
        assert!(detect_anomalies(&s, -1.0).is_err());
        assert!(detect_anomalies(&s, f64::NAN).is_err());
    }
}
