//! Short-horizon forecasting.
//!
//! Least-squares linear regression over elapsed days is the default. Moving
//! average and simple exponential smoothing are available behind the same
//! [`PredictionResult`] for series that do not move in a straight line.

use crate::error::AnalyticsError;
use crate::stats::{is_negligible, mean, population_std_dev};
use crate::trend::days_between;
use core_types::{CoreError, ObservationSeries, PredictionMethod};
use serde::{Deserialize, Serialize};

/// Every forecasting method needs at least this many observations.
pub const MIN_OBSERVATIONS: usize = 3;

/// Two-sided 95% z-value.
pub const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub forecast_value: f64,
    /// Goodness of fit in `[0, 1]`.
    pub confidence: f64,
    pub confidence_interval: ConfidenceInterval,
    pub horizon_days: i64,
    pub method: PredictionMethod,
}

/// Intermediate output of a single forecasting method.
struct Fit {
    forecast: f64,
    confidence: f64,
    std_error: f64,
}

fn validate(horizon_days: i64, method: PredictionMethod) -> Result<(), AnalyticsError> {
    if horizon_days < 0 {
        return Err(AnalyticsError::invalid_parameter(
            "horizon_days",
            format!("must not be negative, got {}", horizon_days),
        ));
    }
    match method {
        PredictionMethod::Linear => Ok(()),
        PredictionMethod::MovingAverage { window } if window == 0 => Err(
            AnalyticsError::invalid_parameter("window", "must be at least 1"),
        ),
        PredictionMethod::MovingAverage { .. } => Ok(()),
        PredictionMethod::ExponentialSmoothing { alpha } if !(alpha > 0.0 && alpha < 1.0) => {
            Err(AnalyticsError::invalid_parameter(
                "alpha",
                format!("must be between 0 and 1 (exclusive), got {}", alpha),
            ))
        }
        PredictionMethod::ExponentialSmoothing { .. } => Ok(()),
    }
}

/// Forecasts the series value `horizon_days` past its latest observation.
///
/// Returns `Ok(None)` for fewer than three observations.
pub fn predict(
    series: &ObservationSeries,
    horizon_days: i64,
    method: PredictionMethod,
) -> Result<Option<PredictionResult>, AnalyticsError> {
    validate(horizon_days, method)?;

    if series.len() < MIN_OBSERVATIONS {
        return Ok(None);
    }

    let fit = match method {
        PredictionMethod::Linear => fit_linear(series, horizon_days as f64),
        PredictionMethod::MovingAverage { window } => fit_moving_average(series, window),
        PredictionMethod::ExponentialSmoothing { alpha } => fit_exponential_smoothing(series, alpha),
    };

    let margin = Z_95 * fit.std_error;
    if !(fit.forecast.is_finite() && fit.confidence.is_finite() && margin.is_finite()) {
        return Err(CoreError::InvalidInput(
            "observations".to_string(),
            format!("{} forecast is not representable as a finite value", method.name()),
        )
        .into());
    }
    tracing::debug!(
        method = method.name(),
        forecast = fit.forecast,
        confidence = fit.confidence,
        std_error = fit.std_error,
        "Forecast {} days ahead.",
        horizon_days
    );

    Ok(Some(PredictionResult {
        forecast_value: fit.forecast,
        confidence: fit.confidence.clamp(0.0, 1.0),
        confidence_interval: ConfidenceInterval {
            lower: fit.forecast - margin,
            upper: fit.forecast + margin,
        },
        horizon_days,
        method,
    }))
}

/// Ordinary least squares of value against days since the first observation.
fn fit_linear(series: &ObservationSeries, horizon: f64) -> Fit {
    let observations = series.observations();
    let first = &observations[0];
    let xs: Vec<f64> = observations.iter().map(|o| days_between(first, o)).collect();
    let ys: Vec<f64> = series.values().collect();
    let n = ys.len() as f64;

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let ss_xx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let ss_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let degrees_of_freedom = n - 2.0;

    // All observations at one instant: no slope to fit, forecast the mean.
    if ss_xx == 0.0 {
        return Fit {
            forecast: mean_y,
            confidence: 0.0,
            std_error: (ss_tot / degrees_of_freedom).sqrt(),
        };
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();

    // A flat series is fitted exactly; the spread test matches anomaly detection.
    let r_squared = if is_negligible((ss_tot / n).sqrt(), mean_y) {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    let last_x = xs[xs.len() - 1];
    Fit {
        forecast: slope * (last_x + horizon) + intercept,
        confidence: r_squared,
        std_error: (ss_res / degrees_of_freedom).sqrt(),
    }
}

/// Confidence from the spread relative to the level being forecast.
fn relative_confidence(spread: f64, level: f64) -> f64 {
    if level == 0.0 {
        0.0
    } else {
        (1.0 - spread / level.abs()).clamp(0.0, 1.0)
    }
}

fn fit_moving_average(series: &ObservationSeries, window: usize) -> Fit {
    let values: Vec<f64> = series.tail(window).iter().map(|o| o.value).collect();
    let average = mean(&values).unwrap_or(0.0);
    let std_dev = population_std_dev(&values, average);
    Fit {
        forecast: average,
        confidence: relative_confidence(std_dev, average),
        std_error: std_dev,
    }
}

fn fit_exponential_smoothing(series: &ObservationSeries, alpha: f64) -> Fit {
    let values: Vec<f64> = series.values().collect();
    let mut level = values[0];
    let mut sse = 0.0;
    for &value in &values[1..] {
        let error = value - level;
        sse += error * error;
        level = alpha * value + (1.0 - alpha) * level;
    }
    let rmse = (sse / (values.len() - 1) as f64).sqrt();
    Fit {
        forecast: level,
        confidence: relative_confidence(rmse, level),
        std_error: rmse,
    }
}
