use analytics::{AnalyticsEngine, SeriesReport};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use core_types::{
    Aggregation, HabitCadenceConfig, Observation, ObservationSeries, PeriodGranularity,
    PredictionMethod, TargetConfig,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The main entry point for the Momentum analytics tool.
fn main() -> Result<()> {
    // A missing .env file is fine; everything has a default.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    let today = cli.today.unwrap_or_else(|| Utc::now().date_naive());
    let engine = AnalyticsEngine::new(config);

    // Execute the appropriate command
    run(cli.command, &engine, today)
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Trend, anomaly, forecast and streak analytics for logged metrics and habits.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to ./config.toml when it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// The day streaks, heatmaps and periods are anchored to (format: YYYY-MM-DD).
    /// Defaults to the current UTC date.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Everything at once: summary, trend, progress, anomalies, forecast and streaks.
    Report {
        input: PathBuf,
        /// Print the report as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },
    /// Velocity and acceleration of the latest observations.
    Trend { input: PathBuf },
    /// Progress of the latest value toward the target.
    Progress { input: PathBuf },
    /// Observations far from the series mean.
    Anomalies {
        input: PathBuf,
        /// Standard deviations from the mean at which a value is flagged.
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Pearson correlation between two series aligned by time.
    Correlate { input: PathBuf, other: PathBuf },
    /// Forecast the value some days ahead.
    Predict {
        input: PathBuf,
        /// Days past the latest observation.
        #[arg(long)]
        horizon: Option<i64>,
        #[arg(long, value_enum)]
        method: Option<MethodArg>,
        /// Window for the moving-average method.
        #[arg(long, default_value_t = 7)]
        window: usize,
        /// Smoothing factor for the exponential-smoothing method.
        #[arg(long, default_value_t = 0.3)]
        alpha: f64,
    },
    /// Current, longest and past streaks of active days.
    Streaks { input: PathBuf },
    /// Share of recent periods meeting the habit cadence in the input file.
    Completion {
        input: PathBuf,
        #[arg(long, default_value_t = 30)]
        periods: u32,
    },
    /// Per-day intensity grid.
    Heatmap {
        input: PathBuf,
        #[arg(long)]
        months: Option<u32>,
        #[arg(long, value_enum)]
        aggregation: Option<Aggregation>,
    },
    /// This week or month against the previous one.
    Compare {
        input: PathBuf,
        #[arg(long, value_enum, default_value = "week")]
        period: PeriodGranularity,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Linear,
    MovingAverage,
    ExponentialSmoothing,
}

// ==============================================================================
// Input
// ==============================================================================

/// The JSON document a series is read from.
#[derive(Deserialize)]
struct SeriesFile {
    #[serde(default)]
    target: TargetConfig,
    #[serde(default)]
    cadence: HabitCadenceConfig,
    observations: Vec<Observation>,
}

fn load_series(path: &Path) -> Result<(ObservationSeries, HabitCadenceConfig)> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read series file {}", path.display()))?;
    let file: SeriesFile =
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse series file {}", path.display()))?;
    let series = ObservationSeries::new(file.observations, file.target)
        .with_context(|| format!("Invalid series in {}", path.display()))?;
    tracing::debug!(path = %path.display(), observations = series.len(), "Series loaded.");
    Ok((series, file.cadence))
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn run(command: Commands, engine: &AnalyticsEngine, today: NaiveDate) -> Result<()> {
    match command {
        Commands::Report { input, json } => {
            let (series, _) = load_series(&input)?;
            let report = engine.calculate(&series, today)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Trend { input } => {
            let (series, _) = load_series(&input)?;
            match engine.trend(&series) {
                Some(trend) => {
                    let mut table = new_table(vec!["Velocity / day", "Acceleration", "Change", "Change %", "Improving"]);
                    table.add_row(vec![
                        fmt(trend.velocity),
                        fmt(trend.acceleration),
                        fmt(trend.change),
                        fmt(trend.change_percent),
                        trend.is_improving.to_string(),
                    ]);
                    println!("{table}");
                }
                None => println!("Not enough data for a trend: log at least two values."),
            }
        }
        Commands::Progress { input } => {
            let (series, _) = load_series(&input)?;
            match engine.progress(&series)? {
                Some(progress) => {
                    let mut table = new_table(vec!["Progress %", "On track", "At target"]);
                    table.add_row(vec![
                        fmt(progress.percentage),
                        progress.is_on_track.to_string(),
                        progress.is_at_target.to_string(),
                    ]);
                    println!("{table}");
                }
                None => println!("No values logged yet."),
            }
        }
        Commands::Anomalies { input, threshold } => {
            let (series, _) = load_series(&input)?;
            let threshold = threshold.unwrap_or(engine.config().anomaly.threshold);
            let anomalies = engine.anomalies_with_threshold(&series, threshold)?;
            if anomalies.is_empty() {
                println!("No anomalies at {} standard deviations.", threshold);
            } else {
                let mut table = new_table(vec!["Timestamp", "Value", "Std devs", "Severity"]);
                for anomaly in &anomalies {
                    table.add_row(vec![
                        anomaly.observation.timestamp.to_rfc3339(),
                        fmt(anomaly.observation.value),
                        fmt(anomaly.deviation_in_std_devs),
                        format!("{:?}", anomaly.severity),
                    ]);
                }
                println!("{table}");
            }
        }
        Commands::Correlate { input, other } => {
            let (a, _) = load_series(&input)?;
            let (b, _) = load_series(&other)?;
            match engine.correlate(&a, &b) {
                Some(result) => {
                    let mut table = new_table(vec!["Coefficient", "Strength", "Direction", "Pairs"]);
                    table.add_row(vec![
                        fmt(result.coefficient),
                        format!("{:?}", result.strength),
                        format!("{:?}", result.direction),
                        result.sample_size.to_string(),
                    ]);
                    println!("{table}");
                }
                None => println!("Not enough overlapping data: need three values logged within a day of each other."),
            }
        }
        Commands::Predict {
            input,
            horizon,
            method,
            window,
            alpha,
        } => {
            let (series, _) = load_series(&input)?;
            let settings = &engine.config().prediction;
            let method = match method {
                None => settings.method,
                Some(MethodArg::Linear) => PredictionMethod::Linear,
                Some(MethodArg::MovingAverage) => PredictionMethod::MovingAverage { window },
                Some(MethodArg::ExponentialSmoothing) => PredictionMethod::ExponentialSmoothing { alpha },
            };
            let horizon = horizon.unwrap_or(settings.horizon_days);
            match engine.predict_with(&series, horizon, method)? {
                Some(prediction) => print_prediction(&prediction),
                None => println!("Not enough data for a forecast: log at least three values."),
            }
        }
        Commands::Streaks { input } => {
            let (series, _) = load_series(&input)?;
            print_streaks(&engine.streaks(&series, today));
        }
        Commands::Completion { input, periods } => {
            let (series, cadence) = load_series(&input)?;
            let rate = engine.completion_rate(&series, &cadence, today, periods)?;
            let mut table = new_table(vec!["Frequency", "Completed", "Periods", "Rate %"]);
            table.add_row(vec![
                format!("{:?}", rate.frequency),
                rate.completed.to_string(),
                rate.total.to_string(),
                fmt(rate.rate_percent),
            ]);
            println!("{table}");
        }
        Commands::Heatmap {
            input,
            months,
            aggregation,
        } => {
            let (series, _) = load_series(&input)?;
            let heatmap = engine.heatmap_with(&series, today, months, aggregation)?;
            let mut table = new_table(vec!["Date", "Value", "Logs", "Intensity"]);
            for cell in heatmap.cells.iter().filter(|c| c.count > 0) {
                table.add_row(vec![
                    cell.date.to_string(),
                    cell.value.map(fmt).unwrap_or_default(),
                    cell.count.to_string(),
                    "#".repeat(cell.intensity as usize),
                ]);
            }
            println!("{} to {}: {} active days", heatmap.start, heatmap.end, heatmap.active_days());
            println!("{table}");
        }
        Commands::Compare { input, period } => {
            let (series, _) = load_series(&input)?;
            let comparison = engine.compare_periods(&series, today, period)?;
            let mut table = new_table(vec!["Period", "From", "To", "Average", "Total", "Count"]);
            for (label, stats) in [("current", &comparison.current), ("previous", &comparison.previous)] {
                table.add_row(vec![
                    label.to_string(),
                    stats.start.to_string(),
                    stats.end.to_string(),
                    fmt(stats.average),
                    fmt(stats.total),
                    stats.count.to_string(),
                ]);
            }
            println!("{table}");
            println!(
                "Change: {}% ({})",
                fmt(comparison.change_percent),
                if comparison.is_improving { "improving" } else { "declining" }
            );
        }
    }

    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn fmt(value: f64) -> String {
    format!("{:.2}", value)
}

fn print_prediction(prediction: &analytics::PredictionResult) {
    let mut table = new_table(vec!["Method", "Horizon (days)", "Forecast", "Confidence", "95% interval"]);
    table.add_row(vec![
        prediction.method.name().to_string(),
        prediction.horizon_days.to_string(),
        fmt(prediction.forecast_value),
        fmt(prediction.confidence),
        format!(
            "{} .. {}",
            fmt(prediction.confidence_interval.lower),
            fmt(prediction.confidence_interval.upper)
        ),
    ]);
    println!("{table}");
}

fn print_streaks(streaks: &analytics::StreakSet) {
    println!("Current streak: {} days, longest: {} days", streaks.current, streaks.longest);
    if streaks.all_streaks.is_empty() {
        return;
    }
    let mut table = new_table(vec!["Start", "End", "Length", "Active"]);
    for streak in &streaks.all_streaks {
        table.add_row(vec![
            streak.start.to_string(),
            streak.end.map(|d| d.to_string()).unwrap_or_else(|| "ongoing".to_string()),
            streak.length.to_string(),
            streak.is_active.to_string(),
        ]);
    }
    println!("{table}");
}

fn print_report(report: &SeriesReport) {
    let Some(summary) = report.summary else {
        println!("No values logged yet.");
        return;
    };

    let mut table = new_table(vec!["Count", "First", "Latest", "Min", "Max", "Mean"]);
    table.add_row(vec![
        summary.count.to_string(),
        fmt(summary.first),
        fmt(summary.latest),
        fmt(summary.min),
        fmt(summary.max),
        fmt(summary.mean),
    ]);
    println!("{table}");

    if let Some(trend) = report.trend {
        println!(
            "Trend: {} per day ({})",
            fmt(trend.velocity),
            if trend.is_improving { "improving" } else { "declining" }
        );
    }
    if let Some(progress) = report.progress {
        println!(
            "Progress: {}% ({})",
            fmt(progress.percentage),
            if progress.is_on_track { "on track" } else { "off track" }
        );
    }
    println!("Anomalies: {}", report.anomalies.len());
    if let Some(prediction) = &report.prediction {
        print_prediction(prediction);
    }
    print_streaks(&report.streaks);
}
