//! demos/synthetic_study.rs
//!
//! Builds a two-year synthetic daily series in memory, with a temperature that
//! follows yesterday's, and shows how much the lag columns help each model.
//!
//! To run this example:
//! cargo run --example synthetic_study

use chrono::{Duration, NaiveDate, NaiveDateTime};
use climalag::{LagStudy, RawSeries, StudyConfig, TIMESTAMP_COLUMN};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let days = 730;
    let start = NaiveDate::from_ymd_opt(2022, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or("invalid start date")?;
    let timestamps: Vec<NaiveDateTime> = (0..days)
        .map(|i| start + Duration::days(i as i64))
        .collect();

    // AR(1)-like mean temperature around a seasonal cycle.
    let mut mean = Vec::with_capacity(days);
    let mut prev = 24.0;
    for i in 0..days {
        let seasonal = 24.0 + 4.0 * (i as f64 * std::f64::consts::TAU / 365.0).cos();
        let shock = ((i * 7919) % 23) as f64 / 23.0 - 0.5;
        prev = seasonal + 0.8 * (prev - seasonal) + shock;
        mean.push(prev);
    }
    let column = |offset: f64, skip: usize| -> Vec<Option<f64>> {
        mean.iter()
            .enumerate()
            .map(|(i, v)| (i % 31 != skip).then_some(v + offset))
            .collect()
    };

    let series = RawSeries::new(TIMESTAMP_COLUMN, timestamps)
        .with_column("temp_media", column(0.0, 40))
        .and_then(|s| s.with_column("temp_maxima", column(5.0, 3)))
        .and_then(|s| s.with_column("temp_minima", column(-5.0, 9)))
        .and_then(|s| {
            s.with_column(
                "umidade_media",
                (0..days).map(|i| Some(70.0 + ((i * 13) % 17) as f64)).collect(),
            )
        })?
        .clean()?;

    let config = StudyConfig {
        lag_signals: vec!["temp_media".into(), "temp_maxima".into(), "temp_minima".into()],
        lags: vec![1, 2, 3, 7],
        baseline_features: vec!["temp_maxima".into(), "temp_minima".into(), "umidade_media".into()],
        target: "temp_media".into(),
        columns: vec![
            TIMESTAMP_COLUMN.into(),
            "temp_media".into(),
            "temp_maxima".into(),
            "temp_minima".into(),
            "umidade_media".into(),
        ],
        ..StudyConfig::default()
    };
    let report = LagStudy::new(config)?.run_series(series)?;

    for record in report.improvements() {
        println!(
            "{:<28} RMSE {:>9}  R2 {:>9}",
            record.model_name(),
            record.rmse.to_string(),
            record.r2.to_string()
        );
    }
    if let Some(best) = report.comparison().best() {
        println!("Best: {}", best.model_name());
    }
    Ok(())
}
