//! demos/run_study.rs
//!
//! Runs the full lag-feature study on an INMET daily export and writes every
//! artifact next to it.
//!
//! To run this example:
//! cargo run --example run_study -- dados_A771_D_2020-01-01_2024-12-31.csv [config.json]

use climalag::{LagStudy, StudyConfig, Variant};
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    configure_polars_display();

    let mut args = env::args().skip(1);
    let input = PathBuf::from(args.next().ok_or("usage: run_study <station.csv> [config.json]")?);
    let config = match args.next() {
        Some(path) => StudyConfig::from_json_file(&PathBuf::from(path))?,
        None => StudyConfig::default(),
    };
    let output_dir = input
        .parent()
        .map(|p| p.join("resultados"))
        .unwrap_or_else(|| PathBuf::from("resultados"));

    let study = LagStudy::new(config)?;
    let report = study.run().path(&input).output_dir(&output_dir).call()?;

    println!("{:?}", report.series().report());
    println!("{}", report.lag_frame().frame.head(Some(5)));

    for variant in Variant::BOTH {
        match report.variant(variant) {
            Ok(run) => println!(
                "{}: {} rows ({} train / {} test), {} features",
                variant.label(),
                run.n_rows,
                run.n_train,
                run.n_test,
                run.features.len()
            ),
            Err(err) => println!("{}: skipped ({})", variant.label(), err),
        }
    }

    println!("\nRanking:");
    for (rank, result) in report.comparison().rows().iter().enumerate() {
        match result.metrics() {
            Some(m) => println!(
                "{:>2}. {:<40} RMSE {:.4}  R2 {:.4}  MAE {:.4}",
                rank + 1,
                result.model_name(),
                m.rmse,
                m.r2,
                m.mae
            ),
            None => println!(
                "{:>2}. {:<40} failed: {}",
                rank + 1,
                result.model_name(),
                result.failure().unwrap_or_default()
            ),
        }
    }

    println!("\nImprovement from lag features:");
    for record in report.improvements() {
        println!(
            "{:<28} RMSE {:>9}  R2 {:>9}",
            record.model_name(),
            record.rmse.to_string(),
            record.r2.to_string()
        );
    }

    println!("\nArtifacts written to {}", output_dir.display());
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
