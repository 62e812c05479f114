//! demos/seasons.rs
//!
//! Loads an INMET daily export and prints its seasonal breakdown together with
//! the annotated frame.
//!
//! To run this example:
//! cargo run --example seasons -- dados_A771_D_2020-01-01_2024-12-31.csv

use climalag::{
    annotate, season_distribution, AnnotationColumns, StationLoader, StudyConfig,
    PRECIPITATION_CATEGORY_COLUMN,
};
use polars::prelude::*;
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    configure_polars_display();

    let input = PathBuf::from(
        env::args()
            .nth(1)
            .ok_or("usage: seasons <station.csv>")?,
    );
    let series = StationLoader::new(StudyConfig::default().layout()).load_path(&input)?;

    for (season, count) in season_distribution(&series)? {
        println!("{:<10} {}", season, count);
    }

    let annotated = annotate(&series, &AnnotationColumns::default())?;
    let categories = annotated
        .lazy()
        .group_by([col(PRECIPITATION_CATEGORY_COLUMN)])
        .agg([len().alias("dias")])
        .sort([PRECIPITATION_CATEGORY_COLUMN], Default::default())
        .collect()?;
    println!("{}", categories);
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
