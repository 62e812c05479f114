mod common;

use climalag::{
    ArtifactSet, ClimaLagError, DatasetError, LagStudy, ModelKind, SeriesError, StationLoader,
    StudyConfig, Variant, COMPARISON_FILE, DERIVED_DATASET_FILE, FAILURES_FILE,
};
use common::{small_config, write_station_file};
use tempfile::tempdir;

#[test]
fn thirty_day_series_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = write_station_file(dir.path(), 30, &[]);
    let study = LagStudy::new(small_config())?;
    let report = study.run().path(&path).call()?;

    assert!(report.series().report().is_complete());
    assert_eq!(report.series().height(), 30);

    // 30 rows minus the 7 without full history; 3 offsets for each of 2 signals.
    let lag_frame = report.lag_frame();
    assert_eq!(lag_frame.height(), 23);
    assert_eq!(lag_frame.dropped_rows(), 7);
    assert_eq!(lag_frame.lag_columns().len(), 6);
    assert_eq!(lag_frame.frame.width(), 11 + 6);

    let baseline = report.variant(Variant::Baseline).as_ref().map_err(|e| e.to_string())?;
    assert_eq!((baseline.n_train, baseline.n_test), (24, 6));
    let lagged = report.variant(Variant::LagAugmented).as_ref().map_err(|e| e.to_string())?;
    assert_eq!((lagged.n_train, lagged.n_test), (18, 5));
    assert_eq!(lagged.features.len(), 4 + 6);

    assert_eq!(report.comparison().len(), 8);
    assert_eq!(report.comparison().scored().count(), 8);
    assert_eq!(report.improvements().len(), 4);
    assert!(report.failures().is_empty());

    // Ranked by descending R2.
    let r2: Vec<f64> = report
        .comparison()
        .scored()
        .filter_map(|r| r.metrics().map(|m| m.r2))
        .collect();
    assert!(r2.windows(2).all(|w| w[0] >= w[1]));
    Ok(())
}

#[test]
fn interior_gaps_are_filled_and_boundary_gaps_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    // Field 3 is temp_maxima; field 1 is pressao_atm_media.
    let path = write_station_file(dir.path(), 40, &[(0, 3), (10, 3), (11, 3), (20, 1)]);
    let series = StationLoader::new(StudyConfig::default().layout()).load_path(&path)?;

    let report = series.report();
    let temp_max = report.get("temp_maxima").unwrap();
    assert_eq!(temp_max.filled, 2);
    assert_eq!(temp_max.leading_unresolved, 1);
    assert_eq!(report.get("pressao_atm_media").unwrap().filled, 1);
    assert!(!report.is_complete());

    let values = series.values("temp_maxima")?;
    assert_eq!(values[0], None);
    assert!(values[1..].iter().all(Option::is_some));

    // Time-weighted: day 10 sits one third of the way from day 9 to day 12.
    let (before, after) = (values[9].unwrap(), values[12].unwrap());
    let expected = before + (after - before) / 3.0;
    assert!((values[10].unwrap() - expected).abs() < 1e-9);
    Ok(())
}

#[test]
fn short_series_fails_only_the_lagged_variant() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = write_station_file(dir.path(), 8, &[]);
    let out = dir.path().join("resultados");
    let study = LagStudy::new(small_config())?;
    let report = study.run().path(&path).output_dir(&out).call()?;

    assert_eq!(report.lag_frame().height(), 1);
    assert!(report.variant(Variant::Baseline).is_ok());
    assert!(matches!(
        report.variant(Variant::LagAugmented),
        Err(DatasetError::InsufficientData {
            rows: 1,
            train: 0,
            test: 1
        })
    ));
    // Every (model, variant) pair keeps a row; the unsplittable variant's rows trail.
    let comparison = report.comparison();
    assert_eq!(comparison.len(), 2 * ModelKind::ALL.len());
    assert_eq!(comparison.scored().count(), ModelKind::ALL.len());
    assert!(comparison
        .failed()
        .all(|r| r.variant == Variant::LagAugmented && r.metrics().is_none()));
    assert!(report.improvements().is_empty());

    let failures = report.failures();
    assert_eq!(failures.len(), ModelKind::ALL.len());
    assert!(failures.iter().all(|f| f.variant == Variant::LagAugmented));
    assert!(failures
        .iter()
        .all(|f| f.reason.starts_with("Insufficient data: 1 usable rows")));

    let written = std::fs::read_to_string(out.join(FAILURES_FILE))?;
    assert_eq!(written.lines().count(), 1 + ModelKind::ALL.len());
    assert!(written.contains("Com Lag Features"));

    let compared = std::fs::read_to_string(out.join(COMPARISON_FILE))?;
    assert_eq!(compared.lines().count(), 1 + 2 * ModelKind::ALL.len());

    // A one-row lag table is written in full.
    let derived = std::fs::read_to_string(out.join(DERIVED_DATASET_FILE))?;
    assert_eq!(derived.lines().count(), 2);
    assert!(derived.lines().nth(1).unwrap_or_default().starts_with("2023-01-08,"));
    assert!(ArtifactSet::load(&out).is_complete());
    Ok(())
}

#[test]
fn artifacts_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = write_station_file(dir.path(), 45, &[(5, 4)]);
    let out = dir.path().join("out");
    let report = LagStudy::new(small_config())?
        .run()
        .path(&path)
        .output_dir(&out)
        .call()?;

    let artifacts = ArtifactSet::load(&out);
    assert!(artifacts.is_complete());

    let comparison = artifacts.comparison.as_ref().map_err(|e| e.to_string())?;
    let comparison = comparison.as_ref().ok_or("comparison missing")?;
    assert_eq!(
        comparison.get_column_names_str(),
        vec!["Modelo", "RMSE", "R2", "Tipo"]
    );
    assert_eq!(comparison.height(), report.comparison().len());
    let best = report.comparison().best().ok_or("no scored model")?;
    assert_eq!(
        comparison.column("Modelo")?.str()?.get(0),
        Some(best.model_name().as_str())
    );

    let model_results = artifacts.model_results.as_ref().map_err(|e| e.to_string())?;
    let model_results = model_results.as_ref().ok_or("model results missing")?;
    assert_eq!(
        model_results.get_column_names_str(),
        vec!["Modelo", "RMSE", "MAE", "R2", "Tipo"]
    );
    assert_eq!(model_results.height(), report.comparison().len());
    let best_mae = best.metrics().map(|m| m.mae).ok_or("best model has no metrics")?;
    let read_mae = model_results.column("MAE")?.f64()?.get(0).ok_or("empty MAE")?;
    assert!((read_mae - best_mae).abs() < 1e-9 * best_mae.abs().max(1.0));

    let improvements = artifacts.improvements.as_ref().map_err(|e| e.to_string())?;
    let improvements = improvements.as_ref().ok_or("improvements missing")?;
    assert_eq!(
        improvements.get_column_names_str(),
        vec!["Modelo", "Melhoria_RMSE_%", "Melhoria_R2_%"]
    );
    assert_eq!(improvements.height(), 4);

    let derived = artifacts.derived_dataset.as_ref().map_err(|e| e.to_string())?;
    let derived = derived.as_ref().ok_or("derived dataset missing")?;
    assert_eq!(derived.height(), 45 - 7);
    assert!(derived.column("temp_maxima_lag_7").is_ok());
    let text = std::fs::read_to_string(out.join("dados_climaticos_com_lags.csv"))?;
    assert!(text.lines().nth(1).unwrap_or_default().starts_with("2023-01-08,"));

    let importances = artifacts.importances.as_ref().map_err(|e| e.to_string())?;
    assert_eq!(importances.as_ref().map(|f| f.height()), Some(4 + 10));

    // Removing one artifact degrades only that section.
    std::fs::remove_file(out.join(COMPARISON_FILE))?;
    let partial = ArtifactSet::load(&out);
    assert!(matches!(partial.comparison, Ok(None)));
    assert_eq!(partial.available(), 5);
    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = write_station_file(dir.path(), 60, &[]);
    let study = LagStudy::new(small_config())?;
    let first = study.run().path(&path).call()?;
    let second = study.run().path(&path).call()?;
    assert_eq!(first.comparison(), second.comparison());
    assert_eq!(first.improvements(), second.improvements());

    let serial = LagStudy::new(StudyConfig {
        parallel: false,
        ..small_config()
    })?
    .run()
    .path(&path)
    .call()?;
    assert_eq!(first.comparison(), serial.comparison());
    Ok(())
}

#[test]
fn input_format_errors_abort_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let study = LagStudy::new(small_config())?;

    let missing = study.run().path(&dir.path().join("nope.csv")).call();
    assert!(matches!(
        missing,
        Err(ClimaLagError::Series(SeriesError::SourceRead(..)))
    ));

    let path = write_station_file(dir.path(), 10, &[]);
    let text = std::fs::read(&path)?;
    let mut corrupted = text.clone();
    let needle = b"2023-01-05";
    let at = text
        .windows(needle.len())
        .position(|w| w == needle)
        .ok_or("date not found")?;
    corrupted[at..at + needle.len()].copy_from_slice(b"2023-13-05");
    std::fs::write(&path, corrupted)?;

    let result = study.run().path(&path).call();
    assert!(matches!(
        result,
        Err(ClimaLagError::Series(SeriesError::UnparseableTimestamp { line: 16, .. }))
    ));
    Ok(())
}
