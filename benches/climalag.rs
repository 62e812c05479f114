use chrono::{Duration, NaiveDate, NaiveDateTime};
use climalag::{
    interpolate_time, CleanSeries, Dataset, EvaluationHarness, LagSpec, ModelKind, RawSeries,
    Variant, TIMESTAMP_COLUMN,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SIGNALS: [&str; 3] = ["temp_maxima", "temp_minima", "temp_media"];

fn synthetic_series(days: usize) -> CleanSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN);
    let timestamps: Vec<NaiveDateTime> = (0..days)
        .map(|i| start + Duration::days(i as i64))
        .collect();
    let wave = |offset: f64, amplitude: f64| -> Vec<Option<f64>> {
        (0..days)
            .map(|i| {
                let t = i as f64;
                // every 13th day missing
                (i % 13 != 5).then(|| offset + amplitude * (t / 58.0).sin() + (t % 7.0) * 0.1)
            })
            .collect()
    };
    RawSeries::new(TIMESTAMP_COLUMN, timestamps)
        .with_column("temp_maxima", wave(29.0, 4.0))
        .and_then(|s| s.with_column("temp_minima", wave(18.0, 3.0)))
        .and_then(|s| s.with_column("temp_media", wave(23.5, 3.5)))
        .and_then(|s| s.clean())
        .expect("synthetic series is well formed")
}

fn bench_interpolation(c: &mut Criterion) {
    let times: Vec<i64> = (0..10_000).map(|i| i * 86_400).collect();
    let values: Vec<Option<f64>> = (0..10_000)
        .map(|i| (i % 4 != 0).then_some(i as f64 * 0.5))
        .collect();
    c.bench_function("interpolate_time", |b| {
        b.iter(|| interpolate_time(black_box(&times), black_box(&values)))
    });
}

fn bench_lag_frame(c: &mut Criterion) {
    let series = synthetic_series(1_826);
    let spec = LagSpec::new(SIGNALS, [1, 2, 3, 7]);
    c.bench_function("lag_frame_build", |b| b.iter(|| spec.build(black_box(&series))));
}

fn bench_harness(c: &mut Criterion) {
    let series = synthetic_series(730);
    let spec = LagSpec::new(SIGNALS, [1, 2, 3, 7]);
    let lag_frame = spec.build(&series).expect("lag frame");
    let mut features = vec!["temp_maxima".to_string(), "temp_minima".to_string()];
    features.extend(lag_frame.lag_columns().iter().cloned());
    let split = Dataset::from_frame(&lag_frame.frame, &features, "temp_media")
        .and_then(|d| d.split(0.2, 42))
        .expect("split");

    let mut group = c.benchmark_group("harness");
    group.sample_size(10);
    for kind in ModelKind::ALL {
        let harness = EvaluationHarness::new(vec![kind], 42);
        group.bench_function(kind.display_name(), |b| {
            b.iter(|| harness.evaluate(Variant::LagAugmented, black_box(&split)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_interpolation, bench_lag_frame, bench_harness);
criterion_main!(benches);
