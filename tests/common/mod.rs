#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use climalag::StudyConfig;
use std::path::{Path, PathBuf};

pub const PREAMBLE: [&str; 11] = [
    "Nome: TESTE",
    "Codigo Estacao: A000",
    "Latitude: -23.50",
    "Longitude: -46.60",
    "Altitude: 792.06",
    "Situação: Operante",
    "Data Inicial: 2023-01-01",
    "Data Final: 2023-12-31",
    "Periodicidade da Medicao: Diaria",
    "Unidade: padrao",
    "Data Medicao,PRECIPITACAO TOTAL,PRESSAO MEDIA,TEMP ORVALHO,TEMP MAXIMA,TEMP MEDIA,TEMP MINIMA,UMIDADE MEDIA,UMIDADE MINIMA,UMIDADE MAXIMA,VENTO MEDIO,",
];

/// One synthetic day: a linear warming trend with small deterministic wiggles.
pub fn day_values(i: usize) -> [f64; 10] {
    let t = i as f64;
    let temp_max = 28.0 + 0.1 * t + ((i * 37) % 11) as f64 / 10.0;
    let temp_min = 18.0 + 0.05 * t + ((i * 13) % 7) as f64 / 10.0;
    let temp_mean = (temp_max + temp_min) / 2.0 + ((i * 17) % 5) as f64 / 20.0;
    let humidity = 70.0 + ((i * 19) % 13) as f64;
    [
        ((i * 29) % 10) as f64,
        1010.0 + ((i * 7) % 9) as f64 * 0.3,
        15.0 + ((i * 11) % 6) as f64 * 0.2,
        temp_max,
        temp_mean,
        temp_min,
        humidity,
        humidity - 10.0,
        humidity + 10.0,
        2.0 + ((i * 23) % 7) as f64 * 0.1,
    ]
}

/// Writes an INMET-style daily export of `days` rows starting 2023-01-01.
/// `blank` lists `(row, field)` cells to leave empty; field 0 is the first
/// numeric column.
pub fn write_station_file(dir: &Path, days: usize, blank: &[(usize, usize)]) -> PathBuf {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut text = String::new();
    for line in PREAMBLE {
        text.push_str(line);
        text.push('\n');
    }
    for i in 0..days {
        let date = start + Duration::days(i as i64);
        text.push_str(&date.format("%Y-%m-%d").to_string());
        for (field, value) in day_values(i).iter().enumerate() {
            text.push(',');
            if !blank.contains(&(i, field)) {
                text.push_str(&format!("{:.2}", value));
            }
        }
        text.push_str(",\n");
    }
    // INMET exports are Latin-1.
    let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
    let path = dir.join("dados_A000_D_2023-01-01_2023-12-31.csv");
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Defaults with two lagged signals at offsets {1, 3, 7}.
pub fn small_config() -> StudyConfig {
    StudyConfig {
        lag_signals: vec!["temp_maxima".to_string(), "pressao_atm_media".to_string()],
        lags: vec![1, 3, 7],
        ..StudyConfig::default()
    }
}
