//! End-to-end pipeline: CSV → prepare → stationarity → decomposition → search.

use std::io::Write;

use usercast::core::Frequency;
use usercast::io::{load_csv, LoadOptions};
use usercast::models::Forecaster;
use usercast::preprocess::{prepare, FillMethod};
use usercast::seasonality::{decompose, DecomposeConfig};
use usercast::selection::{ModelSearch, SearchConfig, SearchSpace, SeasonalSpace, SelectionMetric};
use usercast::transform::{difference, seasonal_difference};
use usercast::validation::{suggest_differencing, test_stationarity, StationarityTest};
use usercast::ForecastError;

/// Deterministic pseudo-random noise in [-0.5, 0.5).
fn noise(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect()
}

/// Monthly active users: trend, yearly seasonality and noise.
fn active_users(n: usize) -> Vec<f64> {
    let pattern = [
        -30.0, -25.0, -5.0, 10.0, 20.0, 35.0, 45.0, 30.0, 5.0, -15.0, -30.0, -40.0,
    ];
    noise(n, 11)
        .iter()
        .enumerate()
        .map(|(i, e)| 1000.0 + 4.0 * i as f64 + pattern[i % 12] + 10.0 * e)
        .collect()
}

fn month(i: usize) -> String {
    format!("{}-{:02}-01", 2015 + i / 12, i % 12 + 1)
}

/// CSV with two absent months and one blank value.
fn write_fixture(values: &[f64]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "month,active_users").unwrap();
    for (i, v) in values.iter().enumerate() {
        match i {
            17 | 40 => continue,
            55 => writeln!(file, "{},", month(i)).unwrap(),
            _ => writeln!(file, "{},{:.3}", month(i), v).unwrap(),
        }
    }
    file.flush().unwrap();
    file
}

fn options() -> LoadOptions {
    LoadOptions::default()
        .with_columns("month", "active_users")
        .with_frequency(Frequency::Monthly)
}

#[test]
fn full_pipeline_on_monthly_users() {
    let values = active_users(96);
    let file = write_fixture(&values);

    let series = prepare(file.path(), &options(), FillMethod::Linear).unwrap();
    assert_eq!(series.len(), 96);
    assert!(!series.has_missing_values());
    assert_eq!(series.frequency(), Some(Frequency::Monthly));
    assert!(series.timestamps().windows(2).all(|w| w[0] < w[1]));
    assert!((series.values()[17] - values[17]).abs() < 20.0);

    let assessment = test_stationarity(series.values(), 0.05).unwrap();
    assert_eq!(assessment.adf.test(), StationarityTest::Adf);
    assert_eq!(assessment.kpss.test(), StationarityTest::Kpss);
    assert!(assessment.to_string().contains("Overall verdict"));
    // the trend keeps KPSS from accepting level stationarity
    assert!(!assessment.kpss.is_stationary());

    let d = suggest_differencing(series.values(), 2, 0.05).unwrap();
    assert!(d <= 2);
    let diffed = difference(&series, 1).unwrap();
    assert_eq!(diffed.len(), 95);
    let seasonal = seasonal_difference(&diffed, 12, 1).unwrap();
    assert_eq!(seasonal.len(), 83);

    let parts = decompose(&series, &DecomposeConfig::default()).unwrap();
    assert_eq!(parts.period(), 12);
    assert!(parts.seasonal_strength() > 0.5);
    for (got, want) in parts.recombine().iter().zip(series.values()) {
        assert!((got - want).abs() < 1e-8);
    }

    let space = SearchSpace::default()
        .with_orders(0..=1, 1..=1, 0..=1)
        .with_seasonal(SeasonalSpace::new(12));
    let config = SearchConfig::default().with_test_size(12);
    let comparison = ModelSearch::run(&series, &space, &config).unwrap();

    assert_eq!(
        comparison.len() + comparison.skipped().len(),
        space.candidates().len()
    );
    let best = comparison.best();
    assert!(comparison.rows().iter().all(|r| best.aic() <= r.aic()));
    assert!(best.rmse().is_finite());

    let model = comparison.refit_best(&series).unwrap();
    let forecast = model.predict_with_intervals(12, 0.95).unwrap();
    assert_eq!(forecast.horizon(), 12);
    assert!(forecast.is_finite());
}

#[test]
fn seasonal_models_beat_plain_arima_on_hold_out() {
    let series = prepare(
        write_fixture(&active_users(96)).path(),
        &options(),
        FillMethod::Linear,
    )
    .unwrap();
    let space = SearchSpace::default()
        .with_orders(0..=1, 1..=1, 0..=1)
        .with_seasonal(SeasonalSpace::new(12).with_orders(0..=1, 1..=1, 0..=1))
        .with_holt_winters(false);
    let config = SearchConfig::default()
        .with_test_size(12)
        .with_selection(SelectionMetric::Rmse);

    let comparison = ModelSearch::run(&series, &space, &config).unwrap();
    assert!(comparison.best().name().starts_with("SARIMA"));
}

#[test]
fn comparison_exports_csv_file() {
    let series = prepare(
        write_fixture(&active_users(72)).path(),
        &options(),
        FillMethod::ForwardFill,
    )
    .unwrap();
    let space = SearchSpace::default().with_orders(0..=1, 1..=1, 0..=1);
    let comparison = ModelSearch::run(&series, &space, &SearchConfig::default()).unwrap();

    let out = tempfile::NamedTempFile::new().unwrap();
    comparison.to_csv(out.reopen().unwrap()).unwrap();
    let text = std::fs::read_to_string(out.path()).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("model,aic,mae,rmse"));
    let first = lines.next().unwrap();
    assert!(first.contains(comparison.best().name()));
    assert_eq!(text.lines().count(), comparison.len() + 1);
}

#[test]
fn malformed_dates_fail_at_load_time() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "month,active_users").unwrap();
    writeln!(file, "2020-01-01,10").unwrap();
    writeln!(file, "first of feb,12").unwrap();
    file.flush().unwrap();

    let err = load_csv(file.path(), &options()).unwrap_err();
    assert_eq!(
        err,
        ForecastError::DateParse {
            row: 1,
            value: "first of feb".to_string()
        }
    );
}

#[test]
fn missing_source_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    assert!(matches!(
        prepare(&path, &options(), FillMethod::Linear),
        Err(ForecastError::FileNotFound(p)) if p == path
    ));
}

#[test]
fn leading_gap_cannot_be_forward_filled() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "month,active_users").unwrap();
    writeln!(file, "2020-01-01,").unwrap();
    writeln!(file, "2020-02-01,11").unwrap();
    writeln!(file, "2020-03-01,12").unwrap();
    file.flush().unwrap();

    let options = options().keep_missing();
    assert!(matches!(
        prepare(file.path(), &options, FillMethod::ForwardFill),
        Err(ForecastError::UnresolvedGap { position: 0, .. })
    ));
}
