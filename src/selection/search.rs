//! Hold-out model search.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::selection::comparison::{CandidateModel, ModelComparison, SkippedCandidate};
use crate::selection::space::{ModelFamily, SearchSpace};
use crate::utils::calculate_metrics;

/// Criterion used to rank candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMetric {
    /// Akaike information criterion on the training split.
    #[default]
    Aic,
    /// Mean absolute error on the hold-out.
    Mae,
    /// Root mean squared error on the hold-out.
    Rmse,
}

impl fmt::Display for SelectionMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectionMetric::Aic => "AIC",
            SelectionMetric::Mae => "MAE",
            SelectionMetric::Rmse => "RMSE",
        })
    }
}

/// Configuration for [`ModelSearch::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of trailing observations held out for scoring.
    pub test_size: usize,
    pub selection: SelectionMetric,
    /// Only the first `n` candidates of the grid are fitted.
    pub max_candidates: Option<usize>,
    /// Level of the hold-out prediction intervals.
    pub level: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            test_size: 12,
            selection: SelectionMetric::Aic,
            max_candidates: None,
            level: 0.95,
        }
    }
}

impl SearchConfig {
    pub fn with_test_size(mut self, test_size: usize) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_selection(mut self, selection: SelectionMetric) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = Some(max_candidates);
        self
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }
}

/// Fits every candidate of a [`SearchSpace`] and ranks them.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use usercast::core::TimeSeries;
/// use usercast::selection::{ModelSearch, SearchConfig, SearchSpace};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let timestamps = (0..60).map(|i| start + Duration::days(i)).collect();
/// let values = (0..60)
///     .map(|i| 100.0 + 2.0 * i as f64 + ((i * 7) % 5) as f64)
///     .collect();
/// let series = TimeSeries::univariate(timestamps, values).unwrap();
///
/// let space = SearchSpace::default().with_orders(0..=1, 1..=1, 0..=1);
/// let comparison = ModelSearch::run(&series, &space, &SearchConfig::default()).unwrap();
///
/// println!("{comparison}");
/// assert!(comparison.best().aic().is_finite());
/// ```
pub struct ModelSearch;

impl ModelSearch {
    /// Split off the last `test_size` points, fit each candidate on the rest
    /// and score its hold-out forecast.
    ///
    /// Candidates that fail to fit, or produce a non-finite AIC or forecast,
    /// are skipped. Fails only when none survives.
    pub fn run(
        series: &TimeSeries,
        space: &SearchSpace,
        config: &SearchConfig,
    ) -> Result<ModelComparison> {
        if config.test_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "test_size must be positive".to_string(),
            ));
        }
        if !(config.level > 0.0 && config.level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {}",
                config.level
            )));
        }
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }
        let needed = config.test_size + 2;
        if series.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: series.len(),
            });
        }

        let mut candidates = space.candidates();
        if candidates.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "search space yields no candidates".to_string(),
            ));
        }
        if let Some(max) = config.max_candidates {
            if candidates.len() > max {
                warn!(
                    total = candidates.len(),
                    max, "truncating candidate grid"
                );
                candidates.truncate(max);
            }
        }

        let (train, test) = series.split_at(series.len() - config.test_size)?;
        let mut rows = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        for family in candidates {
            match evaluate(family, &train, &test, config.level) {
                Ok(candidate) => {
                    debug!(
                        model = candidate.name(),
                        aic = candidate.aic,
                        mae = candidate.mae,
                        rmse = candidate.rmse,
                        "candidate scored"
                    );
                    rows.push(candidate);
                }
                Err(err) => {
                    warn!(model = %family, error = %err, "skipping candidate");
                    skipped.push(SkippedCandidate {
                        model: family.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if rows.is_empty() {
            return Err(ForecastError::ComputationError(format!(
                "all {} candidate models failed",
                skipped.len()
            )));
        }

        let metric = config.selection;
        rows.sort_by(|a, b| rank(a, b, metric));

        let best = &rows[0];
        info!(
            best = best.name(),
            metric = %metric,
            score = best.score(metric),
            fitted = rows.len(),
            skipped = skipped.len(),
            "model search finished"
        );

        Ok(ModelComparison {
            rows,
            skipped,
            metric,
            test_size: config.test_size,
        })
    }
}

fn rank(a: &CandidateModel, b: &CandidateModel, metric: SelectionMetric) -> Ordering {
    a.score(metric)
        .total_cmp(&b.score(metric))
        .then_with(|| a.aic.total_cmp(&b.aic))
        .then_with(|| a.rmse.total_cmp(&b.rmse))
}

fn evaluate(
    family: ModelFamily,
    train: &TimeSeries,
    test: &TimeSeries,
    level: f64,
) -> Result<CandidateModel> {
    let mut model = family.build();
    model.fit(train)?;

    let aic = model
        .aic()
        .filter(|aic| aic.is_finite())
        .ok_or_else(|| ForecastError::ComputationError("non-finite AIC".to_string()))?;

    let forecast = model.predict_with_intervals(test.len(), level)?;
    if !forecast.point().iter().all(|v| v.is_finite()) {
        return Err(ForecastError::ComputationError(
            "non-finite forecast".to_string(),
        ));
    }

    let metrics = calculate_metrics(test.values(), forecast.point())?;
    Ok(CandidateModel {
        family,
        model,
        aic,
        mae: metrics.mae,
        rmse: metrics.rmse,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Forecast;
    use crate::models::ARIMASpec;
    use crate::selection::SeasonalSpace;
    use chrono::{Duration, TimeZone, Utc};

    fn monthly_like(n: usize) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..n).map(|i| base + Duration::days(i as i64)).collect();
        let pattern = [3.0, 5.0, 1.0, -2.0, -4.0, -3.0];
        let values = (0..n)
            .map(|i| 200.0 + 1.5 * i as f64 + pattern[i % 6] + ((i * 11) % 7) as f64 * 0.4)
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    fn small_space() -> SearchSpace {
        SearchSpace::default().with_orders(0..=1, 0..=1, 0..=1)
    }

    #[test]
    fn rows_sorted_by_metric() {
        let series = monthly_like(72);
        for metric in [SelectionMetric::Aic, SelectionMetric::Mae, SelectionMetric::Rmse] {
            let config = SearchConfig::default().with_selection(metric);
            let comparison = ModelSearch::run(&series, &small_space(), &config).unwrap();

            let scores: Vec<f64> = comparison.rows().iter().map(|r| r.score(metric)).collect();
            assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{metric}: {scores:?}");
            assert_eq!(comparison.metric(), metric);
        }
    }

    #[test]
    fn every_candidate_accounted_for() {
        let series = monthly_like(72);
        let space = small_space();
        let comparison = ModelSearch::run(&series, &space, &SearchConfig::default()).unwrap();
        assert_eq!(
            comparison.len() + comparison.skipped().len(),
            space.candidates().len()
        );
        for row in comparison.rows() {
            assert_eq!(row.holdout_forecast().horizon(), 12);
            assert!(row.mae() <= row.rmse() + 1e-12);
        }
    }

    #[test]
    fn failing_candidates_are_skipped() {
        let series = monthly_like(40);
        // A seasonal AR term at period 20 needs more history than 30 points
        let space = SearchSpace::default()
            .with_orders(0..=0, 1..=1, 0..=0)
            .with_seasonal(SeasonalSpace::new(20).with_orders(1..=1, 1..=1, 0..=0))
            .with_holt_winters(false);
        let config = SearchConfig::default().with_test_size(10);

        let comparison = ModelSearch::run(&series, &space, &config).unwrap();
        assert_eq!(comparison.len(), 1);
        assert_eq!(comparison.best().name(), "ARIMA(0,1,0)");
        assert_eq!(comparison.skipped().len(), 1);
        assert_eq!(comparison.skipped()[0].model, "SARIMA(0,1,0)(1,1,0)[20]");
    }

    #[test]
    fn all_failing_is_error() {
        let series = monthly_like(30);
        let space = SearchSpace::default()
            .with_orders(0..=0, 0..=0, 0..=0)
            .with_seasonal(SeasonalSpace::new(12))
            .with_holt_winters(false);
        let space = SearchSpace {
            p: 5..=5,
            d: 2..=2,
            q: 5..=5,
            ..space
        };
        let config = SearchConfig::default().with_test_size(20);

        assert!(matches!(
            ModelSearch::run(&series, &space, &config),
            Err(ForecastError::ComputationError(_))
        ));
    }

    #[test]
    fn max_candidates_truncates_grid() {
        let series = monthly_like(60);
        let config = SearchConfig::default().with_max_candidates(3);
        let comparison = ModelSearch::run(&series, &small_space(), &config).unwrap();
        assert_eq!(comparison.len() + comparison.skipped().len(), 3);
    }

    #[test]
    fn invalid_configuration_rejected() {
        let series = monthly_like(30);
        let space = small_space();

        let zero = SearchConfig::default().with_test_size(0);
        assert!(matches!(
            ModelSearch::run(&series, &space, &zero),
            Err(ForecastError::InvalidParameter(_))
        ));

        let level = SearchConfig::default().with_level(1.5);
        assert!(matches!(
            ModelSearch::run(&series, &space, &level),
            Err(ForecastError::InvalidParameter(_))
        ));

        let long = SearchConfig::default().with_test_size(29);
        assert!(matches!(
            ModelSearch::run(&series, &space, &long),
            Err(ForecastError::InsufficientData { needed: 31, got: 30 })
        ));
    }

    #[test]
    fn missing_values_rejected() {
        let series = monthly_like(40);
        let mut values = series.values().to_vec();
        values[10] = f64::NAN;
        let series = series.with_values(values).unwrap();
        assert!(matches!(
            ModelSearch::run(&series, &small_space(), &SearchConfig::default()),
            Err(ForecastError::MissingValues)
        ));
    }

    #[test]
    fn refit_best_uses_full_series() {
        let series = monthly_like(60);
        let comparison =
            ModelSearch::run(&series, &small_space(), &SearchConfig::default()).unwrap();
        let model = comparison.refit_best(&series).unwrap();
        assert_eq!(model.name(), comparison.best().name());
        assert_eq!(model.fitted_values().unwrap().len(), 60);
    }

    #[test]
    fn exports_table_csv_and_json() {
        let series = monthly_like(60);
        let comparison =
            ModelSearch::run(&series, &small_space(), &SearchConfig::default()).unwrap();

        let table = comparison.to_string();
        assert!(table.contains("ranked by AIC"));
        assert!(table.contains(comparison.best().name()));

        let mut buf = Vec::new();
        comparison.to_csv(&mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("model,aic,mae,rmse"));
        assert_eq!(lines.count(), comparison.len());

        let json: serde_json::Value = serde_json::from_str(&comparison.to_json().unwrap()).unwrap();
        assert_eq!(json["selection"], "aic");
        assert_eq!(json["rows"].as_array().unwrap().len(), comparison.len());
        assert_eq!(json["rows"][0]["model"], comparison.best().name());
    }

    fn scored(p: usize, aic: f64, mae: f64, rmse: f64) -> CandidateModel {
        let family = ModelFamily::Arima {
            order: ARIMASpec::new(p, 0, 0),
        };
        CandidateModel {
            family,
            model: family.build(),
            aic,
            mae,
            rmse,
            forecast: Forecast::from_values(vec![]),
        }
    }

    #[test]
    fn ties_broken_by_aic_then_rmse() {
        let mut rows = vec![
            scored(0, 10.0, 1.0, 3.0),
            scored(1, 5.0, 1.0, 4.0),
            scored(2, 5.0, 1.0, 2.0),
        ];
        rows.sort_by(|a, b| rank(a, b, SelectionMetric::Mae));

        let names: Vec<&str> = rows.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["ARIMA(2,0,0)", "ARIMA(1,0,0)", "ARIMA(0,0,0)"]);
    }

    #[test]
    fn search_config_serde_roundtrip() {
        let config = SearchConfig::default()
            .with_selection(SelectionMetric::Rmse)
            .with_max_candidates(10);
        let json = serde_json::to_string(&config).unwrap();
        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
