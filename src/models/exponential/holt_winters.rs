//! Holt-Winters forecasting model.
//!
//! Exponential smoothing with an optional additive trend and an optional
//! additive or multiplicative seasonal component. With neither it reduces to
//! simple exponential smoothing, with a trend only to Holt's linear method.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;

const PARAM_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Type of trend component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    None,
    #[default]
    Additive,
}

/// Type of seasonal component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalType {
    None,
    /// Additive seasonality: y_t = l_t + b_t + s_t + e_t
    #[default]
    Additive,
    /// Multiplicative seasonality: y_t = (l_t + b_t) * s_t + e_t
    Multiplicative,
}

impl fmt::Display for TrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendType::None => "none",
            TrendType::Additive => "add",
        })
    }
}

impl fmt::Display for SeasonalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeasonalType::None => "none",
            SeasonalType::Additive => "add",
            SeasonalType::Multiplicative => "mul",
        })
    }
}

/// Smoothing parameters; `beta` and `gamma` are ignored for absent components.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Smoothing {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

#[derive(Debug, Clone)]
struct State {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

/// Holt-Winters forecaster.
///
/// The model equations for additive seasonality:
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h*b_t + s_{t+h-m}`
///
/// For multiplicative seasonality:
/// - Level: `l_t = α(y_t / s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Seasonal: `s_t = γ(y_t / l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = (l_t + h*b_t) * s_{t+h-m}`
///
/// Unset parameters are chosen by minimizing the one-step SSE. The AIC is
/// `-2 llf + 2k` with the Gaussian log-likelihood of the scored errors, so it
/// is comparable with ARIMA. `k` counts smoothing parameters, initial states
/// and the error variance.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    trend_type: TrendType,
    seasonal_type: SeasonalType,
    seasonal_period: usize,
    fixed: Option<Smoothing>,
    label: String,
    smoothing: Option<Smoothing>,
    state: Option<State>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    n: usize,
}

impl HoltWinters {
    /// Model with the given components and optimized smoothing parameters.
    ///
    /// `seasonal_period` is ignored when `seasonal_type` is `None`.
    pub fn new(trend_type: TrendType, seasonal_type: SeasonalType, seasonal_period: usize) -> Self {
        let seasonal_period = if seasonal_type == SeasonalType::None {
            0
        } else {
            seasonal_period
        };
        let label = if seasonal_type == SeasonalType::None {
            format!("HoltWinters({trend_type},{seasonal_type})")
        } else {
            format!("HoltWinters({trend_type},{seasonal_type},{seasonal_period})")
        };
        Self {
            trend_type,
            seasonal_type,
            seasonal_period,
            fixed: None,
            label,
            smoothing: None,
            state: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            aic: None,
            n: 0,
        }
    }

    /// Additive trend and seasonality with optimized parameters.
    pub fn auto(seasonal_period: usize, seasonal_type: SeasonalType) -> Self {
        Self::new(TrendType::Additive, seasonal_type, seasonal_period)
    }

    /// Additive Holt-Winters with fixed parameters.
    pub fn additive(alpha: f64, beta: f64, gamma: f64, seasonal_period: usize) -> Self {
        Self::auto(seasonal_period, SeasonalType::Additive).with_params(alpha, beta, gamma)
    }

    /// Multiplicative Holt-Winters with fixed parameters.
    pub fn multiplicative(alpha: f64, beta: f64, gamma: f64, seasonal_period: usize) -> Self {
        Self::auto(seasonal_period, SeasonalType::Multiplicative).with_params(alpha, beta, gamma)
    }

    /// Fix the smoothing parameters instead of optimizing them.
    pub fn with_params(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        let (lo, hi) = PARAM_BOUNDS;
        self.fixed = Some(Smoothing {
            alpha: alpha.clamp(lo, hi),
            beta: beta.clamp(lo, hi),
            gamma: gamma.clamp(lo, hi),
        });
        self
    }

    pub fn alpha(&self) -> Option<f64> {
        self.smoothing.or(self.fixed).map(|s| s.alpha)
    }

    pub fn beta(&self) -> Option<f64> {
        self.has_trend()
            .then(|| self.smoothing.or(self.fixed).map(|s| s.beta))
            .flatten()
    }

    pub fn gamma(&self) -> Option<f64> {
        self.has_season()
            .then(|| self.smoothing.or(self.fixed).map(|s| s.gamma))
            .flatten()
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn trend_type(&self) -> TrendType {
        self.trend_type
    }

    pub fn seasonal_type(&self) -> SeasonalType {
        self.seasonal_type
    }

    pub fn level(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.level)
    }

    pub fn trend(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.trend)
    }

    /// Seasonal indices, aligned so that index `i` belongs to `t % m == i`.
    pub fn seasonals(&self) -> Option<&[f64]> {
        self.state
            .as_ref()
            .filter(|_| self.has_season())
            .map(|s| s.seasonals.as_slice())
    }

    fn has_trend(&self) -> bool {
        self.trend_type == TrendType::Additive
    }

    fn has_season(&self) -> bool {
        self.seasonal_type != SeasonalType::None
    }

    /// Observations used to initialize the state; errors are scored after them.
    fn warmup(&self) -> usize {
        if self.has_season() {
            self.seasonal_period
        } else {
            1
        }
    }

    fn min_length(&self) -> usize {
        if self.has_season() {
            2 * self.seasonal_period
        } else if self.has_trend() {
            3
        } else {
            2
        }
    }

    fn num_smoothing(&self) -> usize {
        1 + usize::from(self.has_trend()) + usize::from(self.has_season())
    }

    fn num_states(&self) -> usize {
        1 + usize::from(self.has_trend()) + self.seasonal_period
    }

    fn initialize_state(&self, values: &[f64]) -> State {
        if !self.has_season() {
            let trend = if self.has_trend() {
                values[1] - values[0]
            } else {
                0.0
            };
            return State {
                level: values[0],
                trend,
                seasonals: Vec::new(),
            };
        }

        let period = self.seasonal_period;
        let first_season = &values[..period];
        let level = first_season.iter().sum::<f64>() / period as f64;

        let trend = if self.has_trend() {
            (0..period)
                .map(|i| (values[period + i] - values[i]) / period as f64)
                .sum::<f64>()
                / period as f64
        } else {
            0.0
        };

        let mut seasonals: Vec<f64> = match self.seasonal_type {
            SeasonalType::Multiplicative => first_season
                .iter()
                .map(|y| if level.abs() > 1e-10 { y / level } else { 1.0 })
                .collect(),
            _ => first_season.iter().map(|y| y - level).collect(),
        };
        self.normalize_seasonals(&mut seasonals);

        State {
            level,
            trend,
            seasonals,
        }
    }

    /// Additive seasonals sum to 0, multiplicative ones average to 1.
    fn normalize_seasonals(&self, seasonals: &mut [f64]) {
        let period = seasonals.len() as f64;
        match self.seasonal_type {
            SeasonalType::Additive => {
                let adjustment = seasonals.iter().sum::<f64>() / period;
                seasonals.iter_mut().for_each(|s| *s -= adjustment);
            }
            SeasonalType::Multiplicative => {
                let mean = seasonals.iter().sum::<f64>() / period;
                if mean.abs() > 1e-10 {
                    seasonals.iter_mut().for_each(|s| *s /= mean);
                }
            }
            SeasonalType::None => {}
        }
    }

    /// Run the recursions; returns one-step forecasts and the final state.
    fn filter(&self, values: &[f64], params: Smoothing) -> (Vec<f64>, State) {
        let Smoothing { alpha, beta, gamma } = params;
        let period = self.seasonal_period;
        let mut state = self.initialize_state(values);
        let mut forecasts = Vec::with_capacity(values.len());

        for (t, &y) in values.iter().enumerate().skip(self.warmup()) {
            let idx = if period > 0 { t % period } else { 0 };
            let s = state.seasonals.get(idx).copied().unwrap_or(0.0);
            let base = state.level + state.trend;

            let forecast = match self.seasonal_type {
                SeasonalType::None => base,
                SeasonalType::Additive => base + s,
                SeasonalType::Multiplicative => base * s,
            };
            forecasts.push(forecast);

            let level_prev = state.level;
            let deseasonalized = match self.seasonal_type {
                SeasonalType::None => y,
                SeasonalType::Additive => y - s,
                SeasonalType::Multiplicative => {
                    if s.abs() > 1e-10 {
                        y / s
                    } else {
                        y
                    }
                }
            };
            state.level = alpha * deseasonalized + (1.0 - alpha) * base;
            if self.has_trend() {
                state.trend = beta * (state.level - level_prev) + (1.0 - beta) * state.trend;
            }
            match self.seasonal_type {
                SeasonalType::Additive => {
                    state.seasonals[idx] = gamma * (y - state.level) + (1.0 - gamma) * s;
                }
                SeasonalType::Multiplicative if state.level.abs() > 1e-10 => {
                    state.seasonals[idx] = gamma * (y / state.level) + (1.0 - gamma) * s;
                }
                _ => {}
            }
        }
        (forecasts, state)
    }

    fn sse(&self, values: &[f64], params: Smoothing) -> f64 {
        let (forecasts, _) = self.filter(values, params);
        let sse: f64 = values[self.warmup()..]
            .iter()
            .zip(&forecasts)
            .map(|(y, f)| (y - f).powi(2))
            .sum();
        if sse.is_finite() {
            sse
        } else {
            f64::INFINITY
        }
    }

    fn optimize_params(&self, values: &[f64]) -> Smoothing {
        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };
        let initial = [0.3, 0.1, 0.1];
        let dims = self.num_smoothing();
        let layout = |params: &[f64]| {
            let mut it = params.iter().copied();
            let alpha = it.next().unwrap_or(initial[0]);
            let beta = if self.has_trend() {
                it.next().unwrap_or(initial[1])
            } else {
                0.0
            };
            let gamma = if self.has_season() {
                it.next().unwrap_or(initial[2])
            } else {
                0.0
            };
            Smoothing { alpha, beta, gamma }
        };

        let mut start = vec![initial[0]];
        if self.has_trend() {
            start.push(initial[1]);
        }
        if self.has_season() {
            start.push(initial[2]);
        }
        let bounds = vec![PARAM_BOUNDS; dims];

        let result = nelder_mead(
            |params| self.sse(values, layout(params)),
            &start,
            Some(&bounds),
            config,
        );
        let (lo, hi) = PARAM_BOUNDS;
        let best = layout(&result.optimal_point);
        Smoothing {
            alpha: best.alpha.clamp(lo, hi),
            beta: best.beta.clamp(lo, hi),
            gamma: best.gamma.clamp(lo, hi),
        }
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::auto(12, SeasonalType::Additive)
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if self.has_season() && self.seasonal_period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }
        if values.len() < self.min_length() {
            return Err(ForecastError::InsufficientData {
                needed: self.min_length(),
                got: values.len(),
            });
        }
        if self.seasonal_type == SeasonalType::Multiplicative && values.iter().any(|&v| v <= 0.0)
        {
            return Err(ForecastError::InvalidParameter(
                "multiplicative seasonality requires strictly positive values".to_string(),
            ));
        }

        self.n = values.len();
        let params = match self.fixed {
            Some(params) => params,
            None => self.optimize_params(values),
        };

        let (forecasts, state) = self.filter(values, params);
        let warmup = self.warmup();

        let mut fitted = vec![f64::NAN; warmup];
        fitted.extend_from_slice(&forecasts);
        let residuals: Vec<f64> = values
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        let scored = (self.n - warmup) as f64;
        let sse: f64 = residuals[warmup..].iter().map(|r| r * r).sum();
        // Gaussian likelihood on the scored errors, same scale as ARIMA's CSS AIC
        let sigma2 = sse / scored;
        let llf = -0.5 * scored * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0);
        let k = (self.num_smoothing() + self.num_states() + 1) as f64;
        let aic = -2.0 * llf + 2.0 * k;
        debug!(model = %self.label, alpha = params.alpha, sse, aic, "fitted");

        self.smoothing = Some(params);
        self.state = Some(state);
        self.residual_variance = Some(sigma2);
        self.aic = Some(aic);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::new());
        }
        let period = self.seasonal_period;

        let predictions: Vec<f64> = (1..=horizon)
            .map(|h| {
                let base = state.level + h as f64 * state.trend;
                if period == 0 {
                    return base;
                }
                let s = state.seasonals[(self.n + h - 1) % period];
                match self.seasonal_type {
                    SeasonalType::Multiplicative => base * s,
                    _ => base + s,
                }
            })
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    /// Intervals use the class-1 additive ETS variance
    /// `σ²(1 + Σ_{j<h} (α(1 + jβ) + γ(1-α)[j mod m = 0])²)`.
    /// For multiplicative seasonality this is an approximation.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {level}"
            )));
        }
        let forecast = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }
        let params = self.smoothing.ok_or(ForecastError::FitRequired)?;
        let variance = self.residual_variance.unwrap_or(0.0);
        let z = quantile_normal((1.0 + level) / 2.0);
        let beta = if self.has_trend() { params.beta } else { 0.0 };

        let mut multiplier = 1.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (h, pred) in forecast.point().iter().enumerate() {
            if h > 0 {
                let mut c = params.alpha * (1.0 + h as f64 * beta);
                if self.has_season() && h % self.seasonal_period == 0 {
                    c += params.gamma * (1.0 - params.alpha);
                }
                multiplier += c * c;
            }
            let se = (variance * multiplier).sqrt();
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Forecast::from_values_with_intervals(forecast.point().to_vec(), lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn aic(&self) -> Option<f64> {
        self.aic
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| base + Duration::hours(i as i64))
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    fn make_seasonal_data(n: usize, period: usize, trend: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let seasonal = amplitude * (2.0 * std::f64::consts::PI * t / period as f64).sin();
                10.0 + trend * t + seasonal
            })
            .collect()
    }

    #[test]
    fn hw_additive_basic() {
        let mut model = HoltWinters::additive(0.3, 0.1, 0.1, 8);
        model.fit(&make_series(make_seasonal_data(32, 8, 0.1, 5.0))).unwrap();

        let forecast = model.predict(8).unwrap();
        assert_eq!(forecast.horizon(), 8);
        assert!(forecast.is_finite());
    }

    #[test]
    fn hw_multiplicative_basic() {
        let values: Vec<f64> = (0..32)
            .map(|i| {
                let base = 100.0 + 0.5 * i as f64;
                let seasonal = 1.0 + 0.2 * (2.0 * std::f64::consts::PI * i as f64 / 8.0).sin();
                base * seasonal
            })
            .collect();
        let mut model = HoltWinters::multiplicative(0.3, 0.1, 0.1, 8);
        model.fit(&make_series(values)).unwrap();

        let seasonals = model.seasonals().unwrap();
        assert_eq!(seasonals.len(), 8);
        assert_eq!(model.predict(8).unwrap().horizon(), 8);
    }

    #[test]
    fn hw_auto_optimization() {
        let mut model = HoltWinters::auto(12, SeasonalType::Additive);
        model.fit(&make_series(make_seasonal_data(48, 12, 0.1, 3.0))).unwrap();

        for p in [model.alpha(), model.beta(), model.gamma()] {
            let p = p.unwrap();
            assert!((0.0..1.0).contains(&p));
        }
        assert!(model.aic().unwrap().is_finite());
        assert_eq!(model.predict(12).unwrap().horizon(), 12);
    }

    #[test]
    fn hw_tracks_exact_seasonal_trend() {
        let pattern = [4.0, -2.0, 1.0, -3.0];
        let values: Vec<f64> = (0..40).map(|i| 50.0 + 0.5 * i as f64 + pattern[i % 4]).collect();
        let mut model = HoltWinters::auto(4, SeasonalType::Additive);
        model.fit(&make_series(values)).unwrap();

        let preds = model.predict(4).unwrap();
        for (h, p) in preds.point().iter().enumerate() {
            let expected = 50.0 + 0.5 * (40 + h) as f64 + pattern[h % 4];
            assert!((p - expected).abs() < 0.5, "h={h}: {p} vs {expected}");
        }
    }

    #[test]
    fn simple_smoothing_has_flat_forecast() {
        let values = vec![3.0, 5.0, 4.0, 6.0, 5.0, 4.5, 5.5, 5.0];
        let mut model = HoltWinters::new(TrendType::None, SeasonalType::None, 0);
        model.fit(&make_series(values)).unwrap();

        let preds = model.predict(3).unwrap();
        assert_relative_eq!(preds.point()[0], preds.point()[2]);
        assert!(model.beta().is_none());
        assert!(model.gamma().is_none());
        assert!(model.seasonals().is_none());
        assert_eq!(model.name(), "HoltWinters(none,none)");
    }

    #[test]
    fn holt_linear_extends_line() {
        let values: Vec<f64> = (0..20).map(|i| 3.0 + 2.0 * i as f64).collect();
        let mut model = HoltWinters::new(TrendType::Additive, SeasonalType::None, 0);
        model.fit(&make_series(values)).unwrap();

        let preds = model.predict(2).unwrap();
        assert_relative_eq!(preds.point()[0], 43.0, epsilon = 1e-6);
        assert_relative_eq!(preds.point()[1], 45.0, epsilon = 1e-6);
    }

    #[test]
    fn hw_confidence_intervals_widen() {
        let mut model = HoltWinters::additive(0.3, 0.1, 0.1, 8);
        let values: Vec<f64> = make_seasonal_data(32, 8, 0.1, 3.0)
            .iter()
            .enumerate()
            .map(|(i, v)| v + ((i * 7) % 5) as f64 * 0.2)
            .collect();
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict_with_intervals(8, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        let preds = forecast.point();
        for i in 0..8 {
            assert!(lower[i] < preds[i]);
            assert!(upper[i] > preds[i]);
        }
        assert!(upper[7] - lower[7] > upper[0] - lower[0]);
    }

    #[test]
    fn hw_insufficient_data() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut model = HoltWinters::additive(0.3, 0.1, 0.1, 8);
        assert!(matches!(
            model.fit(&make_series(values)),
            Err(ForecastError::InsufficientData {
                needed: 16,
                got: 10
            })
        ));
    }

    #[test]
    fn hw_multiplicative_rejects_non_positive() {
        let mut values = make_seasonal_data(24, 4, 0.0, 3.0);
        values[5] = -1.0;
        let mut model = HoltWinters::auto(4, SeasonalType::Multiplicative);
        assert!(matches!(
            model.fit(&make_series(values)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn hw_requires_fit_before_predict() {
        let model = HoltWinters::additive(0.3, 0.1, 0.1, 4);
        assert!(matches!(model.predict(4), Err(ForecastError::FitRequired)));
    }

    #[test]
    fn hw_name_reflects_type() {
        assert_eq!(
            HoltWinters::additive(0.3, 0.1, 0.1, 4).name(),
            "HoltWinters(add,add,4)"
        );
        assert_eq!(
            HoltWinters::new(TrendType::None, SeasonalType::Multiplicative, 12).name(),
            "HoltWinters(none,mul,12)"
        );
    }

    #[test]
    fn hw_fitted_and_residuals() {
        let values = make_seasonal_data(24, 6, 0.1, 2.0);
        let mut model = HoltWinters::additive(0.3, 0.1, 0.1, 6);
        model.fit(&make_series(values.clone())).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), 24);
        assert!(fitted[..6].iter().all(|v| v.is_nan()));
        for i in 6..24 {
            assert_relative_eq!(residuals[i], values[i] - fitted[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn hw_getters_work() {
        let model = HoltWinters::new(TrendType::Additive, SeasonalType::Multiplicative, 12)
            .with_params(0.3, 0.2, 0.1);

        assert_relative_eq!(model.alpha().unwrap(), 0.3, epsilon = 1e-10);
        assert_relative_eq!(model.beta().unwrap(), 0.2, epsilon = 1e-10);
        assert_relative_eq!(model.gamma().unwrap(), 0.1, epsilon = 1e-10);
        assert_eq!(model.seasonal_period(), 12);
        assert_eq!(model.seasonal_type(), SeasonalType::Multiplicative);
        assert_eq!(model.trend_type(), TrendType::Additive);
    }

    #[test]
    fn hw_multi_season_forecast() {
        let mut model = HoltWinters::additive(0.5, 0.1, 0.5, 4);
        model.fit(&make_series(make_seasonal_data(24, 4, 0.0, 3.0))).unwrap();

        let preds = model.predict(12).unwrap();
        let preds = preds.point();
        for i in 0..4 {
            assert!((preds[i] - preds[i + 4]).abs() / preds[i].abs().max(1.0) < 0.2);
            assert!((preds[i + 4] - preds[i + 8]).abs() / preds[i + 4].abs().max(1.0) < 0.2);
        }
    }
}
