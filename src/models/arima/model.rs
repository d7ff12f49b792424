//! ARIMA and seasonal ARIMA models.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::css::{CssState, Structure};
use crate::models::Forecaster;
use crate::transform::DifferencingPlan;

/// ARIMA model specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ARIMASpec {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ARIMASpec {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for ARIMASpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal part `(P, D, Q)[s]` of a SARIMA model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonalSpec {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub period: usize,
}

impl SeasonalSpec {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    fn is_trivial(&self) -> bool {
        self.p == 0 && self.d == 0 && self.q == 0
    }
}

impl fmt::Display for SeasonalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})[{}]", self.p, self.d, self.q, self.period)
    }
}

/// Whether a constant is estimated on the differenced scale.
///
/// By default a mean is fitted without differencing and a drift with a
/// single difference. Higher differencing orders get no constant.
fn default_constant(total_d: usize) -> bool {
    total_d < 2
}

/// ARIMA forecasting model.
///
/// ARIMA(p, d, q) combines:
/// - AR(p): Autoregressive component
/// - I(d): Differencing for stationarity
/// - MA(q): Moving average component
///
/// Coefficients are estimated by conditional sum of squares with
/// Nelder-Mead, each bounded to `(-0.99, 0.99)`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use usercast::core::TimeSeries;
/// use usercast::models::{arima::ARIMA, Forecaster};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let timestamps = (0..60).map(|i| start + Duration::days(i)).collect();
/// let values = (0..60).map(|i| 10.0 + 0.5 * i as f64 + (i as f64 * 0.3).sin()).collect();
/// let series = TimeSeries::univariate(timestamps, values).unwrap();
///
/// let mut model = ARIMA::new(1, 1, 0);
/// model.fit(&series).unwrap();
/// let forecast = model.predict_with_intervals(6, 0.95).unwrap();
/// assert_eq!(forecast.horizon(), 6);
/// assert_eq!(model.name(), "ARIMA(1,1,0)");
/// ```
#[derive(Debug, Clone)]
pub struct ARIMA {
    spec: ARIMASpec,
    constant: bool,
    label: String,
    state: Option<CssState>,
}

impl ARIMA {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_spec(ARIMASpec::new(p, d, q))
    }

    pub fn from_spec(spec: ARIMASpec) -> Self {
        Self {
            spec,
            constant: default_constant(spec.d),
            label: format!("ARIMA{spec}"),
            state: None,
        }
    }

    /// Create an AR(p) model (ARIMA with d=0, q=0).
    pub fn ar(p: usize) -> Self {
        Self::new(p, 0, 0)
    }

    /// Create an MA(q) model (ARIMA with p=0, d=0).
    pub fn ma(q: usize) -> Self {
        Self::new(0, 0, q)
    }

    /// Override whether a mean/drift term is estimated.
    /// Discards any previous fit.
    pub fn with_constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self.state = None;
        self
    }

    pub fn spec(&self) -> ARIMASpec {
        self.spec
    }

    fn structure(&self) -> Structure {
        Structure {
            p: self.spec.p,
            q: self.spec.q,
            seasonal_p: 0,
            seasonal_q: 0,
            period: 0,
            constant: self.constant,
        }
    }

    fn coefficients(&self) -> &[f64] {
        match &self.state {
            Some(state) => &state.params[usize::from(self.constant)..],
            None => &[],
        }
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        let c = self.coefficients();
        &c[..c.len().min(self.spec.p)]
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        let c = self.coefficients();
        &c[c.len().min(self.spec.p)..]
    }

    /// Mean (or drift) of the differenced series; zero without a constant.
    pub fn intercept(&self) -> f64 {
        self.state.as_ref().map_or(0.0, |s| s.mean)
    }

    /// Innovation variance estimate.
    pub fn sigma2(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma2)
    }

    pub fn bic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.bic)
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        Self::from_spec(ARIMASpec::default())
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let plan = DifferencingPlan::arima(self.spec.d, 0, 0);
        let state = CssState::estimate(series.values(), plan, self.structure())?;
        debug!(model = %self.label, aic = state.aic, sigma2 = state.sigma2, "fitted");
        self.state = Some(state);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.state
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .forecast(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.state
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .forecast_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Seasonal ARIMA `(p, d, q)(P, D, Q)[s]` with multiplicative polynomials.
///
/// Differencing is applied as `(1 - B)^d (1 - B^s)^D`. Prediction intervals
/// use the psi-weights of the full integrated model.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use usercast::core::TimeSeries;
/// use usercast::models::{arima::{ARIMASpec, SeasonalSpec, SARIMA}, Forecaster};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let timestamps = (0..48).map(|i| start + Duration::days(i)).collect();
/// let values = (0..48).map(|i| 50.0 + [4.0, -1.0, 2.0, -5.0][i % 4] + 0.2 * i as f64).collect();
/// let series = TimeSeries::univariate(timestamps, values).unwrap();
///
/// let mut model = SARIMA::new(ARIMASpec::new(0, 1, 1), SeasonalSpec::new(0, 1, 1, 4));
/// model.fit(&series).unwrap();
/// assert_eq!(model.predict(8).unwrap().horizon(), 8);
/// assert_eq!(model.name(), "SARIMA(0,1,1)(0,1,1)[4]");
/// ```
#[derive(Debug, Clone)]
pub struct SARIMA {
    order: ARIMASpec,
    seasonal: SeasonalSpec,
    constant: bool,
    label: String,
    state: Option<CssState>,
}

impl SARIMA {
    pub fn new(order: ARIMASpec, seasonal: SeasonalSpec) -> Self {
        Self {
            order,
            seasonal,
            constant: default_constant(order.d + seasonal.d),
            label: format!("SARIMA{order}{seasonal}"),
            state: None,
        }
    }

    /// Discards any previous fit.
    pub fn with_constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self.state = None;
        self
    }

    pub fn order(&self) -> ARIMASpec {
        self.order
    }

    pub fn seasonal_order(&self) -> SeasonalSpec {
        self.seasonal
    }

    fn structure(&self) -> Structure {
        Structure {
            p: self.order.p,
            q: self.order.q,
            seasonal_p: self.seasonal.p,
            seasonal_q: self.seasonal.q,
            period: self.seasonal.period,
            constant: self.constant,
        }
    }

    /// Coefficient block `[start, start + len)` after the constant.
    fn block(&self, start: usize, len: usize) -> &[f64] {
        match &self.state {
            Some(state) => {
                let offset = usize::from(self.constant) + start;
                &state.params[offset..offset + len]
            }
            None => &[],
        }
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        self.block(0, self.order.p)
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        self.block(self.order.p, self.order.q)
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        self.block(self.order.p + self.order.q, self.seasonal.p)
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        self.block(
            self.order.p + self.order.q + self.seasonal.p,
            self.seasonal.q,
        )
    }

    pub fn intercept(&self) -> f64 {
        self.state.as_ref().map_or(0.0, |s| s.mean)
    }

    pub fn sigma2(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma2)
    }

    pub fn bic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.bic)
    }
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        if self.seasonal.period < 2 && !self.seasonal.is_trivial() {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                self.seasonal.period
            )));
        }
        let plan = DifferencingPlan::arima(self.order.d, self.seasonal.d, self.seasonal.period);
        let state = CssState::estimate(series.values(), plan, self.structure())?;
        debug!(model = %self.label, aic = state.aic, sigma2 = state.sigma2, "fitted");
        self.state = Some(state);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.state
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .forecast(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.state
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .forecast_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
