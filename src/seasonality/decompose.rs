//! Classical seasonal decomposition by moving averages.
//!
//! The observed series is split into:
//! - Trend: centered moving average over one seasonal period
//! - Seasonal: per-position averages of the detrended series, normalized
//! - Residual: whatever remains

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// How the components combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionModel {
    /// `observed = trend + seasonal + residual`
    #[default]
    Additive,
    /// `observed = trend * seasonal * residual`
    Multiplicative,
}

/// Decomposition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    pub model: DecompositionModel,
    /// Seasonal period; falls back to the series frequency when unset.
    pub period: Option<usize>,
    /// Fill the trend edges by linear extrapolation over one period.
    pub extrapolate_trend: bool,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            model: DecompositionModel::Additive,
            period: None,
            extrapolate_trend: true,
        }
    }
}

impl DecomposeConfig {
    pub fn additive(period: usize) -> Self {
        Self {
            period: Some(period),
            ..Self::default()
        }
    }

    pub fn multiplicative(period: usize) -> Self {
        Self {
            model: DecompositionModel::Multiplicative,
            period: Some(period),
            ..Self::default()
        }
    }

    pub fn with_extrapolate_trend(mut self, extrapolate: bool) -> Self {
        self.extrapolate_trend = extrapolate;
        self
    }
}

/// Result of [`decompose`].
///
/// Without trend extrapolation, the first and last `period / 2` trend and
/// residual entries are `NaN`.
#[derive(Debug, Clone, Serialize)]
pub struct Decomposition {
    timestamps: Vec<DateTime<Utc>>,
    observed: Vec<f64>,
    trend: Vec<f64>,
    seasonal: Vec<f64>,
    residual: Vec<f64>,
    period: usize,
    model: DecompositionModel,
}

impl Decomposition {
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    pub fn trend(&self) -> &[f64] {
        &self.trend
    }

    pub fn seasonal(&self) -> &[f64] {
        &self.seasonal
    }

    pub fn residual(&self) -> &[f64] {
        &self.residual
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn model(&self) -> DecompositionModel {
        self.model
    }

    /// One full cycle of seasonal factors, aligned to the first observation.
    pub fn seasonal_pattern(&self) -> &[f64] {
        &self.seasonal[..self.period]
    }

    /// Recombine the components.
    pub fn recombine(&self) -> Vec<f64> {
        self.trend
            .iter()
            .zip(&self.seasonal)
            .zip(&self.residual)
            .map(|((t, s), r)| match self.model {
                DecompositionModel::Additive => t + s + r,
                DecompositionModel::Multiplicative => t * s * r,
            })
            .collect()
    }

    /// Strength of seasonality in `[0, 1]` (Wang, Smith and Hyndman).
    pub fn seasonal_strength(&self) -> f64 {
        self.strength(&self.seasonal)
    }

    /// Strength of trend in `[0, 1]`.
    pub fn trend_strength(&self) -> f64 {
        self.strength(&self.trend)
    }

    fn strength(&self, component: &[f64]) -> f64 {
        let (combined, resid): (Vec<f64>, Vec<f64>) = component
            .iter()
            .zip(&self.residual)
            .filter(|(c, r)| c.is_finite() && r.is_finite())
            .map(|(c, r)| match self.model {
                DecompositionModel::Additive => (c + r, *r),
                DecompositionModel::Multiplicative => (c * r, *r),
            })
            .unzip();
        let var_combined = variance(&combined);
        if var_combined < 1e-10 {
            return 0.0;
        }
        (1.0 - variance(&resid) / var_combined).max(0.0)
    }
}

/// Decompose a series into trend, seasonal and residual components.
///
/// # Errors
/// - [`ForecastError::MissingValues`] if the series has gaps; fill them first
/// - [`ForecastError::FrequencyInference`] if no period is configured and the
///   series frequency has no default period
/// - [`ForecastError::InsufficientData`] with fewer than two full periods
/// - [`ForecastError::InvalidParameter`] for non-positive values under the
///   multiplicative model
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use usercast::core::{Frequency, TimeSeries};
/// use usercast::seasonality::{decompose, DecomposeConfig};
///
/// let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let timestamps = Frequency::Monthly.grid(start, Frequency::Monthly.step(start, 47).unwrap());
/// let values: Vec<f64> = (0..48)
///     .map(|i| 100.0 + i as f64 + [5.0, -3.0, 0.0, -2.0][i % 4])
///     .collect();
/// let series = TimeSeries::univariate(timestamps, values).unwrap();
///
/// let parts = decompose(&series, &DecomposeConfig::additive(4)).unwrap();
/// assert!((parts.seasonal()[0] - 5.0).abs() < 1e-9);
/// ```
pub fn decompose(series: &TimeSeries, config: &DecomposeConfig) -> Result<Decomposition> {
    let period = match config.period {
        Some(p) => p,
        None => series
            .frequency()
            .and_then(|f| f.default_seasonal_period())
            .ok_or_else(|| {
                ForecastError::FrequencyInference(
                    "no seasonal period configured and none implied by the series frequency"
                        .to_string(),
                )
            })?,
    };
    if period < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "seasonal period must be at least 2, got {period}"
        )));
    }
    if series.has_missing_values() {
        return Err(ForecastError::MissingValues);
    }
    let x = series.values();
    let n = x.len();
    if n < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: n,
        });
    }
    if config.model == DecompositionModel::Multiplicative && x.iter().any(|&v| v <= 0.0) {
        return Err(ForecastError::InvalidParameter(
            "multiplicative decomposition requires strictly positive values".to_string(),
        ));
    }

    let mut trend = centered_moving_average(x, period);
    if config.extrapolate_trend {
        extrapolate_edges(&mut trend, period);
    }

    let detrended: Vec<f64> = x
        .iter()
        .zip(&trend)
        .map(|(v, t)| match config.model {
            DecompositionModel::Additive => v - t,
            DecompositionModel::Multiplicative => v / t,
        })
        .collect();

    let mut pattern: Vec<f64> = (0..period)
        .map(|i| {
            let (sum, count) = detrended
                .iter()
                .skip(i)
                .step_by(period)
                .filter(|v| v.is_finite())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            sum / count as f64
        })
        .collect();
    let center = pattern.iter().sum::<f64>() / period as f64;
    for s in pattern.iter_mut() {
        match config.model {
            DecompositionModel::Additive => *s -= center,
            DecompositionModel::Multiplicative => *s /= center,
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|t| pattern[t % period]).collect();
    let residual: Vec<f64> = x
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((v, t), s)| match config.model {
            DecompositionModel::Additive => v - t - s,
            DecompositionModel::Multiplicative => v / (t * s),
        })
        .collect();

    debug!(period, model = ?config.model, n, "seasonal decomposition");

    Ok(Decomposition {
        timestamps: series.timestamps().to_vec(),
        observed: x.to_vec(),
        trend,
        seasonal,
        residual,
        period,
        model: config.model,
    })
}

/// Two-sided moving average; even periods use the 2 x m filter.
fn centered_moving_average(x: &[f64], period: usize) -> Vec<f64> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] /= 2.0;
        w[period] /= 2.0;
        w
    } else {
        vec![1.0 / period as f64; period]
    };
    let half = weights.len() / 2;
    let n = x.len();

    (0..n)
        .map(|t| {
            if t < half || t + half >= n {
                f64::NAN
            } else {
                weights
                    .iter()
                    .enumerate()
                    .map(|(j, w)| w * x[t + j - half])
                    .sum()
            }
        })
        .collect()
}

/// Replace leading and trailing `NaN` by least-squares lines through the
/// nearest `npoints` defined values on each side.
fn extrapolate_edges(trend: &mut [f64], npoints: usize) {
    let Some(first) = trend.iter().position(|v| v.is_finite()) else {
        return;
    };
    let Some(last) = trend.iter().rposition(|v| v.is_finite()) else {
        return;
    };

    let head_end = (first + npoints).min(last + 1);
    let (slope, intercept) = line_fit(trend, first, head_end);
    for (t, v) in trend.iter_mut().enumerate().take(first) {
        *v = intercept + slope * t as f64;
    }

    let tail_start = (last + 1).saturating_sub(npoints).max(first);
    let (slope, intercept) = line_fit(trend, tail_start, last + 1);
    for (t, v) in trend.iter_mut().enumerate().skip(last + 1) {
        *v = intercept + slope * t as f64;
    }
}

fn line_fit(values: &[f64], start: usize, end: usize) -> (f64, f64) {
    let n = (end - start) as f64;
    let mean_t = (start..end).map(|t| t as f64).sum::<f64>() / n;
    let mean_v = values[start..end].iter().sum::<f64>() / n;
    let (num, den) = (start..end).fold((0.0, 0.0), |(num, den), t| {
        let dt = t as f64 - mean_t;
        (num + dt * (values[t] - mean_v), den + dt * dt)
    });
    let slope = if den > 0.0 { num / den } else { 0.0 };
    (slope, mean_v - slope * mean_t)
}

fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frequency;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn monthly(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let end = Frequency::Monthly
            .step(start, values.len() as u32 - 1)
            .unwrap();
        let mut series =
            TimeSeries::univariate(Frequency::Monthly.grid(start, end), values).unwrap();
        series.set_frequency(Frequency::Monthly);
        series
    }

    fn seasonal_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let season = (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin() * 10.0;
                let noise = ((i * 17 + 5) % 13) as f64 * 0.1;
                200.0 + 0.8 * i as f64 + season + noise
            })
            .collect()
    }

    #[test]
    fn additive_components_recombine() {
        let series = monthly(seasonal_series(100));
        let parts = decompose(&series, &DecomposeConfig::default()).unwrap();

        assert_eq!(parts.period(), 12);
        for (r, o) in parts.recombine().iter().zip(series.values()) {
            assert_relative_eq!(r, o, epsilon = 1e-9);
        }
        assert!(parts.trend().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn multiplicative_components_recombine() {
        let values: Vec<f64> = (0..72)
            .map(|i| (50.0 + i as f64) * (1.0 + 0.2 * (i as f64 * 0.5236).cos()))
            .collect();
        let series = monthly(values);
        let parts = decompose(&series, &DecomposeConfig::multiplicative(12)).unwrap();

        for (r, o) in parts.recombine().iter().zip(series.values()) {
            assert_relative_eq!(r, o, epsilon = 1e-9);
        }
        let mean_factor = parts.seasonal_pattern().iter().sum::<f64>() / 12.0;
        assert_relative_eq!(mean_factor, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn additive_seasonal_sums_to_zero() {
        let parts = decompose(&monthly(seasonal_series(60)), &DecomposeConfig::additive(12)).unwrap();
        let total: f64 = parts.seasonal_pattern().iter().sum();
        assert_relative_eq!(total, 0.0, epsilon = 1e-9);
        assert_relative_eq!(parts.seasonal()[12], parts.seasonal()[0]);
    }

    #[test]
    fn recovers_exact_pattern_on_linear_trend() {
        let pattern = [3.0, -1.0, 0.5, -2.5];
        let values: Vec<f64> = (0..40).map(|i| 10.0 + 2.0 * i as f64 + pattern[i % 4]).collect();
        let parts = decompose(&monthly(values), &DecomposeConfig::additive(4)).unwrap();

        for (s, p) in parts.seasonal_pattern().iter().zip(&pattern) {
            assert_relative_eq!(s, p, epsilon = 1e-9);
        }
        for r in parts.residual() {
            assert!(r.abs() < 1e-9);
        }
        assert!(parts.seasonal_strength() > 0.99);
    }

    #[test]
    fn edges_are_nan_without_extrapolation() {
        let config = DecomposeConfig::additive(12).with_extrapolate_trend(false);
        let parts = decompose(&monthly(seasonal_series(48)), &config).unwrap();

        assert!(parts.trend()[..6].iter().all(|v| v.is_nan()));
        assert!(parts.trend()[42..].iter().all(|v| v.is_nan()));
        assert!(parts.trend()[6..42].iter().all(|v| v.is_finite()));
        assert!(parts.residual()[0].is_nan());
    }

    #[test]
    fn odd_period_uses_simple_average() {
        let trend = centered_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(trend[0].is_nan());
        assert_relative_eq!(trend[1], 2.0);
        assert_relative_eq!(trend[3], 4.0);
        assert!(trend[4].is_nan());
    }

    #[test]
    fn requires_two_full_periods() {
        let result = decompose(&monthly(seasonal_series(23)), &DecomposeConfig::additive(12));
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { needed: 24, got: 23 })
        ));
    }

    #[test]
    fn rejects_missing_values_and_bad_period() {
        let mut values = seasonal_series(36);
        values[5] = f64::NAN;
        assert!(matches!(
            decompose(&monthly(values), &DecomposeConfig::additive(12)),
            Err(ForecastError::MissingValues)
        ));
        assert!(decompose(&monthly(seasonal_series(36)), &DecomposeConfig::additive(1)).is_err());
    }

    #[test]
    fn period_required_without_frequency() {
        let mut series = monthly(seasonal_series(36));
        series.clear_frequency();
        assert!(matches!(
            decompose(&series, &DecomposeConfig::default()),
            Err(ForecastError::FrequencyInference(_))
        ));
    }

    #[test]
    fn multiplicative_rejects_non_positive() {
        let mut values = seasonal_series(36);
        values[3] = 0.0;
        assert!(decompose(&monthly(values), &DecomposeConfig::multiplicative(12)).is_err());
    }
}
