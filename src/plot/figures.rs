//! Data behind the diagnostic figures.
//!
//! Everything here is plain computation and always compiled; the
//! `plotting` feature only adds rendering on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::features::{acf, pacf};
use crate::transform::{rolling_mean, rolling_std};
use crate::utils::quantile_normal;

/// Appearance of a rendered figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pub show_grid: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            title: "Time Series".to_string(),
            x_label: "Date".to_string(),
            y_label: "Value".to_string(),
            width: 1200,
            height: 400,
            show_grid: true,
        }
    }
}

impl PlotSettings {
    /// Taller default for the four stacked decomposition panels (12×8 in).
    pub fn decomposition() -> Self {
        Self {
            title: "Seasonal Decomposition".to_string(),
            height: 800,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_grid(mut self, show_grid: bool) -> Self {
        self.show_grid = show_grid;
        self
    }
}

/// A series with its trailing rolling mean and standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingStatistics {
    timestamps: Vec<DateTime<Utc>>,
    observed: Vec<f64>,
    mean: Vec<f64>,
    std: Vec<f64>,
    window: usize,
}

impl RollingStatistics {
    /// The first `window - 1` mean and std entries are NaN.
    pub fn compute(series: &TimeSeries, window: usize) -> Result<Self> {
        let values = series.values();
        Ok(Self {
            timestamps: series.timestamps().to_vec(),
            observed: values.to_vec(),
            mean: rolling_mean(values, window)?,
            std: rolling_std(values, window)?,
            window,
        })
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    Acf,
    Pacf,
}

/// Correlations by lag with a confidence band around zero.
///
/// The ACF band uses Bartlett's formula, `var(r_k) = (1 + 2 Σ_{j<k} r_j²) / n`.
/// The PACF band is `1 / n` at every lag. Lag 0 has no band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlogram {
    kind: CorrelationKind,
    values: Vec<f64>,
    band: Vec<f64>,
    alpha: f64,
}

impl Correlogram {
    pub fn acf(values: &[f64], nlags: usize, alpha: f64) -> Result<Self> {
        let z = band_quantile(alpha)?;
        let r = acf(values, nlags)?;
        let n = finite_len(values);

        let mut band = Vec::with_capacity(r.len());
        let mut cumulative = 0.0;
        for k in 0..r.len() {
            if k == 0 {
                band.push(0.0);
                continue;
            }
            if k > 1 {
                cumulative += r[k - 1] * r[k - 1];
            }
            band.push(z * ((1.0 + 2.0 * cumulative) / n).sqrt());
        }

        Ok(Self {
            kind: CorrelationKind::Acf,
            values: r,
            band,
            alpha,
        })
    }

    pub fn pacf(values: &[f64], nlags: usize, alpha: f64) -> Result<Self> {
        let z = band_quantile(alpha)?;
        let r = pacf(values, nlags)?;
        let width = z / finite_len(values).sqrt();
        let band = (0..r.len())
            .map(|k| if k == 0 { 0.0 } else { width })
            .collect();

        Ok(Self {
            kind: CorrelationKind::Pacf,
            values: r,
            band,
            alpha,
        })
    }

    pub fn kind(&self) -> CorrelationKind {
        self.kind
    }

    /// Correlation at lags `0..=nlags`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Half-width of the confidence band at each lag.
    pub fn band(&self) -> &[f64] {
        &self.band
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn nlags(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Lags `>= 1` whose correlation lies outside the band.
    pub fn significant_lags(&self) -> Vec<usize> {
        self.values
            .iter()
            .zip(&self.band)
            .enumerate()
            .skip(1)
            .filter(|(_, (r, b))| r.abs() > **b)
            .map(|(k, _)| k)
            .collect()
    }
}

fn band_quantile(alpha: f64) -> Result<f64> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {alpha}"
        )));
    }
    Ok(quantile_normal(1.0 - alpha / 2.0))
}

fn finite_len(values: &[f64]) -> f64 {
    values.iter().filter(|v| v.is_finite()).count() as f64
}
