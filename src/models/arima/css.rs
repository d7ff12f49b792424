//! Conditional sum of squares estimation shared by ARIMA and SARIMA.
//!
//! Seasonal and non-seasonal lag polynomials are multiplied out, so a
//! SARIMA model is estimated as an ARIMA model with sparse long lags.

use crate::core::Forecast;
use crate::error::{ForecastError, Result};
use crate::transform::DifferencingPlan;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;

const COEF_BOUND: f64 = 0.99;

/// Orders and options of a (seasonal) ARMA model on the differenced scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Structure {
    pub p: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_q: usize,
    pub period: usize,
    pub constant: bool,
}

impl Structure {
    fn num_coefficients(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Estimated parameters, excluding the innovation variance.
    pub fn num_params(&self) -> usize {
        self.num_coefficients() + usize::from(self.constant)
    }

    fn ar_len(&self) -> usize {
        self.p + self.period * self.seasonal_p
    }

    /// Split a parameter vector laid out as `[mean?, ar, ma, sar, sma]`.
    fn split<'a>(&self, params: &'a [f64]) -> (f64, Coefficients<'a>) {
        let (mean, rest) = if self.constant {
            (params[0], &params[1..])
        } else {
            (0.0, params)
        };
        let (ar, rest) = rest.split_at(self.p);
        let (ma, rest) = rest.split_at(self.q);
        let (sar, sma) = rest.split_at(self.seasonal_p);
        (mean, Coefficients { ar, ma, sar, sma })
    }
}

struct Coefficients<'a> {
    ar: &'a [f64],
    ma: &'a [f64],
    sar: &'a [f64],
    sma: &'a [f64],
}

impl Coefficients<'_> {
    /// Expanded AR lags `a_k` of `1 - sum a_k B^k`.
    fn expanded_ar(&self, period: usize) -> Vec<f64> {
        let neg = |c: &[f64]| c.iter().map(|v| -v).collect::<Vec<_>>();
        multiply(&neg(self.ar), &neg(self.sar), period)
            .into_iter()
            .map(|v| -v)
            .collect()
    }

    /// Expanded MA lags `b_k` of `1 + sum b_k B^k`.
    fn expanded_ma(&self, period: usize) -> Vec<f64> {
        multiply(self.ma, self.sma, period)
    }
}

/// `(1 + sum x_i B^i)(1 + sum y_j B^{s j})`, returned without the leading 1.
fn multiply(x: &[f64], y: &[f64], period: usize) -> Vec<f64> {
    let len = x.len() + period * y.len();
    let mut out = vec![0.0; len];
    let mut lhs = vec![1.0];
    lhs.extend_from_slice(x);
    let mut rhs = vec![0.0; period * y.len() + 1];
    rhs[0] = 1.0;
    for (j, c) in y.iter().enumerate() {
        rhs[period * (j + 1)] = *c;
    }
    for (i, a) in lhs.iter().enumerate() {
        for (k, b) in rhs.iter().enumerate() {
            if i + k > 0 {
                out[i + k - 1] += a * b;
            }
        }
    }
    out
}

/// One-step residuals; the first `ar.len()` are conditioned to zero.
fn css_residuals(w: &[f64], mean: f64, ar: &[f64], ma: &[f64]) -> (Vec<f64>, f64) {
    let n = w.len();
    let mut e = vec![0.0; n];
    let mut css = 0.0;
    for t in ar.len()..n {
        let mut pred = 0.0;
        for (k, a) in ar.iter().enumerate() {
            pred += a * (w[t - 1 - k] - mean);
        }
        for (k, b) in ma.iter().enumerate().take(t) {
            pred += b * e[t - 1 - k];
        }
        e[t] = w[t] - mean - pred;
        css += e[t] * e[t];
    }
    if !css.is_finite() {
        css = f64::INFINITY;
    }
    (e, css)
}

/// Estimated model together with the data needed to forecast.
#[derive(Debug, Clone)]
pub(crate) struct CssState {
    plan: DifferencingPlan,
    history: Vec<f64>,
    differenced: Vec<f64>,
    pub params: Vec<f64>,
    pub mean: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    innovations: Vec<f64>,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub sigma2: f64,
    pub aic: f64,
    pub bic: f64,
}

impl CssState {
    /// Difference `values` by `plan` and estimate `structure` by CSS.
    pub fn estimate(values: &[f64], plan: DifferencingPlan, structure: Structure) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }
        let differenced = plan.apply(values)?;
        let start = structure.ar_len();
        let k = structure.num_params();
        let needed = plan.consumed() + start + k + 2;
        if values.len() < needed || differenced.len() < start + k + 2 {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let w = &differenced;
        let sample_mean = w.iter().sum::<f64>() / w.len() as f64;
        let objective = |params: &[f64]| {
            let (mean, coefs) = structure.split(params);
            let ar = coefs.expanded_ar(structure.period);
            let ma = coefs.expanded_ma(structure.period);
            css_residuals(w, mean, &ar, &ma).1
        };

        let params = if structure.num_coefficients() == 0 {
            if structure.constant {
                vec![sample_mean]
            } else {
                vec![]
            }
        } else {
            let mut initial = Vec::with_capacity(k);
            let mut bounds = Vec::with_capacity(k);
            if structure.constant {
                initial.push(sample_mean);
                bounds.push((f64::NEG_INFINITY, f64::INFINITY));
            }
            for order in [structure.p, structure.q, structure.seasonal_p, structure.seasonal_q] {
                for i in 0..order {
                    initial.push(0.1 / (i + 1) as f64);
                    bounds.push((-COEF_BOUND, COEF_BOUND));
                }
            }
            let config = NelderMeadConfig {
                max_iter: 2000,
                tolerance: 1e-10,
                initial_step: 0.5,
                ..Default::default()
            };
            let result = nelder_mead(objective, &initial, Some(&bounds), config);
            if !result.optimal_value.is_finite() {
                return Err(ForecastError::ComputationError(
                    "conditional sum of squares did not converge to a finite value".to_string(),
                ));
            }
            result.optimal_point
        };

        let (mean, coefs) = structure.split(&params);
        let ar = coefs.expanded_ar(structure.period);
        let ma = coefs.expanded_ma(structure.period);
        let (innovations, css) = css_residuals(w, mean, &ar, &ma);

        let nobs = (w.len() - start) as f64;
        let sigma2 = css / nobs;
        let llf = -0.5 * nobs * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0);
        let n_est = (k + 1) as f64;
        let aic = -2.0 * llf + 2.0 * n_est;
        let bic = -2.0 * llf + nobs.ln() * n_est;

        let offset = plan.consumed();
        let mut fitted = vec![f64::NAN; values.len()];
        let mut residuals = vec![f64::NAN; values.len()];
        for (t, e) in innovations.iter().enumerate().skip(start) {
            residuals[t + offset] = *e;
            fitted[t + offset] = values[t + offset] - e;
        }

        Ok(Self {
            plan,
            history: values.to_vec(),
            differenced,
            params,
            mean,
            ar,
            ma,
            innovations,
            fitted,
            residuals,
            sigma2,
            aic,
            bic,
        })
    }

    pub fn forecast(&self, horizon: usize) -> Result<Forecast> {
        if horizon == 0 {
            return Ok(Forecast::new());
        }
        let mut w = self.differenced.clone();
        let mut e = self.innovations.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut pred = self.mean;
            for (k, a) in self.ar.iter().enumerate() {
                pred += a * (w[t - 1 - k] - self.mean);
            }
            for (k, b) in self.ma.iter().enumerate().take(t) {
                pred += b * e[t - 1 - k];
            }
            w.push(pred);
            e.push(0.0);
        }
        let ahead = &w[self.differenced.len()..];
        let point = self.plan.integrate(&self.history, ahead)?;
        Ok(Forecast::from_values(point))
    }

    /// Forecast with normal intervals from the psi-weights of the integrated model.
    pub fn forecast_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {level}"
            )));
        }
        let forecast = self.forecast(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }
        let z = quantile_normal((1.0 + level) / 2.0);
        let psi = self.psi_weights(horizon);

        let mut cumulative = 0.0;
        let (lower, upper): (Vec<f64>, Vec<f64>) = forecast
            .point()
            .iter()
            .zip(&psi)
            .map(|(p, w)| {
                cumulative += w * w;
                let se = (self.sigma2 * cumulative).sqrt();
                (p - z * se, p + z * se)
            })
            .unzip();
        Forecast::from_values_with_intervals(forecast.point().to_vec(), lower, upper)
    }

    /// MA(infinity) weights of `(1 - sum a_k B^k) Delta(B) y = (1 + sum b_k B^k) e`.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let diff = self.plan.polynomial();
        let mut ar_poly = vec![1.0];
        ar_poly.extend(self.ar.iter().map(|a| -a));
        let mut full = vec![0.0; ar_poly.len() + diff.len() - 1];
        for (i, a) in ar_poly.iter().enumerate() {
            for (j, d) in diff.iter().enumerate() {
                full[i + j] += a * d;
            }
        }
        let phi: Vec<f64> = full[1..].iter().map(|c| -c).collect();

        let mut psi = vec![1.0];
        for j in 1..horizon {
            let mut value = self.ma.get(j - 1).copied().unwrap_or(0.0);
            for (k, p) in phi.iter().enumerate().take(j) {
                value += p * psi[j - 1 - k];
            }
            psi.push(value);
        }
        psi
    }
}
