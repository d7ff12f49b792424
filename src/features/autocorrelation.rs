//! Sample autocorrelation and partial autocorrelation functions.
//!
//! Missing values are dropped before estimation.

use crate::error::{ForecastError, Result};

/// Sample autocorrelation for lags `0..=nlags`.
///
/// Uses the biased autocovariance estimator (divisor `n`), so the sequence
/// is positive semi-definite. The first entry is always `1.0`.
///
/// # Errors
/// `nlags >= n` gives [`ForecastError::InvalidParameter`]; a constant
/// series gives [`ForecastError::ComputationError`].
pub fn acf(values: &[f64], nlags: usize) -> Result<Vec<f64>> {
    let x = observed(values)?;
    if nlags >= x.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "nlags must be below the number of observations ({}), got {}",
            x.len(),
            nlags
        )));
    }
    let acov = autocovariance(&x, nlags);
    if acov[0] <= 0.0 {
        return Err(ForecastError::ComputationError(
            "autocorrelation undefined for a constant series".to_string(),
        ));
    }
    Ok(acov.iter().map(|c| c / acov[0]).collect())
}

/// Partial autocorrelation for lags `0..=nlags`.
///
/// Solves the Yule-Walker equations with the Durbin-Levinson recursion on
/// the biased autocovariances.
///
/// # Errors
/// `nlags` must be below `n / 2`.
pub fn pacf(values: &[f64], nlags: usize) -> Result<Vec<f64>> {
    let n = values.iter().filter(|v| v.is_finite()).count();
    if nlags >= n / 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "nlags must be below half the number of observations ({}), got {}",
            n / 2,
            nlags
        )));
    }
    let rho = acf(values, nlags)?;
    durbin_levinson(&rho)
}

fn observed(values: &[f64]) -> Result<Vec<f64>> {
    let x: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if x.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    Ok(x)
}

fn autocovariance(x: &[f64], nlags: usize) -> Vec<f64> {
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let centered: Vec<f64> = x.iter().map(|v| v - mean).collect();
    (0..=nlags)
        .map(|k| {
            centered[k..]
                .iter()
                .zip(&centered)
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n
        })
        .collect()
}

fn durbin_levinson(rho: &[f64]) -> Result<Vec<f64>> {
    let nlags = rho.len() - 1;
    let mut out = vec![1.0];
    if nlags == 0 {
        return Ok(out);
    }

    let mut phi = vec![rho[1]];
    let mut sigma = 1.0 - rho[1] * rho[1];
    out.push(rho[1]);

    for k in 2..=nlags {
        if sigma.abs() < 1e-12 {
            return Err(ForecastError::ComputationError(format!(
                "Durbin-Levinson recursion broke down at lag {k}"
            )));
        }
        let num = rho[k]
            - phi
                .iter()
                .enumerate()
                .map(|(j, p)| p * rho[k - 1 - j])
                .sum::<f64>();
        let kappa = num / sigma;

        let prev = phi.clone();
        for j in 0..prev.len() {
            phi[j] = prev[j] - kappa * prev[prev.len() - 1 - j];
        }
        phi.push(kappa);
        sigma *= 1.0 - kappa * kappa;
        out.push(kappa);
    }
    Ok(out)
}
