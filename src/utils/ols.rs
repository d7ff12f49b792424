//! Ordinary least squares with inference statistics.
//!
//! Used by the unit-root tests, which need coefficient standard errors and
//! information criteria rather than just point estimates.

use crate::error::{ForecastError, Result};

/// Fitted OLS regression `y = X beta + e`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
    /// Gaussian log-likelihood.
    pub llf: f64,
}

impl OlsFit {
    /// Number of estimated coefficients.
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t-ratio of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.llf + 2.0 * self.num_params() as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.llf + (self.nobs as f64).ln() * self.num_params() as f64
    }
}

/// Fit OLS given the design matrix as rows of regressors.
///
/// Solves the normal equations by Cholesky decomposition and derives the
/// coefficient covariance `s^2 (X'X)^-1` with `s^2 = ssr / (n - k)`.
pub fn ols(y: &[f64], rows: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    if rows.len() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: rows.len(),
        });
    }
    let k = rows.first().map(Vec::len).unwrap_or(0);
    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "design matrix has no columns".into(),
        ));
    }
    if n <= k {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &yi) in rows.iter().zip(y) {
        if row.len() != k {
            return Err(ForecastError::DimensionMismatch {
                expected: k,
                got: row.len(),
            });
        }
        for i in 0..k {
            xty[i] += row[i] * yi;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        ForecastError::ComputationError("OLS design matrix is singular".into())
    })?;
    let beta = chol.solve(&xty);

    let ssr: f64 = rows
        .iter()
        .zip(y)
        .map(|(row, yi)| {
            let fitted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
            (yi - fitted).powi(2)
        })
        .sum();

    let sigma2 = ssr / (n - k) as f64;
    let std_errors = (0..k)
        .map(|i| {
            let mut unit = vec![0.0; k];
            unit[i] = 1.0;
            (sigma2 * chol.solve(&unit)[i]).sqrt()
        })
        .collect();

    let nf = n as f64;
    let llf = -nf / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nf).ln() + 1.0);

    Ok(OlsFit {
        coefficients: beta,
        std_errors,
        ssr,
        nobs: n,
        llf,
    })
}

/// Lower-triangular Cholesky factor `A = L L'`.
struct Cholesky {
    l: Vec<Vec<f64>>,
}

fn cholesky(a: &[Vec<f64>]) -> Option<Cholesky> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 1e-12 * a[i][i].abs().max(1e-300) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(Cholesky { l })
}

impl Cholesky {
    fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = b.len();
        let l = &self.l;

        let mut z = vec![0.0; n];
        for i in 0..n {
            let sum: f64 = (0..i).map(|j| l[i][j] * z[j]).sum();
            z[i] = (b[i] - sum) / l[i][i];
        }

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let sum: f64 = ((i + 1)..n).map(|j| l[j][i] * x[j]).sum();
            x[i] = (z[i] - sum) / l[i][i];
        }
        x
    }
}
