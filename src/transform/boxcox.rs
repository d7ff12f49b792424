//! Box-Cox power transformation.
//!
//! Stabilizes the variance of a strictly positive series.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

const LAMBDA_RANGE: (f64, f64) = (-2.0, 2.0);

/// Transformed values together with the lambda used.
#[derive(Debug, Clone)]
pub struct BoxCoxResult {
    pub data: Vec<f64>,
    pub lambda: f64,
}

impl BoxCoxResult {
    /// Inverse transform to recover original scale.
    pub fn inverse(&self) -> Vec<f64> {
        inv_boxcox(&self.data, self.lambda)
    }
}

/// Box-Cox transform a series.
///
/// When `lambda` is `None` it is estimated by maximizing the profile
/// log-likelihood over `[-2, 2]`. Missing values stay missing.
///
/// # Errors
/// [`ForecastError::InvalidParameter`] if any observed value is `<= 0`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use usercast::core::TimeSeries;
/// use usercast::transform::{boxcox, inv_boxcox};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let ts = (0..4).map(|i| start + Duration::days(i)).collect();
/// let series = TimeSeries::univariate(ts, vec![1.0, 10.0, 100.0, 1000.0]).unwrap();
///
/// let (transformed, lambda) = boxcox(&series, Some(0.0)).unwrap();
/// assert_eq!(lambda, 0.0);
/// let restored = inv_boxcox(transformed.values(), lambda);
/// assert!((restored[3] - 1000.0).abs() < 1e-9);
/// ```
pub fn boxcox(series: &TimeSeries, lambda: Option<f64>) -> Result<(TimeSeries, f64)> {
    let lambda = match lambda {
        Some(l) => l,
        None => boxcox_lambda(series.values())?,
    };
    let data = boxcox_values(series.values(), lambda)?;
    Ok((series.with_values(data)?, lambda))
}

/// Transform raw values with a fixed `lambda`.
///
/// `y = (x^lambda - 1) / lambda`, or `ln(x)` when `lambda == 0`.
pub fn boxcox_values(values: &[f64], lambda: f64) -> Result<Vec<f64>> {
    check_positive(values)?;
    Ok(values.iter().map(|&x| transform(x, lambda)).collect())
}

/// Transform with an estimated lambda.
pub fn boxcox_auto(values: &[f64]) -> Result<BoxCoxResult> {
    let lambda = boxcox_lambda(values)?;
    let data = boxcox_values(values, lambda)?;
    Ok(BoxCoxResult { data, lambda })
}

/// Inverse Box-Cox transformation.
///
/// Values outside the transform's range map to `NaN`.
pub fn inv_boxcox(transformed: &[f64], lambda: f64) -> Vec<f64> {
    transformed
        .iter()
        .map(|&y| {
            if lambda.abs() < 1e-10 {
                return y.exp();
            }
            let base = lambda * y + 1.0;
            if base <= 0.0 {
                f64::NAN
            } else {
                base.powf(1.0 / lambda)
            }
        })
        .collect()
}

/// Maximum likelihood estimate of lambda.
///
/// A coarse grid brackets the maximum, then golden-section search refines it.
pub fn boxcox_lambda(values: &[f64]) -> Result<f64> {
    check_positive(values)?;
    let observed: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if observed.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: observed.len(),
        });
    }

    let (lo, hi) = LAMBDA_RANGE;
    let steps = 40;
    let width = (hi - lo) / steps as f64;
    let coarse = (0..=steps)
        .map(|i| lo + width * i as f64)
        .max_by(|a, b| {
            profile_llf(&observed, *a)
                .partial_cmp(&profile_llf(&observed, *b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(1.0);

    let (mut a, mut b) = ((coarse - width).max(lo), (coarse + width).min(hi));
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    while b - a > 1e-6 {
        let c = b - ratio * (b - a);
        let d = a + ratio * (b - a);
        if profile_llf(&observed, c) >= profile_llf(&observed, d) {
            b = d;
        } else {
            a = c;
        }
    }
    Ok((a + b) / 2.0)
}

fn transform(x: f64, lambda: f64) -> f64 {
    if lambda.abs() < 1e-10 {
        x.ln()
    } else {
        (x.powf(lambda) - 1.0) / lambda
    }
}

fn check_positive(values: &[f64]) -> Result<()> {
    if let Some(pos) = values.iter().position(|&x| x.is_finite() && x <= 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Box-Cox requires strictly positive values, found {} at position {}",
            values[pos], pos
        )));
    }
    Ok(())
}

/// Profile log-likelihood of normality after transformation, up to a constant.
fn profile_llf(values: &[f64], lambda: f64) -> f64 {
    let n = values.len() as f64;
    let transformed: Vec<f64> = values.iter().map(|&x| transform(x, lambda)).collect();
    let mean = transformed.iter().sum::<f64>() / n;
    let variance = transformed.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
    if variance <= 0.0 || !variance.is_finite() {
        return f64::NEG_INFINITY;
    }
    let log_sum: f64 = values.iter().map(|x| x.ln()).sum();
    -0.5 * n * variance.ln() + (lambda - 1.0) * log_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ts = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        TimeSeries::univariate(ts, values).unwrap()
    }

    #[test]
    fn lambda_one_shifts_by_one() {
        let out = boxcox_values(&[1.0, 2.0, 3.0], 1.0).unwrap();
        assert_relative_eq!(out[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(out[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn lambda_zero_is_log() {
        let out = boxcox_values(&[1.0, std::f64::consts::E], 0.0).unwrap();
        assert_relative_eq!(out[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn inverse_restores_values() {
        let values = vec![1.5, 2.0, 7.0, 3.2, 11.0];
        for &lambda in &[-1.0, 0.0, 0.5, 2.0] {
            let restored = inv_boxcox(&boxcox_values(&values, lambda).unwrap(), lambda);
            for (r, v) in restored.iter().zip(&values) {
                assert_relative_eq!(r, v, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn rejects_non_positive_values() {
        let s = series(vec![1.0, 0.0, 2.0]);
        assert!(matches!(
            boxcox(&s, None),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(boxcox_values(&[-1.0], 0.5).is_err());
    }

    #[test]
    fn lognormal_sample_prefers_log() {
        let n = 50;
        let values: Vec<f64> = (0..n)
            .map(|i| crate::utils::quantile_normal((i as f64 + 0.5) / n as f64).exp())
            .collect();
        let (_, lambda) = boxcox(&series(values), None).unwrap();
        assert!(lambda.abs() < 0.2, "lambda = {lambda}");
    }

    #[test]
    fn estimated_lambda_stays_in_range() {
        let result = boxcox_auto(&[3.0, 1.0, 4.0, 1.5, 5.0, 9.0, 2.0, 6.0]).unwrap();
        assert!((-2.0..=2.0).contains(&result.lambda));
        let back = result.inverse();
        assert_relative_eq!(back[5], 9.0, epsilon = 1e-8);
    }

    #[test]
    fn missing_values_pass_through() {
        let (out, _) = boxcox(&series(vec![1.0, f64::NAN, 4.0]), Some(0.5)).unwrap();
        assert!(out.values()[1].is_nan());
    }
}
