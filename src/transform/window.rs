//! Trailing window statistics.

use crate::error::{ForecastError, Result};

/// Rolling mean over trailing windows of `window` observations.
///
/// The first `window - 1` entries are `NaN`, as is any window containing a
/// missing value.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling sample standard deviation (n - 1 denominator).
///
/// A window of one observation has no spread estimate, so every entry is `NaN`.
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<f64>> {
    rolling(values, window, |w| {
        if w.len() < 2 {
            return f64::NAN;
        }
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let ss: f64 = w.iter().map(|x| (x - mean).powi(2)).sum();
        (ss / (w.len() - 1) as f64).sqrt()
    })
}

fn rolling<F>(values: &[f64], window: usize, stat: F) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "window must be positive".to_string(),
        ));
    }
    let mut out = vec![f64::NAN; values.len()];
    if values.len() < window {
        return Ok(out);
    }
    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = stat(w);
    }
    Ok(out)
}
