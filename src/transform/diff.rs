//! Ordinary and seasonal differencing, and its inverse.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Difference `values` `order` times at lag 1.
///
/// The result has `values.len() - order` entries.
pub fn difference_values(values: &[f64], order: usize) -> Result<Vec<f64>> {
    lagged_difference(values, 1, order)
}

/// Difference `values` `order` times at lag `period`.
///
/// The result has `values.len() - period * order` entries.
pub fn seasonal_difference_values(values: &[f64], period: usize, order: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(ForecastError::InvalidParameter(
            "seasonal period must be positive".to_string(),
        ));
    }
    lagged_difference(values, period, order)
}

fn lagged_difference(values: &[f64], lag: usize, order: usize) -> Result<Vec<f64>> {
    let consumed = lag * order;
    if order > 0 && consumed >= values.len() {
        return Err(ForecastError::InsufficientData {
            needed: consumed + 1,
            got: values.len(),
        });
    }
    let mut out = values.to_vec();
    for _ in 0..order {
        out = out[lag..]
            .iter()
            .zip(&out[..out.len() - lag])
            .map(|(cur, prev)| cur - prev)
            .collect();
    }
    Ok(out)
}

/// The `order`-th difference of a series.
///
/// Differencing consumes observations: the first `order` timestamps are
/// dropped so each value stays aligned with the later of the two
/// observations it was computed from. `order == 0` returns the input.
///
/// # Errors
/// [`ForecastError::InsufficientData`] when `order >= series.len()`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use usercast::core::TimeSeries;
/// use usercast::transform::difference;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let ts = (0..4).map(|i| start + Duration::days(i)).collect();
/// let series = TimeSeries::univariate(ts, vec![1.0, 4.0, 9.0, 16.0]).unwrap();
///
/// let diffed = difference(&series, 1).unwrap();
/// assert_eq!(diffed.values(), &[3.0, 5.0, 7.0]);
/// assert_eq!(diffed.first_timestamp(), Some(start + Duration::days(1)));
/// ```
pub fn difference(series: &TimeSeries, order: usize) -> Result<TimeSeries> {
    if order == 0 {
        return Ok(series.clone());
    }
    let values = difference_values(series.values(), order)?;
    series.slice(order, series.len())?.with_values(values)
}

/// Seasonal difference at lag `period`, applied `order` times.
///
/// The first `period * order` timestamps are dropped.
pub fn seasonal_difference(series: &TimeSeries, period: usize, order: usize) -> Result<TimeSeries> {
    if order == 0 {
        return Ok(series.clone());
    }
    let values = seasonal_difference_values(series.values(), period, order)?;
    series
        .slice(period * order, series.len())?
        .with_values(values)
}

/// Ordered sequence of lag operators `(1 - B^lag)` applied to a series.
///
/// Models difference their input with a plan before estimation and use the
/// same plan to bring forecasts back to the original scale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DifferencingPlan {
    lags: Vec<usize>,
}

impl DifferencingPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// `d` ordinary differences followed by `seasonal_d` differences at `period`.
    pub fn arima(d: usize, seasonal_d: usize, period: usize) -> Self {
        let mut lags = vec![1; d];
        if period > 0 {
            lags.extend(std::iter::repeat(period).take(seasonal_d));
        }
        Self { lags }
    }

    pub fn then(mut self, lag: usize) -> Self {
        self.lags.push(lag);
        self
    }

    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    /// Number of leading observations consumed by [`apply`](Self::apply).
    pub fn consumed(&self) -> usize {
        self.lags.iter().sum()
    }

    /// Difference `values` by every stage in order.
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>> {
        self.levels(values)
            .map(|mut levels| levels.pop().unwrap_or_default())
    }

    /// Map forecasts of the differenced series back to the original scale.
    ///
    /// `history` is the undifferenced series the forecasts continue.
    pub fn integrate(&self, history: &[f64], forecasts: &[f64]) -> Result<Vec<f64>> {
        let levels = self.levels(history)?;
        let mut current = forecasts.to_vec();
        for (stage, &lag) in self.lags.iter().enumerate().rev() {
            let mut extended = levels[stage].clone();
            let mut next = Vec::with_capacity(current.len());
            for f in current {
                let value = f + extended[extended.len() - lag];
                extended.push(value);
                next.push(value);
            }
            current = next;
        }
        Ok(current)
    }

    /// Coefficients of `prod (1 - B^lag)`, indexed by power of `B`.
    pub fn polynomial(&self) -> Vec<f64> {
        let mut poly = vec![1.0];
        for &lag in &self.lags {
            let mut next = vec![0.0; poly.len() + lag];
            for (i, &c) in poly.iter().enumerate() {
                next[i] += c;
                next[i + lag] -= c;
            }
            poly = next;
        }
        poly
    }

    /// The series after each stage, starting with the input itself.
    fn levels(&self, values: &[f64]) -> Result<Vec<Vec<f64>>> {
        let mut levels = Vec::with_capacity(self.lags.len() + 1);
        levels.push(values.to_vec());
        for &lag in &self.lags {
            let prev = &levels[levels.len() - 1];
            let next = lagged_difference(prev, lag, 1)?;
            levels.push(next);
        }
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn daily(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ts = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        TimeSeries::univariate(ts, values).unwrap()
    }

    #[test]
    fn difference_order_zero_is_identity() {
        let series = daily(vec![3.0, 1.0, 4.0]);
        assert_eq!(difference(&series, 0).unwrap(), series);
    }

    #[test]
    fn second_difference_of_quadratic_is_constant() {
        let series = daily((0..6).map(|i| (i * i) as f64).collect());
        let d2 = difference(&series, 2).unwrap();
        assert_eq!(d2.len(), 4);
        assert!(d2.values().iter().all(|&v| (v - 2.0).abs() < 1e-12));
        assert_eq!(d2.timestamps()[0], series.timestamps()[2]);
    }

    #[test]
    fn difference_needs_enough_observations() {
        let series = daily(vec![1.0, 2.0]);
        assert!(matches!(
            difference(&series, 2),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn seasonal_difference_removes_pattern() {
        let pattern = [1.0, 5.0, 3.0];
        let values: Vec<f64> = (0..9).map(|i| pattern[i % 3] + i as f64).collect();
        let series = daily(values);

        let sd = seasonal_difference(&series, 3, 1).unwrap();

        assert_eq!(sd.len(), 6);
        assert!(sd.values().iter().all(|&v| (v - 3.0).abs() < 1e-12));
        assert!(matches!(
            seasonal_difference_values(&[1.0, 2.0], 0, 1),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn plan_integrates_its_own_differences() {
        let values: Vec<f64> = (0..30)
            .map(|i| 10.0 + 0.5 * i as f64 + [0.0, 2.0, -1.0, 1.0][i % 4])
            .collect();
        let plan = DifferencingPlan::arima(1, 1, 4);
        let (history, future) = values.split_at(24);

        let mut full = history.to_vec();
        full.extend_from_slice(future);
        let diffed = plan.apply(&full).unwrap();
        let future_diffs = &diffed[diffed.len() - future.len()..];

        let restored = plan.integrate(history, future_diffs).unwrap();
        for (r, f) in restored.iter().zip(future) {
            assert_relative_eq!(r, f, epsilon = 1e-10);
        }
        assert_eq!(plan.consumed(), 5);
    }

    #[test]
    fn plan_polynomial_expands_product() {
        // (1 - B)(1 - B^2) = 1 - B - B^2 + B^3
        let plan = DifferencingPlan::new().then(1).then(2);
        assert_eq!(plan.polynomial(), vec![1.0, -1.0, -1.0, 1.0]);
        assert_eq!(DifferencingPlan::new().polynomial(), vec![1.0]);
    }

    #[test]
    fn empty_plan_is_identity() {
        let plan = DifferencingPlan::new();
        assert!(plan.is_empty());
        assert_eq!(plan.apply(&[1.0, 2.0]).unwrap(), vec![1.0, 2.0]);
        assert_eq!(plan.integrate(&[1.0], &[5.0]).unwrap(), vec![5.0]);
    }
}
