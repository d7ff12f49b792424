//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Point predictions with optional prediction interval bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(
        values: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        if lower.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: values.len(),
                got: lower.len(),
            });
        }
        if upper.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: values.len(),
                got: upper.len(),
            });
        }
        Ok(Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        })
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Check every point prediction is finite.
    pub fn is_finite(&self) -> bool {
        self.point.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_from_values() {
        let f = Forecast::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(f.horizon(), 3);
        assert!(!f.has_intervals());
        assert!(f.is_finite());
    }

    #[test]
    fn forecast_with_intervals() {
        let f = Forecast::from_values_with_intervals(
            vec![1.0, 2.0],
            vec![0.5, 1.5],
            vec![1.5, 2.5],
        )
        .unwrap();
        assert!(f.has_intervals());
        assert_eq!(f.lower().unwrap(), &[0.5, 1.5]);
        assert_eq!(f.upper().unwrap(), &[1.5, 2.5]);
    }

    #[test]
    fn forecast_rejects_mismatched_bounds() {
        let result = Forecast::from_values_with_intervals(vec![1.0, 2.0], vec![0.5], vec![1.5, 2.5]);
        assert!(matches!(result, Err(ForecastError::DimensionMismatch { .. })));
    }

    #[test]
    fn empty_forecast() {
        let f = Forecast::new();
        assert!(f.is_empty());
        assert_eq!(f.horizon(), 0);
    }
}
