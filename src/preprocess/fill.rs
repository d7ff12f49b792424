//! Missing-value imputation.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::utils::stats::{nan_mean, nan_median};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy used by [`fill_missing`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FillMethod {
    /// Carry the last observation forward.
    #[default]
    ForwardFill,
    /// Carry the next observation backward.
    BackwardFill,
    /// Forward fill, then backward fill whatever leads the series.
    ForwardBackward,
    /// Linear interpolation between the neighbouring observations.
    Linear,
    Mean,
    Median,
    Zero,
    Value(f64),
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMethod::ForwardFill => f.write_str("ffill"),
            FillMethod::BackwardFill => f.write_str("bfill"),
            FillMethod::ForwardBackward => f.write_str("ffill+bfill"),
            FillMethod::Linear => f.write_str("linear"),
            FillMethod::Mean => f.write_str("mean"),
            FillMethod::Median => f.write_str("median"),
            FillMethod::Zero => f.write_str("zero"),
            FillMethod::Value(v) => write!(f, "value({})", v),
        }
    }
}

/// Replace missing (non-finite) values according to `method`.
///
/// Observed values are never modified.
///
/// # Errors
/// * [`ForecastError::UnresolvedGap`] when the method cannot reach a gap at
///   the edge of the series: a leading gap for forward fill, a trailing gap
///   for backward fill, either for linear interpolation.
/// * [`ForecastError::MissingValues`] when every value is missing and the
///   method needs at least one observation.
/// * [`ForecastError::InvalidParameter`] for a non-finite `Value` fill.
pub fn fill_missing(series: &TimeSeries, method: FillMethod) -> Result<TimeSeries> {
    let mut values = series.values().to_vec();
    if !values.iter().any(|v| !v.is_finite()) {
        return Ok(series.clone());
    }

    let observed = values.iter().filter(|v| v.is_finite()).count();
    let needs_observation = !matches!(method, FillMethod::Zero | FillMethod::Value(_));
    if observed == 0 && needs_observation {
        return Err(ForecastError::MissingValues);
    }

    match method {
        FillMethod::ForwardFill => {
            check_leading(&values, method)?;
            forward_fill(&mut values);
        }
        FillMethod::BackwardFill => {
            check_trailing(&values, method)?;
            backward_fill(&mut values);
        }
        FillMethod::ForwardBackward => {
            forward_fill(&mut values);
            backward_fill(&mut values);
        }
        FillMethod::Linear => {
            check_leading(&values, method)?;
            check_trailing(&values, method)?;
            interpolate(&mut values);
        }
        FillMethod::Mean => replace_missing(&mut values, nan_mean(series.values())),
        FillMethod::Median => replace_missing(&mut values, nan_median(series.values())),
        FillMethod::Zero => replace_missing(&mut values, 0.0),
        FillMethod::Value(v) => {
            if !v.is_finite() {
                return Err(ForecastError::InvalidParameter(format!(
                    "fill value must be finite, got {}",
                    v
                )));
            }
            replace_missing(&mut values, v);
        }
    }

    series.with_values(values)
}

fn check_leading(values: &[f64], method: FillMethod) -> Result<()> {
    if values.first().is_some_and(|v| !v.is_finite()) {
        return Err(ForecastError::UnresolvedGap {
            position: 0,
            method: method.to_string(),
        });
    }
    Ok(())
}

fn check_trailing(values: &[f64], method: FillMethod) -> Result<()> {
    if values.last().is_some_and(|v| !v.is_finite()) {
        let start = values
            .iter()
            .rposition(|v| v.is_finite())
            .map_or(0, |i| i + 1);
        return Err(ForecastError::UnresolvedGap {
            position: start,
            method: method.to_string(),
        });
    }
    Ok(())
}

fn forward_fill(values: &mut [f64]) {
    let mut last = None;
    for v in values.iter_mut() {
        if v.is_finite() {
            last = Some(*v);
        } else if let Some(prev) = last {
            *v = prev;
        }
    }
}

fn backward_fill(values: &mut [f64]) {
    let mut next = None;
    for v in values.iter_mut().rev() {
        if v.is_finite() {
            next = Some(*v);
        } else if let Some(following) = next {
            *v = following;
        }
    }
}

/// Interpolate interior gaps linearly by position. Edges must be observed.
fn interpolate(values: &mut [f64]) {
    let mut left: Option<usize> = None;
    for i in 0..values.len() {
        if !values[i].is_finite() {
            continue;
        }
        if let Some(l) = left {
            let span = (i - l) as f64;
            for j in (l + 1)..i {
                let w = (j - l) as f64 / span;
                values[j] = values[l] + w * (values[i] - values[l]);
            }
        }
        left = Some(i);
    }
}

fn replace_missing(values: &mut [f64], fill: f64) {
    values
        .iter_mut()
        .filter(|v| !v.is_finite())
        .for_each(|v| *v = fill);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let ts = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        TimeSeries::univariate(ts, values).unwrap()
    }

    #[test]
    fn forward_fill_middle_gap() {
        let s = series(vec![1.0, f64::NAN, f64::NAN, 4.0]);
        let filled = fill_missing(&s, FillMethod::ForwardFill).unwrap();
        assert_eq!(filled.values(), &[1.0, 1.0, 1.0, 4.0]);
    }

    #[test]
    fn forward_fill_rejects_leading_gap() {
        let s = series(vec![f64::NAN, 2.0, 3.0]);
        let err = fill_missing(&s, FillMethod::ForwardFill).unwrap_err();
        assert_eq!(
            err,
            ForecastError::UnresolvedGap {
                position: 0,
                method: "ffill".to_string()
            }
        );
    }

    #[test]
    fn backward_fill_rejects_trailing_gap() {
        let s = series(vec![1.0, 2.0, f64::NAN, f64::NAN]);
        let err = fill_missing(&s, FillMethod::BackwardFill).unwrap_err();
        assert!(matches!(err, ForecastError::UnresolvedGap { position: 2, .. }));

        let s = series(vec![f64::NAN, 2.0, f64::NAN, 4.0]);
        let filled = fill_missing(&s, FillMethod::BackwardFill).unwrap();
        assert_eq!(filled.values(), &[2.0, 2.0, 4.0, 4.0]);
    }

    #[test]
    fn forward_backward_covers_both_edges() {
        let s = series(vec![f64::NAN, 2.0, f64::NAN, 4.0, f64::NAN]);
        let filled = fill_missing(&s, FillMethod::ForwardBackward).unwrap();
        assert_eq!(filled.values(), &[2.0, 2.0, 2.0, 4.0, 4.0]);
    }

    #[test]
    fn linear_interpolates_interior() {
        let s = series(vec![1.0, f64::NAN, f64::NAN, 4.0]);
        let filled = fill_missing(&s, FillMethod::Linear).unwrap();
        assert_relative_eq!(filled.values()[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(filled.values()[2], 3.0, epsilon = 1e-12);

        let edge = series(vec![1.0, 2.0, f64::NAN]);
        assert!(matches!(
            fill_missing(&edge, FillMethod::Linear),
            Err(ForecastError::UnresolvedGap { .. })
        ));
    }

    #[test]
    fn statistic_fills() {
        let s = series(vec![1.0, f64::NAN, 3.0, 8.0]);
        assert_relative_eq!(
            fill_missing(&s, FillMethod::Mean).unwrap().values()[1],
            4.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            fill_missing(&s, FillMethod::Median).unwrap().values()[1],
            3.0,
            epsilon = 1e-12
        );
        assert_eq!(fill_missing(&s, FillMethod::Zero).unwrap().values()[1], 0.0);
        assert_eq!(
            fill_missing(&s, FillMethod::Value(-1.0)).unwrap().values()[1],
            -1.0
        );
    }

    #[test]
    fn all_missing_series() {
        let s = series(vec![f64::NAN, f64::NAN]);
        assert!(matches!(
            fill_missing(&s, FillMethod::Mean),
            Err(ForecastError::MissingValues)
        ));
        assert!(matches!(
            fill_missing(&s, FillMethod::ForwardFill),
            Err(ForecastError::MissingValues)
        ));
        assert_eq!(
            fill_missing(&s, FillMethod::Zero).unwrap().values(),
            &[0.0, 0.0]
        );
    }

    #[test]
    fn non_finite_fill_value_is_rejected() {
        let s = series(vec![1.0, f64::NAN]);
        assert!(matches!(
            fill_missing(&s, FillMethod::Value(f64::NAN)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn complete_series_is_untouched() {
        let s = series(vec![1.0, 2.0, 3.0]);
        assert_eq!(fill_missing(&s, FillMethod::Linear).unwrap(), s);
    }
}
