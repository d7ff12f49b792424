//! Forecasting models.
//!
//! ARIMA/SARIMA estimated by conditional sum of squares and Holt-Winters
//! exponential smoothing, all behind the [`Forecaster`] trait.

mod traits;

pub mod arima;
pub mod exponential;

pub use arima::{ARIMASpec, SeasonalSpec, ARIMA, SARIMA};
pub use exponential::{HoltWinters, SeasonalType, TrendType};
pub use traits::{BoxedForecaster, Forecaster};
