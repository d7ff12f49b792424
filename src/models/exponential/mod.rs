//! Exponential smoothing models.
//!
//! Holt-Winters with optional additive trend and additive or multiplicative
//! seasonality. Simple exponential smoothing and Holt's linear method are the
//! special cases without seasonality.

mod holt_winters;

pub use holt_winters::{HoltWinters, SeasonalType, TrendType};
