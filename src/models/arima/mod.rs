//! ARIMA and SARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - ARIMA models with various (p, d, q) specifications
//! - SARIMA models with seasonal components (P, D, Q)\[s\]
//!
//! Both are estimated by conditional sum of squares.

mod css;
mod model;

pub use model::{ARIMASpec, SeasonalSpec, ARIMA, SARIMA};
