//! Correlation analysis for time series.
//!
//! # Example
//!
//! ```
//! use usercast::features::{acf, pacf};
//!
//! let series: Vec<f64> = (0..60).map(|i| ((i * 7) % 11) as f64).collect();
//!
//! let r = acf(&series, 12).unwrap();
//! assert_eq!(r[0], 1.0);
//!
//! let p = pacf(&series, 12).unwrap();
//! assert_eq!(p.len(), 13);
//! ```

pub mod autocorrelation;

pub use autocorrelation::{acf, pacf};
