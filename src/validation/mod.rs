//! Stationarity tests for time series.
//!
//! # Example
//!
//! ```
//! use usercast::validation::{adf_test, kpss_test, AdfConfig, KpssConfig};
//!
//! let series: Vec<f64> = (0..120).map(|i| ((i * 37) % 23) as f64).collect();
//!
//! // Unit-root null: a small p-value means stationary
//! let adf = adf_test(&series, &AdfConfig::default()).unwrap();
//! println!("{adf}");
//!
//! // Stationarity null: a large p-value means stationary
//! let kpss = kpss_test(&series, &KpssConfig::default()).unwrap();
//! assert!(kpss.is_stationary());
//! ```

mod adf;
mod kpss;
mod mackinnon;
mod stationarity;

pub use adf::{adf_test, AdfConfig, Autolag};
pub use kpss::{kpss_test, KpssConfig};
pub use stationarity::{
    suggest_differencing, test_stationarity, CriticalValues, Regression, StationarityAssessment,
    StationarityReport, StationarityTest, StationarityVerdict,
};
