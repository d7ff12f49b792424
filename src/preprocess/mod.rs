//! Cleaning a raw series into a regular, complete one.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use usercast::core::TimeSeries;
//! use usercast::preprocess::{prepare_series, FillMethod};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let ts = vec![start, start + Duration::days(1), start + Duration::days(3)];
//! let raw = TimeSeries::univariate(ts, vec![5.0, 6.0, 8.0]).unwrap();
//!
//! let clean = prepare_series(&raw, None, FillMethod::Linear).unwrap();
//! assert_eq!(clean.values(), &[5.0, 6.0, 7.0, 8.0]);
//! ```

mod fill;
mod index;
mod prepare;

pub use fill::{fill_missing, FillMethod};
pub use index::{asfreq, ensure_datetime_index};
pub use prepare::{prepare, prepare_series};
