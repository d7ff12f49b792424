//! # usercast
//!
//! Classical forecasting for a single univariate series, such as daily or
//! monthly active users.
//!
//! The pipeline runs straight through:
//! load → clean → visualize → test stationarity → difference → fit
//! candidate models → compare errors → report.
//!
//! - [`io`] and [`preprocess`]: CSV loading, regular datetime index, gap filling
//! - [`validation`]: ADF and KPSS tests, differencing suggestions
//! - [`transform`]: differencing, Box-Cox, rolling windows
//! - [`seasonality`] and [`features`]: decomposition, ACF/PACF
//! - [`models`]: ARIMA, SARIMA and Holt-Winters behind [`models::Forecaster`]
//! - [`selection`]: hold-out model search and comparison table
//! - [`plot`]: diagnostic figures (rendering behind the `plotting` feature)
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use usercast::prelude::*;
//!
//! let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
//! let timestamps = (0..80).map(|i| start + Duration::days(i)).collect();
//! let values = (0..80)
//!     .map(|i| 500.0 + 3.0 * i as f64 + 20.0 * ((i % 7) as f64 - 3.0) + ((i * 13) % 5) as f64)
//!     .collect();
//! let series = TimeSeries::univariate(timestamps, values).unwrap();
//!
//! let space = SearchSpace::default()
//!     .with_orders(0..=1, 1..=1, 0..=1)
//!     .with_seasonal(SeasonalSpace::new(7).with_orders(0..=0, 1..=1, 0..=1));
//! let comparison = ModelSearch::run(&series, &space, &SearchConfig::default()).unwrap();
//! let model = comparison.refit_best(&series).unwrap();
//! assert_eq!(model.predict(7).unwrap().horizon(), 7);
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod plot;
pub mod preprocess;
pub mod seasonality;
pub mod selection;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, Frequency, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::io::{load_csv, LoadOptions};
    pub use crate::models::{Forecaster, HoltWinters, ARIMA, SARIMA};
    pub use crate::preprocess::{fill_missing, prepare, FillMethod};
    pub use crate::seasonality::{decompose, DecomposeConfig};
    pub use crate::selection::{ModelSearch, SearchConfig, SearchSpace, SeasonalSpace};
    pub use crate::transform::difference;
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
    pub use crate::validation::{adf_test, suggest_differencing, test_stationarity, AdfConfig};
}
