//! Core data structures for time series analysis.

mod forecast;
mod frequency;
mod time_series;

pub use forecast::Forecast;
pub use frequency::Frequency;
pub use time_series::{TimeSeries, TimeSeriesBuilder, DEFAULT_INDEX_NAME};
