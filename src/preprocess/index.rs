//! Regularizing a series onto a gap-free datetime grid.

use crate::core::{Frequency, TimeSeries};
use crate::error::{ForecastError, Result};
use tracing::{debug, warn};

/// Conform `series` to the regular grid of `freq` starting at its first timestamp.
///
/// Grid points without an observation become `NaN`. Observations that fall
/// between grid points are dropped.
pub fn asfreq(series: &TimeSeries, freq: Frequency) -> Result<TimeSeries> {
    let (Some(start), Some(end)) = (series.first_timestamp(), series.last_timestamp()) else {
        let mut empty = series.clone();
        empty.set_frequency(freq);
        return Ok(empty);
    };

    let grid = freq.grid(start, end);
    let mut values = Vec::with_capacity(grid.len());
    let mut obs = series.iter().peekable();
    let mut off_grid = 0usize;

    for ts in &grid {
        while obs.next_if(|(t, _)| t < ts).is_some() {
            off_grid += 1;
        }
        match obs.next_if(|(t, _)| t == ts) {
            Some((_, v)) => values.push(v),
            None => values.push(f64::NAN),
        }
    }
    off_grid += obs.count();

    if off_grid > 0 {
        warn!(frequency = %freq, dropped = off_grid, "dropped off-grid observations");
    }
    let inserted = values.iter().filter(|v| v.is_nan()).count();
    debug!(frequency = %freq, grid = grid.len(), missing = inserted, "regularized index");

    let mut out = TimeSeries::builder()
        .timestamps(grid)
        .values(values)
        .index_name(series.index_name())
        .frequency(freq);
    if let Some(name) = series.name() {
        out = out.name(name);
    }
    out.build()
}

/// Return `series` on a regular datetime index.
///
/// Uses `freq` if given, else the frequency already attached to the series,
/// else one inferred from the timestamps.
///
/// # Errors
/// [`ForecastError::FrequencyInference`] when no frequency is given and the
/// spacing is too irregular to infer one.
pub fn ensure_datetime_index(series: &TimeSeries, freq: Option<Frequency>) -> Result<TimeSeries> {
    if series.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let freq = match freq.or(series.frequency()) {
        Some(f) => f,
        None => {
            let inferred = series.infer_frequency(0.5)?;
            debug!(frequency = %inferred, "inferred frequency");
            inferred
        }
    };
    asfreq(series, freq)
}
