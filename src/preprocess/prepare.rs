//! One-call preparation: load, regularize, fill.

use crate::core::{Frequency, TimeSeries};
use crate::error::Result;
use crate::io::{load_csv, LoadOptions};
use crate::preprocess::{ensure_datetime_index, fill_missing, FillMethod};
use std::path::Path;
use tracing::info;

/// Load a CSV source and return a gap-free series without missing values.
///
/// Gaps introduced by regularizing the index are filled with `fill`.
pub fn prepare(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    fill: FillMethod,
) -> Result<TimeSeries> {
    let raw = load_csv(path, options)?;
    prepare_series(&raw, options.frequency, fill)
}

/// In-memory counterpart of [`prepare`].
pub fn prepare_series(
    series: &TimeSeries,
    frequency: Option<Frequency>,
    fill: FillMethod,
) -> Result<TimeSeries> {
    let regular = ensure_datetime_index(series, frequency)?;
    let gaps = regular.missing_count();
    let filled = fill_missing(&regular, fill)?;
    info!(
        observations = filled.len(),
        filled = gaps,
        method = %fill,
        frequency = ?filled.frequency(),
        "prepared series"
    );
    Ok(filled)
}
