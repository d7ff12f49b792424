//! TimeSeries data structure for a datetime-indexed univariate series.

use crate::core::Frequency;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// Default name of the datetime index.
pub const DEFAULT_INDEX_NAME: &str = "date";

/// A univariate series indexed by strictly increasing timestamps.
///
/// Missing observations are stored as `NaN` until a fill step removes them.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    name: Option<String>,
    index_name: String,
    frequency: Option<Frequency>,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    name: Option<String>,
    index_name: Option<String>,
    frequency: Option<Frequency>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn frequency(mut self, freq: Frequency) -> Self {
        self.frequency = Some(freq);
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        let mut ts = TimeSeries::univariate(self.timestamps, self.values)?;
        ts.name = self.name;
        if let Some(index_name) = self.index_name {
            ts.index_name = index_name;
        }
        ts.frequency = self.frequency;
        Ok(ts)
    }
}

impl TimeSeries {
    /// Create a series from parallel timestamp and value vectors.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(format!(
                    "timestamps must be strictly increasing ({} follows {})",
                    timestamps[i],
                    timestamps[i - 1]
                )));
            }
        }

        Ok(Self {
            timestamps,
            values,
            name: None,
            index_name: DEFAULT_INDEX_NAME.to_string(),
            frequency: None,
        })
    }

    pub fn builder() -> TimeSeriesBuilder {
        TimeSeriesBuilder::new()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn set_index_name(&mut self, index_name: impl Into<String>) {
        self.index_name = index_name.into();
    }

    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    pub fn set_frequency(&mut self, freq: Frequency) {
        self.frequency = Some(freq);
    }

    pub fn clear_frequency(&mut self) {
        self.frequency = None;
    }

    /// Replace the values while keeping the index and metadata.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
            name: self.name.clone(),
            index_name: self.index_name.clone(),
            frequency: self.frequency,
        })
    }

    /// Extract the observations in `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            name: self.name.clone(),
            index_name: self.index_name.clone(),
            frequency: self.frequency,
        })
    }

    /// Split into the first `at` observations and the remainder.
    pub fn split_at(&self, at: usize) -> Result<(TimeSeries, TimeSeries)> {
        Ok((self.slice(0, at)?, self.slice(at, self.len())?))
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Positions of missing observations.
    pub fn missing_positions(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_finite())
            .map(|(i, _)| i)
            .collect()
    }

    /// Drop observations whose value is missing.
    ///
    /// The result no longer has a regular index, so the frequency is cleared
    /// when anything was dropped.
    pub fn dropna(&self) -> TimeSeries {
        let (timestamps, values): (Vec<_>, Vec<_>) =
            self.iter().filter(|(_, v)| v.is_finite()).unzip();
        let frequency = if values.len() == self.len() {
            self.frequency
        } else {
            None
        };
        TimeSeries {
            timestamps,
            values,
            name: self.name.clone(),
            index_name: self.index_name.clone(),
            frequency,
        }
    }

    /// Infer frequency from timestamps.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Frequency> {
        Frequency::infer(&self.timestamps, tolerance)
    }

    /// Set frequency from timestamps (auto-infer).
    pub fn set_frequency_from_timestamps(&mut self) -> Result<()> {
        let freq = self.infer_frequency(0.5)?;
        self.frequency = Some(freq);
        Ok(())
    }

    /// Check that every spacing matches the frequency's grid.
    pub fn is_regular(&self) -> bool {
        let (Some(freq), Some(start)) = (self.frequency, self.first_timestamp()) else {
            return false;
        };
        self.timestamps
            .iter()
            .enumerate()
            .all(|(k, ts)| freq.step(start, k as u32) == Some(*ts))
    }
}
