//! Loading a univariate series from delimited text.

use crate::core::{Frequency, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::io::dates::parse_timestamp;
use crate::preprocess::asfreq;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Column selector: zero-based position or header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "{}", i),
            ColumnRef::Name(name) => f.write_str(name),
        }
    }
}

/// How repeated timestamps are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Reject the source.
    #[default]
    Error,
    KeepFirst,
    KeepLast,
    /// Average the finite values sharing a timestamp.
    Mean,
}

/// Options for [`load_csv`] and [`read_csv`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Column holding the dates.
    pub date_col: ColumnRef,
    /// Column holding the observations.
    pub value_col: ColumnRef,
    /// Whether the first record is a header.
    pub has_header: bool,
    /// Column names; required when `has_header` is false, overrides the header otherwise.
    pub column_names: Option<Vec<String>>,
    /// strftime pattern for the date column.
    pub date_format: Option<String>,
    /// Regularize the index to this frequency after loading.
    pub frequency: Option<Frequency>,
    /// Drop rows whose value is missing.
    pub dropna: bool,
    /// Sort rows by timestamp.
    pub sort_index: bool,
    pub duplicates: DuplicatePolicy,
    /// Name of the datetime index; defaults to the date column's name.
    pub index_name: Option<String>,
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            date_col: ColumnRef::Index(0),
            value_col: ColumnRef::Index(1),
            has_header: true,
            column_names: None,
            date_format: None,
            frequency: None,
            dropna: true,
            sort_index: true,
            duplicates: DuplicatePolicy::Error,
            index_name: None,
            delimiter: b',',
        }
    }
}

impl LoadOptions {
    /// Select the date and value columns.
    pub fn with_columns(mut self, date: impl Into<ColumnRef>, value: impl Into<ColumnRef>) -> Self {
        self.date_col = date.into();
        self.value_col = value.into();
        self
    }

    /// Read a headerless source, naming its columns.
    pub fn without_header<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.has_header = false;
        self.column_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn keep_missing(mut self) -> Self {
        self.dropna = false;
        self
    }

    pub fn unsorted(mut self) -> Self {
        self.sort_index = false;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Load a series from a CSV file.
///
/// # Errors
/// * [`ForecastError::FileNotFound`] when `path` does not exist.
/// * [`ForecastError::MissingColumn`] for an unknown column.
/// * [`ForecastError::DateParse`] for a date cell that cannot be parsed.
/// * [`ForecastError::TimestampError`] for duplicate timestamps under
///   [`DuplicatePolicy::Error`], or an unsorted index when sorting is disabled.
///
/// # Example
/// ```no_run
/// use usercast::io::{load_csv, LoadOptions};
/// use usercast::core::Frequency;
///
/// let options = LoadOptions::default()
///     .with_columns("date", "active_users")
///     .with_frequency(Frequency::Monthly);
/// let series = load_csv("data/active_users.csv", &options)?;
/// # Ok::<(), usercast::ForecastError>(())
/// ```
pub fn load_csv(path: impl AsRef<Path>, options: &LoadOptions) -> Result<TimeSeries> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ForecastError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let series = read_csv(file, options)?;
    info!(
        path = %path.display(),
        rows = series.len(),
        missing = series.missing_count(),
        "loaded series"
    );
    Ok(series)
}

/// Load a series from any CSV reader. See [`load_csv`].
pub fn read_csv<R: Read>(reader: R, options: &LoadOptions) -> Result<TimeSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = match (&options.column_names, options.has_header) {
        (Some(names), _) => {
            if options.has_header {
                // Consume the header row; explicit names take precedence.
                rdr.headers()?;
            }
            names.clone()
        }
        (None, true) => rdr.headers()?.iter().map(str::to_string).collect(),
        (None, false) => {
            return Err(ForecastError::InvalidParameter(
                "column_names are required when the source has no header".to_string(),
            ))
        }
    };

    let date_idx = resolve_column(&options.date_col, &columns)?;
    let value_idx = resolve_column(&options.value_col, &columns)?;
    debug!(
        date_column = %columns[date_idx],
        value_column = %columns[value_idx],
        "resolved columns"
    );

    let mut rows: Vec<(DateTime<Utc>, f64)> = Vec::new();
    let mut coerced = 0usize;
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let date_cell = record.get(date_idx).unwrap_or("");
        let ts = parse_timestamp(date_cell, options.date_format.as_deref()).ok_or_else(|| {
            ForecastError::DateParse {
                row,
                value: date_cell.to_string(),
            }
        })?;

        let value_cell = record.get(value_idx).unwrap_or("");
        let value = match parse_value(value_cell) {
            Some(v) => v,
            None => {
                coerced += 1;
                f64::NAN
            }
        };
        rows.push((ts, value));
    }

    if coerced > 0 {
        warn!(
            column = %columns[value_idx],
            count = coerced,
            "coerced unparseable values to missing"
        );
    }

    if options.dropna {
        let before = rows.len();
        rows.retain(|(_, v)| v.is_finite());
        if rows.len() < before {
            debug!(dropped = before - rows.len(), "dropped rows with missing values");
        }
    }

    if rows.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    if options.sort_index {
        rows.sort_by_key(|(ts, _)| *ts);
    }
    let rows = collapse_duplicates(rows, options.duplicates)?;

    let (timestamps, values): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let index_name = options
        .index_name
        .clone()
        .unwrap_or_else(|| columns[date_idx].clone());
    let mut series = TimeSeries::builder()
        .timestamps(timestamps)
        .values(values)
        .name(columns[value_idx].clone())
        .index_name(index_name)
        .build()?;

    if let Some(freq) = options.frequency {
        series = asfreq(&series, freq)?;
    }

    Ok(series)
}

fn resolve_column(column: &ColumnRef, available: &[String]) -> Result<usize> {
    let found = match column {
        ColumnRef::Index(i) => (*i < available.len()).then_some(*i),
        ColumnRef::Name(name) => available.iter().position(|c| c == name),
    };
    found.ok_or_else(|| ForecastError::MissingColumn {
        column: column.to_string(),
        available: available.to_vec(),
    })
}

/// Parse a numeric cell. Explicit missing markers map to `NaN`; `None` means
/// the cell held something that is not a number.
fn parse_value(cell: &str) -> Option<f64> {
    match cell {
        "" | "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL" | "None" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

fn collapse_duplicates(
    rows: Vec<(DateTime<Utc>, f64)>,
    policy: DuplicatePolicy,
) -> Result<Vec<(DateTime<Utc>, f64)>> {
    let mut out: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(rows.len());
    // Running (sum, count) of finite values for the current timestamp.
    let mut acc = (0.0, 0usize);

    for (ts, value) in rows {
        match out.last_mut() {
            Some(last) if last.0 == ts => match policy {
                DuplicatePolicy::Error => {
                    return Err(ForecastError::TimestampError(format!(
                        "duplicate timestamp {}",
                        ts
                    )))
                }
                DuplicatePolicy::KeepFirst => {}
                DuplicatePolicy::KeepLast => last.1 = value,
                DuplicatePolicy::Mean => {
                    if value.is_finite() {
                        acc = (acc.0 + value, acc.1 + 1);
                    }
                    last.1 = if acc.1 > 0 {
                        acc.0 / acc.1 as f64
                    } else {
                        f64::NAN
                    };
                }
            },
            _ => {
                acc = if value.is_finite() { (value, 1) } else { (0.0, 0) };
                out.push((ts, value));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn reads_header_and_names_series() {
        let data = "date,users\n2023-01-01,10\n2023-01-02,12\n2023-01-03,11\n";
        let series = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.name(), Some("users"));
        assert_eq!(series.index_name(), "date");
        assert_eq!(series.values(), &[10.0, 12.0, 11.0]);
        assert_eq!(series.timestamps()[0], ymd(2023, 1, 1));
    }

    #[test]
    fn selects_columns_by_name() {
        let data = "id,value,day\n1,5.5,2023-02-01\n2,6.5,2023-02-02\n";
        let options = LoadOptions::default().with_columns("day", "value");
        let series = read_csv(data.as_bytes(), &options).unwrap();
        assert_eq!(series.values(), &[5.5, 6.5]);
        assert_eq!(series.index_name(), "day");
    }

    #[test]
    fn unknown_column_lists_available() {
        let data = "date,users\n2023-01-01,10\n";
        let options = LoadOptions::default().with_columns("date", "sessions");
        let err = read_csv(data.as_bytes(), &options).unwrap_err();
        match err {
            ForecastError::MissingColumn { column, available } => {
                assert_eq!(column, "sessions");
                assert_eq!(available, vec!["date".to_string(), "users".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn headerless_source_needs_names() {
        let data = "2023-01-01,10\n2023-01-02,11\n";
        let mut options = LoadOptions::default();
        options.has_header = false;
        assert!(matches!(
            read_csv(data.as_bytes(), &options),
            Err(ForecastError::InvalidParameter(_))
        ));

        let options = LoadOptions::default().without_header(["ds", "y"]);
        let series = read_csv(data.as_bytes(), &options).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.name(), Some("y"));
    }

    #[test]
    fn bad_date_is_an_error() {
        let data = "date,users\n2023-01-01,10\nyesterday,12\n";
        let err = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ForecastError::DateParse {
                row: 1,
                value: "yesterday".to_string()
            }
        );
    }

    #[test]
    fn unparseable_values_become_missing() {
        let data = "date,users\n2023-01-01,10\n2023-01-02,n/a?\n2023-01-03,\n2023-01-04,13\n";
        let series = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(series.len(), 2);

        let series = read_csv(data.as_bytes(), &LoadOptions::default().keep_missing()).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.missing_positions(), vec![1, 2]);
    }

    #[test]
    fn sorts_and_rejects_duplicates_by_default() {
        let data = "date,users\n2023-01-03,3\n2023-01-01,1\n2023-01-02,2\n";
        let series = read_csv(data.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);

        let unsorted = read_csv(data.as_bytes(), &LoadOptions::default().unsorted());
        assert!(matches!(unsorted, Err(ForecastError::TimestampError(_))));

        let dup = "date,users\n2023-01-01,1\n2023-01-01,3\n2023-01-02,2\n";
        assert!(matches!(
            read_csv(dup.as_bytes(), &LoadOptions::default()),
            Err(ForecastError::TimestampError(_))
        ));
    }

    #[test]
    fn duplicate_policies() {
        let dup = "date,users\n2023-01-01,1\n2023-01-01,3\n2023-01-02,2\n";
        let load = |policy| {
            read_csv(dup.as_bytes(), &LoadOptions::default().with_duplicates(policy))
                .unwrap()
                .values()
                .to_vec()
        };
        assert_eq!(load(DuplicatePolicy::KeepFirst), vec![1.0, 2.0]);
        assert_eq!(load(DuplicatePolicy::KeepLast), vec![3.0, 2.0]);
        let mean = load(DuplicatePolicy::Mean);
        assert_relative_eq!(mean[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn frequency_regularizes_gaps() {
        let data = "date,users\n2023-01-01,1\n2023-01-02,2\n2023-01-04,4\n";
        let options = LoadOptions::default().with_frequency(Frequency::Daily);
        let series = read_csv(data.as_bytes(), &options).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.frequency(), Some(Frequency::Daily));
        assert!(series.values()[2].is_nan());
    }

    #[test]
    fn custom_format_and_delimiter() {
        let data = "when;count\n01/02/2023;5\n02/02/2023;6\n";
        let options = LoadOptions::default()
            .with_delimiter(b';')
            .with_date_format("%d/%m/%Y")
            .with_index_name("ds");
        let series = read_csv(data.as_bytes(), &options).unwrap();
        assert_eq!(series.timestamps()[1], ymd(2023, 2, 2));
        assert_eq!(series.index_name(), "ds");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_csv("/definitely/not/here.csv", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ForecastError::FileNotFound(_)));
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = LoadOptions::default()
            .with_columns(0, "users")
            .with_frequency(Frequency::Monthly);
        let json = serde_json::to_string(&options).unwrap();
        let back: LoadOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
