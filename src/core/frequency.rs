//! Sampling frequency of a regular time index.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Regular spacing between consecutive observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Minute,
    Hourly,
    Daily,
    Weekly,
    /// Calendar months. Month-end anchors stay on month ends.
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Timestamp `k` steps after `origin`.
    ///
    /// Month-based frequencies use calendar arithmetic relative to the origin,
    /// so a grid anchored on Jan 31 visits Feb 29, Mar 31, Apr 30, ...
    pub fn step(&self, origin: DateTime<Utc>, k: u32) -> Option<DateTime<Utc>> {
        match self {
            Frequency::Minute => origin.checked_add_signed(Duration::minutes(k as i64)),
            Frequency::Hourly => origin.checked_add_signed(Duration::hours(k as i64)),
            Frequency::Daily => origin.checked_add_signed(Duration::days(k as i64)),
            Frequency::Weekly => origin.checked_add_signed(Duration::weeks(k as i64)),
            Frequency::Monthly => add_months(origin, k),
            Frequency::Quarterly => add_months(origin, k.checked_mul(3)?),
            Frequency::Yearly => add_months(origin, k.checked_mul(12)?),
        }
    }

    /// Build the regular grid covering `[start, end]`.
    pub fn grid(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut grid = Vec::new();
        let mut k = 0u32;
        while let Some(ts) = self.step(start, k) {
            if ts > end {
                break;
            }
            grid.push(ts);
            k += 1;
        }
        grid
    }

    /// Seasonal period conventionally associated with this frequency.
    pub fn default_seasonal_period(&self) -> Option<usize> {
        match self {
            Frequency::Hourly => Some(24),
            Frequency::Daily => Some(7),
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::Minute | Frequency::Yearly => None,
        }
    }

    /// Infer the frequency from the modal spacing of `timestamps`.
    ///
    /// `tolerance` is the minimum share of spacings that must agree with the mode.
    pub fn infer(timestamps: &[DateTime<Utc>], tolerance: f64) -> Result<Self> {
        if timestamps.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: timestamps.len(),
            });
        }

        let mut counts: HashMap<Frequency, usize> = HashMap::new();
        let total = timestamps.len() - 1;
        for w in timestamps.windows(2) {
            if let Some(freq) = classify_spacing(w[1] - w[0]) {
                *counts.entry(freq).or_insert(0) += 1;
            }
        }

        // Ties resolve to the finer frequency for a deterministic result.
        let (freq, count) = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.rank().cmp(&a.0.rank())))
            .ok_or_else(|| {
                ForecastError::FrequencyInference("no recognisable spacing".to_string())
            })?;

        if (count as f64) / (total as f64) < tolerance {
            return Err(ForecastError::FrequencyInference(format!(
                "modal spacing {} covers only {} of {} intervals",
                freq, count, total
            )));
        }

        Ok(freq)
    }

    fn rank(&self) -> u8 {
        match self {
            Frequency::Minute => 0,
            Frequency::Hourly => 1,
            Frequency::Daily => 2,
            Frequency::Weekly => 3,
            Frequency::Monthly => 4,
            Frequency::Quarterly => 5,
            Frequency::Yearly => 6,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alias = match self {
            Frequency::Minute => "min",
            Frequency::Hourly => "H",
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::Monthly => "M",
            Frequency::Quarterly => "Q",
            Frequency::Yearly => "Y",
        };
        f.write_str(alias)
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    /// Parse pandas-style offset aliases.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "min" | "T" => Ok(Frequency::Minute),
            "H" | "h" => Ok(Frequency::Hourly),
            "D" | "d" => Ok(Frequency::Daily),
            "W" | "w" => Ok(Frequency::Weekly),
            "M" | "MS" | "ME" | "m" => Ok(Frequency::Monthly),
            "Q" | "QS" | "QE" | "q" => Ok(Frequency::Quarterly),
            "Y" | "YS" | "YE" | "A" | "AS" | "y" => Ok(Frequency::Yearly),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown frequency alias '{}'",
                other
            ))),
        }
    }
}

fn classify_spacing(spacing: Duration) -> Option<Frequency> {
    let secs = spacing.num_seconds();
    let days = spacing.num_days();
    match secs {
        60 => Some(Frequency::Minute),
        3_600 => Some(Frequency::Hourly),
        86_400 => Some(Frequency::Daily),
        604_800 => Some(Frequency::Weekly),
        _ if (28..=31).contains(&days) => Some(Frequency::Monthly),
        _ if (89..=92).contains(&days) => Some(Frequency::Quarterly),
        _ if (365..=366).contains(&days) => Some(Frequency::Yearly),
        _ => None,
    }
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map(|next| next.month() != date.month()).unwrap_or(true)
}

fn add_months(origin: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    let shifted = origin.checked_add_months(Months::new(months))?;
    if !is_month_end(origin.date_naive()) {
        return Some(shifted);
    }
    // Snap to the end of the target month.
    let date = shifted.date_naive();
    let mut end = date;
    while let Some(next) = end.succ_opt() {
        if next.month() != date.month() {
            break;
        }
        end = next;
    }
    Some(shifted + (end - date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_pandas_aliases() {
        assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("MS".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("A".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert!("fortnight".parse::<Frequency>().is_err());
    }

    #[test]
    fn monthly_step_keeps_month_end_anchor() {
        let origin = ymd(2024, 1, 31);
        assert_eq!(Frequency::Monthly.step(origin, 1), Some(ymd(2024, 2, 29)));
        assert_eq!(Frequency::Monthly.step(origin, 2), Some(ymd(2024, 3, 31)));
        assert_eq!(Frequency::Monthly.step(origin, 3), Some(ymd(2024, 4, 30)));

        let feb_end = ymd(2023, 2, 28);
        assert_eq!(Frequency::Monthly.step(feb_end, 1), Some(ymd(2023, 3, 31)));
    }

    #[test]
    fn monthly_step_from_month_start() {
        let origin = ymd(2024, 1, 1);
        assert_eq!(Frequency::Monthly.step(origin, 13), Some(ymd(2025, 2, 1)));
        assert_eq!(Frequency::Quarterly.step(origin, 1), Some(ymd(2024, 4, 1)));
        assert_eq!(Frequency::Yearly.step(origin, 2), Some(ymd(2026, 1, 1)));
    }

    #[test]
    fn grid_is_inclusive() {
        let grid = Frequency::Daily.grid(ymd(2024, 1, 1), ymd(2024, 1, 5));
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[4], ymd(2024, 1, 5));
    }

    #[test]
    fn infers_calendar_months() {
        let ts: Vec<_> = (0..24)
            .map(|i| Frequency::Monthly.step(ymd(2022, 1, 1), i).unwrap())
            .collect();
        assert_eq!(Frequency::infer(&ts, 0.5).unwrap(), Frequency::Monthly);
    }

    #[test]
    fn infers_daily_with_gaps() {
        let mut ts: Vec<_> = (0..10)
            .map(|i| ymd(2024, 1, 1) + Duration::days(i))
            .collect();
        ts.remove(4);
        assert_eq!(Frequency::infer(&ts, 0.5).unwrap(), Frequency::Daily);
    }

    #[test]
    fn irregular_spacing_fails() {
        let ts = vec![
            ymd(2024, 1, 1),
            ymd(2024, 1, 3),
            ymd(2024, 1, 8),
            ymd(2024, 1, 20),
        ];
        assert!(matches!(
            Frequency::infer(&ts, 0.5),
            Err(ForecastError::FrequencyInference(_))
        ));
    }

    #[test]
    fn default_seasonal_periods() {
        assert_eq!(Frequency::Monthly.default_seasonal_period(), Some(12));
        assert_eq!(Frequency::Daily.default_seasonal_period(), Some(7));
        assert_eq!(Frequency::Yearly.default_seasonal_period(), None);
    }
}
