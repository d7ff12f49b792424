//! Stationarity reports and the combined ADF/KPSS assessment.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ForecastError, Result};
use crate::transform::difference_values;
use crate::validation::{adf_test, kpss_test, AdfConfig, KpssConfig};

/// Deterministic terms included in a test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regression {
    /// No constant, no trend ("n").
    NoConstant,
    /// Constant only ("c").
    #[default]
    Constant,
    /// Constant and linear trend ("ct").
    ConstantTrend,
}

impl Regression {
    /// Number of deterministic regressors.
    pub fn num_terms(&self) -> usize {
        match self {
            Regression::NoConstant => 0,
            Regression::Constant => 1,
            Regression::ConstantTrend => 2,
        }
    }
}

impl fmt::Display for Regression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Regression::NoConstant => "n",
            Regression::Constant => "c",
            Regression::ConstantTrend => "ct",
        };
        f.write_str(code)
    }
}

/// Which test produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationarityTest {
    Adf,
    Kpss,
}

impl StationarityTest {
    fn title(&self) -> &'static str {
        match self {
            StationarityTest::Adf => "Augmented Dickey-Fuller (ADF)",
            StationarityTest::Kpss => "KPSS",
        }
    }

    fn null_hypothesis(&self) -> &'static str {
        match self {
            StationarityTest::Adf => "the series has a unit root",
            StationarityTest::Kpss => "the series is stationary",
        }
    }
}

/// Critical values of a test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// Outcome of a single stationarity test. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityReport {
    pub(crate) test: StationarityTest,
    pub(crate) regression: Regression,
    pub(crate) statistic: f64,
    pub(crate) p_value: f64,
    pub(crate) used_lag: usize,
    pub(crate) n_obs: usize,
    pub(crate) critical_values: CriticalValues,
    pub(crate) alpha: f64,
    pub(crate) is_stationary: bool,
    pub(crate) ic_best: Option<f64>,
}

impl StationarityReport {
    pub fn test(&self) -> StationarityTest {
        self.test
    }

    pub fn regression(&self) -> Regression {
        self.regression
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Lag order used (augmentation lags for ADF, bandwidth for KPSS).
    pub fn used_lag(&self) -> usize {
        self.used_lag
    }

    /// Observations entering the test regression.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    pub fn critical_values(&self) -> &CriticalValues {
        &self.critical_values
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_stationary(&self) -> bool {
        self.is_stationary
    }

    /// Best information criterion value found during automatic lag selection.
    pub fn ic_best(&self) -> Option<f64> {
        self.ic_best
    }

    fn rejects_null(&self) -> bool {
        match self.test {
            StationarityTest::Adf => self.is_stationary,
            StationarityTest::Kpss => !self.is_stationary,
        }
    }
}

impl fmt::Display for StationarityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} test ({}) ===", self.test.title(), self.regression)?;
        writeln!(f, "Test statistic: {:.4}", self.statistic)?;
        writeln!(f, "p-value: {:.4}", self.p_value)?;
        writeln!(f, "Lags used: {}", self.used_lag)?;
        writeln!(f, "Observations: {}", self.n_obs)?;
        writeln!(f, "Critical values:")?;
        writeln!(f, "  1%: {:.4}", self.critical_values.one_pct)?;
        writeln!(f, "  5%: {:.4}", self.critical_values.five_pct)?;
        writeln!(f, "  10%: {:.4}", self.critical_values.ten_pct)?;
        writeln!(f, "-------------------------------------------")?;
        let decision = if self.rejects_null() {
            "Reject H0"
        } else {
            "Fail to reject H0"
        };
        writeln!(
            f,
            "Conclusion: {} ({}) at the {} level.",
            decision,
            self.test.null_hypothesis(),
            self.alpha
        )?;
        if self.is_stationary {
            write!(f, "The series can be considered stationary.")
        } else {
            write!(f, "The series can NOT be considered stationary.")
        }
    }
}

/// Joint reading of ADF and KPSS outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationarityVerdict {
    /// Both tests point to stationarity.
    Stationary,
    /// Both tests point to a unit root.
    NonStationary,
    /// KPSS accepts stationarity but ADF cannot reject a unit root.
    /// Detrending is usually enough.
    TrendStationary,
    /// ADF rejects a unit root but KPSS rejects stationarity.
    /// Differencing is usually enough.
    DifferenceStationary,
}

impl StationarityVerdict {
    /// Combine the two outcomes with the standard 2x2 table.
    pub fn from_outcomes(adf_stationary: bool, kpss_stationary: bool) -> Self {
        match (adf_stationary, kpss_stationary) {
            (true, true) => StationarityVerdict::Stationary,
            (false, false) => StationarityVerdict::NonStationary,
            (false, true) => StationarityVerdict::TrendStationary,
            (true, false) => StationarityVerdict::DifferenceStationary,
        }
    }
}

impl fmt::Display for StationarityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StationarityVerdict::Stationary => "stationary",
            StationarityVerdict::NonStationary => "non-stationary",
            StationarityVerdict::TrendStationary => "trend-stationary",
            StationarityVerdict::DifferenceStationary => "difference-stationary",
        };
        f.write_str(s)
    }
}

/// ADF and KPSS reports with their joint verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityAssessment {
    pub adf: StationarityReport,
    pub kpss: StationarityReport,
    pub verdict: StationarityVerdict,
}

impl fmt::Display for StationarityAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.adf)?;
        writeln!(f)?;
        writeln!(f, "{}", self.kpss)?;
        writeln!(f)?;
        write!(f, "Overall verdict: {}", self.verdict)
    }
}

/// Run ADF and KPSS with default settings at the given significance level.
///
/// # Example
/// ```
/// use usercast::validation::{test_stationarity, StationarityVerdict};
///
/// let trend: Vec<f64> = (0..200).map(|i| i as f64 * 0.5 + ((i * 37) % 23) as f64).collect();
/// let assessment = test_stationarity(&trend, 0.05).unwrap();
/// assert!(!assessment.kpss.is_stationary());
/// assert_eq!(assessment.verdict, StationarityVerdict::NonStationary);
/// ```
pub fn test_stationarity(values: &[f64], alpha: f64) -> Result<StationarityAssessment> {
    let adf = adf_test(values, &AdfConfig::default().with_alpha(alpha))?;
    let kpss = kpss_test(values, &KpssConfig::default().with_alpha(alpha))?;
    let verdict = StationarityVerdict::from_outcomes(adf.is_stationary(), kpss.is_stationary());
    debug!(
        adf_p = adf.p_value(),
        kpss_p = kpss.p_value(),
        %verdict,
        "stationarity assessment"
    );
    Ok(StationarityAssessment { adf, kpss, verdict })
}

/// Smallest differencing order whose ADF test indicates stationarity.
///
/// A differenced series with zero variance counts as stationary. When no
/// order up to `max_d` passes, `max_d` is returned and a warning is logged.
///
/// # Example
/// ```
/// use usercast::validation::suggest_differencing;
///
/// let trend: Vec<f64> = (0..120).map(|i| 3.0 * i as f64).collect();
/// assert_eq!(suggest_differencing(&trend, 2, 0.05).unwrap(), 1);
/// ```
pub fn suggest_differencing(values: &[f64], max_d: usize, alpha: f64) -> Result<usize> {
    let observed: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if observed.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let config = AdfConfig::default().with_alpha(alpha);

    let mut current = observed;
    for d in 0..=max_d {
        if d > 0 {
            current = difference_values(&current, 1)?;
        }
        if is_constant(&current) {
            debug!(d, "differenced series is constant");
            return Ok(d);
        }
        match adf_test(&current, &config) {
            Ok(report) => {
                debug!(d, p_value = report.p_value(), "ADF on differenced series");
                if report.is_stationary() {
                    return Ok(d);
                }
            }
            // Exact deterministic paths make the regression degenerate.
            Err(ForecastError::ComputationError(reason)) => {
                debug!(d, %reason, "ADF regression degenerate");
            }
            Err(e) => return Err(e),
        }
    }
    warn!(max_d, "no differencing order up to max_d passed the ADF test");
    Ok(max_d)
}

fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| (v - first).abs() <= 1e-12 * first.abs().max(1.0)),
        None => true,
    }
}
