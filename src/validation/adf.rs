//! Augmented Dickey-Fuller unit-root test.

use crate::error::{ForecastError, Result};
use crate::utils::ols::{ols, OlsFit};
use crate::validation::mackinnon::{mackinnon_crit, mackinnon_p};
use crate::validation::{CriticalValues, Regression, StationarityReport, StationarityTest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One-sided 5% normal quantile used by [`Autolag::TStat`].
const TSTAT_STOP: f64 = 1.6448536269514722;

/// How the number of augmenting lags is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Autolag {
    /// Minimize AIC over `0..=max_lag`.
    #[default]
    Aic,
    /// Minimize BIC over `0..=max_lag`.
    Bic,
    /// Drop lags from `max_lag` down until the last one is significant at 5%.
    TStat,
    /// Use `max_lag` as given.
    Fixed,
}

/// Configuration for [`adf_test`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdfConfig {
    /// Deterministic terms in the test regression.
    pub regression: Regression,
    /// Upper bound on augmenting lags; `ceil(12 * (n / 100)^(1/4))` when unset.
    pub max_lag: Option<usize>,
    pub autolag: Autolag,
    /// Significance level for the verdict.
    pub alpha: f64,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            regression: Regression::Constant,
            max_lag: None,
            autolag: Autolag::Aic,
            alpha: 0.05,
        }
    }
}

impl AdfConfig {
    pub fn with_regression(mut self, regression: Regression) -> Self {
        self.regression = regression;
        self
    }

    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    pub fn with_autolag(mut self, autolag: Autolag) -> Self {
        self.autolag = autolag;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Schwert's rule of thumb for the largest lag worth considering.
fn default_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Augmented Dickey-Fuller test.
///
/// Regresses `Δy_t` on `y_{t-1}`, `lag` lagged differences and the configured
/// deterministic terms. The null hypothesis is a unit root, so a small p-value
/// supports stationarity: `is_stationary` is `p_value < alpha`.
///
/// With an automatic lag criterion every candidate lag is fitted on the
/// common sample left after dropping `max_lag` leading differences; the
/// chosen lag is then refitted on the longest sample it allows. Missing
/// values are dropped first.
///
/// # Errors
/// * [`ForecastError::InsufficientData`] when fewer than `max_lag + 4`
///   observations remain, or `max_lag` leaves the regression without
///   degrees of freedom.
/// * [`ForecastError::ComputationError`] for a degenerate (e.g. constant) series.
///
/// # Example
/// ```
/// use usercast::validation::{adf_test, AdfConfig};
///
/// // Bounded, mean-reverting pattern.
/// let values: Vec<f64> = (0..120).map(|i| ((i * 37) % 23) as f64).collect();
/// let report = adf_test(&values, &AdfConfig::default()).unwrap();
/// assert!(report.is_stationary());
/// ```
pub fn adf_test(values: &[f64], config: &AdfConfig) -> Result<StationarityReport> {
    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {}",
            config.alpha
        )));
    }

    let x: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = x.len();
    let ntrend = config.regression.num_terms();

    let cap = (n / 2) as isize - ntrend as isize - 1;
    if cap < 0 {
        return Err(ForecastError::InsufficientData {
            needed: 2 * (ntrend + 1),
            got: n,
        });
    }
    let cap = cap as usize;
    let max_lag = match config.max_lag {
        Some(lag) if lag > cap => {
            return Err(ForecastError::InsufficientData {
                needed: 2 * (lag + ntrend + 1),
                got: n,
            })
        }
        Some(lag) => lag,
        None => default_max_lag(n).min(cap),
    };
    if n < max_lag + 4 {
        return Err(ForecastError::InsufficientData {
            needed: max_lag + 4,
            got: n,
        });
    }

    let dx: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let (used_lag, ic_best) = match config.autolag {
        Autolag::Fixed => (max_lag, None),
        method => {
            let (lag, ic) = select_lag(&x, &dx, max_lag, config.regression, method)?;
            (lag, Some(ic))
        }
    };
    debug!(max_lag, used_lag, ic = ?ic_best, autolag = ?config.autolag, "ADF lag selection");

    let fit = fit_regression(&x, &dx, used_lag, used_lag, config.regression)?;
    let statistic = fit.t_value(0);
    if !statistic.is_finite() {
        return Err(ForecastError::ComputationError(
            "ADF statistic is not finite; the series may be constant".to_string(),
        ));
    }

    let n_obs = fit.nobs;
    let p_value = mackinnon_p(statistic, config.regression);
    let [one_pct, five_pct, ten_pct] = mackinnon_crit(config.regression, n_obs);

    Ok(StationarityReport {
        test: StationarityTest::Adf,
        regression: config.regression,
        statistic,
        p_value,
        used_lag,
        n_obs,
        critical_values: CriticalValues {
            one_pct,
            five_pct,
            ten_pct,
        },
        alpha: config.alpha,
        is_stationary: p_value < config.alpha,
        ic_best,
    })
}

/// Fit the test regression with `lag` augmenting differences, skipping the
/// first `trim` differences so samples are comparable across lags.
///
/// Column 0 is the lagged level, columns `1..=lag` the lagged differences,
/// deterministic terms last.
fn fit_regression(
    x: &[f64],
    dx: &[f64],
    lag: usize,
    trim: usize,
    regression: Regression,
) -> Result<OlsFit> {
    let nobs = dx.len() - trim;
    let mut y = Vec::with_capacity(nobs);
    let mut rows = Vec::with_capacity(nobs);
    for (k, t) in (trim..dx.len()).enumerate() {
        let mut row = Vec::with_capacity(1 + lag + 2);
        row.push(x[t]);
        row.extend((1..=lag).map(|i| dx[t - i]));
        match regression {
            Regression::NoConstant => {}
            Regression::Constant => row.push(1.0),
            Regression::ConstantTrend => {
                row.push(1.0);
                row.push((k + 1) as f64);
            }
        }
        y.push(dx[t]);
        rows.push(row);
    }
    ols(&y, &rows)
}

/// Pick the augmenting lag by information criterion or significance.
fn select_lag(
    x: &[f64],
    dx: &[f64],
    max_lag: usize,
    regression: Regression,
    method: Autolag,
) -> Result<(usize, f64)> {
    let fits = (0..=max_lag)
        .map(|lag| fit_regression(x, dx, lag, max_lag, regression))
        .collect::<Result<Vec<_>>>()?;

    let by_criterion = |criterion: fn(&OlsFit) -> f64| {
        let mut best = (0, f64::INFINITY);
        for (lag, fit) in fits.iter().enumerate() {
            let ic = criterion(fit);
            if ic < best.1 {
                best = (lag, ic);
            }
        }
        best
    };

    let chosen = match method {
        Autolag::Aic => by_criterion(OlsFit::aic),
        Autolag::Bic => by_criterion(OlsFit::bic),
        Autolag::TStat | Autolag::Fixed => {
            let mut chosen = (0, 0.0);
            for lag in (0..=max_lag).rev() {
                // The last regressor is the highest lag, or the level when lag = 0.
                let t = fits[lag].t_value(lag).abs();
                chosen = (lag, t);
                if t >= TSTAT_STOP {
                    break;
                }
            }
            chosen
        }
    };
    Ok(chosen)
}
