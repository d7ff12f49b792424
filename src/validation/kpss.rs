//! KPSS stationarity test.

use crate::error::{ForecastError, Result};
use crate::utils::ols::ols;
use crate::validation::{CriticalValues, Regression, StationarityReport, StationarityTest};
use serde::{Deserialize, Serialize};

// Kwiatkowski et al. (1992), Table 1: statistic at p = 10%, 5%, 2.5%, 1%.
const LEVEL_CRIT: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const TREND_CRIT: [f64; 4] = [0.119, 0.146, 0.176, 0.216];
const CRIT_P: [f64; 4] = [0.10, 0.05, 0.025, 0.01];

/// Configuration for [`kpss_test`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpssConfig {
    /// `Constant` tests level stationarity, `ConstantTrend` trend stationarity.
    pub regression: Regression,
    /// Bartlett bandwidth; chosen by the Hobijn et al. (1998) rule when unset.
    pub lags: Option<usize>,
    pub alpha: f64,
}

impl Default for KpssConfig {
    fn default() -> Self {
        Self {
            regression: Regression::Constant,
            lags: None,
            alpha: 0.05,
        }
    }
}

impl KpssConfig {
    pub fn with_regression(mut self, regression: Regression) -> Self {
        self.regression = regression;
        self
    }

    pub fn with_lags(mut self, lags: usize) -> Self {
        self.lags = Some(lags);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Kwiatkowski-Phillips-Schmidt-Shin test.
///
/// The null hypothesis is stationarity, so `is_stationary` is
/// `p_value >= alpha`. The p-value is interpolated from the published table
/// and therefore saturates at 0.01 and 0.10.
pub fn kpss_test(values: &[f64], config: &KpssConfig) -> Result<StationarityReport> {
    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {}",
            config.alpha
        )));
    }
    let crit = match config.regression {
        Regression::Constant => LEVEL_CRIT,
        Regression::ConstantTrend => TREND_CRIT,
        Regression::NoConstant => {
            return Err(ForecastError::InvalidParameter(
                "KPSS needs a constant or constant-and-trend regression".to_string(),
            ))
        }
    };

    let x: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = x.len();
    if n < 4 {
        return Err(ForecastError::InsufficientData { needed: 4, got: n });
    }

    let resid: Vec<f64> = match config.regression {
        Regression::ConstantTrend => {
            let rows: Vec<Vec<f64>> = (0..n).map(|t| vec![1.0, (t + 1) as f64]).collect();
            let fit = ols(&x, &rows)?;
            x.iter()
                .zip(&rows)
                .map(|(xi, row)| xi - fit.coefficients[0] - fit.coefficients[1] * row[1])
                .collect()
        }
        _ => {
            let mean = x.iter().sum::<f64>() / n as f64;
            x.iter().map(|xi| xi - mean).collect()
        }
    };

    let lags = config
        .lags
        .unwrap_or_else(|| hobijn_bandwidth(&resid))
        .min(n - 1);

    let mut partial = 0.0;
    let eta = resid
        .iter()
        .map(|r| {
            partial += r;
            partial * partial
        })
        .sum::<f64>()
        / (n * n) as f64;

    let long_run = long_run_variance(&resid, lags);
    if long_run <= 0.0 || !long_run.is_finite() {
        return Err(ForecastError::ComputationError(
            "KPSS long-run variance is not positive; the series may be constant".to_string(),
        ));
    }
    let statistic = eta / long_run;
    let p_value = interpolate_p(statistic, &crit);

    Ok(StationarityReport {
        test: StationarityTest::Kpss,
        regression: config.regression,
        statistic,
        p_value,
        used_lag: lags,
        n_obs: n,
        critical_values: CriticalValues {
            one_pct: crit[3],
            five_pct: crit[1],
            ten_pct: crit[0],
        },
        alpha: config.alpha,
        is_stationary: p_value >= config.alpha,
        ic_best: None,
    })
}

fn autocov_sum(resid: &[f64], lag: usize) -> f64 {
    resid[lag..].iter().zip(resid).map(|(a, b)| a * b).sum()
}

/// Newey-West variance with Bartlett weights.
fn long_run_variance(resid: &[f64], lags: usize) -> f64 {
    let n = resid.len();
    let mut s = autocov_sum(resid, 0);
    for i in 1..=lags {
        s += 2.0 * autocov_sum(resid, i) * (1.0 - i as f64 / (lags as f64 + 1.0));
    }
    s / n as f64
}

/// Data-dependent bandwidth of Hobijn, Franses and Ooms (1998).
fn hobijn_bandwidth(resid: &[f64]) -> usize {
    let n = resid.len() as f64;
    let cov_lags = n.powf(2.0 / 9.0) as usize;
    let mut s0 = autocov_sum(resid, 0) / n;
    let mut s1 = 0.0;
    for i in 1..=cov_lags.min(resid.len() - 1) {
        let prod = autocov_sum(resid, i) / (n / 2.0);
        s0 += prod;
        s1 += i as f64 * prod;
    }
    if s0 == 0.0 {
        return 0;
    }
    let s_hat = s1 / s0;
    let gamma = 1.1447 * (s_hat * s_hat).powf(1.0 / 3.0);
    (gamma * n.powf(1.0 / 3.0)) as usize
}

/// Piecewise-linear p-value from the critical value table.
fn interpolate_p(statistic: f64, crit: &[f64; 4]) -> f64 {
    if statistic <= crit[0] {
        return CRIT_P[0];
    }
    if statistic >= crit[3] {
        return CRIT_P[3];
    }
    for i in 0..3 {
        if statistic <= crit[i + 1] {
            let w = (statistic - crit[i]) / (crit[i + 1] - crit[i]);
            return CRIT_P[i] + w * (CRIT_P[i + 1] - CRIT_P[i]);
        }
    }
    CRIT_P[3]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noise(n: usize) -> Vec<f64> {
        let mut state = 0x2545_f491_4f6c_dd1du64;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    #[test]
    fn white_noise_is_level_stationary() {
        let report = kpss_test(&noise(200), &KpssConfig::default().with_lags(10)).unwrap();

        assert!(report.statistic() > 0.0);
        assert!(report.is_stationary());
    }

    #[test]
    fn trend_rejects_level_stationarity() {
        let series: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
        let report = kpss_test(&series, &KpssConfig::default().with_lags(10)).unwrap();

        assert!(!report.is_stationary());
        assert_relative_eq!(report.p_value(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn trend_regression_accepts_noisy_trend() {
        let series: Vec<f64> = noise(200)
            .iter()
            .enumerate()
            .map(|(i, e)| i as f64 * 0.5 + e)
            .collect();
        let config = KpssConfig::default()
            .with_regression(Regression::ConstantTrend)
            .with_lags(10);
        let report = kpss_test(&series, &config).unwrap();

        assert!(report.is_stationary());
        assert_relative_eq!(report.critical_values().five_pct, 0.146, epsilon = 1e-12);
    }

    #[test]
    fn p_value_interpolates_table() {
        assert_relative_eq!(interpolate_p(0.1, &LEVEL_CRIT), 0.10, epsilon = 1e-12);
        assert_relative_eq!(interpolate_p(0.463, &LEVEL_CRIT), 0.05, epsilon = 1e-12);
        assert_relative_eq!(
            interpolate_p((0.463 + 0.574) / 2.0, &LEVEL_CRIT),
            0.0375,
            epsilon = 1e-12
        );
        assert_relative_eq!(interpolate_p(2.0, &LEVEL_CRIT), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn automatic_bandwidth_is_bounded() {
        let series = noise(150);
        let report = kpss_test(&series, &KpssConfig::default()).unwrap();
        assert!(report.used_lag() < 150);
    }

    #[test]
    fn rejects_no_constant_regression() {
        let config = KpssConfig::default().with_regression(Regression::NoConstant);
        assert!(matches!(
            kpss_test(&noise(50), &config),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn constant_series_is_degenerate() {
        assert!(matches!(
            kpss_test(&[3.0; 30], &KpssConfig::default()),
            Err(ForecastError::ComputationError(_))
        ));
    }
}
