//! MacKinnon response surfaces for Dickey-Fuller distributions (single series).

use crate::utils::stats::normal_cdf;
use crate::validation::Regression;

struct PValueSurface {
    tau_max: f64,
    tau_min: f64,
    tau_star: f64,
    small_p: [f64; 3],
    large_p: [f64; 4],
}

// MacKinnon (1994), Table 3/4 coefficients, rescaled.
const NO_CONSTANT: PValueSurface = PValueSurface {
    tau_max: 1.51,
    tau_min: -19.04,
    tau_star: -1.04,
    small_p: [0.6344, 1.2378, 0.032496],
    large_p: [0.4797, 0.93557, -0.06999, 0.033066],
};

const CONSTANT: PValueSurface = PValueSurface {
    tau_max: 2.74,
    tau_min: -18.83,
    tau_star: -1.61,
    small_p: [2.1659, 1.4412, 0.038269],
    large_p: [1.7339, 0.93202, -0.12745, -0.010368],
};

const CONSTANT_TREND: PValueSurface = PValueSurface {
    tau_max: 0.7,
    tau_min: -16.18,
    tau_star: -2.89,
    small_p: [3.2512, 1.6047, 0.049588],
    large_p: [2.5261, 0.61654, -0.37956, -0.060285],
};

// MacKinnon (2010), Table 2: [1%, 5%, 10%] x [b0, b1, b2, b3].
const CRIT_NO_CONSTANT: [[f64; 4]; 3] = [
    [-2.56574, -2.2358, -3.627, 0.0],
    [-1.94100, -0.2686, -3.365, 31.223],
    [-1.61682, 0.2656, -2.714, 25.364],
];

const CRIT_CONSTANT: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

const CRIT_CONSTANT_TREND: [[f64; 4]; 3] = [
    [-3.95877, -9.0531, -28.428, -134.155],
    [-3.41049, -4.3904, -9.036, -45.374],
    [-3.12705, -2.5856, -3.925, -22.380],
];

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate p-value of a Dickey-Fuller t-statistic.
pub(crate) fn mackinnon_p(tau: f64, regression: Regression) -> f64 {
    if tau.is_nan() {
        return f64::NAN;
    }
    let surface = match regression {
        Regression::NoConstant => &NO_CONSTANT,
        Regression::Constant => &CONSTANT,
        Regression::ConstantTrend => &CONSTANT_TREND,
    };
    if tau > surface.tau_max {
        return 1.0;
    }
    if tau < surface.tau_min {
        return 0.0;
    }
    let z = if tau <= surface.tau_star {
        polyval(&surface.small_p, tau)
    } else {
        polyval(&surface.large_p, tau)
    };
    normal_cdf(z)
}

/// Finite-sample critical values at 1%, 5% and 10% for `nobs` regression observations.
pub(crate) fn mackinnon_crit(regression: Regression, nobs: usize) -> [f64; 3] {
    let table = match regression {
        Regression::NoConstant => &CRIT_NO_CONSTANT,
        Regression::Constant => &CRIT_CONSTANT,
        Regression::ConstantTrend => &CRIT_CONSTANT_TREND,
    };
    let inv = 1.0 / nobs as f64;
    [
        polyval(&table[0], inv),
        polyval(&table[1], inv),
        polyval(&table[2], inv),
    ]
}
