//! Data transformations for time series.
//!
//! Provides differencing, Box-Cox transforms, and window functions.
//!
//! # Example
//!
//! ```
//! use usercast::transform::{difference_values, rolling_mean, DifferencingPlan};
//!
//! let values = vec![1.0, 3.0, 6.0, 10.0, 15.0];
//!
//! let d1 = difference_values(&values, 1).unwrap();
//! assert_eq!(d1, vec![2.0, 3.0, 4.0, 5.0]);
//!
//! // Rolling mean with window 3
//! let rm = rolling_mean(&values, 3).unwrap();
//! assert!(rm[1].is_nan());
//!
//! // Bring a forecast of the differences back to levels
//! let plan = DifferencingPlan::arima(1, 0, 0);
//! assert_eq!(plan.integrate(&values, &[6.0]).unwrap(), vec![21.0]);
//! ```

pub mod boxcox;
pub mod diff;
pub mod window;

pub use boxcox::{boxcox, boxcox_auto, boxcox_lambda, boxcox_values, inv_boxcox, BoxCoxResult};
pub use diff::{
    difference, difference_values, seasonal_difference, seasonal_difference_values,
    DifferencingPlan,
};
pub use window::{rolling_mean, rolling_std};
