//! Candidate grids for the model search.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::models::{
    ARIMASpec, BoxedForecaster, HoltWinters, SeasonalSpec, SeasonalType, TrendType, ARIMA,
    SARIMA,
};

/// A model family together with its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelFamily {
    Arima {
        order: ARIMASpec,
    },
    Sarima {
        order: ARIMASpec,
        seasonal: SeasonalSpec,
    },
    HoltWinters {
        trend: TrendType,
        seasonal: SeasonalType,
        period: usize,
    },
}

impl ModelFamily {
    /// Fresh, unfitted model for this family.
    pub fn build(&self) -> BoxedForecaster {
        match *self {
            ModelFamily::Arima { order } => Box::new(ARIMA::from_spec(order)),
            ModelFamily::Sarima { order, seasonal } => Box::new(SARIMA::new(order, seasonal)),
            ModelFamily::HoltWinters {
                trend,
                seasonal,
                period,
            } => Box::new(HoltWinters::new(trend, seasonal, period)),
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::Arima { order } => write!(f, "ARIMA{order}"),
            ModelFamily::Sarima { order, seasonal } => write!(f, "SARIMA{order}{seasonal}"),
            ModelFamily::HoltWinters {
                trend,
                seasonal: SeasonalType::None,
                ..
            } => write!(f, "HoltWinters({trend},none)"),
            ModelFamily::HoltWinters {
                trend,
                seasonal,
                period,
            } => write!(f, "HoltWinters({trend},{seasonal},{period})"),
        }
    }
}

/// Seasonal orders `(P, D, Q)` searched at a fixed period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalSpace {
    pub p: RangeInclusive<usize>,
    pub d: RangeInclusive<usize>,
    pub q: RangeInclusive<usize>,
    pub period: usize,
}

impl SeasonalSpace {
    /// `P, D, Q ∈ {0, 1}` at the given period.
    pub fn new(period: usize) -> Self {
        Self {
            p: 0..=1,
            d: 0..=1,
            q: 0..=1,
            period,
        }
    }

    pub fn with_orders(
        mut self,
        p: RangeInclusive<usize>,
        d: RangeInclusive<usize>,
        q: RangeInclusive<usize>,
    ) -> Self {
        self.p = p;
        self.d = d;
        self.q = q;
        self
    }
}

/// Hyperparameter grid of a model search.
///
/// ARIMA candidates cover every `(p, d, q)` in the ranges. With a seasonal
/// space, every non-trivial `(P, D, Q)[s]` is crossed with them as SARIMA.
/// Holt-Winters adds variants with and without an additive trend; seasonal
/// variants only when a seasonal space is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSpace {
    pub p: RangeInclusive<usize>,
    pub d: RangeInclusive<usize>,
    pub q: RangeInclusive<usize>,
    pub seasonal: Option<SeasonalSpace>,
    pub holt_winters: bool,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            p: 0..=2,
            d: 0..=1,
            q: 0..=2,
            seasonal: None,
            holt_winters: true,
        }
    }
}

impl SearchSpace {
    pub fn with_orders(
        mut self,
        p: RangeInclusive<usize>,
        d: RangeInclusive<usize>,
        q: RangeInclusive<usize>,
    ) -> Self {
        self.p = p;
        self.d = d;
        self.q = q;
        self
    }

    pub fn with_seasonal(mut self, seasonal: SeasonalSpace) -> Self {
        self.seasonal = Some(seasonal);
        self
    }

    pub fn with_holt_winters(mut self, enabled: bool) -> Self {
        self.holt_winters = enabled;
        self
    }

    /// Whether SARIMA candidates are generated.
    pub fn is_seasonal(&self) -> bool {
        self.seasonal.is_some()
    }

    /// Every candidate of the grid, ARIMA first, in a stable order.
    pub fn candidates(&self) -> Vec<ModelFamily> {
        let mut out = Vec::new();
        let orders: Vec<ARIMASpec> = self
            .d
            .clone()
            .flat_map(|d| {
                self.p.clone().flat_map(move |p| {
                    self.q.clone().map(move |q| ARIMASpec::new(p, d, q))
                })
            })
            .collect();

        out.extend(orders.iter().map(|&order| ModelFamily::Arima { order }));

        if let Some(space) = &self.seasonal {
            for sd in space.d.clone() {
                for sp in space.p.clone() {
                    for sq in space.q.clone() {
                        if sp == 0 && sd == 0 && sq == 0 {
                            continue;
                        }
                        let seasonal = SeasonalSpec::new(sp, sd, sq, space.period);
                        out.extend(
                            orders
                                .iter()
                                .map(|&order| ModelFamily::Sarima { order, seasonal }),
                        );
                    }
                }
            }
        }

        if self.holt_winters {
            for trend in [TrendType::None, TrendType::Additive] {
                out.push(ModelFamily::HoltWinters {
                    trend,
                    seasonal: SeasonalType::None,
                    period: 0,
                });
                if let Some(space) = &self.seasonal {
                    for seasonal in [SeasonalType::Additive, SeasonalType::Multiplicative] {
                        out.push(ModelFamily::HoltWinters {
                            trend,
                            seasonal,
                            period: space.period,
                        });
                    }
                }
            }
        }

        out
    }
}
