//! Diagnostic figures.
//!
//! Figure data ([`RollingStatistics`], [`Correlogram`]) is always available.
//! Rendering to SVG/PNG needs the `plotting` feature.

mod figures;
#[cfg(feature = "plotting")]
mod render;

pub use figures::{Correlogram, CorrelationKind, PlotSettings, RollingStatistics};
#[cfg(feature = "plotting")]
pub use render::{plot_acf_pacf, plot_decomposition, plot_rolling_statistics, plot_series};
