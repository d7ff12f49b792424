//! Rendering figures to SVG or PNG files with `plotters`.
//!
//! The backend is chosen from the file extension: `.svg` writes vector
//! output, `.png` a bitmap. Non-finite points are left out of line series.

use std::ops::Range;
use std::path::Path;

use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::plot::figures::{Correlogram, CorrelationKind, PlotSettings, RollingStatistics};
use crate::seasonality::Decomposition;

const SERIES_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEAN_COLOR: RGBColor = RGBColor(214, 39, 40);
const STD_COLOR: RGBColor = RGBColor(44, 160, 44);
const BAND_COLOR: RGBColor = RGBColor(120, 160, 210);

impl<E: std::error::Error + Send + Sync + 'static> From<DrawingAreaErrorKind<E>> for ForecastError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ForecastError::Plot(err.to_string())
    }
}

/// Something that can draw itself onto any backend.
trait Figure {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, settings: &PlotSettings) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

fn render(path: &Path, settings: &PlotSettings, figure: &impl Figure) -> Result<()> {
    let size = (settings.width, settings.height);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("svg") => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;
            figure.draw(&root, settings)?;
            root.present()?;
        }
        Some("png") => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;
            figure.draw(&root, settings)?;
            root.present()?;
        }
        _ => {
            return Err(ForecastError::Plot(format!(
                "unsupported output format for '{}', expected .svg or .png",
                path.display()
            )))
        }
    }
    debug!(path = %path.display(), "figure written");
    Ok(())
}

/// Padded y-range over the finite values of all slices.
fn value_range(columns: &[&[f64]]) -> Result<Range<f64>> {
    let (lo, hi) = columns
        .iter()
        .flat_map(|c| c.iter())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return Err(ForecastError::Plot("no finite values to draw".to_string()));
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    Ok(lo - pad..hi + pad)
}

fn time_range(timestamps: &[DateTime<Utc>]) -> Result<Range<DateTime<Utc>>> {
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) if first < last => Ok(*first..*last),
        _ => Err(ForecastError::InsufficientData {
            needed: 2,
            got: timestamps.len(),
        }),
    }
}

fn points<'a>(
    timestamps: &'a [DateTime<Utc>],
    values: &'a [f64],
) -> impl Iterator<Item = (DateTime<Utc>, f64)> + 'a {
    timestamps
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_finite())
        .map(|(t, v)| (*t, *v))
}

/// One time-indexed panel with any number of named lines.
struct LinePanel<'a> {
    title: &'a str,
    y_label: &'a str,
    timestamps: &'a [DateTime<Utc>],
    lines: Vec<(&'a str, &'a [f64], RGBColor)>,
}

impl LinePanel<'_> {
    fn draw_on<DB>(&self, area: &DrawingArea<DB, Shift>, settings: &PlotSettings) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let columns: Vec<&[f64]> = self.lines.iter().map(|(_, v, _)| *v).collect();
        let mut chart = ChartBuilder::on(area)
            .caption(self.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(time_range(self.timestamps)?, value_range(&columns)?)?;

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(settings.x_label.as_str()).y_desc(self.y_label);
        if !settings.show_grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;

        for (name, values, color) in &self.lines {
            let color = *color;
            chart
                .draw_series(LineSeries::new(points(self.timestamps, values), color))?
                .label(*name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        if self.lines.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }
        Ok(())
    }
}

struct SeriesFigure<'a>(&'a TimeSeries);

impl Figure for SeriesFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, settings: &PlotSettings) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let name = self.0.name().unwrap_or("value");
        LinePanel {
            title: &settings.title,
            y_label: &settings.y_label,
            timestamps: self.0.timestamps(),
            lines: vec![(name, self.0.values(), SERIES_COLOR)],
        }
        .draw_on(root, settings)
    }
}

struct DecompositionFigure<'a>(&'a Decomposition);

impl Figure for DecompositionFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, settings: &PlotSettings) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let d = self.0;
        let root = root.titled(&settings.title, ("sans-serif", 24))?;
        let panels = root.split_evenly((4, 1));
        let components: [(&str, &[f64]); 4] = [
            ("Observed", d.observed()),
            ("Trend", d.trend()),
            ("Seasonal", d.seasonal()),
            ("Residual", d.residual()),
        ];
        for (area, (name, values)) in panels.iter().zip(components) {
            LinePanel {
                title: name,
                y_label: name,
                timestamps: d.timestamps(),
                lines: vec![(name, values, SERIES_COLOR)],
            }
            .draw_on(area, settings)?;
        }
        Ok(())
    }
}

struct RollingFigure<'a>(&'a RollingStatistics);

impl Figure for RollingFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, settings: &PlotSettings) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let stats = self.0;
        LinePanel {
            title: &settings.title,
            y_label: &settings.y_label,
            timestamps: stats.timestamps(),
            lines: vec![
                ("Original", stats.observed(), SERIES_COLOR),
                ("Rolling mean", stats.mean(), MEAN_COLOR),
                ("Rolling std", stats.std(), STD_COLOR),
            ],
        }
        .draw_on(root, settings)
    }
}

struct CorrelogramFigure<'a> {
    acf: &'a Correlogram,
    pacf: &'a Correlogram,
}

fn draw_correlogram<DB>(
    area: &DrawingArea<DB, Shift>,
    corr: &Correlogram,
    settings: &PlotSettings,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let title = match corr.kind() {
        CorrelationKind::Acf => "Autocorrelation",
        CorrelationKind::Pacf => "Partial Autocorrelation",
    };
    let nlags = corr.nlags() as f64;
    let y_max = corr
        .values()
        .iter()
        .chain(corr.band())
        .filter(|v| v.is_finite())
        .fold(1.0f64, |m, v| m.max(v.abs()))
        * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..nlags + 0.5, -y_max..y_max)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc("Lag");
    if !settings.show_grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let lags = || (0..corr.values().len()).map(|k| k as f64);
    chart.draw_series(AreaSeries::new(
        lags().zip(corr.band().iter().copied()),
        0.0,
        BAND_COLOR.mix(0.3),
    ))?;
    chart.draw_series(AreaSeries::new(
        lags().zip(corr.band().iter().map(|b| -b)),
        0.0,
        BAND_COLOR.mix(0.3),
    ))?;
    chart.draw_series(
        lags()
            .zip(corr.values().iter().copied())
            .filter(|(_, r)| r.is_finite())
            .map(|(k, r)| PathElement::new(vec![(k, 0.0), (k, r)], SERIES_COLOR.stroke_width(2))),
    )?;
    chart.draw_series(
        lags()
            .zip(corr.values().iter().copied())
            .filter(|(_, r)| r.is_finite())
            .map(|(k, r)| Circle::new((k, r), 3, SERIES_COLOR.filled())),
    )?;
    Ok(())
}

impl Figure for CorrelogramFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, settings: &PlotSettings) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let root = root.titled(&settings.title, ("sans-serif", 24))?;
        let panels = root.split_evenly((1, 2));
        draw_correlogram(&panels[0], self.acf, settings)?;
        draw_correlogram(&panels[1], self.pacf, settings)
    }
}

/// Line plot of a series.
pub fn plot_series(series: &TimeSeries, path: impl AsRef<Path>, settings: &PlotSettings) -> Result<()> {
    render(path.as_ref(), settings, &SeriesFigure(series))
}

/// Observed, trend, seasonal and residual components in four stacked panels.
///
/// [`PlotSettings::decomposition`] gives a suitably tall figure.
pub fn plot_decomposition(
    decomposition: &Decomposition,
    path: impl AsRef<Path>,
    settings: &PlotSettings,
) -> Result<()> {
    render(path.as_ref(), settings, &DecompositionFigure(decomposition))
}

/// Series overlaid with its rolling mean and rolling standard deviation.
pub fn plot_rolling_statistics(
    stats: &RollingStatistics,
    path: impl AsRef<Path>,
    settings: &PlotSettings,
) -> Result<()> {
    render(path.as_ref(), settings, &RollingFigure(stats))
}

/// ACF and PACF side by side with their confidence bands.
pub fn plot_acf_pacf(
    acf: &Correlogram,
    pacf: &Correlogram,
    path: impl AsRef<Path>,
    settings: &PlotSettings,
) -> Result<()> {
    render(path.as_ref(), settings, &CorrelogramFigure { acf, pacf })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seasonality::{decompose, DecomposeConfig};
    use chrono::{Duration, TimeZone};

    fn seasonal_series(n: usize) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..n).map(|i| base + Duration::days(i as i64)).collect();
        let values = (0..n)
            .map(|i| 50.0 + 0.3 * i as f64 + 5.0 * ((i % 7) as f64 - 3.0))
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    #[test]
    fn writes_svg_figures() {
        let dir = tempfile::tempdir().unwrap();
        let series = seasonal_series(56);
        let settings = PlotSettings::default().with_title("Users");

        let path = dir.path().join("series.svg");
        plot_series(&series, &path, &settings).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));

        let decomposition = decompose(&series, &DecomposeConfig::additive(7)).unwrap();
        let path = dir.path().join("decomposition.svg");
        plot_decomposition(&decomposition, &path, &settings).unwrap();
        assert!(path.exists());

        let stats = RollingStatistics::compute(&series, 7).unwrap();
        let path = dir.path().join("rolling.svg");
        plot_rolling_statistics(&stats, &path, &settings).unwrap();
        assert!(path.exists());

        let acf = Correlogram::acf(series.values(), 14, 0.05).unwrap();
        let pacf = Correlogram::pacf(series.values(), 14, 0.05).unwrap();
        let path = dir.path().join("correlogram.svg");
        plot_acf_pacf(&acf, &pacf, &path, &settings).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let series = seasonal_series(20);
        let result = plot_series(&series, dir.path().join("series.pdf"), &PlotSettings::default());
        assert!(matches!(result, Err(ForecastError::Plot(_))));
        assert!(!dir.path().join("series.pdf").exists());
    }
}
