//! End-to-end walk through on eight years of monthly active users.
//!
//! Run with: cargo run --example active_users
//! Figures: cargo run --example active_users --features plotting
//! Log detail: RUST_LOG=usercast=debug cargo run --example active_users

use std::fs::File;
use std::io::Write;

use tracing_subscriber::EnvFilter;
use usercast::core::Frequency;
use usercast::features::acf;
use usercast::io::LoadOptions;
use usercast::models::Forecaster;
use usercast::plot::{Correlogram, RollingStatistics};
use usercast::preprocess::{prepare, FillMethod};
use usercast::seasonality::{decompose, DecomposeConfig};
use usercast::selection::{ModelSearch, SearchConfig, SearchSpace, SeasonalSpace};
use usercast::transform::{difference, seasonal_difference};
use usercast::validation::{suggest_differencing, test_stationarity};

fn synthetic_users(n: usize) -> Vec<f64> {
    let pattern = [
        -30.0, -25.0, -5.0, 10.0, 20.0, 35.0, 45.0, 30.0, 5.0, -15.0, -30.0, -40.0,
    ];
    (0..n)
        .map(|i| {
            let wobble = ((i * 37) % 19) as f64 - 9.0;
            1000.0 + 4.0 * i as f64 + pattern[i % 12] + wobble
        })
        .collect()
}

fn main() -> usercast::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== usercast: monthly active users ===\n");

    // 1. Write a raw export with a skipped month and a blank value
    let dir = std::env::temp_dir().join("usercast-demo");
    std::fs::create_dir_all(&dir)?;
    let csv_path = dir.join("active_users.csv");
    {
        let mut file = File::create(&csv_path)?;
        writeln!(file, "month,active_users")?;
        for (i, v) in synthetic_users(96).iter().enumerate() {
            let month = format!("{}-{:02}-01", 2016 + i / 12, i % 12 + 1);
            match i {
                30 => continue,
                61 => writeln!(file, "{month},")?,
                _ => writeln!(file, "{month},{v:.1}")?,
            }
        }
    }

    // 2. Load, regularize and fill
    let options = LoadOptions::default()
        .with_columns("month", "active_users")
        .with_frequency(Frequency::Monthly);
    let series = prepare(&csv_path, &options, FillMethod::Linear)?;
    println!(
        "Prepared {} observations from {} to {}",
        series.len(),
        series.timestamps()[0].format("%Y-%m"),
        series.timestamps()[series.len() - 1].format("%Y-%m"),
    );

    // 3. Stationarity
    let assessment = test_stationarity(series.values(), 0.05)?;
    println!("\n{assessment}\n");
    let d = suggest_differencing(series.values(), 2, 0.05)?;
    println!("Suggested differencing order: {d}");

    let diffed = difference(&series, 1)?;
    let seasonal = seasonal_difference(&diffed, 12, 1)?;
    let after = test_stationarity(seasonal.values(), 0.05)?;
    println!("After (1 - B)(1 - B^12): {}", after.verdict);

    // 4. Structure
    let parts = decompose(&series, &DecomposeConfig::default())?;
    println!(
        "\nDecomposition ({:?}, period {}): trend strength {:.2}, seasonal strength {:.2}",
        parts.model(),
        parts.period(),
        parts.trend_strength(),
        parts.seasonal_strength(),
    );

    let rolling = RollingStatistics::compute(&series, 12)?;
    let acf_plot = Correlogram::acf(seasonal.values(), 24, 0.05)?;
    let pacf_plot = Correlogram::pacf(seasonal.values(), 24, 0.05)?;
    println!("Significant ACF lags: {:?}", acf_plot.significant_lags());
    println!("Significant PACF lags: {:?}", pacf_plot.significant_lags());
    println!("Raw lag-12 autocorrelation: {:.3}", acf(series.values(), 12)?[12]);

    // 5. Model search on a 12-month hold-out
    let space = SearchSpace::default()
        .with_orders(0..=2, 1..=1, 0..=2)
        .with_seasonal(SeasonalSpace::new(12));
    let config = SearchConfig::default().with_test_size(12);
    let comparison = ModelSearch::run(&series, &space, &config)?;
    println!("\n{comparison}");

    let report_path = dir.join("comparison.csv");
    comparison.to_csv(File::create(&report_path)?)?;
    println!("Comparison written to {}", report_path.display());

    // 6. Forecast the next year with the winner
    let model = comparison.refit_best(&series)?;
    let forecast = model.predict_with_intervals(12, 0.95)?;
    println!("\nNext 12 months ({}):", model.name());
    if let (Some(lower), Some(upper)) = (forecast.lower(), forecast.upper()) {
        for (h, point) in forecast.point().iter().enumerate() {
            println!("  +{:2}: {:8.1}  [{:8.1}, {:8.1}]", h + 1, point, lower[h], upper[h]);
        }
    }

    #[cfg(feature = "plotting")]
    {
        use usercast::plot::{
            plot_acf_pacf, plot_decomposition, plot_rolling_statistics, plot_series, PlotSettings,
        };

        let settings = PlotSettings::default().with_labels("Month", "Active users");
        plot_series(
            &series,
            dir.join("series.svg"),
            &settings.clone().with_title("Monthly active users"),
        )?;
        plot_rolling_statistics(
            &rolling,
            dir.join("rolling.svg"),
            &settings.clone().with_title("Rolling mean and std (12 months)"),
        )?;
        plot_decomposition(
            &parts,
            dir.join("decomposition.svg"),
            &PlotSettings::decomposition().with_labels("Month", "Active users"),
        )?;
        plot_acf_pacf(
            &acf_plot,
            &pacf_plot,
            dir.join("correlogram.svg"),
            &settings.with_title("Differenced series"),
        )?;
        println!("\nFigures written to {}", dir.display());
    }
    #[cfg(not(feature = "plotting"))]
    println!(
        "\nRolling window {} ready; enable the `plotting` feature to render figures.",
        rolling.window()
    );

    Ok(())
}
