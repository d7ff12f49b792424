//! Ranked results of a model search.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;
use crate::models::BoxedForecaster;
use crate::selection::search::SelectionMetric;
use crate::selection::space::ModelFamily;

/// A fitted candidate with its hold-out scores.
pub struct CandidateModel {
    pub(crate) family: ModelFamily,
    pub(crate) model: BoxedForecaster,
    pub(crate) aic: f64,
    pub(crate) mae: f64,
    pub(crate) rmse: f64,
    pub(crate) forecast: Forecast,
}

impl CandidateModel {
    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// The model fitted on the training split.
    pub fn model(&self) -> &BoxedForecaster {
        &self.model
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn mae(&self) -> f64 {
        self.mae
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    /// Forecast of the hold-out period, with intervals when the model has them.
    pub fn holdout_forecast(&self) -> &Forecast {
        &self.forecast
    }

    pub fn score(&self, metric: SelectionMetric) -> f64 {
        match metric {
            SelectionMetric::Aic => self.aic,
            SelectionMetric::Mae => self.mae,
            SelectionMetric::Rmse => self.rmse,
        }
    }

    pub fn summary(&self) -> ComparisonRow {
        ComparisonRow {
            model: self.name().to_string(),
            aic: self.aic,
            mae: self.mae,
            rmse: self.rmse,
        }
    }
}

impl fmt::Debug for CandidateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateModel")
            .field("model", &self.name())
            .field("aic", &self.aic)
            .field("mae", &self.mae)
            .field("rmse", &self.rmse)
            .finish()
    }
}

/// Flat, exportable view of one comparison row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub model: String,
    pub aic: f64,
    pub mae: f64,
    pub rmse: f64,
}

/// A candidate excluded from the ranking, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub model: String,
    pub reason: String,
}

/// Candidates ranked by the selection metric, best first.
///
/// Never empty: a search in which every candidate fails returns an error
/// instead.
#[derive(Debug)]
pub struct ModelComparison {
    pub(crate) rows: Vec<CandidateModel>,
    pub(crate) skipped: Vec<SkippedCandidate>,
    pub(crate) metric: SelectionMetric,
    pub(crate) test_size: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    selection: SelectionMetric,
    test_size: usize,
    rows: Vec<ComparisonRow>,
    skipped: &'a [SkippedCandidate],
}

impl ModelComparison {
    pub fn rows(&self) -> &[CandidateModel] {
        &self.rows
    }

    pub fn skipped(&self) -> &[SkippedCandidate] {
        &self.skipped
    }

    pub fn metric(&self) -> SelectionMetric {
        self.metric
    }

    pub fn test_size(&self) -> usize {
        self.test_size
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The winning candidate.
    pub fn best(&self) -> &CandidateModel {
        &self.rows[0]
    }

    /// Refit the winning family on the whole series.
    pub fn refit_best(&self, series: &TimeSeries) -> Result<BoxedForecaster> {
        let mut model = self.best().family.build();
        model.fit(series)?;
        Ok(model)
    }

    pub fn summaries(&self) -> Vec<ComparisonRow> {
        self.rows.iter().map(CandidateModel::summary).collect()
    }

    /// Write `model,aic,mae,rmse` rows with a header.
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in self.summaries() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let report = Report {
            selection: self.metric,
            test_size: self.test_size,
            rows: self.summaries(),
            skipped: &self.skipped,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

impl fmt::Display for ModelComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.name().len())
            .chain(self.skipped.iter().map(|s| s.model.len()))
            .max()
            .unwrap_or(0)
            .max("Model".len());

        writeln!(
            f,
            "Model comparison (ranked by {}, hold-out {} points)",
            self.metric, self.test_size
        )?;
        writeln!(
            f,
            "{:>4}  {:<width$}  {:>12}  {:>12}  {:>12}",
            "Rank", "Model", "AIC", "MAE", "RMSE"
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:<width$}  {:>12.4}  {:>12.4}  {:>12.4}",
                i + 1,
                row.name(),
                row.aic,
                row.mae,
                row.rmse
            )?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "Skipped {} candidate(s):", self.skipped.len())?;
            for skipped in &self.skipped {
                writeln!(f, "  {:<width$}  {}", skipped.model, skipped.reason)?;
            }
        }
        Ok(())
    }
}
