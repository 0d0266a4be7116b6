//! Forecast output consumed by the presentation layer

use crate::features::{CLOSE, NEXT_CLOSE, PREDICTED_CLOSE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// One evaluation-subset row annotated with the model's estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRow {
    /// Bar whose features produced the estimate
    pub timestamp: DateTime<Utc>,
    /// Close of that bar
    pub close: f64,
    /// Realised close of the following bar
    pub next_close: f64,
    /// Estimated close of the following bar
    pub predicted_close: f64,
}

/// Output of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub symbol: String,
    /// Evaluation subset in chronological order
    pub evaluation: Vec<EvaluationRow>,
    /// Mean absolute error over the evaluation subset
    pub mae: f64,
    /// Next-close estimate for the most recent complete row
    pub forecast: f64,
    /// Timestamp of the row the forecast was made from
    pub forecast_as_of: DateTime<Utc>,
    /// Model inputs, in training order
    pub feature_names: Vec<String>,
    /// Number of training rows
    pub train_size: usize,
}

impl ForecastResult {
    /// Column header of the evaluation table
    pub fn columns() -> [&'static str; 4] {
        ["Date", CLOSE, NEXT_CLOSE, PREDICTED_CLOSE]
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.evaluation.iter().map(|r| r.timestamp).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.evaluation.iter().map(|r| r.close).collect()
    }

    pub fn next_closes(&self) -> Vec<f64> {
        self.evaluation.iter().map(|r| r.next_close).collect()
    }

    pub fn predicted_closes(&self) -> Vec<f64> {
        self.evaluation.iter().map(|r| r.predicted_close).collect()
    }

    /// Write the evaluation table to CSV
    pub fn save_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(Self::columns())?;

        for row in &self.evaluation {
            writer.write_record(&[
                row.timestamp.to_rfc3339(),
                row.close.to_string(),
                row.next_close.to_string(),
                row.predicted_close.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}
