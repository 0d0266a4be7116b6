//! Next-close forecasting pipeline
//!
//! Feature table → next-close labels → seeded train/test split → fit →
//! evaluate (MAE) → one-step-ahead forecast. A run either returns a full
//! [`ForecastResult`] or fails; nothing is retried.

mod error;
mod result;

pub use error::ForecastError;
pub use result::{EvaluationRow, ForecastResult};

use crate::api::{HistoryRequest, PriceHistoryProvider};
use crate::data::{Dataset, PriceSeries};
use crate::features::{FeatureBuilder, FeatureColumn, FeatureTable, CLOSE};
use crate::models::{mean_absolute_error, Regressor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Default minimum number of labelled rows for a run
pub const DEFAULT_MIN_LABELED_ROWS: usize = 10;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fraction of labelled rows held out for evaluation
    pub test_fraction: f64,
    /// Seed of the train/test shuffle
    pub seed: u64,
    /// Fewer labelled rows than this fails with `InsufficientData`
    pub min_labeled_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            min_labeled_rows: DEFAULT_MIN_LABELED_ROWS,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), ForecastError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.min_labeled_rows == 0 {
            return Err(ForecastError::InvalidConfig(
                "min_labeled_rows must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Feature rows labelled with the following row's close
#[derive(Debug, Clone)]
pub struct Labeled {
    /// All rows but the last
    pub dataset: Dataset,
    /// Features of the last row, which has no label yet
    pub forecast_input: Vec<f64>,
    /// Timestamp of the last row
    pub forecast_as_of: DateTime<Utc>,
}

/// Attach next-close labels to `table`, projecting onto `columns`.
///
/// N rows produce N-1 labelled samples plus the unlabelled forecast input.
pub fn label_next_close(
    table: &FeatureTable,
    columns: &[FeatureColumn],
) -> Result<Labeled, ForecastError> {
    let rows = table.select(columns).ok_or_else(|| {
        let missing = columns
            .iter()
            .find(|c| !table.columns().contains(*c))
            .map(|c| c.name())
            .unwrap_or_default();
        ForecastError::MissingColumn(missing)
    })?;
    let closes = table
        .column(CLOSE)
        .ok_or_else(|| ForecastError::MissingColumn(CLOSE.to_string()))?;

    let (forecast_input, forecast_as_of) = match (rows.last(), table.timestamps().last()) {
        (Some(row), Some(ts)) => (row.clone(), *ts),
        _ => {
            return Err(ForecastError::InsufficientData {
                required: 1,
                available: 0,
            })
        }
    };

    let n_labeled = rows.len() - 1;
    let names = columns.iter().map(|c| c.name()).collect();
    let dataset = Dataset::from_data(
        rows[..n_labeled].to_vec(),
        closes[1..].to_vec(),
        names,
        table.timestamps()[..n_labeled].to_vec(),
    );

    Ok(Labeled {
        dataset,
        forecast_input,
        forecast_as_of,
    })
}

/// Forecasting pipeline
#[derive(Debug, Clone, Default)]
pub struct ForecastPipeline {
    config: PipelineConfig,
    features: FeatureBuilder,
}

impl ForecastPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            features: FeatureBuilder::new(),
        }
    }

    /// Use a custom feature recipe
    pub fn with_features(mut self, features: FeatureBuilder) -> Self {
        self.features = features;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn features(&self) -> &FeatureBuilder {
        &self.features
    }

    /// Fetch the series from `provider`, then [`run`](Self::run) on it.
    pub async fn fetch_and_run<P, R>(
        &self,
        provider: &P,
        request: &HistoryRequest,
        model: &mut R,
    ) -> Result<ForecastResult, ForecastError>
    where
        P: PriceHistoryProvider + ?Sized,
        R: Regressor,
    {
        let series = provider.fetch(request).await?;
        self.run(&series, model)
    }

    /// Train `model` on `series` and forecast the next close
    pub fn run<R: Regressor>(
        &self,
        series: &PriceSeries,
        model: &mut R,
    ) -> Result<ForecastResult, ForecastError> {
        self.config.validate()?;

        let table = self.features.build(series);
        let labeled = label_next_close(&table, self.features.training_columns())?;

        let available = labeled.dataset.n_samples();
        if available < self.config.min_labeled_rows {
            return Err(ForecastError::InsufficientData {
                required: self.config.min_labeled_rows,
                available,
            });
        }

        let split = labeled
            .dataset
            .random_split(self.config.test_fraction, self.config.seed);
        if split.train.is_empty() || split.test.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: available + 1,
                available,
            });
        }
        debug!(
            "Split {} labelled rows into {} train / {} test",
            available,
            split.train.n_samples(),
            split.test.n_samples()
        );

        model.fit(&split.train)?;

        let predictions = model.predict(&split.test.features);
        let mae = mean_absolute_error(&predictions, &split.test.labels);
        let forecast = model.predict_one(&labeled.forecast_input);

        let close_at: HashMap<DateTime<Utc>, f64> = table
            .timestamps()
            .iter()
            .copied()
            .zip(table.column(CLOSE).unwrap_or_default())
            .collect();

        let evaluation = split
            .test
            .timestamps
            .iter()
            .zip(split.test.labels.iter())
            .zip(predictions.iter())
            .map(|((ts, &next_close), &predicted_close)| EvaluationRow {
                timestamp: *ts,
                close: close_at.get(ts).copied().unwrap_or(f64::NAN),
                next_close,
                predicted_close,
            })
            .collect();

        info!(
            "{}: MAE {:.4} on {} test rows, next close forecast {:.4}",
            series.symbol(),
            mae,
            split.test.n_samples(),
            forecast
        );

        Ok(ForecastResult {
            symbol: series.symbol().to_string(),
            evaluation,
            mae,
            forecast,
            forecast_as_of: labeled.forecast_as_of,
            feature_names: self.features.training_column_names(),
            train_size: split.train.n_samples(),
        })
    }
}
