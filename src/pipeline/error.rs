//! Forecast pipeline error types

use crate::api::ProviderError;
use crate::models::ModelFitError;
use thiserror::Error;

/// Terminal failures of a forecast request
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("price history unavailable: {0}")]
    Provider(#[from] ProviderError),

    #[error("insufficient data: {available} labelled rows, at least {required} required")]
    InsufficientData { required: usize, available: usize },

    #[error("model fit failed: {0}")]
    ModelFit(#[from] ModelFitError),

    #[error("feature table has no '{0}' column")]
    MissingColumn(String),

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
