//! API error types

use crate::data::DataError;
use thiserror::Error;

/// Errors raised by a price-history provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("API returned error: {code} - {message}")]
    ApiResponseError { code: String, message: String },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid price series: {0}")]
    InvalidSeries(#[from] DataError),

    #[error("No data available")]
    NoData,
}

/// Result type alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
