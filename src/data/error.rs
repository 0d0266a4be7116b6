//! Data layer error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while building or loading price data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("timestamps must be strictly increasing: bar {position} at {timestamp} does not follow its predecessor")]
    UnorderedTimestamps {
        position: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
