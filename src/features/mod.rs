//! Feature engineering module
//!
//! Technical indicators and the feature table the forecasting model trains on.

mod engine;
mod indicators;

pub use engine::{FeatureBuilder, FeatureColumn, FeatureTable, CLOSE, NEXT_CLOSE, PREDICTED_CLOSE};
pub use indicators::*;
