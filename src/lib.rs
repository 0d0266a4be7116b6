//! # Price Forecast - next-close forecasting for equities
//!
//! This library fetches daily price history, derives technical indicators
//! and trains a Random Forest regressor to forecast the next period's close.
//!
//! ## Modules
//!
//! - `api` - Yahoo Finance client behind the `PriceHistoryProvider` trait
//! - `data` - Price bars, validated series and the supervised dataset
//! - `features` - SMA, volatility, Bollinger Bands, RSI and feature tables
//! - `models` - Decision Tree and Random Forest regressors
//! - `pipeline` - Labelling, train/test split, evaluation and forecast
//! - `chart` - PNG charts of prices, indicators and forecasts

pub mod api;
pub mod chart;
pub mod data;
pub mod features;
pub mod models;
pub mod pipeline;

pub use api::YahooClient;
pub use data::{Dataset, PriceBar, PriceSeries};
pub use features::FeatureBuilder;
pub use models::{DecisionTree, RandomForest, Regressor};
pub use pipeline::{ForecastPipeline, ForecastResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{HistoryRequest, Interval, Period, PriceHistoryProvider, YahooClient};
    pub use crate::chart::ChartStyle;
    pub use crate::data::{Dataset, PriceBar, PriceSeries, Split};
    pub use crate::features::{FeatureBuilder, FeatureColumn, FeatureTable};
    pub use crate::models::{DecisionTree, ForestConfig, RandomForest, Regressor, TreeConfig};
    pub use crate::pipeline::{ForecastError, ForecastPipeline, ForecastResult, PipelineConfig};
}
