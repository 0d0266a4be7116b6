//! Price history API module
//!
//! Provides the provider abstraction and an async client for historical
//! OHLCV data from the Yahoo Finance chart endpoint.

mod client;
mod error;
mod provider;
mod types;

pub use client::{parse_chart, YahooClient};
pub use error::{ProviderError, ProviderResult};
pub use provider::PriceHistoryProvider;
pub use types::{HistoryRequest, Interval, Period, Symbol};
