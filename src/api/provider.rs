use super::error::ProviderResult;
use super::types::HistoryRequest;
use crate::data::PriceSeries;
use async_trait::async_trait;

/// Source of historical price series.
///
/// Failures are returned as-is; callers do not retry.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch(&self, request: &HistoryRequest) -> ProviderResult<PriceSeries>;
}
