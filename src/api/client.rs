//! Yahoo Finance chart API client

use super::error::{ProviderError, ProviderResult};
use super::provider::PriceHistoryProvider;
use super::types::{ChartResponse, HistoryRequest};
use crate::data::{PriceBar, PriceSeries};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Price history client backed by the Yahoo Finance chart endpoint
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    /// Create a new client
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create client against another endpoint (mirrors, local stubs)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, request: &HistoryRequest) -> String {
        format!(
            "{}/{}?range={}&interval={}",
            self.base_url,
            request.symbol.as_ref(),
            request.period.as_str(),
            request.interval.as_str()
        )
    }

    /// Fetch OHLCV bars for `request`
    pub async fn get_history(&self, request: &HistoryRequest) -> ProviderResult<PriceSeries> {
        let url = self.url(request);
        debug!("Fetching chart from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded);
        }

        // Error responses still carry a JSON chart body
        let body = response.text().await?;
        let series = parse_chart(request.symbol.as_ref(), &body)?;

        info!(
            "Fetched {} {} bars for {} ({})",
            series.len(),
            request.interval,
            request.symbol,
            request.period
        );
        Ok(series)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooClient {
    async fn fetch(&self, request: &HistoryRequest) -> ProviderResult<PriceSeries> {
        self.get_history(request).await
    }
}

/// Convert a chart response body into a price series.
///
/// Bars with any missing OHLCV value are skipped; when a timestamp repeats
/// (live intraday bar) the later bar wins.
pub fn parse_chart(symbol: &str, body: &str) -> ProviderResult<PriceSeries> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(if error.code == "Not Found" {
            ProviderError::UnknownSymbol(symbol.to_string())
        } else {
            ProviderError::ApiResponseError {
                code: error.code,
                message: error.description,
            }
        });
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(ProviderError::NoData)?;
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or(ProviderError::NoData)?;

    let mut bars: Vec<PriceBar> = Vec::with_capacity(data.timestamp.len());
    let mut skipped = 0;

    for (i, &ts) in data.timestamp.iter().enumerate() {
        let value = |column: &[Option<f64>]| column.get(i).copied().flatten();
        let fields = (
            DateTime::from_timestamp(ts, 0),
            value(&quote.open),
            value(&quote.high),
            value(&quote.low),
            value(&quote.close),
            value(&quote.volume),
        );

        let bar = match fields {
            (Some(timestamp), Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                PriceBar::new(timestamp, open, high, low, close, volume)
            }
            _ => {
                skipped += 1;
                continue;
            }
        };

        match bars.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => bars.push(bar),
        }
    }

    if skipped > 0 {
        warn!("Skipped {} incomplete bars for {}", skipped, symbol);
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData);
    }

    Ok(PriceSeries::new(symbol, bars)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Interval, Period};

    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "currency": "USD"},
                "timestamp": [1704205800, 1704292200, 1704378600, 1704465000, 1704465000],
                "indicators": {
                    "quote": [{
                        "open":   [187.15, 184.22, null,   181.99, 182.10],
                        "high":   [188.44, 185.88, 183.09, 182.76, 182.90],
                        "low":    [183.89, 183.43, 180.88, 180.17, 180.20],
                        "close":  [185.64, 184.25, 181.91, 181.18, 181.50],
                        "volume": [82488700, 58414500, 71983600, 62303300, 62400000]
                    }],
                    "adjclose": [{"adjclose": [185.40, 184.01, 181.67, 180.94, 181.26]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart() {
        let series = parse_chart("AAPL", BODY).unwrap();

        // One bar has a null open, one timestamp repeats
        assert_eq!(series.len(), 3);
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.closes(), vec![185.64, 184.25, 181.50]);
        assert_eq!(series.bars()[0].volume, 82_488_700.0);
        assert_eq!(series.bars()[0].timestamp.timestamp(), 1_704_205_800);
    }

    #[test]
    fn test_parse_unknown_symbol() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(
            parse_chart("NOPE", body),
            Err(ProviderError::UnknownSymbol(s)) if s == "NOPE"
        ));
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=7h is not supported"}}}"#;
        assert!(matches!(
            parse_chart("AAPL", body),
            Err(ProviderError::ApiResponseError { code, .. }) if code == "Bad Request"
        ));
    }

    #[test]
    fn test_parse_empty_result() {
        let body = r#"{"chart":{"result":[{"timestamp":[],"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(parse_chart("AAPL", body), Err(ProviderError::NoData)));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_chart("AAPL", "<html>"),
            Err(ProviderError::JsonParseError(_))
        ));
    }

    #[test]
    fn test_url() {
        let client = YahooClient::with_base_url("http://localhost:8080/chart/");
        let request = HistoryRequest::new("MSFT", Period::Month3, Interval::Day1);
        assert_eq!(
            client.url(&request),
            "http://localhost:8080/chart/MSFT?range=3mo&interval=1d"
        );
    }
}
