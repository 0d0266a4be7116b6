//! Chronological price series for one instrument

use super::bar::PriceBar;
use super::error::DataError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Ordered OHLCV bars for a single instrument.
///
/// Timestamps are strictly increasing; this is checked on construction and
/// the bars cannot be mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting duplicate or out-of-order timestamps.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, DataError> {
        if let Some(position) = bars
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(DataError::UnorderedTimestamps {
                position: position + 1,
                timestamp: bars[position + 1].timestamp,
            });
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Save bars to a CSV file (`timestamp,open,high,low,close,volume`)
    pub fn save_csv(&self, path: &Path) -> Result<(), DataError> {
        let mut writer = csv::Writer::from_path(path)?;
        for bar in &self.bars {
            writer.serialize(bar)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load bars previously written by [`PriceSeries::save_csv`]
    pub fn load_csv(symbol: impl Into<String>, path: &Path) -> Result<Self, DataError> {
        let mut reader = csv::Reader::from_path(path)?;
        let bars = reader
            .deserialize::<PriceBar>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(symbol, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(day: i64, close: f64) -> PriceBar {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        PriceBar::new(ts, close, close + 1.0, close - 1.0, close, 1_000.0)
    }

    #[test]
    fn test_rejects_duplicate_timestamps() {
        let result = PriceSeries::new("AAPL", vec![bar(0, 1.0), bar(1, 2.0), bar(1, 3.0)]);
        match result {
            Err(DataError::UnorderedTimestamps { position, .. }) => assert_eq!(position, 2),
            other => panic!("expected UnorderedTimestamps, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_backwards_timestamps() {
        assert!(PriceSeries::new("AAPL", vec![bar(3, 1.0), bar(2, 2.0)]).is_err());
    }

    #[test]
    fn test_accessors() {
        let series = PriceSeries::new("AAPL", vec![bar(0, 10.0), bar(1, 11.0)]).unwrap();
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 11.0]);
        assert_eq!(series.highs(), vec![11.0, 12.0]);
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aapl.csv");

        let series =
            PriceSeries::new("AAPL", (0..5).map(|d| bar(d, 100.0 + d as f64)).collect()).unwrap();
        series.save_csv(&path).unwrap();

        let loaded = PriceSeries::load_csv("AAPL", &path).unwrap();
        assert_eq!(loaded, series);
    }
}
