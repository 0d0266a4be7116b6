//! Feature table construction

use super::indicators::*;
use crate::data::PriceSeries;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Column name of the close price
pub const CLOSE: &str = "Close";
/// Column name of the realised next-period close
pub const NEXT_CLOSE: &str = "Next_Close";
/// Column name of the model's next-period close estimate
pub const PREDICTED_CLOSE: &str = "Predicted_Close";

/// Columns that can appear in a feature table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
    /// Day-over-day return of the close
    Return,
    /// Simple Moving Average of the close
    Sma(usize),
    /// Rolling sample standard deviation of the close
    Volatility(usize),
}

impl FeatureColumn {
    pub fn name(&self) -> String {
        match self {
            FeatureColumn::Open => "Open".to_string(),
            FeatureColumn::High => "High".to_string(),
            FeatureColumn::Low => "Low".to_string(),
            FeatureColumn::Close => CLOSE.to_string(),
            FeatureColumn::Volume => "Volume".to_string(),
            FeatureColumn::Return => "Return".to_string(),
            FeatureColumn::Sma(p) => format!("SMA_{}", p),
            FeatureColumn::Volatility(20) => "Volatility".to_string(),
            FeatureColumn::Volatility(p) => format!("Volatility_{}", p),
        }
    }

    /// Number of leading bars for which the column is undefined, plus one
    pub fn warm_up(&self) -> usize {
        match self {
            FeatureColumn::Open
            | FeatureColumn::High
            | FeatureColumn::Low
            | FeatureColumn::Close
            | FeatureColumn::Volume => 1,
            FeatureColumn::Return => 2,
            FeatureColumn::Sma(p) | FeatureColumn::Volatility(p) => *p,
        }
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorColumn {
        let defined = |values: Vec<f64>| values.into_iter().map(Some).collect();
        match self {
            FeatureColumn::Open => defined(series.opens()),
            FeatureColumn::High => defined(series.highs()),
            FeatureColumn::Low => defined(series.lows()),
            FeatureColumn::Close => defined(series.closes()),
            FeatureColumn::Volume => defined(series.volumes()),
            FeatureColumn::Return => pct_change(&series.closes()),
            FeatureColumn::Sma(p) => simple_moving_average(series, *p),
            FeatureColumn::Volatility(p) => close_volatility(series, *p),
        }
    }
}

/// Complete rows of raw prices and derived indicators on a shared time index
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Vec<FeatureColumn>,
    timestamps: Vec<DateTime<Utc>>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, column: FeatureColumn) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Values of one column by name
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c.name() == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Row-major values restricted to `columns`, in that order.
    ///
    /// Returns `None` if a requested column is not part of the table.
    pub fn select(&self, columns: &[FeatureColumn]) -> Option<Vec<Vec<f64>>> {
        let positions = columns
            .iter()
            .map(|c| self.position(*c))
            .collect::<Option<Vec<_>>>()?;

        Some(
            self.rows
                .iter()
                .map(|row| positions.iter().map(|&p| row[p]).collect())
                .collect(),
        )
    }
}

/// Builds feature tables from a fixed column recipe
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    columns: Vec<FeatureColumn>,
    training_columns: Vec<FeatureColumn>,
}

impl FeatureBuilder {
    /// Builder with the default recipe
    pub fn new() -> Self {
        Self {
            columns: Self::default_columns(),
            training_columns: Self::default_training_columns(),
        }
    }

    /// Builder with a custom recipe.
    ///
    /// Training columns and `Close` (the label source) are appended to
    /// `columns` when missing.
    pub fn with_columns(columns: Vec<FeatureColumn>, training_columns: Vec<FeatureColumn>) -> Self {
        let mut columns = columns;
        for column in training_columns.iter().chain([FeatureColumn::Close].iter()) {
            if !columns.contains(column) {
                columns.push(*column);
            }
        }
        Self {
            columns,
            training_columns,
        }
    }

    /// OHLCV, return, SMA 20/50 and 20-bar volatility
    pub fn default_columns() -> Vec<FeatureColumn> {
        vec![
            FeatureColumn::Open,
            FeatureColumn::High,
            FeatureColumn::Low,
            FeatureColumn::Close,
            FeatureColumn::Volume,
            FeatureColumn::Return,
            FeatureColumn::Sma(20),
            FeatureColumn::Sma(50),
            FeatureColumn::Volatility(20),
        ]
    }

    /// Model inputs, in the order the regressor sees them
    pub fn default_training_columns() -> Vec<FeatureColumn> {
        vec![
            FeatureColumn::Open,
            FeatureColumn::High,
            FeatureColumn::Low,
            FeatureColumn::Close,
            FeatureColumn::Volume,
            FeatureColumn::Sma(20),
            FeatureColumn::Sma(50),
            FeatureColumn::Volatility(20),
        ]
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn training_columns(&self) -> &[FeatureColumn] {
        &self.training_columns
    }

    pub fn training_column_names(&self) -> Vec<String> {
        self.training_columns.iter().map(|c| c.name()).collect()
    }

    /// Longest warm-up across the recipe
    pub fn required_lookback(&self) -> usize {
        self.columns.iter().map(|c| c.warm_up()).max().unwrap_or(1)
    }

    /// Compute every column and keep only rows where all are defined
    pub fn build(&self, series: &PriceSeries) -> FeatureTable {
        let computed: Vec<IndicatorColumn> =
            self.columns.iter().map(|c| c.compute(series)).collect();

        let mut timestamps = Vec::new();
        let mut rows = Vec::new();

        for (i, bar) in series.bars().iter().enumerate() {
            let row: Option<Vec<f64>> = computed
                .iter()
                .map(|col| col[i].filter(|v| v.is_finite()))
                .collect();

            if let Some(row) = row {
                timestamps.push(bar.timestamp);
                rows.push(row);
            }
        }

        debug!(
            "Built feature table: {} of {} bars complete",
            rows.len(),
            series.len()
        );

        FeatureTable {
            columns: self.columns.clone(),
            timestamps,
            rows,
        }
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use chrono::{Duration, TimeZone};

    fn sample_series(n: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..n)
            .map(|i| {
                let price = 100.0 + (i as f64 * 0.1).sin() * 10.0;
                PriceBar::new(
                    start + Duration::days(i as i64),
                    price,
                    price + 1.0,
                    price - 1.0,
                    price + 0.5,
                    1000.0 + i as f64,
                )
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_feature_generation() {
        let builder = FeatureBuilder::new();
        let table = builder.build(&sample_series(100));

        assert_eq!(table.n_rows(), 100 - (builder.required_lookback() - 1));
        assert_eq!(table.n_rows(), 51);
        assert!(table.rows().iter().all(|r| r.iter().all(|v| v.is_finite())));
        assert_eq!(table.timestamps().len(), table.n_rows());
    }

    #[test]
    fn test_short_series_has_no_rows() {
        let table = FeatureBuilder::new().build(&sample_series(49));
        assert!(table.is_empty());
    }

    #[test]
    fn test_column_names_and_order() {
        let builder = FeatureBuilder::new();
        assert_eq!(
            builder.training_column_names(),
            vec!["Open", "High", "Low", "Close", "Volume", "SMA_20", "SMA_50", "Volatility"]
        );

        let table = builder.build(&sample_series(60));
        assert_eq!(
            table.column_names(),
            vec![
                "Open",
                "High",
                "Low",
                "Close",
                "Volume",
                "Return",
                "SMA_20",
                "SMA_50",
                "Volatility"
            ]
        );
    }

    #[test]
    fn test_table_starts_after_warm_up() {
        let series = sample_series(60);
        let table = FeatureBuilder::new().build(&series);
        assert_eq!(table.timestamps()[0], series.bars()[49].timestamp);

        let closes = table.column(CLOSE).unwrap();
        assert_eq!(closes[0], series.bars()[49].close);
    }

    #[test]
    fn test_select_follows_requested_order() {
        let table = FeatureBuilder::new().build(&sample_series(60));
        let selected = table
            .select(&[FeatureColumn::Close, FeatureColumn::Open])
            .unwrap();
        assert_eq!(selected[0][0], table.column("Close").unwrap()[0]);
        assert_eq!(selected[0][1], table.column("Open").unwrap()[0]);

        assert!(table.select(&[FeatureColumn::Sma(5)]).is_none());
    }

    #[test]
    fn test_custom_recipe_adds_training_columns() {
        let builder = FeatureBuilder::with_columns(
            vec![FeatureColumn::Close],
            vec![FeatureColumn::Close, FeatureColumn::Sma(5)],
        );
        assert_eq!(builder.columns().len(), 2);
        assert_eq!(builder.required_lookback(), 5);
        assert_eq!(builder.build(&sample_series(10)).n_rows(), 6);
    }
}
