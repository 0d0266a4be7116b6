//! Technical indicators implementation
//!
//! Every function returns one value per input position. `None` marks a
//! position where the indicator is not defined (warm-up window).

use crate::data::PriceSeries;

/// Indicator values aligned 1:1 with their source series
pub type IndicatorColumn = Vec<Option<f64>>;

/// RSI returned when both average gain and average loss are zero
pub const RSI_FLAT: f64 = 50.0;

/// Simple Moving Average over the trailing `period` values.
///
/// Undefined until a full window is available.
pub fn sma(values: &[f64], period: usize) -> IndicatorColumn {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }

    let mut result = vec![None; period - 1];

    for i in (period - 1)..values.len() {
        let sum: f64 = values[(i + 1 - period)..=i].iter().sum();
        result.push(Some(sum / period as f64));
    }

    result
}

/// Sample standard deviation (n - 1 denominator) over the trailing window.
///
/// Same warm-up policy as [`sma`]. A window shorter than 2 has no sample
/// deviation, so every position is undefined.
pub fn rolling_std(values: &[f64], period: usize) -> IndicatorColumn {
    if period < 2 || values.len() < period {
        return vec![None; values.len()];
    }

    let mut result = vec![None; period - 1];

    for i in (period - 1)..values.len() {
        let slice = &values[(i + 1 - period)..=i];
        // Shift by the first value so a constant window is exactly zero
        let shift = slice[0];
        let (sum, sum_sq) = slice.iter().fold((0.0, 0.0), |(s, sq), v| {
            let d = v - shift;
            (s + d, sq + d * d)
        });
        let n = period as f64;
        let variance = ((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0);
        result.push(Some(variance.sqrt()));
    }

    result
}

/// Bollinger Bands
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: IndicatorColumn,
    pub upper: IndicatorColumn,
    pub lower: IndicatorColumn,
}

/// Bollinger Bands: SMA(`period`) ± `std_dev` sample standard deviations.
pub fn bollinger_bands(values: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let middle = sma(values, period);
    let std = rolling_std(values, period);

    let (upper, lower) = middle
        .iter()
        .zip(std.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + std_dev * s), Some(m - std_dev * s)),
            _ => (None, None),
        })
        .unzip();

    BollingerBands {
        middle,
        upper,
        lower,
    }
}

/// Relative Strength Index.
///
/// Average gain and loss are trailing means with a minimum of one period, so
/// the first `period - 1` positions average over a shrinking window instead
/// of being undefined. Position 0 has no price change and is undefined.
///
/// Zero average loss saturates at 100 when there was any gain, and yields
/// [`RSI_FLAT`] when there was no movement at all.
pub fn rsi(values: &[f64], period: usize) -> IndicatorColumn {
    let n = values.len();
    if period == 0 || n == 0 {
        return vec![None; n];
    }

    // The undefined first change counts as neither gain nor loss
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = values[i] - values[i - 1];
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let mut result = vec![None; n];

    for i in 1..n {
        let start = (i + 1).saturating_sub(period);
        let count = (i + 1 - start) as f64;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / count;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / count;
        result[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            100.0
        } else {
            RSI_FLAT
        }
    } else {
        let rs = avg_gain / avg_loss;
        (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
    }
}

/// Day-over-day fractional change. Undefined at 0 and after a zero value.
pub fn pct_change(values: &[f64]) -> IndicatorColumn {
    let mut result = vec![None; values.len()];

    for i in 1..values.len() {
        if values[i - 1] != 0.0 {
            result[i] = Some((values[i] - values[i - 1]) / values[i - 1]);
        }
    }

    result
}

/// [`sma`] over the closes of a series
pub fn simple_moving_average(series: &PriceSeries, period: usize) -> IndicatorColumn {
    sma(&series.closes(), period)
}

/// [`rolling_std`] over the closes of a series
pub fn close_volatility(series: &PriceSeries, period: usize) -> IndicatorColumn {
    rolling_std(&series.closes(), period)
}

/// [`bollinger_bands`] over the closes of a series
pub fn close_bollinger_bands(series: &PriceSeries, period: usize, std_dev: f64) -> BollingerBands {
    bollinger_bands(&series.closes(), period, std_dev)
}

/// [`rsi`] over the closes of a series
pub fn relative_strength_index(series: &PriceSeries, period: usize) -> IndicatorColumn {
    rsi(&series.closes(), period)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_sma() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&values, 3);

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert_close(result[2], 2.0);
        assert_close(result[3], 3.0);
        assert_close(result[4], 4.0);
    }

    #[test]
    fn test_sma_matches_trailing_mean() {
        let values: Vec<f64> = (0..40).map(|i| ((i * 7) % 11) as f64 + 0.5).collect();
        let window = 6;
        let result = sma(&values, window);

        for (i, value) in result.iter().enumerate() {
            if i < window - 1 {
                assert!(value.is_none());
            } else {
                let expected = values[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                assert_close(*value, expected);
            }
        }
    }

    #[test]
    fn test_sma_short_series() {
        assert_eq!(sma(&[1.0, 2.0], 5), vec![None, None]);
        assert_eq!(sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_rolling_std_sample_deviation() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&values, 8);
        // Sample variance of the classic example is 32 / 7
        assert_close(result[7], (32.0_f64 / 7.0).sqrt());
        assert!(result[6].is_none());
    }

    #[test]
    fn test_constant_series_has_zero_std_and_collapsed_bands() {
        let values = vec![3.3; 30];
        let std = rolling_std(&values, 20);
        let bands = bollinger_bands(&values, 20, 2.0);

        for i in 0..values.len() {
            if i < 19 {
                assert!(std[i].is_none());
                assert!(bands.upper[i].is_none());
                assert!(bands.lower[i].is_none());
            } else {
                assert_eq!(std[i], Some(0.0));
                assert_eq!(bands.upper[i], bands.middle[i]);
                assert_eq!(bands.lower[i], bands.middle[i]);
            }
        }
    }

    #[test]
    fn test_bollinger_band_width() {
        let values: Vec<f64> = (1..=25).map(|i| i as f64).collect();
        let bands = bollinger_bands(&values, 20, 2.0);
        let std = rolling_std(&values, 20);

        let mid = bands.middle[24].unwrap();
        let s = std[24].unwrap();
        assert_close(bands.upper[24], mid + 2.0 * s);
        assert_close(bands.lower[24], mid - 2.0 * s);
    }

    #[test]
    fn test_rsi_defined_from_first_change() {
        let values = vec![10.0, 11.0, 10.5, 12.0];
        let result = rsi(&values, 14);

        assert!(result[0].is_none());
        assert!(result[1..].iter().all(|v| v.is_some()));
        // First change is a pure gain
        assert_eq!(result[1], Some(100.0));
        // gains 1.0 + 1.5, losses 0.5 -> rs = 5
        assert_close(result[3], 100.0 - 100.0 / 6.0);
    }

    #[test]
    fn test_rsi_rising_prices_saturate() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&values, 14);
        assert!(result[1..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_rsi_flat_prices_are_defined() {
        let result = rsi(&[5.0; 10], 14);
        assert!(result[1..].iter().all(|v| *v == Some(RSI_FLAT)));
    }

    #[test]
    fn test_rsi_falling_prices() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let result = rsi(&values, 14);
        assert!(result[1..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn test_rsi_bounded() {
        let values: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 15.0 + (i % 7) as f64)
            .collect();

        for value in rsi(&values, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
            assert!(!value.is_nan());
        }
    }

    #[test]
    fn test_rsi_full_window_drops_old_changes() {
        // The early loss leaves the 3-period window at position 4
        let values = vec![10.0, 9.0, 10.0, 11.0, 12.0];
        let result = rsi(&values, 3);
        assert_eq!(result[4], Some(100.0));
        assert!(result[2].unwrap() < 100.0);
    }

    #[test]
    fn test_pct_change() {
        let result = pct_change(&[100.0, 110.0, 0.0, 5.0]);
        assert_eq!(result[0], None);
        assert_close(result[1], 0.1);
        assert_close(result[2], -1.0);
        assert_eq!(result[3], None);
    }
}
