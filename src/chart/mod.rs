//! Chart rendering module
//!
//! PNG charts of price series, indicators and forecast results. Call
//! [`ChartStyle::init`] once before plotting and pass the style to every
//! plot function.

mod forecast;
mod price;

pub use forecast::plot_predicted_vs_actual;
pub use price::{plot_bollinger_chart, plot_price_chart, plot_rsi_chart};

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

/// Result of a plot call; plotters backend errors are boxed
pub type ChartResult = Result<(), Box<dyn std::error::Error>>;

static STYLE: OnceLock<ChartStyle> = OnceLock::new();

/// Locations of the Nanum fonts on common Linux distributions
const NANUM_DIRS: [&str; 3] = [
    "/usr/share/fonts/truetype/nanum",
    "/usr/share/fonts/nanum",
    "/usr/share/fonts/naver-nanum",
];

/// Fonts and canvas size shared by all charts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartStyle {
    /// Font family able to render Hangul labels where one is installed
    pub font_family: &'static str,
    /// Canvas size in pixels
    pub size: (u32, u32),
    /// Canvas size of oscillator charts
    pub oscillator_size: (u32, u32),
}

impl ChartStyle {
    /// Resolve the chart style. Only the first call inspects the system;
    /// later calls return the same instance.
    pub fn init() -> &'static ChartStyle {
        STYLE.get_or_init(|| {
            let style = ChartStyle {
                font_family: detect_font_family(),
                size: (1200, 600),
                oscillator_size: (1200, 400),
            };
            info!("Chart font family: {}", style.font_family);
            style
        })
    }
}

fn detect_font_family() -> &'static str {
    if Path::new("/System/Library/Fonts/Supplemental").is_dir() {
        "AppleGothic"
    } else if Path::new("C:/Windows/Fonts").is_dir() {
        "Malgun Gothic"
    } else if NANUM_DIRS.iter().any(|dir| Path::new(dir).is_dir()) {
        "NanumGothic"
    } else {
        "sans-serif"
    }
}

/// Padded (min, max) over all finite values; (0, 1) when there are none
fn value_range<'a>(columns: impl IntoIterator<Item = &'a [Option<f64>]>) -> (f64, f64) {
    let (lo, hi) = columns
        .into_iter()
        .flat_map(|col| col.iter().flatten())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Defined points of a column, keyed by position
fn defined_points(column: &[Option<f64>]) -> Vec<(usize, f64)> {
    column
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect()
}

/// Axis label for position `i`
fn date_label(dates: &[DateTime<Utc>], i: usize) -> String {
    dates
        .get(i)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_init_is_idempotent() {
        let a = ChartStyle::init();
        let b = ChartStyle::init();
        assert!(std::ptr::eq(a, b));
        assert!(!a.font_family.is_empty());
    }

    #[test]
    fn test_value_range() {
        let a = vec![None, Some(10.0), Some(20.0)];
        let b = vec![Some(15.0), None, Some(f64::NAN)];
        let (lo, hi) = value_range([a.as_slice(), b.as_slice()]);
        assert!((lo - 9.5).abs() < 1e-12);
        assert!((hi - 20.5).abs() < 1e-12);

        let flat = vec![Some(5.0); 3];
        assert_eq!(value_range([flat.as_slice()]), (4.0, 6.0));

        let empty: Vec<Option<f64>> = vec![None];
        assert_eq!(value_range([empty.as_slice()]), (0.0, 1.0));
    }

    #[test]
    fn test_defined_points_skip_warm_up() {
        let points = defined_points(&[None, None, Some(1.0), Some(2.0)]);
        assert_eq!(points, vec![(2, 1.0), (3, 2.0)]);
    }

    #[test]
    fn test_date_label() {
        let dates = vec![Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()];
        assert_eq!(date_label(&dates, 0), "2024-03-05");
        assert_eq!(date_label(&dates, 7), "");
    }
}
