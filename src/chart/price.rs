//! Price and indicator charts

use super::{date_label, defined_points, value_range, ChartResult, ChartStyle};
use crate::data::PriceSeries;
use crate::features::{close_bollinger_bands, relative_strength_index, simple_moving_average};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

const BAND_FILL: RGBColor = RGBColor(128, 128, 128);
const ORANGE: RGBColor = RGBColor(255, 140, 0);

/// Close price with 20 and 50 bar moving averages
pub fn plot_price_chart(style: &ChartStyle, series: &PriceSeries, path: &Path) -> ChartResult {
    let close_col: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();
    let sma20 = simple_moving_average(series, 20);
    let sma50 = simple_moving_average(series, 50);
    let dates = series.timestamps();
    let n = series.len().max(1);

    let (lo, hi) = value_range([close_col.as_slice(), sma20.as_slice(), sma50.as_slice()]);

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} Close Price", series.symbol()),
            (style.font_family, 28).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0..n, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&|i| date_label(&dates, *i))
        .label_style((style.font_family, 14).into_font())
        .draw()?;

    chart
        .draw_series(LineSeries::new(defined_points(&close_col), &BLUE))?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(defined_points(&sma20), &ORANGE))?
        .label("SMA 20")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE));

    chart
        .draw_series(LineSeries::new(defined_points(&sma50), &GREEN))?
        .label("SMA 50")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((style.font_family, 14).into_font())
        .draw()?;

    root.present()?;
    info!("Price chart saved to {}", path.display());
    Ok(())
}

/// Close price inside its Bollinger Bands, the band area shaded
pub fn plot_bollinger_chart(
    style: &ChartStyle,
    series: &PriceSeries,
    window: usize,
    path: &Path,
) -> ChartResult {
    let close_col: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();
    let bands = close_bollinger_bands(series, window, 2.0);
    let dates = series.timestamps();
    let n = series.len().max(1);

    let (lo, hi) = value_range([
        close_col.as_slice(),
        bands.upper.as_slice(),
        bands.lower.as_slice(),
    ]);

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} Bollinger Bands ({})", series.symbol(), window),
            (style.font_family, 28).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0..n, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&|i| date_label(&dates, *i))
        .label_style((style.font_family, 14).into_font())
        .draw()?;

    let upper = defined_points(&bands.upper);
    let lower = defined_points(&bands.lower);
    if !upper.is_empty() {
        let outline: Vec<(usize, f64)> = upper.iter().chain(lower.iter().rev()).copied().collect();
        chart
            .draw_series(std::iter::once(Polygon::new(
                outline,
                BAND_FILL.mix(0.3).filled(),
            )))?
            .label("Band")
            .legend(|(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], BAND_FILL.mix(0.3).filled())
            });
    }

    chart
        .draw_series(LineSeries::new(defined_points(&close_col), &BLUE))?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(defined_points(&bands.middle), &ORANGE))?
        .label(format!("SMA {}", window))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((style.font_family, 14).into_font())
        .draw()?;

    root.present()?;
    info!("Bollinger chart saved to {}", path.display());
    Ok(())
}

/// RSI with the 70/30 overbought and oversold levels
pub fn plot_rsi_chart(
    style: &ChartStyle,
    series: &PriceSeries,
    window: usize,
    path: &Path,
) -> ChartResult {
    let values = relative_strength_index(series, window);
    let dates = series.timestamps();
    let n = series.len().max(1);

    let root = BitMapBackend::new(path, style.oscillator_size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} RSI ({})", series.symbol(), window),
            (style.font_family, 24).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..n, 0.0..100.0)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("RSI")
        .x_label_formatter(&|i| date_label(&dates, *i))
        .label_style((style.font_family, 14).into_font())
        .draw()?;

    chart
        .draw_series(LineSeries::new(defined_points(&values), &BLUE))?
        .label("RSI")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    let last = n - 1;
    chart
        .draw_series(LineSeries::new(vec![(0, 70.0), (last, 70.0)], &RED))?
        .label("Overbought (70)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .draw_series(LineSeries::new(vec![(0, 30.0), (last, 30.0)], &GREEN))?
        .label("Oversold (30)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((style.font_family, 14).into_font())
        .draw()?;

    root.present()?;
    info!("RSI chart saved to {}", path.display());
    Ok(())
}
