//! Forecast evaluation chart

use super::{date_label, value_range, ChartResult, ChartStyle};
use crate::pipeline::ForecastResult;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Realised next close against the model's estimate over the evaluation rows
pub fn plot_predicted_vs_actual(
    style: &ChartStyle,
    result: &ForecastResult,
    path: &Path,
) -> ChartResult {
    let actual: Vec<Option<f64>> = result.next_closes().into_iter().map(Some).collect();
    let predicted: Vec<Option<f64>> = result.predicted_closes().into_iter().map(Some).collect();
    let dates = result.timestamps();
    let n = result.evaluation.len().max(1);

    let (lo, hi) = value_range([actual.as_slice(), predicted.as_slice()]);

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} Next Close: Actual vs Predicted", result.symbol),
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
        .draw_series(LineSeries::new(
            result.evaluation.iter().enumerate().map(|(i, r)| (i, r.next_close)),
            &BLUE,
        ))?
        .label("Actual Close Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            result
                .evaluation
                .iter()
                .enumerate()
                .map(|(i, r)| (i, r.predicted_close)),
            &RED,
        ))?
        .label("Predicted Close Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((style.font_family, 14).into_font())
        .draw()?;

    root.present()?;
    info!(
        "Forecast chart saved to {} (MAE {:.4})",
        path.display(),
        result.mae
    );
    Ok(())
}
