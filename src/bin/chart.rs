//! Render price and indicator charts
//!
//! Usage: cargo run --bin chart -- --symbol AAPL --kind bollinger --output bb.png

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use price_forecast::api::{HistoryRequest, Interval, Period, YahooClient};
use price_forecast::chart::{plot_bollinger_chart, plot_price_chart, plot_rsi_chart, ChartStyle};
use price_forecast::data::PriceSeries;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChartKind {
    /// Close with SMA 20 and SMA 50
    Price,
    /// Close inside Bollinger Bands
    Bollinger,
    /// Relative Strength Index
    Rsi,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Render price and indicator charts")]
struct Args {
    /// Ticker symbol
    #[arg(short, long, default_value = "AAPL")]
    symbol: String,

    /// Look-back period
    #[arg(short, long, default_value = "3mo")]
    period: String,

    /// Bar interval
    #[arg(short, long, default_value = "1d")]
    interval: String,

    /// Read bars from a CSV written by fetch_data instead of fetching
    #[arg(long)]
    input: Option<PathBuf>,

    /// Chart to render
    #[arg(short, long, value_enum, default_value = "price")]
    kind: ChartKind,

    /// Indicator window (Bollinger, RSI)
    #[arg(short, long, default_value = "20")]
    window: usize,

    /// Output PNG path
    #[arg(short, long, default_value = "chart.png")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("price_forecast=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let series = match &args.input {
        Some(path) => PriceSeries::load_csv(&args.symbol, path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let period: Period = args.period.parse()?;
            let interval: Interval = args.interval.parse()?;
            let request = HistoryRequest::new(&args.symbol, period, interval);
            YahooClient::new()
                .get_history(&request)
                .await
                .with_context(|| format!("failed to fetch {}", args.symbol))?
        }
    };

    info!("Rendering {:?} chart from {} bars", args.kind, series.len());

    let style = ChartStyle::init();
    let rendered = match args.kind {
        ChartKind::Price => plot_price_chart(style, &series, &args.output),
        ChartKind::Bollinger => plot_bollinger_chart(style, &series, args.window, &args.output),
        ChartKind::Rsi => plot_rsi_chart(style, &series, args.window, &args.output),
    };
    rendered.map_err(|e| anyhow::anyhow!("failed to render {}: {}", args.output.display(), e))?;

    println!("Chart saved to {}", args.output.display());
    Ok(())
}
