//! Fetch historical prices from Yahoo Finance
//!
//! Usage: cargo run --bin fetch_data -- --symbol AAPL --period 1mo --interval 1d

use anyhow::{Context, Result};
use clap::Parser;
use price_forecast::api::{HistoryRequest, Interval, Period, YahooClient};
use price_forecast::data::PriceBar;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch price history from Yahoo Finance")]
struct Args {
    /// Ticker symbol (e.g., AAPL, 005930.KS)
    #[arg(short, long, default_value = "AAPL")]
    symbol: String,

    /// Look-back period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
    #[arg(short, long, default_value = "1mo")]
    period: String,

    /// Bar interval (1m, 5m, 15m, 30m, 1h, 1d, 1wk, 1mo, 3mo)
    #[arg(short, long, default_value = "1d")]
    interval: String,

    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_bar(bar: &PriceBar) {
    println!(
        "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>15.0}",
        bar.timestamp.format("%Y-%m-%d"),
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        bar.volume
    );
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

    let period: Period = args.period.parse()?;
    let interval: Interval = args.interval.parse()?;
    let request = HistoryRequest::new(&args.symbol, period, interval);

    info!("Fetching {} ({} / {})", args.symbol, period, interval);

    let client = YahooClient::new();
    let series = client
        .get_history(&request)
        .await
        .with_context(|| format!("failed to fetch {}", args.symbol))?;

    info!("Fetched {} bars", series.len());

    println!("\nFirst 5 bars:");
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>15}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(82));

    for bar in series.bars().iter().take(5) {
        print_bar(bar);
    }

    if series.len() > 5 {
        println!("\n...\n");
        println!("Last 5 bars:");
        for bar in series.bars().iter().rev().take(5).rev() {
            print_bar(bar);
        }
    }

    if let Some(output) = &args.output {
        series
            .save_csv(output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!("Saved data to {}", output.display());
    }

    println!("\nStatistics:");
    println!("-----------");

    let closes = series.closes();
    let volumes = series.volumes();

    let avg_price = closes.iter().sum::<f64>() / closes.len() as f64;
    let min_price = closes.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_price = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg_volume = volumes.iter().sum::<f64>() / volumes.len() as f64;

    println!("Average Close: {:.2}", avg_price);
    println!("Min Close:     {:.2}", min_price);
    println!("Max Close:     {:.2}", max_price);
    println!(
        "Close Range:   {:.2} ({:.2}%)",
        max_price - min_price,
        (max_price - min_price) / min_price * 100.0
    );
    println!("Avg Volume:    {:.0}", avg_volume);

    Ok(())
}
