//! Train a Random Forest on price history and forecast the next close
//!
//! Usage: cargo run --bin forecast -- --symbol AAPL --period 6mo --trees 100

use anyhow::{Context, Result};
use clap::Parser;
use price_forecast::api::{HistoryRequest, Interval, Period, YahooClient};
use price_forecast::chart::{plot_predicted_vs_actual, ChartStyle};
use price_forecast::data::PriceSeries;
use price_forecast::models::{ForestConfig, RandomForest};
use price_forecast::pipeline::{ForecastPipeline, ForecastResult, PipelineConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Forecast the next close with a Random Forest")]
struct Args {
    /// Ticker symbol
    #[arg(short, long, default_value = "AAPL")]
    symbol: String,

    /// Look-back period
    #[arg(short, long, default_value = "6mo")]
    period: String,

    /// Bar interval
    #[arg(short, long, default_value = "1d")]
    interval: String,

    /// Read bars from a CSV written by fetch_data instead of fetching
    #[arg(long)]
    input: Option<PathBuf>,

    /// Number of trees
    #[arg(short, long, default_value = "100")]
    trees: usize,

    /// Max tree depth
    #[arg(long, default_value = "10")]
    max_depth: usize,

    /// Seed of the split and the forest
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Test set ratio
    #[arg(long, default_value = "0.2")]
    test_ratio: f64,

    /// Minimum number of labelled rows
    #[arg(long, default_value = "10")]
    min_rows: usize,

    /// Save the actual vs predicted chart to this PNG
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Save the evaluation table to this CSV
    #[arg(long)]
    save: Option<PathBuf>,
}

fn print_evaluation(result: &ForecastResult) {
    let [date, close, next_close, predicted] = ForecastResult::columns();
    println!(
        "{:<12} {:>12} {:>12} {:>16}",
        date, close, next_close, predicted
    );
    println!("{}", "-".repeat(55));

    for row in &result.evaluation {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>16.2}",
            row.timestamp.format("%Y-%m-%d"),
            row.close,
            row.next_close,
            row.predicted_close
        );
    }
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

    println!("===========================================");
    println!("  Next Close Forecast - Random Forest");
    println!("===========================================\n");

    let series = match &args.input {
        Some(path) => PriceSeries::load_csv(&args.symbol, path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let period: Period = args.period.parse()?;
            let interval: Interval = args.interval.parse()?;
            let request = HistoryRequest::new(&args.symbol, period, interval);
            info!("Fetching {} ({} / {})", args.symbol, period, interval);
            YahooClient::new()
                .get_history(&request)
                .await
                .with_context(|| format!("failed to fetch {}", args.symbol))?
        }
    };

    println!("Loaded {} bars for {}\n", series.len(), series.symbol());

    let pipeline = ForecastPipeline::new(PipelineConfig {
        test_fraction: args.test_ratio,
        seed: args.seed,
        min_labeled_rows: args.min_rows,
    });

    let mut forest = RandomForest::new(ForestConfig {
        n_trees: args.trees,
        max_depth: args.max_depth,
        seed: args.seed,
        ..ForestConfig::default()
    });

    println!("Training Random Forest with {} trees...", args.trees);

    let start_time = std::time::Instant::now();
    let result = pipeline.run(&series, &mut forest)?;
    println!(
        "Training completed in {:.2}s\n",
        start_time.elapsed().as_secs_f64()
    );

    println!("=== Evaluation ===\n");
    print_evaluation(&result);

    println!("\nTrain rows: {}", result.train_size);
    println!("Test rows:  {}", result.evaluation.len());
    println!("MAE:        {:.4}", result.mae);
    println!(
        "\nNext close forecast (as of {}): {:.2}",
        result.forecast_as_of.format("%Y-%m-%d"),
        result.forecast
    );

    println!("\n=== Feature Importance Ranking ===\n");
    for (i, (name, imp)) in forest.feature_importance_ranking().iter().enumerate() {
        let bar = "█".repeat((imp * 40.0) as usize);
        println!("{:2}. {:12} {:.4} {}", i + 1, name, imp, bar);
    }

    if let Some(path) = &args.save {
        result
            .save_csv(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Saved evaluation table to {}", path.display());
    }

    if let Some(path) = &args.plot {
        let style = ChartStyle::init();
        plot_predicted_vs_actual(style, &result, path)
            .map_err(|e| anyhow::anyhow!("failed to render {}: {}", path.display(), e))?;
    }

    Ok(())
}
