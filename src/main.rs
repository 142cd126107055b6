// =============================================================================
// trendband: Command-line entry point
// =============================================================================
//
// Loads bars (local CSV, cached provider download, or a fresh download),
// runs the signal engine once and writes the annotated table.
// =============================================================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trendband::market_data::{load_bars, save_bars, Bar, QuoteClient, SeriesRequest};
use trendband::{EngineConfig, SignalEngine};

#[derive(Parser, Debug)]
#[command(author, version, about = "EMA trend / Bollinger band-cross signal generator")]
struct Args {
    /// Ticker symbol to examine, e.g. NVDA (uses the local cache when present)
    #[arg(short, long, conflicts_with = "input")]
    symbol: Option<String>,

    /// Input CSV file with timestamp,open,high,low,close columns
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Annotated output CSV (default: <name>_signals.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Engine configuration JSON
    #[arg(short, long, default_value = "engine_config.json")]
    config: PathBuf,

    /// Directory for cached provider downloads
    #[arg(long, default_value = "stock_data")]
    data_dir: PathBuf,

    /// Download the daily series instead of intraday
    #[arg(long)]
    daily: bool,

    /// Intraday bar interval
    #[arg(long, default_value = "1min")]
    interval: String,

    /// Intraday month to download (YYYY-MM); default is the trailing 30 days
    #[arg(long)]
    month: Option<String>,

    /// Classify and emit only the last N bars
    #[arg(long)]
    tail: Option<usize>,
}

impl Args {
    fn series_request(&self) -> SeriesRequest {
        if self.daily {
            SeriesRequest::Daily
        } else {
            SeriesRequest::Intraday {
                interval: self.interval.clone(),
                month: self.month.clone(),
            }
        }
    }
}

/// Cached bars for `symbol`, downloading and caching them on a miss.
async fn bars_for_symbol(args: &Args, symbol: &str) -> Result<Vec<Bar>> {
    let cache = args.data_dir.join(format!("{symbol}.csv"));
    if cache.is_file() {
        info!(symbol, path = %cache.display(), "loading pre-existing data file");
        return load_bars(&cache);
    }

    info!(symbol, "no cached data, calling quote provider");
    let client = QuoteClient::from_env()?;
    let bars = client.fetch_bars(symbol, &args.series_request()).await?;
    save_bars(&cache, &bars)?;
    Ok(bars)
}

async fn run(args: Args) -> Result<()> {
    let mut config = EngineConfig::load_or_default(&args.config)?;
    if args.tail.is_some() {
        config.signal_tail = args.tail;
    }

    let (bars, name) = match (&args.symbol, &args.input) {
        (Some(symbol), _) => {
            let symbol = symbol.trim().to_uppercase();
            (bars_for_symbol(&args, &symbol).await?, symbol)
        }
        (None, Some(input)) => {
            let name = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "bars".to_string());
            (load_bars(input)?, name)
        }
        (None, None) => bail!("either --symbol or --input is required"),
    };

    let engine = SignalEngine::new(config).context("invalid engine configuration")?;
    let series = engine
        .run(&bars)
        .with_context(|| format!("signal pass failed for {name}"))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{name}_signals.csv")));
    series.save_csv(&output)?;

    let summary = series.summary();
    info!(name = %name, rows = series.len(), %summary, "done");
    println!("{name}: {} bars", series.len());
    println!("{summary}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!(error = %format!("{e:#}"), "trendband failed");
        std::process::exit(1);
    }
}
