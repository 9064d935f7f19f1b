//! BarLab CLI — download market data and run backtests.
//!
//! Commands:
//! - `download` — fetch daily OHLCV CSV from Stooq into a local cache
//! - `run` — execute a backtest from flags or a TOML config file and
//!   write equity/trade/metrics artifacts

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use barlab_runner::{
    download_stooq_csv, filter_date_range, load_bars_csv, run_backtest, save_artifacts,
    synthetic_bars, BacktestConfig,
};

/// Bar count and seed for `--synthetic` runs (about ten years of days).
const SYNTHETIC_BARS: usize = 2_520;
const SYNTHETIC_SEED: u64 = 7;

#[derive(Parser)]
#[command(
    name = "barlab",
    about = "BarLab CLI — event-driven daily-bar backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily OHLCV data from Stooq and cache it as CSV.
    Download {
        /// Stooq symbol, e.g. aapl.us, msft.us, spy.us.
        ticker: String,

        /// Cache directory for downloaded CSVs.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Execute a backtest and write artifacts.
    Run {
        /// Path to a TOML config file (replaces the strategy/risk flags).
        #[arg(long, conflicts_with = "ticker")]
        config: Option<PathBuf>,

        /// Stooq symbol, e.g. aapl.us, msft.us, spy.us.
        #[arg(long)]
        ticker: Option<String>,

        /// Start date YYYY-MM-DD (inclusive).
        #[arg(long)]
        start: Option<String>,

        /// End date YYYY-MM-DD (inclusive).
        #[arg(long)]
        end: Option<String>,

        /// Fast MA window.
        #[arg(long, default_value_t = 20)]
        fast: usize,

        /// Slow MA window.
        #[arg(long, default_value_t = 100)]
        slow: usize,

        /// Initial cash.
        #[arg(long, default_value_t = 100_000.0)]
        cash: f64,

        /// Slippage in basis points.
        #[arg(long, default_value_t = 2.0)]
        slippage_bps: f64,

        /// Fixed commission per trade.
        #[arg(long, default_value_t = 1.0)]
        commission: f64,

        /// Max position value as a fraction of equity.
        #[arg(long, default_value_t = 0.25)]
        max_position_pct: f64,

        /// Max drawdown before the kill switch trips.
        #[arg(long = "max-dd", default_value_t = 0.20)]
        max_drawdown: f64,

        /// Cache directory for downloaded CSVs.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Output directory for artifacts.
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force_download: bool,

        /// Run on seeded synthetic bars instead of downloaded data.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            ticker,
            cache_dir,
            force,
        } => run_download(&ticker, &cache_dir, force),
        Commands::Run {
            config,
            ticker,
            start,
            end,
            fast,
            slow,
            cash,
            slippage_bps,
            commission,
            max_position_pct,
            max_drawdown,
            cache_dir,
            out_dir,
            force_download,
            synthetic,
        } => {
            let mut backtest_config = match config {
                Some(path) => BacktestConfig::from_toml_path(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => {
                    let Some(ticker) = ticker else {
                        bail!("either --ticker or --config is required");
                    };
                    let mut c = BacktestConfig::new(ticker);
                    c.strategy.fast = fast;
                    c.strategy.slow = slow;
                    c.initial_cash = cash;
                    c.execution.slippage_bps = slippage_bps;
                    c.execution.commission = commission;
                    c.risk.max_position_pct = max_position_pct;
                    c.risk.max_drawdown = max_drawdown;
                    c
                }
            };
            if let Some(start) = start {
                backtest_config.start = Some(parse_date(&start)?);
            }
            if let Some(end) = end {
                backtest_config.end = Some(parse_date(&end)?);
            }

            run_backtest_cmd(
                backtest_config,
                &cache_dir,
                &out_dir,
                force_download,
                synthetic,
            )
        }
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{text}' (expected YYYY-MM-DD)"))
}

fn run_download(ticker: &str, cache_dir: &std::path::Path, force: bool) -> Result<()> {
    let path = download_stooq_csv(ticker, cache_dir, force)?;
    let bars = load_bars_csv(&path)?;
    println!("Downloaded {ticker}: {} bars", bars.len());
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("  {} .. {}", first.date, last.date);
    }
    println!("  cached at {}", path.display());
    Ok(())
}

fn run_backtest_cmd(
    config: BacktestConfig,
    cache_dir: &std::path::Path,
    out_dir: &std::path::Path,
    force_download: bool,
    synthetic: bool,
) -> Result<()> {
    let bars = if synthetic {
        println!("Using synthetic bars (seed {SYNTHETIC_SEED})");
        synthetic_bars(SYNTHETIC_BARS, SYNTHETIC_SEED)
    } else {
        let csv_path = download_stooq_csv(&config.ticker, cache_dir, force_download)?;
        load_bars_csv(&csv_path)?
    };
    let bars = filter_date_range(bars, config.start, config.end);

    let report = run_backtest(&config, &bars)?;
    let paths = save_artifacts(out_dir, &report)?;

    println!(
        "Backtest {} | MA({},{}) | {} bars",
        report.ticker, config.strategy.fast, config.strategy.slow, report.bar_count
    );
    println!("  run id:       {}", report.run_id);
    println!("  final equity: {:.2}", report.final_equity);
    println!("  trades:       {}", report.trades.len());
    println!("  total return: {:.2}%", report.metrics.total_return * 100.0);
    println!("  cagr:         {:.2}%", report.metrics.cagr * 100.0);
    println!("  sharpe:       {:.2}", report.metrics.sharpe);
    println!("  max drawdown: {:.2}%", report.metrics.max_drawdown * 100.0);
    println!("  kill switch:  {}", report.kill_switch_triggered);
    println!("Artifacts:");
    println!("  equity:  {}", paths.equity_csv.display());
    println!("  trades:  {}", paths.trades_csv.display());
    println!("  metrics: {}", paths.metrics_json.display());
    Ok(())
}
