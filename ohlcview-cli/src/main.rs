//! OHLCView CLI — fetch one ticker's bars and print them as a table.
//!
//! Commands:
//! - `fetch` — run the pipeline once (Yahoo Finance, or a CSV export) and render
//! - `intervals` — list supported bar intervals and their lookback limits
//! - `config` — print the effective configuration as TOML

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use ohlcview_core::data::{CsvProvider, MarketDataProvider, YahooProvider};
use ohlcview_core::domain::{parse_date, Interval, Query};
use ohlcview_core::{fetch_and_derive, render, AppConfig, ColumnSet, OutputFormat, RenderOptions};

#[derive(Parser)]
#[command(
    name = "ohlcview",
    about = "OHLCView — OHLCV bars with scaled volume, OC and range"
)]
struct Cli {
    /// Config file (TOML). Defaults to the per-user config if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch bars for one ticker and render the derived table.
    Fetch(FetchArgs),
    /// List supported bar intervals.
    Intervals,
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args)]
struct FetchArgs {
    /// Ticker symbol (e.g., AAPL). Defaults to the configured ticker.
    #[arg(long)]
    ticker: Option<String>,

    /// Start date (YYYY-MM-DD). Defaults to end minus the configured lookback.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD, exclusive). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Bar interval: 2m, 5m, 15m, 30m, 60m or 1d.
    #[arg(long)]
    interval: Option<Interval>,

    /// Columns: plain, derived, or a list such as open,close,oc.
    #[arg(long)]
    columns: Option<ColumnSet>,

    /// Output format: table, markdown, csv or json.
    #[arg(long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Show at most this many rows (head and tail) in table/markdown output.
    #[arg(long)]
    max_rows: Option<usize>,

    /// Decimal places for prices.
    #[arg(long)]
    precision: Option<usize>,

    /// Read bars from a CSV export instead of Yahoo Finance.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Fetch(args) => run_fetch(args, &config),
        Commands::Intervals => {
            print!("{}", format_intervals());
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn run_fetch(args: FetchArgs, config: &AppConfig) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let (start, end) = resolve_dates(
        args.start.as_deref(),
        args.end.as_deref(),
        config.defaults.lookback_days,
        today,
    )?;

    let ticker = args.ticker.as_deref().unwrap_or(&config.defaults.ticker);
    let interval = args.interval.unwrap_or(config.defaults.interval);
    let query = Query::new(ticker, start, end, interval)?;

    let columns = match args.columns {
        Some(columns) => columns,
        None => config.column_set()?,
    };

    let mut opts = RenderOptions::from(&config.render);
    if args.max_rows.is_some() {
        opts.max_rows = args.max_rows;
    }
    if let Some(precision) = args.precision {
        opts.precision = precision;
    }

    let provider: Box<dyn MarketDataProvider> = match &args.csv {
        Some(path) => Box::new(CsvProvider::new(path)),
        None => Box::new(YahooProvider::new(&config.yahoo)?),
    };

    let outcome = match fetch_and_derive(provider.as_ref(), &query, &columns) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {}", e.user_message());
            std::process::exit(1);
        }
    };

    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }

    let mut rendered = render(args.format, &outcome.table, &opts)?;
    if matches!(args.format, OutputFormat::Table | OutputFormat::Markdown) {
        rendered = format!("{}\n\n{}", outcome.table.title(), rendered);
    }
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {} rows to {}", outcome.table.len(), path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// End defaults to `today`; start defaults to `lookback_days` before the end.
fn resolve_dates(
    start: Option<&str>,
    end: Option<&str>,
    lookback_days: u32,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = end.map(|s| parse_date("end", s)).transpose()?.unwrap_or(today);
    let start = start
        .map(|s| parse_date("start", s))
        .transpose()?
        .unwrap_or_else(|| end - Duration::days(i64::from(lookback_days)));
    Ok((start, end))
}

fn format_intervals() -> String {
    let mut out = String::new();
    for interval in Interval::ALL {
        let limit = match interval.max_lookback_days() {
            Some(days) => format!("last {days} days"),
            None => "unlimited".to_string(),
        };
        let kind = if interval.is_intraday() { "intraday" } else { "daily" };
        out.push_str(&format!("{:<4} {:<9} {limit}\n", interval.as_str(), kind));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ohlcview_core::table::Column;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn dates_default_to_lookback_before_today() {
        let (start, end) = resolve_dates(None, None, 7, d(2024, 3, 8)).unwrap();
        assert_eq!(end, d(2024, 3, 8));
        assert_eq!(start, d(2024, 3, 1));
    }

    #[test]
    fn start_defaults_relative_to_explicit_end() {
        let (start, end) = resolve_dates(None, Some("2024-01-10"), 3, d(2024, 3, 8)).unwrap();
        assert_eq!(end, d(2024, 1, 10));
        assert_eq!(start, d(2024, 1, 7));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(resolve_dates(Some("03/01/2024"), None, 7, d(2024, 3, 8)).is_err());
    }

    #[test]
    fn fetch_flags_parse_typed_values() {
        let cli = Cli::try_parse_from([
            "ohlcview",
            "-vv",
            "fetch",
            "--ticker",
            "msft",
            "--interval",
            "5m",
            "--columns",
            "open,oc",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.ticker.as_deref(), Some("msft"));
        assert_eq!(args.interval, Some(Interval::M5));
        assert_eq!(args.columns, Some(ColumnSet::Custom(vec![Column::Open, Column::Oc])));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_interval_flag_is_rejected() {
        assert!(Cli::try_parse_from(["ohlcview", "fetch", "--interval", "3m"]).is_err());
    }

    #[test]
    fn interval_listing_covers_all() {
        let listing = format_intervals();
        assert_eq!(listing.lines().count(), Interval::ALL.len());
        assert!(listing.contains("60m  intraday  last 730 days"));
        assert!(listing.contains("1d   daily     unlimited"));
    }
}
