//! ledgerfx CLI - process brokerage activity statements
//!
//! Reads an activity CSV, rebuilds trade and cash-event records, converts
//! trade amounts into the quote currency with historical daily rates, and
//! prints a P/L report.
//!
//! ## Example Usage
//!
//! ```bash
//! # Process a statement and print the report
//! ledgerfx process 2024_activity.csv --rates-dir data/rates
//!
//! # Also write the full report as JSON
//! ledgerfx process 2024_activity.csv -o report.json
//!
//! # Inspect a currency's rate table and resolve a date
//! ledgerfx rates USD --date 2024-10-27
//! ```

use anyhow::{bail, Context as _};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use ledgerfx::currency::Currency;
use ledgerfx::fx::ExchangeRateService;
use ledgerfx::ledger::{read_ledger, CashEventKind, TradeProcessor, TRADES_LABEL};
use ledgerfx::report::RunReport;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// ledgerfx: brokerage statements with historical FX conversion
#[derive(Parser)]
#[command(name = "ledgerfx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Brokerage activity-statement processor with historical FX enrichment", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an activity statement and report P/L in the quote currency
    Process {
        /// Path to the activity statement CSV
        #[arg(value_name = "LEDGER_CSV")]
        ledger: PathBuf,

        /// Directory holding the per-pair rate directories
        #[arg(short = 'r', long)]
        rates_dir: Option<PathBuf>,

        /// Quote currency for conversions
        #[arg(short = 'q', long)]
        quote: Option<String>,

        /// Output file for the full report (JSON)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Inspect a currency's rate table
    Rates {
        /// Base currency code, e.g. USD
        #[arg(value_name = "CURRENCY")]
        currency: String,

        /// Resolve a rate for this date (YYYY-MM-DD)
        #[arg(short = 'd', long)]
        date: Option<String>,

        /// Directory holding the per-pair rate directories
        #[arg(short = 'r', long)]
        rates_dir: Option<PathBuf>,

        /// Quote currency for conversions
        #[arg(short = 'q', long)]
        quote: Option<String>,
    },
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_rates_dir")]
    rates_dir: PathBuf,
    #[serde(default = "default_quote")]
    quote: String,
}

fn default_rates_dir() -> PathBuf {
    PathBuf::from("data").join("rates")
}

fn default_quote() -> String {
    "JPY".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rates_dir: default_rates_dir(),
            quote: default_quote(),
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        if let Some(config_path) = path {
            if config_path.exists() {
                match fs::read_to_string(config_path) {
                    Ok(contents) => match toml::from_str(&contents) {
                        Ok(config) => return config,
                        Err(e) => {
                            eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                        }
                    },
                    Err(e) => {
                        eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
                    }
                }
            }
        } else {
            // Try default location
            if let Some(home) = dirs::home_dir() {
                let default_config = home.join(".ledgerfx").join("config.toml");
                if default_config.exists() {
                    if let Ok(contents) = fs::read_to_string(&default_config) {
                        if let Ok(config) = toml::from_str(&contents) {
                            return config;
                        }
                    }
                }
            }
        }

        Config::default()
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());

    let result = match cli.command {
        Commands::Process {
            ledger,
            rates_dir,
            quote,
            output,
        } => process_statement(ProcessConfig {
            ledger,
            rates_dir,
            quote,
            output,
            verbose: cli.verbose,
            config,
        }),

        Commands::Rates {
            currency,
            date,
            rates_dir,
            quote,
        } => show_rates(RatesConfig {
            currency,
            date,
            rates_dir,
            quote,
            verbose: cli.verbose,
            config,
        }),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

// Configuration structures
struct ProcessConfig {
    ledger: PathBuf,
    rates_dir: Option<PathBuf>,
    quote: Option<String>,
    output: Option<PathBuf>,
    verbose: bool,
    config: Config,
}

struct RatesConfig {
    currency: String,
    date: Option<String>,
    rates_dir: Option<PathBuf>,
    quote: Option<String>,
    verbose: bool,
    config: Config,
}

fn resolve_quote(cli_quote: Option<&str>, config: &Config) -> anyhow::Result<Currency> {
    let code = cli_quote.unwrap_or(&config.quote);
    Currency::from_code(code).context("quote currency not recognized")
}

// Command implementations
fn process_statement(cfg: ProcessConfig) -> anyhow::Result<()> {
    let rates_dir = cfg.rates_dir.unwrap_or_else(|| cfg.config.rates_dir.clone());
    let quote = resolve_quote(cfg.quote.as_deref(), &cfg.config)?;

    println!(
        "{}",
        format!("Processing {}", cfg.ledger.display()).cyan().bold()
    );
    println!();

    if cfg.verbose {
        println!("  {} {}", "Rates dir:".bold(), rates_dir.display());
        println!("  {} {}", "Quote:".bold(), quote);
        println!();
    }

    let ledger = read_ledger(&cfg.ledger)?;
    let mut service = ExchangeRateService::new(rates_dir, quote);
    let mut processor = TradeProcessor::new(&mut service);

    // A malformed Trades section converts to zero trades; the rest of the
    // statement is still processed.
    let mut trades = match ledger.group(TRADES_LABEL) {
        Some(rows) => match processor.process(rows) {
            Ok(built) => built,
            Err(e) => {
                eprintln!(
                    "{} Trades section abandoned, 0 trades processed: {}",
                    "Warning:".yellow(),
                    e
                );
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let mut cash_events = Vec::new();
    for kind in CashEventKind::all() {
        if let Some(rows) = ledger.group(kind.label()) {
            match processor.process_cash_events(kind, rows) {
                Ok(events) => cash_events.extend(events),
                Err(e) => {
                    eprintln!("{} {} section abandoned: {}", "Warning:".yellow(), kind, e);
                }
            }
        }
    }

    let summary = processor.enrich_trades(&mut trades)?;

    let report = RunReport::new(
        cfg.ledger.display().to_string(),
        quote,
        trades,
        summary,
        cash_events,
    );
    report.print();

    if let Some(output_path) = cfg.output {
        report
            .write_json(&output_path)
            .with_context(|| format!("failed to write report to {}", output_path.display()))?;
        println!(
            "{} Report saved to: {}",
            "✓".green().bold(),
            output_path.display()
        );
    }

    Ok(())
}

fn show_rates(cfg: RatesConfig) -> anyhow::Result<()> {
    let rates_dir = cfg.rates_dir.unwrap_or_else(|| cfg.config.rates_dir.clone());
    let quote = resolve_quote(cfg.quote.as_deref(), &cfg.config)?;
    let currency = Currency::from_code(&cfg.currency)?;

    if currency == quote {
        println!(
            "{} is the quote currency; every date resolves to 1.0",
            currency
        );
        return Ok(());
    }

    if cfg.verbose {
        println!("  {} {}", "Rates dir:".bold(), rates_dir.display());
        println!();
    }

    let mut service = ExchangeRateService::new(rates_dir, quote);
    service.ensure_currency(currency)?;
    let Some(table) = service.table(currency) else {
        bail!("no rate table loaded for {}", currency);
    };

    let stats = table.stats();
    println!("{}", format!("Rate table {}/{}", currency, quote).cyan().bold());
    println!("  {} {}", "Entries:".bold(), stats.entries);
    match (stats.start_date, stats.end_date) {
        (Some(start), Some(end)) => {
            println!("  {} {} to {}", "Date range:".bold(), start, end);
        }
        _ => println!("  {} {}", "Date range:".bold(), "empty".dimmed()),
    }

    if let Some(date_str) = cfg.date {
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .context("date must be YYYY-MM-DD")?;
        let resolved = service.resolve(currency, date)?;
        if resolved.rate_date == date {
            println!(
                "  {} {}{} on {}",
                "Rate:".bold(),
                quote.symbol(),
                resolved.rate,
                date
            );
        } else {
            println!(
                "  {} {}{} on {} (backtracked from {})",
                "Rate:".bold(),
                quote.symbol(),
                resolved.rate,
                resolved.rate_date,
                date
            );
        }
    }

    Ok(())
}
