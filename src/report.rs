//! Run reports: aggregated totals, console rendering and JSON output

use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::currency::Currency;
use crate::error::Result;
use crate::ledger::cash::{CashEvent, CashEventKind};
use crate::ledger::processor::EnrichmentSummary;
use crate::ledger::trade::Trade;

/// Realized P/L accumulated per source currency
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyTotal {
    pub currency: Currency,
    pub realized_pl: f64,
}

/// Cash postings accumulated per section and currency
#[derive(Debug, Clone, Serialize)]
pub struct CashTotal {
    pub kind: CashEventKind,
    pub currency: Currency,
    pub count: usize,
    pub amount: f64,
}

/// Aggregates computed over one processed statement
#[derive(Debug, Clone, Serialize)]
pub struct ReportTotals {
    pub trade_count: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    /// Realized P/L per source currency, sorted by code
    pub realized_pl: Vec<CurrencyTotal>,
    /// Realized P/L in the quote currency, over enriched trades only
    pub realized_pl_quote: f64,
    /// Cash totals per section and currency, in statement order
    pub cash: Vec<CashTotal>,
}

/// Everything one run produced, ready to render or serialize
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Statement file the run processed
    pub source: String,
    /// Currency the FX conversions target
    pub quote: Currency,
    pub trades: Vec<Trade>,
    pub enrichment: EnrichmentSummary,
    pub cash_events: Vec<CashEvent>,
    pub totals: ReportTotals,
}

impl RunReport {
    /// Aggregate a run's records into a report
    pub fn new(
        source: String,
        quote: Currency,
        trades: Vec<Trade>,
        enrichment: EnrichmentSummary,
        cash_events: Vec<CashEvent>,
    ) -> Self {
        let totals = compute_totals(&trades, &cash_events);
        Self {
            source,
            quote,
            trades,
            enrichment,
            cash_events,
            totals,
        }
    }

    /// Print the report to stdout
    pub fn print(&self) {
        println!("{}", "Trades".green().bold());
        println!("{}", "======".green());
        println!("  {} {}", "Processed:".bold(), self.totals.trade_count);
        println!(
            "  {} {} buys, {} sells",
            "Orders:".bold(),
            self.totals.buy_count,
            self.totals.sell_count
        );
        println!();

        for trade in &self.trades {
            let price = trade
                .price
                .map(|p| format!("{:.2}", p))
                .unwrap_or_else(|| "-".to_string());
            let conversion = match &trade.fx {
                Some(fx) => format!(
                    "{}{} @ {:.2} ({})",
                    self.quote.symbol(),
                    colorize_amount(fx.realized_pl),
                    fx.rate,
                    fx.rate_date
                ),
                None => "no rate".yellow().to_string(),
            };
            println!(
                "  {}  {:<8} {:>4}  {:>10} @ {:<9} P/L {} {}  {}",
                trade.date(),
                trade.symbol,
                trade.side(),
                trade.quantity,
                price,
                colorize_amount(trade.realized_pl),
                trade.currency,
                conversion
            );
        }
        if !self.trades.is_empty() {
            println!();
        }

        println!("{}", "Realized P/L".green().bold());
        println!("{}", "============".green());
        for total in &self.totals.realized_pl {
            println!(
                "  {} {}",
                format!("{}:", total.currency).bold(),
                colorize_amount(total.realized_pl)
            );
        }
        println!(
            "  {} {}{} ({} of {} trades converted)",
            format!("{}:", self.quote).bold(),
            self.quote.symbol(),
            colorize_amount(self.totals.realized_pl_quote),
            self.enrichment.enriched,
            self.totals.trade_count
        );
        if self.enrichment.missing > 0 {
            println!(
                "  {}",
                format!(
                    "{} trade(s) without a usable rate",
                    self.enrichment.missing
                )
                .yellow()
            );
        }
        println!();

        if !self.totals.cash.is_empty() {
            println!("{}", "Cash Events".green().bold());
            println!("{}", "===========".green());
            for total in &self.totals.cash {
                println!(
                    "  {} {} {} ({} posting(s))",
                    format!("{}:", total.kind).bold(),
                    colorize_amount(total.amount),
                    total.currency,
                    total.count
                );
            }
            println!();
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn compute_totals(trades: &[Trade], cash_events: &[CashEvent]) -> ReportTotals {
    let mut buy_count = 0;
    let mut sell_count = 0;
    let mut realized_pl: Vec<CurrencyTotal> = Vec::new();
    let mut realized_pl_quote = 0.0;

    for trade in trades {
        if trade.is_buy() {
            buy_count += 1;
        } else {
            sell_count += 1;
        }

        match realized_pl
            .iter_mut()
            .find(|t| t.currency == trade.currency)
        {
            Some(total) => total.realized_pl += trade.realized_pl,
            None => realized_pl.push(CurrencyTotal {
                currency: trade.currency,
                realized_pl: trade.realized_pl,
            }),
        }

        if let Some(fx) = &trade.fx {
            realized_pl_quote += fx.realized_pl;
        }
    }
    realized_pl.sort_by_key(|t| t.currency.code());

    let mut cash: Vec<CashTotal> = Vec::new();
    for event in cash_events {
        match cash
            .iter_mut()
            .find(|t| t.kind == event.kind && t.currency == event.currency)
        {
            Some(total) => {
                total.count += 1;
                total.amount += event.amount;
            }
            None => cash.push(CashTotal {
                kind: event.kind,
                currency: event.currency,
                count: 1,
                amount: event.amount,
            }),
        }
    }
    cash.sort_by_key(|t| (t.kind, t.currency.code()));

    ReportTotals {
        trade_count: trades.len(),
        buy_count,
        sell_count,
        realized_pl,
        realized_pl_quote,
        cash,
    }
}

fn colorize_amount(amount: f64) -> colored::ColoredString {
    let formatted = format!("{:+.2}", amount);
    if amount < 0.0 {
        formatted.red()
    } else if amount > 0.0 {
        formatted.bright_green()
    } else {
        formatted.normal()
    }
}
