//! Row-group processing: raw statement rows to typed records
//!
//! The processor walks one section's rows, filters the non-transactional
//! ones, builds typed records from the rest and keeps the exchange rate
//! service loaded for every currency it encounters. A batch either
//! converts completely or not at all: the first malformed row aborts the
//! whole group.

use log::{debug, warn};
use serde::Serialize;

use crate::error::{LedgerFxError, Result};
use crate::fx::ExchangeRateService;
use crate::ledger::cash::{CashEvent, CashEventKind};
use crate::ledger::trade::{FxEnrichment, Trade};

/// Row subtype of section header rows
const SECTION_HEADER: &str = "Header";
/// Row subtype of per-symbol summary rows
const SECTION_SUBTOTAL: &str = "SubTotal";
/// Row subtype of transactional rows
const SECTION_DATA: &str = "Data";
/// Discriminator of executed order rows
const ORDER_DISCRIMINATOR: &str = "Order";

/// Outcome of an enrichment pass over a batch of trades
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EnrichmentSummary {
    /// Trades that received a quote-currency conversion
    pub enriched: usize,
    /// Trades left unconverted because no rate was found in the window
    pub missing: usize,
}

/// Converts grouped statement rows into typed records
///
/// Borrows the exchange rate service so currency loading happens exactly
/// where trades are built, and the caller keeps ownership for later
/// lookups.
pub struct TradeProcessor<'a> {
    service: &'a mut ExchangeRateService,
}

impl<'a> TradeProcessor<'a> {
    /// Create a processor backed by an exchange rate service
    pub fn new(service: &'a mut ExchangeRateService) -> Self {
        Self { service }
    }

    /// Build trades from the rows of a Trades section
    ///
    /// Header and SubTotal rows are skipped. Data rows discriminated as
    /// orders are built; any other row shape is a schema violation and
    /// fails the batch. The currency of every built trade is loaded into
    /// the rate service on the spot.
    pub fn process(&mut self, rows: &[Vec<String>]) -> Result<Vec<Trade>> {
        let mut trades = Vec::new();

        for row in rows {
            let section = row.get(1).map(String::as_str).unwrap_or_default();
            if section == SECTION_HEADER || section == SECTION_SUBTOTAL {
                debug!("Skipping {} row", section);
                continue;
            }

            let discriminator = row.get(2).map(String::as_str).unwrap_or_default();
            if section == SECTION_DATA && discriminator == ORDER_DISCRIMINATOR {
                let trade = Trade::from_record(row)?;
                self.service.ensure_currency(trade.currency)?;
                trades.push(trade);
            } else {
                return Err(LedgerFxError::UnexpectedRow(row.join(",")));
            }
        }

        Ok(trades)
    }

    /// Attach quote-currency conversions to a batch of trades
    ///
    /// A trade whose rate cannot be found within the backtrack window is
    /// left unconverted and counted; the batch survives. Looking up a
    /// currency that was never loaded is a caller bug and fails the pass.
    pub fn enrich_trades(&self, trades: &mut [Trade]) -> Result<EnrichmentSummary> {
        let mut summary = EnrichmentSummary::default();

        for trade in trades.iter_mut() {
            match self.service.resolve(trade.currency, trade.date()) {
                Ok(resolved) => {
                    trade.fx = Some(FxEnrichment {
                        rate: resolved.rate,
                        rate_date: resolved.rate_date,
                        proceeds: trade.proceeds * resolved.rate,
                        basis: trade.basis * resolved.rate,
                        realized_pl: trade.realized_pl * resolved.rate,
                    });
                    summary.enriched += 1;
                }
                Err(LedgerFxError::NoRateFound { currency, date }) => {
                    warn!(
                        "No {} rate found for {} trade on {}; left unconverted",
                        currency, trade.symbol, date
                    );
                    summary.missing += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    /// Build cash events from the rows of a cash section
    ///
    /// Rows whose subtype is not Data are summaries or headers and are
    /// skipped, as are grand-total rows carrying "Total" in the currency
    /// column. A malformed data row fails the batch.
    pub fn process_cash_events(
        &mut self,
        kind: CashEventKind,
        rows: &[Vec<String>],
    ) -> Result<Vec<CashEvent>> {
        let mut events = Vec::new();

        for row in rows {
            let section = row.get(1).map(String::as_str).unwrap_or_default();
            if section != SECTION_DATA {
                debug!("Skipping {} {} row", kind, section);
                continue;
            }
            if row
                .get(2)
                .map(String::as_str)
                .unwrap_or_default()
                .starts_with("Total")
            {
                continue;
            }

            events.push(CashEvent::from_record(kind, row)?);
        }

        Ok(events)
    }
}
