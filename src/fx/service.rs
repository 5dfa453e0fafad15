//! Exchange rate service with lazy per-currency loading
//!
//! Owns one rate table per base currency, loaded on first demand from a
//! per-pair directory under the rates root. The currency set of a ledger
//! is unknown until its rows are scanned, so tables are populated as
//! currencies are encountered rather than up front.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::currency::{Currency, CurrencyPair};
use crate::error::{LedgerFxError, Result};
use crate::fx::rate_table::{RateTable, ResolvedRate};

/// Exchange rate lookup across lazily loaded per-currency tables
///
/// The quote currency needs no table: it always resolves to 1.0.
#[derive(Debug)]
pub struct ExchangeRateService {
    rates_root: PathBuf,
    quote: Currency,
    tables: HashMap<Currency, RateTable>,
}

impl ExchangeRateService {
    /// Create a service reading rate files from `rates_root`
    pub fn new(rates_root: impl Into<PathBuf>, quote: Currency) -> Self {
        Self {
            rates_root: rates_root.into(),
            quote,
            tables: HashMap::new(),
        }
    }

    /// The currency all rates are quoted in
    pub fn quote(&self) -> Currency {
        self.quote
    }

    /// Root directory holding the per-pair rate directories
    pub fn rates_root(&self) -> &Path {
        &self.rates_root
    }

    /// True when the currency can already be resolved without loading
    pub fn has_currency(&self, currency: Currency) -> bool {
        currency == self.quote || self.tables.contains_key(&currency)
    }

    /// Load the currency's rate table if it is not loaded yet
    ///
    /// Idempotent: a loaded currency is left untouched. The table is read
    /// from `<rates_root>/<base><quote>/` (e.g. `usdjpy` for USD quoted
    /// in JPY). A failed load leaves the currency unloaded.
    pub fn ensure_currency(&mut self, currency: Currency) -> Result<()> {
        if self.has_currency(currency) {
            return Ok(());
        }

        let pair = CurrencyPair::new(currency, self.quote);
        let dir = self.rates_root.join(pair.dir_name());
        let table = RateTable::load_dir(&dir, currency)?;
        self.tables.insert(currency, table);
        Ok(())
    }

    /// Resolve a rate for the currency on a date, backtracking as needed
    pub fn resolve(&self, currency: Currency, date: NaiveDate) -> Result<ResolvedRate> {
        if currency == self.quote {
            return Ok(ResolvedRate {
                rate: 1.0,
                rate_date: date,
            });
        }

        let table = self
            .tables
            .get(&currency)
            .ok_or(LedgerFxError::CurrencyNotLoaded(currency))?;
        table.resolve(date)
    }

    /// Resolve a rate and return just the rate value
    pub fn get_rate(&self, currency: Currency, date: NaiveDate) -> Result<f64> {
        self.resolve(currency, date).map(|r| r.rate)
    }

    /// Loaded table for a currency, if any
    pub fn table(&self, currency: Currency) -> Option<&RateTable> {
        self.tables.get(&currency)
    }

    /// Currencies with a loaded table, sorted by code
    pub fn loaded_currencies(&self) -> Vec<Currency> {
        let mut currencies: Vec<Currency> = self.tables.keys().copied().collect();
        currencies.sort_by_key(|c| c.code());
        currencies
    }
}
