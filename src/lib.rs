//! # ledgerfx
//!
//! Brokerage activity-statement processing with historical FX enrichment.
//!
//! ledgerfx reads an activity CSV exported by a brokerage, rebuilds typed
//! trade and cash-event records from its row groups, and converts each
//! trade's amounts into a quote currency using the closing rate of the
//! trade date or the nearest prior day.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ledgerfx::prelude::*;
//!
//! fn run() -> Result<()> {
//!     let mut service = ExchangeRateService::new("data/rates", Currency::JPY);
//!     let ledger = read_ledger("2024_activity.csv".as_ref())?;
//!
//!     let mut processor = TradeProcessor::new(&mut service);
//!     let mut trades = match ledger.group(TRADES_LABEL) {
//!         Some(rows) => processor.process(rows)?,
//!         None => Vec::new(),
//!     };
//!     processor.enrich_trades(&mut trades)?;
//!     Ok(())
//! }
//! ```

pub mod currency;
pub mod error;
pub mod fx;
pub mod ledger;
pub mod report;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::currency::{Currency, CurrencyPair};
    pub use crate::error::{LedgerFxError, Result};
    pub use crate::fx::{ExchangeRateService, RateTable, ResolvedRate};
    pub use crate::ledger::{
        read_ledger, CashEvent, CashEventKind, LedgerFile, Trade, TradeProcessor, TradeSide,
        TRADES_LABEL,
    };
    pub use crate::report::RunReport;
}
