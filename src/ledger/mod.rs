//! Activity-statement ingestion
//!
//! # Components
//!
//! - **reader**: One-pass CSV reading, rows grouped by section label
//! - **trade**: Typed trade records built from Trades rows
//! - **cash**: Dividend, withholding tax and interest postings
//! - **processor**: Row-group filtering, record building and FX
//!   enrichment over an exchange rate service

pub mod cash;
pub mod processor;
pub mod reader;
pub mod trade;

pub use cash::{CashEvent, CashEventKind, CASH_FIELD_COUNT};
pub use processor::{EnrichmentSummary, TradeProcessor};
pub use reader::{read_ledger, LedgerFile};
pub use trade::{FxEnrichment, Trade, TradeSide, TRADES_LABEL, TRADE_FIELD_COUNT};
