//! Historical FX rate loading and resolution
//!
//! # Components
//!
//! - **rate_table**: Per-currency daily rate tables loaded from CSV
//!   directories, with bounded backward date resolution
//! - **service**: Lazy per-currency table cache keyed by base currency
//!
//! # Example
//!
//! ```rust
//! use ledgerfx::currency::Currency;
//! use ledgerfx::fx::RateTable;
//! use chrono::NaiveDate;
//!
//! let mut table = RateTable::new(Currency::USD);
//! table.insert(NaiveDate::from_ymd_opt(2024, 10, 25).unwrap(), 152.30);
//!
//! // 10/27 is a Sunday; the resolver backtracks to Friday's close
//! let resolved = table
//!     .resolve(NaiveDate::from_ymd_opt(2024, 10, 27).unwrap())
//!     .unwrap();
//! assert_eq!(resolved.rate, 152.30);
//! ```

pub mod rate_table;
pub mod service;

pub use rate_table::{RateTable, RateTableStats, ResolvedRate, MAX_BACKTRACK_DAYS};
pub use service::ExchangeRateService;
