//! Error types for ledgerfx

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::currency::Currency;

/// Main error type for ledgerfx
#[derive(Error, Debug)]
pub enum LedgerFxError {
    #[error("Source unavailable: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Currency not loaded: {0}")]
    CurrencyNotLoaded(Currency),

    #[error("No rate found for {currency} on {date} or the 10 days before it")]
    NoRateFound { currency: Currency, date: NaiveDate },

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Wrong row type: expected '{expected}', found '{found}'")]
    WrongRowType { expected: String, found: String },

    #[error("Field count mismatch: expected {expected}, found {found}")]
    FieldCountMismatch { expected: usize, found: usize },

    #[error("Could not parse {column} from '{value}'")]
    FieldParse { column: &'static str, value: String },

    #[error("Unexpected row: {0}")]
    UnexpectedRow(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for ledgerfx operations
pub type Result<T> = std::result::Result<T, LedgerFxError>;
