//! Tests for error creation, message formatting and conversions

use chrono::NaiveDate;
use ledgerfx::currency::Currency;
use ledgerfx::error::LedgerFxError;
use std::path::PathBuf;

#[test]
fn test_source_unavailable_names_the_path() {
    let err = LedgerFxError::SourceUnavailable {
        path: PathBuf::from("data/rates/usdjpy"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    };

    let msg = err.to_string();
    assert!(msg.contains("Source unavailable"));
    assert!(msg.contains("usdjpy"));

    // The io error stays reachable as the source
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_currency_not_loaded() {
    let err = LedgerFxError::CurrencyNotLoaded(Currency::EUR);
    assert_eq!(err.to_string(), "Currency not loaded: EUR");
}

#[test]
fn test_no_rate_found_names_currency_date_and_window() {
    let err = LedgerFxError::NoRateFound {
        currency: Currency::USD,
        date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
    };

    let msg = err.to_string();
    assert!(msg.contains("USD"));
    assert!(msg.contains("2024-06-14"));
    assert!(msg.contains("10 days"));
}

#[test]
fn test_unknown_currency() {
    let err = LedgerFxError::UnknownCurrency("DOGE".to_string());
    assert_eq!(err.to_string(), "Unknown currency code: DOGE");
}

#[test]
fn test_wrong_row_type() {
    let err = LedgerFxError::WrongRowType {
        expected: "Trades".to_string(),
        found: "Dividends".to_string(),
    };

    let msg = err.to_string();
    assert!(msg.contains("expected 'Trades'"));
    assert!(msg.contains("found 'Dividends'"));
}

#[test]
fn test_field_count_mismatch() {
    let err = LedgerFxError::FieldCountMismatch {
        expected: 14,
        found: 13,
    };

    let msg = err.to_string();
    assert!(msg.contains("expected 14"));
    assert!(msg.contains("found 13"));
}

#[test]
fn test_field_parse_names_column_and_value() {
    let err = LedgerFxError::FieldParse {
        column: "quantity",
        value: "two hundred".to_string(),
    };

    assert_eq!(
        err.to_string(),
        "Could not parse quantity from 'two hundred'"
    );
}

#[test]
fn test_unexpected_row_carries_the_row() {
    let err = LedgerFxError::UnexpectedRow("Trades,Data,ClosedLot,Stocks".to_string());

    let msg = err.to_string();
    assert!(msg.contains("Unexpected row"));
    assert!(msg.contains("ClosedLot"));
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: LedgerFxError = io.into();
    assert!(matches!(err, LedgerFxError::IoError(_)));
}

#[test]
fn test_serde_error_conversion() {
    let bad = serde_json::from_str::<serde_json::Value>("{not json");
    let err: LedgerFxError = bad.unwrap_err().into();
    assert!(matches!(err, LedgerFxError::SerdeError(_)));
}
