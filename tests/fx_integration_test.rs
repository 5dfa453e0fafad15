//! Integration tests for the FX system
//!
//! Exercises rate-table loading from on-disk fixtures and resolution
//! through the exchange rate service

use chrono::NaiveDate;
use ledgerfx::currency::Currency;
use ledgerfx::error::LedgerFxError;
use ledgerfx::fx::{ExchangeRateService, RateTable, MAX_BACKTRACK_DAYS};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_pair_file(root: &Path, pair: &str, name: &str, contents: &str) {
    let dir = root.join(pair);
    if !dir.exists() {
        fs::create_dir_all(&dir).unwrap();
    }
    fs::write(dir.join(name), contents).unwrap();
}

/// USD/JPY fixtures split across two quarterly files
fn usdjpy_root() -> TempDir {
    let root = tempdir().unwrap();
    write_pair_file(
        root.path(),
        "usdjpy",
        "usdjpy-2024-q1.csv",
        "Date,Open,High,Low,Close\n\
         01/12/2024,144.90,145.40,144.60,145.10\n\
         01/15/2024,145.00,145.80,144.95,145.65\n",
    );
    write_pair_file(
        root.path(),
        "usdjpy",
        "usdjpy-2024-q4.csv",
        "Date,Open,High,Low,Close\n\
         10/24/2024,152.10,152.40,151.90,152.25\n\
         10/25/2024,152.20,152.55,152.00,152.30\n",
    );
    root
}

#[test]
fn test_directory_load_merges_files() {
    let root = usdjpy_root();
    let table = RateTable::load_dir(&root.path().join("usdjpy"), Currency::USD).unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.rate_on(date(2024, 1, 12)), Some(145.10));
    assert_eq!(table.rate_on(date(2024, 10, 25)), Some(152.30));
}

#[test]
fn test_later_file_wins_on_duplicate_dates() {
    let root = usdjpy_root();
    // Revision file sorts after the quarterlies and restates 10/25
    write_pair_file(
        root.path(),
        "usdjpy",
        "usdjpy-2024-revised.csv",
        "Date,Open,High,Low,Close\n\
         10/25/2024,152.20,152.55,152.00,152.99\n",
    );

    let table = RateTable::load_dir(&root.path().join("usdjpy"), Currency::USD).unwrap();
    assert_eq!(table.rate_on(date(2024, 10, 25)), Some(152.99));
}

#[test]
fn test_malformed_rows_are_skipped_not_fatal() {
    let root = tempdir().unwrap();
    write_pair_file(
        root.path(),
        "usdjpy",
        "usdjpy-noisy.csv",
        "Date,Open,High,Low,Close\n\
         not-a-date,1,2,3,4\n\
         10/24/2024,152.10,152.40,151.90,n/a\n\
         10/25/2024,152.20,152.55,152.00,\"152.30\"\n",
    );

    let table = RateTable::load_dir(&root.path().join("usdjpy"), Currency::USD).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.rate_on(date(2024, 10, 25)), Some(152.30));
}

#[test]
fn test_weekend_resolves_to_friday_close() {
    let root = usdjpy_root();
    let mut service = ExchangeRateService::new(root.path(), Currency::JPY);
    service.ensure_currency(Currency::USD).unwrap();

    // Saturday and Sunday both fall back to Friday 10/25
    for day in [26, 27] {
        let resolved = service.resolve(Currency::USD, date(2024, 10, day)).unwrap();
        assert_eq!(resolved.rate, 152.30);
        assert_eq!(resolved.rate_date, date(2024, 10, 25));
    }
}

#[test]
fn test_backtrack_window_is_exactly_ten_days() {
    let root = tempdir().unwrap();
    write_pair_file(
        root.path(),
        "usdjpy",
        "usdjpy-sparse.csv",
        "Date,Open,High,Low,Close\n\
         06/03/2024,155.00,155.50,154.80,155.20\n",
    );
    let mut service = ExchangeRateService::new(root.path(), Currency::JPY);
    service.ensure_currency(Currency::USD).unwrap();

    // 06/13 is ten days after the close, still inside the window
    let inside = date(2024, 6, 3) + chrono::Duration::days(MAX_BACKTRACK_DAYS);
    let resolved = service.resolve(Currency::USD, inside).unwrap();
    assert_eq!(resolved.rate_date, date(2024, 6, 3));

    // One more day and the window is exhausted
    let outside = inside + chrono::Duration::days(1);
    let err = service.resolve(Currency::USD, outside).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("No rate found for USD"));
    assert!(msg.contains("2024-06-14"));
    assert!(msg.contains("10 days"));
}

#[test]
fn test_rates_never_resolve_forward() {
    let root = tempdir().unwrap();
    write_pair_file(
        root.path(),
        "usdjpy",
        "usdjpy-late.csv",
        "Date,Open,High,Low,Close\n\
         10/24/2024,152.10,152.40,151.90,152.25\n",
    );
    let mut service = ExchangeRateService::new(root.path(), Currency::JPY);
    service.ensure_currency(Currency::USD).unwrap();

    // A close exists on 10/24 but lookups before it must not see it
    assert!(service.resolve(Currency::USD, date(2024, 10, 23)).is_err());
}

#[test]
fn test_quote_currency_needs_no_table() {
    let root = tempdir().unwrap();
    let mut service = ExchangeRateService::new(root.path(), Currency::JPY);

    assert!(service.has_currency(Currency::JPY));
    service.ensure_currency(Currency::JPY).unwrap();

    let resolved = service.resolve(Currency::JPY, date(2024, 10, 27)).unwrap();
    assert_eq!(resolved.rate, 1.0);
    assert_eq!(resolved.rate_date, date(2024, 10, 27));
}

#[test]
fn test_currencies_load_lazily() {
    let root = usdjpy_root();
    write_pair_file(
        root.path(),
        "eurjpy",
        "eurjpy-2024.csv",
        "Date,Open,High,Low,Close\n\
         10/24/2024,163.90,164.30,163.50,164.10\n",
    );
    let mut service = ExchangeRateService::new(root.path(), Currency::JPY);

    assert!(!service.has_currency(Currency::USD));
    assert!(!service.has_currency(Currency::EUR));

    service.ensure_currency(Currency::USD).unwrap();
    assert!(service.has_currency(Currency::USD));
    assert!(!service.has_currency(Currency::EUR));

    service.ensure_currency(Currency::EUR).unwrap();
    assert_eq!(
        service.loaded_currencies(),
        vec![Currency::EUR, Currency::USD]
    );
}

#[test]
fn test_missing_pair_directory_is_source_unavailable() {
    let root = usdjpy_root();
    let mut service = ExchangeRateService::new(root.path(), Currency::JPY);

    let err = service.ensure_currency(Currency::GBP).unwrap_err();
    match err {
        LedgerFxError::SourceUnavailable { path, .. } => {
            assert!(path.ends_with("gbpjpy"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unloaded_currency_lookup_is_an_error() {
    let root = usdjpy_root();
    let service = ExchangeRateService::new(root.path(), Currency::JPY);

    assert!(matches!(
        service.resolve(Currency::USD, date(2024, 10, 25)),
        Err(LedgerFxError::CurrencyNotLoaded(Currency::USD))
    ));
}

#[test]
fn test_table_stats_report_date_range() {
    let root = usdjpy_root();
    let mut service = ExchangeRateService::new(root.path(), Currency::JPY);
    service.ensure_currency(Currency::USD).unwrap();

    let stats = service.table(Currency::USD).unwrap().stats();
    assert_eq!(stats.currency, Currency::USD);
    assert_eq!(stats.entries, 4);
    assert_eq!(stats.start_date, Some(date(2024, 1, 12)));
    assert_eq!(stats.end_date, Some(date(2024, 10, 25)));
}
