//! Historical daily rate tables loaded from per-pair CSV directories
//!
//! Each table holds one base currency's daily closing rates against the
//! quote currency, keyed by date. BTreeMap keeps the dates ordered so the
//! resolver can walk backwards from a requested date.

use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::Path;

use crate::currency::Currency;
use crate::error::{LedgerFxError, Result};

/// Maximum number of calendar days the resolver steps back from the
/// requested date before giving up
pub const MAX_BACKTRACK_DAYS: i64 = 10;

/// Column index of the date field in a historical rate CSV row
const RATE_DATE_COLUMN: usize = 0;
/// Column index of the closing rate field in a historical rate CSV row
const RATE_CLOSE_COLUMN: usize = 4;
/// Date format used by the historical rate files
const RATE_DATE_FORMAT: &str = "%m/%d/%Y";

/// A rate resolved for a requested date
///
/// `rate_date` is the date the rate was actually quoted on; it differs
/// from the requested date when the resolver had to backtrack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate {
    pub rate: f64,
    pub rate_date: NaiveDate,
}

/// Daily closing rates for one base currency against the quote currency
///
/// Sparse by construction: a date without a quote is absent, never zero.
#[derive(Debug, Clone)]
pub struct RateTable {
    currency: Currency,
    rates: BTreeMap<NaiveDate, f64>,
}

impl RateTable {
    /// Create an empty table for a currency
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            rates: BTreeMap::new(),
        }
    }

    /// Load every rate file in a directory into one table
    ///
    /// Files are read in sorted filename order and merged; a later record
    /// overwrites an earlier one for the same date. A missing or
    /// unreadable directory fails the load; a malformed row does not.
    pub fn load_dir(dir: &Path, currency: Currency) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|e| LedgerFxError::SourceUnavailable {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LedgerFxError::SourceUnavailable {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut table = RateTable::new(currency);
        for path in &paths {
            table.load_file(path)?;
        }

        let stats = table.stats();
        info!(
            "Loaded {} rate entries for {} from {} file(s) in {}",
            stats.entries,
            currency,
            paths.len(),
            dir.display()
        );

        Ok(table)
    }

    /// Load one historical rate CSV file into the table
    ///
    /// The first record is the header and is always skipped. Each
    /// remaining record contributes its date (column 0, MM/DD/YYYY) and
    /// closing rate (column 4, possibly carrying residual quote
    /// characters); records where either fails to parse are skipped.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|e| LedgerFxError::SourceUnavailable {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        for result in rdr.records() {
            let record = result?;

            let (Some(date_str), Some(close_raw)) = (
                record.get(RATE_DATE_COLUMN),
                record.get(RATE_CLOSE_COLUMN),
            ) else {
                debug!(
                    "Skipping short rate row in {}: {:?}",
                    path.display(),
                    record
                );
                continue;
            };

            let date = match NaiveDate::parse_from_str(date_str, RATE_DATE_FORMAT) {
                Ok(date) => date,
                Err(_) => {
                    debug!(
                        "Skipping rate row with unparseable date '{}' in {}",
                        date_str,
                        path.display()
                    );
                    continue;
                }
            };

            let close: f64 = match close_raw.trim().trim_matches('"').parse() {
                Ok(close) => close,
                Err(_) => {
                    debug!(
                        "Skipping rate row with unparseable close '{}' in {}",
                        close_raw,
                        path.display()
                    );
                    continue;
                }
            };

            self.rates.insert(date, close);
        }

        Ok(())
    }

    /// Insert a single rate, overwriting any existing rate for the date
    pub fn insert(&mut self, date: NaiveDate, rate: f64) {
        self.rates.insert(date, rate);
    }

    /// Rate quoted exactly on the given date
    pub fn rate_on(&self, date: NaiveDate) -> Option<f64> {
        self.rates.get(&date).copied()
    }

    /// Resolve a rate for a date, backtracking day by day when absent
    ///
    /// An exact hit wins. Otherwise the resolver steps back one calendar
    /// day at a time, up to [`MAX_BACKTRACK_DAYS`] days strictly before
    /// the requested date, and returns the first hit. No interpolation.
    pub fn resolve(&self, date: NaiveDate) -> Result<ResolvedRate> {
        if let Some(rate) = self.rate_on(date) {
            return Ok(ResolvedRate {
                rate,
                rate_date: date,
            });
        }

        let mut candidate = date;
        for _ in 0..MAX_BACKTRACK_DAYS {
            candidate -= Duration::days(1);
            if let Some(rate) = self.rate_on(candidate) {
                return Ok(ResolvedRate {
                    rate,
                    rate_date: candidate,
                });
            }
        }

        Err(LedgerFxError::NoRateFound {
            currency: self.currency,
            date,
        })
    }

    /// Currency this table quotes
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Number of dated rates in the table
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// True when the table holds no rates
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Get statistics
    pub fn stats(&self) -> RateTableStats {
        RateTableStats {
            currency: self.currency,
            entries: self.rates.len(),
            start_date: self.rates.keys().next().copied(),
            end_date: self.rates.keys().next_back().copied(),
        }
    }
}

/// Rate table statistics
#[derive(Debug, Clone)]
pub struct RateTableStats {
    pub currency: Currency,
    pub entries: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exact_lookup() {
        let mut table = RateTable::new(Currency::USD);
        table.insert(date(2024, 10, 25), 152.30);

        assert_eq!(table.rate_on(date(2024, 10, 25)), Some(152.30));
        assert_eq!(table.rate_on(date(2024, 10, 26)), None);

        let resolved = table.resolve(date(2024, 10, 25)).unwrap();
        assert_eq!(resolved.rate, 152.30);
        assert_eq!(resolved.rate_date, date(2024, 10, 25));
    }

    #[test]
    fn test_backtrack_returns_closest_preceding() {
        let mut table = RateTable::new(Currency::USD);
        table.insert(date(2024, 10, 24), 152.25);
        table.insert(date(2024, 10, 25), 152.30);

        // 10/26 and 10/27 have no quote; both should land on 10/25
        let resolved = table.resolve(date(2024, 10, 27)).unwrap();
        assert_eq!(resolved.rate, 152.30);
        assert_eq!(resolved.rate_date, date(2024, 10, 25));
    }

    #[test]
    fn test_backtrack_window_boundary() {
        let mut table = RateTable::new(Currency::USD);
        table.insert(date(2024, 1, 1), 140.0);

        // 10 days out is still inside the window
        let resolved = table.resolve(date(2024, 1, 11)).unwrap();
        assert_eq!(resolved.rate, 140.0);
        assert_eq!(resolved.rate_date, date(2024, 1, 1));

        // 11 days out is not
        match table.resolve(date(2024, 1, 12)).unwrap_err() {
            LedgerFxError::NoRateFound { currency, date: d } => {
                assert_eq!(currency, Currency::USD);
                assert_eq!(d, date(2024, 1, 12));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_earlier_data() {
        let mut table = RateTable::new(Currency::USD);
        table.insert(date(2024, 10, 25), 152.30);

        assert!(matches!(
            table.resolve(date(2024, 1, 1)),
            Err(LedgerFxError::NoRateFound { .. })
        ));
    }

    #[test]
    fn test_never_uses_later_rate() {
        let mut table = RateTable::new(Currency::USD);
        table.insert(date(2024, 10, 28), 153.10);

        assert!(table.resolve(date(2024, 10, 27)).is_err());
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let table = RateTable::new(Currency::EUR);
        assert!(table.is_empty());
        assert!(table.resolve(date(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_load_file_skips_header_and_malformed_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usdjpy-2024.csv");
        fs::write(
            &path,
            "Date,Open,High,Low,Close\n\
             10/24/2024,152.10,152.40,151.90,152.25\n\
             10/25/2024,152.20,152.55,152.00,\"152.30\"\n\
             not-a-date,1,2,3,4\n\
             10/28/2024,152.40,152.80,152.10,n/a\n",
        )
        .unwrap();

        let mut table = RateTable::new(Currency::USD);
        table.load_file(&path).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rate_on(date(2024, 10, 24)), Some(152.25));
        assert_eq!(table.rate_on(date(2024, 10, 25)), Some(152.30));
        assert_eq!(table.rate_on(date(2024, 10, 28)), None);
    }

    #[test]
    fn test_load_dir_merges_files_last_wins() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a-2024-q3.csv"),
            "Date,Open,High,Low,Close\n\
             10/24/2024,0,0,0,151.00\n\
             10/25/2024,0,0,0,151.50\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b-2024-q4.csv"),
            "Date,Open,High,Low,Close\n\
             10/25/2024,0,0,0,152.30\n\
             10/28/2024,0,0,0,152.60\n",
        )
        .unwrap();

        let table = RateTable::load_dir(dir.path(), Currency::USD).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rate_on(date(2024, 10, 24)), Some(151.00));
        // b-2024-q4.csv sorts after a-2024-q3.csv and overwrites 10/25
        assert_eq!(table.rate_on(date(2024, 10, 25)), Some(152.30));
        assert_eq!(table.rate_on(date(2024, 10, 28)), Some(152.60));
    }

    #[test]
    fn test_load_dir_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gbpjpy");

        assert!(matches!(
            RateTable::load_dir(&missing, Currency::GBP),
            Err(LedgerFxError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_load_dir_empty_directory_is_empty_table() {
        let dir = tempdir().unwrap();
        let table = RateTable::load_dir(dir.path(), Currency::CHF).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_stats_date_range() {
        let mut table = RateTable::new(Currency::USD);
        table.insert(date(2024, 10, 25), 152.30);
        table.insert(date(2024, 10, 24), 152.25);

        let stats = table.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.start_date, Some(date(2024, 10, 24)));
        assert_eq!(stats.end_date, Some(date(2024, 10, 25)));
    }
}
