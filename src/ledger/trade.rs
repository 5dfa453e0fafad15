//! Trade records parsed from the Trades section of an activity statement
//!
//! A Trade is built from one raw "Trades" data row. Building validates
//! the row shape against an explicit field layout and converts each field
//! to its typed form; FX enrichment is attached later, after rates are
//! resolved.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::error::{LedgerFxError, Result};

/// Section label of trade rows in the activity statement
pub const TRADES_LABEL: &str = "Trades";

/// Exact number of fields in a Trades row
pub const TRADE_FIELD_COUNT: usize = 14;

/// Timestamp format of a Date/Time field carrying a time of day
const DATETIME_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";
/// Fallback format of a day-only Date/Time field
const DATE_FORMAT: &str = "%Y-%m-%d";

// Field layout of a Trades row
const COL_CATEGORY: usize = 0;
const COL_SECTION: usize = 1;
const COL_DISCRIMINATOR: usize = 2;
const COL_ASSET_CATEGORY: usize = 3;
const COL_CURRENCY: usize = 4;
const COL_SYMBOL: usize = 5;
const COL_DATETIME: usize = 6;
const COL_QUANTITY: usize = 7;
const COL_PRICE: usize = 8;
const COL_PROCEEDS: usize = 9;
const COL_COMMISSION: usize = 10;
const COL_BASIS: usize = 11;
const COL_REALIZED_PL: usize = 12;
const COL_CODES: usize = 13;

/// Trade side derived from the cash flow direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Amounts of a trade converted into the quote currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxEnrichment {
    /// Rate used for the conversion
    pub rate: f64,
    /// Date the rate was quoted on; earlier than the trade date when the
    /// resolver backtracked
    pub rate_date: NaiveDate,
    /// Proceeds in the quote currency
    pub proceeds: f64,
    /// Cost basis in the quote currency
    pub basis: f64,
    /// Realized profit/loss in the quote currency
    pub realized_pl: f64,
}

/// One executed order from the Trades section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Row category label ("Trades")
    pub category: String,
    /// Row subtype ("Data")
    pub section: String,
    /// Row discriminator ("Order")
    pub discriminator: String,
    /// Asset category, e.g. "Stocks"
    pub asset_category: String,
    /// Currency the trade settled in
    pub currency: Currency,
    /// Instrument symbol, verbatim
    pub symbol: String,
    /// Execution timestamp; midnight when the row carried a day only
    pub executed_at: NaiveDateTime,
    /// Number of units traded (signed, fractional units allowed)
    pub quantity: f64,
    /// Unit price; absent when the statement left the field empty
    pub price: Option<f64>,
    /// Cash flow of the trade (negative for outflows)
    pub proceeds: f64,
    /// Commission and fees
    pub commission: f64,
    /// Cost basis
    pub basis: f64,
    /// Realized profit/loss
    pub realized_pl: f64,
    /// Statement codes, e.g. "A;O"
    pub codes: String,
    /// Quote-currency conversion, attached by enrichment
    pub fx: Option<FxEnrichment>,
}

impl Trade {
    /// Build a trade from the raw fields of one Trades data row
    pub fn from_record(fields: &[String]) -> Result<Trade> {
        let category = fields.first().map(String::as_str).unwrap_or_default();
        if category != TRADES_LABEL {
            return Err(LedgerFxError::WrongRowType {
                expected: TRADES_LABEL.to_string(),
                found: category.to_string(),
            });
        }

        if fields.len() != TRADE_FIELD_COUNT {
            return Err(LedgerFxError::FieldCountMismatch {
                expected: TRADE_FIELD_COUNT,
                found: fields.len(),
            });
        }

        Ok(Trade {
            category: fields[COL_CATEGORY].clone(),
            section: fields[COL_SECTION].clone(),
            discriminator: fields[COL_DISCRIMINATOR].clone(),
            asset_category: fields[COL_ASSET_CATEGORY].clone(),
            currency: Currency::from_code(&fields[COL_CURRENCY])?,
            symbol: fields[COL_SYMBOL].clone(),
            executed_at: parse_datetime(&fields[COL_DATETIME])?,
            quantity: parse_amount("quantity", &fields[COL_QUANTITY])?,
            price: parse_optional_amount("price", &fields[COL_PRICE])?,
            proceeds: parse_amount("proceeds", &fields[COL_PROCEEDS])?,
            commission: parse_amount("commission", &fields[COL_COMMISSION])?,
            basis: parse_amount("basis", &fields[COL_BASIS])?,
            realized_pl: parse_amount("realized P/L", &fields[COL_REALIZED_PL])?,
            codes: fields[COL_CODES].clone(),
            fx: None,
        })
    }

    /// Day the trade executed on
    pub fn date(&self) -> NaiveDate {
        self.executed_at.date()
    }

    /// Side of the trade
    ///
    /// Negative proceeds mean cash left the account, so the trade was a
    /// purchase; positive proceeds mean a sale. A zero-proceeds trade
    /// (e.g. a free delivery) falls back to the quantity sign.
    pub fn side(&self) -> TradeSide {
        if self.proceeds < 0.0 {
            TradeSide::Buy
        } else if self.proceeds > 0.0 {
            TradeSide::Sell
        } else if self.quantity > 0.0 {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        }
    }

    /// Check if this is a buy
    pub fn is_buy(&self) -> bool {
        self.side() == TradeSide::Buy
    }

    /// Check if this is a sell
    pub fn is_sell(&self) -> bool {
        self.side() == TradeSide::Sell
    }
}

/// Parse a Date/Time field, accepting a day with or without a time
fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_| LedgerFxError::FieldParse {
            column: "date/time",
            value: value.to_string(),
        })
}

/// Parse a required signed amount
pub(crate) fn parse_amount(column: &'static str, value: &str) -> Result<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerFxError::FieldParse {
            column,
            value: value.to_string(),
        });
    }
    trimmed.parse().map_err(|_| LedgerFxError::FieldParse {
        column,
        value: value.to_string(),
    })
}

/// Parse an amount the statement may leave empty
fn parse_optional_amount(column: &'static str, value: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| LedgerFxError::FieldParse {
            column,
            value: value.to_string(),
        })
}
