//! Cash events parsed from the Dividends, Withholding Tax and Interest
//! sections of an activity statement
//!
//! Cash sections share one six-column layout: label, subtype, currency,
//! date, description, amount. Unlike trades they carry no time of day
//! and no FX enrichment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::error::{LedgerFxError, Result};
use crate::ledger::trade::parse_amount;

/// Exact number of fields in a cash section row
pub const CASH_FIELD_COUNT: usize = 6;

/// Date format of cash section rows
const CASH_DATE_FORMAT: &str = "%Y-%m-%d";

// Field layout of a cash section row
const COL_CURRENCY: usize = 2;
const COL_DATE: usize = 3;
const COL_DESCRIPTION: usize = 4;
const COL_AMOUNT: usize = 5;

/// Kind of cash section a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CashEventKind {
    Dividend,
    WithholdingTax,
    Interest,
}

impl CashEventKind {
    /// Section label carried by rows of this kind
    pub fn label(&self) -> &'static str {
        match self {
            CashEventKind::Dividend => "Dividends",
            CashEventKind::WithholdingTax => "Withholding Tax",
            CashEventKind::Interest => "Interest",
        }
    }

    /// All cash section kinds, in statement order
    pub fn all() -> [CashEventKind; 3] {
        [
            CashEventKind::Dividend,
            CashEventKind::WithholdingTax,
            CashEventKind::Interest,
        ]
    }
}

impl fmt::Display for CashEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One dividend, withholding tax or interest posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashEvent {
    /// Section the row came from
    pub kind: CashEventKind,
    /// Currency the amount is denominated in
    pub currency: Currency,
    /// Posting date
    pub date: NaiveDate,
    /// Statement description, verbatim
    pub description: String,
    /// Posted amount (negative for charges)
    pub amount: f64,
}

impl CashEvent {
    /// Build a cash event from the raw fields of one data row
    pub fn from_record(kind: CashEventKind, fields: &[String]) -> Result<CashEvent> {
        let label = fields.first().map(String::as_str).unwrap_or_default();
        if label != kind.label() {
            return Err(LedgerFxError::WrongRowType {
                expected: kind.label().to_string(),
                found: label.to_string(),
            });
        }

        if fields.len() != CASH_FIELD_COUNT {
            return Err(LedgerFxError::FieldCountMismatch {
                expected: CASH_FIELD_COUNT,
                found: fields.len(),
            });
        }

        let date = NaiveDate::parse_from_str(&fields[COL_DATE], CASH_DATE_FORMAT).map_err(|_| {
            LedgerFxError::FieldParse {
                column: "date",
                value: fields[COL_DATE].clone(),
            }
        })?;

        Ok(CashEvent {
            kind,
            currency: Currency::from_code(&fields[COL_CURRENCY])?,
            date,
            description: fields[COL_DESCRIPTION].clone(),
            amount: parse_amount("amount", &fields[COL_AMOUNT])?,
        })
    }
}
