//! Activity-statement CSV reading
//!
//! Brokerage activity exports interleave several report sections in one
//! file, each row carrying its section label in the first column. The
//! reader makes a single pass and groups rows by that label, preserving
//! the order within each group. Rows keep their raw text fields; typing
//! happens later, per section.

use csv::ReaderBuilder;
use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::error::{LedgerFxError, Result};

/// One activity statement, grouped by section label
#[derive(Debug, Default)]
pub struct LedgerFile {
    groups: HashMap<String, Vec<Vec<String>>>,
}

impl LedgerFile {
    /// Rows of one section, in file order
    pub fn group(&self, label: &str) -> Option<&[Vec<String>]> {
        self.groups.get(label).map(|rows| rows.as_slice())
    }

    /// Section labels present in the file, sorted
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Number of sections
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of grouped rows
    pub fn row_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Read an activity CSV and group its rows by leading section label
///
/// Sections have different widths, so the reader accepts ragged rows.
/// Rows with no content at all are dropped.
pub fn read_ledger(path: &Path) -> Result<LedgerFile> {
    let file = File::open(path).map_err(|e| LedgerFxError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut ledger = LedgerFile::default();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let label = record.get(0).unwrap_or_default().to_string();
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        ledger.groups.entry(label).or_default().push(fields);
    }

    info!(
        "Read {} rows in {} section(s) from {}",
        ledger.row_count(),
        ledger.group_count(),
        path.display()
    );

    Ok(ledger)
}
