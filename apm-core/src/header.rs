//! Header-indexed access to CSV records shared by the loaders.

use crate::error::{LoadError, Result};
use apm_utils::dates::parse_date_dmy;
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;

pub(crate) struct HeaderIndex(HashMap<String, usize>);

impl HeaderIndex {
    pub(crate) fn new(headers: &StringRecord) -> Self {
        let map = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().trim_start_matches('\u{feff}').to_string(), i))
            .collect();
        Self(map)
    }

    pub(crate) fn require(&self, name: &str) -> Result<usize> {
        self.optional(name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    }

    pub(crate) fn optional(&self, name: &str) -> Option<usize> {
        self.0.get(name).copied()
    }
}

/// Trimmed cell text; absent columns and short rows read as empty.
pub(crate) fn cell(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("").trim()
}

/// Empty cells are missing (`NaN`); anything else must parse as a number.
pub(crate) fn parse_number(row: usize, column: &str, raw: &str) -> Result<f64> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

pub(crate) fn parse_dmy(row: usize, raw: &str) -> Result<NaiveDate> {
    parse_date_dmy(raw).map_err(|_| LoadError::InvalidDate {
        row,
        value: raw.to_string(),
    })
}
