//! Shared utility functions for APM crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Day-first format used by the GPS and physical-testing exports.
    pub const DMY_FORMAT: &str = "%d/%m/%Y";

    /// Format a NaiveDate as "DD/MM/YYYY"
    pub fn format_date_dmy(date: &NaiveDate) -> String {
        date.format(DMY_FORMAT).to_string()
    }

    /// Parse a date string in "DD/MM/YYYY" format
    pub fn parse_date_dmy(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DMY_FORMAT)?)
    }

}

/// `HH:MM:SS` duration strings
pub mod durations {
    use crate::error::DurationError;

    /// Convert an `HH:MM:SS` string into a number of seconds.
    ///
    /// Hours are not capped at 24 and the minute/second fields are not
    /// range-checked, matching how the exports write accumulated zone time.
    pub fn hms_to_seconds(hms: &str) -> Result<u32, DurationError> {
        let parts = hms.trim().split(':').collect::<Vec<_>>();
        if parts.len() != 3 {
            return Err(DurationError(hms.to_string()));
        }
        let mut total = 0u32;
        for (part, scale) in parts.iter().zip([3600u32, 60, 1]) {
            let value = part
                .trim()
                .parse::<u32>()
                .map_err(|_| DurationError(hms.to_string()))?;
            total = value
                .checked_mul(scale)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| DurationError(hms.to_string()))?;
        }
        Ok(total)
    }

    /// Tolerant variant used by the loaders: empty or malformed cells count as zero.
    pub fn hms_to_seconds_or_zero(hms: &str) -> u32 {
        if hms.trim().is_empty() {
            return 0;
        }
        hms_to_seconds(hms).unwrap_or(0)
    }

}

/// Text decoding helpers
pub mod text {
    /// Decode latin-1 (ISO-8859-1) bytes. Every byte maps to the code point of
    /// the same value, so this never fails.
    pub fn decode_latin1(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| b as char).collect()
    }

}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DurationError(pub String);

    impl fmt::Display for DurationError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Duration error: expected HH:MM:SS, got {:?}", self.0)
        }
    }

    impl std::error::Error for DurationError {}
}
