//! Daily GPS/heart-rate session records.
//!
//! One row per player-day from the GPS export. Dates are `DD/MM/YYYY`,
//! heart-rate zone times are `HH:MM:SS`, and the file is latin-1 encoded.

use crate::error::Result;
use crate::header::{cell, parse_dmy, parse_number, HeaderIndex};
use crate::metric::MetricTable;
use crate::source::read_input;
use apm_utils::durations::hms_to_seconds_or_zero;
use apm_utils::text::decode_latin1;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use std::path::Path;

/// Columns the intensity bar charts are drawn for.
pub const GRADIENT_METRICS: [&str; 15] = [
    "distance",
    "distance_per_min",
    "distance_over_21",
    "distance_over_24",
    "distance_over_27",
    "accel_decel_over_2_5",
    "accel_decel_over_3_5",
    "accel_decel_over_4_5",
    "day_duration",
    "peak_speed",
    "hr_zone_1_sec",
    "hr_zone_2_sec",
    "hr_zone_3_sec",
    "hr_zone_4_sec",
    "hr_zone_5_sec",
];

/// Heart-rate zone columns, zone 1 through zone 5.
pub const HR_ZONE_COLUMNS: [&str; 5] = [
    "hr_zone_1_sec",
    "hr_zone_2_sec",
    "hr_zone_3_sec",
    "hr_zone_4_sec",
    "hr_zone_5_sec",
];

/// A single day of GPS and heart-rate data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsSession {
    pub date: NaiveDate,
    pub opposition_code: Option<String>,
    /// Days after the previous match; `0` marks the match itself.
    pub md_plus_code: Option<i32>,
    /// Days until the next match.
    pub md_minus_code: Option<i32>,
    /// Session length in minutes.
    pub day_duration: f64,
    pub distance: f64,
    pub distance_over_21: f64,
    pub distance_over_24: f64,
    pub distance_over_27: f64,
    pub accel_decel_over_2_5: f64,
    pub accel_decel_over_3_5: f64,
    pub accel_decel_over_4_5: f64,
    pub peak_speed: f64,
    /// Seconds spent in each heart-rate zone.
    pub hr_zone_sec: [u32; 5],
}

impl GpsSession {
    /// A day with activity that is not a match.
    pub fn is_training_day(&self) -> bool {
        self.day_duration > 0.0 && self.md_plus_code != Some(0)
    }

    /// A day with activity whose match-day code is zero.
    pub fn is_match_day(&self) -> bool {
        self.day_duration > 0.0 && self.md_plus_code == Some(0)
    }

    /// Metres per minute, `NaN` when there was no session time.
    pub fn distance_per_min(&self) -> f64 {
        if self.day_duration > 0.0 {
            self.distance / self.day_duration
        } else {
            f64::NAN
        }
    }

    /// Look up a numeric column by name, including the derived ones.
    pub fn metric(&self, name: &str) -> Option<f64> {
        let value = match name {
            "distance" => self.distance,
            "distance_per_min" => self.distance_per_min(),
            "distance_over_21" => self.distance_over_21,
            "distance_over_24" => self.distance_over_24,
            "distance_over_27" => self.distance_over_27,
            "accel_decel_over_2_5" => self.accel_decel_over_2_5,
            "accel_decel_over_3_5" => self.accel_decel_over_3_5,
            "accel_decel_over_4_5" => self.accel_decel_over_4_5,
            "day_duration" => self.day_duration,
            "peak_speed" => self.peak_speed,
            "md_plus_code" => self.md_plus_code.map_or(f64::NAN, f64::from),
            "md_minus_code" => self.md_minus_code.map_or(f64::NAN, f64::from),
            other => {
                let zone = HR_ZONE_COLUMNS.iter().position(|c| *c == other)?;
                f64::from(self.hr_zone_sec[zone])
            }
        };
        Some(value)
    }

    /// Parse the GPS export. Rows come back sorted by date; rows sharing a
    /// date keep their file order.
    ///
    /// Required columns: `date`, `md_plus_code`, `day_duration`, `distance`.
    /// Every other column is optional and reads as missing when absent.
    pub fn parse_csv(csv_data: &str) -> Result<Vec<GpsSession>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        let header = HeaderIndex::new(rdr.headers()?);

        let date_idx = header.require("date")?;
        header.require("md_plus_code")?;
        let duration_idx = header.require("day_duration")?;
        let distance_idx = header.require("distance")?;

        let mut sessions = Vec::new();
        let mut skipped = 0u32;
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let row = i + 1;
            let raw_date = cell(&record, Some(date_idx));
            if raw_date.is_empty() {
                skipped += 1;
                continue;
            }
            let number = |column: &str| -> Result<f64> {
                parse_number(row, column, cell(&record, header.optional(column)))
            };
            let code = |column: &str| -> Result<Option<i32>> {
                let value = number(column)?;
                Ok(value.is_finite().then_some(value as i32))
            };

            let mut hr_zone_sec = [0u32; 5];
            for (zone, slot) in hr_zone_sec.iter_mut().enumerate() {
                let column = format!("hr_zone_{}_hms", zone + 1);
                *slot = hms_to_seconds_or_zero(cell(&record, header.optional(&column)));
            }

            let opposition = cell(&record, header.optional("opposition_code"));
            sessions.push(GpsSession {
                date: parse_dmy(row, raw_date)?,
                opposition_code: (!opposition.is_empty()).then(|| opposition.to_string()),
                md_plus_code: code("md_plus_code")?,
                md_minus_code: code("md_minus_code")?,
                day_duration: parse_number(row, "day_duration", cell(&record, Some(duration_idx)))?,
                distance: parse_number(row, "distance", cell(&record, Some(distance_idx)))?,
                distance_over_21: number("distance_over_21")?,
                distance_over_24: number("distance_over_24")?,
                distance_over_27: number("distance_over_27")?,
                accel_decel_over_2_5: number("accel_decel_over_2_5")?,
                accel_decel_over_3_5: number("accel_decel_over_3_5")?,
                accel_decel_over_4_5: number("accel_decel_over_4_5")?,
                peak_speed: number("peak_speed")?,
                hr_zone_sec,
            });
        }
        sessions.sort_by_key(|s| s.date);
        log::info!(
            "gps: parsed {} sessions, skipped {} rows without a date",
            sessions.len(),
            skipped
        );
        Ok(sessions)
    }

    /// Load a GPS export from disk (plain or `.gz`, latin-1 encoded).
    pub fn load(path: &Path) -> Result<Vec<GpsSession>> {
        let bytes = read_input(path)?;
        GpsSession::parse_csv(&decode_latin1(&bytes))
    }

    /// Build a table holding every [`GRADIENT_METRICS`] column.
    pub fn to_metric_table(sessions: &[GpsSession]) -> MetricTable {
        let mut table = MetricTable::new(GRADIENT_METRICS);
        for session in sessions {
            table.push_row(session.date, |column| {
                session.metric(column).unwrap_or(f64::NAN)
            });
        }
        table
    }
}
