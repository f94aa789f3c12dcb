//! Physical capability test results.
//!
//! Each row is one test of a movement/quality pair, expressed either
//! isometrically or dynamically, scored as a percentage of a benchmark.
//! Scores below the benchmark norm can be negative.

use crate::error::Result;
use crate::header::{cell, parse_dmy, parse_number, HeaderIndex};
use crate::metric::MetricTable;
use crate::source::read_input;
use apm_utils::text::decode_latin1;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalTest {
    pub test_date: NaiveDate,
    /// `isometric` or `dynamic`
    pub expression: String,
    pub movement: String,
    pub quality: String,
    pub benchmark_pct: Option<f64>,
}

impl PhysicalTest {
    /// Column name used for this test's series, e.g. `isometric_agility_acceleration`.
    pub fn metric_name(&self) -> String {
        metric_name(&self.expression, &self.movement, &self.quality)
    }

    /// Parse the physical capability export.
    ///
    /// Expected columns (with headers): `testDate,expression,movement,quality,benchmarkPct`.
    /// An empty `benchmarkPct` is kept as a test with no score.
    pub fn parse_csv(csv_data: &str) -> Result<Vec<PhysicalTest>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        let header = HeaderIndex::new(rdr.headers()?);
        let date_idx = header.require("testDate")?;
        let expression_idx = header.require("expression")?;
        let movement_idx = header.require("movement")?;
        let quality_idx = header.require("quality")?;
        let benchmark_idx = header.require("benchmarkPct")?;

        let mut tests = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let row = i + 1;
            let raw_date = cell(&record, Some(date_idx));
            if raw_date.is_empty() {
                continue;
            }
            let benchmark = parse_number(row, "benchmarkPct", cell(&record, Some(benchmark_idx)))?;
            tests.push(PhysicalTest {
                test_date: parse_dmy(row, raw_date)?,
                expression: cell(&record, Some(expression_idx)).to_lowercase(),
                movement: cell(&record, Some(movement_idx)).to_string(),
                quality: cell(&record, Some(quality_idx)).to_string(),
                benchmark_pct: benchmark.is_finite().then_some(benchmark),
            });
        }
        tests.sort_by_key(|t| t.test_date);
        log::info!("physical: parsed {} tests", tests.len());
        Ok(tests)
    }

    pub fn load(path: &Path) -> Result<Vec<PhysicalTest>> {
        let bytes = read_input(path)?;
        PhysicalTest::parse_csv(&decode_latin1(&bytes))
    }

    /// Pivot tests into one column per metric name. Each test becomes its own
    /// row; the other columns on that row are missing.
    pub fn to_metric_table(tests: &[PhysicalTest]) -> MetricTable {
        let names = tests
            .iter()
            .map(PhysicalTest::metric_name)
            .collect::<BTreeSet<_>>();
        let mut table = MetricTable::new(names);
        for test in tests {
            let name = test.metric_name();
            let score = test.benchmark_pct.unwrap_or(f64::NAN);
            table.push_row(test.test_date, |column| {
                if column == name {
                    score
                } else {
                    f64::NAN
                }
            });
        }
        table
    }
}

/// Build the series name for an expression/movement/quality triple:
/// lower-cased, spaces replaced by underscores.
pub fn metric_name(expression: &str, movement: &str, quality: &str) -> String {
    format!("{expression}_{movement}_{quality}")
        .to_lowercase()
        .replace(' ', "_")
}
