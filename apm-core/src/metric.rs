//! Date-ordered numeric series and tables.
//!
//! A [`MetricSeries`] is one named column over time; a [`MetricTable`] is a
//! set of columns sharing one date axis. Missing values are stored as `NaN`.
//! Both are kept sorted ascending by date with a stable sort, so rows that
//! share a calendar day stay as separate rows in their original order.

use crate::error::{LoadError, Result};
use crate::reporting_period::ReportingPeriod;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Versions are drawn from one process-wide counter, so two tables never
/// share a version number.
fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// A single dated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl MetricPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A named, date-ordered series of values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    name: String,
    points: Vec<MetricPoint>,
}

impl MetricSeries {
    pub fn new(name: impl Into<String>, mut points: Vec<MetricPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn from_pairs<I>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let points = pairs
            .into_iter()
            .map(|(date, value)| MetricPoint { date, value })
            .collect();
        Self::new(name, points)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Named numeric columns over a shared, ascending date axis.
///
/// Every mutation stamps the table with a fresh `version`; derived data
/// cached against an older version is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
    version: u64,
}

impl MetricTable {
    pub fn new<I, S>(column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = column_names
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();
        Self {
            dates: Vec::new(),
            columns,
            version: next_version(),
        }
    }

    /// Insert a row, asking `value_of` for each column's value. The row goes
    /// after any existing rows with the same date.
    pub fn push_row<F>(&mut self, date: NaiveDate, mut value_of: F)
    where
        F: FnMut(&str) -> f64,
    {
        let index = self.dates.partition_point(|d| *d <= date);
        self.dates.insert(index, date);
        for (name, values) in self.columns.iter_mut() {
            values.insert(index, value_of(name));
        }
        self.version = next_version();
    }

    /// Drop every row outside `period`.
    pub fn retain_period(&mut self, period: &ReportingPeriod) {
        let keep = self
            .dates
            .iter()
            .map(|d| period.contains(d))
            .collect::<Vec<_>>();
        for values in self.columns.values_mut() {
            let mut flags = keep.iter();
            values.retain(|_| flags.next().copied().unwrap_or(false));
        }
        self.dates.retain(|d| period.contains(d));
        self.version = next_version();
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Extract one column as a [`MetricSeries`].
    pub fn series(&self, name: &str) -> Result<MetricSeries> {
        let values = self
            .columns
            .get(name)
            .ok_or_else(|| LoadError::UnknownColumn(name.to_string()))?;
        let points = self
            .dates
            .iter()
            .zip(values)
            .map(|(date, value)| MetricPoint::new(*date, *value))
            .collect();
        Ok(MetricSeries::new(name, points))
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Last date in the table, if any.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_series_sorts_stably() {
        let series = MetricSeries::from_pairs(
            "distance",
            vec![(day(3), 3.0), (day(1), 1.0), (day(3), 30.0), (day(2), 2.0)],
        );
        let values = series.values().collect::<Vec<_>>();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 30.0]);
        assert_eq!(series.name(), "distance");
    }

    #[test]
    fn test_table_push_row_keeps_order_and_bumps_version() {
        let mut table = MetricTable::new(["a", "b"]);
        let v0 = table.version();
        table.push_row(day(2), |c| if c == "a" { 2.0 } else { 20.0 });
        table.push_row(day(1), |c| if c == "a" { 1.0 } else { 10.0 });
        table.push_row(day(2), |_| 99.0);
        assert!(table.version() > v0);

        assert_eq!(table.dates(), &[day(1), day(2), day(2)]);
        assert_eq!(table.column("a").unwrap(), &[1.0, 2.0, 99.0]);
        assert_eq!(table.column("b").unwrap(), &[10.0, 20.0, 99.0]);
        assert_eq!(table.latest_date(), Some(day(2)));
    }

    #[test]
    fn test_table_series_unknown_column() {
        let table = MetricTable::new(["a"]);
        assert!(matches!(table.series("b"), Err(LoadError::UnknownColumn(_))));
    }

    #[test]
    fn test_table_retain_period() {
        let mut table = MetricTable::new(["a"]);
        for d in 1..=10 {
            table.push_row(day(d), |_| d as f64);
        }
        let before = table.version();
        table.retain_period(&ReportingPeriod::new(day(4), day(6)));
        assert_ne!(table.version(), before);
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("a").unwrap(), &[4.0, 5.0, 6.0]);
        let series = table.series("a").unwrap();
        assert_eq!(series.points()[0].date, day(4));
    }

    #[test]
    fn test_versions_are_unique_across_tables() {
        let a = MetricTable::new(["x"]);
        let b = MetricTable::new(["x"]);
        assert_ne!(a.version(), b.version());
    }
}
