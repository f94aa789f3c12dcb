//! Small aggregates drawn alongside the bar charts: match vs training
//! averages, match-day markers, heart-rate zone totals and the benchmark
//! heatmap for physical tests.

use crate::error::Result;
use crate::stats::mean_finite;
use apm_core::gps::{GpsSession, HR_ZONE_COLUMNS};
use apm_core::physical::PhysicalTest;
use apm_core::reporting_period::ReportingPeriod;
use apm_core::LoadError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Reference lines for one metric: mean on match days and on training days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTypeAverages {
    pub metric: String,
    pub match_avg: Option<f64>,
    pub training_avg: Option<f64>,
}

pub fn day_type_averages(sessions: &[GpsSession], metric: &str) -> Result<DayTypeAverages> {
    let mut match_values = Vec::new();
    let mut training_values = Vec::new();
    for session in sessions {
        let value = session
            .metric(metric)
            .ok_or_else(|| LoadError::UnknownColumn(metric.to_string()))?;
        if session.is_match_day() {
            match_values.push(value);
        } else if session.is_training_day() {
            training_values.push(value);
        }
    }
    Ok(DayTypeAverages {
        metric: metric.to_string(),
        match_avg: mean_finite(&match_values),
        training_avg: mean_finite(&training_values),
    })
}

/// A vertical marker on match days, labelled with the opponent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchdayMarker {
    pub date: NaiveDate,
    pub opposition_code: Option<String>,
}

pub fn matchday_markers(sessions: &[GpsSession]) -> Vec<MatchdayMarker> {
    sessions
        .iter()
        .filter(|s| s.is_match_day())
        .map(|s| MatchdayMarker {
            date: s.date,
            opposition_code: s.opposition_code.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HrZoneTotal {
    pub zone: &'static str,
    pub seconds: u64,
}

/// Seconds spent in each heart-rate zone across all sessions.
pub fn hr_zone_totals(sessions: &[GpsSession]) -> Vec<HrZoneTotal> {
    HR_ZONE_COLUMNS
        .iter()
        .enumerate()
        .map(|(zone, column)| HrZoneTotal {
            zone: *column,
            seconds: sessions.iter().map(|s| u64::from(s.hr_zone_sec[zone])).sum(),
        })
        .collect()
}

/// One heatmap cell: mean benchmark % for a movement/quality pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkCell {
    pub movement: String,
    pub quality: String,
    pub average_pct: f64,
    pub tests: usize,
}

/// Mean benchmark % per movement/quality for one expression inside a
/// period. Tests without a score are left out. Sorted by movement, then quality.
pub fn average_benchmark(
    tests: &[PhysicalTest],
    expression: &str,
    period: &ReportingPeriod,
) -> Vec<BenchmarkCell> {
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for test in tests {
        if test.expression != expression || !period.contains(&test.test_date) {
            continue;
        }
        if let Some(score) = test.benchmark_pct {
            groups
                .entry((test.movement.as_str(), test.quality.as_str()))
                .or_default()
                .push(score);
        }
    }
    groups
        .into_iter()
        .filter_map(|((movement, quality), scores)| {
            let average_pct = mean_finite(&scores)?;
            Some(BenchmarkCell {
                movement: movement.to_string(),
                quality: quality.to_string(),
                average_pct,
                tests: scores.len(),
            })
        })
        .collect()
}
