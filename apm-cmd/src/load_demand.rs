//! Load demand commands over the daily GPS export: workload ratio,
//! intensity gradients and the session summary.

use crate::output::{log_destination, open_output, write_csv, write_json, write_records, OutputFormat};
use anyhow::Context;
use apm_core::gps::GpsSession;
use apm_core::reporting_period::ReportingPeriod;
use apm_data::summary::{
    day_type_averages, hr_zone_totals, matchday_markers, DayTypeAverages, HrZoneTotal,
    MatchdayMarker,
};
use apm_data::workload::{compute_table_workload, WindowedRatio, WorkloadWindows, WorkloadZone};
use apm_data::{bucketize_table, GradientSegment};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::path::Path;

/// One output row of the `acwr` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcwrRow {
    pub date: NaiveDate,
    pub metric_name: String,
    pub acute_mean: Option<f64>,
    pub chronic_mean: Option<f64>,
    pub ratio: f64,
    pub zone: WorkloadZone,
}

impl AcwrRow {
    fn new(metric_name: &str, ratio: &WindowedRatio) -> Self {
        Self {
            date: ratio.date,
            metric_name: metric_name.to_string(),
            acute_mean: ratio.acute_mean,
            chronic_mean: ratio.chronic_mean,
            ratio: ratio.ratio,
            zone: ratio.zone(),
        }
    }
}

pub(crate) fn load_sessions(path: &Path) -> anyhow::Result<Vec<GpsSession>> {
    GpsSession::load(path).with_context(|| format!("Failed to load GPS export {}", path.display()))
}

/// The last `weeks` weeks up to the newest session, or `None` for every row.
pub(crate) fn visible_period(latest: Option<NaiveDate>, weeks: i64) -> Option<ReportingPeriod> {
    if weeks <= 0 {
        return None;
    }
    latest.map(|end| ReportingPeriod::last_weeks(end, weeks))
}

fn is_visible(period: Option<&ReportingPeriod>, date: &NaiveDate) -> bool {
    period.map_or(true, |p| p.contains(date))
}

/// Compute the workload ratio of one metric and write every visible row.
pub fn run_acwr(
    gps: &Path,
    metric: &str,
    windows: WorkloadWindows,
    weeks: i64,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let sessions = load_sessions(gps)?;
    let table = GpsSession::to_metric_table(&sessions);
    let period = visible_period(table.latest_date(), weeks);

    let rows = compute_table_workload(&table, metric, windows)?
        .iter()
        .filter(|r| is_visible(period.as_ref(), &r.date))
        .map(|r| AcwrRow::new(metric, r))
        .collect::<Vec<_>>();

    info!(
        "acwr: {} of {} rows for {} (acute {}, chronic {})",
        rows.len(),
        table.len(),
        metric,
        windows.acute(),
        windows.chronic()
    );
    write_records(&rows, format, output)
}

/// Bucketize the requested metrics and write the visible segments, date by
/// date with the metrics in request order.
///
/// Extremes are taken over the whole export, so filtering by `weeks` never
/// changes a bar's colours.
pub fn run_gradient(
    gps: &Path,
    metrics: &[String],
    max_segments: usize,
    weeks: i64,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let sessions = load_sessions(gps)?;
    let table = GpsSession::to_metric_table(&sessions);
    let period = visible_period(table.latest_date(), weeks);
    let segments = bucketize_table(&table, metrics, max_segments)?
        .into_iter()
        .filter(|s| is_visible(period.as_ref(), &s.date))
        .collect::<Vec<_>>();
    info!(
        "gradient: {} segments across {} metrics",
        segments.len(),
        metrics.len()
    );
    write_segments(&segments, format, output)
}

/// Segments go out flat in CSV and tagged by direction in JSON.
pub(crate) fn write_segments(
    segments: &[GradientSegment],
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => {
            let writer = open_output(output)?;
            write_csv(writer, segments.iter().map(GradientSegment::flatten))?;
            log_destination(segments.len(), output);
            Ok(())
        }
        OutputFormat::Json => write_records(segments, format, output),
    }
}

/// Everything drawn next to a load demand chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub averages: DayTypeAverages,
    pub matchdays: Vec<MatchdayMarker>,
    pub hr_zones: Vec<HrZoneTotal>,
}

/// Long-form summary row for CSV output.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct SummaryRow {
    kind: &'static str,
    date: Option<NaiveDate>,
    label: String,
    value: Option<f64>,
}

impl SessionSummary {
    fn rows(&self) -> Vec<SummaryRow> {
        let mut rows = vec![
            SummaryRow {
                kind: "match_average",
                date: None,
                label: self.averages.metric.clone(),
                value: self.averages.match_avg,
            },
            SummaryRow {
                kind: "training_average",
                date: None,
                label: self.averages.metric.clone(),
                value: self.averages.training_avg,
            },
        ];
        rows.extend(self.matchdays.iter().map(|m| SummaryRow {
            kind: "matchday",
            date: Some(m.date),
            label: m.opposition_code.clone().unwrap_or_default(),
            value: None,
        }));
        rows.extend(self.hr_zones.iter().map(|z| SummaryRow {
            kind: "hr_zone",
            date: None,
            label: z.zone.to_string(),
            value: Some(z.seconds as f64),
        }));
        rows
    }
}

pub fn run_summary(
    gps: &Path,
    metric: &str,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let sessions = load_sessions(gps)?;
    let summary = SessionSummary {
        averages: day_type_averages(&sessions, metric)?,
        matchdays: matchday_markers(&sessions),
        hr_zones: hr_zone_totals(&sessions),
    };
    info!(
        "summary: {} match days over {} sessions",
        summary.matchdays.len(),
        sessions.len()
    );
    match format {
        OutputFormat::Csv => write_records(&summary.rows(), format, output),
        OutputFormat::Json => {
            write_json(open_output(output)?, &summary)?;
            log_destination(1, output);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apm_utils::dates::format_date_dmy;
    use chrono::Duration;
    use std::fmt::Write as _;

    /// Sixty days of sessions, a match every seventh day.
    fn write_gps(dir: &Path) -> std::path::PathBuf {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut csv = String::from("date,opposition_code,md_plus_code,day_duration,distance,peak_speed,hr_zone_4_hms\n");
        for i in 0..60 {
            let date = start + Duration::days(i);
            let is_match = i % 7 == 0;
            writeln!(
                csv,
                "{},{},{},{},{},{},00:01:00",
                format_date_dmy(&date),
                if is_match { "CHE" } else { "" },
                i % 7,
                if is_match { 95 } else { 60 },
                if is_match { 10000 } else { 5000 },
                30.0,
            )
            .unwrap();
        }
        let path = dir.join("gps.csv");
        std::fs::write(&path, csv).unwrap();
        path
    }

    #[test]
    fn test_visible_period() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(visible_period(Some(end), 0), None);
        assert_eq!(visible_period(None, 6), None);
        let period = visible_period(Some(end), 6).unwrap();
        assert_eq!(period.end, end);
        assert_eq!(period.start, end - Duration::weeks(6));
    }

    #[test]
    fn test_run_acwr_csv_filters_to_recent_weeks() {
        let dir = tempfile::tempdir().unwrap();
        let gps = write_gps(dir.path());
        let out = dir.path().join("acwr.csv");
        run_acwr(&gps, "peak_speed", WorkloadWindows::default(), 1, OutputFormat::Csv, Some(&out)).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,metric_name,acute_mean,chronic_mean,ratio,zone")
        );
        let rows = lines.collect::<Vec<_>>();
        // one week back from the last day, both ends included
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r.ends_with(",30.0,30.0,1.0,optimal")));
    }

    #[test]
    fn test_run_acwr_unknown_metric() {
        let dir = tempfile::tempdir().unwrap();
        let gps = write_gps(dir.path());
        let out = dir.path().join("acwr.csv");
        let result = run_acwr(&gps, "sprints", WorkloadWindows::default(), 0, OutputFormat::Csv, Some(&out));
        assert!(result.is_err());
    }

    #[test]
    fn test_run_gradient_json() {
        let dir = tempfile::tempdir().unwrap();
        let gps = write_gps(dir.path());
        let out = dir.path().join("gradient.json");
        let metrics = vec!["distance".to_string()];
        run_gradient(&gps, &metrics, 10, 0, OutputFormat::Json, Some(&out)).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let segments = parsed.as_array().unwrap();
        // match days fill all 10 slices of 1000, training days 5
        let match_days = 9;
        assert_eq!(segments.len(), match_days * 10 + (60 - match_days) * 5);
        assert_eq!(segments[0]["direction"], "positive");
        assert_eq!(segments[0]["metric_name"], "distance");
        assert_eq!(segments[0]["height"], 1000.0);
    }

    #[test]
    fn test_run_gradient_csv_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        let gps = write_gps(dir.path());
        let out = dir.path().join("gradient.csv");
        let metrics = vec!["peak_speed".to_string()];
        run_gradient(&gps, &metrics, 3, 0, OutputFormat::Csv, Some(&out)).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("date,metric_name,direction,base,height,color_value,total\n"));
        assert_eq!(text.lines().count(), 1 + 60 * 3);
    }

    #[test]
    fn test_run_gradient_is_row_major() {
        let dir = tempfile::tempdir().unwrap();
        let gps = write_gps(dir.path());
        let out = dir.path().join("gradient.csv");
        let metrics = vec!["peak_speed".to_string(), "distance".to_string()];
        run_gradient(&gps, &metrics, 2, 1, OutputFormat::Csv, Some(&out)).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let keys = text
            .lines()
            .skip(1)
            .map(|line| {
                let mut cells = line.split(',');
                (cells.next().unwrap().to_string(), cells.next().unwrap().to_string())
            })
            .collect::<Vec<_>>();
        // 2024-02-22 is a training day: one distance slice of 5000 against 10000 / 2
        assert_eq!(keys[0], ("2024-02-22".to_string(), "peak_speed".to_string()));
        assert_eq!(keys[1], ("2024-02-22".to_string(), "peak_speed".to_string()));
        assert_eq!(keys[2], ("2024-02-22".to_string(), "distance".to_string()));
        assert_eq!(keys[3], ("2024-02-23".to_string(), "peak_speed".to_string()));
        let mut dates = keys.iter().map(|(d, _)| d.clone()).collect::<Vec<_>>();
        let sorted = {
            let mut s = dates.clone();
            s.sort();
            s
        };
        assert_eq!(dates, sorted);
        dates.dedup();
        assert_eq!(dates.len(), 8);
    }

    #[test]
    fn test_run_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let gps = write_gps(dir.path());
        let out = dir.path().join("summary.json");
        run_summary(&gps, "distance", OutputFormat::Json, Some(&out)).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed["averages"]["match_avg"], 10000.0);
        assert_eq!(parsed["averages"]["training_avg"], 5000.0);
        assert_eq!(parsed["matchdays"].as_array().unwrap().len(), 9);
        assert_eq!(parsed["hr_zones"][3]["seconds"], 3600);
    }

    #[test]
    fn test_run_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let gps = write_gps(dir.path());
        let out = dir.path().join("summary.csv");
        run_summary(&gps, "distance", OutputFormat::Csv, Some(&out)).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "kind,date,label,value");
        assert_eq!(lines[1], "match_average,,distance,10000.0");
        assert_eq!(lines[3], "matchday,2024-01-01,CHE,");
        // header, two averages, nine match days, five zones
        assert_eq!(lines.len(), 1 + 2 + 9 + 5);
    }
}
