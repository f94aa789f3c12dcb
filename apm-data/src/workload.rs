//! Acute:Chronic Workload Ratio (ACWR).
//!
//! For every row the acute load is the mean of the trailing `acute` rows and
//! the chronic load the mean of the trailing `chronic` rows, both including
//! the current row. Windows count rows, not calendar days: sparse data widens
//! a window in time, and two rows on one date are two samples.
//!
//! Early rows see shorter windows; nothing is suppressed during warm-up.
//! Missing values are skipped when averaging.

use crate::error::{Result, TransformError};
use crate::stats::mean_finite;
use apm_core::metric::{MetricSeries, MetricTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ACUTE_WINDOW: usize = 7;
pub const DEFAULT_CHRONIC_WINDOW: usize = 28;

/// Ratio below which load is flagged as undertraining.
pub const UNDERTRAINING_THRESHOLD: f64 = 0.8;
/// Ratio above which load is flagged as overtraining.
pub const OVERTRAINING_THRESHOLD: f64 = 1.5;

/// Acute and chronic window lengths in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadWindows {
    acute: usize,
    chronic: usize,
}

impl WorkloadWindows {
    pub fn new(acute: usize, chronic: usize) -> Result<Self> {
        if acute == 0 || chronic == 0 {
            return Err(TransformError::InvalidWindow { acute, chronic });
        }
        Ok(Self { acute, chronic })
    }

    pub fn acute(&self) -> usize {
        self.acute
    }

    pub fn chronic(&self) -> usize {
        self.chronic
    }
}

impl Default for WorkloadWindows {
    fn default() -> Self {
        Self {
            acute: DEFAULT_ACUTE_WINDOW,
            chronic: DEFAULT_CHRONIC_WINDOW,
        }
    }
}

/// Where a ratio sits relative to the two thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadZone {
    Undertraining,
    Optimal,
    Overtraining,
}

/// Rolling workload values for one input row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowedRatio {
    pub date: NaiveDate,
    /// `None` when the window holds no finite value.
    pub acute_mean: Option<f64>,
    pub chronic_mean: Option<f64>,
    /// `acute_mean / chronic_mean`, or `0.0` whenever that is undefined.
    pub ratio: f64,
}

impl WindowedRatio {
    pub fn zone(&self) -> WorkloadZone {
        if self.ratio < UNDERTRAINING_THRESHOLD {
            WorkloadZone::Undertraining
        } else if self.ratio > OVERTRAINING_THRESHOLD {
            WorkloadZone::Overtraining
        } else {
            WorkloadZone::Optimal
        }
    }
}

/// Compute the rolling ratio for every row of `series`, in series order.
pub fn compute_workload_ratio(series: &MetricSeries, windows: WorkloadWindows) -> Vec<WindowedRatio> {
    let values = series.values().collect::<Vec<_>>();
    series
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let acute_mean = mean_finite(trailing(&values, i, windows.acute));
            let chronic_mean = mean_finite(trailing(&values, i, windows.chronic));
            WindowedRatio {
                date: point.date,
                acute_mean,
                chronic_mean,
                ratio: guarded_ratio(acute_mean, chronic_mean),
            }
        })
        .collect()
}

/// Convenience wrapper: pull `column` out of `table` and compute its ratios.
pub fn compute_table_workload(
    table: &MetricTable,
    column: &str,
    windows: WorkloadWindows,
) -> Result<Vec<WindowedRatio>> {
    let series = table.series(column)?;
    let ratios = compute_workload_ratio(&series, windows);
    log::debug!("workload: {} rows for {}", ratios.len(), column);
    Ok(ratios)
}

/// Up to `len` rows ending at `end` inclusive.
fn trailing(values: &[f64], end: usize, len: usize) -> &[f64] {
    let start = (end + 1).saturating_sub(len);
    &values[start..=end]
}

/// Zero chronic load, an empty window, or a non-finite quotient all map to 0.
fn guarded_ratio(acute: Option<f64>, chronic: Option<f64>) -> f64 {
    match (acute, chronic) {
        (Some(acute), Some(chronic)) if chronic != 0.0 => {
            let ratio = acute / chronic;
            if ratio.is_finite() {
                ratio
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}
