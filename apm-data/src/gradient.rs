//! Intensity gradient bucketizer.
//!
//! Splits each value of a column into equal-height slices so a bar can be
//! drawn as a colour gradient. Slice height is `extreme / max_segments`,
//! where the extreme is the column's largest value for positive bars and
//! its smallest (most negative) value for negative bars. The extremes are
//! taken over the whole column before any value is split.
//!
//! A value with no data (non-finite), or whose extreme is zero, produces no
//! segments.

use crate::error::{Result, TransformError};
use apm_core::metric::{MetricSeries, MetricTable};
use apm_core::LoadError;
use chrono::NaiveDate;
use serde::Serialize;

pub const DEFAULT_MAX_SEGMENTS: usize = 30;

/// Relative tolerance for treating `|value| / segment_height` as a whole number.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// One slice of a bar. The variant picks the colour ramp: positive slices
/// stack upward from zero, negative slices stack downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum Segment {
    Positive {
        base: f64,
        height: f64,
        color_value: f64,
    },
    Negative {
        base: f64,
        height: f64,
        color_value: f64,
    },
}

impl Segment {
    /// Where the slice starts; `<= 0` for negative slices.
    pub fn base(&self) -> f64 {
        match *self {
            Segment::Positive { base, .. } | Segment::Negative { base, .. } => base,
        }
    }

    /// Signed slice height; negative for negative slices.
    pub fn height(&self) -> f64 {
        match *self {
            Segment::Positive { height, .. } | Segment::Negative { height, .. } => height,
        }
    }

    /// Position of the slice's far edge within `[0, extreme]`, in `[0, 1]`.
    pub fn color_value(&self) -> f64 {
        match *self {
            Segment::Positive { color_value, .. } | Segment::Negative { color_value, .. } => {
                color_value
            }
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Segment::Negative { .. })
    }

    pub fn direction(&self) -> &'static str {
        if self.is_negative() {
            "negative"
        } else {
            "positive"
        }
    }
}

/// A slice of one row's bar, carrying the row's date and original value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientSegment {
    pub date: NaiveDate,
    pub metric_name: String,
    #[serde(flatten)]
    pub segment: Segment,
    /// The unsplit value, for tooltips.
    pub total: f64,
}

/// Flat, column-per-field form of a [`GradientSegment`] for CSV output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatSegment<'a> {
    pub date: NaiveDate,
    pub metric_name: &'a str,
    pub direction: &'static str,
    pub base: f64,
    pub height: f64,
    pub color_value: f64,
    pub total: f64,
}

impl GradientSegment {
    pub fn flatten(&self) -> FlatSegment<'_> {
        FlatSegment {
            date: self.date,
            metric_name: &self.metric_name,
            direction: self.segment.direction(),
            base: self.segment.base(),
            height: self.segment.height(),
            color_value: self.segment.color_value(),
            total: self.total,
        }
    }
}

/// Whole-column extremes over finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnExtremes {
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl ColumnExtremes {
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(ColumnExtremes { max: None, min: None }, |acc, v| ColumnExtremes {
                max: Some(acc.max.map_or(v, |m| m.max(v))),
                min: Some(acc.min.map_or(v, |m| m.min(v))),
            })
    }

    /// Split `total` into slices against these extremes.
    pub fn segments(&self, total: f64, max_segments: usize) -> Vec<Segment> {
        if !total.is_finite() {
            return Vec::new();
        }
        if total >= 0.0 {
            match self.max {
                Some(max) if max > 0.0 => slices(total, max, max_segments)
                    .map(|(base, height, color_value)| Segment::Positive {
                        base,
                        height,
                        color_value,
                    })
                    .collect(),
                _ => Vec::new(),
            }
        } else {
            match self.min {
                Some(min) if min < 0.0 => slices(-total, -min, max_segments)
                    .map(|(base, height, color_value)| Segment::Negative {
                        base: -base,
                        height: -height,
                        color_value,
                    })
                    .collect(),
                _ => Vec::new(),
            }
        }
    }
}

/// `(base, height, color_value)` for `magnitude` split against `scale`, both positive.
fn slices(magnitude: f64, scale: f64, max_segments: usize) -> impl Iterator<Item = (f64, f64, f64)> {
    let segment_height = scale / max_segments as f64;
    let (full, remainder) = split(magnitude, segment_height, max_segments);

    let whole = (0..full).map(move |k| {
        let base = k as f64 * segment_height;
        (base, segment_height, (k + 1) as f64 * segment_height / scale)
    });
    let partial = (remainder > 0.0).then(|| {
        (full as f64 * segment_height, remainder, magnitude / scale)
    });
    whole.chain(partial)
}

/// Number of full slices and the leftover height. Never more than
/// `max_segments` full slices; an underflowed height yields nothing.
fn split(magnitude: f64, segment_height: f64, max_segments: usize) -> (usize, f64) {
    if !segment_height.is_finite() || segment_height <= 0.0 {
        return (0, 0.0);
    }
    let quotient = magnitude / segment_height;
    if quotient >= max_segments as f64 {
        return (max_segments, 0.0);
    }
    let nearest = quotient.round();
    if nearest >= 1.0 && (quotient - nearest).abs() <= BOUNDARY_TOLERANCE * nearest {
        return (nearest as usize, 0.0);
    }
    let full = quotient.floor();
    (full as usize, magnitude - full * segment_height)
}

/// Bucketize every row of `series`, keeping series order.
pub fn bucketize(series: &MetricSeries, max_segments: usize) -> Result<Vec<GradientSegment>> {
    if max_segments == 0 {
        return Err(TransformError::InvalidSegmentCount);
    }
    let extremes = ColumnExtremes::of(series.values());
    let mut out = Vec::new();
    for point in series.points() {
        out.extend(
            extremes
                .segments(point.value, max_segments)
                .into_iter()
                .map(|segment| GradientSegment {
                    date: point.date,
                    metric_name: series.name().to_string(),
                    segment,
                    total: point.value,
                }),
        );
    }
    log::debug!(
        "gradient: {} segments from {} rows of {}",
        out.len(),
        series.len(),
        series.name()
    );
    Ok(out)
}

/// Bucketize several columns of a table. Output is row-major: all segments
/// for the first date (metric by metric), then the next date.
pub fn bucketize_table<S>(
    table: &MetricTable,
    metrics: &[S],
    max_segments: usize,
) -> Result<Vec<GradientSegment>>
where
    S: AsRef<str>,
{
    if max_segments == 0 {
        return Err(TransformError::InvalidSegmentCount);
    }
    let mut columns = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let name = metric.as_ref();
        let values = table
            .column(name)
            .ok_or_else(|| LoadError::UnknownColumn(name.to_string()))?;
        columns.push((name, values, ColumnExtremes::of(values.iter().copied())));
    }

    let mut out = Vec::new();
    for (row, date) in table.dates().iter().enumerate() {
        for (name, values, extremes) in &columns {
            let total = values[row];
            out.extend(
                extremes
                    .segments(total, max_segments)
                    .into_iter()
                    .map(|segment| GradientSegment {
                        date: *date,
                        metric_name: name.to_string(),
                        segment,
                        total,
                    }),
            );
        }
    }
    Ok(out)
}
