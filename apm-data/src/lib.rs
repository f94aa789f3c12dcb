//! Transforms over athlete metric series.
//!
//! This crate turns date-ordered metric columns into the forms the load
//! demand and physical development charts are drawn from: rolling
//! acute:chronic workload ratios, gradient segments for intensity bars,
//! and the small summaries shown next to them.

pub mod cache;
pub mod error;
pub mod gradient;
mod stats;
pub mod summary;
pub mod workload;

pub use cache::{DerivedCache, MetricCache};
pub use error::{Result, TransformError};
pub use gradient::{bucketize, bucketize_table, GradientSegment, Segment};
pub use workload::{compute_workload_ratio, WindowedRatio, WorkloadWindows, WorkloadZone};
