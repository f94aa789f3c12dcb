//! Core types and loaders for athlete monitoring data.
//!
//! This crate turns the raw exports (GPS sessions, physical capability
//! tests, the squads document) into typed records and date-ordered
//! [`metric::MetricTable`]s that the transforms in `apm-data` consume.

pub mod error;
pub mod gps;
mod header;
pub mod metric;
pub mod physical;
pub mod players;
pub mod reporting_period;
pub mod source;

pub use error::{LoadError, Result};
