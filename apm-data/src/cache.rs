//! Memoisation of per-column derived data.
//!
//! Entries are keyed by `(column, data_version)`. Asking for a column with a
//! version other than the stored one recomputes and replaces the entry, so
//! results never outlive the table state they were computed from.

use crate::error::{Result, TransformError};
use crate::gradient::{bucketize, GradientSegment};
use crate::workload::{compute_workload_ratio, WindowedRatio, WorkloadWindows};
use apm_core::metric::MetricTable;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Cache of one kind of derived value per column.
#[derive(Debug)]
pub struct DerivedCache<T> {
    entries: HashMap<String, (u64, T)>,
    hits: u64,
    misses: u64,
}

impl<T> Default for DerivedCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<T> DerivedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value for `column`, if it was computed at `version`.
    pub fn get(&self, column: &str, version: u64) -> Option<&T> {
        match self.entries.get(column) {
            Some((stored, value)) if *stored == version => Some(value),
            _ => None,
        }
    }

    /// Return the entry for `(column, version)`, running `compute` on a miss.
    /// A failed computation leaves any existing entry untouched.
    pub fn get_or_try_insert_with<E, F>(
        &mut self,
        column: &str,
        version: u64,
        compute: F,
    ) -> std::result::Result<&T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
    {
        match self.entries.entry(column.to_string()) {
            Entry::Occupied(entry) if entry.get().0 == version => {
                self.hits += 1;
                log::debug!("cache: hit for {column} at version {version}");
                Ok(&entry.into_mut().1)
            }
            Entry::Occupied(mut entry) => {
                self.misses += 1;
                log::debug!("cache: {column} is stale, recomputing for version {version}");
                let value = compute()?;
                *entry.get_mut() = (version, value);
                Ok(&entry.into_mut().1)
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                log::debug!("cache: miss for {column} at version {version}");
                let value = compute()?;
                Ok(&entry.insert((version, value)).1)
            }
        }
    }

    /// Drop the entry for `column`. Returns whether one existed.
    pub fn invalidate(&mut self, column: &str) -> bool {
        self.entries.remove(column).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Gradient and workload caches for the columns of a [`MetricTable`], with
/// the transform parameters fixed for the cache's lifetime.
#[derive(Debug)]
pub struct MetricCache {
    max_segments: usize,
    windows: WorkloadWindows,
    gradients: DerivedCache<Vec<GradientSegment>>,
    workloads: DerivedCache<Vec<WindowedRatio>>,
}

impl MetricCache {
    pub fn new(max_segments: usize, windows: WorkloadWindows) -> Result<Self> {
        if max_segments == 0 {
            return Err(TransformError::InvalidSegmentCount);
        }
        Ok(Self {
            max_segments,
            windows,
            gradients: DerivedCache::new(),
            workloads: DerivedCache::new(),
        })
    }

    /// Gradient segments for `column` at the table's current version.
    pub fn gradient(&mut self, table: &MetricTable, column: &str) -> Result<&[GradientSegment]> {
        let max_segments = self.max_segments;
        let segments = self
            .gradients
            .get_or_try_insert_with(column, table.version(), || -> Result<_> {
                bucketize(&table.series(column)?, max_segments)
            })?;
        Ok(segments.as_slice())
    }

    /// Workload ratios for `column` at the table's current version.
    pub fn workload(&mut self, table: &MetricTable, column: &str) -> Result<&[WindowedRatio]> {
        let windows = self.windows;
        let ratios = self
            .workloads
            .get_or_try_insert_with(column, table.version(), || -> Result<_> {
                Ok(compute_workload_ratio(&table.series(column)?, windows))
            })?;
        Ok(ratios.as_slice())
    }

    pub fn gradients(&self) -> &DerivedCache<Vec<GradientSegment>> {
        &self.gradients
    }

    pub fn workloads(&self) -> &DerivedCache<Vec<WindowedRatio>> {
        &self.workloads
    }

    pub fn clear(&mut self) {
        self.gradients.clear();
        self.workloads.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn table() -> MetricTable {
        let mut table = MetricTable::new(["distance", "peak_speed"]);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..10 {
            table.push_row(start + Duration::days(i), |c| {
                if c == "distance" {
                    1000.0 + i as f64 * 100.0
                } else {
                    30.0
                }
            });
        }
        table
    }

    #[test]
    fn test_hit_then_invalidate_on_version_change() {
        let mut cache: DerivedCache<usize> = DerivedCache::new();
        let mut runs = 0;
        let mut compute = |v: usize| {
            runs += 1;
            Ok::<_, ()>(v)
        };

        assert_eq!(*cache.get_or_try_insert_with("distance", 1, || compute(10)).unwrap(), 10);
        assert_eq!(*cache.get_or_try_insert_with("distance", 1, || compute(99)).unwrap(), 10);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        assert_eq!(*cache.get_or_try_insert_with("distance", 2, || compute(20)).unwrap(), 20);
        assert_eq!(cache.get("distance", 1), None);
        assert_eq!(cache.get("distance", 2), Some(&20));
        assert_eq!(cache.len(), 1);
        drop(compute);
        assert_eq!(runs, 2);
    }

    #[test]
    fn test_failed_compute_keeps_old_entry() {
        let mut cache: DerivedCache<u8> = DerivedCache::new();
        cache.get_or_try_insert_with("a", 1, || Ok::<_, &str>(1)).unwrap();
        assert!(cache.get_or_try_insert_with("a", 2, || Err("boom")).is_err());
        assert_eq!(cache.get("a", 1), Some(&1));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache: DerivedCache<u8> = DerivedCache::new();
        cache.get_or_try_insert_with("a", 1, || Ok::<_, ()>(1)).unwrap();
        cache.get_or_try_insert_with("b", 1, || Ok::<_, ()>(2)).unwrap();
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_metric_cache_tracks_table_version() {
        let mut table = table();
        let mut cache = MetricCache::new(30, WorkloadWindows::default()).unwrap();

        let first = cache.gradient(&table, "distance").unwrap().len();
        assert!(first > 0);
        cache.gradient(&table, "distance").unwrap();
        assert_eq!(cache.gradients().hits(), 1);

        let ratios = cache.workload(&table, "peak_speed").unwrap();
        assert_eq!(ratios.len(), 10);
        assert!(ratios.iter().all(|r| (r.ratio - 1.0).abs() < 1e-9));

        let next = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        table.push_row(next, |c| if c == "distance" { 3000.0 } else { 30.0 });
        cache.gradient(&table, "distance").unwrap();
        assert_eq!(cache.gradients().misses(), 2);
        assert_eq!(cache.workload(&table, "peak_speed").unwrap().len(), 11);
    }

    #[test]
    fn test_metric_cache_errors() {
        assert!(MetricCache::new(0, WorkloadWindows::default()).is_err());
        let mut cache = MetricCache::new(30, WorkloadWindows::default()).unwrap();
        assert!(cache.gradient(&table(), "heart_rate").is_err());
        assert!(cache.gradients().is_empty());
    }
}
