// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Window-keyed series cache with lazy expiry.
//!
//! Entries are stamped with the clock on insert and checked against the expiry
//! on read. Nothing sweeps in the background; stale entries sit until they are
//! overwritten, evicted or cleared.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::data::{MetricSeries, Resolution, TimeWindow};

/// `start-end-resolution-metrics` with the metric names sorted, so requests
/// that differ only in metric order share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn composite<S: AsRef<str>>(
        window: &TimeWindow,
        resolution: Resolution,
        metrics: &[S],
    ) -> Self {
        let mut names: Vec<&str> = metrics.iter().map(AsRef::as_ref).collect();
        names.sort_unstable();
        CacheKey(format!(
            "{}-{}-{}-{}",
            window.start_ms,
            window.end_ms,
            resolution,
            names.join(",")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct CacheEntry {
    series: Arc<MetricSeries>,
    fetched_at_ms: i64,
}

pub struct WindowCache {
    entries: FxHashMap<CacheKey, CacheEntry>,
    expiry_ms: i64,
    clock: Arc<dyn Clock>,
}

impl WindowCache {
    pub fn new(expiry: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: FxHashMap::default(),
            expiry_ms: expiry.as_millis() as i64,
            clock,
        }
    }

    /// The cached series, if present and younger than the expiry.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<MetricSeries>> {
        let entry = self.entries.get(key)?;
        let age_ms = self.clock.now_ms() - entry.fetched_at_ms;
        (age_ms < self.expiry_ms).then(|| entry.series.clone())
    }

    pub fn put(&mut self, key: CacheKey, series: Arc<MetricSeries>) {
        let entry = CacheEntry {
            series,
            fetched_at_ms: self.clock.now_ms(),
        };
        self.entries.insert(key, entry);
    }

    pub fn evict(&mut self, key: &CacheKey) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const T0: i64 = 1_735_689_600_000;
    const EXPIRY: Duration = Duration::from_secs(300);

    fn series() -> Arc<MetricSeries> {
        Arc::new(MetricSeries {
            resolution: Resolution::Minute1,
            points: Vec::new(),
        })
    }

    fn key(metrics: &[&str]) -> CacheKey {
        let window = TimeWindow::new(T0 - 3_600_000, T0).unwrap();
        CacheKey::composite(&window, Resolution::Minute1, metrics)
    }

    fn cache() -> (Arc<ManualClock>, WindowCache) {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = WindowCache::new(EXPIRY, clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_key_ignores_metric_order() {
        assert_eq!(key(&["cpu_1", "gpu_1"]), key(&["gpu_1", "cpu_1"]));
        assert_ne!(key(&["cpu_1"]), key(&["cpu_1", "gpu_1"]));
    }

    #[test]
    fn test_key_format() {
        let window = TimeWindow::new(100, 200).unwrap();
        let key = CacheKey::composite(&window, Resolution::Seconds30, &["mem", "cpu"]);
        assert_eq!(key.as_str(), "100-200-30s-cpu,mem");
    }

    #[test]
    fn test_key_distinguishes_resolution_and_bounds() {
        let window = TimeWindow::new(100, 200).unwrap();
        let shifted = TimeWindow::new(100, 201).unwrap();
        let metrics = ["cpu"];
        let base = CacheKey::composite(&window, Resolution::Seconds30, &metrics);
        assert_ne!(base, CacheKey::composite(&window, Resolution::Minute1, &metrics));
        assert_ne!(base, CacheKey::composite(&shifted, Resolution::Seconds30, &metrics));
    }

    #[test]
    fn test_get_within_expiry() {
        let (clock, mut cache) = cache();
        cache.put(key(&["cpu_1"]), series());

        clock.advance(EXPIRY - Duration::from_millis(1));
        assert!(cache.get(&key(&["cpu_1"])).is_some());
    }

    #[test]
    fn test_expired_entry_is_a_miss_but_stays() {
        let (clock, mut cache) = cache();
        cache.put(key(&["cpu_1"]), series());

        clock.set(T0 + EXPIRY.as_millis() as i64 + 1);
        assert!(cache.get(&key(&["cpu_1"])).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_restamps() {
        let (clock, mut cache) = cache();
        cache.put(key(&["cpu_1"]), series());
        clock.advance(EXPIRY);
        assert!(cache.get(&key(&["cpu_1"])).is_none());

        cache.put(key(&["cpu_1"]), series());
        assert!(cache.get(&key(&["cpu_1"])).is_some());
    }

    #[test]
    fn test_evict_and_clear() {
        let (_clock, mut cache) = cache();
        cache.put(key(&["cpu_1"]), series());
        cache.put(key(&["gpu_1"]), series());

        cache.evict(&key(&["cpu_1"]));
        cache.evict(&key(&["disk"]));
        assert!(cache.get(&key(&["cpu_1"])).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
