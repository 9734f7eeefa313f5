// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Synthetic utilization series.
//!
//! Stands in for the remote metrics service and doubles as the degraded
//! fallback when a fetch fails. Values are random, shapes are not: point count
//! and timestamps depend only on the window and resolution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::data::{DataPoint, MetricFamily, MetricSeries, Resolution, TimeWindow};

/// Mean reversion applied to the noise walk at every step.
const WALK_DECAY: f64 = 0.85;

impl MetricFamily {
    /// Range a series' base value is drawn from.
    fn base_range(&self) -> (f64, f64) {
        match self {
            MetricFamily::Cpu => (30.0, 50.0),
            MetricFamily::Gpu => (40.0, 70.0),
            MetricFamily::Memory => (60.0, 80.0),
            MetricFamily::Disk | MetricFamily::Other => (50.0, 80.0),
        }
    }

    /// Maximum per-step perturbation, in percentage points.
    fn volatility(&self) -> f64 {
        match self {
            MetricFamily::Cpu => 8.0,
            MetricFamily::Gpu => 10.0,
            MetricFamily::Memory => 3.0,
            MetricFamily::Disk => 6.0,
            MetricFamily::Other => 5.0,
        }
    }
}

pub struct SeriesSynthesizer {
    max_points: usize,
    rng: Mutex<StdRng>,
}

impl SeriesSynthesizer {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points: max_points.max(1),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible values for a given seed.
    pub fn with_seed(max_points: usize, seed: u64) -> Self {
        Self {
            max_points: max_points.max(1),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// `ceil(duration / interval)`, at least one point and at most the cap.
    pub fn point_count(&self, resolution: Resolution, window: &TimeWindow) -> usize {
        let duration = window.duration_ms().max(0) as u64;
        let interval = resolution.interval_ms() as u64;
        let naive = duration.div_ceil(interval);
        (naive.min(self.max_points as u64) as usize).max(1)
    }

    pub fn synthesize(
        &self,
        resolution: Resolution,
        window: &TimeWindow,
        metrics: &[String],
    ) -> MetricSeries {
        let count = self.point_count(resolution, window);
        let step = if count > 1 {
            window.duration_ms() as f64 / (count - 1) as f64
        } else {
            window.duration_ms() as f64
        };

        let mut points: Vec<DataPoint> = (0..count)
            .map(|i| DataPoint {
                timestamp_ms: window.start_ms + (i as f64 * step).round() as i64,
                values: BTreeMap::new(),
            })
            .collect();

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        for metric in metrics {
            let family = MetricFamily::of(metric);
            let (low, high) = family.base_range();
            let base = rng.random_range(low..=high);
            let volatility = family.volatility();

            let mut drift = 0.0;
            for point in points.iter_mut() {
                drift = drift * WALK_DECAY + rng.random_range(-1.0..=1.0) * volatility;
                let value = (base + drift).clamp(0.0, 100.0);
                point.values.insert(metric.clone(), value);
            }
        }

        MetricSeries { resolution, points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DAY_MS, MINUTE_MS};
    use crate::resolution::{YEAR_MS, resolution_for};
    use proptest::prelude::*;

    const NOW: i64 = 1_735_689_600_000;

    fn metrics(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn last(duration_ms: i64) -> TimeWindow {
        TimeWindow {
            start_ms: NOW - duration_ms,
            end_ms: NOW,
        }
    }

    #[test]
    fn test_ten_minutes_at_30s() {
        let synth = SeriesSynthesizer::with_seed(10_000, 1);
        let window = last(10 * MINUTE_MS);
        let resolution = resolution_for(&window);
        assert_eq!(resolution, Resolution::Seconds30);

        let series = synth.synthesize(resolution, &window, &metrics(&["cpu_1"]));
        assert_eq!(series.len(), 20);
        assert_eq!(series.points[0].timestamp_ms, window.start_ms);
        assert_eq!(series.points[19].timestamp_ms, window.end_ms);
    }

    #[test]
    fn test_two_years_daily() {
        let synth = SeriesSynthesizer::with_seed(10_000, 2);
        let window = last(2 * YEAR_MS);
        let resolution = resolution_for(&window);
        assert_eq!(resolution, Resolution::Day1);
        assert_eq!(synth.point_count(resolution, &window), 730);
    }

    #[test]
    fn test_point_cap() {
        let synth = SeriesSynthesizer::with_seed(10_000, 3);
        // 29 days at one-minute resolution would be 41,760 points.
        let window = last(29 * DAY_MS);
        let resolution = resolution_for(&window);
        assert_eq!(resolution, Resolution::Minute1);

        let series = synth.synthesize(resolution, &window, &metrics(&["gpu_1"]));
        assert_eq!(series.len(), 10_000);
        assert_eq!(series.points.last().unwrap().timestamp_ms, window.end_ms);
    }

    #[test]
    fn test_single_point_window() {
        let synth = SeriesSynthesizer::with_seed(10_000, 4);
        let window = last(20_000);
        let series = synth.synthesize(Resolution::Seconds30, &window, &metrics(&["memory"]));
        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].timestamp_ms, window.start_ms);
    }

    #[test]
    fn test_zero_duration_window_still_renders() {
        let synth = SeriesSynthesizer::with_seed(10_000, 5);
        let series = synth.synthesize(Resolution::Seconds30, &last(0), &metrics(&["cpu_1"]));
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_empty_metric_list() {
        let synth = SeriesSynthesizer::with_seed(10_000, 6);
        let series = synth.synthesize(Resolution::Minute1, &last(2 * 60 * MINUTE_MS), &[]);
        assert_eq!(series.len(), 120);
        assert!(series.points.iter().all(|p| p.values.is_empty()));
    }

    #[test]
    fn test_timestamps_strictly_ascending() {
        let synth = SeriesSynthesizer::with_seed(10_000, 7);
        let series = synth.synthesize(Resolution::Hour1, &last(90 * DAY_MS), &metrics(&["disk"]));
        assert!(
            series
                .points
                .windows(2)
                .all(|pair| pair[0].timestamp_ms < pair[1].timestamp_ms)
        );
    }

    #[test]
    fn test_same_seed_same_values() {
        let a = SeriesSynthesizer::with_seed(100, 42);
        let b = SeriesSynthesizer::with_seed(100, 42);
        let window = last(30 * MINUTE_MS);
        let m = metrics(&["cpu_1", "gpu_1"]);
        assert_eq!(
            a.synthesize(Resolution::Seconds30, &window, &m),
            b.synthesize(Resolution::Seconds30, &window, &m)
        );
    }

    proptest! {
        #[test]
        fn prop_values_bounded(
            duration in 0i64..(3 * YEAR_MS),
            names in proptest::collection::vec("[a-z_]{0,8}(cpu|gpu|mem|disk)?[0-9]?", 0..5),
            seed in any::<u64>(),
        ) {
            let synth = SeriesSynthesizer::with_seed(2_000, seed);
            let window = last(duration);
            let series = synth.synthesize(resolution_for(&window), &window, &names);

            prop_assert!(!series.is_empty());
            prop_assert!(series.len() <= 2_000);
            for point in &series.points {
                prop_assert!(point.timestamp_ms >= window.start_ms);
                prop_assert!(point.timestamp_ms <= window.end_ms);
                for value in point.values.values() {
                    prop_assert!((0.0..=100.0).contains(value));
                }
            }
        }
    }
}
