// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Core data types shared by the loader, the cache and the coordinator.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::error::WindowError;

pub const SECOND_MS: i64 = 1_000;
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Query range in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, WindowError> {
        if start_ms > end_ms {
            return Err(WindowError::Inverted {
                start: start_ms,
                end: end_ms,
            });
        }
        if end_ms.checked_sub(start_ms).is_none() {
            return Err(WindowError::Overflow {
                start: start_ms,
                end: end_ms,
            });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Window of `duration` ending at `end_ms`.
    pub fn trailing(end_ms: i64, duration: Duration) -> Self {
        Self {
            start_ms: end_ms - duration.as_millis() as i64,
            end_ms,
        }
    }

    /// Saturates for windows built directly from out-of-range bounds.
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start_ms, self.end_ms)
    }
}

/// Sampling granularity, ordered finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resolution {
    Seconds30,
    Minute1,
    Hour1,
    Day1,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Resolution::Seconds30,
        Resolution::Minute1,
        Resolution::Hour1,
        Resolution::Day1,
    ];

    /// Spacing between consecutive points.
    pub fn interval_ms(&self) -> i64 {
        match self {
            Resolution::Seconds30 => 30 * SECOND_MS,
            Resolution::Minute1 => MINUTE_MS,
            Resolution::Hour1 => HOUR_MS,
            Resolution::Day1 => DAY_MS,
        }
    }

    /// Short string representation: 30s, 1m, 1h, 1d.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Seconds30 => "30s",
            Resolution::Minute1 => "1m",
            Resolution::Hour1 => "1h",
            Resolution::Day1 => "1d",
        }
    }

    /// Whether this resolution is drawn by the coarse display tier.
    pub fn is_coarse(&self) -> bool {
        matches!(self, Resolution::Hour1 | Resolution::Day1)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30s" => Ok(Resolution::Seconds30),
            "1m" => Ok(Resolution::Minute1),
            "1h" => Ok(Resolution::Hour1),
            "1d" => Ok(Resolution::Day1),
            _ => Err(format!(
                "unknown resolution: {}, expected 30s, 1m, 1h, or 1d",
                s
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Resolution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One sample across all requested metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub timestamp_ms: i64,
    /// Metric name -> utilization percentage in [0, 100].
    pub values: BTreeMap<String, f64>,
}

/// Points for one window at one resolution, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub resolution: Resolution,
    pub points: Vec<DataPoint>,
}

impl MetricSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(timestamp, value)` pairs for a single metric, skipping points without it.
    pub fn values_for(&self, metric: &str) -> Vec<(i64, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.values.get(metric).map(|v| (p.timestamp_ms, *v)))
            .collect()
    }
}

/// Metric family, inferred from the metric name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFamily {
    Cpu,
    Gpu,
    Memory,
    Disk,
    Other,
}

impl MetricFamily {
    pub fn of(metric: &str) -> Self {
        let name = metric.to_ascii_lowercase();
        if name.contains("cpu") {
            MetricFamily::Cpu
        } else if name.contains("gpu") {
            MetricFamily::Gpu
        } else if name.contains("mem") {
            MetricFamily::Memory
        } else if name.contains("disk") {
            MetricFamily::Disk
        } else {
            MetricFamily::Other
        }
    }
}

/// Metrics currently selected in the legend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleMetricSet {
    names: BTreeSet<String>,
}

impl VisibleMetricSet {
    pub fn all<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: metrics.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.names.contains(metric)
    }

    pub fn show(&mut self, metric: &str) {
        self.names.insert(metric.to_string());
    }

    pub fn hide(&mut self, metric: &str) {
        self.names.remove(metric);
    }

    /// Flip a legend entry. Returns whether the metric is now visible.
    pub fn toggle(&mut self, metric: &str) -> bool {
        if self.names.remove(metric) {
            false
        } else {
            self.names.insert(metric.to_string());
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
