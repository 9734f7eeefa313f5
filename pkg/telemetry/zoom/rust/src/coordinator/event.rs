// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Chart input events and their translation into absolute windows.

use serde::Deserialize;

use crate::data::TimeWindow;

/// A zoom or pan request, either in absolute timestamps or as percentages of
/// the current axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoomEvent {
    Absolute { start_ms: i64, end_ms: i64 },
    Percentage { start_pct: f64, end_pct: f64 },
}

/// Everything the rendering surface reports back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartEvent {
    Zoom { zoom: ZoomEvent },
    ToggleMetric { metric: String },
    Resize { width_px: u32 },
}

/// Current min/max of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisExtent {
    pub min_ms: i64,
    pub max_ms: i64,
}

impl From<TimeWindow> for AxisExtent {
    fn from(window: TimeWindow) -> Self {
        Self {
            min_ms: window.start_ms,
            max_ms: window.end_ms,
        }
    }
}

impl ZoomEvent {
    /// Absolute window for this event, or `None` when it cannot be resolved:
    /// percentages without a known axis, non-finite percentages, or bounds
    /// that do not describe a non-empty range measurable in milliseconds.
    pub fn resolve(&self, extent: Option<AxisExtent>) -> Option<TimeWindow> {
        let (start_ms, end_ms) = match *self {
            ZoomEvent::Absolute { start_ms, end_ms } => (start_ms, end_ms),
            ZoomEvent::Percentage { start_pct, end_pct } => {
                let extent = extent?;
                if !start_pct.is_finite() || !end_pct.is_finite() {
                    return None;
                }
                let span = extent.max_ms.saturating_sub(extent.min_ms) as f64;
                let at = |pct: f64| {
                    let offset = (span * pct.clamp(0.0, 100.0) / 100.0).round() as i64;
                    extent.min_ms.saturating_add(offset)
                };
                (at(start_pct), at(end_pct))
            }
        };
        if start_ms >= end_ms {
            return None;
        }
        TimeWindow::new(start_ms, end_ms).ok()
    }
}
