// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Coarse/fine display tiers and the handoff between them.
//!
//! Exactly one bucket is visible at a time. A series for the visible bucket
//! replaces its data in place. A series for the other bucket is loaded there,
//! the opacities swap, and the previous bucket keeps its data (hidden) until
//! [`ChartState::complete_transition`] clears it. Nothing is blanked while a
//! resolution change is in progress.

use serde::Serialize;
use std::sync::Arc;

use crate::data::{MetricSeries, Resolution, TimeWindow, VisibleMetricSet};
use crate::sampler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// `1d` and `1h`.
    Coarse,
    /// `1m` and `30s`.
    Fine,
}

impl Bucket {
    pub fn of(resolution: Resolution) -> Self {
        if resolution.is_coarse() {
            Bucket::Coarse
        } else {
            Bucket::Fine
        }
    }

    fn other(self) -> Self {
        match self {
            Bucket::Coarse => Bucket::Fine,
            Bucket::Fine => Bucket::Coarse,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub series: Option<Arc<MetricSeries>>,
    pub opacity: f32,
}

/// One metric's points as drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub metric: String,
    pub points: Vec<(i64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerFrame {
    pub bucket: Bucket,
    pub opacity: f32,
    pub resolution: Option<Resolution>,
    pub series: Vec<NamedSeries>,
}

/// What the rendering surface receives per update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub window: TimeWindow,
    /// Resolution label of the visible bucket, for axis formatting.
    pub resolution: Resolution,
    pub layers: Vec<LayerFrame>,
}

impl ChartFrame {
    pub fn layer(&self, bucket: Bucket) -> Option<&LayerFrame> {
        self.layers.iter().find(|l| l.bucket == bucket)
    }
}

#[derive(Debug)]
pub struct ChartState {
    coarse: Layer,
    fine: Layer,
    active: Bucket,
    transitioning: bool,
}

impl ChartState {
    pub fn new(initial: Arc<MetricSeries>) -> Self {
        let active = Bucket::of(initial.resolution);
        let mut state = Self {
            coarse: Layer::default(),
            fine: Layer::default(),
            active,
            transitioning: false,
        };
        *state.layer_mut(active) = Layer {
            series: Some(initial),
            opacity: 1.0,
        };
        state
    }

    pub fn active(&self) -> Bucket {
        self.active
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn layer(&self, bucket: Bucket) -> &Layer {
        match bucket {
            Bucket::Coarse => &self.coarse,
            Bucket::Fine => &self.fine,
        }
    }

    fn layer_mut(&mut self, bucket: Bucket) -> &mut Layer {
        match bucket {
            Bucket::Coarse => &mut self.coarse,
            Bucket::Fine => &mut self.fine,
        }
    }

    /// Resolution of the visible series.
    pub fn resolution(&self) -> Option<Resolution> {
        self.layer(self.active).series.as_ref().map(|s| s.resolution)
    }

    /// Show a newly loaded series.
    pub fn apply(&mut self, series: Arc<MetricSeries>) {
        if self.transitioning {
            self.complete_transition();
        }

        let target = Bucket::of(series.resolution);
        if target == self.active {
            self.layer_mut(target).series = Some(series);
            return;
        }

        let previous = self.active;
        *self.layer_mut(target) = Layer {
            series: Some(series),
            opacity: 1.0,
        };
        self.layer_mut(previous).opacity = 0.0;
        self.active = target;
        self.transitioning = true;
    }

    /// Drop the hidden bucket's data once the handoff has been rendered.
    pub fn complete_transition(&mut self) {
        if !self.transitioning {
            return;
        }
        let hidden = self.active.other();
        self.layer_mut(hidden).series = None;
        self.transitioning = false;
    }

    /// Frame for the surface, visible metrics only, each layer downsampled to
    /// `max_points`.
    pub fn frame(
        &self,
        window: TimeWindow,
        visible: &VisibleMetricSet,
        max_points: usize,
    ) -> ChartFrame {
        let layers = [Bucket::Coarse, Bucket::Fine]
            .into_iter()
            .map(|bucket| {
                let layer = self.layer(bucket);
                let series = layer
                    .series
                    .as_ref()
                    .map(|s| {
                        let points = sampler::sample(&s.points, max_points);
                        visible
                            .iter()
                            .map(|metric| NamedSeries {
                                metric: metric.to_string(),
                                points: points
                                    .iter()
                                    .filter_map(|p| {
                                        p.values.get(metric).map(|v| (p.timestamp_ms, *v))
                                    })
                                    .collect(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                LayerFrame {
                    bucket,
                    opacity: layer.opacity,
                    resolution: layer.series.as_ref().map(|s| s.resolution),
                    series,
                }
            })
            .collect();

        ChartFrame {
            window,
            resolution: self.resolution().unwrap_or(Resolution::Day1),
            layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataPoint, MINUTE_MS};
    use std::collections::BTreeMap;

    fn series(resolution: Resolution, len: usize) -> Arc<MetricSeries> {
        let points = (0..len)
            .map(|i| DataPoint {
                timestamp_ms: i as i64 * MINUTE_MS,
                values: BTreeMap::from([
                    ("cpu_1".to_string(), 10.0 + i as f64 % 50.0),
                    ("gpu_1".to_string(), 50.0),
                ]),
            })
            .collect();
        Arc::new(MetricSeries { resolution, points })
    }

    fn window() -> TimeWindow {
        TimeWindow::new(0, 1_000 * MINUTE_MS).unwrap()
    }

    #[test]
    fn test_bucket_mapping() {
        assert_eq!(Bucket::of(Resolution::Day1), Bucket::Coarse);
        assert_eq!(Bucket::of(Resolution::Hour1), Bucket::Coarse);
        assert_eq!(Bucket::of(Resolution::Minute1), Bucket::Fine);
        assert_eq!(Bucket::of(Resolution::Seconds30), Bucket::Fine);
    }

    #[test]
    fn test_same_bucket_replaces_in_place() {
        let mut chart = ChartState::new(series(Resolution::Day1, 10));
        chart.apply(series(Resolution::Hour1, 20));

        assert_eq!(chart.active(), Bucket::Coarse);
        assert!(!chart.is_transitioning());
        assert_eq!(chart.layer(Bucket::Coarse).opacity, 1.0);
        assert_eq!(chart.resolution(), Some(Resolution::Hour1));
        assert!(chart.layer(Bucket::Fine).series.is_none());
    }

    #[test]
    fn test_handoff_keeps_old_bucket_until_complete() {
        let mut chart = ChartState::new(series(Resolution::Day1, 10));
        chart.apply(series(Resolution::Minute1, 30));

        assert_eq!(chart.active(), Bucket::Fine);
        assert!(chart.is_transitioning());
        assert_eq!(chart.layer(Bucket::Fine).opacity, 1.0);
        assert_eq!(chart.layer(Bucket::Coarse).opacity, 0.0);
        // hidden, not destroyed
        assert!(chart.layer(Bucket::Coarse).series.is_some());

        chart.complete_transition();
        assert!(!chart.is_transitioning());
        assert!(chart.layer(Bucket::Coarse).series.is_none());
        assert!(chart.layer(Bucket::Fine).series.is_some());
    }

    #[test]
    fn test_apply_during_transition_completes_it_first() {
        let mut chart = ChartState::new(series(Resolution::Day1, 10));
        chart.apply(series(Resolution::Seconds30, 30));
        chart.apply(series(Resolution::Hour1, 40));

        assert_eq!(chart.active(), Bucket::Coarse);
        assert_eq!(chart.resolution(), Some(Resolution::Hour1));
        assert_eq!(chart.layer(Bucket::Fine).opacity, 0.0);
        assert!(chart.layer(Bucket::Fine).series.is_some());
    }

    #[test]
    fn test_frame_filters_and_samples() {
        let chart = ChartState::new(series(Resolution::Day1, 1_000));
        let visible = VisibleMetricSet::all(["cpu_1"]);

        let frame = chart.frame(window(), &visible, 200);
        assert_eq!(frame.resolution, Resolution::Day1);

        let coarse = frame.layer(Bucket::Coarse).unwrap();
        assert_eq!(coarse.opacity, 1.0);
        assert_eq!(coarse.series.len(), 1);
        assert_eq!(coarse.series[0].metric, "cpu_1");
        assert_eq!(coarse.series[0].points.len(), 200);
        assert_eq!(coarse.series[0].points.last().unwrap().0, 999 * MINUTE_MS);

        let fine = frame.layer(Bucket::Fine).unwrap();
        assert_eq!(fine.opacity, 0.0);
        assert!(fine.series.is_empty());
        assert_eq!(fine.resolution, None);
    }

    #[test]
    fn test_frame_with_nothing_visible() {
        let chart = ChartState::new(series(Resolution::Day1, 10));
        let frame = chart.frame(window(), &VisibleMetricSet::default(), 200);
        assert!(frame.layers.iter().all(|l| l.series.is_empty()));
    }
}
