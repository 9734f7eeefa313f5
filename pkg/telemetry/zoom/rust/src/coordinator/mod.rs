// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Turns a stream of chart events into debounced loads and rendered frames.
//!
//! # Architecture
//!
//! - `event` - zoom/legend/resize events and percentage-to-window resolution
//! - `debounce` - the `Idle`/`Pending` state machine
//! - `handoff` - coarse/fine display tiers and the frames sent to the surface
//!
//! The coordinator runs as one task. Each settled window is loaded on its own
//! task tagged with a sequence number; a result is applied only if its number
//! is the latest issued, so a slow fetch for an older window never overwrites
//! a newer one.

pub mod debounce;
pub mod event;
pub mod handoff;

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::data::{TimeWindow, VisibleMetricSet};
use crate::loader::{DataLoader, LoadedSeries, SeriesOrigin};
use crate::sampler;

pub use debounce::{DebounceState, Debouncer};
pub use event::{AxisExtent, ChartEvent, ZoomEvent};
pub use handoff::{Bucket, ChartFrame, ChartState, LayerFrame, NamedSeries};

/// Frames buffered towards the surface before the coordinator waits.
const FRAME_CHANNEL_CAPACITY: usize = 16;

/// Default surface width until the first resize.
const DEFAULT_WIDTH_PX: u32 = 800;

/// Sender side for the rendering surface.
#[derive(Debug, Clone)]
pub struct ZoomHandle {
    events: mpsc::UnboundedSender<ChartEvent>,
}

impl ZoomHandle {
    /// Queue an event. Returns false once the coordinator has exited.
    pub fn send(&self, event: ChartEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn zoom(&self, zoom: ZoomEvent) -> bool {
        self.send(ChartEvent::Zoom { zoom })
    }

    pub fn toggle_metric(&self, metric: impl Into<String>) -> bool {
        self.send(ChartEvent::ToggleMetric {
            metric: metric.into(),
        })
    }

    pub fn resize(&self, width_px: u32) -> bool {
        self.send(ChartEvent::Resize { width_px })
    }
}

/// A finished load, reported back to the coordinator task.
struct Completed {
    seq: u64,
    window: TimeWindow,
    loaded: LoadedSeries,
}

pub struct ZoomCoordinator {
    loader: Arc<DataLoader>,
    metrics: Vec<String>,
    debouncer: Debouncer,
    chart: ChartState,
    /// Window currently on screen; doubles as the axis extent.
    window: TimeWindow,
    visible: VisibleMetricSet,
    width_px: u32,
    min_render_points: usize,
    max_render_points: usize,
    next_seq: u64,
    latest_seq: Option<u64>,
    outstanding: usize,
}

impl ZoomCoordinator {
    /// Coordinator showing the loader's initial data.
    pub fn new(loader: Arc<DataLoader>, config: &PipelineConfig) -> Self {
        let window = loader.initial_window();
        let chart = ChartState::new(Arc::new(loader.initial_data()));
        let metrics = loader.metrics().to_vec();
        Self {
            visible: VisibleMetricSet::all(metrics.iter().cloned()),
            metrics,
            loader,
            debouncer: Debouncer::new(config.debounce()),
            chart,
            window,
            width_px: DEFAULT_WIDTH_PX,
            min_render_points: config.render.min_points,
            max_render_points: config.render.max_points,
            next_seq: 0,
            latest_seq: None,
            outstanding: 0,
        }
    }

    pub fn axis_extent(&self) -> Option<AxisExtent> {
        Some(AxisExtent::from(self.window))
    }

    pub fn frame(&self) -> ChartFrame {
        let max_points = sampler::max_points_for_width(
            self.width_px,
            self.min_render_points,
            self.max_render_points,
        );
        self.chart.frame(self.window, &self.visible, max_points)
    }

    /// Run on a new task. The receiver gets the initial frame first.
    pub fn spawn(self) -> (ZoomHandle, mpsc::Receiver<ChartFrame>, JoinHandle<()>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let task = tokio::spawn(self.run(event_rx, frame_tx));
        (ZoomHandle { events: event_tx }, frame_rx, task)
    }

    /// Event loop. After the event channel closes, pending work is drained
    /// before returning.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<ChartEvent>,
        frames: mpsc::Sender<ChartFrame>,
    ) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed>();
        let mut events_open = true;

        if frames.send(self.frame()).await.is_err() {
            debug!("Frame receiver dropped before the first frame");
            return;
        }

        loop {
            if !events_open && !self.debouncer.is_pending() && self.outstanding == 0 {
                break;
            }
            let deadline = self.debouncer.deadline();

            let keep_going = tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event, &frames).await,
                    None => {
                        debug!("Event channel closed, draining");
                        events_open = false;
                        true
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(window) = self.debouncer.fire(Instant::now()) {
                        self.dispatch(window, &done_tx);
                    }
                    true
                },
                Some(done) = done_rx.recv() => self.complete(done, &frames).await,
            };

            if !keep_going {
                debug!("Frame receiver dropped, stopping");
                break;
            }
        }

        info!("Zoom coordinator stopped");
    }

    /// Returns false when the frame receiver is gone.
    async fn handle_event(&mut self, event: ChartEvent, frames: &mpsc::Sender<ChartFrame>) -> bool {
        match event {
            ChartEvent::Zoom { zoom } => {
                match zoom.resolve(self.axis_extent()) {
                    Some(window) => {
                        debug!(window = %window, "Zoom event queued");
                        self.debouncer.push(window, Instant::now());
                    }
                    None => debug!(event = ?zoom, "Dropping unresolvable zoom event"),
                }
                true
            }
            ChartEvent::ToggleMetric { metric } => {
                let shown = self.visible.toggle(&metric);
                debug!(metric = %metric, shown, "Legend toggled");
                frames.send(self.frame()).await.is_ok()
            }
            ChartEvent::Resize { width_px } => {
                self.width_px = width_px;
                frames.send(self.frame()).await.is_ok()
            }
        }
    }

    fn dispatch(&mut self, window: TimeWindow, done_tx: &mpsc::UnboundedSender<Completed>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        self.outstanding += 1;

        debug!(seq, window = %window, "Loading settled window");
        let loader = self.loader.clone();
        let metrics = self.metrics.clone();
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let load = tokio::spawn({
                let loader = loader.clone();
                let metrics = metrics.clone();
                async move { loader.load(window, &metrics).await }
            });
            let loaded = match load.await {
                Ok(loaded) => loaded,
                Err(e) => {
                    warn!(
                        seq,
                        window = %window,
                        error = %e,
                        "Load task failed, serving fallback"
                    );
                    loader.fallback(window, &metrics)
                }
            };
            // The coordinator may have stopped; nothing to deliver to then.
            let _ = done_tx.send(Completed {
                seq,
                window,
                loaded,
            });
        });
    }

    async fn complete(&mut self, done: Completed, frames: &mpsc::Sender<ChartFrame>) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.latest_seq != Some(done.seq) {
            debug!(
                seq = done.seq,
                latest = ?self.latest_seq,
                "Discarding stale load result"
            );
            return true;
        }

        if done.loaded.origin == SeriesOrigin::Fallback {
            info!(window = %done.window, "Showing synthesized data for window");
        }
        self.window = done.window;
        self.chart.apply(done.loaded.series);
        let delivered = frames.send(self.frame()).await.is_ok();
        self.chart.complete_transition();
        delivered
    }
}
