// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Adaptive multi-resolution data pipeline for zoomable telemetry charts.
//!
//! A chart showing CPU/GPU/memory/disk utilization can zoom anywhere from a few
//! minutes to several years. This crate decides how finely to sample each
//! window, loads series through a short-lived cache, falls back to synthesized
//! data when the source fails, and turns bursts of zoom events into a single
//! load whose result is handed to the rendering surface.
//!
//! ## Architecture
//!
//! 1. **Resolution policy** (`resolution` module) - window duration to
//!    `30s`/`1m`/`1h`/`1d`.
//!
//! 2. **Loading** (`loader`, `cache`, `source`, `synth` modules) - composite-key
//!    cache with a five minute expiry, one shared fetch per key, timeout and
//!    fallback synthesis. `get_data` always returns a renderable series.
//!
//! 3. **Coordination** (`coordinator` module) - debounced zoom handling, stale
//!    result discard, and the coarse/fine display handoff.
//!
//! 4. **Rendering** (`sampler` module) - stride downsampling to the viewport.
//!
//! ## Usage
//!
//! Replay a scripted session against the simulated remote:
//!
//! ```bash
//! zoom-replay --script session.json --config pipeline.yaml
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod data;
pub mod error;
pub mod loader;
pub mod resolution;
pub mod sampler;
pub mod source;
pub mod synth;

pub use config::PipelineConfig;
pub use coordinator::{ChartEvent, ChartFrame, ZoomCoordinator, ZoomEvent, ZoomHandle};
pub use data::{DataPoint, MetricSeries, Resolution, TimeWindow, VisibleMetricSet};
pub use error::FetchError;
pub use loader::{DataLoader, LoadedSeries, SeriesOrigin};
pub use source::MetricSource;
