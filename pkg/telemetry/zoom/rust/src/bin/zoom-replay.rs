// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Replays a scripted chart session through the pipeline.
//!
//! Events go to a [`ZoomCoordinator`] backed by the simulated remote, and
//! every frame it emits is printed to stdout as one JSON line.
//!
//! # Usage
//!
//! ```bash
//! zoom-replay                                  # built-in demo session
//! zoom-replay --script session.json
//! zoom-replay --config pipeline.yaml --seed 7 --width 1280
//! RUST_LOG=telemetry_zoom=debug zoom-replay
//! ```
//!
//! A script is a JSON array of steps, each waiting `after_ms` before sending
//! its event:
//!
//! ```json
//! [
//!   {"after_ms": 0, "event": {"type": "zoom", "zoom": {"kind": "percentage", "start_pct": 90, "end_pct": 100}}},
//!   {"after_ms": 500, "event": {"type": "toggle_metric", "metric": "gpu_1"}}
//! ]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use telemetry_zoom::coordinator::{Bucket, ChartFrame};
use telemetry_zoom::{
    ChartEvent, DataLoader, PipelineConfig, Resolution, TimeWindow, ZoomCoordinator, ZoomEvent,
};

#[derive(Parser, Debug)]
#[command(name = "zoom-replay")]
#[command(about = "Replay a zoom session against the simulated telemetry remote")]
#[command(version)]
struct Args {
    /// Pipeline config (YAML). Defaults apply when omitted.
    #[arg(short, long, env = "ZOOM_CONFIG")]
    config: Option<PathBuf>,

    /// Session script (JSON). Runs the built-in demo when omitted.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(short, long, default_value = "800")]
    width: u32,

    /// Seed for the simulated remote, for reproducible runs
    #[arg(long, env = "ZOOM_SEED")]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    after_ms: u64,
    event: ChartEvent,
}

#[derive(Serialize)]
struct LayerSummary {
    bucket: Bucket,
    opacity: f32,
    resolution: Option<Resolution>,
    metrics: Vec<String>,
    points: usize,
}

#[derive(Serialize)]
struct FrameSummary {
    frame: usize,
    window: TimeWindow,
    resolution: Resolution,
    layers: Vec<LayerSummary>,
}

impl FrameSummary {
    fn new(index: usize, frame: &ChartFrame) -> Self {
        let layers = frame
            .layers
            .iter()
            .map(|layer| LayerSummary {
                bucket: layer.bucket,
                opacity: layer.opacity,
                resolution: layer.resolution,
                metrics: layer.series.iter().map(|s| s.metric.clone()).collect(),
                points: layer.series.iter().map(|s| s.points.len()).max().unwrap_or(0),
            })
            .collect();
        Self {
            frame: index,
            window: frame.window,
            resolution: frame.resolution,
            layers,
        }
    }
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing script {}", path.display()))
}

/// Zoom into the last ten minutes, pan in a burst, hide a metric, zoom back out.
fn demo_script(window: TimeWindow) -> Vec<Step> {
    let end = window.end_ms;
    let minutes = |n: i64| n * 60_000;
    let absolute = |start_ms: i64, end_ms: i64| ChartEvent::Zoom {
        zoom: ZoomEvent::Absolute { start_ms, end_ms },
    };

    vec![
        Step {
            after_ms: 100,
            event: absolute(end - minutes(10), end),
        },
        Step {
            after_ms: 800,
            event: absolute(end - minutes(12), end - minutes(2)),
        },
        Step {
            after_ms: 50,
            event: absolute(end - minutes(14), end - minutes(4)),
        },
        Step {
            after_ms: 50,
            event: absolute(end - minutes(16), end - minutes(6)),
        },
        Step {
            after_ms: 800,
            event: ChartEvent::ToggleMetric {
                metric: "gpu_1".to_string(),
            },
        },
        Step {
            after_ms: 100,
            event: absolute(end - minutes(3 * 24 * 60), end),
        },
        Step {
            after_ms: 800,
            event: ChartEvent::Zoom {
                zoom: ZoomEvent::Percentage {
                    start_pct: 0.0,
                    end_pct: 50.0,
                },
            },
        },
        Step {
            after_ms: 800,
            event: absolute(window.start_ms, window.end_ms),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if args.seed.is_some() {
        config.remote.seed = args.seed;
    }

    tracing::info!(
        config = ?args.config,
        script = ?args.script,
        width = args.width,
        seed = ?config.remote.seed,
        "Starting zoom replay"
    );

    let loader = Arc::new(DataLoader::simulated(&config));
    let steps = match &args.script {
        Some(path) => load_script(path)?,
        None => demo_script(loader.initial_window()),
    };

    let coordinator = ZoomCoordinator::new(loader, &config);
    let (handle, mut frames, task) = coordinator.spawn();

    let printer = tokio::spawn(async move {
        let mut index = 0;
        while let Some(frame) = frames.recv().await {
            match serde_json::to_string(&FrameSummary::new(index, &frame)) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Failed to encode frame"),
            }
            index += 1;
        }
        index
    });

    handle.resize(args.width);
    for step in steps {
        tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
        if !handle.send(step.event) {
            tracing::warn!("Coordinator stopped before the script finished");
            break;
        }
    }
    drop(handle);

    task.await.context("coordinator task failed")?;
    let emitted = printer.await.context("frame printer failed")?;
    tracing::info!(frames = emitted, "Replay finished");

    Ok(())
}
