// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Pipeline configuration, loadable from YAML. Every field has a default.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

fn default_cache_expiry_ms() -> u64 {
    5 * 60 * 1000
}

fn default_max_points() -> usize {
    10_000
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_metrics() -> Vec<String> {
    ["cpu_1", "gpu_1", "memory", "disk"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_min_latency_ms() -> u64 {
    50
}

fn default_max_latency_ms() -> u64 {
    400
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_min_render_points() -> usize {
    200
}

fn default_max_render_points() -> usize {
    1_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// How long a fetched window stays servable from the cache.
    #[serde(default = "default_cache_expiry_ms")]
    pub cache_expiry_ms: u64,
    /// Upper bound on points in one fetched or synthesized series.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    /// Quiet period after the last zoom event before a fetch fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Metrics fetched for the initial paint and by the coordinator.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Behaviour of the simulated remote metrics service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
    /// Probability in [0, 1] that a fetch fails.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    /// Fixed RNG seed; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Point budget bounds for the rendering surface.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_min_render_points")]
    pub min_points: usize,
    #[serde(default = "default_max_render_points")]
    pub max_points: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_expiry_ms: default_cache_expiry_ms(),
            max_points: default_max_points(),
            debounce_ms: default_debounce_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            metrics: default_metrics(),
            remote: RemoteConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
            failure_rate: default_failure_rate(),
            seed: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_points: default_min_render_points(),
            max_points: default_max_render_points(),
        }
    }
}

impl PipelineConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: PipelineConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_expiry_ms == 0 {
            bail!("cache_expiry_ms must be positive");
        }
        if self.max_points == 0 {
            bail!("max_points must be positive");
        }
        if self.fetch_timeout_ms == 0 {
            bail!("fetch_timeout_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.remote.failure_rate) {
            bail!(
                "remote.failure_rate must be within [0, 1], got {}",
                self.remote.failure_rate
            );
        }
        if self.remote.min_latency_ms > self.remote.max_latency_ms {
            bail!(
                "remote.min_latency_ms ({}) exceeds remote.max_latency_ms ({})",
                self.remote.min_latency_ms,
                self.remote.max_latency_ms
            );
        }
        if self.render.min_points < 2 || self.render.min_points > self.render.max_points {
            bail!(
                "render point bounds must satisfy 2 <= min_points <= max_points, got [{}, {}]",
                self.render.min_points,
                self.render.max_points
            );
        }
        Ok(())
    }

    pub fn cache_expiry(&self) -> Duration {
        Duration::from_millis(self.cache_expiry_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
