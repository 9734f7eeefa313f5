// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Remote metrics boundary.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::data::{MetricSeries, Resolution, TimeWindow};
use crate::error::FetchError;
use crate::synth::SeriesSynthesizer;

/// Port for fetching a resolved series from wherever telemetry lives.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch(
        &self,
        window: TimeWindow,
        metrics: &[String],
        resolution: Resolution,
    ) -> Result<MetricSeries, FetchError>;
}

/// Local stand-in for a remote metrics service: variable latency, occasional
/// transient failures, synthesized payloads.
pub struct SimulatedRemote {
    synthesizer: Arc<SeriesSynthesizer>,
    min_latency: Duration,
    max_latency: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedRemote {
    pub fn new(synthesizer: Arc<SeriesSynthesizer>, config: &RemoteConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            synthesizer,
            min_latency: Duration::from_millis(config.min_latency_ms),
            max_latency: Duration::from_millis(config.min_latency_ms.max(config.max_latency_ms)),
            failure_rate: config.failure_rate.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    /// Latency and outcome for one fetch. The RNG lock is released before the sleep.
    fn roll(&self) -> (Duration, bool) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let latency = rng.random_range(self.min_latency..=self.max_latency);
        let fail = rng.random_bool(self.failure_rate);
        (latency, fail)
    }
}

#[async_trait]
impl MetricSource for SimulatedRemote {
    async fn fetch(
        &self,
        window: TimeWindow,
        metrics: &[String],
        resolution: Resolution,
    ) -> Result<MetricSeries, FetchError> {
        let (latency, fail) = self.roll();
        debug!(
            window = %window,
            resolution = %resolution,
            latency_ms = latency.as_millis() as u64,
            "Simulated remote fetch"
        );
        tokio::time::sleep(latency).await;

        if fail {
            return Err(FetchError::Unavailable(
                "simulated transient failure".to_string(),
            ));
        }
        Ok(self.synthesizer.synthesize(resolution, &window, metrics))
    }
}
