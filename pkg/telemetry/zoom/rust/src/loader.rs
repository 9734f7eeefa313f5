// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Window loading: resolution policy, cache, remote fetch and fallback.
//!
//! [`DataLoader::get_data`] never fails. A cache hit returns immediately; a
//! miss goes to the [`MetricSource`] under a timeout; any failure is answered
//! with a locally synthesized series. Fallback series are never cached; the
//! next identical request goes back to the source.
//!
//! Identical requests that overlap share a single in-flight fetch.

use futures::future::{BoxFuture, FutureExt, Shared};
use rustc_hash::FxHashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheKey, WindowCache};
use crate::clock::{Clock, SystemClock};
use crate::config::PipelineConfig;
use crate::data::{MetricSeries, Resolution, TimeWindow};
use crate::error::FetchError;
use crate::resolution::{YEAR_MS, resolution_for};
use crate::source::{MetricSource, SimulatedRemote};
use crate::synth::SeriesSynthesizer;

type InflightFetch = Shared<BoxFuture<'static, Result<Arc<MetricSeries>, FetchError>>>;
type InflightTable = Arc<Mutex<FxHashMap<CacheKey, InflightFetch>>>;

/// Drops the in-flight entry for `key` when the fetch finishes or unwinds.
struct InflightGuard {
    inflight: InflightTable,
    key: CacheKey,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        lock(&self.inflight).remove(&self.key);
    }
}

/// Where a loaded series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrigin {
    Cache,
    Remote,
    /// Synthesized locally after the source failed.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Arc<MetricSeries>,
    pub origin: SeriesOrigin,
}

pub struct DataLoader {
    source: Arc<dyn MetricSource>,
    synthesizer: Arc<SeriesSynthesizer>,
    cache: Arc<Mutex<WindowCache>>,
    inflight: InflightTable,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
    metrics: Vec<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DataLoader {
    pub fn new(
        config: &PipelineConfig,
        source: Arc<dyn MetricSource>,
        synthesizer: Arc<SeriesSynthesizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = WindowCache::new(config.cache_expiry(), clock.clone());
        Self {
            source,
            synthesizer,
            cache: Arc::new(Mutex::new(cache)),
            inflight: Arc::new(Mutex::new(FxHashMap::default())),
            clock,
            fetch_timeout: config.fetch_timeout(),
            metrics: config.metrics.clone(),
        }
    }

    /// Loader backed by the simulated remote and the system clock.
    pub fn simulated(config: &PipelineConfig) -> Self {
        let synthesizer = Arc::new(match config.remote.seed {
            Some(seed) => SeriesSynthesizer::with_seed(config.max_points, seed),
            None => SeriesSynthesizer::new(config.max_points),
        });
        let source = Arc::new(SimulatedRemote::new(synthesizer.clone(), &config.remote));
        Self::new(config, source, synthesizer, Arc::new(SystemClock))
    }

    /// Default metric set used for the initial paint.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Series for `window`, always renderable.
    pub async fn get_data(&self, window: TimeWindow, metrics: &[String]) -> Arc<MetricSeries> {
        self.load(window, metrics).await.series
    }

    /// Like [`get_data`](Self::get_data), also reporting where the series came from.
    pub async fn load(&self, window: TimeWindow, metrics: &[String]) -> LoadedSeries {
        let resolution = resolution_for(&window);
        let key = CacheKey::composite(&window, resolution, metrics);

        let fetch = {
            let mut inflight = lock(&self.inflight);
            if let Some(series) = lock(&self.cache).get(&key) {
                debug!(key = %key, "Cache hit");
                metrics::counter!("telemetry_zoom.cache.hit").increment(1);
                return LoadedSeries {
                    series,
                    origin: SeriesOrigin::Cache,
                };
            }
            inflight
                .entry(key.clone())
                .or_insert_with(|| {
                    debug!(key = %key, "Cache miss, fetching from source");
                    metrics::counter!("telemetry_zoom.cache.miss").increment(1);
                    self.start_fetch(key.clone(), window, metrics.to_vec(), resolution)
                })
                .clone()
        };

        match fetch.await {
            Ok(series) => LoadedSeries {
                series,
                origin: SeriesOrigin::Remote,
            },
            Err(e) => {
                warn!(
                    key = %key,
                    error = %e,
                    "Fetch failed, serving synthesized fallback"
                );
                self.fallback(window, metrics)
            }
        }
    }

    /// Locally synthesized series for `window`. Never cached.
    pub fn fallback(&self, window: TimeWindow, metrics: &[String]) -> LoadedSeries {
        metrics::counter!("telemetry_zoom.fallback").increment(1);
        let series = self
            .synthesizer
            .synthesize(resolution_for(&window), &window, metrics);
        LoadedSeries {
            series: Arc::new(series),
            origin: SeriesOrigin::Fallback,
        }
    }

    /// Build the shared fetch for `key`. On success the series is cached before
    /// the in-flight entry is dropped, so a concurrent caller always finds one
    /// or the other. A panicking source is reported as `Unavailable`.
    fn start_fetch(
        &self,
        key: CacheKey,
        window: TimeWindow,
        metrics: Vec<String>,
        resolution: Resolution,
    ) -> InflightFetch {
        let source = self.source.clone();
        let cache = self.cache.clone();
        let inflight = self.inflight.clone();
        let timeout = self.fetch_timeout;

        async move {
            let _guard = InflightGuard {
                inflight,
                key: key.clone(),
            };
            let fetch =
                AssertUnwindSafe(source.fetch(window, &metrics, resolution)).catch_unwind();

            let outcome = match tokio::time::timeout(timeout, fetch).await {
                Ok(Ok(Ok(series))) if series.resolution != resolution => {
                    Err(FetchError::InvalidSeries(format!(
                        "expected {} resolution, got {}",
                        resolution, series.resolution
                    )))
                }
                Ok(Ok(result)) => result.map(Arc::new),
                Ok(Err(_)) => Err(FetchError::Unavailable(
                    "metrics source panicked".to_string(),
                )),
                Err(_) => Err(FetchError::Timeout(timeout)),
            };

            if let Ok(series) = &outcome {
                lock(&cache).put(key, series.clone());
            }
            outcome
        }
        .boxed()
        .shared()
    }

    /// First-paint data: daily points over the trailing year. No fetch, no cache.
    pub fn initial_data(&self) -> MetricSeries {
        let window = self.initial_window();
        self.synthesizer
            .synthesize(Resolution::Day1, &window, &self.metrics)
    }

    pub fn initial_window(&self) -> TimeWindow {
        let end = self.clock.now_ms();
        TimeWindow {
            start_ms: end - YEAR_MS,
            end_ms: end,
        }
    }

    /// Cached series for a request, without fetching.
    pub fn cached(&self, window: &TimeWindow, metrics: &[String]) -> Option<Arc<MetricSeries>> {
        let key = CacheKey::composite(window, resolution_for(window), metrics);
        lock(&self.cache).get(&key)
    }

    pub fn invalidate(&self, window: &TimeWindow, metrics: &[String]) {
        let key = CacheKey::composite(window, resolution_for(window), metrics);
        lock(&self.cache).evict(&key);
    }

    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }
}
