// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Error types for the telemetry pipeline.

use std::time::Duration;

/// Failure of a remote fetch. Always recovered by the loader's fallback path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("fetch timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("metrics source unavailable: {0}")]
    Unavailable(String),

    #[error("metrics source returned an invalid series: {0}")]
    InvalidSeries(String),
}

/// Rejected window construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("window start {start} is after end {end}")]
    Inverted { start: i64, end: i64 },

    #[error("window [{start}, {end}] is too wide to measure in milliseconds")]
    Overflow { start: i64, end: i64 },
}
