// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Stride downsampling for the rendering surface.

pub const MIN_RENDER_POINTS: usize = 200;
pub const MAX_RENDER_POINTS: usize = 1_000;

/// Roughly one point per pixel, clamped into `[min_points, max_points]`.
pub fn max_points_for_width(width_px: u32, min_points: usize, max_points: usize) -> usize {
    (width_px as usize).clamp(min_points, max_points.max(min_points))
}

/// Reduce `points` to at most `max_points`, keeping order and both endpoints.
///
/// Keeps every `ceil(len / max_points)`-th point from the first. When that
/// misses the last point it is appended, or swapped in for the final kept
/// point if appending would exceed the budget. A budget below two is raised to
/// two.
pub fn sample<T: Clone>(points: &[T], max_points: usize) -> Vec<T> {
    let max_points = max_points.max(2);
    if points.len() <= max_points {
        return points.to_vec();
    }

    let stride = points.len().div_ceil(max_points);
    let last_index = points.len() - 1;
    let mut out: Vec<T> = points.iter().step_by(stride).cloned().collect();

    if last_index % stride != 0 {
        if out.len() < max_points {
            out.push(points[last_index].clone());
        } else if let Some(tail) = out.last_mut() {
            *tail = points[last_index].clone();
        }
    }
    out
}
