// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Window duration to sampling resolution.
//!
//! Thresholds are fixed elapsed durations, not calendar arithmetic: a month is
//! 30 days and a year is 365 days.

use crate::data::{DAY_MS, HOUR_MS, Resolution, TimeWindow};

pub const MONTH_MS: i64 = 30 * DAY_MS;
pub const YEAR_MS: i64 = 365 * DAY_MS;

/// Pick the resolution used to fetch `window`.
pub fn resolution_for(window: &TimeWindow) -> Resolution {
    match window.duration_ms() {
        d if d >= YEAR_MS => Resolution::Day1,
        d if d >= MONTH_MS => Resolution::Hour1,
        d if d >= HOUR_MS => Resolution::Minute1,
        _ => Resolution::Seconds30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(duration_ms: i64) -> TimeWindow {
        let end = 1_735_689_600_000; // 2025-01-01T00:00:00Z
        TimeWindow {
            start_ms: end - duration_ms,
            end_ms: end,
        }
    }

    #[test]
    fn test_zero_duration() {
        assert_eq!(resolution_for(&window(0)), Resolution::Seconds30);
    }

    #[test]
    fn test_hour_boundary() {
        assert_eq!(resolution_for(&window(HOUR_MS - 1)), Resolution::Seconds30);
        assert_eq!(resolution_for(&window(HOUR_MS)), Resolution::Minute1);
    }

    #[test]
    fn test_month_boundary() {
        assert_eq!(resolution_for(&window(MONTH_MS - 1)), Resolution::Minute1);
        assert_eq!(resolution_for(&window(MONTH_MS)), Resolution::Hour1);
    }

    #[test]
    fn test_year_boundary() {
        assert_eq!(resolution_for(&window(YEAR_MS - 1)), Resolution::Hour1);
        assert_eq!(resolution_for(&window(YEAR_MS)), Resolution::Day1);
        assert_eq!(resolution_for(&window(5 * YEAR_MS)), Resolution::Day1);
    }

    #[test]
    fn test_ten_minutes() {
        assert_eq!(resolution_for(&window(10 * 60_000)), Resolution::Seconds30);
    }

    #[test]
    fn test_resolution_never_gets_finer_as_window_grows() {
        let durations = [
            0,
            1,
            HOUR_MS - 1,
            HOUR_MS,
            DAY_MS,
            MONTH_MS - 1,
            MONTH_MS,
            YEAR_MS - 1,
            YEAR_MS,
            10 * YEAR_MS,
        ];
        let resolutions: Vec<Resolution> =
            durations.iter().map(|d| resolution_for(&window(*d))).collect();
        assert!(resolutions.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
