// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EXP thresholds and level derivation.
//!
//! Levels follow a step curve: 50,000 EXP per level up to level 200 and
//! 100,000 EXP per level afterwards. A user's level is always recomputed
//! from cumulative EXP, starting at level 1.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Last level on the cheaper part of the curve.
const STEP_LEVEL: u32 = 200;
const EXP_PER_LEVEL_LOW: u64 = 50_000;
const EXP_PER_LEVEL_HIGH: u64 = 100_000;

/// EXP awarded for one hour of exercise.
pub const EXP_PER_HOUR: u64 = 1_000;

/// EXP needed to advance from `level` to `level + 1`.
pub fn exp_threshold_for_level(level: u32) -> u64 {
    if level <= STEP_LEVEL {
        EXP_PER_LEVEL_LOW
    } else {
        EXP_PER_LEVEL_HIGH
    }
}

/// Cumulative EXP required to reach `level` (0 for level 1).
pub fn exp_to_reach_level(level: u32) -> u64 {
    (1..level).map(exp_threshold_for_level).sum()
}

/// Level for a cumulative EXP total.
///
/// Returns the unique `L` with `exp_to_reach_level(L) <= total_exp < exp_to_reach_level(L + 1)`.
pub fn level_for_cumulative_exp(total_exp: u64) -> u32 {
    let mut level = 1;
    let mut level_floor = 0u64;
    loop {
        let next_floor = level_floor.saturating_add(exp_threshold_for_level(level));
        if total_exp < next_floor || next_floor == u64::MAX {
            return level;
        }
        level_floor = next_floor;
        level += 1;
    }
}

/// EXP for a workout: one hour is 1,000 EXP, prorated and floored.
pub fn exp_for_duration(duration_seconds: u64) -> u64 {
    duration_seconds.saturating_mul(EXP_PER_HOUR) / 3600
}

/// Where a user stands within their current level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct LevelProgress {
    pub level: u32,
    /// EXP earned since reaching `level`
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub exp_into_level: u64,
    /// EXP needed to go from `level` to the next one
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub exp_for_next_level: u64,
    /// Progress through the current level, 0.0 to 100.0
    pub percent: f64,
}

impl LevelProgress {
    pub fn from_exp(total_exp: u64) -> Self {
        let level = level_for_cumulative_exp(total_exp);
        let exp_into_level = total_exp - exp_to_reach_level(level);
        let exp_for_next_level = exp_threshold_for_level(level);
        Self {
            level,
            exp_into_level,
            exp_for_next_level,
            percent: exp_into_level as f64 / exp_for_next_level as f64 * 100.0,
        }
    }
}
