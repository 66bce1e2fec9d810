// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Level/rank reference table for the client and for checking the curve.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{rank_for_level, Rank, RANKS};
use crate::services::leveling::exp_threshold_for_level;
use crate::AppState;

/// Levels sampled so every rank appears at least once.
const SAMPLE_LEVELS: [u32; 26] = [
    1, 10, 20, 30, 40, 50, 60, 70, 80, 100, 120, 150, 200, 250, 300, 350, 400, 450, 500, 575, 650,
    725, 800, 1000, 1500, 2000,
];

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/levels", get(get_levels))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct LevelRow {
    pub level: u32,
    pub rank: &'static str,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub exp_for_next_level: u64,
    pub min_level: u32,
    pub max_level: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct LevelsResponse {
    pub levels: Vec<LevelRow>,
    pub all_ranks: Vec<Rank>,
}

pub fn level_table() -> LevelsResponse {
    let levels = SAMPLE_LEVELS
        .iter()
        .map(|&level| {
            let rank = rank_for_level(level);
            LevelRow {
                level,
                rank: rank.name,
                exp_for_next_level: exp_threshold_for_level(level),
                min_level: rank.min_level,
                max_level: rank.max_level,
            }
        })
        .collect();

    LevelsResponse {
        levels,
        all_ranks: RANKS.to_vec(),
    }
}

async fn get_levels() -> Json<LevelsResponse> {
    Json(level_table())
}
