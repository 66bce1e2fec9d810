// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completed workouts: recording and the recent list.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::models::{User, Workout};
use crate::routes::input::{validate_user_id, RecordWorkoutRequest};
use crate::services::RecordedWorkout;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workouts", post(record_workout))
        .route("/workouts/{user_id}", get(list_workouts))
}

/// An accepted workout together with the updated profile.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct RecordWorkoutResponse {
    pub workout: Workout,
    pub user: User,
}

impl From<RecordedWorkout> for RecordWorkoutResponse {
    fn from(recorded: RecordedWorkout) -> Self {
        Self {
            workout: recorded.workout,
            user: recorded.user,
        }
    }
}

async fn record_workout(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RecordWorkoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordWorkoutResponse>)> {
    let Json(request) = payload?;
    let (user_id, draft) = request.into_draft()?;

    let recorded = state.workouts.record_workout(&user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(recorded.into())))
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Workout>>> {
    validate_user_id(&user_id)?;
    let workouts = state.workouts.recent_workouts(&user_id).await?;
    Ok(Json(workouts))
}
