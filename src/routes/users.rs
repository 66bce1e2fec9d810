// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profiles and the in-progress workout timer.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::Result;
use crate::models::User;
use crate::routes::input::{
    validate_user_id, CreateUserRequest, SaveCurrentWorkoutRequest, StartWorkoutRequest,
    UpdateUsernameRequest,
};
use crate::routes::workouts::RecordWorkoutResponse;
use crate::services::{ResumedTimer, UserProfile};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(get_or_create_user))
        .route("/users/{user_id}", get(get_profile))
        .route("/users/{user_id}/username", patch(update_username))
        .route(
            "/users/{user_id}/current-workout",
            get(restore_current_workout).patch(save_current_workout),
        )
        .route("/users/{user_id}/current-workout/start", post(start_workout))
        .route("/users/{user_id}/current-workout/stop", post(stop_workout))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get-or-create: 201 when the user is new, 200 when it already existed.
async fn get_or_create_user(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(request) = payload?;
    request.validate()?;

    let (user, created) = state
        .profiles
        .get_or_create(&request.id, &request.email, &request.username)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(user)))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
    validate_user_id(&user_id)?;
    Ok(Json(state.profiles.profile(&user_id).await?))
}

async fn update_username(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<UpdateUsernameRequest>, JsonRejection>,
) -> Result<Json<User>> {
    validate_user_id(&user_id)?;
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .profiles
        .update_username(&user_id, &request.username)
        .await?;
    Ok(Json(user))
}

// ─── Current workout ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct CurrentWorkoutResponse {
    pub timer: Option<ResumedTimer>,
}

/// Heartbeat save (or clear, with `null`).
async fn save_current_workout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<SaveCurrentWorkoutRequest>, JsonRejection>,
) -> Result<Json<User>> {
    validate_user_id(&user_id)?;
    let Json(request) = payload?;
    let current = request.into_current_workout()?;

    let user = state.timers.save_current_workout(&user_id, current).await?;
    Ok(Json(user))
}

async fn restore_current_workout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<CurrentWorkoutResponse>> {
    validate_user_id(&user_id)?;
    let timer = state.timers.restore(&user_id, Utc::now()).await?;
    Ok(Json(CurrentWorkoutResponse { timer }))
}

async fn start_workout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<StartWorkoutRequest>, JsonRejection>,
) -> Result<Json<User>> {
    validate_user_id(&user_id)?;
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .timers
        .start(&user_id, &request.name, Utc::now())
        .await?;
    Ok(Json(user))
}

async fn stop_workout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<RecordWorkoutResponse>)> {
    validate_user_id(&user_id)?;
    let recorded = state.timers.stop(&user_id, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(recorded.into())))
}
