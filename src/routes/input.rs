// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request bodies and their conversion into validated core types.
//!
//! Clients send durations as numbers or numeric strings and timestamps as
//! RFC 3339 strings or epoch milliseconds. Everything is parsed here, so the
//! services only ever see strongly typed values.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{CurrentWorkout, WorkoutDraft};
use crate::time_utils::from_epoch_millis;

const MAX_USER_ID_LEN: usize = 128;
/// How far ahead of the server clock a client timestamp may be.
pub const MAX_CLOCK_SKEW_SECONDS: i64 = 300;

/// Reject path ids that could never have been issued.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::Validation(format!(
            "userId must be 1-{} characters",
            MAX_USER_ID_LEN
        )));
    }
    Ok(())
}

/// A count of seconds sent as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseSeconds {
    Number(serde_json::Number),
    Text(String),
}

impl LooseSeconds {
    pub fn whole_seconds(&self, field: &str) -> Result<u64> {
        let value = match self {
            LooseSeconds::Number(n) => {
                if let Some(v) = n.as_u64() {
                    return Ok(v);
                }
                n.as_f64()
            }
            LooseSeconds::Text(s) => {
                let s = s.trim();
                if let Ok(v) = s.parse::<u64>() {
                    return Ok(v);
                }
                s.parse::<f64>().ok()
            }
        };

        match value {
            Some(v) if v.is_finite() && v < 0.0 => Err(AppError::Validation(format!(
                "{} must be a positive number",
                field
            ))),
            Some(v) if v.is_finite() && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
            Some(v) if v.is_finite() => Err(AppError::Validation(format!(
                "{} must be a whole number of seconds",
                field
            ))),
            _ => Err(AppError::Validation(format!("{} must be a number", field))),
        }
    }
}

/// An instant sent as an RFC 3339 string or epoch milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseTimestamp {
    EpochMillis(i64),
    Text(String),
}

impl LooseTimestamp {
    pub fn to_utc(&self, field: &str) -> Result<DateTime<Utc>> {
        self.to_utc_at(field, Utc::now())
    }

    /// Parse, then reject instants before 1970 or beyond the allowed skew
    /// past `now`. Both would break fixed-width storage ordering.
    pub fn to_utc_at(&self, field: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let parsed = match self {
            LooseTimestamp::EpochMillis(ms) => from_epoch_millis(*ms),
            LooseTimestamp::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        let parsed = parsed.ok_or_else(|| {
            AppError::Validation(format!(
                "{} must be an RFC 3339 timestamp or epoch milliseconds",
                field
            ))
        })?;

        if parsed.timestamp_millis() < 0 {
            return Err(AppError::Validation(format!(
                "{} must not be before 1970",
                field
            )));
        }
        let latest = now
            .checked_add_signed(Duration::seconds(MAX_CLOCK_SKEW_SECONDS))
            .unwrap_or(now);
        if parsed > latest {
            return Err(AppError::Validation(format!(
                "{} must not be in the future",
                field
            )));
        }
        Ok(parsed)
    }
}

// ─── Workouts ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordWorkoutRequest {
    #[validate(length(min = 1, max = 128, message = "userId must be 1-128 characters"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub duration_seconds: LooseSeconds,
    pub started_at: LooseTimestamp,
    pub ended_at: LooseTimestamp,
}

impl RecordWorkoutRequest {
    /// Validate and split into the owner id and a workout draft.
    pub fn into_draft(self) -> Result<(String, WorkoutDraft)> {
        self.validate()?;
        let duration = self.duration_seconds.whole_seconds("durationSeconds")?;
        let started_at = self.started_at.to_utc("startedAt")?;
        let ended_at = self.ended_at.to_utc("endedAt")?;
        let draft = WorkoutDraft::new(&self.name, duration, started_at, ended_at)?;
        Ok((self.user_id, draft))
    }
}

// ─── Current workout ─────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWorkoutInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    pub start_time: LooseTimestamp,
    pub elapsed_seconds: LooseSeconds,
}

/// Heartbeat body. `workout` must be present; `null` clears the timer.
#[derive(Debug, Deserialize)]
pub struct SaveCurrentWorkoutRequest {
    #[serde(deserialize_with = "Option::deserialize")]
    pub workout: Option<CurrentWorkoutInput>,
}

impl SaveCurrentWorkoutRequest {
    pub fn into_current_workout(self) -> Result<Option<CurrentWorkout>> {
        let Some(input) = self.workout else {
            return Ok(None);
        };
        input.validate()?;
        Ok(Some(CurrentWorkout {
            name: input.name.trim().to_string(),
            start_time: input.start_time.to_utc("startTime")?.timestamp_millis(),
            elapsed_seconds: input.elapsed_seconds.whole_seconds("elapsedSeconds")?,
        }))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartWorkoutRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

// ─── Users ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 128, message = "id must be 1-128 characters"))]
    pub id: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUsernameRequest {
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: String,
}
