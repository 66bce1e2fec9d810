// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Completed workout records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::services::accounting::MIN_WORKOUT_SECONDS;

/// Slack allowed between the reported duration and the wall-clock span.
const DURATION_SLACK_SECONDS: i64 = 5;

/// Stored workout record in the `workouts` collection. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct Workout {
    /// Generated id (also used as document ID)
    pub id: String,
    /// Owner
    pub user_id: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration_seconds: u64,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub started_at: DateTime<Utc>,
    #[serde(with = "crate::time_utils::rfc3339_millis")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub ended_at: DateTime<Utc>,
}

/// A validated workout about to be recorded.
///
/// Only constructible through [`WorkoutDraft::new`], so every draft already
/// satisfies the name, minimum-duration and timestamp rules.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    name: String,
    duration_seconds: u64,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

impl WorkoutDraft {
    pub fn new(
        name: &str,
        duration_seconds: u64,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        if duration_seconds < MIN_WORKOUT_SECONDS {
            return Err(AppError::Validation(format!(
                "Workout must be at least {} seconds",
                MIN_WORKOUT_SECONDS
            )));
        }

        if ended_at < started_at {
            return Err(AppError::Validation(
                "endedAt must not be before startedAt".to_string(),
            ));
        }

        let span = ended_at.signed_duration_since(started_at).num_seconds();
        if duration_seconds as i64 > span + DURATION_SLACK_SECONDS {
            return Err(AppError::Validation(format!(
                "Duration of {}s exceeds the time between startedAt and endedAt ({}s)",
                duration_seconds, span
            )));
        }

        Ok(Self {
            name: name.to_string(),
            duration_seconds,
            started_at,
            ended_at,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    /// Turn the draft into a stored record.
    pub fn into_workout(self, id: String, user_id: String) -> Workout {
        Workout {
            id,
            user_id,
            name: self.name,
            duration_seconds: self.duration_seconds,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}
