// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User profile stored in the `users` collection.
///
/// `level` is always derived from `exp`; nothing writes it independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct User {
    /// External identity id (also used as document ID)
    pub id: String,
    pub email: String,
    pub username: String,
    pub level: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub exp: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_workout_seconds: u64,
    /// In-progress workout, saved by heartbeats while a timer runs
    pub current_workout: Option<CurrentWorkout>,
    /// Latest timer start (epoch ms) already turned into a workout. Heartbeats
    /// for a session starting at or before it are late and ignored.
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub last_finalized_start: Option<i64>,
    /// Number of stored workouts (retention cap bookkeeping)
    #[serde(default)]
    pub workout_count: u32,
    /// When the profile was created (ISO 8601)
    #[serde(default)]
    pub created_at: String,
}

impl User {
    /// A fresh level-1 profile.
    pub fn new(id: String, email: String, username: String, created_at: String) -> Self {
        Self {
            id,
            email,
            username,
            level: 1,
            exp: 0,
            total_workout_seconds: 0,
            current_workout: None,
            last_finalized_start: None,
            workout_count: 0,
            created_at,
        }
    }
}

/// Snapshot of a running, not-yet-recorded workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct CurrentWorkout {
    pub name: String,
    /// When the timer was started (epoch milliseconds)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub start_time: i64,
    /// Elapsed seconds at the last heartbeat
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub elapsed_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_starts_at_level_one() {
        let user = User::new(
            "uid-1".to_string(),
            "a@example.com".to_string(),
            "Hunter".to_string(),
            "2024-01-15T10:00:00Z".to_string(),
        );
        assert_eq!(user.level, 1);
        assert_eq!(user.exp, 0);
        assert_eq!(user.total_workout_seconds, 0);
        assert!(user.current_workout.is_none());
    }

    #[test]
    fn test_json_field_names() {
        let mut user = User::new(
            "uid-1".to_string(),
            "a@example.com".to_string(),
            "Hunter".to_string(),
            String::new(),
        );
        user.current_workout = Some(CurrentWorkout {
            name: "Run".to_string(),
            start_time: 1_705_312_800_000,
            elapsed_seconds: 120,
        });

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["totalWorkoutSeconds"], 0);
        assert_eq!(json["currentWorkout"]["startTime"], 1_705_312_800_000_i64);
        assert_eq!(json["currentWorkout"]["elapsedSeconds"], 120);
    }

    #[test]
    fn test_missing_bookkeeping_fields_default() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "uid-1",
            "email": "a@example.com",
            "username": "Hunter",
            "level": 3,
            "exp": 120000,
            "totalWorkoutSeconds": 432000,
            "currentWorkout": null
        }))
        .unwrap();
        assert_eq!(user.workout_count, 0);
        assert_eq!(user.last_finalized_start, None);
        assert_eq!(user.created_at, "");
    }
}
