// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-progress workout timers.
//!
//! The client ticks the timer locally and saves `currentWorkout` as a
//! heartbeat. On reload the server reconstructs the elapsed time from the
//! wall clock, so time spent disconnected is neither lost nor counted twice.
//! Timers older than six hours are treated as abandoned and cleared.
//!
//! Nothing here awards EXP; `stop` hands the finished timer to
//! [`WorkoutService`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{CurrentWorkout, User, WorkoutDraft};
use crate::services::accounting::{RecordedWorkout, WorkoutService};
use crate::services::locks::UserLocks;
use crate::services::{require_user, LogFailure};
use crate::time_utils::from_epoch_millis;

/// A timer whose start lies further back than this is abandoned.
pub const STALE_AFTER_SECONDS: i64 = 21_600;
/// Upper bound on a resumed or saved elapsed time.
pub const MAX_ELAPSED_SECONDS: u64 = 21_600;

/// A running timer as the client should re-arm it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct ResumedTimer {
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub start_time: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub elapsed_seconds: u64,
}

/// Where a user's timer stands at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running(ResumedTimer),
    /// Started too long ago; must be cleared without recording.
    Abandoned,
}

/// Reconstruct the timer state from the last heartbeat.
///
/// Elapsed time is the larger of the saved value and the wall-clock time
/// since `startTime`, capped at [`MAX_ELAPSED_SECONDS`]. A start time in the
/// future counts as no time passed.
pub fn resume(current: Option<&CurrentWorkout>, now: DateTime<Utc>) -> TimerState {
    let Some(current) = current else {
        return TimerState::Idle;
    };

    let gap_ms = now
        .timestamp_millis()
        .saturating_sub(current.start_time)
        .max(0);
    if gap_ms > STALE_AFTER_SECONDS * 1000 {
        return TimerState::Abandoned;
    }

    let wall_clock_seconds = (gap_ms / 1000) as u64;
    let elapsed_seconds = wall_clock_seconds
        .max(current.elapsed_seconds)
        .min(MAX_ELAPSED_SECONDS);

    TimerState::Running(ResumedTimer {
        name: current.name.clone(),
        start_time: current.start_time,
        elapsed_seconds,
    })
}

/// Timer transitions on top of the user's `currentWorkout` field.
#[derive(Clone)]
pub struct TimerService {
    db: Database,
    locks: UserLocks,
    workouts: WorkoutService,
}

impl TimerService {
    pub fn new(db: Database, locks: UserLocks, workouts: WorkoutService) -> Self {
        Self {
            db,
            locks,
            workouts,
        }
    }

    /// Heartbeat save. Storing the value already present is a no-op, as is a
    /// late heartbeat for a session that has already been recorded.
    pub async fn save_current_workout(
        &self,
        user_id: &str,
        current: Option<CurrentWorkout>,
    ) -> Result<User> {
        if let Some(current) = &current {
            if current.name.trim().is_empty() {
                return Err(AppError::Validation("Name is required".to_string()));
            }
            if current.elapsed_seconds > MAX_ELAPSED_SECONDS {
                return Err(AppError::Validation(format!(
                    "elapsedSeconds must not exceed {}",
                    MAX_ELAPSED_SECONDS
                )));
            }
        }

        let _guard = self.locks.acquire(user_id).await;
        let mut user = require_user(&self.db, user_id, "save_current_workout").await?;

        if user.current_workout == current {
            return Ok(user);
        }

        if let Some(current) = &current {
            if is_finalized(&user, current.start_time) {
                tracing::debug!(
                    user_id,
                    start_time = current.start_time,
                    "Ignoring heartbeat for a recorded session"
                );
                return Ok(user);
            }
        }

        user.current_workout = current;
        self.db
            .upsert_user(&user)
            .await
            .log_failure(user_id, "save_current_workout")?;
        tracing::debug!(
            user_id,
            running = user.current_workout.is_some(),
            "Current workout saved"
        );
        Ok(user)
    }

    /// Idle → Running. A stale leftover timer is replaced; a live one is an error.
    pub async fn start(&self, user_id: &str, name: &str, now: DateTime<Utc>) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let _guard = self.locks.acquire(user_id).await;
        let mut user = require_user(&self.db, user_id, "start_workout").await?;

        if let TimerState::Running(_) = resume(user.current_workout.as_ref(), now) {
            return Err(AppError::Validation(
                "A workout is already in progress".to_string(),
            ));
        }

        user.current_workout = Some(CurrentWorkout {
            name: name.to_string(),
            start_time: now.timestamp_millis(),
            elapsed_seconds: 0,
        });
        self.db
            .upsert_user(&user)
            .await
            .log_failure(user_id, "start_workout")?;
        tracing::info!(user_id, "Workout timer started");
        Ok(user)
    }

    /// Resume the user's timer, clearing it if it has gone stale.
    pub async fn restore(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<ResumedTimer>> {
        let _guard = self.locks.acquire(user_id).await;
        let mut user = require_user(&self.db, user_id, "restore_workout").await?;

        match resume(user.current_workout.as_ref(), now) {
            TimerState::Idle => Ok(None),
            TimerState::Running(timer) => Ok(Some(timer)),
            TimerState::Abandoned => {
                user.current_workout = None;
                self.db
                    .upsert_user(&user)
                    .await
                    .log_failure(user_id, "restore_workout")?;
                tracing::info!(user_id, "Stale workout timer cleared");
                Ok(None)
            }
        }
    }

    /// Running → Idle, recording the finished workout.
    pub async fn stop(&self, user_id: &str, now: DateTime<Utc>) -> Result<RecordedWorkout> {
        let guard = self.locks.acquire(user_id).await;
        let mut user = require_user(&self.db, user_id, "stop_workout").await?;

        let timer = match resume(user.current_workout.as_ref(), now) {
            TimerState::Running(timer) if is_finalized(&user, timer.start_time) => {
                user.current_workout = None;
                self.db
                    .upsert_user(&user)
                    .await
                    .log_failure(user_id, "stop_workout")?;
                tracing::warn!(user_id, "Recorded session found in timer, cleared");
                return Err(AppError::Validation(
                    "Workout was already recorded".to_string(),
                ));
            }
            TimerState::Running(timer) => timer,
            TimerState::Idle => {
                return Err(AppError::Validation("No workout in progress".to_string()));
            }
            TimerState::Abandoned => {
                user.current_workout = None;
                self.db
                    .upsert_user(&user)
                    .await
                    .log_failure(user_id, "stop_workout")?;
                tracing::info!(user_id, "Stale workout timer cleared on stop");
                return Err(AppError::Validation(
                    "Workout session expired after 6 hours".to_string(),
                ));
            }
        };

        let invalid_start = || AppError::Validation("Invalid workout start time".to_string());
        let started_at = from_epoch_millis(timer.start_time).ok_or_else(invalid_start)?;
        let timer_end = started_at
            .checked_add_signed(Duration::seconds(timer.elapsed_seconds as i64))
            .ok_or_else(invalid_start)?;
        // A client clock running ahead can push elapsed past the wall clock.
        let ended_at = now.max(timer_end);
        let draft = WorkoutDraft::new(&timer.name, timer.elapsed_seconds, started_at, ended_at)?;

        self.workouts.record_workout_locked(&guard, draft).await
    }
}

/// True when a session starting at `start_time` has already been recorded.
fn is_finalized(user: &User, start_time: i64) -> bool {
    user.last_finalized_start.is_some_and(|finalized| start_time <= finalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use assert_matches::assert_matches;
    use chrono::FixedOffset;

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn running(start: DateTime<Utc>, elapsed_seconds: u64) -> CurrentWorkout {
        CurrentWorkout {
            name: "Run".to_string(),
            start_time: start.timestamp_millis(),
            elapsed_seconds,
        }
    }

    async fn service() -> TimerService {
        let db = Database::Memory(MemoryDb::new());
        db.upsert_user(&User::new(
            "u1".to_string(),
            "a@example.com".to_string(),
            "Hunter".to_string(),
            String::new(),
        ))
        .await
        .unwrap();
        let locks = UserLocks::new();
        let workouts = WorkoutService::new(db.clone(), locks.clone(), FixedOffset::east_opt(0).unwrap());
        TimerService::new(db, locks, workouts)
    }

    #[test]
    fn test_resume_uses_wall_clock_gap() {
        // Heartbeat saved 120s, reopened 200s after start
        let start = at("2024-01-15T10:00:00Z");
        let state = resume(Some(&running(start, 120)), start + Duration::seconds(200));
        assert_matches!(state, TimerState::Running(t) if t.elapsed_seconds == 200);
    }

    #[test]
    fn test_resume_keeps_saved_when_ahead_of_clock() {
        let start = at("2024-01-15T10:00:00Z");
        let state = resume(Some(&running(start, 300)), start + Duration::seconds(200));
        assert_matches!(state, TimerState::Running(t) if t.elapsed_seconds == 300);
    }

    #[test]
    fn test_resume_future_start_counts_no_gap() {
        let start = at("2024-01-15T10:00:00Z");
        let state = resume(Some(&running(start, 5)), start - Duration::seconds(60));
        assert_matches!(state, TimerState::Running(t) if t.elapsed_seconds == 5);
    }

    #[test]
    fn test_resume_staleness() {
        let start = at("2024-01-15T10:00:00Z");
        let edge = resume(Some(&running(start, 0)), start + Duration::hours(6));
        assert_matches!(edge, TimerState::Running(t) if t.elapsed_seconds == MAX_ELAPSED_SECONDS);

        let stale = resume(
            Some(&running(start, 0)),
            start + Duration::hours(6) + Duration::seconds(1),
        );
        assert_eq!(stale, TimerState::Abandoned);
        assert_eq!(resume(None, start), TimerState::Idle);
    }

    #[tokio::test]
    async fn test_clearing_twice_is_a_no_op() {
        let timers = service().await;
        let first = timers.save_current_workout("u1", None).await.unwrap();
        let second = timers.save_current_workout("u1", None).await.unwrap();
        assert_eq!(first, second);
        assert!(second.current_workout.is_none());
    }

    #[tokio::test]
    async fn test_heartbeat_rejects_elapsed_over_cap() {
        let timers = service().await;
        let err = timers
            .save_current_workout("u1", Some(running(Utc::now(), MAX_ELAPSED_SECONDS + 1)))
            .await
            .unwrap_err();
        assert_matches!(err, AppError::Validation(_));
    }

    #[tokio::test]
    async fn test_restore_clears_stale_timer() {
        let timers = service().await;
        let start = at("2024-01-15T10:00:00Z");
        timers
            .save_current_workout("u1", Some(running(start, 120)))
            .await
            .unwrap();

        let resumed = timers.restore("u1", start + Duration::hours(7)).await.unwrap();
        assert!(resumed.is_none());
        let user = timers.db.get_user("u1").await.unwrap().unwrap();
        assert!(user.current_workout.is_none());
        assert_eq!(user.exp, 0);
    }

    #[tokio::test]
    async fn test_start_then_stop_records_workout() {
        let timers = service().await;
        let start = at("2024-01-15T10:00:00Z");
        timers.start("u1", "Lift", start).await.unwrap();

        let recorded = timers.stop("u1", start + Duration::hours(1)).await.unwrap();
        assert_eq!(recorded.workout.name, "Lift");
        assert_eq!(recorded.workout.duration_seconds, 3600);
        assert_eq!(recorded.user.exp, 1000);
        assert!(recorded.user.current_workout.is_none());
    }

    #[tokio::test]
    async fn test_start_while_running_rejected() {
        let timers = service().await;
        let start = at("2024-01-15T10:00:00Z");
        timers.start("u1", "Lift", start).await.unwrap();
        let err = timers
            .start("u1", "Run", start + Duration::minutes(5))
            .await
            .unwrap_err();
        assert_matches!(err, AppError::Validation(_));
    }

    #[tokio::test]
    async fn test_stop_without_timer_rejected() {
        let timers = service().await;
        assert_matches!(
            timers.stop("u1", Utc::now()).await,
            Err(AppError::Validation(msg)) if msg == "No workout in progress"
        );
    }

    #[tokio::test]
    async fn test_stop_too_short_keeps_timer() {
        let timers = service().await;
        let start = at("2024-01-15T10:00:00Z");
        timers.start("u1", "Lift", start).await.unwrap();
        let err = timers
            .stop("u1", start + Duration::seconds(10))
            .await
            .unwrap_err();
        assert_matches!(err, AppError::Validation(msg) if msg == "Workout must be at least 30 seconds");

        let user = timers.db.get_user("u1").await.unwrap().unwrap();
        assert!(user.current_workout.is_some());
    }

    #[tokio::test]
    async fn test_late_heartbeat_after_stop_is_ignored() {
        let timers = service().await;
        let start = at("2024-01-15T10:00:00Z");
        timers.start("u1", "Run", start).await.unwrap();
        let recorded = timers.stop("u1", start + Duration::hours(1)).await.unwrap();
        assert_eq!(recorded.user.exp, 1000);

        // A heartbeat sent before the stop lands after it
        let user = timers
            .save_current_workout("u1", Some(running(start, 3598)))
            .await
            .unwrap();
        assert!(user.current_workout.is_none());

        assert_matches!(
            timers.stop("u1", start + Duration::hours(1) + Duration::seconds(5)).await,
            Err(AppError::Validation(msg)) if msg == "No workout in progress"
        );
        let user = timers.db.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.exp, 1000);
        assert_eq!(user.total_workout_seconds, 3600);
    }

    #[tokio::test]
    async fn test_stop_clears_already_recorded_session() {
        let timers = service().await;
        let start = at("2024-01-15T10:00:00Z");
        let mut user = timers.db.get_user("u1").await.unwrap().unwrap();
        user.current_workout = Some(running(start, 600));
        user.last_finalized_start = Some(start.timestamp_millis());
        timers.db.upsert_user(&user).await.unwrap();

        assert_matches!(
            timers.stop("u1", start + Duration::minutes(10)).await,
            Err(AppError::Validation(msg)) if msg == "Workout was already recorded"
        );
        let user = timers.db.get_user("u1").await.unwrap().unwrap();
        assert!(user.current_workout.is_none());
        assert_eq!(user.exp, 0);
    }

    #[tokio::test]
    async fn test_new_session_after_stop_still_saves() {
        let timers = service().await;
        let start = at("2024-01-15T10:00:00Z");
        timers.start("u1", "Run", start).await.unwrap();
        timers.stop("u1", start + Duration::hours(1)).await.unwrap();

        let next = start + Duration::hours(2);
        let user = timers
            .save_current_workout("u1", Some(running(next, 30)))
            .await
            .unwrap();
        assert_eq!(user.current_workout, Some(running(next, 30)));
    }

    #[tokio::test]
    async fn test_stop_with_unrepresentable_end_is_rejected() {
        let timers = service().await;
        let mut user = timers.db.get_user("u1").await.unwrap().unwrap();
        user.current_workout = Some(CurrentWorkout {
            name: "Run".to_string(),
            start_time: DateTime::<Utc>::MAX_UTC.timestamp_millis(),
            elapsed_seconds: 60,
        });
        timers.db.upsert_user(&user).await.unwrap();

        assert_matches!(
            timers.stop("u1", Utc::now()).await,
            Err(AppError::Validation(msg)) if msg == "Invalid workout start time"
        );
    }

    #[test]
    fn test_resume_survives_extreme_start_times() {
        let now = at("2024-01-15T10:00:00Z");
        let ancient = CurrentWorkout {
            name: "Run".to_string(),
            start_time: i64::MIN,
            elapsed_seconds: 0,
        };
        assert_eq!(resume(Some(&ancient), now), TimerState::Abandoned);
    }
}
