// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout accounting: daily and retention limits, EXP awards and level
//! recomputation for completed workouts.
//!
//! Recording runs under the user's lock and ends in a single atomic commit of
//! the new workout plus the updated profile, so concurrent stops from several
//! devices never lose an EXP increment.

use chrono::FixedOffset;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, LimitKind, Result};
use crate::models::{User, Workout, WorkoutDraft};
use crate::services::leveling::{exp_for_duration, level_for_cumulative_exp};
use crate::services::locks::{UserGuard, UserLocks};
use crate::services::{require_user, LogFailure};
use crate::time_utils::local_day_bounds;

/// Shortest workout that can be recorded.
pub const MIN_WORKOUT_SECONDS: u64 = 30;
/// Most seconds a user may log per calendar day (6 hours).
pub const DAILY_LIMIT_SECONDS: u64 = 21_600;
/// Hard cap on stored workouts per user.
pub const MAX_STORED_WORKOUTS: u32 = 500;
/// Size of the recent-workouts listing.
pub const RECENT_WORKOUTS_LIMIT: u32 = 10;

/// Result of an accepted workout.
#[derive(Debug, Clone)]
pub struct RecordedWorkout {
    pub workout: Workout,
    pub user: User,
}

/// Apply one accepted workout to a user profile.
///
/// `daily_seconds` is what the user has already logged on the workout's
/// calendar day. Returns the record to insert and the profile to store, or
/// the limit that rejects the workout. Nothing here touches storage.
pub fn plan_workout(
    mut user: User,
    daily_seconds: u64,
    draft: WorkoutDraft,
    workout_id: String,
) -> Result<(Workout, User)> {
    let duration = draft.duration_seconds();

    if daily_seconds.saturating_add(duration) > DAILY_LIMIT_SECONDS {
        return Err(AppError::LimitExceeded(LimitKind::DailyDuration));
    }

    if user.workout_count >= MAX_STORED_WORKOUTS {
        return Err(AppError::LimitExceeded(LimitKind::WorkoutRetention));
    }

    user.total_workout_seconds = user.total_workout_seconds.saturating_add(duration);
    user.exp = user.exp.saturating_add(exp_for_duration(duration));
    user.level = level_for_cumulative_exp(user.exp);
    user.current_workout = None;
    let started_ms = draft.started_at().timestamp_millis();
    user.last_finalized_start = Some(match user.last_finalized_start {
        Some(prev) => prev.max(started_ms),
        None => started_ms,
    });
    user.workout_count += 1;

    let workout = draft.into_workout(workout_id, user.id.clone());
    Ok((workout, user))
}

/// Records completed workouts and lists recent ones.
#[derive(Clone)]
pub struct WorkoutService {
    db: Database,
    locks: UserLocks,
    day_offset: FixedOffset,
}

impl WorkoutService {
    pub fn new(db: Database, locks: UserLocks, day_offset: FixedOffset) -> Self {
        Self {
            db,
            locks,
            day_offset,
        }
    }

    /// Validate limits, store the workout and return the updated profile.
    pub async fn record_workout(&self, user_id: &str, draft: WorkoutDraft) -> Result<RecordedWorkout> {
        let guard = self.locks.acquire(user_id).await;
        self.record_workout_locked(&guard, draft).await
    }

    /// Same as [`record_workout`](Self::record_workout) for a caller that
    /// already holds the user's lock.
    pub(crate) async fn record_workout_locked(
        &self,
        guard: &UserGuard,
        draft: WorkoutDraft,
    ) -> Result<RecordedWorkout> {
        let user_id = guard.user_id();
        let user = require_user(&self.db, user_id, "record_workout").await?;
        let previous_level = user.level;

        let (day_start, day_end) = local_day_bounds(draft.started_at(), self.day_offset);
        let daily_seconds = self
            .db
            .daily_workout_seconds(user_id, day_start, day_end)
            .await
            .log_failure(user_id, "record_workout")?;

        let duration_seconds = draft.duration_seconds();
        let (workout, user) =
            match plan_workout(user, daily_seconds, draft, Uuid::now_v7().to_string()) {
                Ok(planned) => planned,
                Err(e) => {
                    tracing::debug!(
                        user_id,
                        duration_seconds,
                        daily_seconds,
                        error = %e,
                        "Workout rejected"
                    );
                    return Err(e);
                }
            };

        self.db
            .commit_workout(&workout, &user)
            .await
            .log_failure(user_id, "record_workout")?;

        tracing::info!(
            user_id,
            workout_id = %workout.id,
            duration_seconds,
            exp = user.exp,
            level = user.level,
            "Workout recorded"
        );
        if user.level > previous_level {
            tracing::info!(user_id, from = previous_level, to = user.level, "Level up");
        }

        Ok(RecordedWorkout { workout, user })
    }

    /// The user's most recent workouts, newest first.
    pub async fn recent_workouts(&self, user_id: &str) -> Result<Vec<Workout>> {
        require_user(&self.db, user_id, "recent_workouts").await?;
        self.db
            .recent_workouts(user_id, RECENT_WORKOUTS_LIMIT)
            .await
            .log_failure(user_id, "recent_workouts")
    }
}
