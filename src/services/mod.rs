// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounting;
pub mod leveling;
pub mod locks;
pub mod profile;
pub mod timer;

pub use accounting::{RecordedWorkout, WorkoutService};
pub use locks::{UserGuard, UserLocks};
pub use profile::{ProfileService, UserProfile};
pub use timer::{ResumedTimer, TimerService, TimerState};

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::User;

/// Log server-side failures with the user and operation they happened in.
pub(crate) trait LogFailure {
    fn log_failure(self, user_id: &str, operation: &'static str) -> Self;
}

impl<T> LogFailure for Result<T> {
    fn log_failure(self, user_id: &str, operation: &'static str) -> Self {
        if let Err(e) = &self {
            if !e.is_client_error() {
                tracing::error!(user_id, operation, error = %e, "Storage operation failed");
            }
        }
        self
    }
}

/// Load a user, turning a missing profile into `NotFound`.
pub(crate) async fn require_user(db: &Database, user_id: &str, operation: &'static str) -> Result<User> {
    match db.get_user(user_id).await.log_failure(user_id, operation)? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!(user_id, operation, "User not found");
            Err(AppError::NotFound("User not found".to_string()))
        }
    }
}
