// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profiles: get-or-create, username changes and the progress view.

use chrono::Utc;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{rank_for_level, Rank, User};
use crate::services::leveling::LevelProgress;
use crate::services::locks::UserLocks;
use crate::services::{require_user, LogFailure};
use crate::time_utils::format_utc_rfc3339_millis;

/// Profile with its derived rank and level progress.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct UserProfile {
    pub user: User,
    pub rank: Rank,
    pub progress: LevelProgress,
}

impl UserProfile {
    pub fn for_user(user: User) -> Self {
        let progress = LevelProgress::from_exp(user.exp);
        Self {
            rank: *rank_for_level(progress.level),
            progress,
            user,
        }
    }
}

#[derive(Clone)]
pub struct ProfileService {
    db: Database,
    locks: UserLocks,
}

impl ProfileService {
    pub fn new(db: Database, locks: UserLocks) -> Self {
        Self { db, locks }
    }

    /// Return the existing user, or create a fresh level-1 profile.
    ///
    /// The flag is `true` when the user was created by this call. Existing
    /// profiles are returned untouched.
    pub async fn get_or_create(
        &self,
        user_id: &str,
        email: &str,
        username: &str,
    ) -> Result<(User, bool)> {
        let _guard = self.locks.acquire(user_id).await;

        let existing = self
            .db
            .get_user(user_id)
            .await
            .log_failure(user_id, "get_or_create_user")?;
        if let Some(existing) = existing {
            return Ok((existing, false));
        }

        let user = User::new(
            user_id.to_string(),
            email.to_string(),
            username.trim().to_string(),
            format_utc_rfc3339_millis(Utc::now()),
        );
        self.db
            .upsert_user(&user)
            .await
            .log_failure(user_id, "get_or_create_user")?;
        tracing::info!(user_id, "User created");
        Ok((user, true))
    }

    pub async fn update_username(&self, user_id: &str, username: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        let _guard = self.locks.acquire(user_id).await;
        let mut user = require_user(&self.db, user_id, "update_username").await?;
        if user.username != username {
            user.username = username.to_string();
            self.db
                .upsert_user(&user)
                .await
                .log_failure(user_id, "update_username")?;
        }
        Ok(user)
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile> {
        let user = require_user(&self.db, user_id, "get_profile").await?;
        Ok(UserProfile::for_user(user))
    }
}
