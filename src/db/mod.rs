// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Database`] is opened once at startup, handed to the services and closed
//! on shutdown. Production runs on Firestore; the in-memory backend serves
//! local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use chrono::{DateTime, Utc};

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::models::{User, Workout};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const WORKOUTS: &str = "workouts";
}

/// Store handle with an explicit open/close lifecycle.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Open the backend selected in the configuration.
    pub async fn open(config: &Config) -> Result<Self> {
        let db = match config.storage_backend {
            StorageBackend::Firestore => {
                Database::Firestore(FirestoreDb::new(&config.gcp_project_id).await?)
            }
            StorageBackend::Memory => Database::Memory(MemoryDb::new()),
        };
        tracing::info!(backend = db.backend_name(), "Database opened");
        Ok(db)
    }

    /// Release the store. Later operations on clones of this handle fail.
    pub async fn close(self) {
        let backend = self.backend_name();
        match self {
            Database::Firestore(db) => db.close(),
            Database::Memory(db) => db.close().await,
        }
        tracing::info!(backend, "Database closed");
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Database::Firestore(_) => "firestore",
            Database::Memory(_) => "memory",
        }
    }

    /// Cheap connectivity check for the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        match self {
            Database::Firestore(db) => db.ping().await,
            Database::Memory(db) => db.ping().await,
        }
    }

    // ─── Users ───────────────────────────────────────────────────

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        match self {
            Database::Firestore(db) => db.get_user(user_id).await,
            Database::Memory(db) => db.get_user(user_id).await,
        }
    }

    /// Create or replace a user document.
    pub async fn upsert_user(&self, user: &User) -> Result<()> {
        match self {
            Database::Firestore(db) => db.upsert_user(user).await,
            Database::Memory(db) => db.upsert_user(user).await,
        }
    }

    // ─── Workouts ────────────────────────────────────────────────

    /// Sum of `durationSeconds` over the user's workouts with `startedAt`
    /// inside `[day_start, day_end]`.
    pub async fn daily_workout_seconds(
        &self,
        user_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<u64> {
        match self {
            Database::Firestore(db) => db.daily_workout_seconds(user_id, day_start, day_end).await,
            Database::Memory(db) => db.daily_workout_seconds(user_id, day_start, day_end).await,
        }
    }

    /// Most recent workouts first, at most `limit`.
    pub async fn recent_workouts(&self, user_id: &str, limit: u32) -> Result<Vec<Workout>> {
        match self {
            Database::Firestore(db) => db.recent_workouts(user_id, limit).await,
            Database::Memory(db) => db.recent_workouts(user_id, limit).await,
        }
    }

    /// Atomically insert `workout` and store the updated `user`.
    ///
    /// Either both writes land or neither does.
    pub async fn commit_workout(&self, workout: &Workout, user: &User) -> Result<()> {
        match self {
            Database::Firestore(db) => db.commit_workout(workout, user).await,
            Database::Memory(db) => db.commit_workout(workout, user).await,
        }
    }
}
