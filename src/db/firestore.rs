// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, EXP, level, current workout)
//! - Workouts (completed sessions, queried by owner and start time)

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{User, Workout};
use crate::time_utils::format_utc_rfc3339_millis;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    closed: Arc<AtomicBool>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self::with_client(client))
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self::with_client(client))
    }

    fn with_client(client: firestore::FirestoreDb) -> Self {
        Self {
            client: Some(client),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a disconnected client (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the handle closed. Clones stop issuing requests.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Helper to get the client or return an error if offline or closed.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database is closed".to_string()));
        }
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Issue a one-document read against `users`.
    pub async fn ping(&self) -> Result<(), AppError> {
        let _: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// Sum durations of workouts whose `startedAt` falls in `[day_start, day_end]`.
    ///
    /// `startedAt` is stored as a fixed-width UTC string, so the string range
    /// filter is a time range filter.
    pub async fn daily_workout_seconds(
        &self,
        user_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let user_id = user_id.to_string();
        let start = format_utc_rfc3339_millis(day_start);
        let end = format_utc_rfc3339_millis(day_end);

        let workouts: Vec<Workout> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("startedAt").greater_than_or_equal(start.clone()),
                    q.field("startedAt").less_than_or_equal(end.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(workouts.iter().map(|w| w.duration_seconds).sum())
    }

    /// Most recent workouts for a user, newest first.
    pub async fn recent_workouts(&self, user_id: &str, limit: u32) -> Result<Vec<Workout>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([("startedAt", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Workout Commit ───────────────────────────────────

    /// Store a workout and the updated user profile in one transaction.
    ///
    /// Callers hold the per-user lock, so the user document read that
    /// produced `user` cannot have been overwritten by this process.
    pub async fn commit_workout(&self, workout: &Workout, user: &User) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::WORKOUTS)
            .document_id(&workout.id)
            .object(workout)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add workout to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add user to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            user_id = %user.id,
            workout_id = %workout.id,
            "Workout committed atomically"
        );

        Ok(())
    }
}
