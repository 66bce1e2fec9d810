// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{User, Workout};

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, User>,
    /// Workouts per user id, in insertion order
    workouts: HashMap<String, Vec<Workout>>,
    closed: bool,
}

impl MemoryState {
    fn check_open(&self) -> Result<(), AppError> {
        if self.closed {
            return Err(AppError::Database("Database is closed".to_string()));
        }
        Ok(())
    }
}

/// In-memory database. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.closed = true;
        state.users.clear();
        state.workouts.clear();
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.state.read().await.check_open()
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        state.check_open()?;
        Ok(state.users.get(user_id).cloned())
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state.check_open()?;
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    pub async fn daily_workout_seconds(
        &self,
        user_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let state = self.state.read().await;
        state.check_open()?;
        Ok(state
            .workouts
            .get(user_id)
            .map(|workouts| {
                workouts
                    .iter()
                    .filter(|w| w.started_at >= day_start && w.started_at <= day_end)
                    .map(|w| w.duration_seconds)
                    .sum()
            })
            .unwrap_or(0))
    }

    pub async fn recent_workouts(&self, user_id: &str, limit: u32) -> Result<Vec<Workout>, AppError> {
        let state = self.state.read().await;
        state.check_open()?;
        let mut workouts = state.workouts.get(user_id).cloned().unwrap_or_default();
        workouts.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        workouts.truncate(limit as usize);
        Ok(workouts)
    }

    pub async fn commit_workout(&self, workout: &Workout, user: &User) -> Result<(), AppError> {
        // Both writes happen under one write guard.
        let mut state = self.state.write().await;
        state.check_open()?;
        state
            .workouts
            .entry(workout.user_id.clone())
            .or_default()
            .push(workout.clone());
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}
