// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user write serialization.
//!
//! Every read-modify-write of a user's profile (EXP, level, current workout,
//! username) happens while holding that user's guard, so concurrent requests
//! from several devices apply one after another instead of overwriting each
//! other.
//!
//! An entry lives only while someone holds or waits for that user's lock,
//! so the map stays bounded by in-flight requests.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared per-user locks, keyed by user id.
#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`.
    pub async fn acquire(&self, user_id: &str) -> UserGuard {
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;
        UserGuard {
            user_id: user_id.to_string(),
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of users with a lock currently held or awaited.
    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }
}

/// Proof of exclusive access to one user. Released on drop.
pub struct UserGuard {
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl UserGuard {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody holds or waits.
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
