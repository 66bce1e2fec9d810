// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitness-RPG: turn workout time into EXP, levels and ranks
//!
//! This crate provides the backend API for recording workouts, keeping an
//! in-progress timer alive across reloads, and deriving each user's level
//! and rank from their cumulative EXP.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{ProfileService, TimerService, UserLocks, WorkoutService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub profiles: ProfileService,
    pub workouts: WorkoutService,
    pub timers: TimerService,
}

impl AppState {
    /// Wire the services around an opened database.
    ///
    /// All services share one set of per-user locks.
    pub fn new(config: Config, db: Database) -> Self {
        let locks = UserLocks::new();
        let workouts = WorkoutService::new(db.clone(), locks.clone(), config.day_offset());
        let timers = TimerService::new(db.clone(), locks.clone(), workouts.clone());
        let profiles = ProfileService::new(db.clone(), locks);
        Self {
            config,
            db,
            profiles,
            workouts,
            timers,
        }
    }
}
