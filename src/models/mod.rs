// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod rank;
pub mod user;
pub mod workout;

pub use rank::{rank_for_level, Rank, RANKS};
pub use user::{CurrentWorkout, User};
pub use workout::{Workout, WorkoutDraft};
