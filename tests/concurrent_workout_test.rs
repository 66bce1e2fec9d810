// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concurrent stops from several devices must not lose EXP or overshoot the
//! daily cap, and a heartbeat racing a stop must not reopen the session.

use axum::http::StatusCode;
use fitness_rpg::error::{AppError, LimitKind};
use fitness_rpg::models::{CurrentWorkout, WorkoutDraft};
use fitness_rpg::services::leveling::exp_for_duration;
use std::sync::Arc;

mod common;
use common::{create_test_app, create_user, send, workout_body};

const NUM_CONCURRENT_WORKOUTS: u64 = 10;

fn draft(started_at: &str, seconds: u64) -> WorkoutDraft {
    let start = chrono::DateTime::parse_from_rfc3339(started_at)
        .unwrap()
        .with_timezone(&chrono::Utc);
    WorkoutDraft::new(
        "Run",
        seconds,
        start,
        start + chrono::Duration::seconds(seconds as i64),
    )
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_are_linearizable() {
    let (app, state) = create_test_app();
    create_user(&app, "u1").await;

    let mut handles = vec![];
    for i in 0..NUM_CONCURRENT_WORKOUTS {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            let started_at = format!("2024-01-15T{:02}:00:00Z", i);
            state
                .workouts
                .record_workout("u1", draft(&started_at, 600))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("record should succeed");
    }

    let user = state.db.get_user("u1").await.unwrap().unwrap();
    assert_eq!(user.total_workout_seconds, NUM_CONCURRENT_WORKOUTS * 600);
    assert_eq!(user.exp, NUM_CONCURRENT_WORKOUTS * exp_for_duration(600));
    assert_eq!(user.workout_count, NUM_CONCURRENT_WORKOUTS as u32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_respect_daily_cap() {
    let (app, state) = create_test_app();
    create_user(&app, "u1").await;

    // 10 x 3000s on one day: only 7 fit under 21600s.
    let mut handles = vec![];
    for i in 0..NUM_CONCURRENT_WORKOUTS {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            let started_at = format!("2024-01-15T{:02}:00:00Z", i);
            state
                .workouts
                .record_workout("u1", draft(&started_at, 3000))
                .await
        }));
    }

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::LimitExceeded(LimitKind::DailyDuration)) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(accepted, 7);
    assert_eq!(rejected, 3);

    let user = state.db.get_user("u1").await.unwrap().unwrap();
    assert_eq!(user.total_workout_seconds, 21_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timer_clear_racing_record_keeps_both_awards() {
    let (app, state) = create_test_app();
    create_user(&app, "u1").await;

    let (status, _) = send(
        &app,
        "POST",
        "/workouts",
        Some(workout_body("u1", "2024-01-15T10:00:00Z", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A clear racing a record: afterwards the timer must be cleared and the
    // EXP from both records present.
    let a = {
        let state = Arc::clone(&state);
        tokio::spawn(async move { state.timers.save_current_workout("u1", None).await })
    };
    let b = {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            state
                .workouts
                .record_workout("u1", draft("2024-01-15T12:00:00Z", 3600))
                .await
        })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let user = state.db.get_user("u1").await.unwrap().unwrap();
    assert!(user.current_workout.is_none());
    assert_eq!(user.exp, exp_for_duration(60) + 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_heartbeat_racing_stop_records_session_once() {
    let (app, state) = create_test_app();
    create_user(&app, "u1").await;

    let start = chrono::DateTime::parse_from_rfc3339("2024-01-15T10:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let heartbeat = |elapsed_seconds| CurrentWorkout {
        name: "Run".to_string(),
        start_time: start.timestamp_millis(),
        elapsed_seconds,
    };
    state
        .timers
        .save_current_workout("u1", Some(heartbeat(3590)))
        .await
        .unwrap();

    let stop_at = start + chrono::Duration::seconds(3600);
    let stop = {
        let state = Arc::clone(&state);
        tokio::spawn(async move { state.timers.stop("u1", stop_at).await })
    };
    let late = {
        let state = Arc::clone(&state);
        let current = heartbeat(3598);
        tokio::spawn(async move { state.timers.save_current_workout("u1", Some(current)).await })
    };
    stop.await.unwrap().unwrap();
    late.await.unwrap().unwrap();

    // Whichever order they ran in, the session is closed and counted once.
    let second = state.timers.stop("u1", stop_at + chrono::Duration::seconds(5)).await;
    assert!(matches!(second, Err(AppError::Validation(_))), "{second:?}");

    let user = state.db.get_user("u1").await.unwrap().unwrap();
    assert!(user.current_workout.is_none());
    assert_eq!(user.exp, exp_for_duration(3600));
    assert_eq!(user.workout_count, 1);
}
