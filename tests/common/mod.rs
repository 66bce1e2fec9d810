// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fitness_rpg::config::Config;
use fitness_rpg::db::{Database, FirestoreDb, MemoryDb};
use fitness_rpg::routes::create_router;
use fitness_rpg::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Connect to the Firestore emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique id per call, for isolation between tests sharing the emulator.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::now_v7())
}

/// Create a test app backed by a fresh in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_app_with_db(Database::Memory(MemoryDb::new()))
}

/// Create a test app whose store fails every operation.
#[allow(dead_code)]
pub fn create_offline_app() -> (Router, Arc<AppState>) {
    create_app_with_db(Database::Firestore(FirestoreDb::new_mock()))
}

#[allow(dead_code)]
pub fn create_app_with_db(db: Database) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), db));
    (create_router(state.clone()), state)
}

/// Send a request with an optional JSON body and decode the JSON response.
#[allow(dead_code)]
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Create a user through the API and return its id.
#[allow(dead_code)]
pub async fn create_user(app: &Router, id: &str) -> Value {
    let (status, user) = send(
        app,
        "POST",
        "/users",
        Some(serde_json::json!({
            "id": id,
            "email": format!("{}@example.com", id),
            "username": "Hunter"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user
}

/// Body for `POST /workouts` starting at `started_at` and lasting `seconds`.
#[allow(dead_code)]
pub fn workout_body(user_id: &str, started_at: &str, seconds: i64) -> Value {
    let start = chrono::DateTime::parse_from_rfc3339(started_at).unwrap();
    let end = start + chrono::Duration::seconds(seconds);
    serde_json::json!({
        "userId": user_id,
        "name": "Run",
        "durationSeconds": seconds,
        "startedAt": started_at,
        "endedAt": end.to_rfc3339(),
    })
}
