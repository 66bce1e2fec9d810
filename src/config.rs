// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use chrono::{FixedOffset, Offset, Utc};
use std::env;

/// Which store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                reason: format!("expected 'firestore' or 'memory', got '{}'", other),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub storage_backend: StorageBackend,
    /// Minutes east of UTC that define the calendar day for the daily cap
    pub day_boundary_offset_minutes: i32,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Firestore,
        };

        let day_boundary_offset_minutes = match env::var("DAY_BOUNDARY_UTC_OFFSET_MINUTES") {
            Ok(raw) => parse_offset_minutes(&raw)?,
            Err(_) => 0,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend,
            day_boundary_offset_minutes,
        })
    }

    /// Memory-backed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            day_boundary_offset_minutes: 0,
        }
    }

    /// The fixed offset used for calendar-day boundaries.
    pub fn day_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.day_boundary_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

fn parse_offset_minutes(raw: &str) -> Result<i32, ConfigError> {
    let minutes: i32 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name: "DAY_BOUNDARY_UTC_OFFSET_MINUTES",
        reason: format!("'{}' is not an integer", raw),
    })?;
    if !(-1439..=1439).contains(&minutes) {
        return Err(ConfigError::Invalid {
            name: "DAY_BOUNDARY_UTC_OFFSET_MINUTES",
            reason: format!("{} is outside -1439..=1439", minutes),
        });
    }
    Ok(minutes)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
