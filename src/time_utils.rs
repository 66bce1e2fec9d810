// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and calendar-day windows.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z` suffix.
///
/// The output is fixed-width, so stored strings sort chronologically.
pub fn format_utc_rfc3339_millis(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert epoch milliseconds to a UTC timestamp.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Inclusive bounds `[00:00:00.000, 23:59:59.999]` of the calendar day that
/// contains `instant`, where days are measured in the given fixed offset.
pub fn local_day_bounds(
    instant: DateTime<Utc>,
    offset: FixedOffset,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_date = instant.with_timezone(&offset).date_naive();
    let midnight = local_date.and_time(NaiveTime::MIN);
    // Fixed offsets have no gaps or folds, so the mapping is always single.
    let start = offset
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(instant);
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// Serde adapter storing timestamps as fixed-width RFC3339 strings.
pub mod rfc3339_millis {
    use super::format_utc_rfc3339_millis;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_utc_rfc3339_millis(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
