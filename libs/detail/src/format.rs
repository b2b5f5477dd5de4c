//! Display formatting for video metadata
//!
//! Every formatter here is total: missing or unparsable input produces a
//! placeholder, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::models::RawVideoRecord;

/// Shown in place of a date that is absent or cannot be parsed
pub const DATE_PLACEHOLDER: &str = "-";

/// Number of components kept in a relative date label
pub const DATE_COMPONENTS: usize = 3;

const UNITS: [(&str, i64); 6] = [
    ("year", 365 * 24 * 60 * 60),
    ("month", 30 * 24 * 60 * 60),
    ("day", 24 * 60 * 60),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Format a duration in seconds as `HH:MM:SS`
///
/// Absent, zero, negative and non-finite durations all mean "no duration
/// known" and give an empty string. Hours are not capped at two digits.
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s > 0.0) else {
        return String::new();
    };

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse the date formats the backend is known to emit
///
/// RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC) or a bare
/// `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

/// Relative label for `raw` as seen from `now`, e.g. "2 years, 3 months, 4 days ago"
///
/// Only the first `max_components` non-zero units are kept. Instants in the
/// future or less than a second old read "just now".
pub fn published_on_date(raw: Option<&str>, now: DateTime<Utc>, max_components: usize) -> String {
    let Some(date) = raw.and_then(parse_date) else {
        return DATE_PLACEHOLDER.to_string();
    };

    let mut remaining = (now - date).num_seconds();
    if remaining < 1 {
        return "just now".to_string();
    }

    let mut parts = Vec::with_capacity(max_components);
    for (unit, unit_seconds) in UNITS {
        if parts.len() == max_components {
            break;
        }

        let count = remaining / unit_seconds;
        remaining %= unit_seconds;

        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            parts.push(format!("{} {}{}", count, unit, plural));
        }
    }

    if parts.is_empty() {
        return "just now".to_string();
    }

    format!("{} ago", parts.join(", "))
}

/// Prefix a relative path with the base path
///
/// Empty or absent paths stay unresolved.
pub fn resolve_asset(base_url: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", base_url, p))
}

/// Absolute image asset URLs of a video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoImageAssets {
    pub video_thumbnail_url: Option<String>,
    pub video_thumbnail_time: Option<String>,
    pub video_sprites_url: Option<String>,
    pub video_preview_url: Option<String>,
    pub video_poster_url: Option<String>,
}

impl VideoImageAssets {
    pub fn resolve(record: Option<&RawVideoRecord>, base_url: &str) -> Self {
        let Some(record) = record else {
            return Self::default();
        };

        Self {
            video_thumbnail_url: resolve_asset(base_url, record.thumbnail_url.as_deref()),
            video_thumbnail_time: resolve_asset(base_url, record.thumbnail_time.as_deref()),
            video_sprites_url: resolve_asset(base_url, record.sprites_url.as_deref()),
            video_preview_url: resolve_asset(base_url, record.preview_url.as_deref()),
            video_poster_url: resolve_asset(base_url, record.poster_url.as_deref()),
        }
    }
}
