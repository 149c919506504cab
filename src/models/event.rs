//! connpass event model.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// An event returned by the connpass search API.
///
/// Source records are read-only and live only for the duration of one
/// discovery run; the persisted form is [`crate::models::StudySession`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Event {
    /// connpass event id
    pub id: u64,

    /// Event title
    pub title: String,

    /// Canonical event URL, used as the dedupe key
    pub url: String,

    /// Event start (connpass reports RFC 3339 with a +09:00 offset)
    pub started_at: DateTime<FixedOffset>,

    /// Event end, when the organizer set one
    #[serde(default)]
    pub ended_at: Option<DateTime<FixedOffset>>,

    /// Event description (may be empty)
    #[serde(default)]
    pub description: String,
}
