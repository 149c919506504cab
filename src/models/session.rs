//! Study-session records and their moderation status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Event;

/// Moderation status of a study session.
///
/// Discovery always creates `Pending`; the moderation flow (outside this
/// crate) moves records to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::validation(format!(
                "Unknown session status: {other}"
            ))),
        }
    }
}

/// A persisted study-session record.
///
/// Serializes with camelCase attribute names because the website reads the
/// same table: `id, title, url, datetime, endDatetime, status, createdAt,
/// updatedAt`. `endDatetime` is omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    /// Generated UUID
    pub id: String,

    /// Session title
    pub title: String,

    /// connpass event URL, the natural key for dedupe
    pub url: String,

    /// Session start
    pub datetime: DateTime<FixedOffset>,

    /// Session end, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<FixedOffset>>,

    /// Moderation status
    pub status: SessionStatus,

    /// Record creation time
    pub created_at: DateTime<Utc>,

    /// Record update time
    pub updated_at: DateTime<Utc>,
}

/// A study session that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudySession {
    pub title: String,
    pub url: String,
    pub datetime: DateTime<FixedOffset>,
    pub end_datetime: Option<DateTime<FixedOffset>>,
}

impl NewStudySession {
    /// Turn this into a full record: generated id, `pending` status, and
    /// creation timestamps.
    pub fn into_session(self) -> StudySession {
        let now = Utc::now();
        StudySession {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            url: self.url,
            datetime: self.datetime,
            end_datetime: self.end_datetime,
            status: SessionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Event> for NewStudySession {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            url: event.url.clone(),
            datetime: event.started_at,
            end_datetime: event.ended_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new_session() -> NewStudySession {
        NewStudySession {
            title: "広島IT勉強会 #12".to_string(),
            url: "https://hiroshima-it.connpass.com/event/364/".to_string(),
            datetime: DateTime::parse_from_rfc3339("2026-03-14T19:00:00+09:00").unwrap(),
            end_datetime: None,
        }
    }

    #[test]
    fn into_session_assigns_pending_and_id() {
        let session = sample_new_session().into_session();
        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.created_at, session.updated_at);
        assert!(Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn into_session_generates_distinct_ids() {
        let a = sample_new_session().into_session();
        let b = sample_new_session().into_session();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_camel_case_without_missing_end() {
        let session = sample_new_session().into_session();
        let value = serde_json::to_value(&session).unwrap();

        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("endDatetime").is_none());
        assert_eq!(value["status"], "pending");
    }

    #[test]
    fn serializes_end_datetime_when_present() {
        let mut new_session = sample_new_session();
        new_session.end_datetime =
            Some(DateTime::parse_from_rfc3339("2026-03-14T21:00:00+09:00").unwrap());

        let value = serde_json::to_value(new_session.into_session()).unwrap();
        assert!(value.get("endDatetime").is_some());
    }

    #[test]
    fn new_session_from_event_copies_fields() {
        let event = Event {
            id: 9,
            title: "もくもく会".to_string(),
            url: "https://connpass.com/event/9/".to_string(),
            started_at: DateTime::parse_from_rfc3339("2026-01-10T10:00:00+09:00").unwrap(),
            ended_at: Some(DateTime::parse_from_rfc3339("2026-01-10T12:00:00+09:00").unwrap()),
            description: String::new(),
        };

        let new_session = NewStudySession::from(&event);
        assert_eq!(new_session.title, event.title);
        assert_eq!(new_session.url, event.url);
        assert_eq!(new_session.datetime, event.started_at);
        assert_eq!(new_session.end_datetime, event.ended_at);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Approved,
            SessionStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
        assert!("archived".parse::<SessionStatus>().is_err());
    }
}
