// Wire types for the Calendar v3 events resource.
//
// Only the fields this service reads are modeled; attendees, reminders and
// recurrence stay as raw JSON since their shape belongs to the provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Google's event time: either a dateTime or, for all-day events, a date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// Set instead of date_time for all-day events (YYYY-MM-DD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn timed(date_time: String, time_zone: String) -> Self {
        Self {
            date_time: Some(date_time),
            date: None,
            time_zone: Some(time_zone),
        }
    }

    /// Resolve to UTC; all-day dates become midnight UTC
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        if let Some(dt) = &self.date_time {
            return crate::time::parse_iso8601(dt);
        }
        let date: chrono::NaiveDate = self.date.as_deref()?.parse().ok()?;
        Some(date.and_hms_opt(0, 0, 0)?.and_utc())
    }
}

/// An event as returned by the provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    pub etag: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transparency: Option<String>,
    pub html_link: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Option<serde_json::Value>,
    #[serde(default)]
    pub reminders: Option<serde_json::Value>,
    #[serde(default)]
    pub recurrence: Option<serde_json::Value>,
}

impl GoogleEvent {
    /// All-day events carry a date instead of a dateTime
    pub fn is_all_day(&self) -> bool {
        self.start.date.is_some()
    }
}

/// Request body for insert/update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventBody {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<serde_json::Value>,
}

/// Response envelope for the list call
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}
