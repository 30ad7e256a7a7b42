// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub timezone: String,
    pub status: String,
    pub transparency: String,
    pub calendar_id: String,
    pub html_link: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub etag: String,
    pub attendees: sqlx::types::JsonValue,
    pub reminders: sqlx::types::JsonValue,
    pub recurrence: sqlx::types::JsonValue,
    pub owner_id: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Full column set for inserts; every value comes from the provider response
#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub timezone: String,
    pub status: String,
    pub transparency: String,
    pub calendar_id: String,
    pub html_link: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub etag: String,
    pub attendees: serde_json::Value,
    pub reminders: serde_json::Value,
    pub recurrence: serde_json::Value,
    pub owner_id: Uuid,
}

/// Partial update; None leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateEvent {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub transparency: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Listing filter for an owner's events
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Inclusive lower bound on start_time
    pub starts_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on end_time
    pub ends_before: Option<DateTime<Utc>>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}
