// Event DTOs for public API
//
// An Event mirrors a Google Calendar event: the id, html_link, created,
// updated and etag fields are assigned by the provider, and the attendees,
// reminders and recurrence blobs keep whatever shape the provider returned.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A calendar event synchronized with Google Calendar
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Google Calendar event id
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    /// IANA timezone name (e.g. "Africa/Nairobi")
    pub timezone: String,
    pub status: EventStatus,
    pub transparency: Transparency,
    pub calendar_id: String,
    /// URL to view the event in Google Calendar
    pub html_link: String,
    /// Provider-side creation time
    pub created: DateTime<Utc>,
    /// Provider-side last update time
    pub updated: DateTime<Utc>,
    /// ETag for concurrency control
    pub etag: String,
    /// Attendee objects as returned by the provider
    pub attendees: serde_json::Value,
    /// Reminder settings as returned by the provider
    pub reminders: serde_json::Value,
    /// RRULE strings for repeating events
    pub recurrence: serde_json::Value,
    pub owner_id: Uuid,
}

impl Event {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence
            .as_array()
            .map(|rules| !rules.is_empty())
            .unwrap_or(false)
    }

    /// Human-readable summary of the event's recurrence rules
    pub fn recurrence_pattern(&self) -> &'static str {
        let Some(rules) = self.recurrence.as_array().filter(|r| !r.is_empty()) else {
            return "No recurrence";
        };
        for rule in rules.iter().filter_map(|r| r.as_str()) {
            if rule.contains("FREQ=DAILY") {
                return "Daily";
            } else if rule.contains("FREQ=WEEKLY") {
                return "Weekly";
            } else if rule.contains("FREQ=MONTHLY") {
                return "Monthly";
            } else if rule.contains("FREQ=YEARLY") {
                return "Yearly";
            }
        }
        "Custom recurrence"
    }

    /// Email addresses of all attendees that carry one
    pub fn attendee_emails(&self) -> Vec<String> {
        self.attendees
            .as_array()
            .map(|attendees| {
                attendees
                    .iter()
                    .filter_map(|a| a.get("email").and_then(|e| e.as_str()))
                    .map(|e| e.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl Default for EventStatus {
    fn default() -> Self {
        EventStatus::Confirmed
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Confirmed => write!(f, "confirmed"),
            EventStatus::Tentative => write!(f, "tentative"),
            EventStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(EventStatus::Confirmed),
            "tentative" => Ok(EventStatus::Tentative),
            "cancelled" => Ok(EventStatus::Cancelled),
            _ => Err(format!("Unknown event status: {}", s)),
        }
    }
}

/// Whether an event blocks time on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Transparency {
    /// Blocks time on the calendar
    Opaque,
    /// Does not block time
    Transparent,
}

impl Default for Transparency {
    fn default() -> Self {
        Transparency::Opaque
    }
}

impl std::fmt::Display for Transparency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transparency::Opaque => write!(f, "opaque"),
            Transparency::Transparent => write!(f, "transparent"),
        }
    }
}

impl std::str::FromStr for Transparency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opaque" => Ok(Transparency::Opaque),
            "transparent" => Ok(Transparency::Transparent),
            _ => Err(format!("Unknown transparency: {}", s)),
        }
    }
}

/// Request to create an event
///
/// summary, start_time and end_time are optional at the wire level so a
/// missing field surfaces as a validation error rather than a
/// deserialization failure.
///
/// attendees, reminders and recurrence accept both the Google Calendar
/// shapes and the keyed-map shapes some mobile clients send; see
/// [`CreateEventRequest::normalized_attendees`] and friends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Team standup")]
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// ISO 8601 timestamp
    #[schema(example = "2025-08-20T18:00:00Z")]
    pub start_time: Option<String>,
    /// ISO 8601 timestamp
    #[schema(example = "2025-08-20T19:00:00Z")]
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub transparency: Option<Transparency>,
    pub calendar_id: Option<String>,
    /// Either `[{"email": ...}]` or `{"attendee_0": {"email": ...}}`
    #[schema(value_type = Object, example = json!([{"email": "jane@example.com"}]))]
    pub attendees: Option<serde_json::Value>,
    /// Either `{"useDefault": true}` style settings or nothing
    #[schema(value_type = Object)]
    pub reminders: Option<serde_json::Value>,
    /// Either `["RRULE:FREQ=WEEKLY"]` or `{"rule": "RRULE:FREQ=WEEKLY"}`
    #[schema(value_type = Object, example = json!(["RRULE:FREQ=WEEKLY"]))]
    pub recurrence: Option<serde_json::Value>,
}

impl CreateEventRequest {
    /// Attendees as a flat list of `{"email": ...}` objects
    pub fn normalized_attendees(&self) -> Vec<serde_json::Value> {
        match &self.attendees {
            Some(serde_json::Value::Array(list)) => list.clone(),
            Some(serde_json::Value::Object(map)) => map
                .values()
                .filter(|a| a.get("email").is_some())
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Recurrence as a flat list of RRULE strings
    pub fn normalized_recurrence(&self) -> Vec<String> {
        match &self.recurrence {
            Some(serde_json::Value::Array(list)) => list
                .iter()
                .filter_map(|r| r.as_str())
                .map(|r| r.to_string())
                .collect(),
            Some(serde_json::Value::Object(map)) => map
                .values()
                .filter_map(|r| r.as_str())
                .filter(|r| r.starts_with("RRULE:"))
                .map(|r| r.to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Reminder settings, kept only when they look like provider settings
    pub fn normalized_reminders(&self) -> Option<serde_json::Value> {
        match &self.reminders {
            Some(serde_json::Value::Object(map))
                if map.contains_key("useDefault") || map.contains_key("overrides") =>
            {
                self.reminders.clone()
            }
            _ => None,
        }
    }
}

/// Request to update an event; only provided fields are changed
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// ISO 8601 timestamp
    pub start_time: Option<String>,
    /// ISO 8601 timestamp
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub transparency: Option<Transparency>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> Event {
        Event {
            id: "evt_1".to_string(),
            summary: "Standup".to_string(),
            description: None,
            location: None,
            start_time: "2025-08-20T18:00:00Z".parse().unwrap(),
            end_time: "2025-08-20T19:30:00Z".parse().unwrap(),
            all_day: false,
            timezone: "UTC".to_string(),
            status: EventStatus::Confirmed,
            transparency: Transparency::Opaque,
            calendar_id: "primary".to_string(),
            html_link: "https://calendar.google.com/event?eid=evt_1".to_string(),
            created: "2025-08-01T00:00:00Z".parse().unwrap(),
            updated: "2025-08-01T00:00:00Z".parse().unwrap(),
            etag: "\"etag1\"".to_string(),
            attendees: json!([
                {"email": "john@example.com", "displayName": "John"},
                {"displayName": "No Email"},
            ]),
            reminders: json!({"useDefault": true}),
            recurrence: json!([]),
            owner_id: Uuid::nil(),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["confirmed", "tentative", "cancelled"] {
            let status: EventStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("deleted".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_transparency_round_trip() {
        for s in ["opaque", "transparent"] {
            let t: Transparency = s.parse().unwrap();
            assert_eq!(t.to_string(), s);
        }
        assert!("busy".parse::<Transparency>().is_err());
    }

    #[test]
    fn test_duration_and_recurrence() {
        let mut event = sample_event();
        assert_eq!(event.duration(), Duration::minutes(90));
        assert!(!event.is_recurring());

        event.recurrence = json!(["RRULE:FREQ=YEARLY"]);
        assert!(event.is_recurring());
    }

    #[test]
    fn test_recurrence_pattern() {
        let mut event = sample_event();
        assert_eq!(event.recurrence_pattern(), "No recurrence");

        for (rule, expected) in [
            ("RRULE:FREQ=DAILY", "Daily"),
            ("RRULE:FREQ=WEEKLY;BYDAY=MO", "Weekly"),
            ("RRULE:FREQ=MONTHLY", "Monthly"),
            ("RRULE:FREQ=YEARLY", "Yearly"),
            ("RRULE:FREQ=HOURLY", "Custom recurrence"),
        ] {
            event.recurrence = json!([rule]);
            assert_eq!(event.recurrence_pattern(), expected);
        }
    }

    #[test]
    fn test_attendee_emails_skips_missing() {
        let event = sample_event();
        assert_eq!(event.attendee_emails(), vec!["john@example.com"]);
    }

    #[test]
    fn test_normalize_attendees_from_map() {
        let req = CreateEventRequest {
            attendees: Some(json!({
                "attendee_0": {"email": "a@example.com"},
                "attendee_1": {"displayName": "no email"},
            })),
            ..Default::default()
        };
        let attendees = req.normalized_attendees();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0]["email"], "a@example.com");
    }

    #[test]
    fn test_normalize_recurrence_from_map() {
        let req = CreateEventRequest {
            recurrence: Some(json!({"rule": "RRULE:FREQ=WEEKLY", "junk": "nope"})),
            ..Default::default()
        };
        assert_eq!(req.normalized_recurrence(), vec!["RRULE:FREQ=WEEKLY"]);

        let req = CreateEventRequest {
            recurrence: Some(json!(["RRULE:FREQ=DAILY"])),
            ..Default::default()
        };
        assert_eq!(req.normalized_recurrence(), vec!["RRULE:FREQ=DAILY"]);
    }

    #[test]
    fn test_normalize_reminders_rejects_unknown_shape() {
        let req = CreateEventRequest {
            reminders: Some(json!({"minutes": 30})),
            ..Default::default()
        };
        assert!(req.normalized_reminders().is_none());

        let req = CreateEventRequest {
            reminders: Some(json!({"useDefault": false, "overrides": [{"method": "popup", "minutes": 60}]})),
            ..Default::default()
        };
        assert!(req.normalized_reminders().is_some());
    }
}
