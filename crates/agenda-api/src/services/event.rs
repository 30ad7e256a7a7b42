// Event service: orchestrates Google Calendar and local storage.
//
// Writes go to Google Calendar first and are mirrored locally from the
// provider's response, so the stored row always carries provider-assigned
// fields (id, html_link, etag). A failed local insert rolls the provider
// event back.

use std::str::FromStr;
use std::sync::Arc;

use agenda_contracts::{CreateEventRequest, Event, EventStatus, Transparency, UpdateEventRequest};
use agenda_google::time::{parse_iso8601, to_rfc3339_millis};
use agenda_google::{CalendarClient, EventDateTime, GoogleEvent, GoogleEventBody, VerisafeClient};
use agenda_storage::{CreateEvent, Database, EventFilter, EventRow, UpdateEvent};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Listing parameters after query-string parsing
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sync: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

pub struct EventService {
    db: Arc<Database>,
    calendar: CalendarClient,
    verisafe: VerisafeClient,
}

impl EventService {
    pub fn new(db: Arc<Database>, calendar: CalendarClient, verisafe: VerisafeClient) -> Self {
        Self {
            db,
            calendar,
            verisafe,
        }
    }

    /// Create the event in Google Calendar, then mirror it locally.
    pub async fn create(&self, owner_id: Uuid, req: CreateEventRequest) -> Result<Event, ApiError> {
        let summary = req
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Event summary is required.".to_string()))?
            .to_string();

        let start_raw = req
            .start_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let end_raw = req
            .end_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let (Some(start_raw), Some(end_raw)) = (start_raw, end_raw) else {
            return Err(ApiError::BadRequest(
                "Both start_time and end_time are required.".to_string(),
            ));
        };

        let start = parse_iso8601(start_raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid start_time: {}", start_raw)))?;
        let end = parse_iso8601(end_raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid end_time: {}", end_raw)))?;

        let timezone = req.timezone.clone().unwrap_or_else(|| "UTC".to_string());
        validate_timezone(&timezone)?;

        let access_token = self.verisafe.google_access_token(owner_id).await?;
        let calendar_id = req
            .calendar_id
            .clone()
            .unwrap_or_else(|| "primary".to_string());

        let attendees = req.normalized_attendees();
        let recurrence = req.normalized_recurrence();
        let body = GoogleEventBody {
            summary: summary.clone(),
            description: req.description.clone(),
            location: req.location.clone(),
            start: EventDateTime::timed(to_rfc3339_millis(start), timezone.clone()),
            end: EventDateTime::timed(to_rfc3339_millis(end), timezone.clone()),
            transparency: Some(
                req.transparency
                    .unwrap_or_default()
                    .to_string(),
            ),
            attendees: (!attendees.is_empty()).then_some(attendees),
            recurrence: (!recurrence.is_empty()).then_some(recurrence),
            reminders: Some(
                req.normalized_reminders()
                    .unwrap_or_else(|| json!({ "useDefault": true })),
            ),
        };

        let created = self
            .calendar
            .insert_event(&access_token, &calendar_id, &body)
            .await?;
        info!(event_id = %created.id, %owner_id, "created event in Google Calendar");

        let input = google_event_to_row(&created, &calendar_id, owner_id)
            .ok_or_else(|| ApiError::Internal("Provider response missing event times".to_string()))?;

        match self.db.create_event(input).await {
            Ok(row) => Ok(row_to_event(row)),
            Err(e) => {
                error!(event_id = %created.id, "failed to persist event after provider creation: {:#}", e);
                // Roll the provider-side event back so the two stores agree
                if let Err(cleanup) = self
                    .calendar
                    .delete_event(&access_token, &calendar_id, &created.id)
                    .await
                {
                    error!(event_id = %created.id, "failed to clean up provider event: {}", cleanup);
                }
                Err(ApiError::BadRequest(
                    "Event created in Google Calendar but failed to save in database.".to_string(),
                ))
            }
        }
    }

    /// List the caller's events, optionally syncing the provider window first.
    pub async fn list(
        &self,
        owner_id: Uuid,
        params: &ListParams,
    ) -> Result<(Vec<Event>, i64), ApiError> {
        if params.sync {
            // Sync failures degrade to serving local data only
            if let Err(e) = self.sync_from_google(owner_id).await {
                warn!(%owner_id, "calendar sync failed: {}", e);
            }
        }

        let starts_after = parse_optional_date(params.start_date.as_deref());
        let ends_before = parse_optional_date(params.end_date.as_deref());

        let filter = EventFilter {
            starts_after,
            ends_before,
            page: params.page(),
            page_size: params.page_size(),
        };

        let rows = self.db.list_events(owner_id, &filter).await?;
        let total = self
            .db
            .count_events(owner_id, starts_after, ends_before)
            .await?;

        Ok((rows.into_iter().map(row_to_event).collect(), total))
    }

    /// Push an update to Google Calendar, then mutate the provided fields locally.
    pub async fn update(
        &self,
        owner_id: Uuid,
        event_id: &str,
        req: UpdateEventRequest,
    ) -> Result<Event, ApiError> {
        let existing = self
            .db
            .get_event(event_id, owner_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Event not found.".to_string()))?;

        let start = match req.start_time.as_deref() {
            Some(raw) => parse_iso8601(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid start_time: {}", raw)))?,
            None => existing.start_time,
        };
        let end = match req.end_time.as_deref() {
            Some(raw) => parse_iso8601(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid end_time: {}", raw)))?,
            None => existing.end_time,
        };
        let timezone = req.timezone.clone().unwrap_or_else(|| existing.timezone.clone());
        validate_timezone(&timezone)?;

        let access_token = self.verisafe.google_access_token(owner_id).await?;

        // Google's update is a full replace, so absent fields are filled
        // from the stored row
        let body = GoogleEventBody {
            summary: req.summary.clone().unwrap_or_else(|| existing.summary.clone()),
            description: req.description.clone().or_else(|| existing.description.clone()),
            location: req.location.clone().or_else(|| existing.location.clone()),
            start: EventDateTime::timed(to_rfc3339_millis(start), timezone.clone()),
            end: EventDateTime::timed(to_rfc3339_millis(end), timezone.clone()),
            transparency: Some(
                req.transparency
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| existing.transparency.clone()),
            ),
            attendees: None,
            recurrence: None,
            reminders: None,
        };

        let updated = self
            .calendar
            .update_event(&access_token, &existing.calendar_id, event_id, &body)
            .await?;

        let input = UpdateEvent {
            summary: req.summary,
            description: req.description,
            location: req.location,
            start_time: req.start_time.as_deref().map(|_| start),
            end_time: req.end_time.as_deref().map(|_| end),
            timezone: req.timezone,
            transparency: req.transparency.map(|t| t.to_string()),
            updated: Some(updated.updated),
            etag: Some(updated.etag),
        };

        let row = self
            .db
            .update_event(event_id, owner_id, input)
            .await?
            .ok_or_else(|| ApiError::NotFound("Event not found.".to_string()))?;

        Ok(row_to_event(row))
    }

    /// Delete from Google Calendar, then soft delete locally.
    pub async fn delete(&self, owner_id: Uuid, event_id: &str) -> Result<(), ApiError> {
        let existing = self
            .db
            .get_event(event_id, owner_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Event not found.".to_string()))?;

        let access_token = self.verisafe.google_access_token(owner_id).await?;
        self.calendar
            .delete_event(&access_token, &existing.calendar_id, event_id)
            .await?;

        let deleted = self.db.soft_delete_event(event_id, owner_id).await?;
        if !deleted {
            return Err(ApiError::NotFound("Event not found.".to_string()));
        }
        info!(%event_id, %owner_id, "event soft deleted");
        Ok(())
    }

    /// Pull the provider's current window and store any events we don't know yet.
    async fn sync_from_google(&self, owner_id: Uuid) -> Result<(), ApiError> {
        let access_token = self.verisafe.google_access_token(owner_id).await?;
        let events = self
            .calendar
            .list_sync_window(&access_token, "primary")
            .await?;

        let mut inserted = 0usize;
        for event in &events {
            let Some(input) = google_event_to_row(event, "primary", owner_id) else {
                debug!(event_id = %event.id, "skipping provider event without resolvable times");
                continue;
            };
            if self.db.insert_event_if_absent(input).await? {
                inserted += 1;
            }
        }

        info!(%owner_id, fetched = events.len(), inserted, "calendar sync finished");
        Ok(())
    }
}

fn validate_timezone(name: &str) -> Result<(), ApiError> {
    chrono_tz::Tz::from_str(name)
        .map(|_| ())
        .map_err(|_| ApiError::BadRequest(format!("Unknown timezone: {}", name)))
}

/// Silently ignore unparseable date filters, like the listing contract says
fn parse_optional_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_iso8601(raw);
    if parsed.is_none() {
        debug!(%raw, "ignoring unparseable date filter");
    }
    parsed
}

/// Map a provider event onto an insert row; None when times are unusable
fn google_event_to_row(event: &GoogleEvent, calendar_id: &str, owner_id: Uuid) -> Option<CreateEvent> {
    let start_time = event.start.to_utc()?;
    let end_time = event.end.to_utc()?;

    Some(CreateEvent {
        id: event.id.clone(),
        summary: event
            .summary
            .clone()
            .unwrap_or_else(|| "No Title".to_string()),
        description: event.description.clone(),
        location: event.location.clone(),
        start_time,
        end_time,
        all_day: event.is_all_day(),
        timezone: event
            .start
            .time_zone
            .clone()
            .unwrap_or_else(|| "UTC".to_string()),
        status: event
            .status
            .clone()
            .unwrap_or_else(|| "confirmed".to_string()),
        transparency: event
            .transparency
            .clone()
            .unwrap_or_else(|| "opaque".to_string()),
        calendar_id: calendar_id.to_string(),
        html_link: event.html_link.clone(),
        created: event.created,
        updated: event.updated,
        etag: event.etag.clone(),
        attendees: event.attendees.clone().unwrap_or_else(|| json!([])),
        reminders: event.reminders.clone().unwrap_or_else(|| json!({})),
        recurrence: event.recurrence.clone().unwrap_or_else(|| json!([])),
        owner_id,
    })
}

fn row_to_event(row: EventRow) -> Event {
    Event {
        id: row.id,
        summary: row.summary,
        description: row.description,
        location: row.location,
        start_time: row.start_time,
        end_time: row.end_time,
        all_day: row.all_day,
        timezone: row.timezone,
        status: EventStatus::from_str(&row.status).unwrap_or_default(),
        transparency: Transparency::from_str(&row.transparency).unwrap_or_default(),
        calendar_id: row.calendar_id,
        html_link: row.html_link,
        created: row.created,
        updated: row.updated,
        etag: row.etag,
        attendees: row.attendees,
        reminders: row.reminders,
        recurrence: row.recurrence,
        owner_id: row.owner_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_page_defaults_and_clamping() {
        let params = ListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 20);

        let params = ListParams {
            page: Some(0),
            page_size: Some(5000),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 100);
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("Africa/Nairobi").is_ok());
        assert!(validate_timezone("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn test_parse_optional_date_ignores_garbage() {
        assert!(parse_optional_date(None).is_none());
        assert!(parse_optional_date(Some("not-a-date")).is_none());
        assert!(parse_optional_date(Some("2025-08-20T00:00:00Z")).is_some());
    }

    #[test]
    fn test_parse_optional_date_accepts_bare_dates() {
        let dt = parse_optional_date(Some("2025-08-20")).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_google_event_to_row_defaults() {
        let event: GoogleEvent = serde_json::from_value(json!({
            "id": "evt_42",
            "etag": "\"e\"",
            "start": {"date": "2025-08-20"},
            "end": {"date": "2025-08-21"},
            "htmlLink": "https://calendar.google.com/event?eid=evt_42",
            "created": "2025-08-01T00:00:00Z",
            "updated": "2025-08-01T00:00:00Z"
        }))
        .unwrap();

        let owner = Uuid::new_v4();
        let row = google_event_to_row(&event, "primary", owner).unwrap();
        assert_eq!(row.summary, "No Title");
        assert!(row.all_day);
        assert_eq!(row.status, "confirmed");
        assert_eq!(row.transparency, "opaque");
        assert_eq!(row.timezone, "UTC");
        assert_eq!(row.owner_id, owner);
    }

    #[test]
    fn test_row_to_event_parses_enums() {
        let row = EventRow {
            id: "evt_1".to_string(),
            summary: "S".to_string(),
            description: None,
            location: None,
            start_time: Utc::now(),
            end_time: Utc::now(),
            all_day: false,
            timezone: "UTC".to_string(),
            status: "tentative".to_string(),
            transparency: "transparent".to_string(),
            calendar_id: "primary".to_string(),
            html_link: String::new(),
            created: Utc::now(),
            updated: Utc::now(),
            etag: String::new(),
            attendees: json!([]),
            reminders: json!({}),
            recurrence: json!([]),
            owner_id: Uuid::nil(),
            deleted_at: None,
        };
        let event = row_to_event(row);
        assert_eq!(event.status, EventStatus::Tentative);
        assert_eq!(event.transparency, Transparency::Transparent);
    }
}
