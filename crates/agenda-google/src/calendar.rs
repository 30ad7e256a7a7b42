// Google Calendar v3 REST client.
//
// Every call takes the caller's OAuth access token; this service never
// holds provider credentials of its own.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{GoogleApiError, GoogleResult};
use crate::models::{GoogleEvent, GoogleEventBody, GoogleEventList};
use crate::time::to_rfc3339_millis;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// How far the sync listing reaches around now, in days
pub const SYNC_WINDOW_DAYS: i64 = 30;

#[derive(Clone)]
pub struct CalendarClient {
    client: Client,
    base_url: String,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client somewhere else (tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> GoogleResult<Url> {
        Ok(Url::parse(&format!(
            "{}/calendars/{}/events",
            self.base_url, calendar_id
        ))?)
    }

    async fn check(response: reqwest::Response) -> GoogleResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        Err(GoogleApiError::Api { status, body })
    }

    /// Insert an event into the user's calendar
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        body: &GoogleEventBody,
    ) -> GoogleResult<GoogleEvent> {
        let url = self.events_url(calendar_id)?;
        debug!(%calendar_id, summary = %body.summary, "inserting calendar event");

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        let event = Self::check(response).await?.json::<GoogleEvent>().await?;
        Ok(event)
    }

    /// Replace an existing event
    pub async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        body: &GoogleEventBody,
    ) -> GoogleResult<GoogleEvent> {
        let mut url = self.events_url(calendar_id)?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::Decode("cannot-be-a-base URL".to_string()))?
            .push(event_id);

        let response = self
            .client
            .put(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        let event = Self::check(response).await?.json::<GoogleEvent>().await?;
        Ok(event)
    }

    /// Delete an event from the user's calendar
    pub async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> GoogleResult<()> {
        let mut url = self.events_url(calendar_id)?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::Decode("cannot-be-a-base URL".to_string()))?
            .push(event_id);

        let response = self
            .client
            .delete(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// List single events in a time window, ordered by start time
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> GoogleResult<Vec<GoogleEvent>> {
        let mut url = self.events_url(calendar_id)?;
        url.query_pairs_mut()
            .append_pair("timeMin", &to_rfc3339_millis(time_min))
            .append_pair("timeMax", &to_rfc3339_millis(time_max))
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let response = self.client.get(url).bearer_auth(access_token).send().await?;

        let list = Self::check(response)
            .await?
            .json::<GoogleEventList>()
            .await?;
        Ok(list.items)
    }

    /// List the window used by `sync=true`: now plus/minus 30 days
    pub async fn list_sync_window(
        &self,
        access_token: &str,
        calendar_id: &str,
    ) -> GoogleResult<Vec<GoogleEvent>> {
        let now = Utc::now();
        self.list_events(
            access_token,
            calendar_id,
            now - Duration::days(SYNC_WINDOW_DAYS),
            now + Duration::days(SYNC_WINDOW_DAYS),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_url() {
        let client = CalendarClient::new();
        let url = client.events_url("primary").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
    }

    #[test]
    fn test_provider_rejection_classification() {
        let rejected = GoogleApiError::Api {
            status: 400,
            body: "bad request".to_string(),
        };
        assert!(rejected.is_provider_rejection());

        let outage = GoogleApiError::Api {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(!outage.is_provider_rejection());
    }
}
