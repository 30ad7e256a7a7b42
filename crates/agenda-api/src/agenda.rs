// Event CRUD HTTP routes under /agenda

use axum::extract::{FromRef, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use agenda_contracts::{CreateEventRequest, Event, PagedResponse, UpdateEventRequest};

use crate::auth::{AuthUser, JwtVerifier};
use crate::error::ApiError;
use crate::services::{EventService, ListParams};

/// App state for agenda routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EventService>,
    pub verifier: JwtVerifier,
}

impl FromRef<AppState> for JwtVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

/// Create agenda routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/agenda/ping", get(ping))
        .route("/agenda/add", post(create_event))
        .route("/agenda/", get(list_events))
        .route("/agenda/update/{event_id}", put(update_event))
        .route("/agenda/delete/{event_id}", delete(delete_event))
        .with_state(state)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /agenda/ping - Liveness check, no auth
#[utoipa::path(
    get,
    path = "/agenda/ping",
    responses(
        (status = 200, description = "Service is up", body = MessageResponse)
    ),
    tag = "agenda"
)]
pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Agenda API is running.".to_string(),
    })
}

/// POST /agenda/add - Create an event in Google Calendar and mirror it locally
#[utoipa::path(
    post,
    path = "/agenda/add",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Validation or provider rejection"),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 404, description = "No linked Google account"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "agenda"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.service.create(user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// "true" refreshes the provider window before listing
    pub sync: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        let sync = q
            .sync
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        ListParams {
            start_date: q.start_date,
            end_date: q.end_date,
            sync,
            page: q.page,
            page_size: q.page_size,
        }
    }
}

/// GET /agenda/ - List the caller's events ordered by start time
#[utoipa::path(
    get,
    path = "/agenda/",
    params(
        ("start_date" = Option<String>, Query, description = "Inclusive lower bound on start_time (ISO 8601)"),
        ("end_date" = Option<String>, Query, description = "Inclusive upper bound on end_time (ISO 8601)"),
        ("sync" = Option<String>, Query, description = "\"true\" pulls the provider window first"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Page size, max 100")
    ),
    responses(
        (status = 200, description = "Events for the caller", body = PagedResponse<Event>),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "agenda"
)]
pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<PagedResponse<Event>>, ApiError> {
    let params: ListParams = query.into();
    let page = params.page();
    let page_size = params.page_size();

    let (events, total) = state.service.list(user.user_id, &params).await?;
    Ok(Json(PagedResponse::new(events, page, page_size, total)))
}

/// PUT /agenda/update/{event_id} - Update an event, syncing Google Calendar
#[utoipa::path(
    put,
    path = "/agenda/update/{event_id}",
    params(
        ("event_id" = String, Path, description = "Google Calendar event id")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Validation or provider rejection"),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "agenda"
)]
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let event = state.service.update(user.user_id, &event_id, req).await?;
    Ok(Json(event))
}

/// DELETE /agenda/delete/{event_id} - Delete from Google Calendar and soft delete locally
#[utoipa::path(
    delete,
    path = "/agenda/delete/{event_id}",
    params(
        ("event_id" = String, Path, description = "Google Calendar event id")
    ),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "agenda"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.service.delete(user.user_id, &event_id).await?;
    Ok(Json(MessageResponse {
        message: "Event deleted successfully.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use crate::config::JwtConfig;
    use agenda_google::{CalendarClient, VerisafeClient};
    use agenda_storage::Database;
    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::Request;
    use http_body_util::BodyExt;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::ServiceExt;
    use uuid::Uuid;

    // The pool never connects, so only paths that fail before touching
    // the database can go through this state.
    fn test_state(config: &JwtConfig) -> AppState {
        let db = Database::from_url_lazy("postgres://localhost/agenda_test").unwrap();
        let service = EventService::new(
            Arc::new(db),
            CalendarClient::new(),
            VerisafeClient::new("http://localhost:0"),
        );
        AppState {
            service: Arc::new(service),
            verifier: JwtVerifier::new(config),
        }
    }

    fn make_token(config: &JwtConfig, sub: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap()
    }

    async fn post_add(body: &str) -> (StatusCode, serde_json::Value) {
        let config = JwtConfig::default();
        let app = routes(test_state(&config));
        let token = make_token(&config, &Uuid::new_v4().to_string());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/agenda/add")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_create_empty_body_reports_missing_summary() {
        let (status, json) = post_add("{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Event summary is required.");
    }

    #[tokio::test]
    async fn test_create_without_times_reports_missing_times() {
        let (status, json) = post_add(r#"{"summary": "Standup"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Both start_time and end_time are required.");
    }

    #[test]
    fn test_sync_flag_parsing() {
        let params: ListParams = ListQuery {
            sync: Some("TRUE".to_string()),
            ..Default::default()
        }
        .into();
        assert!(params.sync);

        let params: ListParams = ListQuery {
            sync: Some("false".to_string()),
            ..Default::default()
        }
        .into();
        assert!(!params.sync);

        let params: ListParams = ListQuery::default().into();
        assert!(!params.sync);
    }
}
