// Agenda API server
// Decision: events are written to Google Calendar first, local rows mirror
// the provider response

mod agenda;
mod auth;
mod config;
mod error;
mod services;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use agenda_google::{CalendarClient, VerisafeClient};
use agenda_storage::Database;

use crate::agenda::AppState;
use crate::auth::JwtVerifier;
use crate::config::AppConfig;
use crate::services::EventService;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        agenda::ping,
        agenda::create_event,
        agenda::list_events,
        agenda::update_event,
        agenda::delete_event,
    ),
    components(
        schemas(
            agenda_contracts::Event,
            agenda_contracts::EventStatus,
            agenda_contracts::Transparency,
            agenda_contracts::CreateEventRequest,
            agenda_contracts::UpdateEventRequest,
            agenda_contracts::PagedResponse<agenda_contracts::Event>,
            agenda::MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "agenda", description = "Calendar event endpoints")
    ),
    info(
        title = "Agenda API",
        version = "0.1.0",
        description = "CRUD API for calendar events synchronized with Google Calendar",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agenda_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("agenda-api starting...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Initialize database
    let db = Database::from_url(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Connected to database");

    let db = Arc::new(db);
    let calendar = CalendarClient::new();
    let verisafe = VerisafeClient::new(config.verisafe_base_url.clone());
    tracing::info!(verisafe = %config.verisafe_base_url, "External collaborators configured");

    let state = AppState {
        service: Arc::new(EventService::new(db, calendar, verisafe)),
        verifier: JwtVerifier::new(&config.jwt),
    };

    let cors_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    let mut app = Router::new()
        .merge(agenda::routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    if !cors_origins.is_empty() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ]),
        );
    }

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_ping() {
        let app = Router::new().route("/agenda/ping", get(agenda::ping));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/agenda/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Agenda API is running.");
    }

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["paths"]["/agenda/add"]["post"].is_object());
        assert!(json["paths"]["/agenda/ping"]["get"].is_object());
    }
}
