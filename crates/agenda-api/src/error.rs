// API error type with HTTP status mapping.
//
// Every error leaves the service as a {"message": "..."} body, matching
// what the mobile clients already consume.

use agenda_google::GoogleApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<GoogleApiError> for ApiError {
    fn from(err: GoogleApiError) -> Self {
        match &err {
            GoogleApiError::NoGoogleAccount => ApiError::NotFound(
                "No Google social account linked to this user please consider linking your google account"
                    .to_string(),
            ),
            GoogleApiError::Api { .. } if err.is_provider_rejection() => {
                ApiError::BadRequest(format!("Google Calendar API error: {}", err))
            }
            _ => ApiError::Internal(format!("Google Calendar API error: {}", err)),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("internal error: {:#}", err);
        ApiError::Internal(
            "Something went terribly wrong and we couldn't satisfy your request at the moment. Please try again"
                .to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_no_google_account_maps_to_404() {
        let err: ApiError = GoogleApiError::NoGoogleAccount.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_provider_rejection_maps_to_400() {
        let err: ApiError = GoogleApiError::Api {
            status: 403,
            body: "rate limited".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = GoogleApiError::Api {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
