use thiserror::Error;

/// Errors from the outbound Google Calendar / Verisafe calls
#[derive(Debug, Error)]
pub enum GoogleApiError {
    /// The provider answered with a non-success status
    #[error("Google Calendar API error: HTTP {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Verisafe error: {0}")]
    Verisafe(String),

    /// No Google account is linked to the user
    #[error("No Google social account linked to this user")]
    NoGoogleAccount,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

pub type GoogleResult<T> = Result<T, GoogleApiError>;

impl GoogleApiError {
    /// True when the provider itself rejected the request (client fault)
    pub fn is_provider_rejection(&self) -> bool {
        matches!(self, GoogleApiError::Api { status, .. } if *status < 500)
    }
}
