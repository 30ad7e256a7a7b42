// Bearer JWT verification for tokens issued by Verisafe.
//
// HS256 with pinned issuer and audience; the subject claim carries the
// user's UUID. Handlers take an AuthUser argument and never read headers
// themselves.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a UUID string
    pub sub: String,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Verifies Verisafe-issued tokens
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::Forbidden(format!("Invalid token: {}", e)))
    }
}

/// The authenticated caller, extracted from the bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    JwtVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Forbidden("Wrong token format. Expected 'Bearer token'".to_string())
        })?;

        let verifier = JwtVerifier::from_ref(state);
        let claims = verifier.verify(token)?;

        let user_id = claims.sub.parse::<Uuid>().map_err(|_| {
            ApiError::Forbidden(
                "We couldn't extract your user id from the provided token.\
                 Please ensure the token is valid and contains the necessary user data."
                    .to_string(),
            )
        })?;

        Ok(AuthUser { user_id })
    }
}
