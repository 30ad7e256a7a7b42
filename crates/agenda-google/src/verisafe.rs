// Verisafe identity service client.
//
// Verisafe issues the JWTs this API verifies and stores the user's linked
// social accounts; we only need the Google one for its access token.

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::error::{GoogleApiError, GoogleResult};

/// A social login linked to a Verisafe user
#[derive(Debug, Clone, Deserialize)]
pub struct SocialAccount {
    pub provider: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone)]
pub struct VerisafeClient {
    client: Client,
    base_url: String,
}

impl VerisafeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the user's linked social accounts
    pub async fn user_socials(&self, user_id: Uuid) -> GoogleResult<Vec<SocialAccount>> {
        let url = format!("{}/socials/user/{}", self.base_url, user_id);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            warn!(%user_id, %status, "Verisafe socials lookup failed");
            return Err(GoogleApiError::Verisafe(format!(
                "socials lookup failed with HTTP {}",
                status
            )));
        }

        let socials = response.json::<Vec<SocialAccount>>().await?;
        Ok(socials)
    }

    /// The user's Google access token, or NoGoogleAccount when nothing is linked
    pub async fn google_access_token(&self, user_id: Uuid) -> GoogleResult<String> {
        let socials = self.user_socials(user_id).await?;
        socials
            .into_iter()
            .find(|s| s.provider == "google")
            .map(|s| s.access_token)
            .ok_or(GoogleApiError::NoGoogleAccount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_account_deserialize() {
        let socials: Vec<SocialAccount> = serde_json::from_str(
            r#"[
                {"provider": "github", "access_token": "gh_tok"},
                {"provider": "google", "access_token": "ya29.tok", "refresh_token": "1//ref"}
            ]"#,
        )
        .unwrap();

        let google = socials.iter().find(|s| s.provider == "google").unwrap();
        assert_eq!(google.access_token, "ya29.tok");
        assert_eq!(google.refresh_token.as_deref(), Some("1//ref"));
        assert!(socials[0].refresh_token.is_none());
    }
}
