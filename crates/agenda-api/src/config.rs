// Service configuration loaded from environment variables.

use anyhow::{Context, Result};

/// Verisafe JWT verification parameters
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

pub const VERISAFE_ISSUER: &str = "https://verisafe.opencrafts.io/";
pub const VERISAFE_AUDIENCE: &str = "https://academia.opencrafts.io/";

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "super-secret-token".to_string(),
            issuer: VERISAFE_ISSUER.to_string(),
            audience: VERISAFE_AUDIENCE.to_string(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub verisafe_base_url: String,
    pub jwt: JwtConfig,
    /// Extra origins allowed by CORS; empty means same-origin only
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);

        let verisafe_base_url = std::env::var("VERISAFE_BASE_URL")
            .unwrap_or_else(|_| "https://verisafe.opencrafts.io".to_string());

        let secret = std::env::var("VERISAFE_API_SECRET").unwrap_or_else(|_| {
            tracing::warn!("VERISAFE_API_SECRET not set, using insecure default");
            "super-secret-token".to_string()
        });

        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(Self {
            database_url,
            port,
            verisafe_base_url,
            jwt: JwtConfig {
                secret,
                issuer: VERISAFE_ISSUER.to_string(),
                audience: VERISAFE_AUDIENCE.to_string(),
            },
            cors_origins,
        })
    }
}
