//! Configuration for the Business Profile client.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults pointing at the production Google endpoints; tests override
//! the base URLs to point at mock servers.

use gbp_auth::OAuthConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Client configuration for the Business Profile APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbpConfig {
    /// Base URL of the reviews API (legacy v4 surface).
    pub api_url: String,

    /// Base URL of the account management API.
    pub account_api_url: String,

    /// OAuth client ID.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// OAuth redirect URI.
    pub redirect_uri: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GbpConfig {
    fn default() -> Self {
        Self {
            api_url: "https://mybusiness.googleapis.com/v4".to_string(),
            account_api_url: "https://mybusinessaccountmanagement.googleapis.com/v1".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/oauth/callback".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GbpConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GBP_API_URL`: reviews API base URL (default: Google v4 endpoint)
    /// - `GBP_ACCOUNT_API_URL`: account management API base URL
    /// - `GOOGLE_CLIENT_ID`: OAuth client ID
    /// - `GOOGLE_CLIENT_SECRET`: OAuth client secret
    /// - `GOOGLE_REDIRECT_URI`: OAuth redirect URI
    /// - `GBP_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            api_url: std::env::var("GBP_API_URL").unwrap_or(default.api_url),
            account_api_url: std::env::var("GBP_ACCOUNT_API_URL")
                .unwrap_or(default.account_api_url),
            client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or(default.client_id),
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or(default.client_secret),
            redirect_uri: std::env::var("GOOGLE_REDIRECT_URI").unwrap_or(default.redirect_uri),
            timeout_secs: std::env::var("GBP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the OAuth configuration for the token lifecycle manager.
    pub fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_uri.clone(),
        )
    }

    /// Validate that all required configuration is present for production.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() {
            return Err(ConfigError::MissingEnvVar("GOOGLE_CLIENT_ID".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(ConfigError::MissingEnvVar(
                "GOOGLE_CLIENT_SECRET".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a full URL by appending a path to the reviews API base.
    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }

    /// Build a full URL by appending a path to the account API base.
    pub fn account_api_url(&self, path: &str) -> String {
        join_url(&self.account_api_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}
