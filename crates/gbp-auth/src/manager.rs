//! OAuth token lifecycle management
//!
//! The [`TokenLifecycleManager`] is the single source of truth for the
//! current OAuth credential set. Every authenticated API call goes through
//! [`TokenLifecycleManager::ensure_fresh`] immediately before the request:
//! a no-op when the access token is still valid, a single refresh exchange
//! when it is not. The manager is an explicitly owned, injectable object
//! (constructor injection, no process-wide singleton) so multiple accounts
//! and deterministic tests are possible.

use crate::error::{AuthError, AuthResult};
use crate::state::AuthState;
use crate::token::{OAuthTokenSet, TokenResponse};
use chrono::Utc;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Google OAuth endpoints and client credentials.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Redirect URI registered with the OAuth client.
    pub redirect_uri: String,

    /// Authorization (consent) URL.
    pub auth_url: String,

    /// Token exchange URL.
    pub token_url: String,

    /// Token revocation URL.
    pub revoke_url: String,

    /// Scopes to request.
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create a configuration with the standard Google endpoints and the
    /// Business Profile management scope.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            revoke_url: "https://oauth2.googleapis.com/revoke".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/business.manage".to_string()],
        }
    }

    /// Override the token and revocation endpoints (used in tests to point
    /// at a mock server).
    pub fn with_token_endpoint(mut self, token_url: impl Into<String>) -> Self {
        let token_url = token_url.into();
        self.revoke_url = format!("{}/revoke", token_url.trim_end_matches('/'));
        self.token_url = token_url;
        self
    }
}

/// Single source of truth for the current OAuth token set and its validity.
pub struct TokenLifecycleManager {
    /// OAuth endpoints and credentials.
    config: OAuthConfig,

    /// HTTP client for the token endpoints.
    http: Client,

    /// The current credential set. Mutated only inside `ensure_fresh`,
    /// `exchange_code`, `restore`, and `revoke`, each holding the write
    /// lock for the whole mutation.
    tokens: RwLock<Option<OAuthTokenSet>>,
}

impl TokenLifecycleManager {
    /// Create a new manager with no credentials.
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a manager with an injected HTTP client.
    pub fn with_client(config: OAuthConfig, http: Client) -> Self {
        Self {
            config,
            http,
            tokens: RwLock::new(None),
        }
    }

    /// True iff a token set exists and has not expired.
    pub async fn is_valid(&self) -> bool {
        let tokens = self.tokens.read().await;
        tokens
            .as_ref()
            .map(|t| t.is_valid_at(Utc::now()))
            .unwrap_or(false)
    }

    /// Get the current access token for building a Bearer header.
    pub async fn bearer_token(&self) -> AuthResult<String> {
        let tokens = self.tokens.read().await;
        tokens
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Get a snapshot of the current token set, e.g. for persistence.
    pub async fn snapshot(&self) -> Option<OAuthTokenSet> {
        self.tokens.read().await.clone()
    }

    /// Install a previously persisted token set.
    pub async fn restore(&self, token_set: OAuthTokenSet) {
        let mut tokens = self.tokens.write().await;
        *tokens = Some(token_set);
    }

    /// Make sure the access token is usable, refreshing it if necessary.
    ///
    /// This is the fast path exercised before every API call: when the
    /// token is valid it returns without any network traffic. When it has
    /// expired, a single refresh exchange replaces the access token and
    /// expiry in place; the refresh is never retried, because hammering the
    /// token endpoint with a bad refresh token risks upstream rate limiting.
    #[instrument(skip(self))]
    pub async fn ensure_fresh(&self) -> AuthResult<()> {
        {
            let tokens = self.tokens.read().await;
            match tokens.as_ref() {
                None => return Err(AuthError::NotAuthenticated),
                Some(t) if t.is_valid_at(Utc::now()) => return Ok(()),
                Some(_) => {}
            }
        }

        let mut tokens = self.tokens.write().await;
        let current = tokens.as_mut().ok_or(AuthError::NotAuthenticated)?;

        // Another task may have refreshed while we waited for the lock.
        let now = Utc::now();
        if current.is_valid_at(now) {
            return Ok(());
        }

        let refresh_token = current
            .refresh_token
            .clone()
            .ok_or(AuthError::NoRefreshToken)?;

        debug!("Access token expired, refreshing");

        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .await
            .map_err(AuthError::RefreshFailed)?;

        current.apply_refresh(response, now);
        info!("Access token refreshed");
        Ok(())
    }

    /// Exchange an authorization code for a token set.
    ///
    /// Codes are single-use upstream, so this is one-shot per code. The
    /// resulting token set becomes the current state.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> AuthResult<OAuthTokenSet> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await
            .map_err(AuthError::ExchangeFailed)?;

        let token_set = OAuthTokenSet::from_response(response, Utc::now());

        let mut tokens = self.tokens.write().await;
        *tokens = Some(token_set.clone());
        info!("Authorization code exchanged, credentials stored");
        Ok(token_set)
    }

    /// Revoke the current credentials.
    ///
    /// Upstream revocation is best-effort: a failure is logged, never
    /// propagated. Local state is cleared unconditionally.
    #[instrument(skip(self))]
    pub async fn revoke(&self) {
        let mut tokens = self.tokens.write().await;

        if let Some(current) = tokens.as_ref() {
            // Revoking the refresh token invalidates the whole grant;
            // fall back to the access token when there is none.
            let token = current
                .refresh_token
                .as_deref()
                .unwrap_or(current.access_token.as_str());

            match self
                .http
                .post(&self.config.revoke_url)
                .form(&[("token", token)])
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    info!("Upstream token revocation succeeded");
                }
                Ok(response) => {
                    warn!(status = response.status().as_u16(), "Upstream token revocation failed");
                }
                Err(e) => {
                    warn!(error = %e, "Upstream token revocation request failed");
                }
            }
        }

        *tokens = None;
    }

    /// Build the consent URL for the authorization-code flow.
    pub fn authorization_url(&self, state: &AuthState) -> AuthResult<String> {
        let mut url = reqwest::Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::ConfigError(format!("Invalid auth URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", &self.config.scopes.join(" "))
                .append_pair("access_type", "offline")
                .append_pair("prompt", "consent")
                .append_pair("state", &state.state);

            if let Some(challenge) = state.code_challenge() {
                query
                    .append_pair("code_challenge", &challenge)
                    .append_pair("code_challenge_method", "S256");
            }
        }

        Ok(url.into())
    }

    /// POST a form to the token endpoint and parse the response.
    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("{}: {}", status.as_u16(), body));
        }

        response.json().await.map_err(|e| e.to_string())
    }
}
