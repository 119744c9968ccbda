//! OAuth token set and the raw token endpoint response
//!
//! The upstream token endpoint reports a relative `expires_in`; the stored
//! token set always carries an absolute `expires_at` derived at the moment
//! of issuance or refresh. The conversion lives in exactly one place
//! ([`OAuthTokenSet::from_response`]) so no caller ever trusts upstream
//! expiry data verbatim.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default token lifetime when the endpoint omits `expires_in` (1 hour,
/// which is what Google issues in practice).
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Raw token response from the OAuth token endpoint.
///
/// Deserialized verbatim; converted into an [`OAuthTokenSet`] before any
/// other component sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token for Bearer authentication.
    pub access_token: String,

    /// Token type (always "Bearer" for Google).
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Lifetime in seconds, relative to the response.
    pub expires_in: Option<i64>,

    /// Refresh token. Only present on the initial code exchange (with
    /// `access_type=offline`), not on refresh responses.
    pub refresh_token: Option<String>,

    /// Granted scopes.
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The current OAuth credential set.
///
/// Owned exclusively by the token lifecycle manager; no other component
/// holds or mutates one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokenSet {
    /// Access token (secret).
    pub access_token: String,

    /// Refresh token (secret), if one was granted.
    pub refresh_token: Option<String>,

    /// Granted scopes.
    pub scope: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Absolute expiry, derived from `now + expires_in` at issuance.
    pub expires_at: DateTime<Utc>,
}

impl OAuthTokenSet {
    /// Build a token set from a token endpoint response.
    ///
    /// `now` is injected so refresh and exchange paths share one clock and
    /// tests can pin it.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            scope: response.scope.unwrap_or_default(),
            token_type: response.token_type,
            expires_at: now + Duration::seconds(expires_in),
        }
    }

    /// Check whether the access token is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Apply a refresh response in place.
    ///
    /// Replaces the access token and expiry; the refresh token is preserved
    /// unless the endpoint reissued one.
    pub fn apply_refresh(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        self.access_token = response.access_token;
        self.token_type = response.token_type;
        self.expires_at = now + Duration::seconds(expires_in);
        if let Some(scope) = response.scope {
            self.scope = scope;
        }
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
    }
}
