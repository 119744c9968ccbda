//! Error types for OAuth token lifecycle operations
//!
//! This module defines all error types that can occur while exchanging,
//! refreshing, or revoking Google OAuth credentials.

use thiserror::Error;

/// Authentication error types.
///
/// These errors cover the whole token lifecycle: missing credentials,
/// failed exchanges against the token endpoint, and configuration issues.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token set exists at all; the user has never authenticated.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The access token expired and no refresh token is available.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The refresh exchange against the token endpoint failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// The authorization-code exchange failed.
    #[error("Code exchange failed: {0}")]
    ExchangeFailed(String),

    /// Upstream revocation failed (best-effort, usually only logged).
    #[error("Token revocation failed: {0}")]
    RevokeFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Transport-level HTTP failure reaching the OAuth endpoints.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Get a stable error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            AuthError::NoRefreshToken => "NO_REFRESH_TOKEN",
            AuthError::RefreshFailed(_) => "REFRESH_FAILED",
            AuthError::ExchangeFailed(_) => "EXCHANGE_FAILED",
            AuthError::RevokeFailed(_) => "REVOKE_FAILED",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Http(_) => "HTTP_ERROR",
        }
    }

    /// Check if this error means the user must re-run the consent flow.
    ///
    /// Refresh failures and missing credentials cannot be recovered
    /// automatically; repeated refresh attempts against a bad refresh
    /// token risk upstream rate limiting.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated | AuthError::NoRefreshToken | AuthError::RefreshFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::NotAuthenticated.error_code(), "NOT_AUTHENTICATED");
        assert_eq!(AuthError::NoRefreshToken.error_code(), "NO_REFRESH_TOKEN");
        assert_eq!(
            AuthError::RefreshFailed("boom".to_string()).error_code(),
            "REFRESH_FAILED"
        );
    }

    #[test]
    fn test_requires_reauth() {
        assert!(AuthError::NotAuthenticated.requires_reauth());
        assert!(AuthError::RefreshFailed("expired".to_string()).requires_reauth());
        assert!(!AuthError::ConfigError("bad".to_string()).requires_reauth());
    }
}
