//! Error types for Business Profile API operations
//!
//! Three layers mirror the call stack: [`ApiError`] from the authenticated
//! HTTP boundary, [`ResolutionError`] from location path resolution, and
//! [`FetchError`] from the review retrieval paths. Every error carries a
//! stable `code()` tag; the service facade converts them into failure
//! results, so nothing in this taxonomy crosses the public boundary as a
//! panic or opaque string.

use gbp_auth::AuthError;
use thiserror::Error;

/// Errors from the authenticated HTTP call surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upstream returned a non-2xx status. The raw body text is preserved,
    /// never swallowed.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed before the request was sent.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Upstream returned a 2xx response that is not valid JSON, or an
    /// entity that cannot be mapped.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Get a stable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Status { .. } => "HTTP_STATUS",
            ApiError::Http(_) => "HTTP_ERROR",
            ApiError::Auth(e) => e.error_code(),
            ApiError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }
}

/// Errors from resolving a location reference to a fully-qualified path.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The account list is empty, so no short-form reference can be
    /// qualified.
    #[error("No accounts found for the authenticated user")]
    NoAccountsFound,

    /// The account exists but has no locations.
    #[error("No locations found for the authenticated user")]
    NoLocationsFound,

    /// The account lookup itself failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ResolutionError {
    /// Get a stable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ResolutionError::NoAccountsFound => "NO_ACCOUNTS_FOUND",
            ResolutionError::NoLocationsFound => "NO_LOCATIONS_FOUND",
            ResolutionError::Api(e) => e.code(),
        }
    }
}

/// Errors from the review retrieval and reply paths.
#[derive(Debug, Error)]
pub enum FetchError {
    /// An upstream API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Location path resolution failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The pagination walk hit the defensive page cap without terminating.
    #[error("Pagination did not terminate after {pages} pages")]
    PaginationExhausted {
        /// Number of upstream pages consumed before giving up.
        pages: u32,
    },

    /// The reply text exceeds the upstream limit. Rejected before any
    /// network call.
    #[error("Reply text is {len} characters, maximum is {max}")]
    ReplyTooLong {
        /// Actual reply length in characters.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

impl FetchError {
    /// Get a stable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Api(e) => e.code(),
            FetchError::Resolution(e) => e.code(),
            FetchError::PaginationExhausted { .. } => "PAGINATION_EXHAUSTED",
            FetchError::ReplyTooLong { .. } => "REPLY_TOO_LONG",
        }
    }
}

impl From<AuthError> for FetchError {
    fn from(e: AuthError) -> Self {
        FetchError::Api(ApiError::Auth(e))
    }
}
