//! Public service facade.
//!
//! [`ReviewService`] is what the MCP tool layer consumes. Every operation
//! returns a [`ServiceResult`]: all internal errors are caught here and
//! converted into a failure carrying a human-readable message and a stable
//! error-code tag. Nothing throws across this boundary.

use crate::api::GbpApi;
use crate::config::GbpConfig;
use crate::error::{ApiError, FetchError};
use crate::locations::{LocationDirectory, LocationResolver, LocationsListing};
use crate::models::Location;
use crate::reviews::{ReplyReceipt, ReviewPage, ReviewPaginator, MAX_PAGE_SIZE};
use crate::stats::{aggregate_by_day, DayStat};
use gbp_auth::TokenLifecycleManager;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Discriminated outcome of a service operation.
///
/// Exactly one variant is populated; callers branch on the status before
/// touching data.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ServiceResult<T> {
    /// The operation succeeded.
    Success {
        /// Operation payload.
        data: T,
    },

    /// The operation failed.
    Failure {
        /// Human-readable error message.
        error: String,

        /// Stable error-code tag.
        code: String,
    },
}

impl<T> ServiceResult<T> {
    /// Wrap a payload.
    pub fn success(data: T) -> Self {
        ServiceResult::Success { data }
    }

    /// Wrap an error message and code.
    pub fn failure(error: impl Into<String>, code: impl Into<String>) -> Self {
        ServiceResult::Failure {
            error: error.into(),
            code: code.into(),
        }
    }

    /// Whether this is the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResult::Success { .. })
    }

    /// Extract the payload, if successful.
    pub fn into_data(self) -> Option<T> {
        match self {
            ServiceResult::Success { data } => Some(data),
            ServiceResult::Failure { .. } => None,
        }
    }
}

impl<T, E> From<Result<T, E>> for ServiceResult<T>
where
    E: std::fmt::Display + ErrorCode,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => ServiceResult::success(data),
            Err(e) => ServiceResult::failure(e.to_string(), e.code()),
        }
    }
}

/// Errors that carry a stable code tag.
pub trait ErrorCode {
    /// The stable code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for FetchError {
    fn code(&self) -> &'static str {
        FetchError::code(self)
    }
}

impl ErrorCode for crate::error::ResolutionError {
    fn code(&self) -> &'static str {
        crate::error::ResolutionError::code(self)
    }
}

impl ErrorCode for ApiError {
    fn code(&self) -> &'static str {
        ApiError::code(self)
    }
}

/// Review management service for one authenticated user.
///
/// Owns the API executor, resolver, paginator, and directory; constructed
/// with an injected token lifecycle manager.
#[derive(Clone)]
pub struct ReviewService {
    paginator: ReviewPaginator,
    resolver: LocationResolver,
    directory: LocationDirectory,
}

impl ReviewService {
    /// Create a service from configuration and a token manager.
    pub fn new(config: GbpConfig, auth: Arc<TokenLifecycleManager>) -> Result<Self, ApiError> {
        let api = Arc::new(GbpApi::new(config, auth)?);
        Ok(Self::with_api(api))
    }

    /// Create a service around an existing executor.
    pub fn with_api(api: Arc<GbpApi>) -> Self {
        let resolver = LocationResolver::new(Arc::clone(&api));
        Self {
            paginator: ReviewPaginator::new(Arc::clone(&api), resolver.clone()),
            directory: LocationDirectory::new(api),
            resolver,
        }
    }

    /// List business locations across all accounts.
    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> ServiceResult<LocationsListing> {
        self.directory.list_locations().await.into()
    }

    /// Get the next page of unreplied reviews for a location.
    ///
    /// `page_size` defaults to 50 and is clamped to the upstream maximum
    /// of 50.
    #[instrument(skip(self, page_token))]
    pub async fn get_reviews(
        &self,
        location_ref: &str,
        page_size: Option<u32>,
        page_token: Option<String>,
    ) -> ServiceResult<ReviewPage> {
        let page_size = page_size.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        self.paginator
            .unreplied_page(location_ref, page_size, page_token)
            .await
            .into()
    }

    /// Get day-level review statistics for a location.
    ///
    /// Drains the complete, unfiltered review set; replied reviews count
    /// too.
    #[instrument(skip(self))]
    pub async fn get_review_stats(&self, location_ref: &str) -> ServiceResult<Vec<DayStat>> {
        self.paginator
            .all_reviews(location_ref)
            .await
            .map(|reviews| aggregate_by_day(&reviews))
            .into()
    }

    /// Post a reply to a review.
    #[instrument(skip(self, reply_text))]
    pub async fn post_reply(
        &self,
        location_ref: &str,
        review_id: &str,
        reply_text: &str,
    ) -> ServiceResult<ReplyReceipt> {
        self.paginator
            .post_reply(location_ref, review_id, reply_text)
            .await
            .into()
    }

    /// Get the business profile for a location, or the first location when
    /// no reference is given.
    #[instrument(skip(self))]
    pub async fn get_business_profile(
        &self,
        location_ref: Option<&str>,
    ) -> ServiceResult<Location> {
        let result = match location_ref {
            Some(location_ref) => match self.resolver.resolve(location_ref).await {
                Ok(path) => self.directory.get_location(&path).await,
                Err(e) => Err(e),
            },
            None => self.directory.first_location().await,
        };
        result.into()
    }
}
