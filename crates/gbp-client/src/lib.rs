//! # GBP Client
//!
//! Google Business Profile review API client for the GBP MCP server.
//!
//! ## Overview
//!
//! The gbp-client crate handles:
//! - **API executor**: a single authenticated GET/PUT/POST surface; every
//!   call freshens OAuth credentials first and translates non-2xx
//!   responses uniformly
//! - **Path resolution**: short `locations/{id}` references are qualified
//!   to `accounts/{a}/locations/{id}` lazily; fully-qualified input passes
//!   through untouched
//! - **Review pagination**: unreplied-review retrieval that skips pages of
//!   already-replied reviews transparently, so callers never loop to find
//!   actionable work
//! - **Statistics**: day-level aggregation over the complete review set
//! - **Service facade**: [`ReviewService`] with [`ServiceResult`] outcomes
//!   for the MCP tool layer; no error crosses the facade as a panic
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gbp_auth::TokenLifecycleManager;
//! use gbp_client::{GbpConfig, ReviewService};
//! use std::sync::Arc;
//!
//! async fn fetch_unreplied() {
//!     let config = GbpConfig::from_env();
//!     let auth = Arc::new(TokenLifecycleManager::new(config.oauth_config()));
//!     let service = ReviewService::new(config, auth).unwrap();
//!
//!     let result = service.get_reviews("locations/456", None, None).await;
//!     if let Some(page) = result.into_data() {
//!         println!("{} reviews need a reply", page.reviews.len());
//!     }
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod locations;
pub mod models;
pub mod reviews;
pub mod service;
pub mod stats;

// Re-export main types
pub use api::GbpApi;
pub use config::{ConfigError, GbpConfig};
pub use error::{ApiError, FetchError, ResolutionError};
pub use locations::{LocationDirectory, LocationResolver, LocationsListing};
pub use models::{
    Account, Location, PhoneNumbers, PostalAddress, ReviewRecord, ReviewReply, Reviewer,
    StarRating,
};
pub use reviews::{ReplyReceipt, ReviewPage, ReviewPaginator, MAX_PAGE_SIZE, MAX_REPLY_LEN};
pub use service::{ReviewService, ServiceResult};
pub use stats::{aggregate_by_day, DayStat, RatingDistribution};
