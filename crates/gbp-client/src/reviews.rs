//! Review pagination and reply posting.
//!
//! The upstream review listing is cursor-paginated and unfiltered, but the
//! interesting question for a caller is "what still needs a reply?". The
//! [`ReviewPaginator`] answers it without making the caller loop: it walks
//! pages, filters out replied reviews, and keeps consuming cursors until a
//! page yields actionable work or upstream runs out of pages. An empty
//! result therefore always means "nothing left to reply to", never "this
//! particular page happened to be all replied".
//!
//! The walk is an explicit loop with a cursor variable rather than
//! recursion, capped defensively, and guarded against an upstream that
//! hands back the same cursor twice.

use crate::api::GbpApi;
use crate::error::FetchError;
use crate::locations::LocationResolver;
use crate::models::{RawReviewsPage, ReviewRecord};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Upstream maximum page size for review listing.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Upstream maximum reply length in characters.
pub const MAX_REPLY_LEN: usize = 4096;

/// Defensive cap on the number of upstream pages consumed in one walk.
///
/// Termination is expected via cursor absence; the cap only guards against
/// a pathological upstream.
const MAX_PAGE_WALK: u32 = 100;

/// One page of reviews returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    /// Reviews on this page.
    pub reviews: Vec<ReviewRecord>,

    /// Opaque continuation cursor, passed through from upstream unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,

    /// Total number of reviews for the location (replied and unreplied).
    pub total_size: u32,
}

/// Receipt for a posted reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyReceipt {
    /// Id of the review that was replied to.
    pub reply_id: String,

    /// When upstream recorded the reply (ISO-8601).
    pub posted_at: String,
}

/// Retrieves actionable (unreplied) reviews and posts replies.
#[derive(Clone)]
pub struct ReviewPaginator {
    api: Arc<GbpApi>,
    resolver: LocationResolver,
}

impl ReviewPaginator {
    /// Create a new paginator.
    pub fn new(api: Arc<GbpApi>, resolver: LocationResolver) -> Self {
        Self { api, resolver }
    }

    /// Get the next page of unreplied reviews for a location.
    ///
    /// Pages whose unreplied subset is empty are skipped transparently:
    /// the walk continues with the upstream cursor until some page yields
    /// unreplied reviews or no further cursor is returned. The returned
    /// list may be empty only in the latter case.
    #[instrument(skip(self, page_token))]
    pub async fn unreplied_page(
        &self,
        location_ref: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<ReviewPage, FetchError> {
        let path = self.resolver.resolve(location_ref).await?;

        let mut cursor = page_token;
        let mut pages_fetched = 0u32;

        loop {
            if pages_fetched >= MAX_PAGE_WALK {
                return Err(FetchError::PaginationExhausted {
                    pages: pages_fetched,
                });
            }
            pages_fetched += 1;

            let page = self.fetch_page(&path, page_size, cursor.as_deref()).await?;
            let next = page.next_page_token;
            let total_size = page.total_size;

            let unreplied: Vec<ReviewRecord> = page
                .reviews
                .into_iter()
                .filter(|r| !r.is_replied())
                .collect();

            if !unreplied.is_empty() || next.is_none() {
                debug!(
                    pages_fetched,
                    unreplied = unreplied.len(),
                    "Unreplied review walk finished"
                );
                return Ok(ReviewPage {
                    reviews: unreplied,
                    next_page_token: next,
                    total_size,
                });
            }

            // A cursor identical to the one just consumed would loop
            // forever; treat it as exhaustion.
            if next == cursor {
                warn!(pages_fetched, "Upstream repeated a page cursor, treating as exhausted");
                return Ok(ReviewPage {
                    reviews: Vec::new(),
                    next_page_token: None,
                    total_size,
                });
            }

            cursor = next;
        }
    }

    /// Get one page of reviews without the unreplied filter.
    ///
    /// Used by the statistics path, which needs every review including
    /// replied ones.
    #[instrument(skip(self, page_token))]
    pub async fn full_page(
        &self,
        location_ref: &str,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<ReviewPage, FetchError> {
        let path = self.resolver.resolve(location_ref).await?;
        let page = self.fetch_page(&path, page_size, page_token.as_deref()).await?;
        Ok(page)
    }

    /// Drain the complete review set for a location, following the cursor
    /// until upstream stops issuing one.
    pub async fn all_reviews(&self, location_ref: &str) -> Result<Vec<ReviewRecord>, FetchError> {
        let path = self.resolver.resolve(location_ref).await?;

        let mut reviews = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages_fetched = 0u32;

        loop {
            if pages_fetched >= MAX_PAGE_WALK {
                return Err(FetchError::PaginationExhausted {
                    pages: pages_fetched,
                });
            }
            pages_fetched += 1;

            let mut page = self.fetch_page(&path, MAX_PAGE_SIZE, cursor.as_deref()).await?;
            reviews.append(&mut page.reviews);

            match page.next_page_token {
                Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
                Some(_) => {
                    warn!(pages_fetched, "Upstream repeated a page cursor, stopping drain");
                    break;
                }
                None => break,
            }
        }

        Ok(reviews)
    }

    /// Post a reply to a review.
    ///
    /// Replies longer than [`MAX_REPLY_LEN`] characters are rejected
    /// before any network call.
    #[instrument(skip(self, reply_text))]
    pub async fn post_reply(
        &self,
        location_ref: &str,
        review_id: &str,
        reply_text: &str,
    ) -> Result<ReplyReceipt, FetchError> {
        let len = reply_text.chars().count();
        if len > MAX_REPLY_LEN {
            return Err(FetchError::ReplyTooLong {
                len,
                max: MAX_REPLY_LEN,
            });
        }

        let path = self.resolver.resolve(location_ref).await?;
        let reply_path = format!("{}/reviews/{}/reply", path, review_id);

        let value = self
            .api
            .put(&reply_path, &serde_json::json!({ "comment": reply_text }))
            .await?;

        let posted_at = value
            .get("updateTime")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        Ok(ReplyReceipt {
            reply_id: review_id.to_string(),
            posted_at,
        })
    }

    /// Fetch and map one raw page of reviews.
    async fn fetch_page(
        &self,
        path: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ReviewPage, FetchError> {
        let reviews_path = format!("{}/reviews", path);

        let mut query = vec![("pageSize", page_size.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let value = self.api.get_with_query(&reviews_path, &query).await?;

        let raw: RawReviewsPage = serde_json::from_value(value).map_err(|e| {
            crate::error::ApiError::InvalidResponse(format!("malformed reviews page: {}", e))
        })?;

        let reviews: Vec<ReviewRecord> = raw
            .reviews
            .into_iter()
            .map(ReviewRecord::from_raw)
            .collect::<Result<_, _>>()
            .map_err(FetchError::Api)?;

        let total_size = raw.total_review_count.unwrap_or(reviews.len() as u32);

        Ok(ReviewPage {
            reviews,
            next_page_token: raw.next_page_token,
            total_size,
        })
    }
}
