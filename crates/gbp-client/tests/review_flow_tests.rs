//! End-to-end tests for the review retrieval and reply flows.
//!
//! These tests run the full service stack (token manager, API executor,
//! resolver, paginator, facade) against wiremock servers simulating the
//! OAuth token endpoint and the Business Profile APIs, and verify the
//! exact number of upstream fetches each flow performs.

use chrono::{Duration, Utc};
use gbp_auth::{OAuthTokenSet, TokenLifecycleManager};
use gbp_client::{
    GbpApi, GbpConfig, LocationResolver, ReviewService, ServiceResult, StarRating,
};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test fixture running every Google endpoint on one mock server.
struct TestFixture {
    server: MockServer,
    service: ReviewService,
    auth: Arc<TokenLifecycleManager>,
    api: Arc<GbpApi>,
}

impl TestFixture {
    /// Create a fixture with valid (non-expired) credentials installed.
    async fn new() -> Self {
        Self::with_token_expiry(3600).await
    }

    /// Create a fixture whose access token expires `expires_in` seconds
    /// from now (negative for already expired).
    async fn with_token_expiry(expires_in: i64) -> Self {
        let server = MockServer::start().await;

        let config = GbpConfig {
            api_url: format!("{}/v4", server.uri()),
            account_api_url: format!("{}/v1", server.uri()),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost/callback".to_string(),
            timeout_secs: 5,
        };

        let oauth = config
            .oauth_config()
            .with_token_endpoint(format!("{}/token", server.uri()));
        let auth = Arc::new(TokenLifecycleManager::new(oauth));
        auth.restore(OAuthTokenSet {
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            scope: String::new(),
            token_type: "Bearer".to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
        .await;

        let api = Arc::new(GbpApi::new(config, Arc::clone(&auth)).unwrap());
        let service = ReviewService::with_api(Arc::clone(&api));

        Self {
            server,
            service,
            auth,
            api,
        }
    }

    /// Mount the single-account lookup used by short-form resolution.
    async fn mount_first_account(&self, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/accounts"))
            .and(query_param("pageSize", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accounts": [{"name": "accounts/9"}]
            })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }
}

fn review_json(id: &str, rating: &str, replied: bool, create_time: &str) -> serde_json::Value {
    let mut review = serde_json::json!({
        "reviewId": id,
        "reviewer": {"displayName": "Jamie"},
        "starRating": rating,
        "comment": format!("Comment from {id}"),
        "createTime": create_time,
        "updateTime": create_time
    });
    if replied {
        review["reviewReply"] = serde_json::json!({
            "comment": "Thanks!",
            "updateTime": create_time
        });
    }
    review
}

fn reviews_page(
    reviews: Vec<serde_json::Value>,
    next_page_token: Option<&str>,
    total: u32,
) -> serde_json::Value {
    let mut page = serde_json::json!({
        "reviews": reviews,
        "totalReviewCount": total
    });
    if let Some(token) = next_page_token {
        page["nextPageToken"] = serde_json::json!(token);
    }
    page
}

// =============================================================================
// Path resolution
// =============================================================================

/// Fully-qualified input resolves to itself with zero network calls, twice.
#[tokio::test]
async fn test_resolve_fully_qualified_is_idempotent_and_offline() {
    let fixture = TestFixture::new().await;

    // Any account lookup would violate this expectation.
    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let resolver = LocationResolver::new(Arc::clone(&fixture.api));
    let first = resolver.resolve("accounts/9/locations/456").await.unwrap();
    let second = resolver.resolve(&first).await.unwrap();

    assert_eq!(first, "accounts/9/locations/456");
    assert_eq!(second, first);
}

/// Short-form resolution looks up the account every time; it is not cached.
#[tokio::test]
async fn test_resolve_short_form_consults_accounts_each_time() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(2).await;

    let resolver = LocationResolver::new(Arc::clone(&fixture.api));
    let first = resolver.resolve("locations/456").await.unwrap();
    let second = resolver.resolve("locations/456").await.unwrap();

    assert_eq!(first, "accounts/9/locations/456");
    assert_eq!(second, first);
}

/// An empty account list fails resolution.
#[tokio::test]
async fn test_resolve_with_no_accounts() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"accounts": []})),
        )
        .mount(&fixture.server)
        .await;

    let result = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await;

    match result {
        ServiceResult::Failure { code, .. } => assert_eq!(code, "NO_ACCOUNTS_FOUND"),
        ServiceResult::Success { .. } => panic!("expected failure"),
    }
}

// =============================================================================
// Unreplied pagination
// =============================================================================

/// Scenario A: one page, mixed replied/unreplied, no further pages.
#[tokio::test]
async fn test_single_page_filters_replied_reviews() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![
                review_json("review-a", "FIVE", false, "2024-10-15T14:30:00Z"),
                review_json("review-b", "TWO", true, "2024-10-14T10:00:00Z"),
            ],
            None,
            2,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let page = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(page.reviews.len(), 1);
    assert_eq!(page.reviews[0].review_id, "review-a");
    assert!(page.reviews.iter().all(|r| !r.is_replied()));
    assert!(page.next_page_token.is_none());
    assert_eq!(page.total_size, 2);
}

/// Scenario B: page 1 is all replied, page 2 holds the actionable review.
/// Exactly two upstream fetches happen.
#[tokio::test]
async fn test_empty_filtered_page_is_skipped() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    // Mount the cursor-specific page first: first matching mock wins.
    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .and(query_param("pageToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-d", "THREE", false, "2024-10-10T09:00:00Z")],
            None,
            2,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-c", "FOUR", true, "2024-10-12T09:00:00Z")],
            Some("tok2"),
            2,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let page = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(page.reviews.len(), 1);
    assert_eq!(page.reviews[0].review_id, "review-d");
    assert!(page.next_page_token.is_none());
}

/// Skip invariant for k = 3: two all-replied pages, then the actionable one.
#[tokio::test]
async fn test_walk_skips_multiple_exhausted_pages() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .and(query_param("pageToken", "tok3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-f", "ONE", false, "2024-10-01T09:00:00Z")],
            Some("tok4"),
            10,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .and(query_param("pageToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-e", "FIVE", true, "2024-10-02T09:00:00Z")],
            Some("tok3"),
            10,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-c", "FOUR", true, "2024-10-03T09:00:00Z")],
            Some("tok2"),
            10,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let page = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(page.reviews.len(), 1);
    assert_eq!(page.reviews[0].review_id, "review-f");
    assert_eq!(page.next_page_token.as_deref(), Some("tok4"));
}

/// A location with zero reviews yields an empty success, not an error.
#[tokio::test]
async fn test_zero_reviews_is_empty_success() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let page = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await
        .into_data()
        .expect("should succeed");

    assert!(page.reviews.is_empty());
    assert!(page.next_page_token.is_none());
}

/// An upstream that repeats the same cursor is treated as exhausted.
#[tokio::test]
async fn test_repeated_cursor_treated_as_exhaustion() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    // Every request gets the same all-replied page with the same cursor.
    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-c", "FOUR", true, "2024-10-12T09:00:00Z")],
            Some("tok1"),
            1,
        )))
        .expect(2)
        .mount(&fixture.server)
        .await;

    let page = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await
        .into_data()
        .expect("should succeed");

    assert!(page.reviews.is_empty());
    assert!(page.next_page_token.is_none());
}

/// Upstream HTTP errors surface with status and body preserved.
#[tokio::test]
async fn test_upstream_error_carries_status_and_body() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .mount(&fixture.server)
        .await;

    let result = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await;

    match result {
        ServiceResult::Failure { error, code } => {
            assert_eq!(code, "HTTP_STATUS");
            assert!(error.contains("429"));
            assert!(error.contains("rate limit exceeded"));
        }
        ServiceResult::Success { .. } => panic!("expected failure"),
    }
}

// =============================================================================
// Token lifecycle through the API boundary
// =============================================================================

/// An expired access token triggers exactly one refresh before the call.
#[tokio::test]
async fn test_expired_token_refreshes_once_before_api_call() {
    let fixture = TestFixture::with_token_expiry(-10).await;
    fixture.mount_first_account(1).await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-2",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-a", "FIVE", false, "2024-10-15T14:30:00Z")],
            None,
            1,
        )))
        .mount(&fixture.server)
        .await;

    let result = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await;

    assert!(result.is_success());
    assert_eq!(fixture.auth.bearer_token().await.unwrap(), "access-2");
}

/// With no credentials at all, the failure surfaces before any API call.
#[tokio::test]
async fn test_unauthenticated_fails_without_network() {
    let fixture = TestFixture::new().await;
    fixture.auth.revoke().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let result = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await;

    match result {
        ServiceResult::Failure { code, .. } => assert_eq!(code, "NOT_AUTHENTICATED"),
        ServiceResult::Success { .. } => panic!("expected failure"),
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// The stats path keeps replied reviews and aggregates by day.
#[tokio::test]
async fn test_stats_include_replied_reviews() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![
                review_json("review-a", "FIVE", false, "2024-10-15T14:30:00Z"),
                review_json("review-b", "ONE", true, "2024-10-15T09:00:00Z"),
            ],
            None,
            2,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let stats = fixture
        .service
        .get_review_stats("locations/456")
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(stats.len(), 1);
    let day = &stats[0];
    assert_eq!(day.date, "2024-10-15");
    assert_eq!(day.count, 2);
    assert_eq!(day.average_rating, 3.0);
    assert_eq!(day.distribution.five, 1);
    assert_eq!(day.distribution.one, 1);
}

/// The stats drain follows the cursor across pages.
#[tokio::test]
async fn test_stats_drain_follows_cursor() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .and(query_param("pageToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-b", "THREE", true, "2024-10-14T09:00:00Z")],
            None,
            2,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-a", "FIVE", false, "2024-10-15T14:30:00Z")],
            Some("tok2"),
            2,
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let stats = fixture
        .service
        .get_review_stats("locations/456")
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].date, "2024-10-15");
    assert_eq!(stats[1].date, "2024-10-14");
}

// =============================================================================
// Reply posting
// =============================================================================

/// A 4096-character reply is accepted; 4097 is rejected before any call.
#[tokio::test]
async fn test_reply_length_boundary() {
    let fixture = TestFixture::new().await;

    Mock::given(method("PUT"))
        .and(path("/v4/accounts/9/locations/456/reviews/review-a/reply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "comment": "x",
            "updateTime": "2024-10-16T08:00:00Z"
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let too_long = "x".repeat(4097);
    let result = fixture
        .service
        .post_reply("accounts/9/locations/456", "review-a", &too_long)
        .await;
    match result {
        ServiceResult::Failure { code, .. } => assert_eq!(code, "REPLY_TOO_LONG"),
        ServiceResult::Success { .. } => panic!("expected failure"),
    }

    let at_limit = "x".repeat(4096);
    let receipt = fixture
        .service
        .post_reply("accounts/9/locations/456", "review-a", &at_limit)
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(receipt.reply_id, "review-a");
    assert_eq!(receipt.posted_at, "2024-10-16T08:00:00Z");
}

// =============================================================================
// Location listing
// =============================================================================

/// One failing account is skipped; the rest of the listing survives.
#[tokio::test]
async fn test_listing_recovers_from_partial_account_failure() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .and(query_param("pageSize", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accounts": [{"name": "accounts/1"}, {"name": "accounts/2"}]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/1/locations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(1)
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/2/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "locations": [{"name": "locations/456", "title": "Baker Street Cafe"}]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let listing = fixture
        .service
        .list_locations()
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(listing.locations.len(), 1);
    assert_eq!(
        listing.locations[0].title.as_deref(),
        Some("Baker Street Cafe")
    );
}

/// Every account failing surfaces as a failure, not an empty success.
#[tokio::test]
async fn test_listing_fails_when_no_account_reachable() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .and(query_param("pageSize", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accounts": [{"name": "accounts/1"}]
        })))
        .mount(&fixture.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/1/locations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&fixture.server)
        .await;

    let result = fixture.service.list_locations().await;
    match result {
        ServiceResult::Failure { code, .. } => assert_eq!(code, "HTTP_STATUS"),
        ServiceResult::Success { .. } => panic!("expected failure"),
    }
}

/// Business profile lookup defaults to the first location.
#[tokio::test]
async fn test_business_profile_defaults_to_first_location() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/9/locations"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "locations": [{
                "name": "locations/456",
                "title": "Baker Street Cafe",
                "websiteUri": "https://bakerstreet.example.com"
            }]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let location = fixture
        .service
        .get_business_profile(None)
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(location.title.as_deref(), Some("Baker Street Cafe"));
}

/// Star ratings survive the full round trip as wire names.
#[tokio::test]
async fn test_star_rating_round_trip() {
    let fixture = TestFixture::new().await;
    fixture.mount_first_account(1).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/9/locations/456/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_page(
            vec![review_json("review-a", "TWO", false, "2024-10-15T14:30:00Z")],
            None,
            1,
        )))
        .mount(&fixture.server)
        .await;

    let page = fixture
        .service
        .get_reviews("locations/456", None, None)
        .await
        .into_data()
        .expect("should succeed");

    assert_eq!(page.reviews[0].star_rating, StarRating::Two);
    let json = serde_json::to_value(&page.reviews[0]).unwrap();
    assert_eq!(json["starRating"], "TWO");
}
