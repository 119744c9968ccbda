//! Review management MCP tools
//!
//! Tools for listing business locations, fetching unreplied reviews,
//! aggregating review statistics, and posting replies. Every tool holds a
//! shared [`ReviewService`] handle injected at construction time, so the
//! whole tool set works against one authenticated account and tests can
//! substitute a service wired to mock endpoints.
//!
//! Service failures never become protocol errors: the [`ServiceResult`]
//! envelope (status, data or error and code) is serialized into the tool
//! result, with `is_error` reflecting the outcome.

use crate::server::{McpServerError, McpServerResult, Tool};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use gbp_client::{ReviewService, ServiceResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Convert a service outcome into an in-band tool result.
fn to_tool_result<T: serde::Serialize>(result: ServiceResult<T>) -> McpServerResult<ToolResult> {
    let is_error = !result.is_success();
    let value = serde_json::to_value(&result)
        .map_err(|e| McpServerError::Internal(e.to_string()))?;

    let mut tool_result = ToolResult::json(value);
    tool_result.is_error = is_error;
    Ok(tool_result)
}

/// Register the full review management tool set on a server.
pub async fn register_review_tools(server: &crate::server::McpServer, service: Arc<ReviewService>) {
    server
        .register_tools(vec![
            Arc::new(ListLocationsTool::new(Arc::clone(&service))) as Arc<dyn Tool>,
            Arc::new(GetReviewsTool::new(Arc::clone(&service))),
            Arc::new(GetReviewStatsTool::new(Arc::clone(&service))),
            Arc::new(ReplyToReviewTool::new(Arc::clone(&service))),
            Arc::new(GetBusinessProfileTool::new(service)),
        ])
        .await;
}

/// Tool to list all business locations of the authenticated user.
pub struct ListLocationsTool {
    service: Arc<ReviewService>,
}

impl ListLocationsTool {
    /// Create the tool around a shared service handle.
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListLocationsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "listLocations",
            "List all Google Business Profile locations for the authenticated user",
        )
    }

    #[instrument(skip(self, _args), fields(tool = "listLocations"))]
    async fn execute(&self, _args: serde_json::Value) -> McpServerResult<ToolResult> {
        debug!("Listing locations");
        to_tool_result(self.service.list_locations().await)
    }
}

/// Tool to fetch the next page of unreplied reviews for a location.
pub struct GetReviewsTool {
    service: Arc<ReviewService>,
}

impl GetReviewsTool {
    /// Create the tool around a shared service handle.
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetReviewsParams {
    location_id: String,
    page_size: Option<u32>,
    page_token: Option<String>,
}

#[async_trait]
impl Tool for GetReviewsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "getReviews",
            "Get customer reviews that have not been replied to yet, one page at a time",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "locationId": {
                    "type": "string",
                    "description": "Location reference, either 'locations/{id}' or 'accounts/{a}/locations/{id}'"
                },
                "pageSize": {
                    "type": "integer",
                    "description": "Reviews per page, 1-50 (default 50)"
                },
                "pageToken": {
                    "type": "string",
                    "description": "Continuation token from a previous page"
                }
            },
            "required": ["locationId"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "getReviews"))]
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<ToolResult> {
        let params: GetReviewsParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        debug!(location = %params.location_id, "Fetching unreplied reviews");

        to_tool_result(
            self.service
                .get_reviews(&params.location_id, params.page_size, params.page_token)
                .await,
        )
    }
}

/// Tool to aggregate day-level review statistics for a location.
pub struct GetReviewStatsTool {
    service: Arc<ReviewService>,
}

impl GetReviewStatsTool {
    /// Create the tool around a shared service handle.
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetReviewStatsParams {
    location_id: String,
}

#[async_trait]
impl Tool for GetReviewStatsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "getReviewStats",
            "Get per-day review statistics (count, average rating, rating distribution, comments) for a location",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "locationId": {
                    "type": "string",
                    "description": "Location reference, either 'locations/{id}' or 'accounts/{a}/locations/{id}'"
                }
            },
            "required": ["locationId"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "getReviewStats"))]
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<ToolResult> {
        let params: GetReviewStatsParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        debug!(location = %params.location_id, "Aggregating review statistics");

        to_tool_result(self.service.get_review_stats(&params.location_id).await)
    }
}

/// Tool to post a reply to a customer review.
pub struct ReplyToReviewTool {
    service: Arc<ReviewService>,
}

impl ReplyToReviewTool {
    /// Create the tool around a shared service handle.
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyToReviewParams {
    location_id: String,
    review_id: String,
    comment: String,
}

#[async_trait]
impl Tool for ReplyToReviewTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "replyToReview",
            "Post a public reply to a customer review (up to 4096 characters)",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "locationId": {
                    "type": "string",
                    "description": "Location reference, either 'locations/{id}' or 'accounts/{a}/locations/{id}'"
                },
                "reviewId": {
                    "type": "string",
                    "description": "The review to reply to"
                },
                "comment": {
                    "type": "string",
                    "description": "Reply text, at most 4096 characters"
                }
            },
            "required": ["locationId", "reviewId", "comment"]
        }))
    }

    #[instrument(skip(self, args), fields(tool = "replyToReview"))]
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<ToolResult> {
        let params: ReplyToReviewParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        debug!(
            location = %params.location_id,
            review = %params.review_id,
            "Posting review reply"
        );

        to_tool_result(
            self.service
                .post_reply(&params.location_id, &params.review_id, &params.comment)
                .await,
        )
    }
}

/// Tool to fetch the business profile of a location.
pub struct GetBusinessProfileTool {
    service: Arc<ReviewService>,
}

impl GetBusinessProfileTool {
    /// Create the tool around a shared service handle.
    pub fn new(service: Arc<ReviewService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetBusinessProfileParams {
    location_id: Option<String>,
}

#[async_trait]
impl Tool for GetBusinessProfileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "getBusinessProfile",
            "Get the business profile (name, address, phone, website) for a location, defaulting to the user's first location",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "locationId": {
                    "type": "string",
                    "description": "Location reference; omit to use the first location of the first account"
                }
            },
            "required": []
        }))
    }

    #[instrument(skip(self, args), fields(tool = "getBusinessProfile"))]
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<ToolResult> {
        // Arguments are entirely optional for this tool.
        let params: GetBusinessProfileParams = if args.is_null() {
            GetBusinessProfileParams::default()
        } else {
            serde_json::from_value(args)
                .map_err(|e| McpServerError::InvalidParams(e.to_string()))?
        };

        to_tool_result(
            self.service
                .get_business_profile(params.location_id.as_deref())
                .await,
        )
    }
}
