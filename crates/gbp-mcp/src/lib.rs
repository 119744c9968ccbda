//! # GBP MCP
//!
//! MCP (Model Context Protocol) server exposing Google Business Profile
//! review management to AI assistants.
//!
//! ## Overview
//!
//! The gbp-mcp crate handles:
//! - **JSON-RPC**: MCP protocol types and request dispatch
//! - **Tools**: the review management tool set, backed by a shared
//!   [`gbp_client::ReviewService`]
//! - **Stdio transport**: the `gbp-mcp` binary serving one request per
//!   line on stdin with logging on stderr
//!
//! ## MCP Protocol
//!
//! Supported methods:
//! - `initialize`: Initialize the MCP session
//! - `tools/list`: List available tools
//! - `tools/call`: Execute a tool
//! - `ping`: Liveness check
//!
//! ## Available Tools
//!
//! - `listLocations`: List business locations across all accounts
//! - `getReviews`: Get the next page of unreplied customer reviews
//! - `getReviewStats`: Per-day review statistics for a location
//! - `replyToReview`: Post a public reply to a review
//! - `getBusinessProfile`: Get a location's business profile
//!
//! Tool failures are reported in-band in the tool result, carrying a
//! stable error code; protocol errors are reserved for malformed requests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gbp_auth::TokenLifecycleManager;
//! use gbp_client::{GbpConfig, ReviewService};
//! use gbp_mcp::server::McpServer;
//! use gbp_mcp::tools::register_review_tools;
//! use gbp_mcp::types::McpRequest;
//! use std::sync::Arc;
//!
//! async fn setup() {
//!     let config = GbpConfig::from_env();
//!     let auth = Arc::new(TokenLifecycleManager::new(config.oauth_config()));
//!     let service = Arc::new(ReviewService::new(config, auth).unwrap());
//!
//!     let server = McpServer::new("gbp-mcp", "0.1.0");
//!     register_review_tools(&server, service).await;
//!
//!     let request = McpRequest::new("1", "tools/list");
//!     let response = server.handle_request(request).await;
//!     println!("{}", serde_json::to_string(&response).unwrap());
//! }
//! ```

pub mod server;
pub mod tools;
pub mod types;

// Re-export main types
pub use server::{McpServer, McpServerError, McpServerResult, Tool};
pub use tools::{
    register_review_tools, GetBusinessProfileTool, GetReviewStatsTool, GetReviewsTool,
    ListLocationsTool, ReplyToReviewTool,
};
pub use types::{
    ContentBlock, McpError, McpRequest, McpResponse, RequestId, ServerCapabilities, ServerInfo,
    ToolCall, ToolCapabilities, ToolDefinition, ToolResult,
};
