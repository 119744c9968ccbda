//! MCP server implementation
//!
//! This module provides the MCP server that exposes the review management
//! tools over JSON-RPC. The server owns a registry of [`Tool`]
//! implementations and dispatches `initialize`, `tools/list`, `tools/call`
//! and `ping` requests to them.
//!
//! Tool failures are reported in-band as a [`ToolResult`] with `is_error`
//! set, not as JSON-RPC protocol errors. Protocol errors are reserved for
//! malformed requests and unknown methods.

use crate::types::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// MCP server error types.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for MCP server operations.
pub type McpServerResult<T> = Result<T, McpServerError>;

/// Trait for tool implementations.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with given arguments.
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<ToolResult>;
}

/// MCP server for Business Profile review management.
pub struct McpServer {
    /// Server info
    info: ServerInfo,

    /// Server capabilities
    capabilities: ServerCapabilities,

    /// Registered tools
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolCapabilities {
                    list_changed: false,
                }),
            },
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a tool.
    pub async fn register_tool(&self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        debug!(tool = %name, "Registering tool");

        let mut tools = self.tools.write().await;
        tools.insert(name, tool);
    }

    /// Register multiple tools.
    pub async fn register_tools(&self, tools: Vec<Arc<dyn Tool>>) {
        for tool in tools {
            self.register_tool(tool).await;
        }
    }

    /// Get all tool definitions, sorted by name.
    pub async fn list_tools(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        let mut definitions: Vec<ToolDefinition> =
            tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> McpServerResult<ToolResult> {
        let tool = {
            let tools = self.tools.read().await;
            tools
                .get(name)
                .cloned()
                .ok_or_else(|| McpServerError::ToolNotFound(name.to_string()))?
        };

        tool.execute(arguments).await
    }

    /// Handle an MCP request.
    pub async fn handle_request(&self, request: McpRequest) -> McpResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => McpResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request.id).await,
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => {
                warn!(method = %request.method, "Unknown method");
                McpResponse::error(request.id, McpError::method_not_found(&request.method))
            }
        }
    }

    fn handle_initialize(&self, id: RequestId) -> McpResponse {
        McpResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": self.capabilities,
                "serverInfo": self.info
            }),
        )
    }

    async fn handle_tools_list(&self, id: RequestId) -> McpResponse {
        let tools = self.list_tools().await;
        McpResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(
        &self,
        id: RequestId,
        params: Option<serde_json::Value>,
    ) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        match self.call_tool(&call.name, call.arguments).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => McpResponse::success(id, value),
                Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
            },
            // Bad arguments and unknown tools are the caller's mistake and
            // map to JSON-RPC errors; everything downstream of a valid call
            // comes back as an in-band tool failure.
            Err(McpServerError::ToolNotFound(name)) => McpResponse::error(
                id,
                McpError::invalid_params(format!("Unknown tool: {}", name)),
            ),
            Err(McpServerError::InvalidParams(message)) => {
                McpResponse::error(id, McpError::invalid_params(message))
            }
            Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
        }
    }

    /// Get server info.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get server capabilities.
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }
}
