//! MCP server binary.
//!
//! Speaks JSON-RPC over stdio: one request per line on stdin, one response
//! per line on stdout. All logging goes to stderr so stdout stays a clean
//! protocol channel.

use gbp_auth::{OAuthTokenSet, TokenLifecycleManager};
use gbp_client::{GbpConfig, ReviewService};
use gbp_mcp::server::McpServer;
use gbp_mcp::tools::register_review_tools;
use gbp_mcp::types::{McpError, McpRequest, McpResponse, RequestId};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GbpConfig::from_env();
    if let Err(e) = config.validate_for_production() {
        warn!(error = %e, "Incomplete OAuth configuration, authenticated calls will fail");
    }

    let auth = Arc::new(TokenLifecycleManager::new(config.oauth_config()));
    restore_credentials(&auth).await;

    let service = Arc::new(ReviewService::new(config, auth)?);

    let server = McpServer::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    register_review_tools(&server, service).await;

    info!("MCP server ready on stdio");
    run_stdio(&server).await?;

    info!("Input closed, shutting down");
    Ok(())
}

/// Seed the token manager from `GOOGLE_REFRESH_TOKEN` when present.
///
/// The restored access token is marked expired, so the first API call
/// performs a refresh exchange and picks up a real one.
async fn restore_credentials(auth: &TokenLifecycleManager) {
    if let Ok(refresh_token) = std::env::var("GOOGLE_REFRESH_TOKEN") {
        auth.restore(OAuthTokenSet {
            access_token: String::new(),
            refresh_token: Some(refresh_token),
            scope: String::new(),
            token_type: "Bearer".to_string(),
            expires_at: chrono::Utc::now(),
        })
        .await;
        info!("Restored credentials from environment");
    } else {
        warn!("GOOGLE_REFRESH_TOKEN not set, starting unauthenticated");
    }
}

/// Serve requests line by line until stdin closes.
async fn run_stdio(server: &McpServer) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<McpRequest>(line) {
            Ok(request) => {
                // Notifications carry no id and must not be answered.
                if request.is_notification() {
                    continue;
                }
                server.handle_request(request).await
            }
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                McpResponse::error(RequestId::Null, McpError::parse_error())
            }
        };

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }

    Ok(())
}
