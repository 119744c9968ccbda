//! The sole authenticated HTTP boundary.
//!
//! Every upstream call funnels through [`GbpApi`]: the token lifecycle
//! manager is asked to freshen credentials immediately before each request,
//! a Bearer header is built from the current access token, and non-2xx
//! responses are translated uniformly with the raw body text preserved.
//! Successful responses are returned as JSON verbatim; entity mapping is
//! the caller's responsibility.

use crate::config::GbpConfig;
use crate::error::ApiError;
use crate::models::{Account, RawAccountsPage};
use gbp_auth::TokenLifecycleManager;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Authenticated request executor for the Business Profile APIs.
#[derive(Clone)]
pub struct GbpApi {
    /// HTTP client instance.
    http: Client,

    /// Token lifecycle manager, injected and shared.
    auth: Arc<TokenLifecycleManager>,

    /// Client configuration (base URLs, timeout).
    config: GbpConfig,
}

impl GbpApi {
    /// Create a new executor.
    pub fn new(config: GbpConfig, auth: Arc<TokenLifecycleManager>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, auth, config })
    }

    /// The client configuration.
    pub fn config(&self) -> &GbpConfig {
        &self.config
    }

    /// Authenticated GET against the reviews API.
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.config.api_url(path);
        self.send(self.http.get(&url)).await
    }

    /// Authenticated GET against the reviews API with query parameters.
    #[instrument(skip(self, query))]
    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.config.api_url(path);
        self.send(self.http.get(&url).query(query)).await
    }

    /// Authenticated GET against the account management API.
    #[instrument(skip(self, query))]
    pub async fn get_account_api(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.config.account_api_url(path);
        self.send(self.http.get(&url).query(query)).await
    }

    /// Authenticated PUT against the reviews API.
    #[instrument(skip(self, body))]
    pub async fn put(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.config.api_url(path);
        self.send(self.http.put(&url).json(body)).await
    }

    /// Authenticated POST against the reviews API.
    #[instrument(skip(self, body))]
    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.config.api_url(path);
        self.send(self.http.post(&url).json(body)).await
    }

    /// Fetch the first account of the authenticated user.
    ///
    /// Page size 1 is sufficient: the path resolver only ever uses the
    /// first account.
    pub async fn get_first_account(&self) -> Result<Option<Account>, ApiError> {
        let value = self
            .get_account_api("/accounts", &[("pageSize", "1".to_string())])
            .await?;

        let page: RawAccountsPage = serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed accounts page: {}", e)))?;

        Ok(page.accounts.into_iter().next())
    }

    /// Freshen credentials, send the request, translate the response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, ApiError> {
        self.auth.ensure_fresh().await?;
        let token = self.auth.bearer_token().await?;

        let response = request
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "Upstream API error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Upstream API call succeeded");
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
