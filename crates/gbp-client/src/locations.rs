//! Location path resolution and location listing.
//!
//! Callers and stored review identifiers mostly carry only the location
//! segment (`locations/{id}`), but the upstream hierarchy needs the
//! two-level `accounts/{a}/locations/{id}` path. [`LocationResolver`]
//! qualifies short references lazily, consulting the account list exactly
//! once per resolution; already-qualified paths pass through with zero
//! network calls.

use crate::api::GbpApi;
use crate::error::ResolutionError;
use crate::models::{Location, RawAccountsPage, RawLocationsPage};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Fields requested when listing or fetching locations.
const LOCATION_READ_MASK: &str = "name,title,phoneNumbers,websiteUri,storefrontAddress";

/// Page size used when listing locations per account.
const LOCATIONS_PAGE_SIZE: u32 = 100;

/// Resolves short location references to fully-qualified resource paths.
#[derive(Clone)]
pub struct LocationResolver {
    api: Arc<GbpApi>,
}

impl LocationResolver {
    /// Create a new resolver.
    pub fn new(api: Arc<GbpApi>) -> Self {
        Self { api }
    }

    /// Turn a possibly-short location reference into a fully-qualified path.
    ///
    /// Inputs that already contain the `accounts/` segment are returned
    /// unchanged without any network call; idempotence here is a hard
    /// requirement, not an optimization. Short references are prefixed
    /// with the first account's path.
    #[instrument(skip(self))]
    pub async fn resolve(&self, location_ref: &str) -> Result<String, ResolutionError> {
        if location_ref.contains("accounts/") {
            return Ok(location_ref.to_string());
        }

        let account = self
            .api
            .get_first_account()
            .await?
            .ok_or(ResolutionError::NoAccountsFound)?;

        let path = format!("{}/{}", account.name, location_ref);
        debug!(path = %path, "Resolved location reference");
        Ok(path)
    }
}

/// A page of locations across accounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsListing {
    /// Locations found.
    pub locations: Vec<Location>,

    /// Continuation cursor over the account listing, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Lists locations across every account of the authenticated user.
#[derive(Clone)]
pub struct LocationDirectory {
    api: Arc<GbpApi>,
}

impl LocationDirectory {
    /// Create a new directory.
    pub fn new(api: Arc<GbpApi>) -> Self {
        Self { api }
    }

    /// List locations for all accounts.
    ///
    /// One account's location fetch failing is recovered locally: that
    /// account is skipped with a warning and listing continues. Zero
    /// accounts reachable surfaces as a failure.
    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<LocationsListing, ResolutionError> {
        let value = self
            .api
            .get_account_api("/accounts", &[("pageSize", "20".to_string())])
            .await?;

        let accounts_page: RawAccountsPage = serde_json::from_value(value).map_err(|e| {
            ResolutionError::Api(crate::error::ApiError::InvalidResponse(format!(
                "malformed accounts page: {}",
                e
            )))
        })?;

        if accounts_page.accounts.is_empty() {
            return Err(ResolutionError::NoAccountsFound);
        }

        let mut locations = Vec::new();
        let mut reachable = 0usize;
        let mut last_error = None;

        for account in &accounts_page.accounts {
            match self.locations_for_account(&account.name).await {
                Ok(mut batch) => {
                    reachable += 1;
                    locations.append(&mut batch);
                }
                Err(e) => {
                    warn!(account = %account.name, error = %e, "Skipping account, location fetch failed");
                    last_error = Some(e);
                }
            }
        }

        if reachable == 0 {
            // All accounts failed; surface the last error instead of an
            // empty success.
            return Err(last_error
                .map(ResolutionError::Api)
                .unwrap_or(ResolutionError::NoAccountsFound));
        }

        Ok(LocationsListing {
            locations,
            next_page_token: accounts_page.next_page_token,
        })
    }

    /// Fetch one location's profile by fully-qualified path.
    pub async fn get_location(&self, path: &str) -> Result<Location, ResolutionError> {
        let value = self
            .api
            .get_account_api(path, &[("readMask", LOCATION_READ_MASK.to_string())])
            .await?;
        Ok(Location::from_raw(value)?)
    }

    /// Fetch the first location of the first account.
    pub async fn first_location(&self) -> Result<Location, ResolutionError> {
        let account = self
            .api
            .get_first_account()
            .await?
            .ok_or(ResolutionError::NoAccountsFound)?;

        let mut batch = self.locations_for_page(&account.name, 1).await?;
        let first = batch
            .drain(..)
            .next()
            .ok_or(ResolutionError::NoLocationsFound);
        first
    }

    async fn locations_for_account(
        &self,
        account_name: &str,
    ) -> Result<Vec<Location>, crate::error::ApiError> {
        self.locations_for_page(account_name, LOCATIONS_PAGE_SIZE)
            .await
    }

    async fn locations_for_page(
        &self,
        account_name: &str,
        page_size: u32,
    ) -> Result<Vec<Location>, crate::error::ApiError> {
        let path = format!("{}/locations", account_name);
        let value = self
            .api
            .get_account_api(
                &path,
                &[
                    ("readMask", LOCATION_READ_MASK.to_string()),
                    ("pageSize", page_size.to_string()),
                ],
            )
            .await?;

        let page: RawLocationsPage = serde_json::from_value(value).map_err(|e| {
            crate::error::ApiError::InvalidResponse(format!("malformed locations page: {}", e))
        })?;

        page.locations.into_iter().map(Location::from_raw).collect()
    }
}
