//! # GBP Auth
//!
//! This crate provides the OAuth 2.0 token lifecycle for the Google
//! Business Profile MCP server.
//!
//! ## Overview
//!
//! The gbp-auth crate handles:
//! - **Token ownership**: the current credential set lives in exactly one
//!   place, an injectable [`TokenLifecycleManager`]
//! - **Refresh-on-demand**: [`TokenLifecycleManager::ensure_fresh`] is
//!   called before every authenticated API request and refreshes at most
//!   once, with zero network calls while the token is valid
//! - **Code exchange**: one-shot authorization-code exchange
//! - **Revocation**: best-effort upstream revocation, unconditional local
//!   clearing
//! - **Consent flow**: authorization URL building with CSRF state and PKCE
//!
//! The cryptographic handshake itself is upstream's job; the token
//! endpoints are plain black-box HTTP collaborators.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gbp_auth::{AuthState, OAuthConfig, TokenLifecycleManager};
//!
//! async fn authenticate() {
//!     let config = OAuthConfig::new(
//!         "client-id",
//!         "client-secret",
//!         "http://localhost:8080/callback",
//!     );
//!     let manager = TokenLifecycleManager::new(config);
//!
//!     // Send the user to the consent URL...
//!     let state = AuthState::with_pkce();
//!     let url = manager.authorization_url(&state).unwrap();
//!     println!("Open {url}");
//!
//!     // ...then exchange the returned code.
//!     manager.exchange_code("4/0AbCd...").await.unwrap();
//!     assert!(manager.is_valid().await);
//! }
//! ```

pub mod error;
pub mod manager;
pub mod state;
pub mod token;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use manager::{OAuthConfig, TokenLifecycleManager};
pub use state::AuthState;
pub use token::{OAuthTokenSet, TokenResponse};
