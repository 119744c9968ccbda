//! OAuth state for CSRF protection during the consent flow.

use serde::{Deserialize, Serialize};

/// OAuth state carried through the consent redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthState {
    /// Random state value
    pub state: String,

    /// PKCE code verifier (for PKCE flow)
    pub code_verifier: Option<String>,

    /// Created timestamp
    pub created_at: i64,
}

impl AuthState {
    /// Create a new OAuth state.
    pub fn new() -> Self {
        use rand::Rng;
        let state: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        Self {
            state,
            code_verifier: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create with PKCE support.
    pub fn with_pkce() -> Self {
        use rand::Rng;

        let code_verifier: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();

        let mut state = Self::new();
        state.code_verifier = Some(code_verifier);
        state
    }

    /// Get the PKCE code challenge (S256).
    pub fn code_challenge(&self) -> Option<String> {
        use sha2::{Digest, Sha256};

        self.code_verifier.as_ref().map(|verifier| {
            let mut hasher = Sha256::new();
            hasher.update(verifier.as_bytes());
            let hash = hasher.finalize();
            base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, hash)
        })
    }

    /// Check if the state has expired (default: 10 minutes).
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now - self.created_at > 600
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_state() {
        let state = AuthState::new();
        assert_eq!(state.state.len(), 32);
        assert!(!state.is_expired());
        assert!(state.code_verifier.is_none());
        assert!(state.code_challenge().is_none());
    }

    #[test]
    fn test_auth_state_with_pkce() {
        let state = AuthState::with_pkce();
        assert!(state.code_verifier.is_some());

        let challenge = state.code_challenge().unwrap();
        // S256 challenges are 43 unpadded url-safe base64 chars
        assert_eq!(challenge.len(), 43);
        assert!(!challenge.contains('='));
    }

    #[test]
    fn test_states_are_unique() {
        let a = AuthState::new();
        let b = AuthState::new();
        assert_ne!(a.state, b.state);
    }
}
