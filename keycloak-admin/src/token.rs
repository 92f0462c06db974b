//! Admin access-token caching.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Tokens are refreshed this long before Keycloak considers them expired.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Token endpoint response (`client_credentials` grant).
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: String, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: now + Duration::seconds(expires_in_secs),
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

impl From<TokenResponse> for AccessToken {
    fn from(response: TokenResponse) -> Self {
        AccessToken::new(response.access_token, response.expires_in, Utc::now())
    }
}

/// Holds at most one admin token.
#[derive(Debug, Default)]
pub struct TokenCache {
    token: RwLock<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token value if it is still fresh.
    pub async fn get(&self) -> Option<String> {
        let guard = self.token.read().await;
        guard
            .as_ref()
            .filter(|t| t.is_fresh(Utc::now()))
            .map(|t| t.value.clone())
    }

    pub async fn store(&self, token: AccessToken) {
        *self.token.write().await = Some(token);
    }

    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }
}
