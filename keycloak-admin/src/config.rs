//! Connection settings for the Keycloak admin API.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct KeycloakConfig {
    /// Base URL of the Keycloak server, e.g. `http://localhost:8080`.
    pub server_url: String,
    /// Realm whose users are managed.
    pub realm: String,
    /// Service-account client used for the `client_credentials` grant.
    pub client_id: String,
    pub client_secret: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Extra attempts on transient faults (connect errors, timeouts, 502/503/504).
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_timeout() -> u64 {
    10
}
fn default_retries() -> u32 {
    1
}
fn default_retry_backoff() -> u64 {
    200
}

impl KeycloakConfig {
    pub fn new(server_url: &str, realm: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            realm: realm.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            timeout_secs: default_timeout(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    pub(crate) fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url(),
            self.realm
        )
    }

    pub(crate) fn users_url(&self) -> String {
        format!("{}/admin/realms/{}/users", self.base_url(), self.realm)
    }
}
