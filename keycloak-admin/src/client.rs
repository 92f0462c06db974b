//! Keycloak admin REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::config::KeycloakConfig;
use crate::error::ProviderError;
use crate::provider::IdentityProvider;
use crate::token::{AccessToken, TokenCache, TokenResponse};
use crate::types::{GroupRepresentation, MappingsRepresentation, RoleRepresentation, UserRepresentation};

/// Whether a request can be sent again after a transient fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    /// Repeating the request has no further effect.
    Safe,
    /// Keycloak may already have applied the request. Only retried when it
    /// provably never reached a handler: connect failures and 503.
    Unsafe,
}

/// Client for the Keycloak admin API, authenticated as a service account.
pub struct KeycloakAdminClient {
    http_client: Client,
    config: KeycloakConfig,
    tokens: TokenCache,
    // Serializes token grants so concurrent callers share one refresh.
    refresh: Mutex<()>,
}

impl KeycloakAdminClient {
    pub fn new(config: KeycloakConfig) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
            tokens: TokenCache::new(),
            refresh: Mutex::new(()),
        })
    }

    pub fn realm(&self) -> &str {
        &self.config.realm
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/{}", self.config.users_url(), id)
    }

    /// Return a cached admin token or fetch a new one.
    async fn access_token(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.tokens.get().await {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;
        if let Some(token) = self.tokens.get().await {
            return Ok(token);
        }

        let url = self.config.token_url();
        tracing::debug!("Requesting admin token from {}", url);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .send_with_retry(Replay::Safe, || self.http_client.post(&url).form(&form))
            .await
            .map_err(|e| ProviderError::Token(e.to_string()))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Token(format!("Failed to parse token response: {}", e)))?;

        let token = AccessToken::from(token);
        let value = token.value.clone();
        self.tokens.store(token).await;
        Ok(value)
    }

    /// Send an admin request with a bearer token, refreshing the token once if Keycloak rejects it.
    async fn authorized<F>(&self, replay: Replay, build: F) -> Result<Response, ProviderError>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.access_token().await?;
        match self.send_with_retry(replay, || build().bearer_auth(&token)).await {
            Err(ProviderError::Status { status: 401, .. }) => {
                tracing::info!("Admin token rejected by Keycloak, refreshing");
                self.tokens.invalidate().await;
                let token = self.access_token().await?;
                self.send_with_retry(replay, || build().bearer_auth(&token)).await
            }
            other => other,
        }
    }

    /// Send a request, retrying transient faults up to `retries` times.
    ///
    /// Non-success responses are turned into [`ProviderError::Status`].
    async fn send_with_retry<F>(&self, replay: Replay, build: F) -> Result<Response, ProviderError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let result = build().send().await;

            let transient = match &result {
                Ok(response) => is_transient_status(response.status(), replay),
                Err(e) => is_transient_error(e, replay),
            };

            if transient && attempt < self.config.retries {
                attempt += 1;
                tracing::warn!(attempt, "Transient Keycloak fault, retrying");
                tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                continue;
            }

            let response = result.map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_body(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        tracing::debug!("GET {}", url);
        let response = self
            .authorized(Replay::Safe, || self.http_client.get(url))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn is_transient_status(status: StatusCode, replay: Replay) -> bool {
    match replay {
        Replay::Safe => matches!(
            status,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
        ),
        // A gateway error or timeout may hide a request Keycloak already applied.
        Replay::Unsafe => status == StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn is_transient_error(error: &reqwest::Error, replay: Replay) -> bool {
    match replay {
        Replay::Safe => error.is_timeout() || error.is_connect(),
        Replay::Unsafe => error.is_connect(),
    }
}

/// Extract the created user's id from the `Location` header (`.../users/{id}`).
fn created_id(response: &Response) -> Result<String, ProviderError> {
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ProviderError::InvalidResponse(
                "Location header is missing, expected URI for created user".to_string(),
            )
        })?;

    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::InvalidResponse(format!("Malformed Location header: {}", location))
        })
}

#[async_trait]
impl IdentityProvider for KeycloakAdminClient {
    async fn create_user(&self, user: &UserRepresentation) -> Result<String, ProviderError> {
        let url = self.config.users_url();
        tracing::debug!("POST {}", url);

        let response = self
            .authorized(Replay::Unsafe, || self.http_client.post(&url).json(user))
            .await?;

        created_id(&response)
    }

    async fn get_user(&self, id: &str) -> Result<UserRepresentation, ProviderError> {
        self.get_json(&self.user_url(id)).await
    }

    async fn realm_roles_of(&self, id: &str) -> Result<Vec<RoleRepresentation>, ProviderError> {
        let url = format!("{}/role-mappings", self.user_url(id));
        let mappings: MappingsRepresentation = self.get_json(&url).await?;
        Ok(mappings.realm_mappings)
    }

    async fn groups_of(&self, id: &str) -> Result<Vec<GroupRepresentation>, ProviderError> {
        let url = format!("{}/groups", self.user_url(id));
        self.get_json(&url).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), ProviderError> {
        let url = self.user_url(id);
        tracing::debug!("DELETE {}", url);
        self.authorized(Replay::Safe, || self.http_client.delete(&url))
            .await?;
        Ok(())
    }
}
