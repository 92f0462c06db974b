//! Errors surfaced by the identity provider client.

use serde::Deserialize;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Keycloak answered with a non-success status.
    #[error("Keycloak returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token acquisition failed: {0}")]
    Token(String),
}

impl ProviderError {
    /// HTTP status carried by the fault, if Keycloak sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Provider-facing message without the status prefix.
    pub fn message(&self) -> String {
        match self {
            ProviderError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Build a status fault from a raw Keycloak error body.
    pub fn from_body(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = extract_message(body)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .or_else(|| reason.map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status));
        ProviderError::Status { status, message }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error_message
        .or(parsed.error_description)
        .or(parsed.error)
}
