//! Error types for the user management API.

use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use keycloak_admin::ProviderError;
use serde_json::json;
use validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body failed field validation. Never reaches Keycloak.
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// Body or path could not be parsed.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Provider fault normalized to the status Keycloak reported.
    #[error("{message}")]
    Application { status: StatusCode, message: String },

    /// Provider fault passed through as is; rendered as a generic 500.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AppError {
    /// Wrap a provider fault into an application error carrying the provider's status
    /// and message. Faults without a status (transport, token) map to 502.
    pub fn application(err: ProviderError) -> Self {
        let status = err
            .status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        AppError::Application {
            status,
            message: err.message(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Application { status, .. } => *status,
            AppError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Flatten validation errors into `field -> message`, keyed by the JSON (camelCase) field name.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>()
                .join("; ");
            (camel_case(&field), message)
        })
        .collect()
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_type = match &self {
            AppError::Validation(errors) => {
                return (status, Json(field_messages(errors))).into_response();
            }
            AppError::MalformedRequest(_) => "invalid_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Application { .. } => "application_error",
            AppError::Provider(e) => {
                tracing::error!("Unhandled identity provider fault: {}", e);
                "internal_error"
            }
        };

        let message = match &self {
            AppError::Provider(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message
            }
        }));

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
