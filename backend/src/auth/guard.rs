//! Route guards evaluated before handlers run.
//!
//! Both guards insert the [`AuthUser`] into request extensions so handlers can
//! read the principal with `Extension<AuthUser>`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AuthUser;
use crate::error::AppError;
use crate::AppState;

/// Middleware that requires any authenticated principal.
pub async fn require_authenticated(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.jwks_client.authenticate(request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!("Rejected unauthenticated request: {}", e);
            AppError::Unauthorized(e.to_string()).into_response()
        }
    }
}

/// Middleware that requires the configured moderator role.
pub async fn require_moderator(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user: AuthUser = match state.jwks_client.authenticate(request.headers()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!("Rejected unauthenticated request: {}", e);
            return AppError::Unauthorized(e.to_string()).into_response();
        }
    };

    let role = &state.config.auth.moderator_role;
    if !user.has_role(role) {
        tracing::info!(user = %user.name(), path = %request.uri().path(), "Missing role {}", role);
        return AppError::Forbidden(format!("Role {} required", role)).into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}
