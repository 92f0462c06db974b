//! User management routes.
//!
//! - `POST /users` - create a user (moderator)
//! - `GET /users/:id` - fetch a user with roles and groups (moderator)
//! - `GET /users/hello` - name of the calling principal (any authenticated user)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::auth::{require_authenticated, require_moderator, AuthUser};
use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::models::user::{UserCreateRequest, UserResponse};
use crate::AppState;

/// POST /users - Create a user in Keycloak
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UserCreateRequest>,
) -> Result<StatusCode> {
    state.user_service.create_user(request).await?;
    Ok(StatusCode::OK)
}

/// GET /users/:id - Fetch a user by Keycloak id
async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let id = Uuid::parse_str(&id)
        .map_err(|e| AppError::MalformedRequest(format!("Invalid user id '{}': {}", id, e)))?;

    let user = state.user_service.get_user_by_id(id).await?;
    Ok(Json(user))
}

/// GET /users/hello - Return the caller's principal name
async fn hello(Extension(user): Extension<AuthUser>) -> Json<String> {
    Json(user.name().to_string())
}

pub fn router(state: Arc<AppState>) -> Router {
    let moderated = Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user_by_id))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_moderator,
        ));

    let authenticated = Router::new()
        .route("/users/hello", get(hello))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authenticated,
        ));

    moderated.merge(authenticated).with_state(state)
}
