pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod mapper;
pub mod models;
pub mod routes;
pub mod service;
pub mod test_util;

pub use auth::{AuthUser, JwksClient};
pub use config::Config;
pub use error::AppError;
pub use models::user::{UserCreateRequest, UserResponse};
pub use service::UserService;

use std::sync::Arc;

use axum::{http::HeaderValue, middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Validates bearer tokens issued by the realm.
    pub jwks_client: JwksClient,
    pub user_service: UserService,
}

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    let base_path = state.config.server.base_path.trim_matches('/');
    let users = routes::users::router(state.clone());

    let api = if base_path.is_empty() {
        users
    } else {
        Router::new().nest(&format!("/{}", base_path), users)
    };

    api.merge(routes::health::router())
        .layer(cors_layer(&state.config.cors))
        .layer(middleware::from_fn(logging::request_logger))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = match config.allowed_origins() {
        None => AllowOrigin::from(Any),
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        ),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
