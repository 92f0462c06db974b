use std::sync::Arc;

use keycloak_admin::KeycloakAdminClient;
use tokio::net::TcpListener;

use backend_resources::{app, logging, AppState, Config, JwksClient, UserService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml exists or set BACKEND__KEYCLOAK__* and BACKEND__OIDC__ISSUER environment variables.",
            e
        )
    })?;

    logging::init(&config.logging.level);

    tracing::info!("Starting backend-resources {}", env!("CARGO_PKG_VERSION"));

    // Initialize components
    let jwks_client = JwksClient::new(&config.oidc.issuer, config.oidc.audience.as_deref()).await?;
    let keycloak = KeycloakAdminClient::new(config.keycloak.clone())?;
    tracing::info!(
        "Managing realm {} at {}",
        keycloak.realm(),
        config.keycloak.server_url
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        jwks_client,
        user_service: UserService::new(Arc::new(keycloak)),
    });

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
