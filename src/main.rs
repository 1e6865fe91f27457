use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

mod auth;
mod client;
mod config;
mod error;
mod middleware;
mod models;
mod operations;
mod routes;
mod store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = config::Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Tealium Gateway starting...");
    tracing::info!(
        "Server configured: {}:{}",
        config.server_host,
        config.server_port
    );
    tracing::info!(
        "Tealium account: {} ({})",
        config.tealium_account,
        config.tealium_username
    );

    // Shared HTTP client with connection pooling and per-call timeouts
    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(config.http_max_connections)
        .connect_timeout(Duration::from_secs(config.http_connect_timeout))
        .timeout(Duration::from_secs(config.http_request_timeout))
        .build()
        .context("Failed to create HTTP client")?;

    // Credential store and Tealium client, constructed here and injected so
    // tests and embedders can run independent instances side by side.
    let credential_store = store::CredentialStore::new();

    let authenticator = auth::Authenticator::new(
        http.clone(),
        credential_store.clone(),
        auth::AccountCredentials {
            api_key: config.tealium_api_key.clone(),
            username: config.tealium_username.clone(),
            account: config.tealium_account.clone(),
        },
        config.platform_url.clone(),
        Duration::from_secs(config.token_ttl_secs),
    );

    let tealium_client = Arc::new(client::TealiumClient::new(
        http,
        credential_store,
        authenticator,
        config.tealium_account.clone(),
        Duration::from_millis(config.retry_backoff_ms),
    ));
    tracing::info!("Tealium client initialized");

    let app_state = routes::AppState {
        proxy_api_key: config.proxy_api_key.clone(),
        client: tealium_client,
    };

    // Build the application with routes and middleware
    let app = build_app(app_state);

    // Bind to configured host and port
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Build the application with all routes and middleware
fn build_app(state: routes::AppState) -> axum::Router {
    use axum::Router;

    // Health check routes (no auth required)
    let health_routes = routes::health_routes();

    // Tealium operation routes (with auth)
    let api_routes = routes::api_routes(state);

    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(middleware::cors_layer())
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
