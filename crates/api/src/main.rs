use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vanguard_api::config::ServerConfig;
use vanguard_api::router::build_app_router;
use vanguard_api::state::AppState;
use vanguard_core::clock::SystemClock;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vanguard_api=debug,vanguard_bungie=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Missing secrets are tolerated; the routes that need them answer 500.
    if config.session.secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; session routes will fail");
    }
    if config.bungie.api_key.is_none() {
        tracing::warn!("BUNGIE_API_KEY is not set; proxy routes will fail");
    }
    if config.bungie.client_id.is_none() || config.bungie.client_secret.is_none() {
        tracing::warn!("OAuth client credentials are incomplete; code exchange will fail");
    }
    if config.proxy_diagnostics {
        tracing::info!("Proxy diagnostics enabled");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");

    let state =
        AppState::new(config, Arc::new(SystemClock)).expect("Failed to build upstream client");
    let app = build_app_router(state);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shut down");
}

/// Resolve on SIGINT or (on unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
