//! Chateo Server: real-time presence, direct messaging, and friend requests.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use chateo_api::{AppState, build_router};
use chateo_auth::JwtDecoder;
use chateo_core::config::AppConfig;
use chateo_core::error::AppError;
use chateo_database::Stores;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from the config directory and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("CHATEO_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("CHATEO_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Chateo v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    tracing::info!(provider = ?config.store.provider, "Initializing store...");
    let stores = Stores::from_config(&config.store).await?;

    // ── Step 2: Credential verification ──────────────────────────
    if config.auth.jwt_secret == chateo_core::config::auth::DEFAULT_JWT_SECRET {
        tracing::warn!("auth.jwt_secret is the built-in default; set CHATEO__AUTH__JWT_SECRET");
    }
    let verifier = Arc::new(JwtDecoder::new(&config.auth));

    // ── Step 3: Real-time engine + router ────────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, stores, verifier);
    let realtime = state.realtime.clone();
    let app = build_router(state);

    // ── Step 4: Bind and serve ───────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Chateo server listening on {}", addr);

    let (stopped_tx, stopped_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, closing WebSocket connections...");
        if let Err(e) = realtime.shutdown().await {
            tracing::warn!(error = %e, "Real-time engine shutdown failed");
        }
        let _ = stopped_tx.send(());
    });
    let mut server = std::pin::pin!(server.into_future());

    // ── Step 5: Graceful shutdown ────────────────────────────────
    tokio::select! {
        result = &mut server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = stopped_rx => {
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => {
                    result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
                }
                Err(_) => tracing::warn!(
                    grace_seconds = grace.as_secs(),
                    "Connections still open after grace period, exiting"
                ),
            }
        }
    }

    tracing::info!("Chateo server shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
