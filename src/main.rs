//! Mod Companion - local companion service for a mod manager
//!
//! Serves the catalogue cache and archive reader over a local HTTP API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mod_companion::api::{create_router, AppState};
use mod_companion::Config;

/// Main entry point for the companion service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Wire the catalogue cache and archive context
/// 4. Start the in-memory cache sweep
/// 5. Serve the local HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mod_companion=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mod Companion");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, memory_ttl={}s, policy={}, cleanup_interval={}s, cache_file={}",
        config.server_port,
        config.memory_ttl,
        config.memory_policy,
        config.cleanup_interval,
        config.cache_file.display()
    );

    let state = AppState::from_config(&config);
    info!(tool = %state.archives.bridge.program().display(), "Archive tool resolved");

    state.start_sweeping(config.cleanup_every());
    info!("Background sweep task started");

    let app = create_router(state.clone(), config.cors_origin.as_deref());

    // Local only
    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep.
async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if state.catalogue.memory().stop() {
        warn!("Sweep task stopped");
    }
}
