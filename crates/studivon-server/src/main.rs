//! studivon-server - REST API server binary.

use std::net::SocketAddr;

use studivon_core::config::StudivonConfig;
use studivon_server::{create_server, create_state};
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn load_config() -> Result<StudivonConfig, Box<dyn std::error::Error>> {
    match std::env::var("STUDIVON_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            Ok(StudivonConfig::from_file(path)?)
        }
        Err(_) => Ok(StudivonConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,studivon_server=debug")),
        )
        .init();

    let host = std::env::var("STUDIVON_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("STUDIVON_PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .map_err(|e| format!("STUDIVON_PORT must be a valid port number: {}", e))?;

    let config = load_config()?;
    let state = create_state(&config)?;
    tracing::info!(
        storage = state.storage,
        advisor = state.coach.model_name(),
        "Study engine ready"
    );

    let app = create_server(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting studivon-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Server stopped cleanly");
    Ok(())
}
