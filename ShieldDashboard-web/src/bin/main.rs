use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use shield_dashboard_web::api::create_application;
use shield_dashboard_web::config::AppConfig;

/// The main entry point for the SHIELD dashboard server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Reads the configuration
/// 4. Creates and starts the Axum web application
/// 5. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("🚀 Starting SHIELD dashboard");

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!(
        "Scoring backend at {} (timeout {:?})",
        config.api.base_url(),
        config.api.timeout()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    // Create the Axum application with all routes and middleware
    let app = create_application(config).context("Failed to create scoring client")?;

    info!("Listening on {}", addr);

    // Create a TCP listener and bind to the address
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve the application with graceful shutdown support
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Sets up a signal handler for graceful shutdown
///
/// Waits for either CTRL+C or, on Unix systems, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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

    info!("Shutting down server...");
}
