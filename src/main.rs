//! Full-stack API entry point.

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fullstack_api::api::{create_router, AppState};
use fullstack_api::config::Config;
use fullstack_api::shutdown::shutdown_signal;

/// Full-stack application API server.
#[derive(Parser, Debug)]
#[command(name = "fullstack-api")]
#[command(about = "Health, status and documentation API for the full-stack app")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // .env may carry RUST_LOG, so read it before building the filter
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("fullstack_api=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if args.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Load configuration
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("API starting up...");
    info!("Environment: {}", config.environment);
    info!("CORS enabled for: {}", config.frontend_origin);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let router = create_router(AppState::from_config(config));

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API shutting down...");
    Ok(())
}
