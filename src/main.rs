//! API router demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http::server (trace, timeout, request id)  │
//!                             │        │                                     │
//!                             │        ▼                                     │
//!                             │   bindings (GET/POST/.../HEAD → dispatch)    │
//!                             │        │                                     │
//!                             │        ▼                                     │
//!                             │   routing::ApiRouter                         │
//!                             │     strip /api → scan routes → match path    │
//!                             │        │                                     │
//!                             │        ▼                                     │
//!                             │   chain: controller mws → route mws → handler│
//!     Client Response         │        │                                     │
//!     ◀───────────────────────┼── response / error handler / 404            │
//!                             └──────────────────────────────────────────────┘
//! ```

mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use api_router::bindings::from_router;
use api_router::config::load_config;
use api_router::observability::{logging, metrics};
use api_router::{ApiRouter, HttpServer, RouterConfig, RoutingOptions};
use clap::Parser;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "api-router")]
#[command(about = "Serve a demo users controller through the API router", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("api-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_path = %config.routing.base_path,
        strip_prefix = %config.routing.strip_prefix,
        request_timeout_secs = config.listener.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let controller = Arc::new(demo::UsersController::new());
    let mut router = ApiRouter::with_options(
        &config.routing.base_path,
        controller,
        RoutingOptions::from(&config.routing),
    )?;
    router.on_error(demo::render_error);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, from_router(router));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
