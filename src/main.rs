//! Receipt Store - per-user image storage with on-the-fly resizing.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use receipt_store::{
    config::Config,
    pipeline::ImageService,
    server::create_router,
    store::{DiskStore, StoreLocator},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let locator = StoreLocator::new(config.storage_root.clone());
    let store = DiskStore::new(locator.clone());

    if let Err(e) = store.ensure_root().await {
        error!(
            "Failed to create storage root {}: {}",
            config.storage_root.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    info!("Receipt Store v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Storage root: {}", config.storage_root.display());
    info!("  Max upload size: {} bytes", config.max_upload_size);
    info!("  JPEG quality: {}", config.jpeg_quality);
    info!("  Max dimension: {}px", config.max_dimension);
    match config.cors_origins {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    let images = ImageService::with_config(locator, config.pipeline_config());
    let router = create_router(images, store, config.router_config());

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -H 'Authorization: <token>' -F file=@receipt.jpg http://{}/upload",
        addr
    );
    info!(
        "    curl -H 'Authorization: <token>' 'http://{}/receipts/receipt.jpg?width=200&height=200'",
        addr
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "receipt_store=debug,tower_http=debug"
    } else {
        "receipt_store=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
