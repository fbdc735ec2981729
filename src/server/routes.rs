//! Router configuration for the receipt image service.
//!
//! This module defines the HTTP routes and applies middleware for CORS,
//! request tracing and the upload body limit.
//!
//! # Route Structure
//!
//! ```text
//! /health                   - Health check (public)
//! /receipts/{*file_path}    - Image retrieval (token required)
//! /upload                   - Multipart image upload (token required)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use receipt_store::pipeline::ImageService;
//! use receipt_store::server::{create_router, RouterConfig};
//! use receipt_store::store::{DiskStore, StoreLocator};
//!
//! let locator = StoreLocator::new("uploads");
//! let images = ImageService::new(locator.clone());
//! let store = DiskStore::new(locator);
//!
//! let router = create_router(images, store, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, retrieve_handler, upload_handler, AppState, DEFAULT_MAX_UPLOAD_SIZE,
};
use crate::pipeline::ImageService;
use crate::store::DiskStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Maximum upload body size in bytes
    pub max_upload_size: usize,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    /// - Uploads are limited to 10 MiB
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Set the maximum upload body size in bytes.
    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `images` - Retrieval pipeline backing `GET /receipts/...`
/// * `store` - Disk store backing `POST /upload`
/// * `config` - Router configuration
pub fn create_router(images: ImageService, store: DiskStore, config: RouterConfig) -> Router {
    let app_state = AppState::with_max_upload_size(images, store, config.max_upload_size);
    let cors = build_cors_layer(&config);

    // The limit applies to the whole multipart body, boundaries included
    let upload_routes = Router::new()
        .route("/upload", post(upload_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_size));

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/receipts/{*file_path}", get(retrieve_handler))
        .merge(upload_routes)
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
