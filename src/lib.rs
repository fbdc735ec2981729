//! # Receipt Store
//!
//! Per-user image storage with on-the-fly resizing.
//!
//! Clients upload JPEG or PNG images under an opaque user token and fetch them
//! back, optionally resampled to an exact width and height. Every image lives
//! at `<storage_root>/<token>/<file name>` and a request can never reach
//! outside its own token directory.
//!
//! ## Features
//!
//! - **Token scoping**: the `Authorization` header selects the user directory
//! - **Traversal-safe lookup**: only the base name of a requested path is used
//! - **Format sniffing**: images are recognized by content, never by extension
//! - **Lanczos3 resizing**: `?width=W&height=H` produces exactly `W x H` pixels
//! - **Uploads**: multipart uploads limited to 10 MiB by default
//!
//! ## Architecture
//!
//! - [`store`] - Token/file-name resolution and on-disk storage
//! - [`pipeline`] - Decode, resize and encode
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types shared across layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use receipt_store::{create_router, DiskStore, ImageService, RouterConfig, StoreLocator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let locator = StoreLocator::new("uploads");
//!     let router = create_router(
//!         ImageService::new(locator.clone()),
//!         DiskStore::new(locator),
//!         RouterConfig::new(),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{CodecError, LocatorError, RetrieveError, UploadError};
pub use pipeline::{
    ImageCodec, ImageResponse, ImageService, PipelineConfig, ResizeParams, ResizeRequest,
    DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION,
};
pub use server::{
    create_router, health_handler, retrieve_handler, upload_handler, AppState, AuthError,
    HealthResponse, RetrieveQueryParams, RouterConfig, UploadResponse, UserToken,
    DEFAULT_MAX_UPLOAD_SIZE,
};
pub use store::{DiskStore, StoreLocator, StoredImage};
