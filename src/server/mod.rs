//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /receipts/{file}?width&height        POST /upload         │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │ (UserToken) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Error responses are plain text with the status code carrying the kind.

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{AuthError, UserToken};
pub use handlers::{
    health_handler, retrieve_handler, upload_handler, AppState, HealthResponse,
    RetrieveQueryParams, UploadResponse, DEFAULT_MAX_UPLOAD_SIZE, UPLOAD_FIELD,
};
pub use routes::{create_router, RouterConfig};
