//! Image retrieval pipeline.
//!
//! This module turns a (token, file name, resize parameters) request into an
//! encoded image.
//!
//! # Architecture
//!
//! The pipeline sits between the HTTP layer and the storage layer:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Image Service              │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  ImageCodec  │  │  ResizeRequest  │  │
//! │  │  (sniff →    │  │  (Lanczos3,     │  │
//! │  │   decode →   │  │   exact box)    │  │
//! │  │   encode)    │  │                 │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              StoreLocator               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`ImageService`]: Main entry point, runs the full retrieval pipeline
//! - [`ImageCodec`]: Closed set of allowed formats with decode/encode
//! - [`ResizeParams`]: Raw width/height strings from the query string
//! - [`ResizeRequest`]: Validated resize target
//! - [`ImageResponse`]: Encoded image plus the detected format
//!
//! Resized outputs are not cached; every request decodes the stored file.

mod codec;
mod resize;
mod service;

pub use codec::{
    clamp_quality, is_valid_quality, ImageCodec, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY,
    MIN_JPEG_QUALITY,
};
pub use resize::{ResizeParams, ResizeRequest, DEFAULT_MAX_DIMENSION, RESIZE_FILTER};
pub use service::{ImageResponse, ImageService, PipelineConfig};
