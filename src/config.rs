//! Configuration management for the receipt image service.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks using the `RECEIPTS_` prefix and defaults for all of
//! them.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use receipt_store::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! println!("Storing images under {}", config.storage_root.display());
//! ```
//!
//! # Environment Variables
//!
//! - `RECEIPTS_HOST` - Server bind address (default: 0.0.0.0)
//! - `RECEIPTS_PORT` - Server port (default: 8080)
//! - `RECEIPTS_STORAGE_ROOT` - Directory holding per-user folders (default: uploads)
//! - `RECEIPTS_MAX_UPLOAD_SIZE` - Upload body limit in bytes (default: 10 MiB)
//! - `RECEIPTS_JPEG_QUALITY` - JPEG re-encode quality (default: 75)
//! - `RECEIPTS_MAX_DIMENSION` - Largest accepted width/height (default: 8192)
//! - `RECEIPTS_CORS_ORIGINS` - Comma-separated allowed origins (default: any)

use std::path::PathBuf;

use clap::Parser;

use crate::pipeline::{
    is_valid_quality, PipelineConfig, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION,
};
use crate::server::{RouterConfig, DEFAULT_MAX_UPLOAD_SIZE};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default storage root, relative to the working directory.
pub const DEFAULT_STORAGE_ROOT: &str = "uploads";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Receipt Store - per-user image storage with on-the-fly resizing.
///
/// Stores uploaded JPEG and PNG images under a directory per user token and
/// serves them back, optionally resampled to a requested width and height.
#[derive(Parser, Debug, Clone)]
#[command(name = "receipt-store")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "RECEIPTS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "RECEIPTS_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Directory holding one sub-directory per user token.
    #[arg(long, default_value = DEFAULT_STORAGE_ROOT, env = "RECEIPTS_STORAGE_ROOT")]
    pub storage_root: PathBuf,

    /// Maximum upload body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "RECEIPTS_MAX_UPLOAD_SIZE")]
    pub max_upload_size: usize,

    // =========================================================================
    // Image Configuration
    // =========================================================================
    /// JPEG quality used when re-encoding (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "RECEIPTS_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Largest width or height a client may request.
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION, env = "RECEIPTS_MAX_DIMENSION")]
    pub max_dimension: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "RECEIPTS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage_root.as_os_str().is_empty() {
            return Err(
                "Storage root is required. Set --storage-root or RECEIPTS_STORAGE_ROOT".to_string(),
            );
        }

        if self.max_upload_size == 0 {
            return Err("max_upload_size must be greater than 0".to_string());
        }

        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.max_dimension == 0 {
            return Err("max_dimension must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the retrieval pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            jpeg_quality: self.jpeg_quality,
            max_dimension: self.max_dimension,
        }
    }

    /// Settings for the HTTP router.
    pub fn router_config(&self) -> RouterConfig {
        let config = RouterConfig::new()
            .with_tracing(!self.no_tracing)
            .with_max_upload_size(self.max_upload_size);

        match &self.cors_origins {
            Some(origins) => config.with_cors_origins(origins.clone()),
            None => config,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
