//! Image Service for serving stored images.
//!
//! The ImageService is the entry point for retrieval requests. It runs a
//! single-shot pipeline in which every stage can end the request:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        ImageService::retrieve                    │
//! │                                                                  │
//! │  token ──▶ resolve path ──▶ file exists? ──▶ validate            │
//! │  present?  (StoreLocator)   (metadata)       width/height        │
//! │                                                  │               │
//! │                        ┌─────────────────────────┘               │
//! │                        ▼          spawn_blocking                 │
//! │              open ──▶ sniff ──▶ decode ──▶ [resize] ──▶ encode   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding, resampling and encoding are CPU bound, so they run on the
//! blocking pool. The file handle is owned by that closure and is closed on
//! every exit path.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageReader};
use tokio::fs;
use tracing::debug;

use crate::error::{CodecError, RetrieveError};
use crate::store::StoreLocator;

use super::codec::{ImageCodec, DEFAULT_JPEG_QUALITY};
use super::resize::{ResizeParams, ResizeRequest, DEFAULT_MAX_DIMENSION};

// =============================================================================
// Configuration
// =============================================================================

/// Tunables for the retrieval pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// JPEG quality used when re-encoding JPEG images (1-100)
    pub jpeg_quality: u8,

    /// Largest accepted width or height for a resize
    pub max_dimension: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

// =============================================================================
// Image Response
// =============================================================================

/// An encoded image ready to be written to the client.
#[derive(Debug, Clone)]
pub struct ImageResponse {
    /// Encoded image bytes
    pub data: Bytes,

    /// Codec detected at decode time and used for encoding
    pub codec: ImageCodec,

    /// Width of the served image in pixels
    pub width: u32,

    /// Height of the served image in pixels
    pub height: u32,

    /// Whether the image was resampled
    pub resized: bool,
}

impl ImageResponse {
    /// `Content-Type` matching the detected input format.
    pub fn content_type(&self) -> &'static str {
        self.codec.content_type()
    }
}

// =============================================================================
// Image Service
// =============================================================================

/// Service resolving, decoding, resampling and re-encoding stored images.
///
/// Holds no per-request state; one instance is shared by all requests.
///
/// # Example
///
/// ```ignore
/// use receipt_store::pipeline::{ImageService, ResizeParams};
/// use receipt_store::store::StoreLocator;
///
/// let service = ImageService::new(StoreLocator::new("uploads"));
///
/// let params = ResizeParams::new(Some("50"), Some("50"));
/// let image = service.retrieve("abc", "receipt.jpg", &params).await?;
///
/// println!("{} {}x{}", image.content_type(), image.width, image.height);
/// ```
#[derive(Debug, Clone)]
pub struct ImageService {
    locator: StoreLocator,
    config: PipelineConfig,
}

impl ImageService {
    /// Create a new image service with default settings.
    pub fn new(locator: StoreLocator) -> Self {
        Self::with_config(locator, PipelineConfig::default())
    }

    /// Create a new image service with custom settings.
    pub fn with_config(locator: StoreLocator, config: PipelineConfig) -> Self {
        Self { locator, config }
    }

    /// The locator used to find stored images.
    pub fn locator(&self) -> &StoreLocator {
        &self.locator
    }

    /// The pipeline settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Retrieve an image, optionally resized.
    ///
    /// # Errors
    ///
    /// - [`RetrieveError::Unauthorized`] if `token` is empty, before any filesystem access
    /// - [`RetrieveError::Locator`] if the token or file name is unusable
    /// - [`RetrieveError::InvalidDimension`] if width or height is malformed
    /// - [`RetrieveError::NotFound`] if no regular file exists at the resolved path
    /// - [`RetrieveError::Io`] if the file cannot be opened or read
    /// - [`RetrieveError::Codec`] if the data is corrupt, not allow-listed, or cannot be encoded
    pub async fn retrieve(
        &self,
        token: &str,
        raw_file_name: &str,
        params: &ResizeParams,
    ) -> Result<ImageResponse, RetrieveError> {
        if token.is_empty() {
            return Err(RetrieveError::Unauthorized);
        }

        let path = self.locator.resolve(token, raw_file_name)?;
        ensure_file_exists(&path).await?;

        let resize = params.parse(self.config.max_dimension)?;

        let jpeg_quality = self.config.jpeg_quality;
        let response = tokio::task::spawn_blocking(move || {
            process_image(&path, resize, jpeg_quality)
        })
        .await
        .map_err(|e| RetrieveError::Task {
            message: e.to_string(),
        })??;

        debug!(
            format = response.codec.name(),
            width = response.width,
            height = response.height,
            resized = response.resized,
            bytes = response.data.len(),
            "served image"
        );

        Ok(response)
    }
}

/// Check that `path` names an existing regular file.
async fn ensure_file_exists(path: &Path) -> Result<(), RetrieveError> {
    let not_found = || RetrieveError::NotFound {
        file_name: file_name_of(path),
    };

    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(not_found()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(RetrieveError::Io {
            message: e.to_string(),
        }),
    }
}

/// Open, decode, optionally resample and re-encode the image at `path`.
fn process_image(
    path: &Path,
    resize: Option<ResizeRequest>,
    jpeg_quality: u8,
) -> Result<ImageResponse, RetrieveError> {
    let (codec, image) = decode_file(path)?;

    let (image, resized) = match resize {
        Some(request) => (request.apply(&image), true),
        None => (image, false),
    };

    let (width, height) = image.dimensions();
    let data = codec.encode(&image, jpeg_quality)?;

    Ok(ImageResponse {
        data,
        codec,
        width,
        height,
        resized,
    })
}

/// Decode the file at `path`, detecting its codec from the content.
fn decode_file(path: &Path) -> Result<(ImageCodec, DynamicImage), RetrieveError> {
    let io_error = |e: std::io::Error| RetrieveError::Io {
        message: e.to_string(),
    };

    let file = File::open(path).map_err(io_error)?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(io_error)?;

    let format = reader.format().ok_or_else(|| CodecError::Decode {
        message: "unrecognized image data".to_string(),
    })?;
    let codec = ImageCodec::from_format(format)?;
    let image = codec.decode(reader.into_inner())?;

    Ok((codec, image))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================
