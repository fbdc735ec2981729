//! HTTP request handlers for the receipt image API.
//!
//! # Endpoints
//!
//! - `GET /receipts/{*file_path}` - Serve a stored image, optionally resized
//! - `POST /upload` - Store an image under the caller's token
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{CodecError, LocatorError, RetrieveError, UploadError};
use crate::pipeline::{ImageCodec, ImageService, ResizeParams};
use crate::store::DiskStore;

use super::auth::UserToken;

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 << 20;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Retrieval pipeline
    pub images: Arc<ImageService>,

    /// Disk store used by uploads
    pub store: Arc<DiskStore>,

    /// Maximum accepted upload body size in bytes
    pub max_upload_size: usize,
}

impl AppState {
    /// Create a new application state with the default upload limit.
    pub fn new(images: ImageService, store: DiskStore) -> Self {
        Self::with_max_upload_size(images, store, DEFAULT_MAX_UPLOAD_SIZE)
    }

    /// Create a new application state with a custom upload limit.
    pub fn with_max_upload_size(
        images: ImageService,
        store: DiskStore,
        max_upload_size: usize,
    ) -> Self {
        Self {
            images: Arc::new(images),
            store: Arc::new(store),
            max_upload_size,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for retrieval requests.
///
/// Values are kept as strings so that malformed numbers are reported by the
/// pipeline rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct RetrieveQueryParams {
    /// Target width in pixels
    #[serde(default)]
    pub width: Option<String>,

    /// Target height in pixels
    #[serde(default)]
    pub height: Option<String>,
}

impl From<RetrieveQueryParams> for ResizeParams {
    fn from(query: RetrieveQueryParams) -> Self {
        ResizeParams {
            width: query.width,
            height: query.height,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response body of a successful upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// File name as sent by the client
    pub filename: String,

    /// Path the image can be retrieved from
    pub url: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Build a plain-text error response, logging by severity:
/// - 5xx at ERROR
/// - 404 at DEBUG (common and expected)
/// - other 4xx at WARN
fn error_response(status: StatusCode, error_type: &'static str, message: String) -> Response {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else if status == StatusCode::NOT_FOUND {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Resource not found: {}",
            message
        );
    } else {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }

    (status, message).into_response()
}

fn locator_status(err: &LocatorError) -> (StatusCode, &'static str) {
    match err {
        LocatorError::EmptyToken => (StatusCode::UNAUTHORIZED, "unauthorized"),
        LocatorError::InvalidToken => (StatusCode::BAD_REQUEST, "invalid_token"),
        LocatorError::InvalidFileName { .. } => (StatusCode::BAD_REQUEST, "invalid_file_name"),
    }
}

fn codec_status(err: &CodecError) -> (StatusCode, &'static str) {
    match err {
        CodecError::Decode { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "decode_error"),
        CodecError::Encode { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
        CodecError::UnsupportedFormat { .. } => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_format")
        }
    }
}

/// Convert RetrieveError to HTTP response.
impl IntoResponse for RetrieveError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            RetrieveError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            RetrieveError::Locator(err) => locator_status(err),
            RetrieveError::InvalidDimension { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_dimension")
            }
            RetrieveError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            RetrieveError::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            RetrieveError::Codec(err) => codec_status(err),
            RetrieveError::Task { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "task_error"),
        };

        error_response(status, error_type, self.to_string())
    }
}

/// Convert UploadError to HTTP response.
impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            UploadError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            UploadError::Locator(err) => locator_status(err),
            UploadError::InvalidForm { .. } => (StatusCode::BAD_REQUEST, "invalid_form"),
            UploadError::MissingFile => (StatusCode::BAD_REQUEST, "missing_file"),
            UploadError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "too_large"),
            UploadError::Codec(err) => codec_status(err),
            UploadError::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        };

        error_response(status, error_type, self.to_string())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image retrieval requests.
///
/// # Endpoint
///
/// `GET /receipts/{*file_path}`
///
/// Only the last segment of `file_path` is used as the file name, so both
/// `/receipts/receipt.jpg` and the upload URL `/receipts/{token}/receipt.jpg`
/// name the same file.
///
/// # Headers
///
/// - `Authorization`: user token (required)
///
/// # Query Parameters
///
/// - `width`, `height`: target size in pixels. Resizing happens only when
///   both are present.
///
/// # Response
///
/// - `200 OK`: image with `Content-Type: image/jpeg` or `image/png`
/// - `400 Bad Request`: invalid file name, token, width or height
/// - `401 Unauthorized`: missing token
/// - `404 Not Found`: no such file for this token
/// - `415 Unsupported Media Type`: stored file is an image of a non-allowed format
/// - `500 Internal Server Error`: open, decode or encode failure
pub async fn retrieve_handler(
    State(state): State<AppState>,
    token: UserToken,
    Path(file_path): Path<String>,
    Query(query): Query<RetrieveQueryParams>,
) -> Result<Response, RetrieveError> {
    let params = ResizeParams::from(query);
    let image = state
        .images
        .retrieve(token.as_str(), &file_path, &params)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, image.content_type().to_string()),
        (
            HeaderName::from_static("x-image-width"),
            image.width.to_string(),
        ),
        (
            HeaderName::from_static("x-image-height"),
            image.height.to_string(),
        ),
        (
            HeaderName::from_static("x-image-resized"),
            image.resized.to_string(),
        ),
    ];

    Ok((StatusCode::OK, headers, image.data).into_response())
}

/// Handle image uploads.
///
/// # Endpoint
///
/// `POST /upload` with a `multipart/form-data` body containing a `file` field.
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "filename": "receipt.jpg",
///   "url": "/receipts/abc/receipt.jpg"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: not a multipart form, no `file` field, invalid file name
/// - `401 Unauthorized`: missing token
/// - `413 Payload Too Large`: body exceeds the upload limit
/// - `415 Unsupported Media Type`: payload is not a JPEG or PNG image
/// - `500 Internal Server Error`: the file could not be written
pub async fn upload_handler(
    State(state): State<AppState>,
    token: UserToken,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, state.max_upload_size))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, state.max_upload_size))?;
        upload = Some((filename, data));
    }

    let (filename, data) = upload.ok_or(UploadError::MissingFile)?;

    // Reject before writing anything
    state.store.locator().resolve(token.as_str(), &filename)?;
    // Unrecognizable payloads are a media-type problem here, not a server one
    let codec = ImageCodec::sniff(&data).map_err(|e| match e {
        CodecError::Decode { .. } => CodecError::UnsupportedFormat {
            format: "unknown".to_string(),
        },
        other => other,
    })?;

    let stored = state.store.save(token.as_str(), &filename, data).await?;

    info!(
        format = codec.name(),
        bytes = stored.size,
        url = %stored.url(),
        "upload complete"
    );

    Ok(Json(UploadResponse {
        filename,
        url: stored.url(),
    }))
}

fn multipart_error(err: axum::extract::multipart::MultipartError, max_size: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { max_size }
    } else {
        UploadError::InvalidForm {
            message: err.body_text(),
        }
    }
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
