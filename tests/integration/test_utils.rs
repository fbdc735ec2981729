//! Test utilities for integration tests.
//!
//! Provides a router backed by a temporary storage root plus helpers for
//! generating images and multipart bodies.

use std::io::Cursor;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

use receipt_store::{create_router, DiskStore, ImageService, RouterConfig, StoreLocator};

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "receipt-store-test-boundary";

// =============================================================================
// Test Server
// =============================================================================

/// A router whose storage root is a temporary directory.
pub struct TestServer {
    dir: TempDir,
    router: Router,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::new().with_tracing(false))
    }

    pub fn with_config(config: RouterConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let locator = StoreLocator::new(dir.path());
        let router = create_router(
            ImageService::new(locator.clone()),
            DiskStore::new(locator),
            config,
        );
        Self { dir, router }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Place a file directly under `<root>/<token>/<name>`.
    pub fn put_file(&self, token: &str, name: &str, data: &[u8]) -> PathBuf {
        let user_dir = self.dir.path().join(token);
        std::fs::create_dir_all(&user_dir).unwrap();
        let path = user_dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }
}

// =============================================================================
// Image Fixtures
// =============================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    })
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Create a JPEG of the given size.
pub fn create_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Jpeg)
}

/// Create an RGBA PNG of the given size.
pub fn create_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| Rgba([x as u8, 0, 0, 200]));
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

/// A GIF header; enough for format detection.
pub fn create_gif_header() -> Vec<u8> {
    let mut data = b"GIF89a".to_vec();
    data.extend_from_slice(&[1, 0, 1, 0, 0, 0, 0]);
    data.push(0x3b);
    data
}

pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}

pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'])
}

/// Decode a response body and return its dimensions.
pub fn dimensions_of(data: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(data).unwrap();
    (image.width(), image.height())
}

// =============================================================================
// Request Builders
// =============================================================================

/// GET request, with an `Authorization` header when a token is given.
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a multipart body with a single file field.
pub fn multipart_body(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST /upload with a multipart body.
pub fn upload(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::from(body)).unwrap()
}
