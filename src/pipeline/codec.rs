//! Allow-listed image codecs.
//!
//! Every image the service reads or writes goes through [`ImageCodec`], a
//! closed set of formats. Detection happens on the raw bytes (magic
//! numbers), never on the file extension.
//!
//! # Design Decisions
//!
//! - **Same format out as in**: a decoded image is always re-encoded with the
//!   codec it was detected as. There is no format conversion.
//!
//! - **Recognized is not allowed**: a GIF or WebP upload is identified as
//!   such and then rejected with [`CodecError::UnsupportedFormat`], instead of
//!   being decoded and served with an empty body.
//!
//! - **JPEG has no alpha**: images carrying an alpha channel or 16-bit samples
//!   are flattened to RGB8 before JPEG encoding.

use std::io::{BufRead, Seek};

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::CodecError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Image Codec
// =============================================================================

/// An image format the service is permitted to decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageCodec {
    Jpeg,
    Png,
}

impl ImageCodec {
    /// Every allow-listed codec.
    pub const ALL: [ImageCodec; 2] = [ImageCodec::Jpeg, ImageCodec::Png];

    /// Map a detected format onto the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedFormat`] for any format other than
    /// JPEG or PNG.
    pub fn from_format(format: ImageFormat) -> Result<Self, CodecError> {
        match format {
            ImageFormat::Jpeg => Ok(ImageCodec::Jpeg),
            ImageFormat::Png => Ok(ImageCodec::Png),
            other => Err(CodecError::UnsupportedFormat {
                format: format!("{:?}", other).to_lowercase(),
            }),
        }
    }

    /// Detect the codec of an in-memory image from its magic bytes.
    ///
    /// Unrecognizable data is a [`CodecError::Decode`]; a recognized format
    /// outside the allow-list is a [`CodecError::UnsupportedFormat`].
    pub fn sniff(data: &[u8]) -> Result<Self, CodecError> {
        let format = image::guess_format(data).map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })?;
        Self::from_format(format)
    }

    /// The matching `image` crate format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            ImageCodec::Jpeg => ImageFormat::Jpeg,
            ImageCodec::Png => ImageFormat::Png,
        }
    }

    /// Short format name, as used in `image/<name>`.
    pub fn name(self) -> &'static str {
        match self {
            ImageCodec::Jpeg => "jpeg",
            ImageCodec::Png => "png",
        }
    }

    /// HTTP `Content-Type` for images of this codec.
    pub fn content_type(self) -> &'static str {
        match self {
            ImageCodec::Jpeg => "image/jpeg",
            ImageCodec::Png => "image/png",
        }
    }

    /// Decode pixels from `reader`, which must hold data of this codec.
    pub fn decode<R: BufRead + Seek>(self, reader: R) -> Result<DynamicImage, CodecError> {
        ImageReader::with_format(reader, self.image_format())
            .decode()
            .map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })
    }

    /// Encode `image` with this codec.
    ///
    /// `jpeg_quality` is clamped to 1-100 and ignored by lossless codecs.
    pub fn encode(self, image: &DynamicImage, jpeg_quality: u8) -> Result<Bytes, CodecError> {
        let mut output = Vec::new();

        let result = match self {
            ImageCodec::Jpeg => {
                let quality = clamp_quality(jpeg_quality);
                let encoder = JpegEncoder::new_with_quality(&mut output, quality);
                match image {
                    DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => {
                        image.write_with_encoder(encoder)
                    }
                    _ => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder),
                }
            }
            ImageCodec::Png => image.write_with_encoder(PngEncoder::new(&mut output)),
        };

        result.map_err(|e| CodecError::Encode {
            format: self.name(),
            message: e.to_string(),
        })?;

        Ok(Bytes::from(output))
    }
}

impl std::fmt::Display for ImageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
