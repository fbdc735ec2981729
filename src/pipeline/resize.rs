//! Resize parameters and resampling.
//!
//! Clients ask for a resized image with `?width=W&height=H`. Two non-zero
//! values are hard targets: the output is exactly `W x H` pixels and the
//! aspect ratio is not preserved. A `0` side is derived from the source aspect
//! ratio.
//!
//! Parameter handling:
//!
//! | width    | height   | result                         |
//! |----------|----------|--------------------------------|
//! | absent   | absent   | original size                  |
//! | `50`     | absent   | original size (partial = none) |
//! | `50`     | `20`     | resampled to 50x20             |
//! | `0`      | `25`     | height 25, width from aspect   |
//! | `0`      | `0`      | original size                  |
//! | `abc`    | any      | `InvalidDimension`             |
//! | `-5`     | any      | `InvalidDimension`             |
//!
//! Empty values (`?width=`) count as absent.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::RetrieveError;

/// Default upper bound for a requested width or height, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Filter used for every resample.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Raw `width` / `height` values as received from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: Option<String>,
    pub height: Option<String>,
}

impl ResizeParams {
    /// Parameters requesting no resize.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build parameters from optional raw strings.
    pub fn new(width: Option<&str>, height: Option<&str>) -> Self {
        Self {
            width: width.map(str::to_string),
            height: height.map(str::to_string),
        }
    }

    /// Validate the raw values and decide whether a resize was requested.
    ///
    /// Every supplied value is validated, even when its partner is missing,
    /// so `?width=abc` fails although it would not trigger a resize.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::InvalidDimension`] if a value is not an
    /// unsigned integer or exceeds `max_dimension`.
    pub fn parse(&self, max_dimension: u32) -> Result<Option<ResizeRequest>, RetrieveError> {
        let width = parse_dimension("width", self.width.as_deref(), max_dimension)?;
        let height = parse_dimension("height", self.height.as_deref(), max_dimension)?;

        Ok(match (width, height) {
            (Some(0), Some(0)) => None,
            (Some(width), Some(height)) => Some(ResizeRequest { width, height }),
            _ => None,
        })
    }
}

/// A validated resize target. A `0` side follows the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
}

impl ResizeRequest {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Output size for a `source_width x source_height` image.
    ///
    /// A zero side is computed from the source aspect ratio, rounded to the
    /// nearest pixel and never below 1. Both zero keeps the source size.
    pub fn target_size(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match (self.width, self.height) {
            (0, 0) => (source_width, source_height),
            (0, height) => (scale_side(source_width, height, source_height), height),
            (width, 0) => (width, scale_side(source_height, width, source_width)),
            (width, height) => (width, height),
        }
    }

    /// Resample `image` to [`target_size`](Self::target_size).
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = self.target_size(image.width(), image.height());
        image.resize_exact(width, height, RESIZE_FILTER)
    }
}

/// `side * numerator / denominator`, rounded, clamped to `1..=u32::MAX`.
fn scale_side(side: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return side.max(1);
    }
    let denominator = u64::from(denominator);
    let scaled = (u64::from(side) * u64::from(numerator) + denominator / 2) / denominator;
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

fn parse_dimension(
    name: &'static str,
    raw: Option<&str>,
    max_dimension: u32,
) -> Result<Option<u32>, RetrieveError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    let invalid = |reason: String| RetrieveError::InvalidDimension {
        name,
        value: raw.to_string(),
        reason,
    };

    let value: u32 = raw
        .parse()
        .map_err(|_| invalid("must be a non-negative integer".to_string()))?;

    if value > max_dimension {
        return Err(invalid(format!("must be at most {}", max_dimension)));
    }

    Ok(Some(value))
}
