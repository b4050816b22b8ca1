//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations the encoder needs:
//! identify (header → dimensions), decode (bytes → pixels) and render
//! (resample + encode to the canonical output format).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust with everything
//! statically linked into the binary.

use super::params::{InputFormat, RenderParams};
use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    DecodeFailed(String),
    #[error("Encode failed: {0}")]
    EncodeFailed(String),
}

/// Width and height of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded upload, owned by the request that decoded it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: DynamicImage,
    format: InputFormat,
    byte_size: u64,
}

impl SourceImage {
    pub fn new(pixels: DynamicImage, format: InputFormat, byte_size: u64) -> Self {
        Self {
            pixels,
            format,
            byte_size,
        }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    /// Size of the original encoded upload, not of the decoded buffer.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }
}

/// Trait for image processing backends.
///
/// All operations are synchronous CPU work; callers run them on a pool
/// meant for blocking work.
pub trait ImageBackend: Sync {
    /// Read dimensions from the header without decoding pixels.
    fn identify(&self, bytes: &[u8], format: InputFormat) -> Result<Dimensions, BackendError>;

    /// Decode raw upload bytes in the declared format.
    fn decode(&self, bytes: &[u8], format: InputFormat) -> Result<DynamicImage, BackendError>;

    /// Resample to `params` dimensions (no-op if unchanged) and encode as JPEG.
    fn render(&self, image: &DynamicImage, params: &RenderParams)
    -> Result<Vec<u8>, BackendError>;
}
