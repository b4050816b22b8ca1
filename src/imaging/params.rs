//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. They sit between the
//! [`encoder`](super::encoder) loop (which decides which renditions to try)
//! and the [`backend`](super::backend) (which does the pixel work), so the
//! loop can be driven against a mock backend in tests.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100). Clamped on construction.
//! - [`InputFormat`]: Decodable source formats, keyed by MIME type.
//! - [`EncodingBudget`]: The reject/compress byte ceilings for one request.
//! - [`RenderParams`]: Target dimensions and quality for one encode attempt.

use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub const fn new(value: u32) -> Self {
        if value < 1 {
            Self(1)
        } else if value > 100 {
            Self(100)
        } else {
            Self(value)
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Source formats the backend can decode.
///
/// Uploads are matched by declared MIME type only; bytes are never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Jpeg,
    Png,
    Tiff,
    WebP,
}

impl InputFormat {
    /// Map a declared MIME type to a decodable format.
    ///
    /// `image/jpg` is not registered but some clients send it, so it is
    /// accepted as JPEG.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/tiff" => Some(Self::Tiff),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Guess the declared MIME type of a local file from its extension.
    pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "tif" | "tiff" => Some("image/tiff"),
            "webp" => Some("image/webp"),
            _ => None,
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
        };
        f.write_str(name)
    }
}

/// Byte ceilings for a single request.
///
/// Anything above `reject_bytes` is refused without decoding; anything above
/// `compress_bytes` goes through the downscale loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingBudget {
    reject_bytes: u64,
    compress_bytes: u64,
}

impl EncodingBudget {
    /// Build a budget. Returns `None` unless `reject_bytes >= compress_bytes > 0`.
    pub fn new(reject_bytes: u64, compress_bytes: u64) -> Option<Self> {
        (compress_bytes > 0 && reject_bytes >= compress_bytes).then_some(Self {
            reject_bytes,
            compress_bytes,
        })
    }

    pub fn reject_bytes(&self) -> u64 {
        self.reject_bytes
    }

    pub fn compress_bytes(&self) -> u64 {
        self.compress_bytes
    }
}

/// Parameters for one resample + encode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
