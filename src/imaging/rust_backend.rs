//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory_with_format` |
//! | Resample | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB8) |
//! | EXIF metadata | custom `exif_parser` (JPEG APP1, PNG eXIf, TIFF IFD) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{InputFormat, Quality, RenderParams};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;

/// Declared MIME types paired with the formats they decode as.
const MIME_CANDIDATES: &[(&str, InputFormat)] = &[
    ("image/jpeg", InputFormat::Jpeg),
    ("image/jpg", InputFormat::Jpeg),
    ("image/pjpeg", InputFormat::Jpeg),
    ("image/png", InputFormat::Png),
    ("image/tiff", InputFormat::Tiff),
    ("image/webp", InputFormat::WebP),
];

static SUPPORTED_MIME_TYPES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    MIME_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.image_format().reading_enabled())
        .map(|(mime, _)| *mime)
        .collect()
});

/// Returns the MIME types that have working decoders compiled in.
pub fn supported_mime_types() -> &'static [&'static str] {
    &SUPPORTED_MIME_TYPES
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode as baseline JPEG. Alpha is dropped; JPEG has no alpha channel.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = img.to_rgb8();
    let quality = u8::try_from(quality.value()).unwrap_or(100);
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::EncodeFailed(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8], format: InputFormat) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), format.image_format())
            .into_dimensions()
            .map_err(|e| BackendError::DecodeFailed(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8], format: InputFormat) -> Result<DynamicImage, BackendError> {
        image::load_from_memory_with_format(bytes, format.image_format())
            .map_err(|e| BackendError::DecodeFailed(format!("Failed to decode {format}: {e}")))
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &RenderParams,
    ) -> Result<Vec<u8>, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::EncodeFailed(format!(
                "Invalid target size {}x{}",
                params.width, params.height
            )));
        }
        if image.width() == params.width && image.height() == params.height {
            return encode_jpeg(image, params.quality);
        }
        let resized = image.resize_exact(params.width, params.height, FilterType::Lanczos3);
        encode_jpeg(&resized, params.quality)
    }
}
