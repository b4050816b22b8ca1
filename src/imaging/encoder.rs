//! Size-adaptive encoding.
//!
//! Turns a decoded upload into a JPEG that fits the compress ceiling,
//! giving up resolution only as far as needed:
//!
//! ```text
//! byte_size > reject ceiling     → TooLarge, nothing decoded or encoded
//! byte_size <= compress ceiling  → one full-resolution encode (divisor 1)
//! otherwise                      → divisor 2, 4, 8 until the output fits
//! ```
//!
//! Quality stays fixed at [`OUTPUT_QUALITY`] for every attempt; only the
//! resolution changes. The loop is bounded by
//! [`divisor_schedule`](super::calculations::divisor_schedule), so a source
//! that still does not fit at divisor 8 is returned as-is at that size. The
//! returned size is best effort, not a guarantee.

use super::backend::{BackendError, Dimensions, ImageBackend, SourceImage};
use super::calculations::{MAX_DIVISOR, divisor_schedule, downscale_dimensions};
use super::params::{EncodingBudget, InputFormat, Quality, RenderParams};
use crate::cancel::CancelToken;
use thiserror::Error;
use tracing::debug;

/// Quality used for every encode attempt.
pub const OUTPUT_QUALITY: Quality = Quality::new(95);

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Image is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Processing cancelled")]
    Cancelled,
}

impl From<BackendError> for EncodeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DecodeFailed(msg) => Self::Decode(msg),
            BackendError::EncodeFailed(msg) => Self::Encode(msg),
        }
    }
}

/// Output of [`encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResult {
    pub bytes: Vec<u8>,
    /// Divisor applied to both axes; 1 when the resolution is untouched.
    pub divisor: u32,
    pub dimensions: Dimensions,
    /// Number of encodes performed.
    pub attempts: u32,
}

impl EncodedResult {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Refuse anything over the reject ceiling.
pub fn check_budget(byte_size: u64, budget: &EncodingBudget) -> Result<(), EncodeError> {
    if byte_size > budget.reject_bytes() {
        return Err(EncodeError::TooLarge {
            size: byte_size,
            limit: budget.reject_bytes(),
        });
    }
    Ok(())
}

/// Decode upload bytes into a [`SourceImage`].
///
/// The reject ceiling is enforced on the actual byte count before the
/// decoder runs.
pub fn decode_source(
    backend: &impl ImageBackend,
    bytes: &[u8],
    format: InputFormat,
    budget: &EncodingBudget,
) -> Result<SourceImage, EncodeError> {
    check_budget(bytes.len() as u64, budget)?;
    let pixels = backend.decode(bytes, format)?;
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(EncodeError::Decode("image has zero width or height".into()));
    }
    Ok(SourceImage::new(pixels, format, bytes.len() as u64))
}

/// Encode `image` to fit `budget`, downscaling only when the original is
/// over the compress ceiling.
///
/// `cancel` is polled before every attempt. On cancellation nothing is
/// returned and intermediate buffers are dropped.
pub fn encode(
    backend: &impl ImageBackend,
    image: &SourceImage,
    budget: &EncodingBudget,
    cancel: &CancelToken,
) -> Result<EncodedResult, EncodeError> {
    check_budget(image.byte_size(), budget)?;

    let original = image.dimensions();
    let ceiling = budget.compress_bytes();

    if image.byte_size() <= ceiling {
        if cancel.is_cancelled() {
            return Err(EncodeError::Cancelled);
        }
        let bytes = backend.render(
            image.pixels(),
            &RenderParams {
                width: original.width,
                height: original.height,
                quality: OUTPUT_QUALITY,
            },
        )?;
        debug!(size = bytes.len(), "re-encoded at full resolution");
        return Ok(EncodedResult {
            bytes,
            divisor: 1,
            dimensions: original,
            attempts: 1,
        });
    }

    let mut last = None;
    for (attempt, divisor) in (1u32..).zip(divisor_schedule(MAX_DIVISOR)) {
        if cancel.is_cancelled() {
            debug!(divisor, "cancelled before attempt");
            return Err(EncodeError::Cancelled);
        }

        let (width, height) = downscale_dimensions((original.width, original.height), divisor);
        let bytes = backend.render(
            image.pixels(),
            &RenderParams {
                width,
                height,
                quality: OUTPUT_QUALITY,
            },
        )?;
        debug!(divisor, width, height, size = bytes.len(), ceiling, "downscale attempt");

        let fits = bytes.len() as u64 <= ceiling;
        let result = EncodedResult {
            bytes,
            divisor,
            dimensions: Dimensions { width, height },
            attempts: attempt,
        };
        if fits {
            return Ok(result);
        }
        last = Some(result);
    }

    last.ok_or_else(|| EncodeError::Encode("empty divisor schedule".into()))
}
