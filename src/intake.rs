//! Upload intake: one upload in, one reply out.
//!
//! ```text
//! MIME not on the allow-list        → Ignored(UnsupportedType)
//! declared size missing or zero     → Ignored(UnknownSize)
//! declared or actual size > reject  → Text(too_large), nothing decoded
//! decode / encode failure           → Text(failed)
//! cancelled mid-loop                → Ignored(Cancelled)
//! otherwise                         → Photo(JPEG, caption)
//! ```
//!
//! The caption always describes the *original* upload: its resolution and
//! the EXIF fields found in the upload bytes. The JPEG that goes back out is
//! whatever [`encode`] produced.
//!
//! Nothing here reads configuration. The host turns its config into an
//! [`IntakePolicy`] once and passes it to every call.

use crate::cancel::CancelToken;
use crate::caption;
use crate::imaging::encoder::check_budget;
use crate::imaging::exif_parser::read_exif;
use crate::imaging::{
    Dimensions, EncodeError, EncodingBudget, ImageBackend, InputFormat, decode_source, encode,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// A file as received from the platform.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    /// Declared by the sender, never sniffed.
    pub mime_type: String,
    /// Size the platform reported before download, if any.
    pub declared_size: Option<u64>,
}

/// Intake parameters derived from config.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    /// Lowercased MIME types accepted for processing.
    pub allowed_mime_types: Vec<String>,
    pub budget: EncodingBudget,
    pub too_large_message: String,
    pub failed_message: String,
}

impl IntakePolicy {
    /// Case-insensitive allow-list check.
    pub fn allows(&self, mime_type: &str) -> bool {
        let mime = mime_type.trim().to_ascii_lowercase();
        self.allowed_mime_types.iter().any(|m| *m == mime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    UnsupportedType,
    UnknownSize,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextReason {
    TooLarge,
    Failed,
}

/// A successfully normalized upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoReply {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub caption: String,
    pub original: Dimensions,
    pub dimensions: Dimensions,
    pub divisor: u32,
    pub attempts: u32,
    pub size: u64,
}

/// What the host sends back for an upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Photo(PhotoReply),
    Text { message: String, reason: TextReason },
    Ignored { reason: IgnoreReason },
}

impl Reply {
    fn too_large(policy: &IntakePolicy) -> Self {
        Reply::Text {
            message: policy.too_large_message.clone(),
            reason: TextReason::TooLarge,
        }
    }

    fn failed(policy: &IntakePolicy) -> Self {
        Reply::Text {
            message: policy.failed_message.clone(),
            reason: TextReason::Failed,
        }
    }
}

/// Run one upload through the pipeline.
///
/// Never fails: every error becomes a [`Reply`] and is logged here.
pub fn handle_upload(
    backend: &impl ImageBackend,
    policy: &IntakePolicy,
    upload: &Upload,
    cancel: &CancelToken,
) -> Reply {
    let mime = upload.mime_type.as_str();

    let format = match InputFormat::from_mime(mime) {
        Some(format) if policy.allows(mime) => format,
        _ => {
            debug!(mime, "MIME type not accepted");
            return Reply::Ignored {
                reason: IgnoreReason::UnsupportedType,
            };
        }
    };

    let declared = match upload.declared_size {
        Some(size) if size > 0 => size,
        _ => {
            debug!(mime, "upload has no declared size");
            return Reply::Ignored {
                reason: IgnoreReason::UnknownSize,
            };
        }
    };

    if let Err(err) = check_budget(declared, &policy.budget) {
        info!(%err, "rejected before download");
        return Reply::too_large(policy);
    }

    match normalize(backend, &upload.bytes, format, &policy.budget, cancel) {
        Ok(photo) => {
            info!(
                width = photo.original.width,
                height = photo.original.height,
                divisor = photo.divisor,
                attempts = photo.attempts,
                size = photo.size,
                "normalized upload"
            );
            Reply::Photo(photo)
        }
        Err(err @ EncodeError::TooLarge { .. }) => {
            info!(%err, "rejected after download");
            Reply::too_large(policy)
        }
        Err(EncodeError::Cancelled) => {
            warn!(mime, "processing cancelled, no reply sent");
            Reply::Ignored {
                reason: IgnoreReason::Cancelled,
            }
        }
        Err(err) => {
            error!(%err, mime, "processing failed");
            Reply::failed(policy)
        }
    }
}

fn normalize(
    backend: &impl ImageBackend,
    bytes: &[u8],
    format: InputFormat,
    budget: &EncodingBudget,
    cancel: &CancelToken,
) -> Result<PhotoReply, EncodeError> {
    let source = decode_source(backend, bytes, format, budget)?;
    let original = source.dimensions();
    let fields = read_exif(bytes);
    let caption = caption::summarize(original, fields.as_ref());

    let encoded = encode(backend, &source, budget, cancel)?;
    Ok(PhotoReply {
        size: encoded.size(),
        bytes: encoded.bytes,
        caption,
        original,
        dimensions: encoded.dimensions,
        divisor: encoded.divisor,
        attempts: encoded.attempts,
    })
}

/// Caption for an upload without decoding pixels or encoding anything.
pub fn describe(
    backend: &impl ImageBackend,
    bytes: &[u8],
    format: InputFormat,
) -> Result<String, EncodeError> {
    let dimensions = backend.identify(bytes, format)?;
    Ok(caption::summarize(dimensions, read_exif(bytes).as_ref()))
}
