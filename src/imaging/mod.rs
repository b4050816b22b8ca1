//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory_with_format` |
//! | **EXIF fields** | custom parser (JPEG APP1, PNG eXIf, TIFF IFD) |
//! | **Resample → JPEG** | Lanczos3 + `JpegEncoder` |
//! | **Fit to budget** | [`encode`], bounded divisor loop |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for the divisor schedule (unit testable)
//! - **Parameters**: Quality, formats, budgets, render requests
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Encoder**: The size-adaptive loop on top of a backend

pub mod backend;
mod calculations;
pub mod encoder;
pub mod exif_parser;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceImage};
pub use calculations::{MAX_DIVISOR, divisor_schedule, downscale_dimensions};
pub use encoder::{EncodeError, EncodedResult, OUTPUT_QUALITY, decode_source, encode};
pub use params::{EncodingBudget, InputFormat, Quality, RenderParams};
pub use rust_backend::{RustBackend, supported_mime_types};
