//! # wallpost
//!
//! Normalizes uploaded photos before they are re-posted: every accepted
//! upload comes back as a JPEG that fits the platform's size limit, with a
//! caption describing the original resolution and camera settings.
//!
//! # Architecture: One Upload, One Reply
//!
//! ```text
//! Upload (bytes, MIME, declared size)
//!   │
//!   ├─ intake      allow-list, size gates           → Ignored / Text
//!   ├─ imaging     decode, bounded downscale loop   → JPEG
//!   ├─ exif        capture fields from the upload   → MetadataFieldSet
//!   └─ caption     resolution + fields              → String
//!   │
//! Reply::Photo { JPEG, caption }
//! ```
//!
//! Each upload is an independent unit of work with no shared mutable state,
//! so a host can run any number of them in parallel. The CLI does exactly
//! that over a rayon pool.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`intake`] | Upload → reply: gates, error-to-reply mapping, logging |
//! | [`imaging`] | Backend trait, pure-Rust backend, size-adaptive encoder, EXIF reader |
//! | [`caption`] | Caption text from dimensions and capture fields |
//! | [`metadata`] | Capture field set and rational values |
//! | [`cancel`] | Cooperative cancellation with optional deadline |
//! | [`config`] | `wallpost.toml` loading, merging, and validation |
//! | [`scan`] | Directory walk for batch input |
//! | [`process`] | Parallel batch over files on disk |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Resolution Over Quality
//!
//! When an upload is too big, the encoder halves the resolution (divisor 2,
//! then 4, then 8) at a fixed JPEG quality of 95 instead of lowering quality.
//! A smaller sharp photo reads better in a chat client than a full-size one
//! full of block artifacts. The schedule is bounded, so the worst case is
//! three encodes; a photo that still does not fit at one eighth of its size
//! is sent as-is.
//!
//! ## Captions Never Fail
//!
//! Each caption clause (camera, ISO, focal length, aperture, exposure) is
//! computed independently. A garbled field drops only its own clause; the
//! resolution clause is always present.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate and a small built-in EXIF
//! reader. No system libraries, no external processes.

pub mod cancel;
pub mod caption;
pub mod config;
pub mod imaging;
pub mod intake;
pub mod metadata;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
