//! Batch processing of files on disk.
//!
//! Each file becomes an [`Upload`] the way a messaging platform would hand
//! it over: the MIME type comes from the extension and the declared size
//! from the filesystem. The upload then goes through
//! [`handle_upload`](crate::intake::handle_upload) unchanged, so a batch
//! run behaves exactly like a stream of individual uploads.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── dawn.jpg        # from dawn.png
//! ├── dusk.jpg        # from dusk.jpg
//! └── dusk-2.jpg      # from trip/dusk.tiff (stem already taken)
//! ```
//!
//! Only photo replies produce a file. Text and ignored replies appear in
//! the report and nowhere else.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon).
//! Every file gets its own [`CancelToken`], so one slow image cannot eat
//! the timeout of another.

use crate::cancel::CancelToken;
use crate::imaging::{ImageBackend, InputFormat, RustBackend};
use crate::intake::{IntakePolicy, Reply, TextReason, Upload, handle_upload};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::error;

/// MIME type for files whose extension maps to no image format.
const UNKNOWN_MIME: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome for one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    /// Written rendition, for photo replies only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub reply: Reply,
}

/// Per-run settings that are not part of the intake policy.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub timeout_secs: Option<u64>,
}

/// Read a file as an upload.
pub fn upload_from_path(path: &Path) -> std::io::Result<Upload> {
    let bytes = std::fs::read(path)?;
    let mime_type = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::mime_for_extension)
        .unwrap_or(UNKNOWN_MIME);
    Ok(Upload {
        declared_size: Some(bytes.len() as u64),
        bytes,
        mime_type: mime_type.to_string(),
    })
}

/// Assign each input a unique `<stem>.jpg` name, in input order.
///
/// A taken name gets `-2`, `-3`, ... appended, skipping any suffix another
/// input already claimed. Names are compared case-insensitively.
pub fn output_names(files: &[PathBuf]) -> Vec<String> {
    let mut issued: HashSet<String> = HashSet::new();
    files
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let mut name = format!("{stem}.jpg");
            let mut n = 1;
            while !issued.insert(name.to_lowercase()) {
                n += 1;
                name = format!("{stem}-{n}.jpg");
            }
            name
        })
        .collect()
}

pub fn process(
    files: &[PathBuf],
    output_dir: &Path,
    policy: &IntakePolicy,
    options: &BatchOptions,
    events: Option<Sender<FileReport>>,
) -> Result<Vec<FileReport>, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, files, output_dir, policy, options, events)
}

/// Process files using a specific backend (allows testing with mock).
///
/// Reports come back in input order. When `events` is set, each report is
/// also sent as soon as its file is done. A file that cannot be read, or
/// whose rendition cannot be written, gets the failed text reply; only
/// failing to create `output_dir` ends the run.
pub fn process_with_backend(
    backend: &impl ImageBackend,
    files: &[PathBuf],
    output_dir: &Path,
    policy: &IntakePolicy,
    options: &BatchOptions,
    events: Option<Sender<FileReport>>,
) -> Result<Vec<FileReport>, ProcessError> {
    std::fs::create_dir_all(output_dir)?;
    let names = output_names(files);

    let reports = files
        .par_iter()
        .zip(names.par_iter())
        .map_with(events, |events, (source, name)| {
            let report = process_file(backend, source, &output_dir.join(name), policy, options);
            if let Some(tx) = events {
                tx.send(report.clone()).ok();
            }
            report
        })
        .collect();
    Ok(reports)
}

/// Run one file through intake and write its rendition to `target`.
fn process_file(
    backend: &impl ImageBackend,
    source: &Path,
    target: &Path,
    policy: &IntakePolicy,
    options: &BatchOptions,
) -> FileReport {
    let failed = |err: std::io::Error| {
        error!(source = %source.display(), error = %err, "file I/O failed");
        FileReport {
            source: source.to_path_buf(),
            output: None,
            reply: Reply::Text {
                message: policy.failed_message.clone(),
                reason: TextReason::Failed,
            },
        }
    };

    let upload = match upload_from_path(source) {
        Ok(upload) => upload,
        Err(err) => return failed(err),
    };
    let cancel = CancelToken::from_timeout_secs(options.timeout_secs);
    let reply = handle_upload(backend, policy, &upload, &cancel);

    let output = match &reply {
        Reply::Photo(photo) => {
            if let Err(err) = std::fs::write(target, &photo.bytes) {
                return failed(err);
            }
            Some(target.to_path_buf())
        }
        _ => None,
    };

    FileReport {
        source: source.to_path_buf(),
        output,
        reply,
    }
}
