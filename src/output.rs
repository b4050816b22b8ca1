//! CLI output formatting.
//!
//! # Reply-First Display
//!
//! Every input file gets a header line naming the file and what happened to
//! it, followed by indented context lines. Paths are shown as given on the
//! command line; the reply is the primary information.
//!
//! # Output Format
//!
//! ## Process / Scan
//!
//! ```text
//! dawn.png → out/dawn.jpg
//!     Original resolution: 6000x4000 | Canon Canon EOS R5 | ISO 400 | 50mm | f/2.8 | 1/500s
//!     6000x4000 → 1500x1000 (÷4, 2 attempts, 8.7 MB)
//! huge.tiff: Sorry, image filesize too big
//! notes.txt: ignored (unsupported type)
//!
//! 3 files: 1 photo, 1 text reply, 1 ignored
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::intake::{IgnoreReason, PhotoReply, Reply};
use crate::process::FileReport;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count, decimal units.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn ignore_label(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::UnsupportedType => "unsupported type",
        IgnoreReason::UnknownSize => "unknown size",
        IgnoreReason::Cancelled => "cancelled",
    }
}

/// Resize line for a photo reply.
///
/// ```text
/// 6000x4000 → 1500x1000 (÷4, 2 attempts, 8.7 MB)
/// 800x600 (full resolution, 120.5 KB)
/// ```
fn resize_line(photo: &PhotoReply) -> String {
    let size = format_bytes(photo.size);
    if photo.divisor == 1 {
        return format!(
            "{}x{} (full resolution, {size})",
            photo.original.width, photo.original.height
        );
    }
    let attempts = match photo.attempts {
        1 => "1 attempt".to_string(),
        n => format!("{n} attempts"),
    };
    format!(
        "{}x{} \u{2192} {}x{} (\u{f7}{}, {attempts}, {size})",
        photo.original.width,
        photo.original.height,
        photo.dimensions.width,
        photo.dimensions.height,
        photo.divisor
    )
}

// ============================================================================
// Per-file reports
// ============================================================================

/// Format one file report as display lines.
pub fn format_report(report: &FileReport) -> Vec<String> {
    let source = report.source.display();
    match &report.reply {
        Reply::Photo(photo) => {
            let header = match &report.output {
                Some(out) => format!("{source} \u{2192} {}", out.display()),
                None => source.to_string(),
            };
            vec![
                header,
                format!("{}{}", indent(1), photo.caption),
                format!("{}{}", indent(1), resize_line(photo)),
            ]
        }
        Reply::Text { message, .. } => vec![format!("{source}: {message}")],
        Reply::Ignored { reason } => {
            vec![format!("{source}: ignored ({})", ignore_label(*reason))]
        }
    }
}

/// Format the closing tally for a batch.
pub fn format_summary(reports: &[FileReport]) -> String {
    let mut photos = 0;
    let mut texts = 0;
    let mut ignored = 0;
    for report in reports {
        match report.reply {
            Reply::Photo(_) => photos += 1,
            Reply::Text { .. } => texts += 1,
            Reply::Ignored { .. } => ignored += 1,
        }
    }
    let count = |n: usize, one: &str, many: &str| {
        format!("{n} {}", if n == 1 { one } else { many })
    };
    format!(
        "{}: {}, {}, {ignored} ignored",
        count(reports.len(), "file", "files"),
        count(photos, "photo", "photos"),
        count(texts, "text reply", "text replies"),
    )
}

pub fn print_report(report: &FileReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

pub fn print_summary(reports: &[FileReport]) {
    println!();
    println!("{}", format_summary(reports));
}

// ============================================================================
// Caption only
// ============================================================================

pub fn format_caption(path: &Path, caption: &str) -> Vec<String> {
    vec![path.display().to_string(), format!("{}{}", indent(1), caption)]
}

pub fn print_caption(path: &Path, caption: &str) {
    for line in format_caption(path, caption) {
        println!("{}", line);
    }
}
