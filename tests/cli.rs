//! CLI integration tests: run the `wallpost` binary against temp directories.
//!
//! Run with: `cargo test --test cli`

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn wallpost(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wallpost"))
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run wallpost")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 5) as u8, (y * 7) as u8, 128])
    });
    img.save(path).unwrap();
}

fn json_reports(output: &Output) -> Vec<serde_json::Value> {
    assert!(output.status.success(), "wallpost failed: {output:?}");
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[test]
fn gen_config_prints_documented_stock_file() {
    let tmp = TempDir::new().unwrap();
    let output = wallpost(tmp.path(), &["gen-config"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("[limits]"));
    assert!(text.contains("reject_bytes = 20971520"));
    assert!(text.contains("[messages]"));
}

#[test]
fn process_writes_jpeg_rendition() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("dawn.png"), 48, 32);

    let output = wallpost(tmp.path(), &["process", "dawn.png", "-o", "out"]);
    assert!(output.status.success(), "{output:?}");

    let rendition = image::open(tmp.path().join("out/dawn.jpg")).unwrap();
    assert_eq!((rendition.width(), rendition.height()), (48, 32));

    let text = stdout(&output);
    assert!(text.contains("Original resolution: 48x32 | No metadata available"));
    assert!(text.contains("1 file: 1 photo, 0 text replies, 0 ignored"));
}

#[test]
fn process_json_report() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("dawn.png"), 20, 10);

    let output = wallpost(tmp.path(), &["process", "dawn.png", "--json"]);
    let reports = json_reports(&output);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["reply"], "photo");
    assert_eq!(reports[0]["divisor"], 1);
    assert_eq!(reports[0]["original"]["width"], 20);
    assert!(tmp.path().join("wallpost-out/dawn.jpg").exists());
}

#[test]
fn scan_reports_every_file() {
    let tmp = TempDir::new().unwrap();
    let photos = tmp.path().join("photos");
    std::fs::create_dir_all(photos.join("trip")).unwrap();
    write_png(&photos.join("a.png"), 16, 16);
    write_png(&photos.join("trip/b.png"), 16, 16);
    std::fs::write(photos.join("notes.txt"), "not a photo").unwrap();

    let output = wallpost(tmp.path(), &["scan", "photos", "--json"]);
    let reports = json_reports(&output);

    let replies: Vec<&str> = reports.iter().map(|r| r["reply"].as_str().unwrap()).collect();
    assert_eq!(replies, vec!["photo", "ignored", "photo"]);
    assert_eq!(reports[1]["reason"], "unsupported_type");
}

#[test]
fn caption_command_prints_caption_only() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("x.png"), 7, 5);

    let output = wallpost(tmp.path(), &["caption", "x.png"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Original resolution: 7x5 | No metadata available"));
    assert!(!tmp.path().join("wallpost-out").exists());
}

#[test]
fn caption_unsupported_extension_fails() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("doc.pdf"), "%PDF").unwrap();

    let output = wallpost(tmp.path(), &["caption", "doc.pdf"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_limits_drive_rejection() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("big.png"), 64, 64);
    std::fs::write(
        tmp.path().join("wallpost.toml"),
        "[limits]\nreject_bytes = 10\ncompress_bytes = 5\n\n[messages]\ntoo_large = \"nope\"\n",
    )
    .unwrap();

    let output = wallpost(tmp.path(), &["process", "big.png", "--json"]);
    let reports = json_reports(&output);

    assert_eq!(reports[0]["reply"], "text");
    assert_eq!(reports[0]["message"], "nope");
    assert_eq!(reports[0]["reason"], "too_large");
}

#[test]
fn unknown_config_key_is_an_error() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("a.png"), 8, 8);
    std::fs::write(tmp.path().join("custom.toml"), "[limits]\nreject_byte = 1\n").unwrap();

    let output = wallpost(tmp.path(), &["--config", "custom.toml", "process", "a.png"]);
    assert!(!output.status.success());
}
