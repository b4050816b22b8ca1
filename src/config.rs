//! Configuration module.
//!
//! Handles loading, validating, and merging `wallpost.toml`. User values are
//! layered on top of stock defaults, so a config file only needs the keys it
//! wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [limits]
//! reject_bytes = 20971520      # Refuse uploads above this size (20 MiB)
//! compress_bytes = 10485760    # Downscale renditions above this size (10 MiB)
//!
//! [intake]
//! mime_types = ["image/jpeg", "image/jpg", "image/png"]
//!
//! [messages]
//! too_large = "Sorry, image filesize too big"
//! failed = "Sorry, processing this image failed"
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! timeout_secs = 60            # Per-image time limit (omit for none)
//! ```
//!
//! Unknown keys are rejected to catch typos early. The thresholds are policy,
//! not constants: different deployments have used 4, 10 and 20 MB.

use crate::imaging::{EncodingBudget, supported_mime_types};
use crate::intake::IntakePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `wallpost.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Byte ceilings.
    pub limits: LimitsConfig,
    /// Which uploads are considered at all.
    pub intake: IntakeConfig,
    /// User-facing reply texts.
    pub messages: MessagesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.compress_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits.compress_bytes must be greater than 0".into(),
            ));
        }
        if self.limits.reject_bytes < self.limits.compress_bytes {
            return Err(ConfigError::Validation(
                "limits.reject_bytes must be >= limits.compress_bytes".into(),
            ));
        }
        if self.intake.mime_types.is_empty() {
            return Err(ConfigError::Validation(
                "intake.mime_types must not be empty".into(),
            ));
        }
        let supported = supported_mime_types();
        if let Some(bad) = self
            .intake
            .mime_types
            .iter()
            .find(|m| !supported.contains(&m.to_ascii_lowercase().as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "intake.mime_types: no decoder for {bad:?} (supported: {})",
                supported.join(", ")
            )));
        }
        if self.messages.too_large.trim().is_empty() || self.messages.failed.trim().is_empty() {
            return Err(ConfigError::Validation(
                "messages must not be empty".into(),
            ));
        }
        if self.processing.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "processing.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The byte ceilings as an encoder budget.
    pub fn budget(&self) -> Result<EncodingBudget, ConfigError> {
        EncodingBudget::new(self.limits.reject_bytes, self.limits.compress_bytes).ok_or_else(
            || ConfigError::Validation("limits.reject_bytes must be >= limits.compress_bytes".into()),
        )
    }

    /// Everything the intake needs, as explicit parameters.
    pub fn intake_policy(&self) -> Result<IntakePolicy, ConfigError> {
        Ok(IntakePolicy {
            allowed_mime_types: self
                .intake
                .mime_types
                .iter()
                .map(|m| m.to_ascii_lowercase())
                .collect(),
            budget: self.budget()?,
            too_large_message: self.messages.too_large.clone(),
            failed_message: self.messages.failed.clone(),
        })
    }
}

/// Byte ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Uploads larger than this are refused without decoding.
    pub reject_bytes: u64,
    /// Uploads larger than this are downscaled until the output fits.
    pub compress_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            reject_bytes: 20 * 1024 * 1024,
            compress_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Upload filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    /// Declared MIME types to process. Everything else is ignored silently.
    pub mime_types: Vec<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            mime_types: vec![
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
                "image/png".to_string(),
            ],
        }
    }
}

/// Reply texts sent instead of an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagesConfig {
    pub too_large: String,
    pub failed: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            too_large: "Sorry, image filesize too big".to_string(),
            failed: "Sorry, processing this image failed".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
    /// Per-image time limit in seconds. When absent, images never time out.
    pub timeout_secs: Option<u64>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `wallpost.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# wallpost configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Size limits (bytes)
# ---------------------------------------------------------------------------
[limits]
# Uploads larger than this are refused with messages.too_large.
reject_bytes = 20971520

# Uploads larger than this are downscaled (1/2, 1/4, 1/8) until the
# rendition fits. Must not exceed reject_bytes.
compress_bytes = 10485760

# ---------------------------------------------------------------------------
# Intake
# ---------------------------------------------------------------------------
[intake]
# Declared MIME types to process. Anything else is ignored without a reply.
# Decodable: image/jpeg, image/jpg, image/pjpeg, image/png, image/tiff, image/webp
mime_types = ["image/jpeg", "image/jpg", "image/png"]

# ---------------------------------------------------------------------------
# Reply texts
# ---------------------------------------------------------------------------
[messages]
too_large = "Sorry, image filesize too big"
failed = "Sorry, processing this image failed"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit to use all CPU cores.
# max_processes = 4

# Per-image time limit in seconds, checked between downscale attempts.
# timeout_secs = 60
"##
}
