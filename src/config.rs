//! Runtime configuration.
//!
//! Every field has a default, so a settings file only needs the keys it changes:
//!
//! ```json
//! { "compositor": { "output": { "format": "png" } }, "logging": { "level": "debug" } }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::assets::font::DEFAULT_FONT_FAMILY;
use crate::foundation::error::{AdError, AdResult};
use crate::foundation::retry::RetryPolicy;
use crate::render::encode::OutputFormat;

/// Storage key the template list lives under.
pub const DEFAULT_STORE_KEY: &str = "ad_creator_templates";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdforgeConfig {
    pub compositor: CompositorConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Settings for turning templates into images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Per-attempt image resolution timeout.
    pub image_timeout_ms: u64,
    pub output: OutputFormat,
    /// Preferred font family for all text.
    pub font_family: String,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Paint `backgroundColor` behind button text.
    pub button_chrome: bool,
    /// When off, `http(s)` images are refused and reported as cross-origin failures.
    pub allow_remote_images: bool,
    /// Resolve the images of one template on the rayon pool.
    pub parallel_resolve: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            image_timeout_ms: 5_000,
            output: OutputFormat::default(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_dirs: Vec::new(),
            button_chrome: false,
            allow_remote_images: true,
            parallel_resolve: true,
        }
    }
}

impl CompositorConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }
}

/// Template store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `<key>.json` files.
    pub dir: PathBuf,
    pub key: String,
    /// Retry budget for file writes.
    pub retry: RetryPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            key: DEFAULT_STORE_KEY.to_string(),
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(25),
            },
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "adforge=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AdforgeConfig {
    /// Load settings from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> AdResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> AdResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| AdError::validation(format!("invalid settings: {e}")))
    }
}

fn default_store_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("adforge").join("store")
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
