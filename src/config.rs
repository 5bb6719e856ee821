//! Project configuration.
//!
//! Handles loading, validating, and merging `bindery.toml`. The file is
//! optional; stock defaults describe the conventional layout:
//!
//! ```text
//! book/
//! ├── bindery.toml        # Optional overrides
//! ├── metadata.yaml       # pandoc metadata (title, author, cover-image, ...)
//! ├── manuscript/
//! │   ├── 01-intro.md
//! │   └── 02-chapter.md
//! ├── assets/
//! │   ├── photo (1).jpg
//! │   └── cover.png
//! └── output/
//!     └── output.epub     # Produced by the converter
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! manuscript_dir = "manuscript"
//! assets_dir = "assets"
//! output_file = "output/output.epub"
//! metadata_file = "metadata.yaml"
//!
//! [images]
//! compress = true           # Downscale + re-encode, and process the cover
//! max_width = 1600
//! max_height = 1600
//! jpeg_quality = 85         # 1-100
//!
//! [cover]
//! width = 1600              # Target cover box; the cover keeps its own aspect
//! height = 2560
//! quality = 90              # JPEG quality, 1-100
//!
//! [converter]
//! program = "pandoc"
//! extra_args = []           # Appended after the generated arguments
//! ```
//!
//! Paths are relative to the project root passed on the command line. The file
//! is sparse, override only what you need. Unknown keys are rejected to catch
//! typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "bindery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `bindery.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory holding the `*.md` manuscript files.
    pub manuscript_dir: String,
    /// Directory holding the image assets.
    pub assets_dir: String,
    /// Path of the packaged book.
    pub output_file: String,
    /// pandoc metadata file (YAML).
    pub metadata_file: String,
    pub images: ImagesConfig,
    pub cover: CoverConfig,
    pub converter: ConverterConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manuscript_dir: "manuscript".to_string(),
            assets_dir: "assets".to_string(),
            output_file: "output/output.epub".to_string(),
            metadata_file: "metadata.yaml".to_string(),
            images: ImagesConfig::default(),
            cover: CoverConfig::default(),
            converter: ConverterConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(ConfigError::Validation(
                "images.jpeg_quality must be 1-100".into(),
            ));
        }
        if !(1..=100).contains(&self.cover.quality) {
            return Err(ConfigError::Validation(
                "cover.quality must be 1-100".into(),
            ));
        }
        if self.images.max_width == 0 || self.images.max_height == 0 {
            return Err(ConfigError::Validation(
                "images.max_width and images.max_height must be non-zero".into(),
            ));
        }
        if self.cover.width == 0 || self.cover.height == 0 {
            return Err(ConfigError::Validation(
                "cover.width and cover.height must be non-zero".into(),
            ));
        }
        if self.converter.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "converter.program must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve every configured path against the project root.
    pub fn paths(&self, root: &Path) -> ProjectPaths {
        ProjectPaths {
            root: root.to_path_buf(),
            manuscript_dir: root.join(&self.manuscript_dir),
            assets_dir: root.join(&self.assets_dir),
            output_file: root.join(&self.output_file),
            metadata_file: root.join(&self.metadata_file),
        }
    }
}

/// Image conditioning settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Downscale and re-encode assets, and process the cover image.
    pub compress: bool,
    /// Maximum width in pixels; wider images are scaled down.
    pub max_width: u32,
    /// Maximum height in pixels; taller images are scaled down.
    pub max_height: u32,
    /// JPEG re-encoding quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            compress: true,
            max_width: 1600,
            max_height: 1600,
            jpeg_quality: 85,
        }
    }
}

/// Cover image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverConfig {
    /// Target cover width in pixels.
    pub width: u32,
    /// Target cover height in pixels.
    pub height: u32,
    /// JPEG quality for the re-encoded cover.
    pub quality: u32,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 2560,
            quality: 90,
        }
    }
}

/// External converter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Converter executable, looked up on `PATH` unless it is a path.
    pub program: String,
    /// Extra arguments appended after the generated ones (e.g. `["--toc"]`).
    pub extra_args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Absolute (root-joined) locations of everything the pipeline touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub manuscript_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub output_file: PathBuf,
    pub metadata_file: PathBuf,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
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
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize, validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to defaults when it is absent.
pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `bindery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bindery configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Paths are relative to the project root.
# Unknown keys will cause an error.

# Directory with the Markdown chapters. Files are bound in filename order.
manuscript_dir = "manuscript"

# Directory with the images referenced from the chapters.
assets_dir = "assets"

# Where the converter writes the book.
output_file = "output/output.epub"

# pandoc metadata file (title, author, cover-image, ...). Optional on disk.
metadata_file = "metadata.yaml"

# ---------------------------------------------------------------------------
# Image conditioning
# ---------------------------------------------------------------------------
[images]
# Downscale and re-encode images, and resize the cover.
# Orientation is always corrected, even when this is off.
compress = true

# Images larger than this box are scaled down, keeping their aspect ratio.
max_width = 1600
max_height = 1600

# JPEG re-encoding quality (1 = worst, 100 = best). PNGs are optimized losslessly.
jpeg_quality = 85

# ---------------------------------------------------------------------------
# Cover
# ---------------------------------------------------------------------------
[cover]
# Target box for the cover. The cover keeps its own aspect ratio: the side
# that is proportionally too long is clamped to the box.
width = 1600
height = 2560

# The cover is always written as JPEG with this quality.
quality = 90

# ---------------------------------------------------------------------------
# Converter
# ---------------------------------------------------------------------------
[converter]
# Executable that packages the book.
program = "pandoc"

# Extra arguments, appended after the generated ones.
# extra_args = ["--toc", "--split-level=1"]
extra_args = []
"##
}
