//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to do with each asset) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Encoding`]: How a file is written back: JPEG with a quality, or optimized PNG.
//! - [`RecompressParams`]: In-place re-encode of an asset, optionally resized.
//! - [`CoverParams`]: Cover resize: source, output path, exact dimensions, JPEG quality.

use super::backend::Rotation;
use std::path::{Path, PathBuf};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Output encoding for a re-written asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Baseline JPEG at the given quality.
    Jpeg(Quality),
    /// PNG with best compression and adaptive filtering. Lossless, so no quality.
    Png,
}

impl Encoding {
    /// Pick the encoding matching a file's extension.
    ///
    /// `jpg`/`jpeg` get `quality`; `png` is optimized only. Anything else is
    /// not an asset this pipeline writes.
    pub fn for_path(path: &Path, quality: Quality) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Encoding::Jpeg(quality)),
            "png" => Some(Encoding::Png),
            _ => None,
        }
    }
}

/// Re-encode an asset in place, rotating and resizing first when set.
#[derive(Debug, Clone, PartialEq)]
pub struct RecompressParams {
    pub path: PathBuf,
    /// EXIF correction applied to the decoded pixels before resizing.
    pub rotation: Option<Rotation>,
    /// Exact output dimensions in the rotated frame, or `None` to keep the
    /// pixel size.
    pub resize: Option<(u32, u32)>,
    pub encoding: Encoding,
}

/// Resize a cover to exact dimensions and write it as JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn encoding_follows_extension() {
        let q = Quality::new(80);
        assert_eq!(
            Encoding::for_path(Path::new("a.jpg"), q),
            Some(Encoding::Jpeg(q))
        );
        assert_eq!(
            Encoding::for_path(Path::new("a.JPEG"), q),
            Some(Encoding::Jpeg(q))
        );
        assert_eq!(Encoding::for_path(Path::new("a.Png"), q), Some(Encoding::Png));
        assert_eq!(Encoding::for_path(Path::new("a.gif"), q), None);
        assert_eq!(Encoding::for_path(Path::new("noext"), q), None);
    }
}
