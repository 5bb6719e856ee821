//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations every backend must
//! support: identify, read_orientation, fix_orientation, recompress and
//! encode_cover.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording mock below.

use super::params::{CoverParams, Encoding, RecompressParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Clockwise rotation applied to correct an image's EXIF orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Pixel size of a `(width, height)` image after this rotation.
    pub fn rotated_dimensions(self, (width, height): (u32, u32)) -> (u32, u32) {
        match self {
            Rotation::Deg180 => (width, height),
            Rotation::Deg90 | Rotation::Deg270 => (height, width),
        }
    }
}

/// Trait for image processing backends.
///
/// All operations work on files in place or write a new file; none of them
/// keep state between calls.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// The rotation the embedded EXIF orientation asks for, without touching
    /// the file. `None` when there is no tag or it is not a pure rotation.
    fn read_orientation(&self, path: &Path) -> Result<Option<Rotation>, BackendError>;

    /// Rotate the pixels to match the embedded EXIF orientation and write the
    /// file back with `encoding`.
    ///
    /// Returns `Ok(None)` without touching the file when there is no
    /// orientation tag or it is not a pure 90/180/270 rotation.
    fn fix_orientation(
        &self,
        path: &Path,
        encoding: Encoding,
    ) -> Result<Option<Rotation>, BackendError>;

    /// Re-encode a file in place, optionally rotating and resizing it first.
    ///
    /// The file is encoded once, so a rotated JPEG loses only one generation.
    fn recompress(&self, params: &RecompressParams) -> Result<(), BackendError>;

    /// Resize the cover to exact dimensions and write it as JPEG.
    fn encode_cover(&self, params: &CoverParams) -> Result<(), BackendError>;
}
