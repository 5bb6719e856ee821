//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend, Rotation};
use super::calculations::{bounded_dimensions, cover_dimensions};
use super::params::{CoverParams, Encoding, Quality, RecompressParams};
use crate::config::{CoverConfig, ImagesConfig};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok(dims.as_tuple())
}

fn encoding_for(path: &Path, quality: Quality) -> Result<Encoding> {
    Encoding::for_path(path, quality)
        .ok_or_else(|| BackendError::UnsupportedFormat(path.to_path_buf()))
}

/// The rotation an asset's EXIF orientation asks for. Read-only.
///
/// Files this pipeline can't write back are rejected up front, the same as in
/// [`correct_orientation`].
pub fn read_orientation(backend: &impl ImageBackend, path: &Path) -> Result<Option<Rotation>> {
    encoding_for(path, Quality::default())?;
    backend.read_orientation(path)
}

/// Apply the EXIF orientation of an asset in place.
///
/// JPEGs that need rotating are written back at `quality`.
pub fn correct_orientation(
    backend: &impl ImageBackend,
    path: &Path,
    quality: Quality,
) -> Result<Option<Rotation>> {
    let encoding = encoding_for(path, quality)?;
    backend.fix_orientation(path, encoding)
}

/// Bounds and quality for asset compression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: Quality,
}

impl CompressionConfig {
    pub fn from_images_config(config: &ImagesConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            jpeg_quality: Quality::new(config.jpeg_quality),
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::from_images_config(&ImagesConfig::default())
    }
}

/// Pixel size of an asset before and after compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOutcome {
    pub before: (u32, u32),
    pub after: (u32, u32),
}

impl CompressOutcome {
    pub fn resized(&self) -> bool {
        self.before != self.after
    }
}

/// Plan a compression without executing it.
///
/// `dimensions` are the upright (already rotated) pixel size, so the bounds
/// apply to the image as it is displayed.
pub fn plan_compression(
    path: &Path,
    dimensions: (u32, u32),
    rotation: Option<Rotation>,
    config: &CompressionConfig,
) -> Result<RecompressParams> {
    Ok(RecompressParams {
        path: path.to_path_buf(),
        rotation,
        resize: bounded_dimensions(dimensions, (config.max_width, config.max_height)),
        encoding: encoding_for(path, config.jpeg_quality)?,
    })
}

/// Rotate (when `rotation` is set), downscale an asset to fit the configured
/// bounds, and re-encode it in place.
///
/// Images already within bounds keep their pixel size but are still
/// re-encoded (JPEG at the configured quality, PNG optimized). `before` and
/// `after` in the outcome are upright sizes.
pub fn compress_image(
    backend: &impl ImageBackend,
    path: &Path,
    rotation: Option<Rotation>,
    config: &CompressionConfig,
) -> Result<CompressOutcome> {
    let stored = get_dimensions(backend, path)?;
    let before = rotation.map_or(stored, |r| r.rotated_dimensions(stored));
    let params = plan_compression(path, before, rotation, config)?;
    backend.recompress(&params)?;
    Ok(CompressOutcome {
        before,
        after: params.resize.unwrap_or(before),
    })
}

/// Plan a cover resize without executing it.
pub fn plan_cover(
    source: &Path,
    output: &Path,
    source_dims: (u32, u32),
    config: &CoverConfig,
) -> CoverParams {
    let (width, height) = cover_dimensions(source_dims, (config.width, config.height));
    CoverParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        quality: Quality::new(config.quality),
    }
}

/// Resize a cover into the configured box and write it as JPEG at `output`.
pub fn create_cover(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &CoverConfig,
) -> Result<CoverParams> {
    let dims = get_dimensions(backend, source)?;
    let params = plan_cover(source, output, dims, config);
    backend.encode_cover(&params)?;
    Ok(params)
}
