//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | EXIF orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (best compression, adaptive filter) |
//!
//! Every write encodes into memory first and only then replaces the file, so a
//! failed encode leaves the original bytes on disk.

use super::backend::{BackendError, Dimensions, ImageBackend, Rotation};
use super::params::{CoverParams, Encoding, RecompressParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::Path;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Map an EXIF orientation to the rotation we apply.
///
/// Only pure rotations are corrected; mirrored orientations are left alone.
pub(crate) fn rotation_for(orientation: Orientation) -> Option<Rotation> {
    match orientation {
        Orientation::Rotate90 => Some(Rotation::Deg90),
        Orientation::Rotate180 => Some(Rotation::Deg180),
        Orientation::Rotate270 => Some(Rotation::Deg270),
        _ => None,
    }
}

/// Open a decoder and read its EXIF orientation.
fn open_oriented(path: &Path) -> Result<(impl ImageDecoder, Orientation), BackendError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| decode_error(path, e))?;
    let orientation = decoder.orientation().map_err(|e| decode_error(path, e))?;
    Ok((decoder, orientation))
}

fn rotate(img: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::Deg90 => img.rotate90(),
        Rotation::Deg180 => img.rotate180(),
        Rotation::Deg270 => img.rotate270(),
    }
}

/// Encode an image into an in-memory buffer.
fn encode(img: &DynamicImage, encoding: Encoding) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let result = match encoding {
        Encoding::Jpeg(quality) => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        Encoding::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
        }
    };
    result.map_err(|e| BackendError::ProcessingFailed(format!("Encode failed: {}", e)))?;
    Ok(buf)
}

/// Encode and replace the file at `path`.
fn save_image(img: &DynamicImage, path: &Path, encoding: Encoding) -> Result<(), BackendError> {
    let bytes = encode(img, encoding)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn read_orientation(&self, path: &Path) -> Result<Option<Rotation>, BackendError> {
        let (_, orientation) = open_oriented(path)?;
        Ok(rotation_for(orientation))
    }

    fn fix_orientation(
        &self,
        path: &Path,
        encoding: Encoding,
    ) -> Result<Option<Rotation>, BackendError> {
        let (decoder, orientation) = open_oriented(path)?;
        let Some(rotation) = rotation_for(orientation) else {
            return Ok(None);
        };

        let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
        img.apply_orientation(orientation);
        save_image(&img, path, encoding)?;
        Ok(Some(rotation))
    }

    fn recompress(&self, params: &RecompressParams) -> Result<(), BackendError> {
        let img = load_image(&params.path)?;
        let img = match params.rotation {
            Some(rotation) => rotate(img, rotation),
            None => img,
        };
        let img = match params.resize {
            Some((width, height)) => img.resize_exact(width, height, FilterType::Lanczos3),
            None => img,
        };
        save_image(&img, &params.path, params.encoding)
    }

    fn encode_cover(&self, params: &CoverParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, &params.output, Encoding::Jpeg(params.quality))
    }
}
