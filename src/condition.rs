//! Image conditioning: stage 2 of the bindery pipeline.
//!
//! For every normalized asset:
//!
//! 1. **Orientation**: if the EXIF tag asks for a 90/180/270° rotation, the
//!    pixels are rotated. No tag or a mirrored orientation leaves it alone.
//! 2. **Compression** (when enabled): images larger than the configured box
//!    are scaled down proportionally, then every image is re-encoded (JPEG at
//!    the configured quality, PNG optimized losslessly).
//!
//! With compression on, the rotation is folded into the re-encode so a JPEG
//! goes through the lossy encoder once. With it off, a rotated image is
//! written back on its own.
//!
//! Nothing here fails the build. Each step that goes wrong for an image turns
//! into a [`Warning`] and the next step / image carries on.

use crate::config::ImagesConfig;
use crate::imaging::{
    CompressOutcome, CompressionConfig, ImageBackend, Quality, Rotation, compress_image,
    correct_orientation, read_orientation,
};
use crate::types::{Stage, Warning};
use std::path::PathBuf;

/// How stage 2 treats each image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionOptions {
    /// JPEG quality used when a rotated image is written back.
    pub orientation_quality: Quality,
    /// `None` disables compression entirely.
    pub compression: Option<CompressionConfig>,
}

impl ConditionOptions {
    pub fn from_images_config(config: &ImagesConfig) -> Self {
        Self {
            orientation_quality: Quality::new(config.jpeg_quality),
            compression: config
                .compress
                .then(|| CompressionConfig::from_images_config(config)),
        }
    }
}

/// What happened to one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionedImage {
    pub name: String,
    /// Rotation applied to fix orientation, if any.
    pub rotation: Option<Rotation>,
    /// Compression result; `None` when disabled or failed.
    pub compression: Option<CompressOutcome>,
}

#[derive(Debug, Default)]
pub struct ConditionReport {
    pub images: Vec<ConditionedImage>,
    pub warnings: Vec<Warning>,
}

impl ConditionReport {
    pub fn rotated_count(&self) -> usize {
        self.images.iter().filter(|i| i.rotation.is_some()).count()
    }

    pub fn resized_count(&self) -> usize {
        self.images
            .iter()
            .filter(|i| i.compression.is_some_and(|c| c.resized()))
            .count()
    }
}

/// Condition every image in `paths`, in order.
pub fn condition_images(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    options: &ConditionOptions,
) -> ConditionReport {
    let mut report = ConditionReport::default();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let orientation = match options.compression {
            Some(_) => read_orientation(backend, path),
            None => correct_orientation(backend, path, options.orientation_quality),
        };
        let rotation = match orientation {
            Ok(rotation) => rotation,
            Err(e) => {
                report.warnings.push(Warning::new(
                    Stage::Condition,
                    &name,
                    format!("orientation not corrected: {e}"),
                ));
                None
            }
        };

        let compression = options.compression.and_then(|config| {
            compress_image(backend, path, rotation, &config)
                .map_err(|e| {
                    report.warnings.push(Warning::new(
                        Stage::Condition,
                        &name,
                        format!("compression skipped: {e}"),
                    ))
                })
                .ok()
        });
        // A rotation folded into a failed re-encode never reached the file
        let rotation = match (options.compression, compression) {
            (Some(_), None) => None,
            _ => rotation,
        };

        report.images.push(ConditionedImage {
            name,
            rotation,
            compression,
        });
    }

    report
}
