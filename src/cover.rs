//! Cover processing: stage 3 of the bindery pipeline.
//!
//! Reads `cover-image` from the metadata record, resizes the image into the
//! configured cover box, writes it as JPEG next to the source, and points the
//! record at the new file:
//!
//! ```text
//! metadata.yaml:  cover-image: assets/cover.png
//!                              ↓
//! assets/cover.jpg  (1600 wide or 2560 tall, quality 90)
//! metadata.yaml:  cover-image: assets/cover.jpg
//! ```
//!
//! The path in the record is resolved against the metadata file's directory.
//! If the file is gone because stage 1 renamed it, the renamed file is used
//! instead. An existing file at the JPEG path other than the source itself is
//! never overwritten; the output gets a `-N` suffix like a colliding rename. Every failure becomes [`CoverOutcome::Failed`]; the build never
//! stops here.

use crate::config::CoverConfig;
use crate::imaging::{ImageBackend, create_cover};
use crate::metadata::MetadataRecord;
use crate::naming::disambiguate;
use crate::rewrite::remap_reference;
use crate::types::{RenameMap, Stage, Warning};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOutcome {
    /// No metadata file on disk.
    NoMetadata,
    /// The record has no `cover-image` field.
    NoCoverField,
    Created {
        source: PathBuf,
        output: PathBuf,
        width: u32,
        height: u32,
        /// New value of `cover-image`.
        field: String,
    },
    Failed(Warning),
}

/// `cover-image` with its extension replaced by `jpg`, same spelling otherwise.
fn jpeg_field(field: &str) -> String {
    match field.rfind('.') {
        Some(dot) if !field[dot..].contains(['/', '\\']) => format!("{}.jpg", &field[..dot]),
        _ => format!("{field}.jpg"),
    }
}

/// Split a `cover-image` value into its directory prefix (with the trailing
/// separator) and file name.
fn split_field(field: &str) -> (&str, &str) {
    match field.rfind(['/', '\\']) {
        Some(sep) => field.split_at(sep + 1),
        None => ("", field),
    }
}

/// The JPEG field for `source`, suffixed if its natural name is occupied by a
/// different file.
fn output_field(base: &Path, field: &str, source: &Path) -> String {
    let jpeg = jpeg_field(field);
    let (dir, name) = split_field(&jpeg);
    let name = disambiguate(name, |candidate| {
        let path = base.join(format!("{dir}{candidate}"));
        path.as_path() != source && path.exists()
    });
    format!("{dir}{name}")
}

/// The field value and source path to use, following a stage 1 rename if the
/// original file no longer exists.
fn locate_source(base: &Path, field: &str, renames: &RenameMap) -> Option<(String, PathBuf)> {
    let direct = base.join(field);
    if direct.is_file() {
        return Some((field.to_string(), direct));
    }
    let renamed = remap_reference(field, renames)?;
    let path = base.join(&renamed);
    path.is_file().then_some((renamed, path))
}

/// Run the cover stage against `metadata_file`.
pub fn process_cover(
    backend: &impl ImageBackend,
    metadata_file: &Path,
    renames: &RenameMap,
    config: &CoverConfig,
) -> CoverOutcome {
    if !metadata_file.is_file() {
        return CoverOutcome::NoMetadata;
    }
    let subject = metadata_file.display().to_string();
    let fail = |subject: &str, message: String| {
        CoverOutcome::Failed(Warning::new(Stage::Cover, subject, message))
    };

    let mut record = match MetadataRecord::load(metadata_file) {
        Ok(record) => record,
        Err(e) => return fail(&subject, format!("metadata not readable: {e}")),
    };
    let Some(field) = record.cover_image().map(str::to_string) else {
        return CoverOutcome::NoCoverField;
    };

    let base = metadata_file.parent().unwrap_or(Path::new("."));
    let Some((field, source)) = locate_source(base, &field, renames) else {
        return fail(&field, "cover image not found".to_string());
    };

    let new_field = output_field(base, &field, &source);
    let output = base.join(&new_field);
    let params = match create_cover(backend, &source, &output, config) {
        Ok(params) => params,
        Err(e) => return fail(&field, format!("cover not resized: {e}")),
    };

    record.set_cover_image(&new_field);
    if let Err(e) = record.save(metadata_file) {
        return fail(&subject, format!("metadata not updated: {e}"));
    }

    CoverOutcome::Created {
        source,
        output,
        width: params.width,
        height: params.height,
        field: new_field,
    }
}
