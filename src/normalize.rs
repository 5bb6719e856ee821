//! Asset normalization: stage 1 of the bindery pipeline.
//!
//! Scans the asset directory (non-recursively), computes a safe name for every
//! image (see [`naming`](crate::naming)) and renames files in place. The
//! resulting [`RenameMap`] is the only input the reference rewriter needs.
//!
//! ## Collisions
//!
//! Two sources can sanitize to the same name (`a b.jpg`, `a  b.jpg`), or the
//! safe name can already belong to another file. Files are visited in
//! filename order; the first one gets the plain name, later ones get `-1`,
//! `-2`, … suffixes. Existing files are never overwritten.
//!
//! ## Failure modes
//!
//! - Asset directory missing → [`NormalizeError::AssetsDirMissing`], nothing
//!   is touched. This is the only error that stops a build.
//! - A single rename failing → [`Warning`]; the file keeps its name and is
//!   left out of the mapping.

use crate::naming::{self, ClaimedNames};
use crate::types::{RenameMap, Stage, Warning};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Assets directory does not exist: {}", .0.display())]
    AssetsDirMissing(PathBuf),
    #[error("Failed to list assets: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One image and the name it ends up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub original: String,
    pub renamed: String,
}

impl RenameEntry {
    /// Whether the file has to move on disk.
    pub fn moves(&self) -> bool {
        self.original != self.renamed
    }
}

/// Result of normalizing an asset directory.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Images that now carry their safe name, in filename order.
    pub entries: Vec<RenameEntry>,
    pub map: RenameMap,
    pub warnings: Vec<Warning>,
}

impl NormalizeReport {
    /// Current on-disk paths of every normalized image.
    pub fn asset_paths(&self, assets_dir: &Path) -> Vec<PathBuf> {
        self.entries
            .iter()
            .map(|e| assets_dir.join(&e.renamed))
            .collect()
    }

    pub fn moved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.moves()).count()
    }
}

fn ensure_dir(dir: &Path) -> Result<(), NormalizeError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(NormalizeError::AssetsDirMissing(dir.to_path_buf()))
    }
}

/// Compute the renames [`normalize_assets`] would perform, without touching
/// the filesystem.
pub fn plan_renames(dir: &Path) -> Result<Vec<RenameEntry>, NormalizeError> {
    ensure_dir(dir)?;

    let mut existing = HashSet::new();
    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_file() && naming::is_asset_file(&name) {
            images.push(name.clone());
        }
        existing.insert(name);
    }

    let mut claimed = ClaimedNames::new();
    let mut plan = Vec::with_capacity(images.len());
    for original in images {
        let safe = naming::sanitized_file_name(&original);
        let renamed = if safe == original {
            safe
        } else {
            naming::disambiguate(&safe, |n| claimed.contains(n) || existing.contains(n))
        };
        claimed.claim(&renamed);
        plan.push(RenameEntry { original, renamed });
    }
    Ok(plan)
}

/// Rename every image in `dir` to its safe name and build the rename mapping.
///
/// The mapping has an entry for every image, including those that kept their
/// name.
pub fn normalize_assets(dir: &Path) -> Result<NormalizeReport, NormalizeError> {
    let plan = plan_renames(dir)?;
    let mut report = NormalizeReport::default();

    for entry in plan {
        if entry.moves() {
            let from = dir.join(&entry.original);
            let to = dir.join(&entry.renamed);
            if to.exists() {
                report.warnings.push(Warning::new(
                    Stage::Normalize,
                    &entry.original,
                    format!("{} appeared during the run, not renaming", entry.renamed),
                ));
                continue;
            }
            if let Err(e) = fs::rename(&from, &to) {
                report
                    .warnings
                    .push(Warning::new(Stage::Normalize, &entry.original, e));
                continue;
            }
        }
        report
            .map
            .insert(entry.original.clone(), entry.renamed.clone());
        report.entries.push(entry);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TestProject, assert_files};

    #[test]
    fn missing_directory_is_fatal() {
        let project = TestProject::new();
        let missing = project.root().join("nope");
        let result = normalize_assets(&missing);
        assert!(matches!(result, Err(NormalizeError::AssetsDirMissing(p)) if p == missing));
    }

    #[test]
    fn file_in_place_of_directory_is_fatal() {
        let project = TestProject::new();
        let file = project.root().join("assets.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            normalize_assets(&file),
            Err(NormalizeError::AssetsDirMissing(_))
        ));
    }

    #[test]
    fn renames_unsafe_names_and_maps_everything() {
        let project = TestProject::new();
        project.jpeg("photo (1).jpg", 8, 8);
        project.png("diagram.png", 8, 8);

        let dir = project.paths().assets_dir;
        let report = normalize_assets(&dir).unwrap();

        assert_files(&dir, &["diagram.png", "photo1.jpg"]);
        assert_eq!(report.map["photo (1).jpg"], "photo1.jpg");
        assert_eq!(report.map["diagram.png"], "diagram.png");
        assert_eq!(report.moved_count(), 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn skips_non_images_and_subdirectories() {
        let project = TestProject::new();
        let dir = project.paths().assets_dir;
        fs::write(dir.join("notes (draft).txt"), "x").unwrap();
        fs::create_dir(dir.join("raw (old).jpg")).unwrap();
        project.jpeg("a.JPG", 4, 4);

        let report = normalize_assets(&dir).unwrap();

        assert_files(&dir, &["a.JPG", "notes (draft).txt", "raw (old).jpg"]);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.map.len(), 1);
    }

    #[test]
    fn colliding_names_are_suffixed_not_overwritten() {
        let project = TestProject::new();
        project.jpeg("ab.jpg", 4, 4);
        project.jpeg("a b.jpg", 5, 5);
        project.jpeg("a  b.jpg", 6, 6);

        let dir = project.paths().assets_dir;
        let report = normalize_assets(&dir).unwrap();

        assert_files(&dir, &["ab-1.jpg", "ab-2.jpg", "ab.jpg"]);
        // Sorted visit order: "a  b.jpg" < "a b.jpg" < "ab.jpg"
        assert_eq!(report.map["a  b.jpg"], "ab-1.jpg");
        assert_eq!(report.map["a b.jpg"], "ab-2.jpg");
        assert_eq!(report.map["ab.jpg"], "ab.jpg");
        // The pre-existing file kept its pixels
        assert_eq!(image::image_dimensions(dir.join("ab.jpg")).unwrap(), (4, 4));
    }

    #[test]
    fn plan_does_not_touch_disk() {
        let project = TestProject::new();
        project.jpeg("my photo.jpg", 4, 4);
        let dir = project.paths().assets_dir;

        let plan = plan_renames(&dir).unwrap();

        assert_eq!(
            plan,
            vec![RenameEntry {
                original: "my photo.jpg".into(),
                renamed: "myphoto.jpg".into(),
            }]
        );
        assert_files(&dir, &["my photo.jpg"]);
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let project = TestProject::new();
        project.jpeg("x (1).jpeg", 4, 4);
        let dir = project.paths().assets_dir;

        normalize_assets(&dir).unwrap();
        let second = normalize_assets(&dir).unwrap();

        assert_eq!(second.moved_count(), 0);
        assert_eq!(second.map["x1.jpeg"], "x1.jpeg");
    }

    #[test]
    fn asset_paths_point_at_new_names() {
        let project = TestProject::new();
        project.jpeg("c d.jpg", 4, 4);
        let dir = project.paths().assets_dir;

        let report = normalize_assets(&dir).unwrap();
        let paths = report.asset_paths(&dir);

        assert_eq!(paths, vec![dir.join("cd.jpg")]);
        assert!(paths[0].exists());
    }
}
