//! Shared test utilities for the bindery test suite.
//!
//! Provides synthetic image writers and a throwaway project layout so stage
//! tests can run against real files without shipping binary fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = TestProject::new();
//! project.jpeg("photo (1).jpg", 64, 48);
//! project.chapter("01-intro.md", "![a](../assets/photo (1).jpg)\n");
//!
//! assert_files(&project.paths().assets_dir, &["photo (1).jpg"]);
//! ```

use crate::config::{BuildConfig, ProjectPaths};
use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid RGBA PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Encode `img` as JPEG with an EXIF APP1 segment carrying only the
/// Orientation tag (1-8).
///
/// The segment is a big-endian TIFF header with a single IFD entry, spliced in
/// right after the SOI marker.
pub fn jpeg_with_exif_orientation(img: &RgbImage, orientation: u16) -> Vec<u8> {
    let mut encoded = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    assert_eq!(&encoded[..2], &[0xFF, 0xD8], "encoder output must start with SOI");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A"); // big-endian TIFF
    tiff.extend_from_slice(&8u32.to_be_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_be_bytes()); // one entry
    tiff.extend_from_slice(&0x0112u16.to_be_bytes()); // Orientation
    tiff.extend_from_slice(&3u16.to_be_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_be_bytes()); // count
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]); // value padding
    tiff.extend_from_slice(&0u32.to_be_bytes()); // no next IFD

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);
    let segment_len = (payload.len() + 2) as u16;

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&encoded[2..]);
    out
}

/// A `width`x`height` image that is red in its top-left quadrant and black
/// everywhere else, so rotations are easy to see.
pub fn quadrant_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if x < width / 2 && y < height / 2 {
            image::Rgb([230, 20, 20])
        } else {
            image::Rgb([0, 0, 0])
        }
    })
}

// =========================================================================
// Project layout
// =========================================================================

/// A project tree in a temp directory, laid out per the default config.
///
/// The manuscript and asset directories exist from the start; the metadata
/// file does not.
pub struct TestProject {
    pub dir: TempDir,
    pub config: BuildConfig,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig::default();
        let project = Self { dir, config };
        let paths = project.paths();
        std::fs::create_dir_all(&paths.manuscript_dir).unwrap();
        std::fs::create_dir_all(&paths.assets_dir).unwrap();
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> ProjectPaths {
        self.config.paths(self.dir.path())
    }

    pub fn asset(&self, name: &str) -> PathBuf {
        self.paths().assets_dir.join(name)
    }

    /// Write a JPEG into the asset directory.
    pub fn jpeg(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.asset(name);
        create_test_jpeg(&path, width, height);
        path
    }

    /// Write a PNG into the asset directory.
    pub fn png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.asset(name);
        create_test_png(&path, width, height);
        path
    }

    /// Write a Markdown chapter into the manuscript directory.
    pub fn chapter(&self, name: &str, body: &str) -> PathBuf {
        let path = self.paths().manuscript_dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    pub fn read_chapter(&self, name: &str) -> String {
        std::fs::read_to_string(self.paths().manuscript_dir.join(name)).unwrap()
    }

    /// Write the metadata file.
    pub fn metadata(&self, yaml: &str) -> PathBuf {
        let path = self.paths().metadata_file;
        std::fs::write(&path, yaml).unwrap();
        path
    }
}

// =========================================================================
// Assertions
// =========================================================================

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Assert the exact set of file names in `dir` (order-insensitive).
pub fn assert_files(dir: &Path, expected: &[&str]) {
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(file_names(dir), expected, "files in {} mismatch", dir.display());
}
