//! # bindery
//!
//! Prepares a Markdown manuscript and its images for EPUB packaging, then
//! hands everything to an external converter (pandoc).
//!
//! # Architecture: Five-Stage Pipeline
//!
//! ```text
//! 1. Normalize  assets/      →  safe filenames + rename mapping
//! 2. Condition  assets/      →  orientation fixed, downscaled, re-encoded
//! 3. Cover      metadata     →  cover resized to the cover box, record updated
//! 4. Rewrite    manuscript/  →  image embeds follow the renames
//! 5. Convert    everything   →  output/output.epub
//! ```
//!
//! Stages run in order, in place, on one thread. The only value passed between
//! them is the rename mapping from stage 1. Per-file problems are collected as
//! [`types::Warning`]s and the run continues; only a missing asset directory or
//! an invalid config stops it. See [`pipeline`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`normalize`] | Stage 1: renames assets to safe names, builds the rename mapping |
//! | [`condition`] | Stage 2: EXIF orientation and compression of every asset |
//! | [`cover`] | Stage 3: cover resize and `cover-image` update |
//! | [`rewrite`] | Stage 4: rewrites `![alt](path)` embeds in the manuscripts |
//! | [`convert`] | Stage 5: builds and runs the converter command |
//! | [`pipeline`] | Runs the five stages and reports progress events |
//! | [`config`] | `bindery.toml` loading, merging onto stock defaults, validation |
//! | [`naming`] | Safe-filename rules and collision suffixes |
//! | [`metadata`] | The pandoc YAML metadata record |
//! | [`imaging`] | Pure-Rust image operations behind the `ImageBackend` trait |
//! | [`types`] | Shared types: rename mapping, stages, warnings |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Safe Names
//!
//! A safe filename keeps only letters and digits (any script), `_`, `.`, `-`
//! and CJK unified ideographs (U+4E00 to U+9FA5) in the stem, plus the
//! original extension. See [`naming`].
//! Names that collide get `-1`, `-2`, ... suffixes; an existing file is never
//! overwritten.
//!
//! ## Pattern-Based Rewriting
//!
//! Embeds are found with a regular expression, not a Markdown parser, so
//! anything that isn't a renamed embed stays byte-for-byte identical. See
//! [`rewrite`].
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, EXIF orientation, Lanczos3 resampling and JPEG/PNG encoding all go
//! through the `image` crate. The converter is the only external program.

pub mod condition;
pub mod config;
pub mod convert;
pub mod cover;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod rewrite;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
