//! pandoc metadata record (`metadata.yaml`).
//!
//! The record is kept as an ordered YAML mapping. bindery only ever reads and
//! rewrites the `cover-image` field; every other key (title, author, lang,
//! rights, ...) is carried through untouched and in its original order.
//!
//! pandoc accepts metadata files wrapped in `---` / `...` document markers, so
//! those are tolerated on load. An empty file is an empty record.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Key pandoc reads the EPUB cover from.
pub const COVER_IMAGE_KEY: &str = "cover-image";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Metadata must be a YAML mapping of keys to values")]
    NotAMapping,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    fields: Mapping,
}

impl MetadataRecord {
    pub fn parse(text: &str) -> Result<Self, MetadataError> {
        match serde_yaml::from_str::<Value>(text)? {
            Value::Null => Ok(Self::default()),
            Value::Mapping(fields) => Ok(Self { fields }),
            _ => Err(MetadataError::NotAMapping),
        }
    }

    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn to_yaml(&self) -> Result<String, MetadataError> {
        Ok(serde_yaml::to_string(&self.fields)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), MetadataError> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// The `cover-image` path, if present and a string.
    pub fn cover_image(&self) -> Option<&str> {
        self.fields.get(COVER_IMAGE_KEY).and_then(Value::as_str)
    }

    /// Replace (or insert) the `cover-image` path, keeping its position.
    pub fn set_cover_image(&mut self, path: &str) {
        self.fields.insert(
            Value::String(COVER_IMAGE_KEY.to_string()),
            Value::String(path.to_string()),
        );
    }

    /// Look up any other field, e.g. `title`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
