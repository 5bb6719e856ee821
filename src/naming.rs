//! Filename safety for image assets.
//!
//! Asset names end up inside EPUB manifests and `![](...)` links, so anything
//! outside a small set of character classes is stripped from the stem:
//!
//! - letters and digits (any script)
//! - `_`, `.`, `-`
//! - CJK unified ideographs (`U+4E00..=U+9FA5`)
//!
//! The extension is re-appended exactly as it was spelled. Examples:
//! - `photo (1).jpg` → `photo1.jpg`
//! - `My Trip #3.PNG` → `MyTrip3.PNG`
//! - `封面 圖.jpeg` → `封面圖.jpeg`

use std::collections::HashSet;
use std::path::Path;

/// Image extensions the pipeline processes (compared case-insensitively).
pub const ASSET_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Stem used when sanitization leaves nothing behind (e.g. `(1).jpg`).
const FALLBACK_STEM: &str = "image";

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

fn is_permitted(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-') || is_cjk_ideograph(c)
}

/// Whether a filename has one of the [`ASSET_EXTENSIONS`].
pub fn is_asset_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ASSET_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Strip every character outside the permitted classes. Idempotent.
pub fn sanitize_stem(stem: &str) -> String {
    stem.chars().filter(|&c| is_permitted(c)).collect()
}

/// Split `name` into stem and extension, the way `Path` does.
fn split_name(name: &str) -> (&str, Option<&str>) {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str());
    (stem, ext)
}

/// Sanitized stem plus the original extension.
///
/// Falls back to `image` as the stem when nothing survives sanitization.
pub fn sanitized_file_name(name: &str) -> String {
    let (stem, ext) = split_name(name);
    let mut clean = sanitize_stem(stem);
    if clean.is_empty() {
        clean = FALLBACK_STEM.to_string();
    }
    match ext {
        Some(ext) => format!("{clean}.{ext}"),
        None => clean,
    }
}

/// Return `name`, or the first `stem-N.ext` (N = 1, 2, …) not rejected by `taken`.
///
/// Used when two source files sanitize to the same target, or the target is
/// already occupied on disk. Suffixed names stay within the permitted classes.
pub fn disambiguate(name: &str, mut taken: impl FnMut(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let (stem, ext) = split_name(name);
    (1..)
        .map(|n| match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        })
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Names claimed during one normalization run, so later files can't reuse them.
#[derive(Debug, Default)]
pub struct ClaimedNames {
    names: HashSet<String>,
}

impl ClaimedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
