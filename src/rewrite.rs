//! Reference rewriting: stage 4 of the bindery pipeline.
//!
//! Markdown image embeds (`![alt](path)`) that point at a renamed asset are
//! rewritten to the new name. Matching is done with a pattern rather than a
//! Markdown parser so everything that isn't a matching embed stays
//! byte-for-byte identical.
//!
//! ```text
//! mapping:  photo (1).jpg → photo1.jpg
//! before:   ![cover](images/photo (1).jpg)
//! after:    ![](images/photo1.jpg)
//! ```
//!
//! Only the final path component is looked up in the mapping; the directory
//! part is kept (with `\` normalized to `/`). The alt text of a rewritten embed
//! is dropped. An optional pandoc link title (`"..."`) and `<...>` brackets
//! around the path are preserved.

use crate::convert::collect_manuscripts;
use crate::types::{RenameMap, Stage, Warning};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `![alt](target)` on one line. The target may contain one level of balanced
/// parentheses, so `photo (1).jpg` is captured whole.
static EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[.*?\]\(((?:[^()\n]|\([^()\n]*\))*)\)").expect("embed pattern is valid")
});

/// Split an embed target into the path and a trailing ` "title"`, if any.
fn split_title(target: &str) -> (&str, &str) {
    if target.ends_with('"') {
        if let Some(start) = target[..target.len() - 1].rfind(" \"") {
            return (&target[..start], &target[start..]);
        }
    }
    (target, "")
}

/// Map a reference path through the rename mapping.
///
/// Returns `parent/new_name` (forward slashes) when the final component of
/// `path` is a key in `map`, `None` otherwise.
pub fn remap_reference(path: &str, map: &RenameMap) -> Option<String> {
    let (parent, file_name) = match path.rfind(['/', '\\']) {
        Some(idx) => (Some(&path[..idx]), &path[idx + 1..]),
        None => (None, path),
    };
    let renamed = map.get(file_name)?;
    Some(match parent {
        Some(parent) => format!("{}/{}", parent.replace('\\', "/"), renamed),
        None => renamed.clone(),
    })
}

fn rewrite_embed(caps: &Captures<'_>, map: &RenameMap) -> Option<String> {
    let (path, title) = split_title(&caps[1]);
    let (path, bracketed) = match path.strip_prefix('<').and_then(|p| p.strip_suffix('>')) {
        Some(inner) => (inner, true),
        None => (path, false),
    };
    let new_path = remap_reference(path, map)?;
    Some(if bracketed {
        format!("![](<{new_path}>{title})")
    } else {
        format!("![]({new_path}{title})")
    })
}

/// Rewrite every embed whose file name is in `map`.
///
/// Returns the new text and the number of embeds rewritten. Embeds whose file
/// name is not in the mapping are left exactly as they were.
pub fn rewrite_references(text: &str, map: &RenameMap) -> (String, usize) {
    let mut count = 0;
    let rewritten = EMBED.replace_all(text, |caps: &Captures<'_>| {
        match rewrite_embed(caps, map) {
            Some(embed) => {
                count += 1;
                embed
            }
            None => caps[0].to_string(),
        }
    });
    (rewritten.into_owned(), count)
}

/// One manuscript file and how many embeds were rewritten in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenFile {
    pub path: PathBuf,
    pub replacements: usize,
}

#[derive(Debug, Default)]
pub struct RewriteReport {
    pub files: Vec<RewrittenFile>,
    pub warnings: Vec<Warning>,
}

impl RewriteReport {
    pub fn total_replacements(&self) -> usize {
        self.files.iter().map(|f| f.replacements).sum()
    }
}

/// Rewrite every manuscript in `dir` in place.
///
/// Each scanned file is written back even when nothing changed. Files that
/// can't be read or written become warnings.
pub fn rewrite_manuscripts(dir: &Path, map: &RenameMap) -> RewriteReport {
    let mut report = RewriteReport::default();

    let files = match collect_manuscripts(dir) {
        Ok(files) => files,
        Err(e) => {
            report
                .warnings
                .push(Warning::new(Stage::Rewrite, dir.display().to_string(), e));
            return report;
        }
    };

    for path in files {
        let subject = path.display().to_string();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                report.warnings.push(Warning::new(Stage::Rewrite, subject, e));
                continue;
            }
        };
        let (rewritten, replacements) = rewrite_references(&text, map);
        if let Err(e) = fs::write(&path, rewritten) {
            report.warnings.push(Warning::new(Stage::Rewrite, subject, e));
            continue;
        }
        report.files.push(RewrittenFile { path, replacements });
    }

    report
}
