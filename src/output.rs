//! CLI output formatting for all pipeline stages.
//!
//! # Output Format
//!
//! ```text
//! ==> Stage 1: Normalizing assets
//! 001 diagram.png
//! 002 photo (1).jpg → photo1.jpg
//! Renamed 1 of 2 images
//! ==> Stage 2: Conditioning images
//! 001 diagram.png
//!     Re-encoded: 800x600
//! 002 photo1.jpg
//!     Rotated: 90°
//!     Resized: 3200x2400 → 1600x1200
//! Rotated 1, resized 1 of 2 images
//! ==> Stage 3: Processing cover
//! Cover: assets/cover.png → assets/cover.jpg (1600x2560)
//! ==> Stage 4: Rewriting references
//! 01-intro.md: 2 references updated
//! 02-road.md: unchanged
//! ==> Stage 5: Converting
//! pandoc manuscript/01-intro.md ... -o output/output.epub ...
//! ✅ EPUB generated: output/output.epub
//! ```
//!
//! Warnings are not part of the stage output; they are listed once at the end
//! on stderr.
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and the CLI prints the lines. Format functions are pure: no I/O, no side
//! effects.

use crate::condition::{ConditionReport, ConditionedImage};
use crate::convert::ConvertOutcome;
use crate::cover::CoverOutcome;
use crate::normalize::{NormalizeReport, RenameEntry};
use crate::pipeline::BuildEvent;
use crate::rewrite::RewriteReport;
use crate::types::{Stage, Warning};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn dims((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// `==> Stage N: ...` header for a stage.
pub fn stage_header(stage: Stage) -> String {
    let (n, title) = match stage {
        Stage::Normalize => (1, "Normalizing assets"),
        Stage::Condition => (2, "Conditioning images"),
        Stage::Cover => (3, "Processing cover"),
        Stage::Rewrite => (4, "Rewriting references"),
        Stage::Convert => (5, "Converting"),
    };
    format!("==> Stage {n}: {title}")
}

// ============================================================================
// Stage 1: Normalize
// ============================================================================

/// One line per image: the name, and its new name when it moves.
pub fn format_rename_plan(entries: &[RenameEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            if e.moves() {
                format!("{} {} \u{2192} {}", format_index(i + 1), e.original, e.renamed)
            } else {
                format!("{} {}", format_index(i + 1), e.original)
            }
        })
        .collect()
}

pub fn format_normalize_output(report: &NormalizeReport) -> Vec<String> {
    let mut lines = format_rename_plan(&report.entries);
    lines.push(format!(
        "Renamed {} of {}",
        report.moved_count(),
        plural(report.entries.len(), "image")
    ));
    lines
}

// ============================================================================
// Stage 2: Condition
// ============================================================================

fn conditioned_lines(index: usize, image: &ConditionedImage) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), image.name)];
    if let Some(rotation) = image.rotation {
        lines.push(format!("    Rotated: {}\u{b0}", rotation.degrees()));
    }
    if let Some(c) = image.compression {
        if c.resized() {
            lines.push(format!(
                "    Resized: {} \u{2192} {}",
                dims(c.before),
                dims(c.after)
            ));
        } else {
            lines.push(format!("    Re-encoded: {}", dims(c.after)));
        }
    }
    lines
}

pub fn format_condition_output(report: &ConditionReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .images
        .iter()
        .enumerate()
        .flat_map(|(i, image)| conditioned_lines(i + 1, image))
        .collect();
    lines.push(format!(
        "Rotated {}, resized {} of {}",
        report.rotated_count(),
        report.resized_count(),
        plural(report.images.len(), "image")
    ));
    lines
}

// ============================================================================
// Stage 3: Cover
// ============================================================================

/// `None` means the stage was skipped because compression is off.
pub fn format_cover_output(outcome: Option<&CoverOutcome>) -> Vec<String> {
    let line = match outcome {
        None => "Skipped (compression disabled)".to_string(),
        Some(CoverOutcome::NoMetadata) => "Skipped (no metadata file)".to_string(),
        Some(CoverOutcome::NoCoverField) => "No cover-image in metadata".to_string(),
        Some(CoverOutcome::Created {
            source,
            width,
            height,
            field,
            ..
        }) => format!(
            "Cover: {} \u{2192} {} ({})",
            source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            field,
            dims((*width, *height))
        ),
        Some(CoverOutcome::Failed(_)) => "Cover not processed".to_string(),
    };
    vec![line]
}

// ============================================================================
// Stage 4: Rewrite
// ============================================================================

pub fn format_rewrite_output(report: &RewriteReport) -> Vec<String> {
    if report.files.is_empty() {
        return vec!["No manuscript files".to_string()];
    }
    report
        .files
        .iter()
        .map(|f| {
            let name = f
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| f.path.display().to_string());
            match f.replacements {
                0 => format!("{name}: unchanged"),
                n => format!("{name}: {} updated", plural(n, "reference")),
            }
        })
        .collect()
}

// ============================================================================
// Stage 5: Convert
// ============================================================================

/// The final success or failure banner.
pub fn format_convert_output(outcome: &ConvertOutcome) -> Vec<String> {
    match outcome {
        ConvertOutcome::Success { output } => {
            vec![format!("\u{2705} EPUB generated: {}", output.display())]
        }
        ConvertOutcome::Failed { message } => vec![
            "\u{274c} EPUB generation failed".to_string(),
            format!("    {message}"),
        ],
    }
}

// ============================================================================
// Events and warnings
// ============================================================================

/// Format one pipeline progress event as display lines.
pub fn format_build_event(event: &BuildEvent<'_>) -> Vec<String> {
    match event {
        BuildEvent::StageStarted(stage) => vec![stage_header(*stage)],
        BuildEvent::Normalized(report) => format_normalize_output(report),
        BuildEvent::Conditioned(report) => format_condition_output(report),
        BuildEvent::Cover(outcome) => format_cover_output(*outcome),
        BuildEvent::Rewritten(report) => format_rewrite_output(report),
        BuildEvent::Converting(command) => vec![command.display()],
        BuildEvent::Converted(outcome) => format_convert_output(outcome),
    }
}

// ============================================================================
// Check
// ============================================================================

/// Closing line of `bindery check`.
///
/// The project only counts as valid when a build would produce a book: with no
/// manuscripts the converter is never run. A missing metadata file still
/// builds, so it is reported as a warning alongside.
pub fn format_check_summary(manuscripts: usize, has_metadata: bool) -> Vec<String> {
    let mut problems = Vec::new();
    if manuscripts == 0 {
        problems.push("no manuscript files (*.md), build would not produce an EPUB");
    }
    if !has_metadata {
        problems.push("no metadata file, the book would have no title or cover");
    }
    if problems.is_empty() {
        return vec!["==> Project is valid".to_string()];
    }

    let mut lines = vec![format!(
        "==> Project has {}",
        plural(problems.len(), "warning")
    )];
    lines.extend(problems.iter().map(|p| format!("    warning: {p}")));
    lines
}

pub fn format_warnings(warnings: &[&Warning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Warnings ({})", warnings.len())];
    lines.extend(warnings.iter().map(|w| format!("    {w}")));
    lines
}
