//! Shared types used across all pipeline stages.

use std::collections::BTreeMap;
use std::fmt;

/// Original asset filename → sanitized filename, for one run.
///
/// Every processed image has an entry, including ones whose name was already
/// safe, so the reference rewriter sees the complete picture.
pub type RenameMap = BTreeMap<String, String>;

/// Pipeline stage, used to label progress and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Condition,
    Cover,
    Rewrite,
    Convert,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Condition => "condition",
            Stage::Cover => "cover",
            Stage::Rewrite => "rewrite",
            Stage::Convert => "convert",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A soft failure: something went wrong with one item, the run carried on.
///
/// Stages collect these instead of aborting so one bad image can't stop the
/// rest of the book from being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub stage: Stage,
    /// File or field the warning is about.
    pub subject: String,
    pub message: String,
}

impl Warning {
    pub fn new(stage: Stage, subject: impl Into<String>, message: impl ToString) -> Self {
        Self {
            stage,
            subject: subject.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.subject, self.message)
    }
}
