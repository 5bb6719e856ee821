//! Converter invocation: stage 5 of the bindery pipeline.
//!
//! Builds the command line for the external converter (pandoc by default) and
//! runs it:
//!
//! ```text
//! pandoc manuscript/01.md manuscript/02.md \
//!     -o output/output.epub \
//!     --resource-path assets \
//!     [--metadata-file metadata.yaml] \
//!     [extra_args...]
//! ```
//!
//! The converter runs with the project root as its working directory and every
//! path is absolute, so relative references inside the manuscripts and the
//! metadata resolve the same way no matter where bindery was started.
//!
//! Planning and running are split so the command can be inspected (and tested)
//! without a converter installed. Running goes through the [`Converter`] trait;
//! [`PandocConverter`] is the subprocess implementation.

use crate::config::{ConverterConfig, ProjectPaths};
use crate::types::{Stage, Warning};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to list manuscripts: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No manuscript files (*.md) in {}", .0.display())]
    NoManuscripts(PathBuf),
    #[error("Converter '{program}' not found: {source}")]
    NotFound {
        program: String,
        source: which::Error,
    },
    #[error("Converter exited unsuccessfully ({status})")]
    Failed { status: ExitStatus },
}

/// Every `*.md` file directly inside `dir`, sorted by filename.
///
/// A missing directory has no manuscripts.
pub fn collect_manuscripts(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// A fully resolved converter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterCommand {
    pub program: String,
    /// Directory the converter runs in: the project root.
    pub working_dir: PathBuf,
    /// Manuscript files, in binding order.
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub resource_path: PathBuf,
    /// `None` when the metadata file doesn't exist.
    pub metadata_file: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

impl ConverterCommand {
    /// Arguments passed to the program, in order.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.inputs.iter().map(|p| p.into()).collect();
        args.push("-o".into());
        args.push(self.output.clone().into());
        args.push("--resource-path".into());
        args.push(self.resource_path.clone().into());
        if let Some(metadata) = &self.metadata_file {
            args.push("--metadata-file".into());
            args.push(metadata.clone().into());
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    /// Shell-like rendering for progress output.
    pub fn display(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(
                self.args()
                    .iter()
                    .map(|a| a.to_string_lossy().into_owned()),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Prepare the converter invocation for a project.
///
/// Creates the output directory. All paths in the command are made absolute.
/// A missing metadata file is not an error: the
/// command is built without `--metadata-file` and a warning is returned.
pub fn plan(
    paths: &ProjectPaths,
    config: &ConverterConfig,
) -> Result<(ConverterCommand, Vec<Warning>), ConvertError> {
    if let Some(parent) = paths.output_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let inputs = collect_manuscripts(&paths.manuscript_dir)?;
    if inputs.is_empty() {
        return Err(ConvertError::NoManuscripts(paths.manuscript_dir.clone()));
    }
    let inputs = inputs
        .iter()
        .map(std::path::absolute)
        .collect::<Result<Vec<_>, _>>()?;

    let mut warnings = Vec::new();
    let metadata_file = if paths.metadata_file.is_file() {
        Some(std::path::absolute(&paths.metadata_file)?)
    } else {
        warnings.push(Warning::new(
            Stage::Convert,
            paths.metadata_file.display().to_string(),
            "metadata file not found, the book will have no cover or title information",
        ));
        None
    };

    let command = ConverterCommand {
        program: config.program.clone(),
        working_dir: std::path::absolute(&paths.root)?,
        inputs,
        output: std::path::absolute(&paths.output_file)?,
        resource_path: std::path::absolute(&paths.assets_dir)?,
        metadata_file,
        extra_args: config.extra_args.clone(),
    };
    Ok((command, warnings))
}

/// Something that can turn a [`ConverterCommand`] into a book.
pub trait Converter {
    fn run(&self, command: &ConverterCommand) -> Result<(), ConvertError>;
}

/// Runs the converter as a blocking subprocess.
///
/// The program is looked up on `PATH` (or used directly when it is a path) and
/// started in [`ConverterCommand::working_dir`]. Its stdout and stderr go
/// straight to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PandocConverter;

impl Converter for PandocConverter {
    fn run(&self, command: &ConverterCommand) -> Result<(), ConvertError> {
        let program = which::which(&command.program).map_err(|source| ConvertError::NotFound {
            program: command.program.clone(),
            source,
        })?;
        let status = Command::new(program)
            .args(command.args())
            .current_dir(&command.working_dir)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(ConvertError::Failed { status })
        }
    }
}

/// How stage 5 ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    Success { output: PathBuf },
    Failed { message: String },
}

impl ConvertOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConvertOutcome::Success { .. })
    }
}
