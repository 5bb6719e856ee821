//! The five-stage build, end to end.
//!
//! ```text
//! 1. normalize   assets/ renamed to safe names        → RenameMap
//! 2. condition   orientation fixed, images compressed
//! 3. cover       cover-image resized, record updated  (compression only)
//! 4. rewrite     manuscript embeds follow the renames
//! 5. convert     converter packages the book
//! ```
//!
//! Stages run strictly in order on one thread. Only a missing asset directory
//! or an invalid config stops the run ([`BuildError`]); everything else is
//! collected as warnings in the [`BuildReport`], and a failed conversion is a
//! [`ConvertOutcome::Failed`], not an error. Nothing is rolled back.
//!
//! Progress is reported through a caller-supplied observer receiving
//! [`BuildEvent`]s as each stage finishes, so the CLI can print as it goes.

use crate::condition::{ConditionOptions, ConditionReport, condition_images};
use crate::config::{BuildConfig, ConfigError};
use crate::convert::{self, ConvertOutcome, Converter, ConverterCommand};
use crate::cover::{CoverOutcome, process_cover};
use crate::imaging::ImageBackend;
use crate::normalize::{NormalizeError, NormalizeReport, normalize_assets};
use crate::rewrite::{RewriteReport, rewrite_manuscripts};
use crate::types::{Stage, Warning};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Progress notifications, in pipeline order.
#[derive(Debug)]
pub enum BuildEvent<'a> {
    StageStarted(Stage),
    Normalized(&'a NormalizeReport),
    Conditioned(&'a ConditionReport),
    /// `None` when the cover stage was skipped because compression is off.
    Cover(Option<&'a CoverOutcome>),
    Rewritten(&'a RewriteReport),
    /// Emitted right before the converter runs.
    Converting(&'a ConverterCommand),
    Converted(&'a ConvertOutcome),
}

/// Everything a build did.
#[derive(Debug)]
pub struct BuildReport {
    pub normalize: NormalizeReport,
    pub condition: ConditionReport,
    /// `None` when compression (and so cover processing) was disabled.
    pub cover: Option<CoverOutcome>,
    pub rewrite: RewriteReport,
    pub command: Option<ConverterCommand>,
    pub convert: ConvertOutcome,
    /// Warnings from planning the converter invocation.
    pub convert_warnings: Vec<Warning>,
}

impl BuildReport {
    /// Every warning from every stage, in stage order.
    pub fn warnings(&self) -> Vec<&Warning> {
        let cover = match &self.cover {
            Some(CoverOutcome::Failed(w)) => Some(w),
            _ => None,
        };
        self.normalize
            .warnings
            .iter()
            .chain(&self.condition.warnings)
            .chain(cover)
            .chain(&self.rewrite.warnings)
            .chain(&self.convert_warnings)
            .collect()
    }

    pub fn succeeded(&self) -> bool {
        self.convert.is_success()
    }
}

/// Run all five stages against the project at `root`.
pub fn build(
    config: &BuildConfig,
    root: &Path,
    backend: &impl ImageBackend,
    converter: &impl Converter,
    mut observe: impl FnMut(BuildEvent<'_>),
) -> Result<BuildReport, BuildError> {
    config.validate()?;
    let paths = config.paths(root);

    // Stage 1
    observe(BuildEvent::StageStarted(Stage::Normalize));
    let normalize = normalize_assets(&paths.assets_dir)?;
    observe(BuildEvent::Normalized(&normalize));

    // Stage 2
    observe(BuildEvent::StageStarted(Stage::Condition));
    let options = ConditionOptions::from_images_config(&config.images);
    let condition = condition_images(backend, &normalize.asset_paths(&paths.assets_dir), &options);
    observe(BuildEvent::Conditioned(&condition));

    // Stage 3
    observe(BuildEvent::StageStarted(Stage::Cover));
    let cover = config
        .images
        .compress
        .then(|| process_cover(backend, &paths.metadata_file, &normalize.map, &config.cover));
    observe(BuildEvent::Cover(cover.as_ref()));

    // Stage 4
    observe(BuildEvent::StageStarted(Stage::Rewrite));
    let rewrite = rewrite_manuscripts(&paths.manuscript_dir, &normalize.map);
    observe(BuildEvent::Rewritten(&rewrite));

    // Stage 5
    observe(BuildEvent::StageStarted(Stage::Convert));
    let (command, convert, convert_warnings) = match convert::plan(&paths, &config.converter) {
        Ok((command, warnings)) => {
            observe(BuildEvent::Converting(&command));
            let outcome = match converter.run(&command) {
                Ok(()) => ConvertOutcome::Success {
                    output: command.output.clone(),
                },
                Err(e) => ConvertOutcome::Failed {
                    message: e.to_string(),
                },
            };
            (Some(command), outcome, warnings)
        }
        Err(e) => (
            None,
            ConvertOutcome::Failed {
                message: e.to_string(),
            },
            Vec::new(),
        ),
    };
    observe(BuildEvent::Converted(&convert));

    Ok(BuildReport {
        normalize,
        condition,
        cover,
        rewrite,
        command,
        convert,
        convert_warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tests::RecordingConverter;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{TestProject, assert_files};
    use std::fs;

    fn stages(events: &[String]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| e.strip_prefix("start:"))
            .collect()
    }

    fn event_name(event: &BuildEvent<'_>) -> String {
        match event {
            BuildEvent::StageStarted(stage) => format!("start:{stage}"),
            BuildEvent::Normalized(_) => "normalized".into(),
            BuildEvent::Conditioned(_) => "conditioned".into(),
            BuildEvent::Cover(_) => "cover".into(),
            BuildEvent::Rewritten(_) => "rewritten".into(),
            BuildEvent::Converting(_) => "converting".into(),
            BuildEvent::Converted(_) => "converted".into(),
        }
    }

    #[test]
    fn runs_stages_in_order() {
        let project = TestProject::new();
        fs::write(project.asset("photo (1).jpg"), b"stub").unwrap();
        project.chapter("01.md", "![c](../assets/photo (1).jpg)\n");
        let backend = MockBackend::new().with_image("photo1.jpg", 100, 100);
        let converter = RecordingConverter::new();

        let mut events = Vec::new();
        let report = build(&project.config, project.root(), &backend, &converter, |e| {
            events.push(event_name(&e))
        })
        .unwrap();

        assert_eq!(
            stages(&events),
            ["normalize", "condition", "cover", "rewrite", "convert"]
        );
        assert_eq!(events.last().map(String::as_str), Some("converted"));
        assert!(events.contains(&"converting".to_string()));
        assert!(report.succeeded());
        assert_eq!(project.read_chapter("01.md"), "![](../assets/photo1.jpg)\n");
        assert_eq!(converter.get_commands().len(), 1);
    }

    #[test]
    fn missing_assets_dir_is_fatal_and_touches_nothing() {
        let project = TestProject::new();
        fs::remove_dir(project.paths().assets_dir).unwrap();
        project.chapter("01.md", "![c](../assets/a b.jpg)\n");
        let converter = RecordingConverter::new();

        let result = build(
            &project.config,
            project.root(),
            &MockBackend::new(),
            &converter,
            |_| {},
        );

        assert!(matches!(
            result,
            Err(BuildError::Normalize(NormalizeError::AssetsDirMissing(_)))
        ));
        assert_eq!(project.read_chapter("01.md"), "![c](../assets/a b.jpg)\n");
        assert!(converter.get_commands().is_empty());
        assert!(!project.paths().output_file.parent().unwrap().exists());
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut project = TestProject::new();
        project.config.images.jpeg_quality = 0;

        let result = build(
            &project.config,
            project.root(),
            &MockBackend::new(),
            &RecordingConverter::new(),
            |_| {},
        );
        assert!(matches!(result, Err(BuildError::Config(_))));
    }

    #[test]
    fn compression_off_skips_cover_and_recompress() {
        let mut project = TestProject::new();
        project.config.images.compress = false;
        fs::write(project.asset("cover.png"), b"stub").unwrap();
        project.metadata("cover-image: assets/cover.png\n");
        project.chapter("01.md", "text\n");
        let backend = MockBackend::new().with_image("cover.png", 3000, 3000);

        let report = build(
            &project.config,
            project.root(),
            &backend,
            &RecordingConverter::new(),
            |_| {},
        )
        .unwrap();

        assert_eq!(report.cover, None);
        assert!(
            backend
                .get_operations()
                .iter()
                .all(|op| matches!(op, RecordedOp::FixOrientation { .. }))
        );
        assert_files(&project.paths().assets_dir, &["cover.png"]);
    }

    #[test]
    fn cover_runs_with_compression() {
        let project = TestProject::new();
        fs::write(project.asset("cover.png"), b"stub").unwrap();
        project.metadata("cover-image: assets/cover.png\n");
        project.chapter("01.md", "text\n");
        let backend = MockBackend::new().with_image("cover.png", 1000, 4000);
        let converter = RecordingConverter::new();

        let report = build(&project.config, project.root(), &backend, &converter, |_| {})
            .unwrap();

        assert!(matches!(
            report.cover,
            Some(CoverOutcome::Created { width: 640, height: 2560, .. })
        ));
        let command = &converter.get_commands()[0];
        assert_eq!(
            command.metadata_file.as_ref(),
            Some(&project.paths().metadata_file)
        );
    }

    #[test]
    fn converter_failure_is_an_outcome_not_an_error() {
        let project = TestProject::new();
        project.chapter("01.md", "text\n");

        let report = build(
            &project.config,
            project.root(),
            &MockBackend::new(),
            &RecordingConverter::missing(),
            |_| {},
        )
        .unwrap();

        assert!(!report.succeeded());
        assert!(matches!(
            &report.convert,
            ConvertOutcome::Failed { message } if message.contains("not found")
        ));
    }

    #[test]
    fn no_manuscripts_fails_conversion_without_running() {
        let project = TestProject::new();
        let converter = RecordingConverter::new();
        let mut events = Vec::new();

        let report = build(
            &project.config,
            project.root(),
            &MockBackend::new(),
            &converter,
            |e| events.push(event_name(&e)),
        )
        .unwrap();

        assert_eq!(report.command, None);
        assert!(!report.succeeded());
        assert!(!events.contains(&"converting".to_string()));
        assert!(converter.get_commands().is_empty());
    }

    #[test]
    fn warnings_collected_across_stages() {
        let project = TestProject::new();
        fs::write(project.asset("bad.jpg"), b"stub").unwrap();
        project.chapter("01.md", "text\n");
        let backend = MockBackend::new().failing_on("bad.jpg");

        let report = build(
            &project.config,
            project.root(),
            &backend,
            &RecordingConverter::new(),
            |_| {},
        )
        .unwrap();

        let stages: Vec<Stage> = report.warnings().iter().map(|w| w.stage).collect();
        // Orientation + compression for bad.jpg, then the missing metadata file
        assert_eq!(stages, [Stage::Condition, Stage::Condition, Stage::Convert]);
        assert!(report.succeeded());
    }
}
