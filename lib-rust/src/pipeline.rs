use crate::banner::{self, BannerRecord};
use crate::config::DecoderConfig;
use crate::error::{Error, Result};
use crate::media::{discover, MediaFile, MediaKind};
use crate::recognizer::Recognizer;
use crate::region::{debug_crop_path, extract_region};
use crate::rename::{plan_and_apply, RenameOutcome, SkipReason};
use crate::sampler::sample;
use std::path::Path;

/// Printed between the report lines of consecutive files.
pub const SEPARATOR: &str = "------------------------------";

/// What happened to one file that made it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub media: MediaFile,
    /// `None` when no banner was found.
    pub record: Option<BannerRecord>,
    pub outcome: RenameOutcome,
}

#[derive(Debug)]
pub enum FileResult {
    Done(FileReport),
    Failed { media: MediaFile, error: Error },
}

/// Per-outcome counts for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub planned: usize,
    pub renamed: usize,
    pub not_found: usize,
    pub already_renamed: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.planned + self.renamed + self.not_found + self.already_renamed + self.failed
    }

    fn count(&mut self, result: &FileResult) {
        match result {
            FileResult::Done(report) => match report.outcome {
                RenameOutcome::Planned(_) => self.planned += 1,
                RenameOutcome::Renamed(_) => self.renamed += 1,
                RenameOutcome::Skipped(SkipReason::BannerNotFound) => self.not_found += 1,
                RenameOutcome::Skipped(SkipReason::AlreadyRenamed) => self.already_renamed += 1,
            },
            FileResult::Failed { .. } => self.failed += 1,
        }
    }
}

/// Frame sampling, banner crop, recognition, parsing and renaming for one
/// file.
pub fn process_file<R>(
    media: &MediaFile,
    config: &DecoderConfig,
    recognizer: &mut R,
) -> Result<FileReport>
where
    R: Recognizer + ?Sized,
{
    let frame = sample(media, config)?;

    let debug_path = match media.kind {
        MediaKind::Still if config.write_debug_crops => Some(debug_crop_path(&media.path)),
        _ => None,
    };
    let banner_image = extract_region(&frame, config, debug_path.as_deref())?;
    drop(frame);

    let text = recognizer.recognize(&banner_image)?;
    let parsed = banner::parse(Some(&text));

    let outcome = plan_and_apply(
        &media.path,
        &parsed,
        config.fallback_camera_id(),
        config.mode,
    )?;

    Ok(FileReport {
        media: media.clone(),
        record: parsed.into_record(),
        outcome,
    })
}

/// Processes every supported file in `dir`, in path order, one at a time.
///
/// `on_result` is called once per file as soon as it is done. A failure on
/// one file is reported and the batch moves on; only setup errors (such as a
/// missing directory) end the run early.
pub fn run_batch<R, F>(
    dir: &Path,
    config: &DecoderConfig,
    recognizer: &mut R,
    mut on_result: F,
) -> Result<BatchSummary>
where
    R: Recognizer + ?Sized,
    F: FnMut(&FileResult),
{
    log::debug!("[batch] input_dir={}", dir.display());
    let files = discover(dir)?;
    log::info!("[batch] {} media file(s) in {}", files.len(), dir.display());

    let mut summary = BatchSummary::default();
    for media in files {
        log::debug!("[batch] file_path={}", media.path.display());

        let result = match process_file(&media, config, recognizer) {
            Ok(report) => FileResult::Done(report),
            Err(error) => {
                log::warn!("[batch] {}: {}", media.path.display(), error);
                FileResult::Failed { media, error }
            }
        };

        summary.count(&result);
        on_result(&result);

        if let FileResult::Failed { error, .. } = result {
            if error.is_fatal() {
                return Err(error);
            }
        }
    }

    log::info!(
        "[batch] done: {} planned, {} renamed, {} not found, {} already renamed, {} failed",
        summary.planned,
        summary.renamed,
        summary.not_found,
        summary.already_renamed,
        summary.failed
    );
    Ok(summary)
}

/// The single line printed for a file.
pub fn report_line(result: &FileResult) -> String {
    match result {
        FileResult::Done(report) => {
            let name = report.media.file_name();
            match &report.outcome {
                RenameOutcome::Skipped(SkipReason::BannerNotFound) => {
                    format!("Date and time not found in {}", report.media.path.display())
                }
                RenameOutcome::Skipped(SkipReason::AlreadyRenamed) => {
                    format!("{} already renamed", name)
                }
                RenameOutcome::Planned(plan) => {
                    format!("rename {} to {}", name, display_name(&plan.target_path))
                }
                RenameOutcome::Renamed(plan) => {
                    format!("{} renamed to {}", name, display_name(&plan.target_path))
                }
            }
        }
        FileResult::Failed { media, error } => {
            format!("error processing {}: {}", media.path.display(), error)
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
