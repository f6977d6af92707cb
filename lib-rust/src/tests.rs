use crate::{
    config::DecoderConfig,
    error::{Error, ErrorKind, Result},
    media::MediaFile,
    pipeline::{process_file, report_line, run_batch, BatchSummary, FileResult},
    recognizer::Recognizer,
    rename::{RenameMode, RenameOutcome, SkipReason},
};
use image::{GrayImage, RgbImage};
use std::fs;
use std::path::Path;

const BANNER: &str = "~~ noise ~~\n@ FOSA_01 73F 23C @ 06-09-2023 13:41:51\n";

/// Stands in for tesseract: replays canned outputs and remembers the size of
/// every image it was given.
struct ScriptedRecognizer {
    outputs: Vec<Result<String>>,
    seen: Vec<(u32, u32)>,
}

impl ScriptedRecognizer {
    fn always(text: &str) -> Self {
        Self {
            outputs: vec![Ok(text.to_string())],
            seen: vec![],
        }
    }

    fn sequence(outputs: Vec<Result<String>>) -> Self {
        Self {
            outputs,
            seen: vec![],
        }
    }
}

impl Recognizer for ScriptedRecognizer {
    fn recognize(&mut self, image: &GrayImage) -> Result<String> {
        self.seen.push(image.dimensions());
        if self.outputs.len() > 1 {
            self.outputs.remove(0)
        } else {
            match &self.outputs[0] {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::recognition(&e.message)),
            }
        }
    }
}

fn write_still(dir: &Path, name: &str, width: u32, height: u32) {
    RgbImage::new(width, height).save(dir.join(name)).unwrap();
}

fn collect(
    dir: &Path,
    config: &DecoderConfig,
    recognizer: &mut ScriptedRecognizer,
) -> Result<(BatchSummary, Vec<String>)> {
    let mut lines = vec![];
    let summary = run_batch(dir, config, recognizer, |result| {
        lines.push(report_line(result))
    })?;
    Ok((summary, lines))
}

#[test]
fn dry_run_reports_without_renaming() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "IMG_0001.jpg", 200, 100);
    fs::write(dir.path().join("notes.txt"), "not media")?;

    let mut recognizer = ScriptedRecognizer::always(BANNER);
    let (summary, lines) = collect(dir.path(), &DecoderConfig::default(), &mut recognizer)?;

    assert_eq!(summary.planned, 1);
    assert_eq!(summary.total(), 1);
    assert_eq!(
        lines,
        vec!["rename IMG_0001.jpg to 2023-06-09_134151_FOSA_01_IMG_0001.jpg"]
    );
    assert!(dir.path().join("IMG_0001.jpg").exists());
    Ok(())
}

#[test]
fn recognizer_sees_grayscale_bottom_strip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "IMG_0001.jpg", 200, 100);

    let mut recognizer = ScriptedRecognizer::always(BANNER);
    let media = MediaFile::from_path(dir.path().join("IMG_0001.jpg")).unwrap();
    process_file(&media, &DecoderConfig::default(), &mut recognizer)?;

    assert_eq!(recognizer.seen, vec![(200, 15)]);
    Ok(())
}

#[test]
fn oversized_still_is_downscaled_before_cropping() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "WIDE.jpg", 3000, 1000);

    let mut recognizer = ScriptedRecognizer::always(BANNER);
    let media = MediaFile::from_path(dir.path().join("WIDE.jpg")).unwrap();
    process_file(&media, &DecoderConfig::default(), &mut recognizer)?;

    // 1280 * 1000 / 3000 = 426 rows, 15% of which is 63
    assert_eq!(recognizer.seen, vec![(1280, 63)]);
    Ok(())
}

#[test]
fn execute_renames_then_second_run_skips() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "IMG_0001.jpg", 64, 64);

    let config = DecoderConfig::builder()
        .mode(RenameMode::Execute)
        .fallback_camera_id("TRAIL_7")
        .finish()?;

    let mut recognizer = ScriptedRecognizer::always("06-09-2023 13:41:51");
    let (summary, lines) = collect(dir.path(), &config, &mut recognizer)?;
    assert_eq!(summary.renamed, 1);
    assert_eq!(
        lines,
        vec!["IMG_0001.jpg renamed to 2023-06-09_134151_TRAIL_7_IMG_0001.jpg"]
    );
    assert!(!dir.path().join("IMG_0001.jpg").exists());
    assert!(dir
        .path()
        .join("2023-06-09_134151_TRAIL_7_IMG_0001.jpg")
        .exists());

    let (summary, lines) = collect(dir.path(), &config, &mut recognizer)?;
    assert_eq!(summary.already_renamed, 1);
    assert_eq!(
        lines,
        vec!["2023-06-09_134151_TRAIL_7_IMG_0001.jpg already renamed"]
    );
    Ok(())
}

#[test]
fn placeholder_camera_id_survives_a_second_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "IMG_0001.jpg", 64, 64);
    let config = DecoderConfig::builder()
        .mode(RenameMode::Execute)
        .finish()?;

    let mut recognizer = ScriptedRecognizer::always("06-09-2023 13:41:51");
    collect(dir.path(), &config, &mut recognizer)?;
    assert!(dir
        .path()
        .join("2023-06-09_134151_CAM-ID_IMG_0001.jpg")
        .exists());

    // three hyphens now, caught by the prefix check
    let (summary, _) = collect(dir.path(), &config, &mut recognizer)?;
    assert_eq!(summary.already_renamed, 1);
    assert_eq!(summary.renamed, 0);
    Ok(())
}

#[test]
fn no_banner_is_reported_not_failed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "IMG_0001.jpg", 64, 64);

    let mut recognizer = ScriptedRecognizer::always("nothing useful 13:41:51\n");
    let (summary, lines) = collect(dir.path(), &DecoderConfig::default(), &mut recognizer)?;

    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.failed, 0);
    assert!(lines[0].starts_with("Date and time not found in "));
    assert!(lines[0].ends_with("IMG_0001.jpg"));
    Ok(())
}

#[test]
fn per_file_failures_do_not_stop_the_batch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a_broken.jpg"), b"not a jpeg")?;
    write_still(dir.path(), "b_ocr_fails.jpg", 64, 64);
    write_still(dir.path(), "c_good.jpg", 64, 64);

    let mut recognizer = ScriptedRecognizer::sequence(vec![
        Err(Error::recognition("tesseract exited with 1")),
        Ok(BANNER.to_string()),
    ]);

    let mut results = vec![];
    let summary = run_batch(
        dir.path(),
        &DecoderConfig::default(),
        &mut recognizer,
        |result| {
            results.push(match result {
                FileResult::Done(report) => Ok(report.outcome.clone()),
                FileResult::Failed { error, .. } => Err(error.kind),
            })
        },
    )?;

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.planned, 1);
    assert_eq!(results[0], Err(ErrorKind::Decode));
    assert_eq!(results[1], Err(ErrorKind::Recognition));
    assert!(matches!(results[2], Ok(RenameOutcome::Planned(_))));
    Ok(())
}

#[test]
fn missing_directory_aborts_before_any_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut recognizer = ScriptedRecognizer::always(BANNER);
    let mut calls = 0;

    let err = run_batch(
        &dir.path().join("nope"),
        &DecoderConfig::default(),
        &mut recognizer,
        |_| calls += 1,
    )
    .unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(calls, 0);
    assert!(recognizer.seen.is_empty());
}

#[test]
fn debug_crop_is_written_for_stills_and_ignored_later() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "IMG_0001.jpg", 100, 100);
    let config = DecoderConfig::builder().write_debug_crops(true).finish()?;

    let mut recognizer = ScriptedRecognizer::always(BANNER);
    collect(dir.path(), &config, &mut recognizer)?;

    let crop = dir.path().join("IMG_0001.banner.png");
    assert!(crop.exists());
    assert_eq!(image::open(&crop)?.to_rgb8().dimensions(), (100, 15));

    // the crop is not media, so a second run still sees one file
    let (summary, _) = collect(dir.path(), &config, &mut recognizer)?;
    assert_eq!(summary.total(), 1);
    Ok(())
}

#[test]
fn hyphenated_names_count_as_already_renamed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_still(dir.path(), "site-a-cam.jpg", 64, 64);

    let config = DecoderConfig::builder()
        .mode(RenameMode::Execute)
        .finish()?;
    let mut recognizer = ScriptedRecognizer::always(BANNER);
    let (summary, _) = collect(dir.path(), &config, &mut recognizer)?;

    assert_eq!(summary.already_renamed, 1);
    assert!(dir.path().join("site-a-cam.jpg").exists());
    Ok(())
}

#[test]
fn skip_reasons_render_like_the_report() {
    assert_eq!(SkipReason::BannerNotFound.to_string(), "banner not found");
    assert_eq!(SkipReason::AlreadyRenamed.to_string(), "already renamed");
}
