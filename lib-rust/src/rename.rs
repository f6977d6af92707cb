use crate::banner::{BannerParse, BannerRecord};
use crate::error::{Error, Result};
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Camera id used when the banner has none and no fallback was supplied.
pub const PLACEHOLDER_CAMERA_ID: &str = "CAM-ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameMode {
    /// Report the target name without touching the filesystem.
    #[default]
    DryRun,
    /// Actually rename.
    Execute,
}

/// Where a file would go, computed from its banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    /// The current name already looks like one we generated.
    pub already_processed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BannerNotFound,
    AlreadyRenamed,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::BannerNotFound => write!(f, "banner not found"),
            SkipReason::AlreadyRenamed => write!(f, "already renamed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Skipped(SkipReason),
    /// Dry run: the rename that would happen.
    Planned(RenamePlan),
    /// The file now lives at `target_path`.
    Renamed(RenamePlan),
}

lazy_static! {
    /// `YYYY-MM-DD_HHMMSS_` at the start of a name.
    static ref REGEX_GENERATED_PREFIX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{6}_").unwrap();
}

/// The historical idempotency heuristic: exactly two hyphens in the base
/// name. Camera ids or original names with hyphens throw the count off.
pub fn has_two_hyphens(file_name: &str) -> bool {
    file_name.matches('-').count() == 2
}

/// Whether the name starts with the prefix [`target_file_name`] generates.
pub fn has_generated_prefix(file_name: &str) -> bool {
    REGEX_GENERATED_PREFIX.is_match(file_name)
}

/// A file counts as already processed if either check matches.
pub fn is_already_processed(file_name: &str) -> bool {
    has_two_hyphens(file_name) || has_generated_prefix(file_name)
}

/// Banner id, then the caller's fallback, then [`PLACEHOLDER_CAMERA_ID`].
/// Empty strings count as absent at every step.
pub fn resolve_camera_id<'a>(record: &'a BannerRecord, fallback: Option<&'a str>) -> &'a str {
    record
        .camera_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or_else(|| fallback.filter(|id| !id.is_empty()))
        .unwrap_or(PLACEHOLDER_CAMERA_ID)
}

/// `{date}_{time}_{camera_id}_{original}`; the original name, extension
/// included, is kept as a suffix.
pub fn target_file_name(record: &BannerRecord, camera_id: &str, original: &str) -> String {
    format!("{}_{}_{}_{}", record.date, record.time, camera_id, original)
}

/// Computes the rename for `original`, or `None` when there is no banner.
pub fn plan(original: &Path, parsed: &BannerParse, fallback: Option<&str>) -> Option<RenamePlan> {
    let record = parsed.record()?;
    let original_name = original
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let camera_id = resolve_camera_id(record, fallback);
    let target_name = target_file_name(record, camera_id, &original_name);

    Some(RenamePlan {
        original_path: original.to_path_buf(),
        target_path: original.with_file_name(target_name),
        already_processed: is_already_processed(&original_name),
    })
}

/// Carries out a plan.
///
/// An already-processed file is skipped in either mode. In execute mode an
/// occupied target is a [`crate::error::ErrorKind::RenameCollision`]; nothing
/// is ever overwritten.
pub fn apply(plan: RenamePlan, mode: RenameMode) -> Result<RenameOutcome> {
    if plan.already_processed {
        log::debug!(
            "[rename] {} looks already renamed",
            plan.original_path.display()
        );
        return Ok(RenameOutcome::Skipped(SkipReason::AlreadyRenamed));
    }

    match mode {
        RenameMode::DryRun => Ok(RenameOutcome::Planned(plan)),
        RenameMode::Execute => {
            if plan.target_path.exists() {
                return Err(Error::rename_collision(format!(
                    "{} already exists",
                    plan.target_path.display()
                )));
            }
            fs::rename(&plan.original_path, &plan.target_path).map_err(|e| {
                Error::from(e).context(format!(
                    "cannot rename {} to {}",
                    plan.original_path.display(),
                    plan.target_path.display()
                ))
            })?;
            log::debug!(
                "[rename] {} -> {}",
                plan.original_path.display(),
                plan.target_path.display()
            );
            Ok(RenameOutcome::Renamed(plan))
        }
    }
}

/// [`plan`] followed by [`apply`]; no banner becomes a skip.
pub fn plan_and_apply(
    original: &Path,
    parsed: &BannerParse,
    fallback: Option<&str>,
    mode: RenameMode,
) -> Result<RenameOutcome> {
    match plan(original, parsed, fallback) {
        Some(plan) => apply(plan, mode),
        None => Ok(RenameOutcome::Skipped(SkipReason::BannerNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn record(camera_id: Option<&str>) -> BannerRecord {
        BannerRecord {
            raw_text: String::new(),
            camera_id: camera_id.map(str::to_string),
            date: "2023-06-09".into(),
            time: "134151".into(),
            temperature_celsius: None,
            temperature_fahrenheit: None,
        }
    }

    #[test]
    fn target_is_prefix_on_original_name() {
        let parsed = BannerParse::Record(record(Some("FOSA_01")));
        let plan = plan(Path::new("/traps/IMG_0042.JPG"), &parsed, None).unwrap();
        assert_eq!(
            plan.target_path,
            PathBuf::from("/traps/2023-06-09_134151_FOSA_01_IMG_0042.JPG")
        );
        assert!(!plan.already_processed);
    }

    #[test]
    fn camera_id_resolution_order() {
        assert_eq!(resolve_camera_id(&record(Some("A")), Some("B")), "A");
        assert_eq!(resolve_camera_id(&record(None), Some("B")), "B");
        assert_eq!(resolve_camera_id(&record(None), None), "CAM-ID");
        assert_eq!(resolve_camera_id(&record(None), Some("")), "CAM-ID");
    }

    #[test]
    fn two_hyphens_means_processed() {
        assert!(is_already_processed("a-b-c.jpg"));
        assert!(is_already_processed("2023-06-09_134151_FOSA_01_IMG.JPG"));
        assert!(!is_already_processed("IMG_0042.JPG"));
        assert!(!is_already_processed("one-hyphen.jpg"));
    }

    #[test]
    fn generated_prefix_catches_hyphenated_camera_ids() {
        let name = "2023-06-09_134151_CAM-ID_IMG_0042.JPG";
        assert!(!has_two_hyphens(name));
        assert!(has_generated_prefix(name));
        assert!(is_already_processed(name));
    }

    #[test]
    fn no_banner_is_skipped() {
        let outcome = plan_and_apply(
            Path::new("IMG.JPG"),
            &BannerParse::NoBanner,
            None,
            RenameMode::Execute,
        )
        .unwrap();
        assert_eq!(outcome, RenameOutcome::Skipped(SkipReason::BannerNotFound));
    }

    #[test]
    fn already_processed_skips_in_both_modes() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("x-y-z.jpg");
        fs::write(&original, b"").unwrap();
        let parsed = BannerParse::Record(record(Some("CAM")));

        for mode in [RenameMode::DryRun, RenameMode::Execute] {
            let outcome = plan_and_apply(&original, &parsed, None, mode).unwrap();
            assert_eq!(outcome, RenameOutcome::Skipped(SkipReason::AlreadyRenamed));
        }
        assert!(original.exists());
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("IMG_0001.JPG");
        fs::write(&original, b"jpeg").unwrap();
        let parsed = BannerParse::Record(record(None));

        let outcome = plan_and_apply(&original, &parsed, None, RenameMode::DryRun).unwrap();
        match outcome {
            RenameOutcome::Planned(plan) => {
                assert!(!plan.target_path.exists());
                assert_eq!(
                    plan.target_path.file_name().unwrap(),
                    "2023-06-09_134151_CAM-ID_IMG_0001.JPG"
                );
            }
            other => panic!("expected a planned rename, got {:?}", other),
        }
        assert!(original.exists());
    }

    #[test]
    fn execute_renames_once() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("IMG_0001.JPG");
        fs::write(&original, b"jpeg").unwrap();
        let parsed = BannerParse::Record(record(Some("FOSA_01")));

        let outcome = plan_and_apply(&original, &parsed, None, RenameMode::Execute).unwrap();
        let target = dir.path().join("2023-06-09_134151_FOSA_01_IMG_0001.JPG");
        assert!(matches!(outcome, RenameOutcome::Renamed(ref plan) if plan.target_path == target));
        assert!(!original.exists());
        assert_eq!(fs::read(&target).unwrap(), b"jpeg");
    }

    #[test]
    fn collision_is_rejected_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("IMG_0001.JPG");
        let target = dir.path().join("2023-06-09_134151_FOSA_01_IMG_0001.JPG");
        fs::write(&original, b"new").unwrap();
        fs::write(&target, b"old").unwrap();
        let parsed = BannerParse::Record(record(Some("FOSA_01")));

        let err = plan_and_apply(&original, &parsed, None, RenameMode::Execute).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RenameCollision);
        assert_eq!(fs::read(&original).unwrap(), b"new");
        assert_eq!(fs::read(&target).unwrap(), b"old");
    }
}
