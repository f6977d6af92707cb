use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions (lowercase, without the dot) that are picked up from the input
/// directory.
pub const VIDEO_EXTENSIONS: [&str; 2] = ["avi", "mp4"];
pub const STILL_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Still,
    Video,
}

/// An input file and how it should be sampled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaKind {
    /// Classify by extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if STILL_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Still)
        } else {
            None
        }
    }
}

impl MediaFile {
    /// Returns `None` when the extension is not one we know how to decode.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = MediaKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    /// Base name of the file, including its extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Lists the supported media files directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into. A missing or unreadable directory
/// is a setup error, since nothing can be processed.
pub fn discover(dir: &Path) -> Result<Vec<MediaFile>> {
    if !dir.is_dir() {
        return Err(Error::setup(format!(
            "Directory {} not found",
            dir.display()
        )));
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| Error::setup(format!("cannot read {}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(media) = MediaFile::from_path(path) {
            files.push(media);
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
