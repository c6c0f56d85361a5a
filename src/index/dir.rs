use std::path::{Path, PathBuf};
use std::time::SystemTime;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use walkdir::WalkDir;
use crate::entities::{MediaKind, Row};
use crate::error::GalleryError;
use crate::index::MediaIndex;
use crate::utils::hash_utils::MurMurHasher;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "bmp", "dng"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "mkv", "webm", "3gp", "avi"];

/// Media index built by walking a directory tree. Files are classified by
/// extension; ids are hashes of the absolute path and `date_added` is the
/// modification time. Dimensions and durations are not probed.
#[derive(Debug, Clone)]
pub struct DirectoryMediaIndex {
    root: PathBuf,
}

impl DirectoryMediaIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn scan(&self, kind: MediaKind) -> Result<Vec<Row>, GalleryError> {
        let root = std::fs::canonicalize(&self.root)
            .map_err(|e| GalleryError::IndexUnavailable(format!("{}: {}", self.root.display(), e)))?;
        if !root.is_dir() {
            return Err(GalleryError::IndexUnavailable(format!("{} is not a directory", root.display())));
        }

        let rows = WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| classify(e.path()) == Some(kind))
            .map(|e| file_row(e.path()))
            .collect::<Vec<Row>>();
        debug!("found {} {} files under {}", rows.len(), kind, root.display());
        Ok(rows)
    }
}

impl MediaIndex for DirectoryMediaIndex {
    fn list_images(&self) -> Result<Vec<Row>, GalleryError> {
        self.scan(MediaKind::Image)
    }

    fn list_videos(&self) -> Result<Vec<Row>, GalleryError> {
        self.scan(MediaKind::Video)
    }
}

fn classify(path: &Path) -> Option<MediaKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Non UTF-8 paths produce a row without a path, which is later dropped as
/// malformed.
fn file_row(path: &Path) -> Row {
    let path_str = path.to_str().map(|x| x.to_string());
    let metadata = std::fs::metadata(path).ok();
    let date_added = metadata.as_ref()
        .and_then(|m| m.modified().ok())
        .map(|t| epoch_seconds(path, t));
    Row {
        id: path_str.as_deref().map(MurMurHasher::hash_str_to_id),
        display_name: path.file_name().map(|x| x.to_string_lossy().to_string()),
        size_bytes: metadata.as_ref().map(|m| m.len() as i64),
        date_added,
        path: path_str,
        ..Default::default()
    }
}

/// Modification times before 1970 are clamped to the epoch.
fn epoch_seconds(path: &Path, time: SystemTime) -> i64 {
    let seconds = DateTime::<Utc>::from(time).timestamp();
    if seconds < 0 {
        warn!("{} was modified before 1970, using the epoch", path.display());
        return 0;
    }
    seconds
}
