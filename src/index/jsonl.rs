use std::path::{Path, PathBuf};
use log::{debug, warn};
use crate::entities::{MediaKind, Row};
use crate::error::GalleryError;
use crate::index::MediaIndex;

const IMAGES_FILE: &str = "images.jsonl";
const VIDEOS_FILE: &str = "videos.jsonl";

/// Media index exported as two JSON-lines files, `images.jsonl` and
/// `videos.jsonl`, one `Row` per line. A line that does not decode is kept as
/// an empty row so the aggregator rejects and counts it like any other
/// malformed record.
#[derive(Debug, Clone)]
pub struct JsonlMediaIndex {
    dir: PathBuf,
}

impl JsonlMediaIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn images_path(&self) -> PathBuf {
        self.dir.join(IMAGES_FILE)
    }

    pub fn videos_path(&self) -> PathBuf {
        self.dir.join(VIDEOS_FILE)
    }

    fn read_rows(path: &Path, kind: MediaKind) -> Result<Vec<Row>, GalleryError> {
        let file_str = std::fs::read_to_string(path)
            .map_err(|e| GalleryError::IndexUnavailable(format!("{}: {}", path.display(), e)))?;
        let mut rows = Vec::new();
        for (line_no, line) in file_str.split('\n').enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Row>(line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("undecodable {} row at {}:{}: {}", kind, path.display(), line_no + 1, e);
                    rows.push(Row::default());
                }
            }
        }
        debug!("read {} {} rows from {}", rows.len(), kind, path.display());
        Ok(rows)
    }
}

impl MediaIndex for JsonlMediaIndex {
    fn list_images(&self) -> Result<Vec<Row>, GalleryError> {
        Self::read_rows(&self.images_path(), MediaKind::Image)
    }

    fn list_videos(&self) -> Result<Vec<Row>, GalleryError> {
        Self::read_rows(&self.videos_path(), MediaKind::Video)
    }
}
