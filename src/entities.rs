use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::GalleryError;
use crate::utils::path_utils::file_name;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => f.pad("image"),
            MediaKind::Video => f.pad("video"),
        }
    }
}

/// Identity of a media item. Image and video ids come from independent
/// sequences, so the kind is part of the key.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaKey {
    pub kind: MediaKind,
    pub id: i64,
}

impl Display for MediaKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MediaItem {
    pub id: i64,
    pub path: String,
    pub display_name: String,
    pub kind: MediaKind,
    pub size_bytes: i64,
    pub date_added: i64,
    pub duration_ms: i64,
    pub width: i32,
    pub height: i32,
}

impl MediaItem {
    pub fn key(&self) -> MediaKey {
        MediaKey { kind: self.kind, id: self.id }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Media sharing a containing folder. Never empty: the cover is the head of
/// `items`, which are kept freshest first.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Album {
    name: String,
    items: Vec<MediaItem>,
}

impl Album {
    /// Returns `None` for an empty item list. `items` must already be ordered.
    pub(crate) fn new(name: String, items: Vec<MediaItem>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { name, items })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cover_item(&self) -> Option<&MediaItem> {
        self.items.first()
    }
}

/// A raw record as returned by a media index. Every field is optional so that
/// incomplete records survive decoding and can be rejected one by one.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Row {
    pub id: Option<i64>,
    pub path: Option<String>,
    pub display_name: Option<String>,
    pub size_bytes: Option<i64>,
    pub date_added: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration_ms: Option<i64>,
}

impl Row {
    pub fn into_item(self, kind: MediaKind) -> Result<MediaItem, GalleryError> {
        let id = self.id.ok_or_else(|| malformed(kind, "missing id"))?;
        let path = self.path.ok_or_else(|| malformed(kind, "missing path"))?;
        if !path.starts_with('/') || path.ends_with('/') {
            return Err(malformed(kind, &format!("{} is not an absolute file path", path)));
        }
        let date_added = self.date_added.ok_or_else(|| malformed(kind, "missing date_added"))?;
        let size_bytes = self.size_bytes.unwrap_or(0);
        let width = self.width.unwrap_or(0);
        let height = self.height.unwrap_or(0);
        let duration_ms = match kind {
            MediaKind::Image => 0,
            MediaKind::Video => self.duration_ms.unwrap_or(0),
        };
        if date_added < 0 || size_bytes < 0 || width < 0 || height < 0 || duration_ms < 0 {
            return Err(malformed(kind, &format!("negative field in row {}", id)));
        }
        let display_name = self.display_name
            .filter(|x| !x.is_empty())
            .unwrap_or_else(|| file_name(&path).to_string());

        Ok(MediaItem { id, path, display_name, kind, size_bytes, date_added, duration_ms, width, height })
    }
}

fn malformed(kind: MediaKind, reason: &str) -> GalleryError {
    GalleryError::MalformedRow(format!("{} row: {}", kind, reason))
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Library,
    Albums,
}

impl TryFrom<i64> for Tab {
    type Error = GalleryError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Tab::Library),
            1 => Ok(Tab::Albums),
            _ => Err(GalleryError::InvalidTabSelection(value.to_string())),
        }
    }
}

impl FromStr for Tab {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "library" | "0" => Ok(Tab::Library),
            "albums" | "1" => Ok(Tab::Albums),
            _ => Err(GalleryError::InvalidTabSelection(s.to_string())),
        }
    }
}
