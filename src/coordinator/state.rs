use std::sync::Arc;
use crate::entities::{Album, MediaItem, MediaKey, Tab};
use crate::error::GalleryError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Snapshot published by the coordinator. Snapshots are never mutated once
/// published; every change swaps in a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryState {
    pub items: Arc<[MediaItem]>,
    pub albums: Arc<[Album]>,
    pub is_loading: bool,
    pub selected_tab: Tab,
    pub status: LoadStatus,
    pub last_error: Option<GalleryError>,
    /// Token of the most recently requested load.
    pub generation: u64,
    /// Rows dropped by the last successful load.
    pub skipped_rows: usize,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            albums: Arc::from(Vec::new()),
            is_loading: true,
            selected_tab: Tab::Library,
            status: LoadStatus::Idle,
            last_error: None,
            generation: 0,
            skipped_rows: 0,
        }
    }
}

impl LibraryState {
    pub fn find(&self, key: MediaKey) -> Option<&MediaItem> {
        self.items.iter().find(|x| x.key() == key)
    }

    pub fn has_failed(&self) -> bool {
        self.status == LoadStatus::Failed
    }
}
