mod dir;
mod jsonl;

use std::sync::atomic::{AtomicBool, Ordering};
use crate::entities::Row;
use crate::error::GalleryError;

pub use dir::DirectoryMediaIndex;
pub use jsonl::JsonlMediaIndex;

/// Read access to a device media catalog. Calls block and may return rows in
/// any order; a failed read is reported as `IndexUnavailable`, never as an
/// empty list.
pub trait MediaIndex: Send + Sync {
    fn list_images(&self) -> Result<Vec<Row>, GalleryError>;
    fn list_videos(&self) -> Result<Vec<Row>, GalleryError>;
}

impl<T: MediaIndex + ?Sized> MediaIndex for std::sync::Arc<T> {
    fn list_images(&self) -> Result<Vec<Row>, GalleryError> {
        (**self).list_images()
    }

    fn list_videos(&self) -> Result<Vec<Row>, GalleryError> {
        (**self).list_videos()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMediaIndex {
    images: Vec<Row>,
    videos: Vec<Row>,
    images_unavailable: AtomicBool,
    videos_unavailable: AtomicBool,
}

impl InMemoryMediaIndex {
    pub fn new(images: Vec<Row>, videos: Vec<Row>) -> Self {
        Self { images, videos, ..Default::default() }
    }

    pub fn set_images_unavailable(&self, unavailable: bool) {
        self.images_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_videos_unavailable(&self, unavailable: bool) {
        self.videos_unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl MediaIndex for InMemoryMediaIndex {
    fn list_images(&self) -> Result<Vec<Row>, GalleryError> {
        if self.images_unavailable.load(Ordering::SeqCst) {
            return Err(GalleryError::IndexUnavailable("image catalog is not ready".to_string()));
        }
        Ok(self.images.clone())
    }

    fn list_videos(&self) -> Result<Vec<Row>, GalleryError> {
        if self.videos_unavailable.load(Ordering::SeqCst) {
            return Err(GalleryError::IndexUnavailable("video catalog is not ready".to_string()));
        }
        Ok(self.videos.clone())
    }
}
