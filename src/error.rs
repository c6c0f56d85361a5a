use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error("Media index unavailable: {0}")]
    IndexUnavailable(String),
    #[error("Malformed row: {0}")]
    MalformedRow(String),
    #[error("Invalid tab selection: {0}")]
    InvalidTabSelection(String),
}

impl GalleryError {
    pub fn is_index_unavailable(&self) -> bool {
        matches!(self, GalleryError::IndexUnavailable(_))
    }
}
