use std::collections::HashSet;
use itertools::Itertools;
use log::{debug, warn};
use serde::Serialize;
use crate::entities::{Album, MediaItem, MediaKind, Row};
use crate::error::GalleryError;
use crate::index::MediaIndex;
use crate::utils::path_utils::folder_name;

/// Items and albums derived from a single read of both collections.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaSnapshot {
    pub items: Vec<MediaItem>,
    pub albums: Vec<Album>,
    pub skipped_rows: usize,
}

/// Turns the rows of a `MediaIndex` into the merged feed and folder albums.
/// Nothing is cached: every call reads the index again.
#[derive(Debug)]
pub struct MediaAggregator<I> {
    index: I,
}

impl<I: MediaIndex> MediaAggregator<I> {
    pub fn new(index: I) -> Self {
        Self { index }
    }

    pub fn get_images(&self) -> Result<Vec<MediaItem>, GalleryError> {
        let (items, _) = merge_rows(self.index.list_images()?, vec![]);
        Ok(items)
    }

    pub fn get_videos(&self) -> Result<Vec<MediaItem>, GalleryError> {
        let (items, _) = merge_rows(vec![], self.index.list_videos()?);
        Ok(items)
    }

    pub fn get_all_media(&self) -> Result<Vec<MediaItem>, GalleryError> {
        let (items, _) = self.read_all()?;
        Ok(items)
    }

    pub fn get_albums(&self) -> Result<Vec<Album>, GalleryError> {
        let (items, _) = self.read_all()?;
        Ok(group_albums(&items))
    }

    pub fn load(&self) -> Result<MediaSnapshot, GalleryError> {
        let (items, skipped_rows) = self.read_all()?;
        let albums = group_albums(&items);
        debug!("loaded {} items in {} albums", items.len(), albums.len());
        Ok(MediaSnapshot { items, albums, skipped_rows })
    }

    fn read_all(&self) -> Result<(Vec<MediaItem>, usize), GalleryError> {
        let images = self.index.list_images()?;
        let videos = self.index.list_videos()?;
        let (items, skipped) = merge_rows(images, videos);
        if skipped > 0 {
            warn!("skipped {} malformed rows", skipped);
        }
        Ok((items, skipped))
    }
}

/// Converts and merges both collections, freshest first. Returns the items and
/// the number of rows dropped as malformed or as duplicates of an earlier
/// `(kind, id)`.
pub fn merge_rows(images: Vec<Row>, videos: Vec<Row>) -> (Vec<MediaItem>, usize) {
    let mut seen = HashSet::new();
    let mut skipped = 0;
    let mut items = Vec::with_capacity(images.len() + videos.len());

    let rows = images.into_iter().map(|row| (MediaKind::Image, row))
        .chain(videos.into_iter().map(|row| (MediaKind::Video, row)));
    for (kind, row) in rows {
        match row.into_item(kind) {
            Ok(item) if seen.insert(item.key()) => items.push(item),
            Ok(item) => {
                debug!("dropping duplicate row {}", item.key());
                skipped += 1;
            }
            Err(e) => {
                debug!("{}", e);
                skipped += 1;
            }
        }
    }

    sort_by_freshness(&mut items);
    (items, skipped)
}

/// Newest first; equal dates fall back to `(kind, id)` ascending.
pub fn sort_by_freshness(items: &mut [MediaItem]) {
    items.sort_by(|a, b| b.date_added.cmp(&a.date_added).then_with(|| a.key().cmp(&b.key())));
}

/// Groups items by containing folder. Largest albums first, ties by name.
pub fn group_albums(items: &[MediaItem]) -> Vec<Album> {
    items.iter()
        .cloned()
        .into_group_map_by(|item| folder_name(&item.path).to_string())
        .into_iter()
        .filter_map(|(name, mut album_items)| {
            sort_by_freshness(&mut album_items);
            Album::new(name, album_items)
        })
        .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.name().cmp(b.name())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryMediaIndex;

    fn row(id: i64, path: &str, date_added: i64) -> Row {
        Row { id: Some(id), path: Some(path.to_string()), date_added: Some(date_added), ..Default::default() }
    }

    fn video_row(id: i64, path: &str, date_added: i64, duration_ms: i64) -> Row {
        Row { duration_ms: Some(duration_ms), ..row(id, path, date_added) }
    }

    fn names(items: &[MediaItem]) -> Vec<&str> {
        items.iter().map(|x| x.display_name.as_str()).collect()
    }

    /// Deterministic pseudo-random rows spread over a handful of folders.
    fn generated_rows(count: i64, seed: u64) -> Vec<Row> {
        let mut state = seed;
        (0..count).map(|id| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let folder = (state >> 33) % 5;
            let date_added = ((state >> 17) % 50) as i64;
            row(id, &format!("/DCIM/folder{}/file{}.jpg", folder, id), date_added)
        }).collect()
    }

    #[test]
    fn test_single_folder_example() {
        let index = InMemoryMediaIndex::new(
            vec![row(1, "/DCIM/a/IMG1.jpg", 100)],
            vec![video_row(2, "/DCIM/a/VID1.mp4", 200, 5000)],
        );
        let aggregator = MediaAggregator::new(index);

        let all = aggregator.get_all_media().unwrap();
        assert_eq!(names(&all), vec!["VID1.mp4", "IMG1.jpg"]);
        assert_eq!(all[0].kind, MediaKind::Video);
        assert_eq!(all[0].duration_ms, 5000);

        let albums = aggregator.get_albums().unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name(), "a");
        assert_eq!(names(albums[0].items()), vec!["VID1.mp4", "IMG1.jpg"]);
        assert_eq!(albums[0].cover_item().unwrap().display_name, "VID1.mp4");
    }

    #[test]
    fn test_empty_sources() {
        let aggregator = MediaAggregator::new(InMemoryMediaIndex::default());
        assert!(aggregator.get_all_media().unwrap().is_empty());
        assert!(aggregator.get_albums().unwrap().is_empty());
        assert_eq!(aggregator.load().unwrap(), MediaSnapshot::default());
    }

    #[test]
    fn test_get_images_and_videos_are_separate() {
        let index = InMemoryMediaIndex::new(
            vec![row(1, "/a/IMG1.jpg", 1), row(2, "/a/IMG2.jpg", 2)],
            vec![video_row(1, "/a/VID1.mp4", 3, 10)],
        );
        let aggregator = MediaAggregator::new(index);
        let images = aggregator.get_images().unwrap();
        let videos = aggregator.get_videos().unwrap();
        assert!(images.iter().all(|x| x.kind == MediaKind::Image));
        assert!(videos.iter().all(|x| x.is_video()));
        assert_eq!(names(&images), vec!["IMG2.jpg", "IMG1.jpg"]);
        assert_eq!(videos.len(), 1);
    }

    #[test]
    fn test_equal_dates_break_ties_by_kind_then_id() {
        let (items, skipped) = merge_rows(
            vec![row(5, "/a/IMG5.jpg", 10), row(3, "/a/IMG3.jpg", 10)],
            vec![row(1, "/a/VID1.mp4", 10), row(9, "/a/VID9.mp4", 11)],
        );
        assert_eq!(skipped, 0);
        assert_eq!(names(&items), vec!["VID9.mp4", "IMG3.jpg", "IMG5.jpg", "VID1.mp4"]);
    }

    #[test]
    fn test_same_id_in_both_sources_is_kept() {
        let (items, skipped) = merge_rows(vec![row(1, "/a/IMG1.jpg", 1)], vec![row(1, "/a/VID1.mp4", 1)]);
        assert_eq!(skipped, 0);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_malformed_and_duplicate_rows_are_skipped() {
        let (items, skipped) = merge_rows(
            vec![
                row(1, "/a/IMG1.jpg", 1),
                Row { path: None, ..row(2, "/a/IMG2.jpg", 2) },
                row(1, "/a/IMG1-copy.jpg", 3),
                Row { width: Some(-4), ..row(4, "/a/IMG4.jpg", 4) },
            ],
            vec![Row::default(), video_row(7, "/b/VID7.mp4", 5, 1000)],
        );
        assert_eq!(skipped, 4);
        assert_eq!(names(&items), vec!["VID7.mp4", "IMG1.jpg"]);
    }

    #[test]
    fn test_source_order_does_not_matter() {
        let rows = generated_rows(40, 7);
        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(merge_rows(rows, vec![]), merge_rows(reversed, vec![]));
    }

    #[test]
    fn test_feed_contains_everything_in_date_order() {
        let images = generated_rows(60, 42);
        let videos = generated_rows(25, 1337).into_iter()
            .map(|r| Row { path: r.path.map(|p| p.replace(".jpg", ".mp4")), ..r })
            .collect::<Vec<Row>>();
        let (items, skipped) = merge_rows(images, videos);
        assert_eq!(skipped, 0);
        assert_eq!(items.len(), 85);
        assert!(items.windows(2).all(|w| w[0].date_added >= w[1].date_added));
    }

    #[test]
    fn test_albums_partition_items_by_folder() {
        let (items, _) = merge_rows(generated_rows(80, 99), vec![]);
        let albums = group_albums(&items);

        assert_eq!(albums.iter().map(|a| a.len()).sum::<usize>(), items.len());
        for album in &albums {
            assert!(!album.is_empty());
            assert!(album.items().iter().all(|x| folder_name(&x.path) == album.name()));
            assert!(album.items().windows(2).all(|w| w[0].date_added >= w[1].date_added));
            let max_date = album.items().iter().map(|x| x.date_added).max().unwrap();
            assert_eq!(album.cover_item().unwrap().date_added, max_date);
        }
        let album_names = albums.iter().map(|a| a.name()).collect::<HashSet<&str>>();
        assert_eq!(album_names.len(), albums.len());
        assert!(albums.windows(2).all(|w| {
            w[0].len() > w[1].len() || (w[0].len() == w[1].len() && w[0].name() < w[1].name())
        }));
    }

    #[test]
    fn test_album_ties_sorted_by_name() {
        let (items, _) = merge_rows(
            vec![row(1, "/x/zeta/1.jpg", 5), row(2, "/x/alpha/2.jpg", 1), row(3, "/x/mid/3.jpg", 2), row(4, "/x/mid/4.jpg", 3)],
            vec![],
        );
        let albums = group_albums(&items);
        let album_names = albums.iter().map(|a| a.name()).collect::<Vec<&str>>();
        assert_eq!(album_names, vec!["mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_same_folder_name_under_different_parents_merges() {
        let (items, _) = merge_rows(vec![row(1, "/sd/DCIM/Camera/1.jpg", 1), row(2, "/internal/DCIM/Camera/2.jpg", 2)], vec![]);
        let albums = group_albums(&items);
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name(), "Camera");
    }

    #[test]
    fn test_unavailable_index_fails_the_whole_read() {
        let index = InMemoryMediaIndex::new(vec![row(1, "/a/IMG1.jpg", 1)], vec![]);
        index.set_videos_unavailable(true);
        let aggregator = MediaAggregator::new(index);
        assert!(aggregator.get_all_media().unwrap_err().is_index_unavailable());
        assert!(aggregator.get_albums().unwrap_err().is_index_unavailable());
        assert!(aggregator.load().unwrap_err().is_index_unavailable());
        assert_eq!(aggregator.get_images().unwrap().len(), 1);
    }

    #[test]
    fn test_load_reports_skipped_rows() {
        let index = InMemoryMediaIndex::new(vec![row(1, "/a/IMG1.jpg", 1), Row::default()], vec![]);
        let snapshot = MediaAggregator::new(index).load().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.albums.len(), 1);
        assert_eq!(snapshot.skipped_rows, 1);
    }
}
