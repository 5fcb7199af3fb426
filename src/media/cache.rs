//! Decoded media cache for fast navigation.
//!
//! Keeps opened media keyed by path using an LRU policy. Each entry remembers
//! the file's modification time so a file changed on disk is decoded again.

use crate::capabilities::Capabilities;
use crate::config::{DECODE_RETRY_ATTEMPTS, DECODE_RETRY_DELAY};
use crate::error::MediaError;
use crate::file_utils::PathExt;
use crate::media::{MediaItem, OpenedMedia, open_with_retry};
use crate::state::lock;
use lru::LruCache;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

/// Cached media together with the mtime it was decoded from.
#[derive(Clone)]
struct CachedMedia {
    media: OpenedMedia,
    modified: Option<SystemTime>,
}

/// LRU cache for storing opened media.
pub struct MediaCache {
    cache: LruCache<PathBuf, CachedMedia>,
}

/// Modification time of a file, `None` if it cannot be read.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl MediaCache {
    /// Creates a new cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Returns the cached media if the file has not changed since it was stored.
    pub fn get(&mut self, path: &Path, modified: Option<SystemTime>) -> Option<OpenedMedia> {
        let hit = match self.cache.get(path) {
            Some(entry) if entry.modified == modified => Some(entry.media.clone()),
            Some(_) => {
                log::info!("Cache STALE: {}", path.format_for_log());
                self.cache.pop(path);
                None
            }
            None => None,
        };

        if hit.is_some() {
            log::info!("Cache HIT: {}", path.format_for_log());
        } else {
            log::info!("Cache MISS: {}", path.format_for_log());
        }
        hit
    }

    /// Stores opened media.
    pub fn put(&mut self, path: PathBuf, media: OpenedMedia, modified: Option<SystemTime>) {
        log::info!("Cache PUT: {} {:?}", path.format_for_log(), media);
        self.cache.put(path, CachedMedia { media, modified });
    }

    /// Drops an entry, e.g. after the file was deleted.
    pub fn remove(&mut self, path: &Path) {
        self.cache.pop(path);
    }

    /// Checks if media for a path is cached, without touching the LRU order.
    pub fn contains(&self, path: &Path) -> bool {
        self.cache.contains(path)
    }
}

/// Opens `item` from the cache when its file is unchanged, otherwise from
/// disk (with transient retries), storing the result.
///
/// Blocking; call from a worker thread.
pub fn open_cached(
    cache: &Mutex<MediaCache>,
    item: &MediaItem,
    caps: &Capabilities,
) -> Result<OpenedMedia, MediaError> {
    let modified = modified_time(item.path());
    if let Some(media) = lock(cache).get(item.path(), modified) {
        return Ok(media);
    }

    let media = open_with_retry(item, caps, DECODE_RETRY_ATTEMPTS, DECODE_RETRY_DELAY)?;
    lock(cache).put(item.path().to_path_buf(), media.clone(), modified);
    Ok(media)
}

/// Opens `item` into the cache unless it is already there. Failures are
/// ignored; the item is reported when it is actually navigated to.
pub fn preload(cache: &Mutex<MediaCache>, item: &MediaItem, caps: &Capabilities) {
    if lock(cache).contains(item.path()) {
        return;
    }
    if let Err(e) = open_cached(cache, item, caps) {
        log::debug!("Preload of {} failed: {}", item.path().format_for_log(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::sync::Arc;
    use std::time::Duration;

    fn still(w: u32, h: u32) -> OpenedMedia {
        OpenedMedia::Still(Arc::new(DynamicImage::new_rgba8(w, h)))
    }

    #[test]
    fn changed_mtime_is_a_miss() {
        let mut cache = MediaCache::new(2);
        let path = PathBuf::from("/pics/a.png");
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let t1 = t0 + Duration::from_secs(1);

        cache.put(path.clone(), still(4, 4), Some(t0));
        assert!(cache.get(&path, Some(t0)).is_some());
        assert!(cache.get(&path, Some(t1)).is_none());
        assert!(!cache.contains(&path));
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let mut cache = MediaCache::new(2);
        let a = PathBuf::from("a.png");
        let b = PathBuf::from("b.png");
        let c = PathBuf::from("c.png");

        cache.put(a.clone(), still(1, 1), None);
        cache.put(b.clone(), still(1, 1), None);
        cache.get(&a, None);
        cache.put(c.clone(), still(1, 1), None);

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn open_cached_reuses_decoded_media_until_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        crate::test_support::write_png(&path, 8, 8);
        let item = MediaItem::new(path.clone()).unwrap();
        let cache = Mutex::new(MediaCache::new(4));
        let caps = Capabilities::default();

        open_cached(&cache, &item, &caps).unwrap();
        assert!(lock(&cache).contains(&path));

        // Same mtime: served from memory even though the file is now garbage.
        let modified = modified_time(&path);
        fs::write(&path, b"garbage").unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(modified.unwrap()).unwrap();
        drop(file);
        assert!(open_cached(&cache, &item, &caps).is_ok());

        let later = modified.unwrap() + Duration::from_secs(5);
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(later).unwrap();
        drop(file);
        assert!(open_cached(&cache, &item, &caps).is_err());
    }

    #[test]
    fn zero_capacity_still_caches_one_entry() {
        let mut cache = MediaCache::new(0);
        cache.put(PathBuf::from("a.png"), still(1, 1), None);
        assert!(cache.contains(Path::new("a.png")));
    }
}
