//! Service for handling media navigation operations.
//!
//! Provides high-level navigation methods that coordinate between
//! NavigationState, the tag store, and file system operations.

use crate::error::{AppError, MediaError, NavigationError};
use crate::file_utils::{self, PathExt};
use crate::media::{MediaItem, OpenedMedia};
use crate::sidecar::TagStore;
use crate::state::{NavigationState, TagSet, lock};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Result type for navigation operations.
pub type NavigationResult = Result<MediaItem, NavigationError>;

/// A list entry that failed to open and was dropped from the session.
#[derive(Debug, Clone)]
pub struct BrokenItem {
    pub path: PathBuf,
    pub error: MediaError,
}

/// The current item, opened, with its freshly loaded tags.
pub struct OpenedCurrent {
    pub item: MediaItem,
    pub media: OpenedMedia,
    pub tags: TagSet,
}

pub enum OpenOutcome {
    Opened {
        current: OpenedCurrent,
        broken: Vec<BrokenItem>,
    },
    /// Every remaining item was broken; the list is now empty.
    Exhausted { broken: Vec<BrokenItem> },
    /// The user moved elsewhere while this item was opening.
    Superseded { broken: Vec<BrokenItem> },
}

impl OpenOutcome {
    /// Items dropped from the list while opening, whatever the outcome.
    pub fn broken(&self) -> &[BrokenItem] {
        match self {
            OpenOutcome::Opened { broken, .. }
            | OpenOutcome::Exhausted { broken }
            | OpenOutcome::Superseded { broken } => broken,
        }
    }
}

/// Service for managing media navigation.
#[derive(Clone)]
pub struct NavigationService {
    navigation: Arc<Mutex<NavigationState>>,
    tag_store: Arc<dyn TagStore>,
}

impl NavigationService {
    /// Creates a new navigation service.
    pub fn new(navigation: Arc<Mutex<NavigationState>>, tag_store: Arc<dyn TagStore>) -> Self {
        Self {
            navigation,
            tag_store,
        }
    }

    /// Navigates to the next item and returns it.
    pub fn next(&self) -> NavigationResult {
        let mut nav_state = lock(&self.navigation);
        nav_state.navigate_next().cloned()
    }

    /// Navigates to the previous item and returns it.
    pub fn previous(&self) -> NavigationResult {
        let mut nav_state = lock(&self.navigation);
        nav_state.navigate_prev().cloned()
    }

    /// Scans `dir` recursively and makes its media the session list.
    ///
    /// Returns the number of items found.
    pub fn load_folder(&self, dir: &Path, include_video: bool) -> Result<usize, AppError> {
        let start = std::time::Instant::now();
        let directory = dir.canonicalize().map_err(|e| {
            AppError::DirectoryScan(format!("Failed to resolve {}: {}", dir.format_for_log(), e))
        })?;
        let files = file_utils::scan_directory(&directory, include_video)?;

        let mut nav_state = lock(&self.navigation);
        nav_state.load_items(&directory, files);
        info!(
            "Loaded {} media files from {} in {:?}",
            nav_state.image_count(),
            directory.format_for_log(),
            start.elapsed()
        );
        Ok(nav_state.image_count())
    }

    /// Jumps to the first item without a score tag, or to the first item
    /// when everything is scored.
    pub fn seek_untagged(&self) -> NavigationResult {
        let items: Vec<MediaItem> = lock(&self.navigation).items().to_vec();
        if items.is_empty() {
            return Err(NavigationError::NoMedia);
        }

        let target = items
            .iter()
            .position(|item| !TagSet::from_stored(self.tag_store.load(item.path())).has_score())
            .unwrap_or_else(|| {
                debug!("Every item is scored, returning to the start");
                0
            });

        lock(&self.navigation).jump_to(target).cloned()
    }

    /// Opens the current item, dropping broken entries until one opens or
    /// the list runs out. Each failure shrinks the list, so this terminates.
    pub fn open_current<F>(&self, mut open: F) -> OpenOutcome
    where
        F: FnMut(&MediaItem) -> Result<OpenedMedia, MediaError>,
    {
        let mut broken = Vec::new();
        loop {
            let Some(item) = lock(&self.navigation).current_item().cloned() else {
                return OpenOutcome::Exhausted { broken };
            };

            match open(&item) {
                Ok(media) => {
                    let tags = TagSet::from_stored(self.tag_store.load(item.path()));
                    let mut nav_state = lock(&self.navigation);
                    if !nav_state.is_current(item.path()) {
                        return OpenOutcome::Superseded { broken };
                    }
                    nav_state.set_tags(tags.clone());
                    return OpenOutcome::Opened {
                        current: OpenedCurrent { item, media, tags },
                        broken,
                    };
                }
                Err(e) => {
                    error!("Failed to open {}: {}", item.path().format_for_log(), e);
                    let mut nav_state = lock(&self.navigation);
                    if !nav_state.is_current(item.path()) {
                        return OpenOutcome::Superseded { broken };
                    }
                    nav_state.drop_broken_current();
                    broken.push(BrokenItem {
                        path: item.path().to_path_buf(),
                        error: e,
                    });
                }
            }
        }
    }

    /// Drops `path` after it failed to display, if it is still current.
    pub fn drop_broken(&self, path: &Path) -> bool {
        let mut nav_state = lock(&self.navigation);
        if nav_state.is_current(path) {
            nav_state.drop_broken_current();
            true
        } else {
            false
        }
    }

    pub fn current_item(&self) -> Option<MediaItem> {
        lock(&self.navigation).current_item().cloned()
    }

    pub fn position_label(&self) -> String {
        lock(&self.navigation).position_label()
    }

    /// Neighbours of the current item, for preloading.
    pub fn neighbours(&self) -> Vec<MediaItem> {
        let nav_state = lock(&self.navigation);
        let mut neighbours: Vec<MediaItem> = Vec::new();
        for item in [nav_state.peek_next(), nav_state.peek_prev()].into_iter().flatten() {
            if !neighbours.contains(item) {
                neighbours.push(item.clone());
            }
        }
        neighbours
    }
}
