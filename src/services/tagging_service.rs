//! Service for handling tag and score operations.
//!
//! Mutates the current item's tags and writes them to the sidecar right
//! away. A failed write is reported but the in-memory tags stay authoritative
//! for the rest of the session.

use crate::error::{AppError, NavigationError};
use crate::sidecar::TagStore;
use crate::state::{NavigationState, TagSet, lock};
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Outcome of a tag mutation.
#[derive(Debug)]
pub struct TagUpdate {
    pub tags: TagSet,
    /// Set when the sidecar could not be written.
    pub save_error: Option<AppError>,
}

/// Score value for a rating key: digits map to themselves, `*` to 10.
pub fn score_for_key(key: char) -> Option<String> {
    match key {
        '0'..='9' => Some(key.to_string()),
        '*' => Some("10".to_string()),
        _ => None,
    }
}

/// Service for managing tag operations on the current item.
pub struct TaggingService {
    navigation: Arc<Mutex<NavigationState>>,
    tag_store: Arc<dyn TagStore>,
}

impl TaggingService {
    /// Creates a new tagging service.
    pub fn new(navigation: Arc<Mutex<NavigationState>>, tag_store: Arc<dyn TagStore>) -> Self {
        Self {
            navigation,
            tag_store,
        }
    }

    /// Replaces the score of the current item and persists its tags.
    pub fn assign_score(&self, value: &str) -> Result<TagUpdate, NavigationError> {
        let (path, tags) = {
            let mut nav_state = lock(&self.navigation);
            let path = nav_state
                .current_path()
                .ok_or(NavigationError::NoCurrentItem)?;
            if !nav_state.tags_loaded() {
                nav_state.set_tags(TagSet::from_stored(self.tag_store.load(&path)));
            }
            nav_state.tags_mut().assign_score(value);
            (path, nav_state.tags().clone())
        };

        info!("Score {} for {}", value, path.display());
        let save_error = match self.tag_store.save(&path, tags.as_slice()) {
            Ok(()) => None,
            Err(e) => {
                warn!("Tags kept in memory only: {}", e);
                Some(e)
            }
        };

        Ok(TagUpdate { tags, save_error })
    }
}
