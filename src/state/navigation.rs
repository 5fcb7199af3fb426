//! Navigation state for the session's media list and current position.

use crate::error::NavigationError;
use crate::media::MediaItem;
use crate::state::TagSet;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Direction for navigation through the list.
#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

/// Manages the media list of the opened folder, the current index and the
/// tags of the current item.
#[derive(Default)]
pub struct NavigationState {
    items: Vec<MediaItem>,
    current_index: usize,
    current_tags: TagSet,
    tags_loaded: bool,
}

impl NavigationState {
    /// Creates a new empty navigation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list with the files of a freshly scanned folder.
    pub fn load_items(&mut self, directory: &Path, files: Vec<PathBuf>) {
        let items: Vec<MediaItem> = files.into_iter().filter_map(MediaItem::new).collect();
        debug!(
            "Loaded {} media items from {}",
            items.len(),
            directory.display()
        );
        self.items = items;
        self.current_index = 0;
        self.reset_tags();
    }

    /// Moves one step in the given direction, wrapping around the ends.
    fn navigate(&mut self, direction: Direction) -> Result<&MediaItem, NavigationError> {
        if self.items.is_empty() {
            warn!("No media available for navigation");
            return Err(NavigationError::NoMedia);
        }

        let len = self.items.len();
        self.current_index = match direction {
            Direction::Next => (self.current_index + 1) % len,
            Direction::Previous => (self.current_index + len - 1) % len,
        };
        self.reset_tags();
        Ok(&self.items[self.current_index])
    }

    pub fn navigate_next(&mut self) -> Result<&MediaItem, NavigationError> {
        self.navigate(Direction::Next)
    }

    pub fn navigate_prev(&mut self) -> Result<&MediaItem, NavigationError> {
        self.navigate(Direction::Previous)
    }

    /// Makes `index` the current position.
    pub fn jump_to(&mut self, index: usize) -> Result<&MediaItem, NavigationError> {
        if index >= self.items.len() {
            return Err(NavigationError::NoMedia);
        }
        self.current_index = index;
        self.reset_tags();
        Ok(&self.items[index])
    }

    /// Removes the current item and keeps the index inside the list.
    pub fn remove_current(&mut self) -> Option<MediaItem> {
        if self.items.is_empty() {
            return None;
        }
        let removed = self.items.remove(self.current_index);
        self.current_index = self.current_index.min(self.items.len().saturating_sub(1));
        self.reset_tags();
        Some(removed)
    }

    /// Removes the current item after it failed to open and restarts from
    /// the beginning of the list.
    pub fn drop_broken_current(&mut self) -> Option<MediaItem> {
        let removed = self.remove_current()?;
        self.current_index = 0;
        Some(removed)
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.items.get(self.current_index)
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current_item().map(|item| item.path().to_path_buf())
    }

    #[cfg(test)]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_current(&self, path: &Path) -> bool {
        self.current_item().is_some_and(|item| item.path() == path)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn image_count(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn tags(&self) -> &TagSet {
        &self.current_tags
    }

    pub fn set_tags(&mut self, tags: TagSet) {
        self.current_tags = tags;
        self.tags_loaded = true;
    }

    /// Whether the tags of the current item were read from its sidecar.
    pub fn tags_loaded(&self) -> bool {
        self.tags_loaded
    }

    fn reset_tags(&mut self) {
        self.current_tags = TagSet::default();
        self.tags_loaded = false;
    }

    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.current_tags
    }

    /// `"12.50% 1/8\t/path/to/file"` line, or a placeholder with no media.
    pub fn position_label(&self) -> String {
        match self.current_item() {
            Some(item) => {
                let total = self.items.len();
                let position = self.current_index + 1;
                let percent = position as f64 / total as f64 * 100.0;
                format!(
                    "{:.2}% {}/{}\t{}",
                    percent,
                    position,
                    total,
                    item.path().display()
                )
            }
            None => "No file loaded".to_string(),
        }
    }

    /// The item after the current one, without moving.
    pub fn peek_next(&self) -> Option<&MediaItem> {
        if self.items.len() < 2 {
            return None;
        }
        self.items.get((self.current_index + 1) % self.items.len())
    }

    /// The item before the current one, without moving.
    pub fn peek_prev(&self) -> Option<&MediaItem> {
        if self.items.len() < 2 {
            return None;
        }
        let len = self.items.len();
        self.items.get((self.current_index + len - 1) % len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(count: usize) -> NavigationState {
        let mut state = NavigationState::new();
        let files = (0..count)
            .map(|i| PathBuf::from(format!("/pics/{:02}.png", i)))
            .collect();
        state.load_items(Path::new("/pics"), files);
        state
    }

    #[test]
    fn next_and_previous_wrap_modulo_length() {
        let mut state = state_with(5);
        let moves: [i64; 9] = [1, 1, -1, 1, 1, 1, 1, 1, -1];
        let mut expected: i64 = 0;

        for step in moves {
            if step > 0 {
                state.navigate_next().unwrap();
            } else {
                state.navigate_prev().unwrap();
            }
            expected = (expected + step).rem_euclid(5);
            assert_eq!(state.current_index() as i64, expected);
        }
    }

    #[test]
    fn previous_from_first_wraps_to_last() {
        let mut state = state_with(3);
        assert_eq!(
            state.navigate_prev().unwrap().path(),
            Path::new("/pics/02.png")
        );
    }

    #[test]
    fn navigation_on_empty_list_is_a_no_op() {
        let mut state = state_with(0);
        assert_eq!(state.navigate_next().unwrap_err(), NavigationError::NoMedia);
        assert_eq!(state.navigate_prev().unwrap_err(), NavigationError::NoMedia);
        assert_eq!(state.current_index(), 0);
        assert!(state.current_item().is_none());
    }

    #[test]
    fn removing_last_item_clamps_index() {
        let mut state = state_with(4);
        state.jump_to(3).unwrap();

        let removed = state.remove_current().unwrap();
        assert_eq!(removed.path(), Path::new("/pics/03.png"));
        assert_eq!(state.image_count(), 3);
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn removing_middle_item_keeps_position() {
        let mut state = state_with(4);
        state.jump_to(1).unwrap();
        state.remove_current();
        assert_eq!(state.current_path(), Some(PathBuf::from("/pics/02.png")));
    }

    #[test]
    fn removing_only_item_leaves_empty_state() {
        let mut state = state_with(1);
        state.remove_current();
        assert!(state.is_empty());
        assert_eq!(state.current_index(), 0);
        assert!(state.remove_current().is_none());
    }

    #[test]
    fn broken_item_resets_to_start() {
        let mut state = state_with(4);
        state.jump_to(2).unwrap();
        state.drop_broken_current();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.image_count(), 3);
    }

    #[test]
    fn unsupported_files_are_skipped_on_load() {
        let mut state = NavigationState::new();
        state.load_items(
            Path::new("/pics"),
            vec![PathBuf::from("/pics/a.png"), PathBuf::from("/pics/a.json")],
        );
        assert_eq!(state.image_count(), 1);
    }

    #[test]
    fn position_label_shows_progress_and_path() {
        let mut state = state_with(8);
        state.jump_to(1).unwrap();
        assert_eq!(state.position_label(), "25.00% 2/8\t/pics/01.png");
        assert_eq!(state_with(0).position_label(), "No file loaded");
    }

    #[test]
    fn peeks_wrap_without_moving() {
        let state = state_with(3);
        assert_eq!(state.peek_next().unwrap().path(), Path::new("/pics/01.png"));
        assert_eq!(state.peek_prev().unwrap().path(), Path::new("/pics/02.png"));
        assert_eq!(state.current_index(), 0);
        assert!(state_with(1).peek_next().is_none());
    }
}
