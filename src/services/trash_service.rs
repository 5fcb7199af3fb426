//! Service for deleting the current item to the system trash.

use crate::error::{AppError, NavigationError, Result};
use crate::file_utils::PathExt;
use crate::media::MediaItem;
use crate::sidecar::sidecar_path;
use crate::state::{NavigationState, lock};
use log::{info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Recoverable deletion.
pub trait Trash: Send + Sync {
    fn delete(&self, path: &Path) -> Result<()>;
}

/// The platform recycle bin.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn delete(&self, path: &Path) -> Result<()> {
        trash::delete(path).map_err(AppError::from)
    }
}

/// Service for removing the current item from disk and from the session.
pub struct TrashService {
    navigation: Arc<Mutex<NavigationState>>,
    trash: Arc<dyn Trash>,
}

impl TrashService {
    pub fn new(navigation: Arc<Mutex<NavigationState>>, trash: Arc<dyn Trash>) -> Self {
        Self { navigation, trash }
    }

    /// Sends the current file and its sidecar to the trash, then removes it
    /// from the list. The list is untouched if the media file stays.
    pub fn delete_current(&self) -> Result<MediaItem> {
        let item = lock(&self.navigation)
            .current_item()
            .cloned()
            .ok_or(NavigationError::NoCurrentItem)?;

        self.trash.delete(item.path())?;
        info!("Moved {} to trash", item.path().format_for_log());

        let sidecar = sidecar_path(item.path());
        if sidecar.exists() {
            if let Err(e) = self.trash.delete(&sidecar) {
                warn!("Sidecar {} left behind: {}", sidecar.format_for_log(), e);
            }
        }

        let mut nav_state = lock(&self.navigation);
        if nav_state.is_current(item.path()) {
            nav_state.remove_current();
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    /// Deletes for real but records what it was asked to remove.
    #[derive(Default)]
    struct RecordingTrash {
        deleted: Mutex<Vec<PathBuf>>,
        refuse: bool,
    }

    impl Trash for RecordingTrash {
        fn delete(&self, path: &Path) -> Result<()> {
            if self.refuse {
                return Err(AppError::Trash("trash unavailable".to_string()));
            }
            fs::remove_file(path).map_err(|e| AppError::Trash(e.to_string()))?;
            self.deleted.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn navigation_over(dir: &Path, names: &[&str]) -> Arc<Mutex<NavigationState>> {
        let files: Vec<PathBuf> = names.iter().map(|n| dir.join(n)).collect();
        for file in &files {
            fs::write(file, b"x").unwrap();
        }
        let mut state = NavigationState::new();
        state.load_items(dir, files);
        Arc::new(Mutex::new(state))
    }

    #[test]
    fn delete_removes_media_sidecar_and_entry() {
        let dir = tempfile::tempdir().unwrap();
        let navigation = navigation_over(dir.path(), &["a.png", "b.png", "c.png"]);
        fs::write(dir.path().join("c.json"), b"{}").unwrap();
        lock(&navigation).jump_to(2).unwrap();
        let trash = Arc::new(RecordingTrash::default());
        let service = TrashService::new(navigation.clone(), trash.clone());

        let removed = service.delete_current().unwrap();

        assert_eq!(removed.path(), dir.path().join("c.png"));
        assert_eq!(trash.deleted.lock().unwrap().len(), 2);
        assert!(!dir.path().join("c.json").exists());
        let nav = lock(&navigation);
        assert_eq!(nav.image_count(), 2);
        assert_eq!(nav.current_index(), 1);
    }

    #[test]
    fn deleting_only_item_empties_list() {
        let dir = tempfile::tempdir().unwrap();
        let navigation = navigation_over(dir.path(), &["solo.gif"]);
        let service = TrashService::new(navigation.clone(), Arc::new(RecordingTrash::default()));

        service.delete_current().unwrap();
        assert!(lock(&navigation).is_empty());
        assert!(service.delete_current().is_err());
    }

    #[test]
    fn failed_trash_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        let navigation = navigation_over(dir.path(), &["a.png"]);
        let trash = Arc::new(RecordingTrash {
            refuse: true,
            ..RecordingTrash::default()
        });
        let service = TrashService::new(navigation.clone(), trash);

        assert!(matches!(service.delete_current(), Err(AppError::Trash(_))));
        assert_eq!(lock(&navigation).image_count(), 1);
    }
}
