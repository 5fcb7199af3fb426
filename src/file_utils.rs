use crate::error::Result;
use crate::media::MediaKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension methods for paths shown in logs and the status line.
pub trait PathExt {
    fn format_for_log(&self) -> String;
}

impl PathExt for Path {
    fn format_for_log(&self) -> String {
        self.display().to_string()
    }
}

/// Returns true if the file has an extension handled in this session.
pub fn is_supported_media(path: &Path, include_video: bool) -> bool {
    match MediaKind::from_path(path) {
        Some(MediaKind::Video) => include_video,
        Some(_) => true,
        None => false,
    }
}

/// Recursively collects supported media files below `dir`, sorted by path.
pub fn scan_directory(dir: &Path, include_video: bool) -> Result<Vec<PathBuf>> {
    let mut media_files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if entry.file_type().is_file() && is_supported_media(entry.path(), include_video) {
            media_files.push(entry.into_path());
        }
    }

    media_files.sort();
    Ok(media_files)
}
