//! Media items and the adapter that opens them for display.

pub mod cache;
pub mod decoder;

pub use cache::{MediaCache, open_cached, preload};
pub use decoder::{AnimatedSource, OpenedMedia, open_with_retry};

use crate::config::{
    SUPPORTED_ANIMATED_EXTENSIONS, SUPPORTED_IMAGE_EXTENSIONS, SUPPORTED_VIDEO_EXTENSIONS,
};
use std::path::{Path, PathBuf};

/// How a media file is displayed, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    AnimatedImage,
    Video,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let ext = ext.as_str();
        if SUPPORTED_ANIMATED_EXTENSIONS.contains(&ext) {
            Some(MediaKind::AnimatedImage)
        } else if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Image)
        } else if SUPPORTED_VIDEO_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// One file of the current session list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    path: PathBuf,
    kind: MediaKind,
}

impl MediaItem {
    /// Builds an item for a supported file, `None` for anything else.
    pub fn new(path: PathBuf) -> Option<Self> {
        let kind = MediaKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}
