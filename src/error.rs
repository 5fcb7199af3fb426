//! Unified error types for the media tagger application.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Application-specific errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Error loading or decoding a media file
    #[error("Media load error: {0}")]
    ImageLoad(String),
    /// Error scanning directory for media files
    #[error("Directory scan error: {0}")]
    DirectoryScan(String),
    /// Error writing a tag sidecar
    #[error("Sidecar error for {}: {message}", path.display())]
    Sidecar { path: PathBuf, message: String },
    /// Error moving a file to the trash
    #[error("Trash error: {0}")]
    Trash(String),
    /// The video backend is not available in this session
    #[error("Video playback unavailable: {0}")]
    VideoUnavailable(String),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::DirectoryScan(err.to_string())
    }
}

impl From<trash::Error> for AppError {
    fn from(err: trash::Error) -> Self {
        AppError::Trash(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::ImageLoad(err.to_string())
    }
}

/// Errors produced while opening or decoding a single media file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    /// The file is temporarily unreadable (locked, still being written).
    #[error("temporarily unavailable: {0}")]
    Transient(String),
    /// The file exists but cannot be decoded.
    #[error("corrupt media: {0}")]
    Corrupt(String),
    /// The format is not handled in this session.
    #[error("unsupported media: {0}")]
    Unsupported(String),
}

impl MediaError {
    /// Whether retrying the same operation shortly afterwards may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, MediaError::Transient(_))
    }
}

impl From<io::Error> for MediaError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::UnexpectedEof => MediaError::Transient(err.to_string()),
            _ => MediaError::Corrupt(err.to_string()),
        }
    }
}

impl From<image::ImageError> for MediaError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io_err) => io_err.into(),
            image::ImageError::Unsupported(e) => MediaError::Unsupported(e.to_string()),
            other => MediaError::Corrupt(other.to_string()),
        }
    }
}

impl From<gif::DecodingError> for MediaError {
    fn from(err: gif::DecodingError) -> Self {
        match err {
            gif::DecodingError::Io(io_err) => io_err.into(),
            other => MediaError::Corrupt(other.to_string()),
        }
    }
}

/// Errors raised by navigation over the session list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No media files loaded")]
    NoMedia,
    #[error("No current media item")]
    NoCurrentItem,
}

/// Type alias for Results in this application.
pub type Result<T> = std::result::Result<T, AppError>;
