//! Optional subsystems available to this session.
//!
//! Built once at startup and handed to whatever needs to know whether video
//! playback exists. No backend ships with the binary; embedders register one
//! through [`Capabilities::with_video`].

use crate::error::{AppError, MediaError};
use crate::render::Viewport;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A playing video attached to the display area.
pub trait VideoSurface {
    fn toggle_pause(&mut self);
    /// Seeks relative to the current position.
    fn seek(&mut self, delta_secs: f64);
    /// Changes the volume by `delta` percent points.
    fn adjust_volume(&mut self, delta: i32);
    fn resize(&mut self, viewport: Viewport);
    /// Stops playback and releases the surface.
    fn stop(&mut self);
}

/// Factory for video surfaces, implemented by an external media player.
pub trait VideoBackend: Send + Sync {
    fn name(&self) -> &str;
    /// Checks that the file is playable and returns its length.
    fn probe(&self, path: &Path) -> Result<Duration, MediaError>;
    fn open(&self, path: &Path, viewport: Viewport) -> Result<Box<dyn VideoSurface>, MediaError>;
}

#[derive(Clone, Default)]
pub struct Capabilities {
    video: Option<Arc<dyn VideoBackend>>,
}

impl Capabilities {
    /// Capabilities of a plain build: images and animations only.
    pub fn detect() -> Self {
        let caps = Self::default();
        if let Some(notice) = caps.unavailable_notice() {
            log::info!("{}", notice);
        }
        caps
    }

    pub fn with_video(backend: Arc<dyn VideoBackend>) -> Self {
        log::info!("Video backend enabled: {}", backend.name());
        Self {
            video: Some(backend),
        }
    }

    pub fn video(&self) -> Option<&Arc<dyn VideoBackend>> {
        self.video.as_ref()
    }

    pub fn video_available(&self) -> bool {
        self.video.is_some()
    }

    /// One-time notice shown when a subsystem is disabled for the session.
    pub fn unavailable_notice(&self) -> Option<String> {
        if self.video.is_some() {
            None
        } else {
            Some(
                AppError::VideoUnavailable("no backend installed, video files are skipped".into())
                    .to_string(),
            )
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("video", &self.video.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}
