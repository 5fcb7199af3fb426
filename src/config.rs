//! Application configuration constants and runtime settings.

use std::path::PathBuf;
use std::time::Duration;

/// Still image extensions picked up when scanning a folder.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Multi-frame image extensions played through the frame loader.
pub const SUPPORTED_ANIMATED_EXTENSIONS: [&str; 1] = ["gif"];

/// Video extensions, only scanned when a video backend is present.
pub const SUPPORTED_VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mkv", "webm", "mov", "avi"];

/// Extension of the JSON tag sidecar written next to each media file.
pub const SIDECAR_EXTENSION: &str = "json";

/// Prefix reserved for the single score tag of an item.
pub const SCORE_TAG_PREFIX: &str = "score__";

/// Frames decoded on the UI thread before handing off to the worker.
pub const PRIMING_FRAMES: usize = 3;

/// Inter-frame delay used when the animation does not specify one.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Smallest viewport edge, in pixels, worth rendering into.
pub const MIN_VIEWPORT_EDGE: u32 = 10;

/// Delay before re-checking a viewport that was too small to render.
pub const VIEWPORT_RECHECK_DELAY: Duration = Duration::from_millis(10);

/// Quiet period after the last resize before re-rendering.
pub const DEFAULT_RESIZE_DELAY_MS: u64 = 75;

/// Attempts made to open a media file that reports transient errors.
pub const DECODE_RETRY_ATTEMPTS: u32 = 3;

/// Pause between transient decode retries.
pub const DECODE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Decoded media kept around for instant navigation.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Tag summaries longer than this are cut in the middle.
pub const TAG_SUMMARY_MAX_CHARS: usize = 360;

/// Runtime settings assembled from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub initial_folder: Option<PathBuf>,
    pub resize_delay: Duration,
    pub cache_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_folder: None,
            resize_delay: Duration::from_millis(DEFAULT_RESIZE_DELAY_MS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
