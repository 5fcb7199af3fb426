//! Opens media files into a form the renderer can draw repeatedly.
//!
//! Decoding is blocking and meant to run on a rayon worker. The result is kept
//! in memory so later re-renders (window resizes) never go back to the disk.

use crate::capabilities::Capabilities;
use crate::error::MediaError;
use crate::file_utils::PathExt;
use crate::media::{MediaItem, MediaKind};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageDecoder};
use log::{debug, warn};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Encoded bytes of a multi-frame image, read once and decoded lazily.
#[derive(Clone)]
pub struct AnimatedSource {
    pub bytes: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
}

/// A media file opened for display.
#[derive(Clone)]
pub enum OpenedMedia {
    Still(Arc<DynamicImage>),
    Animated(AnimatedSource),
    Video { path: PathBuf, duration: Duration },
}

impl OpenedMedia {
    /// Pixel dimensions, when known without a playback backend.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            OpenedMedia::Still(image) => Some((image.width(), image.height())),
            OpenedMedia::Animated(source) => Some((source.width, source.height)),
            OpenedMedia::Video { .. } => None,
        }
    }
}

impl std::fmt::Debug for OpenedMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenedMedia::Still(image) => write!(f, "Still({}x{})", image.width(), image.height()),
            OpenedMedia::Animated(source) => write!(
                f,
                "Animated({}x{}, {} bytes)",
                source.width,
                source.height,
                source.bytes.len()
            ),
            OpenedMedia::Video { path, duration } => {
                write!(f, "Video({}, {:?})", path.format_for_log(), duration)
            }
        }
    }
}

fn decode_still(item: &MediaItem) -> Result<OpenedMedia, MediaError> {
    let image = image::ImageReader::open(item.path())?
        .with_guessed_format()?
        .decode()?;
    Ok(OpenedMedia::Still(Arc::new(image)))
}

fn inspect_animated(item: &MediaItem) -> Result<OpenedMedia, MediaError> {
    let bytes: Arc<[u8]> = fs::read(item.path())?.into();
    let decoder = GifDecoder::new(Cursor::new(bytes.clone()))?;
    let (width, height) = decoder.dimensions();

    match decoder.into_frames().next() {
        Some(Ok(_)) => Ok(OpenedMedia::Animated(AnimatedSource {
            bytes,
            width,
            height,
        })),
        Some(Err(e)) => Err(e.into()),
        None => Err(MediaError::Corrupt("animation has no frames".to_string())),
    }
}

fn probe_video(item: &MediaItem, caps: &Capabilities) -> Result<OpenedMedia, MediaError> {
    let backend = caps
        .video()
        .ok_or_else(|| MediaError::Unsupported("no video backend available".to_string()))?;
    let duration = backend.probe(item.path())?;
    Ok(OpenedMedia::Video {
        path: item.path().to_path_buf(),
        duration,
    })
}

/// Opens a media item once, without retrying.
pub fn open_media(item: &MediaItem, caps: &Capabilities) -> Result<OpenedMedia, MediaError> {
    debug!("Opening {:?} {}", item.kind(), item.path().format_for_log());
    match item.kind() {
        MediaKind::Image => decode_still(item),
        MediaKind::AnimatedImage => inspect_animated(item),
        MediaKind::Video => probe_video(item, caps),
    }
}

/// Opens a media item, retrying transient failures up to `attempts` times.
///
/// A transient error that outlives the retries is reported as corrupt so the
/// caller drops the item instead of looping on it.
pub fn open_with_retry(
    item: &MediaItem,
    caps: &Capabilities,
    attempts: u32,
    delay: Duration,
) -> Result<OpenedMedia, MediaError> {
    let mut attempt = 1;
    loop {
        match open_media(item, caps) {
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!(
                    "Attempt {}/{} to open {} failed: {}",
                    attempt,
                    attempts,
                    item.path().format_for_log(),
                    e
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(MediaError::Transient(msg)) => {
                return Err(MediaError::Corrupt(format!(
                    "gave up after {} attempts: {}",
                    attempt, msg
                )));
            }
            other => return other,
        }
    }
}
