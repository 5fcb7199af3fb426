//! Decides what is attached to the display area.
//!
//! Exactly one [`Representation`] is live at a time. Attaching a new one
//! always tears the previous one down first: animations stop their worker,
//! video surfaces stop playback, stills release their pixels.

pub mod debounce;
pub mod viewport;

pub use debounce::ResizeDebouncer;
pub use viewport::{Viewport, scale_image, scale_rgba};

use crate::animation::{FrameLoader, GifFrameSource};
use crate::capabilities::{Capabilities, VideoSurface};
use crate::error::MediaError;
use crate::media::OpenedMedia;
use image::RgbaImage;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationKind {
    Empty,
    Still,
    Animated,
    Video,
}

/// The visual currently attached to the display area.
pub enum Representation {
    Empty,
    Still { frame: Arc<RgbaImage> },
    Animated(FrameLoader),
    Video {
        path: PathBuf,
        surface: Box<dyn VideoSurface>,
    },
}

impl Representation {
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Representation::Empty => RepresentationKind::Empty,
            Representation::Still { .. } => RepresentationKind::Still,
            Representation::Animated(_) => RepresentationKind::Animated,
            Representation::Video { .. } => RepresentationKind::Video,
        }
    }

    /// Picture to put on the canvas right now, if this representation draws
    /// one itself.
    pub fn frame(&self) -> Option<Arc<RgbaImage>> {
        match self {
            Representation::Still { frame } => Some(frame.clone()),
            Representation::Animated(loader) => loader.current_frame(),
            Representation::Empty | Representation::Video { .. } => None,
        }
    }

    /// Releases whatever is attached and leaves `Empty` behind.
    pub fn teardown(&mut self) {
        match std::mem::replace(self, Representation::Empty) {
            Representation::Animated(mut loader) => loader.destroy(),
            Representation::Video { mut surface, .. } => surface.stop(),
            Representation::Still { .. } | Representation::Empty => {}
        }
    }
}

#[derive(Debug)]
pub enum RenderOutcome {
    /// The viewport is too small; nothing was changed.
    Deferred,
    Attached(RepresentationKind),
    /// The media could not be attached; the previous representation is gone.
    Failed(MediaError),
}

pub struct Reconciler {
    current: Representation,
    generation: u64,
    capabilities: Capabilities,
}

impl Reconciler {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            current: Representation::Empty,
            generation: 0,
            capabilities,
        }
    }

    pub fn current(&self) -> &Representation {
        &self.current
    }

    /// Changes every time a representation is attached or cleared. Animation
    /// timers compare it to know whether they still drive the live loader.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Draws `media` into `viewport`, replacing the current representation.
    pub fn render(&mut self, media: &OpenedMedia, viewport: Viewport) -> RenderOutcome {
        if !viewport.is_usable() {
            debug!("Deferring render into {}x{}", viewport.width, viewport.height);
            return RenderOutcome::Deferred;
        }

        // Same video again (a resize): keep playing, just follow the size.
        if let (Representation::Video { path, surface }, OpenedMedia::Video { path: next, .. }) =
            (&mut self.current, media)
        {
            if *path == *next {
                surface.resize(viewport);
                return RenderOutcome::Attached(RepresentationKind::Video);
            }
        }

        self.current.teardown();
        self.generation += 1;

        let next = match media {
            OpenedMedia::Still(image) => Representation::Still {
                frame: Arc::new(scale_image(image, viewport)),
            },
            OpenedMedia::Animated(source) => {
                let loader = FrameLoader::new(&GifFrameSource::from(source), viewport);
                debug!(
                    "Animation primed with {} frames ({:?}, worker: {})",
                    loader.frame_count(),
                    loader.state(),
                    loader.worker_spawned()
                );
                Representation::Animated(loader)
            }
            OpenedMedia::Video { path, .. } => {
                let Some(backend) = self.capabilities.video() else {
                    return RenderOutcome::Failed(MediaError::Unsupported(
                        "no video backend available".to_string(),
                    ));
                };
                match backend.open(path, viewport) {
                    Ok(surface) => Representation::Video {
                        path: path.clone(),
                        surface,
                    },
                    Err(e) => return RenderOutcome::Failed(e),
                }
            }
        };

        let kind = next.kind();
        debug!("Attached {:?} at {}x{}", kind, viewport.width, viewport.height);
        self.current = next;
        RenderOutcome::Attached(kind)
    }

    /// Tears down whatever is attached.
    pub fn clear(&mut self) {
        self.current.teardown();
        self.generation += 1;
    }

    /// Advances the animation driven by the timer started at `generation`.
    pub fn tick_animation(&mut self, generation: u64) -> Option<Arc<RgbaImage>> {
        if generation != self.generation {
            return None;
        }
        match &mut self.current {
            Representation::Animated(loader) => loader.tick(),
            _ => None,
        }
    }

    pub fn animation_delay(&self) -> Option<Duration> {
        match &self.current {
            Representation::Animated(loader) => Some(loader.delay()),
            _ => None,
        }
    }

    /// The attached video, if any.
    pub fn video_mut(&mut self) -> Option<&mut (dyn VideoSurface + 'static)> {
        match &mut self.current {
            Representation::Video { surface, .. } => Some(surface.as_mut()),
            _ => None,
        }
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        self.current.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::LoaderState;
    use crate::media::AnimatedSource;
    use crate::test_support::{FakeVideoBackend, gif_bytes};
    use image::DynamicImage;

    fn still(w: u32, h: u32) -> OpenedMedia {
        OpenedMedia::Still(Arc::new(DynamicImage::new_rgba8(w, h)))
    }

    fn animation(frames: usize) -> OpenedMedia {
        OpenedMedia::Animated(AnimatedSource {
            bytes: gif_bytes(frames, 16, 16, 20).into(),
            width: 16,
            height: 16,
        })
    }

    fn video(path: &str) -> OpenedMedia {
        OpenedMedia::Video {
            path: PathBuf::from(path),
            duration: Duration::from_secs(5),
        }
    }

    #[test]
    fn still_is_scaled_to_viewport() {
        let mut reconciler = Reconciler::new(Capabilities::default());
        let outcome = reconciler.render(&still(800, 400), Viewport::new(200, 200));

        assert!(matches!(outcome, RenderOutcome::Attached(RepresentationKind::Still)));
        let frame = reconciler.current().frame().unwrap();
        assert_eq!(frame.dimensions(), (200, 100));
    }

    #[test]
    fn tiny_viewport_defers_and_keeps_current() {
        let mut reconciler = Reconciler::new(Capabilities::default());
        reconciler.render(&still(50, 50), Viewport::new(100, 100));
        let generation = reconciler.generation();

        let outcome = reconciler.render(&still(80, 80), Viewport::new(4, 300));
        assert!(matches!(outcome, RenderOutcome::Deferred));
        assert_eq!(reconciler.current().kind(), RepresentationKind::Still);
        assert_eq!(reconciler.generation(), generation);
    }

    #[test]
    fn animation_attaches_a_primed_loader() {
        let mut reconciler = Reconciler::new(Capabilities::default());
        reconciler.render(&animation(2), Viewport::new(100, 100));

        match reconciler.current() {
            Representation::Animated(loader) => {
                assert_eq!(loader.state(), LoaderState::Ready);
                assert_eq!(loader.frame_count(), 2);
            }
            _ => panic!("expected an animation"),
        }
        assert_eq!(reconciler.animation_delay(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn stale_animation_timer_stops_ticking() {
        let mut reconciler = Reconciler::new(Capabilities::default());
        reconciler.render(&animation(3), Viewport::new(100, 100));
        let old = reconciler.generation();
        assert!(reconciler.tick_animation(old).is_some());

        reconciler.render(&still(10, 10), Viewport::new(100, 100));
        assert!(reconciler.tick_animation(old).is_none());
        assert!(reconciler.tick_animation(reconciler.generation()).is_none());
    }

    #[test]
    fn switching_away_from_video_stops_playback() {
        let backend = Arc::new(FakeVideoBackend::default());
        let log = backend.log.clone();
        let mut reconciler = Reconciler::new(Capabilities::with_video(backend));

        reconciler.render(&video("/v/a.mp4"), Viewport::new(320, 240));
        reconciler.render(&still(10, 10), Viewport::new(320, 240));

        let log = log.lock().unwrap();
        assert_eq!(log.as_slice(), &["open /v/a.mp4 320x240", "stop"]);
        assert_eq!(reconciler.current().kind(), RepresentationKind::Still);
    }

    #[test]
    fn resizing_same_video_keeps_surface() {
        let backend = Arc::new(FakeVideoBackend::default());
        let log = backend.log.clone();
        let mut reconciler = Reconciler::new(Capabilities::with_video(backend));

        reconciler.render(&video("/v/a.mp4"), Viewport::new(320, 240));
        reconciler.render(&video("/v/a.mp4"), Viewport::new(640, 480));

        assert_eq!(
            log.lock().unwrap().as_slice(),
            &["open /v/a.mp4 320x240", "resize 640x480"]
        );
    }

    #[test]
    fn video_without_backend_fails() {
        let mut reconciler = Reconciler::new(Capabilities::default());
        reconciler.render(&still(10, 10), Viewport::new(100, 100));

        let outcome = reconciler.render(&video("/v/a.mp4"), Viewport::new(100, 100));
        assert!(matches!(outcome, RenderOutcome::Failed(MediaError::Unsupported(_))));
        assert_eq!(reconciler.current().kind(), RepresentationKind::Empty);
    }

    #[test]
    fn clear_detaches_everything() {
        let mut reconciler = Reconciler::new(Capabilities::default());
        reconciler.render(&still(10, 10), Viewport::new(100, 100));
        reconciler.clear();
        assert_eq!(reconciler.current().kind(), RepresentationKind::Empty);
        assert!(reconciler.current().frame().is_none());
    }
}
