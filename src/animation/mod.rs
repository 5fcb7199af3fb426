//! Incremental loader and player for multi-frame images.
//!
//! The first [`PRIMING_FRAMES`] frames are decoded on the calling (UI) thread
//! so something is on screen immediately. If the animation is longer, the same
//! decode pass moves to a single worker thread which sends the remaining
//! frames over a channel. The UI thread
//! drains the channel on every animation tick; the worker never touches UI
//! state.
//!
//! ```text
//! Priming ──(≤ N frames)──────────────────────────▶ Ready
//!    └──(more frames)──▶ BackgroundLoading ──(end / error)──▶ Ready
//! any state ──destroy()──▶ Destroyed
//! ```

pub mod source;

pub use source::{FrameSource, GifFrameSource};

use crate::config::{DEFAULT_FRAME_DELAY, PRIMING_FRAMES};
use crate::render::{Viewport, scale_rgba};
use image::RgbaImage;
use log::{debug, warn};
use source::{FrameIter, FrameStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Priming,
    BackgroundLoading,
    Ready,
    Destroyed,
}

enum LoaderEvent {
    Frame(Arc<RgbaImage>),
    Finished,
}

/// Decoded, pre-scaled frames of one animation plus its playback position.
pub struct FrameLoader {
    state: LoaderState,
    frames: Vec<Arc<RgbaImage>>,
    current: usize,
    delay: Duration,
    events: Option<Receiver<LoaderEvent>>,
    stop: Arc<AtomicBool>,
    worker_spawned: bool,
}

impl FrameLoader {
    /// Primes the first frames of `source` scaled to fit `bounds` and hands
    /// the rest of the same decode pass to a worker if more remain.
    pub fn new(source: &dyn FrameSource, bounds: Viewport) -> Self {
        let mut loader = Self {
            state: LoaderState::Priming,
            frames: Vec::new(),
            current: 0,
            delay: DEFAULT_FRAME_DELAY,
            events: None,
            stop: Arc::new(AtomicBool::new(false)),
            worker_spawned: false,
        };

        let mut frames = match source.frames() {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Animation could not be opened: {}", e);
                loader.state = LoaderState::Ready;
                return loader;
            }
        };

        let mut stream_ended = false;
        while loader.frames.len() < PRIMING_FRAMES {
            match frames.next() {
                Some(Ok(raw)) => {
                    if loader.frames.is_empty() {
                        loader.delay = raw.delay;
                    }
                    loader.frames.push(Arc::new(scale_rgba(&raw.image, bounds)));
                }
                Some(Err(e)) => {
                    debug!("Frame {} failed to decode: {}", loader.frames.len(), e);
                    stream_ended = true;
                    break;
                }
                None => {
                    stream_ended = true;
                    break;
                }
            }
        }

        if !stream_ended {
            stream_ended = match frames.has_next() {
                Ok(more) => !more,
                Err(e) => {
                    debug!("Frame {} failed to decode: {}", loader.frames.len(), e);
                    true
                }
            };
        }

        if stream_ended {
            debug!("Animation primed with {} frames", loader.frames.len());
            loader.state = LoaderState::Ready;
            return loader;
        }

        let (tx, rx) = mpsc::channel();
        let stop = loader.stop.clone();
        let spawned = thread::Builder::new()
            .name("frame-loader".to_string())
            .spawn(move || background_decode(frames, bounds, tx, stop));

        match spawned {
            Ok(_) => {
                loader.events = Some(rx);
                loader.worker_spawned = true;
                loader.state = LoaderState::BackgroundLoading;
            }
            Err(e) => {
                warn!("Failed to start frame loader thread: {}", e);
                loader.state = LoaderState::Ready;
            }
        }
        loader
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Delay between two animation ticks.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn worker_spawned(&self) -> bool {
        self.worker_spawned
    }

    /// Frame currently shown.
    pub fn current_frame(&self) -> Option<Arc<RgbaImage>> {
        self.frames.get(self.current).cloned()
    }

    /// Collects frames the worker produced since the last call.
    pub fn pump(&mut self) {
        let Some(events) = &self.events else {
            return;
        };

        let mut finished = false;
        loop {
            match events.try_recv() {
                Ok(LoaderEvent::Frame(frame)) => self.frames.push(frame),
                Ok(LoaderEvent::Finished) | Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if finished {
            debug!("Animation fully loaded: {} frames", self.frames.len());
            self.events = None;
            self.state = LoaderState::Ready;
        }
    }

    /// Advances to the next frame and returns it.
    ///
    /// Returns `None` once destroyed or while there is nothing to show; the
    /// driver stops scheduling ticks at that point.
    pub fn tick(&mut self) -> Option<Arc<RgbaImage>> {
        if self.state == LoaderState::Destroyed {
            return None;
        }
        self.pump();
        if self.frames.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.frames.len();
        self.current_frame()
    }

    /// Stops the worker and releases every frame. Does not wait for the
    /// worker; anything it decodes afterwards is dropped with the channel.
    pub fn destroy(&mut self) {
        if self.state == LoaderState::Destroyed {
            return;
        }
        self.stop.store(true, Ordering::Release);
        self.events = None;
        self.frames.clear();
        self.current = 0;
        self.state = LoaderState::Destroyed;
    }
}

impl Drop for FrameLoader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

fn background_decode(
    mut frames: FrameIter,
    bounds: Viewport,
    tx: Sender<LoaderEvent>,
    stop: Arc<AtomicBool>,
) {
    let mut decoded = 0usize;
    loop {
        if stop.load(Ordering::Acquire) {
            debug!("Background decode stopped after {} frames", decoded);
            return;
        }
        match frames.next() {
            Some(Ok(raw)) => {
                let frame = Arc::new(scale_rgba(&raw.image, bounds));
                if tx.send(LoaderEvent::Frame(frame)).is_err() {
                    return;
                }
                decoded += 1;
            }
            Some(Err(e)) => {
                debug!("Background decode ended on error: {}", e);
                break;
            }
            None => break,
        }
    }

    debug!("Background decode finished: {} more frames", decoded);
    let _ = tx.send(LoaderEvent::Finished);
}
