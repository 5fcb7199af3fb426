//! Fixtures shared by unit tests.

use crate::animation::FrameSource;
use crate::animation::source::{FrameIter, FrameStream, RawFrame};
use crate::capabilities::{VideoBackend, VideoSurface};
use crate::error::MediaError;
use crate::render::Viewport;
use crate::sidecar::TagStore;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

pub fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

/// Encodes a GIF whose frame `i` is filled with a distinct colour.
pub fn gif_bytes(frames: usize, width: u32, height: u32, delay_ms: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite).unwrap();
        for i in 0..frames {
            let shade = (i * 40 % 250) as u8;
            let image = RgbaImage::from_pixel(width, height, Rgba([shade, 255 - shade, 0, 255]));
            let delay = Delay::from_numer_denom_ms(delay_ms, 1);
            encoder
                .encode_frame(Frame::from_parts(image, 0, 0, delay))
                .unwrap();
        }
    }
    bytes
}

pub fn write_gif(path: &Path, frames: usize, width: u32, height: u32, delay_ms: u32) {
    std::fs::write(path, gif_bytes(frames, width, height, delay_ms)).unwrap();
}

/// In-memory frame source: frame `i` is 40x20 with red channel `i`.
///
/// Records the thread every frame was decoded on.
pub struct SyntheticFrames {
    count: usize,
    fail_at: Option<usize>,
    frame_cost: Duration,
    decodes: Arc<Mutex<Vec<ThreadId>>>,
}

impl SyntheticFrames {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            fail_at: None,
            frame_cost: Duration::ZERO,
            decodes: Arc::default(),
        }
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn with_frame_cost(mut self, cost: Duration) -> Self {
        self.frame_cost = cost;
        self
    }

    /// Frames decoded so far across every pass.
    pub fn decoded(&self) -> usize {
        self.decodes.lock().unwrap().len()
    }

    pub fn decoded_on(&self, thread: ThreadId) -> usize {
        self.decodes
            .lock()
            .unwrap()
            .iter()
            .filter(|id| **id == thread)
            .count()
    }
}

impl FrameSource for SyntheticFrames {
    fn frames(&self) -> Result<FrameIter, MediaError> {
        Ok(Box::new(SyntheticStream {
            next: 0,
            count: self.count,
            fail_at: self.fail_at,
            cost: self.frame_cost,
            decodes: self.decodes.clone(),
        }))
    }
}

struct SyntheticStream {
    next: usize,
    count: usize,
    fail_at: Option<usize>,
    cost: Duration,
    decodes: Arc<Mutex<Vec<ThreadId>>>,
}

impl Iterator for SyntheticStream {
    type Item = Result<RawFrame, MediaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let i = self.next;
        self.next += 1;
        if !self.cost.is_zero() {
            thread::sleep(self.cost);
        }
        self.decodes.lock().unwrap().push(thread::current().id());
        if Some(i) == self.fail_at {
            return Some(Err(MediaError::Corrupt(format!("frame {} is damaged", i))));
        }
        Some(Ok(RawFrame {
            image: RgbaImage::from_pixel(40, 20, Rgba([i as u8, 0, 0, 255])),
            delay: Duration::from_millis(30),
        }))
    }
}

impl FrameStream for SyntheticStream {
    fn has_next(&mut self) -> Result<bool, MediaError> {
        Ok(self.next < self.count)
    }
}

/// Video backend that fails `probe` with a transient error a few times.
#[derive(Default)]
pub struct FakeVideoBackend {
    transient_failures: usize,
    pub probes: AtomicUsize,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl FakeVideoBackend {
    pub fn failing_first(transient_failures: usize) -> Self {
        Self {
            transient_failures,
            ..Self::default()
        }
    }
}

impl VideoBackend for FakeVideoBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn probe(&self, _path: &Path) -> Result<Duration, MediaError> {
        let attempt = self.probes.fetch_add(1, Ordering::SeqCst);
        if attempt < self.transient_failures {
            Err(MediaError::Transient("file is locked".to_string()))
        } else {
            Ok(Duration::from_secs(12))
        }
    }

    fn open(&self, path: &Path, viewport: Viewport) -> Result<Box<dyn VideoSurface>, MediaError> {
        self.log.lock().unwrap().push(format!(
            "open {} {}x{}",
            path.display(),
            viewport.width,
            viewport.height
        ));
        Ok(Box::new(FakeSurface {
            log: self.log.clone(),
        }))
    }
}

pub struct FakeSurface {
    log: Arc<Mutex<Vec<String>>>,
}

impl VideoSurface for FakeSurface {
    fn toggle_pause(&mut self) {
        self.log.lock().unwrap().push("pause".to_string());
    }

    fn seek(&mut self, delta_secs: f64) {
        self.log.lock().unwrap().push(format!("seek {}", delta_secs));
    }

    fn adjust_volume(&mut self, delta: i32) {
        self.log.lock().unwrap().push(format!("volume {}", delta));
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log
            .lock()
            .unwrap()
            .push(format!("resize {}x{}", viewport.width, viewport.height));
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().push("stop".to_string());
    }
}

/// Tag store kept in memory, with switchable write failures.
#[derive(Default)]
pub struct MemoryTagStore {
    pub tags: Mutex<HashMap<PathBuf, Vec<String>>>,
    pub fail_writes: std::sync::atomic::AtomicBool,
}

impl MemoryTagStore {
    pub fn with(entries: &[(&str, &[&str])]) -> Self {
        let store = Self::default();
        {
            let mut tags = store.tags.lock().unwrap();
            for (path, values) in entries {
                tags.insert(
                    PathBuf::from(path),
                    values.iter().map(|v| v.to_string()).collect(),
                );
            }
        }
        store
    }

    pub fn get(&self, path: &str) -> Option<Vec<String>> {
        self.tags.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl TagStore for MemoryTagStore {
    fn load(&self, media: &Path) -> Vec<String> {
        self.tags
            .lock()
            .unwrap()
            .get(media)
            .cloned()
            .unwrap_or_default()
    }

    fn save(&self, media: &Path, tags: &[String]) -> crate::error::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(crate::error::AppError::Sidecar {
                path: media.to_path_buf(),
                message: "disk full".to_string(),
            });
        }
        self.tags
            .lock()
            .unwrap()
            .insert(media.to_path_buf(), tags.to_vec());
        Ok(())
    }
}
