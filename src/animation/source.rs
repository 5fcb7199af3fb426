//! Frame sources feeding the animated frame loader.

use crate::config::DEFAULT_FRAME_DELAY;
use crate::error::MediaError;
use crate::media::AnimatedSource;
use gif::DisposalMethod;
use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// One fully composited frame at source resolution.
pub struct RawFrame {
    pub image: RgbaImage,
    pub delay: Duration,
}

/// Frames of one decode pass, in order.
///
/// Owned by one thread at a time: the loader primes from it on the UI
/// thread and then moves it into the background worker.
pub trait FrameStream: Iterator<Item = Result<RawFrame, MediaError>> + Send {
    /// Whether another frame follows, without decoding its pixels.
    fn has_next(&mut self) -> Result<bool, MediaError>;
}

pub type FrameIter = Box<dyn FrameStream>;

/// Something that can be decoded into frames, possibly several times.
pub trait FrameSource {
    /// Starts a decode pass from the first frame.
    fn frames(&self) -> Result<FrameIter, MediaError>;
}

/// Animated GIF decoded from in-memory bytes.
pub struct GifFrameSource {
    bytes: Arc<[u8]>,
}

impl GifFrameSource {
    pub fn new(bytes: Arc<[u8]>) -> Self {
        Self { bytes }
    }
}

impl From<&AnimatedSource> for GifFrameSource {
    fn from(source: &AnimatedSource) -> Self {
        Self::new(source.bytes.clone())
    }
}

impl FrameSource for GifFrameSource {
    fn frames(&self) -> Result<FrameIter, MediaError> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let decoder = options.read_info(Cursor::new(self.bytes.clone()))?;
        let canvas = RgbaImage::new(u32::from(decoder.width()), u32::from(decoder.height()));
        Ok(Box::new(GifFrames {
            decoder,
            canvas,
            pending: None,
        }))
    }
}

/// Placement and timing of a frame whose header has been read.
#[derive(Debug, Clone, Copy)]
struct FrameHeader {
    left: u32,
    top: u32,
    width: u32,
    delay_cs: u16,
    dispose: DisposalMethod,
}

impl From<&gif::Frame<'_>> for FrameHeader {
    fn from(frame: &gif::Frame<'_>) -> Self {
        Self {
            left: u32::from(frame.left),
            top: u32::from(frame.top),
            width: u32::from(frame.width),
            delay_cs: frame.delay,
            dispose: frame.dispose,
        }
    }
}

/// Delay of a GIF frame given in centiseconds; zero means "unspecified".
fn frame_delay(delay_cs: u16) -> Duration {
    if delay_cs == 0 {
        DEFAULT_FRAME_DELAY
    } else {
        Duration::from_millis(u64::from(delay_cs) * 10)
    }
}

/// Streaming GIF decoder compositing each frame onto the logical screen.
struct GifFrames {
    decoder: gif::Decoder<Cursor<Arc<[u8]>>>,
    canvas: RgbaImage,
    /// Header read by `has_next` whose pixels have not been decoded yet.
    pending: Option<FrameHeader>,
}

impl GifFrames {
    fn read_header(&mut self) -> Result<Option<FrameHeader>, MediaError> {
        if let Some(header) = self.pending.take() {
            return Ok(Some(header));
        }
        Ok(self.decoder.next_frame_info()?.map(FrameHeader::from))
    }

    fn decode(&mut self, header: FrameHeader) -> Result<RawFrame, MediaError> {
        let mut pixels = vec![0u8; self.decoder.buffer_size()];
        self.decoder.read_into_buffer(&mut pixels)?;

        let restore = (header.dispose == DisposalMethod::Previous).then(|| self.canvas.clone());
        self.paint(&header, &pixels, None);
        let image = self.canvas.clone();

        match header.dispose {
            DisposalMethod::Background => self.paint(&header, &pixels, Some(Rgba([0, 0, 0, 0]))),
            DisposalMethod::Previous => {
                if let Some(previous) = restore {
                    self.canvas = previous;
                }
            }
            DisposalMethod::Any | DisposalMethod::Keep => {}
        }

        Ok(RawFrame {
            image,
            delay: frame_delay(header.delay_cs),
        })
    }

    /// Draws the opaque pixels of a frame, or clears its area with `fill`.
    /// Parts outside the logical screen are clipped.
    fn paint(&mut self, header: &FrameHeader, pixels: &[u8], fill: Option<Rgba<u8>>) {
        if header.width == 0 {
            return;
        }
        let (screen_w, screen_h) = self.canvas.dimensions();
        for (i, px) in pixels.chunks_exact(4).enumerate() {
            let x = header.left + i as u32 % header.width;
            let y = header.top + i as u32 / header.width;
            if x >= screen_w || y >= screen_h {
                continue;
            }
            match fill {
                Some(color) => self.canvas.put_pixel(x, y, color),
                None if px[3] != 0 => self.canvas.put_pixel(x, y, Rgba([px[0], px[1], px[2], px[3]])),
                None => {}
            }
        }
    }
}

impl Iterator for GifFrames {
    type Item = Result<RawFrame, MediaError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_header() {
            Ok(Some(header)) => Some(self.decode(header)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl FrameStream for GifFrames {
    fn has_next(&mut self) -> Result<bool, MediaError> {
        if self.pending.is_none() {
            self.pending = self.read_header()?;
        }
        Ok(self.pending.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::gif_bytes;

    #[test]
    fn gif_frames_are_decoded_in_order_with_delay() {
        let source = GifFrameSource::new(gif_bytes(4, 12, 6, 40).into());
        let frames: Vec<_> = source.frames().unwrap().collect::<Result<_, _>>().unwrap();

        assert_eq!(frames.len(), 4);
        assert!(frames.iter().all(|f| f.image.dimensions() == (12, 6)));
        assert_eq!(frames[0].delay, Duration::from_millis(40));
        assert_eq!(*frames[1].image.get_pixel(3, 3), Rgba([40, 215, 0, 255]));
    }

    #[test]
    fn zero_delay_falls_back_to_default() {
        let source = GifFrameSource::new(gif_bytes(2, 4, 4, 0).into());
        let first = source.frames().unwrap().next().unwrap().unwrap();
        assert_eq!(first.delay, DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn each_call_restarts_from_the_first_frame() {
        let source = GifFrameSource::new(gif_bytes(3, 4, 4, 50).into());
        assert_eq!(source.frames().unwrap().count(), 3);
        assert_eq!(source.frames().unwrap().count(), 3);
    }

    #[test]
    fn has_next_peeks_without_consuming() {
        let source = GifFrameSource::new(gif_bytes(2, 4, 4, 50).into());
        let mut frames = source.frames().unwrap();

        assert!(frames.next().unwrap().is_ok());
        assert!(frames.has_next().unwrap());
        assert!(frames.has_next().unwrap());
        assert!(frames.next().unwrap().is_ok());
        assert!(!frames.has_next().unwrap());
        assert!(frames.next().is_none());
    }

    #[test]
    fn garbage_bytes_fail_to_open() {
        let source = GifFrameSource::new(Arc::from(&b"GIF89a-nope"[..]));
        assert!(source.frames().is_err());
    }
}
