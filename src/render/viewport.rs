use crate::config::MIN_VIEWPORT_EDGE;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

/// Size of the display area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both edges are large enough to draw into.
    pub fn is_usable(&self) -> bool {
        self.width >= MIN_VIEWPORT_EDGE && self.height >= MIN_VIEWPORT_EDGE
    }

    /// Size of a `width`x`height` picture shrunk to fit, keeping its aspect
    /// ratio. Pictures that already fit are left alone.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 || (width <= self.width && height <= self.height) {
            return (width, height);
        }
        let scale = f64::min(
            self.width as f64 / width as f64,
            self.height as f64 / height as f64,
        );
        let w = ((width as f64 * scale).round() as u32).max(1).min(self.width.max(1));
        let h = ((height as f64 * scale).round() as u32).max(1).min(self.height.max(1));
        (w, h)
    }
}

/// Shrinks an RGBA frame to fit the viewport with Lanczos resampling.
pub fn scale_rgba(frame: &RgbaImage, viewport: Viewport) -> RgbaImage {
    let (w, h) = viewport.fit(frame.width(), frame.height());
    if (w, h) == frame.dimensions() {
        frame.clone()
    } else {
        imageops::resize(frame, w, h, FilterType::Lanczos3)
    }
}

/// Shrinks a decoded still to fit the viewport with Lanczos resampling.
pub fn scale_image(image: &DynamicImage, viewport: Viewport) -> RgbaImage {
    let (w, h) = viewport.fit(image.width(), image.height());
    if (w, h) == (image.width(), image.height()) {
        image.to_rgba8()
    } else {
        image.resize_exact(w, h, FilterType::Lanczos3).into_rgba8()
    }
}
