//! Helper functions to set groups of ViewerState properties together.

use image::RgbaImage;
use log::error;
use slint::{ComponentHandle, Rgba8Pixel, SharedPixelBuffer};

/// Shows a frame on the canvas, or clears it.
pub fn set_frame(ui: &crate::AppWindow, frame: Option<&RgbaImage>) {
    let image = match frame {
        Some(frame) => slint::Image::from_rgba8(SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
            frame.as_raw(),
            frame.width(),
            frame.height(),
        )),
        None => slint::Image::default(),
    };
    ui.global::<crate::ViewerState>().set_frame(image);
}

/// Sets the status line and tag summary at once.
pub fn set_item_info(ui: &crate::AppWindow, status: &str, tag_summary: &str) {
    let viewer_state = ui.global::<crate::ViewerState>();
    viewer_state.set_status_text(status.into());
    viewer_state.set_tag_summary(tag_summary.into());
}

pub fn set_tag_summary(ui: &crate::AppWindow, tag_summary: &str) {
    ui.global::<crate::ViewerState>()
        .set_tag_summary(tag_summary.into());
}

/// Sets an error message in the UI with a prefix.
///
/// Logs the error and updates the ViewerState error-message property.
pub fn set_error_with_prefix(ui: &crate::AppWindow, prefix: &str, error: String) {
    let error_message = format!("{}: {}", prefix, error);
    error!("{}", error_message);
    ui.global::<crate::ViewerState>()
        .set_error_message(error_message.into());
}

pub fn clear_error(ui: &crate::AppWindow) {
    ui.global::<crate::ViewerState>()
        .set_error_message("".into());
}

pub fn set_notice(ui: &crate::AppWindow, notice: &str) {
    ui.global::<crate::ViewerState>().set_notice(notice.into());
}

pub fn set_video_active(ui: &crate::AppWindow, active: bool) {
    ui.global::<crate::ViewerState>().set_video_active(active);
}
