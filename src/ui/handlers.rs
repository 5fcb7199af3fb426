//! Event handlers for UI callbacks.
//!
//! Sets up all Logic callbacks (open_folder, key_pressed, viewport_changed)
//! and routes key commands to the viewer.

use crate::state::AppState;
use crate::ui::keymap::{Command, command_for_key};
use crate::ui::media_display::Viewer;
use log::{debug, error};
use slint::ComponentHandle;

/// Sets up all UI event handlers for the application.
///
/// Returns the viewer the callbacks drive, for startup actions.
pub fn setup_handlers(ui: &crate::AppWindow, state: AppState) -> Viewer {
    let viewer = Viewer::new(ui, state);

    ui.global::<crate::Logic>().on_open_folder({
        let viewer = viewer.clone();
        move || viewer.pick_folder()
    });

    ui.global::<crate::Logic>().on_viewport_changed({
        let viewer = viewer.clone();
        move |width, height| viewer.viewport_changed(width, height)
    });

    ui.global::<crate::Logic>().on_key_pressed({
        let viewer = viewer.clone();
        move |text| match command_for_key(text.as_str()) {
            Some(command) => {
                execute(&viewer, command);
                true
            }
            None => false,
        }
    });

    viewer
}

fn execute(viewer: &Viewer, command: Command) {
    debug!("Command: {:?}", command);
    match command {
        Command::Previous => viewer.previous(),
        Command::Next => viewer.next(),
        Command::Score(value) => viewer.assign_score(&value),
        Command::Delete => viewer.delete_current(),
        Command::SeekUntagged => viewer.seek_untagged(),
        Command::OpenFolder => viewer.pick_folder(),
        Command::TogglePause => control_video(viewer, |surface| surface.toggle_pause()),
        Command::Seek(seconds) => control_video(viewer, |surface| surface.seek(seconds)),
        Command::Volume(delta) => control_video(viewer, |surface| surface.adjust_volume(delta)),
        Command::Quit => {
            if let Err(e) = slint::quit_event_loop() {
                error!("Failed to quit: {}", e);
            }
        }
    }
}

fn control_video(viewer: &Viewer, f: impl FnOnce(&mut dyn crate::capabilities::VideoSurface)) {
    if !viewer.control_video(f) {
        debug!("No video playing, playback key ignored");
    }
}
