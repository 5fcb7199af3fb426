//! UI module for handling user interactions and UI updates.
//!
//! Threading model:
//! - `slint::spawn_local`: dialogs and anything whose result touches the display state
//! - `async_std::task::spawn_blocking`: file opening, folder scans and sidecar reads awaited from the UI thread
//! - `rayon::spawn`: neighbour preloading, fire-and-forget
//! - `slint::Timer`: animation ticks, resize debounce and viewport rechecks

pub mod handlers;
pub mod keymap;
pub mod media_display;
mod state_helpers;

pub use handlers::setup_handlers;
pub use media_display::Viewer;
