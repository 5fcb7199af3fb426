use crate::ui::Viewer;
use log::info;

/// Shows the one-time capability notice and opens the folder given on the
/// command line, if any.
pub fn configure_startup(viewer: &Viewer) {
    viewer.notify(None);

    if let Some(folder) = viewer.settings().initial_folder.clone() {
        info!("Opening startup folder {}", folder.display());
        viewer.open_folder(folder);
    }
}
