//! Media loading and display logic.
//!
//! Opening files and reading sidecars is blocking work and runs on
//! `async_std::task::spawn_blocking`, awaited from `slint::spawn_local` so the
//! result lands back on the UI thread together with the UI-owned display
//! state. Neighbour preloading is fire-and-forget on `rayon::spawn`.

use crate::capabilities::{Capabilities, VideoSurface};
use crate::config::{Settings, VIEWPORT_RECHECK_DELAY};
use crate::file_utils::PathExt;
use crate::media::{self, MediaCache, MediaItem, OpenedMedia};
use crate::render::{Reconciler, RenderOutcome, RepresentationKind, ResizeDebouncer, Viewport};
use crate::services::{
    BrokenItem, NavigationService, OpenOutcome, OpenedCurrent, SystemTrash, TaggingService,
    TrashService,
};
use crate::state::{AppState, LoadTicket, lock};
use crate::ui::state_helpers::{
    clear_error, set_error_with_prefix, set_frame, set_item_info, set_notice, set_tag_summary,
    set_video_active,
};
use async_std::task::spawn_blocking;
use log::{debug, error, info};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};
use std::cell::RefCell;
use std::future::Future;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// Display state owned by the UI thread.
struct Display {
    reconciler: Reconciler,
    debouncer: ResizeDebouncer,
    media: Option<(MediaItem, OpenedMedia)>,
    recheck_scheduled: bool,
}

/// Handle to everything the UI callbacks act on. Cheap to clone.
#[derive(Clone)]
pub struct Viewer {
    ui: slint::Weak<crate::AppWindow>,
    display: Rc<RefCell<Display>>,
    navigation: NavigationService,
    tagging: Rc<TaggingService>,
    trash: Rc<TrashService>,
    cache: Arc<Mutex<MediaCache>>,
    capabilities: Capabilities,
    tickets: LoadTicket,
    settings: Settings,
}

/// Notice line text: the session's capability notice, if any, followed by
/// `message`.
fn notice_text(capabilities: &Capabilities, message: Option<&str>) -> String {
    capabilities
        .unavailable_notice()
        .into_iter()
        .chain(message.map(str::to_string))
        .collect::<Vec<_>>()
        .join("\n")
}

fn spawn_ui_task(task: impl Future<Output = ()> + 'static) {
    if let Err(e) = slint::spawn_local(task) {
        error!("Failed to schedule UI task: {}", e);
    }
}

impl Viewer {
    pub fn new(ui: &crate::AppWindow, state: AppState) -> Self {
        let AppState {
            navigation,
            media_cache,
            tag_store,
            capabilities,
            settings,
            load_ticket,
        } = state;

        Self {
            ui: slint::ComponentHandle::as_weak(ui),
            display: Rc::new(RefCell::new(Display {
                reconciler: Reconciler::new(capabilities.clone()),
                debouncer: ResizeDebouncer::new(),
                media: None,
                recheck_scheduled: false,
            })),
            navigation: NavigationService::new(navigation.clone(), tag_store.clone()),
            tagging: Rc::new(TaggingService::new(navigation.clone(), tag_store)),
            trash: Rc::new(TrashService::new(navigation, Arc::new(SystemTrash))),
            cache: media_cache,
            capabilities,
            tickets: load_ticket,
            settings,
        }
    }

    fn with_ui(&self, f: impl FnOnce(&crate::AppWindow)) {
        if let Some(ui) = self.ui.upgrade() {
            f(&ui);
        }
    }

    /// Replaces the notice line, keeping the capability notice in front.
    pub fn notify(&self, message: Option<&str>) {
        let text = notice_text(&self.capabilities, message);
        self.with_ui(|ui| set_notice(ui, &text));
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Opens the current item in the background and displays it.
    pub fn reload(&self) {
        let ticket = self.tickets.issue();
        let viewer = self.clone();
        let navigation = self.navigation.clone();
        let cache = self.cache.clone();
        let caps = self.capabilities.clone();

        spawn_ui_task(async move {
            let outcome = spawn_blocking(move || {
                navigation.open_current(|item| media::open_cached(&cache, item, &caps))
            })
            .await;

            viewer.evict_broken(outcome.broken());
            if !viewer.tickets.is_current(ticket) {
                debug!("Ignoring superseded load #{}", ticket);
                return;
            }
            viewer.apply_outcome(outcome);
        });
    }

    fn apply_outcome(&self, outcome: OpenOutcome) {
        match outcome {
            OpenOutcome::Opened { current, broken } => {
                self.report_broken(&broken);
                self.show(current, broken.is_empty());
            }
            OpenOutcome::Exhausted { broken } => {
                self.report_broken(&broken);
                self.show_nothing();
            }
            OpenOutcome::Superseded { broken } => self.report_broken(&broken),
        }
    }

    /// Forgets cached decodes of items dropped as broken.
    fn evict_broken(&self, broken: &[BrokenItem]) {
        let mut cache = lock(&self.cache);
        for item in broken {
            cache.remove(&item.path);
        }
    }

    fn report_broken(&self, broken: &[BrokenItem]) {
        if let Some(last) = broken.last() {
            self.with_ui(|ui| {
                set_error_with_prefix(
                    ui,
                    "Failed to load media",
                    format!("{}: {}", last.path.format_for_log(), last.error),
                )
            });
        }
    }

    fn show(&self, current: OpenedCurrent, clear_errors: bool) {
        let status = self.navigation.position_label();
        let summary = current.tags.summary();
        if let Some((width, height)) = current.media.dimensions() {
            debug!("Showing {} ({}x{})", current.item.path().format_for_log(), width, height);
        }
        self.with_ui(|ui| {
            set_item_info(ui, &status, &summary);
            if clear_errors {
                clear_error(ui);
            }
        });

        self.display.borrow_mut().media = Some((current.item, current.media));
        self.render_current();
        self.preload_neighbours();
    }

    fn show_nothing(&self) {
        {
            let mut display = self.display.borrow_mut();
            display.media = None;
            display.reconciler.clear();
        }
        self.with_ui(|ui| {
            set_frame(ui, None);
            set_video_active(ui, false);
            set_item_info(ui, "No file loaded", "Tags: None");
        });
    }

    /// Re-renders the current media into the latest known viewport.
    pub fn render_current(&self) {
        let outcome = {
            let mut display = self.display.borrow_mut();
            let Some((_, media)) = display.media.clone() else {
                return;
            };
            let viewport = display.debouncer.latest().unwrap_or_default();
            display.reconciler.render(&media, viewport)
        };

        match outcome {
            RenderOutcome::Deferred => self.schedule_recheck(),
            RenderOutcome::Attached(kind) => {
                let frame = self.display.borrow().reconciler.current().frame();
                self.with_ui(|ui| {
                    set_frame(ui, frame.as_deref());
                    set_video_active(ui, kind == RepresentationKind::Video);
                });
                if kind == RepresentationKind::Animated {
                    self.start_animation();
                }
            }
            RenderOutcome::Failed(e) => {
                let item = self.display.borrow_mut().media.take().map(|(item, _)| item);
                self.with_ui(|ui| {
                    set_frame(ui, None);
                    set_video_active(ui, false);
                });
                let Some(item) = item else {
                    return;
                };
                self.with_ui(|ui| {
                    set_error_with_prefix(
                        ui,
                        "Failed to display media",
                        format!("{}: {}", item.path().format_for_log(), e),
                    )
                });
                lock(&self.cache).remove(item.path());
                if self.navigation.drop_broken(item.path()) {
                    self.reload();
                }
            }
        }
    }

    fn schedule_recheck(&self) {
        {
            let mut display = self.display.borrow_mut();
            if display.recheck_scheduled {
                return;
            }
            display.recheck_scheduled = true;
        }

        let viewer = self.clone();
        slint::Timer::single_shot(VIEWPORT_RECHECK_DELAY, move || {
            let usable = {
                let mut display = viewer.display.borrow_mut();
                display.recheck_scheduled = false;
                display.debouncer.latest().is_some_and(|v| v.is_usable())
            };
            if usable {
                viewer.render_current();
            } else {
                debug!("Viewport still too small, waiting for a resize");
            }
        });
    }

    fn start_animation(&self) {
        let generation = self.display.borrow().reconciler.generation();
        self.schedule_tick(generation);
    }

    fn schedule_tick(&self, generation: u64) {
        let Some(delay) = self.display.borrow().reconciler.animation_delay() else {
            return;
        };
        let viewer = self.clone();
        slint::Timer::single_shot(delay, move || {
            let frame = viewer
                .display
                .borrow_mut()
                .reconciler
                .tick_animation(generation);
            if let Some(frame) = frame {
                viewer.with_ui(|ui| set_frame(ui, Some(frame.as_ref())));
                viewer.schedule_tick(generation);
            }
        });
    }

    /// Records a new size of the display area and re-renders once the
    /// resizing has been quiet for the configured delay.
    pub fn viewport_changed(&self, width: f32, height: f32) {
        let viewport = Viewport::new(width.max(0.0).round() as u32, height.max(0.0).round() as u32);
        let Some(ticket) = self.display.borrow_mut().debouncer.notify(viewport) else {
            return;
        };

        let viewer = self.clone();
        slint::Timer::single_shot(self.settings.resize_delay, move || {
            let settled = viewer.display.borrow_mut().debouncer.settle(ticket);
            if let Some(viewport) = settled {
                debug!("Window resized to {}x{}", viewport.width, viewport.height);
                viewer.render_current();
            }
        });
    }

    fn preload_neighbours(&self) {
        for item in self.navigation.neighbours() {
            let cache = self.cache.clone();
            let caps = self.capabilities.clone();
            rayon::spawn(move || media::preload(&cache, &item, &caps));
        }
    }

    pub fn next(&self) {
        if self.navigation.next().is_ok() {
            self.reload();
        }
    }

    pub fn previous(&self) {
        if self.navigation.previous().is_ok() {
            self.reload();
        }
    }

    pub fn assign_score(&self, value: &str) {
        match self.tagging.assign_score(value) {
            Ok(update) => self.with_ui(|ui| {
                set_tag_summary(ui, &update.tags.summary());
                if let Some(e) = update.save_error {
                    set_error_with_prefix(ui, "Tags kept in memory only", e.to_string());
                }
            }),
            Err(e) => debug!("Score ignored: {}", e),
        }
    }

    pub fn seek_untagged(&self) {
        let viewer = self.clone();
        let navigation = self.navigation.clone();
        spawn_ui_task(async move {
            match spawn_blocking(move || navigation.seek_untagged()).await {
                Ok(item) => {
                    info!("First unscored item: {}", item.path().format_for_log());
                    viewer.reload();
                }
                Err(e) => debug!("Seek ignored: {}", e),
            }
        });
    }

    /// Shows the folder picker and loads the chosen folder.
    pub fn pick_folder(&self) {
        let viewer = self.clone();
        spawn_ui_task(async move {
            let Some(handle) = AsyncFileDialog::new().pick_folder().await else {
                debug!("Folder selection canceled");
                return;
            };
            viewer.load_folder(handle.path().to_path_buf()).await;
        });
    }

    pub fn open_folder(&self, dir: PathBuf) {
        let viewer = self.clone();
        spawn_ui_task(async move { viewer.load_folder(dir).await });
    }

    async fn load_folder(&self, dir: PathBuf) {
        info!("Opening folder {}", dir.format_for_log());
        let navigation = self.navigation.clone();
        let include_video = self.capabilities.video_available();
        let result = spawn_blocking(move || navigation.load_folder(&dir, include_video)).await;

        match result {
            Ok(0) => {
                self.tickets.issue();
                self.show_nothing();
                self.notify(Some("No supported media found in selected directory"));
            }
            Ok(count) => {
                debug!("Folder holds {} media files", count);
                self.notify(None);
                self.reload();
            }
            Err(e) => self.with_ui(|ui| set_error_with_prefix(ui, "Failed to open folder", e.to_string())),
        }
    }

    /// Asks for confirmation, then moves the current file to the trash.
    pub fn delete_current(&self) {
        let Some(item) = self.navigation.current_item() else {
            self.notify(Some("No media to delete."));
            return;
        };

        let viewer = self.clone();
        spawn_ui_task(async move {
            let answer = AsyncMessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title("Delete File")
                .set_description(format!(
                    "Are you sure you want to delete:\n{}\n(and its .json sidecar file, if any)?",
                    item.path().display()
                ))
                .set_buttons(MessageButtons::YesNo)
                .show()
                .await;
            if !matches!(answer, MessageDialogResult::Yes) {
                return;
            }
            if viewer.navigation.current_item().as_ref() != Some(&item) {
                viewer.notify(Some("Selection changed, nothing deleted."));
                return;
            }

            // Release the file (video playback, animation worker) before trashing it.
            viewer.display.borrow_mut().reconciler.clear();
            match viewer.trash.delete_current() {
                Ok(removed) => {
                    lock(&viewer.cache).remove(removed.path());
                    viewer.reload();
                }
                Err(e) => {
                    viewer.with_ui(|ui| set_error_with_prefix(ui, "Failed to delete file", e.to_string()));
                    viewer.render_current();
                }
            }
        });
    }

    /// Runs `f` on the playing video. Returns false when no video is attached.
    pub fn control_video(&self, f: impl FnOnce(&mut dyn VideoSurface)) -> bool {
        let mut display = self.display.borrow_mut();
        match display.reconciler.video_mut() {
            Some(surface) => {
                f(surface);
                true
            }
            None => false,
        }
    }
}
