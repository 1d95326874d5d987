//! Application state and command execution.
//!
//! The controller owns the scene, the pointer handler, the UI mode, the host
//! link and the transfer state. Widget callbacks only queue `Command`s; the
//! controller runs them after each dispatch. Anything slow (module load,
//! uploads, file reads) runs on the tokio runtime and comes back as a
//! `Completion` through a bounded channel that is drained once per frame.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use elementum_core::layout::canvas_pixels;
use elementum_core::scene::Painter;
use elementum_core::ui::{self, panel, share_dialog};
use elementum_core::{
    Catalog, Command, CursorHint, EventHandler, EventKind, Layout, MouseButton, PointerSample,
    RenderList, UiContext, UiMode,
};
use elementum_host::{HostEngine, HostError, HostLink};
use elementum_share::files::{self, DEFAULT_FILE_NAME};
use elementum_share::location::share_path;
use elementum_share::{LoadOutcome, ShareBackend, ShareError, StateTransfer};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::module::ModuleSource;
use crate::platform::Platform;

/// Max completions waiting for the UI thread.
pub const COMPLETION_CAPACITY: usize = 64;

pub const IMPORT_REJECTED_MESSAGE: &str = "That file is not a valid Elementum state!";

/// Result of background work, delivered exactly once to the UI thread.
pub enum Completion {
    HostReady {
        engine: Box<dyn HostEngine + Send>,
        /// Snapshot fetched for the share id given at startup, if any.
        shared: Option<Vec<u8>>,
    },
    HostFailed(HostError),
    ShareFinished(Result<String, ShareError>),
    FileRead(io::Result<Vec<u8>>),
    FileWritten(io::Result<PathBuf>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Loading,
    Running,
    Failed,
}

pub struct Controller<P: Platform> {
    pub(crate) scene: RenderList,
    pub(crate) events: EventHandler,
    pub(crate) mode: UiMode,
    pub(crate) layout: Layout,
    pub(crate) host: HostLink,
    pub(crate) pending_steps: u32,
    catalog: Catalog,
    transfer: StateTransfer,
    backend: Arc<dyn ShareBackend>,
    share_url: String,
    share_link: Option<String>,
    canvas_units: u32,
    boot: BootState,
    platform: P,
    rt: Handle,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
}

impl<P: Platform> Controller<P> {
    pub fn new(
        config: &Config,
        catalog: Catalog,
        backend: Arc<dyn ShareBackend>,
        platform: P,
        rt: Handle,
    ) -> Self {
        let (tx, rx) = mpsc::channel(COMPLETION_CAPACITY);
        let layout = Layout::default();
        let mut mode = UiMode::default();
        if let Some(entry) = catalog.default_entry() {
            mode.brush = entry.id;
            mode.selected_element = entry.name.clone();
            mode.selected_category = entry.category.clone();
        }

        let mut ctl = Self {
            scene: RenderList::new(),
            events: EventHandler::new(),
            mode,
            layout,
            host: HostLink::new(),
            pending_steps: 0,
            catalog,
            transfer: StateTransfer::new(),
            backend,
            share_url: config.share_url.trim_end_matches('/').to_string(),
            share_link: None,
            canvas_units: config.canvas_units,
            boot: BootState::Loading,
            platform,
            rt,
            tx,
            rx,
        };
        ctl.rebuild();
        ctl
    }

    // ════════════════════════════════════════════════════════════════
    // Boot
    // ════════════════════════════════════════════════════════════════

    /// Loads the module in the background. If `share_id` is set, the shared
    /// snapshot is fetched once the module is up and imported on attach.
    pub fn boot(&mut self, source: Arc<dyn ModuleSource>, share_id: Option<&str>) {
        let share_id = share_id.map(str::to_string);
        if let Some(id) = &share_id {
            self.set_location(share_path(id));
        }

        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let completion = match source.load().await {
                Ok(engine) => {
                    let shared = match share_id {
                        Some(id) => match backend.fetch(&id).await {
                            Ok(found) => found,
                            Err(e) => {
                                warn!(error = %e, %id, "shared snapshot fetch failed");
                                None
                            }
                        },
                        None => None,
                    };
                    Completion::HostReady { engine, shared }
                }
                Err(e) => Completion::HostFailed(e),
            };
            if tx.send(completion).await.is_err() {
                debug!("controller gone before boot finished");
            }
        });
    }

    fn attach_host(&mut self, engine: Box<dyn HostEngine + Send>, shared: Option<Vec<u8>>) {
        self.host.attach(engine);
        let seed: [u32; 6] = rand::random();
        if let Err(e) = self.host.engine().and_then(|h| h.seed(seed)) {
            error!(error = %e, "host seed failed");
            self.boot = BootState::Failed;
            return;
        }
        self.boot = BootState::Running;

        let restored = match shared.filter(|b| !b.is_empty()) {
            Some(bytes) => match self.transfer.import_state(&mut self.host, bytes) {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "shared snapshot import failed");
                    false
                }
            },
            None => false,
        };

        if restored {
            if let Err(e) = self.host.sync_canvas() {
                warn!(error = %e, "canvas sync after shared import failed");
            }
            // A shared scene opens paused so the viewer sees it as it was.
            if !self.mode.paused {
                self.with_ui(|ctx| {
                    ctx.trigger_by_id(&panel::control_id("pause"), EventKind::Down, Some(MouseButton::Left));
                });
            }
        } else if let Err(e) = self.host.set_canvas_size(canvas_pixels(self.canvas_units), canvas_pixels(self.canvas_units)) {
            warn!(error = %e, "initial canvas size rejected");
        }
        info!(restored, "host ready");
    }

    pub fn boot_state(&self) -> BootState {
        self.boot
    }

    // ════════════════════════════════════════════════════════════════
    // Input & Commands
    // ════════════════════════════════════════════════════════════════

    pub fn push_input(&mut self, sample: PointerSample) {
        self.events.push(sample);
    }

    /// Runs every queued pointer sample, then the commands they emitted.
    pub fn dispatch_input(&mut self) -> usize {
        let mut commands = Vec::new();
        let n = {
            let mut ctx = UiContext::new(
                &mut self.scene,
                &mut self.mode,
                &self.layout,
                &self.catalog,
                &mut commands,
            );
            self.events.tick(&mut ctx)
        };
        for cmd in commands {
            self.execute(cmd);
        }
        n
    }

    fn with_ui<R>(&mut self, f: impl FnOnce(&mut UiContext<'_>) -> R) -> R {
        let mut commands = Vec::new();
        let out = {
            let mut ctx = UiContext::new(
                &mut self.scene,
                &mut self.mode,
                &self.layout,
                &self.catalog,
                &mut commands,
            );
            f(&mut ctx)
        };
        for cmd in commands {
            self.execute(cmd);
        }
        out
    }

    pub fn execute(&mut self, cmd: Command) {
        debug!(?cmd, "command");
        match self.try_execute(cmd) {
            Ok(()) => {}
            Err(HostError::NotReady) => debug!("command ignored, host not ready"),
            Err(e) => warn!(error = %e, "command failed"),
        }
    }

    fn try_execute(&mut self, cmd: Command) -> Result<(), HostError> {
        match cmd {
            Command::Step => {
                self.host.engine()?;
                self.pending_steps += 1;
            }
            Command::ResetScene => self.host.engine()?.change_scene(0)?,
            Command::Resize { units } => {
                let px = canvas_pixels(units);
                self.host.set_canvas_size(px, px)?;
            }
            Command::SaveState => {
                self.transfer.save(&mut self.host)?;
            }
            Command::LoadState => match self.transfer.load(&mut self.host)? {
                LoadOutcome::Restored => {
                    self.host.sync_canvas()?;
                }
                LoadOutcome::Reset => debug!("nothing saved, scene reset"),
                LoadOutcome::Rejected => warn!("saved snapshot no longer accepted"),
            },
            Command::ExportState => {
                let snapshot = self.transfer.save(&mut self.host)?;
                if let Some(path) = self.platform.pick_save(DEFAULT_FILE_NAME) {
                    let tx = self.tx.clone();
                    self.rt.spawn(async move {
                        let written = files::write_snapshot(&path, &snapshot).await;
                        let _ = tx.send(Completion::FileWritten(written)).await;
                    });
                }
            }
            Command::ImportState => {
                if let Some(path) = self.platform.pick_open() {
                    let tx = self.tx.clone();
                    self.rt.spawn(async move {
                        let read = files::read_snapshot(&path).await;
                        let _ = tx.send(Completion::FileRead(read)).await;
                    });
                }
            }
            Command::ShareState => {
                if let Some(snapshot) = self.transfer.begin_share(&mut self.host)? {
                    self.mode.share_busy = true;
                    let backend = self.backend.clone();
                    let tx = self.tx.clone();
                    self.rt.spawn(async move {
                        let outcome = backend.upload(snapshot).await;
                        let _ = tx.send(Completion::ShareFinished(outcome)).await;
                    });
                }
            }
            Command::CopyLink => match &self.share_link {
                Some(link) => {
                    if !self.platform.copy_text(link) {
                        warn!("clipboard unavailable");
                    }
                }
                None => debug!("no share link to copy"),
            },
            Command::ShareDialogClosed => {
                self.transfer.share_dialog_closed();
                self.mode.share_busy = false;
            }
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════
    // Completions
    // ════════════════════════════════════════════════════════════════

    /// Applies everything that finished since the last frame.
    pub fn poll_completions(&mut self) -> usize {
        let mut n = 0;
        while let Ok(done) = self.rx.try_recv() {
            self.complete(done);
            n += 1;
        }
        n
    }

    /// Waits for the next completion and applies it. For drivers without a
    /// frame clock.
    pub async fn recv_completion(&mut self) -> bool {
        match self.rx.recv().await {
            Some(done) => {
                self.complete(done);
                true
            }
            None => false,
        }
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::HostReady { engine, shared } => self.attach_host(engine, shared),
            Completion::HostFailed(e) => {
                error!(error = %e, "host module failed to load");
                self.boot = BootState::Failed;
                self.platform.alert(&format!("The simulation could not be started: {e}"));
            }
            Completion::ShareFinished(outcome) => {
                self.transfer.finish_share(&outcome);
                match outcome {
                    Ok(id) => self.show_share_dialog(&id),
                    Err(e) => {
                        self.mode.share_busy = false;
                        self.platform.alert(e.user_message());
                    }
                }
            }
            Completion::FileRead(Ok(bytes)) => match self.transfer.import_state(&mut self.host, bytes) {
                Ok(true) => {
                    if let Err(e) = self.host.sync_canvas() {
                        warn!(error = %e, "canvas sync after import failed");
                    }
                }
                Ok(false) => self.platform.alert(IMPORT_REJECTED_MESSAGE),
                Err(e) => warn!(error = %e, "import failed"),
            },
            Completion::FileRead(Err(e)) => {
                warn!(error = %e, "snapshot file unreadable");
                self.platform.alert(&format!("Could not read the file: {e}"));
            }
            Completion::FileWritten(Ok(path)) => debug!(path = %path.display(), "export done"),
            Completion::FileWritten(Err(e)) => {
                warn!(error = %e, "snapshot file not written");
                self.platform.alert(&format!("Could not write the file: {e}"));
            }
        }
    }

    fn show_share_dialog(&mut self, id: &str) {
        let path = share_path(id);
        self.share_link = Some(format!("{}{}", self.share_url, path));
        self.set_location(path);
        self.mode.share_dialog_open = true;
        self.scene.extend(share_dialog::build(&self.layout));
    }

    fn set_location(&mut self, path: String) {
        self.platform.set_location(&path);
        self.mode.location = path;
    }

    // ════════════════════════════════════════════════════════════════
    // Layout & Drawing
    // ════════════════════════════════════════════════════════════════

    /// Recomputes the layout for a new window size and rebuilds the scene.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.layout = Layout::compute(width, height);
        self.rebuild();
    }

    /// Replaces the whole scene. The resize menu is transient and does not
    /// survive; an open share dialog is built again.
    pub fn rebuild(&mut self) {
        self.mode.resize_menu_open = false;
        self.events.reset_hover();
        self.scene.clear();
        self.scene
            .extend(ui::build_scene(&self.layout, &self.catalog, &self.mode));
    }

    /// Raises the peak when the host reports a larger one and refreshes the
    /// info label.
    pub(crate) fn record_peak(&mut self, value: f32) {
        if self.mode.record_peak(value) {
            let text = panel::info_text(self.mode.peak_intensity);
            if let Some(el) = self.scene.get_mut_by_id(panel::INFO_ID) {
                el.set_text(text);
            }
        }
    }

    pub fn paint(&self, painter: &mut dyn Painter) {
        self.scene.paint(painter, &self.mode);
    }

    pub fn cursor(&self) -> CursorHint {
        self.events.cursor(&self.scene)
    }

    // ════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════

    pub fn scene(&self) -> &RenderList {
        &self.scene
    }

    pub fn mode(&self) -> &UiMode {
        &self.mode
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn host(&mut self) -> &mut HostLink {
        &mut self.host
    }

    pub fn transfer(&self) -> &StateTransfer {
        &self.transfer
    }

    pub fn share_link(&self) -> Option<&str> {
        self.share_link.as_deref()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
