//! winit application handler.
//!
//! Every `RedrawRequested` runs one `FrameLoop` iteration, draws the scene
//! and asks for the next redraw, so the loop follows the display refresh.
//! Pointer events are only queued here; they are dispatched at the start of
//! the next frame.

use std::sync::Arc;

use elementum_core::{Catalog, CursorHint, Rgba};
use elementum_share::HttpShareClient;
use elementum_share::location::id_from_arg;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorIcon, Window, WindowId};

use super::events::PointerTracker;
use super::platform::NativePlatform;
use crate::config::Config;
use crate::controller::Controller;
use crate::frame_loop::FrameLoop;
use crate::gfx::GpuState;
use crate::module::{ModuleSource, WasmFile};

const BACKGROUND: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
const BASE_SIZE: (f64, f64) = (1280.0, 800.0);

pub struct ElementumApp {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    ctl: Controller<NativePlatform>,
    frames: FrameLoop,
    pointer: PointerTracker,
    cursor: CursorHint,
    /// Taken on first resume.
    pending_boot: Option<(Arc<dyn ModuleSource>, Option<String>)>,
    window_scale: f64,
}

impl ElementumApp {
    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) else {
            return;
        };

        self.frames.run_frame(&mut self.ctl, &mut *gpu);

        let ctl = &self.ctl;
        if let Err(e) = gpu.render_frame(BACKGROUND, ctl.layout().canvas, |p| ctl.paint(p)) {
            tracing::error!("render failed: {:#}", e);
        }

        let cursor = ctl.cursor();
        if cursor != self.cursor {
            self.cursor = cursor;
            window.set_cursor(match cursor {
                CursorHint::Pointer => CursorIcon::Pointer,
                CursorHint::Default => CursorIcon::Default,
            });
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for ElementumApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Elementum")
            .with_inner_size(LogicalSize::new(
                BASE_SIZE.0 * self.window_scale,
                BASE_SIZE.1 * self.window_scale,
            ));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("window creation failed: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        match GpuState::new(window.clone()) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("GPU init failed: {:#}", e);
                event_loop.exit();
                return;
            }
        }
        tracing::info!("window + GPU initialized");

        let size = window.inner_size();
        self.ctl.platform_mut().attach_window(window.clone());
        self.ctl.set_viewport(size.width as f32, size.height as f32);
        self.window = Some(window);

        if let Some((source, share_id)) = self.pending_boot.take() {
            self.ctl.boot(source, share_id.as_deref());
        }
        self.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                if size.width > 0 && size.height > 0 {
                    self.ctl.set_viewport(size.width as f32, size.height as f32);
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            other => {
                for sample in self.pointer.map(&other) {
                    self.ctl.push_input(sample);
                }
            }
        }
    }
}

/// Runs the application until the window closes.
pub fn run(config: Config, catalog: Catalog, location: Option<String>) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let share_id = match location.as_deref() {
        Some(arg) => {
            let id = id_from_arg(arg).map(str::to_string);
            if id.is_none() {
                tracing::warn!(location = arg, "location carries no share id");
            }
            id
        }
        None => None,
    };

    let backend = Arc::new(HttpShareClient::new(&config.share_url));
    let source: Arc<dyn ModuleSource> = Arc::new(WasmFile::new(config.module_path.clone()));
    let ctl = Controller::new(&config, catalog, backend, NativePlatform::new(), rt.handle().clone());

    let mut app = ElementumApp {
        window: None,
        gpu: None,
        ctl,
        frames: FrameLoop::new(),
        pointer: PointerTracker::default(),
        cursor: CursorHint::Default,
        pending_boot: Some((source, share_id)),
        window_scale: config.window_scale,
    };

    event_loop.run_app(&mut app)?;
    Ok(())
}
