//! The one object the UI uses to reach the host.
//!
//! Until a module is attached every request fails with `NotReady`. After
//! attach, reads go through the bridge, which revalidates views first.

use tracing::{debug, info};

use crate::bridge::{MemoryBridge, ViewDescriptor, ViewHandle};
use crate::engine::HostEngine;
use crate::error::HostError;

#[derive(Default)]
pub struct HostLink {
    engine: Option<Box<dyn HostEngine>>,
    bridge: MemoryBridge,
}

impl std::fmt::Debug for HostLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostLink")
            .field("ready", &self.engine.is_some())
            .field("bridge", &self.bridge)
            .finish()
    }
}

impl HostLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a loaded module. Any views of a previous module are dropped.
    pub fn attach(&mut self, engine: Box<dyn HostEngine>) {
        info!("host module attached");
        self.engine = Some(engine);
        self.bridge = MemoryBridge::new();
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&mut self) -> Result<&mut dyn HostEngine, HostError> {
        match self.engine.as_deref_mut() {
            Some(engine) => Ok(engine),
            None => Err(HostError::NotReady),
        }
    }

    pub fn bridge(&self) -> &MemoryBridge {
        &self.bridge
    }

    pub fn view(&mut self, desc: ViewDescriptor) -> Result<ViewHandle, HostError> {
        let engine = self.engine.as_deref_mut().ok_or(HostError::NotReady)?;
        self.bridge.view(engine.memory(), desc)
    }

    pub fn bytes(&mut self, handle: ViewHandle) -> Result<&[u8], HostError> {
        let engine = self.engine.as_deref_mut().ok_or(HostError::NotReady)?;
        self.bridge.bytes(engine.memory(), handle)
    }

    pub fn read<T: bytemuck::Pod>(&mut self, handle: ViewHandle) -> Result<T, HostError> {
        let engine = self.engine.as_deref_mut().ok_or(HostError::NotReady)?;
        self.bridge.read(engine.memory(), handle)
    }

    /// Per-frame check; rebuilds all views if the memory length moved.
    pub fn revalidate(&mut self) -> Result<bool, HostError> {
        let engine = self.engine.as_deref_mut().ok_or(HostError::NotReady)?;
        self.bridge.revalidate(engine.memory())
    }

    /// Sets the canvas size and rebuilds the framebuffer view for it.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> Result<(), HostError> {
        let engine = self.engine.as_deref_mut().ok_or(HostError::NotReady)?;
        engine.set_size(width, height)?;
        let (w, h) = engine.canvas_size()?;
        self.bridge.bind_framebuffer(engine.memory(), w, h)?;
        info!(width = w, height = h, "canvas resized");
        Ok(())
    }

    /// Rebinds the framebuffer if the host reports a different canvas size,
    /// e.g. after importing a snapshot taken at another size. Run before
    /// `revalidate`: the old framebuffer view may not fit the moved buffer.
    pub fn sync_canvas(&mut self) -> Result<bool, HostError> {
        let engine = self.engine.as_deref_mut().ok_or(HostError::NotReady)?;
        let size = engine.canvas_size()?;
        if self.bridge.framebuffer_size() == Some(size) {
            return Ok(false);
        }
        debug!(width = size.0, height = size.1, "host canvas size changed");
        self.bridge.bind_framebuffer(engine.memory(), size.0, size.1)?;
        Ok(true)
    }

    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        self.bridge.framebuffer_size()
    }

    /// RGBA pixels of the current frame with their width and height.
    pub fn framebuffer(&mut self) -> Result<(&[u8], u32, u32), HostError> {
        let engine = self.engine.as_deref_mut().ok_or(HostError::NotReady)?;
        let (w, h) = self.bridge.framebuffer_size().ok_or(HostError::UnknownView)?;
        let pixels = self.bridge.framebuffer_pixels(engine.memory())?;
        Ok((pixels, w, h))
    }
}
