//! wgpu device and surface, and the per-frame pass.
//!
//! One render pass per frame: the simulation canvas first, then widget
//! rects, then text on top.

use std::sync::Arc;

use anyhow::Context;
use elementum_core::{Bounds, Rgba};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, SurfaceTexture, TextureFormat};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::canvas::CanvasPipeline;
use super::painter::ScenePainter;
use super::rects::RectPipeline;
use super::text::TextEngine;
use crate::frame_loop::FrameSink;

pub struct GpuState {
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    canvas: CanvasPipeline,
    rects: RectPipeline,
    text: TextEngine,
}

async fn open_device(
    instance: &wgpu::Instance,
    surface: &Surface<'static>,
) -> anyhow::Result<(wgpu::Adapter, Device, Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .context("no GPU adapter can present to this window")?;

    let info = adapter.get_info();
    tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("elementum-device"),
            ..Default::default()
        })
        .await
        .context("GPU device request failed")?;
    Ok((adapter, device, queue))
}

/// First sRGB format the surface offers, else whatever it lists first.
fn surface_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(TextureFormat::is_srgb)
        .or_else(|| formats.first().copied())
}

impl GpuState {
    /// Blocks until the adapter and device are ready.
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;
        let (adapter, device, queue) = pollster::block_on(open_device(&instance, &surface))?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface_format(&caps.formats).context("surface reports no formats")?;
        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or_default(),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            canvas: CanvasPipeline::new(&device, format),
            rects: RectPipeline::new(&device, format),
            text: TextEngine::new(&device, &queue, format),
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain image, or None when this frame should be skipped.
    fn acquire(&mut self) -> anyhow::Result<Option<SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => anyhow::bail!("GPU out of memory"),
            Err(e) => {
                tracing::warn!(error = ?e, "surface unavailable, frame skipped");
                Ok(None)
            }
        }
    }

    /// Draws the last blitted canvas inside `canvas_rect`, then whatever
    /// `paint` queues. Returns Ok(false) when the frame was skipped.
    pub fn render_frame(
        &mut self,
        background: Rgba,
        canvas_rect: Bounds,
        paint: impl FnOnce(&mut ScenePainter<'_>),
    ) -> anyhow::Result<bool> {
        let Some(frame) = self.acquire()? else {
            return Ok(false);
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let viewport = [self.config.width, self.config.height];

        paint(&mut ScenePainter {
            rects: &mut self.rects,
            text: &mut self.text,
        });
        self.rects.prepare(&self.device, &self.queue, viewport);
        self.text.prepare(&self.device, &self.queue, viewport);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame") });
        {
            let [r, g, b, a] = [background.r, background.g, background.b, background.a].map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.canvas.render(&mut pass, &self.queue, viewport, canvas_rect);
            self.rects.render(&mut pass);
            self.text.render(&mut pass);
        }
        self.queue.submit([encoder.finish()]);
        frame.present();

        self.rects.clear();
        self.text.trim();
        Ok(true)
    }
}

impl FrameSink for GpuState {
    fn blit(&mut self, pixels: &[u8], width: u32, height: u32) {
        self.canvas.upload(&self.device, &self.queue, pixels, width, height);
    }
}
