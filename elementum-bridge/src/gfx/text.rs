//! Glyphon text for widget labels.
//!
//! Labels are queued per frame with their top-left origin and scene scale;
//! one glyph cell of the scene's layout maps to `GLYPH_HEIGHT * scale`
//! pixels of monospace text.

use elementum_core::layout::GLYPH_HEIGHT;
use elementum_core::{Rgba, Vec2};
use glyphon::{
    Attrs, Buffer as GlyphonBuffer, Cache, Color as GColor, Family, FontSystem, Metrics,
    Resolution, Shaping, SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};
use wgpu::{Device, MultisampleState, Queue, RenderPass, TextureFormat};

struct Label {
    text: String,
    origin: Vec2,
    scale: f32,
    color: Rgba,
}

fn to_glyphon(c: Rgba) -> GColor {
    let [r, g, b, a] = c.to_rgba8();
    GColor::rgba(r, g, b, a)
}

pub struct TextEngine {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    labels: Vec<Label>,
}

impl TextEngine {
    pub fn new(device: &Device, queue: &Queue, format: TextureFormat) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let renderer = TextRenderer::new(&mut atlas, device, MultisampleState::default(), None);

        Self {
            font_system,
            swash_cache,
            viewport,
            atlas,
            renderer,
            labels: Vec::new(),
        }
    }

    pub fn push(&mut self, text: &str, origin: Vec2, scale: f32, color: Rgba) {
        if text.is_empty() {
            return;
        }
        self.labels.push(Label {
            text: text.to_string(),
            origin,
            scale,
            color,
        });
    }

    /// Shapes and uploads every queued label. Must run before the pass that
    /// calls `render`.
    pub fn prepare(&mut self, device: &Device, queue: &Queue, viewport: [u32; 2]) {
        self.viewport.update(
            queue,
            Resolution {
                width: viewport[0],
                height: viewport[1],
            },
        );

        let mut buffers: Vec<GlyphonBuffer> = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            let size = GLYPH_HEIGHT * label.scale;
            let mut buffer = GlyphonBuffer::new(&mut self.font_system, Metrics::new(size, size));
            buffer.set_size(&mut self.font_system, None, None);
            let attrs = Attrs::new().family(Family::Monospace).color(to_glyphon(label.color));
            buffer.set_text(&mut self.font_system, &label.text, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(&mut self.font_system, false);
            buffers.push(buffer);
        }

        let bounds = TextBounds {
            left: 0,
            top: 0,
            right: viewport[0] as i32,
            bottom: viewport[1] as i32,
        };
        let areas = self.labels.iter().zip(&buffers).map(|(label, buffer)| TextArea {
            buffer,
            left: label.origin.x,
            top: label.origin.y,
            scale: 1.0,
            bounds,
            default_color: to_glyphon(label.color),
            custom_glyphs: &[],
        });

        if let Err(e) = self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.swash_cache,
        ) {
            tracing::warn!("text prepare failed: {e:?}");
        }
        self.labels.clear();
    }

    pub fn render(&self, pass: &mut RenderPass<'_>) {
        if let Err(e) = self.renderer.render(&self.atlas, &self.viewport, pass) {
            tracing::warn!("text render failed: {e:?}");
        }
    }

    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
