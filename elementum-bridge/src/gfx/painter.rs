use elementum_core::{Bounds, Painter, Rgba, Vec2};

use super::rects::RectPipeline;
use super::text::TextEngine;

/// Routes scene paint calls into this frame's rect and text queues.
pub struct ScenePainter<'a> {
    pub rects: &'a mut RectPipeline,
    pub text: &'a mut TextEngine,
}

impl Painter for ScenePainter<'_> {
    fn fill_rect(&mut self, bounds: Bounds, color: Rgba) {
        self.rects.fill(bounds, color);
    }

    fn stroke_rect(&mut self, bounds: Bounds, width: f32, color: Rgba) {
        self.rects.outline(bounds, width, color);
    }

    fn text(&mut self, text: &str, origin: Vec2, scale: f32, color: Rgba) {
        self.text.push(text, origin, scale, color);
    }
}
