//! Drawing surface for the scene graph.
//!
//! Keeps wgpu out of the element logic. The window shell implements this on
//! top of its quad and text pipelines; tests implement it with a recorder.

use crate::geometry::{Bounds, Rgba, Vec2};

pub trait Painter {
    fn fill_rect(&mut self, bounds: Bounds, color: Rgba);

    /// Outline drawn inside `bounds`, `width` pixels thick.
    fn stroke_rect(&mut self, bounds: Bounds, width: f32, color: Rgba);

    /// `origin` is the top-left corner of the first glyph cell.
    fn text(&mut self, text: &str, origin: Vec2, scale: f32, color: Rgba);
}

/// One recorded paint call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill(Bounds, Rgba),
    Stroke(Bounds, f32, Rgba),
    Text(String, Vec2, f32, Rgba),
}

/// A painter that only records. Used by headless runs and tests to check
/// paint order.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub ops: Vec<PaintOp>,
}

impl RecordingPainter {
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text(t, ..) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, bounds: Bounds, color: Rgba) {
        self.ops.push(PaintOp::Fill(bounds, color));
    }

    fn stroke_rect(&mut self, bounds: Bounds, width: f32, color: Rgba) {
        self.ops.push(PaintOp::Stroke(bounds, width, color));
    }

    fn text(&mut self, text: &str, origin: Vec2, scale: f32, color: Rgba) {
        self.ops
            .push(PaintOp::Text(text.to_string(), origin, scale, color));
    }
}
