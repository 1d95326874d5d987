//! Screen layout and text metrics.
//!
//! Strategy:
//! - Canvas is a square, centred in the space left over after the margins
//!   reserved for the tool strip (left), category row (top) and credits
//!   (bottom).
//! - Every widget size is expressed in glyph cells times the UI scale factor.

use crate::geometry::{Bounds, Vec2};

/// Glyph cell at scale 1.0, in pixels.
pub const GLYPH_WIDTH: f32 = 6.0;
pub const GLYPH_HEIGHT: f32 = 9.0;

/// Inner padding of a button, in pixels at scale 1.0.
pub const BUTTON_PADDING: f32 = 2.0;

/// Pixels per canvas size unit. A canvas of `n` units is `75 * n` square.
pub const CANVAS_UNIT: u32 = 75;

/// Viewport width below which the UI shrinks.
const NARROW_VIEWPORT: f32 = 620.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

pub fn measure_text(text: &str, scale: f32) -> (f32, f32) {
    (
        text.chars().count() as f32 * GLYPH_WIDTH * scale,
        GLYPH_HEIGHT * scale,
    )
}

/// Box of a text run whose `anchor` sits on the left edge, the middle, or the
/// right edge depending on `align`.
pub fn text_bounds(text: &str, scale: f32, anchor: Vec2, align: Align) -> Bounds {
    let (w, h) = measure_text(text, scale);
    let left = match align {
        Align::Left => anchor.x,
        Align::Center => anchor.x - w / 2.0,
        Align::Right => anchor.x - w,
    };
    Bounds::from_origin_size(Vec2::new(left, anchor.y), w, h)
}

pub fn button_size(label: &str, scale: f32) -> (f32, f32) {
    let (w, h) = measure_text(label, scale);
    let pad = BUTTON_PADDING * scale;
    (w + pad * 2.0, h + pad * 2.0)
}

pub fn canvas_pixels(units: u32) -> u32 {
    units * CANVAS_UNIT
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub viewport: Vec2,
    /// Where the simulation framebuffer is drawn on screen.
    pub canvas: Bounds,
    pub scale: f32,
}

impl Layout {
    pub fn compute(viewport_w: f32, viewport_h: f32) -> Self {
        let scale = if viewport_w < NARROW_VIEWPORT {
            (viewport_w / NARROW_VIEWPORT).clamp(0.1, 1.5)
        } else {
            2.0
        };

        let margin_left = 70.0 * scale;
        let margin_top = 20.0 * scale;
        let margin_bottom = 16.0 * scale;
        let margin_right = 8.0 * scale;

        let avail_w = (viewport_w - margin_left - margin_right).max(1.0);
        let avail_h = (viewport_h - margin_top - margin_bottom).max(1.0);
        let side = avail_w.min(avail_h);

        let left = margin_left + (avail_w - side) / 2.0;
        let top = margin_top + (avail_h - side) / 2.0;

        Self {
            viewport: Vec2::new(viewport_w, viewport_h),
            canvas: Bounds::from_origin_size(Vec2::new(left, top), side, side),
            scale,
        }
    }

    /// Centre of the canvas, where modal menus are laid out.
    pub fn center(&self) -> Vec2 {
        self.canvas.center()
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::compute(1280.0, 800.0)
    }
}
