//! GPU rendering.
//!
//!   renderer : wgpu device/surface lifecycle, frame orchestration
//!   canvas   : simulation framebuffer texture
//!   rects    : instanced solid rectangles (widget fills, outlines)
//!   text     : glyphon labels
//!   painter  : scene `Painter` over rects + text

mod canvas;
mod painter;
mod rects;
mod renderer;
mod text;

pub use painter::ScenePainter;
pub use renderer::GpuState;
