pub mod catalog;
pub mod context;
pub mod events;
pub mod geometry;
pub mod layout;
pub mod mode;
pub mod scene;
pub mod ui;

// Re-export the types every consumer touches so callers can write
// `elementum_core::RenderList` instead of walking the module tree.
pub use catalog::Catalog;
pub use context::UiContext;
pub use events::{EventHandler, MouseButton, PointerInput, PointerSample, PointerSource};
pub use geometry::{Bounds, Rgba, Vec2};
pub use layout::Layout;
pub use mode::{Command, ToolKind, UiMode};
pub use scene::{Element, ElementKey, EventKind, Painter, RenderList};

/// Which cursor the window should show for the element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
}
