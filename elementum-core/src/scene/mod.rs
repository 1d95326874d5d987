//! Retained-mode scene graph.
//!
//! Sub-modules:
//!   element     : one node with its identity, box, visibility, bindings and visual
//!   render_list : ordered collection defining paint order and hit priority
//!   paint       : the immediate-mode drawing surface elements paint into

pub mod element;
pub mod paint;
pub mod render_list;

pub use element::{Callback, DrawFn, Element, ElementKey, EventArgs, EventKind, Visual};
pub use paint::Painter;
pub use render_list::RenderList;
