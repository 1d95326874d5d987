//! A single scene node.
//!
//! Elements own no children. Composite widgets are several sibling elements
//! pushed into the same `RenderList`; the builders in `crate::ui` produce them
//! as a `Vec<Element>`.

use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::context::UiContext;
use crate::events::MouseButton;
use crate::geometry::{Bounds, Rgba, Vec2};
use crate::layout::{self, Align, BUTTON_PADDING};
use crate::mode::UiMode;
use crate::scene::paint::Painter;

const BUTTON_FILL: Rgba = Rgba::from_hex(0x2b2b2b);
const BUTTON_EDGE: Rgba = Rgba::from_hex(0x7a7a7a);
const TEXT_COLOR: Rgba = Rgba::WHITE;

/// Opaque identity assigned at construction. Survives reordering; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey(Uuid);

impl ElementKey {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Enter,
    Exit,
    Down,
}

impl EventKind {
    fn slot(self) -> usize {
        match self {
            EventKind::Enter => 0,
            EventKind::Exit => 1,
            EventKind::Down => 2,
        }
    }
}

/// What a callback learns about the event that fired it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventArgs {
    pub target: ElementKey,
    pub kind: EventKind,
    /// Set for `Down` only.
    pub button: Option<MouseButton>,
    /// Pointer position of the sample that caused the event. `None` for
    /// `Leave` and for events fired through `UiContext::trigger`.
    pub position: Option<Vec2>,
}

pub type Callback = Rc<dyn Fn(&mut UiContext<'_>, EventArgs)>;

/// Custom draw routine: painter, element origin, current UI mode.
pub type DrawFn = Rc<dyn Fn(&mut dyn Painter, Vec2, &UiMode)>;

#[derive(Clone, Default)]
pub enum Visual {
    /// Hit region only, nothing painted.
    #[default]
    None,
    Text {
        text: String,
        scale: f32,
        align: Align,
        /// Point the text is aligned against; kept so `set_text` can re-measure.
        anchor: Vec2,
    },
    Button {
        label: String,
        scale: f32,
    },
    Custom(DrawFn),
}

impl fmt::Debug for Visual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visual::None => f.write_str("None"),
            Visual::Text { text, .. } => f.debug_tuple("Text").field(text).finish(),
            Visual::Button { label, .. } => f.debug_tuple("Button").field(label).finish(),
            Visual::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub struct Element {
    key: ElementKey,
    id: Option<String>,
    pub bounds: Bounds,
    pub visible: bool,
    /// Highlight (selected tool, category or element).
    pub color: Option<Rgba>,
    pub visual: Visual,
    bindings: [Option<Callback>; 3],
}

impl Element {
    /// Invisible hit region, used for flyout bounding boxes.
    pub fn region(bounds: Bounds) -> Self {
        Self {
            key: ElementKey::fresh(),
            id: None,
            bounds,
            visible: true,
            color: None,
            visual: Visual::None,
            bindings: [None, None, None],
        }
    }

    pub fn text(text: impl Into<String>, anchor: Vec2, scale: f32, align: Align) -> Self {
        let text = text.into();
        let bounds = layout::text_bounds(&text, scale, anchor, align);
        let mut el = Self::region(bounds);
        el.visual = Visual::Text {
            text,
            scale,
            align,
            anchor,
        };
        el
    }

    pub fn button(label: impl Into<String>, origin: Vec2, scale: f32) -> Self {
        let label = label.into();
        let (w, h) = layout::button_size(&label, scale);
        let mut el = Self::region(Bounds::from_origin_size(origin, w, h));
        el.visual = Visual::Button { label, scale };
        el
    }

    pub fn custom(bounds: Bounds, draw: impl Fn(&mut dyn Painter, Vec2, &UiMode) + 'static) -> Self {
        let mut el = Self::region(bounds);
        el.visual = Visual::Custom(Rc::new(draw));
        el
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    /// Binds `f` to `kind`, replacing any previous binding.
    pub fn on(mut self, kind: EventKind, f: impl Fn(&mut UiContext<'_>, EventArgs) + 'static) -> Self {
        self.bindings[kind.slot()] = Some(Rc::new(f));
        self
    }

    pub fn key(&self) -> ElementKey {
        self.key
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn binding(&self, kind: EventKind) -> Option<Callback> {
        self.bindings[kind.slot()].clone()
    }

    pub fn set_binding(&mut self, kind: EventKind, f: Option<Callback>) {
        self.bindings[kind.slot()] = f;
    }

    /// Clickable elements show the hand cursor.
    pub fn is_interactive(&self) -> bool {
        self.bindings[EventKind::Down.slot()].is_some()
    }

    /// Replaces the text of a text or button element and re-measures its box.
    /// Text keeps its anchor; buttons keep their origin.
    pub fn set_text(&mut self, new_text: impl Into<String>) {
        let new_text = new_text.into();
        match &mut self.visual {
            Visual::Text {
                text,
                scale,
                align,
                anchor,
            } => {
                self.bounds = layout::text_bounds(&new_text, *scale, *anchor, *align);
                *text = new_text;
            }
            Visual::Button { label, scale } => {
                let (w, h) = layout::button_size(&new_text, *scale);
                self.bounds = Bounds::from_origin_size(self.bounds.origin(), w, h);
                *label = new_text;
            }
            Visual::None | Visual::Custom(_) => {}
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.visual {
            Visual::Text { text, .. } => Some(text),
            Visual::Button { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn draw(&self, painter: &mut dyn Painter, mode: &UiMode) {
        let origin = self.bounds.origin();
        match &self.visual {
            Visual::None => {}
            Visual::Text { text, scale, .. } => {
                painter.text(text, origin, *scale, self.color.unwrap_or(TEXT_COLOR));
            }
            Visual::Button { label, scale } => {
                painter.fill_rect(self.bounds, BUTTON_FILL);
                let edge = self.color.unwrap_or(BUTTON_EDGE);
                painter.stroke_rect(self.bounds, (*scale).max(1.0), edge);
                let pad = BUTTON_PADDING * scale;
                painter.text(label, origin.offset(pad, pad), *scale, self.color.unwrap_or(TEXT_COLOR));
            }
            Visual::Custom(f) => f(painter, origin, mode),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("visible", &self.visible)
            .field("visual", &self.visual)
            .field("enter", &self.bindings[0].is_some())
            .field("exit", &self.bindings[1].is_some())
            .field("down", &self.bindings[2].is_some())
            .finish()
    }
}
