//! Pointer dispatch.
//!
//! Samples are queued by the window as they arrive and drained once per
//! frame. Each sample is hit tested against the scene as it stands after the
//! previous sample's callbacks ran, so a menu opened by one click is
//! clickable by the next one in the same frame.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::UiContext;
use crate::geometry::Vec2;
use crate::scene::{Callback, ElementKey, EventArgs, EventKind, RenderList};
use crate::CursorHint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    pub fn slot(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Move(Vec2),
    Down(Vec2, MouseButton),
    Up(Vec2, MouseButton),
    /// Pointer left the window.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub input: PointerInput,
    pub source: PointerSource,
}

impl PointerSample {
    pub fn mouse(input: PointerInput) -> Self {
        Self {
            input,
            source: PointerSource::Mouse,
        }
    }

    pub fn touch(input: PointerInput) -> Self {
        Self {
            input,
            source: PointerSource::Touch,
        }
    }
}

#[derive(Debug, Default)]
pub struct EventHandler {
    /// Weak: only a key. If the element was removed meanwhile, its exit
    /// binding is never looked up.
    hovered: Option<ElementKey>,
    position: Option<Vec2>,
    queue: VecDeque<PointerSample>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: PointerSample) {
        self.queue.push_back(sample);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn hovered(&self) -> Option<ElementKey> {
        self.hovered
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Hand over anything clickable that is still under the pointer.
    pub fn cursor(&self, scene: &RenderList) -> CursorHint {
        match self.hovered.and_then(|k| scene.get(k)) {
            Some(el) if el.visible && el.is_interactive() => CursorHint::Pointer,
            _ => CursorHint::Default,
        }
    }

    /// Forgets the hovered element without firing its exit. Used when the
    /// whole scene is rebuilt.
    pub fn reset_hover(&mut self) {
        self.hovered = None;
    }

    /// Dispatches every queued sample in arrival order. Returns how many ran.
    pub fn tick(&mut self, ctx: &mut UiContext<'_>) -> usize {
        let mut n = 0;
        while let Some(sample) = self.queue.pop_front() {
            self.dispatch(ctx, sample);
            n += 1;
        }
        n
    }

    pub fn dispatch(&mut self, ctx: &mut UiContext<'_>, sample: PointerSample) {
        if sample.source == PointerSource::Touch && !ctx.mode.coarse_pointer {
            debug!("touch input seen, hover affordances off");
            ctx.mode.coarse_pointer = true;
        }

        let (hit, down) = match sample.input {
            PointerInput::Move(p) | PointerInput::Up(p, _) => {
                self.position = Some(p);
                (ctx.scene.hit_test(p), None)
            }
            PointerInput::Down(p, button) => {
                self.position = Some(p);
                (ctx.scene.hit_test(p), Some(button))
            }
            PointerInput::Leave => {
                self.position = None;
                (None, None)
            }
        };

        let position = self.position;

        // Capture every callback this sample needs before any of them runs.
        let mut plan: Vec<(Callback, EventArgs)> = Vec::with_capacity(3);
        let mut capture = |key: ElementKey, kind: EventKind, button| {
            if let Some(cb) = ctx.scene.get(key).and_then(|el| el.binding(kind)) {
                plan.push((
                    cb,
                    EventArgs {
                        target: key,
                        kind,
                        button,
                        position,
                    },
                ));
            }
        };

        if hit != self.hovered {
            if let Some(prev) = self.hovered {
                capture(prev, EventKind::Exit, None);
            }
            if let Some(next) = hit {
                capture(next, EventKind::Enter, None);
            }
            self.hovered = hit;
        }
        if let (Some(button), Some(target)) = (down, self.hovered) {
            capture(target, EventKind::Down, Some(button));
        }

        for (cb, args) in plan {
            debug!(kind = ?args.kind, target = %args.target, "dispatch");
            cb(ctx, args);
        }
    }
}
