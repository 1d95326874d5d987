//! winit pointer events to scene pointer samples.
//!
//! Mouse buttons other than left and right are dropped here. A touch is
//! reported as a move to the contact point followed by a left press, so hover
//! transitions complete before the down fires.

use elementum_core::{MouseButton, PointerInput, PointerSample, Vec2};
use winit::event::{ElementState, MouseButton as WinitButton, TouchPhase, WindowEvent};

#[derive(Debug, Default)]
pub struct PointerTracker {
    last: Option<Vec2>,
}

fn button(b: WinitButton) -> Option<MouseButton> {
    match b {
        WinitButton::Left => Some(MouseButton::Left),
        WinitButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

impl PointerTracker {
    pub fn map(&mut self, event: &WindowEvent) -> Vec<PointerSample> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let p = Vec2::new(position.x as f32, position.y as f32);
                self.last = Some(p);
                vec![PointerSample::mouse(PointerInput::Move(p))]
            }
            WindowEvent::CursorLeft { .. } => {
                self.last = None;
                vec![PointerSample::mouse(PointerInput::Leave)]
            }
            WindowEvent::MouseInput { state, button: b, .. } => {
                let (Some(p), Some(b)) = (self.last, button(*b)) else {
                    return Vec::new();
                };
                let input = match state {
                    ElementState::Pressed => PointerInput::Down(p, b),
                    ElementState::Released => PointerInput::Up(p, b),
                };
                vec![PointerSample::mouse(input)]
            }
            WindowEvent::Touch(touch) => {
                let p = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => vec![
                        PointerSample::touch(PointerInput::Move(p)),
                        PointerSample::touch(PointerInput::Down(p, MouseButton::Left)),
                    ],
                    TouchPhase::Moved => vec![PointerSample::touch(PointerInput::Move(p))],
                    TouchPhase::Ended => vec![
                        PointerSample::touch(PointerInput::Up(p, MouseButton::Left)),
                        PointerSample::touch(PointerInput::Leave),
                    ],
                    TouchPhase::Cancelled => vec![PointerSample::touch(PointerInput::Leave)],
                }
            }
            _ => Vec::new(),
        }
    }
}
