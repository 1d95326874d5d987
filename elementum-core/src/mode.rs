//! UI mode shared by every widget callback, and the commands callbacks emit
//! for the controller to carry out.

use serde::{Deserialize, Serialize};

use crate::events::MouseButton;
use crate::geometry::Rgba;

/// Tool strength steps, cycled by the strength widget.
pub const STRENGTH_STEPS: [u32; 8] = [0, 3, 5, 7, 10, 15, 30, 50];

pub const DEFAULT_STRENGTH: u32 = 3;

/// Highlight colour of whatever the left and right buttons hold.
pub const SLOT_COLORS: [Rgba; 2] = [Rgba::from_hex(0xffd9b5), Rgba::from_hex(0xb5f1ff)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Draw,
    Erase,
    Line,
    Wind,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [ToolKind::Draw, ToolKind::Erase, ToolKind::Line, ToolKind::Wind];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Draw => "draw",
            ToolKind::Erase => "erase",
            ToolKind::Line => "line",
            ToolKind::Wind => "wind",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ToolKind::Draw => "\u{270e}",
            ToolKind::Erase => "\u{2715}",
            ToolKind::Line => "\u{2571}",
            ToolKind::Wind => "\u{224b}",
        }
    }
}

/// Work a widget callback asks for but may not do itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Advance the simulation one step regardless of pause.
    Step,
    ResetScene,
    Resize { units: u32 },
    SaveState,
    LoadState,
    ExportState,
    ImportState,
    ShareState,
    CopyLink,
    ShareDialogClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiMode {
    pub paused: bool,
    /// Catalog id of the element in the brush.
    pub brush: u32,
    pub selected_element: String,
    pub selected_category: String,
    pub area_of_effect: u32,
    /// Index 0 is the left button, 1 the right.
    pub tools: [ToolKind; 2],
    pub resize_menu_open: bool,
    pub share_dialog_open: bool,
    /// Mirror of the share busy flag, for display.
    pub share_busy: bool,
    /// Set once touch input has been seen; hover-only affordances are skipped.
    pub coarse_pointer: bool,
    pub peak_intensity: f32,
    /// Location path, e.g. `/elementum/<id>/` after a share.
    pub location: String,
}

impl Default for UiMode {
    fn default() -> Self {
        Self {
            paused: false,
            brush: 0,
            selected_element: String::new(),
            selected_category: String::new(),
            area_of_effect: DEFAULT_STRENGTH,
            tools: [ToolKind::Draw, ToolKind::Erase],
            resize_menu_open: false,
            share_dialog_open: false,
            share_busy: false,
            coarse_pointer: false,
            peak_intensity: 0.0,
            location: "/".to_string(),
        }
    }
}

impl UiMode {
    /// Left steps forward, right steps backward, both wrap. A value outside
    /// the table restarts at the default.
    pub fn cycle_strength(&mut self, button: MouseButton) -> u32 {
        self.area_of_effect = next_strength(self.area_of_effect, button);
        self.area_of_effect
    }

    /// Puts `tool` in the slot of `button`. If the other slot already holds it
    /// the two slots swap. Returns false when nothing changed.
    pub fn assign_tool(&mut self, tool: ToolKind, button: MouseButton) -> bool {
        let slot = button.slot();
        let other = 1 - slot;
        if self.tools[slot] == tool {
            return false;
        }
        if self.tools[other] == tool {
            self.tools[other] = self.tools[slot];
        }
        self.tools[slot] = tool;
        true
    }

    /// Highlight for a tool, by which slot holds it.
    pub fn tool_color(&self, tool: ToolKind) -> Option<Rgba> {
        self.tools
            .iter()
            .position(|t| *t == tool)
            .map(|slot| SLOT_COLORS[slot])
    }

    /// Peak only ever grows.
    pub fn record_peak(&mut self, value: f32) -> bool {
        if value > self.peak_intensity {
            self.peak_intensity = value;
            true
        } else {
            false
        }
    }
}

pub fn next_strength(current: u32, button: MouseButton) -> u32 {
    let Some(i) = STRENGTH_STEPS.iter().position(|s| *s == current) else {
        return DEFAULT_STRENGTH;
    };
    let n = STRENGTH_STEPS.len();
    let j = match button {
        MouseButton::Left => (i + 1) % n,
        MouseButton::Right => (i + n - 1) % n,
    };
    STRENGTH_STEPS[j]
}

/// Radius of the strength glyph's inner marker, 0 to 5.
pub fn strength_marker(strength: u32) -> f32 {
    let i = STRENGTH_STEPS.iter().position(|s| *s == strength).unwrap_or(0);
    i as f32 * 5.0 / (STRENGTH_STEPS.len() - 1) as f32
}
