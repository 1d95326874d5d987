//! Widget builders.
//!
//! Each builder returns the complete set of sibling elements for one piece of
//! UI. Nothing is pushed until the whole set exists, so a builder either
//! lands entirely or not at all.

pub mod panel;
pub mod resize_menu;
pub mod share_dialog;

use crate::catalog::Catalog;
use crate::context::UiContext;
use crate::layout::Layout;
use crate::mode::UiMode;
use crate::scene::{Element, ElementKey, EventKind};

/// The scene for the current mode: the main panel, plus the share dialog
/// when one is open. The resize menu is transient and never rebuilt.
pub fn build_scene(layout: &Layout, catalog: &Catalog, mode: &UiMode) -> Vec<Element> {
    let mut out = panel::build_main_ui(layout, catalog, mode);
    if mode.share_dialog_open {
        out.extend(share_dialog::build(layout));
    }
    out
}

/// Shows `label` while the pointer is over `node`.
pub(crate) fn reveal_on_hover(node: Element, label: ElementKey) -> Element {
    node.on(EventKind::Enter, move |ctx, _| {
        if let Some(el) = ctx.scene.get_mut(label) {
            el.visible = true;
        }
    })
    .on(EventKind::Exit, move |ctx, _| {
        if let Some(el) = ctx.scene.get_mut(label) {
            el.visible = false;
        }
    })
}

/// Removes every element in `keys`; already-gone ones are skipped.
pub(crate) fn remove_all(ctx: &mut UiContext<'_>, keys: &[ElementKey]) {
    for key in keys {
        ctx.scene.remove(*key);
    }
}
