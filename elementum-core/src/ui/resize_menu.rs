//! Modal row of canvas sizes, opened from the resize control.

use crate::geometry::Vec2;
use crate::layout::{self, Align, Layout};
use crate::mode::Command;
use crate::scene::{Element, EventKind};
use crate::ui::remove_all;

pub const CANCEL_ID: &str = "resizeMenuCancel";

/// Offered sizes, in canvas units of 75 px.
pub const SIZES: [u32; 8] = [1, 2, 4, 6, 8, 10, 15, 20];

pub fn size_label(units: u32) -> String {
    format!("{}\u{b2}", layout::canvas_pixels(units))
}

pub fn build(layout: &Layout) -> Vec<Element> {
    let s = layout.scale;
    let mid = layout.center();

    let title = Element::text("Resize canvas", mid.offset(0.0, -60.0 * s), 1.8 * s, Align::Center);

    let gap = 4.0 * s;
    let row_width: f32 = SIZES
        .iter()
        .map(|u| layout::button_size(&size_label(*u), s).0 + gap)
        .sum();

    let mut x = mid.x - row_width / 2.0;
    let mut buttons = Vec::with_capacity(SIZES.len());
    for units in SIZES {
        let button = Element::button(size_label(units), Vec2::new(x, mid.y - 20.0 * s), s).on(
            EventKind::Down,
            move |ctx, _| {
                ctx.emit(Command::Resize { units });
                ctx.trigger_by_id(CANCEL_ID, EventKind::Down, None);
            },
        );
        x += button.bounds.width() + gap;
        buttons.push(button);
    }

    let cancel_w = layout::button_size("cancel", s).0;
    let cancel = Element::button("cancel", Vec2::new(mid.x - cancel_w / 2.0, mid.y + 5.0 * s), s)
        .with_id(CANCEL_ID);

    let mut members: Vec<_> = buttons.iter().map(Element::key).collect();
    members.push(title.key());
    members.push(cancel.key());
    let cancel = cancel.on(EventKind::Down, move |ctx, _| {
        ctx.mode.resize_menu_open = false;
        remove_all(ctx, &members);
    });

    let mut out = vec![title];
    out.extend(buttons);
    out.push(cancel);
    out
}
