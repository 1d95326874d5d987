//! Shown after a successful upload. The share stays busy until Close.

use crate::geometry::Vec2;
use crate::layout::{self, Align, Layout};
use crate::mode::Command;
use crate::scene::{Element, EventKind};
use crate::ui::remove_all;

pub const CLOSE_ID: &str = "shareDialogClose";
pub const COPY_ID: &str = "shareDialogCopy";

pub fn build(layout: &Layout) -> Vec<Element> {
    let s = layout.scale;
    let mid = layout.center();
    let btn_scale = 1.2 * s;

    let title = Element::text("Upload Successful", mid.offset(0.0, -60.0 * s), 1.8 * s, Align::Center);

    let copy_w = layout::button_size("Copy Link", btn_scale).0;
    let close_w = layout::button_size("Close", btn_scale).0;
    let left = mid.x - (copy_w + close_w + 4.0 * s) / 2.0;
    let row_y = mid.y - 40.0 * s;

    let copy = Element::button("Copy Link", Vec2::new(left, row_y), btn_scale)
        .with_id(COPY_ID)
        .on(EventKind::Down, |ctx, _| ctx.emit(Command::CopyLink));

    let close = Element::button("Close", Vec2::new(left + copy_w + 2.0 * s, row_y), btn_scale)
        .with_id(CLOSE_ID);
    let members = [title.key(), copy.key(), close.key()];
    let close = close.on(EventKind::Down, move |ctx, _| {
        remove_all(ctx, &members);
        ctx.mode.share_dialog_open = false;
        ctx.emit(Command::ShareDialogClosed);
    });

    vec![title, copy, close]
}
