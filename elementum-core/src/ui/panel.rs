//! The main panel: element palette above the canvas, tools and controls to
//! its left, the info readout, credits and the canvas border.

use crate::catalog::Catalog;
use crate::context::UiContext;
use crate::events::MouseButton;
use crate::geometry::{Bounds, Rgba, Vec2};
use crate::layout::{Align, Layout};
use crate::mode::{strength_marker, Command, ToolKind, UiMode, SLOT_COLORS};
use crate::scene::{Element, ElementKey, EventArgs, EventKind};
use crate::ui::{reveal_on_hover, resize_menu};

pub const INFO_ID: &str = "info";
pub const STRENGTH_ID: &str = "tool_areaOfEffect";

const ROW: f32 = 21.0;
const SYMBOL_SCALE: f32 = 1.8;

pub fn info_text(peak: f32) -> String {
    format!("peak {peak:.2}")
}

pub fn category_id(name: &str) -> String {
    format!("cat_{name}")
}

pub fn bounding_id(category: &str) -> String {
    format!("bounding_{category}")
}

pub fn element_button_id(name: &str) -> String {
    format!("elementselect_{name}")
}

pub fn description_id(name: &str) -> String {
    format!("description_{name}")
}

pub fn tool_id(tool: ToolKind) -> String {
    format!("tool_{}", tool.name())
}

pub fn control_id(name: &str) -> String {
    format!("control_{}", name.replace(' ', "_"))
}

fn pause_symbol(paused: bool) -> &'static str {
    if paused { "\u{25b6}" } else { "\u{23f8}" }
}

fn pause_label(paused: bool) -> &'static str {
    if paused { "RESUME" } else { "PAUSE" }
}

pub fn build_main_ui(layout: &Layout, catalog: &Catalog, mode: &UiMode) -> Vec<Element> {
    let mut out = Vec::new();
    palette(layout, catalog, mode, &mut out);
    let y = strength_widget(layout, &mut out);
    let y = tools(layout, mode, y, &mut out);
    controls(layout, mode, y, &mut out);
    footer(layout, mode, &mut out);
    out
}

fn palette(layout: &Layout, catalog: &Catalog, mode: &UiMode, out: &mut Vec<Element>) {
    let s = layout.scale;
    let c = layout.canvas;
    let boundings: Vec<String> = catalog
        .visible_categories()
        .map(|cat| bounding_id(&cat.name))
        .collect();

    // Category symbols go last so an open flyout never covers another
    // category's symbol.
    let mut nodes = Vec::new();
    let mut cat_x = 8.0;

    for category in catalog.visible_categories() {
        let mut node = Element::text(
            category.symbol.clone(),
            Vec2::new(c.left + cat_x, c.top - 13.0 * s),
            s,
            Align::Left,
        )
        .with_id(category_id(&category.name));
        if mode.selected_category == category.name {
            node = node.with_color(SLOT_COLORS[0]);
        }
        let node_key = node.key();

        let name = Element::text(
            category.name.clone(),
            Vec2::new(c.left + cat_x + 16.0 * s, c.top - 13.0 * s),
            s,
            Align::Left,
        )
        .hidden();
        let name_key = name.key();

        let mut bounding = Element::region(Bounds::EMPTY)
            .with_id(bounding_id(&category.name))
            .hidden();
        let bounding_key = bounding.key();

        let mut buttons = Vec::new();
        let mut by = 0.0;
        for entry in catalog.entries_in(&category.name) {
            let mut button = Element::button(
                entry.name.clone(),
                Vec2::new(c.left + cat_x - 2.0 * s, c.top + by),
                s,
            )
            .with_id(element_button_id(&entry.name))
            .hidden();
            if entry.name == mode.selected_element {
                button = button.with_color(SLOT_COLORS[0]);
            }
            by += button.bounds.height() + 4.0 * s;

            let at = button.bounds;
            let desc_id = description_id(&entry.name);
            let description = entry.description.clone();
            let desc_id_exit = desc_id.clone();
            let (el_id, el_name, cat_name) = (entry.id, entry.name.clone(), category.name.clone());

            button = button
                .on(EventKind::Enter, move |ctx, _| {
                    if ctx.coarse_pointer() || description.is_empty() {
                        return;
                    }
                    ctx.scene.remove_by_id(&desc_id);
                    let desc = Element::text(
                        description.clone(),
                        Vec2::new(at.right + 8.0 * s, at.top + 5.0 * s),
                        s * 0.8,
                        Align::Left,
                    )
                    .with_id(desc_id.clone());
                    ctx.scene.push(desc);
                })
                .on(EventKind::Exit, move |ctx, args| {
                    if !ctx.coarse_pointer() {
                        ctx.scene.remove_by_id(&desc_id_exit);
                    }
                    close_flyout_if_left(ctx, bounding_key, args.position);
                })
                .on(EventKind::Down, move |ctx, args| {
                    select_element(ctx, args, el_id, &el_name, &cat_name);
                    if let Some(el) = ctx.scene.get_mut(node_key) {
                        el.color = Some(SLOT_COLORS[0]);
                    }
                    ctx.trigger(bounding_key, EventKind::Exit, None);
                    ctx.trigger(args.target, EventKind::Exit, None);
                });
            buttons.push(button);
        }

        let extent = buttons
            .iter()
            .fold(Bounds::EMPTY, |acc, b| acc.union(&b.bounds));
        bounding.bounds = Bounds::new(
            -100.0,
            c.left - 8.0,
            extent.right.max(c.left) + 8.0,
            extent.bottom.max(c.top) + 8.0,
        );
        let members: Vec<_> = buttons.iter().map(Element::key).collect();
        let hide = members.clone();
        bounding = bounding.on(EventKind::Exit, move |ctx, args| {
            // Moving onto a member button still counts as inside.
            let still_inside = args
                .position
                .zip(ctx.scene.get(args.target))
                .is_some_and(|(p, el)| el.bounds.contains(p));
            if still_inside {
                return;
            }
            for key in hide.iter().chain([&name_key, &args.target]) {
                if let Some(el) = ctx.scene.get_mut(*key) {
                    el.visible = false;
                }
            }
        });

        let own = bounding_id(&category.name);
        let others = boundings.clone();
        node = node.on(EventKind::Enter, move |ctx, _| {
            if ctx.scene.get(bounding_key).is_some_and(|b| b.visible) {
                return;
            }
            for other in others.iter().filter(|id| **id != own) {
                let open = ctx.scene.get_by_id(other).is_some_and(|b| b.visible);
                if open {
                    ctx.trigger_by_id(other, EventKind::Exit, None);
                }
            }
            for key in members.iter().chain([&name_key, &bounding_key]) {
                if let Some(el) = ctx.scene.get_mut(*key) {
                    el.visible = true;
                }
            }
        });

        node = node.on(EventKind::Exit, move |ctx, args| {
            close_flyout_if_left(ctx, bounding_key, args.position);
        });

        cat_x += node.bounds.width() + 4.0 * s;
        out.push(name);
        out.push(bounding);
        out.extend(buttons);
        nodes.push(node);
    }
    out.extend(nodes);
}

/// Hides the flyout unless `position` is still inside its bounding region.
fn close_flyout_if_left(ctx: &mut UiContext<'_>, bounding: ElementKey, position: Option<Vec2>) {
    let inside = position
        .zip(ctx.scene.get(bounding))
        .is_some_and(|(p, b)| b.visible && b.bounds.contains(p));
    if !inside {
        ctx.trigger(bounding, EventKind::Exit, None);
    }
}

fn select_element(ctx: &mut UiContext<'_>, args: EventArgs, id: u32, name: &str, category: &str) {
    let prev_button = element_button_id(&ctx.mode.selected_element);
    if let Some(el) = ctx.scene.get_mut_by_id(&prev_button) {
        el.color = None;
    }
    let prev_cat = category_id(&ctx.mode.selected_category);
    if let Some(el) = ctx.scene.get_mut_by_id(&prev_cat) {
        el.color = None;
    }
    ctx.mode.brush = id;
    ctx.mode.selected_element = name.to_string();
    ctx.mode.selected_category = category.to_string();
    if let Some(el) = ctx.scene.get_mut(args.target) {
        el.color = Some(SLOT_COLORS[0]);
    }
}

/// Returns the y offset below the widget where the tool column starts.
fn strength_widget(layout: &Layout, out: &mut Vec<Element>) -> f32 {
    let s = layout.scale;
    let c = layout.canvas;

    let label = Element::text(
        "Tool Strength",
        Vec2::new(c.left + 4.0 * s, c.top + 2.0 * s * SYMBOL_SCALE),
        SYMBOL_SCALE,
        Align::Left,
    )
    .hidden();

    let right = c.left - 2.0;
    let bounds = Bounds::new(c.top, right - s * 18.0 - 5.0, right, c.top + s * 18.0);
    let glyph_origin = Vec2::new(c.left - 3.0 * s - s * 18.0, c.top);
    let unit = s * SYMBOL_SCALE;

    let widget = Element::custom(bounds, move |p, _, mode| {
        let frame = Bounds::from_origin_size(glyph_origin, 10.0 * unit, 10.0 * unit);
        p.stroke_rect(frame, 1.0, Rgba::WHITE);
        let r = strength_marker(mode.area_of_effect) * unit;
        if r > 0.0 {
            let mid = frame.center();
            p.fill_rect(
                Bounds::new(mid.y - r, mid.x - r, mid.x + r, mid.y + r),
                Rgba::WHITE,
            );
        }
    })
    .with_id(STRENGTH_ID)
    .on(EventKind::Down, |ctx, args| {
        ctx.mode.cycle_strength(args.button.unwrap_or(MouseButton::Left));
    });

    let label_key = label.key();
    out.push(reveal_on_hover(widget, label_key));
    out.push(label);
    ROW * s * 2.0
}

fn tools(layout: &Layout, mode: &UiMode, mut y: f32, out: &mut Vec<Element>) -> f32 {
    let s = layout.scale;
    let c = layout.canvas;

    for tool in ToolKind::ALL {
        let name = Element::text(
            tool.name(),
            Vec2::new(c.left + 4.0 * s, c.top + y + 3.0 * s * SYMBOL_SCALE),
            s,
            Align::Left,
        )
        .hidden();

        let mut node = Element::text(
            tool.symbol(),
            Vec2::new(c.left - 2.0 * s, c.top + y),
            s * SYMBOL_SCALE,
            Align::Right,
        )
        .with_id(tool_id(tool))
        .on(EventKind::Down, move |ctx, args| {
            let button = args.button.unwrap_or(MouseButton::Left);
            if ctx.mode.assign_tool(tool, button) {
                for t in ToolKind::ALL {
                    let color = ctx.mode.tool_color(t);
                    if let Some(el) = ctx.scene.get_mut_by_id(&tool_id(t)) {
                        el.color = color;
                    }
                }
            }
        });
        node.color = mode.tool_color(tool);

        let name_key = name.key();
        out.push(name);
        out.push(reveal_on_hover(node, name_key));
        y += ROW * s;
    }
    y + ROW * s
}

fn controls(layout: &Layout, mode: &UiMode, mut y: f32, out: &mut Vec<Element>) {
    let s = layout.scale;
    let c = layout.canvas;

    const CONTROLS: [(&str, &str); 9] = [
        ("pause", ""),
        ("step", "\u{23ed}"),
        ("reset", "\u{21ba}"),
        ("resize", "\u{2922}"),
        ("save state", "\u{2193}"),
        ("load state", "\u{2191}"),
        ("export state", "\u{21e9}"),
        ("import state", "\u{21e7}"),
        ("share state", "\u{21ea}"),
    ];

    for (name, symbol) in CONTROLS {
        let (symbol, label_text) = if name == "pause" {
            (pause_symbol(mode.paused), pause_label(mode.paused))
        } else {
            (symbol, name)
        };
        let label = Element::text(
            label_text,
            Vec2::new(c.left + 4.0 * s, c.top + y + 3.0 * s * SYMBOL_SCALE),
            s,
            Align::Left,
        )
        .hidden();
        let label_key = label.key();

        let node = Element::text(
            symbol,
            Vec2::new(c.left - 2.0 * s, c.top + y),
            s * SYMBOL_SCALE,
            Align::Right,
        )
        .with_id(control_id(name));
        let node = match name {
            "pause" => node.on(EventKind::Down, move |ctx, args| {
                ctx.mode.paused = !ctx.mode.paused;
                let paused = ctx.mode.paused;
                if let Some(el) = ctx.scene.get_mut(args.target) {
                    el.set_text(pause_symbol(paused));
                }
                if let Some(el) = ctx.scene.get_mut(label_key) {
                    el.set_text(pause_label(paused));
                }
            }),
            "resize" => node.on(EventKind::Down, |ctx, _| toggle_resize_menu(ctx)),
            other => {
                let cmd = match other {
                    "step" => Command::Step,
                    "reset" => Command::ResetScene,
                    "save state" => Command::SaveState,
                    "load state" => Command::LoadState,
                    "export state" => Command::ExportState,
                    "import state" => Command::ImportState,
                    _ => Command::ShareState,
                };
                node.on(EventKind::Down, move |ctx, _| ctx.emit(cmd.clone()))
            }
        };

        out.push(reveal_on_hover(node, label_key));
        out.push(label);
        y += ROW * s;
        if name == "resize" {
            y += ROW * s;
        }
    }
}

fn toggle_resize_menu(ctx: &mut UiContext<'_>) {
    if ctx.mode.resize_menu_open {
        ctx.trigger_by_id(resize_menu::CANCEL_ID, EventKind::Down, None);
    } else {
        ctx.mode.resize_menu_open = true;
        let menu = resize_menu::build(ctx.layout);
        ctx.scene.extend(menu);
    }
}

fn footer(layout: &Layout, mode: &UiMode, out: &mut Vec<Element>) {
    let s = layout.scale;
    let c = layout.canvas;

    out.push(
        Element::text(
            info_text(mode.peak_intensity),
            Vec2::new(c.right - 8.0, c.top - 13.0 * s),
            s,
            Align::Right,
        )
        .with_id(INFO_ID),
    );
    out.push(Element::text(
        "Elementum",
        Vec2::new(c.left + 8.0, c.bottom + 4.0 * s),
        s,
        Align::Left,
    ));
    out.push(Element::text(
        "mechanika design",
        Vec2::new(c.right - 8.0, c.bottom + 4.0 * s),
        s,
        Align::Right,
    ));

    let canvas = c;
    out.push(Element::custom(Bounds::EMPTY, move |p, _, mode| {
        let color = if mode.paused { Rgba::RED } else { Rgba::WHITE };
        p.stroke_rect(canvas, 1.0, color);
    }));
}
