use std::cell::RefCell;
use std::rc::Rc;

use elementum_core::layout::Align;
use elementum_core::mode::SLOT_COLORS;
use elementum_core::scene::paint::RecordingPainter;
use elementum_core::ui::{self, panel, resize_menu, share_dialog};
use elementum_core::{
    Bounds, Catalog, Command, Element, EventHandler, EventKind, Layout, MouseButton, PointerInput,
    PointerSample, RenderList, Rgba, ToolKind, UiContext, UiMode, Vec2,
};

/// Scene plus everything a callback needs, driven one sample at a time.
struct Harness {
    scene: RenderList,
    mode: UiMode,
    layout: Layout,
    catalog: Catalog,
    commands: Vec<Command>,
    events: EventHandler,
}

impl Harness {
    fn new() -> Self {
        Self {
            scene: RenderList::new(),
            mode: UiMode::default(),
            layout: Layout::default(),
            catalog: Catalog::builtin(),
            commands: Vec::new(),
            events: EventHandler::new(),
        }
    }

    fn with_panel() -> Self {
        let mut h = Self::new();
        h.mode.selected_element = "SAND".into();
        h.mode.selected_category = "powder".into();
        let els = ui::build_scene(&h.layout, &h.catalog, &h.mode);
        h.scene.extend(els);
        h
    }

    fn send(&mut self, sample: PointerSample) {
        self.events.push(sample);
        let mut ctx = UiContext::new(
            &mut self.scene,
            &mut self.mode,
            &self.layout,
            &self.catalog,
            &mut self.commands,
        );
        self.events.tick(&mut ctx);
    }

    fn move_to(&mut self, p: Vec2) {
        self.send(PointerSample::mouse(PointerInput::Move(p)));
    }

    fn click(&mut self, p: Vec2, button: MouseButton) {
        self.send(PointerSample::mouse(PointerInput::Down(p, button)));
        self.send(PointerSample::mouse(PointerInput::Up(p, button)));
    }

    fn center_of(&self, id: &str) -> Vec2 {
        self.scene
            .get_by_id(id)
            .unwrap_or_else(|| panic!("no element {id}"))
            .bounds
            .center()
    }

    fn visible(&self, id: &str) -> bool {
        self.scene.get_by_id(id).is_some_and(|el| el.visible)
    }
}

type Log = Rc<RefCell<Vec<String>>>;

fn logged(log: &Log, id: &str, bounds: Bounds) -> Element {
    let (a, b, c) = (log.clone(), log.clone(), log.clone());
    let (ia, ib, ic) = (id.to_string(), id.to_string(), id.to_string());
    Element::region(bounds)
        .with_id(id)
        .on(EventKind::Enter, move |_, _| a.borrow_mut().push(format!("enter {ia}")))
        .on(EventKind::Exit, move |_, _| b.borrow_mut().push(format!("exit {ib}")))
        .on(EventKind::Down, move |_, args| {
            c.borrow_mut().push(format!("down {ic} {:?}", args.button.unwrap()))
        })
}

// ============================================================================
// RenderList - Id Index
// ============================================================================

#[test]
fn test_index_of_id_tracks_push_and_remove_sequences() {
    // Deterministic pseudo-random mix of pushes and removals.
    let mut list = RenderList::new();
    let mut present: Vec<String> = Vec::new();
    let mut removed: Vec<String> = Vec::new();
    let mut seed: u32 = 0x9e37_79b9;

    for step in 0..400 {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let remove = !present.is_empty() && seed % 3 == 0;
        if remove {
            let victim = present.remove((seed as usize / 7) % present.len());
            if seed % 2 == 0 {
                list.remove_by_id(&victim);
            } else {
                let idx = list.index_of_id(&victim).unwrap();
                list.remove_at(idx);
            }
            removed.push(victim);
        } else {
            let id = format!("el{step}");
            list.push(Element::region(Bounds::EMPTY).with_id(id.clone()));
            present.push(id);
        }

        for id in &present {
            let idx = list.index_of_id(id).expect("present id must resolve");
            assert_eq!(list.at(idx).and_then(Element::id), Some(id.as_str()));
        }
        for id in &removed {
            assert_eq!(list.index_of_id(id), None);
        }
    }
    assert_eq!(list.len(), present.len());
}

#[test]
fn test_remove_absent_is_noop() {
    let mut list = RenderList::new();
    let key = list.push(Element::region(Bounds::EMPTY));
    assert!(list.remove(key).is_some());
    assert!(list.remove(key).is_none());
    assert!(list.remove_at(5).is_none());
    assert!(list.remove_by_id("nothing").is_none());
    assert!(list.is_empty());
}

#[test]
fn test_paint_skips_invisible_in_order() {
    let mut list = RenderList::new();
    list.push(Element::text("first", Vec2::ZERO, 1.0, Align::Left));
    list.push(Element::text("hidden", Vec2::ZERO, 1.0, Align::Left).hidden());
    list.push(Element::text("last", Vec2::ZERO, 1.0, Align::Left));
    let mut painter = RecordingPainter::default();
    list.paint(&mut painter, &UiMode::default());
    assert_eq!(painter.texts(), vec!["first", "last"]);
}

// ============================================================================
// EventHandler - Hit Testing & Transitions
// ============================================================================

#[test]
fn test_overlap_hover_goes_to_later_element() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "under", Bounds::new(0.0, 0.0, 100.0, 100.0)));
    h.scene.push(logged(&log, "over", Bounds::new(50.0, 50.0, 150.0, 150.0)));

    h.move_to(Vec2::new(75.0, 75.0));
    assert_eq!(*log.borrow(), vec!["enter over"]);
    h.move_to(Vec2::new(10.0, 10.0));
    assert_eq!(*log.borrow(), vec!["enter over", "exit over", "enter under"]);
}

#[test]
fn test_invisible_elements_are_not_hit() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "under", Bounds::new(0.0, 0.0, 100.0, 100.0)));
    h.scene.push(logged(&log, "over", Bounds::new(0.0, 0.0, 100.0, 100.0)).hidden());
    h.click(Vec2::new(5.0, 5.0), MouseButton::Left);
    assert_eq!(*log.borrow(), vec!["enter under", "down under Left"]);
}

#[test]
fn test_down_outside_everything_fires_nothing() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "a", Bounds::new(0.0, 0.0, 10.0, 10.0)));
    h.click(Vec2::new(500.0, 500.0), MouseButton::Left);
    assert!(log.borrow().is_empty());
    assert_eq!(h.events.hovered(), None);
}

#[test]
fn test_edges_are_inclusive() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "a", Bounds::new(0.0, 0.0, 10.0, 10.0)));
    h.click(Vec2::new(10.0, 10.0), MouseButton::Right);
    assert_eq!(*log.borrow(), vec!["enter a", "down a Right"]);
}

#[test]
fn test_transitions_complete_before_down() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "a", Bounds::new(0.0, 0.0, 10.0, 10.0)));
    h.scene.push(logged(&log, "b", Bounds::new(0.0, 20.0, 30.0, 10.0)));
    h.move_to(Vec2::new(5.0, 5.0));
    h.send(PointerSample::mouse(PointerInput::Down(Vec2::new(25.0, 5.0), MouseButton::Left)));
    assert_eq!(*log.borrow(), vec!["enter a", "exit a", "enter b", "down b Left"]);
}

#[test]
fn test_leave_fires_exit_only() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "a", Bounds::new(0.0, 0.0, 10.0, 10.0)));
    h.move_to(Vec2::new(5.0, 5.0));
    h.send(PointerSample::mouse(PointerInput::Leave));
    assert_eq!(*log.borrow(), vec!["enter a", "exit a"]);
    assert_eq!(h.events.position(), None);
}

#[test]
fn test_removed_hover_target_gets_no_exit() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "a", Bounds::new(0.0, 0.0, 10.0, 10.0)));
    h.move_to(Vec2::new(5.0, 5.0));
    h.scene.remove_by_id("a");
    h.move_to(Vec2::new(50.0, 50.0));
    assert_eq!(*log.borrow(), vec!["enter a"]);
}

#[test]
fn test_callback_removing_itself_and_siblings() {
    let mut h = Harness::new();
    h.scene
        .push(Element::region(Bounds::new(0.0, 0.0, 100.0, 100.0)).with_id("backdrop"));
    h.scene.push(
        Element::region(Bounds::new(0.0, 0.0, 10.0, 10.0))
            .with_id("self_destruct")
            .on(EventKind::Down, |ctx, args| {
                ctx.scene.remove(args.target);
                ctx.scene.remove_by_id("backdrop");
                ctx.scene.push(Element::region(Bounds::EMPTY).with_id("after"));
            })
            .on(EventKind::Exit, |ctx, _| ctx.emit(Command::Step)),
    );

    h.click(Vec2::new(5.0, 5.0), MouseButton::Left);
    assert_eq!(h.scene.len(), 1);
    assert_eq!(h.scene.index_of_id("after"), Some(0));
    // The removed element is no longer reachable, so its exit never runs.
    h.move_to(Vec2::new(200.0, 200.0));
    assert!(h.commands.is_empty());
}

#[test]
fn test_menu_opened_by_click_is_hittable_next_sample_same_tick() {
    let mut h = Harness::new();
    h.scene.push(
        Element::region(Bounds::new(0.0, 0.0, 10.0, 10.0)).on(EventKind::Down, |ctx, _| {
            ctx.scene.push(
                Element::region(Bounds::new(0.0, 20.0, 30.0, 10.0))
                    .on(EventKind::Down, |ctx, _| ctx.emit(Command::Step)),
            );
        }),
    );
    h.events
        .push(PointerSample::mouse(PointerInput::Down(Vec2::new(5.0, 5.0), MouseButton::Left)));
    h.events
        .push(PointerSample::mouse(PointerInput::Down(Vec2::new(25.0, 5.0), MouseButton::Left)));
    let mut ctx = UiContext::new(
        &mut h.scene,
        &mut h.mode,
        &h.layout,
        &h.catalog,
        &mut h.commands,
    );
    assert_eq!(h.events.tick(&mut ctx), 2);
    assert_eq!(h.commands, vec![Command::Step]);
}

#[test]
fn test_touch_sets_coarse_pointer_and_down_still_fires() {
    let log: Log = Rc::default();
    let mut h = Harness::new();
    h.scene.push(logged(&log, "a", Bounds::new(0.0, 0.0, 10.0, 10.0)));
    h.send(PointerSample::touch(PointerInput::Down(Vec2::new(5.0, 5.0), MouseButton::Left)));
    assert!(h.mode.coarse_pointer);
    assert_eq!(log.borrow().last().map(String::as_str), Some("down a Left"));
}

#[test]
fn test_trigger_by_id_missing_is_false() {
    let mut h = Harness::new();
    let mut ctx = UiContext::new(
        &mut h.scene,
        &mut h.mode,
        &h.layout,
        &h.catalog,
        &mut h.commands,
    );
    assert!(!ctx.trigger_by_id("resizeMenuCancel", EventKind::Down, None));
}

// ============================================================================
// Panel - Palette
// ============================================================================

#[test]
fn test_category_hover_reveals_buttons_and_bounding_exit_hides() {
    let mut h = Harness::with_panel();
    assert!(!h.visible("elementselect_WATER"));

    h.move_to(h.center_of("cat_liquid"));
    assert!(h.visible("elementselect_WATER"));
    assert!(h.visible("bounding_liquid"));

    // Into the flyout's empty corner, then out of it.
    let b = h.scene.get_by_id("bounding_liquid").unwrap().bounds;
    h.move_to(Vec2::new(b.right - 1.0, b.bottom - 1.0));
    assert!(h.visible("elementselect_WATER"));
    h.move_to(Vec2::new(h.layout.viewport.x - 1.0, h.layout.viewport.y - 1.0));
    assert!(!h.visible("elementselect_WATER"));
    assert!(!h.visible("bounding_liquid"));
}

#[test]
fn test_opening_one_category_closes_another() {
    let mut h = Harness::with_panel();
    h.move_to(h.center_of("cat_powder"));
    assert!(h.visible("elementselect_SAND"));
    h.move_to(h.center_of("cat_liquid"));
    assert!(!h.visible("elementselect_SAND"));
    assert!(h.visible("elementselect_WATER"));
}

#[test]
fn test_selecting_element_updates_brush_and_highlights() {
    let mut h = Harness::with_panel();
    h.move_to(h.center_of("cat_liquid"));
    let oil = h.center_of("elementselect_OIL");
    h.move_to(oil);
    assert!(h.scene.get_by_id("description_OIL").is_some());

    h.click(oil, MouseButton::Left);
    assert_eq!(h.mode.selected_element, "OIL");
    assert_eq!(h.mode.selected_category, "liquid");
    assert_eq!(h.mode.brush, 4);
    assert_eq!(h.scene.get_by_id("elementselect_OIL").unwrap().color, Some(SLOT_COLORS[0]));
    assert_eq!(h.scene.get_by_id("cat_liquid").unwrap().color, Some(SLOT_COLORS[0]));
    assert_eq!(h.scene.get_by_id("elementselect_SAND").unwrap().color, None);
    assert_eq!(h.scene.get_by_id("cat_powder").unwrap().color, None);
    // Flyout closed and description gone.
    assert!(!h.visible("elementselect_OIL"));
    assert!(h.scene.get_by_id("description_OIL").is_none());
}

/// Point between the category symbol row and the first button of `first`.
fn below_symbols(h: &Harness, first: &str) -> Vec2 {
    let b = h.scene.get_by_id(first).unwrap().bounds;
    Vec2::new(b.center().x, b.top - 4.0)
}

/// Point in the spacing under `button`, above the next one.
fn below_button(h: &Harness, button: &str) -> Vec2 {
    let b = h.scene.get_by_id(button).unwrap().bounds;
    Vec2::new(b.center().x, b.bottom + h.layout.scale * 2.0)
}

#[test]
fn test_flyout_stays_open_moving_from_category_to_button() {
    let mut h = Harness::with_panel();
    h.move_to(h.center_of("cat_liquid"));
    assert!(h.visible("bounding_liquid"));

    h.move_to(below_symbols(&h, "elementselect_WATER"));
    assert!(h.visible("bounding_liquid"));
    assert!(h.visible("elementselect_WATER"));

    h.move_to(h.center_of("elementselect_WATER"));
    assert!(h.visible("bounding_liquid"));
    assert!(h.visible("elementselect_OIL"));
    assert!(h.scene.get_by_id("description_WATER").is_some());
}

#[test]
fn test_flyout_stays_open_moving_straight_onto_button() {
    let mut h = Harness::with_panel();
    h.move_to(h.center_of("cat_liquid"));
    h.move_to(h.center_of("elementselect_WATER"));
    assert!(h.visible("bounding_liquid"));
    assert!(h.visible("elementselect_WATER"));
}

#[test]
fn test_flyout_pick_after_moving_between_buttons() {
    let mut h = Harness::with_panel();
    h.move_to(h.center_of("cat_liquid"));
    h.move_to(below_symbols(&h, "elementselect_WATER"));
    h.move_to(h.center_of("elementselect_WATER"));
    h.move_to(below_button(&h, "elementselect_WATER"));
    assert!(h.visible("elementselect_OIL"));
    assert!(h.scene.get_by_id("description_WATER").is_none());

    let oil = h.center_of("elementselect_OIL");
    h.move_to(oil);
    assert!(h.visible("bounding_liquid"));
    h.click(oil, MouseButton::Left);

    assert_eq!(h.mode.selected_element, "OIL");
    assert_eq!(h.mode.selected_category, "liquid");
    assert!(!h.visible("bounding_liquid"));
    assert!(!h.visible("elementselect_WATER"));
    assert!(!h.visible("elementselect_OIL"));
}

#[test]
fn test_flyout_closes_when_pointer_leaves_from_button() {
    let mut h = Harness::with_panel();
    h.move_to(h.center_of("cat_liquid"));
    h.move_to(h.center_of("elementselect_WATER"));
    assert!(h.visible("bounding_liquid"));

    // Straight from the button to somewhere outside the flyout.
    let b = h.scene.get_by_id("bounding_liquid").unwrap().bounds;
    h.move_to(Vec2::new(b.right + 20.0, b.bottom + 20.0));
    assert!(!h.visible("bounding_liquid"));
    assert!(!h.visible("elementselect_WATER"));
    assert!(h.scene.get_by_id("description_WATER").is_none());
}

#[test]
fn test_flyout_closes_when_pointer_leaves_from_symbol() {
    let mut h = Harness::with_panel();
    h.move_to(h.center_of("cat_liquid"));
    assert!(h.visible("elementselect_WATER"));
    h.send(PointerSample::mouse(PointerInput::Leave));
    assert!(!h.visible("bounding_liquid"));
    assert!(!h.visible("elementselect_WATER"));
}

#[test]
fn test_coarse_pointer_suppresses_descriptions() {
    let mut h = Harness::with_panel();
    h.mode.coarse_pointer = true;
    h.move_to(h.center_of("cat_liquid"));
    h.move_to(h.center_of("elementselect_WATER"));
    assert!(h.scene.get_by_id("description_WATER").is_none());
}

// ============================================================================
// Panel - Tools & Controls
// ============================================================================

#[test]
fn test_tool_click_assigns_and_recolours() {
    let mut h = Harness::with_panel();
    h.click(h.center_of("tool_wind"), MouseButton::Right);
    assert_eq!(h.mode.tools, [ToolKind::Draw, ToolKind::Wind]);
    assert_eq!(h.scene.get_by_id("tool_wind").unwrap().color, Some(SLOT_COLORS[1]));
    assert_eq!(h.scene.get_by_id("tool_erase").unwrap().color, None);

    h.click(h.center_of("tool_wind"), MouseButton::Left);
    assert_eq!(h.mode.tools, [ToolKind::Wind, ToolKind::Draw]);
    assert_eq!(h.scene.get_by_id("tool_draw").unwrap().color, Some(SLOT_COLORS[1]));
}

#[test]
fn test_strength_widget_cycles() {
    let mut h = Harness::with_panel();
    let at = h.center_of(panel::STRENGTH_ID);
    h.click(at, MouseButton::Left);
    assert_eq!(h.mode.area_of_effect, 5);
    h.click(at, MouseButton::Right);
    h.click(at, MouseButton::Right);
    assert_eq!(h.mode.area_of_effect, 0);
}

#[test]
fn test_pause_toggles_label_and_border() {
    let mut h = Harness::with_panel();
    h.click(h.center_of("control_pause"), MouseButton::Left);
    assert!(h.mode.paused);

    let mut painter = RecordingPainter::default();
    h.scene.paint(&mut painter, &h.mode);
    let red_outline = painter.ops.iter().any(|op| {
        matches!(op, elementum_core::scene::paint::PaintOp::Stroke(b, _, c)
            if *b == h.layout.canvas && *c == Rgba::RED)
    });
    assert!(red_outline);

    h.click(h.center_of("control_pause"), MouseButton::Left);
    assert!(!h.mode.paused);
}

#[test]
fn test_command_controls_emit() {
    let mut h = Harness::with_panel();
    for id in ["control_step", "control_save_state", "control_share_state"] {
        h.click(h.center_of(id), MouseButton::Left);
    }
    assert_eq!(
        h.commands,
        vec![Command::Step, Command::SaveState, Command::ShareState]
    );
}

// ============================================================================
// Menus
// ============================================================================

#[test]
fn test_resize_menu_size_button_emits_and_closes() {
    let mut h = Harness::with_panel();
    let before = h.scene.len();
    h.click(h.center_of("control_resize"), MouseButton::Left);
    assert!(h.mode.resize_menu_open);
    assert!(h.scene.get_by_id(resize_menu::CANCEL_ID).is_some());

    let target = h
        .scene
        .iter()
        .find(|el| el.label() == Some(resize_menu::size_label(4).as_str()))
        .map(|el| el.bounds.center())
        .unwrap();
    h.click(target, MouseButton::Left);

    assert_eq!(h.commands, vec![Command::Resize { units: 4 }]);
    assert!(!h.mode.resize_menu_open);
    assert_eq!(h.scene.len(), before);
}

#[test]
fn test_resize_control_toggles_menu_closed() {
    let mut h = Harness::with_panel();
    let before = h.scene.len();
    let at = h.center_of("control_resize");
    h.click(at, MouseButton::Left);
    h.click(at, MouseButton::Left);
    assert!(!h.mode.resize_menu_open);
    assert_eq!(h.scene.len(), before);
    assert!(h.commands.is_empty());
}

#[test]
fn test_share_dialog_copy_and_close() {
    let mut h = Harness::new();
    h.mode.share_dialog_open = true;
    let els = share_dialog::build(&h.layout);
    h.scene.extend(els);

    h.click(h.center_of(share_dialog::COPY_ID), MouseButton::Left);
    h.click(h.center_of(share_dialog::CLOSE_ID), MouseButton::Left);
    assert_eq!(h.commands, vec![Command::CopyLink, Command::ShareDialogClosed]);
    assert!(!h.mode.share_dialog_open);
    assert!(h.scene.is_empty());
}

#[test]
fn test_build_scene_includes_open_share_dialog() {
    let mut mode = UiMode::default();
    let layout = Layout::default();
    let catalog = Catalog::builtin();
    let base = ui::build_scene(&layout, &catalog, &mode).len();
    mode.share_dialog_open = true;
    let with_dialog = ui::build_scene(&layout, &catalog, &mode);
    assert_eq!(with_dialog.len(), base + 3);
    assert!(with_dialog.iter().any(|el| el.id() == Some(share_dialog::CLOSE_ID)));
}

#[test]
fn test_info_label_text() {
    let h = Harness::with_panel();
    let info = h.scene.get_by_id(panel::INFO_ID).unwrap();
    assert_eq!(info.label(), Some("peak 0.00"));
}

// ============================================================================
// Cursor
// ============================================================================

#[test]
fn test_cursor_follows_interactive_hover() {
    let mut h = Harness::with_panel();
    assert_eq!(h.events.cursor(&h.scene), elementum_core::CursorHint::Default);
    h.move_to(h.center_of("control_step"));
    assert_eq!(h.events.cursor(&h.scene), elementum_core::CursorHint::Pointer);
    h.move_to(h.center_of(panel::INFO_ID));
    assert_eq!(h.events.cursor(&h.scene), elementum_core::CursorHint::Default);
}
