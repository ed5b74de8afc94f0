//! Integration tests: pointer gestures, zoom, and the overview (sb-editor).

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sb_core::{EditorConfig, NodeKind, Point, Rect, Size, Vec2};
use sb_editor::{Engine, Gesture, InputEvent, Modifiers, ToolKind};
use std::time::{Duration, Instant};

fn engine() -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();
    Engine::new(EditorConfig::default(), Size::new(800.0, 600.0))
}

// ─── Box select ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn box_select_covers_inside_and_skips_outside(
        spots in prop::collection::vec((100.0..700.0f64, 100.0..500.0f64), 1..6),
        start in (0.0..50.0f64, 0.0..50.0f64),
        end in (50.0..800.0f64, 50.0..600.0f64),
    ) {
        let mut engine = engine();
        let ids: Vec<_> = spots
            .iter()
            .map(|(x, y)| engine.create_node(NodeKind::Text, Point::new(*x, *y)).unwrap())
            .collect();
        engine.deselect();

        let from = Point::new(start.0, start.1);
        let to = Point::new(end.0, end.1);
        engine.pointer_down(from, Modifiers::NONE);
        engine.pointer_move(to, Modifiers::NONE);
        engine.frame_tick(Instant::now());
        engine.pointer_up(to);

        let area = Rect::from_points(from, to);
        for id in ids {
            let r = engine.node(id).unwrap().rect();
            let selected = engine.selection().contains(&id);
            let inside = area.x0 <= r.x0 && r.x1 <= area.x1 && area.y0 <= r.y0 && r.y1 <= area.y1;
            if inside {
                prop_assert!(selected, "{id} inside {area:?} but not selected");
            }
            if r.intersect(area).area() == 0.0 {
                prop_assert!(!selected, "{id} outside {area:?} but selected");
            }
        }
        // Selection changes are never recorded.
        prop_assert_eq!(engine.history().len(), spots.len());
    }
}

#[test]
fn pan_tool_with_modifier_box_selects() {
    let mut engine = engine();
    let id = engine.create_node(NodeKind::Text, Point::new(100.0, 100.0)).unwrap();
    engine.deselect();
    engine.set_tool(ToolKind::Pan);

    engine.pointer_down(Point::new(50.0, 50.0), Modifiers::SHIFT);
    assert!(matches!(engine.gestures().state(), Gesture::BoxSelecting { .. }));
    engine.pointer_move(Point::new(150.0, 150.0), Modifiers::SHIFT);
    engine.frame_tick(Instant::now());
    engine.pointer_up(Point::new(150.0, 150.0));

    assert_eq!(engine.selection(), &[id]);
    assert_eq!(engine.viewport().pan(), Vec2::ZERO);
}

#[test]
fn unmodified_click_on_empty_canvas_clears_selection() {
    let mut engine = engine();
    engine.create_node(NodeKind::Text, Point::new(100.0, 100.0)).unwrap();
    engine.pointer_down(Point::new(600.0, 500.0), Modifiers::NONE);
    // Still selected while the button is held.
    assert_eq!(engine.selection().len(), 1);
    engine.pointer_up(Point::new(600.0, 500.0));
    assert!(engine.selection().is_empty());
    assert!(engine.gestures().is_idle());
}

#[test]
fn unmodified_box_select_keeps_prior_selection() {
    let mut engine = engine();
    let a = engine.create_node(NodeKind::Text, Point::new(0.0, 0.0)).unwrap();
    let b = engine.create_node(NodeKind::Text, Point::new(400.0, 300.0)).unwrap();

    // Click `a` to make it the sole selection.
    engine.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
    engine.pointer_up(Point::new(10.0, 10.0));
    assert_eq!(engine.selection(), &[a]);

    // Box around `b` only, no modifier held.
    engine.pointer_down(Point::new(380.0, 280.0), Modifiers::NONE);
    engine.pointer_move(Point::new(700.0, 450.0), Modifiers::NONE);
    engine.frame_tick(Instant::now());
    engine.pointer_up(Point::new(700.0, 450.0));
    assert_eq!(engine.selection(), &[a, b]);
}

#[test]
fn resize_under_low_zoom_is_capped() {
    let config = EditorConfig {
        max_node_size: 1000.0,
        ..EditorConfig::default()
    };
    let mut engine = Engine::new(config, Size::new(800.0, 600.0));
    let id = engine.create_node(NodeKind::ImageEditor, Point::new(0.0, 0.0)).unwrap();
    engine.set_transform(None, Some(0.1));

    // Handle at world (320, 240) sits at screen (32, 24).
    engine.pointer_down(Point::new(32.0, 24.0), Modifiers::NONE);
    engine.pointer_move(Point::new(2032.0, 2024.0), Modifiers::NONE);
    engine.pointer_up(Point::new(2032.0, 2024.0));

    let max = engine.config().max_node_size;
    assert_eq!(engine.node(id).unwrap().size, Size::new(max, max));
    let surface = engine.scene().raster(id).unwrap().surface();
    assert_eq!((surface.width(), surface.height()), (max as u32, max as u32));
}

// ─── Drag under zoom ─────────────────────────────────────────────────────

#[test]
fn drag_divides_screen_delta_by_zoom() {
    let mut engine = engine();
    let id = engine.create_node(NodeKind::Text, Point::new(0.0, 0.0)).unwrap();
    engine.set_transform(Some(Vec2::new(100.0, 100.0)), Some(0.5));

    // Node spans screen (100..200, 100..140) at this zoom.
    engine.pointer_down(Point::new(120.0, 110.0), Modifiers::NONE);
    engine.pointer_move(Point::new(140.0, 130.0), Modifiers::NONE);
    engine.frame_tick(Instant::now());
    engine.pointer_up(Point::new(140.0, 130.0));
    assert_eq!(engine.node(id).unwrap().position, Point::new(40.0, 40.0));
}

#[test]
fn coalesced_moves_apply_on_pointer_up() {
    let mut engine = engine();
    let id = engine.create_node(NodeKind::Text, Point::new(0.0, 0.0)).unwrap();
    engine.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
    engine.pointer_move(Point::new(20.0, 10.0), Modifiers::NONE);
    engine.pointer_move(Point::new(35.0, 25.0), Modifiers::NONE);
    // No frame tick: pointer-up flushes the last parked move.
    engine.pointer_up(Point::new(35.0, 25.0));
    assert_eq!(engine.node(id).unwrap().position, Point::new(25.0, 15.0));
    assert_eq!(engine.history().len(), 2);
}

// ─── Zoom ────────────────────────────────────────────────────────────────

#[test]
fn wheel_zoom_is_anchored_at_cursor() {
    let mut engine = engine();
    let cursor = Point::new(200.0, 150.0);
    let before = engine.viewport().screen_to_world(cursor);
    let now = Instant::now();
    assert!(engine.handle(
        &InputEvent::Wheel {
            x: cursor.x,
            y: cursor.y,
            delta_y: -1.0
        },
        now
    ));
    assert!((engine.viewport().zoom() - 1.2).abs() < 1e-9);
    let after = engine.viewport().screen_to_world(cursor);
    assert!((before - after).hypot() < 1e-9);
    assert!(engine.viewport().is_transitioning());

    engine.frame_tick(now + Duration::from_millis(250));
    assert!(!engine.viewport().is_transitioning());
}

#[test]
fn zoom_reset_at_current_zoom_is_noop() {
    let mut engine = engine();
    let now = Instant::now();
    assert!(!engine.zoom_reset(now));
    assert!(!engine.viewport().is_transitioning());
    assert!(engine.history().is_empty());

    for _ in 0..40 {
        engine.key("=", Modifiers { meta: true, ..Modifiers::NONE }, now);
    }
    assert_eq!(engine.viewport().zoom(), 5.0);
    assert!(engine.key("0", Modifiers { ctrl: true, ..Modifiers::NONE }, now));
    assert_eq!(engine.viewport().zoom(), 1.0);
}

// ─── Overview ────────────────────────────────────────────────────────────

#[test]
fn overview_click_recenters_viewport() {
    let mut engine = engine();
    engine.create_node(NodeKind::Text, Point::new(0.0, 0.0)).unwrap();
    engine.create_node(NodeKind::ImageEditor, Point::new(2000.0, 1500.0)).unwrap();

    let overview = engine.overview();
    assert_eq!(overview.nodes.len(), 2);
    let target = Point::new(2160.0, 1620.0);
    let panel = overview.to_panel(target);
    engine.recenter_from_overview(panel);

    let centre = engine.viewport().screen_to_world(engine.viewport().screen_center());
    assert!((centre - target).hypot() < 1e-6);
}

// ─── Tools ───────────────────────────────────────────────────────────────

#[test]
fn tool_keys_switch_tools() {
    let mut engine = engine();
    let now = Instant::now();
    for (key, tool) in [
        ("h", ToolKind::Pan),
        ("p", ToolKind::Pen),
        ("e", ToolKind::Eraser),
        ("m", ToolKind::MoveImage),
        ("s", ToolKind::Transform),
        ("c", ToolKind::Crop),
        ("t", ToolKind::Text),
        ("v", ToolKind::Select),
    ] {
        assert!(engine.key(key, Modifiers::NONE, now));
        assert_eq!(engine.tool(), tool);
    }
    assert!(!engine.key("F2", Modifiers::NONE, now));
}

#[test]
fn raster_tool_over_text_node_drags_it() {
    let mut engine = engine();
    let id = engine.create_node(NodeKind::Text, Point::new(0.0, 0.0)).unwrap();
    engine.set_tool(ToolKind::Pen);
    engine.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
    assert!(matches!(engine.gestures().state(), Gesture::DraggingNodes { .. }));
    engine.pointer_up(Point::new(10.0, 10.0));
    assert!(engine.node(id).is_some());
}

#[test]
fn raster_tool_on_empty_canvas_pans() {
    let mut engine = engine();
    engine.set_tool(ToolKind::Pen);
    engine.pointer_down(Point::new(400.0, 300.0), Modifiers::NONE);
    engine.pointer_move(Point::new(380.0, 310.0), Modifiers::NONE);
    engine.frame_tick(Instant::now());
    engine.pointer_up(Point::new(380.0, 310.0));
    assert_eq!(engine.viewport().pan(), Vec2::new(-20.0, 10.0));
}
