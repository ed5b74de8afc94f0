//! Integration tests: background placement and cropping (sb-editor).

use image::{ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use sb_core::{EditorConfig, NodeId, NodeKind, Point, Size, Vec2};
use sb_editor::raster::crop::CropMode;
use sb_editor::{Engine, HistoryAction, Modifiers, Placement, ToolKind};
use std::io::Cursor;
use std::time::Instant;

fn png(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode test image");
    buf
}

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 77, 255]))
}

/// A 200×200 editor node at the origin with a 200×100 background.
fn setup() -> (Engine, NodeId, RgbaImage) {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = EditorConfig {
        image_editor_size: Size::new(200.0, 200.0),
        ..EditorConfig::default()
    };
    let mut engine = Engine::new(config, Size::new(800.0, 600.0));
    let id = engine.create_node(NodeKind::ImageEditor, Point::ZERO).unwrap();
    let background = gradient(200, 100);
    assert!(engine.load_image(id, &png(&background)));
    (engine, id, background)
}

fn gesture(engine: &mut Engine, from: Point, to: Point) {
    engine.pointer_down(from, Modifiers::NONE);
    engine.pointer_move(to, Modifiers::NONE);
    engine.frame_tick(Instant::now());
    engine.pointer_up(to);
}

fn placement(engine: &Engine, id: NodeId) -> Placement {
    engine.scene().raster(id).unwrap().placement()
}

/// Scale 2, offset (50, 0) via the transform and move tools.
fn place_scaled(engine: &mut Engine, id: NodeId) {
    engine.set_tool(ToolKind::Transform);
    gesture(engine, Point::new(100.0, 100.0), Point::new(100.0, 300.0));
    assert!((placement(engine, id).scale - 2.0).abs() < 1e-9);

    engine.set_tool(ToolKind::MoveImage);
    gesture(engine, Point::new(100.0, 100.0), Point::new(150.0, 100.0));
    assert_eq!(placement(engine, id).offset, Vec2::new(50.0, 0.0));
}

fn define_crop(engine: &mut Engine, from: Point, to: Point) {
    engine.set_tool(ToolKind::Crop);
    gesture(engine, from, to);
}

#[test]
fn placement_changes_are_not_recorded() {
    let (mut engine, id, _) = setup();
    place_scaled(&mut engine, id);
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn crop_commit_and_undo_scenario() {
    let (mut engine, id, background) = setup();
    place_scaled(&mut engine, id);

    define_crop(&mut engine, Point::new(10.0, 10.0), Point::new(110.0, 110.0));
    assert_eq!(engine.scene().raster(id).unwrap().crop().mode(), CropMode::Active);
    assert!(engine.key("Enter", Modifiers::NONE, Instant::now()));

    let editor = engine.scene().raster(id).unwrap();
    let cropped = editor.background().unwrap().clone();
    // Source rectangle (30, 5)-(80, 55).
    assert_eq!(cropped.dimensions(), (50, 50));
    assert_eq!(cropped.get_pixel(0, 0), background.get_pixel(30, 5));
    assert_eq!(editor.placement(), Placement::default());
    assert_eq!(editor.crop().mode(), CropMode::None);
    assert!(matches!(
        engine.history().actions().last(),
        Some(HistoryAction::EditorModify { .. })
    ));

    engine.undo();
    let editor = engine.scene().raster(id).unwrap();
    assert_eq!(editor.background().unwrap(), &background);
    assert_eq!(
        editor.placement(),
        Placement {
            offset: Vec2::new(50.0, 0.0),
            scale: 2.0,
        }
    );

    engine.redo();
    let editor = engine.scene().raster(id).unwrap();
    assert_eq!(editor.background().unwrap(), &cropped);
    assert_eq!(editor.placement(), Placement::default());
}

#[test]
fn tiny_box_is_discarded() {
    let (mut engine, id, _) = setup();
    define_crop(&mut engine, Point::new(10.0, 10.0), Point::new(15.0, 90.0));
    assert_eq!(engine.scene().raster(id).unwrap().crop().mode(), CropMode::None);
    assert!(!engine.commit_crop());
}

#[test]
fn degenerate_crop_stays_active() {
    let (mut engine, id, background) = setup();
    // Background is letterboxed at y 50..150; this box is entirely above it.
    define_crop(&mut engine, Point::new(10.0, 0.0), Point::new(120.0, 40.0));
    let history_len = engine.history().len();

    assert!(!engine.commit_crop());
    let editor = engine.scene().raster(id).unwrap();
    assert_eq!(editor.crop().mode(), CropMode::Active);
    assert_eq!(editor.background().unwrap(), &background);
    assert_eq!(engine.history().len(), history_len);
}

#[test]
fn escape_cancels_crop_before_deselecting() {
    let (mut engine, id, _) = setup();
    define_crop(&mut engine, Point::new(10.0, 60.0), Point::new(120.0, 140.0));
    assert!(!engine.selection().is_empty());

    engine.key("Escape", Modifiers::NONE, Instant::now());
    assert_eq!(engine.scene().raster(id).unwrap().crop().mode(), CropMode::None);
    assert!(!engine.selection().is_empty());

    engine.key("Escape", Modifiers::NONE, Instant::now());
    assert!(engine.selection().is_empty());
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn press_outside_box_cancels() {
    let (mut engine, id, _) = setup();
    define_crop(&mut engine, Point::new(10.0, 60.0), Point::new(100.0, 140.0));
    engine.pointer_down(Point::new(180.0, 20.0), Modifiers::NONE);
    engine.pointer_up(Point::new(180.0, 20.0));
    assert_eq!(engine.scene().raster(id).unwrap().crop().mode(), CropMode::None);
}

#[test]
fn switching_tool_cancels() {
    let (mut engine, id, _) = setup();
    define_crop(&mut engine, Point::new(10.0, 60.0), Point::new(100.0, 140.0));
    engine.key("p", Modifiers::NONE, Instant::now());
    assert_eq!(engine.tool(), ToolKind::Pen);
    assert_eq!(engine.scene().raster(id).unwrap().crop().mode(), CropMode::None);
}

#[test]
fn crop_box_is_reported_in_world_space() {
    let (mut engine, id, _) = setup();
    engine.pointer_down(Point::ZERO, Modifiers::NONE);
    engine.pointer_up(Point::ZERO);
    // Move the node away from the origin, then crop in local space.
    engine.key("ArrowRight", Modifiers::SHIFT, Instant::now());
    define_crop(&mut engine, Point::new(20.0, 60.0), Point::new(110.0, 140.0));
    let world = engine.crop_box(id).unwrap();
    assert_eq!(world.origin(), Point::new(20.0, 60.0));
    let local = engine.scene().raster(id).unwrap().crop().rect().unwrap();
    assert_eq!(local.origin(), Point::new(10.0, 60.0));
}

#[test]
fn non_image_bytes_are_ignored() {
    let (mut engine, id, background) = setup();
    assert!(!engine.load_image(id, b"definitely not a picture"));
    assert_eq!(engine.scene().raster(id).unwrap().background().unwrap(), &background);
}

#[test]
fn upload_node_shows_loaded_picture() {
    let (mut engine, _, background) = setup();
    let upload = engine.create_node(NodeKind::ImageUpload, Point::new(400.0, 0.0)).unwrap();
    assert!(engine.load_image(upload, &png(&background)));
    assert!(matches!(
        engine.scene().content(upload),
        Some(sb_editor::NodeContent::ImageUpload(Some(img))) if img == &background
    ));
}
