//! The editor engine: one context object owning every piece of editor state.
//!
//! Hosts feed it normalized input (`handle`, or the individual pointer/key
//! methods) and call `frame_tick` once per display frame. Nothing here
//! returns an error to the host: failed steps are logged and the engine stays
//! consistent.

use crate::announce::{LogAnnouncer, SelectionAnnouncer};
use crate::commands::{GeometryList, History, HistoryAction};
use crate::error::{EditorError, Result};
use crate::gesture::{GestureContext, GestureController};
use crate::input::{InputEvent, Modifiers};
use crate::raster::crop::CropMode;
use crate::scene::{NodeContent, Scene, Selection};
use crate::shortcuts::{Direction, ShortcutAction, ShortcutMap};
use crate::tools::ToolKind;
use image::RgbaImage;
use sb_core::{
    CanvasNode, EditorConfig, NodeId, NodeKind, NodeRegistry, Point, Rect, Size, Vec2, Viewport,
};
use sb_render::Overview;
use std::time::{Duration, Instant};

pub struct Engine {
    config: EditorConfig,
    viewport: Viewport,
    scene: Scene,
    history: History,
    gestures: GestureController,
    tool: ToolKind,
    announcer: Box<dyn SelectionAnnouncer>,
    /// Selection as last announced.
    announced: Selection,
}

impl Engine {
    pub fn new(config: EditorConfig, screen: Size) -> Self {
        let viewport = Viewport::new(screen, config.zoom_min, config.zoom_max)
            .with_transition(Duration::from_millis(config.transition_ms));
        Self {
            viewport,
            history: History::new(config.history_depth),
            config,
            scene: Scene::new(),
            gestures: GestureController::new(),
            tool: ToolKind::default(),
            announcer: Box::new(LogAnnouncer),
            announced: Selection::default(),
        }
    }

    pub fn with_announcer(mut self, announcer: impl SelectionAnnouncer + 'static) -> Self {
        self.announcer = Box::new(announcer);
        self
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.scene.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&CanvasNode> {
        self.scene.nodes.get(id)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &[NodeId] {
        self.scene.selection.ids()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch one normalized input event. Returns `false` for keys with no
    /// binding.
    pub fn handle(&mut self, event: &InputEvent, now: Instant) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::Wheel { x, y, delta_y } => {
                self.wheel(Point::new(*x, *y), *delta_y, now);
            }
            InputEvent::Key { key, modifiers } => return self.key(key, *modifiers, now),
        }
        true
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        self.with_gestures(|g, ctx| g.pointer_down(ctx, screen, modifiers));
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) {
        self.with_gestures(|g, ctx| g.pointer_move(ctx, screen, modifiers));
    }

    pub fn pointer_up(&mut self, screen: Point) {
        self.with_gestures(|g, ctx| g.pointer_up(ctx, screen));
    }

    /// Apply coalesced pointer moves and expire the zoom transition.
    pub fn frame_tick(&mut self, now: Instant) {
        self.with_gestures(|g, ctx| g.frame_tick(ctx));
        self.viewport.expire_transition(now);
    }

    /// Resolve and run a keyboard shortcut.
    pub fn key(&mut self, key: &str, modifiers: Modifiers, now: Instant) -> bool {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return false;
        };
        log::debug!("key {key:?} -> {action:?}");
        match action {
            ShortcutAction::Tool(tool) => self.set_tool(tool),
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                self.delete_selected();
            }
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Nudge(direction) => {
                self.nudge(direction, false);
            }
            ShortcutAction::NudgeLarge(direction) => {
                self.nudge(direction, true);
            }
            ShortcutAction::Confirm => {
                self.commit_crop();
            }
            ShortcutAction::Cancel => {
                if !self.cancel_crop() {
                    self.deselect();
                }
            }
            ShortcutAction::ZoomIn => {
                self.zoom_in(now);
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out(now);
            }
            ShortcutAction::ZoomReset => {
                self.zoom_reset(now);
            }
        }
        true
    }

    fn with_gestures<R>(
        &mut self,
        f: impl FnOnce(&mut GestureController, &mut GestureContext<'_>) -> R,
    ) -> R {
        let mut ctx = GestureContext {
            config: &self.config,
            viewport: &mut self.viewport,
            scene: &mut self.scene,
            history: &mut self.history,
            tool: self.tool,
        };
        let out = f(&mut self.gestures, &mut ctx);
        self.announce_selection();
        out
    }

    /// Commands that rewrite nodes wait until no gesture holds snapshots of
    /// them.
    fn busy(&self, what: &str) -> bool {
        if self.gestures.is_idle() {
            return false;
        }
        log::debug!("{what} ignored during {}", self.gestures.state().name());
        true
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Switch the active tool. Leaving the crop tool cancels any open box.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool == tool {
            return;
        }
        if self.tool == ToolKind::Crop {
            self.cancel_crop();
        }
        log::debug!("tool: {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_transform(&mut self, pan: Option<Vec2>, zoom: Option<f64>) {
        self.viewport.set_transform(pan, zoom);
    }

    pub fn set_screen_size(&mut self, screen: Size) {
        self.viewport.set_screen_size(screen);
    }

    pub fn zoom_to(&mut self, zoom: f64, pivot: Option<Point>, now: Instant) -> bool {
        self.viewport.zoom_to(zoom, pivot, now)
    }

    pub fn zoom_in(&mut self, now: Instant) -> bool {
        self.viewport.zoom_by(self.config.zoom_step, None, now)
    }

    pub fn zoom_out(&mut self, now: Instant) -> bool {
        self.viewport.zoom_by(1.0 / self.config.zoom_step, None, now)
    }

    pub fn zoom_reset(&mut self, now: Instant) -> bool {
        self.viewport.zoom_to(1.0, None, now)
    }

    /// Wheel zoom anchored at the cursor. `delta_y < 0` zooms in.
    pub fn wheel(&mut self, screen: Point, delta_y: f64, now: Instant) -> bool {
        let factor = if delta_y < 0.0 {
            self.config.zoom_step
        } else if delta_y > 0.0 {
            1.0 / self.config.zoom_step
        } else {
            return false;
        };
        self.viewport.zoom_by(factor, Some(screen), now)
    }

    /// Miniature projection of the canvas for the overview panel.
    pub fn overview(&self) -> Overview {
        Overview::project(&self.scene.nodes, &self.viewport, self.config.overview_size)
    }

    /// Click in the overview panel: centre the viewport on that spot.
    pub fn recenter_from_overview(&mut self, panel: Point) {
        let pan = self.overview().recenter_pan(panel, &self.viewport);
        self.viewport.set_transform(Some(pan), None);
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Create a node of `kind` with its top-left corner at `at` (world).
    pub fn create_node(&mut self, kind: NodeKind, at: Point) -> Option<NodeId> {
        let id = NodeId::fresh(kind.id_prefix());
        let node = CanvasNode::new(id, kind, at, self.config.default_size(kind));
        if !self.scene.insert(node) {
            log::warn!("create: id {id} already in use");
            return None;
        }
        let record = match self.scene.record(id) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("create {kind} aborted: {err}");
                self.scene.remove(id);
                return None;
            }
        };
        self.history.push(HistoryAction::Create { after: vec![record] });
        self.scene.selection.set_only(id);
        self.announce_selection();
        log::info!("created {kind} node {id} at ({}, {})", at.x, at.y);
        Some(id)
    }

    /// Like `create_node`, with the kind given by its wire name.
    pub fn create_node_named(&mut self, kind: &str, at: Point) -> Option<NodeId> {
        match kind.parse::<NodeKind>() {
            Ok(kind) => self.create_node(kind, at),
            Err(_) => {
                log::warn!("create aborted: {}", EditorError::UnknownNodeKind(kind.to_string()));
                None
            }
        }
    }

    /// Delete every selected node as one undoable action.
    pub fn delete_selected(&mut self) -> bool {
        if self.scene.selection.is_empty() || self.busy("delete") {
            return false;
        }
        let ids = self.scene.selection.ids().to_vec();
        let records = ids.iter().map(|id| self.scene.record(*id));
        let records = match records.collect::<Result<Vec<_>>>() {
            Ok(records) => records,
            Err(err) => {
                log::warn!("delete aborted: {err}");
                return false;
            }
        };
        for id in &ids {
            self.scene.remove(*id);
        }
        log::info!("deleted {} node(s)", records.len());
        self.history.push(HistoryAction::Delete { before: records });
        self.announce_selection();
        true
    }

    pub fn select_all(&mut self) {
        let ids = self.scene.nodes.ids().to_vec();
        self.scene.selection.replace(ids);
        self.announce_selection();
    }

    pub fn deselect(&mut self) {
        self.scene.selection.clear();
        self.announce_selection();
    }

    /// Move the selection one step in `direction` as one undoable action.
    pub fn nudge(&mut self, direction: Direction, large: bool) -> bool {
        if self.scene.selection.is_empty() || self.busy("nudge") {
            return false;
        }
        let step = if large {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        let (dx, dy) = direction.unit();
        let delta = Vec2::new(dx * step, dy * step);

        let ids = self.scene.selection.ids().to_vec();
        let before: GeometryList = self.scene.nodes.snapshot(&ids).into_iter().collect();
        for id in &ids {
            self.scene.nodes.translate(*id, delta);
        }
        let after: GeometryList = self.scene.nodes.snapshot(&ids).into_iter().collect();
        self.history.push(HistoryAction::Move { before, after })
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if self.busy("undo") {
            return false;
        }
        let done = self.history.undo(&mut self.scene);
        self.scene.prune_selection();
        self.announce_selection();
        done
    }

    pub fn redo(&mut self) -> bool {
        if self.busy("redo") {
            return false;
        }
        let done = self.history.redo(&mut self.scene);
        self.announce_selection();
        done
    }

    // ─── Raster editors ──────────────────────────────────────────────────

    /// Decode `bytes` and hand the image to `node`: an upload node shows it,
    /// an editor node uses it as its background. Non-image input is ignored.
    pub fn load_image(&mut self, node: NodeId, bytes: &[u8]) -> bool {
        let image = match decode_image(bytes) {
            Ok(image) => image,
            Err(err) => {
                log::debug!("ignoring input for {node}: {err}");
                return false;
            }
        };
        match self.scene.content_mut(node) {
            Some(NodeContent::ImageUpload(slot)) => {
                *slot = Some(image);
                true
            }
            Some(NodeContent::ImageEditor(editor)) => {
                editor.set_background(image);
                true
            }
            Some(NodeContent::Text) => {
                log::debug!("text node {node} does not take images");
                false
            }
            None => {
                log::warn!("load_image: {}", EditorError::NodeNotFound(node));
                false
            }
        }
    }

    /// The editor whose crop box is currently active, if any.
    fn active_crop(&self) -> Option<NodeId> {
        self.scene.nodes.ids().iter().copied().find(|id| {
            self.scene
                .raster(*id)
                .is_some_and(|editor| editor.crop().mode() == CropMode::Active)
        })
    }

    /// Commit the active crop box. Returns `false` (and logs) if there is
    /// none or it cannot be applied.
    pub fn commit_crop(&mut self) -> bool {
        let Some(id) = self.active_crop() else {
            log::debug!("commit_crop: no active crop box");
            return false;
        };
        let Some(editor) = self.scene.raster_mut(id) else {
            return false;
        };
        match editor.commit_crop() {
            Ok(edit) => self.history.push(HistoryAction::EditorModify { node: id, edit }),
            Err(err) => {
                log::warn!("crop on {id} aborted: {err}");
                false
            }
        }
    }

    /// Cancel every open crop box. Returns whether one was open.
    pub fn cancel_crop(&mut self) -> bool {
        let mut cancelled = false;
        for (id, editor) in self.scene.rasters_mut() {
            if editor.cancel_crop() {
                log::debug!("crop on {id} cancelled");
                cancelled = true;
            }
        }
        cancelled
    }

    /// Clear an editor's drawing layer as one undoable action.
    pub fn clear_drawing(&mut self, node: NodeId) -> bool {
        let edit = match self.scene.require_raster(node).and_then(|editor| editor.clear()) {
            Ok(Some(edit)) => edit,
            Ok(None) => return false,
            Err(err) => {
                log::warn!("clear on {node} aborted: {err}");
                return false;
            }
        };
        self.history.push(HistoryAction::EditorModify { node, edit })
    }

    /// Composite bitmap of an editor node.
    pub fn render_raster(&self, node: NodeId) -> Option<RgbaImage> {
        self.scene.raster(node).map(|editor| editor.render())
    }

    /// Crop box of `node`'s editor in world coordinates, for drawing.
    pub fn crop_box(&self, node: NodeId) -> Option<Rect> {
        let origin = self.scene.nodes.get(node)?.position.to_vec2();
        self.scene.raster(node)?.crop().rect().map(|r| r + origin)
    }

    // ─── Selection announcements ─────────────────────────────────────────

    fn announce_selection(&mut self) {
        if self.scene.selection == self.announced {
            return;
        }
        self.announced = self.scene.selection.clone();
        self.announcer.announce(&self.announced.describe());
    }
}

fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).map_err(EditorError::Decode)?;
    Ok(image.to_rgba8())
}
