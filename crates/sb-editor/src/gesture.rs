//! Gesture Controller: the interaction state machine.
//!
//! One gesture (pointer-down → move* → up) maps to exactly one mode. The mode
//! is chosen on pointer-down, in priority order:
//!
//! | Pointer-down target                          | Mode            |
//! |----------------------------------------------|-----------------|
//! | image-editor node, raster tool active        | `Raster`        |
//! | resize handle                                | `ResizingNode`  |
//! | node body                                    | `DraggingNodes` |
//! | empty canvas, `Select` (or `Pan` + modifier) | `BoxSelecting`  |
//! | empty canvas, anything else                  | `Panning`       |
//!
//! Moves for the first four non-raster modes are parked in a
//! [`FrameCoalescer`] and applied once per `frame_tick`. Raster moves go
//! straight through so strokes have no gaps. Pointer-up always returns the
//! machine to `Idle`, then records at most one history action.
//!
//! A box-select always keeps the nodes selected before it started. Only an
//! unmodified click on empty canvas (box-select with no movement) clears the
//! selection.

use crate::coalesce::FrameCoalescer;
use crate::commands::{GeometryList, History, HistoryAction};
use crate::input::Modifiers;
use crate::raster::RasterTool;
use crate::scene::Scene;
use crate::tools::ToolKind;
use sb_core::{CanvasNode, EditorConfig, NodeId, NodeKind, Point, Rect, Size, Vec2, Viewport};
use sb_render::{hit_resize_handle, hit_test, hit_test_rect};
use smallvec::smallvec;

/// Everything a gesture reads or mutates, borrowed from the engine.
pub struct GestureContext<'a> {
    pub config: &'a EditorConfig,
    pub viewport: &'a mut Viewport,
    pub scene: &'a mut Scene,
    pub history: &'a mut History,
    pub tool: ToolKind,
}

/// Current interaction mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Panning {
        pointer_start: Point,
        pan_start: Vec2,
    },
    BoxSelecting {
        /// World-space corners.
        start: Point,
        current: Point,
        /// Selection at gesture start; always kept.
        initial: Vec<NodeId>,
        /// A click with no movement clears the selection.
        clear_on_click: bool,
    },
    DraggingNodes {
        pointer_start: Point,
        before: GeometryList,
    },
    ResizingNode {
        pointer_start: Point,
        before: CanvasNode,
    },
    /// Delegated to the raster editor of `node`.
    Raster { node: NodeId },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Panning { .. } => "panning",
            Gesture::BoxSelecting { .. } => "box-selecting",
            Gesture::DraggingNodes { .. } => "dragging",
            Gesture::ResizingNode { .. } => "resizing",
            Gesture::Raster { .. } => "raster",
        }
    }
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: Gesture,
    coalescer: FrameCoalescer,
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Gesture {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == Gesture::Idle
    }

    pub fn has_pending_move(&self) -> bool {
        self.coalescer.has_pending()
    }

    /// The box-select rectangle (world space, normalized) while one is open.
    pub fn selection_box(&self) -> Option<Rect> {
        match &self.state {
            Gesture::BoxSelecting { start, current, .. } => {
                Some(Rect::from_points(*start, *current))
            }
            _ => None,
        }
    }

    // ─── Pointer-down ────────────────────────────────────────────────────

    pub fn pointer_down(
        &mut self,
        ctx: &mut GestureContext<'_>,
        screen: Point,
        modifiers: Modifiers,
    ) {
        if !self.is_idle() {
            log::warn!("pointer-down while {}; finishing it first", self.state.name());
            self.pointer_up(ctx, screen);
        }

        let world = ctx.viewport.screen_to_world(screen);
        let hit = hit_test(&ctx.scene.nodes, world);
        let raster_target = ctx.tool.raster().zip(hit.filter(|id| {
            ctx.scene
                .nodes
                .get(*id)
                .is_some_and(|n| n.kind == NodeKind::ImageEditor)
        }));

        // A press anywhere but on an editor closes that editor's crop box.
        cancel_crops_except(ctx.scene, raster_target.map(|(_, id)| id));

        if let Some((tool, id)) = raster_target {
            self.begin_raster(ctx, tool, id, world, screen);
            return;
        }

        let handle_size = ctx.config.resize_handle_size;
        if let Some(id) = hit_resize_handle(&ctx.scene.nodes, &*ctx.viewport, screen, handle_size)
            && let Some(node) = ctx.scene.nodes.get(id).copied()
        {
            log::debug!("gesture: resize {id}");
            self.state = Gesture::ResizingNode {
                pointer_start: screen,
                before: node,
            };
            return;
        }

        if let Some(id) = hit {
            let selection = &mut ctx.scene.selection;
            if modifiers.toggles_selection() {
                selection.toggle(id);
            } else if !selection.contains(id) {
                selection.set_only(id);
            }
            let before: GeometryList = ctx
                .scene
                .nodes
                .snapshot(ctx.scene.selection.ids())
                .into_iter()
                .collect();
            log::debug!("gesture: drag {} node(s)", before.len());
            self.state = Gesture::DraggingNodes {
                pointer_start: screen,
                before,
            };
            return;
        }

        let additive = modifiers.toggles_selection();
        let box_select = ctx.tool == ToolKind::Select || (ctx.tool == ToolKind::Pan && additive);
        if box_select {
            log::debug!("gesture: box-select");
            self.state = Gesture::BoxSelecting {
                start: world,
                current: world,
                initial: ctx.scene.selection.ids().to_vec(),
                clear_on_click: !additive,
            };
        } else {
            log::debug!("gesture: pan");
            self.state = Gesture::Panning {
                pointer_start: screen,
                pan_start: ctx.viewport.pan(),
            };
        }
    }

    fn begin_raster(
        &mut self,
        ctx: &mut GestureContext<'_>,
        tool: RasterTool,
        id: NodeId,
        world: Point,
        screen: Point,
    ) {
        let Some(origin) = ctx.scene.nodes.get(id).map(|n| n.position) else {
            return;
        };
        let Some(editor) = ctx.scene.raster_mut(id) else {
            return;
        };
        let local = world - origin.to_vec2();
        match editor.pointer_down(tool, local, screen, ctx.config) {
            Ok(edit) => {
                log::debug!("gesture: raster {tool:?} on {id}");
                if let Some(edit) = edit {
                    ctx.history.push(HistoryAction::EditorModify { node: id, edit });
                }
                self.state = Gesture::Raster { node: id };
            }
            Err(err) => {
                log::warn!("raster {tool:?} on {id} aborted: {err}");
                editor.abort_interaction();
            }
        }
    }

    // ─── Pointer-move ────────────────────────────────────────────────────

    pub fn pointer_move(
        &mut self,
        ctx: &mut GestureContext<'_>,
        screen: Point,
        modifiers: Modifiers,
    ) {
        match self.state {
            Gesture::Idle => {}
            Gesture::Raster { node } => {
                let Some(origin) = ctx.scene.nodes.get(node).map(|n| n.position) else {
                    return;
                };
                let local = ctx.viewport.screen_to_world(screen) - origin.to_vec2();
                if let Some(editor) = ctx.scene.raster_mut(node) {
                    editor.pointer_move(local, screen, modifiers, ctx.config);
                }
            }
            _ => self.coalescer.push(screen, modifiers),
        }
    }

    /// Apply the latest parked move, if any. Called once per display frame.
    pub fn frame_tick(&mut self, ctx: &mut GestureContext<'_>) {
        if let Some(pending) = self.coalescer.flush() {
            self.apply(ctx, pending.position);
        }
    }

    fn apply(&mut self, ctx: &mut GestureContext<'_>, screen: Point) {
        match &mut self.state {
            Gesture::Panning {
                pointer_start,
                pan_start,
            } => {
                ctx.viewport
                    .set_transform(Some(*pan_start + (screen - *pointer_start)), None);
            }
            Gesture::DraggingNodes { pointer_start, before } => {
                let delta = ctx.viewport.screen_delta_to_world(screen - *pointer_start);
                for start in before.iter() {
                    ctx.scene.nodes.set_position(start.id, start.position + delta);
                }
            }
            Gesture::ResizingNode { pointer_start, before } => {
                let delta = ctx.viewport.screen_delta_to_world(screen - *pointer_start);
                let size = Size::new(
                    ctx.config.clamp_node_side(before.size.width + delta.x),
                    ctx.config.clamp_node_side(before.size.height + delta.y),
                );
                ctx.scene.nodes.set_size(before.id, size);
            }
            Gesture::BoxSelecting {
                start,
                current,
                initial,
                ..
            } => {
                *current = ctx.viewport.screen_to_world(screen);
                let covered = hit_test_rect(&ctx.scene.nodes, Rect::from_points(*start, *current));
                ctx.scene
                    .selection
                    .replace(initial.iter().copied().chain(covered));
            }
            Gesture::Idle | Gesture::Raster { .. } => {}
        }
    }

    // ─── Pointer-up ──────────────────────────────────────────────────────

    /// Finish the gesture. The machine is back to `Idle` no matter what the
    /// finalize step does.
    pub fn pointer_up(&mut self, ctx: &mut GestureContext<'_>, _screen: Point) {
        if let Some(pending) = self.coalescer.flush() {
            self.apply(ctx, pending.position);
        }
        self.coalescer.clear();
        let state = std::mem::take(&mut self.state);
        log::debug!("gesture: {} finished", state.name());

        match state {
            Gesture::DraggingNodes { before, .. } => {
                let after: GeometryList = before
                    .iter()
                    .filter_map(|start| ctx.scene.nodes.get(start.id).copied())
                    .collect();
                if after != before {
                    ctx.history.push(HistoryAction::Move { before, after });
                }
            }
            Gesture::ResizingNode { before, .. } => {
                if let Some(after) = ctx.scene.nodes.get(before.id).copied()
                    && after != before
                {
                    let drawing = match ctx.scene.sync_surface(before.id) {
                        Ok(drawing) => drawing,
                        Err(err) => {
                            log::warn!("resize of {} not recorded: {err}", before.id);
                            ctx.scene.nodes.restore_geometry(&before);
                            return;
                        }
                    };
                    ctx.history.push(HistoryAction::Resize {
                        before: smallvec![before],
                        after: smallvec![after],
                        drawing,
                    });
                }
            }
            Gesture::BoxSelecting {
                start,
                current,
                clear_on_click: true,
                ..
            } if start == current => {
                ctx.scene.selection.clear();
            }
            Gesture::Raster { node } => {
                let Some(editor) = ctx.scene.raster_mut(node) else {
                    return;
                };
                match editor.pointer_up(ctx.config) {
                    Ok(Some(edit)) => {
                        ctx.history.push(HistoryAction::EditorModify { node, edit });
                    }
                    Ok(None) => {}
                    Err(err) => log::warn!("raster edit on {node} not recorded: {err}"),
                }
            }
            Gesture::Idle | Gesture::Panning { .. } | Gesture::BoxSelecting { .. } => {}
        }
    }
}

fn cancel_crops_except(scene: &mut Scene, keep: Option<NodeId>) {
    for (id, editor) in scene.rasters_mut() {
        if Some(id) != keep && editor.cancel_crop() {
            log::debug!("crop on {id} cancelled");
        }
    }
}
