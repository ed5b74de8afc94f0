//! Undo/Redo command history.
//!
//! A flat list of `HistoryAction`s with a cursor pointing at the most
//! recently applied one (`-1` = nothing applied). Pushing while the cursor
//! is not at the tail destroys the redo tail.
//!
//! Every action stores full before/after snapshots (node geometry, node
//! records, or whole bitmaps), so replaying one never depends on the actions
//! around it. Replay is done through a `ReplayTarget` while recording is
//! suppressed; see [`History::suppress_recording`].

use crate::error::Result;
use crate::raster::{RasterEdit, RasterState};
use crate::scene::NodeRecord;
use sb_core::{CanvasNode, NodeId};
use smallvec::SmallVec;
use std::cell::Cell;
use std::rc::Rc;

/// Geometry snapshots of the nodes one action touched.
pub type GeometryList = SmallVec<[CanvasNode; 4]>;

/// One reversible user action.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// Nodes were created. `before` is implicitly empty.
    Create { after: Vec<NodeRecord> },
    /// Nodes were deleted. `after` is implicitly empty.
    Delete { before: Vec<NodeRecord> },
    Move { before: GeometryList, after: GeometryList },
    /// Node sizes changed. For an image editor, `drawing` holds its drawing
    /// layer on both sides of the rescale.
    Resize {
        before: GeometryList,
        after: GeometryList,
        drawing: Option<RasterEdit>,
    },
    /// A raster editor's bitmap (and possibly its placement) changed.
    EditorModify { node: NodeId, edit: RasterEdit },
}

impl HistoryAction {
    /// Short tag used in logs (`create`, `move`, `editor:modify`, ...).
    pub fn label(&self) -> &'static str {
        match self {
            HistoryAction::Create { .. } => "create",
            HistoryAction::Delete { .. } => "delete",
            HistoryAction::Move { .. } => "move",
            HistoryAction::Resize { .. } => "resize",
            HistoryAction::EditorModify { .. } => "editor:modify",
        }
    }
}

/// What undo/redo writes into.
pub trait ReplayTarget {
    /// Remove a node (no-op if absent).
    fn remove_node(&mut self, id: NodeId);
    /// Reconstruct a node with its original id. Must skip ids that already
    /// exist.
    fn restore_node(&mut self, record: &NodeRecord) -> Result<()>;
    /// Overwrite a node's position and size.
    fn restore_geometry(&mut self, snapshot: &CanvasNode);
    /// Restore one side of a raster edit.
    fn restore_raster(&mut self, node: NodeId, state: &RasterState) -> Result<()>;
}

/// Which side of an action to restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Before,
    After,
}

/// Scoped "do not record" flag. Recording resumes when the guard drops, on
/// every exit path.
#[must_use = "recording resumes as soon as the guard is dropped"]
pub struct SuppressRecording {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for SuppressRecording {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Linear undo/redo history.
#[derive(Debug)]
pub struct History {
    actions: Vec<HistoryAction>,
    /// Index of the last applied action; `-1` when none is.
    cursor: isize,
    max_depth: usize,
    suppressed: Rc<Cell<bool>>,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            actions: Vec::with_capacity(max_depth.min(64)),
            cursor: -1,
            max_depth: max_depth.max(1),
            suppressed: Rc::new(Cell::new(false)),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn actions(&self) -> &[HistoryAction] {
        &self.actions
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.actions.len() as isize - 1
    }

    pub fn is_recording(&self) -> bool {
        !self.suppressed.get()
    }

    /// Suppress `push` until the returned guard drops.
    pub fn suppress_recording(&self) -> SuppressRecording {
        let previous = self.suppressed.replace(true);
        SuppressRecording {
            flag: Rc::clone(&self.suppressed),
            previous,
        }
    }

    /// Record an action. Returns `false` if recording is suppressed.
    pub fn push(&mut self, action: HistoryAction) -> bool {
        if self.suppressed.get() {
            log::debug!("history: dropped {} during replay", action.label());
            return false;
        }
        let keep = (self.cursor + 1) as usize;
        if keep < self.actions.len() {
            log::debug!("history: discarding {} redo entries", self.actions.len() - keep);
            self.actions.truncate(keep);
        }
        log::debug!("history: push {}", action.label());
        self.actions.push(action);
        if self.actions.len() > self.max_depth {
            self.actions.remove(0);
        }
        self.cursor = self.actions.len() as isize - 1;
        true
    }

    /// Step back one action. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, target: &mut impl ReplayTarget) -> bool {
        if self.cursor < 0 {
            return false;
        }
        let _guard = self.suppress_recording();
        let action = &self.actions[self.cursor as usize];
        log::debug!("history: undo {} (cursor {})", action.label(), self.cursor);
        replay(action, Side::Before, target);
        self.cursor -= 1;
        true
    }

    /// Step forward one action. Returns `false` if already at the tail.
    pub fn redo(&mut self, target: &mut impl ReplayTarget) -> bool {
        if !self.can_redo() {
            return false;
        }
        let _guard = self.suppress_recording();
        self.cursor += 1;
        let action = &self.actions[self.cursor as usize];
        log::debug!("history: redo {} (cursor {})", action.label(), self.cursor);
        replay(action, Side::After, target);
        true
    }
}

fn replay(action: &HistoryAction, side: Side, target: &mut impl ReplayTarget) {
    match (action, side) {
        (HistoryAction::Create { after: records }, Side::Before)
        | (HistoryAction::Delete { before: records }, Side::After) => {
            for record in records {
                target.remove_node(record.node.id);
            }
        }
        (HistoryAction::Create { after: records }, Side::After)
        | (HistoryAction::Delete { before: records }, Side::Before) => {
            for record in records {
                if let Err(err) = target.restore_node(record) {
                    log::warn!("history: could not restore {}: {err}", record.node.id);
                }
            }
        }
        (HistoryAction::Move { before, after }, side) => {
            let snapshots = if side == Side::Before { before } else { after };
            for snapshot in snapshots {
                target.restore_geometry(snapshot);
            }
        }
        (
            HistoryAction::Resize {
                before,
                after,
                drawing,
            },
            side,
        ) => {
            let snapshots = if side == Side::Before { before } else { after };
            for snapshot in snapshots {
                target.restore_geometry(snapshot);
            }
            if let Some(edit) = drawing
                && let Some(node) = snapshots.first().map(|n| n.id)
            {
                let state = if side == Side::Before {
                    &edit.before
                } else {
                    &edit.after
                };
                if let Err(err) = target.restore_raster(node, state) {
                    log::warn!("history: could not restore drawing of {node}: {err}");
                }
            }
        }
        (HistoryAction::EditorModify { node, edit }, side) => {
            let state = if side == Side::Before {
                &edit.before
            } else {
                &edit.after
            };
            if let Err(err) = target.restore_raster(*node, state) {
                log::warn!("history: could not restore bitmap of {node}: {err}");
            }
        }
    }
}
