//! Node registry plus per-node content and the current selection.
//!
//! Content is a tagged variant keyed by node kind: only image-editor nodes
//! carry a `RasterEditor`. The scene is the `ReplayTarget` undo/redo writes
//! into.

use crate::commands::ReplayTarget;
use crate::error::{EditorError, Result};
use crate::raster::{RasterContent, RasterEdit, RasterEditor, RasterState, Snapshot};
use image::RgbaImage;
use sb_core::{CanvasNode, NodeId, NodeKind, NodeRegistry};
use std::collections::HashMap;

// ─── Content ─────────────────────────────────────────────────────────────

/// Live per-node payload.
#[derive(Debug, Clone)]
pub enum NodeContent {
    Text,
    /// Picture shown by an upload node, once one has been loaded.
    ImageUpload(Option<RgbaImage>),
    ImageEditor(Box<RasterEditor>),
}

impl NodeContent {
    /// Fresh content for a node just created with `kind` and `node`'s size.
    pub fn for_node(node: &CanvasNode) -> Self {
        match node.kind {
            NodeKind::Text => NodeContent::Text,
            NodeKind::ImageUpload => NodeContent::ImageUpload(None),
            NodeKind::ImageEditor => {
                NodeContent::ImageEditor(Box::new(RasterEditor::new(node.size)))
            }
        }
    }

    pub fn capture(&self) -> Result<ContentRecord> {
        Ok(match self {
            NodeContent::Text => ContentRecord::Text,
            NodeContent::ImageUpload(image) => {
                ContentRecord::ImageUpload(image.as_ref().map(Snapshot::encode).transpose()?)
            }
            NodeContent::ImageEditor(editor) => ContentRecord::ImageEditor(editor.capture()?),
        })
    }

    pub fn rebuild(record: &ContentRecord) -> Result<Self> {
        Ok(match record {
            ContentRecord::Text => NodeContent::Text,
            ContentRecord::ImageUpload(snapshot) => {
                NodeContent::ImageUpload(snapshot.as_ref().map(Snapshot::decode).transpose()?)
            }
            ContentRecord::ImageEditor(content) => {
                NodeContent::ImageEditor(Box::new(RasterEditor::from_content(content)?))
            }
        })
    }
}

/// Encoded form of `NodeContent`, stored in history.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRecord {
    Text,
    ImageUpload(Option<Snapshot>),
    ImageEditor(RasterContent),
}

/// Everything needed to reconstruct a node with its original id.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub node: CanvasNode,
    pub content: ContentRecord,
}

// ─── Selection ───────────────────────────────────────────────────────────

/// Ordered set of selected node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<NodeId>);

impl Selection {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.0.contains(&id)
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn insert(&mut self, id: NodeId) {
        if !self.contains(id) {
            self.0.push(id);
        }
    }

    pub fn remove(&mut self, id: NodeId) {
        self.0.retain(|other| *other != id);
    }

    pub fn toggle(&mut self, id: NodeId) {
        if self.contains(id) {
            self.remove(id);
        } else {
            self.0.push(id);
        }
    }

    pub fn set_only(&mut self, id: NodeId) {
        self.0.clear();
        self.0.push(id);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the contents, dropping duplicates.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.0.clear();
        for id in ids {
            self.insert(id);
        }
    }

    /// Human-readable summary for the selection announcer.
    pub fn describe(&self) -> String {
        match self.0.len() {
            0 => "No nodes selected".to_string(),
            1 => "1 node selected".to_string(),
            n => format!("{n} nodes selected"),
        }
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Scene {
    pub nodes: NodeRegistry,
    contents: HashMap<NodeId, NodeContent>,
    pub selection: Selection,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a node with fresh content. Returns `false` on a duplicate id.
    pub fn insert(&mut self, node: CanvasNode) -> bool {
        if !self.nodes.insert(node) {
            return false;
        }
        self.contents.insert(node.id, NodeContent::for_node(&node));
        true
    }

    /// Remove a node together with its content and selection membership.
    pub fn remove(&mut self, id: NodeId) -> Option<(CanvasNode, NodeContent)> {
        let node = self.nodes.remove(id)?;
        self.selection.remove(id);
        let content = self.contents.remove(&id).unwrap_or_else(|| NodeContent::for_node(&node));
        Some((node, content))
    }

    pub fn content(&self, id: NodeId) -> Option<&NodeContent> {
        self.contents.get(&id)
    }

    pub fn content_mut(&mut self, id: NodeId) -> Option<&mut NodeContent> {
        self.contents.get_mut(&id)
    }

    pub fn raster(&self, id: NodeId) -> Option<&RasterEditor> {
        match self.contents.get(&id) {
            Some(NodeContent::ImageEditor(editor)) => Some(editor.as_ref()),
            _ => None,
        }
    }

    pub fn raster_mut(&mut self, id: NodeId) -> Option<&mut RasterEditor> {
        match self.contents.get_mut(&id) {
            Some(NodeContent::ImageEditor(editor)) => Some(editor.as_mut()),
            _ => None,
        }
    }

    /// Like `raster_mut`, but says why there is no editor.
    pub fn require_raster(&mut self, id: NodeId) -> Result<&mut RasterEditor> {
        if !self.nodes.contains(id) {
            return Err(EditorError::NodeNotFound(id));
        }
        self.raster_mut(id).ok_or(EditorError::NotAnImageEditor(id))
    }

    /// Every raster editor, in no particular order.
    pub fn rasters_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut RasterEditor)> + '_ {
        self.contents.iter_mut().filter_map(|(id, content)| match content {
            NodeContent::ImageEditor(editor) => Some((*id, editor.as_mut())),
            _ => None,
        })
    }

    /// Snapshot a node and its content for history.
    pub fn record(&self, id: NodeId) -> Result<NodeRecord> {
        let node = *self.nodes.get(id).ok_or(EditorError::NodeNotFound(id))?;
        let content = match self.contents.get(&id) {
            Some(content) => content.capture()?,
            None => NodeContent::for_node(&node).capture()?,
        };
        Ok(NodeRecord { node, content })
    }

    /// Make the raster surface of `id` (if any) match its node size. Returns
    /// the drawing-layer change when the surface was rescaled.
    pub fn sync_surface(&mut self, id: NodeId) -> Result<Option<RasterEdit>> {
        let Some(size) = self.nodes.get(id).map(|n| n.size) else {
            return Ok(None);
        };
        match self.raster_mut(id) {
            Some(editor) => editor.resize(size),
            None => Ok(None),
        }
    }

    /// Drop selection entries whose nodes no longer exist.
    pub fn prune_selection(&mut self) {
        let nodes = &self.nodes;
        self.selection.0.retain(|id| nodes.contains(*id));
    }
}

impl ReplayTarget for Scene {
    fn remove_node(&mut self, id: NodeId) {
        if self.remove(id).is_some() {
            log::info!("removed node {id}");
        } else {
            log::warn!("replay: node {id} already absent");
        }
    }

    fn restore_node(&mut self, record: &NodeRecord) -> Result<()> {
        let id = record.node.id;
        if self.nodes.contains(id) {
            log::debug!("replay: node {id} already present, skipped");
            return Ok(());
        }
        let content = NodeContent::rebuild(&record.content)?;
        self.nodes.insert(record.node);
        self.nodes.restore_geometry(&record.node);
        self.contents.insert(id, content);
        log::info!("restored node {id}");
        Ok(())
    }

    /// Geometry only; a resized editor's surface comes back through
    /// `restore_raster`.
    fn restore_geometry(&mut self, snapshot: &CanvasNode) {
        if !self.nodes.restore_geometry(snapshot) {
            log::warn!("replay: node {} not found", snapshot.id);
        }
    }

    fn restore_raster(&mut self, node: NodeId, state: &RasterState) -> Result<()> {
        self.require_raster(node)?.restore(state)
    }
}
