//! Canvas node model and the Node Registry.
//!
//! Nodes are axis-aligned rectangles in world coordinates. The registry is
//! the single owner of every placed node; everything else refers to nodes by
//! `NodeId`. Storage is a `StableGraph` arena so indices survive removals,
//! with an explicit paint order (last = topmost).

use crate::id::NodeId;
use kurbo::{Point, Rect, Size, Vec2};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ─── Node kinds ──────────────────────────────────────────────────────────

/// The kinds of node the canvas can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Text,
    ImageUpload,
    /// Hosts a raster sub-editor.
    ImageEditor,
}

impl NodeKind {
    /// Wire name used by hosts (`text`, `image-upload`, `image-editor`).
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::ImageUpload => "image-upload",
            NodeKind::ImageEditor => "image-editor",
        }
    }

    /// Prefix of freshly minted ids for this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::ImageUpload => "image_upload",
            NodeKind::ImageEditor => "image_editor",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(NodeKind::Text),
            "image-upload" => Ok(NodeKind::ImageUpload),
            "image-editor" => Ok(NodeKind::ImageEditor),
            other => Err(format!("unknown node kind `{other}`")),
        }
    }
}

// ─── Canvas node ─────────────────────────────────────────────────────────

/// A placed node. Doubles as its own geometry snapshot: it is `Copy` and
/// carries everything needed to reconstruct it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Top-left corner in world coordinates.
    pub position: Point,
    pub size: Size,
}

impl CanvasNode {
    pub fn new(id: NodeId, kind: NodeKind, position: Point, size: Size) -> Self {
        Self {
            id,
            kind,
            position,
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn contains(&self, p: Point) -> bool {
        let r = self.rect();
        p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
    }

    /// Strict AABB overlap against a (normalized) box.
    pub fn intersects(&self, area: Rect) -> bool {
        let r = self.rect();
        area.x0 < r.x1 && area.x1 > r.x0 && area.y0 < r.y1 && area.y1 > r.y0
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

/// Owns every node on the canvas.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    arena: StableGraph<CanvasNode, ()>,
    id_index: HashMap<NodeId, NodeIndex>,
    /// Paint order, bottom to top.
    order: Vec<NodeId>,
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Insert a node on top of the paint order.
    ///
    /// Returns `false` (and leaves the registry untouched) if a node with the
    /// same id is already present.
    pub fn insert(&mut self, node: CanvasNode) -> bool {
        if self.contains(node.id) {
            return false;
        }
        let idx = self.arena.add_node(node);
        self.id_index.insert(node.id, idx);
        self.order.push(node.id);
        true
    }

    pub fn remove(&mut self, id: NodeId) -> Option<CanvasNode> {
        let idx = self.id_index.remove(&id)?;
        self.order.retain(|other| *other != id);
        self.arena.remove_node(idx)
    }

    pub fn get(&self, id: NodeId) -> Option<&CanvasNode> {
        self.id_index.get(&id).map(|idx| &self.arena[*idx])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut CanvasNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.arena[idx])
    }

    /// Nodes in paint order (bottom first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CanvasNode> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.id_index.get(id).map(|idx| &self.arena[*idx]))
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_size(&mut self, id: NodeId, size: Size) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.size = size;
                true
            }
            None => false,
        }
    }

    pub fn translate(&mut self, id: NodeId, delta: Vec2) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.position += delta;
                true
            }
            None => false,
        }
    }

    /// Overwrite a node's geometry from a snapshot. The kind is not touched.
    pub fn restore_geometry(&mut self, snapshot: &CanvasNode) -> bool {
        match self.get_mut(snapshot.id) {
            Some(node) => {
                node.position = snapshot.position;
                node.size = snapshot.size;
                true
            }
            None => false,
        }
    }

    /// Snapshot the listed nodes, skipping ids that are not present.
    pub fn snapshot(&self, ids: &[NodeId]) -> Vec<CanvasNode> {
        ids.iter().filter_map(|id| self.get(*id).copied()).collect()
    }

    /// Union of every node rectangle, or `None` for an empty canvas.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.iter().map(CanvasNode::rect).reduce(|a, b| a.union(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(name: &str, x: f64, y: f64) -> CanvasNode {
        CanvasNode::new(
            NodeId::intern(name),
            NodeKind::Text,
            Point::new(x, y),
            Size::new(100.0, 50.0),
        )
    }

    #[test]
    fn registry_basics() {
        let mut reg = NodeRegistry::new();
        assert!(reg.insert(node("a", 0.0, 0.0)));
        assert!(reg.insert(node("b", 10.0, 10.0)));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.ids(), &[NodeId::intern("a"), NodeId::intern("b")]);

        let removed = reg.remove(NodeId::intern("a")).unwrap();
        assert_eq!(removed.position, Point::new(0.0, 0.0));
        assert!(!reg.contains(NodeId::intern("a")));
        assert_eq!(reg.ids(), &[NodeId::intern("b")]);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut reg = NodeRegistry::new();
        assert!(reg.insert(node("dup", 0.0, 0.0)));
        assert!(!reg.insert(node("dup", 50.0, 50.0)));
        assert_eq!(reg.get(NodeId::intern("dup")).unwrap().position, Point::ZERO);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn insert_after_remove_keeps_paint_order() {
        let mut reg = NodeRegistry::new();
        reg.insert(node("p", 0.0, 0.0));
        reg.insert(node("q", 0.0, 0.0));
        reg.remove(NodeId::intern("p"));
        reg.insert(node("r", 0.0, 0.0));
        let names: Vec<&str> = reg.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(names, vec!["q", "r"]);
    }

    #[test]
    fn restore_geometry_keeps_kind() {
        let mut reg = NodeRegistry::new();
        reg.insert(node("g", 0.0, 0.0));
        let mut snap = *reg.get(NodeId::intern("g")).unwrap();
        reg.translate(NodeId::intern("g"), Vec2::new(5.0, 5.0));
        snap.kind = NodeKind::ImageEditor;
        reg.restore_geometry(&snap);
        let restored = reg.get(NodeId::intern("g")).unwrap();
        assert_eq!(restored.position, Point::ZERO);
        assert_eq!(restored.kind, NodeKind::Text);
    }

    #[test]
    fn intersection_is_strict() {
        let n = node("i", 0.0, 0.0);
        // Touching edges do not count.
        assert!(!n.intersects(Rect::new(100.0, 0.0, 150.0, 50.0)));
        assert!(n.intersects(Rect::new(99.0, 49.0, 150.0, 80.0)));
    }

    #[test]
    fn kind_names_roundtrip() {
        for kind in [NodeKind::Text, NodeKind::ImageUpload, NodeKind::ImageEditor] {
            assert_eq!(kind.name().parse::<NodeKind>(), Ok(kind));
        }
        assert!("sticker".parse::<NodeKind>().is_err());
    }

    #[test]
    fn content_bounds_unions_nodes() {
        let mut reg = NodeRegistry::new();
        assert_eq!(reg.content_bounds(), None);
        reg.insert(node("c1", 0.0, 0.0));
        reg.insert(node("c2", 200.0, 100.0));
        assert_eq!(reg.content_bounds(), Some(Rect::new(0.0, 0.0, 300.0, 150.0)));
    }
}
