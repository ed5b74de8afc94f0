//! Hit testing: point → node lookup.
//!
//! Walks the registry in reverse paint order (front-to-back) so the topmost
//! node wins.

use sb_core::{NodeId, NodeRegistry, Point, Rect, Viewport};

/// Find the topmost node containing the world-space point `p`.
/// Returns `None` if no node is hit (background).
pub fn hit_test(registry: &NodeRegistry, p: Point) -> Option<NodeId> {
    registry.iter().rev().find(|n| n.contains(p)).map(|n| n.id)
}

/// Find the topmost node whose resize handle is under the screen-space
/// point `screen`.
///
/// The handle is a `handle_size` square (screen pixels, so it doesn't shrink
/// when zoomed out) centred on the node's bottom-right corner.
pub fn hit_resize_handle(
    registry: &NodeRegistry,
    viewport: &Viewport,
    screen: Point,
    handle_size: f64,
) -> Option<NodeId> {
    let half = handle_size / 2.0;
    registry
        .iter()
        .rev()
        .find(|n| {
            let corner = viewport.world_to_screen(n.rect().origin() + n.size.to_vec2());
            Rect::new(corner.x - half, corner.y - half, corner.x + half, corner.y + half)
                .contains(screen)
        })
        .map(|n| n.id)
}

/// Find all nodes whose bounds intersect the given world-space rectangle.
/// Used for box selection. Returned in paint order.
pub fn hit_test_rect(registry: &NodeRegistry, area: Rect) -> Vec<NodeId> {
    let area = area.abs();
    registry
        .iter()
        .filter(|n| n.intersects(area))
        .map(|n| n.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sb_core::{CanvasNode, NodeKind, Size, Vec2};

    fn registry() -> NodeRegistry {
        let mut reg = NodeRegistry::new();
        reg.insert(CanvasNode::new(
            NodeId::intern("under"),
            NodeKind::Text,
            Point::new(0.0, 0.0),
            Size::new(100.0, 100.0),
        ));
        reg.insert(CanvasNode::new(
            NodeId::intern("over"),
            NodeKind::ImageEditor,
            Point::new(50.0, 50.0),
            Size::new(100.0, 100.0),
        ));
        reg
    }

    #[test]
    fn topmost_node_wins() {
        let reg = registry();
        assert_eq!(hit_test(&reg, Point::new(75.0, 75.0)), Some(NodeId::intern("over")));
        assert_eq!(hit_test(&reg, Point::new(10.0, 10.0)), Some(NodeId::intern("under")));
        assert_eq!(hit_test(&reg, Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn resize_handle_is_screen_sized() {
        let reg = registry();
        let mut vp = Viewport::new(Size::new(800.0, 600.0), 0.1, 5.0);
        vp.set_transform(Some(Vec2::new(10.0, 10.0)), Some(2.0));
        // "over" bottom-right corner: world (150,150) → screen (310,310).
        assert_eq!(
            hit_resize_handle(&reg, &vp, Point::new(314.0, 306.0), 12.0),
            Some(NodeId::intern("over"))
        );
        assert_eq!(hit_resize_handle(&reg, &vp, Point::new(320.0, 310.0), 12.0), None);
        // "under" corner at world (100,100) → screen (210,210).
        assert_eq!(
            hit_resize_handle(&reg, &vp, Point::new(210.0, 210.0), 12.0),
            Some(NodeId::intern("under"))
        );
    }

    #[test]
    fn rect_hits_accept_unnormalized_boxes() {
        let reg = registry();
        // Drawn from bottom-right to top-left.
        let hits = hit_test_rect(&reg, Rect::new(140.0, 140.0, 120.0, 120.0));
        assert_eq!(hits, vec![NodeId::intern("over")]);
        let hits = hit_test_rect(&reg, Rect::new(-10.0, -10.0, 40.0, 40.0));
        assert_eq!(hits, vec![NodeId::intern("under")]);
    }
}
