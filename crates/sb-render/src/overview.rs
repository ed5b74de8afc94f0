//! Overview (minimap) projection.
//!
//! A pure projection of node geometry and the viewport frame into a small
//! panel. Pixel drawing is left to the host; this module only computes where
//! things go, plus the inverse mapping used by click-to-recenter.

use sb_core::{NodeId, NodeKind, NodeRegistry, Point, Rect, Size, Vec2, Viewport};

/// Fraction of the projected world area added as margin on every side.
const MARGIN: f64 = 0.1;

/// A node as drawn in the overview panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverviewNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub rect: Rect,
}

/// The computed overview for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    /// World area covered by the panel.
    pub world: Rect,
    /// Panel pixels per world unit.
    pub scale: f64,
    /// Panel-space offset of `world.origin()`.
    pub offset: Vec2,
    pub nodes: Vec<OverviewNode>,
    /// The viewport frame indicator, in panel space.
    pub frame: Rect,
}

impl Overview {
    /// Project every node plus the visible frame into a `panel`-sized area.
    pub fn project(registry: &NodeRegistry, viewport: &Viewport, panel: Size) -> Self {
        let visible = viewport.frame();
        let content = registry
            .content_bounds()
            .map_or(visible, |bounds| bounds.union(visible));
        let world = content.inflate(content.width() * MARGIN, content.height() * MARGIN);

        let scale = if world.width() > 0.0 && world.height() > 0.0 {
            (panel.width / world.width()).min(panel.height / world.height())
        } else {
            1.0
        };
        // Centre the projected area inside the panel.
        let offset = Vec2::new(
            (panel.width - world.width() * scale) / 2.0,
            (panel.height - world.height() * scale) / 2.0,
        );

        let mut overview = Self {
            world,
            scale,
            offset,
            nodes: Vec::with_capacity(registry.len()),
            frame: Rect::ZERO,
        };
        overview.nodes = registry
            .iter()
            .map(|n| OverviewNode {
                id: n.id,
                kind: n.kind,
                rect: overview.rect_to_panel(n.rect()),
            })
            .collect();
        overview.frame = overview.rect_to_panel(visible);
        overview
    }

    pub fn to_panel(&self, world: Point) -> Point {
        Point::new(
            (world.x - self.world.x0) * self.scale + self.offset.x,
            (world.y - self.world.y0) * self.scale + self.offset.y,
        )
    }

    pub fn to_world(&self, panel: Point) -> Point {
        Point::new(
            (panel.x - self.offset.x) / self.scale + self.world.x0,
            (panel.y - self.offset.y) / self.scale + self.world.y0,
        )
    }

    fn rect_to_panel(&self, r: Rect) -> Rect {
        Rect::from_points(self.to_panel(r.origin()), self.to_panel(Point::new(r.x1, r.y1)))
    }

    /// Pan that centres the main viewport on the world point under a click at
    /// `panel` (panel-space). Feed the result to `Viewport::set_transform`.
    pub fn recenter_pan(&self, panel: Point, viewport: &Viewport) -> Vec2 {
        let target = self.to_world(panel);
        let center = viewport.screen_center();
        let zoom = viewport.zoom();
        Vec2::new(center.x - target.x * zoom, center.y - target.y * zoom)
    }
}
