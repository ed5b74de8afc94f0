//! Property tests: viewport transform invariants (sb-core).

use proptest::prelude::*;
use sb_core::{Point, Size, Vec2, Viewport};
use std::time::Instant;

fn viewport(pan: (f64, f64), zoom: f64) -> Viewport {
    let mut vp = Viewport::new(Size::new(1024.0, 768.0), 0.1, 5.0);
    vp.set_transform(Some(Vec2::new(pan.0, pan.1)), Some(zoom));
    vp
}

proptest! {
    #[test]
    fn screen_world_roundtrip(
        px in -5000.0f64..5000.0,
        py in -5000.0f64..5000.0,
        zoom in 0.1f64..5.0,
        x in -2000.0f64..2000.0,
        y in -2000.0f64..2000.0,
    ) {
        let vp = viewport((px, py), zoom);
        let p = Point::new(x, y);
        let back = vp.world_to_screen(vp.screen_to_world(p));
        prop_assert!((back.x - p.x).abs() < 1e-6);
        prop_assert!((back.y - p.y).abs() < 1e-6);
    }

    #[test]
    fn zoom_always_within_bounds(start in 0.1f64..5.0, target in -10.0f64..100.0) {
        let mut vp = viewport((0.0, 0.0), start);
        vp.zoom_to(target, None, Instant::now());
        prop_assert!(vp.zoom() >= 0.1 && vp.zoom() <= 5.0);
    }

    #[test]
    fn zoom_anchors_pivot(
        target in 0.1f64..5.0,
        sx in 0.0f64..1024.0,
        sy in 0.0f64..768.0,
    ) {
        let mut vp = viewport((13.0, -7.0), 1.3);
        let pivot = Point::new(sx, sy);
        let anchor = vp.screen_to_world(pivot);
        vp.zoom_to(target, Some(pivot), Instant::now());
        let after = vp.world_to_screen(anchor);
        prop_assert!((after.x - pivot.x).abs() < 1e-6);
        prop_assert!((after.y - pivot.y).abs() < 1e-6);
    }
}
