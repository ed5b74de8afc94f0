//! Viewport transform: pan/zoom and screen ↔ world conversion.
//!
//! `screen = world * zoom + pan`. Pan is unconstrained; zoom always stays
//! inside the configured bounds.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Pan/zoom state of the visible surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pan: Vec2,
    zoom: f64,
    zoom_min: f64,
    zoom_max: f64,
    /// Size of the visible surface in screen pixels.
    screen: Size,
    /// World-space rectangle currently visible. This is the frame indicator
    /// the overview draws; it is recomputed on every transform change.
    frame: Rect,
    #[serde(skip)]
    transition: Transition,
}

/// Transient "animate this change" flag, cleared after a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Transition {
    until: Option<Instant>,
    duration: Duration,
}

impl Viewport {
    pub fn new(screen: Size, zoom_min: f64, zoom_max: f64) -> Self {
        let mut viewport = Self {
            pan: Vec2::ZERO,
            zoom: 1.0_f64.clamp(zoom_min, zoom_max),
            zoom_min,
            zoom_max,
            screen,
            frame: Rect::ZERO,
            transition: Transition::default(),
        };
        viewport.recompute_frame();
        viewport
    }

    pub fn with_transition(mut self, duration: Duration) -> Self {
        self.transition.duration = duration;
        self
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    pub fn screen_center(&self) -> Point {
        Point::new(self.screen.width / 2.0, self.screen.height / 2.0)
    }

    /// Visible world rectangle (the overview's frame indicator).
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// World → screen as an affine map.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    /// Convert a screen-space delta into world units.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Merge the provided fields over the current state. Zoom is clamped.
    pub fn set_transform(&mut self, pan: Option<Vec2>, zoom: Option<f64>) {
        if let Some(pan) = pan {
            self.pan = pan;
        }
        if let Some(zoom) = zoom {
            self.zoom = zoom.clamp(self.zoom_min, self.zoom_max);
        }
        self.recompute_frame();
    }

    /// Zoom to `target`, keeping the world point under `pivot` (screen space,
    /// default: viewport centre) fixed on screen.
    ///
    /// Returns `false` and touches nothing when the clamped target equals the
    /// current zoom.
    pub fn zoom_to(&mut self, target: f64, pivot: Option<Point>, now: Instant) -> bool {
        let target = target.clamp(self.zoom_min, self.zoom_max);
        if target == self.zoom {
            return false;
        }
        let pivot = pivot.unwrap_or_else(|| self.screen_center());
        let anchor = self.screen_to_world(pivot);
        let pan = Vec2::new(pivot.x - anchor.x * target, pivot.y - anchor.y * target);
        log::debug!("zoom {:.3} -> {:.3} around {:?}", self.zoom, target, pivot);
        self.set_transform(Some(pan), Some(target));
        self.transition.until = Some(now + self.transition.duration);
        true
    }

    /// Multiply the current zoom by `factor` (wheel notch, zoom in/out).
    pub fn zoom_by(&mut self, factor: f64, pivot: Option<Point>, now: Instant) -> bool {
        self.zoom_to(self.zoom * factor, pivot, now)
    }

    /// Resize the visible surface (host window resized).
    pub fn set_screen_size(&mut self, screen: Size) {
        self.screen = screen;
        self.recompute_frame();
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.until.is_some()
    }

    /// Clear the transition flag once its duration has elapsed.
    pub fn expire_transition(&mut self, now: Instant) {
        if let Some(until) = self.transition.until
            && now >= until
        {
            self.transition.until = None;
        }
    }

    fn recompute_frame(&mut self) {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(self.screen.width, self.screen.height));
        self.frame = Rect::from_points(top_left, bottom_right);
    }
}
