//! Crop-box state machine.
//!
//! `None → Defining → Active → (commit | cancel) → None`. All coordinates are
//! raster-local pixels.

use sb_core::{Point, Rect, Vec2};

/// The eight grab points of an active crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl CropHandle {
    pub const ALL: [CropHandle; 8] = [
        CropHandle::NorthWest,
        CropHandle::North,
        CropHandle::NorthEast,
        CropHandle::East,
        CropHandle::SouthEast,
        CropHandle::South,
        CropHandle::SouthWest,
        CropHandle::West,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            CropHandle::NorthWest
                | CropHandle::NorthEast
                | CropHandle::SouthEast
                | CropHandle::SouthWest
        )
    }

    /// Where this handle sits on `r`.
    pub fn point(self, r: Rect) -> Point {
        let c = r.center();
        match self {
            CropHandle::NorthWest => Point::new(r.x0, r.y0),
            CropHandle::North => Point::new(c.x, r.y0),
            CropHandle::NorthEast => Point::new(r.x1, r.y0),
            CropHandle::East => Point::new(r.x1, c.y),
            CropHandle::SouthEast => Point::new(r.x1, r.y1),
            CropHandle::South => Point::new(c.x, r.y1),
            CropHandle::SouthWest => Point::new(r.x0, r.y1),
            CropHandle::West => Point::new(r.x0, c.y),
        }
    }

    /// The corner that stays fixed while this corner handle is dragged.
    fn opposite_corner(self, r: Rect) -> Point {
        match self {
            CropHandle::NorthWest => Point::new(r.x1, r.y1),
            CropHandle::NorthEast => Point::new(r.x0, r.y1),
            CropHandle::SouthEast => Point::new(r.x0, r.y0),
            CropHandle::SouthWest => Point::new(r.x1, r.y0),
            _ => r.center(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropMode {
    #[default]
    None,
    Defining,
    Active,
}

/// What a pointer-down did to the crop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropPress {
    /// A new box was started.
    Started,
    /// A handle of the active box was grabbed.
    Handle(CropHandle),
    /// The active box was grabbed for moving.
    Body,
    /// Pressed outside the active box: cropping was cancelled.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Resize { handle: CropHandle, start: Rect },
    Move { start: Rect, grab: Point },
}

/// Crop sub-state of a raster editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropState {
    mode: CropMode,
    /// Anchor of a box being defined.
    origin: Point,
    /// Signed extent while defining; negative means drawn leftward/upward.
    extent: Vec2,
    /// Normalized box once active.
    rect: Rect,
    handles: [Point; 8],
    drag: Option<Drag>,
}

impl CropState {
    pub fn mode(&self) -> CropMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != CropMode::None
    }

    /// The box as it should be drawn: normalized while defining, the active
    /// box otherwise.
    pub fn rect(&self) -> Option<Rect> {
        match self.mode {
            CropMode::None => None,
            CropMode::Defining => Some(Rect::from_points(self.origin, self.origin + self.extent)),
            CropMode::Active => Some(self.rect),
        }
    }

    /// Handle points (corners and edge midpoints) of the active box.
    pub fn handles(&self) -> Option<&[Point; 8]> {
        (self.mode == CropMode::Active).then_some(&self.handles)
    }

    pub fn pointer_down(&mut self, p: Point, handle_radius: f64) -> CropPress {
        if self.mode != CropMode::Active {
            self.mode = CropMode::Defining;
            self.origin = p;
            self.extent = Vec2::ZERO;
            self.drag = None;
            return CropPress::Started;
        }
        if let Some(handle) = self.handle_at(p, handle_radius) {
            self.drag = Some(Drag::Resize {
                handle,
                start: self.rect,
            });
            return CropPress::Handle(handle);
        }
        if self.rect.contains(p) {
            self.drag = Some(Drag::Move {
                start: self.rect,
                grab: p,
            });
            return CropPress::Body;
        }
        self.cancel();
        CropPress::Cancelled
    }

    /// `keep_aspect` only matters for corner handles.
    pub fn pointer_move(&mut self, p: Point, keep_aspect: bool) {
        match self.mode {
            CropMode::Defining => self.extent = p - self.origin,
            CropMode::Active => match self.drag {
                Some(Drag::Move { start, grab }) => {
                    self.rect = start + (p - grab);
                    self.recompute_handles();
                }
                Some(Drag::Resize { handle, start }) => {
                    self.rect = resize(start, handle, p, keep_aspect);
                    self.recompute_handles();
                }
                None => {}
            },
            CropMode::None => {}
        }
    }

    pub fn pointer_up(&mut self, min_size: f64) {
        match self.mode {
            CropMode::Defining => {
                let rect = Rect::from_points(self.origin, self.origin + self.extent);
                if rect.width() > min_size && rect.height() > min_size {
                    self.rect = rect;
                    self.mode = CropMode::Active;
                    self.recompute_handles();
                } else {
                    self.cancel();
                }
            }
            CropMode::Active => self.drag = None,
            CropMode::None => {}
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    fn handle_at(&self, p: Point, radius: f64) -> Option<CropHandle> {
        CropHandle::ALL
            .iter()
            .zip(self.handles.iter())
            .filter(|(_, hp)| (p - **hp).hypot() <= radius)
            .min_by(|a, b| (p - *a.1).hypot().total_cmp(&(p - *b.1).hypot()))
            .map(|(h, _)| *h)
    }

    fn recompute_handles(&mut self) {
        for (slot, handle) in self.handles.iter_mut().zip(CropHandle::ALL) {
            *slot = handle.point(self.rect);
        }
    }
}

/// Resize `start` by dragging `handle` to `p`, anchored at the opposite side.
fn resize(start: Rect, handle: CropHandle, p: Point, keep_aspect: bool) -> Rect {
    if handle.is_corner() {
        let anchor = handle.opposite_corner(start);
        let mut w = p.x - anchor.x;
        let mut h = p.y - anchor.y;
        if keep_aspect && start.height() > 0.0 {
            let ratio = start.width() / start.height();
            // The larger-magnitude axis drives; the other follows the ratio.
            if w.abs() >= h.abs() * ratio {
                h = signum_or(h, default_sign_y(handle)) * w.abs() / ratio;
            } else {
                w = signum_or(w, default_sign_x(handle)) * h.abs() * ratio;
            }
        }
        return Rect::from_points(anchor, anchor + Vec2::new(w, h));
    }
    let mut r = start;
    match handle {
        CropHandle::North => r.y0 = p.y,
        CropHandle::South => r.y1 = p.y,
        CropHandle::East => r.x1 = p.x,
        CropHandle::West => r.x0 = p.x,
        _ => {}
    }
    r.abs()
}

fn signum_or(v: f64, fallback: f64) -> f64 {
    if v == 0.0 { fallback } else { v.signum() }
}

fn default_sign_x(handle: CropHandle) -> f64 {
    match handle {
        CropHandle::NorthWest | CropHandle::SouthWest => -1.0,
        _ => 1.0,
    }
}

fn default_sign_y(handle: CropHandle) -> f64 {
    match handle {
        CropHandle::NorthWest | CropHandle::NorthEast => -1.0,
        _ => 1.0,
    }
}
