//! Raster sub-editor hosted by image-editor nodes.
//!
//! Each editor owns a drawing layer, an optional background image with its
//! placement, and the tool state for strokes, image move/transform, and
//! cropping. Edits that should be undoable come back as a `RasterEdit`
//! (whole-bitmap before/after pair) for the caller to record.

pub mod crop;
pub mod font;
pub mod placement;
pub mod surface;

use crate::error::{EditorError, Result};
use crate::input::Modifiers;
use crop::{CropMode, CropPress, CropState};
use image::RgbaImage;
use image::imageops;
pub use placement::Placement;
use sb_core::{EditorConfig, Point, Rect, Size, Vec2};
use surface::{Brush, RasterSurface};
pub use surface::Snapshot;

/// Raster-level tool modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterTool {
    Pen,
    Eraser,
    /// Pan the background image.
    Move,
    /// Rescale the background image.
    Transform,
    Crop,
    /// Single-click text stamp.
    Text,
}

/// One side of an undoable raster change.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterState {
    /// The drawing layer.
    Drawing(Snapshot),
    /// The background image plus its placement.
    Background { image: Snapshot, placement: Placement },
}

/// A completed, undoable raster change.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterEdit {
    pub before: RasterState,
    pub after: RasterState,
}

/// Everything needed to rebuild an editor (used when a node is deleted).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterContent {
    pub drawing: Snapshot,
    pub background: Option<Snapshot>,
    pub placement: Placement,
}

#[derive(Debug, Clone)]
struct Stroke {
    before: Snapshot,
    last: Point,
    brush: Brush,
    width: f64,
}

#[derive(Debug, Clone, Copy)]
enum ImageDrag {
    Move { start_offset: Vec2, start_pointer: Point },
    Transform { start_scale: f64, start_y: f64 },
}

/// Per-node raster editor state.
#[derive(Debug, Clone)]
pub struct RasterEditor {
    surface: RasterSurface,
    background: Option<RgbaImage>,
    placement: Placement,
    stroke: Option<Stroke>,
    drag: Option<ImageDrag>,
    crop: CropState,
}

impl RasterEditor {
    pub fn new(size: Size) -> Self {
        let (w, h) = surface_dims(size);
        Self {
            surface: RasterSurface::new(w, h),
            background: None,
            placement: Placement::default(),
            stroke: None,
            drag: None,
            crop: CropState::default(),
        }
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn crop(&self) -> &CropState {
        &self.crop
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    fn surface_size(&self) -> Size {
        Size::new(self.surface.width() as f64, self.surface.height() as f64)
    }

    /// Where the background image is drawn, in surface pixels.
    pub fn image_rect(&self) -> Option<Rect> {
        let bg = self.background.as_ref()?;
        let image = Size::new(bg.width() as f64, bg.height() as f64);
        Some(placement::image_rect(self.surface_size(), image, self.placement))
    }

    /// Replace the background image; placement resets, any open crop closes.
    pub fn set_background(&mut self, image: RgbaImage) {
        log::debug!("background set ({}x{})", image.width(), image.height());
        self.background = Some(image);
        self.placement = Placement::default();
        self.crop.cancel();
    }

    /// Follow the hosting node's size. Existing content is rescaled; the
    /// drawing layer before and after comes back for history, `None` if the
    /// surface dimensions did not change.
    pub fn resize(&mut self, size: Size) -> Result<Option<RasterEdit>> {
        let (w, h) = surface_dims(size);
        if (w, h) == (self.surface.width(), self.surface.height()) {
            return Ok(None);
        }
        let before = self.surface.encode()?;
        self.surface.resize(w, h);
        let after = self.surface.encode()?;
        log::debug!("surface resized to {w}x{h}");
        Ok(Some(RasterEdit {
            before: RasterState::Drawing(before),
            after: RasterState::Drawing(after),
        }))
    }

    // ─── Pointer handling (raster-local coordinates) ─────────────────────

    /// `local` is in surface pixels; `screen` is the raw pointer position,
    /// used by the image move/transform tools which work on pointer deltas.
    pub fn pointer_down(
        &mut self,
        tool: RasterTool,
        local: Point,
        screen: Point,
        config: &EditorConfig,
    ) -> Result<Option<RasterEdit>> {
        match tool {
            RasterTool::Pen | RasterTool::Eraser => {
                let (brush, width) = if tool == RasterTool::Pen {
                    (Brush::Paint(config.stroke_color.0), config.stroke_width)
                } else {
                    (Brush::Erase, config.eraser_width)
                };
                self.stroke = Some(Stroke {
                    before: self.surface.encode()?,
                    last: local,
                    brush,
                    width,
                });
                Ok(None)
            }
            RasterTool::Move => {
                if self.image_rect().is_some_and(|r| r.contains(local)) {
                    self.drag = Some(ImageDrag::Move {
                        start_offset: self.placement.offset,
                        start_pointer: screen,
                    });
                }
                Ok(None)
            }
            RasterTool::Transform => {
                if self.background.is_some() {
                    self.drag = Some(ImageDrag::Transform {
                        start_scale: self.placement.scale,
                        start_y: screen.y,
                    });
                }
                Ok(None)
            }
            RasterTool::Crop => {
                let press = self.crop.pointer_down(local, config.crop_handle_radius);
                if press == CropPress::Cancelled {
                    log::debug!("crop cancelled by press outside the box");
                }
                Ok(None)
            }
            RasterTool::Text => {
                let before = self.surface.encode()?;
                font::stamp_text(
                    &mut self.surface,
                    local,
                    &config.text_stamp,
                    config.stroke_color.0,
                    config.text_scale,
                );
                let after = self.surface.encode()?;
                Ok(Some(RasterEdit {
                    before: RasterState::Drawing(before),
                    after: RasterState::Drawing(after),
                }))
            }
        }
    }

    /// Apply a pointer move. Strokes composite immediately.
    pub fn pointer_move(
        &mut self,
        local: Point,
        screen: Point,
        modifiers: Modifiers,
        config: &EditorConfig,
    ) {
        if let Some(stroke) = &mut self.stroke {
            self.surface.draw_line(stroke.last, local, stroke.width, stroke.brush);
            stroke.last = local;
            return;
        }
        match self.drag {
            Some(ImageDrag::Move {
                start_offset,
                start_pointer,
            }) => {
                self.placement.offset = start_offset + (screen - start_pointer);
            }
            Some(ImageDrag::Transform { start_scale, start_y }) => {
                let factor = 1.0 + (screen.y - start_y) / config.transform_sensitivity;
                self.placement.scale = (start_scale * factor).max(config.min_image_scale);
            }
            None => {
                if self.crop.is_open() {
                    self.crop.pointer_move(local, modifiers.shift);
                }
            }
        }
    }

    /// Finish the current interaction. A stroke that changed pixels comes
    /// back as an edit; a stroke that didn't is dropped.
    pub fn pointer_up(&mut self, config: &EditorConfig) -> Result<Option<RasterEdit>> {
        self.drag = None;
        self.crop.pointer_up(config.crop_min_size);
        let Some(stroke) = self.stroke.take() else {
            return Ok(None);
        };
        let after = self.surface.encode()?;
        if after == stroke.before {
            log::debug!("stroke left no marks, not recorded");
            return Ok(None);
        }
        Ok(Some(RasterEdit {
            before: RasterState::Drawing(stroke.before),
            after: RasterState::Drawing(after),
        }))
    }

    /// Drop any in-flight interaction without recording it.
    pub fn abort_interaction(&mut self) {
        self.stroke = None;
        self.drag = None;
        if self.crop.mode() == CropMode::Defining {
            self.crop.cancel();
        }
    }

    // ─── Crop ────────────────────────────────────────────────────────────

    /// Crop the background image to the active box.
    ///
    /// On `DegenerateCrop` nothing changes and the box stays active so it can
    /// be adjusted and retried.
    pub fn commit_crop(&mut self) -> Result<RasterEdit> {
        let rect = match (self.crop.mode(), self.crop.rect()) {
            (CropMode::Active, Some(rect)) => rect,
            _ => return Err(EditorError::NoActiveCrop),
        };
        if rect.width() <= 1.0 || rect.height() <= 1.0 {
            return Err(EditorError::CropTooSmall);
        }
        let bg = self.background.as_ref().ok_or(EditorError::NoBackgroundImage)?;
        let image = Size::new(bg.width() as f64, bg.height() as f64);
        let src = placement::surface_to_source(self.surface_size(), image, self.placement, rect);
        if src.width() < 1.0 || src.height() < 1.0 {
            return Err(EditorError::DegenerateCrop);
        }

        let before = RasterState::Background {
            image: Snapshot::encode(bg)?,
            placement: self.placement,
        };
        let cropped = imageops::crop_imm(
            bg,
            src.x0 as u32,
            src.y0 as u32,
            src.width() as u32,
            src.height() as u32,
        )
        .to_image();
        let after = RasterState::Background {
            image: Snapshot::encode(&cropped)?,
            placement: Placement::default(),
        };
        log::info!(
            "cropped background {}x{} -> {}x{}",
            bg.width(),
            bg.height(),
            cropped.width(),
            cropped.height()
        );
        self.background = Some(cropped);
        self.placement = Placement::default();
        self.crop.cancel();
        Ok(RasterEdit { before, after })
    }

    /// Discard the crop box, if any. Never recorded.
    pub fn cancel_crop(&mut self) -> bool {
        let was_open = self.crop.is_open();
        self.crop.cancel();
        was_open
    }

    // ─── Whole-layer operations ──────────────────────────────────────────

    /// Clear the drawing layer. `None` if it was already blank.
    pub fn clear(&mut self) -> Result<Option<RasterEdit>> {
        if self.surface.is_blank() {
            return Ok(None);
        }
        let before = self.surface.encode()?;
        self.surface.clear();
        let after = self.surface.encode()?;
        Ok(Some(RasterEdit {
            before: RasterState::Drawing(before),
            after: RasterState::Drawing(after),
        }))
    }

    /// Restore one side of a recorded edit.
    pub fn restore(&mut self, state: &RasterState) -> Result<()> {
        self.stroke = None;
        self.drag = None;
        match state {
            RasterState::Drawing(snapshot) => self.surface.restore(snapshot),
            RasterState::Background { image, placement } => {
                self.background = Some(image.decode()?);
                self.placement = *placement;
                self.crop.cancel();
                Ok(())
            }
        }
    }

    pub fn capture(&self) -> Result<RasterContent> {
        Ok(RasterContent {
            drawing: self.surface.encode()?,
            background: self.background.as_ref().map(Snapshot::encode).transpose()?,
            placement: self.placement,
        })
    }

    pub fn from_content(content: &RasterContent) -> Result<Self> {
        Ok(Self {
            surface: RasterSurface::from_image(content.drawing.decode()?),
            background: content.background.as_ref().map(Snapshot::decode).transpose()?,
            placement: content.placement,
            stroke: None,
            drag: None,
            crop: CropState::default(),
        })
    }

    /// The displayed bitmap: background at its placement, drawing on top.
    pub fn render(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.surface.width(), self.surface.height());
        if let (Some(bg), Some(rect)) = (&self.background, self.image_rect()) {
            placement::draw_image(&mut out, bg, rect);
        }
        placement::draw_image(
            &mut out,
            self.surface.image(),
            Rect::from_origin_size(Point::ZERO, self.surface_size()),
        );
        out
    }
}

/// Upper bound on either side of a drawing surface, in pixels.
const MAX_SURFACE_SIDE: u32 = 8192;

fn surface_dims(size: Size) -> (u32, u32) {
    let side = |v: f64| (v.round().max(1.0) as u32).min(MAX_SURFACE_SIDE);
    (side(size.width), side(size.height))
}
