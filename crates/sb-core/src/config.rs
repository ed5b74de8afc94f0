//! Editor tunables.
//!
//! Every constant the gesture controller, history, and raster editor read
//! lives here so hosts can override them in one place.

use crate::model::NodeKind;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// RGBA colour with 8-bit channels, matching the raster surface layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const BLACK: Self = Self([0, 0, 0, 255]);
}

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for the editor `Engine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lower zoom bound. Default: **0.1**.
    pub zoom_min: f64,
    /// Upper zoom bound. Default: **5.0**.
    pub zoom_max: f64,
    /// Multiplicative step for zoom-in/zoom-out commands and wheel notches.
    pub zoom_step: f64,
    /// How long the visual-transition flag stays set after a zoom.
    pub transition_ms: u64,

    /// Maximum number of history entries; the oldest is dropped beyond this.
    pub history_depth: usize,

    /// Arrow-key nudge in world units.
    pub nudge_step: f64,
    /// Arrow-key nudge with Shift held.
    pub nudge_step_large: f64,
    /// Side of the square resize handle, in screen pixels.
    pub resize_handle_size: f64,
    /// Nodes are never resized below this, in world units.
    pub min_node_size: f64,
    /// Nodes are never resized above this on either axis, in world units.
    /// Bounds the raster surface an image editor allocates.
    pub max_node_size: f64,

    pub text_node_size: Size,
    pub image_upload_size: Size,
    pub image_editor_size: Size,

    /// Pen stroke width in raster pixels.
    pub stroke_width: f64,
    pub stroke_color: Rgba8,
    /// Eraser width in raster pixels.
    pub eraser_width: f64,

    /// Vertical drag distance that doubles the image scale (`1 + dy / K`).
    pub transform_sensitivity: f64,
    /// Image scale never drops below this.
    pub min_image_scale: f64,

    /// A freshly drawn crop box smaller than this on either axis is discarded.
    pub crop_min_size: f64,
    /// Hit radius of crop handles, in raster pixels.
    pub crop_handle_radius: f64,

    /// Literal painted by the text tool.
    pub text_stamp: String,
    /// Pixel scale of the 5×7 stamp font.
    pub text_scale: u32,

    /// Size of the overview (minimap) panel in screen pixels.
    pub overview_size: Size,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 5.0,
            zoom_step: 1.2,
            transition_ms: 200,
            history_depth: 200,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            resize_handle_size: 12.0,
            min_node_size: 20.0,
            max_node_size: 4096.0,
            text_node_size: Size::new(200.0, 80.0),
            image_upload_size: Size::new(240.0, 180.0),
            image_editor_size: Size::new(320.0, 240.0),
            stroke_width: 4.0,
            stroke_color: Rgba8::BLACK,
            eraser_width: 16.0,
            transform_sensitivity: 200.0,
            min_image_scale: 0.1,
            crop_min_size: 10.0,
            crop_handle_radius: 8.0,
            text_stamp: "Text".to_string(),
            text_scale: 3,
            overview_size: Size::new(200.0, 150.0),
        }
    }
}

impl EditorConfig {
    /// Default size of a freshly created node of `kind`.
    pub fn default_size(&self, kind: NodeKind) -> Size {
        match kind {
            NodeKind::Text => self.text_node_size,
            NodeKind::ImageUpload => self.image_upload_size,
            NodeKind::ImageEditor => self.image_editor_size,
        }
    }

    /// Clamp one side of a node being resized into
    /// `[min_node_size, max_node_size]`.
    pub fn clamp_node_side(&self, side: f64) -> f64 {
        side.clamp(self.min_node_size, self.max_node_size)
    }

    /// Clamp a zoom factor into `[zoom_min, zoom_max]`.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.zoom_min, self.zoom_max)
    }
}
