//! Owned, resizable raster buffer plus its encoded snapshot token.
//!
//! Snapshots are whole-bitmap PNG encodings: lossless, so restoring one gives
//! back the exact pixels, and two snapshots compare equal iff the pixels do.

use crate::error::{EditorError, Result};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use sb_core::Point;
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// Opaque encoded bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<[u8]>);

impl Snapshot {
    pub fn encode(image: &RgbaImage) -> Result<Self> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(EditorError::Snapshot)?;
        Ok(Self(buf.into()))
    }

    pub fn decode(&self) -> Result<RgbaImage> {
        let image = image::load_from_memory_with_format(&self.0, ImageFormat::Png)
            .map_err(EditorError::Snapshot)?;
        Ok(image.to_rgba8())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} bytes)", self.0.len())
    }
}

/// How a stroke composites onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brush {
    /// Source-over paint in the given colour.
    Paint([u8; 4]),
    /// Destructive alpha removal.
    Erase,
}

/// The drawing layer of a raster editor.
#[derive(Clone, PartialEq)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RasterSurface({}x{})", self.image.width(), self.image.height())
    }
}

impl RasterSurface {
    /// A fully transparent surface. Zero dimensions are bumped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p[3] == 0)
    }

    pub fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    /// Resize to new dimensions, rescaling the existing content into them.
    /// Never clears.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == self.image.dimensions() {
            return;
        }
        self.image = imageops::resize(&self.image, width, height, FilterType::Triangle);
    }

    pub fn encode(&self) -> Result<Snapshot> {
        Snapshot::encode(&self.image)
    }

    /// Replace the pixels (and dimensions) with a decoded snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.image = snapshot.decode()?;
        Ok(())
    }

    /// Composite a line segment with round caps and joins: every pixel whose
    /// centre lies within `width / 2` of the segment is touched.
    pub fn draw_line(&mut self, from: Point, to: Point, width: f64, brush: Brush) {
        let radius = (width / 2.0).max(0.5);
        let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as i64;
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as i64;
        let max_x = (from.x.max(to.x) + radius).ceil().min(self.width() as f64 - 1.0) as i64;
        let max_y = (from.y.max(to.y) + radius).ceil().min(self.height() as f64 - 1.0) as i64;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let centre = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                if distance_to_segment(centre, from, to) <= radius {
                    let pixel = self.image.get_pixel_mut(px as u32, py as u32);
                    match brush {
                        Brush::Paint(color) => blend_over(pixel, color),
                        Brush::Erase => *pixel = Rgba([0, 0, 0, 0]),
                    }
                }
            }
        }
    }

    /// Source-over a single pixel, ignoring out-of-bounds coordinates.
    pub fn paint_pixel(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        blend_over(self.image.get_pixel_mut(x as u32, y as u32), color);
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

/// Porter-Duff source-over on straight (non-premultiplied) RGBA.
pub(crate) fn blend_over(dst: &mut Rgba<u8>, src: [u8; 4]) {
    let sa = src[3] as f64 / 255.0;
    if sa >= 1.0 {
        *dst = Rgba(src);
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f64 * sa + dst[c] as f64 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}
