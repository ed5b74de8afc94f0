//! Background-image placement math.
//!
//! An image is first fitted inside the surface ("centred-fit": uniform
//! scale, aspect preserved, letterboxed or pillarboxed), then scaled further
//! by `scale` about the surface centre and shifted by `offset`.

use super::surface::blend_over;
use image::RgbaImage;
use sb_core::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// User-applied placement of the background image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub offset: Vec2,
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

/// Uniform scale that fits `image` inside `surface`.
pub fn fit_scale(surface: Size, image: Size) -> f64 {
    if image.width <= 0.0 || image.height <= 0.0 {
        return 1.0;
    }
    (surface.width / image.width).min(surface.height / image.height)
}

/// Where the image lands on the surface, in surface pixels.
pub fn image_rect(surface: Size, image: Size, placement: Placement) -> Rect {
    let s = fit_scale(surface, image) * placement.scale;
    let (w, h) = (image.width * s, image.height * s);
    let origin = Point::new(
        (surface.width - w) / 2.0 + placement.offset.x,
        (surface.height - h) / 2.0 + placement.offset.y,
    );
    Rect::from_origin_size(origin, Size::new(w, h))
}

/// Map a surface-space rectangle back into source-image pixels by inverting
/// the fit + offset + scale transform. The result is clipped to the image
/// and snapped to whole pixels; it may be empty.
pub fn surface_to_source(surface: Size, image: Size, placement: Placement, r: Rect) -> Rect {
    let dest = image_rect(surface, image, placement);
    let s = fit_scale(surface, image) * placement.scale;
    let mapped = Rect::new(
        (r.x0 - dest.x0) / s,
        (r.y0 - dest.y0) / s,
        (r.x1 - dest.x0) / s,
        (r.y1 - dest.y0) / s,
    );
    let clipped = mapped.intersect(Rect::from_origin_size(Point::ZERO, image));
    clipped.round()
}

/// Draw `src` scaled into `dest` on `dst` (nearest-neighbour, source-over).
pub fn draw_image(dst: &mut RgbaImage, src: &RgbaImage, dest: Rect) {
    if dest.width() <= 0.0 || dest.height() <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let sx = src.width() as f64 / dest.width();
    let sy = src.height() as f64 / dest.height();
    let x_start = dest.x0.floor().max(0.0) as u32;
    let y_start = dest.y0.floor().max(0.0) as u32;
    let x_end = dest.x1.ceil().min(dst.width() as f64).max(0.0) as u32;
    let y_end = dest.y1.ceil().min(dst.height() as f64).max(0.0) as u32;

    for py in y_start..y_end {
        let v = (py as f64 + 0.5 - dest.y0) * sy;
        if v < 0.0 || v >= src.height() as f64 {
            continue;
        }
        for px in x_start..x_end {
            let u = (px as f64 + 0.5 - dest.x0) * sx;
            if u < 0.0 || u >= src.width() as f64 {
                continue;
            }
            let sample = src.get_pixel(u as u32, v as u32).0;
            blend_over(dst.get_pixel_mut(px, py), sample);
        }
    }
}
