//! Drawing onto RGBA surfaces

pub mod overlay;

pub use overlay::{DrawnBox, OverlayRenderer};

use crate::geometry::PixelBox;
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Stroke a rectangle outline `width` pixels thick, centred on the box edge.
///
/// Edges far outside the surface are pulled in to just beyond its border,
/// which leaves the visible part of the outline unchanged.
pub fn stroke_rect(surface: &mut RgbaImage, bbox: &PixelBox, width: u32, color: Rgba<u8>) {
    let (surface_w, surface_h) = surface.dimensions();
    let margin = width as f64 + 1.0;
    let fit_x = |v: f64| v.round().clamp(-margin, surface_w as f64 + margin) as i32;
    let fit_y = |v: f64| v.round().clamp(-margin, surface_h as f64 + margin) as i32;

    let left = fit_x(bbox.x1);
    let top = fit_y(bbox.y1);
    let box_w = (fit_x(bbox.x2) - left).max(1);
    let box_h = (fit_y(bbox.y2) - top).max(1);
    let half = (width / 2) as i32;

    for step in 0..width as i32 {
        let inset = step - half;
        let w = box_w - 2 * inset;
        let h = box_h - 2 * inset;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(left + inset, top + inset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(surface, rect, color);
    }
}

/// Stroke a border `width` pixels thick along the inside of the image edge
pub fn stroke_inner_border(surface: &mut RgbaImage, width: u32, color: Rgba<u8>) {
    let (w, h) = surface.dimensions();

    for inset in 0..width {
        if 2 * inset >= w || 2 * inset >= h {
            break;
        }
        let rect = Rect::at(inset as i32, inset as i32).of_size(w - 2 * inset, h - 2 * inset);
        draw_hollow_rect_mut(surface, rect, color);
    }
}

/// Alpha-blend a filled rectangle onto the surface, clipped to its bounds
pub fn fill_rect_blended(surface: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, color: Rgba<u8>) {
    let (surface_w, surface_h) = surface.dimensions();
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = (x as i64 + w as i64).clamp(0, surface_w as i64) as u32;
    let y1 = (y as i64 + h as i64).clamp(0, surface_h as i64) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            surface.get_pixel_mut(px, py).blend(&color);
        }
    }
}
