//! Bounding box coordinate handling
//!
//! Boxes arrive either as fractions of the natural image size or as
//! absolute pixels. A box counts as normalized only when all four
//! coordinates are inside `[0, 1]`.

use relist_core::BBOX_LEN;
use serde::{Deserialize, Serialize};

/// Box corners in absolute pixels, unrounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl PixelBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// True when every coordinate lies in `[0, 1]`
    pub fn is_normalized(bbox: &[f64; BBOX_LEN]) -> bool {
        bbox.iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Resolve a raw box against the natural image size
    pub fn resolve(bbox: [f64; BBOX_LEN], natural_width: u32, natural_height: u32) -> Self {
        let [x1, y1, x2, y2] = bbox;

        if Self::is_normalized(&bbox) {
            let w = natural_width as f64;
            let h = natural_height as f64;
            Self::new(x1 * w, y1 * h, x2 * w, y2 * h)
        } else {
            Self::new(x1, y1, x2, y2)
        }
    }

    /// Map into another pixel space (natural -> displayed)
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x1 * sx, self.y1 * sy, self.x2 * sx, self.y2 * sy)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// True when the box touches the `width x height` area
    pub fn intersects(&self, width: u32, height: u32) -> bool {
        let (left, right) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (top, bottom) = (self.y1.min(self.y2), self.y1.max(self.y2));

        right >= 0.0 && bottom >= 0.0 && left <= width as f64 && top <= height as f64
    }

    /// Integer crop rectangle inside a `width x height` image.
    ///
    /// Left/top are clamped to `[0, edge]`, right/bottom to the image edge,
    /// all four are rounded, and the result is at least `min_size` on each side.
    pub fn crop_region(&self, width: u32, height: u32, min_size: u32) -> CropRegion {
        let x1 = self.x1.clamp(0.0, width as f64).round();
        let y1 = self.y1.clamp(0.0, height as f64).round();
        let x2 = self.x2.min(width as f64).round();
        let y2 = self.y2.min(height as f64).round();

        CropRegion {
            x: x1 as i64,
            y: y1 as i64,
            width: ((x2 - x1).max(0.0) as u32).max(min_size),
            height: ((y2 - y1).max(0.0) as u32).max(min_size),
        }
    }
}

/// Pixel region cut out of the natural image; may extend past its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Part of the region that overlaps a `width x height` image, as
    /// `(x, y, w, h)` in image coordinates
    pub fn overlap(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.x.saturating_add(self.width as i64).min(width as i64);
        let bottom = self.y.saturating_add(self.height as i64).min(height as i64);

        if right <= left || bottom <= top {
            return None;
        }

        Some((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// Natural and on-screen size of the previewed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub natural_width: u32,
    pub natural_height: u32,
    pub displayed_width: u32,
    pub displayed_height: u32,
}

impl ImageMetrics {
    pub fn new(natural: (u32, u32), displayed: (u32, u32)) -> Self {
        Self {
            natural_width: natural.0,
            natural_height: natural.1,
            displayed_width: displayed.0,
            displayed_height: displayed.1,
        }
    }

    /// Image shown at its natural size
    pub fn unscaled(width: u32, height: u32) -> Self {
        Self::new((width, height), (width, height))
    }

    /// Natural dimensions are known (the image finished loading)
    pub fn is_loaded(&self) -> bool {
        self.natural_width > 0 && self.natural_height > 0
    }

    /// `(sx, sy)` from natural to displayed pixels
    pub fn scale(&self) -> Option<(f64, f64)> {
        if !self.is_loaded() {
            return None;
        }

        Some((
            self.displayed_width as f64 / self.natural_width as f64,
            self.displayed_height as f64 / self.natural_height as f64,
        ))
    }
}
