//! Detection box overlay
//!
//! The caller owns the surface; every call resizes it to the displayed
//! image size and clears it before painting, so nothing from a previous
//! image or result survives.

use super::{fill_rect_blended, stroke_rect};
use crate::config::{OverlayConfig, PreviewConfig};
use crate::geometry::{ImageMetrics, PixelBox};
use crate::utils::ImageUtils;
use crate::Result;
use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use log::{debug, warn};
use relist_core::DetectionSet;
use serde::Serialize;

/// Caption face used unless `label_font` overrides it
const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Load the bundled caption font
pub fn embedded_font() -> Option<FontArc> {
    match FontArc::try_from_slice(EMBEDDED_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Bundled caption font unusable ({}), captions are drawn without text", e);
            None
        }
    }
}

/// A box that was painted, in displayed pixel space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnBox {
    /// Position in the original detection list
    pub index: usize,
    pub rect: PixelBox,
    pub stroke_width: u32,
    pub color: [u8; 4],
    pub is_top: bool,
    pub caption: String,
}

/// Paints detection boxes and captions onto a transparent surface
pub struct OverlayRenderer {
    config: OverlayConfig,
    font: Option<FontArc>,
}

impl OverlayRenderer {
    /// Renderer using the bundled caption font
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            font: embedded_font(),
        }
    }

    /// Build from a full preview config; `label_font` replaces the bundled font
    pub fn from_config(config: &PreviewConfig) -> Result<Self> {
        let renderer = Self::new(config.overlay.clone());

        match &config.label_font {
            Some(path) => {
                debug!("Using caption font {:?}", path);
                Ok(renderer.with_font(ImageUtils::load_font(path)?))
            }
            None => Ok(renderer),
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Reset `surface` to the displayed size and paint every boxed detection.
    ///
    /// Boxes are painted from lowest to highest confidence so the top
    /// detection ends up above the rest. The returned list is in ranked
    /// order (top first).
    pub fn render(
        &self,
        surface: &mut RgbaImage,
        detections: &DetectionSet,
        metrics: ImageMetrics,
    ) -> Vec<DrawnBox> {
        *surface = RgbaImage::new(metrics.displayed_width, metrics.displayed_height);

        let Some((sx, sy)) = metrics.scale() else {
            debug!("Natural image size unknown, overlay left blank");
            return Vec::new();
        };

        let ranked = detections.ranked();
        let top_index = ranked.first().copied();
        let mut drawn = Vec::with_capacity(ranked.len());

        for &index in ranked.iter().rev() {
            let detection = &detections.as_slice()[index];
            let Some(bbox) = detection.bbox else {
                continue;
            };

            let rect = PixelBox::resolve(bbox, metrics.natural_width, metrics.natural_height)
                .scale(sx, sy);
            if !rect.intersects(metrics.displayed_width, metrics.displayed_height) {
                debug!("Detection {} lies outside the image, skipped", index);
                continue;
            }
            let is_top = top_index == Some(index);
            let (stroke_width, color) = if is_top {
                (self.config.top_stroke_width, self.config.accent())
            } else {
                (self.config.stroke_width, self.config.palette_color(index))
            };

            stroke_rect(surface, &rect, stroke_width, color);

            let caption = detection.caption();
            self.draw_caption(surface, &rect, &caption);

            drawn.push(DrawnBox {
                index,
                rect,
                stroke_width,
                color: color.0,
                is_top,
                caption,
            });
        }

        drawn.reverse();
        debug!("Painted {} of {} detections", drawn.len(), detections.len());
        drawn
    }

    /// Translucent caption strip ending on the row above the box's top edge,
    /// clamped to the top of the surface
    fn draw_caption(&self, surface: &mut RgbaImage, rect: &PixelBox, caption: &str) {
        let scale = PxScale::from(self.config.font_size);
        let padding = self.config.label_padding;
        let height = self.config.label_height();
        let (surface_w, surface_h) = surface.dimensions();

        let text_width = match &self.font {
            Some(font) => text_size(scale, font, caption).0 as u32,
            None => self.estimate_text_width(caption),
        };
        let strip_width = text_width + 2 * padding;

        let x = rect
            .x1
            .round()
            .clamp(-(strip_width as f64), surface_w as f64) as i32;
        let y = (rect.y1.round() - height as f64).clamp(0.0, surface_h as f64) as i32;

        fill_rect_blended(
            surface,
            x,
            y,
            strip_width,
            height,
            Rgba(self.config.label_background),
        );

        if let Some(font) = &self.font {
            draw_text_mut(
                surface,
                Rgba(self.config.label_text),
                x + padding as i32,
                y + 2,
                scale,
                font,
                caption,
            );
        }
    }

    // Rough average advance of a proportional sans face
    fn estimate_text_width(&self, caption: &str) -> u32 {
        (caption.chars().count() as f32 * self.config.font_size * 0.55).ceil() as u32
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}
