//! Per-image preview lifecycle
//!
//! ```text
//! Empty --(non-empty detections)--> DetectionsReceived --(image loaded)--> Rendered
//!   ^                                                                         |
//!   +---------------------- select_file / clear_result -----------------------+
//! ```
//!
//! Results and load events carry the [`ImageToken`] of the file they belong
//! to. Anything tagged with an older token is dropped, so the most recently
//! selected file always wins.

use crate::config::PreviewConfig;
use crate::crop::{CropGenerator, Thumbnail};
use crate::geometry::ImageMetrics;
use crate::render::{DrawnBox, OverlayRenderer};
use crate::Result;
use image::RgbaImage;
use log::{debug, info};
use relist_core::DetectionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Empty,
    DetectionsReceived,
    Rendered,
}

/// Identifies one selected file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageToken(u64);

struct LoadedImage {
    pixels: RgbaImage,
    displayed: (u32, u32),
}

impl LoadedImage {
    fn metrics(&self) -> ImageMetrics {
        ImageMetrics::new(self.pixels.dimensions(), self.displayed)
    }
}

pub struct PreviewSession {
    renderer: OverlayRenderer,
    cropper: CropGenerator,
    generation: u64,
    detections: Option<DetectionSet>,
    image: Option<LoadedImage>,
    overlay: RgbaImage,
    drawn: Vec<DrawnBox>,
    thumbnail: Option<Thumbnail>,
    state: PreviewState,
    // Set once render + crop ran for the current detections/image pair
    generated: bool,
}

impl PreviewSession {
    pub fn new(renderer: OverlayRenderer, cropper: CropGenerator) -> Self {
        Self {
            renderer,
            cropper,
            generation: 0,
            detections: None,
            image: None,
            overlay: RgbaImage::new(0, 0),
            drawn: Vec::new(),
            thumbnail: None,
            state: PreviewState::Empty,
            generated: false,
        }
    }

    pub fn from_config(config: &PreviewConfig) -> Result<Self> {
        let renderer = OverlayRenderer::from_config(config)?;
        let cropper = CropGenerator::new(config.crop.clone(), config.overlay.accent());
        Ok(Self::new(renderer, cropper))
    }

    /// A new file was chosen: drop everything from the previous one
    pub fn select_file(&mut self) -> ImageToken {
        self.generation += 1;
        self.detections = None;
        self.image = None;
        self.reset_outputs();
        self.state = PreviewState::Empty;
        debug!("Selected file #{}", self.generation);
        ImageToken(self.generation)
    }

    pub fn current_token(&self) -> ImageToken {
        ImageToken(self.generation)
    }

    /// Attach a prediction result. Returns `false` if `token` is stale.
    pub fn set_detections(&mut self, token: ImageToken, detections: DetectionSet) -> bool {
        if !self.is_current(token) {
            debug!("Dropping detections for superseded file {:?}", token);
            return false;
        }

        self.state = if detections.is_empty() {
            PreviewState::Empty
        } else {
            PreviewState::DetectionsReceived
        };
        self.detections = Some(detections);
        self.reset_outputs();
        self.generate();
        true
    }

    /// Forget the current result but keep the loaded image
    pub fn clear_result(&mut self) {
        self.detections = None;
        self.reset_outputs();
        self.state = PreviewState::Empty;
    }

    /// The image for `token` finished loading. Returns `false` if `token` is stale.
    pub fn image_loaded(&mut self, token: ImageToken, pixels: RgbaImage, displayed: (u32, u32)) -> bool {
        if !self.is_current(token) {
            debug!("Ignoring load event for superseded file {:?}", token);
            return false;
        }

        self.image = Some(LoadedImage { pixels, displayed });
        self.generated = false;
        self.generate();
        true
    }

    /// The image is now shown at a different size; only the overlay changes
    pub fn resize(&mut self, displayed: (u32, u32)) {
        let Some(image) = self.image.as_mut() else {
            return;
        };
        image.displayed = displayed;
        let metrics = image.metrics();

        let empty = DetectionSet::new();
        let detections = self.detections.as_ref().unwrap_or(&empty);
        self.drawn = self.renderer.render(&mut self.overlay, detections, metrics);
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    pub fn drawn_boxes(&self) -> &[DrawnBox] {
        &self.drawn
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    pub fn detections(&self) -> Option<&DetectionSet> {
        self.detections.as_ref()
    }

    pub fn metrics(&self) -> Option<ImageMetrics> {
        self.image.as_ref().map(LoadedImage::metrics)
    }

    fn is_current(&self, token: ImageToken) -> bool {
        token.0 == self.generation
    }

    fn reset_outputs(&mut self) {
        self.overlay = RgbaImage::new(0, 0);
        self.drawn.clear();
        self.thumbnail = None;
        self.generated = false;
    }

    /// Render and crop once both the result and the image are available
    fn generate(&mut self) {
        if self.generated {
            return;
        }
        let (Some(detections), Some(image)) = (&self.detections, &self.image) else {
            return;
        };

        self.drawn = self.renderer.render(&mut self.overlay, detections, image.metrics());
        self.thumbnail = self.cropper.generate(detections.top(), &image.pixels);
        self.generated = true;

        if !detections.is_empty() {
            self.state = PreviewState::Rendered;
            info!(
                "Rendered {} boxes, thumbnail {}",
                self.drawn.len(),
                if self.thumbnail.is_some() { "ready" } else { "unavailable" }
            );
        }
    }
}

impl Default for PreviewSession {
    fn default() -> Self {
        Self::new(OverlayRenderer::default(), CropGenerator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use relist_core::Detection;

    fn photo() -> RgbaImage {
        RgbaImage::from_pixel(200, 100, Rgba([120, 120, 120, 255]))
    }

    fn result() -> DetectionSet {
        DetectionSet::from_vec(vec![
            Detection::new("scratch", 0.4).with_bbox([0.1, 0.1, 0.3, 0.3]),
            Detection::new("glass_crack", 0.9).with_bbox([0.5, 0.2, 0.9, 0.8]),
        ])
    }

    #[test]
    fn test_detections_then_image() {
        let mut session = PreviewSession::default();
        let token = session.select_file();
        assert_eq!(session.state(), PreviewState::Empty);

        assert!(session.set_detections(token, result()));
        assert_eq!(session.state(), PreviewState::DetectionsReceived);
        assert!(session.thumbnail().is_none());

        assert!(session.image_loaded(token, photo(), (100, 50)));
        assert_eq!(session.state(), PreviewState::Rendered);
        assert_eq!(session.overlay().dimensions(), (100, 50));
        assert_eq!(session.drawn_boxes().len(), 2);

        let thumb = session.thumbnail().unwrap();
        assert_eq!(thumb.region.x, 100);
        assert_eq!(thumb.region.y, 20);
    }

    #[test]
    fn test_image_then_detections() {
        let mut session = PreviewSession::default();
        let token = session.select_file();

        session.image_loaded(token, photo(), (200, 100));
        assert_eq!(session.state(), PreviewState::Empty);

        session.set_detections(token, result());
        assert_eq!(session.state(), PreviewState::Rendered);
        assert!(session.thumbnail().is_some());
    }

    #[test]
    fn test_new_file_resets_everything() {
        let mut session = PreviewSession::default();
        let token = session.select_file();
        session.set_detections(token, result());
        session.image_loaded(token, photo(), (200, 100));

        session.select_file();

        assert_eq!(session.state(), PreviewState::Empty);
        assert!(session.thumbnail().is_none());
        assert!(session.drawn_boxes().is_empty());
        assert!(session.detections().is_none());
        assert!(session.metrics().is_none());
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut session = PreviewSession::default();
        let old = session.select_file();
        let new = session.select_file();

        assert!(!session.image_loaded(old, photo(), (200, 100)));
        assert!(!session.set_detections(old, result()));
        assert!(session.metrics().is_none());

        assert!(session.image_loaded(new, photo(), (200, 100)));
        assert_eq!(session.current_token(), new);
    }

    #[test]
    fn test_empty_result_stays_empty_with_clear_overlay() {
        let mut session = PreviewSession::default();
        let token = session.select_file();
        session.image_loaded(token, photo(), (200, 100));

        session.set_detections(token, DetectionSet::new());

        assert_eq!(session.state(), PreviewState::Empty);
        assert!(session.thumbnail().is_none());
        assert_eq!(session.overlay().dimensions(), (200, 100));
        assert!(session.overlay().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_clear_result_keeps_image() {
        let mut session = PreviewSession::default();
        let token = session.select_file();
        session.image_loaded(token, photo(), (200, 100));
        session.set_detections(token, result());

        session.clear_result();
        assert_eq!(session.state(), PreviewState::Empty);
        assert!(session.thumbnail().is_none());
        assert!(session.metrics().is_some());

        session.set_detections(token, result());
        assert_eq!(session.state(), PreviewState::Rendered);
    }

    #[test]
    fn test_resize_rerenders_overlay_only() {
        let mut session = PreviewSession::default();
        let token = session.select_file();
        session.set_detections(token, result());
        session.image_loaded(token, photo(), (200, 100));
        let region = session.thumbnail().unwrap().region;

        session.resize((100, 50));

        assert_eq!(session.overlay().dimensions(), (100, 50));
        assert_eq!(session.drawn_boxes()[0].rect.x1, 50.0);
        assert_eq!(session.thumbnail().unwrap().region, region);
    }

    #[test]
    fn test_resize_without_result_resizes_blank_overlay() {
        let mut session = PreviewSession::default();
        let token = session.select_file();
        session.image_loaded(token, photo(), (200, 100));

        session.resize((80, 40));

        assert_eq!(session.state(), PreviewState::Empty);
        assert_eq!(session.overlay().dimensions(), (80, 40));
        assert!(session.overlay().pixels().all(|p| p[3] == 0));
        assert!(session.drawn_boxes().is_empty());
    }
}
