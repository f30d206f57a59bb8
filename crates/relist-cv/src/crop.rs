//! Thumbnail of the top-confidence detection

use crate::config::CropConfig;
use crate::error::PreviewError;
use crate::geometry::{CropRegion, PixelBox};
use crate::render::stroke_inner_border;
use crate::Result;
use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};
use log::{debug, warn};
use relist_core::Detection;
use std::fs;
use std::path::Path;

/// Cropped, bordered and JPEG-encoded detection region
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Source region in natural image pixels
    pub region: CropRegion,
    pub image: RgbImage,
    pub encoded: Vec<u8>,
}

impl Thumbnail {
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Write the encoded JPEG bytes
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, &self.encoded)
            .with_context(|| format!("Failed to write thumbnail: {:?}", path))
    }
}

pub struct CropGenerator {
    config: CropConfig,
    border: Rgba<u8>,
}

impl CropGenerator {
    /// `border` should match the overlay's accent colour
    pub fn new(config: CropConfig, border: Rgba<u8>) -> Self {
        Self { config, border }
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Thumbnail for `top`, or `None` when there is nothing to show.
    ///
    /// Encoding failures are logged and reported as `None`.
    pub fn generate(&self, top: Option<&Detection>, image: &RgbaImage) -> Option<Thumbnail> {
        match self.try_generate(top, image) {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                warn!("Thumbnail generation failed: {:#}", e);
                None
            }
        }
    }

    pub fn try_generate(&self, top: Option<&Detection>, image: &RgbaImage) -> Result<Option<Thumbnail>> {
        let Some(bbox) = top.and_then(|det| det.bbox) else {
            return Ok(None);
        };

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PreviewError::EmptyImage.into());
        }

        let region = PixelBox::resolve(bbox, width, height).crop_region(width, height, self.config.min_region);
        let crop = Self::extract(image, &region);

        let scale = (self.config.max_thumbnail_width as f64 / region.width as f64).min(1.0);
        let mut thumb = if scale < 1.0 {
            let thumb_w = ((region.width as f64 * scale).round() as u32).max(1);
            let thumb_h = ((region.height as f64 * scale).round() as u32).max(1);
            imageops::resize(&crop, thumb_w, thumb_h, FilterType::Triangle)
        } else {
            crop
        };

        stroke_inner_border(&mut thumb, self.config.border_width, self.border);

        let rgb = DynamicImage::ImageRgba8(thumb).to_rgb8();
        let encoded = self.encode(&rgb)?;

        debug!(
            "Thumbnail {}x{} from region {:?} ({} bytes)",
            rgb.width(),
            rgb.height(),
            region,
            encoded.len()
        );

        Ok(Some(Thumbnail {
            region,
            image: rgb,
            encoded,
        }))
    }

    /// Copy `region` out of `image`; parts outside the image stay transparent
    fn extract(image: &RgbaImage, region: &CropRegion) -> RgbaImage {
        let mut crop = RgbaImage::new(region.width, region.height);
        let (width, height) = image.dimensions();

        if let Some((x, y, w, h)) = region.overlap(width, height) {
            let visible = imageops::crop_imm(image, x, y, w, h).to_image();
            imageops::replace(&mut crop, &visible, x as i64 - region.x, y as i64 - region.y);
        }

        crop
    }

    fn encode(&self, rgb: &RgbImage) -> std::result::Result<Vec<u8>, PreviewError> {
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.config.jpeg_quality).encode_image(rgb)?;
        Ok(encoded)
    }
}

impl Default for CropGenerator {
    fn default() -> Self {
        let overlay = crate::config::OverlayConfig::default();
        Self::new(CropConfig::default(), overlay.accent())
    }
}
