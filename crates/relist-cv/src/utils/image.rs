//! Image and font loading helpers

use crate::error::PreviewError;
use crate::Result;
use ab_glyph::FontArc;
use anyhow::Context;
use image::RgbaImage;
use std::fs;
use std::path::Path;

/// File helpers shared by the renderer and the CLI
pub struct ImageUtils;

impl ImageUtils {
    /// Load any supported image as RGBA at its natural size
    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgba8();

        Ok(img)
    }

    /// Decode an in-memory upload
    pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
        let img = image::load_from_memory(bytes)
            .context("Failed to decode image bytes")?
            .to_rgba8();

        Ok(img)
    }

    /// Save an RGBA surface, format chosen by extension
    pub fn save_rgba<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        image
            .save(&path)
            .with_context(|| format!("Failed to save image: {:?}", path.as_ref()))
    }

    /// Load a TrueType/OpenType font for captions
    pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontArc> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read font: {:?}", path))?;

        FontArc::try_from_vec(bytes).map_err(|_| PreviewError::InvalidFont(path.to_path_buf()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("surface.png");
        let surface = RgbaImage::from_pixel(12, 7, Rgba([1, 2, 3, 128]));

        ImageUtils::save_rgba(&surface, &path)?;
        let loaded = ImageUtils::load_rgba(&path)?;

        assert_eq!(loaded, surface);
        Ok(())
    }

    #[test]
    fn test_invalid_font_is_typed_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("not-a-font.ttf");
        fs::write(&path, b"definitely not a font")?;

        let Err(err) = ImageUtils::load_font(&path) else {
            panic!("garbage bytes loaded as a font");
        };
        assert!(matches!(err.downcast_ref::<PreviewError>(), Some(PreviewError::InvalidFont(_))));
        Ok(())
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(ImageUtils::decode_rgba(b"nope").is_err());
    }
}
