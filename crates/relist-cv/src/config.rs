//! Preview configuration

use crate::Result;
use anyhow::Context;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Number of colours used for non-top boxes
pub const PALETTE_LEN: usize = 7;

/// Main preview configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub overlay: OverlayConfig,
    pub crop: CropConfig,
    /// TrueType/OpenType font for box captions, replacing the bundled
    /// DejaVu Sans
    pub label_font: Option<PathBuf>,
}

/// Box and caption styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub top_stroke_width: u32,
    pub stroke_width: u32,
    pub font_size: f32,
    /// Horizontal padding around caption text
    pub label_padding: u32,
    pub label_background: [u8; 4],
    pub label_text: [u8; 4],
    /// Colour of the top-confidence box and the thumbnail border
    pub accent: [u8; 4],
    pub palette: [[u8; 4]; PALETTE_LEN],
}

/// Thumbnail generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub max_thumbnail_width: u32,
    /// Minimum crop width and height in natural pixels
    pub min_region: u32,
    pub border_width: u32,
    pub jpeg_quality: u8,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            top_stroke_width: 4,
            stroke_width: 2,
            font_size: 14.0,
            label_padding: 4,
            label_background: [0, 0, 0, 153],
            label_text: [255, 255, 255, 255],
            accent: [255, 59, 48, 255],
            palette: [
                [0, 194, 255, 255],
                [255, 204, 0, 255],
                [52, 199, 89, 255],
                [175, 82, 222, 255],
                [255, 149, 0, 255],
                [90, 200, 250, 255],
                [255, 45, 85, 255],
            ],
        }
    }
}

impl OverlayConfig {
    pub fn accent(&self) -> Rgba<u8> {
        Rgba(self.accent)
    }

    /// Colour for a non-top box at original position `index`
    pub fn palette_color(&self, index: usize) -> Rgba<u8> {
        Rgba(self.palette[index % PALETTE_LEN])
    }

    /// Caption strip height: font size plus 2px above and below
    pub fn label_height(&self) -> u32 {
        self.font_size.ceil() as u32 + 4
    }
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            max_thumbnail_width: 300,
            min_region: 8,
            border_width: 4,
            jpeg_quality: 90,
        }
    }
}

impl PreviewConfig {
    /// Smaller thumbnails for list views
    pub fn compact() -> Self {
        Self {
            crop: CropConfig {
                max_thumbnail_width: 160,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file; missing keys take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;

        serde_json::from_str(&json).with_context(|| format!("Invalid config: {:?}", path))
    }
}
