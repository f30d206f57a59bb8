//! Relist computer vision library
//!
//! Detection overlays and defect thumbnails for listing previews.

pub mod config;
pub mod crop;
pub mod error;
pub mod geometry;
pub mod render;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use config::{CropConfig, OverlayConfig, PreviewConfig};
pub use crop::{CropGenerator, Thumbnail};
pub use error::PreviewError;
pub use geometry::{CropRegion, ImageMetrics, PixelBox};
pub use render::{DrawnBox, OverlayRenderer};
pub use session::{ImageToken, PreviewSession, PreviewState};
pub use utils::ImageUtils;

// Error handling
pub type Result<T> = anyhow::Result<T>;
