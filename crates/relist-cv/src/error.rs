//! Typed failures surfaced by the preview pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("not a usable TrueType/OpenType font: {0:?}")]
    InvalidFont(PathBuf),

    #[error("image has zero natural size")]
    EmptyImage,

    #[error("failed to encode thumbnail")]
    Encode(#[from] image::ImageError),
}
