//! `relist preview`: overlay + thumbnail for one saved prediction

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use relist_core::{Decision, DetectionStats, PredictionResponse};
use relist_cv::{DrawnBox, ImageUtils, PreviewConfig, PreviewSession, PreviewState};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub image: PathBuf,
    pub prediction: PathBuf,
    pub display: Option<(u32, u32)>,
    pub config: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub out_dir: PathBuf,
}

/// What was produced, printed as JSON
#[derive(Debug, Serialize)]
pub struct PreviewSummary {
    pub method: Option<String>,
    /// `false` when the backend answered with its demo fallback
    pub model_output: bool,
    pub condition: Option<String>,
    pub decision: Option<Decision>,
    pub stats: DetectionStats,
    pub drawn: Vec<DrawnBox>,
    pub overlay: PathBuf,
    pub composite: PathBuf,
    pub thumbnail: Option<PathBuf>,
}

pub fn run_preview(options: &PreviewOptions) -> Result<PreviewSummary> {
    let mut config = match &options.config {
        Some(path) => PreviewConfig::load(path)?,
        None => PreviewConfig::default(),
    };
    if options.font.is_some() {
        config.label_font = options.font.clone();
    }

    let response = PredictionResponse::load(&options.prediction)?;
    let photo = ImageUtils::load_rgba(&options.image)?;
    let displayed = options.display.unwrap_or_else(|| photo.dimensions());

    log::info!(
        "Previewing {:?} ({}x{} shown at {}x{}) with {} detections",
        options.image,
        photo.width(),
        photo.height(),
        displayed.0,
        displayed.1,
        response.detections.len()
    );

    let mut session = PreviewSession::from_config(&config)?;
    let token = session.select_file();
    session.set_detections(token, response.detections.clone());
    session.image_loaded(token, photo.clone(), displayed);

    if session.state() != PreviewState::Rendered {
        log::info!("No detections to draw");
    }

    fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("Failed to create output dir: {:?}", options.out_dir))?;

    let overlay_path = options.out_dir.join("overlay.png");
    ImageUtils::save_rgba(session.overlay(), &overlay_path)?;

    let composite_path = options.out_dir.join("preview.png");
    ImageUtils::save_rgba(&composite(&photo, session.overlay()), &composite_path)?;

    let thumbnail_path = match session.thumbnail() {
        Some(thumbnail) => {
            let path = options.out_dir.join("thumbnail.jpg");
            thumbnail.save(&path)?;
            Some(path)
        }
        None => None,
    };

    Ok(PreviewSummary {
        method: response.method.clone(),
        model_output: response.is_model_output(),
        condition: response.condition_label(),
        decision: response.decision(),
        stats: response.detections.stats(),
        drawn: session.drawn_boxes().to_vec(),
        overlay: overlay_path,
        composite: composite_path,
        thumbnail: thumbnail_path,
    })
}

/// Photo scaled to the overlay's size with the overlay laid on top
fn composite(photo: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let (width, height) = overlay.dimensions();
    let mut base = if photo.dimensions() == (width, height) {
        photo.clone()
    } else {
        imageops::resize(photo, width, height, FilterType::Triangle)
    };
    imageops::overlay(&mut base, overlay, 0, 0);
    base
}
