//! Prediction payload returned by the listing-creation endpoint

use crate::detection::{Detection, DetectionSet};
use crate::labels::friendly_label;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Condition class assigned to the whole device photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCondition {
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Suggested next step for the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Repair,
    Resell,
    Recycle,
    #[serde(other)]
    Unknown,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Repair => "repair",
            Decision::Resell => "resell",
            Decision::Recycle => "recycle",
            Decision::Unknown => "unknown",
        }
    }
}

/// Price / remaining-life estimates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    #[serde(default)]
    pub price_suggest: Option<f64>,
    #[serde(default)]
    pub rul_months: Option<i64>,
    #[serde(default)]
    pub decision: Option<Decision>,
    #[serde(default)]
    pub co2_saved_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub path: String,
}

/// Full prediction response. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub inference_ms: Option<u64>,
    #[serde(default, deserialize_with = "nullable_detections")]
    pub detections: DetectionSet,
    #[serde(default)]
    pub image_condition: Option<ImageCondition>,
    #[serde(default)]
    pub predictions: Option<Predictions>,
    #[serde(default)]
    pub listing_id: Option<i64>,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// `"detections": null` is treated like an empty list
fn nullable_detections<'de, D>(deserializer: D) -> std::result::Result<DetectionSet, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<DetectionSet>::deserialize(deserializer)?.unwrap_or_default())
}

impl PredictionResponse {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse prediction response")
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).context("Failed to parse prediction response")
    }

    /// Load a saved prediction response from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open prediction file: {:?}", path))?;

        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid prediction file: {:?}", path))
    }

    /// True when the response came from a real detector rather than the
    /// backend's heuristic fallback
    pub fn is_model_output(&self) -> bool {
        self.method.as_deref().is_some_and(|method| method != "demo")
    }

    pub fn top_detection(&self) -> Option<&Detection> {
        self.detections.top()
    }

    /// Display name for the device condition.
    ///
    /// Uses `image_condition` when present, otherwise the top detection's class.
    pub fn condition_label(&self) -> Option<String> {
        if let Some(condition) = &self.image_condition {
            return Some(friendly_label(&condition.label).into_owned());
        }

        self.top_detection()
            .map(|det| friendly_label(&det.label).into_owned())
    }

    pub fn decision(&self) -> Option<Decision> {
        self.predictions.as_ref().and_then(|p| p.decision)
    }
}
