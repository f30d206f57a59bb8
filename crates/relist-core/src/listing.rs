//! Listing summaries and the dashboard stat cards built from them

use crate::prediction::{Decision, ImageCondition, Predictions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Moderation status assumed for listings that do not report one
pub const DEFAULT_STATUS: &str = "pending";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// One row of the listings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub predictions: Option<Predictions>,
    #[serde(default)]
    pub image_condition: Option<ImageCondition>,
}

impl ListingSummary {
    pub fn decision(&self) -> Option<Decision> {
        self.predictions.as_ref().and_then(|p| p.decision)
    }
}

/// Envelope used by the listings endpoints: `{"items": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub items: Vec<ListingSummary>,
}

impl ListingPage {
    /// Accepts either the `{"items": [...]}` envelope or a bare array
    pub fn from_json_str(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Page(ListingPage),
            Bare(Vec<ListingSummary>),
        }

        let shape: Shape = serde_json::from_str(json).context("Failed to parse listings")?;
        Ok(match shape {
            Shape::Page(page) => page,
            Shape::Bare(items) => ListingPage { items },
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read listings file: {:?}", path))?;

        Self::from_json_str(&json).with_context(|| format!("Invalid listings file: {:?}", path))
    }
}

/// Counts behind the dashboard stat cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_decision: BTreeMap<Decision, usize>,
    pub co2_saved_kg: f64,
}

impl DashboardStats {
    pub fn from_listings(listings: &[ListingSummary]) -> Self {
        let mut stats = Self::default();

        for listing in listings {
            stats.total += 1;
            *stats.by_status.entry(listing.status.clone()).or_insert(0) += 1;

            if let Some(decision) = listing.decision() {
                *stats.by_decision.entry(decision).or_insert(0) += 1;
            }

            stats.co2_saved_kg += listing
                .predictions
                .as_ref()
                .and_then(|p| p.co2_saved_kg)
                .unwrap_or(0.0);
        }

        stats
    }

    pub fn count_status(&self, status: &str) -> usize {
        self.by_status.get(status).copied().unwrap_or(0)
    }

    pub fn count_decision(&self, decision: Decision) -> usize {
        self.by_decision.get(&decision).copied().unwrap_or(0)
    }
}
