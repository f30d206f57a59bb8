//! Relist core data model
//!
//! Canonical detections, prediction responses and listing summaries as
//! consumed from the marketplace backend.

pub mod detection;
pub mod labels;
pub mod listing;
pub mod prediction;

pub use detection::{BBOX_LEN, Detection, DetectionSet, DetectionStats, RawDetection};
pub use labels::friendly_label;
pub use listing::{DashboardStats, ListingPage, ListingSummary};
pub use prediction::{Decision, ImageCondition, PredictionResponse, Predictions};
