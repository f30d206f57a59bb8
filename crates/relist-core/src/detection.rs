//! Defect detections and confidence ranking
//!
//! The inference service is loose about field names (`confidence` or
//! `score`, `bbox` or `box`). Everything is folded into [`Detection`] at
//! ingestion, so rendering code only ever sees one shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of coordinates in a bounding box (`x1, y1, x2, y2`)
pub const BBOX_LEN: usize = 4;

/// One defect region reported by the inference service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    /// `None` when the service sent no box or fewer than four coordinates
    pub bbox: Option<[f64; BBOX_LEN]>,
}

impl Detection {
    /// Create a detection without a bounding box
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: None,
        }
    }

    /// Attach a bounding box
    pub fn with_bbox(mut self, bbox: [f64; BBOX_LEN]) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Label text drawn next to the box, e.g. `glass_crack 0.87`
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.label, self.confidence)
    }
}

/// Detection exactly as the inference service serializes it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetection {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default, rename = "box")]
    pub alt_box: Option<Vec<f64>>,
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        let bbox = raw
            .bbox
            .or(raw.alt_box)
            .filter(|coords| coords.len() >= BBOX_LEN)
            .map(|coords| [coords[0], coords[1], coords[2], coords[3]]);

        Self {
            label: raw.label.unwrap_or_default(),
            confidence: raw.confidence.or(raw.score).unwrap_or(0.0),
            bbox,
        }
    }
}

/// Detections for one image, kept in the order the service sent them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RawDetection>", into = "Vec<Detection>")]
pub struct DetectionSet {
    detections: Vec<Detection>,
}

impl DetectionSet {
    /// Create new empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from vector of detections
    pub fn from_vec(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    /// Add a detection at the end
    pub fn push(&mut self, detection: Detection) {
        self.detections.push(detection);
    }

    /// Get detections as slice, in original order
    pub fn as_slice(&self) -> &[Detection] {
        &self.detections
    }

    pub fn get(&self, index: usize) -> Option<&Detection> {
        self.detections.get(index)
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Original indices ordered by descending confidence.
    ///
    /// Ties keep their original relative order. The set itself is never
    /// reordered, so palette colours stay attached to original positions.
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.detections.len()).collect();
        order.sort_by(|&a, &b| {
            self.detections[b]
                .confidence
                .total_cmp(&self.detections[a].confidence)
        });
        order
    }

    /// Index of the highest-confidence detection
    pub fn top_index(&self) -> Option<usize> {
        self.ranked().first().copied()
    }

    /// Highest-confidence detection
    pub fn top(&self) -> Option<&Detection> {
        self.top_index().map(|index| &self.detections[index])
    }

    /// Detections that carry a usable bounding box, with their original index
    pub fn with_boxes(&self) -> impl Iterator<Item = (usize, &Detection, [f64; BBOX_LEN])> {
        self.detections
            .iter()
            .enumerate()
            .filter_map(|(index, det)| det.bbox.map(|bbox| (index, det, bbox)))
    }

    /// Get statistics
    pub fn stats(&self) -> DetectionStats {
        let mut label_counts: HashMap<String, usize> = HashMap::new();
        let mut total_confidence = 0.0;
        let mut max_confidence = f64::NEG_INFINITY;
        let mut min_confidence = f64::INFINITY;

        for det in &self.detections {
            *label_counts.entry(det.label.clone()).or_insert(0) += 1;
            total_confidence += det.confidence;
            max_confidence = max_confidence.max(det.confidence);
            min_confidence = min_confidence.min(det.confidence);
        }

        if self.detections.is_empty() {
            return DetectionStats::default();
        }

        DetectionStats {
            total: self.detections.len(),
            boxed: self.with_boxes().count(),
            label_counts,
            avg_confidence: total_confidence / self.detections.len() as f64,
            max_confidence,
            min_confidence,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }
}

impl From<Vec<RawDetection>> for DetectionSet {
    fn from(raw: Vec<RawDetection>) -> Self {
        raw.into_iter().map(Detection::from).collect()
    }
}

impl From<DetectionSet> for Vec<Detection> {
    fn from(set: DetectionSet) -> Self {
        set.detections
    }
}

impl IntoIterator for DetectionSet {
    type Item = Detection;
    type IntoIter = std::vec::IntoIter<Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

impl FromIterator<Detection> for DetectionSet {
    fn from_iter<T: IntoIterator<Item = Detection>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// Summary of a detection set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub total: usize,
    /// Detections with a usable bounding box
    pub boxed: usize,
    pub label_counts: HashMap<String, usize>,
    pub avg_confidence: f64,
    pub max_confidence: f64,
    pub min_confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn parse(json: &str) -> DetectionSet {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_score_is_confidence_synonym() {
        let set = parse(r#"[{"label": "scratch", "score": 0.42, "bbox": [0, 0, 1, 1]}]"#);
        assert_eq!(set.as_slice()[0].confidence, 0.42);
    }

    #[test]
    fn test_confidence_wins_over_score() {
        let set = parse(r#"[{"label": "bent", "confidence": 0.7, "score": 0.1}]"#);
        assert_eq!(set.as_slice()[0].confidence, 0.7);
    }

    #[test]
    fn test_missing_confidence_defaults_to_zero() {
        let set = parse(r#"[{"label": "bent"}]"#);
        assert_eq!(set.as_slice()[0].confidence, 0.0);
        assert_eq!(set.as_slice()[0].bbox, None);
    }

    #[test]
    fn test_box_alias_and_short_boxes() {
        let set = parse(
            r#"[
                {"label": "a", "confidence": 0.5, "box": [1, 2, 3, 4]},
                {"label": "b", "confidence": 0.5, "bbox": [1, 2, 3]},
                {"label": "c", "confidence": 0.5, "bbox": [1, 2, 3, 4, 5]}
            ]"#,
        );
        assert_eq!(set.as_slice()[0].bbox, Some([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(set.as_slice()[1].bbox, None);
        assert_eq!(set.as_slice()[2].bbox, Some([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(set.with_boxes().count(), 2);
    }

    #[test]
    fn test_ranked_is_descending_and_leaves_order_alone() {
        let set = DetectionSet::from_vec(vec![
            Detection::new("low", 0.4),
            Detection::new("high", 0.9),
            Detection::new("mid", 0.6),
        ]);

        assert_eq!(set.ranked(), vec![1, 2, 0]);
        assert_eq!(set.top().map(|d| d.label.as_str()), Some("high"));
        assert_eq!(set.as_slice()[0].label, "low");
    }

    #[test]
    fn test_top_is_stable_under_shuffling() {
        let base: Vec<Detection> = (0..12)
            .map(|i| Detection::new(format!("d{i}"), i as f64 / 20.0))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let mut shuffled = base.clone();
            shuffled.shuffle(&mut rng);
            let set = DetectionSet::from_vec(shuffled);
            assert_eq!(set.top().map(|d| d.label.as_str()), Some("d11"));
        }
    }

    #[test]
    fn test_empty_set() {
        let set = DetectionSet::new();
        assert!(set.top().is_none());
        assert_eq!(set.stats(), DetectionStats::default());
    }

    #[test]
    fn test_stats() {
        let set = DetectionSet::from_vec(vec![
            Detection::new("scratch", 0.2).with_bbox([0.0, 0.0, 0.5, 0.5]),
            Detection::new("scratch", 0.6),
            Detection::new("bent", 1.0),
        ]);
        let stats = set.stats();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.boxed, 1);
        assert_eq!(stats.label_counts["scratch"], 2);
        assert!((stats.avg_confidence - 0.6).abs() < 1e-9);
        assert_eq!(stats.max_confidence, 1.0);
        assert_eq!(stats.min_confidence, 0.2);
    }

    #[test]
    fn test_caption_formats_two_decimals() {
        assert_eq!(Detection::new("glass_crack", 0.876).caption(), "glass_crack 0.88");
    }
}
