//! Detector profile configuration

use percept_core::Calibration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-deployment detector profile: filtering thresholds and calibration.
///
/// A person-detector profile and a small-object (e.g. fruit) profile differ
/// in reference height, focal scale and the optional label allow-set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorProfile {
    /// Detections with confidence strictly below this are dropped.
    pub confidence_threshold: f32,
    /// When set, detections with labels outside this set are dropped.
    pub allowed_labels: Option<HashSet<String>>,
    /// Distance estimation constants.
    pub calibration: Calibration,
    /// JPEG quality for annotated-frame re-encoding (1-100).
    pub jpeg_quality: u8,
}

impl Default for DetectorProfile {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            allowed_labels: None,
            calibration: Calibration::default(),
            jpeg_quality: 80,
        }
    }
}

impl DetectorProfile {
    /// Profile for the fruit pipeline: lower confidence floor, small
    /// reference height, fixed allow-set.
    pub fn fruit() -> Self {
        Self {
            confidence_threshold: 0.1,
            allowed_labels: Some(
                ["apple", "banana", "orange", "broccoli", "carrot"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            calibration: Calibration {
                reference_height_m: 0.08,
                focal_length_px: 600.0,
                distance_scale: 1.0,
            },
            jpeg_quality: 80,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err("Confidence threshold must be within [0, 1]".to_string());
        }
        if let Some(labels) = &self.allowed_labels {
            if labels.is_empty() {
                return Err("Label allow-set must not be empty when set".to_string());
            }
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }
        self.calibration.validate()
    }
}
