//! Detector capability and the detection adapter
//!
//! The detection model itself is an external, pluggable capability behind
//! [`ObjectDetector`]. The adapter owns filtering (confidence floor, label
//! allow-set) and geometric estimation, which run after the capability call.

use crate::config::DetectorProfile;
use crate::error::VisionError;
use crate::frame::Frame;
use image::RgbImage;
use percept_core::{side_of_frame, BBox, Detection};
use std::sync::Arc;
use tracing::debug;

/// One raw detector output box, before filtering and estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BBox,
}

impl RawDetection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

/// External object-detection capability.
///
/// Called exactly once per frame, never re-entrant on the same frame. A
/// failure aborts only the current message.
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<RawDetection>, VisionError>;
}

/// Capability stub that never detects anything.
///
/// Lets a node run end to end (subscribe, decode, publish empty batches)
/// before a real model adapter is plugged in.
pub struct NullDetector;

impl ObjectDetector for NullDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<RawDetection>, VisionError> {
        Ok(Vec::new())
    }
}

/// Invokes the detector capability and turns raw boxes into calibrated
/// [`Detection`]s.
pub struct DetectionAdapter {
    detector: Arc<dyn ObjectDetector>,
    profile: DetectorProfile,
}

impl DetectionAdapter {
    pub fn new(
        detector: Arc<dyn ObjectDetector>,
        profile: DetectorProfile,
    ) -> Result<Self, VisionError> {
        profile.validate().map_err(VisionError::Config)?;
        Ok(Self { detector, profile })
    }

    pub fn profile(&self) -> &DetectorProfile {
        &self.profile
    }

    /// Run detection on a decoded frame.
    ///
    /// Filtering happens before geometric estimation; an empty result is a
    /// normal outcome, not an error. `extra_scale` is the per-source
    /// wide-FOV distance correction (1.0 for the default source).
    pub fn detect_frame(
        &self,
        frame: &Frame,
        extra_scale: f64,
    ) -> Result<Vec<Detection>, VisionError> {
        let raw = self.detector.detect(&frame.pixels)?;
        let total = raw.len();
        let calibration = self.profile.calibration.scaled(extra_scale);

        let detections: Vec<Detection> = raw
            .into_iter()
            .filter(|d| d.confidence >= self.profile.confidence_threshold)
            .filter(|d| {
                self.profile
                    .allowed_labels
                    .as_ref()
                    .map_or(true, |set| set.contains(&d.label))
            })
            .map(|d| Detection {
                distance_m: calibration.estimate_distance_m(&d.bbox),
                side: side_of_frame(&d.bbox, frame.width),
                label: d.label,
                confidence: d.confidence,
                bbox: d.bbox,
            })
            .collect();

        debug!(
            kept = detections.len(),
            dropped = total - detections.len(),
            "Detection filtering complete"
        );
        Ok(detections)
    }
}
