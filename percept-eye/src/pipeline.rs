//! Per-frame processing pipeline
//!
//! One inbound message, one pass: normalize, detect, estimate, annotate.
//! The pipeline is synchronous and owns the frame for its whole lifetime.

use crate::annotate::{draw_detections, encode_jpeg};
use crate::config::DetectorProfile;
use crate::detector::{DetectionAdapter, ObjectDetector};
use crate::error::VisionError;
use crate::frame;
use percept_core::DetectionBatch;
use std::sync::Arc;
use tracing::debug;

/// Output of one pipeline pass.
#[derive(Debug)]
pub struct FrameOutput {
    pub batch: DetectionBatch,
    /// Annotated JPEG bytes, when annotation is enabled.
    pub annotated: Option<Vec<u8>>,
}

/// The frame pipeline: normalizer, detection adapter and annotation.
pub struct FramePipeline {
    adapter: DetectionAdapter,
    annotate: bool,
}

impl FramePipeline {
    pub fn new(
        detector: Arc<dyn ObjectDetector>,
        profile: DetectorProfile,
        annotate: bool,
    ) -> Result<Self, VisionError> {
        Ok(Self {
            adapter: DetectionAdapter::new(detector, profile)?,
            annotate,
        })
    }

    /// Process one inbound payload to completion.
    ///
    /// `Ok(None)` means the message was deliberately skipped (relay guard).
    /// Errors abort this message only, with no partial output.
    pub fn process(
        &self,
        payload: &[u8],
        now_ms: i64,
        distance_scale: f64,
    ) -> Result<Option<FrameOutput>, VisionError> {
        let Some(mut frame) = frame::normalize(payload, now_ms)? else {
            return Ok(None);
        };
        debug!(
            frame_id = frame.frame_id.as_deref().unwrap_or("unknown"),
            width = frame.width,
            height = frame.height,
            "Frame decoded"
        );

        let detections = self.adapter.detect_frame(&frame, distance_scale)?;

        let annotated = if self.annotate {
            draw_detections(&mut frame.pixels, &detections);
            Some(encode_jpeg(
                &frame.pixels,
                self.adapter.profile().jpeg_quality,
            )?)
        } else {
            None
        };

        let batch = DetectionBatch::new(frame.frame_id.take(), frame.timestamp_ms, detections);
        Ok(Some(FrameOutput { batch, annotated }))
    }
}
