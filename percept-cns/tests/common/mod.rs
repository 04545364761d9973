//! Shared test doubles for the node and fan-out tests

use async_trait::async_trait;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbImage};
use parking_lot::Mutex;
use percept_cns::{CnsError, Publisher};
use percept_eye::{ObjectDetector, RawDetection, VisionError};
use std::collections::HashSet;

/// Publisher that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingPublisher {
    pub messages: Mutex<Vec<(String, Vec<u8>)>>,
    /// Topics that fail on publish, for failure-isolation tests.
    pub failing_topics: HashSet<String>,
}

impl RecordingPublisher {
    pub fn failing(topics: &[&str]) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            failing_topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn topics(&self) -> Vec<String> {
        self.messages.lock().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn payload_for(&self, topic: &str) -> Option<Vec<u8>> {
        self.messages
            .lock()
            .iter()
            .find(|(t, _)| t == topic)
            .map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        topic: &str,
        _qos: u8,
        _retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), CnsError> {
        if self.failing_topics.contains(topic) {
            return Err(CnsError::Transport(format!("injected failure on {topic}")));
        }
        self.messages.lock().push((topic.to_string(), payload));
        Ok(())
    }
}

/// Detector double returning a scripted set of boxes.
pub struct ScriptedDetector(pub Vec<RawDetection>);

impl ObjectDetector for ScriptedDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<RawDetection>, VisionError> {
        Ok(self.0.clone())
    }
}

/// Minimal valid PNG payload of the given size.
pub fn png_payload(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::new(width, height);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ColorType::Rgb8)
        .unwrap();
    buf
}
