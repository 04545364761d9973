//! percept-eye: frame ingestion and object detection for the percept pipeline
//!
//! Normalizes heterogeneous inbound frame payloads (raw bytes, base64,
//! data URLs, structured envelopes) into decoded frames, runs the pluggable
//! detector capability with confidence/label filtering, estimates distance
//! and side per detection, and optionally renders annotated JPEGs.

pub mod annotate;
pub mod config;
pub mod detector;
pub mod error;
pub mod frame;
pub mod pipeline;

pub use config::DetectorProfile;
pub use detector::{DetectionAdapter, NullDetector, ObjectDetector, RawDetection};
pub use error::VisionError;
pub use frame::{Frame, FrameEnvelope, InboundPayload};
pub use pipeline::{FrameOutput, FramePipeline};
