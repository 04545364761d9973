//! percept-core: shared data model for the percept perception pipeline
//!
//! Holds the types that cross crate boundaries (detections, batches, alerts)
//! together with their wire JSON shapes, and the pure geometric estimator
//! that turns pixel bounding boxes into calibrated distance/side estimates.

pub mod geometry;
pub mod types;

pub use geometry::{side_of_frame, Calibration};
pub use types::{Alert, AlertAction, AlertLevel, BBox, Detection, DetectionBatch, Side};
