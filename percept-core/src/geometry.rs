//! Pinhole-camera distance estimation and lateral side classification
//!
//! Both functions are pure and deterministic; calibration constants are
//! deployment-specific (a person detector and a small-object detector use
//! different reference heights and effective focal scale).

use crate::types::{BBox, Side};
use serde::{Deserialize, Serialize};

/// Camera/detector calibration for distance estimation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Calibration {
    /// Assumed real-world height of a detected object, in meters.
    pub reference_height_m: f64,
    /// Effective focal length, in pixels.
    pub focal_length_px: f64,
    /// Correction factor for wide-field-of-view sources (1.0 = none).
    pub distance_scale: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            reference_height_m: 1.6,
            focal_length_px: 900.0,
            distance_scale: 1.0,
        }
    }
}

impl Calibration {
    /// Validate calibration constants
    pub fn validate(&self) -> Result<(), String> {
        if self.reference_height_m <= 0.0 {
            return Err("Reference height must be positive".to_string());
        }
        if self.focal_length_px <= 0.0 {
            return Err("Focal length must be positive".to_string());
        }
        if self.distance_scale <= 0.0 {
            return Err("Distance scale must be positive".to_string());
        }
        Ok(())
    }

    /// Estimate object distance from its pixel height.
    ///
    /// `distance = scale * (reference_height * focal_length) / pixel_height`,
    /// with pixel height clamped to >= 1. Never negative.
    pub fn estimate_distance_m(&self, bbox: &BBox) -> f64 {
        let pix_h = f64::from(bbox.pixel_height());
        self.distance_scale * (self.reference_height_m * self.focal_length_px) / pix_h
    }

    /// Same calibration with an extra distance scale applied on top.
    pub fn scaled(&self, extra_scale: f64) -> Self {
        Self {
            distance_scale: self.distance_scale * extra_scale,
            ..*self
        }
    }
}

/// Classify which horizontal third of the frame the box center falls in.
///
/// Centers exactly on `width/3` or `2*width/3` classify as `Center` (the
/// comparisons are strict).
pub fn side_of_frame(bbox: &BBox, frame_width: u32) -> Side {
    let cx = bbox.center_x();
    let w = f64::from(frame_width);
    if cx < w / 3.0 {
        Side::Left
    } else if cx > 2.0 * w / 3.0 {
        Side::Right
    } else {
        Side::Center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_known_values() {
        let cal = Calibration::default();
        // 1.6m * 900px / 200px = 7.2m
        let d = cal.estimate_distance_m(&BBox::new(0, 0, 50, 200));
        assert!((d - 7.2).abs() < 1e-9);
        // 720px box -> 2.0m
        let d = cal.estimate_distance_m(&BBox::new(0, 0, 50, 720));
        assert!((d - 2.0).abs() < 1e-9);
        // 1500px box -> 0.96m
        let d = cal.estimate_distance_m(&BBox::new(0, 0, 50, 1500));
        assert!((d - 0.96).abs() < 1e-9);
    }

    #[test]
    fn test_distance_zero_height_box_clamped() {
        let cal = Calibration::default();
        let d = cal.estimate_distance_m(&BBox::new(0, 100, 50, 100));
        assert!((d - 1.6 * 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_scale_correction() {
        let cal = Calibration {
            reference_height_m: 0.08,
            focal_length_px: 600.0,
            distance_scale: 1.0,
        };
        let wide = cal.scaled(0.1);
        let bbox = BBox::new(0, 0, 20, 48);
        let d = cal.estimate_distance_m(&bbox);
        let dw = wide.estimate_distance_m(&bbox);
        assert!((dw - d * 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_side_boundaries_center_wins() {
        // width 300: thirds at 100 and 200
        let at = |cx: i32| BBox::new(cx, 0, cx, 10);
        assert_eq!(side_of_frame(&at(100), 300), Side::Center);
        assert_eq!(side_of_frame(&at(200), 300), Side::Center);
        assert_eq!(side_of_frame(&at(99), 300), Side::Left);
        assert_eq!(side_of_frame(&at(201), 300), Side::Right);
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let mut cal = Calibration::default();
        cal.focal_length_px = 0.0;
        assert!(cal.validate().is_err());
        cal = Calibration::default();
        cal.reference_height_m = -1.0;
        assert!(cal.validate().is_err());
        cal = Calibration::default();
        cal.distance_scale = 0.0;
        assert!(cal.validate().is_err());
        assert!(Calibration::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_distance_positive(y1 in 0i32..5000, h in 1i32..5000) {
            let cal = Calibration::default();
            let d = cal.estimate_distance_m(&BBox::new(0, y1, 10, y1 + h));
            prop_assert!(d > 0.0);
        }

        #[test]
        fn prop_distance_decreasing_in_height(y1 in 0i32..1000, h in 1i32..4000, extra in 1i32..1000) {
            let cal = Calibration::default();
            let near = cal.estimate_distance_m(&BBox::new(0, y1, 10, y1 + h + extra));
            let far = cal.estimate_distance_m(&BBox::new(0, y1, 10, y1 + h));
            prop_assert!(near < far);
        }

        #[test]
        fn prop_side_partitions_frame(cx in 0i32..1000, w in 3u32..2000) {
            prop_assume!((cx as u32) < w);
            let side = side_of_frame(&BBox::new(cx, 0, cx, 10), w);
            let wf = w as f64;
            let expected = if (cx as f64) < wf / 3.0 {
                Side::Left
            } else if (cx as f64) > 2.0 * wf / 3.0 {
                Side::Right
            } else {
                Side::Center
            };
            prop_assert_eq!(side, expected);
        }
    }
}
