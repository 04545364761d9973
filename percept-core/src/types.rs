//! Core data types and their wire JSON shapes

use serde::{Deserialize, Serialize, Serializer};

/// Pixel-space bounding box, `x1 < x2` and `y1 < y2`.
///
/// Serialized as the 4-element array `[x1, y1, x2, y2]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box height in pixels, clamped to at least 1 so distance estimation
    /// never divides by zero.
    pub fn pixel_height(&self) -> i32 {
        (self.y2 - self.y1).max(1)
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> f64 {
        f64::from(self.x1 + self.x2) / 2.0
    }
}

impl From<[i32; 4]> for BBox {
    fn from(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [i32; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// Lateral position of a detection within the frame (thirds of frame width).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Center,
    Right,
}

impl Side {
    /// Raw wire token, also the fallback when a locale has no phrase for it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Center => "center",
            Side::Right => "right",
        }
    }
}

/// One labeled, confidence-scored, geometrically-estimated object.
///
/// Immutable once produced. `confidence` and `distance_m` keep full precision
/// in memory; rounding to the documented wire precision (3 and 2 decimals)
/// happens at serialization time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "id")]
    pub label: String,
    #[serde(rename = "conf", serialize_with = "round3")]
    pub confidence: f32,
    pub bbox: BBox,
    #[serde(rename = "dist_m", serialize_with = "round2")]
    pub distance_m: f64,
    pub side: Side,
}

/// Canonical machine-readable output for one frame.
///
/// Detection order is the detector's output order and carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    #[serde(default)]
    pub frame_id: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    pub objects: Vec<Detection>,
}

impl DetectionBatch {
    pub fn new(frame_id: Option<String>, ts: i64, objects: Vec<Detection>) -> Self {
        Self { frame_id, ts, objects }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Alert severity, derived from distance bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warn,
    Danger,
}

/// Recommended action for the alert consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertAction {
    Slow,
    Stop,
}

/// One emitted alert. Derived from a single nearest candidate and not
/// persisted beyond its publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    /// Label of the object that triggered the alert.
    pub reason: String,
    pub side: Side,
    #[serde(rename = "dist_m", serialize_with = "round2")]
    pub dist_m: f64,
    pub action: AlertAction,
    /// Suppression window, so consumers know how long the alert stays fresh.
    pub ttl_ms: u64,
    pub ts: i64,
}

fn round2<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((v * 100.0).round() / 100.0)
}

fn round3<S: Serializer>(v: &f32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f32((v * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detection() -> Detection {
        Detection {
            label: "person".to_string(),
            confidence: 0.87654,
            bbox: BBox::new(10, 20, 110, 220),
            distance_m: 7.2001,
            side: Side::Center,
        }
    }

    #[test]
    fn test_bbox_pixel_height_clamped() {
        assert_eq!(BBox::new(0, 50, 10, 50).pixel_height(), 1);
        assert_eq!(BBox::new(0, 50, 10, 40).pixel_height(), 1);
        assert_eq!(BBox::new(0, 0, 10, 200).pixel_height(), 200);
    }

    #[test]
    fn test_bbox_wire_shape_is_array() {
        let json = serde_json::to_value(BBox::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, serde_json::json!([1, 2, 3, 4]));
    }

    #[test]
    fn test_detection_wire_field_names() {
        let json = serde_json::to_value(sample_detection()).unwrap();
        assert!(json.get("id").is_some());
        assert!(json.get("conf").is_some());
        assert!(json.get("dist_m").is_some());
        assert_eq!(json["side"], "center");
    }

    #[test]
    fn test_detection_wire_rounding() {
        let json = serde_json::to_value(sample_detection()).unwrap();
        assert_eq!(json["dist_m"], serde_json::json!(7.2));
        // conf rounded to 3 decimals
        let conf = json["conf"].as_f64().unwrap();
        assert!((conf - 0.877).abs() < 1e-6);
    }

    #[test]
    fn test_batch_round_trip_modulo_rounding() {
        let batch = DetectionBatch::new(
            Some("cam1".to_string()),
            1_700_000_000_000,
            vec![sample_detection()],
        );
        let json = serde_json::to_string(&batch).unwrap();
        let back: DetectionBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frame_id, batch.frame_id);
        assert_eq!(back.ts, batch.ts);
        assert_eq!(back.objects.len(), 1);
        let d = &back.objects[0];
        assert_eq!(d.label, "person");
        assert_eq!(d.bbox, batch.objects[0].bbox);
        assert_eq!(d.side, Side::Center);
        assert!((d.distance_m - 7.2).abs() < 1e-9);
    }

    #[test]
    fn test_alert_wire_shape() {
        let alert = Alert {
            level: AlertLevel::Danger,
            reason: "car".to_string(),
            side: Side::Left,
            dist_m: 0.955,
            action: AlertAction::Stop,
            ttl_ms: 800,
            ts: 42,
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["level"], "danger");
        assert_eq!(json["action"], "stop");
        assert_eq!(json["side"], "left");
        assert_eq!(json["dist_m"], serde_json::json!(0.96));
        assert_eq!(json["ttl_ms"], 800);
    }

    #[test]
    fn test_side_tokens() {
        assert_eq!(Side::Left.as_str(), "left");
        assert_eq!(Side::Center.as_str(), "center");
        assert_eq!(Side::Right.as_str(), "right");
    }
}
