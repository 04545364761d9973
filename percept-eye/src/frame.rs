//! Inbound payload normalization
//!
//! Camera sources publish frames in several shapes: a JSON envelope with a
//! base64 `data` field, a bare base64 string, a data-URL string, or raw
//! encoded image bytes. The shape is resolved once here, at the boundary,
//! into a single canonical decoded [`Frame`].

use crate::error::VisionError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const DATA_URL_PREFIX: &str = "data:image";
const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Structured frame envelope as published by camera nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameEnvelope {
    pub frame_id: Option<String>,
    /// Capture timestamp in milliseconds since the Unix epoch.
    pub ts: Option<i64>,
    pub w: Option<u32>,
    pub h: Option<u32>,
    pub encoding: Option<String>,
    /// Base64 image data, optionally with a data-URL prefix.
    pub data: Option<String>,
    /// Loop guard set on frames this node republished itself.
    #[serde(rename = "_relay_skip")]
    pub relay_skip: bool,
}

/// Closed set of accepted inbound payload shapes.
#[derive(Debug, Clone)]
pub enum InboundPayload {
    RawBytes(Vec<u8>),
    Base64String(String),
    DataUrl(String),
    Envelope(FrameEnvelope),
}

impl InboundPayload {
    /// Resolve the shape of a raw MQTT payload.
    ///
    /// Resolution order: JSON object -> envelope, JSON string -> base64 or
    /// data URL, image magic bytes -> raw bytes, printable text -> base64,
    /// everything else -> raw bytes (the decode attempt decides).
    pub fn classify(payload: &[u8]) -> InboundPayload {
        if let Ok(value) = serde_json::from_slice::<Value>(payload) {
            match value {
                Value::String(s) => return Self::from_string(s),
                Value::Object(_) => {
                    if let Ok(env) = serde_json::from_value::<FrameEnvelope>(value) {
                        return InboundPayload::Envelope(env);
                    }
                }
                _ => {}
            }
        }
        if has_image_magic(payload) {
            return InboundPayload::RawBytes(payload.to_vec());
        }
        match std::str::from_utf8(payload) {
            Ok(s) if s.trim().chars().all(|c| !c.is_control()) => {
                Self::from_string(s.trim().to_string())
            }
            _ => InboundPayload::RawBytes(payload.to_vec()),
        }
    }

    fn from_string(s: String) -> InboundPayload {
        if s.starts_with(DATA_URL_PREFIX) {
            InboundPayload::DataUrl(s)
        } else {
            InboundPayload::Base64String(s)
        }
    }
}

/// One decoded image plus identifying metadata. Owned by a single pipeline
/// pass and discarded afterwards.
#[derive(Debug)]
pub struct Frame {
    pub frame_id: Option<String>,
    pub timestamp_ms: i64,
    pub width: u32,
    pub height: u32,
    pub pixels: RgbImage,
}

/// Normalize a raw payload into a decoded frame.
///
/// Returns `Ok(None)` for relay-guarded envelopes (not an error). Any decode
/// failure aborts this message with `VisionError::Decode` and no side effects.
pub fn normalize(payload: &[u8], now_ms: i64) -> Result<Option<Frame>, VisionError> {
    let (bytes, frame_id, ts) = match InboundPayload::classify(payload) {
        InboundPayload::Envelope(env) => {
            if env.relay_skip {
                debug!("Skipping relay-guarded frame");
                return Ok(None);
            }
            let data = env
                .data
                .ok_or_else(|| VisionError::Decode("envelope has no data field".to_string()))?;
            (decode_base64(&data)?, env.frame_id, env.ts)
        }
        InboundPayload::Base64String(s) | InboundPayload::DataUrl(s) => {
            (decode_base64(&s)?, None, None)
        }
        InboundPayload::RawBytes(b) => (b, None, None),
    };

    let image = image::load_from_memory(&bytes)
        .map_err(|e| VisionError::Decode(format!("image decode failed: {e}")))?
        .to_rgb8();
    let (width, height) = (image.width(), image.height());

    Ok(Some(Frame {
        frame_id,
        timestamp_ms: ts.unwrap_or(now_ms),
        width,
        height,
        pixels: image,
    }))
}

/// Base64-decode, stripping any `data:image/...;base64,` prefix first.
fn decode_base64(s: &str) -> Result<Vec<u8>, VisionError> {
    let b64 = if s.starts_with(DATA_URL_PREFIX) {
        s.split_once(',')
            .map(|(_, rest)| rest)
            .ok_or_else(|| VisionError::Decode("malformed data URL".to_string()))?
    } else {
        s
    };
    BASE64
        .decode(b64.trim())
        .map_err(|e| VisionError::Decode(format!("base64 decode failed: {e}")))
}

fn has_image_magic(payload: &[u8]) -> bool {
    payload.starts_with(&JPEG_MAGIC) || payload.starts_with(&PNG_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;

    /// Tiny valid PNG, 4x2 pixels.
    fn test_image_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf)
            .write_image(img.as_raw(), 4, 2, image::ColorType::Rgb8)
            .unwrap();
        buf
    }

    #[test]
    fn test_classify_raw_png_bytes() {
        let bytes = test_image_bytes();
        assert!(matches!(
            InboundPayload::classify(&bytes),
            InboundPayload::RawBytes(_)
        ));
    }

    #[test]
    fn test_classify_jpeg_magic() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        assert!(matches!(
            InboundPayload::classify(&bytes),
            InboundPayload::RawBytes(_)
        ));
    }

    #[test]
    fn test_classify_bare_base64() {
        let b64 = BASE64.encode(test_image_bytes());
        assert!(matches!(
            InboundPayload::classify(b64.as_bytes()),
            InboundPayload::Base64String(_)
        ));
    }

    #[test]
    fn test_classify_json_data_url_string() {
        let b64 = BASE64.encode(test_image_bytes());
        let url = format!("data:image/png;base64,{b64}");
        let json = serde_json::to_vec(&url).unwrap();
        assert!(matches!(
            InboundPayload::classify(&json),
            InboundPayload::DataUrl(_)
        ));
    }

    #[test]
    fn test_classify_envelope() {
        let json = br#"{"frame_id":"cam1","data":"abcd"}"#;
        match InboundPayload::classify(json) {
            InboundPayload::Envelope(env) => {
                assert_eq!(env.frame_id.as_deref(), Some("cam1"));
                assert!(!env.relay_skip);
            }
            other => panic!("expected envelope, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_envelope_passes_metadata() {
        let b64 = BASE64.encode(test_image_bytes());
        let payload = serde_json::json!({
            "frame_id": "cam1",
            "ts": 123_456i64,
            "data": b64,
        });
        let frame = normalize(&serde_json::to_vec(&payload).unwrap(), 999)
            .unwrap()
            .unwrap();
        assert_eq!(frame.frame_id.as_deref(), Some("cam1"));
        assert_eq!(frame.timestamp_ms, 123_456);
        assert_eq!((frame.width, frame.height), (4, 2));
    }

    #[test]
    fn test_normalize_bare_base64_defaults_metadata() {
        let b64 = BASE64.encode(test_image_bytes());
        let frame = normalize(b64.as_bytes(), 777).unwrap().unwrap();
        assert_eq!(frame.frame_id, None);
        assert_eq!(frame.timestamp_ms, 777);
    }

    #[test]
    fn test_normalize_data_url() {
        let b64 = BASE64.encode(test_image_bytes());
        let url = format!("data:image/png;base64,{b64}");
        let frame = normalize(url.as_bytes(), 0).unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (4, 2));
    }

    #[test]
    fn test_normalize_relay_skip_is_silent() {
        let payload = br#"{"data":"abcd","_relay_skip":true}"#;
        assert!(normalize(payload, 0).unwrap().is_none());
    }

    #[test]
    fn test_normalize_envelope_without_data_fails() {
        let payload = br#"{"frame_id":"cam1"}"#;
        let err = normalize(payload, 0).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_normalize_garbage_fails_decode() {
        let err = normalize(b"not base64 at all!!!", 0).unwrap_err();
        assert!(err.is_decode());
        let err = normalize(&[0x00, 0x01, 0x02, 0x03], 0).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_normalize_valid_base64_invalid_image_fails_decode() {
        let b64 = BASE64.encode(b"these bytes are no image");
        let err = normalize(b64.as_bytes(), 0).unwrap_err();
        assert!(err.is_decode());
    }
}
