//! Annotated-frame rendering
//!
//! Draws hollow bounding boxes over the frame (color picked per label from a
//! fixed palette) and re-encodes the result as JPEG. Box label text is not
//! rendered; rectangles only.

use crate::error::VisionError;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use percept_core::Detection;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const PALETTE: [[u8; 3]; 10] = [
    [0, 255, 0],
    [255, 0, 0],
    [0, 128, 255],
    [255, 128, 0],
    [255, 0, 255],
    [0, 255, 255],
    [128, 0, 255],
    [128, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
];

/// Stable per-label box color.
pub fn class_color(label: &str) -> Rgb<u8> {
    let mut hasher = DefaultHasher::new();
    label.hash(&mut hasher);
    Rgb(PALETTE[(hasher.finish() % PALETTE.len() as u64) as usize])
}

/// Draw a 2px hollow rectangle per detection, in place.
///
/// imageproc clips rectangles that extend past the image bounds.
pub fn draw_detections(image: &mut RgbImage, detections: &[Detection]) {
    for det in detections {
        let color = class_color(&det.label);
        let width = (det.bbox.x2 - det.bbox.x1).max(1);
        let height = (det.bbox.y2 - det.bbox.y1).max(1);
        for inset in 0..2i32 {
            let w = (width - 2 * inset).max(1) as u32;
            let h = (height - 2 * inset).max(1) as u32;
            let rect = Rect::at(det.bbox.x1 + inset, det.bbox.y1 + inset).of_size(w, h);
            draw_hollow_rect_mut(image, rect, color);
        }
    }
}

/// Re-encode a frame as JPEG at the given quality.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, VisionError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgb8,
        )
        .map_err(|e| VisionError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use percept_core::{BBox, Side};

    fn detection(label: &str, bbox: BBox) -> Detection {
        Detection {
            label: label.to_string(),
            confidence: 0.9,
            bbox,
            distance_m: 1.0,
            side: Side::Center,
        }
    }

    #[test]
    fn test_class_color_stable_and_in_palette() {
        let a = class_color("person");
        let b = class_color("person");
        assert_eq!(a, b);
        assert!(PALETTE.contains(&a.0));
    }

    #[test]
    fn test_draw_changes_pixels() {
        let mut img = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        let before = img.clone();
        draw_detections(&mut img, &[detection("person", BBox::new(10, 10, 40, 40))]);
        assert_ne!(img.as_raw(), before.as_raw());
    }

    #[test]
    fn test_draw_out_of_bounds_box_does_not_panic() {
        let mut img = RgbImage::new(32, 32);
        draw_detections(&mut img, &[detection("car", BBox::new(-10, -10, 100, 100))]);
    }

    #[test]
    fn test_encode_jpeg_round_trips() {
        let img = RgbImage::from_pixel(16, 8, Rgb([200, 100, 50]));
        let bytes = encode_jpeg(&img, 80).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
