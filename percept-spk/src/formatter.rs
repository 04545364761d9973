//! Detection batch and nearest-object text rendering

use crate::locale::{label_name, side_name, side_phrase, Locale};
use percept_core::Detection;

/// Render a whole detection batch as one summary sentence.
///
/// Zero detections yields the locale's "nothing detected" sentence.
pub fn summary(objects: &[Detection], locale: Locale) -> String {
    if objects.is_empty() {
        return match locale {
            Locale::En => "No objects detected".to_string(),
            Locale::Zh => "沒有偵測到物件".to_string(),
        };
    }

    let parts: Vec<String> = objects
        .iter()
        .map(|det| {
            let label = label_name(locale, &det.label);
            let side = side_name(locale, det.side);
            match locale {
                Locale::En => format!(
                    "{label} {:.2}m on {side} (conf {:.2})",
                    det.distance_m, det.confidence
                ),
                Locale::Zh => format!(
                    "{label} {:.2}公尺 {side} (置信 {:.2})",
                    det.distance_m, det.confidence
                ),
            }
        })
        .collect();

    match locale {
        Locale::En => format!("Detected {}: {}", objects.len(), parts.join("; ")),
        Locale::Zh => format!("偵測到{}項：{}", objects.len(), parts.join("； ")),
    }
}

/// Render the nearest detection as a short speech sentence.
///
/// `min_confidence` is an optional floor for speech gating; detections below
/// it are ignored. Returns `None` when nothing qualifies so callers can skip
/// publishing instead of emitting an empty sentence.
pub fn nearest(
    objects: &[Detection],
    locale: Locale,
    min_confidence: Option<f32>,
) -> Option<String> {
    let nearest = objects
        .iter()
        .filter(|det| min_confidence.map_or(true, |floor| det.confidence >= floor))
        .min_by(|a, b| {
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;

    let label = label_name(locale, &nearest.label);
    let phrase = side_phrase(locale, nearest.side);
    Some(match locale {
        Locale::En => format!("{label} {:.2}m {phrase}", nearest.distance_m),
        Locale::Zh => format!("{phrase}有{label}，距離{:.2}公尺", nearest.distance_m),
    })
}
