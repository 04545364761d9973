//! Locale tables for label and side rendering
//!
//! Lookups fall back to the raw token when a label or side has no entry, so
//! new detector classes degrade gracefully instead of failing.

use percept_core::Side;
use serde::{Deserialize, Serialize};

/// Supported output locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Zh,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "zh" => Ok(Locale::Zh),
            other => Err(format!("Unknown locale: {other}")),
        }
    }
}

/// Traditional-Chinese names for the detector vocabulary (COCO subset plus
/// the fruit classes).
const LABEL_ZH: &[(&str, &str)] = &[
    ("person", "人"),
    ("umbrella", "雨傘"),
    ("kite", "風箏"),
    ("car", "車"),
    ("truck", "卡車"),
    ("bus", "公車"),
    ("train", "火車"),
    ("motorcycle", "機車"),
    ("bicycle", "腳踏車"),
    ("cat", "貓"),
    ("dog", "狗"),
    ("bird", "鳥"),
    ("horse", "馬"),
    ("sheep", "羊"),
    ("cow", "牛"),
    ("bear", "熊"),
    ("zebra", "斑馬"),
    ("giraffe", "長頸鹿"),
    ("traffic light", "紅綠燈"),
    ("fire hydrant", "消防栓"),
    ("stop sign", "停止標誌"),
    ("bench", "長椅"),
    ("chair", "椅子"),
    ("sofa", "沙發"),
    ("bed", "床"),
    ("dining table", "餐桌"),
    ("potted plant", "盆栽"),
    ("tv", "電視"),
    ("laptop", "筆電"),
    ("mouse", "滑鼠"),
    ("keyboard", "鍵盤"),
    ("cell phone", "手機"),
    ("remote", "遙控器"),
    ("microwave", "微波爐"),
    ("oven", "烤箱"),
    ("toaster", "烤麵包機"),
    ("sink", "洗手槽"),
    ("refrigerator", "冰箱"),
    ("book", "書"),
    ("clock", "時鐘"),
    ("vase", "花瓶"),
    ("scissors", "剪刀"),
    ("teddy bear", "泰迪熊"),
    ("toothbrush", "牙刷"),
    ("apple", "蘋果"),
    ("banana", "香蕉"),
    ("orange", "橘子"),
    ("broccoli", "花椰菜"),
    ("carrot", "紅蘿蔔"),
];

/// Localized label name, falling back to the raw label when unmapped.
pub fn label_name<'a>(locale: Locale, label: &'a str) -> &'a str {
    match locale {
        Locale::En => label,
        Locale::Zh => LABEL_ZH
            .iter()
            .find(|(key, _)| *key == label)
            .map(|(_, name)| *name)
            .unwrap_or(label),
    }
}

/// Short side name, as used in the summary text.
pub fn side_name(locale: Locale, side: Side) -> &'static str {
    match locale {
        Locale::En => side.as_str(),
        Locale::Zh => match side {
            Side::Left => "左側",
            Side::Center => "正前",
            Side::Right => "右側",
        },
    }
}

/// Directional phrase, as used in the nearest-object speech text.
pub fn side_phrase(locale: Locale, side: Side) -> &'static str {
    match locale {
        Locale::En => match side {
            Side::Left => "ahead on your left",
            Side::Center => "straight ahead",
            Side::Right => "ahead on your right",
        },
        Locale::Zh => match side {
            Side::Left => "前方左側",
            Side::Center => "正前方",
            Side::Right => "前方右側",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_lookup_and_fallback() {
        assert_eq!(label_name(Locale::Zh, "person"), "人");
        assert_eq!(label_name(Locale::Zh, "apple"), "蘋果");
        // unmapped labels fall back to the raw token
        assert_eq!(label_name(Locale::Zh, "unicycle"), "unicycle");
        assert_eq!(label_name(Locale::En, "person"), "person");
    }

    #[test]
    fn test_side_names() {
        assert_eq!(side_name(Locale::En, Side::Left), "left");
        assert_eq!(side_name(Locale::Zh, Side::Center), "正前");
    }

    #[test]
    fn test_side_phrases() {
        assert_eq!(side_phrase(Locale::En, Side::Center), "straight ahead");
        assert_eq!(side_phrase(Locale::Zh, Side::Right), "前方右側");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("ZH".parse::<Locale>().unwrap(), Locale::Zh);
        assert!("fr".parse::<Locale>().is_err());
    }
}
