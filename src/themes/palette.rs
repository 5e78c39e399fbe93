use std::fmt;
use std::str::FromStr;

use egui::Color32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseColorError;

/// Categorical palette for recording probes, cycled in creation order.
const DISTINCT_COLORS: [Color32; 21] = [
    Color32::from_rgb(0xe6, 0x19, 0x4b),
    Color32::from_rgb(0x3c, 0xb4, 0x4b),
    Color32::from_rgb(0xff, 0xe1, 0x19),
    Color32::from_rgb(0x43, 0x63, 0xd8),
    Color32::from_rgb(0xf5, 0x82, 0x31),
    Color32::from_rgb(0x91, 0x1e, 0xb4),
    Color32::from_rgb(0x46, 0xf0, 0xf0),
    Color32::from_rgb(0xf0, 0x32, 0xe6),
    Color32::from_rgb(0xbc, 0xf6, 0x0c),
    Color32::from_rgb(0xfa, 0xbe, 0xbe),
    Color32::from_rgb(0x00, 0x80, 0x80),
    Color32::from_rgb(0xe6, 0xbe, 0xff),
    Color32::from_rgb(0x9a, 0x63, 0x24),
    Color32::from_rgb(0xff, 0xfa, 0xc8),
    Color32::from_rgb(0x80, 0x00, 0x00),
    Color32::from_rgb(0xaa, 0xff, 0xc3),
    Color32::from_rgb(0x80, 0x80, 0x00),
    Color32::from_rgb(0xff, 0xd8, 0xb1),
    Color32::from_rgb(0x00, 0x00, 0x75),
    Color32::from_rgb(0x80, 0x80, 0x80),
    Color32::from_rgb(0x00, 0x00, 0x00),
];

pub fn distinct_color(index: usize) -> HexColor {
    HexColor(DISTINCT_COLORS[index % DISTINCT_COLORS.len()])
}

pub fn luma(color: Color32) -> f32 {
    let r = color.r() as f32 / 255.0;
    let g = color.g() as f32 / 255.0;
    let b = color.b() as f32 / 255.0;
    0.299 * r + 0.587 * g + 0.114 * b
}

pub fn text_color_on(background: Color32) -> Color32 {
    if luma(background) > 0.55 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// An opaque color that travels as `#rrggbb` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor(pub Color32);

impl HexColor {
    pub fn color(self) -> Color32 {
        self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&egui::ecolor::HexColor::Hex6(self.0), f)
    }
}

impl FromStr for HexColor {
    type Err = ParseColorError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Color32::from_hex(text)
            .ok()
            .filter(|color| color.is_opaque())
            .map(Self)
            .ok_or_else(|| ParseColorError {
                input: text.to_owned(),
            })
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_by_index() {
        assert_eq!(distinct_color(0).to_string(), "#e6194b");
        assert_eq!(distinct_color(3).to_string(), "#4363d8");
        assert_eq!(distinct_color(21), distinct_color(0));
        assert_eq!(distinct_color(22), distinct_color(1));
    }

    #[test]
    fn hex_parsing_rejects_malformed_input() {
        assert_eq!(
            "#008080".parse::<HexColor>().map(HexColor::color),
            Ok(Color32::from_rgb(0, 0x80, 0x80))
        );
        assert!("008080".parse::<HexColor>().is_err());
        assert!("#0080".parse::<HexColor>().is_err());
        assert!("#00zz80".parse::<HexColor>().is_err());
        assert!("#00808080".parse::<HexColor>().is_err());
    }

    #[test]
    fn short_opaque_form_is_accepted_and_written_long() {
        let color: HexColor = "#0f0".parse().unwrap();
        assert_eq!(color.color(), Color32::from_rgb(0, 0xff, 0));
        assert_eq!(color.to_string(), "#00ff00");
    }

    #[test]
    fn hex_color_serializes_as_string() {
        let json = serde_json::to_string(&distinct_color(1)).unwrap();
        assert_eq!(json, "\"#3cb44b\"");
        let back: HexColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, distinct_color(1));
    }

    #[test]
    fn text_contrast_follows_luma() {
        assert_eq!(text_color_on(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_color_on(Color32::from_rgb(0, 0, 0x75)), Color32::WHITE);
    }
}
