use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WaystoneColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Pink,
    Cyan,
    Brown,
    Black,
}

pub const DEFAULT_PALETTE: [WaystoneColor; 10] = [
    WaystoneColor::Red,
    WaystoneColor::Blue,
    WaystoneColor::Green,
    WaystoneColor::Yellow,
    WaystoneColor::Purple,
    WaystoneColor::Orange,
    WaystoneColor::Pink,
    WaystoneColor::Cyan,
    WaystoneColor::Brown,
    WaystoneColor::Black,
];

impl WaystoneColor {
    /// Wire code; doubles as the CSS color used to fill markers.
    pub fn code(self) -> &'static str {
        match self {
            WaystoneColor::Red => "red",
            WaystoneColor::Blue => "blue",
            WaystoneColor::Green => "green",
            WaystoneColor::Yellow => "yellow",
            WaystoneColor::Purple => "purple",
            WaystoneColor::Orange => "orange",
            WaystoneColor::Pink => "pink",
            WaystoneColor::Cyan => "cyan",
            WaystoneColor::Brown => "brown",
            WaystoneColor::Black => "black",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WaystoneColor::Red => "Red",
            WaystoneColor::Blue => "Blue",
            WaystoneColor::Green => "Green",
            WaystoneColor::Yellow => "Yellow",
            WaystoneColor::Purple => "Purple",
            WaystoneColor::Orange => "Orange",
            WaystoneColor::Pink => "Pink",
            WaystoneColor::Cyan => "Cyan",
            WaystoneColor::Brown => "Brown",
            WaystoneColor::Black => "Black",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        DEFAULT_PALETTE
            .iter()
            .copied()
            .find(|color| color.code() == code.trim())
    }
}

impl fmt::Display for WaystoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Brush {
    Color(WaystoneColor),
    Eraser,
}

impl Brush {
    pub fn from_data_attr(value: &str) -> Option<Self> {
        if value == "eraser" {
            return Some(Brush::Eraser);
        }
        WaystoneColor::from_code(value).map(Brush::Color)
    }
}

/// Reads the page's `[[code, label], ...]` palette data. Unknown codes and
/// repeats are skipped.
pub fn palette_from_pairs(pairs: &[(String, String)]) -> Vec<WaystoneColor> {
    let mut palette = Vec::with_capacity(pairs.len());
    for (code, label) in pairs {
        match WaystoneColor::from_code(code) {
            Some(color) if !palette.contains(&color) => palette.push(color),
            Some(_) => {}
            None => log::warn!("Ignoring unknown palette color {code:?} ({label})"),
        }
    }
    palette
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_serde() {
        let json = serde_json::to_string(&WaystoneColor::Purple).unwrap();
        assert_eq!(json, "\"purple\"");
        let color: WaystoneColor = serde_json::from_str("\"cyan\"").unwrap();
        assert_eq!(color, WaystoneColor::Cyan);
    }

    #[test]
    fn brush_parses_eraser_and_colors() {
        assert_eq!(Brush::from_data_attr("eraser"), Some(Brush::Eraser));
        assert_eq!(
            Brush::from_data_attr("red"),
            Some(Brush::Color(WaystoneColor::Red))
        );
        assert_eq!(Brush::from_data_attr("magenta"), None);
    }

    #[test]
    fn palette_skips_unknown_and_duplicate_codes() {
        let pairs = vec![
            ("red".to_string(), "Czerwony".to_string()),
            ("teal".to_string(), "Teal".to_string()),
            ("blue".to_string(), "Niebieski".to_string()),
            ("red".to_string(), "Czerwony".to_string()),
        ];
        assert_eq!(
            palette_from_pairs(&pairs),
            vec![WaystoneColor::Red, WaystoneColor::Blue]
        );
    }
}
