use crate::board::Waystone;
use crate::palette::WaystoneColor;

pub const BOARD_NAME_REQUIRED: &str = "Board name is required.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Validation {
    pub valid: bool,
    pub messages: Vec<String>,
}

pub fn color_count(waystones: &[Waystone], color: WaystoneColor) -> usize {
    waystones.iter().filter(|ws| ws.color == color).count()
}

/// Every palette color must appear on 0 or 2 cells; the name must not be
/// blank. All problems are reported, the name first.
pub fn validate(
    waystones: &[Waystone],
    palette: &[WaystoneColor],
    board_name: &str,
    grid_confirmed: bool,
) -> Validation {
    let mut messages = Vec::new();
    if board_name.trim().is_empty() {
        messages.push(BOARD_NAME_REQUIRED.to_string());
    }
    for &color in palette {
        let count = color_count(waystones, color);
        if count != 0 && count != 2 {
            messages.push(format!(
                "Color {} ({}) has {} waystones (expected 0 or 2).",
                color.label(),
                color.code(),
                count
            ));
        }
    }
    Validation {
        valid: grid_confirmed && messages.is_empty(),
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone(row: u32, col: u32, color: WaystoneColor) -> Waystone {
        Waystone { row, col, color }
    }

    const RED_BLUE: [WaystoneColor; 2] = [WaystoneColor::Red, WaystoneColor::Blue];

    #[test]
    fn pair_of_red_is_valid() {
        let stones = [
            stone(0, 0, WaystoneColor::Red),
            stone(3, 3, WaystoneColor::Red),
        ];
        let result = validate(&stones, &RED_BLUE, "Map", true);
        assert!(result.valid);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn single_red_names_color_and_count() {
        let stones = [stone(0, 0, WaystoneColor::Red)];
        let result = validate(&stones, &RED_BLUE, "Map", true);
        assert!(!result.valid);
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].contains("red"));
        assert!(result.messages[0].contains("has 1 "));
    }

    #[test]
    fn three_of_a_color_is_rejected() {
        let stones = [
            stone(0, 0, WaystoneColor::Blue),
            stone(0, 1, WaystoneColor::Blue),
            stone(0, 2, WaystoneColor::Blue),
        ];
        let result = validate(&stones, &RED_BLUE, "Map", true);
        assert!(!result.valid);
        assert!(result.messages[0].contains("has 3 "));
    }

    #[test]
    fn blank_name_is_reported_first_alongside_color_errors() {
        let stones = [
            stone(0, 0, WaystoneColor::Red),
            stone(1, 0, WaystoneColor::Blue),
        ];
        let result = validate(&stones, &RED_BLUE, "   ", true);
        assert!(!result.valid);
        assert_eq!(result.messages.len(), 3);
        assert_eq!(result.messages[0], BOARD_NAME_REQUIRED);
    }

    #[test]
    fn unconfirmed_grid_is_never_valid() {
        let result = validate(&[], &RED_BLUE, "Map", false);
        assert!(!result.valid);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn colors_outside_palette_are_not_counted() {
        let stones = [stone(0, 0, WaystoneColor::Green)];
        assert!(validate(&stones, &RED_BLUE, "Map", true).valid);
    }
}
