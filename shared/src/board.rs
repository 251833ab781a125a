use serde::{Deserialize, Serialize};

use crate::grid::{CellAddress, Grid};
use crate::palette::WaystoneColor;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Waystone {
    pub row: u32,
    pub col: u32,
    pub color: WaystoneColor,
}

impl Waystone {
    pub fn cell(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathSegment {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl PathSegment {
    /// Loop segments are never created.
    pub fn new(start: CellAddress, end: CellAddress) -> Option<Self> {
        if start == end {
            None
        } else {
            Some(Self { start, end })
        }
    }

    pub fn to_record(self) -> PathSegmentRecord {
        PathSegmentRecord {
            start_row: self.start.row,
            start_col: self.start.col,
            end_row: self.end.row,
            end_col: self.end.col,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathSegmentRecord {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl PathSegmentRecord {
    pub fn to_segment(self) -> Option<PathSegment> {
        PathSegment::new(
            CellAddress::new(self.start_row, self.start_col),
            CellAddress::new(self.end_row, self.end_col),
        )
    }
}

/// Converts saved records, dropping loops and segments that leave the grid.
pub fn segments_from_records(records: &[PathSegmentRecord], grid: Option<&Grid>) -> Vec<PathSegment> {
    let mut segments = Vec::with_capacity(records.len());
    for record in records {
        let Some(segment) = record.to_segment() else {
            log::warn!("Dropping loop path segment {record:?}");
            continue;
        };
        if let Some(grid) = grid {
            if !grid.contains(segment.start) || !grid.contains(segment.end) {
                log::warn!("Dropping path segment outside the grid {record:?}");
                continue;
            }
        }
        segments.push(segment);
    }
    segments
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MapDetails {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BoardRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub map_details: Option<MapDetails>,
    pub grid_rows: u32,
    pub grid_cols: u32,
    #[serde(default)]
    pub waystones: Vec<Waystone>,
}

impl BoardRecord {
    pub fn image_url(&self) -> Option<&str> {
        self.map_details
            .as_ref()
            .and_then(|details| details.image.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn user_paths_endpoint(&self) -> String {
        format!("/api/boards/{}/user-paths/", self.id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BoardCreateRequest {
    pub name: String,
    pub map_reference: u64,
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub waystones_input: Vec<Waystone>,
}

pub fn format_field_errors(body: &serde_json::Value) -> String {
    let mut out = String::new();
    match body {
        serde_json::Value::Object(fields) => {
            for (field, value) in fields {
                let text = match value {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(value_text)
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => value_text(other),
                };
                out.push_str(&format!("{field}: {text}\n"));
            }
        }
        other => {
            out.push_str(&value_text(other));
            out.push('\n');
        }
    }
    out
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::compute_grid;

    #[test]
    fn board_record_reads_player_payload() {
        let json = r#"{
            "id": 7,
            "name": "Valley",
            "creator": {"id": 1, "username": "ana"},
            "map_details": {"id": 3, "title": "Valley", "image": "/media/maps/v.png"},
            "grid_rows": 4,
            "grid_cols": 6,
            "waystones": [{"id": 11, "row": 1, "col": 2, "color": "red"}]
        }"#;
        let board: BoardRecord = serde_json::from_str(json).unwrap();
        assert_eq!(board.image_url(), Some("/media/maps/v.png"));
        assert_eq!(board.user_paths_endpoint(), "/api/boards/7/user-paths/");
        assert_eq!(board.waystones[0].color, WaystoneColor::Red);
    }

    #[test]
    fn records_drop_loops_and_out_of_grid_segments() {
        let grid = compute_grid(300.0, 300.0, 3, 3).unwrap();
        let records = [
            PathSegmentRecord { start_row: 0, start_col: 0, end_row: 0, end_col: 2 },
            PathSegmentRecord { start_row: 1, start_col: 1, end_row: 1, end_col: 1 },
            PathSegmentRecord { start_row: 0, start_col: 0, end_row: 5, end_col: 0 },
        ];
        let segments = segments_from_records(&records, Some(&grid));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].to_record(), records[0]);
    }

    #[test]
    fn field_errors_render_one_line_per_field() {
        let body = serde_json::json!({
            "name": ["This field is required."],
            "waystones_input": ["Color 'red' has 1 stones.", "Try again."],
        });
        assert_eq!(
            format_field_errors(&body),
            "name: This field is required.\nwaystones_input: Color 'red' has 1 stones., Try again.\n"
        );
    }
}
