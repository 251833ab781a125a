use crate::board::{PathSegment, Waystone};
use crate::grid::{border_lines, cell_center, grid_lines, Grid, Point, BORDER_WIDTH};
use crate::paths::PATH_LINE_WIDTH;

pub const CREATOR_GRID_COLOR: &str = "rgba(255, 170, 0, 0.9)";
pub const PLAYER_GRID_COLOR: &str = "rgba(180, 180, 180, 0.25)";
pub const PATH_COLOR: &str = "rgba(0, 123, 255, 0.9)";
pub const PATH_PREVIEW_COLOR: &str = "rgba(0, 123, 255, 0.4)";
pub const PATH_DASH: [f64; 2] = [8.0, 8.0];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
    pub dashed: bool,
    pub round_caps: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    Line {
        from: Point,
        to: Point,
        style: LineStyle,
    },
    Marker {
        center: Point,
        radius: f64,
        fill: &'static str,
        outline: &'static str,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct MarkerStyle {
    pub radius_ratio: f64,
    pub outline: &'static str,
}

pub const CREATOR_MARKERS: MarkerStyle = MarkerStyle {
    radius_ratio: 0.4,
    outline: "#333",
};

pub const PLAYER_MARKERS: MarkerStyle = MarkerStyle {
    radius_ratio: 0.35,
    outline: "#555",
};

fn push_grid(commands: &mut Vec<DrawCommand>, grid: &Grid, color: &'static str, border: bool) {
    let width = grid.width();
    let height = grid.height();
    let style = LineStyle {
        color,
        width: 1.0,
        dashed: false,
        round_caps: false,
    };
    let lines = grid_lines(grid);
    for x in lines.vertical {
        commands.push(DrawCommand::Line {
            from: Point { x, y: 0.0 },
            to: Point { x, y: height },
            style,
        });
    }
    for y in lines.horizontal {
        commands.push(DrawCommand::Line {
            from: Point { x: 0.0, y },
            to: Point { x: width, y },
            style,
        });
    }
    if border {
        let style = LineStyle {
            width: BORDER_WIDTH,
            ..style
        };
        for (from, to) in border_lines(width, height) {
            commands.push(DrawCommand::Line { from, to, style });
        }
    }
}

fn push_segment(commands: &mut Vec<DrawCommand>, grid: &Grid, segment: &PathSegment, preview: bool) {
    commands.push(DrawCommand::Line {
        from: cell_center(segment.start, grid),
        to: cell_center(segment.end, grid),
        style: LineStyle {
            color: if preview { PATH_PREVIEW_COLOR } else { PATH_COLOR },
            width: PATH_LINE_WIDTH,
            dashed: preview,
            round_caps: true,
        },
    });
}

fn push_markers(commands: &mut Vec<DrawCommand>, grid: &Grid, waystones: &[Waystone], style: MarkerStyle) {
    let radius = grid.cell_width.min(grid.cell_height) * style.radius_ratio;
    for waystone in waystones {
        commands.push(DrawCommand::Marker {
            center: cell_center(waystone.cell(), grid),
            radius,
            fill: waystone.color.code(),
            outline: style.outline,
        });
    }
}

pub fn creator_scene(grid: &Grid, waystones: &[Waystone]) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::Clear {
        width: grid.width(),
        height: grid.height(),
    }];
    push_grid(&mut commands, grid, CREATOR_GRID_COLOR, true);
    push_markers(&mut commands, grid, waystones, CREATOR_MARKERS);
    commands
}

/// Player canvas. Markers always come last so no path covers them.
pub fn player_scene(
    grid: &Grid,
    paths: &[PathSegment],
    preview: Option<PathSegment>,
    waystones: &[Waystone],
) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::Clear {
        width: grid.width(),
        height: grid.height(),
    }];
    push_grid(&mut commands, grid, PLAYER_GRID_COLOR, false);
    for segment in paths {
        push_segment(&mut commands, grid, segment, false);
    }
    if let Some(segment) = preview {
        push_segment(&mut commands, grid, &segment, true);
    }
    push_markers(&mut commands, grid, waystones, PLAYER_MARKERS);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{compute_grid, CellAddress};
    use crate::palette::WaystoneColor;

    #[test]
    fn creator_scene_has_interior_lines_border_and_markers() {
        let grid = compute_grid(300.0, 200.0, 2, 3).unwrap();
        let stones = [Waystone {
            row: 1,
            col: 2,
            color: WaystoneColor::Pink,
        }];
        let scene = creator_scene(&grid, &stones);
        let lines = scene
            .iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
            .count();
        assert_eq!(lines, 2 + 1 + 4);
        assert_eq!(
            scene.last(),
            Some(&DrawCommand::Marker {
                center: Point { x: 250.0, y: 150.0 },
                radius: 40.0,
                fill: "pink",
                outline: "#333",
            })
        );
    }

    #[test]
    fn player_scene_keeps_markers_above_paths() {
        let grid = compute_grid(500.0, 500.0, 5, 5).unwrap();
        let segment = PathSegment::new(CellAddress::new(0, 0), CellAddress::new(4, 4)).unwrap();
        let preview = PathSegment::new(CellAddress::new(1, 0), CellAddress::new(1, 3));
        let stones = [
            Waystone { row: 0, col: 0, color: WaystoneColor::Red },
            Waystone { row: 4, col: 4, color: WaystoneColor::Red },
        ];
        let scene = player_scene(&grid, &[segment], preview, &stones);
        assert!(matches!(scene[0], DrawCommand::Clear { .. }));
        let last_line = scene
            .iter()
            .rposition(|command| matches!(command, DrawCommand::Line { .. }))
            .unwrap();
        let first_marker = scene
            .iter()
            .position(|command| matches!(command, DrawCommand::Marker { .. }))
            .unwrap();
        assert!(last_line < first_marker);
        match &scene[last_line] {
            DrawCommand::Line { style, .. } => {
                assert!(style.dashed);
                assert_eq!(style.color, PATH_PREVIEW_COLOR);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
