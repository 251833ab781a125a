use serde::{Deserialize, Serialize};

use crate::error::GridError;

pub const MAX_GRID_DIMENSION: u32 = 50;
pub const BORDER_WIDTH: f64 = 2.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// A rectangular grid laid over a rendered image. Cell sizes keep the exact
/// float quotient; only line positions are snapped when drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Grid {
    pub fn width(&self) -> f64 {
        self.cell_width * self.cols as f64
    }

    pub fn height(&self) -> f64 {
        self.cell_height * self.rows as f64
    }

    pub fn contains(&self, cell: CellAddress) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }
}

pub fn valid_dimension(value: u32) -> bool {
    (1..=MAX_GRID_DIMENSION).contains(&value)
}

pub fn compute_grid(
    pixel_width: f64,
    pixel_height: f64,
    rows: u32,
    cols: u32,
) -> Result<Grid, GridError> {
    if !valid_dimension(rows) || !valid_dimension(cols) {
        return Err(GridError::InvalidDimensions { rows, cols });
    }
    if !(pixel_width.is_finite() && pixel_width > 0.0)
        || !(pixel_height.is_finite() && pixel_height > 0.0)
    {
        return Err(GridError::ImageNotRendered {
            width: pixel_width,
            height: pixel_height,
        });
    }
    Ok(Grid {
        rows,
        cols,
        cell_width: pixel_width / cols as f64,
        cell_height: pixel_height / rows as f64,
    })
}

pub fn pixel_to_cell(x: f64, y: f64, grid: &Grid) -> Option<CellAddress> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let col = (x / grid.cell_width).floor();
    let row = (y / grid.cell_height).floor();
    if col < 0.0 || row < 0.0 || col >= grid.cols as f64 || row >= grid.rows as f64 {
        return None;
    }
    Some(CellAddress {
        row: row as u32,
        col: col as u32,
    })
}

pub fn cell_center(cell: CellAddress, grid: &Grid) -> Point {
    Point {
        x: (cell.col as f64 + 0.5) * grid.cell_width,
        y: (cell.row as f64 + 0.5) * grid.cell_height,
    }
}

pub fn distance_to_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return ((px - x1).powi(2) + (py - y1).powi(2)).sqrt();
    }
    let t = ((px - x1) * dx + (py - y1) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    let proj_x = x1 + t * dx;
    let proj_y = y1 + t * dy;
    ((px - proj_x).powi(2) + (py - proj_y).powi(2)).sqrt()
}

/// Interior line offsets, snapped to half pixels so 1px lines stay crisp.
pub struct GridLines {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
}

pub fn grid_lines(grid: &Grid) -> GridLines {
    let vertical = (1..grid.cols)
        .map(|i| (i as f64 * grid.cell_width).floor() + 0.5)
        .collect();
    let horizontal = (1..grid.rows)
        .map(|i| (i as f64 * grid.cell_height).floor() + 0.5)
        .collect();
    GridLines {
        vertical,
        horizontal,
    }
}

/// Border edges as (from, to) pairs: top, bottom, left, right. Each line is
/// centered 1px inside the edge so a 2px stroke covers the outer pixels.
pub fn border_lines(width: f64, height: f64) -> [(Point, Point); 4] {
    let inset = BORDER_WIDTH / 2.0;
    [
        (Point { x: 0.0, y: inset }, Point { x: width, y: inset }),
        (
            Point {
                x: 0.0,
                y: height - inset,
            },
            Point {
                x: width,
                y: height - inset,
            },
        ),
        (Point { x: inset, y: 0.0 }, Point { x: inset, y: height }),
        (
            Point {
                x: width - inset,
                y: 0.0,
            },
            Point {
                x: width - inset,
                y: height,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_by_five_over_500px() {
        let grid = compute_grid(500.0, 500.0, 5, 5).unwrap();
        assert_eq!(grid.cell_width, 100.0);
        assert_eq!(grid.cell_height, 100.0);
        let cell = pixel_to_cell(250.0, 250.0, &grid).unwrap();
        assert_eq!(cell, CellAddress::new(2, 2));
        assert_eq!(cell_center(cell, &grid), Point { x: 250.0, y: 250.0 });
    }

    #[test]
    fn rejects_out_of_range_dimensions() {
        for (rows, cols) in [(0, 5), (5, 0), (51, 5), (5, 51)] {
            assert_eq!(
                compute_grid(100.0, 100.0, rows, cols),
                Err(GridError::InvalidDimensions { rows, cols })
            );
        }
    }

    #[test]
    fn rejects_unrendered_image() {
        assert!(matches!(
            compute_grid(0.0, 300.0, 3, 3),
            Err(GridError::ImageNotRendered { .. })
        ));
        assert!(matches!(
            compute_grid(300.0, 0.0, 3, 3),
            Err(GridError::ImageNotRendered { .. })
        ));
    }

    #[test]
    fn keeps_fractional_cell_size() {
        let grid = compute_grid(100.0, 100.0, 3, 7).unwrap();
        assert_eq!(grid.cell_width, 100.0 / 7.0);
        assert_eq!(grid.cell_height, 100.0 / 3.0);
    }

    #[test]
    fn cell_center_round_trips_for_every_size() {
        for rows in 1..=MAX_GRID_DIMENSION {
            for cols in 1..=MAX_GRID_DIMENSION {
                let grid = compute_grid(637.0, 411.0, rows, cols).unwrap();
                for cell in [
                    CellAddress::new(0, 0),
                    CellAddress::new(rows - 1, cols - 1),
                    CellAddress::new(rows / 2, cols / 2),
                ] {
                    let center = cell_center(cell, &grid);
                    assert_eq!(pixel_to_cell(center.x, center.y, &grid), Some(cell));
                }
            }
        }
    }

    #[test]
    fn points_outside_grid_have_no_cell() {
        let grid = compute_grid(400.0, 300.0, 3, 4).unwrap();
        assert_eq!(pixel_to_cell(-0.01, 10.0, &grid), None);
        assert_eq!(pixel_to_cell(10.0, -0.01, &grid), None);
        assert_eq!(pixel_to_cell(400.0, 10.0, &grid), None);
        assert_eq!(pixel_to_cell(10.0, 300.0, &grid), None);
        assert_eq!(pixel_to_cell(f64::NAN, 10.0, &grid), None);
        assert_eq!(
            pixel_to_cell(399.99, 299.99, &grid),
            Some(CellAddress::new(2, 3))
        );
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        assert_eq!(distance_to_segment(5.0, 3.0, 0.0, 0.0, 10.0, 0.0), 3.0);
        assert_eq!(distance_to_segment(-3.0, 4.0, 0.0, 0.0, 10.0, 0.0), 5.0);
        assert_eq!(distance_to_segment(13.0, 4.0, 0.0, 0.0, 10.0, 0.0), 5.0);
        assert_eq!(distance_to_segment(3.0, 4.0, 0.0, 0.0, 0.0, 0.0), 5.0);
    }

    #[test]
    fn interior_lines_snap_to_half_pixels() {
        let grid = compute_grid(100.0, 50.0, 2, 3).unwrap();
        let lines = grid_lines(&grid);
        assert_eq!(lines.vertical, vec![33.5, 66.5]);
        assert_eq!(lines.horizontal, vec![25.5]);
        let single = compute_grid(100.0, 50.0, 1, 1).unwrap();
        let lines = grid_lines(&single);
        assert!(lines.vertical.is_empty() && lines.horizontal.is_empty());
    }

    #[test]
    fn border_is_inset_by_one_pixel() {
        let [top, bottom, left, right] = border_lines(200.0, 100.0);
        assert_eq!(top.0.y, 1.0);
        assert_eq!(bottom.0.y, 99.0);
        assert_eq!(left.0.x, 1.0);
        assert_eq!(right.1.x, 199.0);
    }
}
