use crate::board::{segments_from_records, PathSegment, PathSegmentRecord};
use crate::grid::{cell_center, distance_to_segment, pixel_to_cell, CellAddress, Grid};

pub const ERASER_RADIUS: f64 = 10.0;
pub const PATH_LINE_WIDTH: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathTool {
    None,
    Pencil,
    Eraser,
}

impl PathTool {
    pub fn from_data_attr(value: &str) -> Self {
        match value {
            "pencil" => PathTool::Pencil,
            "eraser" => PathTool::Eraser,
            _ => PathTool::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Down { x: f64, y: f64, primary: bool },
    Move { x: f64, y: f64, primary_held: bool },
    Up { x: f64, y: f64, primary: bool },
    Leave,
    SelectTool(PathTool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Idle,
    Redraw,
    Persist,
}

pub enum DragState {
    Idle,
    Drawing {
        start: CellAddress,
        hovered: Option<CellAddress>,
        preview: Option<PathSegment>,
    },
}

pub struct PathEditor {
    grid: Option<Grid>,
    tool: PathTool,
    paths: Vec<PathSegment>,
    drag: DragState,
}

impl Default for PathEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl PathEditor {
    pub fn new() -> Self {
        Self {
            grid: None,
            tool: PathTool::None,
            paths: Vec::new(),
            drag: DragState::Idle,
        }
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Replaces cell geometry, e.g. after a resize. Paths are kept since
    /// they are stored as cell addresses.
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = Some(grid);
    }

    pub fn tool(&self) -> PathTool {
        self.tool
    }

    pub fn paths(&self) -> &[PathSegment] {
        &self.paths
    }

    pub fn preview(&self) -> Option<PathSegment> {
        match &self.drag {
            DragState::Drawing { preview, .. } if self.tool == PathTool::Pencil => *preview,
            _ => None,
        }
    }

    pub fn pending_start(&self) -> Option<CellAddress> {
        match &self.drag {
            DragState::Drawing { start, .. } => Some(*start),
            DragState::Idle => None,
        }
    }

    pub fn load_records(&mut self, records: &[PathSegmentRecord]) {
        self.paths = segments_from_records(records, self.grid.as_ref());
        log::debug!("Loaded {} path segments", self.paths.len());
    }

    pub fn clear_paths(&mut self) {
        self.paths.clear();
    }

    pub fn records(&self) -> Vec<PathSegmentRecord> {
        self.paths.iter().map(|segment| segment.to_record()).collect()
    }

    pub fn handle_input(&mut self, input: PointerInput) -> Transition {
        if let PointerInput::SelectTool(tool) = input {
            self.tool = tool;
            self.drag = DragState::Idle;
            return Transition::Redraw;
        }
        let Some(grid) = self.grid else {
            return Transition::Idle;
        };
        match self.tool {
            PathTool::Pencil => self.pencil_input(&grid, input),
            PathTool::Eraser => self.eraser_input(&grid, input),
            PathTool::None => Transition::Idle,
        }
    }

    fn pencil_input(&mut self, grid: &Grid, input: PointerInput) -> Transition {
        match input {
            PointerInput::Down { x, y, primary } => {
                if !primary {
                    return Transition::Idle;
                }
                let Some(cell) = pixel_to_cell(x, y, grid) else {
                    return Transition::Idle;
                };
                self.drag = DragState::Drawing {
                    start: cell,
                    hovered: Some(cell),
                    preview: None,
                };
                Transition::Idle
            }
            PointerInput::Move { x, y, .. } => {
                let DragState::Drawing {
                    start,
                    hovered,
                    preview,
                } = &mut self.drag
                else {
                    return Transition::Idle;
                };
                let cell = pixel_to_cell(x, y, grid);
                if cell == *hovered {
                    return Transition::Idle;
                }
                *hovered = cell;
                let next = cell.and_then(|end| PathSegment::new(*start, end));
                if next == *preview {
                    return Transition::Idle;
                }
                *preview = next;
                Transition::Redraw
            }
            PointerInput::Up { x, y, primary } => {
                if !primary {
                    return Transition::Idle;
                }
                let DragState::Drawing { start, .. } =
                    std::mem::replace(&mut self.drag, DragState::Idle)
                else {
                    return Transition::Idle;
                };
                let segment = pixel_to_cell(x, y, grid).and_then(|end| PathSegment::new(start, end));
                match segment {
                    Some(segment) => {
                        log::debug!("Path segment added {segment:?}");
                        self.paths.push(segment);
                        Transition::Persist
                    }
                    None => {
                        log::debug!("Drag ended on its start cell or outside the grid");
                        Transition::Redraw
                    }
                }
            }
            PointerInput::Leave => match &mut self.drag {
                DragState::Drawing {
                    hovered, preview, ..
                } => {
                    *hovered = None;
                    if preview.take().is_some() {
                        Transition::Redraw
                    } else {
                        Transition::Idle
                    }
                }
                DragState::Idle => Transition::Idle,
            },
            PointerInput::SelectTool(_) => Transition::Idle,
        }
    }

    fn eraser_input(&mut self, grid: &Grid, input: PointerInput) -> Transition {
        let (x, y) = match input {
            PointerInput::Down { x, y, primary: true } => {
                if pixel_to_cell(x, y, grid).is_none() {
                    return Transition::Idle;
                }
                (x, y)
            }
            PointerInput::Move {
                x,
                y,
                primary_held: true,
            } => (x, y),
            _ => return Transition::Idle,
        };
        if self.erase_near(grid, x, y) > 0 {
            Transition::Persist
        } else {
            Transition::Idle
        }
    }

    /// Removes every segment whose drawn line the eraser circle touches.
    /// Linear scan over all segments.
    fn erase_near(&mut self, grid: &Grid, x: f64, y: f64) -> usize {
        let threshold = ERASER_RADIUS + PATH_LINE_WIDTH / 2.0;
        let before = self.paths.len();
        self.paths.retain(|segment| {
            let from = cell_center(segment.start, grid);
            let to = cell_center(segment.end, grid);
            distance_to_segment(x, y, from.x, from.y, to.x, to.y) >= threshold
        });
        let removed = before - self.paths.len();
        if removed > 0 {
            log::debug!("Eraser removed {removed} path segment(s)");
        }
        removed
    }
}
