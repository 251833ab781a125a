use crate::board::{BoardCreateRequest, Waystone};
use crate::error::CreatorError;
use crate::grid::{compute_grid, pixel_to_cell, valid_dimension, CellAddress, Grid};
use crate::palette::{Brush, WaystoneColor};
use crate::validate::{validate, Validation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridPhase {
    Unconfirmed,
    Confirmed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    Placed(Waystone),
    Recolored {
        cell: CellAddress,
        from: WaystoneColor,
        to: WaystoneColor,
    },
    Removed(Waystone),
    Unchanged,
    Missed,
}

impl ClickOutcome {
    pub fn mutated(&self) -> bool {
        matches!(
            self,
            ClickOutcome::Placed(_) | ClickOutcome::Recolored { .. } | ClickOutcome::Removed(_)
        )
    }
}

pub struct CreatorSession {
    palette: Vec<WaystoneColor>,
    phase: GridPhase,
    map_id: Option<u64>,
    image: Option<ImageSize>,
    rows: Option<u32>,
    cols: Option<u32>,
    grid: Option<Grid>,
    waystones: Vec<Waystone>,
    brush: Option<Brush>,
    board_name: String,
}

impl CreatorSession {
    pub fn new(palette: Vec<WaystoneColor>) -> Self {
        Self {
            palette,
            phase: GridPhase::Unconfirmed,
            map_id: None,
            image: None,
            rows: None,
            cols: None,
            grid: None,
            waystones: Vec::new(),
            brush: None,
            board_name: String::new(),
        }
    }

    pub fn phase(&self) -> GridPhase {
        self.phase
    }

    pub fn is_confirmed(&self) -> bool {
        self.phase == GridPhase::Confirmed
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn waystones(&self) -> &[Waystone] {
        &self.waystones
    }

    pub fn palette(&self) -> &[WaystoneColor] {
        &self.palette
    }

    pub fn brush(&self) -> Option<Brush> {
        self.brush
    }

    pub fn map_id(&self) -> Option<u64> {
        self.map_id
    }

    pub fn image(&self) -> Option<ImageSize> {
        self.image
    }

    pub fn board_name(&self) -> &str {
        &self.board_name
    }

    pub fn set_board_name(&mut self, name: impl Into<String>) {
        self.board_name = name.into();
    }

    /// Changes the selected map. The new image has to report its rendered
    /// size through `set_image_size` before a grid exists again.
    pub fn select_map(&mut self, map_id: Option<u64>) -> Result<(), CreatorError> {
        if self.is_confirmed() {
            return Err(CreatorError::GridLocked);
        }
        if map_id.is_none() {
            self.brush = None;
        }
        self.map_id = map_id;
        self.image = None;
        self.grid = None;
        Ok(())
    }

    pub fn set_image_size(&mut self, width: f64, height: f64) {
        self.image = Some(ImageSize { width, height });
        self.refresh_grid();
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.grid = None;
    }

    pub fn set_dimensions(
        &mut self,
        rows: Option<u32>,
        cols: Option<u32>,
    ) -> Result<(), CreatorError> {
        if self.is_confirmed() {
            return Err(CreatorError::GridLocked);
        }
        self.rows = rows;
        self.cols = cols;
        self.refresh_grid();
        if self.dimensions().is_none() {
            return Err(CreatorError::InvalidDimensions);
        }
        Ok(())
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.rows, self.cols) {
            (Some(rows), Some(cols)) if valid_dimension(rows) && valid_dimension(cols) => {
                Some((rows, cols))
            }
            _ => None,
        }
    }

    /// Recomputes cell geometry from the current image size. While
    /// confirmed the row/column count is kept and only cell sizes change.
    fn refresh_grid(&mut self) {
        let Some(image) = self.image else {
            self.grid = None;
            return;
        };
        match self.phase {
            GridPhase::Unconfirmed => {
                self.grid = self.dimensions().and_then(|(rows, cols)| {
                    match compute_grid(image.width, image.height, rows, cols) {
                        Ok(grid) => Some(grid),
                        Err(error) => {
                            log::debug!("Grid preview unavailable: {error}");
                            None
                        }
                    }
                });
            }
            GridPhase::Confirmed => {
                let Some(current) = self.grid else {
                    return;
                };
                match compute_grid(image.width, image.height, current.rows, current.cols) {
                    Ok(grid) => self.grid = Some(grid),
                    Err(error) => log::warn!("Keeping previous grid geometry: {error}"),
                }
            }
        }
    }

    /// Locks the layout. Waystones from an earlier confirmation are dropped.
    pub fn confirm(&mut self) -> Result<(), CreatorError> {
        if self.is_confirmed() {
            return Err(CreatorError::GridLocked);
        }
        if self.map_id.is_none() {
            return Err(CreatorError::NoMapSelected);
        }
        if self.dimensions().is_none() {
            return Err(CreatorError::InvalidDimensions);
        }
        if self.grid.is_none() {
            return Err(CreatorError::ImageNotReady);
        }
        self.phase = GridPhase::Confirmed;
        self.waystones.clear();
        log::info!("Grid confirmed: {:?}", self.grid);
        Ok(())
    }

    /// Back to layout mode. Waystones are kept until the next confirm.
    pub fn reset(&mut self) {
        self.phase = GridPhase::Unconfirmed;
        self.brush = None;
        self.refresh_grid();
    }

    pub fn select_brush(&mut self, brush: Brush) {
        self.brush = Some(brush);
    }

    pub fn click(&mut self, x: f64, y: f64) -> Result<ClickOutcome, CreatorError> {
        let brush = self.brush.ok_or(CreatorError::NoToolSelected)?;
        if !self.is_confirmed() {
            return Err(CreatorError::GridNotConfirmed);
        }
        let grid = self.grid.ok_or(CreatorError::GridNotConfirmed)?;
        let Some(cell) = pixel_to_cell(x, y, &grid) else {
            return Ok(ClickOutcome::Missed);
        };
        Ok(self.apply_brush(cell, brush))
    }

    fn apply_brush(&mut self, cell: CellAddress, brush: Brush) -> ClickOutcome {
        let existing = self.waystones.iter().position(|ws| ws.cell() == cell);
        match (brush, existing) {
            (Brush::Eraser, Some(index)) => ClickOutcome::Removed(self.waystones.remove(index)),
            (Brush::Eraser, None) => ClickOutcome::Unchanged,
            (Brush::Color(color), Some(index)) => {
                let current = self.waystones[index].color;
                if current == color {
                    ClickOutcome::Removed(self.waystones.remove(index))
                } else {
                    self.waystones[index].color = color;
                    ClickOutcome::Recolored {
                        cell,
                        from: current,
                        to: color,
                    }
                }
            }
            (Brush::Color(color), None) => {
                let waystone = Waystone {
                    row: cell.row,
                    col: cell.col,
                    color,
                };
                self.waystones.push(waystone);
                ClickOutcome::Placed(waystone)
            }
        }
    }

    pub fn validation(&self) -> Validation {
        validate(
            &self.waystones,
            &self.palette,
            &self.board_name,
            self.is_confirmed(),
        )
    }

    pub fn submission(&self) -> Result<BoardCreateRequest, Validation> {
        let validation = self.validation();
        if !validation.valid {
            return Err(validation);
        }
        match (self.map_id, self.grid) {
            (Some(map_reference), Some(grid)) => Ok(BoardCreateRequest {
                name: self.board_name.trim().to_string(),
                map_reference,
                grid_rows: grid.rows,
                grid_cols: grid.cols,
                waystones_input: self.waystones.clone(),
            }),
            _ => Err(Validation {
                valid: false,
                messages: vec![CreatorError::NoMapSelected.to_string()],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::DEFAULT_PALETTE;

    fn confirmed_session() -> CreatorSession {
        let mut session = CreatorSession::new(DEFAULT_PALETTE.to_vec());
        session.select_map(Some(4)).unwrap();
        session.set_image_size(500.0, 500.0);
        session.set_dimensions(Some(5), Some(5)).unwrap();
        session.confirm().unwrap();
        session
    }

    #[test]
    fn grid_follows_dimensions_before_confirm() {
        let mut session = CreatorSession::new(DEFAULT_PALETTE.to_vec());
        session.select_map(Some(1)).unwrap();
        assert!(session.grid().is_none());
        session.set_image_size(400.0, 200.0);
        session.set_dimensions(Some(2), Some(4)).unwrap();
        assert_eq!(session.grid().unwrap().cell_width, 100.0);
        assert_eq!(
            session.set_dimensions(Some(0), Some(4)),
            Err(CreatorError::InvalidDimensions)
        );
        assert!(session.grid().is_none());
    }

    #[test]
    fn confirm_requires_map_and_dimensions() {
        let mut session = CreatorSession::new(DEFAULT_PALETTE.to_vec());
        assert_eq!(session.confirm(), Err(CreatorError::NoMapSelected));
        session.select_map(Some(1)).unwrap();
        session.set_image_size(100.0, 100.0);
        let _ = session.set_dimensions(Some(60), Some(2));
        assert_eq!(session.confirm(), Err(CreatorError::InvalidDimensions));
        session.set_dimensions(Some(2), Some(2)).unwrap();
        assert_eq!(session.confirm(), Ok(()));
        assert_eq!(session.phase(), GridPhase::Confirmed);
    }

    #[test]
    fn click_without_brush_is_rejected_without_mutation() {
        let mut session = confirmed_session();
        assert_eq!(
            session.click(250.0, 250.0),
            Err(CreatorError::NoToolSelected)
        );
        assert!(session.waystones().is_empty());
    }

    #[test]
    fn same_color_twice_toggles_back_to_empty() {
        let mut session = confirmed_session();
        session.select_brush(Brush::Color(WaystoneColor::Red));
        assert!(matches!(
            session.click(250.0, 250.0),
            Ok(ClickOutcome::Placed(_))
        ));
        assert!(matches!(
            session.click(260.0, 240.0),
            Ok(ClickOutcome::Removed(_))
        ));
        assert!(session.waystones().is_empty());
    }

    #[test]
    fn other_color_recolors_and_eraser_removes() {
        let mut session = confirmed_session();
        session.select_brush(Brush::Color(WaystoneColor::Red));
        session.click(50.0, 50.0).unwrap();
        session.select_brush(Brush::Color(WaystoneColor::Blue));
        assert_eq!(
            session.click(50.0, 50.0),
            Ok(ClickOutcome::Recolored {
                cell: CellAddress::new(0, 0),
                from: WaystoneColor::Red,
                to: WaystoneColor::Blue,
            })
        );
        assert_eq!(session.waystones()[0].color, WaystoneColor::Blue);
        session.select_brush(Brush::Eraser);
        assert!(matches!(
            session.click(50.0, 50.0),
            Ok(ClickOutcome::Removed(_))
        ));
        assert_eq!(session.click(50.0, 50.0), Ok(ClickOutcome::Unchanged));
        assert_eq!(session.click(900.0, 50.0), Ok(ClickOutcome::Missed));
    }

    #[test]
    fn reset_keeps_waystones_and_fresh_confirm_clears_them() {
        let mut session = confirmed_session();
        session.select_brush(Brush::Color(WaystoneColor::Green));
        session.click(50.0, 50.0).unwrap();
        session.reset();
        assert_eq!(session.phase(), GridPhase::Unconfirmed);
        assert_eq!(session.brush(), None);
        assert_eq!(session.waystones().len(), 1);
        session.confirm().unwrap();
        assert!(session.waystones().is_empty());
    }

    #[test]
    fn layout_is_locked_while_confirmed() {
        let mut session = confirmed_session();
        assert_eq!(
            session.set_dimensions(Some(3), Some(3)),
            Err(CreatorError::GridLocked)
        );
        assert_eq!(session.select_map(None), Err(CreatorError::GridLocked));
        session.set_image_size(1000.0, 250.0);
        let grid = session.grid().unwrap();
        assert_eq!((grid.rows, grid.cols), (5, 5));
        assert_eq!((grid.cell_width, grid.cell_height), (200.0, 50.0));
    }

    #[test]
    fn clearing_the_map_drops_grid_and_brush() {
        let mut session = CreatorSession::new(DEFAULT_PALETTE.to_vec());
        session.select_map(Some(2)).unwrap();
        session.set_image_size(300.0, 300.0);
        session.set_dimensions(Some(3), Some(3)).unwrap();
        session.select_brush(Brush::Eraser);
        assert!(session.grid().is_some());

        session.select_map(None).unwrap();
        assert_eq!(session.phase(), GridPhase::Unconfirmed);
        assert_eq!(session.map_id(), None);
        assert!(session.grid().is_none());
        assert_eq!(session.brush(), None);
        assert_eq!(session.confirm(), Err(CreatorError::NoMapSelected));
    }

    #[test]
    fn failed_image_load_blocks_confirm_until_reloaded() {
        let mut session = CreatorSession::new(DEFAULT_PALETTE.to_vec());
        session.select_map(Some(2)).unwrap();
        session.set_image_size(300.0, 300.0);
        session.set_dimensions(Some(3), Some(3)).unwrap();

        session.clear_image();
        assert!(session.image().is_none());
        assert!(session.grid().is_none());
        assert_eq!(session.confirm(), Err(CreatorError::ImageNotReady));

        session.set_image_size(300.0, 150.0);
        assert_eq!(session.grid().unwrap().cell_height, 50.0);
        assert_eq!(session.confirm(), Ok(()));
    }

    #[test]
    fn only_board_changes_count_as_mutations() {
        let mut session = confirmed_session();
        session.select_brush(Brush::Color(WaystoneColor::Red));
        assert!(session.click(50.0, 50.0).unwrap().mutated());
        assert!(!session.click(900.0, 50.0).unwrap().mutated());
        session.select_brush(Brush::Eraser);
        assert!(session.click(50.0, 50.0).unwrap().mutated());
        assert!(!session.click(50.0, 50.0).unwrap().mutated());
    }

    #[test]
    fn submission_is_gated_on_validation() {
        let mut session = confirmed_session();
        session.set_board_name("  Crossing  ");
        session.select_brush(Brush::Color(WaystoneColor::Red));
        session.click(50.0, 50.0).unwrap();
        assert!(session.submission().is_err());
        session.click(450.0, 450.0).unwrap();
        let request = session.submission().unwrap();
        assert_eq!(request.name, "Crossing");
        assert_eq!(request.map_reference, 4);
        assert_eq!((request.grid_rows, request.grid_cols), (5, 5));
        assert_eq!(request.waystones_input.len(), 2);
    }
}
