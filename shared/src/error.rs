use thiserror::Error;

use crate::grid::MAX_GRID_DIMENSION;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("grid must have between 1 and {max} rows and columns, got {rows}x{cols}", max = MAX_GRID_DIMENSION)]
    InvalidDimensions { rows: u32, cols: u32 },
    #[error("image has no rendered size yet ({width}x{height})")]
    ImageNotRendered { width: f64, height: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreatorError {
    #[error("Select a map first.")]
    NoMapSelected,
    #[error("Enter valid grid dimensions (1-{max}) before confirming.", max = MAX_GRID_DIMENSION)]
    InvalidDimensions,
    #[error("The map image is not displayed yet.")]
    ImageNotReady,
    #[error("The grid has not been confirmed.")]
    GridNotConfirmed,
    #[error("The grid is confirmed; reset it to change the layout.")]
    GridLocked,
    #[error("Select a color or the eraser from the palette.")]
    NoToolSelected,
}

impl From<GridError> for CreatorError {
    fn from(error: GridError) -> Self {
        match error {
            GridError::InvalidDimensions { .. } => CreatorError::InvalidDimensions,
            GridError::ImageNotRendered { .. } => CreatorError::ImageNotReady,
        }
    }
}
