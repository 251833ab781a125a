pub mod board;
pub mod creator;
pub mod error;
pub mod grid;
pub mod palette;
pub mod paths;
pub mod roulette;
pub mod scene;
pub mod validate;

pub use board::{
    format_field_errors, BoardCreateRequest, BoardRecord, MapDetails, PathSegment,
    PathSegmentRecord, Waystone,
};
pub use creator::{ClickOutcome, CreatorSession, GridPhase};
pub use error::{CreatorError, GridError};
pub use grid::{
    cell_center, compute_grid, distance_to_segment, pixel_to_cell, CellAddress, Grid, Point,
    MAX_GRID_DIMENSION,
};
pub use palette::{Brush, WaystoneColor, DEFAULT_PALETTE};
pub use paths::{PathEditor, PathTool, PointerInput, Transition, ERASER_RADIUS, PATH_LINE_WIDTH};
pub use scene::{creator_scene, player_scene, DrawCommand, LineStyle};
pub use validate::{validate, Validation};
