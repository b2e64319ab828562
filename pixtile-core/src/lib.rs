//! pixtile-core: the pixel-grid editing engine behind PIXTILE.
//!
//! Design rules:
//! - The grid is always `size * size` cells; resizing starts from blank.
//! - Tools work on a per-gesture copy; history sees one entry per gesture.
//! - Malformed tool parameters are clamped, never rejected.
//! - Compositing is nearest neighbour only.

pub mod compositor;
pub mod editor;
pub mod error;
pub mod grid;
pub mod history;
pub mod paint;

pub use compositor::{
    export_raster, render_batch, render_pattern, render_tile, ExportKind, Raster, RenderedRaster,
};
pub use editor::{ChangeReason, Editor, SubscriptionId};
pub use error::GridError;
pub use grid::{Cell, Grid, DEFAULT_GRID_SIZE, EMPTY_TOKEN, MAX_GRID_SIZE, MIN_GRID_SIZE};
pub use history::History;
pub use paint::{flood_fill, stamp, Eraser, Fill, Gesture, Pen, Tool, ToolKind, ToolSettings};
