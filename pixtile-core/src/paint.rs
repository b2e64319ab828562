// Drawing tools for the pixel grid.
//
// Tools mutate a working copy of the grid for the duration of one gesture
// (pointer-down through pointer-up). The finished copy is what gets committed
// to history.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::grid::{Cell, Grid};

pub const MIN_BRUSH_SIZE: usize = 1;
pub const MAX_BRUSH_SIZE: usize = 4;
pub const DEFAULT_COLOR: &str = "#000000";

pub trait Tool {
    /// Apply the tool at one sampled cell. Returns the number of cells written.
    fn apply(&self, grid: &mut Grid, row: i64, col: i64) -> usize;

    fn name(&self) -> &str;

    fn cursor_size(&self) -> usize {
        1
    }

    /// Whether the tool keeps applying on pointer movement during a gesture.
    fn continuous(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Fill,
}

impl ToolKind {
    pub fn build(self, color: &str, brush_size: usize) -> Box<dyn Tool + Send> {
        match self {
            ToolKind::Pen => Box::new(Pen::new(brush_size, color)),
            ToolKind::Eraser => Box::new(Eraser::new(brush_size)),
            ToolKind::Fill => Box::new(Fill::new(color)),
        }
    }
}

/// Current tool, colour and brush size as chosen in the toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSettings {
    #[serde(default)]
    pub tool: ToolKind,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_brush_size")]
    pub brush_size: usize,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_brush_size() -> usize {
    MIN_BRUSH_SIZE
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: default_color(),
            brush_size: MIN_BRUSH_SIZE,
        }
    }
}

impl ToolSettings {
    pub fn clamped(mut self) -> Self {
        self.brush_size = clamp_brush_size(self.brush_size);
        self
    }

    pub fn build_tool(&self) -> Box<dyn Tool + Send> {
        self.tool.build(&self.color, self.brush_size)
    }
}

pub fn clamp_brush_size(size: usize) -> usize {
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

/// Offset from the target cell to the footprint's top-left corner.
/// Even sizes lean towards the lower-right.
pub fn footprint_origin(brush_size: usize) -> i64 {
    ((clamp_brush_size(brush_size) - 1) / 2) as i64
}

/// Stamp a square footprint of `brush_size` centred on (row, col).
/// Cells falling off the grid are skipped.
pub fn stamp(grid: &mut Grid, row: i64, col: i64, brush_size: usize, value: &Cell) -> usize {
    let size = clamp_brush_size(brush_size) as i64;
    let offset = footprint_origin(brush_size);
    let mut written = 0;
    for dr in 0..size {
        for dc in 0..size {
            if grid.set_clipped(row - offset + dr, col - offset + dc, value) {
                written += 1;
            }
        }
    }
    trace!(
        "Stamped {} cells at ({}, {}) with size {}",
        written,
        row,
        col,
        size
    );
    written
}

#[derive(Debug, Clone)]
pub struct Pen {
    pub size: usize,
    pub color: Cell,
}

impl Pen {
    pub fn new(size: usize, color: &str) -> Self {
        Self {
            size: clamp_brush_size(size),
            color: Cell::color(color),
        }
    }
}

impl Tool for Pen {
    fn apply(&self, grid: &mut Grid, row: i64, col: i64) -> usize {
        stamp(grid, row, col, self.size, &self.color)
    }

    fn name(&self) -> &str {
        "Pen"
    }

    fn cursor_size(&self) -> usize {
        self.size
    }
}

#[derive(Debug, Clone)]
pub struct Eraser {
    pub size: usize,
}

impl Eraser {
    pub fn new(size: usize) -> Self {
        Self {
            size: clamp_brush_size(size),
        }
    }
}

impl Tool for Eraser {
    fn apply(&self, grid: &mut Grid, row: i64, col: i64) -> usize {
        stamp(grid, row, col, self.size, &Cell::Empty)
    }

    fn name(&self) -> &str {
        "Eraser"
    }

    fn cursor_size(&self) -> usize {
        self.size
    }
}

#[derive(Debug, Clone)]
pub struct Fill {
    pub color: Cell,
}

impl Fill {
    pub fn new(color: &str) -> Self {
        Self {
            color: Cell::color(color),
        }
    }
}

impl Tool for Fill {
    fn apply(&self, grid: &mut Grid, row: i64, col: i64) -> usize {
        if !grid.contains_signed(row, col) {
            debug!("Fill attempted at out-of-bounds position ({}, {})", row, col);
            return 0;
        }
        flood_fill(grid, row as usize, col as usize, &self.color)
    }

    fn name(&self) -> &str {
        "Fill"
    }

    fn continuous(&self) -> bool {
        false
    }
}

/// Repaint every cell 4-connected to (row, col) that shares its value.
/// Returns the number of cells repainted.
pub fn flood_fill(grid: &mut Grid, row: usize, col: usize, replacement: &Cell) -> usize {
    // Get the target value (what we're replacing)
    let target = match grid.get(row, col) {
        Ok(cell) => cell.clone(),
        Err(_) => return 0,
    };

    // If target is already the fill colour, nothing to do
    if &target == replacement {
        debug!("Target already matches fill colour, skipping fill");
        return 0;
    }

    let size = grid.size();
    let mut filled = 0;
    let mut stack = vec![(row, col)];
    while let Some((r, c)) = stack.pop() {
        // Repainted cells no longer match the target, so they act as the visited set.
        if grid.cells()[r * size + c] != target {
            continue;
        }
        grid.set_clipped(r as i64, c as i64, replacement);
        filled += 1;

        if r > 0 {
            stack.push((r - 1, c));
        }
        if r + 1 < size {
            stack.push((r + 1, c));
        }
        if c > 0 {
            stack.push((r, c - 1));
        }
        if c + 1 < size {
            stack.push((r, c + 1));
        }
    }

    debug!("Flood fill repainted {} cells", filled);
    filled
}

/// One continuous pointer interaction on a working copy of the grid.
pub struct Gesture {
    tool: Box<dyn Tool + Send>,
    settings: ToolSettings,
    original: Grid,
    working: Grid,
    samples: usize,
}

impl Gesture {
    pub fn begin(grid: &Grid, settings: &ToolSettings) -> Self {
        let tool = settings.build_tool();
        trace!("Beginning {} gesture", tool.name());
        Self {
            tool,
            settings: settings.clone().clamped(),
            original: grid.clone(),
            working: grid.clone(),
            samples: 0,
        }
    }

    /// Apply the tool at one sampled pointer position.
    /// Non-continuous tools (fill) only act on the first sample.
    pub fn apply(&mut self, row: i64, col: i64) -> &Grid {
        if self.samples > 0 && !self.tool.continuous() {
            trace!("Ignoring {} sample at ({}, {})", self.tool.name(), row, col);
        } else {
            self.tool.apply(&mut self.working, row, col);
        }
        self.samples += 1;
        &self.working
    }

    /// Swap in a tool built from `settings` for the remaining samples. The
    /// working copy is kept, so earlier samples stay painted. Fill still only
    /// acts on the gesture's first sample.
    pub fn set_tool(&mut self, settings: &ToolSettings) {
        let settings = settings.clone().clamped();
        if settings == self.settings {
            return;
        }
        self.tool = settings.build_tool();
        trace!(
            "Gesture switched to {} ({}, size {})",
            self.tool.name(),
            settings.color,
            settings.brush_size
        );
        self.settings = settings;
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn working(&self) -> &Grid {
        &self.working
    }

    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Finalize the gesture. Returns `None` when nothing changed, so no history
    /// entry is produced.
    pub fn finish(self) -> Option<Grid> {
        if self.working == self.original {
            debug!(
                "{} gesture left the grid unchanged after {} samples",
                self.tool.name(),
                self.samples
            );
            return None;
        }
        Some(self.working)
    }
}
