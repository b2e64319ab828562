//! Raster compositing for preview and export.
//!
//! Every cell becomes a solid `scale x scale` block (nearest neighbour, no
//! smoothing). Pattern rasters repeat the tile edge to edge so seams can be
//! checked at a glance.
//!
//! Rasters are indexed: each pixel stores an index into a small table of the
//! distinct cell values, which keeps a 20x pattern export of a 64x64 grid to a
//! few megabytes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::grid::{Cell, Grid};

/// Repeats per axis used by the "pattern" export.
pub const PATTERN_EXPORT_REPEATS: u32 = 2;
/// Repeats per axis used by the live tiling preview.
pub const PREVIEW_REPEATS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Tile,
    Pattern,
}

impl ExportKind {
    pub const ALL: [ExportKind; 2] = [ExportKind::Tile, ExportKind::Pattern];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Tile => "tile",
            ExportKind::Pattern => "pattern",
        }
    }

    pub fn default_repeats(&self) -> u32 {
        match self {
            ExportKind::Tile => 1,
            ExportKind::Pattern => PATTERN_EXPORT_REPEATS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    palette: Vec<Cell>,
    pixels: Vec<u16>,
}

impl Raster {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at column `x`, row `y`; `None` outside the raster.
    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let slot = self.pixels[y * self.width + x];
        self.palette.get(slot as usize)
    }

    /// Distinct cell values referenced by [`Raster::indices`]; slot 0 is empty.
    pub fn palette(&self) -> &[Cell] {
        &self.palette
    }

    /// Row-major palette slot per pixel.
    pub fn indices(&self) -> &[u16] {
        &self.pixels
    }

    /// Row-major iterator over every pixel.
    pub fn pixels(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.pixels.iter().map(|&slot| &self.palette[slot as usize])
    }

    /// Copy of a rectangular window. The window is clipped to the raster.
    pub fn region(&self, x: usize, y: usize, width: usize, height: usize) -> Raster {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);

        let mut pixels = Vec::with_capacity(width * height);
        for row in y..y + height {
            let start = row * self.width + x;
            pixels.extend_from_slice(&self.pixels[start..start + width]);
        }
        Raster {
            width,
            height,
            palette: self.palette.clone(),
            pixels,
        }
    }
}

/// A raster produced for one `(kind, scale)` export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRaster {
    pub kind: ExportKind,
    pub scale: u32,
    pub raster: Raster,
}

/// Zero scale renders as 1x. There is no upper bound here; callers that
/// take user input cap it themselves.
pub fn clamp_scale(scale: u32) -> u32 {
    scale.max(1)
}

/// Zero repeats render as one copy.
pub fn clamp_repeats(repeats: u32) -> u32 {
    repeats.max(1)
}

/// Render the grid once at `scale`: (N*scale) x (N*scale).
pub fn render_tile(grid: &Grid, scale: u32) -> Raster {
    render_pattern(grid, scale, 1, 1)
}

/// Render the tile `repeats_x` by `repeats_y` times with no gaps.
pub fn render_pattern(grid: &Grid, scale: u32, repeats_x: u32, repeats_y: u32) -> Raster {
    let scale = clamp_scale(scale) as usize;
    let repeats_x = clamp_repeats(repeats_x) as usize;
    let repeats_y = clamp_repeats(repeats_y) as usize;
    let n = grid.size();
    let tile_side = n * scale;

    let (palette, slots) = index_cells(grid);

    // One tile-wide scanline per grid row, then widened by the x repeats.
    let mut scanlines = Vec::with_capacity(n);
    for row in 0..n {
        let mut line = Vec::with_capacity(tile_side * repeats_x);
        for col in 0..n {
            let slot = slots[row * n + col];
            line.extend(std::iter::repeat(slot).take(scale));
        }
        let once = line.clone();
        for _ in 1..repeats_x {
            line.extend_from_slice(&once);
        }
        scanlines.push(line);
    }

    let width = tile_side * repeats_x;
    let height = tile_side * repeats_y;
    let mut pixels = Vec::with_capacity(width * height);
    for _ in 0..repeats_y {
        for line in &scanlines {
            for _ in 0..scale {
                pixels.extend_from_slice(line);
            }
        }
    }

    debug!(
        "Rendered {}x{} raster (scale {}, repeats {}x{})",
        width,
        height,
        scale,
        repeats_x,
        repeats_y
    );

    Raster {
        width,
        height,
        palette,
        pixels,
    }
}

/// Render for the export dialog. `repeats` overrides the kind's default
/// repeat count for patterns and is ignored for tiles.
pub fn export_raster(grid: &Grid, kind: ExportKind, scale: u32, repeats: Option<u32>) -> Raster {
    match kind {
        ExportKind::Tile => render_tile(grid, scale),
        ExportKind::Pattern => {
            let repeats = repeats.unwrap_or_else(|| kind.default_repeats());
            render_pattern(grid, scale, repeats, repeats)
        }
    }
}

/// One raster per `(kind, scale)` pair, in request order.
pub fn render_batch(grid: &Grid, requests: &[(ExportKind, u32)]) -> Vec<RenderedRaster> {
    info!("Rendering {} export rasters", requests.len());
    requests
        .iter()
        .map(|&(kind, scale)| RenderedRaster {
            kind,
            scale: clamp_scale(scale),
            raster: export_raster(grid, kind, scale, None),
        })
        .collect()
}

// Build the distinct-value table (empty always at slot 0) and per-cell slots.
fn index_cells(grid: &Grid) -> (Vec<Cell>, Vec<u16>) {
    let mut palette = vec![Cell::Empty];
    let mut slots = Vec::with_capacity(grid.len());
    for cell in grid.cells() {
        let slot = match palette.iter().position(|known| known == cell) {
            Some(slot) => slot,
            None => {
                palette.push(cell.clone());
                palette.len() - 1
            }
        };
        slots.push(slot as u16);
    }
    (palette, slots)
}
