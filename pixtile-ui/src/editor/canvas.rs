// Display adapters between the editing core and egui.
// Turns composited rasters into textures and pointer positions into cells.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use egui::{Color32, ColorImage, Pos2, Rect};
use pixtile_core::compositor::{Raster, PREVIEW_REPEATS};
use pixtile_core::{Cell, Editor, Grid, SubscriptionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Checkerboard shown behind transparent cells on the editing canvas.
pub const BACKDROP_DARK: Color32 = Color32::from_rgb(0x27, 0x27, 0x2a);
pub const BACKDROP_LIGHT: Color32 = Color32::from_rgb(0x3f, 0x3f, 0x46);

/// How the live preview shows the tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    /// The tile on its own.
    Single,
    /// The tile repeated to check seams.
    #[default]
    Grid,
}

impl PreviewMode {
    pub fn repeats(&self) -> u32 {
        match self {
            PreviewMode::Single => 1,
            PreviewMode::Grid => PREVIEW_REPEATS,
        }
    }
}

/// Decode a cell for display. Empty and undecodable tokens are transparent.
pub fn decode_token(cell: &Cell) -> Color32 {
    match cell {
        Cell::Empty => Color32::TRANSPARENT,
        Cell::Color(token) => match Color32::from_hex(token) {
            Ok(color) => color,
            Err(err) => {
                warn!("Cannot display colour token {:?}: {:?}", token, err);
                Color32::TRANSPARENT
            }
        },
    }
}

/// Unmultiplied RGBA bytes, row-major.
pub fn raster_to_rgba(raster: &Raster) -> Vec<u8> {
    // Decode each distinct value once, then expand per pixel.
    let decoded: Vec<[u8; 4]> = raster
        .palette()
        .iter()
        .map(|cell| decode_token(cell).to_srgba_unmultiplied())
        .collect();

    let mut rgba = Vec::with_capacity(raster.indices().len() * 4);
    for &slot in raster.indices() {
        rgba.extend_from_slice(&decoded[slot as usize]);
    }
    rgba
}

pub fn raster_to_color_image(raster: &Raster) -> ColorImage {
    let rgba = raster_to_rgba(raster);
    trace!(
        "Converted {}x{} raster to colour image",
        raster.width(),
        raster.height()
    );
    ColorImage::from_rgba_unmultiplied([raster.width(), raster.height()], &rgba)
}

pub fn backdrop_color(row: usize, col: usize) -> Color32 {
    if (row + col) % 2 == 0 {
        BACKDROP_DARK
    } else {
        BACKDROP_LIGHT
    }
}

/// Editing canvas at one pixel per cell: painted cells over the checkerboard.
pub fn editor_canvas_image(grid: &Grid) -> ColorImage {
    let n = grid.size();
    let mut rgba = Vec::with_capacity(n * n * 4);
    for row in 0..n {
        for col in 0..n {
            let color = match &grid.cells()[row * n + col] {
                Cell::Empty => backdrop_color(row, col),
                cell => decode_token(cell),
            };
            rgba.extend_from_slice(&color.to_srgba_unmultiplied());
        }
    }
    ColorImage::from_rgba_unmultiplied([n, n], &rgba)
}

/// Map a pointer position on the drawn canvas to a (row, col) cell.
/// Positions off the canvas map to out-of-range cells, which the tools clip.
pub fn pointer_to_cell(canvas: Rect, grid_size: usize, pos: Pos2) -> (i64, i64) {
    let cell_w = canvas.width() / grid_size as f32;
    let cell_h = canvas.height() / grid_size as f32;
    let col = ((pos.x - canvas.left()) / cell_w).floor() as i64;
    let row = ((pos.y - canvas.top()) / cell_h).floor() as i64;
    (row, col)
}

/// Live preview texture source. Re-renders only after the editor reports a
/// change.
pub struct PreviewState {
    pub mode: PreviewMode,
    pub scale: u32,
    dirty: Arc<AtomicBool>,
    subscription: Option<SubscriptionId>,
}

impl PreviewState {
    pub fn new(mode: PreviewMode, scale: u32) -> Self {
        Self {
            mode,
            scale,
            dirty: Arc::new(AtomicBool::new(true)),
            subscription: None,
        }
    }

    /// Start listening to `editor`'s change notifications.
    pub fn attach(&mut self, editor: &mut Editor) {
        let dirty = Arc::clone(&self.dirty);
        let id = editor.subscribe(move |_, reason| {
            trace!("Preview invalidated by {:?}", reason);
            dirty.store(true, Ordering::Release);
        });
        self.subscription = Some(id);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn detach(&mut self, editor: &mut Editor) {
        if let Some(id) = self.subscription.take() {
            editor.unsubscribe(id);
        }
    }

    pub fn set_mode(&mut self, mode: PreviewMode) {
        if mode != self.mode {
            self.mode = mode;
            self.dirty.store(true, Ordering::Release);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// A fresh preview image if anything changed since the last call.
    pub fn refresh(&mut self, editor: &Editor) -> Option<ColorImage> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return None;
        }
        let raster = editor.preview_repeated(self.scale, self.mode.repeats());
        debug!(
            "Preview refreshed ({:?}, {}x{})",
            self.mode,
            raster.width(),
            raster.height()
        );
        Some(raster_to_color_image(&raster))
    }
}

impl Default for PreviewState {
    fn default() -> Self {
        PreviewState::new(PreviewMode::Grid, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use pixtile_core::{render_tile, ToolKind};

    #[test]
    fn test_decode_tokens() {
        assert_eq!(decode_token(&Cell::Empty), Color32::TRANSPARENT);
        assert_eq!(
            decode_token(&Cell::color("#ff0000")),
            Color32::from_rgb(255, 0, 0)
        );
        assert_eq!(
            decode_token(&Cell::color("#0f0")),
            Color32::from_rgb(0, 255, 0)
        );
        assert_eq!(decode_token(&Cell::color("papayawhip")), Color32::TRANSPARENT);
    }

    #[test]
    fn test_raster_to_rgba() {
        let mut grid = Grid::new(4).unwrap();
        grid.set(0, 0, Cell::color("#ff0000")).unwrap();
        let raster = render_tile(&grid, 2);

        let rgba = raster_to_rgba(&raster);
        assert_eq!(rgba.len(), 8 * 8 * 4);
        assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
        // (1, 1) is still inside the red block, (2, 0) is not
        let at = |x: usize, y: usize| &rgba[(y * 8 + x) * 4..(y * 8 + x) * 4 + 4];
        assert_eq!(at(1, 1), &[255, 0, 0, 255]);
        assert_eq!(at(2, 0)[3], 0);
    }

    #[test]
    fn test_color_image_size() {
        let raster = render_tile(&Grid::new(5).unwrap(), 3);
        let image = raster_to_color_image(&raster);
        assert_eq!(image.size, [15, 15]);
    }

    #[test]
    fn test_editor_canvas_backdrop() {
        let mut grid = Grid::new(4).unwrap();
        grid.set(0, 1, Cell::color("#ffffff")).unwrap();
        let image = editor_canvas_image(&grid);

        assert_eq!(image.pixels[0], BACKDROP_DARK);
        assert_eq!(image.pixels[1], Color32::WHITE);
        assert_eq!(image.pixels[2], BACKDROP_DARK);
        assert_eq!(image.pixels[4], BACKDROP_LIGHT);
    }

    #[test]
    fn test_pointer_to_cell() {
        let canvas = Rect::from_min_size(pos2(100.0, 50.0), egui::vec2(160.0, 160.0));
        assert_eq!(pointer_to_cell(canvas, 16, pos2(100.0, 50.0)), (0, 0));
        assert_eq!(pointer_to_cell(canvas, 16, pos2(259.0, 209.0)), (15, 15));
        assert_eq!(pointer_to_cell(canvas, 16, pos2(125.0, 61.0)), (1, 2));
        assert_eq!(pointer_to_cell(canvas, 16, pos2(90.0, 40.0)), (-1, -1));
    }

    #[test]
    fn test_preview_refreshes_on_change() {
        let mut editor = Editor::new(4);
        let mut preview = PreviewState::new(PreviewMode::Grid, 1);
        preview.attach(&mut editor);

        let first = preview.refresh(&editor).unwrap();
        assert_eq!(first.size, [16, 16]);
        assert!(preview.refresh(&editor).is_none());

        editor.set_tool(ToolKind::Pen);
        editor.set_color("#ff0000");
        editor.begin_gesture(0, 0);
        assert!(preview.is_dirty());
        let painted = preview.refresh(&editor).unwrap();
        // every repeat of the tile shows the stroke
        assert_eq!(painted.pixels[0], Color32::from_rgb(255, 0, 0));
        assert_eq!(painted.pixels[4], Color32::from_rgb(255, 0, 0));

        preview.set_mode(PreviewMode::Single);
        assert_eq!(preview.refresh(&editor).unwrap().size, [4, 4]);

        preview.detach(&mut editor);
        editor.commit_gesture();
        assert!(!preview.is_dirty());
    }
}
