//! Editor session: grid, tool settings, gesture in progress and history.
//!
//! This is the surface the UI talks to. Pointer samples go through
//! [`Editor::apply_tool`], pointer release through [`Editor::commit_gesture`];
//! observers registered with [`Editor::subscribe`] hear about every change so
//! previews can be recomposited.

use tracing::{debug, info, warn};

use crate::compositor::{self, ExportKind, Raster, RenderedRaster, PREVIEW_REPEATS};
use crate::grid::{clamp_size, Grid, DEFAULT_GRID_SIZE};
use crate::history::History;
use crate::paint::{clamp_brush_size, Gesture, ToolKind, ToolSettings};
use crate::GridError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeReason {
    /// A sample was applied to the gesture's working copy.
    Stroke,
    /// A finished gesture was pushed to history.
    Commit,
    /// A gesture was abandoned and the committed grid is shown again.
    Cancel,
    Undo,
    Redo,
    Resize,
    Load,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Grid, ChangeReason) + Send>;

pub struct Editor {
    settings: ToolSettings,
    history: History,
    gesture: Option<Gesture>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Editor {
    /// Editor with an empty grid; `size` is clamped into the supported range.
    pub fn new(size: usize) -> Self {
        Self::with_grid(Grid::new_clamped(size))
    }

    pub fn with_grid(grid: Grid) -> Self {
        info!("Opening editor on a {}x{} grid", grid.size(), grid.size());
        Self {
            settings: ToolSettings::default(),
            history: History::new(grid),
            gesture: None,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The grid as currently displayed, including an in-progress gesture.
    pub fn grid(&self) -> &Grid {
        match &self.gesture {
            Some(gesture) => gesture.working(),
            None => self.history.current(),
        }
    }

    pub fn committed_grid(&self) -> &Grid {
        self.history.current()
    }

    pub fn size(&self) -> usize {
        self.grid().size()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_drawing(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn tool_settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Settings changes take effect immediately, including for the rest of
    /// an open gesture.
    pub fn set_tool_settings(&mut self, settings: ToolSettings) {
        self.settings = settings.clamped();
        self.sync_gesture_tool();
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        debug!("Selected tool {:?}", tool);
        self.settings.tool = tool;
        self.sync_gesture_tool();
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.settings.color = color.into();
        self.sync_gesture_tool();
    }

    pub fn set_brush_size(&mut self, size: usize) {
        self.settings.brush_size = clamp_brush_size(size);
        self.sync_gesture_tool();
    }

    fn sync_gesture_tool(&mut self) {
        if let Some(gesture) = &mut self.gesture {
            gesture.set_tool(&self.settings);
        }
    }

    /// Start a gesture at the pointer-down position. A gesture still open
    /// from a missed pointer-up is committed first.
    pub fn begin_gesture(&mut self, row: i64, col: i64) -> &Grid {
        if self.gesture.is_some() {
            warn!("Gesture started while another was open; committing the previous one");
            self.commit_gesture();
        }
        self.gesture = Some(Gesture::begin(self.history.current(), &self.settings));
        self.apply_tool(row, col)
    }

    /// Apply the current tool at one pointer sample, starting a gesture if
    /// none is open. Returns the working grid.
    pub fn apply_tool(&mut self, row: i64, col: i64) -> &Grid {
        let gesture = self
            .gesture
            .get_or_insert_with(|| Gesture::begin(self.history.current(), &self.settings));
        gesture.apply(row, col);
        self.notify(ChangeReason::Stroke);
        self.grid()
    }

    /// Stateless form used by hosts that pass tool parameters per sample.
    pub fn apply_tool_at(
        &mut self,
        tool: ToolKind,
        row: i64,
        col: i64,
        color: &str,
        brush_size: usize,
    ) -> &Grid {
        self.set_tool_settings(ToolSettings {
            tool,
            color: color.to_string(),
            brush_size,
        });
        self.apply_tool(row, col)
    }

    /// Close the open gesture. Returns whether a history entry was pushed;
    /// gestures that changed nothing leave history alone.
    pub fn commit_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        match gesture.finish() {
            Some(grid) => {
                self.history.commit(grid);
                self.notify(ChangeReason::Commit);
                true
            }
            None => false,
        }
    }

    /// Drop the open gesture without touching history.
    pub fn cancel_gesture(&mut self) {
        if self.gesture.take().is_some() {
            debug!("Gesture cancelled");
            self.notify(ChangeReason::Cancel);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> &Grid {
        self.commit_gesture();
        self.history.undo();
        self.notify(ChangeReason::Undo);
        self.grid()
    }

    pub fn redo(&mut self) -> &Grid {
        self.commit_gesture();
        self.history.redo();
        self.notify(ChangeReason::Redo);
        self.grid()
    }

    /// Replace the grid with an empty one of side `size` (clamped). Prior
    /// content and history are discarded.
    pub fn resize(&mut self, size: usize) {
        let size = clamp_size(size);
        info!("Resizing canvas to {}x{}", size, size);
        self.gesture = None;
        self.history.reset(Grid::new_clamped(size));
        self.notify(ChangeReason::Resize);
    }

    /// Load a saved pixel array. Undo history starts over from the loaded grid.
    pub fn load<S: AsRef<str>>(&mut self, tokens: &[S], size: usize) -> Result<(), GridError> {
        let grid = Grid::deserialize(tokens, size)?;
        self.load_grid(grid);
        Ok(())
    }

    pub fn load_grid(&mut self, grid: Grid) {
        info!("Loading {}x{} grid", grid.size(), grid.size());
        self.gesture = None;
        self.history.reset(grid);
        self.notify(ChangeReason::Load);
    }

    /// Blank the canvas as an undoable step.
    pub fn clear(&mut self) {
        self.gesture = None;
        let size = self.history.current().size();
        self.history.commit(Grid::new_clamped(size));
        self.notify(ChangeReason::Clear);
    }

    pub fn serialize(&self) -> Vec<String> {
        self.committed_grid().serialize()
    }

    pub fn export_raster(&self, kind: ExportKind, scale: u32, repeats: Option<u32>) -> Raster {
        compositor::export_raster(self.committed_grid(), kind, scale, repeats)
    }

    pub fn export_batch(&self, requests: &[(ExportKind, u32)]) -> Vec<RenderedRaster> {
        compositor::render_batch(self.committed_grid(), requests)
    }

    /// Tiled preview of the displayed grid, including an open gesture.
    pub fn preview(&self, scale: u32) -> Raster {
        self.preview_repeated(scale, PREVIEW_REPEATS)
    }

    /// Preview with `repeats` copies per axis; 1 shows the tile on its own.
    pub fn preview_repeated(&self, scale: u32, repeats: u32) -> Raster {
        compositor::render_pattern(self.grid(), scale, repeats, repeats)
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Grid, ChangeReason) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(known, _)| *known != id);
        self.observers.len() != before
    }

    fn notify(&mut self, reason: ChangeReason) {
        let grid = match &self.gesture {
            Some(gesture) => gesture.working(),
            None => self.history.current(),
        };
        for (_, observer) in self.observers.iter_mut() {
            observer(grid, reason);
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new(DEFAULT_GRID_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;
    use std::sync::{Arc, Mutex};

    fn red_pen(editor: &mut Editor) {
        editor.set_tool(ToolKind::Pen);
        editor.set_color("#ff0000");
        editor.set_brush_size(1);
    }

    #[test]
    fn test_one_commit_per_gesture() {
        let mut editor = Editor::new(8);
        red_pen(&mut editor);

        editor.begin_gesture(0, 0);
        for col in 1..8 {
            editor.apply_tool(0, col);
        }
        assert_eq!(editor.history().len(), 1);
        assert!(editor.commit_gesture());

        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.grid().painted_count(), 8);
    }

    #[test]
    fn test_undo_redo_through_editor() {
        let mut editor = Editor::new(8);
        red_pen(&mut editor);
        let before = editor.grid().clone();

        editor.begin_gesture(2, 2);
        editor.commit_gesture();
        let after = editor.grid().clone();

        assert_eq!(editor.undo(), &before);
        assert_eq!(editor.redo(), &after);
    }

    #[test]
    fn test_noop_fill_pushes_nothing() {
        let mut editor = Editor::new(4);
        editor.set_tool(ToolKind::Fill);
        editor.set_color("#00ff00");
        editor.begin_gesture(0, 0);
        assert!(editor.commit_gesture());

        editor.begin_gesture(3, 3);
        assert!(!editor.commit_gesture());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_apply_tool_at() {
        let mut editor = Editor::new(8);
        editor.apply_tool_at(ToolKind::Pen, 4, 4, "#123456", 2);
        editor.commit_gesture();

        let grid = editor.grid();
        assert_eq!(grid.painted_count(), 4);
        assert_eq!(grid.get(5, 5).unwrap(), &Cell::color("#123456"));
        assert_eq!(editor.tool_settings().brush_size, 2);
    }

    #[test]
    fn test_settings_change_mid_stroke() {
        let mut editor = Editor::new(8);
        editor.apply_tool_at(ToolKind::Pen, 0, 0, "#ff0000", 1);
        editor.apply_tool_at(ToolKind::Pen, 4, 4, "#0000ff", 3);

        let blue = Cell::color("#0000ff");
        assert_eq!(editor.grid().get(0, 0).unwrap(), &Cell::color("#ff0000"));
        assert_eq!(editor.grid().get(4, 4).unwrap(), &blue);
        assert_eq!(editor.grid().painted_count(), 10);

        // setters reach the open gesture too
        editor.set_brush_size(1);
        editor.set_tool(ToolKind::Eraser);
        editor.apply_tool(4, 4);
        assert_eq!(editor.grid().get(4, 4).unwrap(), &Cell::Empty);
        assert_eq!(editor.grid().get(3, 3).unwrap(), &blue);

        assert!(editor.commit_gesture());
        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.grid().painted_count(), 9);
    }

    #[test]
    fn test_resize_discards_content_and_history() {
        let mut editor = Editor::new(8);
        red_pen(&mut editor);
        editor.begin_gesture(1, 1);
        editor.commit_gesture();

        editor.resize(100);

        assert_eq!(editor.size(), 64);
        assert!(editor.grid().is_blank());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_load_resets_history() {
        let mut editor = Editor::new(4);
        red_pen(&mut editor);
        editor.begin_gesture(0, 0);
        editor.commit_gesture();

        let mut tokens = vec!["transparent".to_string(); 16];
        tokens[5] = "#abcdef".into();
        editor.load(&tokens, 4).unwrap();

        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.grid().get(1, 1).unwrap(), &Cell::color("#abcdef"));
        assert_eq!(editor.serialize(), tokens);
    }

    #[test]
    fn test_load_rejects_bad_data() {
        let mut editor = Editor::new(4);
        let before = editor.grid().clone();

        let err = editor.load(&["#000000"; 10], 4).unwrap_err();
        assert_eq!(
            err,
            GridError::SizeMismatch {
                expected: 16,
                actual: 10
            }
        );
        assert_eq!(editor.grid(), &before);
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut editor = Editor::new(4);
        red_pen(&mut editor);
        editor.begin_gesture(0, 0);
        editor.commit_gesture();

        editor.clear();
        assert!(editor.grid().is_blank());
        assert_eq!(editor.undo().painted_count(), 1);
    }

    #[test]
    fn test_observers() {
        let mut editor = Editor::new(4);
        red_pen(&mut editor);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = editor.subscribe(move |grid, reason| {
            sink.lock().unwrap().push((reason, grid.painted_count()));
        });

        editor.begin_gesture(0, 0);
        editor.apply_tool(0, 1);
        editor.commit_gesture();
        editor.undo();
        assert!(editor.unsubscribe(id));
        editor.redo();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (ChangeReason::Stroke, 1),
                (ChangeReason::Stroke, 2),
                (ChangeReason::Commit, 2),
                (ChangeReason::Undo, 0),
            ]
        );
    }

    #[test]
    fn test_exports_use_committed_grid() {
        let mut editor = Editor::new(4);
        red_pen(&mut editor);
        editor.begin_gesture(0, 0);

        // gesture still open: preview shows it, export does not
        assert_eq!(editor.preview(1).get(0, 0), Some(&Cell::color("#ff0000")));
        assert_eq!(
            editor.export_raster(ExportKind::Tile, 1, None).get(0, 0),
            Some(&Cell::Empty)
        );

        editor.commit_gesture();
        let batch = editor.export_batch(&[(ExportKind::Pattern, 10)]);
        assert_eq!(batch[0].raster.width(), 80);
        assert_eq!(batch[0].raster.get(40, 0), Some(&Cell::color("#ff0000")));
    }

    #[test]
    fn test_preview_repeats() {
        let mut editor = Editor::new(4);
        red_pen(&mut editor);
        editor.begin_gesture(0, 0);

        assert_eq!(editor.preview(2).width(), 4 * 2 * PREVIEW_REPEATS as usize);
        let single = editor.preview_repeated(2, 1);
        assert_eq!((single.width(), single.height()), (8, 8));
        assert_eq!(single.get(1, 1), Some(&Cell::color("#ff0000")));
        assert_eq!(editor.preview_repeated(1, 6).width(), 24);
    }

    #[test]
    fn test_cancel_gesture() {
        let mut editor = Editor::new(4);
        red_pen(&mut editor);
        editor.begin_gesture(1, 1);
        editor.cancel_gesture();

        assert!(!editor.is_drawing());
        assert!(editor.grid().is_blank());
        assert_eq!(editor.history().len(), 1);
    }
}
