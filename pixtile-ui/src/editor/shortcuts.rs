// Keyboard shortcuts for the editor.
//
// P / E / F pick pen, eraser and fill; 1-4 pick the brush size;
// Cmd/Ctrl+Z undoes and Cmd/Ctrl+Shift+Z redoes.

use egui::{Event, Key, Modifiers};
use pixtile_core::{Editor, ToolKind};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    SelectTool(ToolKind),
    BrushSize(usize),
    Undo,
    Redo,
}

impl Shortcut {
    pub fn apply(self, editor: &mut Editor) {
        debug!("Applying shortcut {:?}", self);
        match self {
            Shortcut::SelectTool(tool) => editor.set_tool(tool),
            Shortcut::BrushSize(size) => editor.set_brush_size(size),
            Shortcut::Undo => {
                editor.undo();
            }
            Shortcut::Redo => {
                editor.redo();
            }
        }
    }
}

pub fn shortcut_for(key: Key, modifiers: Modifiers) -> Option<Shortcut> {
    if modifiers.command {
        return match key {
            Key::Z if modifiers.shift => Some(Shortcut::Redo),
            Key::Z => Some(Shortcut::Undo),
            _ => None,
        };
    }

    // Plain keys only; anything with Alt/Ctrl held belongs to someone else.
    if modifiers.alt || modifiers.ctrl {
        return None;
    }

    match key {
        Key::P => Some(Shortcut::SelectTool(ToolKind::Pen)),
        Key::E => Some(Shortcut::SelectTool(ToolKind::Eraser)),
        Key::F => Some(Shortcut::SelectTool(ToolKind::Fill)),
        Key::Num1 => Some(Shortcut::BrushSize(1)),
        Key::Num2 => Some(Shortcut::BrushSize(2)),
        Key::Num3 => Some(Shortcut::BrushSize(3)),
        Key::Num4 => Some(Shortcut::BrushSize(4)),
        _ => None,
    }
}

/// Shortcuts triggered by this frame's key presses, in order.
/// Callers should skip this while a text field has focus.
pub fn shortcuts_from_events(events: &[Event]) -> Vec<Shortcut> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => shortcut_for(*key, *modifiers),
            _ => None,
        })
        .collect()
}
