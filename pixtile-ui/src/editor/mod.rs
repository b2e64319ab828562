// Editor-side glue for PIXTILE UI.

pub mod canvas;
pub mod shortcuts;

pub use canvas::{
    decode_token, editor_canvas_image, pointer_to_cell, raster_to_color_image, raster_to_rgba,
    PreviewMode, PreviewState,
};
pub use shortcuts::{shortcut_for, shortcuts_from_events, Shortcut};
