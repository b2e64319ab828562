//! pixtile-project: everything around the editing core that touches files.
//!
//! Design rules:
//! - Project files are plain JSON; unknown keys are ignored so older and newer
//!   writers can share files within a major version.
//! - Loading a project never appends to undo history, it replaces it.
//! - Export plans only name and render rasters; encoding and archiving belong
//!   to the caller.

/// Project format version written by this crate.
pub const PROJECT_FORMAT_VERSION: &str = "1.0";

pub mod export;
pub mod palette;
pub mod project;

pub use export::{
    ExportError, ExportJob, ExportPlan, ExportRequest, EXPORT_SCALES, MAX_EXPORT_SCALE,
};
pub use palette::{
    load_palette, save_palette, Palette, PaletteError, PaletteFile, PALETTE_PRESETS,
};
pub use project::{
    load_project, save_project, CanvasV1, ProjectError, ProjectFile, PROJECT_FILE_EXT,
};
