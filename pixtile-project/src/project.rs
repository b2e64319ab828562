//! Project files for PIXTILE (v1).
//!
//! A project is the durable unit of work. It stores:
//! - the canvas (size + flat pixel array)
//! - the tool settings at save time
//! - the working colour palette
//!
//! Loading a project replaces the editor's grid and starts a fresh undo history.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use pixtile_core::{Editor, Grid, GridError, ToolSettings};

use crate::{Palette, PROJECT_FORMAT_VERSION};

/// File extension used for saved projects.
pub const PROJECT_FILE_EXT: &str = "fafo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasV1 {
    pub size: usize,
    pub pixels: Vec<String>,
}

/// v1 project document. Save/load this as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub version: String,

    /// Older files carry no id; they get a fresh one when loaded.
    #[serde(default = "Uuid::new_v4")]
    pub project_id: Uuid,

    pub canvas: CanvasV1,

    #[serde(default)]
    pub settings: ToolSettings,

    #[serde(default)]
    pub palette: Palette,

    /// Unix seconds at save time.
    #[serde(default)]
    pub saved_at: i64,
}

impl ProjectFile {
    /// Snapshot the editor's committed grid and settings.
    pub fn capture(editor: &Editor, palette: &Palette) -> Self {
        let grid = editor.committed_grid();
        Self {
            version: PROJECT_FORMAT_VERSION.to_string(),
            project_id: Uuid::new_v4(),
            canvas: CanvasV1 {
                size: grid.size(),
                pixels: grid.serialize(),
            },
            settings: editor.tool_settings().clone(),
            palette: palette.clone(),
            saved_at: unix_now(),
        }
    }

    /// Snapshot the editor into an existing project, keeping its id so a
    /// loaded project saved again stays the same project.
    pub fn recapture(&self, editor: &Editor, palette: &Palette) -> Self {
        Self {
            project_id: self.project_id,
            ..Self::capture(editor, palette)
        }
    }

    /// Validate the canvas and build its grid.
    pub fn grid(&self) -> Result<Grid, ProjectError> {
        Ok(Grid::deserialize(&self.canvas.pixels, self.canvas.size)?)
    }

    /// Apply this project to an editor: settings first, then the grid.
    /// The editor's history is reset, not appended to.
    pub fn restore(&self, editor: &mut Editor) -> Result<(), ProjectError> {
        let grid = self.grid()?;
        editor.set_tool_settings(self.settings.clone());
        editor.load_grid(grid);
        tracing::info!(
            project_id = %self.project_id,
            size = self.canvas.size,
            "project restored into editor"
        );
        Ok(())
    }

    /// Parse and validate a project document.
    pub fn from_json_str(json: &str) -> Result<Self, ProjectError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        // Required keys are checked up front so callers get a clear message.
        let version = value.get("version").and_then(|v| v.as_str());
        let Some(version) = version else {
            return Err(ProjectError::Invalid {
                reason: "missing version".into(),
            });
        };
        if value.get("canvas").is_none() {
            return Err(ProjectError::Invalid {
                reason: "missing canvas".into(),
            });
        }
        if !is_supported_version(version) {
            tracing::error!(version, "unsupported project version");
            return Err(ProjectError::UnsupportedVersion {
                version: version.to_string(),
            });
        }

        let project: ProjectFile = serde_json::from_value(value)?;
        project.grid()?;
        Ok(project)
    }

    pub fn to_json_string(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn is_supported_version(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_owned);
    major(version) == major(PROJECT_FORMAT_VERSION)
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("invalid project file: {reason}")]
    Invalid { reason: String },

    #[error("unsupported project version: {version}")]
    UnsupportedVersion { version: String },

    #[error("malformed project json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid canvas: {0}")]
    Grid(#[from] GridError),
}

/// Save a project to disk as pretty JSON.
pub fn save_project(path: impl AsRef<Path>, project: &ProjectFile) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let json = project
        .to_json_string()
        .context("serialize project to json")?;
    fs::write(path, json).with_context(|| format!("write project file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "project saved");
    Ok(())
}

/// Load and validate a project from disk.
pub fn load_project(path: impl AsRef<Path>) -> anyhow::Result<ProjectFile> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read project file: {}", path.display()))?;
    let project = ProjectFile::from_json_str(&data)
        .with_context(|| format!("parse project file: {}", path.display()))?;
    Ok(project)
}
