//! Export planning for PIXTILE.
//!
//! Turns an export dialog choice (one raster, every preset size of one kind,
//! or the full pack) into named raster jobs. Writing PNGs and zipping them is
//! left to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pixtile_core::{render_batch, ExportKind, Grid, Raster};

/// Preset scales offered by the export dialog.
pub const EXPORT_SCALES: [u32; 3] = [1, 10, 20];

/// Largest scale accepted for a single export.
pub const MAX_EXPORT_SCALE: u32 = 64;

/// Prefix for top-level download names.
pub const FILE_PREFIX: &str = "pixelpatterns";

pub const IMAGE_EXTENSION: &str = "png";
pub const ARCHIVE_EXTENSION: &str = "zip";

/// What the user asked the export dialog for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExportRequest {
    /// One raster of one kind at one scale.
    Single { kind: ExportKind, scale: u32 },
    /// One kind at every preset scale.
    AllSizes { kind: ExportKind },
    /// Tile and pattern at every preset scale.
    FullPack,
}

impl ExportRequest {
    pub fn validate(&self) -> Result<(), ExportError> {
        if let ExportRequest::Single { scale, .. } = *self {
            if scale == 0 || scale > MAX_EXPORT_SCALE {
                tracing::error!(scale, max = MAX_EXPORT_SCALE, "export scale out of range");
                return Err(ExportError::InvalidScale { scale });
            }
        }
        Ok(())
    }

    /// Expand the request into named jobs.
    pub fn plan(&self) -> Result<ExportPlan, ExportError> {
        self.validate()?;

        let plan = match *self {
            ExportRequest::Single { kind, scale } => ExportPlan {
                jobs: vec![ExportJob::new(kind, scale)],
                archive_name: None,
            },
            ExportRequest::AllSizes { kind } => ExportPlan {
                jobs: EXPORT_SCALES
                    .into_iter()
                    .map(|scale| ExportJob::new(kind, scale))
                    .collect(),
                archive_name: Some(format!(
                    "{}_{}_all.{}",
                    FILE_PREFIX,
                    kind.as_str(),
                    ARCHIVE_EXTENSION
                )),
            },
            ExportRequest::FullPack => ExportPlan {
                jobs: ExportKind::ALL
                    .into_iter()
                    .flat_map(|kind| {
                        EXPORT_SCALES
                            .into_iter()
                            .map(move |scale| ExportJob::new(kind, scale))
                    })
                    .collect(),
                archive_name: Some(format!("{}_full_pack.{}", FILE_PREFIX, ARCHIVE_EXTENSION)),
            },
        };

        tracing::debug!(
            jobs = plan.jobs.len(),
            archive = plan.archive_name.as_deref().unwrap_or("-"),
            "export plan ready"
        );
        Ok(plan)
    }

    /// Short human description, as shown under the dialog title.
    pub fn describe(&self) -> String {
        let scales = EXPORT_SCALES
            .iter()
            .map(|s| format!("{}x", s))
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            ExportRequest::Single { kind, scale } => {
                let what = match kind {
                    ExportKind::Tile => "single tile",
                    ExportKind::Pattern => "tiling pattern",
                };
                format!("Export {} at {}x scale", what, scale)
            }
            ExportRequest::AllSizes { kind } => {
                format!("Export {} at {} (ZIP)", kind.as_str(), scales)
            }
            ExportRequest::FullPack => "Export tile and pattern at all sizes (ZIP)".to_string(),
        }
    }
}

/// One raster to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJob {
    pub kind: ExportKind,
    pub scale: u32,
    /// Name of the raster inside an archive, e.g. `tile_10x.png`.
    pub file_name: String,
}

impl ExportJob {
    pub fn new(kind: ExportKind, scale: u32) -> Self {
        Self {
            kind,
            scale,
            file_name: format!("{}_{}x.{}", kind.as_str(), scale, IMAGE_EXTENSION),
        }
    }

    /// Name used when the raster is downloaded on its own.
    pub fn standalone_name(&self) -> String {
        format!("{}_{}", FILE_PREFIX, self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPlan {
    pub jobs: Vec<ExportJob>,
    /// Set when the jobs are meant to be bundled into one archive.
    pub archive_name: Option<String>,
}

impl ExportPlan {
    pub fn is_archive(&self) -> bool {
        self.archive_name.is_some()
    }

    /// Name each output should be written under: archive member names for
    /// bundles, prefixed download names for a single raster.
    pub fn output_names(&self) -> Vec<String> {
        self.jobs
            .iter()
            .map(|job| {
                if self.is_archive() {
                    job.file_name.clone()
                } else {
                    job.standalone_name()
                }
            })
            .collect()
    }

    /// Render every job against `grid`, in plan order.
    pub fn render(&self, grid: &Grid) -> Vec<(ExportJob, Raster)> {
        let requests: Vec<(ExportKind, u32)> =
            self.jobs.iter().map(|job| (job.kind, job.scale)).collect();

        tracing::info!(
            jobs = requests.len(),
            grid_size = grid.size(),
            "rendering export plan"
        );

        self.jobs
            .iter()
            .cloned()
            .zip(render_batch(grid, &requests))
            .map(|(job, rendered)| (job, rendered.raster))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export scale {scale} (must be in [1, {}])", MAX_EXPORT_SCALE)]
    InvalidScale { scale: u32 },
}
