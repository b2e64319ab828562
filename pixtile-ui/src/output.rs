//! PNG output for composited rasters.
//!
//! Bundled plans (all sizes, full pack) are written into a directory named
//! after the archive they would otherwise be zipped into.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use image::RgbaImage;
use pixtile_core::{Grid, Raster};
use pixtile_project::ExportPlan;

use crate::editor::raster_to_rgba;

pub fn raster_to_image(raster: &Raster) -> anyhow::Result<RgbaImage> {
    let (width, height) = (raster.width() as u32, raster.height() as u32);
    RgbaImage::from_raw(width, height, raster_to_rgba(raster))
        .ok_or_else(|| anyhow!("raster buffer does not match {}x{}", width, height))
}

pub fn write_png(raster: &Raster, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let image = raster_to_image(raster)?;
    image
        .save(path)
        .with_context(|| format!("write png: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "png written");
    Ok(())
}

/// Render and write every job of `plan`. Returns the written paths in plan order.
pub fn write_plan(
    plan: &ExportPlan,
    grid: &Grid,
    out_dir: impl AsRef<Path>,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut dir = out_dir.as_ref().to_path_buf();
    if let Some(archive) = &plan.archive_name {
        let stem = archive.strip_suffix(".zip").unwrap_or(archive);
        dir.push(stem);
    }
    fs::create_dir_all(&dir).with_context(|| format!("create output dir: {}", dir.display()))?;

    let names = plan.output_names();
    let mut written = Vec::with_capacity(names.len());
    for ((job, raster), name) in plan.render(grid).into_iter().zip(names) {
        let path = dir.join(name);
        write_png(&raster, &path)?;
        tracing::info!(
            kind = job.kind.as_str(),
            scale = job.scale,
            width = raster.width(),
            path = %path.display(),
            "exported raster"
        );
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixtile_core::{render_tile, Cell, ExportKind};
    use pixtile_project::ExportRequest;

    fn sample_grid() -> Grid {
        let mut grid = Grid::new(4).unwrap();
        grid.set(0, 0, Cell::color("#ff0000")).unwrap();
        grid
    }

    #[test]
    fn test_raster_to_image() {
        let image = raster_to_image(&render_tile(&sample_grid(), 2)).unwrap();
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(2, 2).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_write_single_plan() {
        let plan = ExportRequest::Single {
            kind: ExportKind::Tile,
            scale: 10,
        }
        .plan()
        .unwrap();
        let out = Path::new("target/test_output/single");

        let written = write_plan(&plan, &sample_grid(), out).unwrap();

        assert_eq!(written, vec![out.join("pixelpatterns_tile_10x.png")]);
        let image = image::open(&written[0]).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (40, 40));
        assert_eq!(image.get_pixel(9, 9).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_write_full_pack() {
        let plan = ExportRequest::FullPack.plan().unwrap();
        let out = Path::new("target/test_output/pack");

        let written = write_plan(&plan, &sample_grid(), out).unwrap();

        assert_eq!(written.len(), 6);
        assert!(written
            .iter()
            .all(|p| p.starts_with(out.join("pixelpatterns_full_pack"))));
        let pattern = image::open(out.join("pixelpatterns_full_pack/pattern_1x.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(pattern.dimensions(), (8, 8));
    }
}
