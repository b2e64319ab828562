// Headless front end: create, inspect and export PIXTILE projects.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pixtile_core::{Editor, ExportKind, DEFAULT_GRID_SIZE};
use pixtile_project::{load_project, save_project, ExportRequest, Palette, ProjectFile};
use pixtile_ui::output::write_plan;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pixtile", version, about = "Tileable pixel art projects")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a blank project.
    New {
        path: PathBuf,
        /// Canvas side length (clamped to 4..=64).
        #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
        size: usize,
    },
    /// Print a summary of a project.
    Info { project: PathBuf },
    /// Render a project to PNG files.
    Export {
        project: PathBuf,
        #[arg(long, value_enum, default_value_t = KindArg::Tile)]
        kind: KindArg,
        /// Scale factor, or `all` for every preset size.
        #[arg(long, default_value = "10")]
        scale: ScaleArg,
        /// Tile and pattern at every preset size; overrides --kind and --scale.
        #[arg(long)]
        full_pack: bool,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Tile,
    Pattern,
}

impl From<KindArg> for ExportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Tile => ExportKind::Tile,
            KindArg::Pattern => ExportKind::Pattern,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ScaleArg {
    Fixed(u32),
    All,
}

impl FromStr for ScaleArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(ScaleArg::All);
        }
        s.trim_end_matches('x')
            .parse()
            .map(ScaleArg::Fixed)
            .map_err(|_| format!("expected a scale like 10 or 10x, or `all`; got {:?}", s))
    }
}

fn export_request(kind: KindArg, scale: ScaleArg, full_pack: bool) -> ExportRequest {
    let kind = kind.into();
    match (full_pack, scale) {
        (true, _) => ExportRequest::FullPack,
        (false, ScaleArg::All) => ExportRequest::AllSizes { kind },
        (false, ScaleArg::Fixed(scale)) => ExportRequest::Single { kind, scale },
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::New { path, size } => {
            let editor = Editor::new(size);
            let project = ProjectFile::capture(&editor, &Palette::default());
            save_project(&path, &project)?;
            println!(
                "created {} ({}x{})",
                path.display(),
                editor.size(),
                editor.size()
            );
        }
        Command::Info { project } => {
            let file = load_project(&project)?;
            let grid = file.grid()?;
            println!("project   {}", file.project_id);
            println!("version   {}", file.version);
            println!("canvas    {}x{}", grid.size(), grid.size());
            println!("painted   {} / {} cells", grid.painted_count(), grid.len());
            println!(
                "settings  {:?}, {}, brush {}",
                file.settings.tool, file.settings.color, file.settings.brush_size
            );
            println!("palette   {}", file.palette.colors().join(" "));
        }
        Command::Export {
            project,
            kind,
            scale,
            full_pack,
            out,
        } => {
            let file = load_project(&project)?;
            let grid = file.grid()?;
            let request = export_request(kind, scale, full_pack);
            tracing::info!("{}", request.describe());

            let plan = request.plan().context("plan export")?;
            for path in write_plan(&plan, &grid, &out)? {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_arg_parsing() {
        assert!(matches!("20".parse::<ScaleArg>(), Ok(ScaleArg::Fixed(20))));
        assert!(matches!("10x".parse::<ScaleArg>(), Ok(ScaleArg::Fixed(10))));
        assert!(matches!("ALL".parse::<ScaleArg>(), Ok(ScaleArg::All)));
        assert!("huge".parse::<ScaleArg>().is_err());
    }

    #[test]
    fn test_export_request_mapping() {
        assert_eq!(
            export_request(KindArg::Pattern, ScaleArg::Fixed(20), false),
            ExportRequest::Single {
                kind: ExportKind::Pattern,
                scale: 20
            }
        );
        assert_eq!(
            export_request(KindArg::Tile, ScaleArg::All, false),
            ExportRequest::AllSizes {
                kind: ExportKind::Tile
            }
        );
        assert_eq!(
            export_request(KindArg::Tile, ScaleArg::Fixed(1), true),
            ExportRequest::FullPack
        );
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "pixtile",
            "export",
            "art.fafo",
            "--kind",
            "pattern",
            "--scale",
            "all",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Export {
                kind: KindArg::Pattern,
                scale: ScaleArg::All,
                full_pack: false,
                ..
            }
        ));
    }
}
