//! Working colour palette stored alongside a project.
//!
//! Colours are opaque tokens; the list keeps insertion order and never holds
//! duplicates. Named palettes travel as `{ "name", "colors" }` JSON files.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Colour a palette falls back to when it would otherwise be empty.
pub const FALLBACK_COLOR: &str = "#000000";

/// Built-in palettes, in menu order. The first one is the default.
pub const PALETTE_PRESETS: [(&str, [&str; 12]); 10] = [
    (
        "Default",
        [
            "#000000", "#ffffff", "#ef4444", "#f97316", "#f59e0b", "#84cc16", "#10b981",
            "#06b6d4", "#3b82f6", "#8b5cf6", "#d946ef", "#f43f5e",
        ],
    ),
    (
        "Grayscale",
        [
            "#000000", "#1a1a1a", "#333333", "#4d4d4d", "#666666", "#808080", "#999999",
            "#b3b3b3", "#cccccc", "#e6e6e6", "#f2f2f2", "#ffffff",
        ],
    ),
    (
        "Reds",
        [
            "#450a0a", "#7f1d1d", "#991b1b", "#b91c1c", "#dc2626", "#ef4444", "#f87171",
            "#fca5a5", "#fecaca", "#fee2e2", "#fef2f2", "#fff5f5",
        ],
    ),
    (
        "Greens",
        [
            "#052e16", "#064e3b", "#065f46", "#047857", "#059669", "#10b981", "#34d399",
            "#6ee7b7", "#a7f3d0", "#d1fae5", "#ecfdf5", "#f0fdf4",
        ],
    ),
    (
        "Blues",
        [
            "#172554", "#1e3a8a", "#1e40af", "#1d4ed8", "#2563eb", "#3b82f6", "#60a5fa",
            "#93c5fd", "#bfdbfe", "#dbeafe", "#eff6ff", "#f0f9ff",
        ],
    ),
    (
        "Yellows",
        [
            "#422006", "#713f12", "#854d0e", "#a16207", "#ca8a04", "#d97706", "#ea580c",
            "#f59e0b", "#fbbf24", "#fcd34d", "#fde68a", "#fef3c7",
        ],
    ),
    (
        "Winter",
        [
            "#0f172a", "#1e293b", "#334155", "#475569", "#64748b", "#94a3b8", "#cbd5e1",
            "#e2e8f0", "#f1f5f9", "#f8fafc", "#0ea5e9", "#38bdf8",
        ],
    ),
    (
        "Spring",
        [
            "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a",
            "#15803d", "#166534", "#14532d", "#a3e635", "#84cc16",
        ],
    ),
    (
        "Summer",
        [
            "#fefce8", "#fef9c3", "#fef08a", "#fde047", "#facc15", "#eab308", "#ca8a04",
            "#a16207", "#fb923c", "#f97316", "#ea580c", "#c2410c",
        ],
    ),
    (
        "Fall",
        [
            "#451a03", "#78350f", "#92400e", "#b45309", "#d97706", "#f59e0b", "#fbbf24",
            "#fcd34d", "#fef3c7", "#fffbeb", "#7f1d1d", "#991b1b",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Palette {
    colors: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_colors(PALETTE_PRESETS[0].1)
    }
}

impl From<Vec<String>> for Palette {
    fn from(colors: Vec<String>) -> Self {
        Self::from_colors(colors)
    }
}

impl From<Palette> for Vec<String> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

impl Palette {
    /// Build a palette, dropping duplicates. An empty input yields the
    /// fallback colour.
    pub fn from_colors<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut palette = Self { colors: Vec::new() };
        for color in colors {
            palette.add(color);
        }
        palette.ensure_not_empty();
        palette
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    /// Append a colour unless it is already present. Returns whether it was added.
    pub fn add(&mut self, color: impl Into<String>) -> bool {
        let color = color.into();
        if color.is_empty() || self.contains(&color) {
            return false;
        }
        self.colors.push(color);
        true
    }

    /// Remove a colour. Returns the colour that should become selected: the
    /// first remaining entry.
    pub fn remove(&mut self, color: &str) -> &str {
        self.colors.retain(|c| c != color);
        self.ensure_not_empty();
        &self.colors[0]
    }

    /// Add every colour of `other` that isn't present yet, keeping order.
    pub fn merge(&mut self, other: &Palette) -> usize {
        let added = other
            .colors
            .iter()
            .filter(|color| self.add(color.as_str()))
            .count();
        tracing::debug!(added, total = self.colors.len(), "merged palette");
        added
    }

    /// A built-in palette by name.
    pub fn preset(name: &str) -> Option<Self> {
        PALETTE_PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .map(|(_, colors)| Self::from_colors(*colors))
    }

    pub fn preset_names() -> impl Iterator<Item = &'static str> {
        PALETTE_PRESETS.iter().map(|(name, _)| *name)
    }

    /// Wrap the colours in a shareable named palette document.
    pub fn to_file(&self, name: impl Into<String>) -> PaletteFile {
        PaletteFile {
            name: name.into(),
            colors: self.colors.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.ensure_not_empty();
    }

    fn ensure_not_empty(&mut self) {
        if self.colors.is_empty() {
            self.colors.push(FALLBACK_COLOR.to_string());
        }
    }
}

/// Named palette as exchanged in `*_palette.json` files:
/// `{ "name": "...", "colors": ["#rrggbb", ...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteFile {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteFile {
    pub fn from_json_str(json: &str) -> Result<Self, PaletteError> {
        let file: PaletteFile = serde_json::from_str(json)?;
        if file.name.trim().is_empty() {
            return Err(PaletteError::Invalid {
                reason: "missing palette name".into(),
            });
        }
        Ok(file)
    }

    pub fn to_json_string(&self) -> Result<String, PaletteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn palette(&self) -> Palette {
        Palette::from_colors(self.colors.iter().cloned())
    }

    /// Download name: the palette name lower-cased, with anything outside
    /// `[a-z0-9]` replaced by `-`.
    pub fn file_name(&self) -> String {
        let safe: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        format!("{}_palette.json", safe)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("invalid palette file: {reason}")]
    Invalid { reason: String },

    #[error("malformed palette json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn save_palette(path: impl AsRef<Path>, file: &PaletteFile) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = file.to_json_string().context("serialize palette to json")?;
    fs::write(path, json).with_context(|| format!("write palette file: {}", path.display()))?;
    tracing::info!(path = %path.display(), name = %file.name, "palette saved");
    Ok(())
}

pub fn load_palette(path: impl AsRef<Path>) -> anyhow::Result<PaletteFile> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read palette file: {}", path.display()))?;
    let file = PaletteFile::from_json_str(&data)
        .with_context(|| format!("parse palette file: {}", path.display()))?;
    Ok(file)
}
