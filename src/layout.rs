use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Context, Result};

/// Display geometry for one matrix size: font paths and the coordinate map
/// renderers position glyphs with. Selected by `{width}x{height}`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub font: PathBuf,
    pub clock_font: PathBuf,
    pub coords: Value,
    pub show_logos: bool,
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    fonts: RawFonts,
    #[serde(default)]
    coords: Value,
    #[serde(default)]
    show_logos: bool,
}

#[derive(Debug, Deserialize)]
struct RawFonts {
    primary: String,
    #[serde(default)]
    clock: Option<String>,
}

impl Layout {
    /// Load the layout resource for the given matrix dimensions.
    pub fn load(dir: &Path, width: u32, height: u32) -> Result<Self> {
        let path = dir.join(format!("{width}x{height}.json"));
        let json = fs::read_to_string(&path)
            .with_context(|| format!("failed to read layout JSON at {}", path.display()))?;
        Self::from_json(width, height, &json)
    }

    pub fn from_json(width: u32, height: u32, json: &str) -> Result<Self> {
        let raw: RawLayout = serde_json::from_str(json)
            .with_context(|| format!("failed to parse layout JSON for {width}x{height}"))?;

        if raw.fonts.primary.trim().is_empty() {
            return Err(AppError::message(format!(
                "layout {width}x{height} must name a primary font"
            )));
        }

        let font = PathBuf::from(&raw.fonts.primary);
        let clock_font = raw
            .fonts
            .clock
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| font.clone());

        Ok(Self {
            width,
            height,
            font,
            clock_font,
            coords: raw.coords,
            show_logos: raw.show_logos,
        })
    }
}
