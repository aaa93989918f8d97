//! Reflow configuration, loaded from JSON. Every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::fonts::FontBook;
use crate::gaps::{DEFAULT_GAP_STEP_PX, DEFAULT_MAX_GAP_PX};
use crate::geometry::PageGeometry;
use crate::scale::{ScaleCalculator, ScaleContext, DEFAULT_EDITOR_MAX_SCALE};
use crate::scheduler::DEFAULT_DEBOUNCE_MS;

/// A font face to measure text with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSource {
    pub family: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflowConfig {
    pub geometry: PageGeometry,
    /// Settle delay before a scheduled pass runs.
    pub debounce_ms: u64,
    pub scale_context: ScaleContext,
    /// Upper scale bound in the preview; unbounded when absent.
    pub preview_max_scale: Option<f32>,
    pub editor_max_scale: f32,
    pub gap_step_px: f32,
    pub max_gap_px: f32,
    /// Title embedded in exported PDFs.
    pub title: String,
    pub fonts: Vec<FontSource>,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            scale_context: ScaleContext::Preview,
            preview_max_scale: None,
            editor_max_scale: DEFAULT_EDITOR_MAX_SCALE,
            gap_step_px: DEFAULT_GAP_STEP_PX,
            max_gap_px: DEFAULT_MAX_GAP_PX,
            title: "Resume".to_string(),
            fonts: Vec::new(),
        }
    }
}

impl ReflowConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        if !(self.editor_max_scale > 0.0) {
            return Err(FolioError::Config(format!(
                "editor_max_scale must be positive (got {})",
                self.editor_max_scale
            )));
        }
        if !(self.gap_step_px > 0.0) || !(self.max_gap_px >= 0.0) {
            return Err(FolioError::Config(
                "gap_step_px must be positive and max_gap_px non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn scale_calculator(&self, context: ScaleContext) -> ScaleCalculator {
        ScaleCalculator::for_context(
            self.geometry.page_width,
            context,
            self.preview_max_scale,
            self.editor_max_scale,
        )
    }

    /// Load the configured faces. Unreadable files are skipped with a
    /// warning and measurement falls back to the heuristic for them.
    pub fn font_book(&self) -> FontBook {
        let mut book = FontBook::new();
        for font in &self.fonts {
            if let Err(err) = book.load_path(&font.family, font.bold, font.italic, &font.path) {
                log::warn!("skipping font {}: {err}", font.path.display());
            }
        }
        book
    }
}
