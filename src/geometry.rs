//! Virtual page geometry.
//!
//! The live document is one continuous column. Pages are simulated by
//! slicing it into `page_height` tall regions separated by a `page_gap`
//! tall strip that the page mask hides. All values are unscaled document
//! pixels; the viewport scale never enters these calculations.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// A4 width at 96 dpi.
pub const A4_WIDTH_PX: f32 = 794.0;
/// A4 height at 96 dpi (rounded down so a page never exceeds the sheet).
pub const A4_HEIGHT_PX: f32 = 1122.0;
/// Visual gap rendered between stacked pages.
pub const DEFAULT_PAGE_GAP_PX: f32 = 30.0;
/// Offset added past the next page start when a unit is pushed.
pub const DEFAULT_TOP_PADDING_PX: f32 = 40.0;
/// Slack below the page end that still counts as touching the boundary.
pub const DEFAULT_TOLERANCE_PX: f32 = 8.0;

/// Geometry constants shared by the injector, the mask and the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub page_gap: f32,
    pub top_padding: f32,
    pub tolerance: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH_PX,
            page_height: A4_HEIGHT_PX,
            page_gap: DEFAULT_PAGE_GAP_PX,
            top_padding: DEFAULT_TOP_PADDING_PX,
            tolerance: DEFAULT_TOLERANCE_PX,
        }
    }
}

impl PageGeometry {
    /// Distance between the tops of two consecutive pages.
    pub fn stride(&self) -> f32 {
        self.page_height + self.page_gap
    }

    /// Page hosting a document-space `y`. Negative positions clamp to 0.
    pub fn page_index(&self, y: f32) -> usize {
        if y <= 0.0 {
            return 0;
        }
        (y / self.stride()).floor() as usize
    }

    /// Document-space top of page `index`.
    pub fn page_start(&self, index: usize) -> f32 {
        index as f32 * self.stride()
    }

    /// Document-space bottom of the content area of page `index`.
    pub fn page_end(&self, index: usize) -> f32 {
        self.page_start(index) + self.page_height
    }

    /// Pages needed to show `height` pixels of document, never less than 1.
    pub fn pages_for_height(&self, height: f32) -> usize {
        if !(height > 0.0) {
            return 1;
        }
        ((height / self.stride()).ceil() as usize).max(1)
    }

    /// Reject geometry the injector cannot work with.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.page_width,
            self.page_height,
            self.page_gap,
            self.top_padding,
            self.tolerance,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(FolioError::Config(
                "page geometry values must be finite".to_string(),
            ));
        }
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(FolioError::Config(format!(
                "page size must be positive (got {}x{})",
                self.page_width, self.page_height
            )));
        }
        if self.page_gap < 0.0 || self.top_padding < 0.0 || self.tolerance < 0.0 {
            return Err(FolioError::Config(
                "page_gap, top_padding and tolerance must not be negative".to_string(),
            ));
        }
        if self.top_padding >= self.page_height {
            return Err(FolioError::Config(format!(
                "top_padding ({}) must be smaller than page_height ({})",
                self.top_padding, self.page_height
            )));
        }
        Ok(())
    }
}
