//! Page mask: hides the gaps between virtual pages so the continuous
//! document reads as a stack of sheets.

use serde::{Deserialize, Serialize};

/// Visible vertical band of one page, in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub top: f32,
    pub bottom: f32,
}

/// Mask for `page_count` pages of `page_height` separated by `page_gap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMask {
    pub page_count: usize,
    pub page_height: f32,
    pub page_gap: f32,
    /// Height of the page stack: every page plus the gaps between them.
    pub total_height: f32,
    /// CSS `mask-image` value.
    pub css: String,
}

impl PageMask {
    pub fn new(page_count: usize, page_height: f32, page_gap: f32) -> Self {
        let page_count = page_count.max(1);
        let page_height = page_height.max(0.0);
        let page_gap = page_gap.max(0.0);
        let total_height =
            page_count as f32 * page_height + (page_count - 1) as f32 * page_gap;
        let stride = page_height + page_gap;
        let css = format!(
            "repeating-linear-gradient(to bottom, #000 0px, #000 {page_height}px, transparent {page_height}px, transparent {stride}px)"
        );
        Self {
            page_count,
            page_height,
            page_gap,
            total_height,
            css,
        }
    }

    pub fn visible_bands(&self) -> Vec<Band> {
        let stride = self.page_height + self.page_gap;
        (0..self.page_count)
            .map(|i| {
                let top = i as f32 * stride;
                Band {
                    top,
                    bottom: top + self.page_height,
                }
            })
            .collect()
    }

    /// Whether document position `y` falls in a gap (or past the last page).
    pub fn is_hidden(&self, y: f32) -> bool {
        !self
            .visible_bands()
            .iter()
            .any(|b| y >= b.top && y < b.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_and_height() {
        let mask = PageMask::new(3, 1122.0, 30.0);
        assert_eq!(mask.total_height, 3.0 * 1122.0 + 2.0 * 30.0);
        let bands = mask.visible_bands();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[1], Band { top: 1152.0, bottom: 2274.0 });
        assert!(mask.is_hidden(1130.0));
        assert!(!mask.is_hidden(1152.0));
    }

    #[test]
    fn css_repeats_every_stride() {
        let mask = PageMask::new(2, 1122.0, 30.0);
        assert_eq!(
            mask.css,
            "repeating-linear-gradient(to bottom, #000 0px, #000 1122px, transparent 1122px, transparent 1152px)"
        );
    }

    #[test]
    fn zero_pages_render_as_one() {
        let mask = PageMask::new(0, 1122.0, 30.0);
        assert_eq!(mask.page_count, 1);
        assert_eq!(mask.total_height, 1122.0);
    }
}
