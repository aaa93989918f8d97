//! Print layout – the frozen per-page description handed to the PDF
//! renderer. The reflowed document is cut into virtual pages, the gaps
//! between them are dropped, and every item is positioned relative to its
//! page's top-left corner in document pixels.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::FontBook;
use crate::geometry::PageGeometry;
use crate::layout::{BoxContent, PlacedBox};
use crate::style::TextAlign;

/// A complete document ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintLayout {
    pub title: String,
    pub page_width_px: f32,
    pub page_height_px: f32,
    pub pages: Vec<PrintPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintPage {
    pub index: usize,
    pub items: Vec<PrintItem>,
}

/// One paint operation, in page pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrintItem {
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: [f32; 4],
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: [f32; 4],
    },
    Text {
        x: f32,
        /// Top of the line box.
        y: f32,
        width: f32,
        text: String,
        font_size: f32,
        line_height: f32,
        bold: bool,
        italic: bool,
        underline: bool,
        color: [f32; 4],
    },
}

/// Gutter between a list marker and its item's text.
const MARKER_GUTTER_PX: f32 = 12.0;

impl PrintLayout {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Text of every page, one string per page.
    pub fn page_texts(&self) -> Vec<String> {
        self.pages
            .iter()
            .map(|page| {
                page.items
                    .iter()
                    .filter_map(|item| match item {
                        PrintItem::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect()
    }

    /// Slice laid-out boxes into `page_count` pages (more if content runs
    /// past the last one).
    pub fn from_boxes(
        boxes: &[PlacedBox],
        geometry: &PageGeometry,
        page_count: usize,
        title: &str,
        fonts: &FontBook,
    ) -> Self {
        let mut slicer = Slicer {
            geometry,
            pages: (0..page_count.max(1))
                .map(|index| PrintPage {
                    index,
                    items: Vec::new(),
                })
                .collect(),
        };
        for placed in boxes {
            slicer.add_box(placed, fonts);
        }
        log::debug!(
            "print layout: {} boxes over {} pages",
            boxes.len(),
            slicer.pages.len()
        );
        Self {
            title: title.to_string(),
            page_width_px: geometry.page_width,
            page_height_px: geometry.page_height,
            pages: slicer.pages,
        }
    }
}

struct Slicer<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<PrintPage>,
}

impl Slicer<'_> {
    fn page_mut(&mut self, index: usize) -> &mut PrintPage {
        while self.pages.len() <= index {
            let next = self.pages.len();
            self.pages.push(PrintPage {
                index: next,
                items: Vec::new(),
            });
        }
        &mut self.pages[index]
    }

    /// Pages overlapped by the vertical span `[top, bottom)`, with the span
    /// clipped to each page and made page-relative.
    fn spans(&self, top: f32, bottom: f32) -> Vec<(usize, f32, f32)> {
        let g = self.geometry;
        let first = g.page_index(top);
        let last = g.page_index(bottom.max(top));
        (first..=last)
            .filter_map(|i| {
                let start = g.page_start(i);
                let clipped_top = top.max(start);
                let clipped_bottom = bottom.min(g.page_end(i));
                (clipped_bottom > clipped_top).then(|| (i, clipped_top - start, clipped_bottom - start))
            })
            .collect()
    }

    /// Page and page-relative y for a point-like item (a text line).
    /// Lines whose top falls in a gap move to the top of the next page.
    fn locate(&self, y: f32) -> (usize, f32) {
        let g = self.geometry;
        let index = g.page_index(y);
        if y >= g.page_end(index) {
            (index + 1, 0.0)
        } else {
            (index, (y - g.page_start(index)).max(0.0))
        }
    }

    fn add_box(&mut self, placed: &PlacedBox, fonts: &FontBook) {
        let style = &placed.style;
        let (x, top, w, h) = (placed.x, placed.y, placed.width, placed.height);

        if !style.background.is_transparent() && w > 0.0 && h > 0.0 {
            for (page, y1, y2) in self.spans(top, top + h) {
                self.page_mut(page).items.push(PrintItem::Fill {
                    x,
                    y: y1,
                    width: w,
                    height: y2 - y1,
                    color: style.background.to_array(),
                });
            }
        }

        let color = style.border_color.to_array();
        let b = style.border;
        if b.top > 0.0 {
            let (page, y) = self.locate(top + b.top / 2.0);
            self.page_mut(page).items.push(rule(x, y, x + w, y, b.top, color));
        }
        if b.bottom > 0.0 {
            let (page, y) = self.locate(top + h - b.bottom / 2.0);
            self.page_mut(page).items.push(rule(x, y, x + w, y, b.bottom, color));
        }
        for (thickness, edge_x) in [(b.left, x + b.left / 2.0), (b.right, x + w - b.right / 2.0)] {
            if thickness > 0.0 {
                for (page, y1, y2) in self.spans(top, top + h) {
                    self.page_mut(page)
                        .items
                        .push(rule(edge_x, y1, edge_x, y2, thickness, color));
                }
            }
        }

        let BoxContent::Text { lines, line_height } = &placed.content else {
            return;
        };
        let content_x = x + style.padding.left + b.left;
        let content_w = (w - style.padding.horizontal() - b.horizontal()).max(0.0);
        let content_top = top + style.padding.top + b.top;

        for (k, line) in lines.iter().enumerate() {
            let line_top = content_top + k as f32 * line_height;
            let line_w = fonts.measure(line, style);
            let dx = match style.text_align {
                TextAlign::Left => 0.0,
                TextAlign::Center => ((content_w - line_w) / 2.0).max(0.0),
                TextAlign::Right => (content_w - line_w).max(0.0),
            };
            let (page, y) = self.locate(line_top);
            let text = |x: f32, width: f32, text: String, underline: bool| PrintItem::Text {
                x,
                y,
                width,
                text,
                font_size: style.font_size,
                line_height: *line_height,
                bold: style.bold,
                italic: style.italic,
                underline,
                color: style.color.to_array(),
            };
            if k == 0 {
                if let Some(marker) = &placed.marker {
                    let item = text(
                        content_x - MARKER_GUTTER_PX,
                        MARKER_GUTTER_PX,
                        marker.clone(),
                        false,
                    );
                    self.page_mut(page).items.push(item);
                }
            }
            let item = text(content_x + dx, line_w, line.clone(), style.underline);
            self.page_mut(page).items.push(item);
        }
    }
}

fn rule(x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32, color: [f32; 4]) -> PrintItem {
    PrintItem::Rule {
        x1,
        y1,
        x2,
        y2,
        thickness,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, ComputedStyle};

    fn text_box(y: f32, lines: &[&str]) -> PlacedBox {
        let style = ComputedStyle::default();
        let line_height = style.line_height_px();
        PlacedBox {
            element: None,
            x: 10.0,
            y,
            width: 300.0,
            height: lines.len() as f32 * line_height,
            content: BoxContent::Text {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                line_height,
            },
            style,
            marker: None,
        }
    }

    fn slice(boxes: &[PlacedBox], pages: usize) -> PrintLayout {
        PrintLayout::from_boxes(boxes, &PageGeometry::default(), pages, "t", &FontBook::new())
    }

    #[test]
    fn lines_land_on_their_page_without_the_gap() {
        let layout = slice(&[text_box(100.0, &["first"]), text_box(1192.0, &["second"])], 2);
        assert_eq!(layout.page_texts(), vec!["first", "second"]);
        let PrintItem::Text { y, .. } = &layout.pages[1].items[0] else {
            panic!("expected text");
        };
        // 1192 - 1152
        assert_eq!(*y, 40.0);
    }

    #[test]
    fn text_in_a_gap_moves_to_the_next_page() {
        let layout = slice(&[text_box(1130.0, &["orphan"])], 1);
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.page_texts(), vec!["", "orphan"]);
    }

    #[test]
    fn backgrounds_are_clipped_per_page() {
        let mut tall = text_box(1000.0, &[]);
        tall.height = 300.0;
        tall.style.background = Color::rgb(0xdb, 0xea, 0xfe);
        let layout = slice(&[tall], 2);

        let heights: Vec<f32> = layout
            .pages
            .iter()
            .flat_map(|p| p.items.iter())
            .filter_map(|i| match i {
                PrintItem::Fill { height, .. } => Some(*height),
                _ => None,
            })
            .collect();
        // 1000..1122 on page 1, 1152..1300 on page 2.
        assert_eq!(heights, vec![122.0, 148.0]);
    }

    #[test]
    fn markers_sit_in_the_gutter() {
        let mut item = text_box(0.0, &["Led the team"]);
        item.marker = Some("\u{2022}".to_string());
        let layout = slice(&[item], 1);
        let xs: Vec<f32> = layout.pages[0]
            .items
            .iter()
            .filter_map(|i| match i {
                PrintItem::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![10.0 - MARKER_GUTTER_PX, 10.0]);
    }

    #[test]
    fn json_round_trip_keeps_item_kinds() {
        let layout = slice(&[text_box(0.0, &["a"])], 1);
        let json = layout.to_json().unwrap();
        assert!(json.contains("\"kind\": \"text\""));
        assert_eq!(PrintLayout::from_json(&json).unwrap(), layout);
    }
}
