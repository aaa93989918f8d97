//! Pipeline – parse, style, lay out and reflow a template in one call, then
//! report, slice into print pages, render PDF or flatten to text.

use serde::{Deserialize, Serialize};

use crate::config::ReflowConfig;
use crate::dom::{body_children, parse_html};
use crate::error::Result;
use crate::export::to_plain_text;
use crate::fonts::FontBook;
use crate::gaps::{GapAdjustments, GapControl};
use crate::layout::DocumentLayout;
use crate::mask::PageMask;
use crate::pagination::{reflow_pass, InjectedOffset, Placement, ReflowOutcome};
use crate::print_layout::PrintLayout;
use crate::render::render_pdf;
use crate::scanner::{scan_units, AtomicUnit};
use crate::style::{build_styled_tree, StyledNode};

/// Document state as owned by the host: the rendered template plus the
/// user's manual gap adjustments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub adjustments: GapAdjustments,
    /// Whether manual gap controls are exposed.
    #[serde(default)]
    pub adjustment_mode: bool,
}

impl DocumentState {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }
}

/// What the host UI needs after a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationReport {
    pub page_count: usize,
    pub offsets: Vec<InjectedOffset>,
    pub units: Vec<AtomicUnit>,
    pub placements: Vec<Placement>,
    /// Height of the reflowed document, offsets included.
    pub document_height: f32,
    pub mask: PageMask,
    /// Adjustable gaps; empty unless adjustment mode is on.
    pub gap_controls: Vec<GapControl>,
}

impl PaginationReport {
    /// Report for "no document yet".
    pub fn empty(config: &ReflowConfig) -> Self {
        Self {
            page_count: 1,
            offsets: Vec::new(),
            units: Vec::new(),
            placements: Vec::new(),
            document_height: 0.0,
            mask: PageMask::new(1, config.geometry.page_height, config.geometry.page_gap),
            gap_controls: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A document after one reflow pass, with its live layout.
pub struct Reflowed {
    pub styled: Vec<StyledNode>,
    pub units: Vec<AtomicUnit>,
    pub layout: DocumentLayout,
    pub outcome: ReflowOutcome,
}

impl Reflowed {
    pub fn report(&self, config: &ReflowConfig, doc: &DocumentState) -> PaginationReport {
        let g = &config.geometry;
        PaginationReport {
            page_count: self.outcome.page_count,
            offsets: self.outcome.offsets.clone(),
            units: self.units.clone(),
            placements: self.outcome.placements.clone(),
            document_height: self.outcome.scroll_height,
            mask: PageMask::new(self.outcome.page_count, g.page_height, g.page_gap),
            gap_controls: if doc.adjustment_mode {
                doc.adjustments.controls(&self.styled)
            } else {
                Vec::new()
            },
        }
    }

    /// Slice the reflowed layout into print pages.
    pub fn print_layout(&mut self, config: &ReflowConfig, fonts: &FontBook) -> Result<PrintLayout> {
        let boxes = self.layout.placed_boxes()?;
        Ok(PrintLayout::from_boxes(
            &boxes,
            &config.geometry,
            self.outcome.page_count,
            &config.title,
            fonts,
        ))
    }
}

/// Styled tree of a template with the document's gap adjustments applied.
pub fn style_document(doc: &DocumentState) -> Vec<StyledNode> {
    let dom = body_children(&parse_html(&doc.html));
    let mut styled = build_styled_tree(&dom, None);
    let applied = doc.adjustments.apply(&mut styled);
    if applied > 0 {
        log::debug!("applied {applied} gap adjustments");
    }
    styled
}

/// Parse, style, lay out at page width and run one reflow pass.
pub fn reflow(doc: &DocumentState, config: &ReflowConfig, fonts: &FontBook) -> Result<Reflowed> {
    config.validate()?;
    let styled = style_document(doc);
    let units = scan_units(&styled);
    let mut layout = DocumentLayout::build(&styled, config.geometry.page_width, fonts)?;
    let outcome = reflow_pass(&mut layout, &units, &config.geometry);
    Ok(Reflowed {
        styled,
        units,
        layout,
        outcome,
    })
}

/// Page count, offsets and mask for a document.
pub fn paginate(doc: &DocumentState, config: &ReflowConfig) -> Result<PaginationReport> {
    let reflowed = reflow(doc, config, &config.font_book())?;
    Ok(reflowed.report(config, doc))
}

/// The frozen per-page layout, without rendering it.
pub fn build_print_layout(doc: &DocumentState, config: &ReflowConfig) -> Result<PrintLayout> {
    let fonts = config.font_book();
    reflow(doc, config, &fonts)?.print_layout(config, &fonts)
}

/// Full pipeline: document → PDF bytes, one PDF page per virtual page.
///
/// Returns `(pdf_bytes, print_layout)`.
pub fn export_pdf(doc: &DocumentState, config: &ReflowConfig) -> Result<(Vec<u8>, PrintLayout)> {
    let layout = build_print_layout(doc, config)?;
    let bytes = render_pdf(&layout)?;
    Ok((bytes, layout))
}

/// Plain-text flattening for clipboard copy.
pub fn export_text(doc: &DocumentState) -> String {
    to_plain_text(&style_document(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{classic_template, long_template};

    #[test]
    fn short_resume_is_one_page() {
        let report = paginate(&DocumentState::new(classic_template()), &ReflowConfig::default()).unwrap();
        assert_eq!(report.page_count, 1);
        assert!(report.offsets.is_empty());
        assert!(!report.units.is_empty());
        assert!(report.gap_controls.is_empty());
    }

    #[test]
    fn long_resume_gets_pushed_units() {
        let report = paginate(&DocumentState::new(long_template()), &ReflowConfig::default()).unwrap();
        assert!(report.page_count >= 2, "got {} pages", report.page_count);
        assert!(!report.offsets.is_empty());
        assert_eq!(report.mask.page_count, report.page_count);
    }

    #[test]
    fn pdf_has_one_page_per_virtual_page() {
        let config = ReflowConfig::default();
        let doc = DocumentState::new(long_template());
        let report = paginate(&doc, &config).unwrap();
        let (bytes, layout) = export_pdf(&doc, &config).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(layout.pages.len(), report.page_count);
        assert_eq!(layout.page_width_px, 794.0);
    }

    #[test]
    fn gap_controls_follow_adjustment_mode() {
        let mut doc = DocumentState::new(classic_template());
        doc.adjustment_mode = true;
        let report = paginate(&doc, &ReflowConfig::default()).unwrap();
        let names: Vec<_> = report.gap_controls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["summary", "experience", "education", "skills"]);
    }

    #[test]
    fn text_export_flattens_the_template() {
        let text = export_text(&DocumentState::new(classic_template()));
        assert!(text.starts_with("Jane Doe\n"));
        assert!(text.contains("- Led the migration of settlement"));
    }
}
