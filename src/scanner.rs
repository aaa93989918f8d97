//! Atomic-unit scanner.
//!
//! Finds the elements that must never be split across a page boundary, in
//! document order. A unit is atomic through an explicit `data-unit`
//! attribute, a role class used by the templates, or by being a generic
//! text block. Atomic elements are not searched further.

use serde::{Deserialize, Serialize};

use crate::dom::{ElementId, Tag};
use crate::style::{Display, StyledNode};

/// Longest label kept for logs and reports.
const LABEL_CHARS: usize = 48;

/// Semantic role of an atomic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRole {
    SectionHeading,
    EntryHeader,
    DescriptionLine,
    SkillChip,
    TextBlock,
}

impl UnitRole {
    /// Role named by a `data-unit` attribute.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "heading" => Some(Self::SectionHeading),
            "entry" => Some(Self::EntryHeader),
            "line" => Some(Self::DescriptionLine),
            "chip" => Some(Self::SkillChip),
            "block" => Some(Self::TextBlock),
            _ => None,
        }
    }

    fn from_class(class: &str) -> Option<Self> {
        match class {
            "section-heading" | "section-title" => Some(Self::SectionHeading),
            "entry-header" => Some(Self::EntryHeader),
            "desc-line" | "bullet" => Some(Self::DescriptionLine),
            "skill-chip" | "tag" => Some(Self::SkillChip),
            _ => None,
        }
    }

    /// Role of `node` if it is atomic, ignoring visibility.
    pub fn classify(node: &StyledNode) -> Option<Self> {
        let StyledNode::Element { tag, .. } = node else {
            return None;
        };
        if let Some(role) = node.attr("data-unit").and_then(Self::from_attr) {
            return Some(role);
        }
        let from_class = node
            .attr("class")
            .and_then(|classes| classes.split_whitespace().find_map(Self::from_class));
        if from_class.is_some() {
            return from_class;
        }
        matches!(tag, Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::H5 | Tag::H6 | Tag::P | Tag::Li)
            .then_some(Self::TextBlock)
    }
}

/// An element that is moved as a whole. Its box is measured fresh on every
/// pass and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicUnit {
    pub id: ElementId,
    pub role: UnitRole,
    /// Leading text, for diagnostics.
    pub label: String,
}

/// Atomic units of `nodes`, depth-first in document order.
pub fn scan_units(nodes: &[StyledNode]) -> Vec<AtomicUnit> {
    let mut units = Vec::new();
    for node in nodes {
        scan_node(node, &mut units);
    }
    log::trace!("scanned {} atomic units", units.len());
    units
}

fn scan_node(node: &StyledNode, units: &mut Vec<AtomicUnit>) {
    let StyledNode::Element {
        id,
        style,
        children,
        ..
    } = node
    else {
        return;
    };
    if style.display == Display::None {
        return;
    }
    if let Some(role) = UnitRole::classify(node) {
        units.push(AtomicUnit {
            id: *id,
            role,
            label: node.text_content().chars().take(LABEL_CHARS).collect(),
        });
        return;
    }
    for child in children {
        scan_node(child, units);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::style::build_styled_tree;

    fn scan(html: &str) -> Vec<AtomicUnit> {
        scan_units(&build_styled_tree(&parse_html(html), None))
    }

    fn roles(units: &[AtomicUnit]) -> Vec<UnitRole> {
        units.iter().map(|u| u.role).collect()
    }

    #[test]
    fn roles_from_classes_and_tags() {
        let units = scan(
            r#"<section>
                 <h2 class="section-heading">Experience</h2>
                 <div class="entry-header"><span>Engineer</span><span>2021</span></div>
                 <ul><li class="bullet">Shipped things</li><li>Plain item</li></ul>
                 <div><span class="skill-chip">Rust</span><span class="tag">SQL</span></div>
                 <p>Summary text</p>
               </section>"#,
        );
        assert_eq!(
            roles(&units),
            vec![
                UnitRole::SectionHeading,
                UnitRole::EntryHeader,
                UnitRole::DescriptionLine,
                UnitRole::TextBlock,
                UnitRole::SkillChip,
                UnitRole::SkillChip,
                UnitRole::TextBlock,
            ]
        );
        assert_eq!(units[1].label, "Engineer 2021");
    }

    #[test]
    fn units_come_in_document_order() {
        let units = scan("<div><p>a</p><div><p>b</p></div><p>c</p></div>");
        let labels: Vec<_> = units.iter().map(|u| u.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert!(units.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn data_unit_attribute_wins() {
        let units = scan(r#"<div data-unit="entry" class="bullet"><p>x</p></div>"#);
        assert_eq!(roles(&units), vec![UnitRole::EntryHeader]);
    }

    #[test]
    fn atomic_elements_are_not_descended() {
        let units = scan(r#"<div class="entry-header"><h3>Title</h3><p>Company</p></div>"#);
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let units = scan(r#"<div class="hidden"><p>gone</p></div><p hidden>gone</p><p>kept</p>"#);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].label, "kept");
    }

    #[test]
    fn empty_document_has_no_units() {
        assert!(scan("").is_empty());
        assert!(scan("<div><span>inline only</span></div>").is_empty());
    }
}
