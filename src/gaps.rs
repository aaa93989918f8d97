//! Manual gap adjustments.
//!
//! In adjustment mode the user can nudge named spacings of a template (any
//! element carrying `data-gap="<name>"`). The values belong to the document
//! state and are applied as extra top margin when the template is styled,
//! independently of the offsets the injector computes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::style::StyledNode;

/// Attribute naming an adjustable gap.
pub const GAP_ATTR: &str = "data-gap";
pub const DEFAULT_GAP_STEP_PX: f32 = 4.0;
pub const DEFAULT_MAX_GAP_PX: f32 = 200.0;

/// Gap name → extra pixels. Serialises as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GapAdjustments {
    values: BTreeMap<String, f32>,
}

/// One adjustable gap as exposed to the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapControl {
    pub name: String,
    pub value_px: f32,
}

impl GapAdjustments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, name: &str) -> f32 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    /// Store `px` clamped to `±limit`; zero removes the entry. Returns the
    /// stored value.
    pub fn set(&mut self, name: &str, px: f32, limit: f32) -> f32 {
        let limit = limit.abs();
        let value = if px.is_finite() { px.clamp(-limit, limit) } else { 0.0 };
        if value == 0.0 {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
        value
    }

    pub fn adjust(&mut self, name: &str, delta: f32, limit: f32) -> f32 {
        self.set(name, self.get(name) + delta, limit)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Add each adjustment to the top margin of the elements naming it.
    /// Returns how many elements were adjusted.
    pub fn apply(&self, nodes: &mut [StyledNode]) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let mut applied = 0;
        for node in nodes {
            applied += self.apply_node(node);
        }
        applied
    }

    fn apply_node(&self, node: &mut StyledNode) -> usize {
        let StyledNode::Element {
            style,
            attrs,
            children,
            ..
        } = node
        else {
            return 0;
        };
        let mut applied = 0;
        if let Some(px) = attrs.get(GAP_ATTR).and_then(|name| self.values.get(name)) {
            style.margin.top += *px;
            applied += 1;
        }
        for child in children {
            applied += self.apply_node(child);
        }
        applied
    }

    /// Controls for every gap named in the document, in document order.
    pub fn controls(&self, nodes: &[StyledNode]) -> Vec<GapControl> {
        gap_names(nodes)
            .into_iter()
            .map(|name| GapControl {
                value_px: self.get(&name),
                name,
            })
            .collect()
    }
}

/// Distinct `data-gap` names in document order.
pub fn gap_names(nodes: &[StyledNode]) -> Vec<String> {
    fn walk(node: &StyledNode, out: &mut Vec<String>) {
        if let StyledNode::Element { children, .. } = node {
            if let Some(name) = node.attr(GAP_ATTR) {
                if !out.iter().any(|n| n == name) {
                    out.push(name.to_string());
                }
            }
            for child in children {
                walk(child, out);
            }
        }
    }
    let mut out = Vec::new();
    for node in nodes {
        walk(node, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::style::build_styled_tree;

    #[test]
    fn adjust_steps_and_clamps() {
        let mut gaps = GapAdjustments::new();
        assert_eq!(gaps.adjust("summary", DEFAULT_GAP_STEP_PX, DEFAULT_MAX_GAP_PX), 4.0);
        assert_eq!(gaps.adjust("summary", DEFAULT_GAP_STEP_PX, DEFAULT_MAX_GAP_PX), 8.0);
        assert_eq!(gaps.adjust("summary", 500.0, DEFAULT_MAX_GAP_PX), 200.0);
        assert_eq!(gaps.adjust("summary", -1000.0, DEFAULT_MAX_GAP_PX), -200.0);
        assert_eq!(gaps.set("summary", 0.0, DEFAULT_MAX_GAP_PX), 0.0);
        assert!(gaps.is_empty());
    }

    #[test]
    fn json_is_a_plain_map() {
        let gaps = GapAdjustments::from_json(r#"{"experience": 12, "skills": -4}"#).unwrap();
        assert_eq!(gaps.get("experience"), 12.0);
        assert_eq!(gaps.get("skills"), -4.0);
        assert_eq!(gaps.get("missing"), 0.0);
        let back = GapAdjustments::from_json(&gaps.to_json().unwrap()).unwrap();
        assert_eq!(back, gaps);
    }

    #[test]
    fn applied_as_extra_top_margin() {
        let mut styled = build_styled_tree(
            &parse_html(r#"<div data-gap="experience" class="mt-2"><p>x</p></div><div data-gap="skills">y</div>"#),
            None,
        );
        let mut gaps = GapAdjustments::new();
        gaps.set("experience", 10.0, DEFAULT_MAX_GAP_PX);

        assert_eq!(gaps.apply(&mut styled), 1);
        assert_eq!(styled[0].style().margin.top, 18.0);
        assert_eq!(styled[1].style().margin.top, 0.0);

        let controls = gaps.controls(&styled);
        assert_eq!(
            controls,
            vec![
                GapControl { name: "experience".into(), value_px: 10.0 },
                GapControl { name: "skills".into(), value_px: 0.0 },
            ]
        );
    }
}
