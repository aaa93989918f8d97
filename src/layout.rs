//! Layout engine – lays the styled tree out with Taffy at the page width and
//! keeps the tree alive so units can be measured, nudged and re-measured.

use std::collections::HashMap;
use taffy::prelude::*;

use crate::dom::{ElementId, Tag};
use crate::error::Result;
use crate::fonts::{wrap_text, FontBook};
use crate::oracle::{LayoutOracle, UnitBox};
use crate::scanner::UnitRole;
use crate::style::{self, ComputedStyle, StyledNode};

/// Painted content of a box.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    None,
    Text { lines: Vec<String>, line_height: f32 },
}

/// A box in document coordinates after layout (offsets included).
#[derive(Debug, Clone)]
pub struct PlacedBox {
    pub element: Option<ElementId>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: ComputedStyle,
    pub content: BoxContent,
    /// List marker drawn in the left gutter.
    pub marker: Option<String>,
}

// ---------------------------------------------------------------------------
// Build Taffy tree from styled nodes
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontBook,
    nodes: HashMap<ElementId, NodeId>,
    elements: HashMap<NodeId, ElementId>,
    styles: HashMap<NodeId, ComputedStyle>,
    content: HashMap<NodeId, BoxContent>,
    markers: HashMap<NodeId, String>,
    base_margin_top: HashMap<NodeId, f32>,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontBook) -> Self {
        let mut taffy = TaffyTree::new();
        // Measurements must stay in fractional document pixels.
        taffy.disable_rounding();
        Self {
            taffy,
            fonts,
            nodes: HashMap::new(),
            elements: HashMap::new(),
            styles: HashMap::new(),
            content: HashMap::new(),
            markers: HashMap::new(),
            base_margin_top: HashMap::new(),
        }
    }

    /// Text of an inline subtree with `<br>` read as a space.
    fn collect_inline_text(node: &StyledNode) -> String {
        match node {
            StyledNode::Text { text, .. } => text.clone(),
            StyledNode::Element { tag: Tag::Br, .. } => " ".to_string(),
            StyledNode::Element { style, .. } if style.display == style::Display::None => {
                String::new()
            }
            StyledNode::Element { children, .. } => {
                children.iter().map(Self::collect_inline_text).collect()
            }
        }
    }

    /// True when no child is block-level.
    fn all_inline(children: &[StyledNode]) -> bool {
        children.iter().all(|c| match c {
            StyledNode::Text { .. } => true,
            StyledNode::Element {
                style,
                children: gc,
                ..
            } => {
                matches!(style.display, style::Display::Inline | style::Display::None)
                    && Self::all_inline(gc)
            }
        })
    }

    /// True when an inline subtree holds atomic units (chips in a row) that
    /// need boxes of their own.
    fn holds_units(children: &[StyledNode]) -> bool {
        children.iter().any(|c| match c {
            StyledNode::Text { .. } => false,
            StyledNode::Element { style, .. } if style.display == style::Display::None => false,
            StyledNode::Element { children: gc, .. } => {
                UnitRole::classify(c).is_some() || Self::holds_units(gc)
            }
        })
    }

    fn is_visible(node: &StyledNode) -> bool {
        match node {
            StyledNode::Text { text, .. } => !text.trim().is_empty(),
            StyledNode::Element { style, .. } => style.display != style::Display::None,
        }
    }

    fn register(&mut self, node: NodeId, id: Option<ElementId>, style: &ComputedStyle) {
        if let Some(id) = id {
            self.nodes.insert(id, node);
            self.elements.insert(node, id);
        }
        self.base_margin_top.insert(node, style.margin.top);
        self.styles.insert(node, style.clone());
    }

    fn build_node(&mut self, styled: &StyledNode, avail: f32, in_row: bool) -> Result<Option<NodeId>> {
        if !Self::is_visible(styled) {
            return Ok(None);
        }
        match styled {
            StyledNode::Text { text, style } => {
                let normalised = text.split_whitespace().collect::<Vec<_>>().join(" ");
                self.text_leaf(None, &normalised, style, avail, true).map(Some)
            }
            StyledNode::Element {
                id,
                tag,
                style,
                children,
                ..
            } => {
                // Blocks holding only inline content become one wrapped text
                // leaf so that runs flow together.
                let text_container =
                    matches!(style.display, style::Display::Block | style::Display::Inline);
                if text_container && !children.is_empty() && Self::all_inline(children) {
                    if UnitRole::classify(styled).is_none() && Self::holds_units(children) {
                        return self.inline_row(*id, style, children, avail).map(Some);
                    }
                    let raw: String = children.iter().map(Self::collect_inline_text).collect();
                    let combined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !combined.is_empty() {
                        let shrink = in_row || style.display == style::Display::Inline;
                        return self
                            .text_leaf(Some(*id), &combined, style, avail, shrink)
                            .map(Some);
                    }
                }
                self.container(*id, tag, style, children, avail).map(Some)
            }
        }
    }

    fn text_leaf(
        &mut self,
        id: Option<ElementId>,
        text: &str,
        style: &ComputedStyle,
        avail: f32,
        shrink_wrap: bool,
    ) -> Result<NodeId> {
        let text = if style.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        let chrome_h = style.padding.horizontal() + style.border.horizontal();
        let chrome_v =
            style.padding.top + style.padding.bottom + style.border.top + style.border.bottom;
        let explicit = style.width.resolve(avail);
        let wrap_width = (explicit.unwrap_or(avail) - chrome_h).max(1.0);

        let lines = wrap_text(&text, style, wrap_width, self.fonts);
        let text_width = lines
            .iter()
            .map(|l| self.fonts.measure(l, style))
            .fold(0.0f32, f32::max);
        let line_height = style.line_height_px();

        let mut ts = to_taffy(style);
        ts.size = Size {
            width: match explicit {
                Some(w) => Dimension::Length(w),
                None if shrink_wrap => Dimension::Length(text_width + chrome_h),
                None => Dimension::Auto,
            },
            height: Dimension::Length(lines.len() as f32 * line_height + chrome_v),
        };

        let node = self.taffy.new_leaf(ts)?;
        self.register(node, id, style);
        self.content
            .insert(node, BoxContent::Text { lines, line_height });
        Ok(node)
    }

    /// Inline content laid out as a wrapping row, one box per child, so
    /// each atomic child can be measured and pushed on its own.
    fn inline_row(
        &mut self,
        id: ElementId,
        style: &ComputedStyle,
        children: &[StyledNode],
        avail: f32,
    ) -> Result<NodeId> {
        let own = style.width.resolve(avail).unwrap_or(avail);
        let inner = (own - style.padding.horizontal() - style.border.horizontal()).max(1.0);

        let mut child_nodes = Vec::new();
        for child in children {
            if let Some(node) = self.build_node(child, inner, true)? {
                child_nodes.push(node);
            }
        }

        let mut ts = to_taffy(style);
        ts.display = taffy::Display::Flex;
        ts.flex_direction = taffy::FlexDirection::Row;
        ts.flex_wrap = taffy::FlexWrap::Wrap;
        ts.align_items = Some(taffy::AlignItems::Start);
        let node = self.taffy.new_with_children(ts, &child_nodes)?;
        self.register(node, Some(id), style);
        Ok(node)
    }

    fn container(
        &mut self,
        id: ElementId,
        tag: &Tag,
        style: &ComputedStyle,
        children: &[StyledNode],
        avail: f32,
    ) -> Result<NodeId> {
        let own = style.width.resolve(avail).unwrap_or(avail);
        let inner = (own - style.padding.horizontal() - style.border.horizontal()).max(1.0);

        let visible: Vec<&StyledNode> = children.iter().filter(|c| Self::is_visible(c)).collect();
        let is_row = style.display == style::Display::Flex
            && style.flex_direction == style::FlexDirection::Row;
        let columns = match style.display {
            style::Display::Grid => style.grid_columns.max(1),
            _ if is_row => visible.len().max(1),
            _ => 1,
        };
        // Estimated track width so text wraps to its column at build time.
        let child_width = if columns > 1 {
            ((inner - style.gap * (columns - 1) as f32) / columns as f32).max(1.0)
        } else {
            inner
        };
        let child_in_row = is_row || style.display == style::Display::Grid;

        let mut child_nodes = Vec::with_capacity(visible.len());
        let mut list_counter = 0u32;
        for child in visible {
            let marker = match child {
                StyledNode::Element { tag: Tag::Li, .. } => {
                    list_counter += 1;
                    match tag {
                        Tag::Ol => Some(format!("{list_counter}.")),
                        Tag::Ul => Some("\u{2022}".to_string()),
                        _ => None,
                    }
                }
                _ => None,
            };
            if let Some(node) = self.build_node(child, child_width, child_in_row)? {
                if let Some(marker) = marker {
                    self.markers.insert(node, marker);
                }
                child_nodes.push(node);
            }
        }

        let node = self.taffy.new_with_children(to_taffy(style), &child_nodes)?;
        self.register(node, Some(id), style);
        Ok(node)
    }
}

fn dim(length: style::Length) -> Dimension {
    match length {
        style::Length::Auto => Dimension::Auto,
        style::Length::Px(v) => Dimension::Length(v),
        style::Length::Percent(v) => Dimension::Percent(v / 100.0),
    }
}

fn to_taffy(s: &ComputedStyle) -> Style {
    let mut ts = Style::default();

    match s.display {
        style::Display::Flex => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = match s.flex_direction {
                style::FlexDirection::Row => taffy::FlexDirection::Row,
                style::FlexDirection::Column => taffy::FlexDirection::Column,
            };
            ts.flex_wrap = if s.flex_wrap {
                taffy::FlexWrap::Wrap
            } else {
                taffy::FlexWrap::NoWrap
            };
            ts.justify_content = Some(match s.justify {
                style::Justify::Start => taffy::JustifyContent::Start,
                style::Justify::End => taffy::JustifyContent::End,
                style::Justify::Center => taffy::JustifyContent::Center,
                style::Justify::SpaceBetween => taffy::JustifyContent::SpaceBetween,
            });
            ts.align_items = Some(match s.align {
                style::Align::Start => taffy::AlignItems::Start,
                style::Align::End => taffy::AlignItems::End,
                style::Align::Center => taffy::AlignItems::Center,
                style::Align::Stretch => taffy::AlignItems::Stretch,
            });
        }
        style::Display::Grid => {
            ts.display = taffy::Display::Grid;
            let cols = s.grid_columns.max(1);
            ts.grid_template_columns = vec![taffy::TrackSizingFunction::from_flex(1.0); cols];
        }
        // Blocks stack vertically; a lone inline box is laid out the same way.
        style::Display::Block | style::Display::Inline | style::Display::None => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Column;
        }
    }

    ts.size = Size {
        width: dim(s.width),
        height: dim(s.height),
    };
    ts.max_size = Size {
        width: dim(s.max_width),
        height: Dimension::Auto,
    };
    ts.flex_grow = s.flex_grow;
    if s.flex_grow > 0.0 {
        ts.flex_basis = Dimension::Length(0.0);
        ts.min_size.width = Dimension::Length(0.0);
    }

    ts.margin = Rect {
        top: LengthPercentageAuto::Length(s.margin.top),
        right: LengthPercentageAuto::Length(s.margin.right),
        bottom: LengthPercentageAuto::Length(s.margin.bottom),
        left: LengthPercentageAuto::Length(s.margin.left),
    };
    ts.padding = Rect {
        top: LengthPercentage::Length(s.padding.top),
        right: LengthPercentage::Length(s.padding.right),
        bottom: LengthPercentage::Length(s.padding.bottom),
        left: LengthPercentage::Length(s.padding.left),
    };
    ts.border = Rect {
        top: LengthPercentage::Length(s.border.top),
        right: LengthPercentage::Length(s.border.right),
        bottom: LengthPercentage::Length(s.border.bottom),
        left: LengthPercentage::Length(s.border.left),
    };
    ts.gap = Size {
        width: LengthPercentage::Length(s.gap),
        height: LengthPercentage::Length(s.gap),
    };
    ts
}

// ---------------------------------------------------------------------------
// Live document layout
// ---------------------------------------------------------------------------

/// The laid-out document at unscaled page width.
///
/// Injected offsets are applied as extra top margin on the unit's node, so
/// the unit and everything after it in flow moves down. Layout is recomputed
/// lazily on the next measurement after any change.
pub struct DocumentLayout {
    taffy: TaffyTree<()>,
    root: NodeId,
    width: f32,
    nodes: HashMap<ElementId, NodeId>,
    elements: HashMap<NodeId, ElementId>,
    styles: HashMap<NodeId, ComputedStyle>,
    content: HashMap<NodeId, BoxContent>,
    markers: HashMap<NodeId, String>,
    base_margin_top: HashMap<NodeId, f32>,
    offsets: HashMap<ElementId, f32>,
    stale: bool,
}

impl std::fmt::Debug for DocumentLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLayout")
            .field("width", &self.width)
            .field("elements", &self.nodes.len())
            .field("offsets", &self.offsets)
            .finish()
    }
}

impl DocumentLayout {
    /// Lay out `styled` in a column `width` px wide.
    pub fn build(styled: &[StyledNode], width: f32, fonts: &FontBook) -> Result<Self> {
        let mut builder = LayoutBuilder::new(fonts);
        let mut child_ids = Vec::new();
        for node in styled {
            if let Some(id) = builder.build_node(node, width, false)? {
                child_ids.push(id);
            }
        }

        let root_style = Style {
            display: taffy::Display::Flex,
            flex_direction: taffy::FlexDirection::Column,
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Auto,
            },
            ..Default::default()
        };
        let root = builder.taffy.new_with_children(root_style, &child_ids)?;

        let mut layout = Self {
            taffy: builder.taffy,
            root,
            width,
            nodes: builder.nodes,
            elements: builder.elements,
            styles: builder.styles,
            content: builder.content,
            markers: builder.markers,
            base_margin_top: builder.base_margin_top,
            offsets: HashMap::new(),
            stale: true,
        };
        layout.refresh()?;
        log::debug!(
            "laid out {} elements at {}px, height {}px",
            layout.nodes.len(),
            width,
            layout.height()
        );
        Ok(layout)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Whether `id` produced a box (hidden and inline-merged elements do not).
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn offset(&self, id: ElementId) -> f32 {
        self.offsets.get(&id).copied().unwrap_or(0.0)
    }

    /// Currently injected offsets, by element.
    pub fn offsets(&self) -> &HashMap<ElementId, f32> {
        &self.offsets
    }

    /// Remove every injected offset.
    pub fn clear_offsets(&mut self) {
        let ids: Vec<ElementId> = self.offsets.keys().copied().collect();
        for id in ids {
            self.set_offset(id, 0.0);
        }
    }

    /// Recompute the layout if anything changed since the last computation.
    pub fn refresh(&mut self) -> Result<()> {
        if self.stale {
            self.taffy.compute_layout(
                self.root,
                Size {
                    width: AvailableSpace::Definite(self.width),
                    height: AvailableSpace::MaxContent,
                },
            )?;
            self.stale = false;
        }
        Ok(())
    }

    fn height(&self) -> f32 {
        self.taffy.layout(self.root).map_or(0.0, |l| l.size.height)
    }

    /// Document-space origin of `node`.
    fn origin(&self, node: NodeId) -> (f32, f32) {
        let (mut x, mut y) = (0.0, 0.0);
        let mut current = Some(node);
        while let Some(n) = current {
            if let Ok(l) = self.taffy.layout(n) {
                x += l.location.x;
                y += l.location.y;
            }
            current = self.taffy.parent(n);
        }
        (x, y)
    }

    /// Every box in document order, parents before children.
    pub fn placed_boxes(&mut self) -> Result<Vec<PlacedBox>> {
        self.refresh()?;
        let mut out = Vec::new();
        for child in self.taffy.children(self.root)? {
            self.collect(child, 0.0, 0.0, &mut out);
        }
        Ok(out)
    }

    fn collect(&self, node: NodeId, ox: f32, oy: f32, out: &mut Vec<PlacedBox>) {
        let Ok(layout) = self.taffy.layout(node) else {
            return;
        };
        let x = ox + layout.location.x;
        let y = oy + layout.location.y;
        out.push(PlacedBox {
            element: self.elements.get(&node).copied(),
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            style: self.styles.get(&node).cloned().unwrap_or_default(),
            content: self.content.get(&node).cloned().unwrap_or(BoxContent::None),
            marker: self.markers.get(&node).cloned(),
        });
        for child in self.taffy.children(node).unwrap_or_default() {
            self.collect(child, x, y, out);
        }
    }
}

impl LayoutOracle for DocumentLayout {
    fn measure(&mut self, unit: ElementId) -> Option<UnitBox> {
        let node = *self.nodes.get(&unit)?;
        if let Err(err) = self.refresh() {
            log::warn!("layout failed while measuring {unit:?}: {err}");
            return None;
        }
        let (_, top) = self.origin(node);
        let height = self.taffy.layout(node).ok()?.size.height;
        Some(UnitBox::new(top, height))
    }

    fn set_offset(&mut self, unit: ElementId, offset: f32) {
        let Some(&node) = self.nodes.get(&unit) else {
            return;
        };
        let base = self.base_margin_top.get(&node).copied().unwrap_or(0.0);
        let Ok(current) = self.taffy.style(node) else {
            return;
        };
        let mut updated = current.clone();
        updated.margin.top = LengthPercentageAuto::Length(base + offset);
        if let Err(err) = self.taffy.set_style(node, updated) {
            log::warn!("cannot offset {unit:?}: {err}");
            return;
        }
        if offset == 0.0 {
            self.offsets.remove(&unit);
        } else {
            self.offsets.insert(unit, offset);
        }
        self.stale = true;
    }

    fn scroll_height(&mut self) -> f32 {
        if let Err(err) = self.refresh() {
            log::warn!("layout failed while measuring document height: {err}");
        }
        self.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::style::build_styled_tree;

    fn layout(html: &str, width: f32) -> DocumentLayout {
        let styled = build_styled_tree(&parse_html(html), None);
        DocumentLayout::build(&styled, width, &FontBook::new()).unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn paragraph_is_one_line_box() {
        let mut doc = layout("<p>Hello world</p>", 794.0);
        let b = doc.measure(ElementId(0)).unwrap();
        assert!(approx(b.top, 0.0));
        // 14px × 1.4 line height
        assert!(approx(b.height, 19.6), "height was {}", b.height);
    }

    #[test]
    fn offsets_move_the_unit_and_what_follows() {
        let mut doc = layout("<div><p>One</p><p>Two</p></div>", 794.0);
        let before = doc.measure(ElementId(2)).unwrap();
        assert!(approx(before.top, 23.6), "second paragraph at {}", before.top);
        let height_before = doc.scroll_height();

        doc.set_offset(ElementId(1), 100.0);
        assert!(approx(doc.measure(ElementId(1)).unwrap().top, 100.0));
        assert!(approx(doc.measure(ElementId(2)).unwrap().top, 123.6));
        assert!(approx(doc.scroll_height(), height_before + 100.0));

        doc.clear_offsets();
        assert!(approx(doc.measure(ElementId(2)).unwrap().top, 23.6));
        assert!(doc.offsets().is_empty());
    }

    #[test]
    fn offsets_stack_on_existing_margins() {
        let mut doc = layout(r#"<p>a</p><p class="mt-4">b</p>"#, 794.0);
        let natural = doc.measure(ElementId(1)).unwrap().top;
        doc.set_offset(ElementId(1), 10.0);
        assert!(approx(doc.measure(ElementId(1)).unwrap().top, natural + 10.0));
        doc.set_offset(ElementId(1), 4.0);
        assert!(approx(doc.measure(ElementId(1)).unwrap().top, natural + 4.0));
    }

    #[test]
    fn hidden_and_merged_elements_have_no_box() {
        let mut doc = layout(r#"<p hidden>gone</p><p>kept <strong>bold</strong></p>"#, 794.0);
        assert_eq!(doc.measure(ElementId(0)), None);
        assert!(doc.contains(ElementId(1)));
        assert!(!doc.contains(ElementId(2)));
    }

    #[test]
    fn narrow_columns_wrap_into_more_lines() {
        let text = "<p>word word word word word word word word word word</p>";
        let wide = layout(text, 794.0).measure(ElementId(0)).unwrap().height;
        let narrow = layout(text, 100.0).measure(ElementId(0)).unwrap().height;
        assert!(narrow > wide * 3.0, "wide {wide}, narrow {narrow}");
    }

    #[test]
    fn flex_row_children_share_a_top() {
        let mut doc = layout(
            r#"<div class="flex justify-between"><span>Engineer</span><span>2020</span></div>"#,
            794.0,
        );
        let a = doc.measure(ElementId(1)).unwrap();
        let b = doc.measure(ElementId(2)).unwrap();
        assert!(approx(a.top, b.top));
        let boxes = doc.placed_boxes().unwrap();
        let date = boxes
            .iter()
            .find(|p| p.element == Some(ElementId(2)))
            .unwrap();
        assert!(date.x > 700.0, "justify-between pushes the date right, x = {}", date.x);
    }

    #[test]
    fn chips_in_a_plain_block_get_their_own_boxes() {
        let mut doc = layout(
            r#"<div><span class="skill-chip">Rust</span> <span class="skill-chip">Kafka</span></div>"#,
            794.0,
        );
        let rust = doc.measure(ElementId(1)).unwrap();
        let kafka = doc.measure(ElementId(2)).unwrap();
        assert!(approx(rust.top, kafka.top));
        assert!(approx(rust.height, 19.6));

        // Offsetting one chip leaves its neighbour in place.
        doc.set_offset(ElementId(1), 50.0);
        assert!(approx(doc.measure(ElementId(1)).unwrap().top, 50.0));
        assert!(approx(doc.measure(ElementId(2)).unwrap().top, 0.0));
    }

    #[test]
    fn list_items_carry_markers() {
        let mut doc = layout("<ul><li>One</li><li>Two</li></ul>", 794.0);
        let boxes = doc.placed_boxes().unwrap();
        let markers: Vec<_> = boxes.iter().filter_map(|b| b.marker.clone()).collect();
        assert_eq!(markers, vec!["\u{2022}", "\u{2022}"]);
        let texts: Vec<_> = boxes
            .iter()
            .filter_map(|b| match &b.content {
                BoxContent::Text { lines, .. } => Some(lines.join(" ")),
                BoxContent::None => None,
            })
            .collect();
        assert_eq!(texts, vec!["One", "Two"]);
    }
}
