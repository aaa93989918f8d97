//! Style resolver – maps tag defaults, utility classes and inline CSS onto a
//! flat [`ComputedStyle`] consumed by the layout engine.
//!
//! Resume templates lean on a Tailwind-like vocabulary. Only the properties
//! that influence vertical layout or the exported page are modelled.

use std::collections::HashMap;

use crate::dom::{DomNode, ElementId, ElementNode, Tag};

/// Fully resolved style of one element or text run.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub flex_wrap: bool,
    pub flex_grow: f32,
    pub justify: Justify,
    pub align: Align,
    pub gap: f32,
    pub grid_columns: usize,

    pub width: Length,
    pub max_width: Length,
    pub height: Length,

    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub border_color: Color,
    pub background: Color,

    pub font_family: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub uppercase: bool,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub color: Color,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            flex_wrap: false,
            flex_grow: 0.0,
            justify: Justify::Start,
            align: Align::Stretch,
            gap: 0.0,
            grid_columns: 0,
            width: Length::Auto,
            max_width: Length::Auto,
            height: Length::Auto,
            margin: Edges::ZERO,
            padding: Edges::ZERO,
            border: Edges::ZERO,
            border_color: Color::rgb(0x1f, 0x29, 0x37),
            background: Color::TRANSPARENT,
            font_family: "Helvetica".to_string(),
            font_size: 14.0,
            bold: false,
            italic: false,
            underline: false,
            uppercase: false,
            line_height: 1.4,
            text_align: TextAlign::Left,
            color: Color::rgb(0x11, 0x18, 0x27),
        }
    }
}

impl ComputedStyle {
    /// Style of a text run inside this element: typography is inherited,
    /// box properties are not.
    pub fn for_text(&self) -> Self {
        Self {
            display: Display::Inline,
            margin: Edges::ZERO,
            padding: Edges::ZERO,
            border: Edges::ZERO,
            background: Color::TRANSPARENT,
            width: Length::Auto,
            max_width: Length::Auto,
            height: Length::Auto,
            ..self.clone()
        }
    }

    /// Start a child style inheriting the typographic properties.
    fn inherit(parent: &ComputedStyle, base: ComputedStyle) -> Self {
        Self {
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            bold: parent.bold,
            italic: parent.italic,
            underline: parent.underline,
            uppercase: parent.uppercase,
            line_height: parent.line_height,
            text_align: parent.text_align,
            color: parent.color,
            ..base
        }
    }

    pub fn line_height_px(&self) -> f32 {
        self.font_size * self.line_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Grid,
    Inline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Start,
    End,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    End,
    Center,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Auto,
    Px(f32),
    Percent(f32),
}

impl Length {
    /// Resolve against the containing width; `Auto` yields `None`.
    pub fn resolve(self, container: f32) -> Option<f32> {
        match self {
            Length::Auto => None,
            Length::Px(v) => Some(v),
            Length::Percent(p) => Some(container * p / 100.0),
        }
    }
}

/// Per-side pixel values (margin, padding, border widths).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    fn set(&mut self, sides: &str, v: f32) {
        for side in sides.chars() {
            match side {
                't' => self.top = v,
                'r' => self.right = v,
                'b' => self.bottom = v,
                'l' => self.left = v,
                _ => {}
            }
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// RGBA colour, channels in 0.0 – 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a palette name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            let expanded: String = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                6 => hex.to_string(),
                _ => return None,
            };
            let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
            return Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        if let Some(args) = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<u8> = args
                .split(',')
                .filter_map(|p| p.trim().parse::<u8>().ok())
                .collect();
            return match parts.as_slice() {
                [r, g, b] => Some(Self::rgb(*r, *g, *b)),
                _ => None,
            };
        }
        if value == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        palette(value)
    }
}

/// Named colours used by the bundled templates.
fn palette(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "white" => (0xff, 0xff, 0xff),
        "black" => (0x00, 0x00, 0x00),
        "gray-100" => (0xf3, 0xf4, 0xf6),
        "gray-200" => (0xe5, 0xe7, 0xeb),
        "gray-300" => (0xd1, 0xd5, 0xdb),
        "gray-400" => (0x9c, 0xa3, 0xaf),
        "gray-500" => (0x6b, 0x72, 0x80),
        "gray-600" => (0x4b, 0x55, 0x63),
        "gray-700" => (0x37, 0x41, 0x51),
        "gray-800" => (0x1f, 0x29, 0x37),
        "gray-900" => (0x11, 0x18, 0x27),
        "slate-700" => (0x33, 0x41, 0x55),
        "slate-800" => (0x1e, 0x29, 0x3b),
        "blue-100" => (0xdb, 0xea, 0xfe),
        "blue-600" => (0x25, 0x63, 0xeb),
        "blue-700" => (0x1d, 0x4e, 0xd8),
        "blue-900" => (0x1e, 0x3a, 0x8a),
        "emerald-600" => (0x05, 0x96, 0x69),
        "teal-700" => (0x0f, 0x76, 0x6e),
        "indigo-700" => (0x43, 0x38, 0xca),
        "red-600" => (0xdc, 0x26, 0x26),
        _ => return None,
    };
    Some(Color::rgb(r, g, b))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve an element's style: tag defaults, inherited typography, classes,
/// then the inline `style` attribute.
pub fn resolve_style(element: &ElementNode, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let base = tag_defaults(&element.tag, parent);
    let mut style = match parent {
        Some(p) => ComputedStyle::inherit(p, base.clone()),
        None => base.clone(),
    };
    // Tag-level typography wins over inheritance.
    apply_tag_typography(&element.tag, &mut style, &base);

    if element.attr("hidden").is_some() {
        style.display = Display::None;
    }
    for class in element.classes() {
        apply_class(&mut style, class);
    }
    if let Some(inline) = element.attr("style") {
        apply_inline_style(&mut style, inline);
    }
    style
}

fn tag_defaults(tag: &Tag, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let mut s = ComputedStyle::default();
    let parent_size = parent.map_or(s.font_size, |p| p.font_size);
    match tag {
        Tag::H1 => {
            s.font_size = 28.0;
            s.bold = true;
            s.line_height = 1.2;
            s.margin.bottom = 8.0;
        }
        Tag::H2 => {
            s.font_size = 18.0;
            s.bold = true;
            s.line_height = 1.25;
            s.margin.top = 12.0;
            s.margin.bottom = 6.0;
        }
        Tag::H3 => {
            s.font_size = 15.0;
            s.bold = true;
            s.line_height = 1.3;
            s.margin.bottom = 2.0;
        }
        Tag::H4 | Tag::H5 | Tag::H6 => {
            s.font_size = 14.0;
            s.bold = true;
            s.margin.bottom = 2.0;
        }
        Tag::P => s.margin.bottom = 4.0,
        Tag::Ul | Tag::Ol => {
            s.padding.left = 18.0;
            s.margin.bottom = 6.0;
        }
        Tag::Li => s.margin.bottom = 2.0,
        Tag::Span | Tag::Strong | Tag::B | Tag::Em | Tag::I | Tag::A | Tag::Br => {
            s.display = Display::Inline;
        }
        Tag::Small => {
            s.display = Display::Inline;
            s.font_size = (parent_size * 0.85).round();
        }
        Tag::Hr => {
            s.border.top = 1.0;
            s.border_color = Color::rgb(0xd1, 0xd5, 0xdb);
            s.margin.top = 6.0;
            s.margin.bottom = 6.0;
        }
        Tag::Img => s.display = Display::Inline,
        Tag::Head => s.display = Display::None,
        Tag::Html
        | Tag::Body
        | Tag::Div
        | Tag::Section
        | Tag::Header
        | Tag::Footer
        | Tag::Article
        | Tag::Main
        | Tag::Other(_) => {}
    }
    s
}

fn apply_tag_typography(tag: &Tag, style: &mut ComputedStyle, base: &ComputedStyle) {
    if tag.is_heading() {
        style.font_size = base.font_size;
        style.bold = true;
        style.line_height = base.line_height;
    }
    match tag {
        Tag::Strong | Tag::B => style.bold = true,
        Tag::Em | Tag::I => style.italic = true,
        Tag::Small => style.font_size = base.font_size,
        Tag::A => style.underline = true,
        _ => {}
    }
}

/// Apply one utility class. Unknown classes (including role classes such as
/// `entry-header`) are ignored here; the scanner reads those.
pub fn apply_class(s: &mut ComputedStyle, class: &str) {
    match class {
        "flex" => s.display = Display::Flex,
        "grid" => s.display = Display::Grid,
        "block" => s.display = Display::Block,
        "inline" | "inline-block" => s.display = Display::Inline,
        "hidden" => s.display = Display::None,

        "flex-row" => s.flex_direction = FlexDirection::Row,
        "flex-col" => s.flex_direction = FlexDirection::Column,
        "flex-wrap" => s.flex_wrap = true,
        "flex-nowrap" => s.flex_wrap = false,
        "flex-1" | "grow" | "flex-grow" => s.flex_grow = 1.0,

        "justify-start" => s.justify = Justify::Start,
        "justify-end" => s.justify = Justify::End,
        "justify-center" => s.justify = Justify::Center,
        "justify-between" => s.justify = Justify::SpaceBetween,

        "items-start" => s.align = Align::Start,
        "items-end" => s.align = Align::End,
        "items-center" | "items-baseline" => s.align = Align::Center,
        "items-stretch" => s.align = Align::Stretch,

        "font-bold" | "font-semibold" | "font-extrabold" => s.bold = true,
        "font-normal" | "font-medium" | "font-light" => s.bold = false,
        "italic" => s.italic = true,
        "not-italic" => s.italic = false,
        "underline" => s.underline = true,
        "no-underline" => s.underline = false,
        "uppercase" => s.uppercase = true,
        "normal-case" => s.uppercase = false,

        "text-left" => s.text_align = TextAlign::Left,
        "text-center" => s.text_align = TextAlign::Center,
        "text-right" => s.text_align = TextAlign::Right,

        "leading-none" => s.line_height = 1.0,
        "leading-tight" => s.line_height = 1.25,
        "leading-snug" => s.line_height = 1.375,
        "leading-normal" => s.line_height = 1.5,
        "leading-relaxed" => s.line_height = 1.625,

        "w-full" => s.width = Length::Percent(100.0),
        "w-auto" => s.width = Length::Auto,

        "border" => s.border = Edges { top: 1.0, right: 1.0, bottom: 1.0, left: 1.0 },
        "border-t" => s.border.top = 1.0,
        "border-b" => s.border.bottom = 1.0,
        "border-l" => s.border.left = 1.0,
        "border-r" => s.border.right = 1.0,
        "border-b-2" => s.border.bottom = 2.0,
        "border-l-4" => s.border.left = 4.0,

        _ => apply_patterned_class(s, class),
    }
}

fn text_size(name: &str) -> Option<f32> {
    Some(match name {
        "xs" => 11.0,
        "sm" => 12.5,
        "base" => 14.0,
        "lg" => 16.0,
        "xl" => 18.0,
        "2xl" => 22.0,
        "3xl" => 28.0,
        "4xl" => 34.0,
        _ => return None,
    })
}

fn fraction(ratio: &str) -> Option<f32> {
    let (num, den) = ratio.split_once('/')?;
    let (num, den) = (num.parse::<f32>().ok()?, den.parse::<f32>().ok()?);
    (den > 0.0).then(|| num / den * 100.0)
}

/// Classes carrying a value: spacing scale (1 unit = 4px), sizes, colours.
fn apply_patterned_class(s: &mut ComputedStyle, class: &str) {
    let Some((prefix, value)) = class.split_once('-') else {
        return;
    };
    let units = value.parse::<f32>().ok().map(|v| v * 4.0);

    match (prefix, units) {
        ("p", Some(v)) => s.padding.set("trbl", v),
        ("px", Some(v)) => s.padding.set("rl", v),
        ("py", Some(v)) => s.padding.set("tb", v),
        ("pt", Some(v)) => s.padding.set("t", v),
        ("pr", Some(v)) => s.padding.set("r", v),
        ("pb", Some(v)) => s.padding.set("b", v),
        ("pl", Some(v)) => s.padding.set("l", v),
        ("m", Some(v)) => s.margin.set("trbl", v),
        ("mx", Some(v)) => s.margin.set("rl", v),
        ("my", Some(v)) => s.margin.set("tb", v),
        ("mt", Some(v)) => s.margin.set("t", v),
        ("mr", Some(v)) => s.margin.set("r", v),
        ("mb", Some(v)) => s.margin.set("b", v),
        ("ml", Some(v)) => s.margin.set("l", v),
        ("gap", Some(v)) => s.gap = v,
        ("h", Some(v)) => s.height = Length::Px(v),
        ("w", Some(v)) => s.width = Length::Px(v),
        ("w", None) => {
            if let Some(pct) = fraction(value) {
                s.width = Length::Percent(pct);
            }
        }
        ("grid", None) => {
            if let Some(n) = value.strip_prefix("cols-").and_then(|n| n.parse().ok()) {
                s.grid_columns = n;
            }
        }
        ("text", None) => {
            if let Some(size) = text_size(value) {
                s.font_size = size;
            } else if let Some(c) = palette(value) {
                s.color = c;
            }
        }
        ("bg", None) => {
            if let Some(c) = palette(value) {
                s.background = c;
            }
        }
        ("border", None) => {
            if let Some(c) = palette(value) {
                s.border_color = c;
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Inline CSS
// ---------------------------------------------------------------------------

/// Apply a `style="..."` attribute: `;`-separated `property: value` pairs.
pub fn apply_inline_style(s: &mut ComputedStyle, css: &str) {
    for decl in css.split(';') {
        if let Some((prop, value)) = decl.split_once(':') {
            apply_property(s, prop.trim(), value.trim());
        }
    }
}

fn apply_property(s: &mut ComputedStyle, prop: &str, value: &str) {
    match prop {
        "display" => {
            s.display = match value {
                "flex" => Display::Flex,
                "grid" => Display::Grid,
                "block" | "list-item" => Display::Block,
                "inline" | "inline-block" | "inline-flex" => Display::Inline,
                "none" => Display::None,
                _ => s.display,
            }
        }
        "flex-direction" => {
            s.flex_direction = if value.starts_with("column") {
                FlexDirection::Column
            } else {
                FlexDirection::Row
            }
        }
        "flex-wrap" => s.flex_wrap = value == "wrap",
        "flex-grow" | "flex" => {
            if let Ok(v) = value.split_whitespace().next().unwrap_or("").parse() {
                s.flex_grow = v;
            }
        }
        "gap" => set_px(&mut s.gap, value),
        "width" => s.width = parse_length(value),
        "max-width" => s.max_width = parse_length(value),
        "height" => s.height = parse_length(value),
        "margin" => set_shorthand(&mut s.margin, value),
        "padding" => set_shorthand(&mut s.padding, value),
        "margin-top" => set_px(&mut s.margin.top, value),
        "margin-right" => set_px(&mut s.margin.right, value),
        "margin-bottom" => set_px(&mut s.margin.bottom, value),
        "margin-left" => set_px(&mut s.margin.left, value),
        "padding-top" => set_px(&mut s.padding.top, value),
        "padding-right" => set_px(&mut s.padding.right, value),
        "padding-bottom" => set_px(&mut s.padding.bottom, value),
        "padding-left" => set_px(&mut s.padding.left, value),
        "border" | "border-top" | "border-right" | "border-bottom" | "border-left" => {
            // `<width> <style> <color>` in any order.
            let mut width = None;
            for token in value.split_whitespace() {
                if let Some(px) = parse_px(token) {
                    width = Some(px);
                } else if let Some(c) = Color::parse(token) {
                    s.border_color = c;
                }
            }
            let w = if value == "none" { 0.0 } else { width.unwrap_or(1.0) };
            match prop {
                "border" => s.border.set("trbl", w),
                "border-top" => s.border.top = w,
                "border-right" => s.border.right = w,
                "border-bottom" => s.border.bottom = w,
                _ => s.border.left = w,
            }
        }
        "border-width" => set_shorthand(&mut s.border, value),
        "border-color" => {
            if let Some(c) = Color::parse(value) {
                s.border_color = c;
            }
        }
        "background" | "background-color" => {
            if let Some(c) = Color::parse(value) {
                s.background = c;
            }
        }
        "color" => {
            if let Some(c) = Color::parse(value) {
                s.color = c;
            }
        }
        "font-family" => {
            if let Some(first) = value.split(',').next() {
                let family = first.trim().trim_matches(|c| c == '"' || c == '\'');
                if !family.is_empty() {
                    s.font_family = family.to_string();
                }
            }
        }
        "font-size" => set_px(&mut s.font_size, value),
        "font-weight" => {
            s.bold = match value {
                "bold" | "bolder" => true,
                "normal" | "lighter" => false,
                n => n.parse::<u32>().map_or(s.bold, |w| w >= 600),
            }
        }
        "font-style" => s.italic = value == "italic" || value == "oblique",
        "text-decoration" | "text-decoration-line" => s.underline = value.contains("underline"),
        "text-transform" => s.uppercase = value == "uppercase",
        "text-align" => {
            s.text_align = match value {
                "center" => TextAlign::Center,
                "right" | "end" => TextAlign::Right,
                _ => TextAlign::Left,
            }
        }
        "line-height" => {
            if let Ok(factor) = value.parse::<f32>() {
                s.line_height = factor;
            } else if let Some(px) = parse_px(value) {
                if s.font_size > 0.0 {
                    s.line_height = px / s.font_size;
                }
            }
        }
        _ => {}
    }
}

fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value
        .strip_suffix("px")
        .or_else(|| (value == "0").then_some(value))?;
    number.trim().parse().ok()
}

fn set_px(target: &mut f32, value: &str) {
    if let Some(px) = parse_px(value) {
        *target = px;
    }
}

fn parse_length(value: &str) -> Length {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse().map_or(Length::Auto, Length::Percent);
    }
    parse_px(value).map_or(Length::Auto, Length::Px)
}

/// CSS 1–4 value shorthand for margin, padding and border-width.
fn set_shorthand(edges: &mut Edges, value: &str) {
    let v: Vec<f32> = value.split_whitespace().filter_map(parse_px).collect();
    let (t, r, b, l) = match v.as_slice() {
        [a] => (*a, *a, *a, *a),
        [y, x] => (*y, *x, *y, *x),
        [t, x, b] => (*t, *x, *b, *x),
        [t, r, b, l] => (*t, *r, *b, *l),
        _ => return,
    };
    *edges = Edges {
        top: t,
        right: r,
        bottom: b,
        left: l,
    };
}

// ---------------------------------------------------------------------------
// Styled tree
// ---------------------------------------------------------------------------

/// A DOM node annotated with its computed style.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        id: ElementId,
        tag: Tag,
        style: ComputedStyle,
        attrs: HashMap<String, String>,
        children: Vec<StyledNode>,
    },
    Text {
        text: String,
        style: ComputedStyle,
    },
}

impl StyledNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            StyledNode::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            StyledNode::Text { .. } => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }

    pub fn style(&self) -> &ComputedStyle {
        match self {
            StyledNode::Element { style, .. } | StyledNode::Text { style, .. } => style,
        }
    }

    /// Visible text of the subtree with whitespace collapsed.
    pub fn text_content(&self) -> String {
        fn gather(node: &StyledNode, out: &mut String) {
            match node {
                StyledNode::Text { text, .. } => {
                    out.push_str(text);
                }
                StyledNode::Element { style, .. } if style.display == Display::None => {}
                StyledNode::Element { tag: Tag::Br, .. } => out.push(' '),
                StyledNode::Element { children, .. } => {
                    for child in children {
                        gather(child, out);
                    }
                    out.push(' ');
                }
            }
        }
        let mut raw = String::new();
        gather(self, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Build a styled tree from DOM nodes, resolving styles top-down.
///
/// Whitespace-only text is kept only inside text blocks and inline elements,
/// where it separates words.
pub fn build_styled_tree(nodes: &[DomNode], parent: Option<&ComputedStyle>) -> Vec<StyledNode> {
    build_level(nodes, parent, false)
}

fn build_level(
    nodes: &[DomNode],
    parent: Option<&ComputedStyle>,
    in_text: bool,
) -> Vec<StyledNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            DomNode::Element(e) => {
                let style = resolve_style(e, parent);
                let text_context = e.tag.is_text_block() || (in_text && e.tag.is_inline());
                let children = build_level(&e.children, Some(&style), text_context);
                out.push(StyledNode::Element {
                    id: e.id,
                    tag: e.tag.clone(),
                    style,
                    attrs: e.attributes.clone(),
                    children,
                });
            }
            DomNode::Text(text) => {
                if text.trim().is_empty() && !in_text {
                    continue;
                }
                let style = parent.map(ComputedStyle::for_text).unwrap_or_default();
                out.push(StyledNode::Text {
                    text: text.clone(),
                    style,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn styled(html: &str) -> Vec<StyledNode> {
        build_styled_tree(&parse_html(html), None)
    }

    #[test]
    fn spacing_scale_is_four_pixels() {
        let mut s = ComputedStyle::default();
        apply_class(&mut s, "px-6");
        apply_class(&mut s, "mb-2");
        assert_eq!(s.padding.left, 24.0);
        assert_eq!(s.padding.right, 24.0);
        assert_eq!(s.padding.top, 0.0);
        assert_eq!(s.margin.bottom, 8.0);
    }

    #[test]
    fn inline_style_overrides_classes() {
        let nodes = styled(r#"<p class="mb-4 text-sm" style="margin-bottom: 2px; font-size: 13px">x</p>"#);
        let style = nodes[0].style();
        assert_eq!(style.margin.bottom, 2.0);
        assert_eq!(style.font_size, 13.0);
    }

    #[test]
    fn typography_inherits_but_boxes_do_not() {
        let nodes = styled(r#"<div class="p-4 text-gray-600 italic"><p>child</p></div>"#);
        let StyledNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        let child = children[0].style();
        assert!(child.italic);
        assert_eq!(child.color, Color::rgb(0x4b, 0x55, 0x63));
        assert_eq!(child.padding, Edges::ZERO);
    }

    #[test]
    fn headings_keep_their_own_size() {
        let nodes = styled(r#"<div class="text-xs"><h2>Experience</h2></div>"#);
        let StyledNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(children[0].style().font_size, 18.0);
        assert!(children[0].style().bold);
    }

    #[test]
    fn hidden_elements_resolve_to_display_none() {
        assert_eq!(styled(r#"<div class="hidden">x</div>"#)[0].style().display, Display::None);
        assert_eq!(styled(r#"<div hidden>x</div>"#)[0].style().display, Display::None);
        assert_eq!(styled(r#"<div style="display:none">x</div>"#)[0].style().display, Display::None);
    }

    #[test]
    fn border_shorthands() {
        let mut s = ComputedStyle::default();
        apply_inline_style(&mut s, "border-bottom: 2px solid #1e3a8a");
        assert_eq!(s.border.bottom, 2.0);
        assert_eq!(s.border.top, 0.0);
        assert_eq!(s.border_color, Color::rgb(0x1e, 0x3a, 0x8a));
    }

    #[test]
    fn colour_parsing() {
        assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
        assert_eq!(Color::parse("blue-700"), Some(Color::rgb(0x1d, 0x4e, 0xd8)));
        assert_eq!(Color::parse("#12"), None);
    }

    #[test]
    fn whitespace_between_inline_runs_is_preserved() {
        let nodes = styled("<div>\n  <p><strong>Lead</strong> <em>Engineer</em></p>\n</div>");
        let StyledNode::Element { children, .. } = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(children.len(), 1, "block-level whitespace is dropped");
        let StyledNode::Element { children: runs, .. } = &children[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(runs.len(), 3, "the space between the runs survives");
    }
}
