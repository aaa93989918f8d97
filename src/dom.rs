//! HTML reader – turns rendered template markup into an element tree.
//!
//! Resume templates use a small, well-formed subset of HTML. Every element
//! receives an [`ElementId`] in document (pre-order) order, which is what
//! the scanner, the layout oracle and the injected offset list use to refer
//! to it.
//!
//! Markup conventions understood downstream:
//! - `data-unit="heading|entry|line|chip|block"` marks an atomic unit;
//! - `data-gap="<name>"` marks a manually adjustable spacing;
//! - `class` carries utility classes and role classes, `style` inline CSS.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stable identity of an element within one parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Html,
    Head,
    Body,
    Div,
    Section,
    Header,
    Footer,
    Article,
    Main,
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Ul,
    Ol,
    Li,
    Span,
    Strong,
    Em,
    B,
    I,
    A,
    Small,
    Br,
    Hr,
    Img,
    /// Anything else. Laid out as a plain block.
    Other(String),
}

impl Tag {
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "html" => Tag::Html,
            "head" => Tag::Head,
            "body" => Tag::Body,
            "div" => Tag::Div,
            "section" => Tag::Section,
            "header" => Tag::Header,
            "footer" => Tag::Footer,
            "article" => Tag::Article,
            "main" => Tag::Main,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "h5" => Tag::H5,
            "h6" => Tag::H6,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "span" => Tag::Span,
            "strong" => Tag::Strong,
            "em" => Tag::Em,
            "b" => Tag::B,
            "i" => Tag::I,
            "a" => Tag::A,
            "small" => Tag::Small,
            "br" => Tag::Br,
            "hr" => Tag::Hr,
            "img" => Tag::Img,
            other => Tag::Other(other.to_string()),
        }
    }

    /// Elements that never have children or a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br | Tag::Hr | Tag::Img)
            || matches!(self, Tag::Other(name) if matches!(name.as_str(), "meta" | "link" | "input" | "wbr"))
    }

    /// Phrasing content that flows inside a text block.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Tag::Span | Tag::Strong | Tag::Em | Tag::B | Tag::I | Tag::A | Tag::Small | Tag::Br
        )
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::H5 | Tag::H6)
    }

    /// Block elements whose inline content is merged into one wrapped text run.
    pub fn is_text_block(&self) -> bool {
        self.is_heading() || matches!(self, Tag::P | Tag::Li)
    }

    /// Elements whose raw text is not document content.
    fn is_raw_text(&self) -> bool {
        matches!(self, Tag::Other(name) if matches!(name.as_str(), "style" | "script" | "title"))
    }
}

#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct ElementNode {
    pub id: ElementId,
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(id: ElementId, tag: Tag) -> Self {
        Self {
            id,
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Parse template markup into top-level nodes.
///
/// Malformed input never fails: unclosed elements are closed at end of
/// input and stray closing tags are ignored.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut reader = Reader {
        src: html,
        pos: 0,
        next_id: 0,
        open: Vec::new(),
    };
    let mut root = Vec::new();
    reader.read_children(&mut root);
    root
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    next_id: u32,
    /// Tags of the elements currently being read, innermost last.
    open: Vec<Tag>,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Read nodes until the closing tag of the innermost open element
    /// (consumed) or end of input. A closing tag for an outer open element
    /// ends this level without being consumed; unmatched closers are dropped.
    fn read_children(&mut self, out: &mut Vec<DomNode>) {
        while !self.at_end() {
            let rest = self.rest();
            if let Some(after) = rest.strip_prefix("</") {
                let name_len = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                    .unwrap_or(after.len());
                let closing = Tag::parse(&after[..name_len]);
                if self.open.last() == Some(&closing) {
                    self.skip_past('>');
                    return;
                }
                if self.open.contains(&closing) {
                    return;
                }
                self.skip_past('>');
            } else if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(end) => self.pos += end + 3,
                    None => self.pos = self.src.len(),
                }
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past('>');
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                if let Some(node) = self.read_element() {
                    out.push(node);
                }
            } else {
                let first = rest.chars().next().map_or(1, char::len_utf8);
                let end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
                self.pos += end;
                out.push(DomNode::Text(decode_entities(&rest[..end])));
            }
        }
    }

    fn read_element(&mut self) -> Option<DomNode> {
        self.pos += 1; // '<'
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-');
        let tag = Tag::parse(name);
        let id = ElementId(self.next_id);
        self.next_id += 1;
        let mut elem = ElementNode::new(id, tag);

        let mut self_closing = false;
        loop {
            self.take_while(char::is_whitespace);
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            let key = self
                .take_while(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
                .to_ascii_lowercase();
            if key.is_empty() {
                // Lone '/' or similar junk inside the tag.
                self.pos += self.rest().chars().next().map_or(1, char::len_utf8);
                continue;
            }
            self.take_while(char::is_whitespace);
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.take_while(char::is_whitespace);
                self.read_attr_value()
            } else {
                String::new()
            };
            elem.attributes.insert(key, value);
        }

        if self_closing || elem.tag.is_void() {
            return Some(DomNode::Element(elem));
        }

        if elem.tag.is_raw_text() {
            let closer = format!("</{}", name.to_ascii_lowercase());
            let lower = self.rest().to_ascii_lowercase();
            match lower.find(&closer) {
                Some(end) => {
                    self.pos += end;
                    self.skip_past('>');
                }
                None => self.pos = self.src.len(),
            }
            return None;
        }

        self.open.push(elem.tag.clone());
        self.read_children(&mut elem.children);
        self.open.pop();
        Some(DomNode::Element(elem))
    }

    fn read_attr_value(&mut self) -> String {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let body = &rest[1..];
            let end = body.find(quote).unwrap_or(body.len());
            let value = decode_entities(&body[..end]);
            self.pos += 1 + end + usize::from(end < body.len());
            value
        } else {
            decode_entities(self.take_while(|c| !c.is_whitespace() && c != '>'))
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_past(&mut self, marker: char) {
        match self.rest().find(marker) {
            Some(i) => self.pos += i + marker.len_utf8(),
            None => self.pos = self.src.len(),
        }
    }
}

/// Decode the named entities templates emit plus numeric references.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{00A0}'),
                "bull" => Some('\u{2022}'),
                "middot" => Some('\u{00B7}'),
                "ndash" => Some('\u{2013}'),
                "mdash" => Some('\u{2014}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Children of `<body>` when the markup is a full page, otherwise the nodes
/// themselves.
pub fn body_children(nodes: &[DomNode]) -> Vec<DomNode> {
    fn find_body(nodes: &[DomNode]) -> Option<&ElementNode> {
        nodes.iter().find_map(|node| match node {
            DomNode::Element(e) if e.tag == Tag::Body => Some(e),
            DomNode::Element(e) if e.tag == Tag::Html => find_body(&e.children),
            _ => None,
        })
    }
    match find_body(nodes) {
        Some(body) => body.children.clone(),
        None => nodes
            .iter()
            .filter(|n| !matches!(n, DomNode::Element(e) if e.tag == Tag::Head))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(nodes: &[DomNode]) -> &ElementNode {
        match &nodes[0] {
            DomNode::Element(e) => e,
            DomNode::Text(t) => panic!("expected element, got text {t:?}"),
        }
    }

    fn collect_ids(nodes: &[DomNode], out: &mut Vec<(u32, Tag)>) {
        for node in nodes {
            if let DomNode::Element(e) = node {
                out.push((e.id.0, e.tag.clone()));
                collect_ids(&e.children, out);
            }
        }
    }

    #[test]
    fn ids_follow_document_order() {
        let nodes = parse_html(r#"<section><h2>Experience</h2><ul><li>A</li><li>B</li></ul></section>"#);
        let mut ids = Vec::new();
        collect_ids(&nodes, &mut ids);
        assert_eq!(
            ids,
            vec![
                (0, Tag::Section),
                (1, Tag::H2),
                (2, Tag::Ul),
                (3, Tag::Li),
                (4, Tag::Li)
            ]
        );
    }

    #[test]
    fn attributes_and_classes() {
        let nodes = parse_html(
            r#"<div class="entry-header  mb-2" data-unit='entry' data-gap=exp-0 hidden>x</div>"#,
        );
        let div = first_element(&nodes);
        assert!(div.has_class("entry-header"));
        assert_eq!(div.classes().collect::<Vec<_>>(), vec!["entry-header", "mb-2"]);
        assert_eq!(div.attr("data-unit"), Some("entry"));
        assert_eq!(div.attr("data-gap"), Some("exp-0"));
        assert_eq!(div.attr("hidden"), Some(""));
    }

    #[test]
    fn void_and_self_closing_elements() {
        let nodes = parse_html(r#"<p>Line one<br>Line two</p><hr/><img src="x.png">"#);
        assert_eq!(nodes.len(), 3);
        let p = first_element(&nodes);
        assert_eq!(p.children.len(), 3);
    }

    #[test]
    fn style_and_comments_are_dropped() {
        let nodes = parse_html(
            "<!DOCTYPE html><html><head><style>p { color: red; }</style></head>\
             <body><!-- note --><p>Kept</p></body></html>",
        );
        let body = body_children(&nodes);
        assert_eq!(body.len(), 1);
        assert_eq!(first_element(&body).tag, Tag::P);
    }

    #[test]
    fn unclosed_elements_close_at_parent_end() {
        let nodes = parse_html("<ul><li>One<li>Two</ul><p>After</p>");
        assert_eq!(nodes.len(), 2);
        let ul = first_element(&nodes);
        assert_eq!(ul.tag, Tag::Ul);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(decode_entities("R&amp;D &bull; 5 &lt; 6"), "R&D \u{2022} 5 < 6");
        assert_eq!(decode_entities("&#8226;&#x41;"), "\u{2022}A");
        assert_eq!(decode_entities("AT&T"), "AT&T");
    }
}
