//! Plain-text flattening of the rendered document, for clipboard copy.
//!
//! One block per line in document order; list items and bullet lines are
//! prefixed with `- `. Hidden elements are left out.

use crate::dom::Tag;
use crate::style::{Display, StyledNode};

pub fn to_plain_text(nodes: &[StyledNode]) -> String {
    let mut lines = Vec::new();
    for node in nodes {
        flatten(node, &mut lines);
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn is_inline_only(children: &[StyledNode]) -> bool {
    children.iter().all(|c| match c {
        StyledNode::Text { .. } => true,
        StyledNode::Element {
            style, children, ..
        } => matches!(style.display, Display::Inline | Display::None) && is_inline_only(children),
    })
}

fn is_bullet(node: &StyledNode) -> bool {
    matches!(node, StyledNode::Element { tag: Tag::Li, .. })
        || node.has_class("bullet")
        || node.has_class("desc-line")
        || node.attr("data-unit") == Some("line")
}

fn flatten(node: &StyledNode, lines: &mut Vec<String>) {
    match node {
        StyledNode::Text { text, .. } => {
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                lines.push(text);
            }
        }
        StyledNode::Element {
            tag,
            style,
            children,
            ..
        } => {
            if style.display == Display::None {
                return;
            }
            if tag.is_text_block() || is_inline_only(children) {
                let mut text = node.text_content();
                if style.uppercase {
                    text = text.to_uppercase();
                }
                if text.is_empty() {
                    return;
                }
                if is_bullet(node) {
                    lines.push(format!("- {text}"));
                } else {
                    lines.push(text);
                }
                return;
            }
            for child in children {
                flatten(child, lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::style::build_styled_tree;

    fn text(html: &str) -> String {
        to_plain_text(&build_styled_tree(&parse_html(html), None))
    }

    #[test]
    fn blocks_become_lines() {
        let out = text(
            r#"<header><h1>Jane Doe</h1><p>jane@example.com &middot; Berlin</p></header>
               <section>
                 <h2 class="uppercase">Experience</h2>
                 <div class="entry-header flex justify-between"><span>Engineer, Acme</span><span>2020 &ndash; 2024</span></div>
                 <ul><li>Built the <strong>billing</strong> service</li><li>Led migrations</li></ul>
               </section>"#,
        );
        assert_eq!(
            out,
            "Jane Doe\n\
             jane@example.com \u{b7} Berlin\n\
             EXPERIENCE\n\
             Engineer, Acme 2020 \u{2013} 2024\n\
             - Built the billing service\n\
             - Led migrations\n"
        );
    }

    #[test]
    fn hidden_content_is_omitted() {
        assert_eq!(text(r#"<p>shown</p><p class="hidden">secret</p>"#), "shown\n");
    }

    #[test]
    fn bullet_classes_get_a_dash() {
        assert_eq!(text(r#"<div class="desc-line">Cut costs 30%</div>"#), "- Cut costs 30%\n");
    }

    #[test]
    fn empty_document_is_empty_text() {
        assert_eq!(text(""), "");
    }
}
