//! PDF renderer – turns a [`PrintLayout`] into PDF bytes with `printpdf`
//! (v0.8 ops-based API) and the builtin Helvetica faces.

use printpdf::*;

use crate::error::{FolioError, Result};
use crate::print_layout::{PrintItem, PrintLayout};

/// CSS pixels (96 dpi) to PDF points (72 dpi).
pub const PX_TO_PT: f32 = 0.75;
const PT_TO_MM: f32 = 0.352778;

/// Render every page of `layout`, with zero page margins.
pub fn render_pdf(layout: &PrintLayout) -> Result<Vec<u8>> {
    let page_w_pt = layout.page_width_px * PX_TO_PT;
    let page_h_pt = layout.page_height_px * PX_TO_PT;
    if !(page_w_pt > 0.0 && page_h_pt > 0.0) {
        return Err(FolioError::Render(format!(
            "page size must be positive (got {}x{} px)",
            layout.page_width_px, layout.page_height_px
        )));
    }
    let page_w = Mm(page_w_pt * PT_TO_MM);
    let page_h = Mm(page_h_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&layout.title);
    let mut pages: Vec<PdfPage> = layout
        .pages
        .iter()
        .map(|page| {
            let mut ops = Vec::new();
            for item in &page.items {
                render_item(&mut ops, item, page_h_pt);
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }
    let page_count = pages.len();

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    log::debug!("rendered {page_count} pages, {} bytes", bytes.len());
    Ok(bytes)
}

/// Builtin fonts use WinAnsiEncoding; fold common typography into Latin-1
/// and replace anything else.
fn to_latin1(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '\u{00B7}',
            '\u{00A0}' => ' ',
            c if (c as u32) < 256 => c,
            _ => '?',
        })
        .collect()
}

fn rgb(color: [f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: color[0],
        g: color[1],
        b: color[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn font_for(bold: bool, italic: bool) -> BuiltinFont {
    match (bold, italic) {
        (true, true) => BuiltinFont::HelveticaBoldOblique,
        (true, false) => BuiltinFont::HelveticaBold,
        (false, true) => BuiltinFont::HelveticaOblique,
        (false, false) => BuiltinFont::Helvetica,
    }
}

/// Append the ops for one item. Layout uses a top-left origin in px, PDF a
/// bottom-left origin in pt.
fn render_item(ops: &mut Vec<Op>, item: &PrintItem, page_h_pt: f32) {
    let flip = |y_px: f32| page_h_pt - y_px * PX_TO_PT;

    match item {
        PrintItem::Fill {
            x,
            y,
            width,
            height,
            color,
        } => {
            let (x1, x2) = (x * PX_TO_PT, (x + width) * PX_TO_PT);
            let (y_top, y_bottom) = (flip(*y), flip(y + height));
            ops.push(Op::SetFillColor { col: rgb(*color) });
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing {
                        points: vec![
                            point(x1, y_bottom),
                            point(x2, y_bottom),
                            point(x2, y_top),
                            point(x1, y_top),
                        ],
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                },
            });
        }
        PrintItem::Rule {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color,
        } => {
            ops.push(Op::SetOutlineColor { col: rgb(*color) });
            ops.push(Op::SetOutlineThickness {
                pt: Pt(thickness * PX_TO_PT),
            });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![
                        point(x1 * PX_TO_PT, flip(*y1)),
                        point(x2 * PX_TO_PT, flip(*y2)),
                    ],
                    is_closed: false,
                },
            });
        }
        PrintItem::Text {
            x,
            y,
            width,
            text,
            font_size,
            line_height,
            bold,
            italic,
            underline,
            color,
        } => {
            if text.is_empty() {
                return;
            }
            let font = font_for(*bold, *italic);
            let size_pt = font_size * PX_TO_PT;
            // Baseline: half-leading plus an ascender of ~0.75 em.
            let half_leading = (line_height - font_size).max(0.0) / 2.0;
            let baseline = flip(y + half_leading) - size_pt * 0.75;
            let text_x = x * PX_TO_PT;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(text_x),
                    y: Pt(baseline),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size_pt),
                font,
            });
            ops.push(Op::SetLineHeight {
                lh: Pt(line_height * PX_TO_PT),
            });
            ops.push(Op::SetFillColor { col: rgb(*color) });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_latin1(text))],
                font,
            });
            ops.push(Op::EndTextSection);

            if *underline {
                let underline_y = baseline - size_pt * 0.1;
                ops.push(Op::SetOutlineThickness { pt: Pt(0.5) });
                ops.push(Op::SetOutlineColor { col: rgb(*color) });
                ops.push(Op::DrawLine {
                    line: Line {
                        points: vec![
                            point(text_x, underline_y),
                            point(text_x + width * PX_TO_PT, underline_y),
                        ],
                        is_closed: false,
                    },
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print_layout::PrintPage;

    fn a4(pages: Vec<PrintPage>) -> PrintLayout {
        PrintLayout {
            title: "Resume".to_string(),
            page_width_px: 794.0,
            page_height_px: 1122.0,
            pages,
        }
    }

    #[test]
    fn empty_layout_still_renders_a_page() {
        let bytes = render_pdf(&a4(Vec::new())).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn renders_every_item_kind() {
        let page = PrintPage {
            index: 0,
            items: vec![
                PrintItem::Fill {
                    x: 0.0,
                    y: 0.0,
                    width: 794.0,
                    height: 80.0,
                    color: [0.1, 0.2, 0.5, 1.0],
                },
                PrintItem::Rule {
                    x1: 40.0,
                    y1: 120.0,
                    x2: 754.0,
                    y2: 120.0,
                    thickness: 1.0,
                    color: [0.0, 0.0, 0.0, 1.0],
                },
                PrintItem::Text {
                    x: 40.0,
                    y: 90.0,
                    width: 120.0,
                    text: "Jane \u{201C}JD\u{201D} Doe \u{2013} Engineer".to_string(),
                    font_size: 18.0,
                    line_height: 22.0,
                    bold: true,
                    italic: false,
                    underline: true,
                    color: [0.0, 0.0, 0.0, 1.0],
                },
            ],
        };
        let bytes = render_pdf(&a4(vec![page])).unwrap();
        assert!(bytes.len() > 200);
    }

    #[test]
    fn degenerate_page_size_is_an_error() {
        let mut layout = a4(Vec::new());
        layout.page_height_px = 0.0;
        assert!(matches!(render_pdf(&layout), Err(FolioError::Render(_))));
    }

    #[test]
    fn latin1_folding() {
        assert_eq!(to_latin1("\u{2018}a\u{2019} \u{2014} caf\u{e9} \u{4e2d}"), "'a' - caf\u{e9} ?");
    }
}
