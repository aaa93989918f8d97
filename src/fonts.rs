//! Text measurement for line breaking.
//!
//! Unit heights depend on how many lines each text block wraps to, so the
//! layout needs glyph advances. Real faces are parsed with `ttf-parser`;
//! without one, a proportional-width heuristic stands in.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{FolioError, Result};
use crate::style::ComputedStyle;

/// Face selector derived from a computed style.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FaceKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FaceKey {
    pub fn of(style: &ComputedStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            bold: style.bold,
            italic: style.italic,
        }
    }
}

#[derive(Clone)]
struct Face {
    bytes: Vec<u8>,
    units_per_em: f32,
}

/// Loaded faces plus the fallback measurement.
#[derive(Clone, Default)]
pub struct FontBook {
    faces: HashMap<FaceKey, Face>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TTF/OTF face for `family` at the given weight and slant.
    pub fn load_bytes(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<()> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| FolioError::Font(format!("failed to parse {family}: {e}")))?;
        let units_per_em = f32::from(face.units_per_em());
        log::debug!("loaded font {family} (bold={bold}, italic={italic}, upem={units_per_em})");
        self.faces.insert(
            FaceKey {
                family: family.to_string(),
                bold,
                italic,
            },
            Face {
                bytes,
                units_per_em,
            },
        );
        Ok(())
    }

    pub fn load_path(&mut self, family: &str, bold: bool, italic: bool, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        self.load_bytes(family, bold, italic, bytes)
    }

    pub fn has_real_fonts(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Exact face, then the regular face of the family, then any face.
    fn lookup(&self, key: &FaceKey) -> Option<&Face> {
        self.faces.get(key).or_else(|| {
            self.faces.get(&FaceKey {
                bold: false,
                italic: false,
                ..key.clone()
            })
        })
    }

    /// Width of `text` in px when set in `style`.
    pub fn measure(&self, text: &str, style: &ComputedStyle) -> f32 {
        let size = style.font_size;
        let Some(face) = self.lookup(&FaceKey::of(style)) else {
            let avg = if style.bold { 0.55 } else { 0.5 };
            return text.chars().count() as f32 * size * avg;
        };
        let Ok(parsed) = ttf_parser::Face::parse(&face.bytes, 0) else {
            return text.chars().count() as f32 * size * 0.5;
        };
        let scale = size / face.units_per_em;
        text.chars()
            .map(|ch| {
                parsed
                    .glyph_index(ch)
                    .and_then(|gid| parsed.glyph_hor_advance(gid))
                    .map_or(size * 0.5, |adv| f32::from(adv) * scale)
            })
            .sum()
    }
}

/// Greedy word wrap. Words wider than `max_width` get a line of their own.
pub fn wrap_text(text: &str, style: &ComputedStyle, max_width: f32, fonts: &FontBook) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    if max_width <= 0.0 {
        return vec![words.join(" ")];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && fonts.measure(&candidate, style) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(size: f32, bold: bool) -> ComputedStyle {
        ComputedStyle {
            font_size: size,
            bold,
            ..ComputedStyle::default()
        }
    }

    #[test]
    fn heuristic_width() {
        let fonts = FontBook::new();
        // 5 chars × 16 × 0.5
        assert!((fonts.measure("Hello", &style(16.0, false)) - 40.0).abs() < 0.01);
        assert!((fonts.measure("Hello", &style(16.0, true)) - 44.0).abs() < 0.01);
    }

    #[test]
    fn wraps_at_width() {
        let fonts = FontBook::new();
        // Each char is 8px at 16px: "Hello world" = 88px.
        let lines = wrap_text("Hello world foo bar", &style(16.0, false), 90.0, &fonts);
        assert_eq!(lines, vec!["Hello world", "foo bar"]);
    }

    #[test]
    fn overlong_word_keeps_its_own_line() {
        let fonts = FontBook::new();
        let lines = wrap_text("a supercalifragilistic b", &style(16.0, false), 40.0, &fonts);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert!(wrap_text("  \n ", &style(14.0, false), 100.0, &FontBook::new()).is_empty());
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let mut fonts = FontBook::new();
        let err = fonts.load_bytes("Broken", false, false, vec![0, 1, 2, 3]);
        assert!(matches!(err, Err(FolioError::Font(_))));
        assert!(!fonts.has_real_fonts());
    }
}
