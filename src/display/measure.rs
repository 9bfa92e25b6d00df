//! Wrapped text layout and glyph-accurate measurement

use crate::error::{Error, Result};
use crate::layout::{TextExtent, TextMeasure, NBSP, ZWSP};
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use std::path::Path;

/// One laid-out row, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Text with break hints resolved (no zero-width spaces, plain spaces)
    pub text: String,
    pub width: f32,
}

/// Rows of a wrapped text block
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub rows: Vec<Row>,
    pub line_height: f32,
}

impl TextLayout {
    pub fn extent(&self) -> TextExtent {
        let width = self.rows.iter().map(|r| r.width).fold(0.0, f32::max);
        TextExtent::new(width, self.rows.len() as f32 * self.line_height)
    }
}

/// Whitespace a row may break after. Non-breaking spaces never qualify.
fn is_break_space(c: char) -> bool {
    c.is_whitespace() && c != NBSP && c != '\n'
}

/// Text as it is drawn: break hints dropped, non-breaking spaces as spaces
fn display_text(text: &str) -> String {
    text.chars()
        .filter(|&c| c != ZWSP)
        .map(|c| if c == NBSP { ' ' } else { c })
        .collect()
}

/// Cut a paragraph into pieces that each end at a break opportunity
fn break_pieces(paragraph: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (i, c) in paragraph.char_indices() {
        if c == ZWSP {
            if i > start {
                pieces.push(&paragraph[start..i]);
            }
            start = i;
        } else if is_break_space(c) {
            let end = i + c.len_utf8();
            pieces.push(&paragraph[start..end]);
            start = end;
        }
    }
    if start < paragraph.len() {
        pieces.push(&paragraph[start..]);
    }

    pieces
}

/// Greedy word wrap.
///
/// Explicit newlines always start a new row. Rows break after ordinary
/// whitespace or at zero-width spaces; a piece wider than `max_width` gets a
/// row of its own and overflows it.
pub fn wrap_rows(text: &str, max_width: f32, advance: impl Fn(&str) -> f32) -> Vec<Row> {
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for piece in break_pieces(paragraph) {
            let candidate = format!("{}{}", current, piece);
            let trimmed = display_text(&candidate);
            if current.is_empty() || advance(trimmed.trim_end()) <= max_width {
                current = candidate;
            } else {
                rows.push(finish_row(&current, &advance));
                current = piece.to_string();
            }
        }
        rows.push(finish_row(&current, &advance));
    }

    rows
}

fn finish_row(raw: &str, advance: &impl Fn(&str) -> f32) -> Row {
    let text = display_text(raw).trim().to_string();
    let width = advance(&text);
    Row { text, width }
}

/// [`TextMeasure`] backed by a TrueType/OpenType font
#[derive(Clone)]
pub struct GlyphMeasure {
    font: FontArc,
}

impl std::fmt::Debug for GlyphMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphMeasure").finish_non_exhaustive()
    }
}

impl GlyphMeasure {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Load a font file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::FontLoad {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let font = FontArc::try_from_vec(data).map_err(|e| Error::FontLoad {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(Self::new(font))
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Horizontal advance of a single row, kerning included
    pub fn text_width(&self, text: &str, size: u32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size as f32));
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        width
    }

    pub fn line_height(&self, size: u32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size as f32));
        scaled.height() + scaled.line_gap()
    }

    /// Lay out `text` at `size` pixels wrapped to `max_width`
    pub fn layout(&self, text: &str, size: u32, max_width: u32) -> TextLayout {
        TextLayout {
            rows: wrap_rows(text, max_width as f32, |s| self.text_width(s, size)),
            line_height: self.line_height(size),
        }
    }
}

impl TextMeasure for GlyphMeasure {
    fn measure(&self, text: &str, size: u32, bounds: (u32, u32)) -> TextExtent {
        self.layout(text, size, bounds.0).extent()
    }
}
