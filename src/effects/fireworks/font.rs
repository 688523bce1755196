//! Text rasterizers for the off-screen message surface.
//!
//! `Font::Block` is a built-in 5x7 block face and needs no files.
//! `Font::Outline` fills the outlines of a TrueType/OpenType face.

use super::glyph::AlphaSurface;
use crate::error::{GlyphworksError, Result};
use rusttype::{Scale, point};
use std::path::{Path, PathBuf};

const BLOCK_COLS: usize = 5;
const BLOCK_ROWS: usize = 7;
/// Block units per em; the glyph body is `BLOCK_ROWS` of them.
const BLOCK_UNITS_PER_EM: f32 = 8.0;

pub enum Font {
    Block,
    Outline(OutlineFont),
}

impl Font {
    /// The outline font at `path`, or the block font without one.
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Ok(Font::Outline(OutlineFont::load(path)?)),
            None => Ok(Font::Block),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Font::Block => "built-in 5x7 block font".to_string(),
            Font::Outline(font) => format!("outline font {}", font.path.display()),
        }
    }

    /// Draws `text` on one line, centered on (cx, cy), `size` pixels per em.
    pub fn draw_centered(&self, surface: &mut AlphaSurface, text: &str, size: f32, cx: f32, cy: f32) {
        match self {
            Font::Block => draw_block_text(surface, text, size, cx, cy),
            Font::Outline(font) => font.draw_centered(surface, text, size, cx, cy),
        }
    }
}

// ── Block font ──

fn draw_block_text(surface: &mut AlphaSurface, text: &str, size: f32, cx: f32, cy: f32) {
    let unit = size / BLOCK_UNITS_PER_EM;
    let advance = (BLOCK_COLS + 1) as f32 * unit;
    let count = text.chars().count();
    if count == 0 || unit <= 0.0 {
        return;
    }

    let width = advance * count as f32 - unit;
    let left = cx - width / 2.0;
    let top = cy - BLOCK_ROWS as f32 * unit / 2.0;

    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = block_glyph(ch) else {
            log::debug!("block font has no glyph for {ch:?}");
            continue;
        };
        let gx = left + i as f32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..BLOCK_COLS {
                if bits & (1 << (BLOCK_COLS - 1 - col)) != 0 {
                    surface.fill_rect(gx + col as f32 * unit, top + row as f32 * unit, unit, unit);
                }
            }
        }
    }
}

/// Rows top to bottom, leftmost column in bit 4. Lowercase folds to
/// uppercase.
fn block_glyph(ch: char) -> Option<[u8; BLOCK_ROWS]> {
    let rows = match ch.to_ascii_uppercase() {
        ' ' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '\'' => [0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '♥' => [0b00000, 0b01010, 0b11111, 0b11111, 0b01110, 0b00100, 0b00000],
        _ => return None,
    };
    Some(rows)
}

// ── Outline font ──

pub struct OutlineFont {
    path: PathBuf,
    face: rusttype::Font<'static>,
}

impl OutlineFont {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| GlyphworksError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, data)
    }

    pub fn from_bytes(path: &Path, data: Vec<u8>) -> Result<Self> {
        let face = rusttype::Font::try_from_vec(data)
            .ok_or_else(|| GlyphworksError::FontParse(path.to_path_buf()))?;
        Ok(Self {
            path: path.to_path_buf(),
            face,
        })
    }

    fn draw_centered(&self, surface: &mut AlphaSurface, text: &str, size: f32, cx: f32, cy: f32) {
        for ch in text.chars().filter(|ch| !ch.is_whitespace()) {
            if self.face.glyph(ch).id().0 == 0 {
                log::debug!("{} has no glyph for {ch:?}", self.path.display());
            }
        }

        let scale = Scale::uniform(size);
        let v_metrics = self.face.v_metrics(scale);
        let baseline = cy + (v_metrics.ascent + v_metrics.descent) / 2.0;

        let text_width = self
            .face
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width);

        let (width, height) = (surface.width() as i32, surface.height() as i32);
        for glyph in self.face.layout(text, scale, point(cx - text_width / 2.0, baseline)) {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bounds.min.x + gx as i32;
                let py = bounds.min.y + gy as i32;
                if (0..width).contains(&px) && (0..height).contains(&py) {
                    surface.add(px as usize, py as usize, coverage);
                }
            });
        }
    }
}
