//! Greedy word wrapping and line placement.
//!
//! Measurement is injected: the raster backend measures shaped glyph runs, the vector backend uses
//! [`ApproxMeasurer`].

use std::mem;
use std::str::Split;

use crate::foundation::error::PagevisResult;
use crate::layout::units::{BASE_FONT_SIZE_PX, ResolvedBox, UnitResolver};
use crate::page::model::{Alignment, TextFormatting};

/// Width of a run of text in pixels.
pub trait TextMeasurer {
    /// Advance width of `text`.
    fn measure(&mut self, text: &str) -> f64;
}

impl<F> TextMeasurer for F
where
    F: FnMut(&str) -> f64,
{
    fn measure(&mut self, text: &str) -> f64 {
        self(text)
    }
}

/// `chars * font_size * 0.6`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxMeasurer {
    /// Font size in pixels.
    pub font_size: f64,
}

impl ApproxMeasurer {
    /// Average glyph advance as a fraction of the font size.
    pub const ADVANCE_RATIO: f64 = 0.6;

    /// Measurer for `font_size` pixels.
    pub fn new(font_size: f64) -> Self {
        Self { font_size }
    }
}

impl TextMeasurer for ApproxMeasurer {
    fn measure(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * Self::ADVANCE_RATIO
    }
}

/// Lines produced by [`wrap_lines`]. Finite and single-pass.
pub struct WrapLines<'t, M> {
    words: Split<'t, char>,
    current: String,
    measure: M,
    max_width: f64,
}

/// Greedily wrap `text` at single spaces so each line fits `max_width` where possible.
///
/// A word is appended while the candidate line measures `<= max_width`; on overflow the current
/// line is emitted and the word starts the next one. A word wider than `max_width` sits alone on
/// its own line and is never split.
pub fn wrap_lines<M: TextMeasurer>(text: &str, measure: M, max_width: f64) -> WrapLines<'_, M> {
    WrapLines {
        words: text.split(' '),
        current: String::new(),
        measure,
        max_width,
    }
}

impl<M: TextMeasurer> Iterator for WrapLines<'_, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for word in self.words.by_ref() {
            let mut candidate = String::with_capacity(self.current.len() + word.len() + 1);
            candidate.push_str(&self.current);
            if !self.current.is_empty() {
                candidate.push(' ');
            }
            candidate.push_str(word);

            if self.measure.measure(&candidate) > self.max_width && !self.current.is_empty() {
                return Some(mem::replace(&mut self.current, word.to_string()));
            }
            self.current = candidate;
        }

        if self.current.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.current))
        }
    }
}

/// Horizontal anchor for an alignment: `x`, `x + width / 2` or `x + width`.
pub fn anchor_x(alignment: Alignment, x: f64, width: f64) -> f64 {
    match alignment {
        Alignment::Left | Alignment::Justify => x,
        Alignment::Center => x + width / 2.0,
        Alignment::Right => x + width,
    }
}

/// Left edge of a line of `line_width` pixels drawn at the alignment anchor.
pub fn line_start_x(alignment: Alignment, x: f64, width: f64, line_width: f64) -> f64 {
    let anchor = anchor_x(alignment, x, width);
    match alignment {
        Alignment::Left | Alignment::Justify => anchor,
        Alignment::Center => anchor - line_width / 2.0,
        Alignment::Right => anchor - line_width,
    }
}

/// A word placed by [`justify_words`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedWord<'a> {
    /// Word text.
    pub text: &'a str,
    /// Left edge.
    pub x: f64,
}

/// Spread the words of `line` across `width` starting at `x`.
///
/// The gap added after each word is `(width - measure(line)) / (words - 1)` on top of a normal
/// space. A single word is placed at `x`.
pub fn justify_words<'a, M: TextMeasurer>(
    line: &'a str,
    measure: &mut M,
    x: f64,
    width: f64,
) -> Vec<PlacedWord<'a>> {
    let words: Vec<&str> = line.split(' ').collect();
    if words.len() < 2 {
        return vec![PlacedWord { text: line, x }];
    }

    let space = measure.measure(" ");
    let total = measure.measure(line);
    let extra = (width - total) / (words.len() - 1) as f64;

    let mut cursor = x;
    let mut out = Vec::with_capacity(words.len());
    for word in words {
        out.push(PlacedWord { text: word, x: cursor });
        cursor += measure.measure(word) + space + extra;
    }
    out
}

/// Font size in pixels; unit strings resolve against a 16px container.
pub fn font_size_px(formatting: &TextFormatting, resolver: &UnitResolver) -> PagevisResult<f64> {
    resolver.resolve(&formatting.font_size, BASE_FONT_SIZE_PX)
}

/// Line advance: `lineHeight` when set, else the font size.
pub fn line_height_px(formatting: &TextFormatting, font_size: f64) -> f64 {
    formatting.line_height.unwrap_or(font_size)
}

/// Y of the underline drawn beneath the final line.
pub fn underline_y(top: f64, line_count: usize, line_height: f64) -> f64 {
    top + line_count as f64 * line_height - 2.0
}

/// A wrapped line with its top edge.
#[derive(Clone, Debug, PartialEq)]
pub struct LaidLine {
    /// Line text.
    pub text: String,
    /// Top of the line box.
    pub y: f64,
    /// `true` for the last line of the block.
    pub last: bool,
}

/// Wrap `text` into the block box and assign `y + i * line_height` to each line.
pub fn lay_out_block<M: TextMeasurer>(
    text: &str,
    measure: M,
    block: &ResolvedBox,
    line_height: f64,
) -> Vec<LaidLine> {
    let lines: Vec<String> = wrap_lines(text, measure, block.width).collect();
    let n = lines.len();
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| LaidLine {
            text,
            y: block.y + i as f64 * line_height,
            last: i + 1 == n,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
