//! Static font-metric tables for the two built-in PDF fonts the renderer uses.
//!
//! Widths are in em units (AFM widths / 1000), so a string's width in points is
//! `measure_str(s) * font_size_pt`. Tables cover ASCII 0x20..=0x7E (95 printable
//! characters), index = (char as usize) - 32. A few common typographic characters are
//! special-cased; everything else falls back to `average_char_width`.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

pub const POINTS_PER_INCH: f32 = 72.0;

/// Page geometry in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
    pub margin_left_pt: f32,
    pub margin_right_pt: f32,
}

impl PageConfig {
    pub fn text_width_pt(&self) -> f32 {
        self.page_width_pt - self.margin_left_pt - self.margin_right_pt
    }

    pub fn text_height_pt(&self) -> f32 {
        self.page_height_pt - self.margin_top_pt - self.margin_bottom_pt
    }
}

/// US letter (8.5" × 11") with 0.5" margins on every side.
pub fn default_page_config() -> PageConfig {
    let margin = 0.5 * POINTS_PER_INCH;
    PageConfig {
        page_width_pt: 8.5 * POINTS_PER_INCH,
        page_height_pt: 11.0 * POINTS_PER_INCH,
        margin_top_pt: margin,
        margin_bottom_pt: margin,
        margin_left_pt: margin,
        margin_right_pt: margin,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space) through 0x7E (~).
pub struct FontMetricTable {
    pub font: Font,
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '•' => 0.35,
            '–' => 0.556,
            '—' => 1.0,
            '‘' | '’' => 0.222,
            '“' | '”' => 0.333,
            _ => self.average_char_width,
        }
    }

    /// Rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Rendered width of a string in points at `size_pt`.
    pub fn width_pt(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }

    /// Greedy word wrap at `max_width_pt`. A word wider than a whole line is broken
    /// between characters so no line exceeds the width.
    /// Empty or whitespace-only input yields no lines.
    pub fn wrap(&self, s: &str, size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let max_width = max_width_pt / size_pt;
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            for piece in self.break_word(word, max_width) {
                let piece_w = self.measure_str(&piece);
                if current.is_empty() {
                    current = piece;
                    current_width = piece_w;
                } else if current_width + self.space_width + piece_w > max_width {
                    lines.push(std::mem::replace(&mut current, piece));
                    current_width = piece_w;
                } else {
                    current.push(' ');
                    current.push_str(&piece);
                    current_width += self.space_width + piece_w;
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Splits `word` into runs no wider than `max_width` em. Each run holds at least
    /// one character.
    fn break_word(&self, word: &str, max_width: f32) -> Vec<String> {
        if self.measure_str(word) <= max_width {
            return vec![word.to_string()];
        }

        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0_f32;
        for c in word.chars() {
            let w = self.char_width(c);
            if !piece.is_empty() && width + w > max_width {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(c);
            width += w;
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    font: Font::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.52,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    font: Font::HelveticaBold,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.56,
    space_width: 0.278,
};

/// Whether the built-in fonts can draw `c`. They use WinAnsiEncoding: Latin-1 plus a
/// few typographic characters in 0x80..=0x9F. Anything else is dropped from the page.
pub fn is_winansi(c: char) -> bool {
    matches!(c as u32, 0x20..=0x7E | 0xA0..=0xFF)
        || matches!(
            c,
            '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
                | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ'
                | 'ž' | 'Ÿ'
        )
}

pub fn get_metrics(font: Font) -> &'static FontMetricTable {
    match font {
        Font::Helvetica => &HELVETICA_TABLE,
        Font::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
