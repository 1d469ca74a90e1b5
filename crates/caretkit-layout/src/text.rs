//! # Text Metrics
//!
//! Heuristic font metrics and whitespace processing.
//!
//! There is no font backend: advances come from a per-character width table
//! (a fixed `3/5 em` for monospace families) and every font has the same
//! vertical metrics relative to its size. This keeps layout deterministic,
//! which is what the measurement tests rely on.

use caretkit_css::{ComputedStyle, LineHeight, WhiteSpace};

/// Vertical and horizontal metrics for one font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Font size in pixels.
    pub font_size: f32,
    /// Distance from baseline to the top of the content area.
    pub ascent: f32,
    /// Distance from baseline to the bottom of the content area.
    pub descent: f32,
    /// Line gap added by `line-height: normal`.
    pub leading: f32,
    /// Whether every glyph has the same advance.
    pub monospace: bool,
}

impl TextMetrics {
    /// Create metrics with baseline values.
    pub fn with_font_size(font_size: f32) -> Self {
        Self {
            font_size,
            ascent: font_size * 0.8,
            descent: font_size * 0.2,
            leading: font_size * 0.15,
            monospace: false,
        }
    }

    /// Metrics for the first available family of `style`.
    pub fn from_style(style: &ComputedStyle) -> Self {
        Self {
            monospace: style.is_monospace(),
            ..Self::with_font_size(style.font_size())
        }
    }

    /// Height of an inline box's content area.
    pub fn content_height(&self) -> f32 {
        self.ascent + self.descent
    }

    /// Used value of `line-height: normal`.
    pub fn normal_line_height(&self) -> f32 {
        self.content_height() + self.leading
    }

    /// Used line height in pixels.
    pub fn line_height(&self, line_height: LineHeight) -> f32 {
        match line_height {
            LineHeight::Normal => self.normal_line_height(),
            LineHeight::Px(px) => px,
        }
    }

    /// Half the difference between the line height and the content area.
    /// Negative when the line is shorter than the font.
    pub fn half_leading(&self, line_height: f32) -> f32 {
        (line_height - self.content_height()) / 2.0
    }

    /// Advance width of one character, without letter or word spacing.
    pub fn advance(&self, ch: char) -> f32 {
        if ch.is_control() || is_zero_width(ch) {
            return 0.0;
        }
        let fs = self.font_size;
        if is_wide(ch) {
            return fs;
        }
        if self.monospace {
            return fs * 3.0 / 5.0;
        }
        let em = match ch {
            ' ' | 'i' | 'l' | 'j' | '\'' | '.' | ',' | ':' | ';' | '!' | '|' => 0.25,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '"' => 0.35,
            'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.85,
            '0'..='9' => 0.55,
            c if c.is_uppercase() => 0.65,
            _ => 0.5,
        };
        fs * em
    }

    /// Total advance of a string.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars().map(|c| self.advance(c)).sum()
    }
}

fn is_zero_width(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'..='\u{200D}' | '\u{FEFF}' | '\u{0300}'..='\u{036F}'
    )
}

/// East Asian wide characters take a full em.
fn is_wide(ch: char) -> bool {
    matches!(ch,
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}'
        | '\u{1F300}'..='\u{1FAFF}')
}

/// Collapse whitespace according to `white-space`.
///
/// `preceded_by_space` carries collapsing state across text nodes, so a
/// space that follows a collapsible space in an earlier node disappears.
/// Leading and trailing spaces are kept; line layout drops them at line
/// edges.
pub fn collapse_whitespace(text: &str, white_space: WhiteSpace, preceded_by_space: bool) -> String {
    if !white_space.collapses_spaces() {
        return text.replace("\r\n", "\n").replace('\r', "\n");
    }

    let keep_newlines = white_space.preserves_newlines();
    let mut result = String::with_capacity(text.len());
    let mut last_was_space = preceded_by_space;

    for c in text.chars() {
        match c {
            '\n' | '\r' if keep_newlines => {
                // Spaces before a preserved newline are removed.
                while result.ends_with(' ') {
                    result.pop();
                }
                result.push('\n');
                last_was_space = true;
            }
            ' ' | '\t' | '\n' | '\r' | '\u{000C}' => {
                if !last_was_space {
                    result.push(' ');
                    last_was_space = true;
                }
            }
            _ => {
                result.push(c);
                last_was_space = false;
            }
        }
    }

    result
}
