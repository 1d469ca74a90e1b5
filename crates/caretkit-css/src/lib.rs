//! # CaretKit CSS
//!
//! CSS declarations, selector matching, and style computation for the
//! CaretKit measurement engine.
//!
//! ## Design Goals
//!
//! 1. **Declarations**: Parse `cssText` and expand the shorthands text layout depends on
//! 2. **Cascade**: Apply origin, specificity, and `!important` ordering
//! 3. **Inheritance**: Propagate inherited properties to children
//! 4. **Computed values**: Resolve relative units and keywords, and serialize
//!    them back the way `getComputedStyle` reports them

pub mod computed;
pub mod declaration;
pub mod stylesheet;
pub mod ua;

pub use computed::{cascade, ComputedStyle, LineHeight, PropertyDef, Side, PROPERTIES};
pub use declaration::{expand_shorthand, Declaration, StyleDeclaration};
pub use stylesheet::{
    Combinator, Compound, Rule, Selector, SelectorElement, Specificity, Stylesheet,
};
pub use ua::user_agent_stylesheet;

use thiserror::Error;

/// Errors that can occur in CSS operations.
#[derive(Error, Debug)]
pub enum CssError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// A CSS length value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Pixels.
    Px(f32),
    /// Em (relative to font size).
    Em(f32),
    /// Rem (relative to root font size).
    Rem(f32),
    /// Percentage.
    Percent(f32),
    /// Auto.
    Auto,
    /// Zero.
    #[default]
    Zero,
}

impl Length {
    /// Compute the absolute pixel value.
    pub fn to_px(&self, font_size: f32, root_font_size: f32, container_size: f32) -> f32 {
        match self {
            Length::Px(px) => *px,
            Length::Em(em) => em * font_size,
            Length::Rem(rem) => rem * root_font_size,
            Length::Percent(pct) => pct / 100.0 * container_size,
            Length::Auto => 0.0, // Context-dependent
            Length::Zero => 0.0,
        }
    }

    /// Whether the value is `auto`.
    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }
}

/// Root font size used for `rem` units and the `medium` keyword.
pub const ROOT_FONT_SIZE: f32 = 16.0;

/// Format a pixel value the way computed styles serialize it: shortest
/// decimal form, no trailing `.0`.
pub fn format_px(value: f32) -> String {
    if value == 0.0 {
        // also folds -0.0
        return "0px".to_string();
    }
    format!("{value}px")
}

/// Parse a leading number the way `parseFloat` does: `"12.5px"` is `12.5`,
/// `"auto"` is `None`.
pub fn parse_leading_number(value: &str) -> Option<f32> {
    let value = value.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in value.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    value[..end].parse::<f32>().ok()
}

/// Display property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    Block,
    #[default]
    Inline,
    InlineBlock,
    None,
}

impl Display {
    /// Whether boxes of this display type take part in inline layout.
    pub fn is_inline_level(self) -> bool {
        matches!(self, Display::Inline | Display::InlineBlock)
    }
}

/// Position property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Whether the box is taken out of normal flow.
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }
}

/// Box sizing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
    Clip,
}

impl Overflow {
    /// Check if this overflow creates a scroll container.
    pub fn is_scrollable(self) -> bool {
        matches!(self, Overflow::Scroll | Overflow::Auto)
    }
}

/// White space handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    Nowrap,
    Pre,
    PreWrap,
    PreLine,
    BreakSpaces,
}

impl WhiteSpace {
    /// Whether runs of spaces and tabs collapse to one space.
    pub fn collapses_spaces(self) -> bool {
        matches!(
            self,
            WhiteSpace::Normal | WhiteSpace::Nowrap | WhiteSpace::PreLine
        )
    }

    /// Whether newlines force a line break instead of acting as a space.
    pub fn preserves_newlines(self) -> bool {
        !matches!(self, WhiteSpace::Normal | WhiteSpace::Nowrap)
    }

    /// Whether lines may wrap at soft break opportunities.
    pub fn wraps(self) -> bool {
        !matches!(self, WhiteSpace::Nowrap | WhiteSpace::Pre)
    }
}

/// Word break behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordBreak {
    #[default]
    Normal,
    BreakAll,
    KeepAll,
    BreakWord,
}

/// Overflow wrap (legacy `word-wrap`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowWrap {
    #[default]
    Normal,
    BreakWord,
    Anywhere,
}

/// Parse a length value.
pub fn parse_length(value: &str) -> Option<Length> {
    let value = value.trim();

    if value == "auto" {
        return Some(Length::Auto);
    }
    if value == "0" {
        return Some(Length::Zero);
    }

    if let Some(num) = value.strip_suffix("px") {
        return num.trim().parse::<f32>().ok().map(Length::Px);
    }
    if let Some(num) = value.strip_suffix("rem") {
        return num.trim().parse::<f32>().ok().map(Length::Rem);
    }
    if let Some(num) = value.strip_suffix("em") {
        return num.trim().parse::<f32>().ok().map(Length::Em);
    }
    if let Some(num) = value.strip_suffix('%') {
        return num.trim().parse::<f32>().ok().map(Length::Percent);
    }

    // Try plain number (treated as px)
    if let Ok(num) = value.parse::<f32>() {
        return Some(Length::Px(num));
    }

    None
}

/// Parse display value.
pub fn parse_display(value: &str) -> Option<Display> {
    match value.trim().to_ascii_lowercase().as_str() {
        "block" | "flow-root" | "list-item" | "flex" | "grid" | "table" => Some(Display::Block),
        "inline" | "contents" => Some(Display::Inline),
        "inline-block" | "inline-flex" | "inline-grid" | "inline-table" => {
            Some(Display::InlineBlock)
        }
        "none" => Some(Display::None),
        _ => None,
    }
}

/// Parse position value.
pub fn parse_position(value: &str) -> Option<Position> {
    match value.trim() {
        "static" => Some(Position::Static),
        "relative" => Some(Position::Relative),
        "absolute" => Some(Position::Absolute),
        "fixed" => Some(Position::Fixed),
        "sticky" => Some(Position::Sticky),
        _ => None,
    }
}

/// Parse box-sizing value.
pub fn parse_box_sizing(value: &str) -> Option<BoxSizing> {
    match value.trim() {
        "content-box" => Some(BoxSizing::ContentBox),
        "border-box" => Some(BoxSizing::BorderBox),
        _ => None,
    }
}

/// Parse text-align value. `start` and `initial` map to left for the
/// horizontal, left-to-right text this engine lays out.
pub fn parse_text_align(value: &str) -> Option<TextAlign> {
    match value.trim() {
        "left" | "start" | "initial" => Some(TextAlign::Left),
        "right" | "end" => Some(TextAlign::Right),
        "center" => Some(TextAlign::Center),
        "justify" => Some(TextAlign::Justify),
        _ => None,
    }
}

/// Parse overflow value.
pub fn parse_overflow(value: &str) -> Option<Overflow> {
    match value.trim() {
        "visible" => Some(Overflow::Visible),
        "hidden" => Some(Overflow::Hidden),
        "scroll" => Some(Overflow::Scroll),
        "auto" | "overlay" => Some(Overflow::Auto),
        "clip" => Some(Overflow::Clip),
        _ => None,
    }
}

/// Parse white-space value.
pub fn parse_white_space(value: &str) -> Option<WhiteSpace> {
    match value.trim() {
        "normal" => Some(WhiteSpace::Normal),
        "nowrap" => Some(WhiteSpace::Nowrap),
        "pre" => Some(WhiteSpace::Pre),
        "pre-wrap" => Some(WhiteSpace::PreWrap),
        "pre-line" => Some(WhiteSpace::PreLine),
        "break-spaces" => Some(WhiteSpace::BreakSpaces),
        _ => None,
    }
}

/// Parse word-break value.
pub fn parse_word_break(value: &str) -> Option<WordBreak> {
    match value.trim() {
        "normal" => Some(WordBreak::Normal),
        "break-all" => Some(WordBreak::BreakAll),
        "keep-all" => Some(WordBreak::KeepAll),
        "break-word" => Some(WordBreak::BreakWord),
        _ => None,
    }
}

/// Parse overflow-wrap value.
pub fn parse_overflow_wrap(value: &str) -> Option<OverflowWrap> {
    match value.trim() {
        "normal" => Some(OverflowWrap::Normal),
        "break-word" => Some(OverflowWrap::BreakWord),
        "anywhere" => Some(OverflowWrap::Anywhere),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("10px"), Some(Length::Px(10.0)));
        assert_eq!(parse_length("1.5em"), Some(Length::Em(1.5)));
        assert_eq!(parse_length("2rem"), Some(Length::Rem(2.0)));
        assert_eq!(parse_length("50%"), Some(Length::Percent(50.0)));
        assert_eq!(parse_length("auto"), Some(Length::Auto));
        assert_eq!(parse_length("0"), Some(Length::Zero));
        assert_eq!(parse_length("none"), None);
    }

    #[test]
    fn test_length_to_px() {
        assert_eq!(Length::Em(2.0).to_px(10.0, 16.0, 0.0), 20.0);
        assert_eq!(Length::Percent(50.0).to_px(10.0, 16.0, 200.0), 100.0);
    }

    #[test]
    fn test_format_px() {
        assert_eq!(format_px(100.0), "100px");
        assert_eq!(format_px(42.5), "42.5px");
        assert_eq!(format_px(-0.0), "0px");
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("12.5px"), Some(12.5));
        assert_eq!(parse_leading_number("-3px"), Some(-3.0));
        assert_eq!(parse_leading_number("50%"), Some(50.0));
        assert_eq!(parse_leading_number("400"), Some(400.0));
        assert_eq!(parse_leading_number("auto"), None);
        assert_eq!(parse_leading_number("normal"), None);
    }

    #[test]
    fn test_white_space_modes() {
        assert!(WhiteSpace::PreWrap.preserves_newlines());
        assert!(WhiteSpace::PreWrap.wraps());
        assert!(!WhiteSpace::PreWrap.collapses_spaces());
        assert!(!WhiteSpace::Pre.wraps());
        assert!(WhiteSpace::PreLine.collapses_spaces());
        assert!(!WhiteSpace::Normal.preserves_newlines());
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_display("inline-block"), Some(Display::InlineBlock));
        assert_eq!(parse_text_align("initial"), Some(TextAlign::Left));
        assert_eq!(parse_overflow("auto"), Some(Overflow::Auto));
        assert_eq!(parse_box_sizing("border-box"), Some(BoxSizing::BorderBox));
    }
}
