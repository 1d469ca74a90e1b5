//! Inline style declarations (`element.style`).
//!
//! A [`StyleDeclaration`] stores longhand properties in insertion order.
//! Shorthands are expanded on the way in, so `padding: 1px 2px` becomes four
//! `padding-*` entries and later longhands override earlier ones.

use crate::parse_length;

/// Border style keywords, used to classify `border` shorthand tokens.
const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// CSS-wide keywords that apply to every longhand of a shorthand.
const WIDE_KEYWORDS: &[&str] = &["inherit", "initial", "unset"];

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// A single `name: value` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// An ordered list of longhand declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDeclaration {
    entries: Vec<Declaration>,
}

impl StyleDeclaration {
    /// Create an empty declaration block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `cssText` string such as `"width: 10px; padding: 2px 4px"`.
    /// Malformed declarations are skipped.
    pub fn parse(css_text: &str) -> Self {
        let mut decl = Self::new();
        for part in split_top_level(css_text, ';') {
            let Some((property, value)) = part.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let mut value = value.trim();
            if property.is_empty() || value.is_empty() {
                continue;
            }
            let mut important = false;
            if let Some(stripped) = value.strip_suffix("!important") {
                value = stripped.trim_end();
                important = true;
            }
            decl.set_with_priority(&property, value, important);
        }
        decl
    }

    /// Set a property, expanding shorthands. Later values replace earlier ones.
    pub fn set(&mut self, property: &str, value: &str) {
        self.set_with_priority(property, value, false);
    }

    fn set_with_priority(&mut self, property: &str, value: &str, important: bool) {
        for (name, value) in expand_shorthand(property, value) {
            self.entries.retain(|d| d.property != name);
            self.entries.push(Declaration {
                property: name,
                value,
                important,
            });
        }
    }

    /// Look up a longhand value.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    /// Remove a longhand.
    pub fn remove(&mut self, property: &str) {
        self.entries.retain(|d| d.property != property);
    }

    /// Iterate over declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter()
    }

    /// Number of longhands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no declarations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply every declaration of `other` on top of this block.
    pub fn apply(&mut self, other: &StyleDeclaration) {
        for d in &other.entries {
            self.insert(d.clone());
        }
    }

    /// Insert one longhand declaration, replacing any earlier value.
    pub fn insert(&mut self, declaration: Declaration) {
        self.entries.retain(|e| e.property != declaration.property);
        self.entries.push(declaration);
    }

    /// Serialize back to `cssText`.
    pub fn css_text(&self) -> String {
        self.entries
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important;", d.property, d.value)
                } else {
                    format!("{}: {};", d.property, d.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split `input` on `sep`, ignoring separators inside quotes or parentheses.
pub(crate) fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Split a value into whitespace-separated tokens, keeping `rgb(1, 2, 3)`
/// and quoted strings whole.
pub(crate) fn value_tokens(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in value.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '(') => {
                depth += 1;
                current.push(c);
            }
            (None, ')') => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            (None, c) if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Expand a 1-4 value box shorthand into top/right/bottom/left.
fn expand_box(values: &[String]) -> Option<[String; 4]> {
    let v = |i: usize| values[i].clone();
    match values.len() {
        1 => Some([v(0), v(0), v(0), v(0)]),
        2 => Some([v(0), v(1), v(0), v(1)]),
        3 => Some([v(0), v(1), v(2), v(1)]),
        4 => Some([v(0), v(1), v(2), v(3)]),
        _ => None,
    }
}

fn is_border_width(token: &str) -> bool {
    matches!(token, "thin" | "medium" | "thick") || parse_length(token).is_some()
}

/// Split a `border` style value into (width, style, color). Missing parts
/// reset to their initial values.
fn parse_border(value: &str) -> (String, String, String) {
    let mut width = "medium".to_string();
    let mut style = "none".to_string();
    let mut color = "currentcolor".to_string();
    for token in value_tokens(value) {
        if BORDER_STYLES.contains(&token.as_str()) {
            style = token;
        } else if is_border_width(&token) {
            width = token;
        } else {
            color = token;
        }
    }
    (width, style, color)
}

const FONT_STYLES: &[&str] = &["italic", "oblique"];
const FONT_VARIANTS: &[&str] = &["small-caps"];
const FONT_WEIGHTS: &[&str] = &["bold", "bolder", "lighter"];

/// Expand the `font` shorthand: `[style] [variant] [weight] size[/line-height] family`.
fn expand_font(value: &str) -> Option<Vec<(String, String)>> {
    let tokens = value_tokens(value);
    let mut style = "normal".to_string();
    let mut variant = "normal".to_string();
    let mut weight = "normal".to_string();

    let size_index = tokens.iter().position(|t| {
        let size = t.split('/').next().unwrap_or(t);
        parse_length(size).is_some_and(|l| !l.is_auto())
            || matches!(size, "small" | "medium" | "large" | "x-large" | "x-small")
    })?;

    for token in &tokens[..size_index] {
        let t = token.as_str();
        if FONT_STYLES.contains(&t) {
            style = token.clone();
        } else if FONT_VARIANTS.contains(&t) {
            variant = token.clone();
        } else if FONT_WEIGHTS.contains(&t) || t.parse::<u16>().is_ok() {
            weight = token.clone();
        } else if t != "normal" {
            return None;
        }
    }

    let family = tokens[size_index + 1..].join(" ");
    if family.is_empty() {
        return None;
    }

    let (size, line_height) = match tokens[size_index].split_once('/') {
        Some((size, lh)) => (size.to_string(), lh.to_string()),
        None => (tokens[size_index].clone(), "normal".to_string()),
    };

    Some(vec![
        ("font-style".to_string(), style),
        ("font-variant".to_string(), variant),
        ("font-weight".to_string(), weight),
        ("font-size".to_string(), size),
        ("line-height".to_string(), line_height),
        ("font-family".to_string(), family),
    ])
}

/// Expand `property: value` into longhands. Unknown properties pass through.
pub fn expand_shorthand(property: &str, value: &str) -> Vec<(String, String)> {
    let value = value.trim();
    let wide = WIDE_KEYWORDS.contains(&value);
    let per_side = |prefix: &str, suffix: &str| -> Vec<(String, String)> {
        let longhand = |side: &str| {
            if suffix.is_empty() {
                format!("{prefix}-{side}")
            } else {
                format!("{prefix}-{side}-{suffix}")
            }
        };
        if wide {
            return SIDES
                .iter()
                .map(|side| (longhand(side), value.to_string()))
                .collect();
        }
        match expand_box(&value_tokens(value)) {
            Some(values) => SIDES
                .iter()
                .zip(values)
                .map(|(side, v)| (longhand(side), v))
                .collect(),
            None => Vec::new(),
        }
    };

    match property {
        "margin" | "padding" => per_side(property, ""),
        "border-width" => per_side("border", "width"),
        "border-style" => per_side("border", "style"),
        "border-color" => per_side("border", "color"),
        "border" | "border-top" | "border-right" | "border-bottom" | "border-left" => {
            let sides: Vec<&str> = match property.strip_prefix("border-") {
                Some(side) => vec![side],
                None => SIDES.to_vec(),
            };
            let (width, style, color) = if wide {
                (value.to_string(), value.to_string(), value.to_string())
            } else {
                parse_border(value)
            };
            sides
                .into_iter()
                .flat_map(|side| {
                    [
                        (format!("border-{side}-width"), width.clone()),
                        (format!("border-{side}-style"), style.clone()),
                        (format!("border-{side}-color"), color.clone()),
                    ]
                })
                .collect()
        }
        "overflow" => {
            let tokens = value_tokens(value);
            match tokens.as_slice() {
                [both] => vec![
                    ("overflow-x".to_string(), both.clone()),
                    ("overflow-y".to_string(), both.clone()),
                ],
                [x, y] => vec![
                    ("overflow-x".to_string(), x.clone()),
                    ("overflow-y".to_string(), y.clone()),
                ],
                _ => Vec::new(),
            }
        }
        "word-wrap" => vec![("overflow-wrap".to_string(), value.to_string())],
        "font" => {
            if wide {
                return [
                    "font-style",
                    "font-variant",
                    "font-weight",
                    "font-size",
                    "line-height",
                    "font-family",
                ]
                .iter()
                .map(|p| (p.to_string(), value.to_string()))
                .collect();
            }
            expand_font(value).unwrap_or_default()
        }
        _ => vec![(property.to_string(), value.to_string())],
    }
}
