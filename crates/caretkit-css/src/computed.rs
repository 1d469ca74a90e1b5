//! Computed style values.
//!
//! [`ComputedStyle`] holds one computed string per supported longhand, in the
//! form `getComputedStyle` reports it: absolute lengths in `px`, percentages
//! kept, keywords lower-cased. Typed accessors parse those strings for layout.

use tracing::trace;

use crate::declaration::{Declaration, StyleDeclaration};
use crate::stylesheet::{Rule, SelectorElement, Specificity, Stylesheet};
use crate::{
    format_px, parse_box_sizing, parse_display, parse_leading_number, parse_length,
    parse_overflow, parse_overflow_wrap, parse_position, parse_text_align, parse_white_space,
    parse_word_break, BoxSizing, Display, Length, Overflow, OverflowWrap, Position, TextAlign,
    WhiteSpace, WordBreak, ROOT_FONT_SIZE,
};

/// A supported longhand property.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
    pub name: &'static str,
    pub initial: &'static str,
    pub inherited: bool,
}

const fn prop(name: &'static str, initial: &'static str, inherited: bool) -> PropertyDef {
    PropertyDef {
        name,
        initial,
        inherited,
    }
}

/// Every longhand the engine computes.
pub const PROPERTIES: &[PropertyDef] = &[
    prop("display", "inline", false),
    prop("position", "static", false),
    prop("box-sizing", "content-box", false),
    prop("top", "auto", false),
    prop("right", "auto", false),
    prop("bottom", "auto", false),
    prop("left", "auto", false),
    prop("width", "auto", false),
    prop("height", "auto", false),
    prop("min-width", "0px", false),
    prop("min-height", "0px", false),
    prop("max-width", "none", false),
    prop("max-height", "none", false),
    prop("margin-top", "0px", false),
    prop("margin-right", "0px", false),
    prop("margin-bottom", "0px", false),
    prop("margin-left", "0px", false),
    prop("padding-top", "0px", false),
    prop("padding-right", "0px", false),
    prop("padding-bottom", "0px", false),
    prop("padding-left", "0px", false),
    prop("border-top-width", "medium", false),
    prop("border-right-width", "medium", false),
    prop("border-bottom-width", "medium", false),
    prop("border-left-width", "medium", false),
    prop("border-top-style", "none", false),
    prop("border-right-style", "none", false),
    prop("border-bottom-style", "none", false),
    prop("border-left-style", "none", false),
    prop("border-top-color", "currentcolor", false),
    prop("border-right-color", "currentcolor", false),
    prop("border-bottom-color", "currentcolor", false),
    prop("border-left-color", "currentcolor", false),
    prop("overflow-x", "visible", false),
    prop("overflow-y", "visible", false),
    prop("color", "rgb(0, 0, 0)", true),
    prop("font-family", "serif", true),
    prop("font-size", "medium", true),
    prop("font-weight", "normal", true),
    prop("font-style", "normal", true),
    prop("font-variant", "normal", true),
    prop("line-height", "normal", true),
    prop("letter-spacing", "normal", true),
    prop("word-spacing", "normal", true),
    prop("text-indent", "0px", true),
    prop("text-align", "start", true),
    prop("white-space", "normal", true),
    prop("word-break", "normal", true),
    prop("overflow-wrap", "normal", true),
    prop("tab-size", "8", true),
];

fn index_of(name: &str) -> Option<usize> {
    PROPERTIES.iter().position(|p| p.name == name)
}

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// A box side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All sides in CSS shorthand order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The side's name as used in property names.
    pub fn name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

/// Used line height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    /// `normal`: derived from font metrics by layout.
    Normal,
    /// Absolute line height.
    Px(f32),
}

/// Computed style for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    values: Vec<String>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputedStyle {
    /// Initial style of a root element with no declarations.
    pub fn new() -> Self {
        Self::compute(None, &StyleDeclaration::new())
    }

    /// Compute the style of an element from its cascaded declarations and
    /// the parent's computed style.
    pub fn compute(parent: Option<&ComputedStyle>, declarations: &StyleDeclaration) -> Self {
        let parent_value = |i: usize| parent.map(|p| p.values[i].as_str());

        // Specified values: cascade result, else inheritance or initial value.
        let specified: Vec<String> = PROPERTIES
            .iter()
            .enumerate()
            .map(|(i, def)| {
                let inherited = || parent_value(i).unwrap_or(def.initial).to_string();
                match declarations.get(def.name).map(str::trim) {
                    Some("inherit") => inherited(),
                    Some("initial") => def.initial.to_string(),
                    Some("unset") | None if def.inherited => inherited(),
                    Some("unset") | None => def.initial.to_string(),
                    Some(value) => value.to_string(),
                }
            })
            .collect();

        let parent_font_size = parent.map_or(ROOT_FONT_SIZE, ComputedStyle::font_size);
        let parent_weight = parent.map_or(400, ComputedStyle::font_weight);

        let mut style = Self {
            values: PROPERTIES.iter().map(|p| p.initial.to_string()).collect(),
        };

        let fallback = |i: usize| -> String {
            let def = &PROPERTIES[i];
            if def.inherited {
                parent_value(i).unwrap_or(def.initial).to_string()
            } else {
                def.initial.to_string()
            }
        };

        let font_size_index = index_of("font-size").unwrap_or_default();
        let font_size = resolve_font_size(&specified[font_size_index], parent_font_size)
            .or_else(|| resolve_font_size(&fallback(font_size_index), parent_font_size))
            .unwrap_or(parent_font_size);
        style.values[font_size_index] = format_px(font_size);

        let color_index = index_of("color").unwrap_or_default();
        let color = match specified[color_index].as_str() {
            "currentcolor" | "" => fallback(color_index),
            value => value.to_string(),
        };
        style.values[color_index] = color.clone();

        let context = ValueContext {
            font_size,
            parent_weight,
            color: &color,
        };

        for (i, def) in PROPERTIES.iter().enumerate() {
            if i == font_size_index || i == color_index {
                continue;
            }
            let computed = compute_value(def.name, &specified[i], &context)
                .or_else(|| compute_value(def.name, &fallback(i), &context))
                .or_else(|| compute_value(def.name, def.initial, &context))
                .unwrap_or_else(|| def.initial.to_string());
            style.values[i] = computed;
        }

        style.fix_up();
        trace!(font_size, display = style.get("display"), "Computed style");
        style
    }

    /// Adjustments that depend on several properties at once.
    fn fix_up(&mut self) {
        for side in Side::ALL {
            let style = self.value(&format!("border-{}-style", side.name()));
            if matches!(style, "none" | "hidden") {
                let width = format!("border-{}-width", side.name());
                self.set_value(&width, "0px".to_string());
            }
        }

        if self.position().is_out_of_flow() && self.display().is_inline_level() {
            self.set_value("display", "block".to_string());
        }

        let (x, y) = (self.value("overflow-x"), self.value("overflow-y"));
        if x == "visible" && y != "visible" {
            self.set_value("overflow-x", "auto".to_string());
        } else if y == "visible" && x != "visible" {
            self.set_value("overflow-y", "auto".to_string());
        }
    }

    fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    fn set_value(&mut self, name: &str, value: String) {
        if let Some(i) = index_of(name) {
            self.values[i] = value;
        }
    }

    fn keyword<T: Default>(&self, name: &str, parse: fn(&str) -> Option<T>) -> T {
        parse(self.value(name)).unwrap_or_default()
    }

    fn px(&self, name: &str, default: f32) -> f32 {
        parse_leading_number(self.value(name)).unwrap_or(default)
    }

    /// Computed value of a longhand, `None` for unsupported names.
    pub fn get(&self, name: &str) -> Option<&str> {
        index_of(name).map(|i| self.values[i].as_str())
    }

    /// Serialized value for `getComputedStyle(..).getPropertyValue(name)`.
    ///
    /// Shorthands serialize from their longhands; unsupported names and
    /// shorthands whose longhands disagree give an empty string.
    pub fn property_value(&self, name: &str) -> String {
        match name {
            "line-height" => match self.line_height() {
                LineHeight::Normal => "normal".to_string(),
                LineHeight::Px(px) => format_px(px),
            },
            "margin" | "padding" => self.box_shorthand(|side| format!("{name}-{side}")),
            "border-width" => self.box_shorthand(|side| format!("border-{side}-width")),
            "border-style" => self.box_shorthand(|side| format!("border-{side}-style")),
            "border-color" => self.box_shorthand(|side| format!("border-{side}-color")),
            "border" => {
                let sides: Vec<String> = Side::ALL
                    .iter()
                    .map(|side| self.border_side_shorthand(*side))
                    .collect();
                if sides.iter().all(|s| *s == sides[0]) {
                    sides[0].clone()
                } else {
                    String::new()
                }
            }
            "border-top" => self.border_side_shorthand(Side::Top),
            "border-right" => self.border_side_shorthand(Side::Right),
            "border-bottom" => self.border_side_shorthand(Side::Bottom),
            "border-left" => self.border_side_shorthand(Side::Left),
            "overflow" => {
                let (x, y) = (self.value("overflow-x"), self.value("overflow-y"));
                if x == y {
                    x.to_string()
                } else {
                    format!("{x} {y}")
                }
            }
            "word-wrap" => self.value("overflow-wrap").to_string(),
            _ => self.get(name).unwrap_or_default().to_string(),
        }
    }

    fn border_side_shorthand(&self, side: Side) -> String {
        let side = side.name();
        format!(
            "{} {} {}",
            self.value(&format!("border-{side}-width")),
            self.value(&format!("border-{side}-style")),
            self.value(&format!("border-{side}-color")),
        )
    }

    fn box_shorthand(&self, longhand: impl Fn(&str) -> String) -> String {
        let value = |side: Side| self.value(&longhand(side.name())).to_string();
        let [t, r, b, l] = Side::ALL.map(value);
        if r == l {
            if t == b {
                if t == r {
                    t
                } else {
                    format!("{t} {r}")
                }
            } else {
                format!("{t} {r} {b}")
            }
        } else {
            format!("{t} {r} {b} {l}")
        }
    }

    fn length(&self, name: &str) -> Length {
        parse_length(self.value(name)).unwrap_or(Length::Auto)
    }

    /// Display type.
    pub fn display(&self) -> Display {
        self.keyword("display", parse_display)
    }

    /// Positioning scheme.
    pub fn position(&self) -> Position {
        self.keyword("position", parse_position)
    }

    /// Box sizing model.
    pub fn box_sizing(&self) -> BoxSizing {
        self.keyword("box-sizing", parse_box_sizing)
    }

    /// Font size in pixels.
    pub fn font_size(&self) -> f32 {
        self.px("font-size", ROOT_FONT_SIZE)
    }

    /// Numeric font weight.
    pub fn font_weight(&self) -> u16 {
        self.value("font-weight").parse().unwrap_or(400)
    }

    /// Font family list as written.
    pub fn font_family(&self) -> &str {
        self.value("font-family")
    }

    /// Whether the first available family is monospace.
    pub fn is_monospace(&self) -> bool {
        self.font_family()
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .any(|f| {
                let f = f.to_ascii_lowercase();
                f == "monospace" || f.contains("mono") || f.contains("courier")
            })
    }

    /// Line height, with unitless numbers resolved against the font size.
    pub fn line_height(&self) -> LineHeight {
        let value = self.value("line-height");
        if value == "normal" {
            return LineHeight::Normal;
        }
        match (value.strip_suffix("px"), parse_leading_number(value)) {
            (Some(_), Some(px)) => LineHeight::Px(px),
            (None, Some(number)) => LineHeight::Px(number * self.font_size()),
            _ => LineHeight::Normal,
        }
    }

    pub fn width(&self) -> Length {
        self.length("width")
    }

    pub fn height(&self) -> Length {
        self.length("height")
    }

    pub fn min_width(&self) -> Length {
        self.length("min-width")
    }

    pub fn min_height(&self) -> Length {
        self.length("min-height")
    }

    /// `None` when `max-width` is `none`.
    pub fn max_width(&self) -> Option<Length> {
        Some(self.length("max-width")).filter(|l| !l.is_auto())
    }

    /// `None` when `max-height` is `none`.
    pub fn max_height(&self) -> Option<Length> {
        Some(self.length("max-height")).filter(|l| !l.is_auto())
    }

    /// Offset property (`top`, `left`, ...) for a side.
    pub fn inset(&self, side: Side) -> Length {
        self.length(side.name())
    }

    pub fn margin(&self, side: Side) -> Length {
        self.length(&format!("margin-{}", side.name()))
    }

    pub fn padding(&self, side: Side) -> Length {
        self.length(&format!("padding-{}", side.name()))
    }

    /// Border width in pixels (zero when the border style is `none`).
    pub fn border_width(&self, side: Side) -> f32 {
        self.px(&format!("border-{}-width", side.name()), 0.0)
    }

    pub fn overflow_x(&self) -> Overflow {
        self.keyword("overflow-x", parse_overflow)
    }

    pub fn overflow_y(&self) -> Overflow {
        self.keyword("overflow-y", parse_overflow)
    }

    pub fn white_space(&self) -> WhiteSpace {
        self.keyword("white-space", parse_white_space)
    }

    pub fn word_break(&self) -> WordBreak {
        self.keyword("word-break", parse_word_break)
    }

    pub fn overflow_wrap(&self) -> OverflowWrap {
        self.keyword("overflow-wrap", parse_overflow_wrap)
    }

    pub fn text_align(&self) -> TextAlign {
        self.keyword("text-align", parse_text_align)
    }

    pub fn text_indent(&self) -> Length {
        self.keyword("text-indent", parse_length)
    }

    /// Extra space after every character, in pixels.
    pub fn letter_spacing(&self) -> f32 {
        self.px("letter-spacing", 0.0)
    }

    /// Extra space after every word separator, in pixels.
    pub fn word_spacing(&self) -> f32 {
        self.px("word-spacing", 0.0)
    }

    /// Tab stop distance in space advances.
    pub fn tab_size(&self) -> f32 {
        self.px("tab-size", 8.0)
    }
}

struct ValueContext<'a> {
    font_size: f32,
    parent_weight: u16,
    color: &'a str,
}

/// Resolve a specified `font-size` against the parent's font size.
fn resolve_font_size(value: &str, parent: f32) -> Option<f32> {
    let keyword = match value {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(ROOT_FONT_SIZE),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "larger" => Some(parent * 1.2),
        "smaller" => Some(parent / 1.2),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }
    match parse_length(value)? {
        Length::Px(px) if px >= 0.0 => Some(px),
        Length::Em(em) if em >= 0.0 => Some(em * parent),
        Length::Rem(rem) if rem >= 0.0 => Some(rem * ROOT_FONT_SIZE),
        Length::Percent(pct) if pct >= 0.0 => Some(pct / 100.0 * parent),
        Length::Zero => Some(0.0),
        _ => None,
    }
}

/// Compute a length, keeping percentages and the allowed keywords.
fn compute_length(
    value: &str,
    font_size: f32,
    keywords: &[&str],
    non_negative: bool,
) -> Option<String> {
    if keywords.contains(&value) {
        return Some(value.to_string());
    }
    let px = match parse_length(value)? {
        Length::Percent(pct) if !non_negative || pct >= 0.0 => return Some(format!("{pct}%")),
        Length::Percent(_) | Length::Auto => return None,
        Length::Zero => 0.0,
        other => other.to_px(font_size, ROOT_FONT_SIZE, 0.0),
    };
    (!non_negative || px >= 0.0).then(|| format_px(px))
}

fn compute_keyword(value: &str, valid: bool) -> Option<String> {
    valid.then(|| value.to_ascii_lowercase())
}

fn compute_value(name: &str, value: &str, cx: &ValueContext<'_>) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let fs = cx.font_size;

    match name {
        "display" => compute_keyword(value, parse_display(value).is_some()),
        "position" => compute_keyword(value, parse_position(value).is_some()),
        "box-sizing" => compute_keyword(value, parse_box_sizing(value).is_some()),
        "overflow-x" | "overflow-y" => compute_keyword(value, parse_overflow(value).is_some()),
        "white-space" => compute_keyword(value, parse_white_space(value).is_some()),
        "word-break" => compute_keyword(value, parse_word_break(value).is_some()),
        "overflow-wrap" => compute_keyword(value, parse_overflow_wrap(value).is_some()),
        "text-align" => compute_keyword(
            value,
            parse_text_align(value).is_some() || matches!(value, "end"),
        ),
        "font-style" => compute_keyword(value, matches!(value, "normal" | "italic" | "oblique")),
        "font-variant" => compute_keyword(value, matches!(value, "normal" | "small-caps")),
        "font-family" => Some(value.to_string()),
        "font-weight" => {
            let weight = match value {
                "normal" => 400,
                "bold" => 700,
                "bolder" => match cx.parent_weight {
                    w if w < 400 => 400,
                    w if w < 600 => 700,
                    _ => 900,
                },
                "lighter" => match cx.parent_weight {
                    w if w < 600 => 100,
                    w if w < 800 => 400,
                    _ => 700,
                },
                other => other.parse::<u16>().ok().filter(|w| (1..=1000).contains(w))?,
            };
            Some(weight.to_string())
        }
        "line-height" => {
            if value == "normal" {
                return Some(value.to_string());
            }
            if let Ok(number) = value.parse::<f32>() {
                return (number >= 0.0).then(|| number.to_string());
            }
            let px = match parse_length(value)? {
                Length::Percent(pct) => pct / 100.0 * fs,
                Length::Auto => return None,
                other => other.to_px(fs, ROOT_FONT_SIZE, 0.0),
            };
            (px >= 0.0).then(|| format_px(px))
        }
        "tab-size" => value
            .parse::<f32>()
            .ok()
            .filter(|n| *n >= 0.0)
            .map(|n| n.to_string()),
        "width" | "height" | "top" | "right" | "bottom" | "left" => {
            compute_length(value, fs, &["auto"], matches!(name, "width" | "height"))
        }
        "min-width" | "min-height" => compute_length(value, fs, &["auto"], true),
        "max-width" | "max-height" => compute_length(value, fs, &["none"], true),
        "text-indent" => compute_length(value, fs, &[], false),
        "letter-spacing" => compute_length(value, fs, &["normal"], false),
        "word-spacing" => {
            if value == "normal" {
                return Some("0px".to_string());
            }
            compute_length(value, fs, &[], false)
        }
        _ if name.starts_with("margin-") => compute_length(value, fs, &["auto"], false),
        _ if name.starts_with("padding-") => compute_length(value, fs, &[], true),
        _ if name.ends_with("-width") => {
            let px = match value {
                "thin" => 1.0,
                "medium" => 3.0,
                "thick" => 5.0,
                _ => match parse_length(value)? {
                    Length::Percent(_) | Length::Auto => return None,
                    Length::Zero => 0.0,
                    other => other.to_px(fs, ROOT_FONT_SIZE, 0.0),
                },
            };
            (px >= 0.0).then(|| format_px(px))
        }
        _ if name.ends_with("-style") => compute_keyword(value, BORDER_STYLES.contains(&value)),
        _ if name.ends_with("-color") => Some(if value == "currentcolor" {
            cx.color.to_string()
        } else {
            value.to_string()
        }),
        _ => Some(value.to_string()),
    }
}

/// Cascade the declarations that apply to `element`.
///
/// Normal declarations apply in origin order (user agent, author sheets in
/// order, inline style), each origin sorted by specificity then source
/// order. `!important` declarations then apply author first, then inline,
/// then user agent.
pub fn cascade<E: SelectorElement>(
    element: &E,
    ua: &Stylesheet,
    author: &[&Stylesheet],
    inline: Option<&StyleDeclaration>,
) -> StyleDeclaration {
    let ua_rules = ua.matching_rules(element);
    let mut author_rules: Vec<_> = author
        .iter()
        .flat_map(|sheet| sheet.matching_rules(element))
        .collect();
    // Stable: equal specificity keeps sheet order, then rule order.
    author_rules.sort_by_key(|(spec, _)| *spec);

    let ua_decls = || declarations(&ua_rules);
    let author_decls = || declarations(&author_rules);
    let inline_decls = || inline.into_iter().flat_map(StyleDeclaration::iter);

    let mut cascaded = StyleDeclaration::new();
    let mut apply = |decls: &mut dyn Iterator<Item = &Declaration>, important: bool| {
        for d in decls.filter(|d| d.important == important) {
            cascaded.insert(d.clone());
        }
    };

    apply(&mut ua_decls(), false);
    apply(&mut author_decls(), false);
    apply(&mut inline_decls(), false);
    apply(&mut author_decls(), true);
    apply(&mut inline_decls(), true);
    apply(&mut ua_decls(), true);

    cascaded
}

fn declarations<'a>(
    rules: &'a [(Specificity, &'a Rule)],
) -> impl Iterator<Item = &'a Declaration> + 'a {
    rules.iter().flat_map(|(_, rule)| rule.declarations.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(parent: Option<&ComputedStyle>, css: &str) -> ComputedStyle {
        ComputedStyle::compute(parent, &StyleDeclaration::parse(css))
    }

    fn sheet(css: &str) -> Stylesheet {
        Stylesheet::parse(css).unwrap()
    }

    #[test]
    fn test_initial_values() {
        let style = ComputedStyle::new();
        assert_eq!(style.get("display"), Some("inline"));
        assert_eq!(style.get("font-size"), Some("16px"));
        assert_eq!(style.get("border-left-width"), Some("0px"));
        assert_eq!(style.get("font-weight"), Some("400"));
        assert_eq!(style.property_value("line-height"), "normal");
        assert_eq!(style.get("max-width"), Some("none"));
    }

    #[test]
    fn test_inheritance() {
        let parent = computed(None, "font-size: 20px; width: 100px; white-space: pre-wrap");
        let child = computed(Some(&parent), "");
        assert_eq!(child.get("font-size"), Some("20px"));
        assert_eq!(child.get("white-space"), Some("pre-wrap"));
        assert_eq!(child.get("width"), Some("auto"));

        let explicit = computed(Some(&parent), "width: inherit");
        assert_eq!(explicit.get("width"), Some("100px"));
    }

    #[test]
    fn test_initial_keyword() {
        let parent = computed(None, "text-align: center");
        let child = computed(Some(&parent), "text-align: initial");
        assert_eq!(child.get("text-align"), Some("start"));
        assert_eq!(child.text_align(), TextAlign::Left);
    }

    #[test]
    fn test_relative_font_sizes() {
        let parent = computed(None, "font-size: 20px");
        let size = |css: &str| computed(Some(&parent), css).font_size();
        assert_eq!(size("font-size: 1.5em"), 30.0);
        assert_eq!(size("font-size: 50%"), 10.0);
        assert_eq!(size("font-size: 2rem"), 32.0);
        assert_eq!(size("font-size: bogus"), 20.0);
    }

    #[test]
    fn test_em_lengths_resolve() {
        let style = computed(None, "font-size: 10px; padding: 1em 50%; width: 3em");
        assert_eq!(style.get("padding-top"), Some("10px"));
        assert_eq!(style.get("padding-left"), Some("50%"));
        assert_eq!(style.get("width"), Some("30px"));
    }

    #[test]
    fn test_border_width_zero_without_style() {
        let style = computed(None, "border-width: 4px");
        assert_eq!(style.border_width(Side::Left), 0.0);

        let style = computed(None, "border: thin solid red");
        assert_eq!(style.border_width(Side::Left), 1.0);
        assert_eq!(style.property_value("border"), "1px solid red");
    }

    #[test]
    fn test_border_color_defaults_to_color() {
        let style = computed(None, "color: rgb(1, 2, 3); border: 2px solid");
        assert_eq!(style.get("border-top-color"), Some("rgb(1, 2, 3)"));
    }

    #[test]
    fn test_line_height_forms() {
        let parent = computed(None, "font-size: 20px; line-height: 1.5");
        assert_eq!(parent.line_height(), LineHeight::Px(30.0));
        assert_eq!(parent.property_value("line-height"), "30px");

        // Numbers inherit as numbers.
        let child = computed(Some(&parent), "font-size: 10px");
        assert_eq!(child.line_height(), LineHeight::Px(15.0));

        let pct = computed(None, "font-size: 20px; line-height: 150%");
        assert_eq!(pct.get("line-height"), Some("30px"));
        let child = computed(Some(&pct), "font-size: 10px");
        assert_eq!(child.line_height(), LineHeight::Px(30.0));
    }

    #[test]
    fn test_font_weight_keywords() {
        let parent = computed(None, "font-weight: bold");
        assert_eq!(parent.font_weight(), 700);
        let weight = |css: &str| computed(Some(&parent), css).font_weight();
        assert_eq!(weight("font-weight: bolder"), 900);
        assert_eq!(weight("font-weight: lighter"), 400);
    }

    #[test]
    fn test_shorthand_serialization() {
        let style = computed(None, "padding: 1px 2px; margin: 3px; overflow: hidden");
        assert_eq!(style.property_value("padding"), "1px 2px");
        assert_eq!(style.property_value("margin"), "3px");
        assert_eq!(style.property_value("overflow"), "hidden");
        assert_eq!(style.property_value("word-wrap"), "normal");
        assert_eq!(style.property_value("no-such-property"), "");
    }

    #[test]
    fn test_overflow_visible_pairing() {
        let style = computed(None, "overflow-y: scroll");
        assert_eq!(style.get("overflow-x"), Some("auto"));
        assert_eq!(style.property_value("overflow"), "auto scroll");
    }

    #[test]
    fn test_absolute_blockified() {
        let style = computed(None, "position: absolute; display: inline");
        assert_eq!(style.display(), Display::Block);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let style = computed(None, "width: -5px; display: weird; padding-top: -1px");
        assert_eq!(style.get("width"), Some("auto"));
        assert_eq!(style.get("display"), Some("inline"));
        assert_eq!(style.get("padding-top"), Some("0px"));
    }

    #[test]
    fn test_monospace_detection() {
        let fira = computed(None, "font-family: \"Fira Mono\", serif");
        assert!(fira.is_monospace());
        assert!(computed(None, "font-family: monospace").is_monospace());
        assert!(!ComputedStyle::new().is_monospace());
    }

    struct Leaf(&'static str, Option<&'static str>);

    impl SelectorElement for Leaf {
        fn local_name(&self) -> String {
            self.0.to_string()
        }
        fn id(&self) -> Option<String> {
            self.1.map(str::to_string)
        }
        fn has_class(&self, _: &str) -> bool {
            false
        }
        fn parent_element(&self) -> Option<Self> {
            None
        }
    }

    #[test]
    fn test_cascade_order() {
        let ua = sheet("div { display: block; width: 1px; color: blue !important }");
        let author = sheet("#x { width: 3px } div { width: 2px; color: red }");
        let el = Leaf("div", Some("x"));

        let cascaded = cascade(&el, &ua, &[&author], None);
        assert_eq!(cascaded.get("display"), Some("block"));
        assert_eq!(cascaded.get("width"), Some("3px"));
        assert_eq!(cascaded.get("color"), Some("blue"));

        let inline = StyleDeclaration::parse("width: 4px");
        let cascaded = cascade(&el, &ua, &[&author], Some(&inline));
        assert_eq!(cascaded.get("width"), Some("4px"));
    }

    #[test]
    fn test_cascade_important_beats_inline() {
        let ua = Stylesheet::new();
        let author = sheet("div { width: 2px !important }");
        let inline = StyleDeclaration::parse("width: 4px");
        let cascaded = cascade(&Leaf("div", None), &ua, &[&author], Some(&inline));
        assert_eq!(cascaded.get("width"), Some("2px"));
    }

    #[test]
    fn test_cascade_ua_important_applies_last() {
        let ua = sheet("div { display: block; overflow: hidden !important }");
        let author = sheet("div { overflow: scroll !important }");
        let inline = StyleDeclaration::parse("overflow: auto !important; display: inline");
        let cascaded = cascade(&Leaf("div", None), &ua, &[&author], Some(&inline));
        assert_eq!(cascaded.get("overflow-x"), Some("hidden"));
        assert_eq!(cascaded.get("overflow-y"), Some("hidden"));
        assert_eq!(cascaded.get("display"), Some("inline"));
    }
}
