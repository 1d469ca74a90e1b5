//! Reading the computed style of a source element.
//!
//! The reader copies what a mirror needs to reproduce the source's text
//! flow: box dimensions, padding, border, and the font and text properties.
//! Values are the host's computed values with two substitutions: `auto`
//! widths and heights become the rendered size, and percentage min/max
//! sizes are resolved against the parent.

use caretkit_common::camelize_key;
use caretkit_css::{format_px, parse_leading_number};
use tracing::trace;

use crate::error::{MeasureError, Result};
use crate::host::DomHost;
use crate::percent::resolve_percent;

/// Properties copied onto the mirror when the caller names none.
pub const DEFAULT_STYLE_NAMES: &[&str] = &[
    "width",
    "height",
    "max-width",
    "max-height",
    "min-width",
    "min-height",
    "padding-top",
    "padding-bottom",
    "padding-left",
    "padding-right",
    "border",
    "box-sizing",
    "line-height",
    "text-indent",
    "text-align",
    "font-size",
    "font-family",
    "font-weight",
    "font-style",
    "font-variant",
    "letter-spacing",
    "white-space",
    "word-spacing",
    "word-wrap",
    "word-break",
    "position",
    "overflow",
];

const MIN_MAX_SIZES: [&str; 4] = ["max-width", "max-height", "min-width", "min-height"];

/// Computed values keyed by camel-cased property name, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSnapshot {
    entries: Vec<(String, String)>,
}

impl StyleSnapshot {
    /// Value for a camel-cased name such as `paddingTop`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Numeric font metrics of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyles {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: f32,
    /// `None` when the computed line height is `normal`.
    pub line_height: Option<f32>,
}

/// Full content extent of an element, overflow included.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContentBox {
    pub width: f32,
    pub height: f32,
}

/// Reads computed styles and geometry from a host.
pub struct StyleReader<'h, H: DomHost> {
    host: &'h H,
}

impl<'h, H: DomHost> StyleReader<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self { host }
    }

    /// One raw computed value.
    pub fn style(&self, element: &H::Node, name: &str) -> Result<String> {
        self.host
            .computed_style(element, name)
            .map_err(MeasureError::host)
    }

    /// Computed values of `names`, keyed by camel-cased name.
    pub fn styles(&self, element: &H::Node, names: &[impl AsRef<str>]) -> Result<StyleSnapshot> {
        let entries = self
            .styles_by_names(element, names)?
            .into_iter()
            .map(|(name, value)| (camelize_key(&name), value))
            .collect();
        Ok(StyleSnapshot { entries })
    }

    /// Computed values of `names` as `name: value;` declarations separated
    /// by a space, ready to apply as an inline style.
    pub fn css_text(&self, element: &H::Node, names: &[impl AsRef<str>]) -> Result<String> {
        let declarations: Vec<String> = self
            .styles_by_names(element, names)?
            .into_iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect();
        Ok(declarations.join(" "))
    }

    pub fn font_styles(&self, element: &H::Node) -> Result<FontStyles> {
        let number = |name: &str| -> Result<Option<f32>> {
            Ok(parse_leading_number(&self.style(element, name)?))
        };
        Ok(FontStyles {
            font_family: self.style(element, "font-family")?,
            font_size: number("font-size")?.unwrap_or(0.0),
            font_weight: number("font-weight")?.unwrap_or(0.0),
            line_height: number("line-height")?,
        })
    }

    /// Scroll width and height.
    pub fn content_box(&self, element: &H::Node) -> Result<ContentBox> {
        Ok(ContentBox {
            width: self
                .host
                .scroll_width(element)
                .map_err(MeasureError::host)?,
            height: self
                .host
                .scroll_height(element)
                .map_err(MeasureError::host)?,
        })
    }

    /// Width taken by a vertical scrollbar: `offsetWidth - clientWidth`
    /// minus the left and right borders.
    pub fn scrollbar_width(&self, element: &H::Node) -> Result<f32> {
        let border = |side: &str| -> Result<f32> {
            let value = self.style(element, &format!("border-{side}-width"))?;
            Ok(parse_leading_number(&value).unwrap_or(0.0))
        };
        let offset_width = self
            .host
            .offset_rect(element)
            .map_err(MeasureError::host)?
            .width;
        let client_width = self
            .host
            .client_width(element)
            .map_err(MeasureError::host)?;
        let borders = border("left")? + border("right")?;
        Ok(offset_width - client_width - borders)
    }

    fn styles_by_names(
        &self,
        element: &H::Node,
        names: &[impl AsRef<str>],
    ) -> Result<Vec<(String, String)>> {
        let mut result = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let value = self.style(element, name)?;

            let value = if matches!(name, "width" | "height") && value == "auto" {
                let rect = self
                    .host
                    .bounding_client_rect(element)
                    .map_err(MeasureError::host)?;
                format_px(if name == "width" { rect.width } else { rect.height })
            } else if MIN_MAX_SIZES.contains(&name) {
                resolve_percent(self.host, element, name, &value)?
            } else {
                value
            };
            result.push((name.to_string(), value));
        }
        trace!(count = result.len(), "Read computed styles");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretkit_engine::Page;

    fn page(html: &str) -> Page {
        Page::from_html(html).unwrap()
    }

    #[test]
    fn test_default_style_names() {
        assert_eq!(DEFAULT_STYLE_NAMES.len(), 27);
        assert_eq!(DEFAULT_STYLE_NAMES.first(), Some(&"width"));
        assert_eq!(DEFAULT_STYLE_NAMES.last(), Some(&"overflow"));
    }

    #[test]
    fn test_styles_are_camel_cased() {
        let html = r#"<textarea id="t" style="width: 120px; padding: 3px"></textarea>"#;
        let page = page(html);
        let t = page.element_by_id("t").unwrap();
        let reader = StyleReader::new(&page);
        let snapshot = reader.styles(&t, DEFAULT_STYLE_NAMES).unwrap();

        assert_eq!(snapshot.len(), DEFAULT_STYLE_NAMES.len());
        assert_eq!(snapshot.get("paddingTop"), Some("3px"));
        assert_eq!(snapshot.get("width"), Some("120px"));
        assert_eq!(snapshot.get("whiteSpace"), Some("pre-wrap"));
        assert_eq!(snapshot.get("padding-top"), None);
    }

    #[test]
    fn test_auto_size_uses_bounding_rect() {
        let html = r#"<body style="margin: 0">
            <span id="s" style="font-family: monospace; font-size: 20px">abc</span>"#;
        let page = page(html);
        let s = page.element_by_id("s").unwrap();
        let reader = StyleReader::new(&page);
        let snapshot = reader.styles(&s, &["width", "height"]).unwrap();
        assert_eq!(snapshot.get("width"), Some("36px"));
        assert_eq!(snapshot.get("height"), Some("20px"));
    }

    #[test]
    fn test_css_text_format() {
        let html = r#"<div id="d" style="padding-left: 4px; line-height: 18px"></div>"#;
        let page = page(html);
        let d = page.element_by_id("d").unwrap();
        let css = StyleReader::new(&page)
            .css_text(&d, &["padding-left", "line-height", "box-sizing"])
            .unwrap();
        assert_eq!(
            css,
            "padding-left: 4px; line-height: 18px; box-sizing: content-box;"
        );
    }

    #[test]
    fn test_font_styles() {
        let html = r#"<p id="a" style="font: bold 20px/30px monospace"></p><p id="b"></p>"#;
        let page = page(html);
        let reader = StyleReader::new(&page);
        let by_id = |id: &str| page.element_by_id(id).unwrap();

        let a = reader.font_styles(&by_id("a")).unwrap();
        assert_eq!(a.font_family, "monospace");
        assert_eq!(a.font_size, 20.0);
        assert_eq!(a.font_weight, 700.0);
        assert_eq!(a.line_height, Some(30.0));

        let b = reader.font_styles(&by_id("b")).unwrap();
        assert_eq!(b.line_height, None);
    }

    #[test]
    fn test_scrollbar_width() {
        let html = r#"<textarea id="plain" style="width: 100px; border: 3px solid"></textarea>
            <textarea id="scroll" style="width: 100px; border: 3px solid; overflow-y: scroll">
            </textarea>"#;
        let page = page(html);
        let reader = StyleReader::new(&page);
        let by_id = |id: &str| page.element_by_id(id).unwrap();
        assert_eq!(reader.scrollbar_width(&by_id("plain")).unwrap(), 0.0);
        assert_eq!(reader.scrollbar_width(&by_id("scroll")).unwrap(), 15.0);
    }

    #[test]
    fn test_content_box_includes_overflow() {
        let html = r#"<div id="d" style="width: 50px; height: 20px; overflow: hidden">
            <div style="height: 90px"></div></div>"#;
        let page = page(html);
        let content = StyleReader::new(&page)
            .content_box(&page.element_by_id("d").unwrap())
            .unwrap();
        assert_eq!(
            content,
            ContentBox {
                width: 50.0,
                height: 90.0,
            }
        );
    }
}
