//! Percentage min/max sizes resolved against the parent's content box.
//!
//! A mirror lives in a different containing block than its source, so a
//! percentage copied verbatim would resolve against the wrong box.

use caretkit_css::{format_px, parse_leading_number};
use tracing::trace;

use crate::error::{MeasureError, Result};
use crate::host::DomHost;

/// Resolve `raw` to pixels when it is a percentage.
///
/// Values without `%` come back unchanged, as does a percentage that does
/// not start with a number. An element without a parent element resolves
/// to `none`. Properties whose name contains `height` use the parent's
/// content height, every other property its content width.
pub fn resolve_percent<H: DomHost>(
    host: &H,
    element: &H::Node,
    name: &str,
    raw: &str,
) -> Result<String> {
    if !raw.contains('%') {
        return Ok(raw.to_string());
    }
    let Some(percent) = parse_leading_number(raw) else {
        return Ok(raw.to_string());
    };
    let Some(parent) = host.parent_element(element) else {
        return Ok("none".to_string());
    };

    let px = |property: &str| -> Result<f32> {
        let value = host
            .computed_style(&parent, property)
            .map_err(MeasureError::host)?;
        Ok(parse_leading_number(&value).unwrap_or(0.0))
    };

    let mut content_width = px("width")?;
    let mut content_height = px("height")?;
    let box_sizing = host
        .computed_style(&parent, "box-sizing")
        .map_err(MeasureError::host)?;
    if box_sizing == "border-box" {
        content_width -= px("padding-left")?
            + px("padding-right")?
            + px("border-left-width")?
            + px("border-right-width")?;
        content_height -= px("padding-top")?
            + px("padding-bottom")?
            + px("border-top-width")?
            + px("border-bottom-width")?;
    }

    let basis = if name.contains("height") {
        content_height
    } else {
        content_width
    };
    let resolved = format_px(basis * percent / 100.0);
    trace!(property = name, raw, %resolved, "Resolved percentage");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretkit_engine::Page;

    fn resolve(html: &str, name: &str, raw: &str) -> String {
        let page = Page::from_html(html).unwrap();
        let child = page.element_by_id("child").unwrap();
        resolve_percent(&page, &child, name, raw).unwrap()
    }

    #[test]
    fn test_non_percent_unchanged() {
        let html = r#"<body><div><p id="child"></p></div></body>"#;
        assert_eq!(resolve(html, "max-width", "none"), "none");
        assert_eq!(resolve(html, "min-height", "12px"), "12px");
    }

    #[test]
    fn test_content_box_parent() {
        let html = r#"<div style="width: 200px; height: 60px; padding: 7px">
            <p id="child"></p></div>"#;
        assert_eq!(resolve(html, "max-width", "50%"), "100px");
        assert_eq!(resolve(html, "min-height", "50%"), "30px");
    }

    #[test]
    fn test_border_box_parent() {
        let html = r#"<div style="width: 200px; height: 100px; box-sizing: border-box;
            padding: 10px; border: 2px solid"><p id="child"></p></div>"#;
        assert_eq!(resolve(html, "max-width", "50%"), "88px");
        assert_eq!(resolve(html, "max-height", "50%"), "38px");
    }

    #[test]
    fn test_directional_borders() {
        let html = r#"<div style="width: 200px; box-sizing: border-box;
            border-left: 10px solid; border-right: 30px solid"><p id="child"></p></div>"#;
        assert_eq!(resolve(html, "min-width", "25%"), "40px");
    }

    #[test]
    fn test_fractional_result() {
        let html = r#"<body><div style="width: 85px"><p id="child"></p></div></body>"#;
        assert_eq!(resolve(html, "max-width", "50%"), "42.5px");
    }

    #[test]
    fn test_no_parent_element() {
        let page = Page::blank();
        let html = page.document().document_element().unwrap();
        let resolved = resolve_percent(&page, &html, "max-width", "50%").unwrap();
        assert_eq!(resolved, "none");
    }
}
