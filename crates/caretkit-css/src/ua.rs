//! User-agent stylesheet.

use std::sync::OnceLock;

use tracing::warn;

use crate::stylesheet::Stylesheet;

const UA_CSS: &str = r#"
html, body, div, p, section, article, header, footer, main, nav, aside,
form, fieldset, ul, ol, li, dl, dt, dd, blockquote, figure, figcaption,
h1, h2, h3, h4, h5, h6, pre, address, hr, details, summary {
    display: block;
}
head, title, meta, link, script, style, template, noscript, base {
    display: none;
}
body { margin: 8px; }
p { margin-top: 16px; margin-bottom: 16px; }
h1 { font-size: 2em; font-weight: bold; margin-top: 0.67em; margin-bottom: 0.67em; }
h2 { font-size: 1.5em; font-weight: bold; margin-top: 0.83em; margin-bottom: 0.83em; }
pre { white-space: pre; font-family: monospace; margin-top: 13px; margin-bottom: 13px; }
code, kbd, samp, tt { font-family: monospace; }
b, strong { font-weight: bolder; }
i, em { font-style: italic; }
ul, ol { padding-left: 40px; margin-top: 16px; margin-bottom: 16px; }
blockquote { margin: 16px 40px; }
textarea {
    display: inline-block;
    font-family: monospace;
    font-size: 13px;
    white-space: pre-wrap;
    overflow-wrap: break-word;
    overflow: auto;
    padding: 2px;
    border: 1px solid rgb(118, 118, 118);
}
input {
    display: inline-block;
    font-size: 13px;
    white-space: pre;
    padding: 1px 2px;
    border: 2px inset rgb(118, 118, 118);
}
"#;

/// The shared user-agent stylesheet, parsed on first use.
pub fn user_agent_stylesheet() -> &'static Stylesheet {
    static SHEET: OnceLock<Stylesheet> = OnceLock::new();
    SHEET.get_or_init(|| {
        Stylesheet::parse(UA_CSS).unwrap_or_else(|err| {
            warn!(%err, "User-agent stylesheet failed to parse");
            Stylesheet::new()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ua_sheet_parses() {
        assert!(Stylesheet::parse(UA_CSS).is_ok());
        assert!(user_agent_stylesheet().rule_count() > 10);
    }

    #[test]
    fn test_textarea_defaults() {
        let rule = user_agent_stylesheet()
            .rules
            .iter()
            .find(|r| r.declarations.get("white-space") == Some("pre-wrap"))
            .unwrap();
        assert_eq!(rule.declarations.get("display"), Some("inline-block"));
        assert_eq!(rule.declarations.get("padding-left"), Some("2px"));
        assert_eq!(rule.declarations.get("border-left-width"), Some("1px"));
    }
}
