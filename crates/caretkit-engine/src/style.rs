//! Style resolution for a whole document.
//!
//! Author sheets come from `<style>` elements in the light tree and only
//! match light-tree elements. Shadow trees see the user-agent sheet and
//! their own inline styles, and inherit from their host.

use std::rc::Rc;

use caretkit_css::{
    cascade, user_agent_stylesheet, ComputedStyle, SelectorElement, StyleDeclaration, Stylesheet,
};
use caretkit_dom::{Document, Node};
use caretkit_layout::StyleMap;
use tracing::{trace, warn};

/// Element handle used for selector matching.
///
/// Ancestor walks stop at a shadow root, so page selectors with ancestor
/// parts cannot reach across the boundary.
#[derive(Clone)]
pub(crate) struct StyledElement(pub Rc<Node>);

impl SelectorElement for StyledElement {
    fn local_name(&self) -> String {
        self.0.tag_name().unwrap_or_default().to_string()
    }

    fn id(&self) -> Option<String> {
        self.0.get_attribute("id")
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().iter().any(|c| c == class)
    }

    fn parent_element(&self) -> Option<Self> {
        self.0.parent_element().map(StyledElement)
    }
}

/// Parse every `<style>` element of the light tree, in document order.
/// A sheet that fails to parse is skipped.
pub(crate) fn author_stylesheets(document: &Document) -> Vec<Stylesheet> {
    document
        .get_elements_by_tag_name("style")
        .iter()
        .filter_map(|style| match Stylesheet::parse(&style.text_content()) {
            Ok(sheet) => Some(sheet),
            Err(err) => {
                warn!(node = style.id.raw(), %err, "Ignoring unparsable <style> element");
                None
            }
        })
        .collect()
}

/// Compute the style of every element reachable from the document root,
/// shadow trees included.
pub(crate) fn resolve_styles(document: &Document, author: &[Stylesheet]) -> StyleMap {
    let author: Vec<&Stylesheet> = author.iter().collect();
    let mut styles = StyleMap::new();
    let mut resolver = Resolver {
        author: &author,
        styles: &mut styles,
    };
    resolver.walk(document.root(), None, false);
    styles
}

struct Resolver<'a> {
    author: &'a [&'a Stylesheet],
    styles: &'a mut StyleMap,
}

impl Resolver<'_> {
    fn walk(&mut self, node: &Rc<Node>, parent: Option<&ComputedStyle>, in_shadow: bool) {
        let own = node.is_element().then(|| {
            let inline = node
                .get_attribute("style")
                .map(|css| StyleDeclaration::parse(&css));
            let author: &[&Stylesheet] = if in_shadow { &[] } else { self.author };
            let cascaded = cascade(
                &StyledElement(node.clone()),
                user_agent_stylesheet(),
                author,
                inline.as_ref(),
            );
            let style = ComputedStyle::compute(parent, &cascaded);
            trace!(node = node.id.raw(), in_shadow, "Computed style");
            self.styles.insert(node.id, style.clone());
            style
        });
        let inherited = own.as_ref().or(parent);

        if let Some(shadow) = node.shadow_root() {
            for child in shadow.children() {
                self.walk(&child, inherited, true);
            }
        }
        for child in node.children() {
            self.walk(&child, inherited, in_shadow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretkit_dom::ShadowRootMode;

    #[test]
    fn test_author_sheet_applies_to_light_tree() {
        let doc = Document::parse_html(
            "<style>.big { font-size: 30px }</style><p id='p' class='big'>x</p>",
        )
        .unwrap();
        let sheets = author_stylesheets(&doc);
        assert_eq!(sheets.len(), 1);

        let styles = resolve_styles(&doc, &sheets);
        let p = doc.get_element_by_id("p").unwrap();
        assert_eq!(styles[&p.id].font_size(), 30.0);
    }

    #[test]
    fn test_shadow_tree_ignores_author_sheets_but_inherits() {
        let doc = Document::parse_html(
            "<style>div { padding-left: 9px }</style><p id='host' style='font-size: 20px'></p>",
        )
        .unwrap();
        let host = doc.get_element_by_id("host").unwrap();
        let shadow = doc.attach_shadow(&host, ShadowRootMode::Open).unwrap();
        let inner = doc.create_element("div");
        doc.append_child(&shadow, inner.clone()).unwrap();

        let styles = resolve_styles(&doc, &author_stylesheets(&doc));
        assert_eq!(styles[&inner.id].property_value("padding-left"), "0px");
        assert_eq!(styles[&inner.id].font_size(), 20.0);
    }

    #[test]
    fn test_unparsable_sheet_is_skipped() {
        let html = "<style>p { color: red</style><p>x</p>";
        let doc = Document::parse_html(html).unwrap();
        assert!(author_stylesheets(&doc).is_empty());
    }

    #[test]
    fn test_selector_parent_stops_at_shadow_root() {
        let doc = Document::blank();
        let body = doc.body().unwrap();
        let host = doc.create_element("div");
        doc.append_child(&body, host.clone()).unwrap();
        let shadow = doc.attach_shadow(&host, ShadowRootMode::Open).unwrap();
        let inner = doc.create_element("span");
        doc.append_child(&shadow, inner.clone()).unwrap();

        assert!(StyledElement(inner).parent_element().is_none());
        assert!(StyledElement(host).parent_element().is_some());
    }
}
