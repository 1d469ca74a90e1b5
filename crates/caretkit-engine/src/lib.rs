//! # CaretKit Engine
//!
//! Page orchestration layer that ties the DOM, CSS and layout crates
//! together and answers the geometry queries a browser exposes through
//! CSSOM: `getComputedStyle`, `offsetParent`, `offsetLeft/Top/Width/Height`,
//! `clientWidth`, `scrollWidth` and `getBoundingClientRect`.
//!
//! ## Design Goals
//!
//! 1. **Lazy rendering**: Styles and layout are computed on the first query
//! 2. **Cheap invalidation**: A cached render is reused until the document's
//!    generation counter moves
//! 3. **Browser-shaped answers**: Queries return what a browser would,
//!    including for unrendered and inline elements

mod style;

use std::cell::RefCell;
use std::rc::Rc;

use caretkit_css::{format_px, BoxSizing, CssError, Position, Stylesheet};
use caretkit_dom::{Document, DomError, Node, ShadowRootMode};
use caretkit_layout::{layout_document, BoxGeometry, LayoutError, LayoutResult, Rect, StyleMap};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur in the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("CSS error: {0}")]
    Css(#[from] CssError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Page configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageConfig {
    /// Width of the initial containing block.
    pub viewport_width: f32,
    /// Height of the initial containing block.
    pub viewport_height: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            viewport_height: 768.0,
        }
    }
}

/// `offsetLeft`, `offsetTop`, `offsetWidth` and `offsetHeight` of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OffsetRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Styles and layout for one document generation.
struct Rendered {
    generation: u64,
    styles: StyleMap,
    layout: LayoutResult,
}

/// A document with its styles and layout.
pub struct Page {
    document: Document,
    config: PageConfig,
    rendered: RefCell<Option<Rc<Rendered>>>,
}

impl Page {
    /// Create a page around an existing document.
    pub fn new(document: Document, config: PageConfig) -> Self {
        info!(
            viewport_width = config.viewport_width,
            viewport_height = config.viewport_height,
            "Creating page"
        );
        Self {
            document,
            config,
            rendered: RefCell::new(None),
        }
    }

    /// Parse `html` into a page with the default configuration.
    pub fn from_html(html: &str) -> Result<Self, EngineError> {
        Self::from_html_with_config(html, PageConfig::default())
    }

    /// Parse `html` into a page.
    pub fn from_html_with_config(html: &str, config: PageConfig) -> Result<Self, EngineError> {
        Ok(Self::new(Document::parse_html(html)?, config))
    }

    /// An empty page with a `<head>` and a `<body>`.
    pub fn blank() -> Self {
        Self::new(Document::blank(), PageConfig::default())
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Page configuration.
    pub fn config(&self) -> PageConfig {
        self.config
    }

    /// Resize the viewport. The next query lays the page out again.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        *self.rendered.get_mut() = None;
    }

    /// Add an author stylesheet as a `<style>` element at the end of
    /// `<head>`, or of the document element when there is no head.
    pub fn add_style_sheet(&mut self, css: &str) -> Result<(), EngineError> {
        Stylesheet::parse(css)?;
        let parent = self
            .document
            .head()
            .or_else(|| self.document.document_element())
            .ok_or(DomError::NodeNotFound)?;
        let style = self.document.create_element("style");
        self.document
            .append_child(&style, self.document.create_text_node(css))?;
        self.document.append_child(&parent, style)?;
        Ok(())
    }

    // ==================== Document access ====================

    pub fn body(&self) -> Option<Rc<Node>> {
        self.document.body()
    }

    pub fn element_by_id(&self, id: &str) -> Option<Rc<Node>> {
        self.document.get_element_by_id(id)
    }

    pub fn create_element(&mut self, tag_name: &str) -> Rc<Node> {
        self.document.create_element(tag_name)
    }

    pub fn create_text_node(&mut self, data: &str) -> Rc<Node> {
        self.document.create_text_node(data)
    }

    pub fn append_child(&mut self, parent: &Rc<Node>, child: Rc<Node>) -> Result<(), EngineError> {
        Ok(self.document.append_child(parent, child)?)
    }

    pub fn remove_child(&mut self, parent: &Rc<Node>, child: &Rc<Node>) -> Result<(), EngineError> {
        self.document.remove_child(parent, child)?;
        Ok(())
    }

    pub fn replace_children(
        &mut self,
        parent: &Rc<Node>,
        children: Vec<Rc<Node>>,
    ) -> Result<(), EngineError> {
        Ok(self.document.replace_children(parent, children)?)
    }

    pub fn set_attribute(
        &mut self,
        node: &Rc<Node>,
        name: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        Ok(self.document.set_attribute(node, name, value)?)
    }

    pub fn attach_shadow(&mut self, host: &Rc<Node>) -> Result<Rc<Node>, EngineError> {
        Ok(self.document.attach_shadow(host, ShadowRootMode::Open)?)
    }

    // ==================== Rendering ====================

    /// Styles and layout for the current document generation.
    fn rendered(&self) -> Result<Rc<Rendered>, EngineError> {
        let generation = self.document.generation();
        if let Some(rendered) = self.rendered.borrow().as_ref() {
            if rendered.generation == generation {
                return Ok(rendered.clone());
            }
        }

        let sheets = style::author_stylesheets(&self.document);
        let styles = style::resolve_styles(&self.document, &sheets);
        let layout = layout_document(
            &self.document,
            &styles,
            self.config.viewport_width,
            self.config.viewport_height,
        )?;
        debug!(
            generation,
            author_sheets = sheets.len(),
            styled = styles.len(),
            boxes = layout.len(),
            "Page rendered"
        );

        let rendered = Rc::new(Rendered {
            generation,
            styles,
            layout,
        });
        self.rendered.replace(Some(rendered.clone()));
        Ok(rendered)
    }

    /// Run `f` against the geometry of `node`; `None` when it has no box.
    fn with_geometry<R>(
        &self,
        node: &Node,
        f: impl FnOnce(&BoxGeometry) -> R,
    ) -> Result<Option<R>, EngineError> {
        let rendered = self.rendered()?;
        Ok(rendered.layout.get(node.id).map(f))
    }

    // ==================== CSSOM queries ====================

    /// `getComputedStyle(node).getPropertyValue(name)`.
    ///
    /// `width` and `height` resolve to used pixel sizes for rendered boxes
    /// that are not inline, measured on the border box under
    /// `box-sizing: border-box`. Inline boxes report `auto`. Elements
    /// without a style (detached, or not elements) give an empty string.
    pub fn computed_style(&self, node: &Node, name: &str) -> Result<String, EngineError> {
        let rendered = self.rendered()?;
        let Some(style) = rendered.styles.get(&node.id) else {
            return Ok(String::new());
        };

        if name == "width" || name == "height" {
            if let Some(geometry) = rendered.layout.get(node.id) {
                if geometry.is_inline() {
                    return Ok("auto".to_string());
                }
                let dims = &geometry.dimensions;
                let border_box = style.box_sizing() == BoxSizing::BorderBox;
                let used = match (name, border_box) {
                    ("width", true) => dims.border_box().width,
                    ("width", false) => dims.content.width + dims.scrollbar,
                    (_, true) => dims.border_box().height,
                    _ => dims.content.height,
                };
                return Ok(format_px(used));
            }
        }
        Ok(style.property_value(name))
    }

    /// `offsetParent`: the nearest positioned ancestor in the flat tree,
    /// crossing shadow roots to their hosts, or `<body>`.
    ///
    /// `None` for unrendered elements, for `<body>` and `<html>`, and for
    /// `position: fixed` boxes.
    pub fn offset_parent(&self, node: &Node) -> Result<Option<Rc<Node>>, EngineError> {
        let rendered = self.rendered()?;
        if rendered.layout.get(node.id).is_none()
            || matches!(node.tag_name(), Some("body" | "html"))
        {
            return Ok(None);
        }
        let Some(style) = rendered.styles.get(&node.id) else {
            return Ok(None);
        };
        if style.position() == Position::Fixed {
            return Ok(None);
        }

        let mut current = flat_tree_parent(node);
        while let Some(ancestor) = current {
            if ancestor.tag_name() == Some("body") {
                return Ok(Some(ancestor));
            }
            let positioned = rendered
                .styles
                .get(&ancestor.id)
                .is_some_and(|s| s.position() != Position::Static);
            if positioned {
                return Ok(Some(ancestor));
            }
            current = flat_tree_parent(&ancestor);
        }
        Ok(None)
    }

    /// `offsetLeft/Top/Width/Height`.
    ///
    /// The position is that of the first box fragment's border edge, relative
    /// to the offsetParent's padding edge, or to the page when the
    /// offsetParent is `<body>` or absent. The size is the bounding box of
    /// every fragment. Unrendered elements give all zeros.
    pub fn offset_rect(&self, node: &Node) -> Result<OffsetRect, EngineError> {
        let rendered = self.rendered()?;
        let Some(geometry) = rendered.layout.get(node.id) else {
            return Ok(OffsetRect::default());
        };
        let (mut left, mut top) = geometry.first_fragment_origin();
        let size = geometry.border_box();

        if let Some(parent) = self.offset_parent(node)? {
            if parent.tag_name() != Some("body") {
                if let Some(parent_geometry) = rendered.layout.get(parent.id) {
                    let (px, py) = padding_edge(parent_geometry);
                    left -= px;
                    top -= py;
                }
            }
        }

        Ok(OffsetRect {
            left,
            top,
            width: size.width,
            height: size.height,
        })
    }

    /// `clientWidth`: padding box width without the scrollbar, zero for
    /// inline and unrendered elements.
    pub fn client_width(&self, node: &Node) -> Result<f32, EngineError> {
        let width = self.with_geometry(node, BoxGeometry::client_width)?;
        Ok(width.unwrap_or(0.0))
    }

    /// `clientHeight`.
    pub fn client_height(&self, node: &Node) -> Result<f32, EngineError> {
        let height = self.with_geometry(node, BoxGeometry::client_height)?;
        Ok(height.unwrap_or(0.0))
    }

    /// `scrollWidth`.
    pub fn scroll_width(&self, node: &Node) -> Result<f32, EngineError> {
        let width = self.with_geometry(node, |g| scroll_size(g).0)?;
        Ok(width.unwrap_or(0.0))
    }

    /// `scrollHeight`.
    pub fn scroll_height(&self, node: &Node) -> Result<f32, EngineError> {
        let height = self.with_geometry(node, |g| scroll_size(g).1)?;
        Ok(height.unwrap_or(0.0))
    }

    /// `getBoundingClientRect()`. The page never scrolls, so this is the
    /// border box in page coordinates.
    pub fn bounding_client_rect(&self, node: &Node) -> Result<Rect, EngineError> {
        Ok(self
            .with_geometry(node, BoxGeometry::border_box)?
            .unwrap_or_else(Rect::zero))
    }
}

/// Parent in the flat tree: a shadow root's children continue at the host.
fn flat_tree_parent(node: &Node) -> Option<Rc<Node>> {
    let parent = node.parent()?;
    if parent.is_shadow_root() {
        return parent.host();
    }
    parent.is_element().then_some(parent)
}

/// Scroll width and height. Inline boxes do not scroll.
fn scroll_size(geometry: &BoxGeometry) -> (f32, f32) {
    if geometry.is_inline() {
        (0.0, 0.0)
    } else {
        (geometry.scroll.width, geometry.scroll.height)
    }
}

fn padding_edge(geometry: &BoxGeometry) -> (f32, f32) {
    let (x, y) = geometry.first_fragment_origin();
    let border = &geometry.dimensions.border;
    (x + border.left, y + border.top)
}
