//! # CaretKit Layout
//!
//! Layout engine for the CaretKit host environment.
//! Implements block and inline layout over a styled document.
//!
//! ## Design Goals
//!
//! 1. **Block layout**: Stack boxes vertically with box-sizing, min/max and percentages
//! 2. **Inline layout**: Flow text and inline elements horizontally with wrapping
//! 3. **Positioning**: Place absolutely positioned boxes at their static position
//! 4. **Overflow**: Reserve scrollbar space and report scroll extents
//!
//! Shadow trees render in place of their host's light children, so a shadow
//! host's light children get no geometry.

pub mod inline;
pub mod scroll;
pub mod text;

use std::collections::HashMap;
use std::rc::Rc;

use caretkit_css::{BoxSizing, ComputedStyle, Display, Length, Position, Side, ROOT_FONT_SIZE};
use caretkit_dom::{Document, Node, NodeId, NodeType};
use thiserror::Error;
use tracing::debug;

use crate::scroll::{
    always_shows_vertical_scrollbar, is_scroll_container, overflows_vertically, ScrollExtent,
    SCROLLBAR_WIDTH,
};

pub use text::TextMetrics;

/// Errors that can occur in layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Layout failed: {0}")]
    LayoutFailed(String),

    #[error("No computed style for node {0:?}")]
    MissingStyle(NodeId),
}

/// Computed styles of every element, keyed by node.
pub type StyleMap = HashMap<NodeId, ComputedStyle>;

/// Width used to measure max-content sizes.
const MEASURE_WIDTH: f32 = 1.0e6;

/// A 2D rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Edge sizes (margin, padding, border).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    /// Build from a per-side function.
    pub fn from_sides(mut f: impl FnMut(Side) -> f32) -> Self {
        Self {
            top: f(Side::Top),
            right: f(Side::Right),
            bottom: f(Side::Bottom),
            left: f(Side::Left),
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Box dimensions including content, padding, border, and margin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    /// Content area.
    pub content: Rect,
    /// Padding.
    pub padding: EdgeSizes,
    /// Border.
    pub border: EdgeSizes,
    /// Margin.
    pub margin: EdgeSizes,
    /// Vertical scrollbar width, between the padding box and the right border.
    pub scrollbar: f32,
}

impl Dimensions {
    /// Get the padding box (content + padding).
    pub fn padding_box(&self) -> Rect {
        Rect {
            x: self.content.x - self.padding.left,
            y: self.content.y - self.padding.top,
            width: self.content.width + self.padding.horizontal(),
            height: self.content.height + self.padding.vertical(),
        }
    }

    /// Get the border box (content + padding + scrollbar + border).
    pub fn border_box(&self) -> Rect {
        let pb = self.padding_box();
        Rect {
            x: pb.x - self.border.left,
            y: pb.y - self.border.top,
            width: pb.width + self.scrollbar + self.border.horizontal(),
            height: pb.height + self.border.vertical(),
        }
    }

    /// Get the margin box (content + padding + border + margin).
    pub fn margin_box(&self) -> Rect {
        let bb = self.border_box();
        Rect {
            x: bb.x - self.margin.left,
            y: bb.y - self.margin.top,
            width: bb.width + self.margin.horizontal(),
            height: bb.height + self.margin.vertical(),
        }
    }
}

/// Layout output for one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxGeometry {
    /// Box dimensions. For inline boxes, the content rect spans all fragments.
    pub dimensions: Dimensions,
    /// Border-box fragments, one per line, for inline boxes. Empty for
    /// block-level and atomic boxes.
    pub fragments: Vec<Rect>,
    /// Scroll extents.
    pub scroll: ScrollExtent,
}

impl BoxGeometry {
    /// Whether this is a non-atomic inline box.
    pub fn is_inline(&self) -> bool {
        !self.fragments.is_empty()
    }

    /// Border box, or the union of all fragments for inline boxes.
    pub fn border_box(&self) -> Rect {
        self.fragments
            .iter()
            .copied()
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| self.dimensions.border_box())
    }

    /// Top-left border edge of the first box fragment.
    pub fn first_fragment_origin(&self) -> (f32, f32) {
        let first = self
            .fragments
            .first()
            .copied()
            .unwrap_or_else(|| self.dimensions.border_box());
        (first.x, first.y)
    }

    /// Padding box minus the scrollbar; zero for inline boxes.
    pub fn client_width(&self) -> f32 {
        if self.is_inline() {
            0.0
        } else {
            self.dimensions.padding_box().width
        }
    }

    /// Padding box height; zero for inline boxes.
    pub fn client_height(&self) -> f32 {
        if self.is_inline() {
            0.0
        } else {
            self.dimensions.padding_box().height
        }
    }
}

/// Geometry of every rendered element.
#[derive(Debug, Default)]
pub struct LayoutResult {
    boxes: HashMap<NodeId, BoxGeometry>,
    /// Initial containing block.
    pub viewport: Rect,
}

impl LayoutResult {
    /// Geometry of `node`, `None` when it is not rendered.
    pub fn get(&self, node: NodeId) -> Option<&BoxGeometry> {
        self.boxes.get(&node)
    }

    /// Number of rendered elements.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// The box positioned descendants are placed against (a padding box).
#[derive(Debug, Clone, Copy)]
pub(crate) struct AbsContainer {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: Option<f32>,
}

/// Containing block for in-flow children.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContainingBlock {
    pub width: f32,
    /// Definite height, `None` when it depends on content.
    pub height: Option<f32>,
    pub abs: AbsContainer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum WidthMode {
    /// Fill the containing block.
    Fill,
    /// Shrink to the content, at most the given width.
    ShrinkToFit(f32),
}

/// How a child takes part in its parent's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Participation {
    Skip,
    InlineLevel,
    BlockLevel,
    OutOfFlow,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BlockOutcome {
    pub margin_width: f32,
    pub margin_height: f32,
    /// Max-content contribution including margins.
    pub extent: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct ContentOutcome {
    height: f32,
    extent: f32,
}

/// Resolve a computed length against `basis`; `auto` is zero.
pub(crate) fn resolve(length: Length, basis: f32) -> f32 {
    length.to_px(ROOT_FONT_SIZE, ROOT_FONT_SIZE, basis)
}

/// Resolve a computed length, `None` for `auto` or a percentage of an
/// indefinite basis.
fn resolve_definite(length: Length, basis: Option<f32>) -> Option<f32> {
    match length {
        Length::Auto => None,
        Length::Percent(pct) => basis.map(|b| pct / 100.0 * b),
        other => Some(resolve(other, 0.0)),
    }
}

/// Children that render inside `node`: the shadow tree when there is one.
pub fn rendered_children(node: &Node) -> Vec<Rc<Node>> {
    match node.shadow_root() {
        Some(shadow) => shadow.children(),
        None => node.children(),
    }
}

/// Lay out `document` in a viewport of the given size.
pub fn layout_document(
    document: &Document,
    styles: &StyleMap,
    viewport_width: f32,
    viewport_height: f32,
) -> Result<LayoutResult, LayoutError> {
    if !(viewport_width.is_finite() && viewport_height.is_finite())
        || viewport_width < 0.0
        || viewport_height < 0.0
    {
        return Err(LayoutError::LayoutFailed(format!(
            "invalid viewport {viewport_width}x{viewport_height}"
        )));
    }

    let viewport = Rect::new(0.0, 0.0, viewport_width, viewport_height);
    let mut ctx = LayoutContext {
        styles,
        boxes: HashMap::new(),
        viewport,
    };

    if let Some(root) = document.document_element() {
        if ctx.participation(&root)? != Participation::Skip {
            let icb = ctx.viewport_block();
            ctx.layout_block(&root, 0.0, 0.0, &icb, WidthMode::Fill)?;
        }
    }

    debug!(
        boxes = ctx.boxes.len(),
        viewport_width,
        viewport_height,
        "Layout complete"
    );
    Ok(LayoutResult {
        boxes: ctx.boxes,
        viewport,
    })
}

/// State of one layout pass.
pub(crate) struct LayoutContext<'a> {
    styles: &'a StyleMap,
    boxes: HashMap<NodeId, BoxGeometry>,
    viewport: Rect,
}

impl<'a> LayoutContext<'a> {
    pub(crate) fn style(&self, node: &Node) -> Result<&'a ComputedStyle, LayoutError> {
        self.styles
            .get(&node.id)
            .ok_or(LayoutError::MissingStyle(node.id))
    }

    pub(crate) fn record(&mut self, node: NodeId, geometry: BoxGeometry) {
        self.boxes.insert(node, geometry);
    }

    fn viewport_block(&self) -> ContainingBlock {
        let abs = AbsContainer {
            x: self.viewport.x,
            y: self.viewport.y,
            width: self.viewport.width,
            height: Some(self.viewport.height),
        };
        ContainingBlock {
            width: abs.width,
            height: abs.height,
            abs,
        }
    }

    pub(crate) fn participation(&self, node: &Node) -> Result<Participation, LayoutError> {
        match node.node_type {
            NodeType::Text(_) => Ok(Participation::InlineLevel),
            NodeType::Element { .. } => {
                let style = self.style(node)?;
                Ok(match style.display() {
                    Display::None => Participation::Skip,
                    _ if style.position().is_out_of_flow() => Participation::OutOfFlow,
                    Display::Block => Participation::BlockLevel,
                    Display::Inline | Display::InlineBlock => Participation::InlineLevel,
                })
            }
            _ => Ok(Participation::Skip),
        }
    }

    /// Lay out a block container whose margin box starts at (`x`, `y`).
    pub(crate) fn layout_block(
        &mut self,
        node: &Rc<Node>,
        x: f32,
        y: f32,
        cb: &ContainingBlock,
        mode: WidthMode,
    ) -> Result<BlockOutcome, LayoutError> {
        let style = self.style(node)?;

        let mut margin = EdgeSizes::from_sides(|side| resolve(style.margin(side), cb.width));
        let padding = EdgeSizes::from_sides(|side| resolve(style.padding(side), cb.width));
        let border = EdgeSizes::from_sides(|side| style.border_width(side));
        let frame_h = padding.horizontal() + border.horizontal();
        let frame_v = padding.vertical() + border.vertical();

        let border_box_sizing = style.box_sizing() == BoxSizing::BorderBox;
        let inner_w = |w: f32| (if border_box_sizing { w - frame_h } else { w }).max(0.0);
        let inner_h = |h: f32| (if border_box_sizing { h - frame_v } else { h }).max(0.0);

        let clamp_width = |w: f32| {
            let max = style
                .max_width()
                .and_then(|l| resolve_definite(l, Some(cb.width)))
                .map(inner_w);
            let min = resolve_definite(style.min_width(), Some(cb.width));
            let min = min.map(inner_w);
            let w = max.map_or(w, |max| w.min(max));
            min.map_or(w, |min| w.max(min))
        };
        let clamp_height = |h: f32| {
            let max = style
                .max_height()
                .and_then(|l| resolve_definite(l, cb.height))
                .map(inner_h);
            let min = resolve_definite(style.min_height(), cb.height);
            let min = min.map(inner_h);
            let h = max.map_or(h, |max| h.min(max));
            min.map_or(h, |min| h.max(min))
        };

        let overflow_y = style.overflow_y();
        let scroll_container = is_scroll_container(style.overflow_x(), overflow_y);
        let mut scrollbar = if scroll_container && always_shows_vertical_scrollbar(overflow_y) {
            SCROLLBAR_WIDTH
        } else {
            0.0
        };

        let specified_width = resolve_definite(style.width(), Some(cb.width));
        let specified_width = specified_width.map(inner_w);
        let inner_width = match (specified_width, mode) {
            (Some(w), _) => w,
            (None, WidthMode::Fill) => (cb.width - margin.horizontal() - frame_h).max(0.0),
            (None, WidthMode::ShrinkToFit(available)) => {
                let trial_cb = ContainingBlock {
                    width: MEASURE_WIDTH,
                    height: None,
                    abs: cb.abs,
                };
                let trial = self.layout_contents(node, style, (0.0, 0.0), &trial_cb)?;
                let available = (available - margin.horizontal() - frame_h).max(0.0);
                (trial.extent + scrollbar).min(available)
            }
        };
        let inner_width = clamp_width(inner_width);

        if specified_width.is_some() && mode == WidthMode::Fill {
            let free = cb.width - inner_width - frame_h;
            match (style.margin(Side::Left).is_auto(), style.margin(Side::Right).is_auto()) {
                (true, true) => {
                    margin.left = (free / 2.0).max(0.0);
                    margin.right = margin.left;
                }
                (true, false) => margin.left = (free - margin.right).max(0.0),
                (false, true) => margin.right = (free - margin.left).max(0.0),
                (false, false) => {}
            }
        }

        let content_x = x + margin.left + border.left + padding.left;
        let content_y = y + margin.top + border.top + padding.top;
        let specified_height = resolve_definite(style.height(), cb.height).map(inner_h);
        let definite_height = specified_height.map(clamp_height);
        let positioned = style.position() != Position::Static;

        loop {
            let content_width = (inner_width - scrollbar).max(0.0);
            let abs = if positioned {
                AbsContainer {
                    x: content_x - padding.left,
                    y: content_y - padding.top,
                    width: content_width + padding.horizontal(),
                    height: definite_height.map(|h| h + padding.vertical()),
                }
            } else {
                cb.abs
            };
            let child_cb = ContainingBlock {
                width: content_width,
                height: definite_height,
                abs,
            };
            let contents = self.layout_contents(node, style, (content_x, content_y), &child_cb)?;
            let height = match definite_height {
                Some(height) => height,
                None => clamp_height(contents.height),
            };

            if scrollbar == 0.0
                && scroll_container
                && inner_width > 0.0
                && overflows_vertically(overflow_y, contents.height, height)
            {
                scrollbar = SCROLLBAR_WIDTH.min(inner_width);
                continue;
            }

            let dimensions = Dimensions {
                content: Rect::new(content_x, content_y, content_width, height),
                padding,
                border,
                margin,
                scrollbar,
            };
            let scroll = ScrollExtent::new(
                content_width + padding.horizontal(),
                height + padding.vertical(),
                padding.horizontal(),
                padding.vertical(),
                contents.extent,
                contents.height,
            );
            let margin_box = dimensions.margin_box();
            self.record(
                node.id,
                BoxGeometry {
                    dimensions,
                    fragments: Vec::new(),
                    scroll,
                },
            );

            let extent = match specified_width {
                Some(_) => margin_box.width,
                None => contents.extent + scrollbar + frame_h + margin.horizontal(),
            };
            return Ok(BlockOutcome {
                margin_width: margin_box.width,
                margin_height: margin_box.height,
                extent,
            });
        }
    }

    /// Lay out the rendered children of `node` inside its content box.
    fn layout_contents(
        &mut self,
        node: &Rc<Node>,
        style: &ComputedStyle,
        origin: (f32, f32),
        cb: &ContainingBlock,
    ) -> Result<ContentOutcome, LayoutError> {
        let children = rendered_children(node);

        let mut has_block_child = false;
        for child in &children {
            if self.participation(child)? == Participation::BlockLevel {
                has_block_child = true;
                break;
            }
        }

        if !has_block_child {
            let inline = self.layout_inline(style, &children, origin, cb)?;
            for absolute in &inline.absolutes {
                self.layout_absolute(absolute, origin.0, origin.1 + inline.height, cb)?;
            }
            return Ok(ContentOutcome {
                height: inline.height,
                extent: inline.extent,
            });
        }

        let mut cursor = origin.1;
        let mut extent: f32 = 0.0;
        let mut run: Vec<Rc<Node>> = Vec::new();

        for child in children {
            match self.participation(&child)? {
                Participation::Skip => {}
                Participation::InlineLevel => run.push(child),
                Participation::OutOfFlow => {
                    self.flush_inline_run(style, &mut run, origin.0, &mut cursor, &mut extent, cb)?;
                    self.layout_absolute(&child, origin.0, cursor, cb)?;
                }
                Participation::BlockLevel => {
                    self.flush_inline_run(style, &mut run, origin.0, &mut cursor, &mut extent, cb)?;
                    let outcome = self.layout_block(&child, origin.0, cursor, cb, WidthMode::Fill)?;
                    cursor += outcome.margin_height;
                    extent = extent.max(outcome.extent);
                }
            }
        }
        self.flush_inline_run(style, &mut run, origin.0, &mut cursor, &mut extent, cb)?;

        Ok(ContentOutcome {
            height: cursor - origin.1,
            extent,
        })
    }

    /// Lay out a run of inline-level children as an anonymous block.
    fn flush_inline_run(
        &mut self,
        style: &ComputedStyle,
        run: &mut Vec<Rc<Node>>,
        x: f32,
        cursor: &mut f32,
        extent: &mut f32,
        cb: &ContainingBlock,
    ) -> Result<(), LayoutError> {
        if run.is_empty() {
            return Ok(());
        }
        let children = std::mem::take(run);
        let inline = self.layout_inline(style, &children, (x, *cursor), cb)?;
        *cursor += inline.height;
        *extent = extent.max(inline.extent);
        for absolute in &inline.absolutes {
            self.layout_absolute(absolute, x, *cursor, cb)?;
        }
        Ok(())
    }

    /// Lay out an absolutely or fixed positioned box. Insets that are `auto`
    /// leave the box at its static position.
    fn layout_absolute(
        &mut self,
        node: &Rc<Node>,
        static_x: f32,
        static_y: f32,
        cb: &ContainingBlock,
    ) -> Result<(), LayoutError> {
        let style = self.style(node)?;
        let container = if style.position() == Position::Fixed {
            self.viewport_block().abs
        } else {
            cb.abs
        };

        let left = resolve_definite(style.inset(Side::Left), Some(container.width));
        let top = resolve_definite(style.inset(Side::Top), container.height);
        let x = left.map_or(static_x, |l| container.x + l);
        let y = top.map_or(static_y, |t| container.y + t);

        let abs_cb = ContainingBlock {
            width: container.width,
            height: container.height,
            abs: container,
        };
        self.layout_block(node, x, y, &abs_cb, WidthMode::ShrinkToFit(container.width))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretkit_css::{cascade, user_agent_stylesheet, StyleDeclaration, SelectorElement};

    struct El(Rc<Node>);

    impl SelectorElement for El {
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
            self.0.parent_element().map(El)
        }
    }

    /// Compute styles with the UA sheet and inline styles only.
    fn styles_for(doc: &Document) -> StyleMap {
        fn walk(node: &Rc<Node>, parent: Option<&ComputedStyle>, map: &mut StyleMap) {
            let mut own = None;
            if node.is_element() {
                let inline = node.get_attribute("style");
                let inline = inline.map(|s| StyleDeclaration::parse(&s));
                let ua = user_agent_stylesheet();
                let cascaded = cascade(&El(node.clone()), ua, &[], inline.as_ref());
                let style = ComputedStyle::compute(parent, &cascaded);
                map.insert(node.id, style);
                own = map.get(&node.id).cloned();
            }
            let parent_style = own.as_ref().or(parent);
            if let Some(shadow) = node.shadow_root() {
                for child in shadow.children() {
                    walk(&child, parent_style, map);
                }
            }
            for child in node.children() {
                walk(&child, parent_style, map);
            }
        }
        let mut map = StyleMap::new();
        walk(doc.root(), None, &mut map);
        map
    }

    fn layout(html: &str) -> (Document, LayoutResult) {
        let doc = Document::parse_html(html).unwrap();
        let styles = styles_for(&doc);
        let result = layout_document(&doc, &styles, 800.0, 600.0).unwrap();
        (doc, result)
    }

    fn geometry<'r>(doc: &Document, result: &'r LayoutResult, id: &str) -> &'r BoxGeometry {
        let node = doc.get_element_by_id(id).unwrap();
        result.get(node.id).unwrap()
    }

    const MONO: &str = "font-family: monospace; font-size: 20px; line-height: 30px";

    #[test]
    fn test_rect() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert!(r.contains(50.0, 30.0));
        assert!(!r.contains(0.0, 0.0));
        let u = r.union(&Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(u, Rect::new(0.0, 0.0, 110.0, 70.0));
    }

    #[test]
    fn test_dimensions_boxes() {
        let d = Dimensions {
            content: Rect::new(20.0, 20.0, 100.0, 50.0),
            padding: EdgeSizes::from_sides(|_| 5.0),
            border: EdgeSizes::from_sides(|_| 1.0),
            margin: EdgeSizes::from_sides(|_| 10.0),
            scrollbar: 15.0,
        };

        let pb = d.padding_box();
        assert_eq!(pb.width, 110.0);
        assert_eq!(pb.height, 60.0);

        let bb = d.border_box();
        assert_eq!(bb.width, 127.0);
        assert_eq!(bb.height, 62.0);

        let mb = d.margin_box();
        assert_eq!(mb.width, 147.0);
        assert_eq!(mb.height, 82.0);
    }

    #[test]
    fn test_body_margin_and_block_width() {
        let (doc, result) = layout(r#"<body><div id="a" style="height: 10px"></div></body>"#);
        let a = geometry(&doc, &result, "a");
        assert_eq!(a.border_box(), Rect::new(8.0, 8.0, 784.0, 10.0));
    }

    #[test]
    fn test_box_sizing_and_percent_width() {
        let (doc, result) = layout(
            r#"<body><div style="width: 200px">
                <div id="c" style="width: 50%; padding: 10px; border: 2px solid"></div>
                <div id="b" style="width: 50%; padding: 10px; border: 2px solid;
                    box-sizing: border-box"></div>
            </div></body>"#,
        );
        assert_eq!(geometry(&doc, &result, "c").dimensions.content.width, 100.0);
        assert_eq!(geometry(&doc, &result, "c").border_box().width, 124.0);
        assert_eq!(geometry(&doc, &result, "b").dimensions.content.width, 76.0);
        assert_eq!(geometry(&doc, &result, "b").border_box().width, 100.0);
    }

    #[test]
    fn test_min_max_width() {
        let (doc, result) = layout(
            r#"<body><div id="a" style="width: 500px; max-width: 100px; height: 1px"></div>
            <div id="b" style="width: 10px; min-width: 40px; height: 1px"></div></body>"#,
        );
        assert_eq!(geometry(&doc, &result, "a").dimensions.content.width, 100.0);
        assert_eq!(geometry(&doc, &result, "b").dimensions.content.width, 40.0);
    }

    #[test]
    fn test_auto_margins_center() {
        let (doc, result) = layout(
            r#"<body style="margin: 0"><div id="a" style="width: 200px; margin: 0 auto; height: 1px"></div></body>"#,
        );
        assert_eq!(geometry(&doc, &result, "a").border_box().x, 300.0);
    }

    #[test]
    fn test_inline_spans_on_one_line() {
        let html = format!(
            r#"<body style="margin: 0"><div id="d" style="{MONO}; width: 200px"><span id="a">a</span><span id="b">b</span></div></body>"#
        );
        let (doc, result) = layout(&html);
        let a = geometry(&doc, &result, "a");
        let b = geometry(&doc, &result, "b");
        assert!(a.is_inline());
        assert_eq!(a.border_box(), Rect::new(0.0, 5.0, 12.0, 20.0));
        assert_eq!(b.border_box(), Rect::new(12.0, 5.0, 12.0, 20.0));
        assert_eq!(geometry(&doc, &result, "d").dimensions.content.height, 30.0);
    }

    #[test]
    fn test_wrapping_moves_word_to_next_line() {
        let html = format!(
            r#"<body style="margin: 0"><div style="{MONO}; width: 36px; white-space: pre-wrap"><span>a</span><span>b</span><span> </span><span id="c">c</span><span>d</span></div></body>"#
        );
        let (doc, result) = layout(&html);
        let c = geometry(&doc, &result, "c");
        assert_eq!(c.first_fragment_origin(), (0.0, 35.0));
    }

    #[test]
    fn test_forced_break_in_pre_wrap() {
        let html = format!(
            r#"<body style="margin: 0"><div id="d" style="{MONO}; width: 200px; white-space: pre-wrap"><span>a</span><span id="n">
</span><span id="b">b</span></div></body>"#
        );
        let (doc, result) = layout(&html);
        let n = geometry(&doc, &result, "n");
        assert_eq!(n.border_box(), Rect::new(12.0, 5.0, 0.0, 20.0));
        let b = geometry(&doc, &result, "b");
        assert_eq!(b.first_fragment_origin(), (0.0, 35.0));
        assert_eq!(geometry(&doc, &result, "d").dimensions.content.height, 60.0);
    }

    #[test]
    fn test_collapsed_whitespace() {
        let html = format!(
            r#"<body style="margin: 0"><div style="{MONO}; width: 200px">  <span id="a">a</span>   <span id="b">b</span></div></body>"#
        );
        let (doc, result) = layout(&html);
        assert_eq!(geometry(&doc, &result, "a").border_box().x, 0.0);
        assert_eq!(geometry(&doc, &result, "b").border_box().x, 24.0);
    }

    #[test]
    fn test_text_align_center() {
        let html = format!(
            r#"<body style="margin: 0"><div style="{MONO}; width: 100px; text-align: center"><span id="a">ab</span></div></body>"#
        );
        let (doc, result) = layout(&html);
        assert_eq!(geometry(&doc, &result, "a").border_box().x, 38.0);
    }

    #[test]
    fn test_text_indent() {
        let html = format!(
            r#"<body style="margin: 0"><div style="{MONO}; width: 100px; text-indent: 10px"><span id="a">a</span></div></body>"#
        );
        let (doc, result) = layout(&html);
        assert_eq!(geometry(&doc, &result, "a").border_box().x, 10.0);
    }

    #[test]
    fn test_scrollbar_for_overflow_scroll() {
        let (doc, result) = layout(
            r#"<body><div id="a" style="width: 100px; height: 50px; overflow-y: scroll; border: 1px solid"></div></body>"#,
        );
        let a = geometry(&doc, &result, "a");
        assert_eq!(a.dimensions.scrollbar, SCROLLBAR_WIDTH);
        assert_eq!(a.border_box().width, 102.0);
        assert_eq!(a.client_width(), 85.0);
    }

    #[test]
    fn test_scrollbar_for_overflowing_auto() {
        let html = format!(
            r#"<body><div id="a" style="{MONO}; width: 100px; height: 40px; overflow: auto; white-space: pre-wrap">a
b
c</div><div id="b" style="{MONO}; width: 100px; height: 40px; overflow: auto">a</div></body>"#
        );
        let (doc, result) = layout(&html);
        let a = geometry(&doc, &result, "a");
        assert_eq!(a.dimensions.scrollbar, SCROLLBAR_WIDTH);
        assert_eq!(a.scroll.height, 90.0);
        assert_eq!(geometry(&doc, &result, "b").dimensions.scrollbar, 0.0);
    }

    #[test]
    fn test_absolute_at_static_position() {
        let (doc, result) = layout(
            r#"<body style="margin: 0"><div style="height: 30px"></div><div id="abs" style="position: absolute; width: 0px; height: 0px"></div></body>"#,
        );
        let abs = geometry(&doc, &result, "abs");
        assert_eq!(abs.border_box(), Rect::new(0.0, 30.0, 0.0, 0.0));
    }

    #[test]
    fn test_absolute_shrink_to_fit() {
        let html = format!(
            r#"<body style="margin: 0"><div id="abs" style="position: absolute; left: 5px; top: 7px; {MONO}">abc</div></body>"#
        );
        let (doc, result) = layout(&html);
        let abs = geometry(&doc, &result, "abs");
        assert_eq!(abs.border_box(), Rect::new(5.0, 7.0, 36.0, 30.0));
    }

    #[test]
    fn test_shadow_tree_replaces_light_children() {
        let doc = Document::parse_html(r#"<body><div id="host"><p id="light">x</p></div></body>"#)
            .unwrap();
        let host = doc.get_element_by_id("host").unwrap();
        let shadow = doc
            .attach_shadow(&host, caretkit_dom::ShadowRootMode::Open)
            .unwrap();
        let inner = doc.create_element("div");
        doc.set_attribute(&inner, "style", "height: 12px").unwrap();
        doc.append_child(&shadow, inner.clone()).unwrap();

        let styles = styles_for(&doc);
        let result = layout_document(&doc, &styles, 800.0, 600.0).unwrap();
        assert!(result.get(inner.id).is_some());
        let light = doc.get_element_by_id("light").unwrap();
        assert!(result.get(light.id).is_none());
        assert_eq!(result.get(host.id).unwrap().dimensions.content.height, 12.0);
    }

    #[test]
    fn test_display_none_not_rendered() {
        let (doc, result) = layout(r#"<body><div id="a" style="display: none"></div></body>"#);
        let a = doc.get_element_by_id("a").unwrap();
        assert!(result.get(a.id).is_none());
    }

    #[test]
    fn test_invalid_viewport() {
        let doc = Document::blank();
        let styles = StyleMap::new();
        let err = layout_document(&doc, &styles, -1.0, 600.0).unwrap_err();
        assert!(matches!(err, LayoutError::LayoutFailed(_)));
    }

    #[test]
    fn test_missing_style_is_an_error() {
        let doc = Document::parse_html("<body><div></div></body>").unwrap();
        let styles = StyleMap::new();
        let err = layout_document(&doc, &styles, 800.0, 600.0).unwrap_err();
        assert!(matches!(err, LayoutError::MissingStyle(_)));
    }
}
