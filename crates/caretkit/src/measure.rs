//! # Character Measurement
//!
//! Locates the box of one character of a text as it would render inside a
//! source element. The source's computed style is copied onto the mirror's
//! content node, the text is segmented into one wrapper per char, and the
//! wrapper's offset geometry is read back.
//!
//! Two corrections are applied to the raw geometry:
//!
//! - For `display: inline` sources, `deviation` carries the offsetTop of
//!   the first wrapper so callers can subtract the baseline shift inline
//!   layout introduces.
//! - A newline that ends the text renders at the end of its line with no
//!   height of its own. Its box is moved one line down to column 0, where
//!   a caret after it would sit.

use std::marker::PhantomData;

use caretkit_css::{format_px, parse_leading_number};
use tracing::{debug, trace};

use crate::error::{MeasureError, Result};
use crate::host::DomHost;
use crate::mirror::{MirrorSurface, DEFAULT_MIRROR_ID};
use crate::segment::{segment, units};
use crate::style_reader::{StyleReader, DEFAULT_STYLE_NAMES};

/// Appended for inline sources so the mirror does not pick up the
/// alignment of the source's ancestors.
const INLINE_ALIGN_RESET: &str = "text-align: initial;";

/// Box of one character, in pixels, relative to the mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextNodeBoxRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    /// offsetTop of the first character for inline sources, 0 otherwise.
    pub deviation: f32,
}

/// Builder for [`TextMeasurement`].
///
/// `N` is the host's node type. It is fixed by the host passed to
/// [`build`](Self::build), so callers never name it.
#[derive(Debug, Clone)]
pub struct TextMeasurementBuilder<N> {
    mirror_id: String,
    style_names: Vec<String>,
    _node: PhantomData<fn() -> N>,
}

impl<N> Default for TextMeasurementBuilder<N> {
    fn default() -> Self {
        Self {
            mirror_id: DEFAULT_MIRROR_ID.to_string(),
            style_names: DEFAULT_STYLE_NAMES.iter().map(|s| s.to_string()).collect(),
            _node: PhantomData,
        }
    }
}

impl<N: Clone> TextMeasurementBuilder<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the mirror container. Measurers with distinct ids get
    /// independent mirrors.
    pub fn mirror_id(mut self, id: impl Into<String>) -> Self {
        self.mirror_id = id.into();
        self
    }

    /// Properties copied from the source element onto the mirror.
    pub fn style_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.style_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Register the mirror in `host` and build the measurer.
    pub fn build<H: DomHost<Node = N>>(self, host: &mut H) -> Result<TextMeasurement<N>> {
        let mut surface = MirrorSurface::new(self.mirror_id);
        surface.ensure(host)?;
        debug!(
            id = surface.id(),
            styles = self.style_names.len(),
            "Text measurement ready"
        );
        Ok(TextMeasurement {
            surface,
            style_names: self.style_names,
            destroyed: false,
        })
    }
}

/// Measures character boxes through a mirror surface.
///
/// Every call rewrites the mirror's style and content, so one measurer
/// serves one measurement at a time; the `&mut` receivers enforce it.
#[derive(Debug)]
pub struct TextMeasurement<N> {
    surface: MirrorSurface<N>,
    style_names: Vec<String>,
    destroyed: bool,
}

impl<N: Clone> TextMeasurement<N> {
    /// Create a measurer with the default mirror id and style names.
    pub fn new<H: DomHost<Node = N>>(host: &mut H) -> Result<Self> {
        Self::builder().build(host)
    }

    pub fn builder() -> TextMeasurementBuilder<N> {
        TextMeasurementBuilder::default()
    }

    pub fn mirror_id(&self) -> &str {
        self.surface.id()
    }

    pub fn style_names(&self) -> &[String] {
        &self.style_names
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Box of the `index`-th char of `text` laid out with `element`'s style.
    ///
    /// `index` counts `char`s as [`units`] yields them, not UTF-16 code
    /// units.
    pub fn measure_text<H: DomHost<Node = N>>(
        &mut self,
        host: &mut H,
        element: &N,
        text: &str,
        index: usize,
    ) -> Result<TextNodeBoxRect> {
        let content = self.content(host)?;
        let (display, mut css_text) = self.read_source(host, element)?;
        if display == "inline" {
            css_text.push(' ');
            css_text.push_str(INLINE_ALIGN_RESET);
        }
        self.fill(host, &content, &css_text, text)?;

        let chars: Vec<char> = units(text).collect();
        locate(host, &content, element, &display, &chars, index)
    }

    /// Lay `text` out once for repeated lookups.
    ///
    /// The mirror gets the source's content width with its height
    /// unbounded and overflow hidden, so it wraps like the source even
    /// when the source scrolls. The returned session borrows the host, so
    /// the document cannot change under it.
    pub fn preload<'a, H: DomHost<Node = N>>(
        &'a mut self,
        host: &'a mut H,
        element: &N,
        text: &str,
    ) -> Result<Preloaded<'a, H>> {
        let content = self.content(host)?;
        let (display, mut css_text) = self.read_source(host, element)?;

        let reader = StyleReader::new(&*host);
        let width = reader.style(element, "width")?;
        let width = parse_leading_number(&width).unwrap_or(0.0);
        let content_width = width - reader.scrollbar_width(element)?;
        css_text.push_str(&format!(
            " height: auto; max-height: none; width: {}; overflow: hidden;",
            format_px(content_width)
        ));
        if display == "inline" {
            css_text.push(' ');
            css_text.push_str(INLINE_ALIGN_RESET);
        }
        self.fill(host, &content, &css_text, text)?;
        debug!(
            chars = text.chars().count(),
            content_width,
            "Preloaded text"
        );

        Ok(Preloaded {
            host,
            content,
            element: element.clone(),
            display,
            chars: units(text).collect(),
        })
    }

    /// Remove the mirror from the document. Every later call fails with
    /// [`MeasureError::Destroyed`].
    pub fn destroy<H: DomHost<Node = N>>(&mut self, host: &mut H) -> Result<()> {
        self.surface.teardown(host)?;
        self.destroyed = true;
        debug!(id = self.surface.id(), "Text measurement destroyed");
        Ok(())
    }

    fn content<H: DomHost<Node = N>>(&mut self, host: &mut H) -> Result<N> {
        if self.destroyed {
            return Err(MeasureError::Destroyed {
                id: self.surface.id().to_string(),
            });
        }
        self.surface.ensure(host)
    }

    /// The source's display mode and its style as css text.
    fn read_source<H: DomHost<Node = N>>(&self, host: &H, element: &N) -> Result<(String, String)> {
        let reader = StyleReader::new(host);
        let display = reader.style(element, "display")?;
        let css_text = reader.css_text(element, self.style_names.as_slice())?;
        Ok((display, css_text))
    }

    /// Apply `css_text` to the content node and replace its children with
    /// the wrappers of `text`.
    fn fill<H: DomHost<Node = N>>(
        &self,
        host: &mut H,
        content: &N,
        css_text: &str,
        text: &str,
    ) -> Result<()> {
        host.set_css_text(content, css_text)
            .map_err(MeasureError::host)?;
        let wrappers = segment(host, text)?;
        host.replace_children(content, wrappers)
            .map_err(MeasureError::host)?;
        trace!(css_text, "Mirror filled");
        Ok(())
    }
}

/// A text laid out in the mirror, ready for lookups.
pub struct Preloaded<'a, H: DomHost> {
    host: &'a H,
    content: H::Node,
    element: H::Node,
    display: String,
    chars: Vec<char>,
}

impl<H: DomHost> Preloaded<'_, H> {
    /// Box of the `index`-th char of the preloaded text.
    pub fn measure_text(&self, index: usize) -> Result<TextNodeBoxRect> {
        locate(
            self.host,
            &self.content,
            &self.element,
            &self.display,
            &self.chars,
            index,
        )
    }

    /// Number of chars in the preloaded text.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Find the wrapper for `index` in `content` and read its corrected box.
fn locate<H: DomHost>(
    host: &H,
    content: &H::Node,
    element: &H::Node,
    display: &str,
    chars: &[char],
    index: usize,
) -> Result<TextNodeBoxRect> {
    if index >= chars.len() {
        return Err(MeasureError::IndexRange {
            index,
            len: chars.len(),
        });
    }

    let wrappers = host.element_children(content);
    let wrapper = wrappers
        .get(index)
        .ok_or(MeasureError::SegmentMissing { index })?;
    let rect = host.offset_rect(wrapper).map_err(MeasureError::host)?;

    let deviation = match (display, wrappers.first()) {
        ("inline", Some(first)) => host.offset_rect(first).map_err(MeasureError::host)?.top,
        _ => 0.0,
    };

    let mut left = rect.left;
    let mut top = rect.top;
    if chars[index] == '\n' && index == chars.len() - 1 {
        let line_height = StyleReader::new(host).style(element, "line-height")?;
        top += parse_leading_number(&line_height).unwrap_or(rect.height);
        left = 0.0;
    }

    trace!(
        index,
        left,
        top,
        width = rect.width,
        height = rect.height,
        deviation,
        "Measured char"
    );
    Ok(TextNodeBoxRect {
        left,
        right: left + rect.width,
        top,
        bottom: top + rect.height,
        width: rect.width,
        height: rect.height,
        deviation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretkit_engine::Page;

    const MONO: &str = "font-family: monospace; font-size: 20px; line-height: 30px; \
                        padding: 0; border: 0; height: 200px";

    fn setup(style: &str) -> (Page, TextMeasurement<std::rc::Rc<caretkit_dom::Node>>) {
        let mut page = Page::from_html(&format!(
            r#"<body><textarea id="t" style="{style}"></textarea></body>"#
        ))
        .unwrap();
        let measurer = TextMeasurement::new(&mut page).unwrap();
        (page, measurer)
    }

    #[test]
    fn test_builder_defaults() {
        let builder = TextMeasurementBuilder::<std::rc::Rc<caretkit_dom::Node>>::new();
        assert_eq!(builder.mirror_id, DEFAULT_MIRROR_ID);
        assert_eq!(builder.style_names.len(), DEFAULT_STYLE_NAMES.len());
    }

    #[test]
    fn test_builder_overrides() {
        let mut page = Page::blank();
        let measurer = TextMeasurement::builder()
            .mirror_id("custom")
            .style_names(["font-size", "line-height"])
            .build(&mut page)
            .unwrap();
        assert_eq!(measurer.mirror_id(), "custom");
        assert_eq!(measurer.style_names(), ["font-size", "line-height"]);
        assert!(page.element_by_id("custom").is_some());
    }

    #[test]
    fn test_characters_advance_along_the_line() {
        let (mut page, mut measurer) = setup(&format!("{MONO}; width: 200px"));
        let t = page.element_by_id("t").unwrap();

        let a = measurer.measure_text(&mut page, &t, "abc", 0).unwrap();
        let c = measurer.measure_text(&mut page, &t, "abc", 2).unwrap();
        assert_eq!((a.left, a.top, a.width, a.height), (0.0, 5.0, 12.0, 20.0));
        assert_eq!((c.left, c.top), (24.0, 5.0));
        assert_eq!(c.right, 36.0);
        assert_eq!(c.bottom, 25.0);
        assert_eq!(c.deviation, 0.0);
    }

    #[test]
    fn test_wrapped_character_moves_down() {
        let (mut page, mut measurer) = setup(&format!("{MONO}; width: 36px"));
        let t = page.element_by_id("t").unwrap();
        let d = measurer.measure_text(&mut page, &t, "abc def", 4).unwrap();
        assert_eq!((d.left, d.top), (0.0, 35.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let (mut page, mut measurer) = setup(MONO);
        let t = page.element_by_id("t").unwrap();
        let err = measurer.measure_text(&mut page, &t, "abc", 3).unwrap_err();
        assert!(matches!(err, MeasureError::IndexRange { index: 3, len: 3 }));
        assert!(err.to_string().contains("0 - 2"));
    }

    #[test]
    fn test_trailing_newline_moves_to_next_line() {
        let (mut page, mut measurer) = setup(&format!("{MONO}; width: 200px"));
        let t = page.element_by_id("t").unwrap();
        let b = measurer.measure_text(&mut page, &t, "ab\n", 1).unwrap();
        let newline = measurer.measure_text(&mut page, &t, "ab\n", 2).unwrap();
        assert_eq!(newline.top, b.top + 30.0);
        assert_eq!(newline.left, 0.0);
    }

    #[test]
    fn test_inner_newline_is_not_corrected() {
        let (mut page, mut measurer) = setup(&format!("{MONO}; width: 200px"));
        let t = page.element_by_id("t").unwrap();
        let newline = measurer.measure_text(&mut page, &t, "ab\nc", 2).unwrap();
        assert_eq!((newline.left, newline.top), (24.0, 5.0));
    }

    #[test]
    fn test_destroyed_measurer_fails() {
        let (mut page, mut measurer) = setup(MONO);
        let t = page.element_by_id("t").unwrap();
        measurer.destroy(&mut page).unwrap();
        assert!(measurer.is_destroyed());
        assert!(page.element_by_id(DEFAULT_MIRROR_ID).is_none());
        assert!(matches!(
            measurer.measure_text(&mut page, &t, "a", 0),
            Err(MeasureError::Destroyed { .. })
        ));
        assert!(matches!(
            measurer.preload(&mut page, &t, "a").map(|_| ()),
            Err(MeasureError::Destroyed { .. })
        ));
    }

    #[test]
    fn test_preload_agrees_with_measure_text() {
        let (mut page, mut measurer) = setup(&format!("{MONO}; width: 60px"));
        let t = page.element_by_id("t").unwrap();
        let text = "abcd efgh ij";

        let expected: Vec<TextNodeBoxRect> = (0..text.len())
            .map(|i| measurer.measure_text(&mut page, &t, text, i).unwrap())
            .collect();
        let preloaded = measurer.preload(&mut page, &t, text).unwrap();
        assert_eq!(preloaded.len(), text.len());
        for (i, rect) in expected.iter().enumerate() {
            assert_eq!(preloaded.measure_text(i).unwrap(), *rect, "index {i}");
        }
        assert!(preloaded.measure_text(text.len()).is_err());
    }
}
