//! Overflow handling: scrollbars and scroll extents.
//!
//! Only vertical scrollbars are modelled. A scrollbar takes its width out of
//! the content box, so `clientWidth` shrinks while `offsetWidth` stays put.

use caretkit_css::Overflow;

/// Width of a classic (non-overlay) scrollbar.
pub const SCROLLBAR_WIDTH: f32 = 15.0;

/// Check if an element should create a scroll container.
pub fn is_scroll_container(overflow_x: Overflow, overflow_y: Overflow) -> bool {
    overflow_x.is_scrollable() || overflow_y.is_scrollable()
}

/// Whether a vertical scrollbar is shown before content is laid out.
pub fn always_shows_vertical_scrollbar(overflow_y: Overflow) -> bool {
    overflow_y == Overflow::Scroll
}

/// Whether `overflow-y: auto` content overflows its box and needs a
/// scrollbar. `content_height` is the in-flow content height; `box_height`
/// the used content-box height.
pub fn overflows_vertically(overflow_y: Overflow, content_height: f32, box_height: f32) -> bool {
    overflow_y == Overflow::Auto && content_height > box_height + 0.01
}

/// Scroll extents of a box, per CSSOM: the larger of the client area and
/// the content plus padding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollExtent {
    pub width: f32,
    pub height: f32,
}

impl ScrollExtent {
    /// Compute from the client size, the padding, and the content extent
    /// measured from the content-box origin.
    pub fn new(
        client_width: f32,
        client_height: f32,
        padding_horizontal: f32,
        padding_vertical: f32,
        content_width: f32,
        content_height: f32,
    ) -> Self {
        Self {
            width: client_width.max(content_width + padding_horizontal),
            height: client_height.max(content_height + padding_vertical),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_container() {
        assert!(is_scroll_container(Overflow::Visible, Overflow::Auto));
        assert!(!is_scroll_container(Overflow::Hidden, Overflow::Visible));
    }

    #[test]
    fn test_scrollbar_decisions() {
        assert!(always_shows_vertical_scrollbar(Overflow::Scroll));
        assert!(!always_shows_vertical_scrollbar(Overflow::Auto));
        assert!(overflows_vertically(Overflow::Auto, 120.0, 100.0));
        assert!(!overflows_vertically(Overflow::Auto, 100.0, 100.0));
        assert!(!overflows_vertically(Overflow::Hidden, 120.0, 100.0));
    }

    #[test]
    fn test_scroll_extent() {
        let extent = ScrollExtent::new(100.0, 50.0, 4.0, 4.0, 80.0, 90.0);
        assert_eq!(extent.width, 100.0);
        assert_eq!(extent.height, 94.0);
    }
}
