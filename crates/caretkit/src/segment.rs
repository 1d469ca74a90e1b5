//! Splitting text into one wrapper element per character.

use std::str::Chars;

use crate::error::{MeasureError, Result};
use crate::host::DomHost;

/// Element each character is wrapped in.
pub const WRAPPER_TAG: &str = "span";

/// The measurable units of `text`: its `char`s, in order.
///
/// Units are Unicode scalar values, not UTF-16 code units. A character
/// outside the Basic Multilingual Plane (most emoji) is one unit here but
/// two in a JavaScript string, so offsets taken from a JS `selectionStart`
/// must be converted before measuring.
pub fn units(text: &str) -> Chars<'_> {
    text.chars()
}

/// Create one wrapper per character of `text`, newlines and spaces
/// included. The wrapper at position `i` holds the `i`-th char.
pub fn segment<H: DomHost>(host: &mut H, text: &str) -> Result<Vec<H::Node>> {
    let mut buf = [0u8; 4];
    units(text)
        .map(|ch| {
            let wrapper = host.create_element(WRAPPER_TAG);
            let glyph = host.create_text_node(ch.encode_utf8(&mut buf));
            host.append_child(&wrapper, glyph)
                .map_err(MeasureError::host)?;
            Ok(wrapper)
        })
        .collect()
}
