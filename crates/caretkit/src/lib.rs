//! # CaretKit
//!
//! Pixel boxes for characters inside textarea-like elements.
//!
//! Positioning an overlay (an autocomplete popup, a custom caret, a
//! highlight) at a character offset needs that character's box, which a
//! textarea does not expose. CaretKit renders a hidden mirror of the text
//! with the source's style, one wrapper element per character, and reads
//! the wrapper's geometry back from the host's layout.
//!
//! ## Design Goals
//!
//! 1. **Host-agnostic**: All DOM and layout access goes through [`DomHost`]
//! 2. **Isolated mirror**: The mirror lives in a shadow root, out of reach of
//!    page stylesheets
//! 3. **Explicit lifecycle**: A destroyed measurer fails instead of measuring
//!    stale state
//!
//! ```no_run
//! use caretkit::{Page, TextMeasurement};
//!
//! let mut page = Page::from_html(r#"<textarea id="t" style="width: 200px"></textarea>"#)?;
//! let textarea = page.element_by_id("t").expect("textarea");
//! let mut measurer = TextMeasurement::new(&mut page)?;
//! let rect = measurer.measure_text(&mut page, &textarea, "hello", 4)?;
//! println!("caret at ({}, {})", rect.right, rect.top);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod host;
pub mod measure;
pub mod mirror;
pub mod percent;
pub mod segment;
pub mod style_reader;

pub use error::{MeasureError, Result};
pub use host::{ClientRect, DomHost, OffsetRect};
pub use measure::{Preloaded, TextMeasurement, TextMeasurementBuilder, TextNodeBoxRect};
pub use mirror::{MirrorSurface, DEFAULT_MIRROR_ID};
pub use percent::resolve_percent;
pub use segment::{segment, units};
pub use style_reader::{ContentBox, FontStyles, StyleReader, StyleSnapshot, DEFAULT_STYLE_NAMES};

pub use caretkit_engine::{Page, PageConfig};
