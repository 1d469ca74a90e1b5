//! Inline formatting contexts.
//!
//! Inline content is flattened into a sequence of pieces (characters, tab
//! stops, inline box edges, atomic inlines, forced breaks), broken into lines
//! greedily, then placed. Every inline element ends up with one border-box
//! fragment per line it touches.

use std::ops::Range;
use std::rc::Rc;

use caretkit_css::{ComputedStyle, Display, OverflowWrap, Side, TextAlign, WordBreak};
use caretkit_dom::{Node, NodeId, NodeType};
use tracing::trace;

use crate::scroll::ScrollExtent;
use crate::text::{collapse_whitespace, TextMetrics};
use crate::{
    rendered_children, resolve, BoxGeometry, ContainingBlock, Dimensions, EdgeSizes,
    LayoutContext, LayoutError, Participation, Rect, WidthMode,
};

const EPSILON: f32 = 0.01;

/// Line-breaking rules of the text's parent element.
#[derive(Debug, Clone, Copy)]
struct TextRules {
    wraps: bool,
    collapsible: bool,
    break_all: bool,
    emergency: bool,
    break_spaces: bool,
}

impl TextRules {
    fn from_style(style: &ComputedStyle) -> Self {
        let white_space = style.white_space();
        let word_break = style.word_break();
        Self {
            wraps: white_space.wraps(),
            collapsible: white_space.collapses_spaces(),
            break_all: word_break == WordBreak::BreakAll,
            emergency: word_break == WordBreak::BreakWord
                || matches!(
                    style.overflow_wrap(),
                    OverflowWrap::BreakWord | OverflowWrap::Anywhere
                ),
            break_spaces: white_space == caretkit_css::WhiteSpace::BreakSpaces,
        }
    }
}

/// An inline element taking part in the formatting context.
#[derive(Debug)]
struct InlineBox {
    node: NodeId,
    margin: EdgeSizes,
    padding: EdgeSizes,
    border: EdgeSizes,
    metrics: TextMetrics,
    line_height: f32,
}

impl InlineBox {
    fn start_edge(&self) -> f32 {
        self.margin.left + self.border.left + self.padding.left
    }

    fn end_edge(&self) -> f32 {
        self.padding.right + self.border.right + self.margin.right
    }

    fn has_edges(&self) -> bool {
        self.start_edge() != 0.0 || self.end_edge() != 0.0
    }
}

#[derive(Debug)]
enum Piece {
    Char {
        ch: char,
        advance: f32,
        rules: TextRules,
    },
    Tab {
        stop: f32,
        rules: TextRules,
    },
    Open(usize),
    Close(usize),
    Atomic {
        node: Rc<Node>,
        width: f32,
        height: f32,
    },
    ForcedBreak,
}

impl Piece {
    fn is_content(&self) -> bool {
        matches!(
            self,
            Piece::Char { .. } | Piece::Tab { .. } | Piece::Atomic { .. }
        )
    }

    fn is_space(&self) -> bool {
        matches!(self, Piece::Char { ch: ' ', .. } | Piece::Tab { .. })
    }

    fn rules(&self) -> Option<TextRules> {
        match self {
            Piece::Char { rules, .. } | Piece::Tab { rules, .. } => Some(*rules),
            _ => None,
        }
    }

    /// Whether the piece is dropped at the start of a line.
    fn collapses_at_line_start(&self) -> bool {
        matches!(self, Piece::Char { ch: ' ', rules, .. } if rules.collapsible)
    }

    /// Whether a trailing occurrence hangs past the line end.
    fn hangs(&self) -> bool {
        self.is_space()
            && self
                .rules()
                .is_some_and(|r| r.collapsible || (r.wraps && !r.break_spaces))
    }

    /// Whether overflowing with this piece forces a line break.
    fn can_overflow(&self) -> bool {
        match self {
            Piece::Char { .. } | Piece::Tab { .. } => !self.hangs(),
            Piece::Atomic { .. } => true,
            _ => false,
        }
    }

    fn breaks_after(&self) -> bool {
        match self {
            Piece::Atomic { .. } => true,
            Piece::Char { rules, .. } | Piece::Tab { rules, .. } => {
                rules.wraps && (self.is_space() || rules.break_all)
            }
            _ => false,
        }
    }

    fn allows_emergency_break(&self) -> bool {
        matches!(self, Piece::Char { rules, .. } if rules.wraps && rules.emergency)
    }

    fn width(&self, x: f32, at_line_start: bool, boxes: &[InlineBox]) -> f32 {
        match self {
            Piece::Char { advance, .. } => {
                if at_line_start && self.collapses_at_line_start() {
                    0.0
                } else {
                    *advance
                }
            }
            Piece::Tab { stop, .. } => {
                if *stop <= 0.0 {
                    0.0
                } else {
                    stop - x.rem_euclid(*stop)
                }
            }
            Piece::Open(b) => boxes[*b].start_edge(),
            Piece::Close(b) => boxes[*b].end_edge(),
            Piece::Atomic { width, .. } => *width,
            Piece::ForcedBreak => 0.0,
        }
    }
}

#[derive(Default)]
struct Gathered {
    pieces: Vec<Piece>,
    boxes: Vec<InlineBox>,
    absolutes: Vec<Rc<Node>>,
    last_was_space: bool,
}

/// Result of laying out an inline formatting context.
#[derive(Debug, Default)]
pub(crate) struct InlineOutcome {
    pub height: f32,
    /// Widest line, ignoring hanging spaces.
    pub extent: f32,
    /// Out-of-flow descendants, to be placed at the static position.
    pub absolutes: Vec<Rc<Node>>,
}

/// Find line ranges over `pieces` for lines of `width`.
fn break_lines(
    pieces: &[Piece],
    boxes: &[InlineBox],
    width: f32,
    indent: f32,
) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;

    while start < pieces.len() {
        let mut x = if lines.is_empty() { indent } else { 0.0 };
        let mut has_content = false;
        let mut last_break: Option<usize> = None;
        let mut end = pieces.len();
        let mut i = start;

        while i < pieces.len() {
            let piece = &pieces[i];
            if matches!(piece, Piece::ForcedBreak) {
                end = extend_over_closes(pieces, i + 1);
                break;
            }
            if matches!(piece, Piece::Atomic { .. }) && has_content {
                last_break = Some(i - 1);
            }

            let w = piece.width(x, !has_content, boxes);
            if piece.can_overflow() && has_content && x + w > width + EPSILON {
                if let Some(b) = last_break {
                    end = extend_over_closes(pieces, b + 1);
                    break;
                }
                if piece.allows_emergency_break() {
                    end = i;
                    while end > start + 1 && matches!(pieces[end - 1], Piece::Open(_)) {
                        end -= 1;
                    }
                    break;
                }
            }

            x += w;
            if piece.is_content() && !(w == 0.0 && piece.collapses_at_line_start()) {
                has_content = true;
            }
            if piece.breaks_after() {
                last_break = Some(i);
            }
            i += 1;
        }

        lines.push(start..end);
        start = end;
    }

    lines
}

fn extend_over_closes(pieces: &[Piece], mut end: usize) -> usize {
    while end < pieces.len() && matches!(pieces[end], Piece::Close(_)) {
        end += 1;
    }
    end
}

impl<'a> LayoutContext<'a> {
    /// Lay out `children` as an inline formatting context whose content box
    /// starts at `origin` and is `cb.width` wide.
    pub(crate) fn layout_inline(
        &mut self,
        container_style: &ComputedStyle,
        children: &[Rc<Node>],
        origin: (f32, f32),
        cb: &ContainingBlock,
    ) -> Result<InlineOutcome, LayoutError> {
        let mut gathered = Gathered {
            last_was_space: true,
            ..Default::default()
        };
        self.gather(container_style, children, cb, &mut gathered)?;

        let indent = resolve(container_style.text_indent(), cb.width);
        let lines = break_lines(&gathered.pieces, &gathered.boxes, cb.width, indent);
        trace!(
            pieces = gathered.pieces.len(),
            lines = lines.len(),
            width = cb.width,
            "Inline layout"
        );

        let (height, extent) =
            self.place_lines(container_style, &gathered, &lines, origin, indent, cb)?;

        Ok(InlineOutcome {
            height,
            extent,
            absolutes: gathered.absolutes,
        })
    }

    fn gather(
        &mut self,
        parent_style: &ComputedStyle,
        children: &[Rc<Node>],
        cb: &ContainingBlock,
        out: &mut Gathered,
    ) -> Result<(), LayoutError> {
        for child in children {
            match &child.node_type {
                NodeType::Text(data) => gather_text(parent_style, data, out),
                NodeType::Element { tag_name, .. } => match self.participation(child)? {
                    Participation::Skip => {}
                    Participation::OutOfFlow => out.absolutes.push(child.clone()),
                    participation => {
                        let style = self.style(child)?;
                        if participation == Participation::InlineLevel
                            && style.display() == Display::Inline
                        {
                            let index = out.boxes.len();
                            out.boxes.push(inline_box(child.id, style, cb.width));
                            out.pieces.push(Piece::Open(index));
                            if tag_name == "br" {
                                out.pieces.push(Piece::ForcedBreak);
                                out.last_was_space = true;
                            } else {
                                self.gather(style, &rendered_children(child), cb, out)?;
                            }
                            out.pieces.push(Piece::Close(index));
                        } else {
                            let outcome = self.layout_block(
                                child,
                                0.0,
                                0.0,
                                cb,
                                WidthMode::ShrinkToFit(cb.width),
                            )?;
                            out.pieces.push(Piece::Atomic {
                                node: child.clone(),
                                width: outcome.margin_width,
                                height: outcome.margin_height,
                            });
                            out.last_was_space = false;
                        }
                    }
                },
                _ => {}
            }
        }
        Ok(())
    }

    fn place_lines(
        &mut self,
        container_style: &ComputedStyle,
        gathered: &Gathered,
        lines: &[Range<usize>],
        origin: (f32, f32),
        indent: f32,
        cb: &ContainingBlock,
    ) -> Result<(f32, f32), LayoutError> {
        let pieces = &gathered.pieces;
        let boxes = &gathered.boxes;
        let strut = TextMetrics::from_style(container_style);
        let strut_line_height = strut.line_height(container_style.line_height());
        let align = container_style.text_align();

        let mut fragments: Vec<Vec<Rect>> = boxes.iter().map(|_| Vec::new()).collect();
        let mut carried: Vec<usize> = Vec::new();
        let mut line_top = origin.1;
        let mut extent: f32 = 0.0;

        for (line_index, range) in lines.iter().enumerate() {
            let start_x = if line_index == 0 { indent } else { 0.0 };
            let mut x = start_x;
            let mut natural = start_x;
            let mut rendered = false;
            let mut has_content = false;
            let mut open: Vec<(usize, f32)> = carried.iter().map(|b| (*b, x)).collect();
            let mut line_frags: Vec<(usize, f32, f32)> = Vec::new();
            let mut atomics: Vec<(Rc<Node>, f32, f32)> = Vec::new();

            for piece in &pieces[range.clone()] {
                let w = piece.width(x, !has_content, boxes);
                match piece {
                    Piece::Open(b) => {
                        open.push((*b, x + boxes[*b].margin.left));
                        rendered |= boxes[*b].has_edges();
                    }
                    Piece::Close(b) => {
                        let end = x + w - boxes[*b].margin.right;
                        if let Some(pos) = open.iter().rposition(|(ob, _)| ob == b) {
                            let (_, frag_start) = open.remove(pos);
                            line_frags.push((*b, frag_start, end));
                        }
                        rendered |= boxes[*b].has_edges();
                    }
                    Piece::Atomic { node, height, .. } => {
                        atomics.push((node.clone(), x, *height));
                        rendered = true;
                    }
                    Piece::ForcedBreak => rendered = true,
                    Piece::Char { .. } | Piece::Tab { .. } => rendered |= w > 0.0,
                }
                x += w;
                if piece.is_content() && w > 0.0 {
                    has_content = true;
                }
                let structural = match piece {
                    Piece::Open(b) | Piece::Close(b) => !boxes[*b].has_edges(),
                    _ => false,
                };
                if !piece.hangs() && !structural {
                    natural = x;
                }
            }

            carried = open.iter().map(|(b, _)| *b).collect();
            for (b, frag_start) in open {
                line_frags.push((b, frag_start, x));
            }
            extent = extent.max(natural);

            let free = (cb.width - natural).max(0.0);
            let offset = match align {
                TextAlign::Right => free,
                TextAlign::Center => free / 2.0,
                TextAlign::Left | TextAlign::Justify => 0.0,
            };

            let mut above = strut.ascent + strut.half_leading(strut_line_height);
            let mut below = strut.descent + strut.half_leading(strut_line_height);
            for (b, _, _) in &line_frags {
                let ib = &boxes[*b];
                let half = ib.metrics.half_leading(ib.line_height);
                above = above.max(ib.metrics.ascent + half);
                below = below.max(ib.metrics.descent + half);
            }
            let mut line_height = above + below;
            for (_, _, h) in &atomics {
                line_height = line_height.max(*h);
            }
            if !rendered {
                line_height = 0.0;
            }
            let baseline = line_top + above;

            for (b, frag_start, frag_end) in line_frags {
                let ib = &boxes[b];
                let top = baseline - ib.metrics.ascent - ib.padding.top - ib.border.top;
                let frame = ib.padding.vertical() + ib.border.vertical();
                let height = ib.metrics.content_height() + frame;
                fragments[b].push(Rect::new(
                    origin.0 + offset + frag_start,
                    top,
                    (frag_end - frag_start).max(0.0),
                    height,
                ));
            }

            for (node, ax, _) in atomics {
                self.layout_block(
                    &node,
                    origin.0 + offset + ax,
                    line_top,
                    cb,
                    WidthMode::ShrinkToFit(cb.width),
                )?;
            }

            line_top += line_height;
        }

        for (ib, frags) in boxes.iter().zip(fragments) {
            let Some(union) = frags.iter().copied().reduce(|a, b| a.union(&b)) else {
                continue;
            };
            let frame = ib.border.horizontal() + ib.padding.horizontal();
            let dimensions = Dimensions {
                content: Rect::new(
                    union.x + ib.border.left + ib.padding.left,
                    union.y + ib.border.top + ib.padding.top,
                    (union.width - frame).max(0.0),
                    ib.metrics.content_height(),
                ),
                padding: ib.padding,
                border: ib.border,
                margin: ib.margin,
                scrollbar: 0.0,
            };
            self.record(
                ib.node,
                BoxGeometry {
                    dimensions,
                    fragments: frags,
                    scroll: ScrollExtent::default(),
                },
            );
        }

        Ok((line_top - origin.1, extent))
    }
}

fn inline_box(node: NodeId, style: &ComputedStyle, cb_width: f32) -> InlineBox {
    let metrics = TextMetrics::from_style(style);
    InlineBox {
        node,
        margin: EdgeSizes::from_sides(|side| resolve(style.margin(side), cb_width)),
        padding: EdgeSizes::from_sides(|side| resolve(style.padding(side), cb_width)),
        border: EdgeSizes::from_sides(|side: Side| style.border_width(side)),
        metrics,
        line_height: metrics.line_height(style.line_height()),
    }
}

fn gather_text(style: &ComputedStyle, data: &str, out: &mut Gathered) {
    let rules = TextRules::from_style(style);
    let metrics = TextMetrics::from_style(style);
    let letter_spacing = style.letter_spacing();
    let word_spacing = style.word_spacing();
    let drop_leading = rules.collapsible && out.last_was_space;
    let text = collapse_whitespace(data, style.white_space(), drop_leading);

    for ch in text.chars() {
        match ch {
            '\n' => {
                out.pieces.push(Piece::ForcedBreak);
                out.last_was_space = true;
            }
            '\t' => {
                let stop = style.tab_size() * (metrics.advance(' ') + letter_spacing);
                out.pieces.push(Piece::Tab { stop, rules });
                out.last_was_space = false;
            }
            ' ' => {
                out.pieces.push(Piece::Char {
                    ch,
                    advance: metrics.advance(' ') + letter_spacing + word_spacing,
                    rules,
                });
                out.last_was_space = rules.collapsible;
            }
            _ => {
                out.pieces.push(Piece::Char {
                    ch,
                    advance: metrics.advance(ch) + letter_spacing,
                    rules,
                });
                out.last_was_space = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(wraps: bool) -> TextRules {
        TextRules {
            wraps,
            collapsible: false,
            break_all: false,
            emergency: false,
            break_spaces: false,
        }
    }

    fn chars(text: &str, rules: TextRules) -> Vec<Piece> {
        text.chars()
            .map(|ch| match ch {
                '\n' => Piece::ForcedBreak,
                _ => Piece::Char {
                    ch,
                    advance: 10.0,
                    rules,
                },
            })
            .collect()
    }

    #[test]
    fn test_break_at_space() {
        let pieces = chars("ab cd", rules(true));
        let lines = break_lines(&pieces, &[], 30.0, 0.0);
        assert_eq!(lines, vec![0..3, 3..5]);
    }

    #[test]
    fn test_no_wrap_overflows() {
        let pieces = chars("ab cd", rules(false));
        let lines = break_lines(&pieces, &[], 30.0, 0.0);
        assert_eq!(lines, vec![0..5]);
    }

    #[test]
    fn test_forced_break() {
        let pieces = chars("a\nb", rules(true));
        let lines = break_lines(&pieces, &[], 100.0, 0.0);
        assert_eq!(lines, vec![0..2, 2..3]);
    }

    #[test]
    fn test_trailing_forced_break_adds_no_line() {
        let pieces = chars("ab\n", rules(true));
        let lines = break_lines(&pieces, &[], 100.0, 0.0);
        assert_eq!(lines, vec![0..3]);
    }

    #[test]
    fn test_long_word_without_emergency_break() {
        let pieces = chars("abcdef", rules(true));
        let lines = break_lines(&pieces, &[], 30.0, 0.0);
        assert_eq!(lines, vec![0..6]);
    }

    #[test]
    fn test_emergency_break() {
        let mut r = rules(true);
        r.emergency = true;
        let pieces = chars("abcdef", r);
        let lines = break_lines(&pieces, &[], 30.0, 0.0);
        assert_eq!(lines, vec![0..3, 3..6]);
    }

    #[test]
    fn test_break_all() {
        let mut r = rules(true);
        r.break_all = true;
        let pieces = chars("ab cdef", r);
        let lines = break_lines(&pieces, &[], 40.0, 0.0);
        assert_eq!(lines, vec![0..4, 4..7]);
    }

    #[test]
    fn test_indent_narrows_first_line() {
        let pieces = chars("ab cd", rules(true));
        let lines = break_lines(&pieces, &[], 50.0, 30.0);
        assert_eq!(lines, vec![0..3, 3..5]);
    }

    #[test]
    fn test_hanging_space_does_not_wrap() {
        let pieces = chars("abc d", rules(true));
        let lines = break_lines(&pieces, &[], 30.0, 0.0);
        assert_eq!(lines, vec![0..4, 4..5]);
    }
}
