//! Resolution of anchor spans.
//!
//! A span is the maximal run of sibling inline nodes whose `anchorId` equals a
//! given value. Spans are not stored anywhere; they are recomputed from node
//! attributes whenever needed.

use std::ops::Range;

use plate_core::{
    Document, InlineRange, Node, Point, block_at, caret_neighbors, child_starts, inline_len,
    point_offset,
};

use crate::ANCHOR_ID_ATTR;

pub fn anchor_id(node: &Node) -> Option<&str> {
    node.attr(ANCHOR_ID_ATTR).and_then(|v| v.as_str())
}

/// Span around the caret at `children[child_ix]`, `offset`, in inline offsets.
///
/// Each side falls back to the caret offset when no neighbour on that side
/// carries `value`.
pub fn find_span_bounds(
    children: &[Node],
    child_ix: usize,
    offset: usize,
    value: &str,
) -> Range<usize> {
    let caret = point_offset(children, child_ix, offset);
    let around = caret_neighbors(children, child_ix, offset);
    let matches = |ix: usize| anchor_id(&children[ix]) == Some(value);

    let mut first = None;
    let mut cursor = around.text_node.or(around.before);
    while let Some(ix) = cursor.filter(|&ix| matches(ix)) {
        first = Some(ix);
        cursor = (0..ix).rev().find(|&i| inline_len(&children[i]) > 0);
    }

    let mut last = None;
    let mut cursor = around.text_node.or(around.after);
    while let Some(ix) = cursor.filter(|&ix| matches(ix)) {
        last = Some(ix);
        cursor = (ix + 1..children.len()).find(|&i| inline_len(&children[i]) > 0);
    }

    let starts = child_starts(children);
    let start = first.map_or(caret, |ix| starts[ix]);
    let end = last.map_or(caret, |ix| starts[ix] + inline_len(&children[ix]));
    start..end
}

/// The anchor span with id `value` at `position`.
///
/// `None` when `position` does not address an inline node of a block.
pub fn find_anchor_range(doc: &Document, position: &Point, value: &str) -> Option<InlineRange> {
    let (block_path, block) = block_at(doc, position)?;
    let child_ix = *position.path.last()?;
    if child_ix >= block.children.len() {
        return None;
    }
    let bounds = find_span_bounds(&block.children, child_ix, position.offset, value);
    Some(InlineRange::new(block_path.to_vec(), bounds.start, bounds.end))
}
