//! Inline addressing inside text blocks.
//!
//! A text block's children are measured in *inline offsets*: a text leaf
//! contributes its byte length and an inline void contributes one unit.
//! Ranges over inline content are expressed as [`InlineRange`]s, which stay
//! valid across leaf splits and merges as long as the text is unchanged.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{AttrPatch, Attrs, Document, ElementNode, Node, Point, Selection, node_ref};
use crate::ops::{Op, Path};
use crate::plugin::{ChildConstraint, PluginRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InlineRange {
    pub block: Path,
    pub start: usize,
    pub end: usize,
}

impl InlineRange {
    pub fn new(block: Path, start: usize, end: usize) -> Self {
        Self { block, start, end }
    }

    pub fn collapsed(block: Path, offset: usize) -> Self {
        Self::new(block, offset, offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Which leaf a position on a leaf boundary should resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// End of the leaf before the boundary.
    Backward,
    /// Start of the leaf after the boundary.
    Forward,
}

pub fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

pub fn inline_len(node: &Node) -> usize {
    match node {
        Node::Text(t) => t.text.len(),
        Node::Void(_) => 1,
        Node::Element(_) => 0,
    }
}

pub fn total_inline_len(children: &[Node]) -> usize {
    children.iter().map(inline_len).sum()
}

/// Inline offset at which each child starts.
pub fn child_starts(children: &[Node]) -> Vec<usize> {
    let mut cursor = 0usize;
    children
        .iter()
        .map(|node| {
            let start = cursor;
            cursor += inline_len(node);
            start
        })
        .collect()
}

pub fn point_offset(children: &[Node], child_ix: usize, offset: usize) -> usize {
    let mut global = 0usize;
    for (ix, node) in children.iter().enumerate() {
        if ix < child_ix {
            global += inline_len(node);
            continue;
        }
        if ix == child_ix {
            global += match node {
                Node::Text(t) => clamp_to_char_boundary(&t.text, offset),
                Node::Void(_) => offset.min(1),
                Node::Element(_) => 0,
            };
        }
        break;
    }
    global
}

pub fn point_at_offset(
    block_path: &[usize],
    children: &[Node],
    offset: usize,
    affinity: Affinity,
) -> Point {
    let at = |child_ix: usize, offset: usize| {
        let mut path = block_path.to_vec();
        path.push(child_ix);
        Point::new(path, offset)
    };

    let mut touching: Vec<(usize, usize)> = Vec::new();
    let mut before: Option<(usize, usize)> = None;
    let mut after: Option<usize> = None;
    let mut cursor = 0usize;

    for (ix, node) in children.iter().enumerate() {
        let len = inline_len(node);
        if let Node::Text(t) = node {
            if cursor <= offset && offset <= cursor + len {
                touching.push((ix, clamp_to_char_boundary(&t.text, offset - cursor)));
            } else if cursor + len < offset {
                before = Some((ix, len));
            } else if after.is_none() {
                after = Some(ix);
            }
        }
        cursor += len;
    }

    let picked = match affinity {
        Affinity::Backward => touching.first(),
        Affinity::Forward => touching.last(),
    };
    if let Some(&(ix, local)) = picked {
        return at(ix, local);
    }

    // No text leaf touches the offset (it sits between voids).
    if let Some((ix, len)) = before {
        return at(ix, len);
    }
    if let Some(ix) = after {
        return at(ix, 0);
    }
    at(0, 0)
}

/// Neighbourhood of a caret inside a block's inline children.
///
/// `text_node` is set when the caret is strictly inside a text leaf; otherwise
/// `before` / `after` name the nearest non-empty siblings around the caret.
/// Empty text leaves are positions, not content, and are never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretNeighbors {
    pub text_node: Option<usize>,
    pub before: Option<usize>,
    pub after: Option<usize>,
}

pub fn caret_neighbors(children: &[Node], child_ix: usize, offset: usize) -> CaretNeighbors {
    let prev_content = |ix: usize| {
        (0..ix)
            .rev()
            .find(|&i| inline_len(&children[i]) > 0 || is_element(&children[i]))
            .filter(|&i| !is_element(&children[i]))
    };
    let next_content = |ix: usize| {
        (ix + 1..children.len())
            .find(|&i| inline_len(&children[i]) > 0 || is_element(&children[i]))
            .filter(|&i| !is_element(&children[i]))
    };

    let Some(node) = children.get(child_ix) else {
        return CaretNeighbors::default();
    };
    let len = inline_len(node);

    match node {
        Node::Element(_) => CaretNeighbors::default(),
        _ if len == 0 => CaretNeighbors {
            text_node: None,
            before: prev_content(child_ix),
            after: next_content(child_ix),
        },
        Node::Text(t) => {
            let offset = clamp_to_char_boundary(&t.text, offset);
            if offset == 0 {
                CaretNeighbors {
                    text_node: None,
                    before: prev_content(child_ix),
                    after: Some(child_ix),
                }
            } else if offset >= len {
                CaretNeighbors {
                    text_node: None,
                    before: Some(child_ix),
                    after: next_content(child_ix),
                }
            } else {
                CaretNeighbors {
                    text_node: Some(child_ix),
                    before: None,
                    after: None,
                }
            }
        }
        Node::Void(_) => {
            if offset == 0 {
                CaretNeighbors {
                    text_node: None,
                    before: prev_content(child_ix),
                    after: Some(child_ix),
                }
            } else {
                CaretNeighbors {
                    text_node: None,
                    before: Some(child_ix),
                    after: next_content(child_ix),
                }
            }
        }
    }
}

fn is_element(node: &Node) -> bool {
    matches!(node, Node::Element(_))
}

pub struct TextBlock<'a> {
    pub path: Path,
    pub el: &'a ElementNode,
}

pub fn element_is_text_block(el: &ElementNode, registry: &PluginRegistry) -> bool {
    match registry.node_specs().get(&el.kind).map(|s| &s.children) {
        Some(ChildConstraint::InlineOnly) => true,
        Some(_) => false,
        None => el
            .children
            .iter()
            .any(|n| matches!(n, Node::Text(_) | Node::Void(_))),
    }
}

pub fn text_blocks<'a>(doc: &'a Document, registry: &PluginRegistry) -> Vec<TextBlock<'a>> {
    fn walk<'a>(
        nodes: &'a [Node],
        path: &mut Vec<usize>,
        registry: &PluginRegistry,
        out: &mut Vec<TextBlock<'a>>,
    ) {
        for (ix, node) in nodes.iter().enumerate() {
            let Node::Element(el) = node else {
                continue;
            };

            path.push(ix);

            if element_is_text_block(el, registry) {
                out.push(TextBlock {
                    path: path.clone(),
                    el,
                });
            } else {
                walk(&el.children, path, registry, out);
            }

            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(&doc.children, &mut Vec::new(), registry, &mut out);
    out
}

/// The text block containing `point`, with the block's path.
pub fn block_at<'a>(doc: &'a Document, point: &'a Point) -> Option<(&'a [usize], &'a ElementNode)> {
    let (_, block_path) = point.path.split_last()?;
    match node_ref(doc, block_path)? {
        Node::Element(el) => Some((block_path, el)),
        _ => None,
    }
}

/// Enumerates the selection as one range per text block it touches.
///
/// A collapsed selection yields a single collapsed range; a non-collapsed one
/// yields only ranges of non-zero width.
pub fn selection_ranges(
    doc: &Document,
    registry: &PluginRegistry,
    sel: &Selection,
) -> Vec<InlineRange> {
    if sel.is_collapsed() {
        return block_at(doc, &sel.focus)
            .and_then(|(block_path, el)| {
                let child_ix = *sel.focus.path.last()?;
                let offset = point_offset(&el.children, child_ix, sel.focus.offset);
                Some(InlineRange::collapsed(block_path.to_vec(), offset))
            })
            .into_iter()
            .collect();
    }

    let (start, end) = sel.ordered();
    let Some(start_block_path) = start.path.split_last().map(|(_, p)| p.to_vec()) else {
        return Vec::new();
    };
    let Some(end_block_path) = end.path.split_last().map(|(_, p)| p.to_vec()) else {
        return Vec::new();
    };

    let blocks = text_blocks(doc, registry);
    let Some(start_index) = blocks.iter().position(|b| b.path == start_block_path) else {
        return Vec::new();
    };
    let Some(end_index) = blocks.iter().position(|b| b.path == end_block_path) else {
        return Vec::new();
    };
    let (start_index, end_index) = if start_index <= end_index {
        (start_index, end_index)
    } else {
        (end_index, start_index)
    };

    let start_inline_ix = start.path.last().copied().unwrap_or(0);
    let end_inline_ix = end.path.last().copied().unwrap_or(0);

    let mut ranges = Vec::new();
    for (block_index, block) in blocks
        .iter()
        .enumerate()
        .take(end_index + 1)
        .skip(start_index)
    {
        let children = block.el.children.as_slice();
        let start_global = if block_index == start_index {
            point_offset(children, start_inline_ix, start.offset)
        } else {
            0
        };
        let end_global = if block_index == end_index {
            point_offset(children, end_inline_ix, end.offset)
        } else {
            total_inline_len(children)
        };
        if start_global < end_global {
            ranges.push(InlineRange::new(block.path.clone(), start_global, end_global));
        }
    }
    ranges
}

/// Derived attribute overlay of the selection.
///
/// Collapsed: the node around the caret (inside, else before, else after).
/// Otherwise: the first non-empty inline node of the selection. Only
/// attributes registered with the schema are reported.
pub fn selection_attrs(doc: &Document, registry: &PluginRegistry, sel: &Selection) -> Attrs {
    let source = if sel.is_collapsed() {
        block_at(doc, &sel.focus).and_then(|(_, el)| {
            let child_ix = *sel.focus.path.last()?;
            let around = caret_neighbors(&el.children, child_ix, sel.focus.offset);
            around
                .text_node
                .or(around.before)
                .or(around.after)
                .and_then(|ix| el.children.get(ix))
        })
    } else {
        selection_ranges(doc, registry, sel)
            .iter()
            .find_map(|range| first_node_in_range(doc, range))
    };

    source
        .map(|node| {
            node.attrs()
                .iter()
                .filter(|(key, _)| registry.attribute_spec(key).is_some())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn first_node_in_range<'a>(doc: &'a Document, range: &InlineRange) -> Option<&'a Node> {
    nodes_in_range(doc, range).into_iter().next()
}

/// Non-empty inline nodes of `range.block` that overlap `range`.
pub fn nodes_in_range<'a>(doc: &'a Document, range: &InlineRange) -> Vec<&'a Node> {
    let Some(Node::Element(el)) = node_ref(doc, &range.block) else {
        return Vec::new();
    };
    let starts = child_starts(&el.children);
    el.children
        .iter()
        .zip(starts)
        .filter(|(node, start)| {
            let len = inline_len(node);
            len > 0 && *start < range.end && range.start < start + len
        })
        .map(|(node, _)| node)
        .collect()
}

/// Selection spanning `range`: start resolves forward, end backward, so both
/// points sit on leaves inside the range.
pub fn selection_for_range(doc: &Document, range: &InlineRange) -> Option<Selection> {
    let Some(Node::Element(el)) = node_ref(doc, &range.block) else {
        return None;
    };
    let anchor = point_at_offset(&range.block, &el.children, range.start, Affinity::Forward);
    if range.is_collapsed() {
        return Some(Selection::collapsed(anchor));
    }
    let focus = point_at_offset(&range.block, &el.children, range.end, Affinity::Backward);
    Some(Selection::new(anchor, focus))
}

/// Ops that apply `patch` to every inline piece covered by `ranges`.
///
/// Text leaves straddling a range boundary are split first, so the selection
/// is carried through by the split transform and stays where it was.
pub fn patch_ranges_ops(doc: &Document, ranges: &[InlineRange], patch: &AttrPatch) -> Vec<Op> {
    let mut blocks: Vec<(&Path, Vec<Range<usize>>)> = Vec::new();
    for range in ranges.iter().filter(|r| !r.is_collapsed()) {
        match blocks.iter_mut().find(|(path, _)| **path == range.block) {
            Some((_, spans)) => spans.push(range.span()),
            None => blocks.push((&range.block, vec![range.span()])),
        }
    }

    let mut ops = Vec::new();
    for (block_path, spans) in blocks {
        let Some(Node::Element(el)) = node_ref(doc, block_path) else {
            continue;
        };
        ops.extend(patch_block_ops(block_path, &el.children, &spans, patch));
    }
    ops
}

fn patch_block_ops(
    block_path: &[usize],
    children: &[Node],
    spans: &[Range<usize>],
    patch: &AttrPatch,
) -> Vec<Op> {
    let covered = |a: usize, b: usize| spans.iter().any(|s| s.start <= a && b <= s.end);
    let child_path = |ix: usize| {
        let mut path = block_path.to_vec();
        path.push(ix);
        path
    };

    let starts = child_starts(children);
    let mut ops = Vec::new();

    // Right to left, so splitting a leaf never shifts a leaf still to visit.
    for (ix, node) in children.iter().enumerate().rev() {
        let len = inline_len(node);
        let start = starts[ix];
        let end = start + len;
        if len == 0 || !spans.iter().any(|s| s.start < end && start < s.end) {
            continue;
        }

        match node {
            Node::Text(t) => {
                let mut cuts: Vec<usize> = spans
                    .iter()
                    .flat_map(|s| [s.start, s.end])
                    .filter(|&c| c > start && c < end)
                    .map(|c| clamp_to_char_boundary(&t.text, c - start))
                    .filter(|&c| c > 0 && c < len)
                    .collect();
                cuts.sort_unstable();
                cuts.dedup();

                let mut piece_end = len;
                for &cut in cuts.iter().rev() {
                    let mut attrs = t.attrs.clone();
                    if covered(start + cut, start + piece_end) {
                        patch.apply_to(&mut attrs);
                    }
                    ops.push(Op::SplitText {
                        path: child_path(ix),
                        offset: cut,
                        attrs,
                    });
                    piece_end = cut;
                }
                if covered(start, start + piece_end) {
                    ops.push(Op::SetNodeAttrs {
                        path: child_path(ix),
                        patch: patch.clone(),
                    });
                }
            }
            Node::Void(_) => {
                if covered(start, end) {
                    ops.push(Op::SetNodeAttrs {
                        path: child_path(ix),
                        patch: patch.clone(),
                    });
                }
            }
            Node::Element(_) => {}
        }
    }
    ops
}
