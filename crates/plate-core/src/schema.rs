//! Attribute permissions for inline content.

use serde::{Deserialize, Serialize};

use crate::core::{Document, ElementNode, Node, Point, node_ref};
use crate::inline::{InlineRange, block_at, child_starts, inline_len};
use crate::plugin::PluginRegistry;

/// Declares an inline attribute and where it may appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub key: String,
    /// Allowed on text leaves.
    pub on_text: bool,
    /// Inline void kinds that may carry the attribute.
    #[serde(default)]
    pub on_voids: Vec<String>,
}

impl AttributeSpec {
    pub fn text(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            on_text: true,
            on_voids: Vec::new(),
        }
    }

    pub fn on_voids<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on_voids = kinds.into_iter().map(Into::into).collect();
        self
    }
}

pub struct AttributeContext<'a> {
    pub block: &'a ElementNode,
    pub node: &'a Node,
}

/// Extra veto on top of the declarative rules; every check must agree.
pub trait AttributeCheck: Send + Sync {
    fn id(&self) -> &'static str;
    fn allows(&self, ctx: &AttributeContext<'_>, key: &str) -> bool;
}

impl PluginRegistry {
    pub fn allows_attribute(&self, block: &ElementNode, node: &Node, key: &str) -> bool {
        let Some(spec) = self.attribute_spec(key) else {
            return false;
        };
        let block_allows = self
            .node_specs()
            .get(&block.kind)
            .is_none_or(|s| s.inline_attributes);
        if !block_allows {
            return false;
        }
        let node_allows = match node {
            Node::Text(_) => spec.on_text,
            Node::Void(v) => spec.on_voids.iter().any(|kind| *kind == v.kind),
            Node::Element(_) => false,
        };
        if !node_allows {
            return false;
        }
        let ctx = AttributeContext { block, node };
        self.attribute_checks()
            .iter()
            .all(|check| check.allows(&ctx, key))
    }

    /// Whether text typed at `point` could carry `key`.
    pub fn allows_attribute_at(&self, doc: &Document, point: &Point, key: &str) -> bool {
        let Some((_, block)) = block_at(doc, point) else {
            return false;
        };
        let Some(node) = point
            .path
            .last()
            .and_then(|&ix| block.children.get(ix))
        else {
            return false;
        };
        self.allows_attribute(block, node, key)
    }

    /// Restricts `ranges` to the maximal sub-ranges whose nodes permit every
    /// key in `keys`. Disallowed nodes split a range; nothing is rejected.
    pub fn valid_ranges(
        &self,
        doc: &Document,
        ranges: &[InlineRange],
        keys: &[&str],
    ) -> Vec<InlineRange> {
        let mut out = Vec::new();
        for range in ranges {
            let Some(Node::Element(block)) = node_ref(doc, &range.block) else {
                continue;
            };
            let starts = child_starts(&block.children);
            let mut current: Option<InlineRange> = None;

            for (node, start) in block.children.iter().zip(starts) {
                let len = inline_len(node);
                let end = start + len;
                if len == 0 || end <= range.start || start >= range.end {
                    continue;
                }
                let piece_start = start.max(range.start);
                let piece_end = end.min(range.end);

                if keys.iter().all(|key| self.allows_attribute(block, node, key)) {
                    let extends = current
                        .as_ref()
                        .is_some_and(|open| open.end == piece_start);
                    if extends {
                        if let Some(open) = current.as_mut() {
                            open.end = piece_end;
                        }
                    } else {
                        out.extend(current.take());
                        current = Some(InlineRange::new(
                            range.block.clone(),
                            piece_start,
                            piece_end,
                        ));
                    }
                } else {
                    out.extend(current.take());
                }
            }
            out.extend(current);
        }
        out
    }
}
