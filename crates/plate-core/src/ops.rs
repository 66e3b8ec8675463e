use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{AttrPatch, Attrs, Node, Selection};
use crate::inline::InlineRange;

pub type Path = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        #[serde(default)]
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        #[serde(default)]
        path: Path,
        range: Range<usize>,
    },
    InsertNode {
        #[serde(default)]
        path: Path,
        node: Node,
    },
    RemoveNode {
        #[serde(default)]
        path: Path,
    },
    SetNodeAttrs {
        #[serde(default)]
        path: Path,
        patch: AttrPatch,
    },
    /// Appends the text leaf at `path` to its previous sibling and removes it.
    MergeText {
        #[serde(default)]
        path: Path,
    },
    /// Splits the text leaf at `path`; the right half becomes a new sibling
    /// carrying `attrs`.
    SplitText {
        #[serde(default)]
        path: Path,
        offset: usize,
        #[serde(default)]
        attrs: Attrs,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// One change block: every op is applied, or none is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
    /// Resolved against the document after `ops`, so it can address content
    /// the ops themselves create or split. Wins over `selection_after`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_range: Option<InlineRange>,
    #[serde(default)]
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
            select_range: None,
            meta: TransactionMeta::default(),
        }
    }

    pub fn selection_after(mut self, selection_after: Selection) -> Self {
        self.selection_after = Some(selection_after);
        self
    }

    pub fn select_range(mut self, range: InlineRange) -> Self {
        self.select_range = Some(range);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }
}
