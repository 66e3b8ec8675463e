use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::inline::{self, InlineRange};
use crate::ops::{Op, Path, Transaction};
use crate::plugin::{CommandError, PluginRegistry, QueryError};

pub type Attrs = BTreeMap<String, serde_json::Value>;
pub type ElementKind = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    Void(VoidNode),
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::block("paragraph", vec![Node::text(text)])
    }

    pub fn block(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            attrs: Attrs::default(),
            children,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode {
            text: text.into(),
            attrs: Attrs::default(),
        })
    }

    pub fn text_with_attrs(text: impl Into<String>, attrs: Attrs) -> Self {
        Node::Text(TextNode {
            text: text.into(),
            attrs,
        })
    }

    pub fn divider() -> Self {
        Node::Void(VoidNode {
            kind: "divider".to_string(),
            attrs: Attrs::default(),
        })
    }

    pub fn image(src: impl Into<String>) -> Self {
        let mut attrs = Attrs::default();
        attrs.insert("src".to_string(), Value::String(src.into()));
        Node::Void(VoidNode {
            kind: "image".to_string(),
            attrs,
        })
    }

    pub fn attrs(&self) -> &Attrs {
        match self {
            Node::Element(el) => &el.attrs,
            Node::Text(t) => &t.attrs,
            Node::Void(v) => &v.attrs,
        }
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        match self {
            Node::Element(el) => &mut el.attrs,
            Node::Text(t) => &mut t.attrs,
            Node::Void(v) => &mut v.attrs,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs().get(key)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs_mut().insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Returns `(start, end)` in document order.
    pub fn ordered(&self) -> (Point, Point) {
        let mut start = self.anchor.clone();
        let mut end = self.focus.clone();

        if start.path == end.path {
            if end.offset < start.offset {
                std::mem::swap(&mut start, &mut end);
            }
            return (start, end);
        }
        if end.path < start.path {
            std::mem::swap(&mut start, &mut end);
        }
        (start, end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrPatch {
    #[serde(default)]
    pub set: Attrs,
    #[serde(default)]
    pub remove: Vec<String>,
}

impl AttrPatch {
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(key.into(), value.into());
        self
    }

    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.remove.push(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    /// Applies the patch and returns the patch that undoes it.
    pub fn apply_to(&self, attrs: &mut Attrs) -> AttrPatch {
        let mut old_set: Attrs = Attrs::new();
        let mut old_remove: Vec<String> = Vec::new();

        for (k, v) in &self.set {
            if let Some(prev) = attrs.insert(k.clone(), v.clone()) {
                old_set.insert(k.clone(), prev);
            } else {
                old_remove.push(k.clone());
            }
        }

        for key in &self.remove {
            if let Some(prev) = attrs.remove(key) {
                old_set.insert(key.clone(), prev);
            }
        }

        AttrPatch {
            set: old_set,
            remove: old_remove,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub inverse_ops: Vec<Op>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

#[derive(Debug, Default, Clone)]
pub struct EditorConfig {
    pub max_undo: usize,
    pub max_normalize_iterations: usize,
}

impl EditorConfig {
    fn with_defaults(mut self) -> Self {
        if self.max_undo == 0 {
            self.max_undo = 200;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        self
    }
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("normalization did not converge")]
    NormalizeDidNotConverge,
}

impl From<PathError> for ApplyError {
    fn from(value: PathError) -> Self {
        ApplyError::InvalidPath(value.0)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct PathError(pub String);

pub struct Editor {
    doc: Document,
    selection: Selection,
    registry: PluginRegistry,
    config: EditorConfig,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
}

impl Editor {
    pub fn new(doc: Document, selection: Selection, registry: PluginRegistry) -> Self {
        Self::with_config(doc, selection, registry, EditorConfig::default())
    }

    pub fn with_config(
        doc: Document,
        selection: Selection,
        registry: PluginRegistry,
        config: EditorConfig,
    ) -> Self {
        let mut editor = Self {
            doc,
            selection,
            registry,
            config: config.with_defaults(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        editor.normalize_in_place();
        editor
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.normalize_selection_in_place();
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Attributes that text typed at the selection would carry.
    pub fn selection_attrs(&self) -> Attrs {
        inline::selection_attrs(&self.doc, &self.registry, &self.selection)
    }

    pub fn selection_ranges(&self) -> Vec<InlineRange> {
        inline::selection_ranges(&self.doc, &self.registry, &self.selection)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let redo_ops = self.replay(inverse_ops);

        self.selection = selection_before.clone();
        self.normalize_in_place();

        self.redo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: redo_ops,
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let undo_ops = self.replay(inverse_ops);

        self.selection = selection_after.clone();
        self.normalize_in_place();

        self.undo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: undo_ops,
        });
        true
    }

    fn replay(&mut self, ops: Vec<Op>) -> Vec<Op> {
        let mut inverse: Vec<Op> = Vec::new();
        for op in ops {
            match self.apply_op(op) {
                Ok(inv) => inverse.push(inv),
                Err(err) => {
                    // Stop mutating once the history no longer lines up with the document.
                    log::warn!("history replay stopped: {err}");
                    break;
                }
            }
        }
        inverse.reverse();
        inverse
    }

    /// Applies `tx` as a single change block. On failure the document and
    /// selection are left exactly as they were before the call.
    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let doc_before = self.doc.clone();
        let selection_before = self.selection.clone();

        match self.apply_unchecked(tx) {
            Ok(inverse_ops) => {
                self.undo_stack.push(UndoRecord {
                    inverse_ops,
                    selection_before,
                    selection_after: self.selection.clone(),
                });
                self.redo_stack.clear();
                if self.undo_stack.len() > self.config.max_undo {
                    self.undo_stack.remove(0);
                }
                Ok(())
            }
            Err(err) => {
                self.doc = doc_before;
                self.selection = selection_before;
                Err(err)
            }
        }
    }

    fn apply_unchecked(&mut self, tx: Transaction) -> Result<Vec<Op>, ApplyError> {
        log::trace!(
            "apply {} op(s) from {}",
            tx.ops.len(),
            tx.meta.source.as_deref().unwrap_or("unknown")
        );

        let mut inverse_ops: Vec<Op> = Vec::new();
        for op in tx.ops {
            let inv = self.apply_op(op)?;
            inverse_ops.push(inv);
        }

        if let Some(sel) = tx.selection_after {
            self.selection = sel;
        }
        if let Some(sel) = tx
            .select_range
            .and_then(|range| inline::selection_for_range(&self.doc, &range))
        {
            self.selection = sel;
        }

        let mut inverse_normalize = self.normalize_with_inverse_ops()?;
        inverse_ops.append(&mut inverse_normalize);
        inverse_ops.reverse();

        self.normalize_selection_in_place();
        Ok(inverse_ops)
    }

    pub fn is_command_enabled(&self, id: &str) -> bool {
        self.registry
            .command(id)
            .is_some_and(|command| command.is_enabled(self))
    }

    pub fn run_command(&mut self, id: &str, args: Option<Value>) -> Result<(), CommandError> {
        let Some(command) = self.registry.command(id) else {
            return Err(CommandError::new(format!("Unknown command: {id}")));
        };
        if !command.is_enabled(self) {
            return Err(CommandError::new(format!("Command is disabled: {id}")));
        }
        (command.handler)(self, args)
    }

    pub fn run_query_json(&self, id: &str, args: Option<Value>) -> Result<Value, QueryError> {
        let Some(query) = self.registry.query(id) else {
            return Err(QueryError::new(format!("Unknown query: {id}")));
        };
        (query.handler)(self, args)
    }

    pub fn run_query<T>(&self, id: &str, args: Option<Value>) -> Result<T, QueryError>
    where
        T: DeserializeOwned,
    {
        let value = self.run_query_json(id, args)?;
        serde_json::from_value(value)
            .map_err(|err| QueryError::new(format!("Failed to decode query result: {err}")))
    }

    fn normalize_in_place(&mut self) {
        if let Err(err) = self.normalize_with_inverse_ops() {
            log::warn!("normalization failed: {err}");
        }
        self.normalize_selection_in_place();
    }

    fn normalize_selection_in_place(&mut self) {
        self.selection = self
            .registry
            .normalize_selection(&self.doc, &self.selection);
    }

    fn normalize_with_inverse_ops(&mut self) -> Result<Vec<Op>, ApplyError> {
        let mut inverse_ops: Vec<Op> = Vec::new();
        for iteration in 0..self.config.max_normalize_iterations {
            let ops = self.registry.normalize(&self.doc);
            if ops.is_empty() {
                return Ok(inverse_ops);
            }
            log::trace!("normalize iteration {iteration}: {} op(s)", ops.len());
            for op in ops {
                let inv = self.apply_op(op)?;
                inverse_ops.push(inv);
            }
        }
        Err(ApplyError::NormalizeDidNotConverge)
    }

    fn apply_op(&mut self, op: Op) -> Result<Op, ApplyError> {
        apply_op_to(&mut self.doc, &mut self.selection, op)
    }
}

fn apply_op_to(doc: &mut Document, selection: &mut Selection, op: Op) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let text_node = node_text_mut(doc, &path)?;
            let offset = inline::clamp_to_char_boundary(&text_node.text, offset);
            text_node.text.insert_str(offset, &text);
            transform_selection_insert_text(selection, &path, offset, text.len());
            Ok(Op::RemoveText {
                path,
                range: offset..offset + text.len(),
            })
        }
        Op::RemoveText { path, range } => {
            let text_node = node_text_mut(doc, &path)?;
            let start = inline::clamp_to_char_boundary(&text_node.text, range.start);
            let end = inline::clamp_to_char_boundary(&text_node.text, range.end);
            if start >= end {
                return Ok(Op::InsertText {
                    path,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = text_node.text[start..end].to_string();
            text_node.text.replace_range(start..end, "");
            transform_selection_remove_text(selection, &path, start..end);
            Ok(Op::InsertText {
                path,
                offset: start,
                text: removed,
            })
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            transform_selection_insert_node(selection, &path);
            Ok(Op::RemoveNode { path })
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            transform_selection_remove_node(selection, &path, doc);
            Ok(Op::InsertNode {
                path,
                node: removed,
            })
        }
        Op::SetNodeAttrs { path, patch } => {
            let node = node_mut(doc, &path)?;
            let old = patch.apply_to(node.attrs_mut());
            Ok(Op::SetNodeAttrs { path, patch: old })
        }
        Op::MergeText { path } => {
            let (parent_path, index) = split_index(&path)?;
            if index == 0 {
                return Err(PathError("Cannot merge the first child".into()).into());
            }
            let siblings = children_mut(doc, parent_path)?;
            if !matches!(
                (siblings.get(index - 1), siblings.get(index)),
                (Some(Node::Text(_)), Some(Node::Text(_)))
            ) {
                return Err(PathError("Merge needs two adjacent text nodes".into()).into());
            }
            let Node::Text(right) = siblings.remove(index) else {
                return Err(PathError("Merge target is not a text node".into()).into());
            };
            let Some(Node::Text(left)) = siblings.get_mut(index - 1) else {
                return Err(PathError("Merge source is not a text node".into()).into());
            };
            let prefix = left.text.len();
            left.text.push_str(&right.text);
            transform_selection_merge_text(selection, parent_path, index, prefix);

            let mut left_path = parent_path.to_vec();
            left_path.push(index - 1);
            Ok(Op::SplitText {
                path: left_path,
                offset: prefix,
                attrs: right.attrs,
            })
        }
        Op::SplitText {
            path,
            offset,
            attrs,
        } => {
            let (parent_path, index) = split_index(&path)?;
            let siblings = children_mut(doc, parent_path)?;
            let Some(Node::Text(left)) = siblings.get_mut(index) else {
                return Err(PathError("Split target is not a text node".into()).into());
            };
            let offset = inline::clamp_to_char_boundary(&left.text, offset);
            let right = left.text.split_off(offset);
            siblings.insert(index + 1, Node::Text(TextNode { text: right, attrs }));
            transform_selection_split_text(selection, parent_path, index, offset);

            let mut right_path = parent_path.to_vec();
            right_path.push(index + 1);
            Ok(Op::MergeText { path: right_path })
        }
    }
}

fn split_index(path: &[usize]) -> Result<(&[usize], usize), PathError> {
    let (index, parent) = path
        .split_last()
        .ok_or_else(|| PathError("Empty path".into()))?;
    Ok((parent, *index))
}

fn transform_selection_insert_text(
    selection: &mut Selection,
    path: &[usize],
    offset: usize,
    len: usize,
) {
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path == path && point.offset >= offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

fn transform_selection_remove_text(
    selection: &mut Selection,
    path: &[usize],
    range: std::ops::Range<usize>,
) {
    let removed_len = range.end.saturating_sub(range.start);
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path != path {
            continue;
        }
        if point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}

fn transform_selection_insert_node(selection: &mut Selection, path: &[usize]) {
    if path.is_empty() {
        return;
    }
    let (parent_path, index) = path.split_at(path.len() - 1);
    let index = index[0];

    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() <= parent_path.len() {
            continue;
        }
        if !point.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        if point.path[depth] >= index {
            point.path[depth] += 1;
        }
    }
}

fn transform_selection_remove_node(
    selection: &mut Selection,
    path: &[usize],
    doc_after_remove: &Document,
) {
    if path.is_empty() {
        return;
    }
    let (parent_path, index) = path.split_at(path.len() - 1);
    let index = index[0];

    let left_text_len = index.checked_sub(1).and_then(|left_index| {
        let mut left_path = parent_path.to_vec();
        left_path.push(left_index);
        match node_ref(doc_after_remove, &left_path) {
            Some(Node::Text(left)) => Some(left.text.len()),
            _ => None,
        }
    });

    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() <= parent_path.len() {
            continue;
        }
        if !point.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        let ix = point.path[depth];
        if ix > index {
            point.path[depth] = ix - 1;
            continue;
        }
        if ix < index {
            continue;
        }

        // Point was inside the removed subtree. Map it to a nearby point.
        point.path.truncate(depth + 1);
        point.path[depth] = index.saturating_sub(1);
        point.offset = left_text_len.unwrap_or(0);
    }
}

fn transform_selection_merge_text(
    selection: &mut Selection,
    parent_path: &[usize],
    index: usize,
    prefix: usize,
) {
    let depth = parent_path.len();
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() != depth + 1 || !point.path.starts_with(parent_path) {
            continue;
        }
        let ix = point.path[depth];
        if ix == index {
            point.path[depth] = index - 1;
            point.offset += prefix;
        } else if ix > index {
            point.path[depth] = ix - 1;
        }
    }
}

fn transform_selection_split_text(
    selection: &mut Selection,
    parent_path: &[usize],
    index: usize,
    offset: usize,
) {
    let depth = parent_path.len();
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path.len() != depth + 1 || !point.path.starts_with(parent_path) {
            continue;
        }
        let ix = point.path[depth];
        if ix == index && point.offset > offset {
            point.path[depth] = index + 1;
            point.offset -= offset;
        } else if ix > index {
            point.path[depth] = ix + 1;
        }
    }
}

pub(crate) fn node_ref<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = doc.children.get(*first)?;
    for &ix in rest {
        node = match node {
            Node::Element(el) => el.children.get(ix)?,
            Node::Void(_) | Node::Text(_) => return None,
        };
    }
    Some(node)
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    let (first, rest) = path
        .split_first()
        .ok_or_else(|| PathError("Empty path".into()))?;
    let len = doc.children.len();
    let mut node = doc.children.get_mut(*first).ok_or_else(|| {
        PathError(format!("Path out of bounds at depth 0: {first} >= {len}"))
    })?;

    for (depth, &ix) in rest.iter().enumerate() {
        node = match { node } {
            Node::Element(el) => {
                let len = el.children.len();
                el.children.get_mut(ix).ok_or_else(|| {
                    PathError(format!(
                        "Path out of bounds at depth {}: {ix} >= {len}",
                        depth + 1
                    ))
                })?
            }
            Node::Void(_) | Node::Text(_) => {
                return Err(PathError(format!("Non-container node at depth {depth}")));
            }
        };
    }
    Ok(node)
}

fn node_text_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextNode, PathError> {
    match node_mut(doc, path)? {
        Node::Text(t) => Ok(t),
        _ => Err(PathError("Expected Text node".into())),
    }
}

fn children_mut<'a>(
    doc: &'a mut Document,
    parent_path: &[usize],
) -> Result<&'a mut Vec<Node>, PathError> {
    if parent_path.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(doc, parent_path)? {
        Node::Element(el) => Ok(&mut el.children),
        Node::Void(_) | Node::Text(_) => Err(PathError("Parent is not a container".into())),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    let (parent_path, index) = split_index(path)?;
    let children = children_mut(doc, parent_path)?;

    if index > children.len() {
        return Err(PathError(format!(
            "Insert index out of bounds: {index} > {}",
            children.len()
        )));
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    let (parent_path, index) = split_index(path)?;
    let children = children_mut(doc, parent_path)?;

    if index >= children.len() {
        return Err(PathError(format!(
            "Remove index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    Ok(children.remove(index))
}
