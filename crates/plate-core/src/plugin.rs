use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Document, Editor, Node, Point, Selection};
use crate::inline::{block_at, point_offset};
use crate::ops::Op;
use crate::schema::{AttributeCheck, AttributeSpec};

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate node spec kind: {0}")]
    DuplicateNodeSpec(String),
    #[error("duplicate attribute spec: {0}")]
    DuplicateAttribute(String),
    #[error("duplicate command id: {0}")]
    DuplicateCommand(String),
    #[error("duplicate query id: {0}")]
    DuplicateQuery(String),
}

pub type CommandHandler =
    Arc<dyn Fn(&mut Editor, Option<serde_json::Value>) -> Result<(), CommandError> + Send + Sync>;
pub type EnabledPredicate = Arc<dyn Fn(&Editor) -> bool + Send + Sync>;
pub type QueryHandler = Arc<
    dyn Fn(&Editor, Option<serde_json::Value>) -> Result<serde_json::Value, QueryError>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct CommandSpec {
    pub id: String,
    pub label: String,
    pub handler: CommandHandler,
    /// Evaluated on demand; `None` means always enabled.
    pub enabled: Option<EnabledPredicate>,
}

impl CommandSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(&mut Editor, Option<serde_json::Value>) -> Result<(), CommandError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            handler: Arc::new(handler),
            enabled: None,
        }
    }

    pub fn enabled_when(
        mut self,
        predicate: impl Fn(&Editor) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.enabled = Some(Arc::new(predicate));
        self
    }

    pub fn is_enabled(&self, editor: &Editor) -> bool {
        self.enabled.as_ref().is_none_or(|enabled| enabled(editor))
    }
}

#[derive(Clone)]
pub struct QuerySpec {
    pub id: String,
    pub handler: QueryHandler,
}

impl QuerySpec {
    pub fn new(
        id: impl Into<String>,
        handler: impl Fn(&Editor, Option<serde_json::Value>) -> Result<serde_json::Value, QueryError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Block,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildConstraint {
    None,
    BlockOnly,
    InlineOnly,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: String,
    pub role: NodeRole,
    pub is_void: bool,
    pub children: ChildConstraint,
    /// Whether inline children of this block may carry formatting attributes.
    pub inline_attributes: bool,
}

pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op>;
}

pub trait PlatePlugin: Send + Sync {
    fn id(&self) -> &'static str;
    fn node_specs(&self) -> Vec<NodeSpec> {
        Vec::new()
    }
    fn attribute_specs(&self) -> Vec<AttributeSpec> {
        Vec::new()
    }
    fn attribute_checks(&self) -> Vec<Box<dyn AttributeCheck>> {
        Vec::new()
    }
    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        Vec::new()
    }
    fn commands(&self) -> Vec<CommandSpec> {
        Vec::new()
    }
    fn queries(&self) -> Vec<QuerySpec> {
        Vec::new()
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    node_specs: HashMap<String, NodeSpec>,
    attribute_specs: HashMap<String, AttributeSpec>,
    attribute_checks: Vec<Box<dyn AttributeCheck>>,
    normalize_passes: Vec<Box<dyn NormalizePass>>,
    commands: HashMap<String, CommandSpec>,
    queries: HashMap<String, QuerySpec>,
}

impl PluginRegistry {
    pub fn new(
        plugins: impl IntoIterator<Item = Box<dyn PlatePlugin>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for plugin in plugins {
            registry.register_plugin(plugin)?;
        }
        Ok(registry)
    }

    pub fn core() -> Self {
        Self::new(core_plugins()).expect("core registry must be valid")
    }

    /// Core plugins followed by `extra`.
    pub fn with_core(
        extra: impl IntoIterator<Item = Box<dyn PlatePlugin>>,
    ) -> Result<Self, RegistryError> {
        Self::new(core_plugins().into_iter().chain(extra))
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn PlatePlugin>) -> Result<(), RegistryError> {
        log::trace!("registering plugin {}", plugin.id());

        for spec in plugin.node_specs() {
            if self.node_specs.contains_key(&spec.kind) {
                return Err(RegistryError::DuplicateNodeSpec(spec.kind));
            }
            self.node_specs.insert(spec.kind.clone(), spec);
        }

        for spec in plugin.attribute_specs() {
            if self.attribute_specs.contains_key(&spec.key) {
                return Err(RegistryError::DuplicateAttribute(spec.key));
            }
            self.attribute_specs.insert(spec.key.clone(), spec);
        }

        self.attribute_checks.extend(plugin.attribute_checks());
        self.normalize_passes.extend(plugin.normalize_passes());

        for cmd in plugin.commands() {
            if self.commands.contains_key(&cmd.id) {
                return Err(RegistryError::DuplicateCommand(cmd.id));
            }
            self.commands.insert(cmd.id.clone(), cmd);
        }

        for query in plugin.queries() {
            if self.queries.contains_key(&query.id) {
                return Err(RegistryError::DuplicateQuery(query.id));
            }
            self.queries.insert(query.id.clone(), query);
        }

        Ok(())
    }

    pub fn node_specs(&self) -> &HashMap<String, NodeSpec> {
        &self.node_specs
    }

    pub fn attribute_spec(&self, key: &str) -> Option<&AttributeSpec> {
        self.attribute_specs.get(key)
    }

    pub fn attribute_checks(&self) -> &[Box<dyn AttributeCheck>] {
        &self.attribute_checks
    }

    pub fn normalize_passes(&self) -> &[Box<dyn NormalizePass>] {
        &self.normalize_passes
    }

    pub fn commands(&self) -> &HashMap<String, CommandSpec> {
        &self.commands
    }

    pub fn command(&self, id: &str) -> Option<CommandSpec> {
        self.commands.get(id).cloned()
    }

    pub fn queries(&self) -> &HashMap<String, QuerySpec> {
        &self.queries
    }

    pub fn query(&self, id: &str) -> Option<QuerySpec> {
        self.queries.get(id).cloned()
    }

    pub fn normalize(&self, doc: &Document) -> Vec<Op> {
        let mut ops: Vec<Op> = Vec::new();
        for pass in &self.normalize_passes {
            ops.extend(pass.run(doc, self));
        }
        ops
    }

    pub fn normalize_selection(&self, doc: &Document, selection: &Selection) -> Selection {
        let fallback = first_text_point(doc).unwrap_or(Point {
            path: vec![0],
            offset: 0,
        });

        let anchor =
            normalize_point_to_existing_text(doc, &selection.anchor).unwrap_or_else(|| {
                normalize_point_to_existing_text(doc, &selection.focus)
                    .unwrap_or_else(|| fallback.clone())
            });
        let focus = normalize_point_to_existing_text(doc, &selection.focus)
            .unwrap_or_else(|| anchor.clone());

        // Two ends on either side of a leaf boundary are one caret.
        if anchor != focus && same_inline_position(doc, &anchor, &focus) {
            return Selection::collapsed(focus);
        }
        Selection { anchor, focus }
    }

    pub fn is_known_kind(&self, kind: &str) -> bool {
        self.node_specs.contains_key(kind)
    }

    fn children_constraint(&self, kind: &str, children: &[Node]) -> ChildConstraint {
        self.node_specs
            .get(kind)
            .map(|s| s.children.clone())
            .unwrap_or_else(|| {
                if children.iter().any(|n| matches!(n, Node::Text(_))) {
                    ChildConstraint::InlineOnly
                } else {
                    ChildConstraint::Any
                }
            })
    }
}

fn core_plugins() -> Vec<Box<dyn PlatePlugin>> {
    vec![
        Box::new(CoreParagraphPlugin),
        Box::new(CodeBlockPlugin),
        Box::new(CoreDividerPlugin),
        Box::new(InlineImagePlugin),
        Box::new(CoreNormalizePlugin),
    ]
}

fn same_inline_position(doc: &Document, a: &Point, b: &Point) -> bool {
    let (Some((a_block, el)), Some((b_block, _))) = (block_at(doc, a), block_at(doc, b)) else {
        return false;
    };
    let (Some(&a_ix), Some(&b_ix)) = (a.path.last(), b.path.last()) else {
        return false;
    };
    a_block == b_block
        && point_offset(&el.children, a_ix, a.offset) == point_offset(&el.children, b_ix, b.offset)
}

fn first_text_point(doc: &Document) -> Option<Point> {
    fn walk(children: &[Node], path: &mut Vec<usize>) -> Option<Point> {
        for (ix, node) in children.iter().enumerate() {
            path.push(ix);
            match node {
                Node::Text(_) => {
                    let point = Point {
                        path: path.clone(),
                        offset: 0,
                    };
                    path.pop();
                    return Some(point);
                }
                Node::Element(el) => {
                    if let Some(point) = walk(&el.children, path) {
                        path.pop();
                        return Some(point);
                    }
                }
                Node::Void(_) => {}
            }
            path.pop();
        }
        None
    }

    walk(&doc.children, &mut Vec::new())
}

fn normalize_point_to_existing_text(doc: &Document, point: &Point) -> Option<Point> {
    if point.path.is_empty() || doc.children.is_empty() {
        return None;
    }

    let mut resolved_path: Vec<usize> = Vec::new();
    let mut children: &[Node] = &doc.children;

    for &wanted in &point.path {
        if children.is_empty() {
            break;
        }
        let ix = wanted.min(children.len() - 1);
        resolved_path.push(ix);
        match &children[ix] {
            Node::Text(t) => {
                return Some(Point {
                    path: resolved_path,
                    offset: point.offset.min(t.text.len()),
                });
            }
            Node::Element(el) => {
                children = &el.children;
            }
            Node::Void(_) => {
                break;
            }
        }
    }

    match crate::core::node_ref(doc, &resolved_path)? {
        Node::Text(t) => Some(Point {
            path: resolved_path,
            offset: point.offset.min(t.text.len()),
        }),
        Node::Element(el) => {
            let mut inner = first_text_point(&Document {
                children: el.children.clone(),
            })?;
            resolved_path.append(&mut inner.path);
            Some(Point::new(resolved_path, 0))
        }
        Node::Void(_) => nearest_text_beside_void(doc, &resolved_path),
    }
}

/// A point on the text leaf next to an inline void: end of the previous leaf,
/// else start of the next one.
fn nearest_text_beside_void(doc: &Document, void_path: &[usize]) -> Option<Point> {
    let (void_ix, block_path) = void_path.split_last()?;
    let Some(Node::Element(block)) = crate::core::node_ref(doc, block_path) else {
        return None;
    };
    let at = |ix: usize, offset: usize| {
        let mut path = block_path.to_vec();
        path.push(ix);
        Point::new(path, offset)
    };
    let before = block.children[..*void_ix]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(ix, node)| match node {
            Node::Text(t) => Some(at(ix, t.text.len())),
            _ => None,
        });
    before.or_else(|| {
        block
            .children
            .iter()
            .enumerate()
            .skip(void_ix + 1)
            .find_map(|(ix, node)| matches!(node, Node::Text(_)).then(|| at(ix, 0)))
    })
}

struct CoreParagraphPlugin;

impl PlatePlugin for CoreParagraphPlugin {
    fn id(&self) -> &'static str {
        "core.paragraph"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec {
            kind: "paragraph".to_string(),
            role: NodeRole::Block,
            is_void: false,
            children: ChildConstraint::InlineOnly,
            inline_attributes: true,
        }]
    }
}

struct CodeBlockPlugin;

impl PlatePlugin for CodeBlockPlugin {
    fn id(&self) -> &'static str {
        "core.code_block"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec {
            kind: "code_block".to_string(),
            role: NodeRole::Block,
            is_void: false,
            children: ChildConstraint::InlineOnly,
            inline_attributes: false,
        }]
    }
}

struct CoreDividerPlugin;

impl PlatePlugin for CoreDividerPlugin {
    fn id(&self) -> &'static str {
        "core.divider"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec {
            kind: "divider".to_string(),
            role: NodeRole::Block,
            is_void: true,
            children: ChildConstraint::None,
            inline_attributes: false,
        }]
    }
}

struct InlineImagePlugin;

impl PlatePlugin for InlineImagePlugin {
    fn id(&self) -> &'static str {
        "core.image"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec {
            kind: "image".to_string(),
            role: NodeRole::Inline,
            is_void: true,
            children: ChildConstraint::None,
            inline_attributes: false,
        }]
    }
}

struct CoreNormalizePlugin;

impl PlatePlugin for CoreNormalizePlugin {
    fn id(&self) -> &'static str {
        "core.normalize"
    }

    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        vec![
            Box::new(EnsureNonEmptyDocument),
            Box::new(EnsureParagraphHasTextLeaf),
            Box::new(MergeAdjacentTextLeaves),
        ]
    }
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn id(&self) -> &'static str {
        "core.ensure_non_empty_document"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

struct EnsureParagraphHasTextLeaf;

impl NormalizePass for EnsureParagraphHasTextLeaf {
    fn id(&self) -> &'static str {
        "core.ensure_inline_only_blocks_have_text_leaf"
    }

    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();

        fn walk(
            children: &[Node],
            path: &mut Vec<usize>,
            registry: &PluginRegistry,
            ops: &mut Vec<Op>,
        ) {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };

                path.push(ix);

                if registry.children_constraint(&el.kind, &el.children)
                    == ChildConstraint::InlineOnly
                {
                    let has_text = el.children.iter().any(|n| matches!(n, Node::Text(_)));
                    if !has_text {
                        let mut insert_path = path.clone();
                        insert_path.push(0);
                        ops.push(Op::InsertNode {
                            path: insert_path,
                            node: Node::text(""),
                        });
                    }
                } else {
                    walk(&el.children, path, registry, ops);
                }

                path.pop();
            }
        }

        walk(&doc.children, &mut Vec::new(), registry, &mut ops);
        ops
    }
}

/// Merges neighbouring text leaves with equal attributes, and folds empty
/// leaves into a preceding text leaf.
struct MergeAdjacentTextLeaves;

impl NormalizePass for MergeAdjacentTextLeaves {
    fn id(&self) -> &'static str {
        "core.merge_adjacent_text_leaves"
    }

    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();

        fn walk(
            children: &[Node],
            path: &mut Vec<usize>,
            registry: &PluginRegistry,
            ops: &mut Vec<Op>,
        ) {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };

                path.push(ix);

                if registry.children_constraint(&el.kind, &el.children)
                    == ChildConstraint::InlineOnly
                {
                    // Right to left keeps the remaining indices stable.
                    for right_ix in (1..el.children.len()).rev() {
                        let (Node::Text(left), Node::Text(right)) =
                            (&el.children[right_ix - 1], &el.children[right_ix])
                        else {
                            continue;
                        };
                        if left.attrs == right.attrs || right.text.is_empty() {
                            let mut merge_path = path.clone();
                            merge_path.push(right_ix);
                            ops.push(Op::MergeText { path: merge_path });
                        }
                    }
                } else {
                    walk(&el.children, path, registry, ops);
                }

                path.pop();
            }
        }

        walk(&doc.children, &mut Vec::new(), registry, &mut ops);
        ops
    }
}
