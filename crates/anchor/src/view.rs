//! Conversion between the model and a minimal element tree.
//!
//! Downcasting wraps each anchor span in an `<a id="…">` element; upcasting
//! reads such an element back into model attributes. Both directions are
//! plain functions over their input.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use plate_core::{Attrs, Document, Editor, InlineRange, Node, child_starts, inline_len};
use serde_json::Value;

use crate::ANCHOR_ID_ATTR;
use crate::command::current_anchor_id;
use crate::config::DecoratorConfig;
use crate::range::{anchor_id, find_anchor_range};

/// Class added to the anchor element containing the caret.
pub const HIGHLIGHT_CLASS: &str = "anchor_selected";

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

/// Attributes of the anchor element that decorators may not override.
pub const RESERVED_ATTRIBUTES: &[&str] = &["id", "name", "class"];

/// Whether `name` can be written as an HTML attribute name.
pub fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '<' | '/' | '=')
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Element(ViewElement),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub children: Vec<ViewNode>,
}

impl ViewElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn children(mut self, children: Vec<ViewNode>) -> Self {
        self.children = children;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

impl ViewNode {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            ViewNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
            ViewNode::Element(el) => {
                let _ = write!(out, "<{}", el.name);
                let attributes = el.attributes.iter().filter(|(name, _)| is_attribute_name(name));
                for (name, value) in attributes {
                    let _ = write!(
                        out,
                        " {name}=\"{}\"",
                        html_escape::encode_double_quoted_attribute(value)
                    );
                }
                if !el.classes.is_empty() {
                    let _ = write!(
                        out,
                        " class=\"{}\"",
                        html_escape::encode_double_quoted_attribute(&el.classes.join(" "))
                    );
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.name.as_str()) {
                    return;
                }
                for child in &el.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", el.name);
            }
        }
    }
}

pub fn to_html(nodes: &[ViewNode]) -> String {
    nodes.iter().map(ViewNode::to_html).collect()
}

pub fn downcast_document(
    doc: &Document,
    decorators: &[DecoratorConfig],
    highlight: Option<&InlineRange>,
) -> Vec<ViewNode> {
    let mut path = Vec::new();
    downcast_blocks(&doc.children, &mut path, decorators, highlight)
}

fn downcast_blocks(
    nodes: &[Node],
    path: &mut Vec<usize>,
    decorators: &[DecoratorConfig],
    highlight: Option<&InlineRange>,
) -> Vec<ViewNode> {
    let mut out = Vec::new();
    for (ix, node) in nodes.iter().enumerate() {
        path.push(ix);
        match node {
            Node::Element(el) => {
                let inline = el
                    .children
                    .iter()
                    .any(|n| matches!(n, Node::Text(_) | Node::Void(_)));
                let children = if inline {
                    let highlight = highlight.filter(|range| range.block == *path);
                    downcast_inline(&el.children, decorators, highlight)
                } else {
                    downcast_blocks(&el.children, path, decorators, highlight)
                };
                out.push(ViewNode::Element(block_element(&el.kind).children(children)));
            }
            Node::Void(void) => out.push(void_element(&void.kind, &void.attrs)),
            Node::Text(t) => out.push(ViewNode::Text(t.text.clone())),
        }
        path.pop();
    }
    out
}

fn block_element(kind: &str) -> ViewElement {
    match kind {
        "paragraph" => ViewElement::new("p"),
        "code_block" => ViewElement::new("pre"),
        other => ViewElement::new("div").attribute("data-kind", other),
    }
}

fn void_element(kind: &str, attrs: &Attrs) -> ViewNode {
    let el = match kind {
        "divider" => ViewElement::new("hr"),
        "image" => {
            let src = attrs.get("src").and_then(Value::as_str).unwrap_or_default();
            ViewElement::new("img").attribute("src", src)
        }
        other => ViewElement::new("span").attribute("data-kind", other),
    };
    ViewNode::Element(el)
}

/// Anchor id plus the indices of the decorators that are on.
fn anchor_key<'a>(node: &'a Node, decorators: &[DecoratorConfig]) -> Option<(&'a str, Vec<usize>)> {
    let id = anchor_id(node)?;
    let active = decorators
        .iter()
        .enumerate()
        .filter(|(_, d)| node.attr(&d.model_attribute()) == Some(&Value::Bool(true)))
        .map(|(ix, _)| ix)
        .collect();
    Some((id, active))
}

/// Consecutive inline nodes sharing one anchor key.
struct Run<'a> {
    key: Option<(&'a str, Vec<usize>)>,
    start: usize,
    end: usize,
    nodes: Vec<ViewNode>,
}

fn downcast_inline(
    children: &[Node],
    decorators: &[DecoratorConfig],
    highlight: Option<&InlineRange>,
) -> Vec<ViewNode> {
    let starts = child_starts(children);
    let mut out = Vec::new();
    let mut run: Option<Run<'_>> = None;

    for (node, start) in children.iter().zip(starts) {
        let len = inline_len(node);
        if len == 0 {
            continue;
        }
        let view = match node {
            Node::Text(t) => ViewNode::Text(t.text.clone()),
            Node::Void(v) => void_element(&v.kind, &v.attrs),
            Node::Element(_) => continue,
        };
        let key = anchor_key(node, decorators);

        let extends = run.as_ref().is_some_and(|open| open.key == key);
        if extends {
            if let Some(open) = run.as_mut() {
                open.end = start + len;
                open.nodes.push(view);
            }
        } else {
            flush_run(run.take(), decorators, highlight, &mut out);
            run = Some(Run {
                key,
                start,
                end: start + len,
                nodes: vec![view],
            });
        }
    }
    flush_run(run, decorators, highlight, &mut out);
    out
}

fn flush_run(
    run: Option<Run<'_>>,
    decorators: &[DecoratorConfig],
    highlight: Option<&InlineRange>,
    out: &mut Vec<ViewNode>,
) {
    let Some(run) = run else {
        return;
    };
    let Some((id, active)) = run.key else {
        out.extend(run.nodes);
        return;
    };

    let mut el = ViewElement::new("a").attribute("id", id);
    for decorator in active.iter().filter_map(|&ix| decorators.get(ix)) {
        for (name, value) in &decorator.attributes {
            if !RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                el = el.attribute(name.clone(), value.clone());
            }
        }
        for class in &decorator.classes {
            el = el.class(class.clone());
        }
    }
    if highlight.is_some_and(|range| range.start < run.end && run.start < range.end) {
        el = el.class(HIGHLIGHT_CLASS);
    }
    out.push(ViewNode::Element(el.children(run.nodes)));
}

/// Reads an `<a id>` / `<a name>` element back into model attributes.
///
/// A decorator is recognised when the element carries all of its attributes
/// and classes.
pub fn upcast_anchor(element: &ViewElement, decorators: &[DecoratorConfig]) -> Option<Attrs> {
    if element.name != "a" {
        return None;
    }
    let id = element
        .attributes
        .get("id")
        .or_else(|| element.attributes.get("name"))
        .filter(|id| !id.is_empty())?;

    let mut attrs = Attrs::new();
    attrs.insert(ANCHOR_ID_ATTR.to_string(), Value::String(id.clone()));
    for decorator in decorators {
        if decorator.attributes.is_empty() && decorator.classes.is_empty() {
            continue;
        }
        let attributes_match = decorator
            .attributes
            .iter()
            .all(|(name, value)| element.attributes.get(name) == Some(value));
        let classes_match = decorator.classes.iter().all(|c| element.has_class(c));
        if attributes_match && classes_match {
            attrs.insert(decorator.model_attribute(), Value::Bool(true));
        }
    }
    Some(attrs)
}

/// The span to highlight: the anchor at the start of the selection.
pub fn highlighted_range(editor: &Editor) -> Option<InlineRange> {
    let id = current_anchor_id(editor)?;
    let (start, _) = editor.selection().ordered();
    find_anchor_range(editor.doc(), &start, &id).filter(|range| !range.is_collapsed())
}

/// Highlighted span, recomputed explicitly after each change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorHighlight {
    range: Option<InlineRange>,
}

impl AnchorHighlight {
    pub fn range(&self) -> Option<&InlineRange> {
        self.range.as_ref()
    }

    /// Returns whether the highlighted span changed.
    pub fn refresh(&mut self, editor: &Editor) -> bool {
        let range = highlighted_range(editor);
        if range == self.range {
            return false;
        }
        log::trace!("anchor highlight {:?} -> {:?}", self.range, range);
        self.range = range;
        true
    }

    pub fn render(&self, editor: &Editor, decorators: &[DecoratorConfig]) -> Vec<ViewNode> {
        downcast_document(editor.doc(), decorators, self.range())
    }
}
