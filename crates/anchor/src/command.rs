use std::collections::{BTreeMap, BTreeSet};

use plate_core::{
    AttrPatch, Attrs, Editor, InlineRange, Node, Op, Transaction, block_at,
    clamp_to_char_boundary, nodes_in_range, patch_ranges_ops, point_offset,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ANCHOR_ID_ATTR;
use crate::config::DecoratorConfig;
use crate::decorator::decorator_id;
use crate::range::find_anchor_range;

/// Arguments of `anchor.set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorArgs {
    pub id: String,
    /// Decorators left out are not touched.
    #[serde(default)]
    pub decorators: BTreeMap<String, bool>,
}

impl AnchorArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            decorators: BTreeMap::new(),
        }
    }

    pub fn decorator(mut self, id: impl Into<String>, on: bool) -> Self {
        self.decorators.insert(id.into(), on);
        self
    }
}

/// The anchor id carried by the selection, if any.
pub fn current_anchor_id(editor: &Editor) -> Option<String> {
    editor
        .selection_attrs()
        .get(ANCHOR_ID_ATTR)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// The span the caret sits in, when the selection is collapsed inside one.
pub fn caret_anchor_range(editor: &Editor) -> Option<InlineRange> {
    let selection = editor.selection();
    if !selection.is_collapsed() {
        return None;
    }
    let id = current_anchor_id(editor)?;
    find_anchor_range(editor.doc(), &selection.focus, &id).filter(|range| !range.is_collapsed())
}

/// Decorator flags resolved to model attributes. Unknown ids are skipped.
fn decorator_flags(
    decorators: &[DecoratorConfig],
    flags: &BTreeMap<String, bool>,
) -> Vec<(String, bool)> {
    flags
        .iter()
        .filter_map(|(id, &on)| {
            match decorators.iter().find(|decorator| decorator.id == *id) {
                Some(decorator) => Some((decorator.model_attribute(), on)),
                None => {
                    log::warn!("ignoring unknown anchor decorator {id:?}");
                    None
                }
            }
        })
        .collect()
}

fn anchor_patch(id: &str, flags: &[(String, bool)]) -> AttrPatch {
    flags.iter().fold(
        AttrPatch::default().set(ANCHOR_ID_ATTR, id),
        |patch, (attribute, on)| {
            if *on {
                patch.set(attribute.clone(), true)
            } else {
                patch.remove(attribute.clone())
            }
        },
    )
}

/// Builds the `anchor.set` change. `Ok(None)` means there is nothing to do.
pub fn set_anchor(
    editor: &Editor,
    decorators: &[DecoratorConfig],
    args: &AnchorArgs,
) -> Result<Option<Transaction>, String> {
    let flags = decorator_flags(decorators, &args.decorators);
    let patch = anchor_patch(&args.id, &flags);
    let selection = editor.selection();

    if !selection.is_collapsed() {
        let mut keys: Vec<&str> = vec![ANCHOR_ID_ATTR];
        keys.extend(
            flags
                .iter()
                .filter(|(_, on)| *on)
                .map(|(attribute, _)| attribute.as_str()),
        );
        let ranges = editor
            .registry()
            .valid_ranges(editor.doc(), &editor.selection_ranges(), &keys);
        if ranges.is_empty() {
            return Ok(None);
        }
        log::debug!("anchor {:?} over {} range(s)", args.id, ranges.len());
        let ops = patch_ranges_ops(editor.doc(), &ranges, &patch);
        return Ok(Some(Transaction::new(ops).source("command:anchor.set")));
    }

    if let Some(range) = caret_anchor_range(editor) {
        log::debug!("anchor {:?} over span {:?}", args.id, range.span());
        let ops = patch_ranges_ops(editor.doc(), std::slice::from_ref(&range), &patch);
        return Ok(Some(
            Transaction::new(ops)
                .select_range(range)
                .source("command:anchor.set"),
        ));
    }

    if args.id.is_empty() {
        return Ok(None);
    }

    let mut attrs = editor.selection_attrs();
    patch.apply_to(&mut attrs);
    insert_anchor_text(editor, &args.id, attrs).map(Some)
}

/// Inserts `id` as a new text leaf at the caret and selects it.
fn insert_anchor_text(
    editor: &Editor,
    id: &str,
    attrs: Attrs,
) -> Result<Transaction, String> {
    let focus = editor.selection().focus.clone();
    let (block_path, block) =
        block_at(editor.doc(), &focus).ok_or("Selection is not in a text block")?;
    let (&child_ix, _) = focus
        .path
        .split_last()
        .ok_or("Selection is not in a text node")?;
    let Some(Node::Text(leaf)) = block.children.get(child_ix) else {
        return Err("Selection is not in a text node".into());
    };

    let at = |ix: usize| {
        let mut path = block_path.to_vec();
        path.push(ix);
        path
    };
    let local = clamp_to_char_boundary(&leaf.text, focus.offset);
    let caret = point_offset(&block.children, child_ix, local);

    let mut ops = Vec::new();
    let insert_ix = if local == 0 {
        child_ix
    } else if local >= leaf.text.len() {
        child_ix + 1
    } else {
        ops.push(Op::SplitText {
            path: at(child_ix),
            offset: local,
            attrs: leaf.attrs.clone(),
        });
        child_ix + 1
    };
    ops.push(Op::InsertNode {
        path: at(insert_ix),
        node: Node::text_with_attrs(id, attrs),
    });

    log::debug!("insert anchor {id:?} at {caret} in block {block_path:?}");
    Ok(Transaction::new(ops)
        .select_range(InlineRange::new(block_path.to_vec(), caret, caret + id.len()))
        .source("command:anchor.set"))
}

/// Builds the `anchor.unset` change: removes the id and every decorator.
pub fn unset_anchor(
    editor: &Editor,
    decorators: &[DecoratorConfig],
) -> Result<Option<Transaction>, String> {
    let ranges = if editor.selection().is_collapsed() {
        match caret_anchor_range(editor) {
            Some(range) => vec![range],
            None => return Ok(None),
        }
    } else {
        editor.selection_ranges()
    };

    let mut keys: BTreeSet<String> = decorators
        .iter()
        .map(DecoratorConfig::model_attribute)
        .collect();
    // Decorators dropped from the configuration still leave their attributes behind.
    for range in &ranges {
        for node in nodes_in_range(editor.doc(), range) {
            keys.extend(
                node.attrs()
                    .keys()
                    .filter(|key| decorator_id(key).is_some())
                    .cloned(),
            );
        }
    }
    keys.remove(ANCHOR_ID_ATTR);

    let patch = keys
        .into_iter()
        .fold(AttrPatch::default().remove(ANCHOR_ID_ATTR), |patch, key| {
            patch.remove(key)
        });
    log::debug!("unanchor {} range(s)", ranges.len());
    let ops = patch_ranges_ops(editor.doc(), &ranges, &patch);
    Ok(Some(Transaction::new(ops).source("command:anchor.unset")))
}
