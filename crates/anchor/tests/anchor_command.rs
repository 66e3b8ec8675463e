use plate_anchor::{
    ANCHOR_COMMAND, ANCHOR_ID_ATTR, AnchorConfig, AnchorPlugin, DecoratorConfig, anchor_registry,
    find_anchor_range,
};
use plate_core::{
    AttributeCheck, AttributeContext, Document, Editor, InlineRange, Node, PlatePlugin,
    PluginRegistry, Point, Selection,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn config() -> AnchorConfig {
    AnchorConfig::with_decorators(vec![
        DecoratorConfig::new("isExternal", "Open in a new tab"),
        DecoratorConfig::new("bold", "Bold"),
    ])
    .unwrap()
}

fn editor_with(registry: PluginRegistry, children: Vec<Node>, selection: Selection) -> Editor {
    let doc = Document {
        children: vec![Node::block("paragraph", children)],
    };
    Editor::new(doc, selection, registry)
}

fn editor(children: Vec<Node>, selection: Selection) -> Editor {
    editor_with(anchor_registry(config()).unwrap(), children, selection)
}

fn anchored(text: &str, id: &str) -> Node {
    Node::text(text).with_attr(ANCHOR_ID_ATTR, id)
}

/// `[A(id=x), B(id=x), C(id=x)]`, kept apart by an unrelated attribute.
fn abc() -> Vec<Node> {
    vec![
        anchored("aa", "x").with_attr("lang", "en"),
        anchored("bb", "x").with_attr("lang", "fr"),
        anchored("cc", "x").with_attr("lang", "de"),
    ]
}

fn leaves(editor: &Editor) -> Vec<(String, Option<Value>)> {
    let Node::Element(paragraph) = &editor.doc().children[0] else {
        panic!("expected paragraph");
    };
    paragraph
        .children
        .iter()
        .map(|node| match node {
            Node::Text(t) => (t.text.clone(), node.attr(ANCHOR_ID_ATTR).cloned()),
            Node::Void(v) => (v.kind.clone(), node.attr(ANCHOR_ID_ATTR).cloned()),
            Node::Element(el) => (el.kind.clone(), None),
        })
        .collect()
}

fn leaf(editor: &Editor, ix: usize) -> &Node {
    let Node::Element(paragraph) = &editor.doc().children[0] else {
        panic!("expected paragraph");
    };
    &paragraph.children[ix]
}

/// Refuses `anchorBold` on German text.
struct NoBoldOnGerman;

impl AttributeCheck for NoBoldOnGerman {
    fn id(&self) -> &'static str {
        "test.no_bold_on_german"
    }

    fn allows(&self, ctx: &AttributeContext<'_>, key: &str) -> bool {
        key != "anchorBold" || ctx.node.attr("lang") != Some(&json!("de"))
    }
}

struct GermanRules;

impl PlatePlugin for GermanRules {
    fn id(&self) -> &'static str {
        "test.german_rules"
    }

    fn attribute_checks(&self) -> Vec<Box<dyn AttributeCheck>> {
        vec![Box::new(NoBoldOnGerman)]
    }
}

#[test]
fn caret_in_span_renames_the_whole_span() {
    let mut editor = editor(abc(), Selection::collapsed(Point::new(vec![0, 1], 1)));

    editor
        .run_command(ANCHOR_COMMAND, Some(json!({ "id": "y", "decorators": {} })))
        .unwrap();

    assert_eq!(
        leaves(&editor),
        vec![
            ("aa".to_string(), Some(json!("y"))),
            ("bb".to_string(), Some(json!("y"))),
            ("cc".to_string(), Some(json!("y"))),
        ]
    );
    assert_eq!(
        editor.selection(),
        &Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 2], 2))
    );

    let again = find_anchor_range(editor.doc(), &editor.selection().focus, "y");
    assert_eq!(again, Some(InlineRange::new(vec![0], 0, 6)));
}

#[test]
fn range_selection_skips_nodes_that_refuse_a_decorator() {
    let registry = PluginRegistry::with_core([
        Box::new(AnchorPlugin::new(config())) as Box<dyn PlatePlugin>,
        Box::new(GermanRules),
    ])
    .unwrap();
    let selection = Selection::new(Point::new(vec![0, 1], 0), Point::new(vec![0, 2], 2));
    let mut editor = editor_with(registry, abc(), selection.clone());

    editor
        .run_command(
            ANCHOR_COMMAND,
            Some(json!({ "id": "z", "decorators": { "bold": true } })),
        )
        .unwrap();

    assert_eq!(
        leaves(&editor),
        vec![
            ("aa".to_string(), Some(json!("x"))),
            ("bb".to_string(), Some(json!("z"))),
            ("cc".to_string(), Some(json!("x"))),
        ]
    );
    assert_eq!(leaf(&editor, 1).attr("anchorBold"), Some(&json!(true)));
    assert_eq!(leaf(&editor, 2).attr("anchorBold"), None);
    assert_eq!(editor.selection(), &selection);
}

#[test]
fn range_selection_splits_partially_covered_leaves() {
    let selection = Selection::new(Point::new(vec![0, 0], 2), Point::new(vec![0, 0], 7));
    let mut editor = editor(vec![Node::text("see the intro")], selection);

    editor
        .run_command(ANCHOR_COMMAND, Some(json!({ "id": "intro" })))
        .unwrap();

    assert_eq!(
        leaves(&editor),
        vec![
            ("se".to_string(), None),
            ("e the".to_string(), Some(json!("intro"))),
            (" intro".to_string(), None),
        ]
    );
    assert_eq!(
        editor.selection_ranges(),
        vec![InlineRange::new(vec![0], 2, 7)]
    );
}

#[test]
fn caret_outside_span_inserts_and_selects_the_identifier() {
    let mut editor = editor(
        vec![Node::text("hello world")],
        Selection::collapsed(Point::new(vec![0, 0], 5)),
    );

    editor
        .run_command(
            ANCHOR_COMMAND,
            Some(json!({ "id": "intro", "decorators": { "isExternal": true } })),
        )
        .unwrap();

    assert_eq!(
        leaves(&editor),
        vec![
            ("hello".to_string(), None),
            ("intro".to_string(), Some(json!("intro"))),
            (" world".to_string(), None),
        ]
    );
    assert_eq!(leaf(&editor, 1).attr("anchorIsExternal"), Some(&json!(true)));
    assert_eq!(
        editor.selection(),
        &Selection::new(Point::new(vec![0, 1], 0), Point::new(vec![0, 1], 5))
    );

    assert!(editor.undo());
    assert_eq!(leaves(&editor), vec![("hello world".to_string(), None)]);
}

#[test]
fn insertion_into_an_empty_paragraph_leaves_a_single_leaf() {
    let mut editor = editor(
        vec![Node::text("")],
        Selection::collapsed(Point::new(vec![0, 0], 0)),
    );

    editor
        .run_command(ANCHOR_COMMAND, Some(json!({ "id": "a1" })))
        .unwrap();

    assert_eq!(leaves(&editor), vec![("a1".to_string(), Some(json!("a1")))]);
    assert_eq!(
        editor.selection(),
        &Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 2))
    );
}

#[test]
fn empty_identifier_outside_a_span_changes_nothing() {
    let mut editor = editor(
        vec![Node::text("plain")],
        Selection::collapsed(Point::new(vec![0, 0], 3)),
    );
    let doc_before = editor.doc().clone();

    editor
        .run_command(ANCHOR_COMMAND, Some(json!({ "id": "" })))
        .unwrap();

    assert_eq!(editor.doc(), &doc_before);
    assert!(!editor.can_undo());
}

#[test]
fn false_decorator_removes_the_attribute() {
    let mut editor = editor(
        vec![anchored("aa", "x").with_attr("anchorIsExternal", true)],
        Selection::collapsed(Point::new(vec![0, 0], 1)),
    );

    editor
        .run_command(
            ANCHOR_COMMAND,
            Some(json!({ "id": "x", "decorators": { "isExternal": false } })),
        )
        .unwrap();

    assert_eq!(leaf(&editor, 0).attr("anchorIsExternal"), None);
    assert_eq!(leaf(&editor, 0).attr(ANCHOR_ID_ATTR), Some(&json!("x")));
}

#[test]
fn absent_decorators_are_left_alone() {
    let mut editor = editor(
        vec![anchored("aa", "x").with_attr("anchorIsExternal", true)],
        Selection::collapsed(Point::new(vec![0, 0], 1)),
    );

    editor
        .run_command(
            ANCHOR_COMMAND,
            Some(json!({ "id": "y", "decorators": { "bold": true, "unknown": true } })),
        )
        .unwrap();

    let node = leaf(&editor, 0);
    assert_eq!(node.attr("anchorIsExternal"), Some(&json!(true)));
    assert_eq!(node.attr("anchorBold"), Some(&json!(true)));
    assert_eq!(node.attr("unknown"), None);
}

#[test]
fn anchors_are_disabled_where_the_schema_refuses_them() {
    let doc = Document {
        children: vec![Node::block("code_block", vec![Node::text("let x = 1;")])],
    };
    let mut editor = Editor::new(
        doc,
        Selection::collapsed(Point::new(vec![0, 0], 2)),
        anchor_registry(config()).unwrap(),
    );

    assert!(!editor.is_command_enabled(ANCHOR_COMMAND));
    assert!(
        editor
            .run_command(ANCHOR_COMMAND, Some(json!({ "id": "x" })))
            .is_err()
    );
}

#[test]
fn missing_args_are_rejected() {
    let mut editor = editor(
        vec![Node::text("plain")],
        Selection::collapsed(Point::new(vec![0, 0], 0)),
    );
    let err = editor.run_command(ANCHOR_COMMAND, None).unwrap_err();
    assert_eq!(err.message(), "Missing args");
}
