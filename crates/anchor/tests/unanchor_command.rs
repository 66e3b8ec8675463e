use plate_anchor::{
    ANCHOR_ID_ATTR, AnchorConfig, AnchorState, DecoratorConfig, UNANCHOR_COMMAND, anchor_registry,
};
use plate_core::{Document, Editor, Node, Point, Selection};
use pretty_assertions::assert_eq;
use serde_json::json;

fn config() -> AnchorConfig {
    AnchorConfig::with_decorators(vec![
        DecoratorConfig::new("isExternal", "Open in a new tab"),
        DecoratorConfig::new("download", "Download"),
    ])
    .unwrap()
}

fn editor(children: Vec<Node>, selection: Selection) -> Editor {
    let doc = Document {
        children: vec![Node::block("paragraph", children)],
    };
    Editor::new(doc, selection, anchor_registry(config()).unwrap())
}

fn paragraph(editor: &Editor) -> &[Node] {
    let Node::Element(paragraph) = &editor.doc().children[0] else {
        panic!("expected paragraph");
    };
    &paragraph.children
}

fn external(text: &str, id: &str, lang: &str) -> Node {
    Node::text(text)
        .with_attr(ANCHOR_ID_ATTR, id)
        .with_attr("anchorIsExternal", true)
        .with_attr("lang", lang)
}

#[test]
fn caret_unanchor_clears_the_whole_span_and_its_decorators() {
    let mut editor = editor(
        vec![external("aa", "x", "en"), external("bb", "x", "fr")],
        Selection::collapsed(Point::new(vec![0, 0], 1)),
    );
    assert!(editor.is_command_enabled(UNANCHOR_COMMAND));

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();

    for node in paragraph(&editor) {
        assert_eq!(node.attr(ANCHOR_ID_ATTR), None);
        assert_eq!(node.attr("anchorIsExternal"), None);
    }

    let state: AnchorState = editor.run_query("anchor.state", None).unwrap();
    assert_eq!(state.id, None);
    assert!(state.decorators.iter().all(|d| !d.value));
}

#[test]
fn caret_unanchor_leaves_other_spans_alone() {
    let mut editor = editor(
        vec![
            external("aa", "x", "en"),
            Node::text(" "),
            external("bb", "y", "en"),
        ],
        Selection::collapsed(Point::new(vec![0, 2], 1)),
    );

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();

    let ids: Vec<_> = paragraph(&editor)
        .iter()
        .map(|n| n.attr(ANCHOR_ID_ATTR).cloned())
        .collect();
    assert_eq!(ids, vec![Some(json!("x")), None, None]);
}

#[test]
fn range_unanchor_only_touches_the_selected_part() {
    let mut editor = editor(
        vec![Node::text("abcdef").with_attr(ANCHOR_ID_ATTR, "x")],
        Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 3)),
    );

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();

    assert_eq!(
        paragraph(&editor).to_vec(),
        vec![
            Node::text("abc"),
            Node::text("def").with_attr(ANCHOR_ID_ATTR, "x"),
        ]
    );
}

#[test]
fn range_unanchor_ignores_the_schema() {
    let doc = Document {
        children: vec![Node::block(
            "code_block",
            vec![Node::text("stale").with_attr(ANCHOR_ID_ATTR, "x")],
        )],
    };
    let mut editor = Editor::new(
        doc,
        Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 5)),
        anchor_registry(config()).unwrap(),
    );

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();

    let Node::Element(block) = &editor.doc().children[0] else {
        panic!("expected code block");
    };
    assert_eq!(block.children, vec![Node::text("stale")]);
}

#[test]
fn unanchor_is_disabled_without_an_anchor() {
    let mut editor = editor(
        vec![Node::text("plain")],
        Selection::collapsed(Point::new(vec![0, 0], 2)),
    );
    assert!(!editor.is_command_enabled(UNANCHOR_COMMAND));
    assert!(editor.run_command(UNANCHOR_COMMAND, None).is_err());
}

#[test]
fn unanchor_is_a_single_undo_step() {
    let children = vec![external("aa", "x", "en"), external("bb", "x", "fr")];
    let mut editor = editor(
        children.clone(),
        Selection::collapsed(Point::new(vec![0, 1], 1)),
    );

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();
    assert!(editor.undo());
    assert_eq!(paragraph(&editor).to_vec(), children);
    assert!(!editor.can_undo());
}

#[test]
fn unanchor_clears_decorators_stored_as_false() {
    let mut editor = editor(
        vec![
            Node::text("aa")
                .with_attr(ANCHOR_ID_ATTR, "x")
                .with_attr("anchorDownload", false),
        ],
        Selection::collapsed(Point::new(vec![0, 0], 1)),
    );

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();

    assert_eq!(paragraph(&editor).to_vec(), vec![Node::text("aa")]);
    let state: AnchorState = editor.run_query("anchor.state", None).unwrap();
    assert_eq!(state.id, None);
    let download = state.decorators.iter().find(|d| d.id == "download").unwrap();
    assert!(!download.value);
}

#[test]
fn unanchor_clears_decorators_no_longer_configured() {
    let children = vec![
        Node::text("aa")
            .with_attr(ANCHOR_ID_ATTR, "x")
            .with_attr("anchorNofollow", true),
    ];
    let mut editor = editor(children.clone(), Selection::collapsed(Point::new(vec![0, 0], 1)));

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();
    assert_eq!(paragraph(&editor).to_vec(), vec![Node::text("aa")]);

    assert!(editor.undo());
    assert_eq!(paragraph(&editor).to_vec(), children);
}

#[test]
fn selection_across_a_leaf_boundary_acts_as_a_caret() {
    let mut editor = editor(
        vec![external("aa", "x", "en"), external("bb", "x", "fr")],
        Selection::new(Point::new(vec![0, 0], 2), Point::new(vec![0, 1], 0)),
    );
    assert!(editor.selection().is_collapsed());
    assert!(editor.is_command_enabled("anchor.set"));
    assert!(editor.is_command_enabled(UNANCHOR_COMMAND));

    editor.run_command(UNANCHOR_COMMAND, None).unwrap();

    for node in paragraph(&editor) {
        assert_eq!(node.attr(ANCHOR_ID_ATTR), None);
    }
}
