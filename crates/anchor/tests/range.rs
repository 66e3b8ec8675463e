use plate_anchor::{ANCHOR_ID_ATTR, find_anchor_range};
use plate_core::{Document, InlineRange, Node, Point};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn anchored(node: Node, id: &str) -> Node {
    node.with_attr(ANCHOR_ID_ATTR, id)
}

/// `pre` [0,3) · span x [3,8) over text, image, text · `post` y [8,12).
fn doc() -> Document {
    Document {
        children: vec![Node::block(
            "paragraph",
            vec![
                Node::text("pre"),
                anchored(Node::text("ab").with_attr("anchorBold", true), "x"),
                anchored(Node::image("x.png"), "x"),
                anchored(Node::text("cd"), "x"),
                anchored(Node::text("post"), "y"),
            ],
        )],
    }
}

#[rstest]
#[case(vec![0, 1], 0)]
#[case(vec![0, 1], 1)]
#[case(vec![0, 1], 2)]
#[case(vec![0, 2], 0)]
#[case(vec![0, 2], 1)]
#[case(vec![0, 3], 0)]
#[case(vec![0, 3], 1)]
#[case(vec![0, 3], 2)]
fn every_position_in_a_span_resolves_the_whole_span(
    #[case] path: Vec<usize>,
    #[case] offset: usize,
) {
    let range = find_anchor_range(&doc(), &Point::new(path, offset), "x");
    assert_eq!(range, Some(InlineRange::new(vec![0], 3, 8)));
}

#[test]
fn mixed_node_types_do_not_stop_the_walk() {
    let range = find_anchor_range(&doc(), &Point::new(vec![0, 2], 0), "x").unwrap();
    assert_eq!(range.len(), 5);
}

#[test]
fn missing_neighbour_collapses_that_side_to_the_position() {
    // Caret at the start of `post`: the span lies entirely behind it.
    let range = find_anchor_range(&doc(), &Point::new(vec![0, 4], 0), "x");
    assert_eq!(range, Some(InlineRange::new(vec![0], 3, 8)));

    let range = find_anchor_range(&doc(), &Point::new(vec![0, 4], 2), "y");
    assert_eq!(range, Some(InlineRange::new(vec![0], 8, 12)));
}

#[test]
fn value_absent_at_position_yields_empty_range() {
    let range = find_anchor_range(&doc(), &Point::new(vec![0, 0], 1), "x");
    assert_eq!(range, Some(InlineRange::collapsed(vec![0], 1)));
}

#[test]
fn walk_stops_at_sequence_boundaries() {
    let doc = Document {
        children: vec![Node::block(
            "paragraph",
            vec![anchored(Node::text("only"), "z")],
        )],
    };
    let range = find_anchor_range(&doc, &Point::new(vec![0, 0], 2), "z");
    assert_eq!(range, Some(InlineRange::new(vec![0], 0, 4)));
}

#[test]
fn positions_outside_a_block_resolve_to_nothing() {
    assert_eq!(find_anchor_range(&doc(), &Point::new(vec![3, 0], 0), "x"), None);
    assert_eq!(find_anchor_range(&doc(), &Point::new(vec![0, 9], 0), "x"), None);
    assert_eq!(find_anchor_range(&doc(), &Point::new(vec![], 0), "x"), None);
}
