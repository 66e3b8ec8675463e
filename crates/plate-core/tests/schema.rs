use plate_core::{
    AttributeCheck, AttributeContext, AttributeSpec, Document, InlineRange, Node, PlatePlugin,
    PluginRegistry, Point, RegistryError,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

struct HighlightPlugin;

impl PlatePlugin for HighlightPlugin {
    fn id(&self) -> &'static str {
        "test.highlight"
    }

    fn attribute_specs(&self) -> Vec<AttributeSpec> {
        vec![
            AttributeSpec::text("highlight").on_voids(["image"]),
            AttributeSpec::text("bold"),
        ]
    }

    fn attribute_checks(&self) -> Vec<Box<dyn AttributeCheck>> {
        vec![Box::new(NoBoldOnLocked)]
    }
}

/// Text leaves marked `locked` refuse `bold`.
struct NoBoldOnLocked;

impl AttributeCheck for NoBoldOnLocked {
    fn id(&self) -> &'static str {
        "test.no_bold_on_locked"
    }

    fn allows(&self, ctx: &AttributeContext<'_>, key: &str) -> bool {
        key != "bold" || ctx.node.attr("locked").is_none()
    }
}

fn registry() -> PluginRegistry {
    PluginRegistry::with_core([Box::new(HighlightPlugin) as Box<dyn PlatePlugin>]).unwrap()
}

fn doc() -> Document {
    Document {
        children: vec![
            Node::block(
                "paragraph",
                vec![
                    Node::text("ab"),
                    Node::text("cd").with_attr("locked", true),
                    Node::image("x.png"),
                    Node::text("ef"),
                ],
            ),
            Node::block("code_block", vec![Node::text("fn main() {}")]),
        ],
    }
}

#[rstest]
#[case(vec![0, 0], "highlight", true)]
#[case(vec![0, 1], "bold", false)]
#[case(vec![0, 1], "highlight", true)]
#[case(vec![0, 2], "highlight", true)]
#[case(vec![0, 2], "bold", false)]
#[case(vec![1, 0], "highlight", false)]
#[case(vec![0, 0], "unregistered", false)]
fn allows_attribute_at_point(#[case] path: Vec<usize>, #[case] key: &str, #[case] expected: bool) {
    let registry = registry();
    assert_eq!(
        registry.allows_attribute_at(&doc(), &Point::new(path, 0), key),
        expected
    );
}

#[test]
fn valid_ranges_split_around_disallowed_nodes() {
    let registry = registry();
    let ranges = [InlineRange::new(vec![0], 1, 7)];

    assert_eq!(
        registry.valid_ranges(&doc(), &ranges, &["bold"]),
        vec![InlineRange::new(vec![0], 1, 2), InlineRange::new(vec![0], 5, 7)]
    );
    assert_eq!(
        registry.valid_ranges(&doc(), &ranges, &["highlight"]),
        vec![InlineRange::new(vec![0], 1, 7)]
    );
}

#[test]
fn valid_ranges_drop_blocks_without_inline_attributes() {
    let registry = registry();
    let ranges = [
        InlineRange::new(vec![0], 0, 2),
        InlineRange::new(vec![1], 0, 4),
    ];

    assert_eq!(
        registry.valid_ranges(&doc(), &ranges, &["highlight"]),
        vec![InlineRange::new(vec![0], 0, 2)]
    );
}

#[test]
fn duplicate_attribute_specs_are_rejected() {
    let err = PluginRegistry::with_core([
        Box::new(HighlightPlugin) as Box<dyn PlatePlugin>,
        Box::new(HighlightPlugin),
    ])
    .err();

    assert_eq!(
        err,
        Some(RegistryError::DuplicateAttribute("highlight".to_string()))
    );
}
