use formshape_schema::{local_identifier, parse_template, Datatype, SchemaNode};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The trailing segment never contains a separator and is always a
    /// suffix of its input.
    #[test]
    fn local_identifier_is_a_separator_free_suffix(iri in ".{0,64}") {
        let local = local_identifier(&iri);
        prop_assert!(!local.contains('/'));
        prop_assert!(!local.contains('#'));
        prop_assert!(iri.ends_with(local));
    }

    /// Datatype parsing is total: any string maps to some datatype.
    #[test]
    fn datatype_parse_never_fails(raw in ".{0,32}") {
        let _ = Datatype::parse(&raw);
    }

    /// Named shapes survive the reader in declaration order, whatever the
    /// names look like.
    #[test]
    fn shape_names_survive_in_order(
        names in proptest::collection::vec("[a-z][a-z0-9 ]{0,12}", 1..8)
    ) {
        let properties: Vec<_> = names
            .iter()
            .map(|name| json!({"name": name, "maxCount": 1}))
            .collect();
        let doc = json!({"property": properties});

        let template = parse_template(&doc).unwrap();
        let parsed: Vec<&str> = template
            .properties
            .iter()
            .map(|node| match node {
                SchemaNode::Shape(shape) => shape.name.as_str(),
                SchemaNode::Group(group) => group.label.as_str(),
            })
            .collect();
        prop_assert_eq!(parsed, names.iter().map(|n| n.as_str()).collect::<Vec<_>>());
    }
}
