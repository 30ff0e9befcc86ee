use formshape_engine::{normalize, FormMode, NoCache, RoleHints};
use formshape_schema::{FieldValue, PropertyGroup, PropertyShape, SchemaNode};
use proptest::prelude::*;

fn field_name() -> impl Strategy<Value = String> {
    // Lowercase names avoid colliding with the special `id`/day-flag
    // defaulting rules only by accident; that is fine for shape checks.
    proptest::string::string_regex("[a-z][a-z0-9]{0,8}").unwrap()
}

fn shape() -> impl Strategy<Value = PropertyShape> {
    (
        field_name(),
        proptest::option::of(0u32..3),
        proptest::option::of(1u32..4),
    )
        .prop_map(|(name, min_count, max_count)| {
            let mut shape = PropertyShape::named(&name);
            shape.min_count = min_count;
            shape.max_count = max_count;
            shape
        })
}

fn node_list() -> impl Strategy<Value = Vec<SchemaNode>> {
    proptest::collection::vec(
        prop_oneof![
            shape().prop_map(|s| SchemaNode::Shape(Box::new(s))),
            (field_name(), proptest::collection::vec(shape(), 1..4)).prop_map(
                |(label, members)| {
                    let mut group = PropertyGroup::labelled(&label);
                    group.max_count = Some(1);
                    group.property = members;
                    SchemaNode::Group(group)
                }
            ),
        ],
        1..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Two normalization runs over byte-identical schema input agree on
    /// every resolved field id and every state key.
    #[test]
    fn field_ids_stable_across_runs(nodes in node_list()) {
        let first = normalize(&nodes, FormMode::Edit, &RoleHints::none(), &NoCache);
        let second = normalize(&nodes, FormMode::Edit, &RoleHints::none(), &NoCache);

        let ids = |form: &formshape_engine::NormalizedForm| -> Vec<String> {
            form.shapes().iter().map(|s| s.field_id().to_string()).collect()
        };
        prop_assert_eq!(ids(&first), ids(&second));
        prop_assert_eq!(first.state_keys(), second.state_keys());
    }

    /// A bare shape with `maxCount` absent or above one yields an
    /// array-typed state entry; otherwise a scalar-typed one.
    #[test]
    fn cardinality_decides_entry_shape(s in shape()) {
        let expect_rows = s.max_count.map_or(true, |n| n > 1);
        let nodes = vec![SchemaNode::Shape(Box::new(s.clone()))];
        let form = normalize(&nodes, FormMode::Edit, &RoleHints::none(), &NoCache);

        let entry = form.state.values().next().unwrap();
        match entry {
            FieldValue::Rows(_) => prop_assert!(expect_rows),
            _ => prop_assert!(!expect_rows),
        }
    }
}
