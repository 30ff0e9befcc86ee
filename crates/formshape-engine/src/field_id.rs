//! Field ID Resolver
//!
//! Derives canonical, collision-free field identifiers from group and
//! array context. Ids are a pure function of the schema input, so two
//! normalization runs over byte-identical templates agree on every id.
//!
//! Rules:
//! - non-array, groupless field: the field name itself
//! - non-array, grouped field: `"<group label> <name>"`
//! - array field (grouped or not): `"<group-or-field label> <name>"`;
//!   the array itself is keyed in state by the un-prefixed label, each
//!   row object by the prefixed id.

use formshape_schema::{PropertyGroup, PropertyShape};

/// Resolved id for one field, given its enclosing group label (if any).
pub fn resolve_field_id(shape: &PropertyShape, group_label: Option<&str>) -> String {
    if shape.is_array() {
        let prefix = group_label.unwrap_or(&shape.name);
        format!("{prefix} {}", shape.name)
    } else {
        match group_label {
            Some(label) => format!("{label} {}", shape.name),
            None => shape.name.clone(),
        }
    }
}

/// State key of the array entry itself: the un-prefixed label.
pub fn array_state_key(shape: &PropertyShape, group: Option<&PropertyGroup>) -> String {
    match group {
        Some(group) => group.label.clone(),
        None => shape.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(name: &str) -> PropertyShape {
        let mut shape = PropertyShape::named(name);
        shape.max_count = Some(1);
        shape
    }

    #[test]
    fn groupless_scalar_keeps_its_name() {
        assert_eq!(resolve_field_id(&scalar("name"), None), "name");
    }

    #[test]
    fn grouped_scalar_is_prefixed() {
        assert_eq!(
            resolve_field_id(&scalar("phone"), Some("contact")),
            "contact phone"
        );
    }

    #[test]
    fn array_field_prefixes_with_group_or_own_name() {
        let shape = PropertyShape::named("reading"); // no maxCount → array
        assert_eq!(resolve_field_id(&shape, None), "reading reading");
        assert_eq!(resolve_field_id(&shape, Some("sensor")), "sensor reading");
    }

    #[test]
    fn array_state_key_is_unprefixed() {
        let shape = PropertyShape::named("reading");
        assert_eq!(array_state_key(&shape, None), "reading");
        let group = PropertyGroup::labelled("sensor");
        assert_eq!(array_state_key(&shape, Some(&group)), "sensor");
    }
}
