//! JSON-LD Template Reader
//!
//! Reads the SHACL-like template documents returned by the backend template
//! service. The wire format is deliberately loose, so the reader is
//! tolerant: it accepts prefixed (`sh:name`) or bare (`name`) keys,
//! `{"@value": ...}` literal wrappers, and single values where arrays are
//! allowed. Malformed nodes are skipped with a warning rather than failing
//! the whole template.

use crate::shapes::{
    ClassKind, Datatype, NodeShape, PropertyGroup, PropertyShape, SchemaDefault, SchemaNode,
    TemplateDocument,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("template document is not a JSON object")]
    NotAnObject,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a raw template document into shapes and branches.
pub fn parse_template(doc: &Value) -> Result<TemplateDocument, SchemaError> {
    let obj = doc.as_object().ok_or(SchemaError::NotAnObject)?;

    let mut context = BTreeMap::new();
    if let Some(Value::Object(ctx)) = lookup(obj, &["@context", "context"]) {
        for (prefix, expansion) in ctx {
            if let Some(iri) = expansion.as_str() {
                context.insert(prefix.clone(), iri.to_string());
            }
        }
    }

    let node_shapes = lookup(obj, &["node_shapes", "nodeShapes", "node"])
        .map(as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(|v| parse_node_shape(v))
        .collect();

    let properties = lookup(obj, &["properties", "property"])
        .map(as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(|v| parse_schema_node(v))
        .collect();

    Ok(TemplateDocument {
        context,
        node_shapes,
        properties,
    })
}

/// Parse one property-list entry; `None` for unusable nodes.
pub fn parse_schema_node(value: &Value) -> Option<SchemaNode> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            warn!("skipping non-object property entry");
            return None;
        }
    };
    if is_group(obj) {
        parse_group(obj).map(SchemaNode::Group)
    } else {
        parse_shape(obj).map(|s| SchemaNode::Shape(Box::new(s)))
    }
}

fn parse_node_shape(value: &Value) -> Option<NodeShape> {
    let obj = value.as_object()?;
    let label = lookup_str(obj, &["label", "name"])?;
    let property = lookup(obj, &["property", "properties"])
        .map(as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(|v| parse_schema_node(v))
        .collect();
    Some(NodeShape {
        label,
        description: lookup_str(obj, &["description", "comment"]),
        property,
    })
}

fn parse_group(obj: &Map<String, Value>) -> Option<PropertyGroup> {
    let label = match lookup_str(obj, &["label", "name"]) {
        Some(label) => label,
        None => {
            warn!("skipping property group without a label");
            return None;
        }
    };
    // Groups hold shapes only; a nested group is schema inconsistency.
    let property = lookup(obj, &["property", "properties"])
        .map(as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(|v| {
            let member = v.as_object()?;
            if is_group(member) {
                warn!(group = %label, "skipping nested property group");
                return None;
            }
            parse_shape(member)
        })
        .collect();
    Some(PropertyGroup {
        id: lookup_str(obj, &["@id", "id"]).unwrap_or_default(),
        label,
        description: lookup_str(obj, &["description", "comment"]),
        order: lookup_str(obj, &["order"]).and_then(|s| s.parse().ok()),
        min_count: lookup_count(obj, &["minCount", "min_count"]),
        max_count: lookup_count(obj, &["maxCount", "max_count"]),
        property,
    })
}

fn parse_shape(obj: &Map<String, Value>) -> Option<PropertyShape> {
    let name = match lookup_str(obj, &["name"]) {
        Some(name) => name,
        None => {
            warn!("skipping property shape without a name");
            return None;
        }
    };
    Some(PropertyShape {
        id: lookup_str(obj, &["@id", "id"]).unwrap_or_default(),
        name,
        description: lookup_str(obj, &["description", "comment"]),
        order: lookup_str(obj, &["order"]).and_then(|s| s.parse().ok()),
        min_count: lookup_count(obj, &["minCount", "min_count"]),
        max_count: lookup_count(obj, &["maxCount", "max_count"]),
        datatype: lookup_str(obj, &["datatype"]).map(|s| Datatype::parse(&s)),
        class_kind: lookup_str(obj, &["class"]).and_then(|s| ClassKind::parse(&s)),
        in_class: lookup_str(obj, &["in"]),
        dependent_on: lookup_str(obj, &["dependentOn", "dependent_on"]),
        min_inclusive: lookup_f64(obj, &["minInclusive", "min_inclusive"]),
        min_exclusive: lookup_f64(obj, &["minExclusive", "min_exclusive"]),
        max_inclusive: lookup_f64(obj, &["maxInclusive", "max_inclusive"]),
        max_exclusive: lookup_f64(obj, &["maxExclusive", "max_exclusive"]),
        min_length: lookup_count(obj, &["minLength", "min_length"]),
        max_length: lookup_count(obj, &["maxLength", "max_length"]),
        pattern: lookup_str(obj, &["pattern"]),
        default_value: lookup(obj, &["defaultValue", "default_value"]).and_then(parse_default),
        field_id: None,
    })
}

fn parse_default(value: &Value) -> Option<SchemaDefault> {
    match value {
        Value::Array(items) => Some(SchemaDefault::List(
            items.iter().filter_map(literal_str).collect(),
        )),
        other => literal_str(other).map(SchemaDefault::Single),
    }
}

// ============================================================================
// Lookup helpers
// ============================================================================

/// A node is a group when it carries a member property list (and is not
/// itself a field, which never has one), or is explicitly typed as one.
fn is_group(obj: &Map<String, Value>) -> bool {
    if let Some(type_value) = lookup(obj, &["@type", "type"]).and_then(literal_str) {
        if type_value.contains("PropertyGroup") {
            return true;
        }
        if type_value.contains("PropertyShape") {
            return false;
        }
    }
    lookup(obj, &["property", "properties"]).is_some()
}

/// Find a value under any of the alias keys, matching the bare key or any
/// prefixed form (`sh:name` for alias `name`).
fn lookup<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    for alias in aliases {
        if let Some(v) = obj.get(*alias) {
            return Some(v);
        }
    }
    for (key, v) in obj {
        if let Some((_, local)) = key.split_once(':') {
            if aliases.contains(&local) {
                return Some(v);
            }
        }
    }
    None
}

fn lookup_str(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    lookup(obj, aliases).and_then(literal_str)
}

fn lookup_f64(obj: &Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    lookup_str(obj, aliases).and_then(|s| s.parse().ok())
}

fn lookup_count(obj: &Map<String, Value>, aliases: &[&str]) -> Option<u32> {
    lookup_str(obj, aliases).and_then(|s| s.parse().ok())
}

/// Unwrap a literal: plain scalars, `{"@value": ...}` / `{"@id": ...}`
/// wrappers, and single-element arrays.
fn literal_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => obj
            .get("@value")
            .or_else(|| obj.get("@id"))
            .or_else(|| obj.get("value"))
            .and_then(literal_str),
        Value::Array(items) => items.first().and_then(literal_str),
        Value::Null => None,
    }
}

fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}
