//! Schema Primitive Types
//!
//! The SHACL-like entity model a registry template is made of. A template
//! document carries alternative `NodeShape` branches and/or a flat list of
//! `PropertyShape`/`PropertyGroup` nodes; normalization (in
//! `formshape-engine`) turns those into addressable form fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Datatypes and field kinds
// ============================================================================

/// XSD-style datatype of a field's literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl Datatype {
    /// Parse a datatype IRI or bare name. Accepts `xsd:`-prefixed forms and
    /// full IRIs; anything unrecognized falls back to `String`.
    pub fn parse(raw: &str) -> Self {
        let local = raw.rsplit(&['/', '#', ':'][..]).next().unwrap_or(raw);
        match local.to_ascii_lowercase().as_str() {
            "integer" | "int" | "long" => Datatype::Integer,
            "decimal" | "double" | "float" => Datatype::Decimal,
            "boolean" => Datatype::Boolean,
            "date" => Datatype::Date,
            "time" => Datatype::Time,
            "datetime" => Datatype::DateTime,
            _ => Datatype::String,
        }
    }
}

/// Special field kinds marked via `sh:class` on a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Schedule,
    Geolocation,
    TimeSeriesPeriod,
}

impl ClassKind {
    pub fn parse(raw: &str) -> Option<Self> {
        let local = raw.rsplit(&['/', '#', ':'][..]).next().unwrap_or(raw);
        let folded: String = local
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "schedule" => Some(ClassKind::Schedule),
            "geolocation" | "location" => Some(ClassKind::Geolocation),
            "timeseriesperiod" => Some(ClassKind::TimeSeriesPeriod),
            _ => None,
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Schema-provided default: a single scalar or a list of scalars (one per
/// pre-populated row of an array field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaDefault {
    Single(String),
    List(Vec<String>),
}

impl SchemaDefault {
    /// First scalar, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            SchemaDefault::Single(s) => Some(s.as_str()),
            SchemaDefault::List(v) => v.first().map(|s| s.as_str()),
        }
    }

    /// All scalars, in declaration order.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            SchemaDefault::Single(s) => vec![s.as_str()],
            SchemaDefault::List(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

// ============================================================================
// Shapes
// ============================================================================

/// One form field as described by the schema.
///
/// `field_id` is absent until normalization assigns it; after normalization
/// it is unique within the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyShape {
    /// Stable schema identifier (`@id`).
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    pub datatype: Option<Datatype>,
    pub class_kind: Option<ClassKind>,
    /// Class URI whose concept subclasses enumerate this field's options.
    pub in_class: Option<String>,
    /// Raw schema-id reference to the sibling that gates this field's
    /// options. Rewritten to the sibling's resolved field id during
    /// normalization.
    pub dependent_on: Option<String>,
    pub min_inclusive: Option<f64>,
    pub min_exclusive: Option<f64>,
    pub max_inclusive: Option<f64>,
    pub max_exclusive: Option<f64>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
    pub default_value: Option<SchemaDefault>,
    pub field_id: Option<String>,
}

impl PropertyShape {
    pub fn named(name: &str) -> Self {
        PropertyShape {
            id: format!("https://example.org/shape/{name}"),
            name: name.to_string(),
            ..PropertyShape::default()
        }
    }

    /// A field repeats as row data when `maxCount` is absent or above one.
    pub fn is_array(&self) -> bool {
        match self.max_count {
            None => true,
            Some(n) => n > 1,
        }
    }

    /// The resolved field id; panics if called before normalization.
    /// Normalized shape lists always carry ids, so consumers of a
    /// `NormalizedForm` may rely on this.
    pub fn field_id(&self) -> &str {
        self.field_id
            .as_deref()
            .expect("field_id is assigned during normalization")
    }
}

/// A named cluster of shapes with its own cardinality. When the group's
/// cardinality allows repetition the whole group renders as a row array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyGroup {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    /// Member fields only; groups do not nest.
    pub property: Vec<PropertyShape>,
}

impl PropertyGroup {
    pub fn labelled(label: &str) -> Self {
        PropertyGroup {
            id: format!("https://example.org/group/{label}"),
            label: label.to_string(),
            ..PropertyGroup::default()
        }
    }

    pub fn is_array(&self) -> bool {
        match self.max_count {
            None => true,
            Some(n) => n > 1,
        }
    }
}

/// One entry of a template's property list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    Shape(Box<PropertyShape>),
    Group(PropertyGroup),
}

impl SchemaNode {
    pub fn order(&self) -> i64 {
        match self {
            SchemaNode::Shape(s) => s.order.unwrap_or(i64::MAX),
            SchemaNode::Group(g) => g.order.unwrap_or(i64::MAX),
        }
    }
}

/// One alternative branch schema for an entity. Exactly one node shape is
/// active per form instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeShape {
    pub label: String,
    pub description: Option<String>,
    pub property: Vec<SchemaNode>,
}

/// The raw template document as returned by the template service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    /// Prefix → IRI expansions from `@context`.
    pub context: BTreeMap<String, String>,
    /// Alternative branches, possibly empty.
    pub node_shapes: Vec<NodeShape>,
    /// Branch-independent properties.
    pub properties: Vec<SchemaNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datatype_parsing_accepts_prefixed_and_bare_names() {
        assert_eq!(Datatype::parse("xsd:integer"), Datatype::Integer);
        assert_eq!(
            Datatype::parse("http://www.w3.org/2001/XMLSchema#dateTime"),
            Datatype::DateTime
        );
        assert_eq!(Datatype::parse("decimal"), Datatype::Decimal);
        assert_eq!(Datatype::parse("somethingElse"), Datatype::String);
    }

    #[test]
    fn class_kind_matches_local_names() {
        assert_eq!(
            ClassKind::parse("https://example.org/kb/Schedule"),
            Some(ClassKind::Schedule)
        );
        assert_eq!(
            ClassKind::parse("base:TimeSeriesPeriod"),
            Some(ClassKind::TimeSeriesPeriod)
        );
        assert_eq!(ClassKind::parse("https://example.org/kb/Person"), None);
    }

    #[test]
    fn array_detection_follows_max_count() {
        let mut shape = PropertyShape::named("contact");
        assert!(shape.is_array());
        shape.max_count = Some(1);
        assert!(!shape.is_array());
        shape.max_count = Some(3);
        assert!(shape.is_array());
    }

    #[test]
    fn default_entries_flatten_single_and_list() {
        let one = SchemaDefault::Single("a".into());
        assert_eq!(one.entries(), vec!["a"]);
        let many = SchemaDefault::List(vec!["a".into(), "b".into()]);
        assert_eq!(many.entries(), vec!["a", "b"]);
        assert_eq!(many.first(), Some("a"));
    }
}
