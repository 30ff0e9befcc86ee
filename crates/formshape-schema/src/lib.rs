//! Formshape schema primitives
//!
//! The raw entity model for schema-driven form synthesis:
//! - `PropertyShape` / `PropertyGroup` / `NodeShape` — the SHACL-like
//!   description of fields, groups, and alternative branches
//! - `FieldValue` / `FieldState` — the tagged runtime value model
//! - `OntologyConcept` — hierarchical concepts for dependent selectors
//! - a tolerant JSON-LD template reader (`jsonld`)
//!
//! Everything here is plain data plus parsing; the algorithms that consume
//! these types live in `formshape-engine` and `formshape-resolve`.

pub mod concept;
pub mod jsonld;
pub mod shapes;
pub mod value;

pub use concept::{ConceptMappings, OntologyConcept};
pub use jsonld::{parse_template, SchemaError};
pub use shapes::{
    ClassKind, Datatype, NodeShape, PropertyGroup, PropertyShape, SchemaDefault, SchemaNode,
    TemplateDocument,
};
pub use value::{
    local_identifier, EntryKind, FieldState, FieldValue, RegistryEntry, RegistryFieldValues, Row,
    RowArray, SelectOption,
};
