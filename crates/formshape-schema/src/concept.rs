//! Ontology Concept Types
//!
//! Concepts populate hierarchical selectors: a flat list with optional
//! parent references, pre-flattened by the sorter into an adjacency
//! structure keyed by parent type value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ontology class or individual with an optional parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyConcept {
    /// Type value (IRI or token); identifies the concept.
    #[serde(rename = "type")]
    pub type_value: String,
    pub label: String,
    pub description: Option<String>,
    pub parent: Option<Box<OntologyConcept>>,
}

impl OntologyConcept {
    pub fn new(type_value: &str, label: &str) -> Self {
        OntologyConcept {
            type_value: type_value.to_string(),
            label: label.to_string(),
            description: None,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: OntologyConcept) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

/// Adjacency structure produced by the concept sorter: top-level concepts
/// under `root`, children bucketed by their parent's type value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMappings {
    pub root: Vec<OntologyConcept>,
    pub children: BTreeMap<String, Vec<OntologyConcept>>,
}

impl ConceptMappings {
    /// Children bucket for a root concept, if it heads one.
    pub fn children_of(&self, type_value: &str) -> Option<&[OntologyConcept]> {
        self.children.get(type_value).map(|v| v.as_slice())
    }
}
