//! Ontology Concept Sorter
//!
//! Orders a flat concept list into the root/children adjacency consumed by
//! hierarchical selectors. A caller-supplied priority token pins one
//! concept (or, when the token names a child, that child's parent) to the
//! front of the root ordering, and the matching concept to the front of
//! its bucket. Buckets whose parent reference matches no root concept are
//! promoted into root, so inconsistent parent data degrades instead of
//! disappearing.

use formshape_schema::{ConceptMappings, OntologyConcept};
use std::collections::BTreeMap;

/// Sort concepts into `ConceptMappings` with the priority token first.
pub fn sort_concepts(concepts: &[OntologyConcept], priority: &str) -> ConceptMappings {
    let mut root: Vec<OntologyConcept> = Vec::new();
    let mut children: BTreeMap<String, Vec<OntologyConcept>> = BTreeMap::new();

    for concept in concepts {
        match &concept.parent {
            Some(parent) => children
                .entry(parent.type_value.clone())
                .or_default()
                .push(concept.clone()),
            None => root.push(concept.clone()),
        }
    }

    // The token may name a root concept directly or one of the children;
    // in the latter case the child's parent heads the root ordering.
    let matched = concepts
        .iter()
        .find(|c| c.label == priority || c.type_value == priority);
    let priority_type = matched.map(|m| m.type_value.clone());
    let priority_root_type = matched.map(|m| match &m.parent {
        Some(parent) => parent.type_value.clone(),
        None => m.type_value.clone(),
    });

    // Pin the priority concept inside its bucket, sort the rest by label.
    for bucket in children.values_mut() {
        let pinned = priority_type
            .as_deref()
            .and_then(|t| bucket.iter().position(|c| c.type_value == t))
            .map(|i| bucket.remove(i));
        bucket.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        if let Some(pinned) = pinned {
            bucket.insert(0, pinned);
        }
    }

    // Self-heal orphaned parent references: promote those children to root.
    let orphan_keys: Vec<String> = children
        .keys()
        .cloned()
        .filter(|key| !root.iter().any(|c| &c.type_value == key))
        .collect();
    for key in orphan_keys {
        if let Some(orphans) = children.remove(&key) {
            root.extend(orphans);
        }
    }

    // Root order: priority first, then leaf concepts, then concepts that
    // head their own children group.
    let pinned_root = priority_root_type
        .as_deref()
        .and_then(|t| root.iter().position(|c| c.type_value == t))
        .map(|i| root.remove(i));
    let (mut with_children, mut childless): (Vec<_>, Vec<_>) = root
        .into_iter()
        .partition(|c| children.contains_key(&c.type_value));
    childless.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
    with_children.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));

    let mut ordered_root = Vec::new();
    ordered_root.extend(pinned_root);
    ordered_root.extend(childless);
    ordered_root.extend(with_children);

    ConceptMappings {
        root: ordered_root,
        children,
    }
}
