//! Field Dependency Graph
//!
//! Explicit parent → dependent edges, replacing framework-level reactive
//! subscriptions. A "field changed" dispatch walks only the registered
//! dependents of the changed id. Whether an edge has already seen its
//! first change is an edge attribute: the first dispatch after mount must
//! not clear anything (that is the form loading its saved value), every
//! later one resets the dependent.

use formshape_schema::{FieldState, FieldValue, SchemaNode};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Edge {
    child: String,
    child_is_array: bool,
    fired: bool,
}

/// What a dispatch did to one dependent field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentChange {
    pub field_id: String,
    /// False on the first parent transition after mount.
    pub cleared: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<Edge>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    /// Build the graph from a normalized property list; only shapes whose
    /// `dependent_on` survived the rewrite contribute edges.
    pub fn from_nodes(nodes: &[SchemaNode]) -> Self {
        let mut graph = DependencyGraph::new();
        let mut walk = |shape: &formshape_schema::PropertyShape| {
            if let (Some(parent), Some(child)) = (&shape.dependent_on, &shape.field_id) {
                graph.register(parent, child, shape.is_array());
            }
        };
        for node in nodes {
            match node {
                SchemaNode::Shape(shape) => walk(shape),
                SchemaNode::Group(group) => group.property.iter().for_each(&mut walk),
            }
        }
        graph
    }

    pub fn register(&mut self, parent_id: &str, child_id: &str, child_is_array: bool) {
        self.edges
            .entry(parent_id.to_string())
            .or_default()
            .push(Edge {
                child: child_id.to_string(),
                child_is_array,
                fired: false,
            });
    }

    /// Dependent field ids of one parent, in registration order.
    pub fn dependents_of(&self, parent_id: &str) -> Vec<&str> {
        self.edges
            .get(parent_id)
            .map(|edges| edges.iter().map(|e| e.child.as_str()).collect())
            .unwrap_or_default()
    }

    /// Dispatch a parent-value change. Every dependent is reported (it
    /// needs a refetch either way); values are only cleared from the
    /// second change onward.
    pub fn dispatch(&mut self, changed_id: &str, state: &mut FieldState) -> Vec<DependentChange> {
        let Some(edges) = self.edges.get_mut(changed_id) else {
            return Vec::new();
        };
        let mut changes = Vec::with_capacity(edges.len());
        for edge in edges {
            let cleared = edge.fired;
            if cleared {
                clear_dependent(state, &edge.child, edge.child_is_array);
            }
            edge.fired = true;
            changes.push(DependentChange {
                field_id: edge.child.clone(),
                cleared,
            });
        }
        changes
    }
}

fn clear_dependent(state: &mut FieldState, child_id: &str, child_is_array: bool) {
    if child_is_array {
        // Array dependents are keyed by the un-prefixed label; the prefixed
        // field id is "<label> <name>", so recover the label by scanning.
        for value in state.values_mut() {
            if let FieldValue::Rows(rows) = value {
                if rows.member_ids.iter().any(|id| id == child_id) {
                    rows.rows.clear();
                }
            }
        }
        return;
    }
    if let Some(value) = state.get_mut(child_id) {
        *value = match value {
            FieldValue::Flag(_) => FieldValue::Flag(false),
            _ => FieldValue::scalar(""),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formshape_schema::RowArray;

    #[test]
    fn first_dispatch_reports_without_clearing() {
        let mut graph = DependencyGraph::new();
        graph.register("account", "pricing", false);

        let mut state = FieldState::new();
        state.insert("pricing".to_string(), FieldValue::scalar("saved"));

        let changes = graph.dispatch("account", &mut state);
        assert_eq!(
            changes,
            vec![DependentChange {
                field_id: "pricing".to_string(),
                cleared: false
            }]
        );
        assert_eq!(state["pricing"].as_scalar(), Some("saved"));
    }

    #[test]
    fn later_dispatches_clear_the_dependent() {
        let mut graph = DependencyGraph::new();
        graph.register("account", "pricing", false);

        let mut state = FieldState::new();
        state.insert("pricing".to_string(), FieldValue::scalar("saved"));

        graph.dispatch("account", &mut state);
        let changes = graph.dispatch("account", &mut state);
        assert!(changes[0].cleared);
        assert_eq!(state["pricing"].as_scalar(), Some(""));
    }

    #[test]
    fn array_dependents_lose_all_rows() {
        let mut graph = DependencyGraph::new();
        graph.register("meter", "reading value", true);

        let mut rows = RowArray::empty(vec!["reading value".to_string()]);
        rows.push_blank();
        rows.rows[0].set("reading value", "42");
        let mut state = FieldState::new();
        state.insert("reading".to_string(), FieldValue::Rows(rows));

        graph.dispatch("meter", &mut state);
        graph.dispatch("meter", &mut state);
        match &state["reading"] {
            FieldValue::Rows(rows) => assert!(rows.rows.is_empty()),
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn dispatch_walks_only_registered_dependents() {
        let mut graph = DependencyGraph::new();
        graph.register("account", "pricing", false);

        let mut state = FieldState::new();
        state.insert("unrelated".to_string(), FieldValue::scalar("keep"));

        let changes = graph.dispatch("unrelated-parent", &mut state);
        assert!(changes.is_empty());
        assert_eq!(graph.dependents_of("account"), vec!["pricing"]);
    }
}
