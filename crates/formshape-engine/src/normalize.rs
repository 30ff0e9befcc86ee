//! Schema Normalizer
//!
//! The entry point of form synthesis: walks a template's property list,
//! rewrites dependency references against the sibling list, assigns field
//! ids, and builds the initial state map. Dependency rewriting happens
//! before any defaulting so the dependency graph is edge-complete before
//! watcher logic runs.

use crate::cache::SessionCache;
use crate::defaults::resolve_default;
use crate::field_id::resolve_field_id;
use crate::mode::FormMode;
use formshape_schema::{
    FieldState, FieldValue, PropertyGroup, PropertyShape, Row, RowArray, SchemaNode,
};
use std::collections::BTreeMap;
use tracing::warn;

/// Caller-supplied labels tagging which normalized field plays a
/// cross-cutting role downstream.
#[derive(Debug, Clone, Default)]
pub struct RoleHints {
    pub account: Option<String>,
    pub pricing: Option<String>,
}

impl RoleHints {
    pub fn none() -> Self {
        RoleHints::default()
    }
}

/// Output of normalization: the property list carrying resolved field ids,
/// the seeded initial state, and any role-tagged field ids.
#[derive(Debug, Clone, Default)]
pub struct NormalizedForm {
    pub nodes: Vec<SchemaNode>,
    pub state: FieldState,
    pub account_field: Option<String>,
    pub pricing_field: Option<String>,
}

impl NormalizedForm {
    /// State keys registered by this form; used to unregister a branch on
    /// manual switch.
    pub fn state_keys(&self) -> Vec<String> {
        self.state.keys().cloned().collect()
    }

    /// Every shape of the normalized list, flattened out of groups.
    pub fn shapes(&self) -> Vec<&PropertyShape> {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                SchemaNode::Shape(shape) => out.push(shape.as_ref()),
                SchemaNode::Group(group) => out.extend(group.property.iter()),
            }
        }
        out
    }
}

/// Normalize a property list into `(fields, initial state)`.
pub fn normalize(
    nodes: &[SchemaNode],
    mode: FormMode,
    hints: &RoleHints,
    cache: &dyn SessionCache,
) -> NormalizedForm {
    let mut out_nodes = nodes.to_vec();
    let siblings = sibling_index(&out_nodes);
    let mut form = NormalizedForm::default();

    for node in &mut out_nodes {
        match node {
            SchemaNode::Group(group) => {
                for member in &mut group.property {
                    rewrite_dependency(member, &siblings);
                }
                if group.is_array() {
                    normalize_group_rows(group, &mut form.state);
                } else {
                    let label = group.label.clone();
                    for member in &mut group.property {
                        normalize_shape(member, Some(&label), mode, cache, &mut form.state);
                    }
                }
                for member in &group.property {
                    tag_role(member, hints, &mut form);
                }
            }
            SchemaNode::Shape(shape) => {
                rewrite_dependency(shape, &siblings);
                normalize_shape(shape, None, mode, cache, &mut form.state);
                tag_role(shape, hints, &mut form);
            }
        }
    }

    form.nodes = out_nodes;
    form
}

/// Resolved field id each sibling will receive, keyed by its schema id.
/// Computed over the raw list so `dependentOn` references resolve before
/// any shape is touched.
fn sibling_index(nodes: &[SchemaNode]) -> BTreeMap<String, String> {
    let mut index = BTreeMap::new();
    for node in nodes {
        match node {
            SchemaNode::Shape(shape) => {
                if !shape.id.is_empty() {
                    index.insert(shape.id.clone(), resolve_field_id(shape, None));
                }
            }
            SchemaNode::Group(group) => {
                for member in &group.property {
                    if !member.id.is_empty() {
                        index.insert(
                            member.id.clone(),
                            resolve_field_id(member, Some(&group.label)),
                        );
                    }
                }
            }
        }
    }
    index
}

/// Replace the opaque schema reference with the sibling's resolved field
/// id. An unresolvable reference is dropped; the field then behaves as
/// independent (schema inconsistency is locally contained, never fatal).
fn rewrite_dependency(shape: &mut PropertyShape, siblings: &BTreeMap<String, String>) {
    if let Some(raw) = shape.dependent_on.take() {
        match siblings.get(&raw) {
            Some(resolved) => shape.dependent_on = Some(resolved.clone()),
            None => {
                warn!(field = %shape.name, reference = %raw,
                    "dropping unresolvable dependency reference");
            }
        }
    }
}

fn normalize_shape(
    shape: &mut PropertyShape,
    group_label: Option<&str>,
    mode: FormMode,
    cache: &dyn SessionCache,
    state: &mut FieldState,
) {
    let field_id = resolve_field_id(shape, group_label);
    shape.field_id = Some(field_id.clone());

    if shape.is_array() {
        let key = group_label.unwrap_or(&shape.name).to_string();
        let defaults = shape
            .default_value
            .as_ref()
            .map(|d| d.entries().iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();
        let rows = seed_rows(
            vec![field_id],
            &[defaults],
            shape.min_count.unwrap_or(0) == 0,
        );
        state.insert(key, FieldValue::Rows(rows));
    } else {
        state.insert(field_id, resolve_default(shape, mode, cache));
    }
}

/// A repeating group becomes one row array keyed by the group label; each
/// member field id is group-prefixed and keys the row cells.
fn normalize_group_rows(group: &mut PropertyGroup, state: &mut FieldState) {
    let label = group.label.clone();
    let mut member_ids = Vec::new();
    let mut member_defaults = Vec::new();
    for member in &mut group.property {
        let field_id = resolve_field_id(member, Some(&label));
        member.field_id = Some(field_id.clone());
        member_ids.push(field_id);
        member_defaults.push(
            member
                .default_value
                .as_ref()
                .map(|d| d.entries().iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        );
    }
    let rows = seed_rows(
        member_ids,
        &member_defaults,
        group.min_count.unwrap_or(0) == 0,
    );
    state.insert(label, FieldValue::Rows(rows));
}

/// Seed row data: one row per default entry (deepest member decides), or a
/// single blank row; an optional field with no defaults starts empty so no
/// placeholder row leaks into submissions.
fn seed_rows(member_ids: Vec<String>, defaults_per_member: &[Vec<String>], optional: bool) -> RowArray {
    let depth = defaults_per_member
        .iter()
        .map(|d| d.len())
        .max()
        .unwrap_or(0);
    let mut seeded = Vec::new();
    if depth == 0 && !optional {
        seeded.push(Row::blank(&member_ids));
    }
    for i in 0..depth {
        let mut row = Row::blank(&member_ids);
        for (member, defaults) in member_ids.iter().zip(defaults_per_member) {
            if let Some(value) = defaults.get(i) {
                row.set(member, value);
            }
        }
        seeded.push(row);
    }
    RowArray {
        member_ids,
        rows: seeded,
    }
}

fn tag_role(shape: &PropertyShape, hints: &RoleHints, form: &mut NormalizedForm) {
    let Some(field_id) = shape.field_id.clone() else {
        return;
    };
    if hints
        .account
        .as_deref()
        .is_some_and(|h| h.eq_ignore_ascii_case(&shape.name))
    {
        form.account_field = Some(field_id.clone());
    }
    if hints
        .pricing
        .as_deref()
        .is_some_and(|h| h.eq_ignore_ascii_case(&shape.name))
    {
        form.pricing_field = Some(field_id);
    }
}
