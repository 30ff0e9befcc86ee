//! Runtime Value Model
//!
//! `FieldState` is the mutable value map of one form instance, keyed by
//! resolved field id. Values are a tagged union discriminated at
//! normalization time (scalar / boolean flag / row array), so consumers
//! never sniff value shapes at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Field values
// ============================================================================

/// One row of an array field: prefixed member field id → cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(pub BTreeMap<String, String>);

impl Row {
    pub fn blank(member_ids: &[String]) -> Self {
        Row(member_ids
            .iter()
            .map(|id| (id.clone(), String::new()))
            .collect())
    }

    pub fn get(&self, member_id: &str) -> Option<&str> {
        self.0.get(member_id).map(|s| s.as_str())
    }

    pub fn set(&mut self, member_id: &str, value: &str) {
        self.0.insert(member_id.to_string(), value.to_string());
    }

    /// True when every cell is empty.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}

/// Ordered row data for a repeating field or group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowArray {
    /// Prefixed member field ids; the key set of every row.
    pub member_ids: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowArray {
    pub fn empty(member_ids: Vec<String>) -> Self {
        RowArray {
            member_ids,
            rows: Vec::new(),
        }
    }

    pub fn push_blank(&mut self) {
        let row = Row::blank(&self.member_ids);
        self.rows.push(row);
    }

    pub fn last_row(&self) -> Option<&Row> {
        self.rows.last()
    }
}

/// Tagged runtime value of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Scalar(String),
    Flag(bool),
    Rows(RowArray),
    /// Required-but-unset.
    Unset,
}

impl FieldValue {
    pub fn scalar(s: impl Into<String>) -> Self {
        FieldValue::Scalar(s.into())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True for `Unset`, empty scalars, unset flags, and empty row arrays.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => s.trim().is_empty(),
            FieldValue::Flag(b) => !b,
            FieldValue::Rows(rows) => rows.rows.iter().all(Row::is_blank),
            FieldValue::Unset => true,
        }
    }
}

/// The live value map of one form instance. Exclusively owned by that
/// instance; discarded on unmount or resubmission.
pub type FieldState = BTreeMap<String, FieldValue>;

// ============================================================================
// Instance-service payloads
// ============================================================================

/// Literal/URI distinction on instance-service values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Literal,
    Uri,
}

/// One value cell of an instance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub value: String,
    pub kind: EntryKind,
    pub data_type: Option<String>,
    pub lang: Option<String>,
}

impl RegistryEntry {
    pub fn literal(value: &str) -> Self {
        RegistryEntry {
            value: value.to_string(),
            kind: EntryKind::Literal,
            data_type: None,
            lang: None,
        }
    }

    pub fn uri(value: &str) -> Self {
        RegistryEntry {
            value: value.to_string(),
            kind: EntryKind::Uri,
            data_type: None,
            lang: None,
        }
    }
}

/// One instance-service result row: field name → value entries.
pub type RegistryFieldValues = BTreeMap<String, Vec<RegistryEntry>>;

// ============================================================================
// Select options
// ============================================================================

/// One choice of a dependent selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    /// The universal "match everything" choice forced by search-mode forms.
    pub fn match_all() -> Self {
        SelectOption {
            value: String::new(),
            label: "All".to_string(),
        }
    }

    /// Build an option from an instance row. `id`/`iri` supplies the value,
    /// `label`/`name` the display text; the label falls back to the trailing
    /// segment of the value identifier.
    pub fn from_row(row: &RegistryFieldValues) -> Option<Self> {
        let value = ["id", "iri"]
            .iter()
            .find_map(|k| row.get(*k).and_then(|v| v.first()))
            .map(|e| e.value.clone())?;
        let label = ["label", "name"]
            .iter()
            .find_map(|k| row.get(*k).and_then(|v| v.first()))
            .map(|e| e.value.clone())
            .unwrap_or_else(|| local_identifier(&value).to_string());
        Some(SelectOption { value, label })
    }
}

/// Trailing segment of an identifier: the suffix after the last `/` or `#`.
pub fn local_identifier(iri: &str) -> &str {
    iri.rsplit(&['/', '#'][..]).next().unwrap_or(iri)
}
