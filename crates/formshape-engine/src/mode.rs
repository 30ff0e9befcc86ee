use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The interaction mode a form instance was opened in. Defaulting and
/// validation rules depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Add,
    Edit,
    View,
    Delete,
    Search,
}

impl FormMode {
    /// Creation-style modes start from a blank slate: fresh identifiers,
    /// unset day flags.
    pub fn is_creation(self) -> bool {
        matches!(self, FormMode::Add | FormMode::Search)
    }

    /// Read-only modes render existing data and never submit edits.
    pub fn is_readonly(self) -> bool {
        matches!(self, FormMode::View | FormMode::Delete)
    }
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormMode::Add => "add",
            FormMode::Edit => "edit",
            FormMode::View => "view",
            FormMode::Delete => "delete",
            FormMode::Search => "search",
        };
        f.write_str(s)
    }
}

impl FromStr for FormMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(FormMode::Add),
            "edit" => Ok(FormMode::Edit),
            "view" => Ok(FormMode::View),
            "delete" => Ok(FormMode::Delete),
            "search" => Ok(FormMode::Search),
            other => Err(format!("unknown form mode: {other}")),
        }
    }
}
