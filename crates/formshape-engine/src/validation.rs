//! Validation Rule Compiler
//!
//! Turns schema constraints (cardinality, numeric bounds, length, pattern)
//! into the rule set form validation consumes. Rules are field-scoped;
//! compiling them never aborts normalization — an invalid pattern is
//! logged and omitted.

use crate::error::EngineError;
use crate::mode::FormMode;
use formshape_schema::{Datatype, PropertyShape};
use regex::Regex;
use tracing::warn;

/// The two search time-window bounds stay required in every mode.
const ALWAYS_REQUIRED: [&str; 2] = ["search period from", "search period to"];

/// Exclusive numeric bounds are never enforced exactly; they are
/// approximated at two-decimal granularity.
const EXCLUSIVE_BOUND_STEP: f64 = 0.1;

const INTEGER_PATTERN: &str = r"^-?\d+$";
const DECIMAL_PATTERN: &str = r"^-?\d+(\.\d+)?$";

#[derive(Debug, Clone)]
pub struct NumericBound {
    pub limit: f64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LengthBound {
    pub limit: u32,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub message: String,
}

/// Compiled rule set for one field.
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    pub required: bool,
    pub min_value: Option<NumericBound>,
    pub max_value: Option<NumericBound>,
    pub min_length: Option<LengthBound>,
    pub max_length: Option<LengthBound>,
    pub pattern: Option<PatternRule>,
}

impl ValidationRules {
    /// Evaluate a raw value; each violated rule contributes its message.
    pub fn check(&self, value: &str) -> Vec<String> {
        let mut failures = Vec::new();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            if self.required {
                failures.push("a value is required".to_string());
            }
            return failures;
        }

        if let Ok(number) = trimmed.parse::<f64>() {
            if let Some(bound) = &self.min_value {
                if number < bound.limit {
                    failures.push(bound.message.clone());
                }
            }
            if let Some(bound) = &self.max_value {
                if number > bound.limit {
                    failures.push(bound.message.clone());
                }
            }
        }

        let chars = trimmed.chars().count() as u32;
        if let Some(bound) = &self.min_length {
            if chars < bound.limit {
                failures.push(bound.message.clone());
            }
        }
        if let Some(bound) = &self.max_length {
            if chars > bound.limit {
                failures.push(bound.message.clone());
            }
        }

        if let Some(rule) = &self.pattern {
            if !rule.regex.is_match(trimmed) {
                failures.push(rule.message.clone());
            }
        }

        failures
    }
}

/// Compile the rule set for one field under the given mode.
pub fn compile_rules(shape: &PropertyShape, mode: FormMode) -> ValidationRules {
    let mut rules = ValidationRules::default();

    let strictly_one = shape.min_count == Some(1) && shape.max_count == Some(1);
    rules.required = (mode != FormMode::Search && strictly_one)
        || ALWAYS_REQUIRED.contains(&shape.name.as_str());

    rules.min_value = match (shape.min_inclusive, shape.min_exclusive) {
        (Some(limit), _) => Some(NumericBound {
            limit,
            message: format!("must be at least {limit}"),
        }),
        (None, Some(exclusive)) => {
            let limit = exclusive + EXCLUSIVE_BOUND_STEP;
            Some(NumericBound {
                limit,
                message: format!("must be at least {limit}"),
            })
        }
        (None, None) => None,
    };

    rules.max_value = match (shape.max_inclusive, shape.max_exclusive) {
        (Some(limit), _) => Some(NumericBound {
            limit,
            message: format!("must be at most {limit}"),
        }),
        (None, Some(exclusive)) => {
            let limit = exclusive + EXCLUSIVE_BOUND_STEP;
            Some(NumericBound {
                limit,
                message: format!("must be at most {limit}"),
            })
        }
        (None, None) => None,
    };

    rules.min_length = shape.min_length.map(|limit| LengthBound {
        limit,
        message: format!("must be at least {limit} characters"),
    });
    rules.max_length = shape.max_length.map(|limit| LengthBound {
        limit,
        message: format!("must be at most {limit} characters"),
    });

    // Datatype-implied pattern first; an explicit schema pattern assigned
    // afterwards replaces it outright. The two are never merged.
    rules.pattern = match shape.datatype {
        Some(Datatype::Integer) => pattern_rule(INTEGER_PATTERN, "must be a whole number"),
        Some(Datatype::Decimal) => pattern_rule(DECIMAL_PATTERN, "must be a number"),
        _ => None,
    };
    if let Some(pattern) = &shape.pattern {
        let message = if is_digits_only(pattern) {
            "must contain digits only"
        } else {
            "must match the required format"
        };
        if let Some(rule) = pattern_rule(pattern, message) {
            rules.pattern = Some(rule);
        }
    }

    rules
}

fn pattern_rule(pattern: &str, message: &str) -> Option<PatternRule> {
    match compile_pattern(pattern) {
        Ok(regex) => Some(PatternRule {
            regex,
            message: message.to_string(),
        }),
        Err(err) => {
            warn!(%err, "dropping unusable validation pattern");
            None
        }
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, EngineError> {
    Regex::new(pattern).map_err(|source| EngineError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// A pattern that only ever admits digits, e.g. `\d+` or `[0-9]{4}`.
fn is_digits_only(pattern: &str) -> bool {
    let has_digit_class = pattern.contains("\\d") || pattern.contains("[0-9]");
    let leftover: String = pattern
        .trim_start_matches('^')
        .trim_end_matches('$')
        .replace("\\d", "")
        .replace("[0-9]", "")
        .chars()
        .filter(|c| !matches!(c, '+' | '*' | '?' | '{' | '}' | ',') && !c.is_ascii_digit())
        .collect();
    has_digit_class && leftover.is_empty()
}
