//! Default Value Resolver
//!
//! Computes the initial value of a scalar field from schema defaults and
//! field semantics. Rules apply in priority order:
//!
//! 1. `id` fields mint a fresh identifier in creation-style modes (or when
//!    no default exists); otherwise the default's trailing segment.
//! 2. the weekly-recurrence field maps an ISO-8601 day duration onto the
//!    selector encoding (`P1D` → 0, `P2D` → −1, `P<7n>D` → n).
//! 3. day-of-week flags are blank in creation-style modes, otherwise the
//!    boolean cast of the schema default.
//! 4. everything else: schema default, then the session cache's
//!    last-known-good value for the field's semantic name, then empty.

use crate::cache::SessionCache;
use crate::mode::FormMode;
use formshape_schema::{local_identifier, FieldValue, PropertyShape};
use uuid::Uuid;

const DAYS_OF_WEEK: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const ID_FIELD: &str = "id";
const RECURRENCE_FIELD: &str = "recurrence";

/// Initial value for a non-array field.
pub fn resolve_default(
    shape: &PropertyShape,
    mode: FormMode,
    cache: &dyn SessionCache,
) -> FieldValue {
    let default = shape.default_value.as_ref().and_then(|d| d.first());

    if shape.name == ID_FIELD {
        return match default {
            Some(existing) if !mode.is_creation() => {
                FieldValue::scalar(local_identifier(existing))
            }
            _ => FieldValue::scalar(fresh_identifier()),
        };
    }

    if shape.name == RECURRENCE_FIELD {
        return match default.and_then(duration_to_weeks) {
            Some(weeks) => FieldValue::scalar(weeks.to_string()),
            None => FieldValue::Unset,
        };
    }

    if is_day_flag(&shape.name) {
        if mode.is_creation() {
            return FieldValue::Flag(false);
        }
        let set = default.map(truthy).unwrap_or(false);
        return FieldValue::Flag(set);
    }

    match default {
        Some(value) => FieldValue::scalar(value),
        None => match cache.get(&shape.name) {
            Some(remembered) => FieldValue::scalar(remembered),
            None => FieldValue::scalar(""),
        },
    }
}

fn fresh_identifier() -> String {
    Uuid::new_v4().simple().to_string()
}

fn is_day_flag(name: &str) -> bool {
    DAYS_OF_WEEK.contains(&name.to_ascii_lowercase().as_str())
}

fn truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

/// Map an ISO-8601 day duration onto the recurrence selector encoding:
/// `P1D` is a single occurrence (0), `P2D` alternate days (−1), `P<7n>D`
/// every n weeks. Anything else is unparseable.
fn duration_to_weeks(raw: &str) -> Option<i64> {
    let days: i64 = raw.strip_prefix('P')?.strip_suffix('D')?.parse().ok()?;
    match days {
        1 => Some(0),
        2 => Some(-1),
        n if n > 0 && n % 7 == 0 => Some(n / 7),
        _ => None,
    }
}
