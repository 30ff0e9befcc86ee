//! Row-Array Append Policy
//!
//! Array fields grow by a level-triggered rule evaluated on every mutation
//! of the array: while the last row is entirely blank the array holds its
//! size; the moment any cell of the last row becomes non-empty, exactly
//! one blank row is appended. The appended row is itself blank, so the
//! trigger can never fire twice for one transition. Seeding at
//! normalization goes through the constructor path and never evaluates
//! the policy.

use formshape_schema::{FieldState, FieldValue, RowArray};

/// True when the array's last row carries any non-empty cell.
pub fn append_needed(rows: &RowArray) -> bool {
    rows.last_row().is_some_and(|row| !row.is_blank())
}

/// Mutate one cell and apply the append policy. Returns true when a blank
/// row was appended.
pub fn set_cell(
    state: &mut FieldState,
    array_key: &str,
    row_index: usize,
    member_id: &str,
    value: &str,
) -> bool {
    let Some(FieldValue::Rows(rows)) = state.get_mut(array_key) else {
        return false;
    };
    let Some(row) = rows.rows.get_mut(row_index) else {
        return false;
    };
    row.set(member_id, value);
    if append_needed(rows) {
        rows.push_blank();
        true
    } else {
        false
    }
}
