//! Branch Selector
//!
//! When several node shapes describe the same entity, the selector
//! normalizes each into an isolated scratch state and scores it by
//! populated-field count; the best match becomes the active branch. With
//! no populated data anywhere (fresh creation), the first declared branch
//! wins deterministically.

use crate::cache::SessionCache;
use crate::mode::FormMode;
use crate::normalize::{normalize, NormalizedForm, RoleHints};
use formshape_schema::{FieldState, FieldValue, NodeShape};
use tracing::debug;

/// Sentinel marking an "unset" numeric rate field; never counts as
/// populated data.
pub const UNSET_RATE_SENTINEL: &str = "-0.01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchScore {
    /// State entries holding a non-empty scalar (sentinel excluded).
    pub populated: usize,
    /// Unset or otherwise empty entries; fewer is better on ties.
    pub missing: usize,
}

/// Score one scratch-normalized state.
pub fn score_state(state: &FieldState) -> BranchScore {
    let populated = state
        .values()
        .filter(|v| match v {
            FieldValue::Scalar(s) => !s.trim().is_empty() && s != UNSET_RATE_SENTINEL,
            _ => false,
        })
        .count();
    let missing = state.values().filter(|v| v.is_empty()).count();
    BranchScore { populated, missing }
}

/// Result of automatic branch selection.
#[derive(Debug, Clone)]
pub struct BranchSelection {
    /// Index of the winner in the input list.
    pub winner: usize,
    /// Winner first; remaining branches keep declaration order.
    pub ordered: Vec<NodeShape>,
    /// The winner's normalized form; its state is what gets merged into
    /// the live initial state.
    pub form: NormalizedForm,
}

/// Pick the branch whose defaults populate the most fields. Deterministic:
/// equal scores fall back to declaration order, so re-running over the
/// same input always yields the same winner.
pub fn select_branch(
    branches: &[NodeShape],
    mode: FormMode,
    hints: &RoleHints,
    cache: &dyn SessionCache,
) -> Option<BranchSelection> {
    if branches.is_empty() {
        return None;
    }

    let mut forms: Vec<NormalizedForm> = branches
        .iter()
        .map(|branch| normalize(&branch.property, mode, hints, cache))
        .collect();

    let mut winner = 0;
    let mut best = score_state(&forms[0].state);
    for (index, form) in forms.iter().enumerate().skip(1) {
        let score = score_state(&form.state);
        let better = score.populated > best.populated
            || (score.populated == best.populated && score.missing < best.missing);
        if better {
            winner = index;
            best = score;
        }
    }
    debug!(winner = %branches[winner].label, populated = best.populated,
        missing = best.missing, "selected branch");

    let mut ordered = Vec::with_capacity(branches.len());
    ordered.push(branches[winner].clone());
    ordered.extend(
        branches
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != winner)
            .map(|(_, b)| b.clone()),
    );

    Some(BranchSelection {
        winner,
        ordered,
        form: forms.swap_remove(winner),
    })
}

/// Manual branch switch: unregister every field the outgoing branch put
/// into live state, then normalize and register the incoming branch. This
/// keeps stale fields out of submission payloads.
pub fn switch_branch(
    live: &mut FieldState,
    outgoing: &NormalizedForm,
    incoming: &NodeShape,
    mode: FormMode,
    hints: &RoleHints,
    cache: &dyn SessionCache,
) -> NormalizedForm {
    for key in outgoing.state_keys() {
        live.remove(&key);
    }
    let form = normalize(&incoming.property, mode, hints, cache);
    for (key, value) in &form.state {
        live.insert(key.clone(), value.clone());
    }
    form
}
