//! Formshape Engine
//!
//! Pure, synchronous form synthesis over schema primitives:
//!
//! 1. `normalize` walks a template's property list, assigns stable field
//!    ids, resolves defaults, and rewrites inter-field dependency
//!    references — producing a flat field model plus the initial state map.
//! 2. `select_branch` scores alternative node shapes by populated-field
//!    count and picks the best match for existing data.
//! 3. `DependencyGraph` carries the explicit parent → dependent edges the
//!    reactive layer dispatches over, with the first-change-after-mount
//!    distinction as an edge attribute.
//! 4. `sort_concepts` orders flat ontology concepts into the
//!    root/children adjacency the hierarchical selectors consume.
//!
//! Nothing here performs I/O; the async collaborator plumbing lives in
//! `formshape-resolve`.

pub mod branch;
pub mod cache;
pub mod concepts;
pub mod defaults;
pub mod depgraph;
pub mod error;
pub mod field_id;
pub mod mode;
pub mod normalize;
pub mod rows;
pub mod validation;

pub use branch::{select_branch, switch_branch, BranchSelection, UNSET_RATE_SENTINEL};
pub use cache::{MemorySessionCache, NoCache, SessionCache};
pub use concepts::sort_concepts;
pub use defaults::resolve_default;
pub use depgraph::{DependencyGraph, DependentChange};
pub use error::EngineError;
pub use field_id::{array_state_key, resolve_field_id};
pub use mode::FormMode;
pub use normalize::{normalize, NormalizedForm, RoleHints};
pub use rows::{append_needed, set_cell};
pub use validation::{compile_rules, ValidationRules};
