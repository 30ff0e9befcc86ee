//! Formshape Resolve
//!
//! The reactive half of form synthesis: abstract contracts for the backend
//! collaborators (template, instance, and concept services) and the
//! dependent-field resolver that keeps option sets consistent with their
//! parent field's live value.
//!
//! Correctness model: fetches are debounced so rapid parent churn
//! coalesces to the settled value, and every fetch captures a generation
//! number at issue time — a response whose generation has been superseded
//! is discarded, so races resolve in issue order without cancellation
//! tokens.

pub mod dependent;
pub mod services;

pub use dependent::{
    DependentFieldResolver, DependentOptions, DependentRequest, FetchPhase, OptionStatus,
    ResolveOutcome, ResolverConfig,
};
pub use services::{
    ConceptService, InstanceService, MockConceptService, MockInstanceService,
    MockTemplateService, TemplateService,
};

// The session cache capability is defined next to the default resolver
// that also consumes it.
pub use formshape_engine::{MemorySessionCache, NoCache, SessionCache};
