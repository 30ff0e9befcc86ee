//! Dependent-Field Resolver
//!
//! A dependent field's option set is a function of another field's live
//! value. Each field runs a small state machine (`Idle → Fetching →
//! Ready`, re-entering `Fetching` on every parent change) with two
//! consistency rules:
//!
//! - fetches are debounced, so rapid parent churn coalesces to the
//!   settled value;
//! - every fetch captures a generation number at issue time and a
//!   superseded generation is discarded on completion, so races resolve
//!   in issue order rather than completion order.
//!
//! Clearing a dependent's value on parent change is the dependency
//! graph's job (`formshape_engine::DependencyGraph`); this module only
//! resolves options and reconciles the selection.

use crate::services::InstanceService;
use chrono::{DateTime, Utc};
use formshape_engine::{FormMode, SessionCache};
use formshape_schema::{local_identifier, PropertyShape, RegistryFieldValues, SelectOption};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Fixed delay before a fetch is actually issued.
    pub debounce: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            debounce: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPhase {
    Idle,
    Fetching,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionStatus {
    Ready,
    /// The collaborator failed; the field degrades to an empty option
    /// list and the rest of the form stays usable.
    Unavailable,
}

/// Resolved options plus the reconciled selection for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentOptions {
    pub options: Vec<SelectOption>,
    pub selected: Option<String>,
    pub status: OptionStatus,
}

/// Result of one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved(DependentOptions),
    /// A newer fetch was issued for the field while this one was in
    /// flight; the result must not clobber newer state.
    Superseded,
}

/// Everything needed to resolve one field's options.
#[derive(Debug, Clone)]
pub struct DependentRequest<'a> {
    /// Normalized shape (field id assigned, `dependent_on` rewritten).
    pub shape: &'a PropertyShape,
    /// Entity type backing this selector.
    pub entity_type: &'a str,
    pub mode: FormMode,
    /// Current value of the watched parent field, if any.
    pub parent_value: Option<&'a str>,
    /// The field's own current raw value.
    pub current_value: Option<&'a str>,
    /// Free-text filter typed into the selector.
    pub search_term: Option<&'a str>,
}

#[derive(Debug, Clone)]
struct FieldTracker {
    phase: FetchPhase,
    generation: u64,
    last_resolved: Option<DateTime<Utc>>,
}

impl Default for FieldTracker {
    fn default() -> Self {
        FieldTracker {
            phase: FetchPhase::Idle,
            generation: 0,
            last_resolved: None,
        }
    }
}

pub struct DependentFieldResolver {
    instances: Arc<dyn InstanceService>,
    cache: Arc<dyn SessionCache>,
    config: ResolverConfig,
    fields: RwLock<BTreeMap<String, FieldTracker>>,
}

impl DependentFieldResolver {
    pub fn new(instances: Arc<dyn InstanceService>, cache: Arc<dyn SessionCache>) -> Self {
        DependentFieldResolver {
            instances,
            cache,
            config: ResolverConfig::default(),
            fields: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn phase(&self, field_id: &str) -> FetchPhase {
        self.fields
            .read()
            .get(field_id)
            .map(|t| t.phase)
            .unwrap_or(FetchPhase::Idle)
    }

    /// When the field's options last reached `Ready`, if ever.
    pub fn last_resolved(&self, field_id: &str) -> Option<DateTime<Utc>> {
        self.fields.read().get(field_id).and_then(|t| t.last_resolved)
    }

    /// Capture a generation for a fetch about to be issued. Issue order is
    /// what decides races: whichever generation is latest when a fetch
    /// completes wins.
    pub fn issue(&self, field_id: &str) -> u64 {
        let mut fields = self.fields.write();
        let tracker = fields.entry(field_id.to_string()).or_default();
        tracker.generation += 1;
        tracker.phase = FetchPhase::Fetching;
        tracker.generation
    }

    /// Issue and run in one step.
    pub async fn resolve(&self, request: DependentRequest<'_>) -> ResolveOutcome {
        let generation = self.issue(&field_key(request.shape));
        self.resolve_issued(generation, request).await
    }

    /// Run a fetch under a previously captured generation.
    pub async fn resolve_issued(
        &self,
        generation: u64,
        request: DependentRequest<'_>,
    ) -> ResolveOutcome {
        let field_id = field_key(request.shape);

        tokio::time::sleep(self.config.debounce).await;
        if self.superseded(&field_id, generation) {
            debug!(field = %field_id, generation, "debounced fetch superseded before issue");
            return ResolveOutcome::Superseded;
        }

        let rows = match self.fetch(&request).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(field = %field_id, %err, "dependent option fetch failed");
                if self.superseded(&field_id, generation) {
                    return ResolveOutcome::Superseded;
                }
                self.mark_ready(&field_id, generation);
                return ResolveOutcome::Resolved(DependentOptions {
                    options: Vec::new(),
                    selected: None,
                    status: OptionStatus::Unavailable,
                });
            }
        };

        let mut options: Vec<SelectOption> =
            rows.iter().filter_map(SelectOption::from_row).collect();

        let mut selected = None;
        if request.mode != FormMode::Search {
            selected = self.reconcile(&request, &mut options).await;
        }

        options.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        if request.mode == FormMode::Search {
            let sentinel = SelectOption::match_all();
            selected = Some(sentinel.value.clone());
            options.insert(0, sentinel);
        }

        if self.superseded(&field_id, generation) {
            debug!(field = %field_id, generation, "discarding stale fetch result");
            return ResolveOutcome::Superseded;
        }
        self.mark_ready(&field_id, generation);

        ResolveOutcome::Resolved(DependentOptions {
            options,
            selected,
            status: OptionStatus::Ready,
        })
    }

    /// Fetch scope, in priority order: parent-scoped when the field is
    /// dependent and its parent holds a value; a single point lookup in
    /// read-only modes with a schema default (cheapest query for data that
    /// cannot change); otherwise unscoped by search term.
    async fn fetch(
        &self,
        request: &DependentRequest<'_>,
    ) -> anyhow::Result<Vec<RegistryFieldValues>> {
        let parent = request
            .parent_value
            .filter(|p| !p.trim().is_empty())
            .filter(|_| request.shape.dependent_on.is_some());
        if let Some(parent) = parent {
            return self
                .instances
                .fetch_instances(request.entity_type, Some(parent), request.search_term)
                .await;
        }

        if request.shape.dependent_on.is_none() && request.mode.is_readonly() {
            if let Some(default) = request.shape.default_value.as_ref().and_then(|d| d.first()) {
                let row = self
                    .instances
                    .fetch_instance(request.entity_type, default)
                    .await?;
                return Ok(row.into_iter().collect());
            }
        }

        self.instances
            .fetch_instances(request.entity_type, None, request.search_term)
            .await
    }

    /// Selection reconciliation: a stored prior value wins over the
    /// field's current raw value; failing both, the schema default is
    /// matched by trailing identifier; failing that, the default id (when
    /// present) is point-fetched and appended as a synthetic option so the
    /// previously-saved selection stays visible under any filter.
    async fn reconcile(
        &self,
        request: &DependentRequest<'_>,
        options: &mut Vec<SelectOption>,
    ) -> Option<String> {
        let prior = self.cache.get(&request.shape.name);
        let candidates = [prior.as_deref(), request.current_value];
        for candidate in candidates.into_iter().flatten() {
            if candidate.trim().is_empty() {
                continue;
            }
            if let Some(hit) = options.iter().find(|o| o.value == candidate) {
                return Some(hit.value.clone());
            }
        }

        let default = request.shape.default_value.as_ref().and_then(|d| d.first())?;
        let needle = local_identifier(default);
        if let Some(hit) = options
            .iter()
            .find(|o| local_identifier(&o.value) == needle)
        {
            return Some(hit.value.clone());
        }

        match self.instances.fetch_instance(request.entity_type, default).await {
            Ok(Some(row)) => {
                let extra = SelectOption::from_row(&row)?;
                let value = extra.value.clone();
                options.push(extra);
                Some(value)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(field = %request.shape.name, %err, "synthetic option point-fetch failed");
                None
            }
        }
    }

    fn superseded(&self, field_id: &str, generation: u64) -> bool {
        self.fields
            .read()
            .get(field_id)
            .map(|t| t.generation != generation)
            .unwrap_or(true)
    }

    fn mark_ready(&self, field_id: &str, generation: u64) {
        let mut fields = self.fields.write();
        if let Some(tracker) = fields.get_mut(field_id) {
            if tracker.generation == generation {
                tracker.phase = FetchPhase::Ready;
                tracker.last_resolved = Some(Utc::now());
            }
        }
    }
}

fn field_key(shape: &PropertyShape) -> String {
    shape
        .field_id
        .clone()
        .unwrap_or_else(|| shape.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockInstanceService;
    use formshape_engine::NoCache;

    #[tokio::test]
    async fn phase_starts_idle_and_advances_on_issue() {
        let resolver = DependentFieldResolver::new(
            Arc::new(MockInstanceService::new()),
            Arc::new(NoCache),
        );
        assert_eq!(resolver.phase("pricing"), FetchPhase::Idle);
        resolver.issue("pricing");
        assert_eq!(resolver.phase("pricing"), FetchPhase::Fetching);
    }

    #[tokio::test]
    async fn generations_increase_per_field() {
        let resolver = DependentFieldResolver::new(
            Arc::new(MockInstanceService::new()),
            Arc::new(NoCache),
        );
        assert_eq!(resolver.issue("a"), 1);
        assert_eq!(resolver.issue("a"), 2);
        assert_eq!(resolver.issue("b"), 1);
    }
}
