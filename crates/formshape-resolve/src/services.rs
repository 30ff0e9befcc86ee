//! Collaborator Service Contracts
//!
//! Abstractions over the backend services the form engine calls out to.
//! Transport is out of scope, so the wire format stays loose: templates
//! arrive as already-parsed documents, instances as field-value maps.
//! Mock implementations live here too so every consumer can test against
//! scripted backends.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use formshape_schema::{OntologyConcept, RegistryFieldValues, TemplateDocument};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Returns the raw schema document for an entity type. With an instance
/// id, each property shape carries a populated default; without one, the
/// template is blank.
#[async_trait]
pub trait TemplateService: Send + Sync {
    async fn fetch_template(
        &self,
        entity_type: &str,
        instance_id: Option<&str>,
    ) -> Result<TemplateDocument>;
}

/// Returns or accepts entity data rows.
#[async_trait]
pub trait InstanceService: Send + Sync {
    /// Entities of a type, optionally scoped to a parent entity and
    /// filtered by a free-text search term.
    async fn fetch_instances(
        &self,
        entity_type: &str,
        parent_id: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<RegistryFieldValues>>;

    /// Point lookup by exact identifier.
    async fn fetch_instance(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<RegistryFieldValues>>;
}

/// Returns the concept subclasses of an ontology class.
#[async_trait]
pub trait ConceptService: Send + Sync {
    async fn fetch_concepts_for_class(&self, class_uri: &str) -> Result<Vec<OntologyConcept>>;
}

// ============================================================================
// Mocks for testing
// ============================================================================

/// Scripted template backend.
#[derive(Debug, Clone, Default)]
pub struct MockTemplateService {
    pub template: TemplateDocument,
}

impl MockTemplateService {
    pub fn with(template: TemplateDocument) -> Self {
        MockTemplateService { template }
    }
}

#[async_trait]
impl TemplateService for MockTemplateService {
    async fn fetch_template(
        &self,
        _entity_type: &str,
        _instance_id: Option<&str>,
    ) -> Result<TemplateDocument> {
        Ok(self.template.clone())
    }
}

/// One scripted instance row.
#[derive(Debug, Clone)]
pub struct MockInstance {
    pub entity_type: String,
    pub parent: Option<String>,
    pub row: RegistryFieldValues,
}

/// Scripted instance backend: filters its rows by entity type, parent
/// scope, and label substring; counts fetches and can be told to fail or
/// to respond slowly (for race tests).
#[derive(Debug, Default)]
pub struct MockInstanceService {
    instances: Mutex<Vec<MockInstance>>,
    pub fetch_calls: AtomicUsize,
    fail: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MockInstanceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, entity_type: &str, parent: Option<&str>, row: RegistryFieldValues) {
        self.instances.lock().push(MockInstance {
            entity_type: entity_type.to_string(),
            parent: parent.map(|p| p.to_string()),
            row,
        });
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn respond_after(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn matching(
        &self,
        entity_type: &str,
        parent_id: Option<&str>,
        search: Option<&str>,
    ) -> Vec<RegistryFieldValues> {
        self.instances
            .lock()
            .iter()
            .filter(|i| i.entity_type == entity_type)
            .filter(|i| match parent_id {
                Some(parent) => i.parent.as_deref() == Some(parent),
                None => true,
            })
            .filter(|i| match search {
                Some(term) if !term.is_empty() => i
                    .row
                    .get("label")
                    .and_then(|v| v.first())
                    .map(|e| e.value.to_lowercase().contains(&term.to_lowercase()))
                    .unwrap_or(false),
                _ => true,
            })
            .map(|i| i.row.clone())
            .collect()
    }
}

#[async_trait]
impl InstanceService for MockInstanceService {
    async fn fetch_instances(
        &self,
        entity_type: &str,
        parent_id: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<RegistryFieldValues>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("instance service unavailable"));
        }
        Ok(self.matching(entity_type, parent_id, search))
    }

    async fn fetch_instance(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<RegistryFieldValues>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("instance service unavailable"));
        }
        Ok(self
            .matching(entity_type, None, None)
            .into_iter()
            .find(|row| {
                row.get("id")
                    .and_then(|v| v.first())
                    .is_some_and(|e| e.value == id)
            }))
    }
}

/// Scripted concept backend.
#[derive(Debug, Clone, Default)]
pub struct MockConceptService {
    pub concepts: Vec<OntologyConcept>,
}

impl MockConceptService {
    pub fn with(concepts: Vec<OntologyConcept>) -> Self {
        MockConceptService { concepts }
    }
}

#[async_trait]
impl ConceptService for MockConceptService {
    async fn fetch_concepts_for_class(&self, _class_uri: &str) -> Result<Vec<OntologyConcept>> {
        Ok(self.concepts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formshape_schema::RegistryEntry;

    fn row(id: &str, label: &str) -> RegistryFieldValues {
        let mut row = RegistryFieldValues::new();
        row.insert("id".to_string(), vec![RegistryEntry::uri(id)]);
        row.insert("label".to_string(), vec![RegistryEntry::literal(label)]);
        row
    }

    #[tokio::test]
    async fn mock_scopes_by_parent_and_search() {
        let service = MockInstanceService::new();
        service.add("pricing", Some("acct-1"), row("https://x/p1", "Standard"));
        service.add("pricing", Some("acct-2"), row("https://x/p2", "Premium"));

        let scoped = service
            .fetch_instances("pricing", Some("acct-1"), None)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);

        let searched = service
            .fetch_instances("pricing", None, Some("prem"))
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn mock_point_fetch_matches_exact_id() {
        let service = MockInstanceService::new();
        service.add("pricing", None, row("https://x/p1", "Standard"));
        let hit = service.fetch_instance("pricing", "https://x/p1").await.unwrap();
        assert!(hit.is_some());
        let miss = service.fetch_instance("pricing", "https://x/p9").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn mock_failure_propagates() {
        let service = MockInstanceService::new();
        service.fail_next(true);
        assert!(service.fetch_instances("pricing", None, None).await.is_err());
    }
}
