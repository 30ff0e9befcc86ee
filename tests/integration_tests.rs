//! Workspace-level integration tests: the full pipeline from a raw
//! template document to resolved dependent options, against mock
//! collaborator services.
//!
//! Run with: cargo test --test integration_tests

use formshape_engine::{
    normalize, select_branch, switch_branch, DependencyGraph, FormMode, NoCache, RoleHints,
};
use formshape_resolve::{
    ConceptService, DependentFieldResolver, DependentRequest, MockConceptService,
    MockInstanceService, MockTemplateService, ResolveOutcome, ResolverConfig, TemplateService,
};
use formshape_schema::{
    parse_template, FieldValue, OntologyConcept, RegistryEntry, RegistryFieldValues,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn billing_template() -> serde_json::Value {
    json!({
        "@context": {"sh": "http://www.w3.org/ns/shacl#"},
        "nodeShapes": [
            {
                "label": "flat rate",
                "property": [
                    {"name": "id", "minCount": 1, "maxCount": 1},
                    {
                        "@id": "https://x/shape/account",
                        "name": "account",
                        "minCount": 1,
                        "maxCount": 1,
                        "defaultValue": "https://x/kb/acct-1"
                    },
                    {
                        "name": "pricing",
                        "minCount": 1,
                        "maxCount": 1,
                        "dependentOn": "https://x/shape/account"
                    },
                    {"name": "rate", "maxCount": 1, "datatype": "xsd:decimal",
                     "defaultValue": "4.20"}
                ]
            },
            {
                "label": "metered",
                "property": [
                    {"name": "id", "minCount": 1, "maxCount": 1},
                    {"name": "meter", "maxCount": 1}
                ]
            }
        ]
    })
}

fn instance_row(id: &str, label: &str) -> RegistryFieldValues {
    let mut row = RegistryFieldValues::new();
    row.insert("id".to_string(), vec![RegistryEntry::uri(id)]);
    row.insert("label".to_string(), vec![RegistryEntry::literal(label)]);
    row
}

// ============================================================================
// Template → normalized form → dependent options
// ============================================================================

#[tokio::test]
async fn template_to_resolved_options_end_to_end() {
    // the template service hands back the parsed document
    let template = parse_template(&billing_template()).unwrap();
    let templates = MockTemplateService::with(template);
    let document = templates
        .fetch_template("billing", Some("b-1"))
        .await
        .unwrap();

    // branch selection: "flat rate" carries populated defaults and wins
    let hints = RoleHints {
        account: Some("account".to_string()),
        pricing: Some("pricing".to_string()),
    };
    let selection =
        select_branch(&document.node_shapes, FormMode::Edit, &hints, &NoCache).unwrap();
    assert_eq!(selection.ordered[0].label, "flat rate");
    assert_eq!(selection.form.account_field.as_deref(), Some("account"));
    assert_eq!(selection.form.pricing_field.as_deref(), Some("pricing"));

    let mut live = selection.form.state.clone();
    assert_eq!(live["account"].as_scalar(), Some("https://x/kb/acct-1"));
    assert_eq!(live["rate"].as_scalar(), Some("4.20"));

    // the dependency rewrite fed the graph one edge: account → pricing
    let mut graph = DependencyGraph::from_nodes(&selection.form.nodes);
    assert_eq!(graph.dependents_of("account"), vec!["pricing"]);

    // dependent options scoped to the account's live value
    let instances = Arc::new(MockInstanceService::new());
    instances.add(
        "pricing",
        Some("https://x/kb/acct-1"),
        instance_row("https://x/kb/tier-2", "Standard"),
    );
    instances.add(
        "pricing",
        Some("https://x/kb/acct-1"),
        instance_row("https://x/kb/tier-1", "Budget"),
    );
    let resolver = DependentFieldResolver::new(instances, Arc::new(NoCache)).with_config(
        ResolverConfig {
            debounce: Duration::from_millis(5),
        },
    );

    let pricing_shape = selection
        .form
        .shapes()
        .into_iter()
        .find(|s| s.name == "pricing")
        .unwrap()
        .clone();
    let outcome = resolver
        .resolve(DependentRequest {
            shape: &pricing_shape,
            entity_type: "pricing",
            mode: FormMode::Edit,
            parent_value: live["account"].as_scalar(),
            current_value: None,
            search_term: None,
        })
        .await;
    let options = match outcome {
        ResolveOutcome::Resolved(options) => options,
        ResolveOutcome::Superseded => panic!("single fetch cannot be superseded"),
    };
    let labels: Vec<&str> = options.options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Budget", "Standard"]);

    // first parent change keeps the saved selection, the second clears it
    live.insert(
        "pricing".to_string(),
        FieldValue::scalar("https://x/kb/tier-1"),
    );
    let first = graph.dispatch("account", &mut live);
    assert!(!first[0].cleared);
    assert_eq!(live["pricing"].as_scalar(), Some("https://x/kb/tier-1"));

    let second = graph.dispatch("account", &mut live);
    assert!(second[0].cleared);
    assert_eq!(live["pricing"].as_scalar(), Some(""));
}

#[tokio::test]
async fn manual_branch_switch_keeps_submission_payload_clean() {
    let document = parse_template(&billing_template()).unwrap();
    let selection = select_branch(
        &document.node_shapes,
        FormMode::Edit,
        &RoleHints::none(),
        &NoCache,
    )
    .unwrap();

    let mut live = selection.form.state.clone();
    assert!(live.contains_key("rate"));

    let metered = document
        .node_shapes
        .iter()
        .find(|b| b.label == "metered")
        .unwrap();
    switch_branch(
        &mut live,
        &selection.form,
        metered,
        FormMode::Edit,
        &RoleHints::none(),
        &NoCache,
    );
    assert!(!live.contains_key("rate"));
    assert!(!live.contains_key("pricing"));
    assert!(live.contains_key("meter"));
}

// ============================================================================
// Concept service → sorter
// ============================================================================

#[tokio::test]
async fn concept_fetch_feeds_the_sorter() {
    let vehicle = OntologyConcept::new("t:vehicle", "vehicle");
    let truck = OntologyConcept::new("t:truck", "truck").with_parent(vehicle.clone());
    let van = OntologyConcept::new("t:van", "van").with_parent(vehicle.clone());
    let bicycle = OntologyConcept::new("t:bicycle", "bicycle");

    let service = MockConceptService::with(vec![vehicle, truck, van, bicycle]);
    let concepts = service
        .fetch_concepts_for_class("https://x/kb/TransportMode")
        .await
        .unwrap();

    let mappings = formshape_engine::sort_concepts(&concepts, "van");
    // "van" is a child, so its parent heads the root ordering
    assert_eq!(mappings.root[0].label, "vehicle");
    assert_eq!(mappings.root[1].label, "bicycle");
    let bucket = mappings.children_of("t:vehicle").unwrap();
    assert_eq!(bucket[0].label, "van");
    assert_eq!(bucket[1].label, "truck");
}

// ============================================================================
// Branch-free templates
// ============================================================================

#[tokio::test]
async fn branchless_template_normalizes_directly() {
    let doc = json!({
        "property": [
            {"name": "name", "minCount": 1, "maxCount": 1},
            {"label": "reading", "minCount": 0,
             "property": [{"name": "time"}, {"name": "value"}]}
        ]
    });
    let template = parse_template(&doc).unwrap();
    let form = normalize(
        &template.properties,
        FormMode::Add,
        &RoleHints::none(),
        &NoCache,
    );
    assert!(matches!(form.state["name"], FieldValue::Scalar(_)));
    match &form.state["reading"] {
        FieldValue::Rows(rows) => {
            assert!(rows.rows.is_empty());
            assert_eq!(rows.member_ids, vec!["reading time", "reading value"]);
        }
        other => panic!("expected rows, got {other:?}"),
    }
}
