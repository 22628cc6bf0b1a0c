//! Supersession chain integration tests.
//!
//! - Create: defaults, validation, atomic component links
//! - Update: frozen content, status transitions, empty patch
//! - Supersede: cycles, races, cross-project and double-chain rejection
//! - Chain walk, detach, delete
//! - Read isolation from open writes, reopen from disk

use std::time::Duration;

use keel_config::RiskConfig;
use keel_core::entities::DecisionRecord;
use keel_core::enums::{AuditAction, ComponentKind, DecisionStatus, EntityType};
use keel_db::Store;
use keel_db::repos::audit::AuditFilter;
use keel_governance::{DecisionUpdateBuilder, Governance, GovernanceError, NewDecision};
use pretty_assertions::assert_eq;

async fn governance() -> Governance {
    let store = Store::open_local(":memory:", Duration::from_secs(5))
        .await
        .unwrap();
    Governance::new(store, RiskConfig::default()).unwrap()
}

fn new_decision(project_id: &str, title: &str) -> NewDecision {
    NewDecision {
        project_id: project_id.to_string(),
        title: title.to_string(),
        context: "We need durable storage".to_string(),
        decision: "Use libSQL".to_string(),
        rationale: "Embedded and transactional".to_string(),
        consequences: "Single writer".to_string(),
        created_by: "ada".to_string(),
        ..NewDecision::default()
    }
}

async fn create(gov: &Governance, project_id: &str, title: &str) -> DecisionRecord {
    gov.create_decision(new_decision(project_id, title))
        .await
        .unwrap()
}

async fn assert_superseded_invariant(gov: &Governance, project_id: &str) {
    for record in gov.get_decisions_by_project(project_id, None).await.unwrap() {
        assert_eq!(
            record.status == DecisionStatus::Superseded,
            record.superseded_by.is_some(),
            "invariant broken on {}",
            record.id
        );
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_defaults_to_proposed() {
    let gov = governance().await;
    let record = create(&gov, "prj", "Storage engine").await;

    assert!(record.id.starts_with("dec-"));
    assert_eq!(record.status, DecisionStatus::Proposed);
    assert!(!record.is_chained());
    assert_eq!(gov.get_decision_by_id(&record.id).await.unwrap(), record);
}

#[tokio::test]
async fn create_accepts_accepted_but_not_deprecated() {
    let gov = governance().await;

    let accepted = gov
        .create_decision(NewDecision {
            status: Some(DecisionStatus::Accepted),
            ..new_decision("prj", "a")
        })
        .await
        .unwrap();
    assert_eq!(accepted.status, DecisionStatus::Accepted);

    let result = gov
        .create_decision(NewDecision {
            status: Some(DecisionStatus::Deprecated),
            ..new_decision("prj", "b")
        })
        .await;
    assert!(matches!(result, Err(GovernanceError::Validation(_))));
}

#[tokio::test]
async fn create_rejects_blank_fields() {
    let gov = governance().await;
    let result = gov
        .create_decision(NewDecision {
            rationale: "   ".to_string(),
            ..new_decision("prj", "t")
        })
        .await;
    match result {
        Err(GovernanceError::Validation(message)) => assert!(message.contains("rationale")),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn create_links_components_atomically() {
    let gov = governance().await;
    let api = gov
        .register_component("prj", "api", ComponentKind::Service)
        .await
        .unwrap();

    let result = gov
        .create_decision(NewDecision {
            linked_component_ids: vec![api.id.clone(), "cmp-missing".to_string()],
            ..new_decision("prj", "t")
        })
        .await;
    assert!(matches!(result, Err(GovernanceError::Validation(_))));
    assert!(gov.get_decisions_by_project("prj", None).await.unwrap().is_empty());
    assert!(gov.get_decisions_by_component(&api.id).await.unwrap().is_empty());

    let record = gov
        .create_decision(NewDecision {
            linked_component_ids: vec![api.id.clone(), api.id.clone()],
            ..new_decision("prj", "t")
        })
        .await
        .unwrap();
    let linked = gov.get_decisions_by_component(&api.id).await.unwrap();
    assert_eq!(linked, vec![record]);
}

#[tokio::test]
async fn create_rejects_component_of_other_project() {
    let gov = governance().await;
    let foreign = gov
        .register_component("other", "db", ComponentKind::Database)
        .await
        .unwrap();

    let result = gov
        .create_decision(NewDecision {
            linked_component_ids: vec![foreign.id],
            ..new_decision("prj", "t")
        })
        .await;
    assert!(matches!(result, Err(GovernanceError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_follows_transition_graph() {
    let gov = governance().await;
    let record = create(&gov, "prj", "t").await;

    let accepted = gov
        .update_decision(
            &record.id,
            DecisionUpdateBuilder::new()
                .status(DecisionStatus::Accepted)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(accepted.status, DecisionStatus::Accepted);

    let back = gov
        .update_decision(
            &record.id,
            DecisionUpdateBuilder::new()
                .status(DecisionStatus::Proposed)
                .build(),
        )
        .await;
    assert!(matches!(back, Err(GovernanceError::InvalidState { .. })));

    let superseded = gov
        .update_decision(
            &record.id,
            DecisionUpdateBuilder::new()
                .status(DecisionStatus::Superseded)
                .build(),
        )
        .await;
    assert!(matches!(superseded, Err(GovernanceError::InvalidState { .. })));
    assert_superseded_invariant(&gov, "prj").await;
}

#[tokio::test]
async fn superseded_content_is_frozen() {
    let gov = governance().await;
    let old = create(&gov, "prj", "old").await;
    let new = create(&gov, "prj", "new").await;
    gov.supersede(&old.id, &new.id).await.unwrap();

    let result = gov
        .update_decision(&old.id, DecisionUpdateBuilder::new().rationale("rewrite").build())
        .await;
    match result {
        Err(GovernanceError::InvalidState { id, status, .. }) => {
            assert_eq!(id, old.id);
            assert_eq!(status, DecisionStatus::Superseded);
        }
        other => panic!("expected InvalidState, got {other:?}"),
    }

    let renamed = gov
        .update_decision(
            &old.id,
            DecisionUpdateBuilder::new()
                .title("old (historical)")
                .tags(["history".to_string()].into())
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "old (historical)");
    assert_eq!(renamed.rationale, old.rationale);
}

#[tokio::test]
async fn empty_update_returns_record_unchanged() {
    let gov = governance().await;
    let record = create(&gov, "prj", "t").await;

    let same = gov
        .update_decision(&record.id, DecisionUpdateBuilder::new().build())
        .await
        .unwrap();
    assert_eq!(same, record);
}

#[tokio::test]
async fn update_missing_is_not_found() {
    let gov = governance().await;
    let result = gov
        .update_decision("dec-missing", DecisionUpdateBuilder::new().title("x").build())
        .await;
    assert!(matches!(
        result,
        Err(GovernanceError::NotFound {
            entity_type: EntityType::Decision,
            ..
        })
    ));
}

// ---------------------------------------------------------------------------
// Supersede
// ---------------------------------------------------------------------------

#[tokio::test]
async fn supersede_sets_both_pointers() {
    let gov = governance().await;
    let old = create(&gov, "prj", "old").await;
    let new = create(&gov, "prj", "new").await;

    let outcome = gov.supersede(&old.id, &new.id).await.unwrap();
    assert_eq!(outcome.superseded.status, DecisionStatus::Superseded);
    assert_eq!(outcome.superseded.superseded_by.as_deref(), Some(new.id.as_str()));
    assert_eq!(outcome.successor.supersedes.as_deref(), Some(old.id.as_str()));
    assert_eq!(outcome.successor.status, DecisionStatus::Proposed);
    assert_superseded_invariant(&gov, "prj").await;
}

#[tokio::test]
async fn concurrent_supersedes_of_one_record_have_one_winner() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;
    let c = create(&gov, "prj", "c").await;

    let (via_b, via_c) = tokio::join!(gov.supersede(&a.id, &b.id), gov.supersede(&a.id, &c.id));
    let (winner, loser, lost) = match (via_b, via_c) {
        (Ok(_), Err(e)) => (&b, &c, e),
        (Err(e), Ok(_)) => (&c, &b, e),
        other => panic!("expected exactly one winner, got {other:?}"),
    };
    assert!(matches!(lost, GovernanceError::InvalidState { ref id, .. } if *id == a.id));

    let a_after = gov.get_decision_by_id(&a.id).await.unwrap();
    assert_eq!(a_after.superseded_by.as_deref(), Some(winner.id.as_str()));
    let loser_after = gov.get_decision_by_id(&loser.id).await.unwrap();
    assert_eq!(loser_after.supersedes, None);
    assert_superseded_invariant(&gov, "prj").await;
}

#[tokio::test]
async fn reads_never_see_an_open_supersede() {
    let store = Store::open_local(":memory:", Duration::from_millis(50))
        .await
        .unwrap();
    let gov = Governance::new(store, RiskConfig::default()).unwrap();
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;

    // first half of the edge written, second half not yet
    let tx = gov.store().begin_write().await.unwrap();
    assert_eq!(
        tx.repo()
            .mark_superseded(&a.id, &b.id, chrono::Utc::now())
            .await
            .unwrap(),
        1
    );

    let read = gov.get_decision_by_id(&a.id).await;
    assert!(matches!(
        read,
        Err(GovernanceError::StorageTimeout {
            operation: "acquire read gate",
            ..
        })
    ));
    assert!(gov.get_decisions_by_project("prj", None).await.is_err());
    assert!(gov.get_supersession_chain(&a.id).await.is_err());
    tx.rollback().await;

    assert_eq!(gov.get_decision_by_id(&a.id).await.unwrap(), a);
    assert_superseded_invariant(&gov, "prj").await;
}

#[tokio::test]
async fn read_racing_a_supersede_sees_before_or_after() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;

    let (written, read) = tokio::join!(gov.supersede(&a.id, &b.id), async {
        tokio::task::yield_now().await;
        (
            gov.get_decision_by_id(&a.id).await.unwrap(),
            gov.get_decision_by_id(&b.id).await.unwrap(),
        )
    });
    written.unwrap();

    let (a_seen, b_seen) = read;
    let before = a_seen.superseded_by.is_none() && b_seen.supersedes.is_none();
    let after = a_seen.superseded_by.as_deref() == Some(b.id.as_str())
        && b_seen.supersedes.as_deref() == Some(a.id.as_str());
    assert!(before || after, "torn read: {a_seen:?} / {b_seen:?}");
}

#[tokio::test]
async fn committed_supersession_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keel.db");
    let path = path.to_str().unwrap();

    let (a, b) = {
        let store = Store::open_local(path, Duration::from_secs(5)).await.unwrap();
        let gov = Governance::new(store, RiskConfig::default()).unwrap();
        let a = create(&gov, "prj", "a").await;
        let b = create(&gov, "prj", "b").await;
        gov.supersede(&a.id, &b.id).await.unwrap();
        (a, b)
    };

    let store = Store::open_local(path, Duration::from_secs(5)).await.unwrap();
    let gov = Governance::new(store, RiskConfig::default()).unwrap();
    let chain: Vec<String> = gov
        .get_supersession_chain(&b.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(chain, vec![a.id, b.id]);
}

#[tokio::test]
async fn stored_cycle_blocks_new_edges() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;
    let c = create(&gov, "prj", "c").await;
    let d = create(&gov, "prj", "d").await;

    let tx = gov.store().begin_write().await.unwrap();
    for (id, other) in [(&a.id, &b.id), (&b.id, &a.id)] {
        tx.repo()
            .conn()
            .execute(
                "UPDATE decisions SET status = 'superseded', supersedes = ?2, superseded_by = ?2 WHERE id = ?1",
                [id.as_str(), other.as_str()],
            )
            .await
            .unwrap();
    }
    tx.commit().await.unwrap();

    let err = gov.supersede(&c.id, &d.id).await.unwrap_err();
    match err {
        GovernanceError::Cycle { path, .. } => {
            assert_eq!(path.len(), 3);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected Cycle, got {other:?}"),
    }
    assert!(!gov.get_decision_by_id(&c.id).await.unwrap().is_chained());
}

#[tokio::test]
async fn reverse_supersede_is_a_cycle() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;
    gov.supersede(&a.id, &b.id).await.unwrap();

    let result = gov.supersede(&b.id, &a.id).await;
    match result {
        Err(GovernanceError::Cycle { path, .. }) => {
            assert_eq!(path, vec![a.id.clone(), b.id.clone(), a.id.clone()]);
        }
        other => panic!("expected Cycle, got {other:?}"),
    }
    assert_eq!(
        gov.get_decision_by_id(&b.id).await.unwrap().status,
        DecisionStatus::Proposed
    );
}

#[tokio::test]
async fn supersede_already_superseded_leaves_store_unchanged() {
    let gov = governance().await;
    let d1 = create(&gov, "prj", "d1").await;
    let d2 = create(&gov, "prj", "d2").await;
    let d3 = create(&gov, "prj", "d3").await;
    gov.supersede(&d1.id, &d2.id).await.unwrap();
    let before = gov.get_decisions_by_project("prj", None).await.unwrap();

    let result = gov.supersede(&d1.id, &d3.id).await;
    assert!(matches!(result, Err(GovernanceError::InvalidState { .. })));

    let after = gov.get_decisions_by_project("prj", None).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn supersede_rejects_self_missing_and_foreign() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let foreign = create(&gov, "other", "f").await;

    assert!(matches!(
        gov.supersede(&a.id, &a.id).await,
        Err(GovernanceError::InvalidState { .. })
    ));
    assert!(matches!(
        gov.supersede(&a.id, "dec-missing").await,
        Err(GovernanceError::NotFound { .. })
    ));
    assert!(matches!(
        gov.supersede("dec-missing", &a.id).await,
        Err(GovernanceError::NotFound { .. })
    ));
    assert!(matches!(
        gov.supersede(&a.id, &foreign.id).await,
        Err(GovernanceError::Validation(_))
    ));
}

#[tokio::test]
async fn successor_cannot_supersede_twice() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;
    let c = create(&gov, "prj", "c").await;
    gov.supersede(&a.id, &b.id).await.unwrap();

    let result = gov.supersede(&c.id, &b.id).await;
    match result {
        Err(GovernanceError::InvalidState { id, .. }) => assert_eq!(id, b.id),
        other => panic!("expected InvalidState, got {other:?}"),
    }
    assert_eq!(
        gov.get_decision_by_id(&c.id).await.unwrap().status,
        DecisionStatus::Proposed
    );
}

#[tokio::test]
async fn deprecated_cannot_be_superseded() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;
    gov.update_decision(
        &a.id,
        DecisionUpdateBuilder::new()
            .status(DecisionStatus::Deprecated)
            .build(),
    )
    .await
    .unwrap();

    assert!(matches!(
        gov.supersede(&a.id, &b.id).await,
        Err(GovernanceError::InvalidState { .. })
    ));
}

// ---------------------------------------------------------------------------
// Chain walk
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chain_is_the_same_from_every_member() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;
    let c = create(&gov, "prj", "c").await;
    gov.supersede(&a.id, &b.id).await.unwrap();
    gov.supersede(&b.id, &c.id).await.unwrap();

    let expected = vec![a.id.clone(), b.id.clone(), c.id.clone()];
    for id in &expected {
        let chain: Vec<String> = gov
            .get_supersession_chain(id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(chain, expected, "chain from {id}");
    }
    assert_superseded_invariant(&gov, "prj").await;
}

#[tokio::test]
async fn unchained_record_is_its_own_chain() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    assert_eq!(gov.get_supersession_chain(&a.id).await.unwrap(), vec![a]);
}

// ---------------------------------------------------------------------------
// Detach and delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_requires_detach_first() {
    let gov = governance().await;
    let api = gov
        .register_component("prj", "api", ComponentKind::Service)
        .await
        .unwrap();
    let d1 = gov
        .create_decision(NewDecision {
            linked_component_ids: vec![api.id.clone()],
            ..new_decision("prj", "d1")
        })
        .await
        .unwrap();
    let d2 = create(&gov, "prj", "d2").await;
    gov.supersede(&d1.id, &d2.id).await.unwrap();

    assert!(matches!(
        gov.delete_decision(&d1.id).await,
        Err(GovernanceError::InvalidState { .. })
    ));
    assert!(matches!(
        gov.delete_decision(&d2.id).await,
        Err(GovernanceError::InvalidState { .. })
    ));

    let detached = gov.detach_supersession(&d1.id).await.unwrap();
    assert_eq!(detached.status, DecisionStatus::Deprecated);
    assert!(!detached.is_chained());
    assert!(!gov.get_decision_by_id(&d2.id).await.unwrap().is_chained());

    gov.delete_decision(&d1.id).await.unwrap();
    assert!(matches!(
        gov.get_decision_by_id(&d1.id).await,
        Err(GovernanceError::NotFound { .. })
    ));
    assert!(gov.get_decisions_by_component(&api.id).await.unwrap().is_empty());
    assert_superseded_invariant(&gov, "prj").await;
}

#[tokio::test]
async fn detach_requires_superseded() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    assert!(matches!(
        gov.detach_supersession(&a.id).await,
        Err(GovernanceError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn delete_missing_is_not_found() {
    let gov = governance().await;
    assert!(matches!(
        gov.delete_decision("dec-missing").await,
        Err(GovernanceError::NotFound { .. })
    ));
}

// ---------------------------------------------------------------------------
// Audit and timeouts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mutations_are_audited() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let b = create(&gov, "prj", "b").await;
    gov.supersede(&a.id, &b.id).await.unwrap();

    let entries = gov
        .audit_log(&AuditFilter {
            entity_id: Some(a.id.clone()),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Superseded, AuditAction::Created]);
    assert_eq!(
        entries[0].detail,
        Some(serde_json::json!({"old_id": a.id, "new_id": b.id}))
    );
}

#[tokio::test]
async fn failed_mutation_leaves_no_audit() {
    let gov = governance().await;
    let a = create(&gov, "prj", "a").await;
    let result = gov
        .update_decision(
            &a.id,
            DecisionUpdateBuilder::new()
                .status(DecisionStatus::Superseded)
                .build(),
        )
        .await;
    assert!(matches!(result, Err(GovernanceError::InvalidState { .. })));

    let entries = gov
        .audit_log(&AuditFilter {
            entity_id: Some(a.id.clone()),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn blocked_writer_surfaces_storage_timeout() {
    let store = Store::open_local(":memory:", Duration::from_millis(50))
        .await
        .unwrap();
    let gov = Governance::new(store, RiskConfig::default()).unwrap();

    let held = gov.store().begin_write().await.unwrap();
    let result = gov.create_decision(new_decision("prj", "t")).await;
    assert!(matches!(result, Err(GovernanceError::StorageTimeout { .. })));
    held.rollback().await;

    create(&gov, "prj", "t").await;
}
