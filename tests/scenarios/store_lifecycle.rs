//! Test: Store Lifecycle - status, items and error across operations

use crate::helpers::*;
use stagecraft::{RecordPatch, RecordStore, RequestStatus, TransportError};
use std::sync::Arc;

fn failure(message: &str) -> TransportError {
    TransportError::Request(message.to_string())
}

#[tokio::test]
async fn test_initial_state() {
    let store = RecordStore::new(ScriptedGateway::new());
    let state = store.snapshot();

    assert!(state.items.is_empty());
    assert_eq!(state.status, RequestStatus::Idle);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_fetch_success_replaces_items() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0), record("2", "Desk", 120.0)]));
    let store = RecordStore::new(gateway);

    let status = store.fetch_all().await;

    let state = store.snapshot();
    assert_eq!(status, RequestStatus::Succeeded);
    assert_eq!(state.status, RequestStatus::Succeeded);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[0].id, "1");
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_fetch_failure_keeps_items() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0)]));
    gateway.on_fetch(Err(failure("Failed to fetch products")));
    let store = RecordStore::new(gateway);

    store.fetch_all().await;
    let status = store.fetch_all().await;

    let state = store.snapshot();
    assert_eq!(status, RequestStatus::Failed);
    assert_eq!(state.status, RequestStatus::Failed);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch products"));
    assert_eq!(state.items, vec![record("1", "Lamp", 25.0)]);
}

#[tokio::test]
async fn test_refetch_clears_previous_error() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Err(failure("Failed to fetch products")));
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0)]));
    let store = RecordStore::new(gateway);

    store.fetch_all().await;
    assert!(store.snapshot().error.is_some());

    store.fetch_all().await;
    let state = store.snapshot();
    assert_eq!(state.status, RequestStatus::Succeeded);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_fetch_is_pending_while_in_flight() {
    let gateway = GatedGateway::new();
    let gate = gateway.gate();
    let store = RecordStore::new(gateway.clone());

    let fetching = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });
    gateway.wait_for_fetches(1).await;

    let state = store.snapshot();
    assert_eq!(state.status, RequestStatus::Pending);
    assert!(state.is_loading());
    assert_eq!(state.error, None);

    gate.send(Ok(vec![record("1", "Lamp", 25.0)])).unwrap();
    assert_eq!(fetching.await.unwrap(), RequestStatus::Succeeded);
    assert_eq!(store.snapshot().items.len(), 1);
}

#[tokio::test]
async fn test_add_appends_and_leaves_status() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0)]));
    gateway.on_create(Ok(record("9", "Chair", 40.0)));
    let store = RecordStore::new(gateway);
    store.fetch_all().await;

    let added = store.add(fields("Chair", 40.0)).await.unwrap();

    let state = store.snapshot();
    assert_eq!(added.id, "9");
    assert_eq!(
        state.items.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "9"]
    );
    assert_eq!(state.status, RequestStatus::Succeeded);
}

#[tokio::test]
async fn test_add_failure_leaves_state_untouched() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0)]));
    gateway.on_create(Err(failure("Failed to add product")));
    let store = RecordStore::new(gateway);
    store.fetch_all().await;
    let before = store.snapshot();

    let err = store.add(fields("Chair", 40.0)).await.unwrap_err();

    assert_eq!(err.message(), "Failed to add product");
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![
        record("1", "Lamp", 25.0),
        record("2", "Desk", 120.0),
        record("3", "Rug", 60.0),
    ]));
    gateway.on_patch(Ok(record("2", "Desk", 99.0)));
    let store = RecordStore::new(gateway.clone());
    store.fetch_all().await;

    let updated = store
        .update("2", RecordPatch::default().price(99.0))
        .await
        .unwrap();

    let state = store.snapshot();
    assert_eq!(updated.fields.price, 99.0);
    assert_eq!(state.items.len(), 3);
    assert_eq!(state.items[1], record("2", "Desk", 99.0));
    assert_eq!(state.items[0], record("1", "Lamp", 25.0));
    assert_eq!(state.items[2], record("3", "Rug", 60.0));

    let calls = gateway.patch_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "2");
    assert_eq!(calls[0].1.price, Some(99.0));
}

#[tokio::test]
async fn test_update_of_unknown_id_changes_nothing() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0)]));
    gateway.on_patch(Ok(record("7", "Ghost", 1.0)));
    let store = RecordStore::new(gateway);
    store.fetch_all().await;
    let before = store.snapshot();

    let returned = store
        .update("7", RecordPatch::default().name("Ghost"))
        .await
        .unwrap();

    assert_eq!(returned.id, "7");
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_update_failure_surfaces_to_caller() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0)]));
    gateway.on_patch(Err(failure("Failed to update product")));
    let store = RecordStore::new(gateway);
    store.fetch_all().await;
    let before = store.snapshot();

    let result = store.update("1", RecordPatch::default().stock(0)).await;

    assert_eq!(result, Err(failure("Failed to update product")));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_reset_restores_initial_state() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Err(failure("Failed to fetch products")));
    let store = RecordStore::new(gateway);
    store.fetch_all().await;

    store.reset();

    let state = store.snapshot();
    assert!(state.items.is_empty());
    assert_eq!(state.status, RequestStatus::Idle);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_subscribers_see_transitions() {
    let gateway = GatedGateway::new();
    let gate = gateway.gate();
    let store = RecordStore::new(gateway.clone());
    let mut updates = store.subscribe();

    let fetching = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });

    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().status, RequestStatus::Pending);

    gate.send(Err(failure("Failed to fetch products"))).unwrap();
    fetching.await.unwrap();

    updates.changed().await.unwrap();
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.status, RequestStatus::Failed);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch products"));
}

#[tokio::test]
async fn test_clones_share_state() {
    let gateway = ScriptedGateway::new();
    gateway.on_fetch(Ok(vec![record("1", "Lamp", 25.0)]));
    let store = RecordStore::new(gateway);
    let other = store.clone();

    store.fetch_all().await;

    assert_eq!(other.snapshot().items.len(), 1);
    assert!(Arc::ptr_eq(store.gateway(), other.gateway()));
}

#[tokio::test]
async fn test_seeded_source_never_serves_duplicate_ids() {
    use stagecraft::InMemoryGateway;

    let rejected = InMemoryGateway::new()
        .with_records(vec![record("1", "Lamp", 25.0), record("1", "Desk", 120.0)]);
    assert!(rejected.is_err());

    let gateway = InMemoryGateway::new()
        .with_records(vec![record("1", "Lamp", 25.0), record("2", "Desk", 120.0)])
        .unwrap();
    let store = RecordStore::new(Arc::new(gateway));
    store.fetch_all().await;

    let ids: Vec<String> = store.snapshot().items.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["1", "2"]);
}
