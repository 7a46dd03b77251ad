mod common;

use std::collections::BTreeSet;
use subdomain_registry::domain::entities::{ShardKey, UniqueKind};
use subdomain_registry::domain::repositories::ShardRepository;
use subdomain_registry::error::AppError;

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_insert_is_idempotent() {
    let (state, stores) = common::create_memory_state(16 * 1024 * 1024);

    state.shard_service.insert("www.example.com").await.unwrap();
    let first = state.shard_service.lookup("example.com").await.unwrap();
    let documents = stores.shards.count_documents().await.unwrap();

    state.shard_service.insert("www.example.com").await.unwrap();
    let second = state.shard_service.lookup("example.com").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(stores.shards.count_documents().await.unwrap(), documents);
}

#[tokio::test]
async fn test_lookup_returns_union_including_apex() {
    let state = common::create_test_state();
    common::insert_all(&state, &["a.example.com", "b.example.com", "example.com"]).await;

    let labels = state.shard_service.lookup("example.com").await.unwrap();

    assert_eq!(labels, set(&["a", "b", ""]));
}

#[tokio::test]
async fn test_overflow_splits_into_shards() {
    // Two one-byte labels do not fit into one shard.
    let cap = common::one_label_cap("example", "com", 1);
    let (state, stores) = common::create_memory_state(cap);

    common::insert_all(&state, &["a.example.com", "b.example.com", "c.example.com"]).await;

    assert!(stores.shards.count_family("example", "com").await.unwrap() >= 2);
    assert_eq!(
        state.shard_service.lookup("example.com").await.unwrap(),
        set(&["a", "b", "c"])
    );
}

#[tokio::test]
async fn test_reinsert_does_not_duplicate_across_shards() {
    let cap = common::one_label_cap("example", "com", 1);
    let (state, stores) = common::create_memory_state(cap);

    common::insert_all(&state, &["a.example.com", "b.example.com"]).await;
    let before = stores.shards.count_family("example", "com").await.unwrap();

    let outcome = state.shard_service.insert("a.example.com").await.unwrap();
    assert_eq!(outcome.shard, 0);

    assert_eq!(
        stores.shards.count_family("example", "com").await.unwrap(),
        before
    );

    let shard1 = stores
        .shards
        .get(&ShardKey::new("example", "com", 1))
        .unwrap();
    assert!(!shard1.labels.contains("a"));
}

#[tokio::test]
async fn test_invalid_input_is_rejected_without_side_effects() {
    let (state, stores) = common::create_memory_state(16 * 1024 * 1024);

    let err = state.shard_service.insert("not a domain!!").await.unwrap_err();
    assert!(err.is_domain_error());
    assert!(matches!(err, AppError::InvalidDomain { .. }));

    let err = state.shard_service.lookup("com").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidDomain { .. }));

    assert_eq!(stores.shards.count_documents().await.unwrap(), 0);
}

#[tokio::test]
async fn test_projector_converges() {
    let (state, stores) = common::create_memory_state(16 * 1024 * 1024);
    common::insert_all(
        &state,
        &["www.example.com", "api.example.co.uk", "example.org"],
    )
    .await;

    state.projector_service.run().await.unwrap();
    let first: Vec<_> = UniqueKind::ALL
        .iter()
        .map(|kind| stores.uniques.snapshot(*kind))
        .collect();

    let summary = state.projector_service.run().await.unwrap();
    let second: Vec<_> = UniqueKind::ALL
        .iter()
        .map(|kind| stores.uniques.snapshot(*kind))
        .collect();

    assert_eq!(summary.total_new(), 0);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_end_to_end_unknown_tld() {
    let (state, stores) = common::create_memory_state(16 * 1024 * 1024);
    common::insert_all(&state, &["www.test.example", "api.test.example", "test.example"]).await;

    let labels = state.shard_service.lookup("test.example").await.unwrap();
    assert_eq!(labels, set(&["www", "api", ""]));

    state.projector_service.run().await.unwrap();

    assert!(stores.uniques.snapshot(UniqueKind::Domain).contains("test"));
    assert_eq!(
        stores.uniques.snapshot(UniqueKind::FullDomain),
        set(&["test.example", "www.test.example", "api.test.example"])
    );
    assert_eq!(
        stores.uniques.snapshot(UniqueKind::Sub),
        set(&["www", "api"])
    );
}

#[tokio::test]
async fn test_concurrent_inserts_keep_every_label() {
    let cap = common::one_label_cap("example", "com", 2) * 3;
    let (state, _stores) = common::create_memory_state(cap);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let service = state.shard_service.clone();
            tokio::spawn(async move { service.insert(&format!("h{i:02}.example.com")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let labels = state.shard_service.lookup("example.com").await.unwrap();
    assert_eq!(labels.len(), 20);
}
