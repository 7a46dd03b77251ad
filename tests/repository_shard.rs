mod common;

use futures::TryStreamExt;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use subdomain_registry::application::services::ProjectorService;
use subdomain_registry::domain::entities::{ShardDocument, ShardKey, UniqueKind};
use subdomain_registry::domain::repositories::{LabelUpsert, ShardRepository, UniqueRepository};
use subdomain_registry::infrastructure::persistence::{PgShardRepository, PgUniqueRepository};

const NO_CAP: u64 = 16 * 1024 * 1024;

#[sqlx::test]
async fn test_add_label_creates_then_appends(pool: PgPool) {
    let repo = PgShardRepository::new(Arc::new(pool));
    let key = ShardKey::new("example", "com", 0);

    assert_eq!(
        repo.add_label(&key, "www", NO_CAP).await.unwrap(),
        LabelUpsert::Created
    );
    assert_eq!(
        repo.add_label(&key, "api", NO_CAP).await.unwrap(),
        LabelUpsert::Added
    );
    assert_eq!(
        repo.add_label(&key, "www", NO_CAP).await.unwrap(),
        LabelUpsert::AlreadyPresent
    );

    let docs: Vec<ShardDocument> = repo.family("example", "com").try_collect().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].labels.len(), 2);
}

#[sqlx::test]
async fn test_add_label_reports_full_shard(pool: PgPool) {
    let repo = PgShardRepository::new(Arc::new(pool));
    let key = ShardKey::new("example", "com", 0);
    let cap = common::one_label_cap("example", "com", 3);

    repo.add_label(&key, "aaa", cap).await.unwrap();

    assert_eq!(
        repo.add_label(&key, "bbb", cap).await.unwrap(),
        LabelUpsert::ShardFull
    );
    assert_eq!(
        repo.add_label(&key, "aaa", cap).await.unwrap(),
        LabelUpsert::AlreadyPresent
    );
    assert_eq!(
        repo.add_label(&key.next(), "bbb", cap).await.unwrap(),
        LabelUpsert::Created
    );
}

#[sqlx::test]
async fn test_size_bytes_tracks_size_model(pool: PgPool) {
    let pool = Arc::new(pool);
    let repo = PgShardRepository::new(pool.clone());
    let key = ShardKey::new("example", "com", 0);

    repo.add_label(&key, "www", NO_CAP).await.unwrap();
    repo.add_label(&key, "mail", NO_CAP).await.unwrap();

    let size: i64 = sqlx::query_scalar("SELECT size_bytes FROM shards WHERE domain = 'example'")
        .fetch_one(pool.as_ref())
        .await
        .unwrap();

    let mut doc = ShardDocument::new("example", "com", 0);
    doc.labels.insert("www".to_string());
    doc.labels.insert("mail".to_string());
    assert_eq!(size as u64, doc.encoded_size());
}

#[sqlx::test]
async fn test_concurrent_adds_to_same_shard(pool: PgPool) {
    let repo = Arc::new(PgShardRepository::new(Arc::new(pool)));
    let key = ShardKey::new("example", "com", 0);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            let key = key.clone();
            tokio::spawn(async move { repo.add_label(&key, &format!("host{i}"), NO_CAP).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let docs: Vec<ShardDocument> = repo.family("example", "com").try_collect().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].labels.len(), 8);
}

#[sqlx::test]
async fn test_find_label_shard(pool: PgPool) {
    let repo = PgShardRepository::new(Arc::new(pool));
    repo.add_label(&ShardKey::new("example", "com", 0), "a", NO_CAP)
        .await
        .unwrap();
    repo.add_label(&ShardKey::new("example", "com", 1), "b", NO_CAP)
        .await
        .unwrap();

    assert_eq!(
        repo.find_label_shard("example", "com", "b").await.unwrap(),
        Some(1)
    );
    assert_eq!(
        repo.find_label_shard("example", "com", "c").await.unwrap(),
        None
    );
    assert_eq!(
        repo.find_label_shard("example", "org", "a").await.unwrap(),
        None
    );
}

#[sqlx::test]
async fn test_family_scan_and_counts(pool: PgPool) {
    let repo = PgShardRepository::new(Arc::new(pool));
    for (domain, suffix, shard, label) in [
        ("example", "com", 1, "b"),
        ("example", "com", 0, "a"),
        ("example", "co.uk", 0, "www"),
        ("other", "org", 0, ""),
    ] {
        repo.add_label(&ShardKey::new(domain, suffix, shard), label, NO_CAP)
            .await
            .unwrap();
    }

    let family: Vec<ShardDocument> = repo.family("example", "com").try_collect().await.unwrap();
    assert_eq!(
        family.iter().map(|d| d.shard).collect::<Vec<_>>(),
        vec![0, 1]
    );

    let all: Vec<ShardDocument> = repo.scan().try_collect().await.unwrap();
    assert_eq!(all.len(), 4);

    let suffixes = repo.find_suffixes("example").await.unwrap();
    assert_eq!(
        suffixes.into_iter().collect::<Vec<_>>(),
        vec!["co.uk", "com"]
    );

    assert_eq!(repo.count_family("example", "com").await.unwrap(), 2);
    assert_eq!(repo.count_documents().await.unwrap(), 4);
    assert!(repo.health_check().await);
}

async fn seed_domains(pool: &PgPool, count: i32) {
    sqlx::query(
        r#"
        INSERT INTO shards (domain, suffix, shard, labels, size_bytes)
        SELECT 'd' || g, 'com', 0, ARRAY['www'], 100
        FROM generate_series(1, $1) AS g
        "#,
    )
    .bind(count)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test]
async fn test_scan_reads_every_page(pool: PgPool) {
    seed_domains(&pool, 1_201).await;
    let repo = PgShardRepository::new(Arc::new(pool));

    let all: Vec<ShardDocument> = repo.scan().try_collect().await.unwrap();
    assert_eq!(all.len(), 1_201);

    let domains: BTreeSet<&str> = all.iter().map(|d| d.domain.as_str()).collect();
    assert_eq!(domains.len(), 1_201);
}

#[sqlx::test]
async fn test_projector_runs_on_single_connection_pool(pool: PgPool) {
    seed_domains(&pool, 600).await;

    let single = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(2))
        .connect_with((*pool.connect_options()).clone())
        .await
        .unwrap();
    let single = Arc::new(single);

    let uniques = Arc::new(PgUniqueRepository::new(single.clone()));
    let projector = ProjectorService::new(
        Arc::new(PgShardRepository::new(single)),
        uniques.clone(),
        Duration::from_secs(5),
    );

    let summary = projector.run().await.unwrap();

    assert_eq!(summary.documents_scanned, 600);
    assert_eq!(uniques.count(UniqueKind::Domain).await.unwrap(), 600);
    assert_eq!(uniques.count(UniqueKind::Sub).await.unwrap(), 1);
}
