//! Tests against a live Redis. Run with `REDIS_URL=redis://localhost:6379 cargo test -- --ignored`.

use note_service::context::Context;
use note_service::domain::entities::{NoteInfo, UpdateNoteInfo};
use note_service::domain::repositories::NoteRepository;
use note_service::error::NoteError;
use note_service::infrastructure::cache::RedisNoteRepository;
use redis::AsyncCommands;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

fn unique_prefix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test:{nanos}:note:")
}

async fn repo_with_prefix(prefix: &str) -> RedisNoteRepository {
    RedisNoteRepository::connect(&redis_url(), Some(300))
        .await
        .unwrap()
        .with_key_prefix(prefix)
}

async fn repo() -> RedisNoteRepository {
    repo_with_prefix(&unique_prefix()).await
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_create_get_update_delete() {
    let repo = repo().await;
    let ctx = Context::new();

    let id = repo
        .create(&ctx, NoteInfo::new("T", "B", "A", true))
        .await
        .unwrap();
    assert_eq!(id, 1);

    let note = repo.get(&ctx, id).await.unwrap();
    assert_eq!(note.info.title, "T");
    assert_eq!(note.created_at, note.updated_at);

    let patch = UpdateNoteInfo {
        body: Some("B2".to_string()),
        ..Default::default()
    };
    let updated = repo.update(&ctx, id, patch).await.unwrap();
    assert_eq!(updated.info.body, "B2");
    assert_eq!(updated.info.title, "T");
    assert!(updated.updated_at >= updated.created_at);

    repo.delete(&ctx, id).await.unwrap();
    assert!(matches!(
        repo.get(&ctx, id).await,
        Err(NoteError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_missing_note_is_not_found() {
    let repo = repo().await;
    let ctx = Context::new();

    assert!(repo.get(&ctx, 2).await.unwrap_err().is_not_found());
    assert!(repo.delete(&ctx, 2).await.unwrap_err().is_not_found());

    let patch = UpdateNoteInfo {
        title: Some("x".to_string()),
        ..Default::default()
    };
    assert!(repo.update(&ctx, 2, patch).await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_concurrent_creates_get_distinct_ids() {
    let repo = Arc::new(repo().await);

    let handles = (0..50)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create(
                    &Context::new(),
                    NoteInfo::new(format!("n{i}"), "B", "A", false),
                )
                .await
                .unwrap()
            })
        })
        .collect::<Vec<_>>();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }

    assert_eq!(ids.len(), 50);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_health_check() {
    let repo = repo().await;

    assert!(repo.health_check().await);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_unreadable_payloads_are_corrupted() {
    let prefix = unique_prefix();
    let repo = repo_with_prefix(&prefix).await;
    let ctx = Context::new();

    let client = redis::Client::open(redis_url()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: () = conn
        .set_ex(format!("{prefix}1"), vec![0xffu8, 0xfe, 0x00], 300)
        .await
        .unwrap();
    let _: i64 = conn.hset(format!("{prefix}2"), "title", "T").await.unwrap();

    assert!(matches!(
        repo.get(&ctx, 1).await,
        Err(NoteError::CorruptedData(_))
    ));
    assert!(matches!(
        repo.get(&ctx, 2).await,
        Err(NoteError::CorruptedData(_))
    ));

    let _: i64 = conn.del(format!("{prefix}2")).await.unwrap();
}
