#![allow(dead_code)]

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use note_service::application::services::NoteService;
use note_service::config::StorageMode;
use note_service::domain::entities::NoteInfo;
use note_service::infrastructure::cache::MemoryNoteRepository;
use note_service::infrastructure::persistence::PgNoteRepository;
use note_service::infrastructure::transaction::TxManager;
use note_service::state::AppState;

pub fn note_info(title: &str) -> NoteInfo {
    NoteInfo::new(title, "body", "author", false)
}

pub async fn count_notes(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM notes")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn count_notes_titled(pool: &PgPool, title: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE title = $1")
        .bind(title)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn pg_service(pool: PgPool) -> NoteService {
    let pool = Arc::new(pool);
    NoteService::new(
        Arc::new(PgNoteRepository::new(pool.clone())),
        TxManager::postgres(pool),
    )
}

pub fn memory_service() -> NoteService {
    NoteService::new(
        Arc::new(MemoryNoteRepository::new()),
        TxManager::passthrough(),
    )
}

pub fn create_test_state() -> AppState {
    AppState::new(
        Arc::new(memory_service()),
        StorageMode::Memory,
        Duration::from_secs(5),
    )
}

pub fn create_pg_test_state(pool: PgPool) -> AppState {
    AppState::new(
        Arc::new(pg_service(pool)),
        StorageMode::Postgres,
        Duration::from_secs(5),
    )
}
