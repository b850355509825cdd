//! Composition root and HTTP server lifecycle.
//!
//! Components are built once, in dependency order:
//! config → connections → repository → transaction manager → service → router.
//! The storage backend is chosen here and nowhere else.

use crate::application::services::NoteService;
use crate::config::{Config, StorageMode};
use crate::domain::repositories::NoteRepository;
use crate::infrastructure::cache::{MemoryNoteRepository, RedisNoteRepository};
use crate::infrastructure::persistence::PgNoteRepository;
use crate::infrastructure::transaction::TxManager;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// The repository and transaction manager of the active backend.
pub struct Storage {
    pub repository: Arc<dyn NoteRepository>,
    pub tx_manager: TxManager,
}

/// Connects to the backend selected by `config.storage_mode`.
///
/// - `pg`: builds a pool, applies migrations, pairs [`PgNoteRepository`]
///   with a transactional [`TxManager`]
/// - `redis`: connects a [`RedisNoteRepository`] with a passthrough manager
/// - `memory`: [`MemoryNoteRepository`] with a passthrough manager
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or migrations fail.
pub async fn build_storage(config: &Config) -> Result<Storage> {
    match config.storage_mode {
        StorageMode::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORAGE_MODE is 'pg'")?;
            let pool = connect_pg(config, database_url).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to apply migrations")?;

            let pool = Arc::new(pool);
            Ok(Storage {
                repository: Arc::new(PgNoteRepository::new(pool.clone())),
                tx_manager: TxManager::postgres(pool),
            })
        }
        StorageMode::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL must be set when STORAGE_MODE is 'redis'")?;
            let repository = tokio::time::timeout(
                Duration::from_secs(config.redis_connect_timeout),
                RedisNoteRepository::connect(redis_url, config.redis_note_ttl_seconds),
            )
            .await
            .context("Timed out connecting to Redis")?
            .context("Failed to connect to Redis")?;

            tracing::warn!("Redis backend has no multi-key transactions; updates are best-effort");
            Ok(Storage {
                repository: Arc::new(repository),
                tx_manager: TxManager::passthrough(),
            })
        }
        StorageMode::Memory => {
            tracing::warn!("Using in-memory storage; notes are lost on restart");
            Ok(Storage {
                repository: Arc::new(MemoryNoteRepository::new()),
                tx_manager: TxManager::passthrough(),
            })
        }
    }
}

async fn connect_pg(config: &Config, database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Builds the note service on top of the configured backend.
///
/// # Errors
///
/// See [`build_storage`].
pub async fn build_service(config: &Config) -> Result<NoteService> {
    let storage = build_storage(config).await?;
    Ok(NoteService::new(storage.repository, storage.tx_manager))
}

/// Runs the HTTP server with the given configuration.
///
/// Shuts down gracefully on Ctrl+C.
///
/// # Errors
///
/// Returns an error if:
/// - The storage backend cannot be initialised
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let note_service = Arc::new(build_service(&config).await?);
    let state = AppState::new(note_service, config.storage_mode, config.request_timeout());

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> Config {
        Config {
            storage_mode: StorageMode::Memory,
            database_url: None,
            redis_url: None,
            listen_addr: "127.0.0.1:0".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            request_timeout_ms: 1_000,
            db_max_connections: 10,
            db_connect_timeout: 30,
            db_idle_timeout: 600,
            db_max_lifetime: 1800,
            redis_connect_timeout: 5,
            redis_note_ttl_seconds: None,
        }
    }

    #[tokio::test]
    async fn test_memory_mode_uses_passthrough_manager() {
        let storage = build_storage(&memory_config()).await.unwrap();

        assert!(!storage.tx_manager.is_transactional());
        assert!(storage.repository.health_check().await);
    }

    #[tokio::test]
    async fn test_pg_mode_without_url_fails() {
        let mut config = memory_config();
        config.storage_mode = StorageMode::Postgres;

        assert!(build_storage(&config).await.is_err());
    }
}
