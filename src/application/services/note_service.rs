//! Note orchestration service.

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::domain::entities::{Note, NoteInfo, UpdateNoteInfo};
use crate::domain::repositories::NoteRepository;
use crate::error::NoteError;
use crate::infrastructure::transaction::TxManager;

/// Service for creating, reading and mutating notes.
///
/// Holds exactly one repository and one transaction manager, both chosen at
/// startup. Multi-step operations run as one unit of work through the
/// [`TxManager`], so on PostgreSQL they are all-or-nothing; on Redis they
/// are best-effort.
pub struct NoteService {
    repository: Arc<dyn NoteRepository>,
    tx_manager: TxManager,
}

impl NoteService {
    /// Creates a new note service.
    pub fn new(repository: Arc<dyn NoteRepository>, tx_manager: TxManager) -> Self {
        Self {
            repository,
            tx_manager,
        }
    }

    pub fn tx_manager(&self) -> &TxManager {
        &self.tx_manager
    }

    /// Creates a note and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::InvalidInput`] if a required field is empty, or any
    /// backend error unchanged.
    pub async fn create(&self, ctx: &Context, info: NoteInfo) -> Result<i64, NoteError> {
        let id = self.repository.create(ctx, info).await?;
        debug!("Created note {}", id);
        Ok(id)
    }

    /// Fetches a note by id.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotFound`] if the note does not exist.
    pub async fn get(&self, ctx: &Context, id: i64) -> Result<Note, NoteError> {
        self.repository.get(ctx, id).await
    }

    /// Applies a partial update to an existing note.
    ///
    /// The existence check and the write run in one unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::InvalidInput`] for an empty patch before touching the store.
    /// On a transactional backend, failures inside the unit of work are wrapped in
    /// [`NoteError::TransactionFailed`].
    pub async fn update(
        &self,
        ctx: &Context,
        id: i64,
        patch: UpdateNoteInfo,
    ) -> Result<Note, NoteError> {
        patch.ensure_valid()?;

        let repository = self.repository.clone();
        self.tx_manager
            .run_in_transaction(ctx, move |tx_ctx| async move {
                repository.get(&tx_ctx, id).await?;
                repository.update(&tx_ctx, id, patch).await
            })
            .await
    }

    /// Deletes a note and returns it as it was just before removal.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotFound`] (wrapped on transactional backends) if the
    /// note does not exist.
    pub async fn delete(&self, ctx: &Context, id: i64) -> Result<Note, NoteError> {
        let repository = self.repository.clone();
        self.tx_manager
            .run_in_transaction(ctx, move |tx_ctx| async move {
                let note = repository.get(&tx_ctx, id).await?;
                repository.delete(&tx_ctx, id).await?;
                Ok(note)
            })
            .await
    }

    /// Checks if the active backend is reachable before `ctx` expires.
    ///
    /// A check cut short by cancellation or the deadline reports `false`.
    pub async fn health_check(&self, ctx: &Context) -> bool {
        ctx.run(async { Ok(self.repository.health_check().await) })
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockNoteRepository;
    use crate::infrastructure::cache::MemoryNoteRepository;
    use chrono::Utc;
    use mockall::Sequence;

    fn sample_info() -> NoteInfo {
        NoteInfo::new("T", "B", "A", true)
    }

    fn sample_note(id: i64) -> Note {
        Note::new(id, sample_info(), Utc::now())
    }

    fn service_with(mock: MockNoteRepository) -> NoteService {
        NoteService::new(Arc::new(mock), TxManager::passthrough())
    }

    #[tokio::test]
    async fn test_create_delegates_to_repository() {
        let mut mock = MockNoteRepository::new();
        mock.expect_create()
            .withf(|_, info| info.title == "T" && info.is_public)
            .times(1)
            .returning(|_, _| Ok(1));

        let service = service_with(mock);

        let id = service.create(&Context::new(), sample_info()).await.unwrap();

        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_get_propagates_not_found() {
        let mut mock = MockNoteRepository::new();
        mock.expect_get()
            .times(1)
            .returning(|_, id| Err(NoteError::not_found(id)));

        let service = service_with(mock);

        let result = service.get(&Context::new(), 2).await;

        assert!(matches!(result, Err(NoteError::NotFound { id: 2 })));
    }

    #[tokio::test]
    async fn test_get_propagates_store_errors_unchanged() {
        let mut mock = MockNoteRepository::new();
        mock.expect_get()
            .times(1)
            .returning(|_, _| Err(NoteError::unavailable("connection refused")));

        let service = service_with(mock);

        let result = service.get(&Context::new(), 1).await;

        assert!(matches!(result, Err(NoteError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_update_checks_existence_then_writes() {
        let mut mock = MockNoteRepository::new();
        let mut seq = Sequence::new();

        mock.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, id| Ok(sample_note(id)));
        mock.expect_update()
            .withf(|_, id, patch| *id == 3 && patch.title.as_deref() == Some("new"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, id, _| Ok(sample_note(id)));

        let service = service_with(mock);

        let patch = UpdateNoteInfo {
            title: Some("new".to_string()),
            ..Default::default()
        };
        let note = service.update(&Context::new(), 3, patch).await.unwrap();

        assert_eq!(note.id, 3);
    }

    #[tokio::test]
    async fn test_update_missing_note_skips_write() {
        let mut mock = MockNoteRepository::new();
        mock.expect_get()
            .times(1)
            .returning(|_, id| Err(NoteError::not_found(id)));
        mock.expect_update().times(0);

        let service = service_with(mock);

        let patch = UpdateNoteInfo {
            is_public: Some(false),
            ..Default::default()
        };
        let result = service.update(&Context::new(), 8, patch).await;

        assert!(matches!(result, Err(NoteError::NotFound { id: 8 })));
    }

    #[tokio::test]
    async fn test_update_empty_patch_never_reaches_store() {
        let mut mock = MockNoteRepository::new();
        mock.expect_get().times(0);
        mock.expect_update().times(0);

        let service = service_with(mock);

        let result = service
            .update(&Context::new(), 1, UpdateNoteInfo::default())
            .await;

        assert!(matches!(result, Err(NoteError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_note() {
        let mut mock = MockNoteRepository::new();
        mock.expect_get()
            .times(1)
            .returning(|_, id| Ok(sample_note(id)));
        mock.expect_delete().times(1).returning(|_, _| Ok(()));

        let service = service_with(mock);

        let note = service.delete(&Context::new(), 5).await.unwrap();

        assert_eq!(note.id, 5);
    }

    #[tokio::test]
    async fn test_scenario_against_memory_backend() {
        let service = NoteService::new(
            Arc::new(MemoryNoteRepository::new()),
            TxManager::passthrough(),
        );
        let ctx = Context::new();

        let id = service.create(&ctx, sample_info()).await.unwrap();
        assert_eq!(id, 1);

        let note = service.get(&ctx, 1).await.unwrap();
        assert_eq!(note.info, sample_info());
        assert_eq!(note.created_at, note.updated_at);

        assert!(matches!(
            service.get(&ctx, 2).await,
            Err(NoteError::NotFound { id: 2 })
        ));
    }

    #[tokio::test]
    async fn test_health_check_skips_backend_when_cancelled() {
        let mut mock = MockNoteRepository::new();
        mock.expect_health_check().times(0);
        let service = service_with(mock);

        let ctx = Context::new();
        ctx.cancel();

        assert!(!service.health_check(&ctx).await);
    }

    /// Backend whose health check never answers.
    struct StalledRepository;

    #[async_trait::async_trait]
    impl NoteRepository for StalledRepository {
        async fn create(&self, _: &Context, _: NoteInfo) -> Result<i64, NoteError> {
            Err(NoteError::unavailable("stalled"))
        }

        async fn get(&self, _: &Context, id: i64) -> Result<Note, NoteError> {
            Err(NoteError::not_found(id))
        }

        async fn update(
            &self,
            _: &Context,
            id: i64,
            _: UpdateNoteInfo,
        ) -> Result<Note, NoteError> {
            Err(NoteError::not_found(id))
        }

        async fn delete(&self, _: &Context, id: i64) -> Result<(), NoteError> {
            Err(NoteError::not_found(id))
        }

        async fn health_check(&self) -> bool {
            std::future::pending::<bool>().await
        }
    }

    #[tokio::test]
    async fn test_health_check_reports_false_after_deadline() {
        let service = NoteService::new(Arc::new(StalledRepository), TxManager::passthrough());
        let ctx = Context::with_timeout(std::time::Duration::from_millis(20));

        let healthy = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            service.health_check(&ctx),
        )
        .await
        .expect("health check must return once the deadline passes");

        assert!(!healthy);
    }
}
