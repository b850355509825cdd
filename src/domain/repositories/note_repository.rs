//! Repository trait for note storage.

use crate::context::Context;
use crate::domain::entities::{Note, NoteInfo, UpdateNoteInfo};
use crate::error::NoteError;
use async_trait::async_trait;

/// Storage contract every note backend satisfies.
///
/// The service layer is written against this trait only; which backend sits
/// behind it is decided once at startup by
/// [`crate::server::build_storage`].
///
/// Every method honours the cancellation and deadline carried by `ctx`.
/// Backends that support transactions run their statements inside the
/// transaction attached to `ctx`, if any.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgNoteRepository`] - PostgreSQL
/// - [`crate::infrastructure::cache::RedisNoteRepository`] - Redis key-value store
/// - [`crate::infrastructure::cache::MemoryNoteRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Persists a new note and returns its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::InvalidInput`] if a required field is empty.
    /// Returns [`NoteError::StoreUnavailable`] if the backend cannot be reached.
    /// Returns [`NoteError::Cancelled`] if `ctx` is cancelled first.
    async fn create(&self, ctx: &Context, info: NoteInfo) -> Result<i64, NoteError>;

    /// Fetches a note by id.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotFound`] if no note has this id.
    /// Returns [`NoteError::CorruptedData`] if the stored payload cannot be decoded.
    /// Returns [`NoteError::StoreUnavailable`] on backend failures.
    async fn get(&self, ctx: &Context, id: i64) -> Result<Note, NoteError>;

    /// Applies a partial update and returns the updated note.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotFound`] if no note has this id.
    /// Returns [`NoteError::InvalidInput`] if the patch is empty or blanks a required field.
    async fn update(
        &self,
        ctx: &Context,
        id: i64,
        patch: UpdateNoteInfo,
    ) -> Result<Note, NoteError>;

    /// Removes a note permanently.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotFound`] if no note has this id.
    async fn delete(&self, ctx: &Context, id: i64) -> Result<(), NoteError>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
