//! In-process note repository for tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::context::Context;
use crate::domain::entities::{Note, NoteInfo, UpdateNoteInfo};
use crate::domain::repositories::NoteRepository;
use crate::error::{NoteError, NoteResult};

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    notes: HashMap<i64, Note>,
}

/// A repository keeping notes in a mutex-guarded map.
///
/// The lock guards both the id counter and the map and is never held across
/// an `.await`. Data lives only as long as the process.
#[derive(Default)]
pub struct MemoryNoteRepository {
    state: Mutex<MemoryState>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored notes.
    pub fn len(&self) -> usize {
        self.state().map(|s| s.notes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> NoteResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| NoteError::unavailable("memory store lock poisoned"))
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn create(&self, ctx: &Context, info: NoteInfo) -> Result<i64, NoteError> {
        info.ensure_valid()?;

        ctx.run(async {
            let mut state = self.state()?;
            state.last_id += 1;
            let id = state.last_id;
            state.notes.insert(id, Note::new(id, info, Utc::now()));
            Ok(id)
        })
        .await
    }

    async fn get(&self, ctx: &Context, id: i64) -> Result<Note, NoteError> {
        ctx.run(async {
            self.state()?
                .notes
                .get(&id)
                .cloned()
                .ok_or_else(|| NoteError::not_found(id))
        })
        .await
    }

    async fn update(
        &self,
        ctx: &Context,
        id: i64,
        patch: UpdateNoteInfo,
    ) -> Result<Note, NoteError> {
        patch.ensure_valid()?;

        ctx.run(async {
            let mut state = self.state()?;
            let note = state
                .notes
                .get_mut(&id)
                .ok_or_else(|| NoteError::not_found(id))?;
            note.apply(patch, Utc::now());
            Ok(note.clone())
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i64) -> Result<(), NoteError> {
        ctx.run(async {
            self.state()?
                .notes
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| NoteError::not_found(id))
        })
        .await
    }

    async fn health_check(&self) -> bool {
        self.state().is_ok()
    }
}
