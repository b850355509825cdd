use std::sync::Arc;
use std::time::Duration;

use crate::application::services::NoteService;
use crate::config::StorageMode;
use crate::context::Context;

/// Shared state injected into every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub note_service: Arc<NoteService>,
    pub storage_mode: StorageMode,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        note_service: Arc<NoteService>,
        storage_mode: StorageMode,
        request_timeout: Duration,
    ) -> Self {
        Self {
            note_service,
            storage_mode,
            request_timeout,
        }
    }

    /// Builds the context for one request, expiring after `request_timeout`.
    pub fn request_context(&self) -> Context {
        Context::with_timeout(self.request_timeout)
    }
}
