//! Application layer services implementing business logic.
//!
//! Services consume the repository trait and the transaction manager and
//! provide a backend-agnostic API for HTTP handlers and the admin CLI.
//!
//! - [`services::note_service::NoteService`] - Note creation, retrieval and mutation

pub mod services;
