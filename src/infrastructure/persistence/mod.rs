//! PostgreSQL repository implementations.
//!
//! - [`PgNoteRepository`] - Note storage backed by the `notes` table

pub mod pg_note_repository;

pub use pg_note_repository::PgNoteRepository;
