//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure`. Mock implementations are generated via `mockall`
//! for service tests.

pub mod note_repository;

pub use note_repository::NoteRepository;

#[cfg(test)]
pub use note_repository::MockNoteRepository;
