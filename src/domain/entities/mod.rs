//! Core domain entities.
//!
//! - [`Note`] - A persisted note
//! - [`NoteInfo`] - Content supplied when creating a note
//! - [`UpdateNoteInfo`] - Partial update of an existing note

pub mod note;

pub use note::{Note, NoteInfo, UpdateNoteInfo};
