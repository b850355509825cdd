//! Business logic services for the application layer.

pub mod note_service;

pub use note_service::NoteService;
