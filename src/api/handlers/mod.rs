//! HTTP request handlers for API endpoints.

pub mod health;
pub mod notes;

pub use health::health_handler;
pub use notes::{create_note_handler, delete_note_handler, get_note_handler, update_note_handler};
