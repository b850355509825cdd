//! Key-value note repositories.
//!
//! - [`RedisNoteRepository`] - Production Redis-backed storage
//! - [`MemoryNoteRepository`] - In-process map for tests and local runs
//!
//! Neither supports multi-key transactions; pair them with
//! [`TxManager::Passthrough`](crate::infrastructure::transaction::TxManager::Passthrough).

mod memory_note_repository;
mod redis_note_repository;

pub use memory_note_repository::MemoryNoteRepository;
pub use redis_note_repository::RedisNoteRepository;
