//! Infrastructure layer for external integrations.
//!
//! This layer implements the storage contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Key-value repositories (Redis and in-memory)
//! - [`persistence`] - PostgreSQL repository
//! - [`transaction`] - Transaction manager for multi-step units of work

pub mod cache;
pub mod persistence;
pub mod transaction;
