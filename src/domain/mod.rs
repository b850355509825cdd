//! Domain layer containing the note entity and the storage contract.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependency on a concrete backend; repository
//! implementations live in [`crate::infrastructure`].

pub mod entities;
pub mod repositories;
