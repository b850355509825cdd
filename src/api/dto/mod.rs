//! Data Transfer Objects for API requests and responses.
//!
//! DTOs only shape the wire format; field validation happens on the domain
//! types they convert into.

pub mod health;
pub mod note;
