//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into [`NoteService`](crate::application::services::NoteService)
//! calls and maps [`NoteError`](crate::error::NoteError) kinds to status codes.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
