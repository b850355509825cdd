//! API route configuration.

use crate::api::handlers::{
    create_note_handler, delete_note_handler, get_note_handler, update_note_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Note routes.
///
/// # Endpoints
///
/// - `POST   /notes`       - Create a note
/// - `GET    /notes/{id}`  - Fetch a note
/// - `PATCH  /notes/{id}`  - Partially update a note
/// - `DELETE /notes/{id}`  - Delete a note
pub fn note_routes() -> Router<AppState> {
    Router::new().route("/notes", post(create_note_handler)).route(
        "/notes/{id}",
        get(get_note_handler)
            .patch(update_note_handler)
            .delete(delete_note_handler),
    )
}
