//! Handlers for note endpoints (create, read, update, delete).

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::api::dto::note::{
    CreateNoteRequest, CreateNoteResponse, NoteResponse, UpdateNoteRequest,
};
use crate::error::NoteError;
use crate::state::AppState;

/// Creates a note.
///
/// # Endpoint
///
/// `POST /notes`
///
/// # Request Body
///
/// ```json
/// { "title": "T", "body": "B", "author": "A", "is_public": true }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if a required field is missing or empty,
/// 503 Service Unavailable if the store cannot be reached.
pub async fn create_note_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateNoteResponse>), NoteError> {
    let Json(payload) = payload?;
    let ctx = state.request_context();
    let id = state.note_service.create(&ctx, payload.into()).await?;

    tracing::info!("Inserted note with id: {}", id);

    Ok((StatusCode::CREATED, Json(CreateNoteResponse { id })))
}

/// Returns a note by id.
///
/// # Endpoint
///
/// `GET /notes/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the note does not exist.
pub async fn get_note_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<NoteResponse>, NoteError> {
    let Path(id) = id?;
    let ctx = state.request_context();
    let note = state.note_service.get(&ctx, id).await?;

    Ok(Json(note.into()))
}

/// Partially updates a note.
///
/// # Endpoint
///
/// `PATCH /notes/{id}`
///
/// # Errors
///
/// Returns 400 Bad Request for an empty patch, 404 Not Found if the note does not exist.
pub async fn update_note_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, NoteError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let ctx = state.request_context();
    let note = state
        .note_service
        .update(&ctx, id, payload.into())
        .await?;

    Ok(Json(note.into()))
}

/// Deletes a note.
///
/// # Endpoint
///
/// `DELETE /notes/{id}`
///
/// # Response Codes
///
/// - **204 No Content**: note removed
/// - **404 Not Found**: note does not exist
pub async fn delete_note_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, NoteError> {
    let Path(id) = id?;
    let ctx = state.request_context();
    state.note_service.delete(&ctx, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
