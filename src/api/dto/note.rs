//! DTOs for note endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Note, NoteInfo, UpdateNoteInfo};

/// Request body for `POST /notes`.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(default)]
    pub is_public: bool,
}

impl From<CreateNoteRequest> for NoteInfo {
    fn from(req: CreateNoteRequest) -> Self {
        NoteInfo {
            title: req.title,
            body: req.body,
            author: req.author,
            is_public: req.is_public,
        }
    }
}

/// Response body for `POST /notes`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNoteResponse {
    pub id: i64,
}

/// Request body for `PATCH /notes/{id}`.
///
/// All fields are optional; only provided fields are changed.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub is_public: Option<bool>,
}

impl From<UpdateNoteRequest> for UpdateNoteInfo {
    fn from(req: UpdateNoteRequest) -> Self {
        UpdateNoteInfo {
            title: req.title,
            body: req.body,
            author: req.author,
            is_public: req.is_public,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteInfoResponse {
    pub title: String,
    pub body: String,
    pub author: String,
    pub is_public: bool,
}

/// JSON representation of a stored note.
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: i64,
    pub info: NoteInfoResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            info: NoteInfoResponse {
                title: note.info.title,
                body: note.info.body,
                author: note.info.author,
                is_public: note.info.is_public,
            },
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}
