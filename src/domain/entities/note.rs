//! Note entity and its input shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{NoteError, NoteResult};

/// User-supplied content of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NoteInfo {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[validate(length(min = 1))]
    pub author: String,
    pub is_public: bool,
}

impl NoteInfo {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
        is_public: bool,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            author: author.into(),
            is_public,
        }
    }

    /// Checks that every required text field is present.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::InvalidInput`] naming the empty fields.
    pub fn ensure_valid(&self) -> NoteResult<()> {
        self.validate().map_err(NoteError::from)
    }
}

/// A persisted note.
///
/// `id` and `created_at` never change after creation; `updated_at` moves
/// forward on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub info: NoteInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Builds a freshly created note whose timestamps are both `now`.
    pub fn new(id: i64, info: NoteInfo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            info,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `patch` in place and refreshes `updated_at`.
    ///
    /// The new timestamp is clamped so it never precedes `created_at`.
    pub fn apply(&mut self, patch: UpdateNoteInfo, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.info.title = title;
        }
        if let Some(body) = patch.body {
            self.info.body = body;
        }
        if let Some(author) = patch.author {
            self.info.author = author;
        }
        if let Some(is_public) = patch.is_public {
            self.info.is_public = is_public;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Partial update for an existing note.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateNoteInfo {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub body: Option<String>,
    #[validate(length(min = 1))]
    pub author: Option<String>,
    pub is_public: Option<bool>,
}

impl UpdateNoteInfo {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.author.is_none()
            && self.is_public.is_none()
    }

    /// Rejects empty patches and patches that blank out a required field.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::InvalidInput`].
    pub fn ensure_valid(&self) -> NoteResult<()> {
        if self.is_empty() {
            return Err(NoteError::invalid_input("update contains no fields"));
        }
        self.validate().map_err(NoteError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_info() -> NoteInfo {
        NoteInfo::new("T", "B", "A", true)
    }

    #[test]
    fn test_new_note_has_equal_timestamps() {
        let now = Utc::now();
        let note = Note::new(1, sample_info(), now);

        assert_eq!(note.id, 1);
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.info, sample_info());
    }

    #[test]
    fn test_empty_fields_are_rejected() {
        let info = NoteInfo::new("", "body", "", false);

        let err = info.ensure_valid().unwrap_err();

        match err {
            NoteError::InvalidInput(message) => {
                assert!(message.contains("title"));
                assert!(message.contains("author"));
                assert!(!message.contains("body"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_valid_info_passes() {
        assert!(sample_info().ensure_valid().is_ok());
    }

    #[test]
    fn test_apply_patch_updates_only_given_fields() {
        let created = Utc::now();
        let mut note = Note::new(3, sample_info(), created);

        note.apply(
            UpdateNoteInfo {
                body: Some("new body".to_string()),
                is_public: Some(false),
                ..Default::default()
            },
            created + Duration::seconds(5),
        );

        assert_eq!(note.info.title, "T");
        assert_eq!(note.info.body, "new body");
        assert!(!note.info.is_public);
        assert_eq!(note.updated_at, created + Duration::seconds(5));
    }

    #[test]
    fn test_apply_never_moves_updated_at_before_created_at() {
        let created = Utc::now();
        let mut note = Note::new(3, sample_info(), created);

        note.apply(
            UpdateNoteInfo {
                title: Some("x".to_string()),
                ..Default::default()
            },
            created - Duration::seconds(10),
        );

        assert_eq!(note.updated_at, created);
    }

    #[test]
    fn test_patch_validation() {
        assert!(UpdateNoteInfo::default().ensure_valid().is_err());

        let blank_title = UpdateNoteInfo {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            blank_title.ensure_valid(),
            Err(NoteError::InvalidInput(_))
        ));

        let visibility_only = UpdateNoteInfo {
            is_public: Some(true),
            ..Default::default()
        };
        assert!(visibility_only.ensure_valid().is_ok());
    }
}
