//! PostgreSQL implementation of note repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};
use std::sync::Arc;
use tokio::sync::MutexGuard;
use tracing::debug;

use crate::context::Context;
use crate::domain::entities::{Note, NoteInfo, UpdateNoteInfo};
use crate::domain::repositories::NoteRepository;
use crate::error::NoteError;
use crate::infrastructure::transaction::PgTransaction;

const NOTE_COLUMNS: &str = "id, title, body, author, is_public, created_at, updated_at";

/// Row shape of the `notes` table.
#[derive(sqlx::FromRow)]
struct NoteRow {
    id: i64,
    title: String,
    body: String,
    author: String,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            info: NoteInfo {
                title: row.title,
                body: row.body,
                author: row.author,
                is_public: row.is_public,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Connection a statement runs on: the ambient transaction or a pooled connection.
enum Conn<'c> {
    Pooled(PoolConnection<Postgres>),
    Tx(MutexGuard<'c, Option<PgTransaction>>),
}

impl Conn<'_> {
    fn executor(&mut self) -> Result<&mut PgConnection, NoteError> {
        match self {
            Conn::Pooled(conn) => Ok(&mut **conn),
            Conn::Tx(guard) => (**guard)
                .as_mut()
                .map(|tx| &mut **tx)
                .ok_or_else(|| NoteError::unavailable("transaction already finished")),
        }
    }
}

/// PostgreSQL repository for note storage.
///
/// Statements join the transaction carried by the [`Context`] when there is
/// one; otherwise each statement runs as its own implicit transaction on a
/// pooled connection.
pub struct PgNoteRepository {
    pool: Arc<PgPool>,
}

impl PgNoteRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn conn<'c>(&self, ctx: &'c Context) -> Result<Conn<'c>, NoteError> {
        match ctx.transaction() {
            Some(tx) => Ok(Conn::Tx(tx.lock().await)),
            None => Ok(Conn::Pooled(self.pool.acquire().await?)),
        }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, ctx: &Context, info: NoteInfo) -> Result<i64, NoteError> {
        info.ensure_valid()?;

        ctx.run(async {
            let mut conn = self.conn(ctx).await?;
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO notes (title, body, author, is_public)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(&info.title)
            .bind(&info.body)
            .bind(&info.author)
            .bind(info.is_public)
            .fetch_one(conn.executor()?)
            .await?;

            debug!("Inserted note {}", id);
            Ok(id)
        })
        .await
    }

    async fn get(&self, ctx: &Context, id: i64) -> Result<Note, NoteError> {
        ctx.run(async {
            let mut conn = self.conn(ctx).await?;
            let row = sqlx::query_as::<_, NoteRow>(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(conn.executor()?)
            .await?;

            row.map(Note::from).ok_or_else(|| NoteError::not_found(id))
        })
        .await
    }

    async fn update(
        &self,
        ctx: &Context,
        id: i64,
        patch: UpdateNoteInfo,
    ) -> Result<Note, NoteError> {
        patch.ensure_valid()?;

        ctx.run(async {
            let mut conn = self.conn(ctx).await?;
            let row = sqlx::query_as::<_, NoteRow>(&format!(
                r#"
                UPDATE notes
                SET title = COALESCE($2, title),
                    body = COALESCE($3, body),
                    author = COALESCE($4, author),
                    is_public = COALESCE($5, is_public),
                    updated_at = GREATEST(clock_timestamp(), created_at)
                WHERE id = $1
                RETURNING {NOTE_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.body.as_deref())
            .bind(patch.author.as_deref())
            .bind(patch.is_public)
            .fetch_optional(conn.executor()?)
            .await?;

            let note = row
                .map(Note::from)
                .ok_or_else(|| NoteError::not_found(id))?;
            debug!("Updated note {}", id);
            Ok(note)
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i64) -> Result<(), NoteError> {
        ctx.run(async {
            let mut conn = self.conn(ctx).await?;
            let result = sqlx::query("DELETE FROM notes WHERE id = $1")
                .bind(id)
                .execute(conn.executor()?)
                .await?;

            if result.rows_affected() == 0 {
                return Err(NoteError::not_found(id));
            }

            debug!("Deleted note {}", id);
            Ok(())
        })
        .await
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
