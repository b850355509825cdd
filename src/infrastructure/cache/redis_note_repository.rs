//! Redis-backed note repository.

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use tracing::{debug, info};

use crate::context::Context;
use crate::domain::entities::{Note, NoteInfo, UpdateNoteInfo};
use crate::domain::repositories::NoteRepository;
use crate::error::{NoteError, NoteResult};

const DEFAULT_KEY_PREFIX: &str = "note:";

/// Redis repository storing each note as a JSON string under `note:{id}`.
///
/// Ids come from an atomic `INCR` on `note:id_seq`, so concurrent creators
/// never share an id. Every operation is a single Redis command except
/// `update`, which reads, patches and writes back with `SET ... XX`; there is
/// no multi-key transaction, so an id leaked by a crash between `INCR` and
/// `SET` is never reused.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
pub struct RedisNoteRepository {
    client: ConnectionManager,
    note_ttl: Option<u64>,
    key_prefix: String,
}

impl RedisNoteRepository {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `note_ttl_seconds` - expiry applied on every write; `None` keeps notes forever.
    ///   Controlled via `REDIS_NOTE_TTL_SECONDS`
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::StoreUnavailable`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, note_ttl_seconds: Option<u64>) -> NoteResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| NoteError::unavailable(format!("Failed to create Redis client: {e}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| NoteError::unavailable(format!("Failed to connect to Redis: {e}")))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| NoteError::unavailable(format!("Redis PING failed: {e}")))?;

        info!("✓ Connected to Redis");

        Ok(Self::new(manager, note_ttl_seconds))
    }

    pub fn new(client: ConnectionManager, note_ttl_seconds: Option<u64>) -> Self {
        Self {
            client,
            note_ttl: note_ttl_seconds,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Replaces the `note:` namespace, e.g. to isolate test runs.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn note_key(&self, id: i64) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    fn counter_key(&self) -> String {
        format!("{}id_seq", self.key_prefix)
    }

    async fn read(&self, id: i64) -> NoteResult<Note> {
        let mut conn = self.client.clone();
        let payload: Option<Vec<u8>> = conn
            .get(self.note_key(id))
            .await
            .map_err(|e| read_error(id, e))?;
        let payload = payload.ok_or_else(|| NoteError::not_found(id))?;
        decode(id, &payload)
    }
}

/// A key holding a non-string value is corrupted data, not an outage.
fn read_error(id: i64, e: RedisError) -> NoteError {
    if e.code() == Some("WRONGTYPE") {
        NoteError::corrupted(format!("note {id}: key holds a non-string value"))
    } else {
        NoteError::from(e)
    }
}

fn encode(note: &Note) -> NoteResult<String> {
    serde_json::to_string(note)
        .map_err(|e| NoteError::invalid_input(format!("note cannot be encoded: {e}")))
}

fn decode(id: i64, payload: &[u8]) -> NoteResult<Note> {
    let note: Note = serde_json::from_slice(payload)
        .map_err(|e| NoteError::corrupted(format!("note {id}: {e}")))?;

    if note.id != id {
        return Err(NoteError::corrupted(format!(
            "key for note {id} holds note {}",
            note.id
        )));
    }

    Ok(note)
}

#[async_trait]
impl NoteRepository for RedisNoteRepository {
    async fn create(&self, ctx: &Context, info: NoteInfo) -> Result<i64, NoteError> {
        info.ensure_valid()?;

        ctx.run(async {
            let mut conn = self.client.clone();
            let id: i64 = conn.incr(self.counter_key(), 1).await?;

            let note = Note::new(id, info, Utc::now());
            let payload = encode(&note)?;
            let key = self.note_key(id);

            match self.note_ttl {
                Some(ttl) => conn.set_ex::<_, _, ()>(&key, payload, ttl).await?,
                None => conn.set::<_, _, ()>(&key, payload).await?,
            }

            debug!("Redis SET: {} (TTL: {:?})", key, self.note_ttl);
            Ok(id)
        })
        .await
    }

    async fn get(&self, ctx: &Context, id: i64) -> Result<Note, NoteError> {
        ctx.run(self.read(id)).await
    }

    async fn update(
        &self,
        ctx: &Context,
        id: i64,
        patch: UpdateNoteInfo,
    ) -> Result<Note, NoteError> {
        patch.ensure_valid()?;

        ctx.run(async {
            let mut note = self.read(id).await?;
            note.apply(patch, Utc::now());
            let payload = encode(&note)?;

            // XX: never recreate a note deleted since it was read.
            let mut cmd = redis::cmd("SET");
            cmd.arg(self.note_key(id)).arg(payload).arg("XX");
            if let Some(ttl) = self.note_ttl {
                cmd.arg("EX").arg(ttl);
            }

            let mut conn = self.client.clone();
            let written: Option<String> = cmd.query_async(&mut conn).await?;
            if written.is_none() {
                return Err(NoteError::not_found(id));
            }

            debug!("Redis SET XX: {}", self.note_key(id));
            Ok(note)
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i64) -> Result<(), NoteError> {
        ctx.run(async {
            let mut conn = self.client.clone();
            let deleted: i64 = conn.del(self.note_key(id)).await?;

            if deleted == 0 {
                return Err(NoteError::not_found(id));
            }

            debug!("Redis DEL: {}", self.note_key(id));
            Ok(())
        })
        .await
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
