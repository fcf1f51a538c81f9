//! Delete record repository.
//!
//! # Invariants
//! - One record per deleted topic; undeletion removes the record but never
//!   reverts the score delta it captured.
//! - `score_delta` stores the negation of the bonus actually applied (0
//!   when the moderation bonus branch did not fire).

use rusqlite::{params, Connection, OptionalExtension};

use crate::model::audit::DeleteRecord;
use crate::model::topic::TopicId;
use crate::model::user::UserId;
use crate::repo::{now_ms, RepoResult};

/// Repository interface for delete records.
pub trait DeleteLogRepository {
    fn insert(
        &self,
        topic_id: TopicId,
        deleted_by: UserId,
        reason: &str,
        score_delta: i64,
    ) -> RepoResult<()>;
    fn get(&self, topic_id: TopicId) -> RepoResult<Option<DeleteRecord>>;
    /// Removes the record as part of undeletion.
    fn remove(&self, topic_id: TopicId) -> RepoResult<()>;
}

/// SQLite-backed delete record repository.
pub struct SqliteDeleteLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeleteLogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DeleteLogRepository for SqliteDeleteLogRepository<'_> {
    fn insert(
        &self,
        topic_id: TopicId,
        deleted_by: UserId,
        reason: &str,
        score_delta: i64,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO delete_log (topic_id, deleted_by, reason, score_delta, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![topic_id, deleted_by, reason, score_delta, now_ms()],
        )?;
        Ok(())
    }

    fn get(&self, topic_id: TopicId) -> RepoResult<Option<DeleteRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT topic_id, deleted_by, reason, score_delta, deleted_at
                 FROM delete_log
                 WHERE topic_id = ?1;",
                [topic_id],
                |row| {
                    Ok(DeleteRecord {
                        topic_id: row.get("topic_id")?,
                        deleted_by: row.get("deleted_by")?,
                        reason: row.get("reason")?,
                        score_delta: row.get("score_delta")?,
                        deleted_at: row.get("deleted_at")?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn remove(&self, topic_id: TopicId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM delete_log WHERE topic_id = ?1;", [topic_id])?;
        Ok(())
    }
}
