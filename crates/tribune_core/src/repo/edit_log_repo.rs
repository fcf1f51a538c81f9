//! Edit audit log repository.
//!
//! # Responsibility
//! - Append one immutable diff entry per effective edit.
//! - Read back a topic's edit history most-recent-first.
//!
//! # Invariants
//! - Entries are append-only; there is no update or delete path.
//! - An entry is only written when the draft captured at least one prior
//!   value; empty drafts are the caller's signal of a no-op edit.

use rusqlite::{params, Connection};

use crate::model::audit::{EditLogDraft, EditLogEntry};
use crate::model::topic::TopicId;
use crate::model::user::UserId;
use crate::repo::{now_ms, RepoResult};

/// Repository interface for the edit audit log.
pub trait EditLogRepository {
    /// Persists the captured prior values as one audit entry.
    fn append(&self, topic_id: TopicId, editor_id: UserId, draft: &EditLogDraft)
        -> RepoResult<()>;
    /// Returns all entries for a topic, most recent first.
    fn for_topic(&self, topic_id: TopicId) -> RepoResult<Vec<EditLogEntry>>;
}

/// SQLite-backed edit log repository.
pub struct SqliteEditLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEditLogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EditLogRepository for SqliteEditLogRepository<'_> {
    fn append(
        &self,
        topic_id: TopicId,
        editor_id: UserId,
        draft: &EditLogDraft,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO edit_log (
                topic_id, editor_id, edited_at,
                old_text, old_title, old_tags, old_link_text, old_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                topic_id,
                editor_id,
                now_ms(),
                draft.old_text.as_deref(),
                draft.old_title.as_deref(),
                draft.old_tags.as_deref(),
                draft.old_link_text.as_deref(),
                draft.old_url.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn for_topic(&self, topic_id: TopicId) -> RepoResult<Vec<EditLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, topic_id, editor_id, edited_at,
                    old_text, old_title, old_tags, old_link_text, old_url
             FROM edit_log
             WHERE topic_id = ?1
             ORDER BY id DESC;",
        )?;
        let mut rows = stmt.query([topic_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(EditLogEntry {
                id: row.get("id")?,
                topic_id: row.get("topic_id")?,
                editor_id: row.get("editor_id")?,
                edited_at: row.get("edited_at")?,
                old_text: row.get("old_text")?,
                old_title: row.get("old_title")?,
                old_tags: row.get("old_tags")?,
                old_link_text: row.get("old_link_text")?,
                old_url: row.get("old_url")?,
            });
        }
        Ok(entries)
    }
}
