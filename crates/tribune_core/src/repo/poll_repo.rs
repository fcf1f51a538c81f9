//! Poll repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create polls at topic creation and expose the granular variant
//!   operations the reconciler is built from.
//!
//! # Invariants
//! - Blank variant labels are skipped on creation and never inserted.
//! - New variants append after existing ones (`display_order` = max + 1).
//! - Removing a variant cascades to its votes at the schema level.

use rusqlite::{params, Connection, OptionalExtension};

use crate::model::poll::{NewPoll, Poll, PollId, PollVariant, VariantId};
use crate::model::topic::TopicId;
use crate::repo::{bool_to_int, int_to_bool, RepoResult};

/// Repository interface for polls and their variants.
pub trait PollRepository {
    /// Creates a poll for a topic, inserting non-blank variants in order.
    fn create_poll(&self, topic_id: TopicId, poll: &NewPoll) -> RepoResult<PollId>;
    fn by_topic_id(&self, topic_id: TopicId) -> RepoResult<Option<Poll>>;
    /// Variants of a poll in display order.
    fn variants_of(&self, poll_id: PollId) -> RepoResult<Vec<PollVariant>>;
    /// Appends one variant after all existing ones.
    fn add_variant(&self, poll_id: PollId, label: &str) -> RepoResult<VariantId>;
    fn update_variant_label(&self, variant_id: VariantId, label: &str) -> RepoResult<()>;
    fn remove_variant(&self, variant_id: VariantId) -> RepoResult<()>;
    fn set_multi_select(&self, poll_id: PollId, multi_select: bool) -> RepoResult<()>;
}

/// SQLite-backed poll repository.
pub struct SqlitePollRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePollRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PollRepository for SqlitePollRepository<'_> {
    fn create_poll(&self, topic_id: TopicId, poll: &NewPoll) -> RepoResult<PollId> {
        self.conn.execute(
            "INSERT INTO polls (topic_id, multi_select) VALUES (?1, ?2);",
            params![topic_id, bool_to_int(poll.multi_select)],
        )?;
        let poll_id = self.conn.last_insert_rowid();

        for label in &poll.variants {
            if label.trim().is_empty() {
                continue;
            }
            self.add_variant(poll_id, label)?;
        }

        Ok(poll_id)
    }

    fn by_topic_id(&self, topic_id: TopicId) -> RepoResult<Option<Poll>> {
        let poll = self
            .conn
            .query_row(
                "SELECT id, topic_id, multi_select FROM polls WHERE topic_id = ?1;",
                [topic_id],
                |row| {
                    Ok((
                        row.get::<_, PollId>("id")?,
                        row.get::<_, TopicId>("topic_id")?,
                        row.get::<_, i64>("multi_select")?,
                    ))
                },
            )
            .optional()?;

        match poll {
            Some((id, topic_id, multi_select)) => Ok(Some(Poll {
                id,
                topic_id,
                multi_select: int_to_bool(multi_select, "polls.multi_select")?,
            })),
            None => Ok(None),
        }
    }

    fn variants_of(&self, poll_id: PollId) -> RepoResult<Vec<PollVariant>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, display_order
             FROM poll_variants
             WHERE poll_id = ?1
             ORDER BY display_order ASC, id ASC;",
        )?;
        let mut rows = stmt.query([poll_id])?;
        let mut variants = Vec::new();
        while let Some(row) = rows.next()? {
            variants.push(PollVariant {
                id: row.get("id")?,
                label: row.get("label")?,
                display_order: row.get("display_order")?,
            });
        }
        Ok(variants)
    }

    fn add_variant(&self, poll_id: PollId, label: &str) -> RepoResult<VariantId> {
        self.conn.execute(
            "INSERT INTO poll_variants (poll_id, label, display_order)
             SELECT ?1, ?2, COALESCE(MAX(display_order), 0) + 1
             FROM poll_variants
             WHERE poll_id = ?1;",
            params![poll_id, label],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_variant_label(&self, variant_id: VariantId, label: &str) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE poll_variants SET label = ?2 WHERE id = ?1;",
            params![variant_id, label],
        )?;
        Ok(())
    }

    fn remove_variant(&self, variant_id: VariantId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM poll_variants WHERE id = ?1;", [variant_id])?;
        Ok(())
    }

    fn set_multi_select(&self, poll_id: PollId, multi_select: bool) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE polls SET multi_select = ?2 WHERE id = ?1;",
            params![poll_id, bool_to_int(multi_select)],
        )?;
        Ok(())
    }
}
