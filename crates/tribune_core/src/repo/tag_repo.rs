//! Tag repository: topic tag sets and global usage counters.
//!
//! # Responsibility
//! - Replace a topic's tag set atomically relative to the enclosing
//!   transaction.
//! - Maintain the per-tag usage counters by delta, never read-modify-write
//!   from the service side.
//!
//! # Invariants
//! - Tag names are normalized to trimmed lowercase before persistence.
//! - `replace_tags` reports whether the stored set actually changed, so
//!   no-op edits leave no audit trace.
//! - Counter updates are driven by the old/new set difference only.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};

use crate::model::topic::TopicId;
use crate::repo::RepoResult;

/// Repository interface for topic tags and tag counters.
pub trait TagRepository {
    /// Tags of a topic, sorted by name.
    fn tags_of(&self, topic_id: TopicId) -> RepoResult<Vec<String>>;
    /// Replaces the full tag set; returns whether the stored set changed.
    fn replace_tags(&self, topic_id: TopicId, tags: &[String]) -> RepoResult<bool>;
    /// Applies counter deltas: decrements tags present only in `old`,
    /// increments tags present only in `new`.
    fn update_counters(&self, old: &[String], new: &[String]) -> RepoResult<()>;
    /// Current usage counter of one tag (0 when unknown).
    fn usage_count(&self, tag: &str) -> RepoResult<i64>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn tags_of(&self, topic_id: TopicId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name
             FROM topic_tags tt
             INNER JOIN tags t ON t.id = tt.tag_id
             WHERE tt.topic_id = ?1
             ORDER BY t.name ASC;",
        )?;
        let mut rows = stmt.query([topic_id])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get::<_, String>(0)?);
        }
        Ok(tags)
    }

    fn replace_tags(&self, topic_id: TopicId, tags: &[String]) -> RepoResult<bool> {
        let current: BTreeSet<String> = self.tags_of(topic_id)?.into_iter().collect();
        let proposed: BTreeSet<String> = normalize_tags(tags).into_iter().collect();

        if current == proposed {
            return Ok(false);
        }

        self.conn.execute(
            "DELETE FROM topic_tags WHERE topic_id = ?1;",
            [topic_id],
        )?;
        for tag in &proposed {
            self.conn.execute(
                "INSERT OR IGNORE INTO tags (name) VALUES (?1);",
                [tag.as_str()],
            )?;
            self.conn.execute(
                "INSERT INTO topic_tags (topic_id, tag_id)
                 SELECT ?1, id FROM tags WHERE name = ?2;",
                params![topic_id, tag.as_str()],
            )?;
        }

        Ok(true)
    }

    fn update_counters(&self, old: &[String], new: &[String]) -> RepoResult<()> {
        let old_set: BTreeSet<&str> = old.iter().map(String::as_str).collect();
        let new_set: BTreeSet<&str> = new.iter().map(String::as_str).collect();

        for removed in old_set.difference(&new_set) {
            self.conn.execute(
                "UPDATE tags SET usage_count = usage_count - 1 WHERE name = ?1;",
                [removed],
            )?;
        }
        for added in new_set.difference(&old_set) {
            self.conn.execute(
                "INSERT INTO tags (name, usage_count) VALUES (?1, 1)
                 ON CONFLICT(name) DO UPDATE SET usage_count = usage_count + 1;",
                [added],
            )?;
        }
        Ok(())
    }

    fn usage_count(&self, tag: &str) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COALESCE(
                (SELECT usage_count FROM tags WHERE name = ?1), 0
            );",
            [tag],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Normalizes one tag value: trimmed, lowercased, empty dropped.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values, sorted by name.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

/// Parses a comma-separated tag list into normalized tag values.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let parts: Vec<String> = raw.split(',').map(str::to_string).collect();
    normalize_tags(&parts)
}

/// Joins a tag set into the comma-separated form stored in audit entries.
pub fn tags_to_string(tags: &[String]) -> String {
    tags.join(",")
}
