//! Topic repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Allocate topic ids from the shared monotonic sequence.
//! - Provide row-level reads and field-scoped updates for topics and their
//!   bodies.
//! - Answer the neighbor queries used by the navigation resolver.
//!
//! # Invariants
//! - `allocate_id` never hands out the same id twice; the single sequence
//!   row serializes concurrent allocations.
//! - `mark_deleted` clears the sticky flag in the same statement.
//! - Field updates always refresh `last_modified_at`.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::model::group::GroupId;
use crate::model::topic::{Topic, TopicBody, TopicId};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, int_to_bool, now_ms, RepoError, RepoResult};

const TOPIC_SELECT_SQL: &str = "SELECT
    topics.id AS id,
    topics.group_id AS group_id,
    groups.section_id AS section_id,
    topics.author_id AS author_id,
    topics.title AS title,
    topics.url AS url,
    topics.link_text AS link_text,
    topics.created_at AS created_at,
    topics.last_modified_at AS last_modified_at,
    topics.sticky AS sticky,
    topics.minor AS minor,
    topics.no_top AS no_top,
    topics.moderated AS moderated,
    topics.resolved AS resolved,
    topics.deleted AS deleted,
    topics.post_score AS post_score,
    topics.commit_by AS commit_by,
    topics.commit_at AS commit_at
FROM topics
INNER JOIN groups ON groups.id = topics.group_id";

/// Direction of a neighbor lookup relative to the current topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborDirection {
    Previous,
    Next,
}

/// Repository interface for topic rows and bodies.
pub trait TopicRepository {
    /// Allocates the next topic id from the shared sequence.
    fn allocate_id(&self) -> RepoResult<TopicId>;
    /// Inserts a fresh topic row with lifecycle flags at their defaults.
    fn insert(
        &self,
        id: TopicId,
        group_id: GroupId,
        author_id: UserId,
        title: &str,
        url: Option<&str>,
        link_text: Option<&str>,
    ) -> RepoResult<()>;
    /// Inserts the body record belonging to a topic.
    fn insert_body(&self, id: TopicId, text: &str, lorcode: bool) -> RepoResult<()>;

    fn get(&self, id: TopicId) -> RepoResult<Option<Topic>>;
    fn body(&self, id: TopicId) -> RepoResult<Option<TopicBody>>;

    fn replace_body_text(&self, id: TopicId, text: &str) -> RepoResult<()>;
    fn append_body_text(&self, id: TopicId, suffix: &str) -> RepoResult<()>;
    fn update_title(&self, id: TopicId, title: &str) -> RepoResult<()>;
    fn update_url(&self, id: TopicId, url: Option<&str>) -> RepoResult<()>;
    fn update_link_text(&self, id: TopicId, link_text: Option<&str>) -> RepoResult<()>;
    fn update_minor(&self, id: TopicId, minor: bool) -> RepoResult<()>;
    /// Nulls out both `url` and `link_text` (relocation into a group that
    /// allows neither links nor images).
    fn clear_link(&self, id: TopicId) -> RepoResult<()>;
    fn set_group(&self, id: TopicId, group_id: GroupId) -> RepoResult<()>;

    /// Marks the topic deleted and clears sticky in one statement.
    fn mark_deleted(&self, id: TopicId) -> RepoResult<()>;
    fn mark_undeleted(&self, id: TopicId) -> RepoResult<()>;
    fn set_committed(&self, id: TopicId, committer: UserId) -> RepoResult<()>;
    fn clear_committed(&self, id: TopicId) -> RepoResult<()>;
    fn set_resolved(&self, id: TopicId, resolved: bool) -> RepoResult<()>;
    fn set_options(
        &self,
        id: TopicId,
        post_score: i64,
        sticky: bool,
        no_top: bool,
        minor: bool,
    ) -> RepoResult<()>;

    /// Nearest topic id within the same group, ordered by id.
    ///
    /// `ignore_for` filters out candidates authored by users on that
    /// viewer's ignore list. Previous-direction lookups exclude sticky
    /// candidates; next-direction lookups do not.
    fn neighbor_in_group(
        &self,
        topic: &Topic,
        direction: NeighborDirection,
        ignore_for: Option<UserId>,
    ) -> RepoResult<Option<TopicId>>;

    /// Nearest topic id within the same section, ordered by moderation
    /// commit time, restricted to topics visible under the section's
    /// moderation rule. Returns `None` for uncommitted topics.
    fn neighbor_in_section(
        &self,
        topic: &Topic,
        direction: NeighborDirection,
    ) -> RepoResult<Option<TopicId>>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn update_field(&self, id: TopicId, sql: &str, value: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(sql, params![id, value, now_ms()])?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn allocate_id(&self) -> RepoResult<TopicId> {
        self.conn
            .execute("UPDATE topic_sequence SET next_id = next_id + 1;", [])?;
        let id = self
            .conn
            .query_row("SELECT next_id - 1 FROM topic_sequence;", [], |row| {
                row.get::<_, TopicId>(0)
            })?;
        Ok(id)
    }

    fn insert(
        &self,
        id: TopicId,
        group_id: GroupId,
        author_id: UserId,
        title: &str,
        url: Option<&str>,
        link_text: Option<&str>,
    ) -> RepoResult<()> {
        let now = now_ms();
        self.conn.execute(
            "INSERT INTO topics (
                id, group_id, author_id, title, url, link_text,
                created_at, last_modified_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![id, group_id, author_id, title, url, link_text, now],
        )?;
        Ok(())
    }

    fn insert_body(&self, id: TopicId, text: &str, lorcode: bool) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO topic_bodies (topic_id, text, lorcode) VALUES (?1, ?2, ?3);",
            params![id, text, bool_to_int(lorcode)],
        )?;
        Ok(())
    }

    fn get(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} WHERE topics.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn body(&self, id: TopicId) -> RepoResult<Option<TopicBody>> {
        let mut stmt = self.conn.prepare(
            "SELECT topic_id, text, lorcode FROM topic_bodies WHERE topic_id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(TopicBody {
                topic_id: row.get("topic_id")?,
                text: row.get("text")?,
                lorcode: int_to_bool(row.get("lorcode")?, "topic_bodies.lorcode")?,
            }));
        }
        Ok(None)
    }

    fn replace_body_text(&self, id: TopicId, text: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topic_bodies SET text = ?2 WHERE topic_id = ?1;",
            params![id, text],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn append_body_text(&self, id: TopicId, suffix: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topic_bodies SET text = text || ?2 WHERE topic_id = ?1;",
            params![id, suffix],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn update_title(&self, id: TopicId, title: &str) -> RepoResult<()> {
        self.update_field(
            id,
            "UPDATE topics SET title = ?2, last_modified_at = ?3 WHERE id = ?1;",
            Some(title),
        )
    }

    fn update_url(&self, id: TopicId, url: Option<&str>) -> RepoResult<()> {
        self.update_field(
            id,
            "UPDATE topics SET url = ?2, last_modified_at = ?3 WHERE id = ?1;",
            url,
        )
    }

    fn update_link_text(&self, id: TopicId, link_text: Option<&str>) -> RepoResult<()> {
        self.update_field(
            id,
            "UPDATE topics SET link_text = ?2, last_modified_at = ?3 WHERE id = ?1;",
            link_text,
        )
    }

    fn update_minor(&self, id: TopicId, minor: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET minor = ?2, last_modified_at = ?3 WHERE id = ?1;",
            params![id, bool_to_int(minor), now_ms()],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn clear_link(&self, id: TopicId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET url = NULL, link_text = NULL WHERE id = ?1;",
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn set_group(&self, id: TopicId, group_id: GroupId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET group_id = ?2, last_modified_at = ?3 WHERE id = ?1;",
            params![id, group_id, now_ms()],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn mark_deleted(&self, id: TopicId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET deleted = 1, sticky = 0 WHERE id = ?1;",
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn mark_undeleted(&self, id: TopicId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("UPDATE topics SET deleted = 0 WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn set_committed(&self, id: TopicId, committer: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET moderated = 1, commit_by = ?2, commit_at = ?3 WHERE id = ?1;",
            params![id, committer, now_ms()],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn clear_committed(&self, id: TopicId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET moderated = 0, commit_by = NULL, commit_at = NULL WHERE id = ?1;",
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn set_resolved(&self, id: TopicId, resolved: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET resolved = ?2, last_modified_at = ?3 WHERE id = ?1;",
            params![id, bool_to_int(resolved), now_ms()],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn set_options(
        &self,
        id: TopicId,
        post_score: i64,
        sticky: bool,
        no_top: bool,
        minor: bool,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET
                post_score = ?2,
                sticky = ?3,
                no_top = ?4,
                minor = ?5,
                last_modified_at = ?6
             WHERE id = ?1;",
            params![
                id,
                post_score,
                bool_to_int(sticky),
                bool_to_int(no_top),
                bool_to_int(minor),
                now_ms(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn neighbor_in_group(
        &self,
        topic: &Topic,
        direction: NeighborDirection,
        ignore_for: Option<UserId>,
    ) -> RepoResult<Option<TopicId>> {
        // Sticky rows only drop out of previous-direction candidate sets.
        let (aggregate, comparison, sticky_clause) = match direction {
            NeighborDirection::Previous => ("MAX", "<", " AND sticky = 0"),
            NeighborDirection::Next => ("MIN", ">", ""),
        };

        let mut sql = format!(
            "SELECT {aggregate}(id)
             FROM topics
             WHERE id {comparison} ? AND group_id = ? AND deleted = 0{sticky_clause}"
        );
        let mut bind_values: Vec<Value> = vec![
            Value::Integer(topic.id),
            Value::Integer(topic.group_id),
        ];

        if let Some(viewer_id) = ignore_for {
            sql.push_str(
                " AND author_id NOT IN (
                    SELECT ignored_id FROM ignore_list WHERE user_id = ?
                )",
            );
            bind_values.push(Value::Integer(viewer_id));
        }
        sql.push(';');

        let neighbor = self.conn.query_row(&sql, params_from_iter(bind_values), |row| {
            row.get::<_, Option<TopicId>>(0)
        })?;
        Ok(neighbor)
    }

    fn neighbor_in_section(
        &self,
        topic: &Topic,
        direction: NeighborDirection,
    ) -> RepoResult<Option<TopicId>> {
        let commit_at = match topic.commit_at {
            Some(value) => value,
            None => return Ok(None),
        };

        let (comparison, order, sticky_clause) = match direction {
            NeighborDirection::Previous => ("<", "DESC", " AND t.sticky = 0"),
            NeighborDirection::Next => (">", "ASC", ""),
        };

        let sql = format!(
            "SELECT t.id
             FROM topics t
             INNER JOIN groups g ON g.id = t.group_id
             INNER JOIN sections s ON s.id = g.section_id
             WHERE t.commit_at IS NOT NULL
               AND t.commit_at {comparison} ?1
               AND g.section_id = ?2
               AND (t.moderated = 1 OR s.moderated = 0)
               AND t.deleted = 0{sticky_clause}
             ORDER BY t.commit_at {order}, t.id {order}
             LIMIT 1;"
        );

        let neighbor = self
            .conn
            .query_row(&sql, params![commit_at, topic.section_id], |row| {
                row.get::<_, TopicId>(0)
            })
            .optional()?;
        Ok(neighbor)
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    Ok(Topic {
        id: row.get("id")?,
        group_id: row.get("group_id")?,
        section_id: row.get("section_id")?,
        author_id: row.get("author_id")?,
        title: row.get("title")?,
        url: row.get("url")?,
        link_text: row.get("link_text")?,
        created_at: row.get("created_at")?,
        last_modified_at: row.get("last_modified_at")?,
        sticky: int_to_bool(row.get("sticky")?, "topics.sticky")?,
        minor: int_to_bool(row.get("minor")?, "topics.minor")?,
        no_top: int_to_bool(row.get("no_top")?, "topics.no_top")?,
        moderated: int_to_bool(row.get("moderated")?, "topics.moderated")?,
        resolved: int_to_bool(row.get("resolved")?, "topics.resolved")?,
        deleted: int_to_bool(row.get("deleted")?, "topics.deleted")?,
        post_score: row.get("post_score")?,
        commit_by: row.get("commit_by")?,
        commit_at: row.get("commit_at")?,
    })
}
