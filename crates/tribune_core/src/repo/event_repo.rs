//! User notification event repository.
//!
//! The engine only produces events; delivery belongs to an outer layer.
//! Event inserts participate in the enclosing creation transaction, so no
//! delivery result ever feeds back into the engine.

use rusqlite::{params, Connection};

use crate::model::topic::TopicId;
use crate::model::user::UserId;
use crate::repo::{now_ms, RepoResult};

/// Event kind written when a topic body references a user by name.
pub const EVENT_KIND_USER_REF: &str = "ref";

/// Repository interface for user notification events.
pub trait EventRepository {
    /// Inserts one user-reference event per listed user.
    fn add_user_ref_events(&self, users: &[UserId], topic_id: TopicId) -> RepoResult<()>;
    /// Event count for a user, newest-first retrieval is not needed here.
    fn count_for_user(&self, user_id: UserId) -> RepoResult<i64>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn add_user_ref_events(&self, users: &[UserId], topic_id: TopicId) -> RepoResult<()> {
        let now = now_ms();
        for user_id in users {
            self.conn.execute(
                "INSERT INTO user_events (user_id, topic_id, kind, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![user_id, topic_id, EVENT_KIND_USER_REF, now],
            )?;
        }
        Ok(())
    }

    fn count_for_user(&self, user_id: UserId) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM user_events WHERE user_id = ?1;",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
