//! User account repository: identity reads and the score ledger.
//!
//! # Responsibility
//! - Resolve user rows by id or nick.
//! - Apply additive score deltas and read ignore lists.
//!
//! # Invariants
//! - `change_score` is a single additive UPDATE; concurrent deltas compose
//!   commutatively and never race through read-modify-write.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::model::user::{User, UserId};
use crate::repo::{int_to_bool, RepoError, RepoResult};

const USER_SELECT_SQL: &str =
    "SELECT id, nick, score, anonymous, moderator FROM users";

/// Repository interface for user accounts as seen by the forum core.
pub trait UserRepository {
    fn get(&self, id: UserId) -> RepoResult<Option<User>>;
    fn by_nick(&self, nick: &str) -> RepoResult<Option<User>>;
    /// Adds `delta` to the user's score counter.
    fn change_score(&self, id: UserId, delta: i64) -> RepoResult<()>;
    /// User ids the given viewer has placed on their ignore list.
    fn ignored_by(&self, id: UserId) -> RepoResult<Vec<UserId>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn by_nick(&self, nick: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE nick = ?1;"))?;
        let mut rows = stmt.query([nick])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn change_score(&self, id: UserId, delta: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET score = score + ?2 WHERE id = ?1;",
            params![id, delta],
        )?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }
        Ok(())
    }

    fn ignored_by(&self, id: UserId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ignored_id FROM ignore_list WHERE user_id = ?1 ORDER BY ignored_id;")?;
        let mut rows = stmt.query([id])?;
        let mut ignored = Vec::new();
        while let Some(row) = rows.next()? {
            ignored.push(row.get::<_, UserId>(0)?);
        }
        Ok(ignored)
    }
}

impl SqliteUserRepository<'_> {
    /// Current score of one user, for callers that need a read-back.
    pub fn score_of(&self, id: UserId) -> RepoResult<i64> {
        let score = self
            .conn
            .query_row("SELECT score FROM users WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        score.ok_or(RepoError::UserNotFound(id))
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        nick: row.get("nick")?,
        score: row.get("score")?,
        anonymous: int_to_bool(row.get("anonymous")?, "users.anonymous")?,
        moderator: int_to_bool(row.get("moderator")?, "users.moderator")?,
    })
}
