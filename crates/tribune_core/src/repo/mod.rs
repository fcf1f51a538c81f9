//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`*NotFound`) in addition to
//!   DB transport errors.
//! - Repositories never open transactions themselves; the service layer
//!   owns transaction boundaries and hands repositories a connection (or a
//!   transaction, which derefs to one).

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::DbError;
use crate::model::group::{GroupId, SectionId};
use crate::model::topic::{EpochMs, TopicId};
use crate::model::user::UserId;

pub mod delete_log_repo;
pub mod edit_log_repo;
pub mod event_repo;
pub mod group_repo;
pub mod poll_repo;
pub mod tag_repo;
pub mod topic_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    TopicNotFound(TopicId),
    UserNotFound(UserId),
    GroupNotFound(GroupId),
    SectionNotFound(SectionId),
    PollNotFound(TopicId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::PollNotFound(id) => write!(f, "no poll attached to topic {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Current wall-clock time in epoch milliseconds, the timestamp unit used
/// by every table in the schema.
pub(crate) fn now_ms() -> EpochMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as EpochMs)
        .unwrap_or(0)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
