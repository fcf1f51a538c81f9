//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own transaction boundaries: every mutating operation is one immediate
//!   transaction, all-or-nothing.
//!
//! # Invariants
//! - `Validation`/`PrecheckFailed` errors are raised before any write of
//!   the failing call commits.
//! - `Invariant` errors mark data-integrity bugs; callers report them
//!   generically, never as actionable user feedback.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::db::DbError;
use crate::repo::RepoError;

pub mod image;
pub mod mentions;
pub mod navigation;
pub mod poll_reconciler;
pub mod topic_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level error taxonomy for the forum core.
#[derive(Debug)]
pub enum ServiceError {
    /// User-recoverable input problem; the message is safe to show.
    Validation(String),
    /// A creation precondition was not met (e.g. missing image asset).
    PrecheckFailed(String),
    /// Data-integrity or programming invariant violated; fatal for the
    /// operation and reported to users generically.
    Invariant(String),
    /// Persistence-layer failure, including semantic not-found errors.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::PrecheckFailed(message) => write!(f, "precondition failed: {message}"),
            Self::Invariant(message) => write!(f, "invariant violated: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}
