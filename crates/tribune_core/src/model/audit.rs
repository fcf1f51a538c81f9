//! Edit audit entries and delete records.
//!
//! # Responsibility
//! - Define the immutable point-in-time diff record written on every
//!   effective topic edit.
//! - Define the delete record created by moderated deletion.
//!
//! # Invariants
//! - Audit entries are append-only and never deleted, including across
//!   topic delete/undelete cycles.
//! - A delete record stores the negation of the bonus actually applied to
//!   the author's score (0 when no adjustment fired).

use serde::{Deserialize, Serialize};

use super::topic::{EpochMs, TopicId};
use super::user::UserId;

/// Immutable diff entry: the prior values of whichever fields one edit
/// actually changed. Fields left `None` did not change in that edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLogEntry {
    pub id: i64,
    pub topic_id: TopicId,
    pub editor_id: UserId,
    pub edited_at: EpochMs,
    pub old_text: Option<String>,
    pub old_title: Option<String>,
    pub old_tags: Option<String>,
    pub old_link_text: Option<String>,
    pub old_url: Option<String>,
}

/// Accumulator for one edit's prior values, persisted only when at least
/// one tracked field changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLogDraft {
    pub old_text: Option<String>,
    pub old_title: Option<String>,
    pub old_tags: Option<String>,
    pub old_link_text: Option<String>,
    pub old_url: Option<String>,
}

/// Side-effect record of a deletion, removed again on undeletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecord {
    pub topic_id: TopicId,
    pub deleted_by: UserId,
    pub reason: String,
    /// Negated applied bonus; undeletion does not revert the score.
    pub score_delta: i64,
    pub deleted_at: EpochMs,
}
