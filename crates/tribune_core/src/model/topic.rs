//! Topic aggregate root.
//!
//! # Responsibility
//! - Define the topic metadata record and its body projection.
//! - Provide request models for topic creation.
//!
//! # Invariants
//! - `id` is assigned once from the shared monotonic sequence and never
//!   reused.
//! - `commit_by`/`commit_at` are set iff `moderated` is true.
//! - Marking a topic deleted always clears `sticky`.

use serde::{Deserialize, Serialize};

/// Stable identifier for a topic.
pub type TopicId = i64;

/// Epoch milliseconds, the timestamp unit used across the schema.
pub type EpochMs = i64;

/// Topic metadata row, joined with its group for the section reference.
///
/// The body text lives in a separate record ([`TopicBody`]) so metadata
/// edits and body edits can be diffed independently while still committing
/// in one transaction when both change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub group_id: super::group::GroupId,
    /// Section of the owning group, resolved by join on read.
    pub section_id: super::group::SectionId,
    pub author_id: super::user::UserId,
    pub title: String,
    pub url: Option<String>,
    pub link_text: Option<String>,
    pub created_at: EpochMs,
    pub last_modified_at: EpochMs,
    pub sticky: bool,
    pub minor: bool,
    pub no_top: bool,
    pub moderated: bool,
    pub resolved: bool,
    pub deleted: bool,
    pub post_score: i64,
    pub commit_by: Option<super::user::UserId>,
    pub commit_at: Option<EpochMs>,
}

impl Topic {
    /// Returns whether the topic is visible in listings and navigation.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

/// Raw body text of a topic plus its markup-dialect flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicBody {
    pub topic_id: TopicId,
    pub text: String,
    /// True for the bbcode-style dialect, false for raw HTML.
    pub lorcode: bool,
}

/// Request model for creating a new topic.
///
/// The id, timestamps and lifecycle flags are owned by the engine; callers
/// only provide content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    pub title: String,
    pub url: Option<String>,
    pub link_text: Option<String>,
    pub text: String,
    pub lorcode: bool,
}

/// Compares two optional strings treating `None` and `""` as equal.
///
/// Edit diffing must not record an audit value when a field merely flips
/// between absent and empty.
pub fn equal_text(a: Option<&str>, b: Option<&str>) -> bool {
    match (blank_to_none(a), blank_to_none(b)) {
        (None, None) => true,
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
