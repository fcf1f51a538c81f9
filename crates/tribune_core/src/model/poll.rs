//! Poll attached to a topic.
//!
//! # Invariants
//! - At most one poll per topic.
//! - A variant label is never persisted blank; reconciliation removes
//!   variants whose proposed label is blank.
//! - A proposed variant id of [`NEW_VARIANT_ID`] means "not persisted yet,
//!   create on reconciliation".

use serde::{Deserialize, Serialize};

use super::topic::TopicId;

/// Stable identifier for a poll.
pub type PollId = i64;

/// Stable identifier for a poll variant.
pub type VariantId = i64;

/// Sentinel id carried by submitted variants that do not exist yet.
pub const NEW_VARIANT_ID: VariantId = 0;

/// Poll header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub topic_id: TopicId,
    pub multi_select: bool,
}

/// One answer option of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVariant {
    pub id: VariantId,
    pub label: String,
    /// Position in the ballot; new variants append after existing ones.
    pub display_order: i64,
}

impl PollVariant {
    /// Builds a submitted variant that should be created on reconciliation.
    pub fn proposed(label: impl Into<String>) -> Self {
        Self {
            id: NEW_VARIANT_ID,
            label: label.into(),
            display_order: 0,
        }
    }

    /// Returns whether the label is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.label.trim().is_empty()
    }
}

/// Request model for creating a poll alongside a new topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    /// Variant labels in ballot order; blank entries are skipped.
    pub variants: Vec<String>,
    pub multi_select: bool,
}
