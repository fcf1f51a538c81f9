//! Group and section metadata.
//!
//! # Responsibility
//! - Define the group/section records read by the revision engine and the
//!   navigation resolver.
//! - Define the closed [`ScrollMode`] policy set.
//!
//! # Invariants
//! - `move_count` is only ever incremented, and always on both the origin
//!   and destination group of a relocation in the same transaction.

use serde::{Deserialize, Serialize};

/// Stable identifier for a group.
pub type GroupId = i64;

/// Stable identifier for a section.
pub type SectionId = i64;

/// Per-section policy for previous/next topic navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    /// Neighbors are ordered by moderation commit time across the section.
    Section,
    /// Neighbors are ordered by topic id within the group.
    Group,
    /// Navigation is disabled for this section.
    NoScroll,
}

/// Group row: the posting rules container inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub section_id: SectionId,
    pub title: String,
    pub url_name: String,
    pub moderated: bool,
    pub polls_allowed: bool,
    /// Topics in this group must carry a prepared image asset on creation.
    pub images_required: bool,
    pub links_allowed: bool,
    /// Relocation counter, bumped on both sides of every topic move.
    pub move_count: i64,
}

/// Section row: the policy container for groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub moderated: bool,
    pub scroll_mode: ScrollMode,
}
