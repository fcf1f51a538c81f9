//! Core domain logic for the tribune forum engine.
//! This crate is the single source of truth for topic lifecycle invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::audit::{DeleteRecord, EditLogDraft, EditLogEntry};
pub use model::group::{Group, GroupId, ScrollMode, Section, SectionId};
pub use model::poll::{NewPoll, Poll, PollVariant, NEW_VARIANT_ID};
pub use model::topic::{NewTopic, Topic, TopicBody, TopicId};
pub use model::user::{User, UserId};
pub use repo::topic_repo::{NeighborDirection, SqliteTopicRepository, TopicRepository};
pub use repo::{RepoError, RepoResult};
pub use service::image::{ImageStore, ImageStoreError, PlacedImage};
pub use service::mentions::{mentioned_nicks, resolve_user_refs};
pub use service::navigation::NavigationService;
pub use service::topic_service::{TopicService, MAX_MODERATION_BONUS};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
