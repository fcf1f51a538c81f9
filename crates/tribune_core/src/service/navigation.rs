//! Previous/next topic navigation resolver.
//!
//! # Responsibility
//! - Compute the neighbor topic under the owning section's scroll policy,
//!   honoring viewer ignore lists.
//!
//! # Invariants
//! - Pinned (sticky) topics have no navigable neighbors in either
//!   direction.
//! - Sticky rows are excluded from previous-direction candidate sets only;
//!   this asymmetry is inherited behavior and deliberately preserved.
//! - A neighbor id that fails to resolve into a live topic is a fatal
//!   inconsistency, never silently skipped.

use log::error;

use crate::model::group::ScrollMode;
use crate::model::topic::Topic;
use crate::model::user::User;
use crate::repo::group_repo::SectionRepository;
use crate::repo::topic_repo::{NeighborDirection, TopicRepository};
use crate::repo::RepoError;
use crate::service::{ServiceError, ServiceResult};

/// Read-only navigation resolver over topic and section repositories.
pub struct NavigationService<T, S> {
    topics: T,
    sections: S,
}

impl<T: TopicRepository, S: SectionRepository> NavigationService<T, S> {
    pub fn new(topics: T, sections: S) -> Self {
        Self { topics, sections }
    }

    /// Resolves the topic preceding `topic` in the viewer's traversal.
    pub fn previous(&self, topic: &Topic, viewer: Option<&User>) -> ServiceResult<Option<Topic>> {
        self.neighbor(topic, viewer, NeighborDirection::Previous)
    }

    /// Resolves the topic following `topic` in the viewer's traversal.
    pub fn next(&self, topic: &Topic, viewer: Option<&User>) -> ServiceResult<Option<Topic>> {
        self.neighbor(topic, viewer, NeighborDirection::Next)
    }

    fn neighbor(
        &self,
        topic: &Topic,
        viewer: Option<&User>,
        direction: NeighborDirection,
    ) -> ServiceResult<Option<Topic>> {
        if topic.sticky {
            return Ok(None);
        }

        let scroll_mode = match self.sections.scroll_mode_of(topic.section_id) {
            Ok(mode) => mode,
            Err(RepoError::SectionNotFound(section_id)) => {
                error!(
                    "event=topic_neighbor module=service status=error error_code=section_missing section_id={section_id} topic_id={}",
                    topic.id
                );
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let neighbor_id = match scroll_mode {
            ScrollMode::NoScroll => return Ok(None),
            ScrollMode::Section => self.topics.neighbor_in_section(topic, direction)?,
            ScrollMode::Group => {
                let ignore_for = viewer.filter(|user| user.is_identified()).map(|user| user.id);
                self.topics.neighbor_in_group(topic, direction, ignore_for)?
            }
        };

        match neighbor_id {
            None => Ok(None),
            // The candidate query and this fetch read the same snapshot; a
            // miss here means the store broke that consistency.
            Some(id) => self.topics.get(id)?.map(Some).ok_or_else(|| {
                ServiceError::Invariant(format!("neighbor topic {id} did not resolve"))
            }),
        }
    }
}
