//! Topic revision and moderation engine.
//!
//! # Responsibility
//! - Orchestrate topic creation, field-diffed edits with audit entries,
//!   poll reconciliation, tag counter upkeep, moderation commit/uncommit,
//!   deletion/undeletion and group relocation.
//!
//! # Invariants
//! - Every mutating operation runs in one immediate transaction; partial
//!   application is never observable.
//! - An audit entry is written iff at least one diff-tracked field changed.
//! - Uncommit and undelete never reverse score adjustments; score changes
//!   are one-way moderation judgments.
//! - The commit bonus range is a user-facing validation on the delete and
//!   edit-commit paths and a programming invariant on the internal commit
//!   path.

use log::info;
use rusqlite::{Connection, TransactionBehavior};

use crate::model::audit::{EditLogDraft, EditLogEntry};
use crate::model::group::{Group, GroupId};
use crate::model::poll::{NewPoll, PollVariant};
use crate::model::topic::{equal_text, NewTopic, Topic, TopicBody, TopicId};
use crate::model::user::{User, UserId};
use crate::repo::delete_log_repo::{DeleteLogRepository, SqliteDeleteLogRepository};
use crate::repo::edit_log_repo::{EditLogRepository, SqliteEditLogRepository};
use crate::repo::event_repo::{EventRepository, SqliteEventRepository};
use crate::repo::group_repo::{GroupRepository, SqliteGroupRepository};
use crate::repo::poll_repo::{PollRepository, SqlitePollRepository};
use crate::repo::tag_repo::{normalize_tags, tags_to_string, SqliteTagRepository, TagRepository};
use crate::repo::topic_repo::{SqliteTopicRepository, TopicRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::service::image::ImageStore;
use crate::service::poll_reconciler;
use crate::service::{ServiceError, ServiceResult};

/// Inclusive upper bound of the moderation bonus, shared by the commit and
/// delete paths.
pub const MAX_MODERATION_BONUS: i64 = 20;

/// Transactional facade over the topic aggregate.
///
/// Holds the caller's connection exclusively for the service lifetime;
/// every mutating method opens and commits its own transaction.
pub struct TopicService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> TopicService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Creates a topic with its body and optional poll, tags and user-ref
    /// notification events, all in one transaction.
    ///
    /// Groups that require an attached image reject creation without an
    /// [`ImageStore`]; the placed asset overrides the request's url and
    /// link text.
    #[allow(clippy::too_many_arguments)]
    pub fn add_topic(
        &mut self,
        request: &NewTopic,
        author: &User,
        group: &Group,
        image: Option<&dyn ImageStore>,
        poll: Option<&NewPoll>,
        tags: Option<&[String]>,
        user_refs: &[UserId],
    ) -> ServiceResult<TopicId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let topic_id = {
            let topics = SqliteTopicRepository::new(&tx);
            let id = topics.allocate_id()?;

            let (url, link_text) = if group.images_required {
                let store = image.ok_or_else(|| {
                    ServiceError::PrecheckFailed(format!(
                        "group {} requires an image asset and none was prepared",
                        group.id
                    ))
                })?;
                let placed = store
                    .place(id)
                    .map_err(|err| ServiceError::PrecheckFailed(err.to_string()))?;
                (Some(placed.url), Some(placed.link_text))
            } else {
                (request.url.clone(), request.link_text.clone())
            };

            topics.insert(
                id,
                group.id,
                author.id,
                &request.title,
                url.as_deref(),
                link_text.as_deref(),
            )?;
            topics.insert_body(id, &request.text, request.lorcode)?;

            if group.polls_allowed {
                if let Some(poll) = poll {
                    SqlitePollRepository::new(&tx).create_poll(id, poll)?;
                }
            }

            if let Some(tags) = tags {
                let normalized = normalize_tags(tags);
                let tag_repo = SqliteTagRepository::new(&tx);
                tag_repo.replace_tags(id, &normalized)?;
                // New topic: the counter baseline is empty, nothing to
                // decrement.
                tag_repo.update_counters(&[], &normalized)?;
            }

            SqliteEventRepository::new(&tx).add_user_ref_events(user_refs, id)?;

            id
        };
        tx.commit()?;

        info!(
            "event=topic_add module=service status=ok topic_id={topic_id} group_id={} author_id={}",
            group.id, author.id
        );
        Ok(topic_id)
    }

    /// Applies a field-diffed edit and, when `commit` is set, the
    /// moderation commit protocol with optional group relocation.
    ///
    /// Returns whether anything changed: field diff, tag set, poll state
    /// or commit metadata. The flag feeds caller-side audit/notification,
    /// never correctness.
    #[allow(clippy::too_many_arguments)]
    pub fn update_and_commit(
        &mut self,
        new_topic: &Topic,
        old_topic: &Topic,
        editor: &User,
        new_tags: Option<&[String]>,
        new_text: &str,
        commit: bool,
        change_group: Option<GroupId>,
        bonus: i64,
        poll_variants: Option<&[PollVariant]>,
        multi_select: bool,
    ) -> ServiceResult<bool> {
        // The bonus comes straight from a moderator form on this path, so
        // a bad value is user input, caught before any write happens.
        if commit && !(0..=MAX_MODERATION_BONUS).contains(&bonus) {
            return Err(ServiceError::Validation(format!(
                "bonus {bonus} outside allowed range 0..={MAX_MODERATION_BONUS}"
            )));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let modified = {
            let mut modified =
                apply_field_diff(&tx, old_topic, new_topic, editor, new_tags, new_text)?;

            if let Some(variants) = poll_variants {
                let polls = SqlitePollRepository::new(&tx);
                let poll = polls.by_topic_id(old_topic.id)?.ok_or_else(|| {
                    ServiceError::Invariant(format!(
                        "edit supplied poll variants but topic {} has no poll",
                        old_topic.id
                    ))
                })?;
                if poll_reconciler::reconcile(&polls, &poll, variants, multi_select)? {
                    modified = true;
                }
            }

            if commit {
                if let Some(destination) = change_group {
                    if destination != old_topic.group_id {
                        SqliteTopicRepository::new(&tx).set_group(old_topic.id, destination)?;
                        SqliteGroupRepository::new(&tx)
                            .bump_move_counts(old_topic.group_id, destination)?;
                    }
                }
                commit_in_tx(&tx, old_topic, editor, bonus)?;
                modified = true;
            }

            modified
        };
        tx.commit()?;

        if modified {
            info!(
                "event=topic_update module=service status=ok topic_id={} editor_id={}",
                old_topic.id, editor.id
            );
        }
        Ok(modified)
    }

    /// Marks the topic moderated and credits the author's score.
    ///
    /// The bonus range is validated upstream on user-facing paths; an out
    /// of range value here is a programming error.
    pub fn commit_topic(
        &mut self,
        topic: &Topic,
        committer: &User,
        bonus: i64,
    ) -> ServiceResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        commit_in_tx(&tx, topic, committer, bonus)?;
        tx.commit()?;

        info!(
            "event=topic_commit module=service status=ok topic_id={} committer_id={}",
            topic.id, committer.id
        );
        Ok(())
    }

    /// Clears moderation metadata. Does not reverse the score adjustment a
    /// prior commit applied.
    pub fn uncommit(&mut self, topic: &Topic) -> ServiceResult<()> {
        SqliteTopicRepository::new(&*self.conn).clear_committed(topic.id)?;
        info!(
            "event=topic_uncommit module=service status=ok topic_id={}",
            topic.id
        );
        Ok(())
    }

    /// Deletes the topic, optionally debiting the author's score when a
    /// moderator deletes someone else's topic with a non-zero bonus.
    pub fn delete_with_bonus(
        &mut self,
        topic: &Topic,
        actor: &User,
        reason: &str,
        bonus: i64,
    ) -> ServiceResult<()> {
        let applies_bonus = actor.moderator && bonus != 0 && actor.id != topic.author_id;
        if applies_bonus && !(0..=MAX_MODERATION_BONUS).contains(&bonus) {
            return Err(ServiceError::Validation(format!(
                "bonus {bonus} outside allowed range 0..={MAX_MODERATION_BONUS}"
            )));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            SqliteTopicRepository::new(&tx).mark_deleted(topic.id)?;

            let mut applied_delta: i64 = 0;
            if applies_bonus {
                SqliteUserRepository::new(&tx).change_score(topic.author_id, -bonus)?;
                applied_delta = -bonus;
            }

            SqliteDeleteLogRepository::new(&tx).insert(topic.id, actor.id, reason, applied_delta)?;
        }
        tx.commit()?;

        info!(
            "event=topic_delete module=service status=ok topic_id={} actor_id={}",
            topic.id, actor.id
        );
        Ok(())
    }

    /// Restores a deleted topic and removes its delete record. The score
    /// delta captured by the deletion stays applied.
    pub fn undelete(&mut self, topic: &Topic) -> ServiceResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            SqliteTopicRepository::new(&tx).mark_undeleted(topic.id)?;
            SqliteDeleteLogRepository::new(&tx).remove(topic.id)?;
        }
        tx.commit()?;

        info!(
            "event=topic_undelete module=service status=ok topic_id={}",
            topic.id
        );
        Ok(())
    }

    /// Relocates a topic into another group, annotating the body and
    /// stripping tags where the destination's rules demand it.
    pub fn move_topic(
        &mut self,
        topic: &Topic,
        new_group: &Group,
        mover: &User,
    ) -> ServiceResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let topics = SqliteTopicRepository::new(&tx);
            topics.set_group(topic.id, new_group.id)?;

            if !new_group.links_allowed && !new_group.images_required {
                let body = topics.body(topic.id)?.ok_or_else(|| {
                    ServiceError::Invariant(format!("body missing for topic {}", topic.id))
                })?;
                let origin = SqliteGroupRepository::new(&tx)
                    .get(topic.group_id)?
                    .ok_or(RepoError::GroupNotFound(topic.group_id))?;

                topics.clear_link(topic.id)?;
                let annotation = move_annotation(
                    body.lorcode,
                    topic.url.as_deref(),
                    topic.link_text.as_deref(),
                    &mover.nick,
                    &origin.title,
                );
                topics.append_body_text(topic.id, &annotation)?;
            }

            if !new_group.moderated {
                let tag_repo = SqliteTagRepository::new(&tx);
                let old_tags = tag_repo.tags_of(topic.id)?;
                if !old_tags.is_empty() {
                    tag_repo.replace_tags(topic.id, &[])?;
                    tag_repo.update_counters(&old_tags, &[])?;
                }
            }
        }
        tx.commit()?;

        info!(
            "event=topic_move module=service status=ok topic_id={} from_group={} to_group={} mover_id={}",
            topic.id, topic.group_id, new_group.id, mover.id
        );
        Ok(())
    }

    /// Flags or unflags the topic as resolved.
    pub fn resolve_topic(&mut self, id: TopicId, resolved: bool) -> ServiceResult<()> {
        SqliteTopicRepository::new(&*self.conn).set_resolved(id, resolved)?;
        Ok(())
    }

    /// Sets the moderator-managed presentation options.
    pub fn set_topic_options(
        &mut self,
        topic: &Topic,
        post_score: i64,
        sticky: bool,
        no_top: bool,
        minor: bool,
    ) -> ServiceResult<()> {
        SqliteTopicRepository::new(&*self.conn)
            .set_options(topic.id, post_score, sticky, no_top, minor)?;
        Ok(())
    }

    /// Fetches a topic, failing with the semantic not-found error.
    pub fn get_topic(&self, id: TopicId) -> ServiceResult<Topic> {
        SqliteTopicRepository::new(&*self.conn)
            .get(id)?
            .ok_or_else(|| ServiceError::Repo(RepoError::TopicNotFound(id)))
    }

    /// Fetches a topic's body record.
    pub fn topic_body(&self, id: TopicId) -> ServiceResult<TopicBody> {
        SqliteTopicRepository::new(&*self.conn)
            .body(id)?
            .ok_or_else(|| ServiceError::Repo(RepoError::TopicNotFound(id)))
    }

    /// Edit history of a topic, most recent first.
    pub fn edit_log(&self, id: TopicId) -> ServiceResult<Vec<EditLogEntry>> {
        Ok(SqliteEditLogRepository::new(&*self.conn).for_topic(id)?)
    }

    /// Tags of a topic, sorted by name.
    pub fn topic_tags(&self, id: TopicId) -> ServiceResult<Vec<String>> {
        Ok(SqliteTagRepository::new(&*self.conn).tags_of(id)?)
    }
}

/// Diffs the tracked fields, applies row updates and writes the shared
/// audit entry when anything changed. Returns the modified flag.
fn apply_field_diff(
    tx: &rusqlite::Transaction<'_>,
    old_topic: &Topic,
    new_topic: &Topic,
    editor: &User,
    new_tags: Option<&[String]>,
    new_text: &str,
) -> ServiceResult<bool> {
    let topics = SqliteTopicRepository::new(tx);
    let tag_repo = SqliteTagRepository::new(tx);

    let old_tags = tag_repo.tags_of(old_topic.id)?;
    let mut draft = EditLogDraft::default();
    let mut modified = false;

    let old_body = topics.body(old_topic.id)?.ok_or_else(|| {
        ServiceError::Invariant(format!("body missing for topic {}", old_topic.id))
    })?;
    if old_body.text != new_text {
        draft.old_text = Some(old_body.text);
        topics.replace_body_text(old_topic.id, new_text)?;
        modified = true;
    }

    if old_topic.title != new_topic.title {
        draft.old_title = Some(old_topic.title.clone());
        topics.update_title(old_topic.id, &new_topic.title)?;
        modified = true;
    }

    if !equal_text(
        old_topic.link_text.as_deref(),
        new_topic.link_text.as_deref(),
    ) {
        draft.old_link_text = old_topic.link_text.clone();
        topics.update_link_text(old_topic.id, new_topic.link_text.as_deref())?;
        modified = true;
    }

    if !equal_text(old_topic.url.as_deref(), new_topic.url.as_deref()) {
        draft.old_url = old_topic.url.clone();
        topics.update_url(old_topic.id, new_topic.url.as_deref())?;
        modified = true;
    }

    if let Some(tags) = new_tags {
        let normalized = normalize_tags(tags);
        if tag_repo.replace_tags(old_topic.id, &normalized)? {
            draft.old_tags = Some(tags_to_string(&old_tags));
            tag_repo.update_counters(&old_tags, &normalized)?;
            modified = true;
        }
    }

    if old_topic.minor != new_topic.minor {
        topics.update_minor(old_topic.id, new_topic.minor)?;
        modified = true;
    }

    if modified {
        SqliteEditLogRepository::new(tx).append(old_topic.id, editor.id, &draft)?;
    }

    Ok(modified)
}

/// Moderation commit protocol, shared by the direct and edit-driven paths.
fn commit_in_tx(
    tx: &rusqlite::Transaction<'_>,
    topic: &Topic,
    committer: &User,
    bonus: i64,
) -> ServiceResult<()> {
    // Callers validate user input before reaching this point; a violation
    // here is a bug, not bad input.
    if !(0..=MAX_MODERATION_BONUS).contains(&bonus) {
        return Err(ServiceError::Invariant(format!(
            "commit bonus {bonus} outside 0..={MAX_MODERATION_BONUS}"
        )));
    }

    SqliteTopicRepository::new(tx).set_committed(topic.id, committer.id)?;

    let users = SqliteUserRepository::new(tx);
    let author = users.get(topic.author_id)?.ok_or_else(|| {
        ServiceError::Invariant(format!(
            "author {} missing while committing topic {}",
            topic.author_id, topic.id
        ))
    })?;
    users.change_score(author.id, bonus)?;

    Ok(())
}

/// Builds the relocation annotation appended to the body when a topic
/// moves into a group without link or image support. One literal template
/// per markup dialect.
fn move_annotation(
    lorcode: bool,
    url: Option<&str>,
    link_text: Option<&str>,
    mover_nick: &str,
    origin_title: &str,
) -> String {
    let link = match url.filter(|value| !value.is_empty()) {
        Some(url) => {
            let text = link_text.filter(|value| !value.is_empty()).unwrap_or(url);
            if lorcode {
                format!("\n[url={url}]{text}[/url]\n")
            } else {
                format!("<br><a href=\"{url}\">{text}</a>\n<br>\n")
            }
        }
        None => String::new(),
    };

    if lorcode {
        format!("\n{link}\n[i]Moved by {mover_nick} from {origin_title}[/i]\n")
    } else {
        format!("\n{link}<br><i>Moved by {mover_nick} from {origin_title}</i>\n")
    }
}
