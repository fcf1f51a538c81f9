//! Group and section repositories.
//!
//! # Responsibility
//! - Resolve group and section metadata rows.
//! - Maintain the group relocation counters.
//!
//! # Invariants
//! - `bump_move_counts` touches both group rows in one statement so the
//!   store acquires the row locks in its own deterministic order; the
//!   caller still passes ids in ascending order for the two-statement
//!   fallback semantics.

use rusqlite::{params, Connection, Row};

use crate::model::group::{Group, GroupId, ScrollMode, Section, SectionId};
use crate::repo::{int_to_bool, RepoError, RepoResult};

/// Repository interface for group metadata.
pub trait GroupRepository {
    fn get(&self, id: GroupId) -> RepoResult<Option<Group>>;
    /// Increments the relocation counter on both groups of a topic move.
    fn bump_move_counts(&self, a: GroupId, b: GroupId) -> RepoResult<()>;
}

/// Repository interface for section metadata and scroll policy.
pub trait SectionRepository {
    fn get(&self, id: SectionId) -> RepoResult<Option<Section>>;
    fn scroll_mode_of(&self, id: SectionId) -> RepoResult<ScrollMode>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn get(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, section_id, title, url_name, moderated,
                    polls_allowed, images_required, links_allowed, move_count
             FROM groups
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_group_row(row)?));
        }
        Ok(None)
    }

    fn bump_move_counts(&self, a: GroupId, b: GroupId) -> RepoResult<()> {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let changed = self.conn.execute(
            "UPDATE groups SET move_count = move_count + 1 WHERE id = ?1 OR id = ?2;",
            params![low, high],
        )?;
        if changed == 0 {
            return Err(RepoError::GroupNotFound(a));
        }
        Ok(())
    }
}

/// SQLite-backed section repository.
pub struct SqliteSectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SectionRepository for SqliteSectionRepository<'_> {
    fn get(&self, id: SectionId) -> RepoResult<Option<Section>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, moderated, scroll_mode FROM sections WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_section_row(row)?));
        }
        Ok(None)
    }

    fn scroll_mode_of(&self, id: SectionId) -> RepoResult<ScrollMode> {
        self.get(id)?
            .map(|section| section.scroll_mode)
            .ok_or(RepoError::SectionNotFound(id))
    }
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<Group> {
    Ok(Group {
        id: row.get("id")?,
        section_id: row.get("section_id")?,
        title: row.get("title")?,
        url_name: row.get("url_name")?,
        moderated: int_to_bool(row.get("moderated")?, "groups.moderated")?,
        polls_allowed: int_to_bool(row.get("polls_allowed")?, "groups.polls_allowed")?,
        images_required: int_to_bool(row.get("images_required")?, "groups.images_required")?,
        links_allowed: int_to_bool(row.get("links_allowed")?, "groups.links_allowed")?,
        move_count: row.get("move_count")?,
    })
}

fn parse_section_row(row: &Row<'_>) -> RepoResult<Section> {
    let mode_text: String = row.get("scroll_mode")?;
    let scroll_mode = parse_scroll_mode(&mode_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid scroll mode `{mode_text}` in sections.scroll_mode"
        ))
    })?;

    Ok(Section {
        id: row.get("id")?,
        title: row.get("title")?,
        moderated: int_to_bool(row.get("moderated")?, "sections.moderated")?,
        scroll_mode,
    })
}

fn parse_scroll_mode(value: &str) -> Option<ScrollMode> {
    match value {
        "section" => Some(ScrollMode::Section),
        "group" => Some(ScrollMode::Group),
        "no_scroll" => Some(ScrollMode::NoScroll),
        _ => None,
    }
}
