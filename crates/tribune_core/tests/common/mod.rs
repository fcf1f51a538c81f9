#![allow(dead_code)]

//! Shared fixtures: an in-memory database seeded with the accounts,
//! sections and groups the lifecycle tests operate on.

use rusqlite::{params, Connection};
use tribune_core::db::open_db_in_memory;
use tribune_core::repo::group_repo::{GroupRepository, SqliteGroupRepository};
use tribune_core::repo::tag_repo::{SqliteTagRepository, TagRepository};
use tribune_core::repo::topic_repo::SqliteTopicRepository;
use tribune_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use tribune_core::{Group, GroupId, NewTopic, Topic, TopicId, TopicRepository, User, UserId};

pub const ALICE: UserId = 1;
pub const MODERATOR: UserId = 2;
pub const ANON: UserId = 3;
pub const BOB: UserId = 4;

pub const GROUP_GENERAL: GroupId = 10;
pub const GROUP_TALKS: GroupId = 11;
pub const GROUP_LINUX_NEWS: GroupId = 20;
pub const GROUP_OTHER_NEWS: GroupId = 21;
pub const GROUP_SCREENSHOTS: GroupId = 30;

/// Opens a migrated in-memory database with the standard fixture rows.
pub fn test_db() -> Connection {
    let conn = open_db_in_memory().expect("in-memory db should open");
    conn.execute_batch(
        "INSERT INTO users (id, nick, score, anonymous, moderator) VALUES
            (1, 'alice', 100, 0, 0),
            (2, 'maxcom', 500, 0, 1),
            (3, 'anonymous', 0, 1, 0),
            (4, 'bob', 50, 0, 0);

         INSERT INTO sections (id, title, moderated, scroll_mode) VALUES
            (1, 'Forum', 0, 'group'),
            (2, 'News', 1, 'section'),
            (3, 'Gallery', 1, 'no_scroll');

         INSERT INTO groups (
            id, section_id, title, url_name, moderated,
            polls_allowed, images_required, links_allowed, move_count
         ) VALUES
            (10, 1, 'General', 'general', 0, 1, 0, 1, 0),
            (11, 1, 'Talks', 'talks', 0, 0, 0, 0, 5),
            (20, 2, 'Linux News', 'linux-news', 1, 1, 0, 1, 5),
            (21, 2, 'Other News', 'other-news', 1, 0, 0, 1, 2),
            (30, 3, 'Screenshots', 'screenshots', 1, 0, 1, 0, 0);",
    )
    .expect("fixture rows should insert");
    conn
}

pub fn user(conn: &Connection, id: UserId) -> User {
    SqliteUserRepository::new(conn)
        .get(id)
        .expect("user query should succeed")
        .expect("fixture user should exist")
}

pub fn group(conn: &Connection, id: GroupId) -> Group {
    SqliteGroupRepository::new(conn)
        .get(id)
        .expect("group query should succeed")
        .expect("fixture group should exist")
}

pub fn topic(conn: &Connection, id: TopicId) -> Topic {
    SqliteTopicRepository::new(conn)
        .get(id)
        .expect("topic query should succeed")
        .expect("topic should exist")
}

pub fn score_of(conn: &Connection, id: UserId) -> i64 {
    SqliteUserRepository::new(conn)
        .score_of(id)
        .expect("score should be readable")
}

pub fn tag_count(conn: &Connection, tag: &str) -> i64 {
    SqliteTagRepository::new(conn)
        .usage_count(tag)
        .expect("tag counter should be readable")
}

/// Inserts a topic row with a caller-chosen id, bypassing the service,
/// for tests that need a specific id layout.
pub fn insert_topic(conn: &Connection, id: TopicId, group_id: GroupId, author_id: UserId) {
    conn.execute(
        "INSERT INTO topics (id, group_id, author_id, title, created_at, last_modified_at)
         VALUES (?1, ?2, ?3, ?4, 0, 0);",
        params![id, group_id, author_id, format!("topic {id}")],
    )
    .expect("topic row should insert");
    conn.execute(
        "INSERT INTO topic_bodies (topic_id, text, lorcode) VALUES (?1, 'body', 1);",
        [id],
    )
    .expect("body row should insert");
}

pub fn new_topic(title: &str, text: &str) -> NewTopic {
    NewTopic {
        title: title.to_string(),
        url: None,
        link_text: None,
        text: text.to_string(),
        lorcode: true,
    }
}
