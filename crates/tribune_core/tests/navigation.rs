mod common;

use common::{ALICE, ANON, BOB, GROUP_GENERAL, GROUP_LINUX_NEWS, GROUP_OTHER_NEWS, GROUP_SCREENSHOTS};
use rusqlite::{params, Connection};
use tribune_core::repo::group_repo::SqliteSectionRepository;
use tribune_core::{NavigationService, SqliteTopicRepository, Topic, TopicId};

fn navigator(conn: &Connection) -> NavigationService<SqliteTopicRepository<'_>, SqliteSectionRepository<'_>> {
    NavigationService::new(
        SqliteTopicRepository::new(conn),
        SqliteSectionRepository::new(conn),
    )
}

fn topic(conn: &Connection, id: TopicId) -> Topic {
    common::topic(conn, id)
}

fn set(conn: &Connection, id: TopicId, column: &str, value: i64) {
    conn.execute(
        &format!("UPDATE topics SET {column} = ?2 WHERE id = ?1;"),
        params![id, value],
    )
    .unwrap();
}

/// Three topics in one group, ids 100 < 200 < 300.
fn group_fixture() -> Connection {
    let conn = common::test_db();
    common::insert_topic(&conn, 100, GROUP_GENERAL, ALICE);
    common::insert_topic(&conn, 200, GROUP_GENERAL, BOB);
    common::insert_topic(&conn, 300, GROUP_GENERAL, ALICE);
    conn
}

#[test]
fn group_scroll_walks_by_id_in_both_directions() {
    let conn = group_fixture();
    let nav = navigator(&conn);
    let current = topic(&conn, 200);

    let previous = nav.previous(&current, None).unwrap().unwrap();
    assert_eq!(previous.id, 100);
    let next = nav.next(&current, None).unwrap().unwrap();
    assert_eq!(next.id, 300);
}

#[test]
fn group_scroll_is_a_round_trip() {
    let conn = group_fixture();
    let nav = navigator(&conn);
    let current = topic(&conn, 200);

    let next = nav.next(&current, None).unwrap().unwrap();
    let back = nav.previous(&next, None).unwrap().unwrap();
    assert_eq!(back.id, current.id);
}

#[test]
fn boundaries_have_no_neighbor() {
    let conn = group_fixture();
    let nav = navigator(&conn);

    assert!(nav.previous(&topic(&conn, 100), None).unwrap().is_none());
    assert!(nav.next(&topic(&conn, 300), None).unwrap().is_none());
}

#[test]
fn deleted_topics_are_skipped() {
    let conn = group_fixture();
    set(&conn, 300, "deleted", 1);
    let nav = navigator(&conn);

    assert!(nav.next(&topic(&conn, 200), None).unwrap().is_none());
}

#[test]
fn a_pinned_topic_has_no_neighbors_at_all() {
    let conn = group_fixture();
    set(&conn, 200, "sticky", 1);
    let nav = navigator(&conn);
    let current = topic(&conn, 200);

    assert!(nav.previous(&current, None).unwrap().is_none());
    assert!(nav.next(&current, None).unwrap().is_none());
}

#[test]
fn pinned_topics_are_reachable_forward_but_not_backward() {
    let conn = group_fixture();
    set(&conn, 100, "sticky", 1);
    set(&conn, 300, "sticky", 1);
    let nav = navigator(&conn);
    let current = topic(&conn, 200);

    assert!(nav.previous(&current, None).unwrap().is_none());
    let next = nav.next(&current, None).unwrap().unwrap();
    assert_eq!(next.id, 300);
}

#[test]
fn ignore_list_filters_candidates_for_identified_viewers() {
    let conn = group_fixture();
    conn.execute(
        "INSERT INTO ignore_list (user_id, ignored_id) VALUES (?1, ?2);",
        params![BOB, ALICE],
    )
    .unwrap();
    let nav = navigator(&conn);
    let current = topic(&conn, 200);
    let bob = common::user(&conn, BOB);

    assert!(nav.previous(&current, Some(&bob)).unwrap().is_none());
    assert!(nav.next(&current, Some(&bob)).unwrap().is_none());
}

#[test]
fn ignore_list_does_not_apply_to_anonymous_viewers() {
    let conn = group_fixture();
    conn.execute(
        "INSERT INTO ignore_list (user_id, ignored_id) VALUES (?1, ?2);",
        params![ANON, ALICE],
    )
    .unwrap();
    let nav = navigator(&conn);
    let current = topic(&conn, 200);
    let anon = common::user(&conn, ANON);

    let next = nav.next(&current, Some(&anon)).unwrap().unwrap();
    assert_eq!(next.id, 300);
}

/// Three committed topics across the two news groups of the same section,
/// ordered by commit time 1000 < 2000 < 3000.
fn section_fixture() -> Connection {
    let conn = common::test_db();
    common::insert_topic(&conn, 100, GROUP_LINUX_NEWS, ALICE);
    common::insert_topic(&conn, 200, GROUP_OTHER_NEWS, ALICE);
    common::insert_topic(&conn, 300, GROUP_LINUX_NEWS, BOB);
    for (id, commit_at) in [(100, 1000), (200, 2000), (300, 3000)] {
        conn.execute(
            "UPDATE topics SET moderated = 1, commit_by = 2, commit_at = ?2 WHERE id = ?1;",
            params![id, commit_at],
        )
        .unwrap();
    }
    conn
}

#[test]
fn section_scroll_walks_by_commit_time_across_groups() {
    let conn = section_fixture();
    let nav = navigator(&conn);
    let current = topic(&conn, 200);

    let previous = nav.previous(&current, None).unwrap().unwrap();
    assert_eq!(previous.id, 100);
    let next = nav.next(&current, None).unwrap().unwrap();
    assert_eq!(next.id, 300);
}

#[test]
fn uncommitted_topics_have_no_section_neighbors() {
    let conn = section_fixture();
    common::insert_topic(&conn, 400, GROUP_LINUX_NEWS, ALICE);
    let nav = navigator(&conn);
    let current = topic(&conn, 400);
    assert!(current.commit_at.is_none());

    assert!(nav.previous(&current, None).unwrap().is_none());
    assert!(nav.next(&current, None).unwrap().is_none());
}

#[test]
fn unmoderated_topics_are_invisible_in_a_moderated_section() {
    let conn = section_fixture();
    // Committed metadata but moderation since revoked.
    conn.execute(
        "UPDATE topics SET moderated = 0 WHERE id = 300;",
        [],
    )
    .unwrap();
    let nav = navigator(&conn);

    assert!(nav.next(&topic(&conn, 200), None).unwrap().is_none());
}

#[test]
fn section_scroll_skips_pinned_candidates_backward_only() {
    let conn = section_fixture();
    set(&conn, 100, "sticky", 1);
    set(&conn, 300, "sticky", 1);
    let nav = navigator(&conn);
    let current = topic(&conn, 200);

    assert!(nav.previous(&current, None).unwrap().is_none());
    let next = nav.next(&current, None).unwrap().unwrap();
    assert_eq!(next.id, 300);
}

#[test]
fn no_scroll_sections_never_navigate() {
    let conn = common::test_db();
    common::insert_topic(&conn, 100, GROUP_SCREENSHOTS, ALICE);
    common::insert_topic(&conn, 200, GROUP_SCREENSHOTS, ALICE);
    let nav = navigator(&conn);
    let current = topic(&conn, 100);

    assert!(nav.previous(&current, None).unwrap().is_none());
    assert!(nav.next(&current, None).unwrap().is_none());
}

#[test]
fn missing_section_degrades_to_no_neighbor() {
    let conn = group_fixture();
    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    conn.execute("UPDATE groups SET section_id = 999 WHERE id = ?1;", [GROUP_GENERAL])
        .unwrap();
    let nav = navigator(&conn);
    let current = topic(&conn, 200);

    assert!(nav.next(&current, None).unwrap().is_none());
}
